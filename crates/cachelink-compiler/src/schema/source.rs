//! Where tag field trees come from.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cachelink_core::{TagClass, TagPath};
use indexmap::IndexMap;

use super::fields::TagStruct;
use crate::{Error, Result};

/// A provider of tags by path and class.
pub trait TagSource {
    /// Load a tag. A tag of a class derived from `class` also matches; the
    /// returned class is the one actually found.
    fn load(&self, path: &TagPath, class: TagClass) -> Result<Option<(TagClass, TagStruct)>>;
}

/// Classes that satisfy a reference to `class`: itself, then every class
/// deriving from it.
pub(crate) fn candidate_classes(class: TagClass) -> impl Iterator<Item = TagClass> {
    std::iter::once(class).chain(
        TagClass::ALL
            .iter()
            .copied()
            .filter(move |&c| c != class && is_derived(c, class)),
    )
}

/// Whether `class` is `ancestor` or inherits from it.
pub(crate) fn is_derived(class: TagClass, ancestor: TagClass) -> bool {
    let mut current = Some(class);
    while let Some(c) = current {
        if c == ancestor {
            return true;
        }
        current = c.parent();
    }
    false
}

/// Tag directories searched in order; the first hit wins.
///
/// A tag `weapons\pistol\pistol` of class `weapon` lives at
/// `<dir>/weapons/pistol/pistol.weapon` and holds JSON.
#[derive(Clone, Debug, Default)]
pub struct DirectorySource {
    dirs: Vec<PathBuf>,
}

impl DirectorySource {
    pub fn new(dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn file_path(dir: &Path, path: &TagPath, class: TagClass) -> PathBuf {
        let mut file = dir.to_path_buf();
        file.extend(path.components());
        let name = format!("{}.{}", path.basename(), class.extension());
        file.set_file_name(name);
        file
    }
}

impl TagSource for DirectorySource {
    fn load(&self, path: &TagPath, class: TagClass) -> Result<Option<(TagClass, TagStruct)>> {
        for dir in &self.dirs {
            for candidate in candidate_classes(class) {
                let file = Self::file_path(dir, path, candidate);
                let text = match fs::read_to_string(&file) {
                    Ok(text) => text,
                    Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                    Err(source) => return Err(Error::Io { path: file, source }),
                };
                let tag = serde_json::from_str(&text)
                    .map_err(|source| Error::Parse { path: file.clone(), source })?;
                log::trace!("loaded {}", file.display());
                return Ok(Some((candidate, tag)));
            }
        }
        Ok(None)
    }
}

/// Tags held in memory, keyed by case-folded path and class.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    tags: IndexMap<(String, TagClass), TagStruct>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &TagPath, class: TagClass, tag: TagStruct) {
        self.tags.insert((path.key(), class.normalize()), tag);
    }

    /// Insert a tag from `path.extension` and its JSON text.
    pub fn insert_json(&mut self, path: &str, json: &str) -> Result<()> {
        let (path, class) = TagPath::with_extension(path)?;
        let tag = serde_json::from_str(json).map_err(|source| Error::Parse {
            path: PathBuf::from(path.as_str()),
            source,
        })?;
        self.insert(&path, class, tag);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl TagSource for MemorySource {
    fn load(&self, path: &TagPath, class: TagClass) -> Result<Option<(TagClass, TagStruct)>> {
        let key = path.key();
        Ok(candidate_classes(class).find_map(|candidate| {
            self.tags
                .get(&(key.clone(), candidate))
                .map(|tag| (candidate, tag.clone()))
        }))
    }
}
