//! Tag path normalization and validation.
//!
//! Tag paths are relative to a tag directory, use `\` as the separator and
//! carry no extension; the class travels separately. Comparison ignores
//! ASCII case.

use std::fmt;

use crate::{MAX_PATH_LENGTH, TagClass};

/// Longest scenario name that fits the header's name field.
pub const MAX_SCENARIO_NAME_LENGTH: usize = 31;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("tag path is empty")]
    Empty,
    #[error("tag path {path:?} is {len} bytes (maximum {MAX_PATH_LENGTH})")]
    TooLong { path: String, len: usize },
    #[error("tag path {0:?} must be relative")]
    NotRelative(String),
    #[error("tag path {0:?} has no recognized class extension")]
    UnknownExtension(String),
    #[error("scenario name {name:?} exceeds {MAX_SCENARIO_NAME_LENGTH} characters")]
    ScenarioNameTooLong { name: String },
    #[error("scenario name {name:?} contains a capital letter")]
    ScenarioNameNotLowercase { name: String },
}

/// A validated, normalized tag path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TagPath(String);

impl TagPath {
    /// Normalize separators and validate length.
    pub fn new(path: &str) -> Result<Self, PathError> {
        let normalized = normalize(path);
        if normalized.is_empty() {
            return Err(PathError::Empty);
        }
        if normalized.starts_with('\\') {
            return Err(PathError::NotRelative(normalized));
        }
        if normalized.len() > MAX_PATH_LENGTH {
            let len = normalized.len();
            return Err(PathError::TooLong {
                path: normalized,
                len,
            });
        }
        Ok(Self(normalized))
    }

    /// Parse `path.extension` into a path and class.
    pub fn with_extension(path: &str) -> Result<(Self, TagClass), PathError> {
        let normalized = normalize(path);
        let class = normalized
            .rsplit_once('.')
            .filter(|(_, ext)| !ext.contains('\\'))
            .and_then(|(stem, ext)| TagClass::from_extension(ext).map(|c| (stem.to_owned(), c)));
        match class {
            Some((stem, class)) => Ok((Self::new(&stem)?, class)),
            None => Err(PathError::UnknownExtension(normalized)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Case-folded form used for lookups.
    pub fn key(&self) -> String {
        lookup_key(&self.0)
    }

    /// Path components, for mapping onto a directory tree.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('\\').filter(|c| !c.is_empty())
    }

    /// Last component.
    pub fn basename(&self) -> &str {
        self.0.rsplit('\\').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replace `/` separators with `\`.
pub fn normalize(path: &str) -> String {
    path.replace('/', "\\")
}

/// Case-folded lookup key for a path.
pub fn lookup_key(path: &str) -> String {
    normalize(path).to_ascii_lowercase()
}

/// Map name derived from a scenario path.
///
/// The name is the last path component. It must fit the 32-byte header
/// field with its terminator and must not contain capital letters.
pub fn scenario_name(path: &str) -> Result<&str, PathError> {
    let name = path.rsplit(['\\', '/']).next().unwrap_or(path);
    if name.len() > MAX_SCENARIO_NAME_LENGTH {
        return Err(PathError::ScenarioNameTooLong {
            name: name.to_owned(),
        });
    }
    if name.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PathError::ScenarioNameNotLowercase {
            name: name.to_owned(),
        });
    }
    Ok(name)
}
