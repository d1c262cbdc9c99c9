//! Tag field trees.
//!
//! A tag is an ordered list of named, typed fields. Field order is the
//! encoded order; every field has a fixed encoded width except `pad` and
//! `bytes`, whose width is their length.

use cachelink_core::{PathError, TagClass, TagPath};
use serde::{Deserialize, Serialize};

/// One struct of a tag: the tag root or an array element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TagStruct {
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub value: FieldValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldValue {
    U8 {
        #[serde(default)]
        value: u8,
    },
    I8 {
        #[serde(default)]
        value: i8,
    },
    U16 {
        #[serde(default)]
        value: u16,
    },
    I16 {
        #[serde(default)]
        value: i16,
    },
    U32 {
        #[serde(default)]
        value: u32,
    },
    I32 {
        #[serde(default)]
        value: i32,
    },
    F32 {
        #[serde(default)]
        value: f32,
    },
    /// 32-byte null-padded string.
    String {
        #[serde(default)]
        value: String,
    },
    Pad {
        size: usize,
    },
    Bytes {
        bytes: Vec<u8>,
    },
    /// Full tag reference: class, path pointer, path size, tag ID.
    Dependency(Reference),
    /// Bare tag ID.
    TagId(Reference),
    /// Array of structs.
    Reflexive {
        #[serde(default)]
        count: Option<usize>,
        #[serde(default)]
        elements: Vec<TagStruct>,
    },
    /// Raw data blob.
    Data {
        #[serde(default)]
        bytes: Vec<u8>,
        /// Stored outside tag space.
        #[serde(default)]
        external: bool,
        #[serde(default = "default_true")]
        mergeable: bool,
    },
}

fn default_true() -> bool {
    true
}

/// Target of a dependency or tag ID field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Tag path, with an extension when `class` is absent. Empty for none.
    #[serde(default)]
    pub path: String,
    /// Class extension, e.g. `bitmap`.
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

impl Reference {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Declared class, if any, without resolving the path.
    pub fn declared_class(&self) -> Option<TagClass> {
        self.class.as_deref().and_then(TagClass::from_extension)
    }

    /// Path and class of a non-empty reference.
    pub fn resolve(&self) -> Result<(TagPath, TagClass), PathError> {
        match &self.class {
            Some(extension) => {
                let class = TagClass::from_extension(extension)
                    .ok_or_else(|| PathError::UnknownExtension(format!("{}.{extension}", self.path)))?;
                Ok((TagPath::new(&self.path)?, class.normalize()))
            }
            None => {
                let (path, class) = TagPath::with_extension(&self.path)?;
                Ok((path, class.normalize()))
            }
        }
    }
}

impl FieldValue {
    /// Encoded width in bytes.
    pub fn width(&self) -> usize {
        use cachelink_format::cache::{DATA_SIZE, DEPENDENCY_SIZE, REFLEXIVE_SIZE};
        match self {
            FieldValue::U8 { .. } | FieldValue::I8 { .. } => 1,
            FieldValue::U16 { .. } | FieldValue::I16 { .. } => 2,
            FieldValue::U32 { .. }
            | FieldValue::I32 { .. }
            | FieldValue::F32 { .. }
            | FieldValue::TagId(_) => 4,
            FieldValue::String { .. } => STRING_SIZE,
            FieldValue::Pad { size } => *size,
            FieldValue::Bytes { bytes } => bytes.len(),
            FieldValue::Dependency(_) => DEPENDENCY_SIZE,
            FieldValue::Reflexive { .. } => REFLEXIVE_SIZE,
            FieldValue::Data { .. } => DATA_SIZE,
        }
    }
}

/// Encoded size of a `string` field, terminator included.
pub const STRING_SIZE: usize = 32;

impl TagStruct {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields
            .iter_mut()
            .find(|f| f.name == name)
            .map(|f| &mut f.value)
    }

    pub fn u16_field(&self, name: &str) -> Option<u16> {
        match self.field(name)? {
            FieldValue::U16 { value } => Some(*value),
            _ => None,
        }
    }

    pub fn reference(&self, name: &str) -> Option<&Reference> {
        match self.field(name)? {
            FieldValue::Dependency(r) | FieldValue::TagId(r) => Some(r),
            _ => None,
        }
    }

    pub fn elements(&self, name: &str) -> &[TagStruct] {
        match self.field(name) {
            Some(FieldValue::Reflexive { elements, .. }) => elements,
            _ => &[],
        }
    }

    pub fn elements_mut(&mut self, name: &str) -> &mut [TagStruct] {
        match self.field_mut(name) {
            Some(FieldValue::Reflexive { elements, .. }) => elements,
            _ => &mut [],
        }
    }

    /// Visit every field of this struct and its array elements, depth first.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Field)) {
        for field in &mut self.fields {
            visit(field);
            if let FieldValue::Reflexive { elements, .. } = &mut field.value {
                for element in elements {
                    element.walk_mut(visit);
                }
            }
        }
    }

    /// Encoded size of this struct alone (array elements and data excluded).
    pub fn size(&self) -> usize {
        self.fields.iter().map(|f| f.value.width()).sum()
    }
}
