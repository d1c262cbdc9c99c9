//! Struct graph: byte blobs connected by pointer, dependency and asset edges.
//!
//! Structs live in one arena owned by the workload and refer to each other
//! by index. A tag contributes a root struct, one struct per array element
//! and one struct per internal data block.

mod builder;

#[cfg(test)]
mod builder_tests;

use cachelink_core::{TagClass, TagPath};

pub use builder::{GraphBuilder, StructBuilder};

/// Index of a struct in the workload arena.
pub type StructId = usize;

/// An address field at `offset` that must point at `target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerEdge {
    pub offset: usize,
    pub target: StructId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DependencyKind {
    /// 16-byte reference: class, path pointer, path size, tag ID.
    Reference,
    /// Bare 4-byte tag ID.
    IdOnly,
}

/// A named reference to another tag at `offset`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyEdge {
    pub offset: usize,
    pub path: TagPath,
    pub class: TagClass,
    pub kind: DependencyKind,
    /// A missing target writes a null ID instead of failing.
    pub optional: bool,
    /// Target tag index, filled in by dependency resolution.
    pub resolved: Option<usize>,
}

/// A data field at `offset` whose bytes live outside tag space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetEdge {
    pub offset: usize,
    pub asset: usize,
}

/// Name, offset and width of one encoded field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: String,
    pub offset: usize,
    pub width: usize,
}

/// Raw bytes stored outside tag space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub data: Vec<u8>,
    /// Tag that owns the asset.
    pub owner: usize,
}

/// One struct of the graph.
///
/// The length of `data` is fixed once the struct is built; linking only
/// rewrites bytes in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Struct {
    pub data: Vec<u8>,
    pub pointers: Vec<PointerEdge>,
    pub dependencies: Vec<DependencyEdge>,
    pub assets: Vec<AssetEdge>,
    pub fields: Vec<FieldLayout>,
    /// BSP partition the struct is loaded with, `None` for tag space.
    pub bsp: Option<usize>,
    pub unsafe_to_dedupe: bool,
    /// Array element after the first: placed right after its previous
    /// sibling with no alignment, so the engine can stride through them.
    pub packed: bool,
    /// Merged into another struct; excluded from layout.
    pub dead: bool,
    /// Tag that created the struct.
    pub owner: usize,
}

impl Struct {
    /// A struct holding raw data with no edges.
    pub fn raw(data: Vec<u8>, owner: usize, bsp: Option<usize>, unsafe_to_dedupe: bool) -> Self {
        Self {
            data,
            bsp,
            unsafe_to_dedupe,
            owner,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Can take part in a merge.
    pub fn is_dedupe_candidate(&self) -> bool {
        !self.dead && !self.unsafe_to_dedupe
    }

    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }
}
