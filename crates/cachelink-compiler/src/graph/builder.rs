//! Builds structs from tag field trees.

use cachelink_core::tag_class::NO_CLASS;
use cachelink_core::{TagClass, TagId, TagPath};
use cachelink_format::cache::{DATA_FLAG_EXTERNAL, DATA_SIZE, REFLEXIVE_SIZE, data, reflexive};

use super::{Asset, AssetEdge, DependencyEdge, DependencyKind, FieldLayout, PointerEdge, Struct, StructId};
use crate::schema::{FieldValue, Reference, STRING_SIZE, TagStruct};
use crate::{Error, Result};

/// Encoder for one struct's bytes and edges.
#[derive(Debug, Default)]
pub struct StructBuilder {
    data: Vec<u8>,
    pointers: Vec<PointerEdge>,
    dependencies: Vec<DependencyEdge>,
    assets: Vec<AssetEdge>,
    fields: Vec<FieldLayout>,
}

impl StructBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the next pushed byte.
    pub fn offset(&self) -> usize {
        self.data.len()
    }

    pub fn push_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn push_i8(&mut self, value: i8) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn push_u16(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn push_i16(&mut self, value: i16) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn push_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn push_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn push_f32(&mut self, value: f32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn push_pad(&mut self, size: usize) {
        self.data.resize(self.data.len() + size, 0);
    }

    /// Null-padded string of `size` bytes. The caller checks the length.
    pub fn push_string(&mut self, value: &str, size: usize) {
        let start = self.data.len();
        self.push_pad(size);
        self.data[start..start + value.len()].copy_from_slice(value.as_bytes());
    }

    /// Overwrite a u32 already pushed at `offset`.
    pub fn write_u32(&mut self, offset: usize, value: u32) {
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn add_pointer(&mut self, field_offset: usize, target: StructId) {
        self.pointers.push(PointerEdge {
            offset: field_offset,
            target,
        });
    }

    pub fn add_dependency(
        &mut self,
        field_offset: usize,
        path: TagPath,
        class: TagClass,
        kind: DependencyKind,
        optional: bool,
    ) {
        self.dependencies.push(DependencyEdge {
            offset: field_offset,
            path,
            class,
            kind,
            optional,
            resolved: None,
        });
    }

    /// Point the array header at `field_offset` to `count` consecutive
    /// structs starting at `first`.
    pub fn add_array(&mut self, field_offset: usize, first: StructId, count: usize) {
        self.write_u32(field_offset + reflexive::COUNT, count as u32);
        if count > 0 {
            self.add_pointer(field_offset + reflexive::POINTER, first);
        }
    }

    pub fn add_asset(&mut self, field_offset: usize, asset: usize) {
        self.assets.push(AssetEdge {
            offset: field_offset,
            asset,
        });
    }

    /// Record the extent of a field that started at `start`.
    pub fn record_field(&mut self, name: &str, start: usize) {
        self.fields.push(FieldLayout {
            name: name.to_owned(),
            offset: start,
            width: self.data.len() - start,
        });
    }

    pub fn finish(self, owner: usize, bsp: Option<usize>, unsafe_to_dedupe: bool) -> Struct {
        Struct {
            data: self.data,
            pointers: self.pointers,
            dependencies: self.dependencies,
            assets: self.assets,
            fields: self.fields,
            bsp,
            unsafe_to_dedupe,
            packed: false,
            dead: false,
            owner,
        }
    }
}

/// Walks one tag's field tree and appends its structs to the arena.
pub struct GraphBuilder<'a> {
    structs: &'a mut Vec<Struct>,
    assets: &'a mut Vec<Asset>,
    owner: usize,
    bsp: Option<usize>,
    /// Tag name for error messages.
    tag: &'a str,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        structs: &'a mut Vec<Struct>,
        assets: &'a mut Vec<Asset>,
        owner: usize,
        bsp: Option<usize>,
        tag: &'a str,
    ) -> Self {
        Self {
            structs,
            assets,
            owner,
            bsp,
            tag,
        }
    }

    /// Build the tag's structs and return the root struct.
    pub fn build(mut self, root: &TagStruct) -> Result<StructId> {
        let id = self.reserve(1);
        self.fill(id, root, false)?;
        Ok(id)
    }

    /// Reserve `count` consecutive slots.
    fn reserve(&mut self, count: usize) -> StructId {
        let first = self.structs.len();
        let (owner, bsp) = (self.owner, self.bsp);
        self.structs
            .resize_with(first + count, || Struct::raw(Vec::new(), owner, bsp, false));
        first
    }

    fn fill(&mut self, id: StructId, source: &TagStruct, unsafe_to_dedupe: bool) -> Result<()> {
        let mut b = StructBuilder::new();

        for field in &source.fields {
            let start = b.offset();
            match &field.value {
                FieldValue::U8 { value } => b.push_u8(*value),
                FieldValue::I8 { value } => b.push_i8(*value),
                FieldValue::U16 { value } => b.push_u16(*value),
                FieldValue::I16 { value } => b.push_i16(*value),
                FieldValue::U32 { value } => b.push_u32(*value),
                FieldValue::I32 { value } => b.push_i32(*value),
                FieldValue::F32 { value } => b.push_f32(*value),
                FieldValue::String { value } => {
                    if value.len() >= STRING_SIZE {
                        return Err(self.invalid(format!(
                            "{}: string is {} bytes, at most {} fit",
                            field.name,
                            value.len(),
                            STRING_SIZE - 1
                        )));
                    }
                    b.push_string(value, STRING_SIZE);
                }
                FieldValue::Pad { size } => b.push_pad(*size),
                FieldValue::Bytes { bytes } => b.push_bytes(bytes),
                FieldValue::Dependency(reference) => {
                    self.dependency(&mut b, &field.name, reference)?;
                }
                FieldValue::TagId(reference) => {
                    b.push_u32(TagId::NULL.raw());
                    if !reference.is_empty() {
                        let (path, class) = self.resolve_reference(&field.name, reference)?;
                        b.add_dependency(start, path, class, DependencyKind::IdOnly, reference.optional);
                    }
                }
                FieldValue::Reflexive { count, elements } => {
                    if let Some(declared) = count.filter(|&c| c != elements.len()) {
                        return Err(self.invalid(format!(
                            "{}: array declares {declared} elements but has {}",
                            field.name,
                            elements.len()
                        )));
                    }
                    b.push_pad(REFLEXIVE_SIZE);
                    if !elements.is_empty() {
                        // Siblings must stay contiguous, so the whole block is
                        // reserved before any element adds structs of its own.
                        let first = self.reserve(elements.len());
                        let pinned = elements.len() > 1;
                        for (i, element) in elements.iter().enumerate() {
                            self.fill(first + i, element, pinned)?;
                        }
                        let stride = self.structs[first].len();
                        for i in 1..elements.len() {
                            let len = self.structs[first + i].len();
                            if len != stride {
                                return Err(self.invalid(format!(
                                    "{}[{i}]: element is {len} bytes, element 0 is {stride}",
                                    field.name
                                )));
                            }
                            self.structs[first + i].packed = true;
                        }
                        b.add_array(start, first, elements.len());
                    }
                }
                FieldValue::Data {
                    bytes,
                    external,
                    mergeable,
                } => {
                    b.push_pad(DATA_SIZE);
                    b.write_u32(start + data::SIZE, bytes.len() as u32);
                    if *external {
                        let asset = self.assets.len();
                        self.assets.push(Asset {
                            data: bytes.clone(),
                            owner: self.owner,
                        });
                        b.write_u32(start + data::FLAGS, DATA_FLAG_EXTERNAL);
                        b.add_asset(start, asset);
                    } else if !bytes.is_empty() {
                        let blob = self.structs.len();
                        self.structs
                            .push(Struct::raw(bytes.clone(), self.owner, self.bsp, !mergeable));
                        b.add_pointer(start + data::POINTER, blob);
                    }
                }
            }
            b.record_field(&field.name, start);
        }

        self.structs[id] = b.finish(self.owner, self.bsp, unsafe_to_dedupe);
        Ok(())
    }

    fn dependency(&mut self, b: &mut StructBuilder, name: &str, reference: &Reference) -> Result<()> {
        let start = b.offset();
        if reference.is_empty() {
            let class = reference
                .declared_class()
                .map_or(NO_CLASS, |c| c.normalize().fourcc());
            b.push_u32(class);
            b.push_u32(0);
            b.push_u32(0);
            b.push_u32(TagId::NULL.raw());
            return Ok(());
        }

        let (path, class) = self.resolve_reference(name, reference)?;
        b.push_u32(class.fourcc());
        b.push_u32(0);
        b.push_u32(0);
        b.push_u32(TagId::NULL.raw());
        b.add_dependency(start, path, class, DependencyKind::Reference, reference.optional);
        Ok(())
    }

    fn resolve_reference(&self, name: &str, reference: &Reference) -> Result<(TagPath, TagClass)> {
        reference
            .resolve()
            .map_err(|err| self.invalid(format!("{name}: {err}")))
    }

    fn invalid(&self, reason: String) -> Error {
        Error::InvalidTagData {
            tag: self.tag.to_owned(),
            reason,
        }
    }
}
