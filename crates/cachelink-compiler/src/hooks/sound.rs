use crate::schema::{FieldValue, TagStruct};

/// Sample buffers are streamed from outside tag space.
pub(super) fn pre_compile(tag: &mut TagStruct) {
    tag.walk_mut(&mut |field| {
        if field.name != "samples" {
            return;
        }
        if let FieldValue::Data { external, .. } = &mut field.value {
            *external = true;
        }
    });
}
