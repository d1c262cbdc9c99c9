use crate::schema::{FieldValue, TagStruct};

/// Pixel data is read from outside tag space.
pub(super) fn pre_compile(tag: &mut TagStruct) {
    if let Some(FieldValue::Data { external, .. }) = tag.field_mut("processed_pixel_data") {
        *external = true;
    }
}
