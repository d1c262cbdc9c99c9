use super::PreCompile;
use crate::diagnostics::DiagnosticKind;
use crate::schema::{FieldValue, TagStruct};

/// Strings are UTF-16 data blocks ending in a null code unit.
pub(super) fn pre_compile(ctx: &mut PreCompile<'_>, tag: &TagStruct) {
    for (i, entry) in tag.elements("strings").iter().enumerate() {
        let Some(FieldValue::Data { bytes, .. }) = entry.field("string") else {
            continue;
        };
        let kind = if bytes.len() % 2 != 0 {
            DiagnosticKind::OddStringLength
        } else if !bytes.is_empty() && !bytes.ends_with(&[0, 0]) {
            DiagnosticKind::MissingStringTerminator
        } else {
            continue;
        };
        let name = ctx.name();
        ctx.diagnostics
            .report(kind, name)
            .message(format!("strings[{i}]"))
            .emit();
    }
}
