use super::PreCompile;
use crate::diagnostics::DiagnosticKind;
use crate::schema::TagStruct;

fn has_reference(tag: &TagStruct, name: &str) -> bool {
    tag.reference(name).is_some_and(|r| !r.is_empty())
}

pub(super) fn pre_compile_particle(ctx: &mut PreCompile<'_>, tag: &TagStruct) {
    if !has_reference(tag, "bitmap") {
        let name = ctx.name();
        ctx.diagnostics
            .report(DiagnosticKind::MissingParticleBitmap, name)
            .emit();
    }
}

pub(super) fn pre_compile_weather(ctx: &mut PreCompile<'_>, tag: &TagStruct) {
    for (i, particle_type) in tag.elements("particle_types").iter().enumerate() {
        if !has_reference(particle_type, "sprite_bitmap") {
            let name = ctx.name();
            ctx.diagnostics
                .report(DiagnosticKind::MissingSpriteBitmap, name)
                .message(format!("particle_types[{i}]"))
                .emit();
        }
    }
}
