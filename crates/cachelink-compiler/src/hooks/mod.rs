//! Per-class hooks run around linking.
//!
//! `pre_compile` runs once per tag before its structs are built and may
//! rewrite fields or report diagnostics. `post_compile` runs once per tag
//! after layout and may patch resolved struct bytes.

mod bitmap;
mod particle;
mod scenario;
mod sound;
mod string_list;


use cachelink_core::{TagClass, TagPath};

use crate::diagnostics::Diagnostics;
use crate::schema::TagStruct;
use crate::workload::{Layout, Workload};
use crate::Result;

/// What a pre-compile hook sees besides the field tree.
pub struct PreCompile<'a> {
    pub path: &'a TagPath,
    pub class: TagClass,
    pub diagnostics: &'a mut Diagnostics,
}

impl PreCompile<'_> {
    /// `path.extension`, as used in messages.
    pub fn name(&self) -> String {
        format!("{}.{}", self.path, self.class.extension())
    }
}

pub fn pre_compile(ctx: &mut PreCompile<'_>, tag: &mut TagStruct) -> Result<()> {
    match ctx.class {
        TagClass::Scenario => scenario::pre_compile(ctx),
        TagClass::Sound => {
            sound::pre_compile(tag);
            Ok(())
        }
        TagClass::Bitmap => {
            bitmap::pre_compile(tag);
            Ok(())
        }
        TagClass::Particle => {
            particle::pre_compile_particle(ctx, tag);
            Ok(())
        }
        TagClass::WeatherParticleSystem => {
            particle::pre_compile_weather(ctx, tag);
            Ok(())
        }
        TagClass::UnicodeStringList => {
            string_list::pre_compile(ctx, tag);
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn post_compile(workload: &mut Workload, index: usize, layout: &Layout) -> Result<()> {
    match workload.tag(index).class {
        TagClass::Scenario => scenario::post_compile(workload, index, layout),
        _ => Ok(()),
    }
}
