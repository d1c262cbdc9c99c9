//! Tag field trees and the sources they are loaded from.

mod fields;
mod source;


pub use fields::{Field, FieldValue, Reference, STRING_SIZE, TagStruct};
pub use source::{DirectorySource, MemorySource, TagSource};
pub(crate) use source::is_derived;
