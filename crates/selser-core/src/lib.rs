//! Serializes an edited document tree back to wikitext, reusing the
//! original source for everything the author did not touch.
//!
//! The pipeline is normalize, diff against the original parse, then a
//! selective walk that splices recorded source ranges for unmodified
//! regions and re-emits the rest through the constrained-text escaping
//! engine.

pub mod diff;
pub mod dom;
mod emit;
pub mod error;
pub mod escape;
pub mod normalize;
pub mod serialize;
pub mod site;

pub use diff::{DiffAnnotations, DiffMark, diff};
pub use dom::meta::{NodeMeta, SourceRange, Syntax};
pub use dom::{Document, NodeData, NodeId};
pub use error::SerializeError;
pub use escape::{Chunk, ChunkKind, escape_line};
pub use normalize::normalize;
pub use serialize::{Options, Serializer};
pub use site::SiteConfig;
