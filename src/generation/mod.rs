//! Text and structured output generation.

pub mod convenience;
pub mod object;
pub mod text;

pub use convenience::{analyze, generate};
pub use object::{generate_object, generate_objects, OutputStrategy, StructuredRequest};
pub use text::generate_text;
