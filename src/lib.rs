pub mod cwl;
pub mod error;
pub mod lower;
pub mod parse;
pub mod registry;
pub mod types;
pub mod wasm;

pub use lower::{CompileOutput, compile};
