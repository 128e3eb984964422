//! CWL-style type system: normalization and compatibility.

pub mod compat;
pub mod normalize;

pub use compat::{ConnectionCheck, check_connection};
pub use normalize::{NormalizedType, TypeShape, normalize, parse_short};
