//! CWL output surface: document model + job template.

pub mod job;
pub mod types;

pub use job::{job_template, job_template_yaml};
pub use types::*;
