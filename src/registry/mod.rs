//! Read-through tool catalog.
//!
//! The registry is owned by the surrounding application and passed into
//! the compiler as a dependency; the compiler treats it as immutable for
//! the duration of a compilation and never writes to it.

pub mod descriptor;
pub mod types;

pub use descriptor::{ToolAnnotations, build_config};
pub use types::{InputSpec, OutputSpec, ToolConfig};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid tool descriptor catalog: {0}")]
    Descriptors(#[source] serde_json::Error),
    #[error("invalid tool annotation file: {0}")]
    Annotations(#[source] serde_json::Error),
}

/// Synchronous tool lookup at the compiler boundary. `None` means the
/// tool is unknown and the caller substitutes the generic fallback shape.
pub trait ToolLookup {
    fn lookup(&self, tool_name: &str) -> Option<Rc<ToolConfig>>;
}

/// Merges raw descriptors with UI annotations into cached `ToolConfig`s.
pub struct ToolRegistry {
    descriptors: IndexMap<String, Value>,
    annotations: IndexMap<String, ToolAnnotations>,
    cache: RefCell<HashMap<String, Rc<ToolConfig>>>,
}

impl ToolRegistry {
    pub fn new(
        descriptors: IndexMap<String, Value>,
        annotations: IndexMap<String, ToolAnnotations>,
    ) -> Self {
        ToolRegistry {
            descriptors,
            annotations,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Load both catalog files from their JSON text.
    pub fn from_json(descriptors_json: &str, annotations_json: &str) -> Result<Self, RegistryError> {
        let descriptors: IndexMap<String, Value> =
            serde_json::from_str(descriptors_json).map_err(RegistryError::Descriptors)?;
        let annotations: IndexMap<String, ToolAnnotations> =
            serde_json::from_str(annotations_json).map_err(RegistryError::Annotations)?;
        Ok(ToolRegistry::new(descriptors, annotations))
    }

    /// Replace the descriptor set. The only operation that invalidates
    /// cached configs.
    pub fn reload(
        &mut self,
        descriptors: IndexMap<String, Value>,
        annotations: IndexMap<String, ToolAnnotations>,
    ) {
        self.descriptors = descriptors;
        self.annotations = annotations;
        self.cache.borrow_mut().clear();
    }

    pub fn known_tools(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }
}

impl ToolLookup for ToolRegistry {
    fn lookup(&self, tool_name: &str) -> Option<Rc<ToolConfig>> {
        if let Some(cached) = self.cache.borrow().get(tool_name) {
            return Some(Rc::clone(cached));
        }
        let raw = self.descriptors.get(tool_name)?;
        let config = Rc::new(build_config(
            tool_name,
            raw,
            self.annotations.get(tool_name),
        ));
        self.cache
            .borrow_mut()
            .insert(tool_name.to_string(), Rc::clone(&config));
        Some(config)
    }
}
