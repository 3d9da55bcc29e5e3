//! Registry pattern for runtime vector field selection
//!
//! Each field is self-describing, providing its own name and aliases. The registry queries this
//! metadata on registration to build its lookup table, and hands out fresh boxed instances on
//! request. All built-in fields are zero-sized, so `clone_box()` copies no state.

use super::VectorField;
use crate::error::SimulationError;
use std::collections::{BTreeSet, HashMap};

/// Registry of selectable vector fields, keyed by canonical name and alias
pub struct FieldRegistry {
    fields: HashMap<String, Box<dyn VectorField>>,
}

impl FieldRegistry {
    /// Create an empty registry without any pre-registered fields.
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Register all built-in fields.
    pub fn with_standard_fields(mut self) -> Self {
        use super::{GibbsRotation, RigidRotation, UnscaledRigidRotation};

        self.register_field(Box::new(RigidRotation));
        self.register_field(Box::new(UnscaledRigidRotation));
        self.register_field(Box::new(GibbsRotation));

        self
    }

    pub fn with_field(mut self, field: Box<dyn VectorField>) -> Self {
        self.register_field(field);
        self
    }

    pub fn register_field(&mut self, field: Box<dyn VectorField>) {
        for alias in field.aliases() {
            self.fields.insert(alias.to_string(), field.clone_box());
        }
        self.fields.insert(field.name().to_string(), field);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn VectorField>, SimulationError> {
        self.fields
            .get(name)
            .map(|field| field.clone_box())
            .ok_or_else(|| SimulationError::UnknownField {
                name: name.to_string(),
                available: self.list_available().join(", "),
                aliases: self
                    .list_aliases()
                    .into_iter()
                    .map(|(alias, _)| alias)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Sorted canonical names
    pub fn list_available(&self) -> Vec<String> {
        self.fields
            .values()
            .map(|field| field.name().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted `(alias, canonical name)` pairs
    pub fn list_aliases(&self) -> Vec<(String, String)> {
        let mut aliases: Vec<(String, String)> = self
            .fields
            .iter()
            .filter(|(key, field)| key.as_str() != field.name())
            .map(|(key, field)| (key.clone(), field.name().to_string()))
            .collect();

        aliases.sort();
        aliases
    }

    /// Canonical name following `current` in sorted order, wrapping around.
    ///
    /// Aliases resolve to their canonical name first. Returns `None` for an empty registry.
    pub fn next_after(&self, current: &str) -> Option<String> {
        let available = self.list_available();
        let canonical = self
            .fields
            .get(current)
            .map(|field| field.name().to_string())
            .unwrap_or_else(|| current.to_string());

        let next = match available.iter().position(|name| *name == canonical) {
            Some(index) => (index + 1) % available.len(),
            None => 0,
        };

        available.get(next).cloned()
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new().with_standard_fields()
    }
}
