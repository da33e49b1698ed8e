//! Attribute handlers
//!
//! Provides [`HandlerRegistry`] for attaching per-attribute post-processing
//! to a discovery pass.

use std::collections::HashMap;
use std::fmt;

use carto_coerce::ModelValue;
use carto_path::Location;

/// Post-processing for one model attribute
///
/// Called after coercion with the model attribute name, the canonical value
/// and the location being discovered. Returning `None` removes the attribute
/// from the document.
pub trait AttributeHandler: Send + Sync {
    /// Rewrite or suppress `value`
    fn transform(&self, name: &str, value: ModelValue, location: &Location) -> Option<ModelValue>;
}

impl<F> AttributeHandler for F
where
    F: Fn(&str, ModelValue, &Location) -> Option<ModelValue> + Send + Sync,
{
    fn transform(&self, name: &str, value: ModelValue, location: &Location) -> Option<ModelValue> {
        self(name, value, location)
    }
}

/// Handlers keyed by model attribute name
///
/// Built once before a pass; at most one handler per name.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn AttributeHandler>>,
}

impl HandlerRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any earlier one for `name`
    pub fn register(&mut self, name: impl Into<String>, handler: impl AttributeHandler + 'static) {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    /// Register an already boxed handler for `name`
    pub fn register_boxed(&mut self, name: impl Into<String>, handler: Box<dyn AttributeHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    /// With handler
    #[must_use]
    pub fn with_handler(mut self, name: impl Into<String>, handler: impl AttributeHandler + 'static) -> Self {
        self.register(name, handler);
        self
    }

    /// Handler for `name`
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn AttributeHandler> {
        self.handlers.get(name).map(AsRef::as_ref)
    }

    /// Check if a handler is registered for `name`
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Get number of registered handlers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered attribute names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the handler for `name`, passing `value` through if there is none
    #[must_use]
    pub fn apply(&self, name: &str, value: ModelValue, location: &Location) -> Option<ModelValue> {
        match self.get(name) {
            Some(handler) => handler.transform(name, value, location),
            None => Some(value),
        }
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry").field("handlers", &self.names()).finish()
    }
}
