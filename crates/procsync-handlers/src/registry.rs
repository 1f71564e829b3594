//! Handlers keyed by entity kind.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::attribute::AttributeHandler;
use crate::command::CommandHandler;
use crate::error::{HandlerError, HandlerResult};
use crate::form::FormHandler;
use crate::form_attribute::FormAttributeHandler;
use crate::form_element::FormElementHandler;
use crate::form_parameter::FormParameterHandler;
use crate::handler::EntityHandler;
use crate::tabular_section::TabularSectionHandler;
use crate::template::TemplateHandler;
use crate::value_table::ValueTableHandler;

/// A set of [`EntityHandler`]s addressed by `element_type_name`.
///
/// Iteration is ordered by name, so anything driven by a registry (such as
/// [`diff_documents`](crate::diff_documents)) is deterministic.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<&'static str, Box<dyn EntityHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding a handler for every entity kind of a processor.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(AttributeHandler));
        registry.register(Box::new(TabularSectionHandler));
        registry.register(Box::new(FormHandler));
        registry.register(Box::new(TemplateHandler));
        registry.register(Box::new(CommandHandler));
        registry.register(Box::new(FormElementHandler));
        registry.register(Box::new(FormAttributeHandler));
        registry.register(Box::new(ValueTableHandler));
        registry.register(Box::new(FormParameterHandler));
        registry
    }

    /// The process-wide registry of built-in handlers. Built on first use,
    /// read-only afterwards.
    pub fn global() -> &'static HandlerRegistry {
        static GLOBAL: OnceLock<HandlerRegistry> = OnceLock::new();
        GLOBAL.get_or_init(HandlerRegistry::with_builtin)
    }

    /// Add `handler`, returning the one it replaced.
    pub fn register(&mut self, handler: Box<dyn EntityHandler>) -> Option<Box<dyn EntityHandler>> {
        let name = handler.element_type_name();
        let previous = self.handlers.insert(name, handler);
        if previous.is_some() {
            warn!(handler = name, "replaced registered handler");
        } else {
            debug!(handler = name, "registered handler");
        }
        previous
    }

    pub fn unregister(&mut self, name: &str) -> Option<Box<dyn EntityHandler>> {
        self.handlers.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn EntityHandler> {
        self.handlers.get(name).map(|handler| &**handler)
    }

    /// Like [`get`](Self::get), but an unknown name is an error.
    pub fn require(&self, name: &str) -> HandlerResult<&dyn EntityHandler> {
        self.get(name)
            .ok_or_else(|| HandlerError::UnknownHandler(name.to_string()))
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn EntityHandler> {
        self.handlers.values().map(|handler| &**handler)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handler_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_handlers_sorted_by_name() {
        let registry = HandlerRegistry::with_builtin();
        assert_eq!(
            registry.handler_names(),
            vec![
                "attribute",
                "command",
                "form",
                "form_attribute",
                "form_element",
                "form_parameter",
                "tabular_section",
                "template",
                "value_table",
            ]
        );
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.get("command").map(|h| h.yaml_section()), Some("forms[].commands"));
        assert_eq!(registry.get("template").map(|h| h.yaml_section()), Some("templates"));
    }

    #[test]
    fn register_replaces_and_unregister_removes() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register(Box::new(AttributeHandler)).is_none());
        assert!(registry.register(Box::new(AttributeHandler)).is_some());
        assert_eq!(registry.len(), 1);

        assert!(registry.unregister("attribute").is_some());
        assert!(registry.unregister("attribute").is_none());
        assert!(registry.get("attribute").is_none());
    }

    #[test]
    fn require_reports_unknown_kind() {
        let registry = HandlerRegistry::with_builtin();
        assert!(registry.require("attribute").is_ok());
        let err = registry.require("catalog").err().unwrap();
        assert!(matches!(err, HandlerError::UnknownHandler(ref name) if name == "catalog"));
    }

    #[test]
    fn global_registry_is_shared() {
        let a = HandlerRegistry::global();
        let b = HandlerRegistry::global();
        assert!(std::ptr::eq(a, b));
        assert!(a.get("form_element").is_some_and(|h| h.is_form_level()));
        assert!(a.get("attribute").is_some_and(|h| !h.is_form_level()));
        assert!(a.get("form").is_some_and(|h| !h.is_form_level()));
        assert!(a.get("value_table").is_some_and(|h| h.is_form_level()));
    }
}
