//! Entity-level diff of two metadata documents, driven by handlers.

use procsync_types::ElementChange;
use roxmltree::{Document, Node};
use tracing::debug;

use crate::error::HandlerResult;
use crate::handler::EntityHandler;
use crate::registry::HandlerRegistry;
use crate::xml::location;

/// Changes to the entities `handler` finds under two roots.
///
/// Entities are matched by name. Additions come first, then deletions
/// (each sorted by name, carrying the full record as the new or old value),
/// then the property-level changes of every common name in name order.
pub fn diff_entities(handler: &dyn EntityHandler, original: Node<'_, '_>, modified: Node<'_, '_>) -> Vec<ElementChange> {
    let kind = handler.element_type_name();
    let before = handler.collect_from_tree(original);
    let after = handler.collect_from_tree(modified);
    let record_value = |element| serde_json::to_value(handler.extract_from_xml(element)).ok();

    let mut changes = Vec::new();
    for (name, element) in after.iter().filter(|(name, _)| !before.contains_key(*name)) {
        changes.push(
            ElementChange::added(kind, name)
                .with_values(None, record_value(*element))
                .with_location(location(*element)),
        );
    }
    for (name, element) in before.iter().filter(|(name, _)| !after.contains_key(*name)) {
        changes.push(
            ElementChange::deleted(kind, name)
                .with_values(record_value(*element), None)
                .with_location(location(*element)),
        );
    }
    for (name, old) in &before {
        if let Some(new) = after.get(name) {
            changes.extend(handler.compare_details(name, *old, *new));
        }
    }

    debug!(
        handler = kind,
        original = before.len(),
        modified = after.len(),
        changes = changes.len(),
        "diffed entities"
    );
    changes
}

/// Parse two metadata documents and diff them with every handler in
/// `registry`, in handler-name order.
pub fn diff_documents(registry: &HandlerRegistry, original: &str, modified: &str) -> HandlerResult<Vec<ElementChange>> {
    let before = Document::parse(original)?;
    let after = Document::parse(modified)?;
    let changes: Vec<ElementChange> = registry
        .iter()
        .flat_map(|handler| diff_entities(handler, before.root(), after.root()))
        .collect();
    debug!(handlers = registry.len(), changes = changes.len(), "diffed documents");
    Ok(changes)
}
