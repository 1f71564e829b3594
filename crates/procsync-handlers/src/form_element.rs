//! Form elements (`forms[].elements`, nested through `child_items`).
//!
//! Unlike the other handlers this one supports nesting: a [`Placement`]
//! with a container path (as produced by the insertion planner) targets a
//! group's `child_items`, and deletion searches the whole element tree of
//! the form.
//!
//! Records carry the element's texts and data path plus the layout
//! properties listed in [`ELEMENT_PROPERTIES`] and an optional font.

use std::collections::BTreeMap;

use procsync_types::{ContainerPath, ElementChange, MultilangText};
use procsync_yaml::{resolve_container_mut, CommentedMap, CommentedSeq, Node as YamlNode};
use roxmltree::Node;
use serde_json::Value;
use tracing::{debug, warn};

use crate::handler::{
    add_named, delete_named, identifier_citations, multilang_change, quoted_citations, scalar_change,
    DeleteOutcome, EntityHandler, Placement,
};
use crate::record::{EntityRecord, FontRecord, FormElementRecord, PropertyValue, ELEMENT_PROPERTIES};
use crate::xml::{children, location, read_multilang, text, Tag};

#[derive(Clone, Copy, Debug, Default)]
pub struct FormElementHandler;

impl FormElementHandler {
    pub const ELEMENT_TYPE: &'static str = "form_element";

    pub fn record(&self, element: Node<'_, '_>) -> FormElementRecord {
        FormElementRecord {
            name: element.attribute("name").unwrap_or("UnknownElement").to_string(),
            element_type: element.tag_name().name().to_string(),
            title: own_multilang(element, "Title"),
            tooltip: own_multilang(element, "ToolTip"),
            input_hint: own_multilang(element, "InputHint"),
            data_path: children(element, Tag::any("DataPath"))
                .next()
                .and_then(text)
                .map(str::to_string),
            properties: layout(element)
                .into_iter()
                .map(|(key, (_, value))| (key.to_string(), value))
                .collect(),
            font: font(element),
        }
    }
}

/// Layout properties set directly on `element`, keyed by YAML key, with the
/// tag each one was read from.
fn layout(element: Node<'_, '_>) -> BTreeMap<&'static str, (&'static str, PropertyValue)> {
    let mut found = BTreeMap::new();
    for property in ELEMENT_PROPERTIES {
        if found.contains_key(property.key) {
            continue;
        }
        let value = children(element, Tag::any(property.tag))
            .next()
            .and_then(|node| node.text())
            .and_then(|raw| property.kind.parse(raw));
        if let Some(value) = value {
            found.insert(property.key, (property.tag, value));
        }
    }
    found
}

/// The element's own `Font`, `None` when absent or carrying nothing.
fn font(element: Node<'_, '_>) -> Option<FontRecord> {
    let node = children(element, Tag::any("Font")).next()?;
    let flag = |attribute: &str| node.attribute(attribute).is_some_and(|v| v.eq_ignore_ascii_case("true"));
    let number = |attribute: &str| -> Option<i64> { node.attribute(attribute).and_then(|v| v.trim().parse().ok()) };
    let record = FontRecord {
        bold: flag("bold"),
        italic: flag("italic"),
        size: number("height"),
        face_name: node.attribute("faceName").filter(|v| !v.is_empty()).map(str::to_string),
        scale: number("scale"),
    };
    (!record.is_empty()).then_some(record)
}

/// Property read from a direct child only, so a group never reports the
/// title of one of its children.
fn own_multilang(element: Node<'_, '_>, property: &'static str) -> MultilangText {
    children(element, Tag::any(property))
        .next()
        .map(read_multilang)
        .unwrap_or_default()
}

fn is_form_element(node: &Node<'_, '_>) -> bool {
    node.is_element()
        && node.attribute("name").is_some()
        && node
            .parent_element()
            .is_some_and(|parent| parent.tag_name().name() == "ChildItems")
}

fn elements_mut(config: &mut CommentedMap, form_index: usize) -> Option<&mut CommentedSeq> {
    config
        .get_mut("forms")?
        .as_seq_mut()?
        .get_mut(form_index)?
        .as_map_mut()?
        .get_mut("elements")?
        .as_seq_mut()
}

fn children_mut(element: &mut YamlNode) -> Option<&mut CommentedSeq> {
    element.as_map_mut()?.get_mut("child_items")?.as_seq_mut()
}

/// Whether an element named `name` exists anywhere below `seq`.
fn contains_name(seq: &CommentedSeq, name: &str) -> bool {
    seq.iter().filter_map(YamlNode::as_map).any(|element| {
        element.get_str("name") == Some(name)
            || element
                .get("child_items")
                .and_then(YamlNode::as_seq)
                .is_some_and(|children| contains_name(children, name))
    })
}

/// Remove the first element named `name`, searching depth-first.
fn delete_nested(seq: &mut CommentedSeq, name: &str) -> Option<YamlNode> {
    if let Some(removed) = delete_named(seq, name) {
        return Some(removed);
    }
    for index in 0..seq.len() {
        let Some(children) = seq.get_mut(index).and_then(children_mut) else {
            continue;
        };
        if let Some(removed) = delete_nested(children, name) {
            return Some(removed);
        }
    }
    None
}

/// Citations of the children of every element named `name`, in any form.
fn nested_elements(config: &CommentedMap, name: &str) -> Vec<String> {
    fn scan(seq: &CommentedSeq, container: &ContainerPath, name: &str, found: &mut Vec<String>) {
        for (index, element) in seq.iter().enumerate() {
            let Some(map) = element.as_map() else {
                continue;
            };
            let path = container.element(index);
            let Some(kids) = map.get("child_items").and_then(YamlNode::as_seq) else {
                continue;
            };
            let inner = ContainerPath::children_of(path);
            if map.get_str("name") == Some(name) {
                for (child, kid) in kids.iter().enumerate() {
                    found.push(format!(
                        "Form element: {} (name={}) is nested in {name}",
                        inner.element(child),
                        kid.as_map().and_then(|m| m.get_str("name")).unwrap_or_default()
                    ));
                }
            }
            scan(kids, &inner, name, found);
        }
    }

    let mut found = Vec::new();
    let forms = config.get("forms").and_then(YamlNode::as_seq);
    for (form_index, form) in forms.into_iter().flat_map(|forms| forms.iter()).enumerate() {
        if let Some(elements) = form.as_map().and_then(|f| f.get("elements")).and_then(YamlNode::as_seq) {
            scan(elements, &ContainerPath::top_level(form_index), name, &mut found);
        }
    }
    found
}

impl EntityHandler for FormElementHandler {
    fn element_type_name(&self) -> &'static str {
        Self::ELEMENT_TYPE
    }

    fn yaml_section(&self) -> &'static str {
        "forms[].elements"
    }

    /// Named elements whose parent is a `ChildItems` block, at any depth.
    fn collect_from_tree<'a, 'input>(&self, root: Node<'a, 'input>) -> BTreeMap<String, Node<'a, 'input>> {
        root.descendants()
            .filter(is_form_element)
            .filter_map(|element| Some((element.attribute("name")?.to_string(), element)))
            .collect()
    }

    fn extract_from_xml(&self, element: Node<'_, '_>) -> EntityRecord {
        EntityRecord::FormElement(self.record(element))
    }

    fn compare_details(&self, name: &str, original: Node<'_, '_>, modified: Node<'_, '_>) -> Vec<ElementChange> {
        let old = self.record(original);
        let new = self.record(modified);
        let at = location(modified);
        let mut changes = Vec::new();

        if old.element_type != new.element_type {
            changes.push(
                ElementChange::type_change(Self::ELEMENT_TYPE, name, old.element_type, new.element_type)
                    .with_location(at.clone()),
            );
        }
        changes.extend(scalar_change(
            Self::ELEMENT_TYPE,
            name,
            "data_path",
            format!("{at}/DataPath"),
            old.data_path,
            new.data_path,
        ));
        for (property, tag, before, after) in [
            ("title", "Title", &old.title, &new.title),
            ("tooltip", "ToolTip", &old.tooltip, &new.tooltip),
            ("input_hint", "InputHint", &old.input_hint, &new.input_hint),
        ] {
            changes.extend(multilang_change(
                Self::ELEMENT_TYPE,
                name,
                property,
                format!("{at}/{tag}"),
                before,
                after,
            ));
        }

        let (old_layout, new_layout) = (layout(original), layout(modified));
        let mut seen = Vec::new();
        for property in ELEMENT_PROPERTIES {
            if seen.contains(&property.key) {
                continue;
            }
            seen.push(property.key);
            let before = old_layout.get(property.key);
            let after = new_layout.get(property.key);
            let tag = after.or(before).map_or(property.tag, |(tag, _)| *tag);
            changes.extend(scalar_change(
                Self::ELEMENT_TYPE,
                name,
                property.key,
                format!("{at}/{tag}"),
                before.map(|(_, value)| value.clone()),
                after.map(|(_, value)| value.clone()),
            ));
        }

        if old.font != new.font {
            let value = |font: Option<FontRecord>| font.and_then(|f| serde_json::to_value(f).ok()).unwrap_or(Value::Null);
            changes.push(
                ElementChange::property_change(Self::ELEMENT_TYPE, name, "font", value(old.font), value(new.font))
                    .with_location(format!("{at}/Font")),
            );
        }
        changes
    }

    /// Inserts into `placement.container` when set, else into the form's
    /// top-level elements. Names must be unique across the whole form.
    fn add_to_yaml(&self, config: &mut CommentedMap, record: &EntityRecord, placement: &Placement) -> bool {
        if record.kind() != Self::ELEMENT_TYPE {
            warn!(handler = Self::ELEMENT_TYPE, record = record.kind(), "record kind mismatch");
            return false;
        }
        if elements_mut(config, placement.form_index).is_some_and(|top| contains_name(top, record.name())) {
            debug!(name = record.name(), form = placement.form_index, "element already present in form");
            return false;
        }
        let target = match &placement.container {
            Some(container) => resolve_container_mut(config, container),
            None => self.section_mut(config, placement, true),
        };
        let Some(seq) = target else {
            warn!(form = placement.form_index, container = ?placement.container, "container not reachable");
            return false;
        };
        add_named(seq, record, placement.index)
    }

    fn delete_from_yaml(&self, config: &mut CommentedMap, name: &str, form_index: usize, force: bool) -> DeleteOutcome {
        if !force {
            let references = self.find_references(config, "", name);
            if !references.is_empty() {
                return DeleteOutcome::Referenced(references);
            }
        }
        match elements_mut(config, form_index).and_then(|top| delete_nested(top, name)) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        }
    }

    /// Citations in BSL code (`Элементы.<name>`, `Items.<name>` and the
    /// quoted name), plus the elements nested under `name` in the config:
    /// deleting a group takes its children with it.
    fn find_references(&self, config: &CommentedMap, bsl_code: &str, name: &str) -> Vec<String> {
        let mut references = identifier_citations(bsl_code, &["Элементы.", "Items."], name);
        references.extend(quoted_citations(bsl_code, name));
        references.extend(nested_elements(config, name));
        references
    }
}
