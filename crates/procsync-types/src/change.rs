//! Typed element-level change records.
//!
//! An [`ElementChange`] is emitted by the form-tree differ (structure) and by
//! the entity handlers (semantic properties). Both share one record shape so
//! consumers can apply them uniformly.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of an element-level change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Deleted,
    Moved,
    TypeChange,
    PropertyChange,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Added => "added",
            Self::Deleted => "deleted",
            Self::Moved => "moved",
            Self::TypeChange => "type_change",
            Self::PropertyChange => "property_change",
        };
        f.write_str(s)
    }
}

/// A single change to a named element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementChange {
    pub change_type: ChangeKind,
    /// Entity kind the change belongs to (`attribute`, `form_element`, ...).
    pub element_type: String,
    pub element_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    /// Location of the element (element path or XML location).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_index: Option<usize>,
    #[serde(default)]
    pub depth: usize,
}

impl ElementChange {
    fn bare(change_type: ChangeKind, element_type: &str, element_name: &str) -> Self {
        Self {
            change_type,
            element_type: element_type.to_string(),
            element_name: element_name.to_string(),
            property_name: None,
            old_value: None,
            new_value: None,
            location: None,
            old_parent: None,
            new_parent: None,
            old_index: None,
            new_index: None,
            depth: 0,
        }
    }

    /// An element present only on the modified side.
    pub fn added(element_type: &str, element_name: &str) -> Self {
        Self::bare(ChangeKind::Added, element_type, element_name)
    }

    /// An element present only on the original side.
    pub fn deleted(element_type: &str, element_name: &str) -> Self {
        Self::bare(ChangeKind::Deleted, element_type, element_name)
    }

    /// An element that changed parent or sibling position.
    pub fn moved(element_type: &str, element_name: &str) -> Self {
        Self::bare(ChangeKind::Moved, element_type, element_name)
    }

    /// The element's data type changed.
    pub fn type_change(
        element_type: &str,
        element_name: &str,
        old: impl Into<Value>,
        new: impl Into<Value>,
    ) -> Self {
        let mut change = Self::bare(ChangeKind::TypeChange, element_type, element_name);
        change.property_name = Some("type".to_string());
        change.old_value = Some(old.into());
        change.new_value = Some(new.into());
        change
    }

    /// A named property of the element changed.
    pub fn property_change(
        element_type: &str,
        element_name: &str,
        property: &str,
        old: impl Into<Value>,
        new: impl Into<Value>,
    ) -> Self {
        let mut change = Self::bare(ChangeKind::PropertyChange, element_type, element_name);
        change.property_name = Some(property.to_string());
        change.old_value = Some(old.into());
        change.new_value = Some(new.into());
        change
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_values(mut self, old: Option<Value>, new: Option<Value>) -> Self {
        self.old_value = old;
        self.new_value = new;
        self
    }

    pub fn with_parents(mut self, old: Option<String>, new: Option<String>) -> Self {
        self.old_parent = old;
        self.new_parent = new;
        self
    }

    pub fn with_indices(mut self, old: Option<usize>, new: Option<usize>) -> Self {
        self.old_index = old;
        self.new_index = new;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }
}

/// Render a JSON value without quoting plain strings.
fn plain(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

impl fmt::Display for ElementChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = &self.element_type;
        let name = &self.element_name;
        match self.change_type {
            ChangeKind::Added => write!(f, "{kind} added: '{name}'"),
            ChangeKind::Deleted => write!(f, "{kind} deleted: '{name}'"),
            ChangeKind::Moved => write!(
                f,
                "{kind} '{name}' moved: {} → {}",
                self.old_parent.as_deref().unwrap_or("(root)"),
                self.new_parent.as_deref().unwrap_or("(root)"),
            ),
            ChangeKind::TypeChange => write!(
                f,
                "{kind} '{name}' type changed: {} → {}",
                plain(&self.old_value),
                plain(&self.new_value),
            ),
            ChangeKind::PropertyChange => write!(
                f,
                "{kind} '{name}' property '{}' changed: '{}' → '{}'",
                self.property_name.as_deref().unwrap_or("?"),
                plain(&self.old_value),
                plain(&self.new_value),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_change_sets_property_and_values() {
        let change = ElementChange::type_change("attribute", "Total", "string", "number");
        assert_eq!(change.change_type, ChangeKind::TypeChange);
        assert_eq!(change.property_name.as_deref(), Some("type"));
        assert_eq!(change.old_value, Some(json!("string")));
        assert_eq!(change.new_value, Some(json!("number")));
        assert_eq!(
            change.to_string(),
            "attribute 'Total' type changed: string → number"
        );
    }

    #[test]
    fn display_formats() {
        assert_eq!(
            ElementChange::added("command", "Run").to_string(),
            "command added: 'Run'"
        );
        let moved = ElementChange::moved("form_element", "FieldX")
            .with_parents(Some("GroupA".into()), Some("GroupB".into()));
        assert_eq!(
            moved.to_string(),
            "form_element 'FieldX' moved: GroupA → GroupB"
        );
        let prop = ElementChange::property_change("attribute", "A", "synonym", "x", "y");
        assert_eq!(
            prop.to_string(),
            "attribute 'A' property 'synonym' changed: 'x' → 'y'"
        );
    }

    #[test]
    fn serializes_snake_case_and_skips_absent_fields() {
        let change = ElementChange::deleted("tabular_section", "Goods").with_location("/Goods");
        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["change_type"], json!("deleted"));
        assert_eq!(value["location"], json!("/Goods"));
        assert!(value.get("old_value").is_none());

        let back: ElementChange = serde_json::from_value(value).unwrap();
        assert_eq!(back, change);
    }
}
