//! Tabular sections (`tabular_sections` in the YAML config) and their columns.

use std::collections::BTreeMap;

use procsync_types::{ElementChange, MultilangText};
use procsync_yaml::CommentedMap;
use roxmltree::Node;

use crate::attribute::data_type;
use crate::handler::{column_changes, form_element_references, multilang_change, object_references, EntityHandler};
use crate::record::{ColumnRecord, EntityRecord, TabularSectionRecord};
use crate::xml::{children, descendants, location, read_multilang, text_at, Tag};

const NAME: [Tag; 2] = [Tag::meta("Properties"), Tag::meta("Name")];

/// Entity kind used for per-column changes.
pub const COLUMN_ELEMENT_TYPE: &str = "tabular_section_column";

#[derive(Clone, Copy, Debug, Default)]
pub struct TabularSectionHandler;

impl TabularSectionHandler {
    pub const ELEMENT_TYPE: &'static str = "tabular_section";

    pub fn record(&self, element: Node<'_, '_>) -> TabularSectionRecord {
        let properties = children(element, Tag::meta("Properties")).next();
        let own = |property| properties.map(|props| own_multilang(props, property)).unwrap_or_default();
        TabularSectionRecord {
            name: text_at(element, &NAME).unwrap_or("UnknownTS").to_string(),
            synonym: own("Synonym"),
            tooltip: own("ToolTip"),
            columns: columns(element).into_iter().map(|(_, column)| column).collect(),
        }
    }
}

/// A section property from its own `Properties` block, never a column's.
fn own_multilang(properties: Node<'_, '_>, property: &'static str) -> MultilangText {
    children(properties, Tag::meta(property))
        .next()
        .map(read_multilang)
        .unwrap_or_default()
}

/// Columns in document order, each with its XML element.
fn columns<'a, 'input>(element: Node<'a, 'input>) -> Vec<(Node<'a, 'input>, ColumnRecord)> {
    descendants(element, Tag::meta("Attribute"))
        .filter_map(|column| {
            let name = text_at(column, &NAME)?;
            Some((
                column,
                ColumnRecord {
                    name: name.to_string(),
                    data_type: data_type(column),
                },
            ))
        })
        .collect()
}

impl EntityHandler for TabularSectionHandler {
    fn element_type_name(&self) -> &'static str {
        Self::ELEMENT_TYPE
    }

    fn yaml_section(&self) -> &'static str {
        "tabular_sections"
    }

    fn collect_from_tree<'a, 'input>(&self, root: Node<'a, 'input>) -> BTreeMap<String, Node<'a, 'input>> {
        descendants(root, Tag::meta("TabularSection"))
            .filter_map(|ts| Some((text_at(ts, &NAME)?.to_string(), ts)))
            .collect()
    }

    fn extract_from_xml(&self, element: Node<'_, '_>) -> EntityRecord {
        EntityRecord::TabularSection(self.record(element))
    }

    /// Synonym and tooltip changes on the section, then column additions,
    /// deletions and type changes (named `Section.Column`), each sorted by
    /// column name.
    fn compare_details(&self, name: &str, original: Node<'_, '_>, modified: Node<'_, '_>) -> Vec<ElementChange> {
        let old = self.record(original);
        let new = self.record(modified);
        let at = location(modified);
        let mut changes = Vec::new();
        for (property, tag, before, after) in [
            ("synonym", "Synonym", &old.synonym, &new.synonym),
            ("tooltip", "ToolTip", &old.tooltip, &new.tooltip),
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
        changes.extend(column_changes(
            COLUMN_ELEMENT_TYPE,
            name,
            columns(original),
            columns(modified),
        ));
        changes
    }

    /// BSL object references, plus form elements bound to the section
    /// (tables carry it as their `attribute` or `tabular_section`).
    fn find_references(&self, config: &CommentedMap, bsl_code: &str, name: &str) -> Vec<String> {
        let mut references = object_references(bsl_code, name);
        references.extend(form_element_references(config, "attribute", name));
        references.extend(form_element_references(config, "tabular_section", name));
        references
    }
}
