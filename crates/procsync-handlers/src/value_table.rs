//! Value tables declared among the form attributes (`forms[].value_tables`).

use std::collections::BTreeMap;

use procsync_types::ElementChange;
use procsync_yaml::CommentedMap;
use roxmltree::Node;

use crate::form_attribute::{form_data_type, is_value_table};
use crate::handler::{column_changes, form_element_references, identifier_citations, EntityHandler};
use crate::record::{ColumnRecord, EntityRecord, ValueTableRecord};
use crate::xml::{descendants, Tag};

/// Entity kind used for per-column changes.
pub const COLUMN_ELEMENT_TYPE: &str = "value_table_column";

#[derive(Clone, Copy, Debug, Default)]
pub struct ValueTableHandler;

impl ValueTableHandler {
    pub const ELEMENT_TYPE: &'static str = "value_table";

    pub fn record(&self, element: Node<'_, '_>) -> ValueTableRecord {
        ValueTableRecord {
            name: element.attribute("name").unwrap_or("UnknownValueTable").to_string(),
            columns: columns(element).into_iter().map(|(_, column)| column).collect(),
        }
    }
}

fn columns<'a, 'input>(element: Node<'a, 'input>) -> Vec<(Node<'a, 'input>, ColumnRecord)> {
    descendants(element, Tag::form("Column"))
        .filter_map(|column| {
            let name = column.attribute("name")?;
            Some((
                column,
                ColumnRecord {
                    name: name.to_string(),
                    data_type: form_data_type(column),
                },
            ))
        })
        .collect()
}

impl EntityHandler for ValueTableHandler {
    fn element_type_name(&self) -> &'static str {
        Self::ELEMENT_TYPE
    }

    fn yaml_section(&self) -> &'static str {
        "forms[].value_tables"
    }

    fn collect_from_tree<'a, 'input>(&self, root: Node<'a, 'input>) -> BTreeMap<String, Node<'a, 'input>> {
        descendants(root, Tag::form("Attribute"))
            .filter(|attr| is_value_table(*attr))
            .filter_map(|attr| Some((attr.attribute("name")?.to_string(), attr)))
            .collect()
    }

    fn extract_from_xml(&self, element: Node<'_, '_>) -> EntityRecord {
        EntityRecord::ValueTable(self.record(element))
    }

    /// Column additions, deletions and type changes, named `Table.Column`.
    fn compare_details(&self, name: &str, original: Node<'_, '_>, modified: Node<'_, '_>) -> Vec<ElementChange> {
        column_changes(COLUMN_ELEMENT_TYPE, name, columns(original), columns(modified))
    }

    /// Object and item references in BSL code, and table elements showing
    /// the value table.
    fn find_references(&self, config: &CommentedMap, bsl_code: &str, name: &str) -> Vec<String> {
        let mut references = identifier_citations(bsl_code, &["Объект.", "Object.", "Элементы.", "Items."], name);
        references.extend(form_element_references(config, "value_table", name));
        references
    }
}
