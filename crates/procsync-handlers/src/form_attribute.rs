//! Plain form attributes (`forms[].form_attributes` in the YAML config).
//!
//! The main object attribute and value tables are declared the same way in
//! form XML but are left out here; value tables have their own handler.

use std::collections::BTreeMap;

use procsync_types::ElementChange;
use procsync_yaml::CommentedMap;
use roxmltree::Node;

use crate::handler::{form_element_references, identifier_citations, EntityHandler};
use crate::record::{DataType, EntityRecord, FormAttributeRecord};
use crate::xml::{descendants, location, text, Tag};

/// Names the main object attribute goes by.
const OBJECT_NAMES: [&str; 2] = ["Object", "Объект"];

#[derive(Clone, Copy, Debug, Default)]
pub struct FormAttributeHandler;

impl FormAttributeHandler {
    pub const ELEMENT_TYPE: &'static str = "form_attribute";

    pub fn record(&self, element: Node<'_, '_>) -> FormAttributeRecord {
        FormAttributeRecord {
            name: element.attribute("name").unwrap_or("UnknownFormAttr").to_string(),
            data_type: form_data_type(element),
        }
    }
}

/// Raw text of the first `v8:Type` below `element`, e.g. `v8:ValueTable`.
pub(crate) fn raw_type<'a>(element: Node<'a, '_>) -> Option<&'a str> {
    descendants(element, Tag::core("Type")).next().and_then(text)
}

pub(crate) fn form_data_type(element: Node<'_, '_>) -> Option<DataType> {
    raw_type(element).map(DataType::normalize)
}

pub(crate) fn is_value_table(element: Node<'_, '_>) -> bool {
    raw_type(element).is_some_and(|t| t.contains("ValueTable"))
}

impl EntityHandler for FormAttributeHandler {
    fn element_type_name(&self) -> &'static str {
        Self::ELEMENT_TYPE
    }

    fn yaml_section(&self) -> &'static str {
        "forms[].form_attributes"
    }

    fn collect_from_tree<'a, 'input>(&self, root: Node<'a, 'input>) -> BTreeMap<String, Node<'a, 'input>> {
        descendants(root, Tag::form("Attribute"))
            .filter(|attr| !is_value_table(*attr))
            .filter_map(|attr| {
                let name = attr.attribute("name")?;
                (!OBJECT_NAMES.contains(&name)).then(|| (name.to_string(), attr))
            })
            .collect()
    }

    fn extract_from_xml(&self, element: Node<'_, '_>) -> EntityRecord {
        EntityRecord::FormAttribute(self.record(element))
    }

    fn compare_details(&self, name: &str, original: Node<'_, '_>, modified: Node<'_, '_>) -> Vec<ElementChange> {
        let old = self.record(original);
        let new = self.record(modified);
        if old.data_type == new.data_type {
            return Vec::new();
        }
        vec![ElementChange::type_change(
            Self::ELEMENT_TYPE,
            name,
            old.data_type.map(String::from),
            new.data_type.map(String::from),
        )
        .with_location(format!("{}/Type", location(modified)))]
    }

    /// The bare name anywhere in BSL code, and form elements bound to it.
    fn find_references(&self, config: &CommentedMap, bsl_code: &str, name: &str) -> Vec<String> {
        let mut references = identifier_citations(bsl_code, &[""], name);
        references.extend(form_element_references(config, "attribute", name));
        references
    }
}
