//! Processor forms (`forms` in the YAML config).
//!
//! Only the form's own metadata is handled here: its name and synonym.
//! Contents of a form belong to the form-level handlers.

use std::collections::BTreeMap;

use procsync_types::ElementChange;
use procsync_yaml::CommentedMap;
use roxmltree::Node;

use crate::handler::{multilang_change, EntityHandler};
use crate::record::{EntityRecord, FormRecord};
use crate::xml::{descendants, location, multilang, text, Tag};

/// BSL calls that open a form by name.
const OPEN_CALLS: [&str; 2] = ["ОткрытьФорму", "OpenForm"];

#[derive(Clone, Copy, Debug, Default)]
pub struct FormHandler;

impl FormHandler {
    pub const ELEMENT_TYPE: &'static str = "form";

    pub fn record(&self, element: Node<'_, '_>) -> FormRecord {
        FormRecord {
            name: name(element).unwrap_or("UnknownForm").to_string(),
            synonym: multilang(element, "Synonym"),
        }
    }
}

fn name<'a>(element: Node<'a, '_>) -> Option<&'a str> {
    descendants(element, Tag::meta("Name")).next().and_then(text)
}

impl EntityHandler for FormHandler {
    fn element_type_name(&self) -> &'static str {
        Self::ELEMENT_TYPE
    }

    fn yaml_section(&self) -> &'static str {
        "forms"
    }

    /// Form metadata objects; bare `<Form>Name</Form>` child references of
    /// the processor carry no `Name` and are skipped.
    fn collect_from_tree<'a, 'input>(&self, root: Node<'a, 'input>) -> BTreeMap<String, Node<'a, 'input>> {
        descendants(root, Tag::meta("Form"))
            .filter_map(|form| Some((name(form)?.to_string(), form)))
            .collect()
    }

    fn extract_from_xml(&self, element: Node<'_, '_>) -> EntityRecord {
        EntityRecord::Form(self.record(element))
    }

    fn compare_details(&self, name: &str, original: Node<'_, '_>, modified: Node<'_, '_>) -> Vec<ElementChange> {
        let old = self.record(original);
        let new = self.record(modified);
        multilang_change(
            Self::ELEMENT_TYPE,
            name,
            "synonym",
            format!("{}/Synonym", location(modified)),
            &old.synonym,
            &new.synonym,
        )
        .into_iter()
        .collect()
    }

    /// Calls opening the form by name, in either quote style.
    fn find_references(&self, _config: &CommentedMap, bsl_code: &str, name: &str) -> Vec<String> {
        OPEN_CALLS
            .iter()
            .flat_map(|call| [format!("{call}(\"{name}\""), format!("{call}('{name}'")])
            .filter(|pattern| bsl_code.contains(pattern.as_str()))
            .map(|pattern| format!("BSL code: {pattern}"))
            .collect()
    }
}
