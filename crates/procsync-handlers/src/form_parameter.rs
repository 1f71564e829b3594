//! Form parameters (`forms[].parameters` in the YAML config).

use std::collections::BTreeMap;

use procsync_types::ElementChange;
use procsync_yaml::CommentedMap;
use roxmltree::Node;

use crate::form_attribute::form_data_type;
use crate::handler::{identifier_citations, multilang_change, quoted_citations, scalar_change, EntityHandler};
use crate::record::{EntityRecord, FormParameterRecord};
use crate::xml::{children, descendants, location, multilang, text, Tag};

#[derive(Clone, Copy, Debug, Default)]
pub struct FormParameterHandler;

impl FormParameterHandler {
    pub const ELEMENT_TYPE: &'static str = "form_parameter";

    pub fn record(&self, element: Node<'_, '_>) -> FormParameterRecord {
        FormParameterRecord {
            name: element.attribute("name").unwrap_or("UnknownParameter").to_string(),
            data_type: form_data_type(element),
            key_parameter: key_parameter(element),
            synonym: multilang(element, "Synonym"),
        }
    }
}

fn key_parameter(element: Node<'_, '_>) -> bool {
    descendants(element, Tag::any("KeyParameter"))
        .next()
        .and_then(text)
        .is_some_and(|t| t.eq_ignore_ascii_case("true"))
}

impl EntityHandler for FormParameterHandler {
    fn element_type_name(&self) -> &'static str {
        Self::ELEMENT_TYPE
    }

    fn yaml_section(&self) -> &'static str {
        "forms[].parameters"
    }

    /// `Parameters/Parameter` in the form namespace, or in any namespace
    /// when the form declares none there.
    fn collect_from_tree<'a, 'input>(&self, root: Node<'a, 'input>) -> BTreeMap<String, Node<'a, 'input>> {
        let named = |tag: Tag| {
            descendants(root, Tag { local: "Parameters", ..tag })
                .flat_map(move |list| children(list, tag))
                .filter_map(|p| Some((p.attribute("name")?.to_string(), p)))
                .collect::<BTreeMap<_, _>>()
        };
        let found = named(Tag::form("Parameter"));
        if found.is_empty() {
            named(Tag::any("Parameter"))
        } else {
            found
        }
    }

    fn extract_from_xml(&self, element: Node<'_, '_>) -> EntityRecord {
        EntityRecord::FormParameter(self.record(element))
    }

    fn compare_details(&self, name: &str, original: Node<'_, '_>, modified: Node<'_, '_>) -> Vec<ElementChange> {
        let old = self.record(original);
        let new = self.record(modified);
        let at = location(modified);
        let mut changes = Vec::new();

        if old.data_type != new.data_type {
            changes.push(
                ElementChange::type_change(
                    Self::ELEMENT_TYPE,
                    name,
                    old.data_type.map(String::from),
                    new.data_type.map(String::from),
                )
                .with_location(format!("{at}/Type")),
            );
        }
        changes.extend(scalar_change(
            Self::ELEMENT_TYPE,
            name,
            "key_parameter",
            format!("{at}/KeyParameter"),
            Some(old.key_parameter),
            Some(new.key_parameter),
        ));
        changes.extend(multilang_change(
            Self::ELEMENT_TYPE,
            name,
            "synonym",
            format!("{at}/Synonym"),
            &old.synonym,
            &new.synonym,
        ));
        changes
    }

    fn find_references(&self, _config: &CommentedMap, bsl_code: &str, name: &str) -> Vec<String> {
        let mut references = identifier_citations(bsl_code, &["Параметры.", "Parameters."], name);
        references.extend(quoted_citations(bsl_code, name));
        references
    }
}
