//! Object attributes (`attributes` in the YAML config).

use std::collections::BTreeMap;

use procsync_types::ElementChange;
use procsync_yaml::CommentedMap;
use roxmltree::Node;

use crate::handler::{form_element_references, multilang_change, object_references, scalar_change, EntityHandler};
use crate::record::{AttributeRecord, DataType, EntityRecord};
use crate::xml::{descendants, has_ancestor, location, multilang, text_at, Tag};

const NAME: [Tag; 2] = [Tag::meta("Properties"), Tag::meta("Name")];
const TYPE: [Tag; 2] = [Tag::meta("Type"), Tag::core("Type")];
const LENGTH: [Tag; 3] = [Tag::meta("Type"), Tag::core("StringQualifiers"), Tag::core("Length")];
const PRECISION: [Tag; 3] = [Tag::meta("Type"), Tag::core("NumberQualifiers"), Tag::core("Precision")];
const SCALE: [Tag; 3] = [Tag::meta("Type"), Tag::core("NumberQualifiers"), Tag::core("Scale")];

#[derive(Clone, Copy, Debug, Default)]
pub struct AttributeHandler;

impl AttributeHandler {
    pub const ELEMENT_TYPE: &'static str = "attribute";

    pub fn record(&self, element: Node<'_, '_>) -> AttributeRecord {
        AttributeRecord {
            name: text_at(element, &NAME).unwrap_or("UnknownAttribute").to_string(),
            data_type: data_type(element),
            synonym: multilang(element, "Synonym"),
            tooltip: multilang(element, "ToolTip"),
            length: number_at(element, &LENGTH),
            precision: number_at(element, &PRECISION),
            scale: number_at(element, &SCALE),
        }
    }
}

pub(crate) fn data_type(element: Node<'_, '_>) -> Option<DataType> {
    text_at(element, &TYPE).map(DataType::normalize)
}

pub(crate) fn number_at(element: Node<'_, '_>, steps: &[Tag]) -> Option<u32> {
    text_at(element, steps).and_then(|t| t.parse().ok())
}

impl EntityHandler for AttributeHandler {
    fn element_type_name(&self) -> &'static str {
        Self::ELEMENT_TYPE
    }

    fn yaml_section(&self) -> &'static str {
        "attributes"
    }

    /// Object attributes only; tabular section columns are left to
    /// [`TabularSectionHandler`](crate::TabularSectionHandler).
    fn collect_from_tree<'a, 'input>(&self, root: Node<'a, 'input>) -> BTreeMap<String, Node<'a, 'input>> {
        descendants(root, Tag::meta("Attribute"))
            .filter(|attr| !has_ancestor(*attr, Tag::meta("TabularSection")))
            .filter_map(|attr| Some((text_at(attr, &NAME)?.to_string(), attr)))
            .collect()
    }

    fn extract_from_xml(&self, element: Node<'_, '_>) -> EntityRecord {
        EntityRecord::Attribute(self.record(element))
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
        changes.extend(multilang_change(
            Self::ELEMENT_TYPE,
            name,
            "synonym",
            format!("{at}/Synonym"),
            &old.synonym,
            &new.synonym,
        ));
        changes.extend(multilang_change(
            Self::ELEMENT_TYPE,
            name,
            "tooltip",
            format!("{at}/ToolTip"),
            &old.tooltip,
            &new.tooltip,
        ));
        for (property, before, after) in [
            ("length", old.length, new.length),
            ("precision", old.precision, new.precision),
            ("scale", old.scale, new.scale),
        ] {
            changes.extend(scalar_change(Self::ELEMENT_TYPE, name, property, format!("{at}/Type"), before, after));
        }
        changes
    }

    fn find_references(&self, config: &CommentedMap, bsl_code: &str, name: &str) -> Vec<String> {
        let mut references = object_references(bsl_code, name);
        references.extend(form_element_references(config, "attribute", name));
        references
    }
}
