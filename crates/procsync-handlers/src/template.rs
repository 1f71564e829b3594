//! Processor templates (`templates` in the YAML config).

use std::collections::BTreeMap;

use procsync_types::ElementChange;
use procsync_yaml::{CommentedMap, Node as YamlNode};
use roxmltree::Node;

use crate::handler::{form_element_references, multilang_change, EntityHandler};
use crate::record::{EntityRecord, TemplateRecord};
use crate::xml::{children, descendants, location, multilang, text, text_at, Tag};

const NAME: [Tag; 2] = [Tag::meta("Properties"), Tag::meta("Name")];
const TEMPLATE_TYPE: [Tag; 2] = [Tag::meta("Properties"), Tag::meta("TemplateType")];

/// BSL calls that fetch a template by name.
const GET_CALLS: [&str; 2] = ["ПолучитьМакет", "GetTemplate"];

#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateHandler;

impl TemplateHandler {
    pub const ELEMENT_TYPE: &'static str = "template";

    pub fn record(&self, element: Node<'_, '_>) -> TemplateRecord {
        TemplateRecord {
            name: name(element).unwrap_or("UnknownTemplate").to_string(),
            template_type: template_type(element).map(str::to_string),
            synonym: multilang(element, "Synonym"),
        }
    }
}

/// `Properties/Name`, or a bare `Name` child.
fn name<'a>(element: Node<'a, '_>) -> Option<&'a str> {
    text_at(element, &NAME).or_else(|| children(element, Tag::meta("Name")).next().and_then(text))
}

fn template_type<'a>(element: Node<'a, '_>) -> Option<&'a str> {
    text_at(element, &TEMPLATE_TYPE)
}

/// Form element generated for a template flagged `auto_field`.
fn auto_field(config: &CommentedMap, name: &str) -> Option<String> {
    let template = config
        .get("templates")
        .and_then(YamlNode::as_seq)?
        .iter()
        .filter_map(YamlNode::as_map)
        .find(|t| t.get_str("name") == Some(name))?;
    if template.get("auto_field").and_then(YamlNode::as_bool) != Some(true) {
        return None;
    }
    let field = template
        .get_str("field_name")
        .map_or_else(|| format!("{name}Field"), str::to_string);
    Some(format!("Auto-generated form element: {field} (auto_field=true)"))
}

impl EntityHandler for TemplateHandler {
    fn element_type_name(&self) -> &'static str {
        Self::ELEMENT_TYPE
    }

    fn yaml_section(&self) -> &'static str {
        "templates"
    }

    fn collect_from_tree<'a, 'input>(&self, root: Node<'a, 'input>) -> BTreeMap<String, Node<'a, 'input>> {
        descendants(root, Tag::meta("Template"))
            .filter_map(|template| Some((name(template)?.to_string(), template)))
            .collect()
    }

    fn extract_from_xml(&self, element: Node<'_, '_>) -> EntityRecord {
        EntityRecord::Template(self.record(element))
    }

    fn compare_details(&self, name: &str, original: Node<'_, '_>, modified: Node<'_, '_>) -> Vec<ElementChange> {
        let old = self.record(original);
        let new = self.record(modified);
        let at = location(modified);
        let mut changes = Vec::new();

        if old.template_type != new.template_type {
            changes.push(
                ElementChange::type_change(Self::ELEMENT_TYPE, name, old.template_type, new.template_type)
                    .with_location(format!("{at}/TemplateType")),
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
        changes
    }

    /// Template fetches and string literals in BSL code, the generated
    /// field of an `auto_field` template, and form elements showing it.
    fn find_references(&self, config: &CommentedMap, bsl_code: &str, name: &str) -> Vec<String> {
        let mut patterns: Vec<String> = GET_CALLS
            .iter()
            .flat_map(|call| [format!("{call}(\"{name}\")"), format!("{call}('{name}')")])
            .collect();
        patterns.push(format!("\"{name}\""));

        let mut references: Vec<String> = patterns
            .into_iter()
            .filter(|pattern| bsl_code.contains(pattern.as_str()))
            .map(|pattern| format!("BSL code: {pattern}"))
            .collect();
        references.extend(auto_field(config, name));
        references.extend(form_element_references(config, "template", name));
        references
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{DeleteOutcome, Placement};
    use procsync_types::ChangeKind;
    use roxmltree::Document;
    use serde_json::json;

    fn template(template_type: &str) -> String {
        format!(
            r#"<MetaDataObject xmlns="http://v8.1c.ru/8.3/MDClasses" xmlns:v8="http://v8.1c.ru/8.1/data/core">
  <Template>
    <Properties>
      <Name>Invoice</Name>
      <Synonym><v8:item><v8:lang>en</v8:lang><v8:content>Invoice</v8:content></v8:item></Synonym>
      <TemplateType>{template_type}</TemplateType>
    </Properties>
  </Template>
  <Template><Name>Legacy</Name></Template>
</MetaDataObject>"#
        )
    }

    #[test]
    fn collects_named_templates() {
        let xml = template("SpreadsheetDocument");
        let doc = Document::parse(&xml).unwrap();
        let found = TemplateHandler.collect_from_tree(doc.root());
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["Invoice", "Legacy"]);

        let record = TemplateHandler.record(found["Invoice"]);
        assert_eq!(record.template_type.as_deref(), Some("SpreadsheetDocument"));
        assert_eq!(TemplateHandler.record(found["Legacy"]).template_type, None);
    }

    #[test]
    fn template_type_change_is_located() {
        let (before, after) = (template("SpreadsheetDocument"), template("TextDocument"));
        let (a, b) = (Document::parse(&before).unwrap(), Document::parse(&after).unwrap());
        let old = TemplateHandler.collect_from_tree(a.root())["Invoice"];
        let new = TemplateHandler.collect_from_tree(b.root())["Invoice"];

        let changes = TemplateHandler.compare_details("Invoice", old, new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type, ChangeKind::TypeChange);
        assert_eq!(changes[0].new_value, Some(json!("TextDocument")));
        assert_eq!(
            changes[0].location.as_deref(),
            Some("/MetaDataObject/Template[1]/TemplateType")
        );
    }

    #[test]
    fn fetch_calls_and_literals_are_cited() {
        let config = CommentedMap::new();
        let code = "Макет = ПолучитьМакет(\"Invoice\");\nT = GetTemplate('Invoice');";
        assert_eq!(
            TemplateHandler.find_references(&config, code, "Invoice"),
            vec![
                "BSL code: ПолучитьМакет(\"Invoice\")",
                "BSL code: GetTemplate('Invoice')",
                "BSL code: \"Invoice\"",
            ]
        );
    }

    #[test]
    fn auto_field_template_is_not_deleted_without_force() {
        let mut config = YamlNode::map_from_yaml_str(
            "templates:\n  - name: Report\n    auto_field: true\n  - name: Plain\n",
        )
        .unwrap();
        assert_eq!(
            TemplateHandler.delete_from_yaml(&mut config, "Report", 0, false),
            DeleteOutcome::Referenced(vec![
                "Auto-generated form element: ReportField (auto_field=true)".to_string()
            ])
        );
        assert!(TemplateHandler.delete_from_yaml(&mut config, "Plain", 0, false).is_deleted());
        assert!(TemplateHandler.delete_from_yaml(&mut config, "Report", 0, true).is_deleted());

        let record = EntityRecord::Template(TemplateRecord {
            name: "Report".to_string(),
            template_type: Some("SpreadsheetDocument".to_string()),
            ..TemplateRecord::default()
        });
        assert!(TemplateHandler.add_to_yaml(&mut config, &record, &Placement::default()));
        let templates = config.get("templates").and_then(YamlNode::as_seq).unwrap();
        let entry = templates.get(0).and_then(YamlNode::as_map).unwrap();
        assert_eq!(entry.get_str("type"), Some("SpreadsheetDocument"));
    }
}
