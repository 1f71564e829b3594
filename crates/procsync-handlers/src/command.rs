//! Form commands (`forms[].commands` in the YAML config).

use std::collections::BTreeMap;

use procsync_types::ElementChange;
use procsync_yaml::CommentedMap;
use roxmltree::Node;

use crate::handler::{form_element_references, multilang_change, scalar_change, EntityHandler};
use crate::record::{CommandRecord, EntityRecord};
use crate::xml::{children, descendants, location, multilang, text, Tag};

#[derive(Clone, Copy, Debug, Default)]
pub struct CommandHandler;

impl CommandHandler {
    pub const ELEMENT_TYPE: &'static str = "command";

    pub fn record(&self, element: Node<'_, '_>) -> CommandRecord {
        CommandRecord {
            name: element.attribute("name").unwrap_or("UnknownCommand").to_string(),
            title: multilang(element, "Title"),
            tooltip: multilang(element, "ToolTip"),
            action: descendants(element, Tag::any("Action")).find_map(text).map(str::to_string),
        }
    }
}

impl EntityHandler for CommandHandler {
    fn element_type_name(&self) -> &'static str {
        Self::ELEMENT_TYPE
    }

    fn yaml_section(&self) -> &'static str {
        "forms[].commands"
    }

    fn collect_from_tree<'a, 'input>(&self, root: Node<'a, 'input>) -> BTreeMap<String, Node<'a, 'input>> {
        descendants(root, Tag::form("Commands"))
            .flat_map(|commands| children(commands, Tag::form("Command")))
            .filter_map(|command| Some((command.attribute("name")?.to_string(), command)))
            .collect()
    }

    fn extract_from_xml(&self, element: Node<'_, '_>) -> EntityRecord {
        EntityRecord::Command(self.record(element))
    }

    fn compare_details(&self, name: &str, original: Node<'_, '_>, modified: Node<'_, '_>) -> Vec<ElementChange> {
        let old = self.record(original);
        let new = self.record(modified);
        let at = location(modified);
        let mut changes = Vec::new();
        changes.extend(multilang_change(
            Self::ELEMENT_TYPE,
            name,
            "title",
            format!("{at}/Title"),
            &old.title,
            &new.title,
        ));
        changes.extend(multilang_change(
            Self::ELEMENT_TYPE,
            name,
            "tooltip",
            format!("{at}/ToolTip"),
            &old.tooltip,
            &new.tooltip,
        ));
        changes.extend(scalar_change(
            Self::ELEMENT_TYPE,
            name,
            "action",
            format!("{at}/Action"),
            old.action,
            new.action,
        ));
        changes
    }

    /// Any mention of the name in BSL code, and form elements (buttons)
    /// bound to the command.
    fn find_references(&self, config: &CommentedMap, bsl_code: &str, name: &str) -> Vec<String> {
        let mut references = Vec::new();
        if !bsl_code.is_empty() && bsl_code.contains(name) {
            references.push(format!("BSL code: {name}"));
        }
        references.extend(form_element_references(config, "command", name));
        references
    }
}
