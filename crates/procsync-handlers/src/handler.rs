//! The [`EntityHandler`] capability set and the YAML plumbing shared by
//! every handler.

use std::collections::BTreeMap;

use procsync_types::{ContainerPath, ElementChange, MultilangText};
use procsync_yaml::{delete_item, insert_item, CommentedMap, CommentedSeq, Node};
use regex::Regex;
use roxmltree::Node as XmlNode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::record::{ColumnRecord, EntityRecord};
use crate::xml::location;

/// Prefix of `yaml_section` values that live inside each form.
pub const FORM_SECTION_PREFIX: &str = "forms[].";

/// Where [`EntityHandler::add_to_yaml`] should put a new entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    /// Form to edit, for form-level handlers.
    pub form_index: usize,
    /// Target sequence for handlers that support nesting; the handler's own
    /// section when `None`.
    pub container: Option<ContainerPath>,
    /// Insert position; appended when `None` or out of range.
    pub index: Option<usize>,
}

impl Placement {
    pub fn in_form(form_index: usize) -> Self {
        Self {
            form_index,
            ..Self::default()
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn within(mut self, container: ContainerPath) -> Self {
        self.form_index = container.form_index();
        self.container = Some(container);
        self
    }
}

/// Result of [`EntityHandler::delete_from_yaml`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// Refused because the entity is still referenced; carries the citations.
    Referenced(Vec<String>),
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}

/// Extraction, diff and YAML editing for one entity kind.
///
/// Handlers are stateless; one instance serves every document.
pub trait EntityHandler: Send + Sync {
    /// Entity kind, e.g. `attribute`. Used as the registry key and as
    /// `element_type` of the changes the handler emits.
    fn element_type_name(&self) -> &'static str;

    /// YAML section holding the entities: a top-level key such as
    /// `attributes`, or `forms[].<key>` for form-level entities.
    fn yaml_section(&self) -> &'static str;

    fn is_form_level(&self) -> bool {
        self.yaml_section().starts_with(FORM_SECTION_PREFIX)
    }

    /// Entities under `root`, keyed by name. Later duplicates win.
    fn collect_from_tree<'a, 'input>(
        &self,
        root: XmlNode<'a, 'input>,
    ) -> BTreeMap<String, XmlNode<'a, 'input>>;

    /// The semantic record of one entity element.
    fn extract_from_xml(&self, element: XmlNode<'_, '_>) -> EntityRecord;

    /// Property-level changes between two versions of the entity `name`.
    fn compare_details(
        &self,
        name: &str,
        original: XmlNode<'_, '_>,
        modified: XmlNode<'_, '_>,
    ) -> Vec<ElementChange>;

    /// Human-readable citations of `name` in BSL code and in the config.
    fn find_references(&self, config: &CommentedMap, bsl_code: &str, name: &str) -> Vec<String>;

    /// The sequence this handler edits, created when `create` is set.
    fn section_mut<'c>(
        &self,
        config: &'c mut CommentedMap,
        placement: &Placement,
        create: bool,
    ) -> Option<&'c mut CommentedSeq> {
        let section = self.yaml_section();
        match section.strip_prefix(FORM_SECTION_PREFIX) {
            Some(key) => {
                let form = config
                    .get_mut("forms")?
                    .as_seq_mut()?
                    .get_mut(placement.form_index)?
                    .as_map_mut()?;
                seq_in(form, key, create)
            }
            None => seq_in(config, section, create),
        }
    }

    /// Insert `record` into the handler's section.
    ///
    /// Refuses records of another kind and names already present.
    fn add_to_yaml(&self, config: &mut CommentedMap, record: &EntityRecord, placement: &Placement) -> bool {
        if record.kind() != self.element_type_name() {
            warn!(handler = self.element_type_name(), record = record.kind(), "record kind mismatch");
            return false;
        }
        let Some(seq) = self.section_mut(config, placement, true) else {
            warn!(section = self.yaml_section(), form = placement.form_index, "section not reachable");
            return false;
        };
        add_named(seq, record, placement.index)
    }

    /// Remove the entity `name`.
    ///
    /// Without `force`, entities still cited by [`find_references`] (with no
    /// BSL code, so only config references count) are kept.
    ///
    /// [`find_references`]: EntityHandler::find_references
    fn delete_from_yaml(
        &self,
        config: &mut CommentedMap,
        name: &str,
        form_index: usize,
        force: bool,
    ) -> DeleteOutcome {
        if !force {
            let references = self.find_references(config, "", name);
            if !references.is_empty() {
                warn!(name, count = references.len(), "entity is referenced, not deleting");
                return DeleteOutcome::Referenced(references);
            }
        }
        let placement = Placement::in_form(form_index);
        match self
            .section_mut(config, &placement, false)
            .and_then(|seq| delete_named(seq, name))
        {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        }
    }
}

fn seq_in<'c>(map: &'c mut CommentedMap, key: &str, create: bool) -> Option<&'c mut CommentedSeq> {
    if !create && !map.contains_key(key) {
        return None;
    }
    map.seq_entry(key)
}

/// Insert `record` into `seq` unless its name is taken.
pub fn add_named(seq: &mut CommentedSeq, record: &EntityRecord, index: Option<usize>) -> bool {
    if seq.position_by_name(record.name()).is_some() {
        debug!(name = record.name(), "entry already present");
        return false;
    }
    let at = index.filter(|i| *i <= seq.len()).unwrap_or(seq.len());
    insert_item(seq, at, record.to_node());
    debug!(name = record.name(), index = at, "added entry");
    true
}

/// Remove the entry named `name`, re-attaching its comment to the next one.
pub fn delete_named(seq: &mut CommentedSeq, name: &str) -> Option<Node> {
    let index = seq.position_by_name(name)?;
    delete_item(seq, &index, true)
}

/// Citations of `<prefix><name>` in BSL code, one per prefix found.
///
/// The name must end at an identifier boundary, so `Объект.TotalSum` does
/// not cite `Total`. An empty prefix cites the bare name, which then also
/// needs a boundary in front.
pub fn identifier_citations(bsl_code: &str, prefixes: &[&str], name: &str) -> Vec<String> {
    if bsl_code.is_empty() || name.is_empty() {
        return Vec::new();
    }
    prefixes
        .iter()
        .filter(|prefix| {
            let lead = if prefix.is_empty() { r"(?:^|\W)" } else { "" };
            let pattern = format!(r"{lead}{}{}(?:\W|$)", regex::escape(prefix), regex::escape(name));
            Regex::new(&pattern).is_ok_and(|re| re.is_match(bsl_code))
        })
        .map(|prefix| format!("BSL code: {prefix}{name}"))
        .collect()
}

/// Citations of the name as a string literal, in either quote style.
pub fn quoted_citations(bsl_code: &str, name: &str) -> Vec<String> {
    [format!("\"{name}\""), format!("'{name}'")]
        .into_iter()
        .filter(|pattern| bsl_code.contains(pattern.as_str()))
        .map(|pattern| format!("BSL code: {pattern}"))
        .collect()
}

/// Citations of `Объект.<name>` / `Object.<name>` in BSL code.
pub fn object_references(bsl_code: &str, name: &str) -> Vec<String> {
    identifier_citations(bsl_code, &["Объект.", "Object."], name)
}

/// Additions, deletions and type changes between two column lists, named
/// `<owner>.<column>` and each group sorted by column name. Deleted columns
/// are located in the original document, the rest in the modified one.
pub fn column_changes(
    element_type: &str,
    owner: &str,
    original: Vec<(XmlNode<'_, '_>, ColumnRecord)>,
    modified: Vec<(XmlNode<'_, '_>, ColumnRecord)>,
) -> Vec<ElementChange> {
    let before: BTreeMap<String, _> = original.into_iter().map(|(n, c)| (c.name.clone(), (n, c))).collect();
    let after: BTreeMap<String, _> = modified.into_iter().map(|(n, c)| (c.name.clone(), (n, c))).collect();
    let value = |column: &ColumnRecord| serde_json::to_value(column).unwrap_or(Value::Null);
    let mut changes = Vec::new();

    for (column, (node, record)) in &after {
        if !before.contains_key(column) {
            changes.push(
                ElementChange::added(element_type, &format!("{owner}.{column}"))
                    .with_values(None, Some(value(record)))
                    .with_location(location(*node)),
            );
        }
    }
    for (column, (node, record)) in &before {
        if !after.contains_key(column) {
            changes.push(
                ElementChange::deleted(element_type, &format!("{owner}.{column}"))
                    .with_values(Some(value(record)), None)
                    .with_location(location(*node)),
            );
        }
    }
    for (column, (node, record)) in &after {
        let Some((_, previous)) = before.get(column) else {
            continue;
        };
        if previous.data_type != record.data_type {
            changes.push(
                ElementChange::type_change(
                    element_type,
                    &format!("{owner}.{column}"),
                    previous.data_type.clone().map(String::from),
                    record.data_type.clone().map(String::from),
                )
                .with_location(format!("{}/Type", location(*node))),
            );
        }
    }
    changes
}

/// Citations of form elements (at any depth) whose `key` entry equals `name`.
pub fn form_element_references(config: &CommentedMap, key: &str, name: &str) -> Vec<String> {
    let mut found = Vec::new();
    let Some(forms) = config.get("forms").and_then(Node::as_seq) else {
        return found;
    };
    for (form_index, form) in forms.iter().enumerate() {
        let Some(elements) = form.as_map().and_then(|f| f.get("elements")).and_then(Node::as_seq) else {
            continue;
        };
        let top = ContainerPath::top_level(form_index);
        scan_elements(elements, &top, key, name, &mut found);
    }
    found
}

fn scan_elements(seq: &CommentedSeq, container: &ContainerPath, key: &str, name: &str, found: &mut Vec<String>) {
    for (index, element) in seq.iter().enumerate() {
        let Some(map) = element.as_map() else {
            continue;
        };
        let path = container.element(index);
        if map.get_str(key) == Some(name) {
            found.push(format!(
                "Form element: {path} (name={})",
                map.get_str("name").unwrap_or_default()
            ));
        }
        if let Some(children) = map.get("child_items").and_then(Node::as_seq) {
            scan_elements(children, &ContainerPath::children_of(path), key, name, found);
        }
    }
}

/// JSON rendering of a language bag, keyed by language code.
pub fn multilang_value(text: &MultilangText) -> Value {
    Value::Object(
        text.iter()
            .map(|(lang, value)| (lang.code().to_string(), Value::from(value)))
            .collect(),
    )
}

/// A `property_change` when two language bags differ. Empty equals absent.
pub fn multilang_change(
    element_type: &str,
    name: &str,
    property: &str,
    location: String,
    old: &MultilangText,
    new: &MultilangText,
) -> Option<ElementChange> {
    (old != new).then(|| {
        ElementChange::property_change(element_type, name, property, multilang_value(old), multilang_value(new))
            .with_location(location)
    })
}

/// A `property_change` when two optional scalars differ.
pub fn scalar_change<T>(
    element_type: &str,
    name: &str,
    property: &str,
    location: String,
    old: Option<T>,
    new: Option<T>,
) -> Option<ElementChange>
where
    T: PartialEq + Into<Value>,
{
    (old != new).then(|| ElementChange::property_change(element_type, name, property, old, new).with_location(location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AttributeRecord, CommandRecord};
    use procsync_yaml::{get_comment, set_comment, CommentPosition};

    const CONFIG: &str = "\
attributes:
  - name: A
  - name: B
forms:
  - name: Form
    elements:
      - name: Group
        child_items:
          - name: FieldB
            attribute: B
      - name: FieldA
        attribute: A
";

    fn attribute(name: &str) -> EntityRecord {
        EntityRecord::Attribute(AttributeRecord {
            name: name.to_string(),
            ..AttributeRecord::default()
        })
    }

    #[test]
    fn add_named_refuses_duplicates_and_clamps_index() {
        let mut config = Node::map_from_yaml_str(CONFIG).unwrap();
        let seq = config.seq_entry("attributes").unwrap();
        assert!(!add_named(seq, &attribute("A"), None));
        assert!(add_named(seq, &attribute("C"), Some(99)));
        assert!(add_named(seq, &attribute("Z"), Some(0)));
        let names: Vec<_> = seq.iter().filter_map(|n| n.as_map()?.get_str("name")).collect();
        assert_eq!(names, vec!["Z", "A", "B", "C"]);
    }

    #[test]
    fn delete_named_moves_comment_to_successor() {
        let mut config = Node::map_from_yaml_str(CONFIG).unwrap();
        let seq = config.seq_entry("attributes").unwrap();
        set_comment(seq, &0, "first attribute", CommentPosition::Before);
        assert!(delete_named(seq, "A").is_some());
        assert!(get_comment(seq, &0).is_some());
        assert!(delete_named(seq, "missing").is_none());
    }

    #[test]
    fn finds_nested_form_references() {
        let config = Node::map_from_yaml_str(CONFIG).unwrap();
        assert_eq!(
            form_element_references(&config, "attribute", "B"),
            vec!["Form element: forms[0].elements[0].child_items[0] (name=FieldB)"]
        );
        assert_eq!(
            form_element_references(&config, "attribute", "A"),
            vec!["Form element: forms[0].elements[1] (name=FieldA)"]
        );
        assert!(form_element_references(&config, "command", "A").is_empty());
    }

    #[test]
    fn object_reference_patterns() {
        let code = "Объект.Total = 1; Object.Total = 2; Объект.TotalSum = 3;";
        assert_eq!(
            object_references(code, "Total"),
            vec!["BSL code: Объект.Total", "BSL code: Object.Total"]
        );
        assert!(object_references("Total = 1;", "Total").is_empty());
    }

    #[test]
    fn citations_stop_at_identifier_boundary() {
        assert!(object_references("Объект.TotalSum = 3;", "Total").is_empty());
        assert!(object_references("Объект.Итоговый = 1;", "Итог").is_empty());
        assert_eq!(object_references("x = Object.Total", "Total"), vec!["BSL code: Object.Total"]);
        assert_eq!(identifier_citations("Run();", &[""], "Run"), vec!["BSL code: Run"]);
        assert!(identifier_citations("RunAll();", &[""], "Run").is_empty());
        assert!(identifier_citations("DoRun();", &[""], "Run").is_empty());
        assert_eq!(
            quoted_citations("Найти(\"Total\"); Найти('Total');", "Total"),
            vec!["BSL code: \"Total\"", "BSL code: 'Total'"]
        );
    }

    #[test]
    fn placement_builders() {
        let container: ContainerPath = "forms[2].elements[0].child_items".parse().unwrap();
        let placement = Placement::in_form(0).at(3).within(container.clone());
        assert_eq!(placement.form_index, 2);
        assert_eq!(placement.index, Some(3));
        assert_eq!(placement.container, Some(container));
        assert!(DeleteOutcome::Deleted.is_deleted());
        assert!(!DeleteOutcome::Referenced(vec![]).is_deleted());
        let _ = EntityRecord::Command(CommandRecord::default());
    }

    #[test]
    fn empty_bag_equals_absent() {
        let empty = MultilangText::new();
        assert!(multilang_change("attribute", "A", "synonym", "/A".into(), &empty, &MultilangText::default()).is_none());

        let ru = MultilangText::single(procsync_types::Lang::Ru, "Итого");
        let change = multilang_change("attribute", "A", "synonym", "/A/Synonym".into(), &empty, &ru).unwrap();
        assert_eq!(change.new_value, Some(serde_json::json!({"ru": "Итого"})));
        assert_eq!(change.old_value, Some(serde_json::json!({})));
        assert_eq!(change.location.as_deref(), Some("/A/Synonym"));
    }

    #[test]
    fn scalar_change_only_on_difference() {
        assert!(scalar_change("attribute", "A", "length", "/A".into(), Some(10u32), Some(10u32)).is_none());
        let change = scalar_change("attribute", "A", "length", "/A".into(), Some(10u32), None).unwrap();
        assert_eq!(change.old_value, Some(serde_json::json!(10)));
        assert_eq!(change.new_value, Some(Value::Null));
    }
}
