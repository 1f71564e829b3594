//! Build an [`ElementTree`] from form XML.
//!
//! The extractor is namespace-agnostic: it matches local names only. The
//! first `ChildItems` descendant of the form root holds the top-level
//! elements; each container-typed element holds its children in its own
//! first `ChildItems` descendant. Elements without a `name` attribute are
//! skipped and do not consume a sibling index.

use roxmltree::{Document, Node};
use tracing::debug;

use crate::config::ExtractorConfig;
use crate::error::FormResult;
use crate::tree::{ElementTree, NodeId};

/// Extracts element trees according to an [`ExtractorConfig`].
#[derive(Clone, Debug, Default)]
pub struct FormExtractor {
    config: ExtractorConfig,
}

impl FormExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Parse `xml` and extract the tree of form `form_index`.
    ///
    /// Malformed XML yields an empty tree.
    pub fn extract(&self, xml: &str, form_index: usize) -> ElementTree {
        match self.try_extract(xml, form_index) {
            Ok(tree) => tree,
            Err(err) => {
                debug!(error = %err, "cannot parse form XML");
                ElementTree::with_config(form_index, self.config.clone())
            }
        }
    }

    /// Like [`extract`](Self::extract) but reports malformed XML.
    pub fn try_extract(&self, xml: &str, form_index: usize) -> FormResult<ElementTree> {
        let doc = Document::parse(xml)?;
        Ok(self.extract_from_node(doc.root_element(), form_index))
    }

    /// Extract the tree below an already parsed form root.
    pub fn extract_from_node(&self, form_root: Node<'_, '_>, form_index: usize) -> ElementTree {
        let mut tree = ElementTree::with_config(form_index, self.config.clone());
        let Some(container) = self.child_items_of(form_root) else {
            debug!(form_index, "no ChildItems container found in form");
            return tree;
        };
        for element in container.children().filter(Node::is_element) {
            self.build(&mut tree, element, None);
        }
        debug!(form_index, nodes = tree.len(), "extracted form tree");
        tree
    }

    /// First `ChildItems` strictly below `node`.
    fn child_items_of<'a, 'input>(&self, node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
        node.descendants()
            .skip(1)
            .find(|n| n.is_element() && n.tag_name().name() == self.config.child_items_tag)
    }

    fn build(&self, tree: &mut ElementTree, element: Node<'_, '_>, parent: Option<NodeId>) {
        let element_type = element.tag_name().name();
        let Some(name) = element.attribute("name") else {
            debug!(element_type, "element has no name attribute, skipping");
            return;
        };

        let id = tree.attach(parent, name, element_type, Some(element.range()));
        if !self.config.is_container(element_type) {
            return;
        }
        if let Some(children) = self.child_items_of(element) {
            for child in children.children().filter(Node::is_element) {
                self.build(tree, child, Some(id));
            }
        }
    }
}

/// Extract the tree of form `form_index` with the default configuration.
pub fn extract_form_tree(xml: &str, form_index: usize) -> ElementTree {
    FormExtractor::default().extract(xml, form_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormError;

    const FORM: &str = r#"<Form xmlns="http://v8.1c.ru/8.3/xcf/logform" xmlns:v8="http://v8.1c.ru/8.1/data/core">
  <Attributes/>
  <ChildItems>
    <UsualGroup name="Main" id="1">
      <Title><v8:item><v8:lang>ru</v8:lang><v8:content>Основное</v8:content></v8:item></Title>
      <ChildItems>
        <InputField name="FieldA" id="2"/>
        <InputField id="3"/>
        <LabelField name="FieldB" id="4">
          <ChildItems><InputField name="Hidden" id="9"/></ChildItems>
        </LabelField>
      </ChildItems>
    </UsualGroup>
    <Button id="5"/>
    <Pages name="Tabs" id="6">
      <ChildItems>
        <Page name="First" id="7"/>
      </ChildItems>
    </Pages>
  </ChildItems>
</Form>"#;

    fn described(tree: &ElementTree) -> Vec<(String, String, String)> {
        tree.iter()
            .into_iter()
            .map(|n| (n.name.clone(), n.element_type.clone(), n.path.to_string()))
            .collect()
    }

    #[test]
    fn extracts_nested_elements() {
        let tree = extract_form_tree(FORM, 0);
        let expected = [
            ("Main", "UsualGroup", "forms[0].elements[0]"),
            ("FieldA", "InputField", "forms[0].elements[0].child_items[0]"),
            ("FieldB", "LabelField", "forms[0].elements[0].child_items[1]"),
            ("Tabs", "Pages", "forms[0].elements[1]"),
            ("First", "Page", "forms[0].elements[1].child_items[0]"),
        ]
        .map(|(a, b, c)| (a.to_string(), b.to_string(), c.to_string()));
        assert_eq!(described(&tree), expected.to_vec());
    }

    #[test]
    fn leaf_children_are_not_extracted() {
        let tree = extract_form_tree(FORM, 0);
        assert!(tree.find("Hidden").is_none());
    }

    #[test]
    fn form_index_flows_into_paths() {
        let tree = extract_form_tree(FORM, 2);
        assert_eq!(
            tree.find_element_path("First").map(ToString::to_string).as_deref(),
            Some("forms[2].elements[1].child_items[0]")
        );
    }

    #[test]
    fn source_ranges_point_into_the_xml() {
        let tree = extract_form_tree(FORM, 0);
        let range = tree.find("FieldA").and_then(|n| n.source.clone()).unwrap();
        assert!(FORM[range].starts_with(r#"<InputField name="FieldA""#));
    }

    #[test]
    fn missing_child_items_gives_empty_tree() {
        assert!(extract_form_tree("<Form><Attributes/></Form>", 0).is_empty());
    }

    #[test]
    fn malformed_xml_is_empty_or_error() {
        assert!(extract_form_tree("<Form><ChildItems>", 0).is_empty());
        let err = FormExtractor::default().try_extract("<Form", 0).unwrap_err();
        assert!(matches!(err, FormError::Xml(_)));
    }

    #[test]
    fn custom_container_types() {
        let mut config = ExtractorConfig::default();
        config.container_types.insert("LabelField".to_string());
        let tree = FormExtractor::new(config).extract(FORM, 0);
        assert_eq!(
            tree.find_element_path("Hidden").map(ToString::to_string).as_deref(),
            Some("forms[0].elements[0].child_items[1].child_items[0]")
        );
    }
}
