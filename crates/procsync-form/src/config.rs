use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Element types that may hold child elements.
pub const DEFAULT_CONTAINER_TYPES: [&str; 6] = [
    "UsualGroup",
    "CommandBarGroup",
    "Page",
    "Pages",
    "ColumnGroup",
    "FormGroup",
];

/// Configuration for [`crate::FormExtractor`] and the trees it builds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Element types whose children are extracted.
    pub container_types: BTreeSet<String>,
    /// Local name of the element wrapping a container's children.
    pub child_items_tag: String,
}

impl ExtractorConfig {
    pub fn is_container(&self, element_type: &str) -> bool {
        self.container_types.contains(element_type)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            container_types: DEFAULT_CONTAINER_TYPES.iter().map(|t| t.to_string()).collect(),
            child_items_tag: "ChildItems".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_container_set() {
        let config = ExtractorConfig::default();
        assert!(config.is_container("UsualGroup"));
        assert!(config.is_container("Pages"));
        assert!(!config.is_container("InputField"));
        assert_eq!(config.child_items_tag, "ChildItems");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: ExtractorConfig =
            serde_json::from_str(r#"{"container_types": ["Table"]}"#).unwrap();
        assert!(config.is_container("Table"));
        assert!(!config.is_container("UsualGroup"));
        assert_eq!(config.child_items_tag, "ChildItems");
    }
}
