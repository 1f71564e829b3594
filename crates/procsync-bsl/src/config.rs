use serde::{Deserialize, Serialize};

/// Configuration for [`crate::Segmenter`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Pull the `Документация` and `МодульОбъекта` / `ObjectModule` regions
    /// out of the module before looking for procedures.
    pub extract_special_regions: bool,
    /// Log duplicate procedure names at warning level (debug otherwise).
    /// Duplicates are always recorded in [`crate::ModuleSegments::warnings`].
    pub warn_on_duplicates: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            extract_special_regions: true,
            warn_on_duplicates: true,
        }
    }
}
