//! Procedure- and region-level diff of two BSL modules.
//!
//! Procedures are matched by name and compared on their normalized bodies;
//! regions are only reported when added or deleted. Events come out grouped
//! by kind and sorted by name within each group.

use std::fmt;

use serde::{Deserialize, Serialize};
use similar::TextDiff;
use tracing::debug;

use crate::segmenter::{segment, ModuleSegments};

/// The kind of a [`BslChange`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BslChangeKind {
    ProcedureAdded,
    ProcedureDeleted,
    ProcedureModified,
    RegionAdded,
    RegionDeleted,
}

impl BslChangeKind {
    fn is_procedure(self) -> bool {
        matches!(
            self,
            Self::ProcedureAdded | Self::ProcedureDeleted | Self::ProcedureModified
        )
    }

    fn verb(self) -> &'static str {
        match self {
            Self::ProcedureAdded | Self::RegionAdded => "added",
            Self::ProcedureDeleted | Self::RegionDeleted => "deleted",
            Self::ProcedureModified => "modified",
        }
    }
}

impl fmt::Display for BslChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.is_procedure() { "procedure" } else { "region" };
        write!(f, "{noun}_{}", self.verb())
    }
}

/// One change between two modules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BslChange {
    pub change_type: BslChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_code: Option<String>,
}

impl BslChange {
    fn procedure(
        change_type: BslChangeKind,
        name: &str,
        old_code: Option<&str>,
        new_code: Option<&str>,
    ) -> Self {
        Self {
            change_type,
            procedure_name: Some(name.to_string()),
            region_name: None,
            old_code: old_code.map(str::to_string),
            new_code: new_code.map(str::to_string),
        }
    }

    fn region(change_type: BslChangeKind, name: &str, content: &str) -> Self {
        let content = Some(content.to_string());
        let (old_code, new_code) = match change_type {
            BslChangeKind::RegionAdded => (None, content),
            _ => (content, None),
        };
        Self {
            change_type,
            procedure_name: None,
            region_name: Some(name.to_string()),
            old_code,
            new_code,
        }
    }

    /// The procedure or region name this change is about.
    pub fn name(&self) -> &str {
        self.procedure_name
            .as_deref()
            .or(self.region_name.as_deref())
            .unwrap_or_default()
    }

    /// Unified line diff of the old and new code; empty unless both exist.
    pub fn unified_diff(&self) -> String {
        let (Some(old), Some(new)) = (self.old_code.as_deref(), self.new_code.as_deref()) else {
            return String::new();
        };
        let name = self.name();
        TextDiff::from_lines(old, new)
            .unified_diff()
            .context_radius(3)
            .header(&format!("a/{name}"), &format!("b/{name}"))
            .to_string()
    }
}

impl fmt::Display for BslChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.change_type.is_procedure() {
            "Procedure"
        } else {
            "Region"
        };
        write!(f, "{noun} {}: {}", self.change_type.verb(), self.name())
    }
}

/// The ordered list of changes between two modules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BslDiff {
    pub changes: Vec<BslChange>,
}

impl BslDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    fn of_kind(&self, kind: BslChangeKind) -> impl Iterator<Item = &BslChange> {
        self.changes.iter().filter(move |c| c.change_type == kind)
    }

    pub fn added(&self) -> impl Iterator<Item = &BslChange> {
        self.of_kind(BslChangeKind::ProcedureAdded)
    }

    pub fn deleted(&self) -> impl Iterator<Item = &BslChange> {
        self.of_kind(BslChangeKind::ProcedureDeleted)
    }

    pub fn modified(&self) -> impl Iterator<Item = &BslChange> {
        self.of_kind(BslChangeKind::ProcedureModified)
    }

    /// Old and new full text of a modified procedure.
    pub fn procedure_diff(&self, name: &str) -> Option<(&str, &str)> {
        self.modified()
            .find(|c| c.procedure_name.as_deref() == Some(name))
            .and_then(|c| Some((c.old_code.as_deref()?, c.new_code.as_deref()?)))
    }

    /// Human-readable report grouped by procedure change kind.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "No BSL changes detected.\n".to_string();
        }
        let rule = "=".repeat(70);
        let mut out = format!("{rule}\nDetected {} BSL changes:\n{rule}\n", self.len());
        let groups = [
            ("ADDED PROCEDURES", BslChangeKind::ProcedureAdded),
            ("DELETED PROCEDURES", BslChangeKind::ProcedureDeleted),
            ("MODIFIED PROCEDURES", BslChangeKind::ProcedureModified),
            ("ADDED REGIONS", BslChangeKind::RegionAdded),
            ("DELETED REGIONS", BslChangeKind::RegionDeleted),
        ];
        for (title, kind) in groups {
            let names: Vec<&str> = self.of_kind(kind).map(BslChange::name).collect();
            if names.is_empty() {
                continue;
            }
            out.push_str(&format!("\n{title} ({}):\n{}\n", names.len(), "-".repeat(70)));
            for name in names {
                out.push_str(&format!("  • {name}\n"));
            }
        }
        out.push_str(&format!("\n{rule}\n"));
        out
    }
}

/// Compare two segmentations.
pub fn diff_segments(old: &ModuleSegments, new: &ModuleSegments) -> BslDiff {
    let mut changes = Vec::new();

    for (name, procedure) in &new.procedures {
        if !old.procedures.contains_key(name) {
            debug!(%name, "procedure added");
            changes.push(BslChange::procedure(
                BslChangeKind::ProcedureAdded,
                name,
                None,
                Some(&procedure.full_text),
            ));
        }
    }
    for (name, procedure) in &old.procedures {
        if !new.procedures.contains_key(name) {
            debug!(%name, "procedure deleted");
            changes.push(BslChange::procedure(
                BslChangeKind::ProcedureDeleted,
                name,
                Some(&procedure.full_text),
                None,
            ));
        }
    }
    for (name, before) in &old.procedures {
        let Some(after) = new.procedures.get(name) else {
            continue;
        };
        if before.normalized_body() != after.normalized_body() {
            debug!(%name, "procedure modified");
            changes.push(BslChange::procedure(
                BslChangeKind::ProcedureModified,
                name,
                Some(&before.full_text),
                Some(&after.full_text),
            ));
        }
    }

    for (name, region) in &new.regions {
        if !old.regions.contains_key(name) {
            changes.push(BslChange::region(BslChangeKind::RegionAdded, name, &region.content));
        }
    }
    for (name, region) in &old.regions {
        if !new.regions.contains_key(name) {
            changes.push(BslChange::region(BslChangeKind::RegionDeleted, name, &region.content));
        }
    }

    debug!(changes = changes.len(), "BSL diff complete");
    BslDiff { changes }
}

/// Segment both texts with the default configuration and compare them.
pub fn diff_modules(old: &str, new: &str) -> BslDiff {
    diff_segments(&segment(old), &segment(new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names(diff: &BslDiff, kind: BslChangeKind) -> Vec<String> {
        diff.of_kind(kind).map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn identical_modules_no_changes() {
        let text = "#Область А\nПроцедура П() Х = 1; КонецПроцедуры\n#КонецОбласти";
        let diff = diff_modules(text, text);
        assert!(diff.is_empty());
        assert_eq!(diff.summary(), "No BSL changes detected.\n");
    }

    #[test]
    fn events_are_grouped_then_sorted() {
        let old = "Процедура Б() КонецПроцедуры\nПроцедура Удалена() КонецПроцедуры\nПроцедура Общая() А = 1; КонецПроцедуры";
        let new = "Процедура В() КонецПроцедуры\nПроцедура А() КонецПроцедуры\nПроцедура Б() КонецПроцедуры\nПроцедура Общая() А = 2; КонецПроцедуры";
        let diff = diff_modules(old, new);
        let kinds: Vec<_> = diff.changes.iter().map(|c| c.change_type).collect();
        assert_eq!(
            kinds,
            vec![
                BslChangeKind::ProcedureAdded,
                BslChangeKind::ProcedureAdded,
                BslChangeKind::ProcedureDeleted,
                BslChangeKind::ProcedureModified,
            ]
        );
        assert_eq!(names(&diff, BslChangeKind::ProcedureAdded), vec!["А", "В"]);
        assert_eq!(diff.added().count(), 2);
        assert_eq!(diff.deleted().count(), 1);
        assert_eq!(diff.modified().count(), 1);
    }

    #[test]
    fn region_changes_have_no_modified_event() {
        let old = "#Область Старая\nА = 1;\n#КонецОбласти\n#Область Общая\nБ = 1;\n#КонецОбласти";
        let new = "#Область Общая\nБ = 2;\n#КонецОбласти\n#Region New\n#EndRegion";
        let diff = diff_modules(old, new);
        assert_eq!(diff.len(), 2);
        assert_eq!(diff.changes[0].to_string(), "Region added: New");
        assert_eq!(diff.changes[1].to_string(), "Region deleted: Старая");
        assert_eq!(diff.changes[1].old_code.as_deref(), Some("А = 1;"));
    }

    #[test]
    fn display_and_kind_names() {
        let change = BslChange::procedure(BslChangeKind::ProcedureModified, "Run", Some("a"), Some("b"));
        assert_eq!(change.to_string(), "Procedure modified: Run");
        assert_eq!(change.change_type.to_string(), "procedure_modified");
        assert_eq!(BslChangeKind::RegionDeleted.to_string(), "region_deleted");
    }

    #[test]
    fn serializes_with_snake_case_tags() {
        let change = BslChange::procedure(BslChangeKind::ProcedureAdded, "Run", None, Some("code"));
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["change_type"], "procedure_added");
        assert_eq!(json["procedure_name"], "Run");
        assert!(json.get("old_code").is_none());
    }

    #[test]
    fn unified_diff_of_modified_procedure() {
        let old = "Процедура П()\n    А = 1;\nКонецПроцедуры";
        let new = "Процедура П()\n    А = 2;\nКонецПроцедуры";
        let diff = diff_modules(old, new);
        let text = diff.changes[0].unified_diff();
        assert!(text.contains("--- a/П"));
        assert!(text.contains("-    А = 1;"));
        assert!(text.contains("+    А = 2;"));
        assert_eq!(diff.procedure_diff("П"), Some((old, new)));
        assert!(diff.procedure_diff("Другая").is_none());
    }

    #[test]
    fn summary_lists_groups() {
        let diff = diff_modules("", "Процедура Новая() КонецПроцедуры");
        let summary = diff.summary();
        assert!(summary.contains("Detected 1 BSL changes:"));
        assert!(summary.contains("ADDED PROCEDURES (1):"));
        assert!(summary.contains("  • Новая"));
        assert!(!summary.contains("DELETED"));
    }

    fn module(names: &std::collections::BTreeSet<String>, body: &str) -> String {
        names
            .iter()
            .map(|n| format!("Procedure {n}()\n  {body}\nEndProcedure\n"))
            .collect()
    }

    proptest! {
        #[test]
        fn diff_is_symmetric(
            a in proptest::collection::btree_set("[a-z]{1,6}", 0..6),
            b in proptest::collection::btree_set("[a-z]{1,6}", 0..6),
        ) {
            let (old, new) = (module(&a, "x = 1;"), module(&b, "x = 1;"));
            let forward = diff_modules(&old, &new);
            let backward = diff_modules(&new, &old);
            prop_assert_eq!(
                names(&forward, BslChangeKind::ProcedureAdded),
                names(&backward, BslChangeKind::ProcedureDeleted)
            );
            prop_assert!(diff_modules(&old, &old).is_empty());
        }

        #[test]
        fn diff_is_deterministic(
            a in proptest::collection::btree_set("[a-z]{1,6}", 0..6),
            b in proptest::collection::btree_set("[a-z]{1,6}", 0..6),
        ) {
            let (old, new) = (module(&a, "x = 1;"), module(&b, "x = 2;"));
            let first = serde_json::to_string(&diff_modules(&old, &new)).unwrap();
            let second = serde_json::to_string(&diff_modules(&old, &new)).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
