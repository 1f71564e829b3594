//! Bilingual keyword table.
//!
//! BSL accepts every keyword in its native spelling and in English, in any
//! letter case. Recognition patterns are assembled from this table rather
//! than spelled inline, so adding a spelling touches one place.

/// One keyword with its native and English spellings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keyword {
    pub native: &'static str,
    pub english: &'static str,
}

impl Keyword {
    const fn new(native: &'static str, english: &'static str) -> Self {
        Self { native, english }
    }

    /// Case-insensitive match against either spelling.
    pub fn matches(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        word == self.native.to_lowercase() || word == self.english.to_lowercase()
    }

    fn spellings(&self) -> [&'static str; 2] {
        [self.native, self.english]
    }
}

pub const PROCEDURE: Keyword = Keyword::new("Процедура", "Procedure");
pub const FUNCTION: Keyword = Keyword::new("Функция", "Function");
pub const END_PROCEDURE: Keyword = Keyword::new("КонецПроцедуры", "EndProcedure");
pub const END_FUNCTION: Keyword = Keyword::new("КонецФункции", "EndFunction");
pub const EXPORT: Keyword = Keyword::new("Экспорт", "Export");
pub const ASYNC: Keyword = Keyword::new("Асинх", "Async");
pub const REGION: Keyword = Keyword::new("Область", "Region");
pub const END_REGION: Keyword = Keyword::new("КонецОбласти", "EndRegion");

/// Reserved label of the documentation region.
pub const DOCUMENTATION_LABELS: &[&str] = &["Документация"];

/// Reserved labels of the region holding object-module code.
pub const OBJECT_MODULE_LABELS: &[&str] = &[
    "МодульОбъекта",
    "МодульОб'єкта",
    "МодульОбєкта",
    "ObjectModule",
];

/// Regex alternation over every spelling of `keywords`, escaped.
pub fn alternation(keywords: &[Keyword]) -> String {
    keywords
        .iter()
        .flat_map(Keyword::spellings)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|")
}

/// Regex alternation over literal labels, escaped.
pub fn label_alternation(labels: &[&str]) -> String {
    labels
        .iter()
        .map(|label| regex::escape(label))
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_either_spelling_in_any_case() {
        assert!(PROCEDURE.matches("процедура"));
        assert!(PROCEDURE.matches("PROCEDURE"));
        assert!(END_FUNCTION.matches("КОНЕЦФУНКЦИИ"));
        assert!(!FUNCTION.matches("Процедура"));
    }

    #[test]
    fn alternation_lists_all_spellings() {
        assert_eq!(
            alternation(&[PROCEDURE, FUNCTION]),
            "Процедура|Procedure|Функция|Function"
        );
    }

    #[test]
    fn labels_are_escaped() {
        assert_eq!(label_alternation(&["a.b", "c"]), r"a\.b|c");
    }
}
