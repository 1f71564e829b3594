//! Language-keyed text bags used for synonyms, tooltips, and titles.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Languages carried by metadata text properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lang {
    Ru,
    Uk,
    En,
}

impl Lang {
    /// All supported languages, in record-key order.
    pub const ALL: [Lang; 3] = [Lang::Ru, Lang::Uk, Lang::En];

    /// The language code used in XML (`<v8:lang>`) and YAML keys.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ru => "ru",
            Self::Uk => "uk",
            Self::En => "en",
        }
    }

    /// Look up a language by its code; unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "ru" => Some(Self::Ru),
            "uk" => Some(Self::Uk),
            "en" => Some(Self::En),
            _ => None,
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A bag of per-language strings.
///
/// Equality is bag equality over the language map, so an empty bag equals
/// an absent property.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultilangText(BTreeMap<Lang, String>);

impl MultilangText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag holding a single language.
    pub fn single(lang: Lang, text: impl Into<String>) -> Self {
        let mut bag = Self::new();
        bag.insert(lang, text);
        bag
    }

    pub fn insert(&mut self, lang: Lang, text: impl Into<String>) {
        self.0.insert(lang, text.into());
    }

    pub fn get(&self, lang: Lang) -> Option<&str> {
        self.0.get(&lang).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Lang, &str)> {
        self.0.iter().map(|(lang, text)| (*lang, text.as_str()))
    }

    /// Languages present in both bags whose texts differ.
    pub fn changed_langs(&self, other: &MultilangText) -> Vec<Lang> {
        self.0
            .iter()
            .filter_map(|(lang, text)| match other.0.get(lang) {
                Some(theirs) if theirs != text => Some(*lang),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for MultilangText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (lang, text) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{lang}:'{text}'")?;
            first = false;
        }
        Ok(())
    }
}

impl FromIterator<(Lang, String)> for MultilangText {
    fn from_iter<I: IntoIterator<Item = (Lang, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
