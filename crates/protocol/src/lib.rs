use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod synonym;

pub use synonym::SynonymGroup;

pub const DEFAULT_KEYWORD_SCORE: i32 = 1;

const fn default_score() -> i32 {
    DEFAULT_KEYWORD_SCORE
}

/// A named keyword with the score it contributes to a match.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Keyword {
    pub name: String,
    #[serde(default = "default_score")]
    pub score: i32,
}

impl Keyword {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: DEFAULT_KEYWORD_SCORE,
        }
    }

    pub fn with_score(name: impl Into<String>, score: i32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

impl Default for Keyword {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// A catalog entry: a value, the keywords describing it and its priority.
///
/// Entries with `priority <= 0` never match.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(from = "SearchItemRecord<T>")]
pub struct SearchItem<T> {
    pub value: T,
    keywords: Vec<Keyword>,
    pub priority: i32,
}

#[derive(Deserialize)]
struct SearchItemRecord<T> {
    value: T,
    #[serde(default)]
    keywords: Vec<Keyword>,
    #[serde(default)]
    priority: i32,
}

impl<T> From<SearchItemRecord<T>> for SearchItem<T> {
    fn from(record: SearchItemRecord<T>) -> Self {
        Self::with_keywords(record.value, record.keywords, record.priority)
    }
}

impl<T> SearchItem<T> {
    pub const fn new(value: T, priority: i32) -> Self {
        Self {
            value,
            keywords: Vec::new(),
            priority,
        }
    }

    pub fn with_keywords(
        value: T,
        keywords: impl IntoIterator<Item = Keyword>,
        priority: i32,
    ) -> Self {
        let mut item = Self::new(value, priority);
        item.add_keywords(keywords);
        item
    }

    #[must_use]
    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    /// Appends a keyword; keywords without a name are ignored.
    pub fn add_keyword(&mut self, keyword: Keyword) -> bool {
        if keyword.name.is_empty() {
            return false;
        }
        self.keywords.push(keyword);
        true
    }

    pub fn add_keywords(&mut self, keywords: impl IntoIterator<Item = Keyword>) {
        for keyword in keywords {
            self.add_keyword(keyword);
        }
    }

    pub fn remove_keyword(&mut self, keyword: &Keyword) -> bool {
        match self.keywords.iter().position(|k| k == keyword) {
            Some(idx) => {
                self.keywords.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn remove_keywords_by_name(&mut self, name: &str) {
        self.keywords.retain(|keyword| keyword.name != name);
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Success,
    #[default]
    Empty,
}

/// Outcome of a single match. Built once per call and read through accessors.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SearchResult<T> {
    status: SearchStatus,
    match_score: i32,
    item: Option<SearchItem<T>>,
    #[serde(default)]
    matched_keywords: Vec<Keyword>,
}

impl<T> SearchResult<T> {
    pub const fn new(
        status: SearchStatus,
        item: Option<SearchItem<T>>,
        match_score: i32,
        matched_keywords: Vec<Keyword>,
    ) -> Self {
        Self {
            status,
            match_score,
            item,
            matched_keywords,
        }
    }

    /// Successful match; the score is the sum of the matched keyword scores.
    pub fn success(item: SearchItem<T>, matched_keywords: Vec<Keyword>) -> Self {
        let match_score = total_score(&matched_keywords);
        Self::new(
            SearchStatus::Success,
            Some(item),
            match_score,
            matched_keywords,
        )
    }

    /// No match; optionally carries a fallback item with zero score.
    pub const fn empty(item: Option<SearchItem<T>>) -> Self {
        Self::new(SearchStatus::Empty, item, 0, Vec::new())
    }

    #[must_use]
    pub const fn status(&self) -> SearchStatus {
        self.status
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == SearchStatus::Success
    }

    #[must_use]
    pub const fn match_score(&self) -> i32 {
        self.match_score
    }

    #[must_use]
    pub const fn item(&self) -> Option<&SearchItem<T>> {
        self.item.as_ref()
    }

    #[must_use]
    pub fn matched_keywords(&self) -> &[Keyword] {
        &self.matched_keywords
    }

    #[must_use]
    pub fn into_item(self) -> Option<SearchItem<T>> {
        self.item
    }
}

impl<T> Default for SearchResult<T> {
    fn default() -> Self {
        Self::empty(None)
    }
}

#[must_use]
pub fn total_score(keywords: &[Keyword]) -> i32 {
    keywords.iter().map(|keyword| keyword.score).sum()
}

/// Keeps the first keyword of every distinct name, in first-appearance order.
#[must_use]
pub fn merge_keywords_by_name(keywords: &[Keyword]) -> Vec<Keyword> {
    let mut seen = HashSet::new();
    keywords
        .iter()
        .filter(|keyword| seen.insert(keyword.name.as_str()))
        .cloned()
        .collect()
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keyword_defaults_to_score_one() {
        let keyword: Keyword = serde_json::from_str(r#"{"name":"unit"}"#).unwrap();
        assert_eq!(keyword, Keyword::with_score("unit", 1));
    }

    #[test]
    fn deserialized_items_drop_unnamed_keywords() {
        let item: SearchItem<String> = serde_json::from_str(
            r#"{"value":"adobe","keywords":[{"name":""},{"name":"adobe","score":2}]}"#,
        )
        .unwrap();
        assert_eq!(item.keywords(), &[Keyword::with_score("adobe", 2)]);
        assert_eq!(item.priority, 0);
    }

    #[test]
    fn search_item_ignores_unnamed_keywords() {
        let mut item = SearchItem::new("x".to_string(), 1);
        assert!(!item.add_keyword(Keyword::new("")));
        assert!(item.add_keyword(Keyword::new("a")));
        item.add_keywords(vec![Keyword::new("b"), Keyword::new("a")]);
        assert_eq!(item.keywords().len(), 3);

        item.remove_keywords_by_name("a");
        assert_eq!(item.keywords(), &[Keyword::new("b")]);
        assert!(item.remove_keyword(&Keyword::new("b")));
        assert!(!item.remove_keyword(&Keyword::new("b")));
    }

    #[test]
    fn merge_keeps_first_keyword_per_name() {
        let merged = merge_keywords_by_name(&[
            Keyword::with_score("a", 2),
            Keyword::new("b"),
            Keyword::with_score("a", 5),
        ]);
        assert_eq!(merged, vec![Keyword::with_score("a", 2), Keyword::new("b")]);
    }

    #[test]
    fn success_sums_matched_scores() {
        let item = SearchItem::new(7u32, 1);
        let result = SearchResult::success(
            item,
            vec![Keyword::with_score("a", 2), Keyword::with_score("b", 3)],
        );
        assert!(result.is_success());
        assert_eq!(result.match_score(), 5);
        assert_eq!(result.item().map(|item| item.value), Some(7));
    }

    #[test]
    fn default_result_is_empty() {
        let result: SearchResult<String> = SearchResult::default();
        assert_eq!(result.status(), SearchStatus::Empty);
        assert_eq!(result.match_score(), 0);
        assert!(result.item().is_none());
        assert!(result.matched_keywords().is_empty());
    }

    #[test]
    fn status_serializes_snake_case() {
        let raw = serialize_json(&SearchStatus::Success).unwrap();
        assert_eq!(raw, "\"success\"");
    }
}
