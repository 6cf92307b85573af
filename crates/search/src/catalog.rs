use std::collections::HashSet;

use querykit_protocol::{merge_keywords_by_name, total_score, Keyword, SearchItem, SearchResult};

use crate::boundary::BoundaryMatcher;

/// Scores catalog entries by the supplied keywords found in their text.
#[derive(Clone, Debug)]
pub struct CatalogKeywordMatcher {
    matcher: BoundaryMatcher,
    entries: Vec<SearchItem<String>>,
    /// Minimum summed keyword score for an entry to match (inclusive).
    min_score: i32,
}

impl CatalogKeywordMatcher {
    pub const fn new(matcher: BoundaryMatcher, min_score: i32) -> Self {
        Self {
            matcher,
            entries: Vec::new(),
            min_score,
        }
    }

    pub fn with_entries(
        matcher: BoundaryMatcher,
        entries: impl IntoIterator<Item = SearchItem<String>>,
        min_score: i32,
    ) -> Self {
        let mut catalog = Self::new(matcher, min_score);
        catalog.add_entries(entries);
        catalog
    }

    #[must_use]
    pub fn entries(&self) -> &[SearchItem<String>] {
        &self.entries
    }

    pub fn add_entry(&mut self, entry: SearchItem<String>) {
        self.entries.push(entry);
    }

    pub fn add_entries(&mut self, entries: impl IntoIterator<Item = SearchItem<String>>) {
        self.entries.extend(entries);
    }

    /// Removes every entry equal to `entry`.
    pub fn remove_entry(&mut self, entry: &SearchItem<String>) -> bool {
        let before = self.entries.len();
        self.entries.retain(|candidate| candidate != entry);
        self.entries.len() != before
    }

    pub fn set_entries(&mut self, entries: Vec<SearchItem<String>>) {
        self.entries = entries;
    }

    #[must_use]
    pub const fn min_score(&self) -> i32 {
        self.min_score
    }

    pub fn set_min_score(&mut self, min_score: i32) {
        self.min_score = min_score;
    }

    /// Every matchable entry whose value contains enough of `keywords`.
    ///
    /// Entries with an empty value or a non-positive priority are never
    /// returned. Results keep catalog order.
    #[must_use]
    pub fn find_all(&self, keywords: &[Keyword]) -> Vec<SearchResult<String>> {
        let named: Vec<Keyword> = keywords
            .iter()
            .filter(|keyword| !keyword.name.is_empty())
            .cloned()
            .collect();
        let keywords = merge_keywords_by_name(&named);
        let names: Vec<&str> = keywords.iter().map(|keyword| keyword.name.as_str()).collect();

        let mut results = Vec::new();
        for entry in &self.entries {
            if entry.value.is_empty() || entry.priority <= 0 {
                continue;
            }

            let contained: HashSet<String> = self
                .matcher
                .find_contained_tokens(&entry.value, &names)
                .into_iter()
                .collect();
            let matched: Vec<Keyword> = keywords
                .iter()
                .filter(|keyword| contained.contains(&keyword.name))
                .cloned()
                .collect();

            let score = total_score(&matched);
            if score < self.min_score {
                continue;
            }
            results.push(SearchResult::success(entry.clone(), matched));
        }

        log::debug!(
            "Catalog keyword search: {} of {} entries matched",
            results.len(),
            self.entries.len()
        );
        results
    }
}
