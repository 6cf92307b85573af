use std::collections::HashSet;

use querykit_protocol::{Keyword, SearchItem, SearchResult};

use crate::boundary::BoundaryMatcher;

/// Picks the catalog entry whose own keywords occur in a text.
///
/// An entry is a candidate when its priority is positive and at least one of
/// its keywords with a positive score occurs in the text as a whole token or
/// phrase. [`Self::find`] returns the candidate with the highest priority and
/// falls back to the default entry.
#[derive(Clone, Debug)]
pub struct BestEntryMatcher<T> {
    matcher: BoundaryMatcher,
    entries: Vec<SearchItem<T>>,
    default_entry: Option<SearchItem<T>>,
}

impl<T: Clone> BestEntryMatcher<T> {
    pub const fn new(matcher: BoundaryMatcher) -> Self {
        Self {
            matcher,
            entries: Vec::new(),
            default_entry: None,
        }
    }

    pub fn with_entries(
        matcher: BoundaryMatcher,
        entries: impl IntoIterator<Item = SearchItem<T>>,
    ) -> Self {
        let mut best = Self::new(matcher);
        best.add_entries(entries);
        best
    }

    #[must_use]
    pub fn with_default_entry(mut self, entry: SearchItem<T>) -> Self {
        self.default_entry = Some(entry);
        self
    }

    #[must_use]
    pub fn entries(&self) -> &[SearchItem<T>] {
        &self.entries
    }

    pub fn add_entry(&mut self, entry: SearchItem<T>) {
        self.entries.push(entry);
    }

    pub fn add_entries(&mut self, entries: impl IntoIterator<Item = SearchItem<T>>) {
        self.entries.extend(entries);
    }

    /// Removes every entry equal to `entry`.
    pub fn remove_entry(&mut self, entry: &SearchItem<T>) -> bool
    where
        T: PartialEq,
    {
        let before = self.entries.len();
        self.entries.retain(|candidate| candidate != entry);
        self.entries.len() != before
    }

    pub fn set_entries(&mut self, entries: Vec<SearchItem<T>>) {
        self.entries = entries;
    }

    #[must_use]
    pub const fn default_entry(&self) -> Option<&SearchItem<T>> {
        self.default_entry.as_ref()
    }

    pub fn set_default_entry(&mut self, entry: Option<SearchItem<T>>) {
        self.default_entry = entry;
    }

    /// Highest-priority candidate for `text`.
    ///
    /// When several candidates share the highest priority the one listed
    /// last in the catalog wins. Without candidates (or for empty text) the
    /// default entry is returned with an `Empty` status and no score.
    #[must_use]
    pub fn find(&self, text: &str) -> SearchResult<T> {
        if text.is_empty() {
            return SearchResult::empty(self.default_entry.clone());
        }

        let occurring = self.occurring_names(text);
        // `max_by_key` keeps the last of equal maxima.
        let best = self
            .entries
            .iter()
            .filter(|entry| is_candidate(entry, &occurring))
            .max_by_key(|entry| entry.priority);

        match best {
            Some(entry) => result_for(entry, &occurring),
            None => {
                log::debug!("No catalog entry matched '{text}', using default entry");
                SearchResult::empty(self.default_entry.clone())
            }
        }
    }

    /// Every candidate for `text`, in catalog order.
    #[must_use]
    pub fn find_all(&self, text: &str) -> Vec<SearchResult<T>> {
        if text.is_empty() {
            return Vec::new();
        }

        let occurring = self.occurring_names(text);
        self.entries
            .iter()
            .filter(|entry| is_candidate(entry, &occurring))
            .map(|entry| result_for(entry, &occurring))
            .collect()
    }

    fn occurring_names(&self, text: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let names: Vec<&str> = self
            .entries
            .iter()
            .flat_map(|entry| entry.keywords().iter())
            .map(|keyword| keyword.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect();

        self.matcher
            .find_contained_tokens(text, &names)
            .into_iter()
            .collect()
    }
}

fn is_candidate<T>(entry: &SearchItem<T>, occurring: &HashSet<String>) -> bool {
    entry.priority > 0
        && entry
            .keywords()
            .iter()
            .any(|keyword| keyword.score > 0 && occurring.contains(&keyword.name))
}

/// Occurring keywords of `entry`, one per name with the highest score listed
/// for it, in first-appearance order.
fn result_for<T: Clone>(entry: &SearchItem<T>, occurring: &HashSet<String>) -> SearchResult<T> {
    let mut matched: Vec<Keyword> = Vec::new();
    for keyword in entry
        .keywords()
        .iter()
        .filter(|keyword| occurring.contains(&keyword.name))
    {
        match matched.iter_mut().find(|seen| seen.name == keyword.name) {
            Some(seen) => seen.score = seen.score.max(keyword.score),
            None => matched.push(keyword.clone()),
        }
    }
    SearchResult::success(entry.clone(), matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::separators::Separators;
    use pretty_assertions::assert_eq;
    use querykit_protocol::SearchStatus;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Category {
        Graphics,
        Office,
        Photo,
        Other,
    }

    fn item(value: Category, keywords: &[(&str, i32)], priority: i32) -> SearchItem<Category> {
        SearchItem::with_keywords(
            value,
            keywords
                .iter()
                .map(|(name, score)| Keyword::with_score(*name, *score)),
            priority,
        )
    }

    fn matcher() -> BestEntryMatcher<Category> {
        BestEntryMatcher::with_entries(
            BoundaryMatcher::new(Separators::new([" "])),
            [
                item(Category::Graphics, &[("photoshop", 1), ("corel draw", 1)], 2),
                item(Category::Office, &[("word", 1), ("excel", 1)], 1),
                item(Category::Photo, &[("photoshop", 1), ("lightroom", 1)], 2),
                item(Category::Other, &[("word", 1)], 0),
            ],
        )
        .with_default_entry(item(Category::Other, &[], 1))
    }

    fn value(result: &SearchResult<Category>) -> Option<Category> {
        result.item().map(|item| item.value)
    }

    #[test]
    fn empty_text_returns_default_entry() {
        let result = matcher().find("");
        assert_eq!(result.status(), SearchStatus::Empty);
        assert_eq!(value(&result), Some(Category::Other));
        assert_eq!(result.match_score(), 0);
        assert!(result.matched_keywords().is_empty());
        assert!(matcher().find_all("").is_empty());
    }

    #[test]
    fn highest_priority_wins() {
        let result = matcher().find("need excel and corel draw");
        assert_eq!(result.status(), SearchStatus::Success);
        assert_eq!(value(&result), Some(Category::Graphics));
        assert_eq!(result.matched_keywords(), &[Keyword::new("corel draw")]);
        assert_eq!(result.match_score(), 1);
    }

    #[test]
    fn ties_prefer_the_later_entry() {
        let result = matcher().find("photoshop");
        assert_eq!(value(&result), Some(Category::Photo));
        assert_eq!(result.matched_keywords(), &[Keyword::new("photoshop")]);
    }

    #[test]
    fn no_candidate_falls_back_to_default() {
        let result = matcher().find("notepad");
        assert_eq!(result.status(), SearchStatus::Empty);
        assert_eq!(value(&result), Some(Category::Other));
        assert_eq!(result.match_score(), 0);

        let without_default =
            BestEntryMatcher::<Category>::new(BoundaryMatcher::new(Separators::new([" "])));
        assert!(without_default.find("notepad").item().is_none());
    }

    #[test]
    fn zero_priority_and_zero_score_never_match() {
        let mut matcher = matcher();
        matcher.add_entry(item(Category::Office, &[("notepad", 0), ("vim", 3)], 5));

        let result = matcher.find("notepad word");
        assert_eq!(value(&result), Some(Category::Office));
        assert_eq!(result.item().map(|item| item.priority), Some(1));

        let result = matcher.find("notepad");
        assert_eq!(result.status(), SearchStatus::Empty);
    }

    #[test]
    fn matched_keywords_are_restricted_to_occurring_ones() {
        let matcher = BestEntryMatcher::with_entries(
            BoundaryMatcher::new(Separators::new([" "])),
            [item(Category::Office, &[("word", 2), ("excel", 3), ("notepad", 0)], 1)],
        );
        let result = matcher.find("word notepad");
        assert_eq!(
            result.matched_keywords(),
            &[Keyword::with_score("word", 2), Keyword::with_score("notepad", 0)]
        );
        assert_eq!(result.match_score(), 2);
    }

    #[test]
    fn duplicate_keyword_names_keep_the_highest_score() {
        let matcher = BestEntryMatcher::with_entries(
            BoundaryMatcher::new(Separators::new([" "])),
            [item(Category::Office, &[("x", 0), ("word", 1), ("x", 5)], 1)],
        );
        let result = matcher.find("x");
        assert_eq!(result.status(), SearchStatus::Success);
        assert_eq!(result.matched_keywords(), &[Keyword::with_score("x", 5)]);
        assert_eq!(result.match_score(), 5);
    }

    #[test]
    fn removed_entries_no_longer_match() {
        let mut matcher = matcher();
        let photo = item(Category::Photo, &[("photoshop", 1), ("lightroom", 1)], 2);

        assert!(matcher.remove_entry(&photo));
        assert!(!matcher.remove_entry(&photo));
        assert_eq!(matcher.entries().len(), 3);
        assert_eq!(value(&matcher.find("photoshop")), Some(Category::Graphics));
        assert_eq!(matcher.find("lightroom").status(), SearchStatus::Empty);
    }

    #[test]
    fn find_all_lists_every_candidate_in_order() {
        let results = matcher().find_all("photoshop word");
        let values: Vec<_> = results.iter().filter_map(value).collect();
        assert_eq!(
            values,
            vec![Category::Graphics, Category::Office, Category::Photo]
        );
        assert!(results.iter().all(SearchResult::is_success));
    }
}
