use std::collections::{BTreeMap, HashSet};

use crate::separators::{next_char_len, Separators};
use crate::words::WordLocator;

/// Offsets of every candidate found in a text, keyed by candidate.
pub type IndexMap = BTreeMap<String, Vec<usize>>;

/// Separator-aware whole-word and whole-phrase search.
///
/// A match is *bounded* when each of its edges touches either a configured
/// separator or the edge of the text. Offsets are byte offsets into the
/// searched text and comparisons are case-sensitive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundaryMatcher {
    words: WordLocator,
}

impl BoundaryMatcher {
    pub const fn new(separators: Separators) -> Self {
        Self {
            words: WordLocator::new(separators),
        }
    }

    #[must_use]
    pub const fn separators(&self) -> &Separators {
        self.words.separators()
    }

    #[must_use]
    pub const fn word_locator(&self) -> &WordLocator {
        &self.words
    }

    pub fn set_separators(&mut self, separators: Separators) {
        self.words.set_separators(separators);
    }

    /// Ascending offsets where `substring` occurs as a whole token or phrase.
    #[must_use]
    pub fn all_occurrences_bounded(&self, text: &str, substring: &str) -> Vec<usize> {
        let separators = self.separators();
        occurrences(text, substring)
            .filter(|&offset| {
                let end = offset + substring.len();
                (offset == 0 || separators.separator_before(text, offset))
                    && (end == text.len() || separators.separator_after(text, end))
            })
            .collect()
    }

    /// Ascending offsets where `substring` is followed by a separator or the
    /// end of the text. The left edge is unconstrained, so `"13unit"` yields
    /// an occurrence of `"unit"`.
    #[must_use]
    pub fn all_occurrences_end_bounded(&self, text: &str, substring: &str) -> Vec<usize> {
        let separators = self.separators();
        occurrences(text, substring)
            .filter(|&offset| {
                let end = offset + substring.len();
                end == text.len() || separators.separator_after(text, end)
            })
            .collect()
    }

    /// Bounded offsets for every non-empty candidate; misses map to an empty list.
    #[must_use]
    pub fn index_map_bounded<S: AsRef<str>>(&self, text: &str, candidates: &[S]) -> IndexMap {
        self.index_map(candidates, |candidate| {
            self.all_occurrences_bounded(text, candidate)
        })
    }

    #[must_use]
    pub fn index_map_end_bounded<S: AsRef<str>>(&self, text: &str, candidates: &[S]) -> IndexMap {
        self.index_map(candidates, |candidate| {
            self.all_occurrences_end_bounded(text, candidate)
        })
    }

    /// Returns the `words` that occur in `text` as a whole token, followed by
    /// the multi-token `words` that occur as a bounded phrase.
    ///
    /// Single tokens are resolved through a set lookup over the split text;
    /// only phrases need a scan.
    #[must_use]
    pub fn find_contained_tokens<S: AsRef<str>>(&self, text: &str, words: &[S]) -> Vec<String> {
        let words: Vec<&str> = words
            .iter()
            .map(|word| word.as_ref())
            .filter(|word| !word.is_empty())
            .collect();
        let lookup: HashSet<&str> = words.iter().copied().collect();

        let mut seen: HashSet<&str> = HashSet::new();
        let mut contained = Vec::new();

        for token in self.separators().split(text) {
            if lookup.contains(token) && seen.insert(token) {
                contained.push(token.to_string());
            }
        }

        for phrase in self.words.find_multi_token_strings(&words, 2) {
            if seen.contains(phrase) || !text.contains(phrase) {
                continue;
            }
            if !self.all_occurrences_bounded(text, phrase).is_empty() {
                seen.insert(phrase);
                contained.push(phrase.to_string());
            }
        }

        contained
    }

    fn index_map<S: AsRef<str>>(
        &self,
        candidates: &[S],
        mut search: impl FnMut(&str) -> Vec<usize>,
    ) -> IndexMap {
        let mut map = IndexMap::new();
        for candidate in candidates {
            let candidate = candidate.as_ref();
            if candidate.is_empty() || map.contains_key(candidate) {
                continue;
            }
            map.insert(candidate.to_string(), search(candidate));
        }
        map
    }
}

/// Every (possibly overlapping) occurrence of `needle`, ascending.
fn occurrences<'a>(haystack: &'a str, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
    let mut from = 0;
    std::iter::from_fn(move || {
        if needle.is_empty() {
            return None;
        }
        let found = from + haystack.get(from..)?.find(needle)?;
        from = found + next_char_len(haystack, found);
        Some(found)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn matcher() -> BoundaryMatcher {
        BoundaryMatcher::new(Separators::new([" ", "-"]))
    }

    #[test]
    fn bounded_matches_whole_words_only() {
        let m = matcher();
        assert_eq!(m.all_occurrences_bounded("unit units unit", "unit"), vec![0, 11]);
        assert_eq!(m.all_occurrences_bounded("unit", "unit"), vec![0]);
        assert_eq!(m.all_occurrences_bounded("community", "unit"), Vec::<usize>::new());
        assert_eq!(m.all_occurrences_bounded("13-unit", "unit"), vec![3]);
    }

    #[test]
    fn bounded_matches_phrases_and_overlaps() {
        let m = matcher();
        assert_eq!(m.all_occurrences_bounded("a b a b", "a b"), vec![0, 4]);
        assert_eq!(m.all_occurrences_bounded("a a a", "a a"), vec![0, 2]);
        assert_eq!(m.all_occurrences_bounded("xa b", "a b"), Vec::<usize>::new());
    }

    #[test]
    fn empty_inputs_yield_nothing() {
        let m = matcher();
        assert!(m.all_occurrences_bounded("", "unit").is_empty());
        assert!(m.all_occurrences_bounded("unit", "").is_empty());
        assert!(m.all_occurrences_end_bounded("unit", "").is_empty());
    }

    #[test]
    fn end_bounded_allows_glued_prefix() {
        let m = matcher();
        assert_eq!(m.all_occurrences_end_bounded("13unit", "unit"), vec![2]);
        assert_eq!(m.all_occurrences_end_bounded("13unit more", "unit"), vec![2]);
        assert!(m.all_occurrences_end_bounded("13units", "unit").is_empty());
    }

    #[test]
    fn index_maps_keep_misses() {
        let m = matcher();
        let map = m.index_map_bounded("2 unit 3 pcs", &["unit", "pcs", "box", ""]);
        assert_eq!(map.len(), 3);
        assert_eq!(map["unit"], vec![2]);
        assert_eq!(map["pcs"], vec![9]);
        assert!(map["box"].is_empty());

        let glued = m.index_map_end_bounded("2unit", &["unit"]);
        assert_eq!(glued["unit"], vec![1]);
    }

    #[test]
    fn contained_tokens_cover_words_and_phrases() {
        let m = matcher();
        let found = m.find_contained_tokens(
            "buy adobe photo shop and adobe",
            &["adobe", "photo shop", "shop and more", "photo", "cloud"],
        );
        assert_eq!(found, vec!["adobe", "photo", "photo shop"]);
    }

    #[test]
    fn contained_phrase_must_be_bounded() {
        let m = matcher();
        let found = m.find_contained_tokens("xphoto shop", &["photo shop"]);
        assert!(found.is_empty());
    }

    proptest! {
        #[test]
        fn proptest_bounded_offsets_are_sound_and_complete(
            text in "[ab -]{0,16}",
            needle in "[ab]{1,3}( [ab]{1,2})?",
        ) {
            let m = matcher();
            let found = m.all_occurrences_bounded(&text, &needle);
            let is_sep = |c: char| c == ' ' || c == '-';

            let mut expected = Vec::new();
            for offset in 0..text.len() {
                let end = offset + needle.len();
                if end > text.len() || &text[offset..end] != needle.as_str() {
                    continue;
                }
                let left = offset == 0 || text[..offset].ends_with(is_sep);
                let right = end == text.len() || text[end..].starts_with(is_sep);
                if left && right {
                    expected.push(offset);
                }
            }
            prop_assert_eq!(found, expected);
        }

        #[test]
        fn proptest_single_word_needs_separators(
            word in "[a-z]{2,8}",
            before in "[a-z0-9]",
            after in "[a-z0-9]",
        ) {
            let m = matcher();
            let glued = format!("{before}{word}{after}");
            prop_assert!(!m.all_occurrences_bounded(&glued, &word).contains(&1));
            let spaced = format!("{before} {word} {after}");
            prop_assert!(m.all_occurrences_bounded(&spaced, &word).contains(&2));
        }
    }
}
