use std::collections::{HashMap, HashSet};

use querykit_protocol::{
    total_score, Keyword, SearchItem, SearchResult, SearchStatus, SynonymGroup,
    DEFAULT_KEYWORD_SCORE,
};

use crate::boundary::{BoundaryMatcher, IndexMap};
use crate::separators::Separators;

pub const DEFAULT_JOIN_SEPARATOR: &str = " ";

/// Rebuilds a clean name out of a free-text query.
///
/// Tokens survive when they are a known synonym spelling or are made only of
/// the configured characters (long enough and not ignored). Synonym phrases
/// are located first and act as anchors that the surrounding gaps are
/// rebuilt around. Every surviving word also becomes a keyword, with synonym
/// spellings folded into their canonical name.
///
/// Example: with `"photoshop"` canonical for `"photoshop_alt"` and ASCII
/// letters as the character set, `"adobe photoshop_alt cloud 13"` becomes
/// `"adobe photoshop cloud"` with keywords `adobe`, `photoshop`, `cloud`.
#[derive(Clone, Debug)]
pub struct NameExtractor {
    matcher: BoundaryMatcher,
    characters: HashSet<char>,
    synonym_groups: Vec<SynonymGroup>,
    ignored_words: HashSet<String>,
    min_word_length: usize,
    suppress_digit_only: bool,
    join_separator: String,
    default_score: i32,
    keyword_scores: HashMap<String, i32>,
}

#[derive(Default)]
struct NameParts {
    segments: Vec<String>,
    keywords: Vec<String>,
}

impl NameParts {
    /// Appends raw text to the previous segment (phrase overlap continuation).
    fn extend_last(&mut self, text: &str) {
        match self.segments.last_mut() {
            Some(last) => last.push_str(text),
            None => self.segments.push(text.to_string()),
        }
    }

    fn join(&self, separator: &str) -> String {
        self.segments
            .iter()
            .filter(|segment| !segment.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl NameExtractor {
    pub fn new(separators: Separators, characters: impl IntoIterator<Item = char>) -> Self {
        Self {
            matcher: BoundaryMatcher::new(separators),
            characters: characters.into_iter().collect(),
            synonym_groups: Vec::new(),
            ignored_words: HashSet::new(),
            min_word_length: 1,
            suppress_digit_only: true,
            join_separator: DEFAULT_JOIN_SEPARATOR.to_string(),
            default_score: DEFAULT_KEYWORD_SCORE,
            keyword_scores: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_synonym_groups(mut self, groups: impl IntoIterator<Item = SynonymGroup>) -> Self {
        self.add_synonym_groups(groups);
        self
    }

    #[must_use]
    pub fn with_ignored_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_ignored_words(words);
        self
    }

    #[must_use]
    pub const fn with_min_word_length(mut self, min_word_length: usize) -> Self {
        self.min_word_length = min_word_length;
        self
    }

    #[must_use]
    pub const fn with_suppress_digit_only(mut self, suppress: bool) -> Self {
        self.suppress_digit_only = suppress;
        self
    }

    #[must_use]
    pub fn with_join_separator(mut self, separator: impl Into<String>) -> Self {
        self.join_separator = separator.into();
        self
    }

    #[must_use]
    pub const fn with_default_score(mut self, score: i32) -> Self {
        self.default_score = score;
        self
    }

    #[must_use]
    pub fn with_keyword_scores(mut self, scores: impl IntoIterator<Item = (String, i32)>) -> Self {
        self.keyword_scores.extend(scores);
        self
    }

    #[must_use]
    pub const fn separators(&self) -> &Separators {
        self.matcher.separators()
    }

    pub fn set_separators(&mut self, separators: Separators) {
        self.matcher.set_separators(separators);
    }

    #[must_use]
    pub const fn characters(&self) -> &HashSet<char> {
        &self.characters
    }

    pub fn set_characters(&mut self, characters: impl IntoIterator<Item = char>) {
        self.characters = characters.into_iter().collect();
    }

    #[must_use]
    pub fn synonym_groups(&self) -> &[SynonymGroup] {
        &self.synonym_groups
    }

    pub fn add_synonym_group(&mut self, group: SynonymGroup) {
        self.synonym_groups.push(group);
    }

    pub fn add_synonym_groups(&mut self, groups: impl IntoIterator<Item = SynonymGroup>) {
        self.synonym_groups.extend(groups);
    }

    /// Removes every group with the given canonical name.
    pub fn remove_synonym_group(&mut self, canonical: &str) -> bool {
        let before = self.synonym_groups.len();
        self.synonym_groups
            .retain(|group| group.canonical != canonical);
        self.synonym_groups.len() != before
    }

    pub fn set_synonym_groups(&mut self, groups: Vec<SynonymGroup>) {
        self.synonym_groups = groups;
    }

    #[must_use]
    pub const fn ignored_words(&self) -> &HashSet<String> {
        &self.ignored_words
    }

    pub fn add_ignored_word(&mut self, word: impl Into<String>) {
        let word = word.into();
        if !word.is_empty() {
            self.ignored_words.insert(word);
        }
    }

    pub fn add_ignored_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for word in words {
            self.add_ignored_word(word);
        }
    }

    pub fn remove_ignored_word(&mut self, word: &str) -> bool {
        self.ignored_words.remove(word)
    }

    #[must_use]
    pub const fn min_word_length(&self) -> usize {
        self.min_word_length
    }

    pub fn set_min_word_length(&mut self, min_word_length: usize) {
        self.min_word_length = min_word_length;
    }

    #[must_use]
    pub const fn suppress_digit_only(&self) -> bool {
        self.suppress_digit_only
    }

    pub fn set_suppress_digit_only(&mut self, suppress: bool) {
        self.suppress_digit_only = suppress;
    }

    #[must_use]
    pub fn join_separator(&self) -> &str {
        &self.join_separator
    }

    pub fn set_join_separator(&mut self, separator: impl Into<String>) {
        self.join_separator = separator.into();
    }

    #[must_use]
    pub const fn default_score(&self) -> i32 {
        self.default_score
    }

    pub fn set_default_score(&mut self, score: i32) {
        self.default_score = score;
    }

    /// Overrides the score of keywords with this name.
    pub fn set_keyword_score(&mut self, name: impl Into<String>, score: i32) {
        self.keyword_scores.insert(name.into(), score);
    }

    pub fn remove_keyword_score(&mut self, name: &str) -> bool {
        self.keyword_scores.remove(name).is_some()
    }

    #[must_use]
    pub fn keyword_score(&self, name: &str) -> i32 {
        self.keyword_scores
            .get(name)
            .copied()
            .unwrap_or(self.default_score)
    }

    /// Builds the clean name and its keywords for `text`.
    ///
    /// The result is `Empty` when nothing survives, or when every word of the
    /// name is made of configured digits and digit-only names are suppressed.
    /// The rebuilt item is attached in both cases.
    #[must_use]
    pub fn extract_name(&self, text: &str) -> SearchResult<String> {
        let parts = self.rebuild(text);
        let name = parts.join(&self.join_separator);
        let keywords = self.merge_keywords(&parts.keywords);

        let status = if name.is_empty() || self.is_digit_only(&name) {
            SearchStatus::Empty
        } else {
            SearchStatus::Success
        };

        log::debug!(
            "Name extraction: '{}' -> '{}' ({} keywords, {:?})",
            text,
            name,
            keywords.len(),
            status
        );

        let score = total_score(&keywords);
        let item = SearchItem::with_keywords(name, keywords.clone(), 1);
        SearchResult::new(status, Some(item), score, keywords)
    }

    fn rebuild(&self, text: &str) -> NameParts {
        let anchors = self.phrase_anchors(text);
        let mut offsets: Vec<usize> = anchors.values().flatten().copied().collect();
        offsets.sort_unstable();
        offsets.dedup();

        let mut parts = NameParts::default();
        let mut pos = 0;

        for offset in offsets {
            let Some(hit) = longest_anchored_at(&anchors, offset) else {
                continue;
            };
            let end = offset + hit.len();

            if pos > end {
                log::trace!("Phrase '{hit}' at {offset} already consumed");
                continue;
            }

            if pos > offset {
                parts.extend_last(&text[pos..end]);
                self.push_canonical_keywords(hit, &mut parts.keywords);
                pos = end;
                continue;
            }

            self.push_gap(&text[pos..offset], &mut parts);
            parts.segments.push(hit.to_string());
            self.push_canonical_keywords(hit, &mut parts.keywords);
            pos = end;
        }

        if pos < text.len() {
            self.push_gap(&text[pos..], &mut parts);
        }

        parts
    }

    /// Offsets of every synonym phrase that occurs in `text`.
    fn phrase_anchors(&self, text: &str) -> IndexMap {
        let spellings: Vec<&str> = self
            .synonym_groups
            .iter()
            .flat_map(|group| group.synonyms().iter().map(String::as_str))
            .collect();
        if spellings.is_empty() {
            return IndexMap::new();
        }

        let contained = self.matcher.find_contained_tokens(text, &spellings);
        let phrases = self
            .matcher
            .word_locator()
            .find_multi_token_strings(&contained, 2);
        self.matcher.index_map_bounded(text, &phrases)
    }

    fn push_gap(&self, gap: &str, parts: &mut NameParts) {
        for token in self.separators().split(gap) {
            if let Some(group) = self.first_group_with(token) {
                parts.segments.push(group.canonical.clone());
                self.push_canonical_keywords(token, &mut parts.keywords);
            } else if self.is_qualifying_word(token) {
                parts.segments.push(token.to_string());
                parts.keywords.push(token.to_string());
            }
        }
    }

    fn push_canonical_keywords(&self, spelling: &str, keywords: &mut Vec<String>) {
        keywords.extend(
            self.synonym_groups
                .iter()
                .filter(|group| group.contains(spelling))
                .map(|group| group.canonical.clone()),
        );
    }

    fn first_group_with(&self, spelling: &str) -> Option<&SynonymGroup> {
        self.synonym_groups
            .iter()
            .find(|group| group.contains(spelling))
    }

    fn is_qualifying_word(&self, word: &str) -> bool {
        !word.is_empty()
            && word.chars().all(|ch| self.characters.contains(&ch))
            && word.chars().count() >= self.min_word_length
            && !self.ignored_words.contains(word)
    }

    fn is_digit_only(&self, name: &str) -> bool {
        self.suppress_digit_only
            && self.separators().split(name).iter().all(|word| {
                word.chars()
                    .all(|ch| ch.is_ascii_digit() && self.characters.contains(&ch))
            })
    }

    fn merge_keywords(&self, names: &[String]) -> Vec<Keyword> {
        let mut seen = HashSet::new();
        names
            .iter()
            .filter(|name| !name.is_empty() && seen.insert(name.as_str()))
            .map(|name| Keyword::with_score(name.clone(), self.keyword_score(name)))
            .collect()
    }
}

fn longest_anchored_at(anchors: &IndexMap, offset: usize) -> Option<&str> {
    anchors
        .iter()
        .filter(|(_, offsets)| offsets.contains(&offset))
        .map(|(phrase, _)| phrase.as_str())
        .max_by_key(|phrase| phrase.len())
}
