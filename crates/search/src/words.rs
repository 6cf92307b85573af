use crate::separators::Separators;

/// Tells phrases apart from single words.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordLocator {
    separators: Separators,
}

impl WordLocator {
    pub const fn new(separators: Separators) -> Self {
        Self { separators }
    }

    #[must_use]
    pub const fn separators(&self) -> &Separators {
        &self.separators
    }

    pub fn set_separators(&mut self, separators: Separators) {
        self.separators = separators;
    }

    /// Keeps the strings that split into at least `min_tokens` non-empty tokens.
    #[must_use]
    pub fn find_multi_token_strings<'a, S: AsRef<str>>(
        &self,
        strings: &'a [S],
        min_tokens: usize,
    ) -> Vec<&'a str> {
        strings
            .iter()
            .map(|candidate| candidate.as_ref())
            .filter(|candidate| self.separators.token_count(candidate) >= min_tokens)
            .collect()
    }
}
