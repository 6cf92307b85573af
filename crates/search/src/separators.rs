/// Ordered list of word separators.
///
/// When several separators could start at the same position the first one in
/// configuration order wins. Empty separators are dropped on construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Separators(Vec<String>);

impl Separators {
    pub fn new<I, S>(separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            separators
                .into_iter()
                .map(Into::into)
                .filter(|separator: &String| !separator.is_empty())
                .collect(),
        )
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits `text` into tokens, dropping empty ones.
    #[must_use]
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut tokens = Vec::new();
        let mut start = 0;
        let mut pos = 0;

        while pos < text.len() {
            if let Some(len) = self.match_len_at(text, pos) {
                if pos > start {
                    tokens.push(&text[start..pos]);
                }
                pos += len;
                start = pos;
            } else {
                pos += next_char_len(text, pos);
            }
        }

        if start < text.len() {
            tokens.push(&text[start..]);
        }

        tokens
    }

    #[must_use]
    pub fn token_count(&self, text: &str) -> usize {
        self.split(text).len()
    }

    /// True when a separator ends exactly at `offset`.
    #[must_use]
    pub fn separator_before(&self, text: &str, offset: usize) -> bool {
        let head = &text[..offset];
        self.0.iter().any(|separator| head.ends_with(separator.as_str()))
    }

    /// True when a separator starts exactly at `offset`.
    #[must_use]
    pub fn separator_after(&self, text: &str, offset: usize) -> bool {
        self.match_len_at(text, offset).is_some()
    }

    #[must_use]
    pub fn ends_with_separator(&self, text: &str) -> bool {
        self.separator_before(text, text.len())
    }

    fn match_len_at(&self, text: &str, offset: usize) -> Option<usize> {
        let rest = &text[offset..];
        self.0
            .iter()
            .find(|separator| rest.starts_with(separator.as_str()))
            .map(String::len)
    }
}

impl<S: Into<String>> FromIterator<S> for Separators {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

pub(crate) fn next_char_len(text: &str, offset: usize) -> usize {
    text[offset..].chars().next().map_or(1, char::len_utf8)
}
