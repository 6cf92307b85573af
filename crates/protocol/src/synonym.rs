use serde::{Deserialize, Serialize};

/// Alternate spellings (single words or phrases) that all map to one
/// canonical word, e.g. `"photoshop"` for `"photo shop"` and `"fotoshop"`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(from = "SynonymGroupRecord")]
pub struct SynonymGroup {
    pub canonical: String,
    synonyms: Vec<String>,
}

#[derive(Deserialize)]
struct SynonymGroupRecord {
    canonical: String,
    #[serde(default)]
    synonyms: Vec<String>,
}

impl From<SynonymGroupRecord> for SynonymGroup {
    fn from(record: SynonymGroupRecord) -> Self {
        Self::with_synonyms(record.canonical, record.synonyms)
    }
}

impl SynonymGroup {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
            synonyms: Vec::new(),
        }
    }

    pub fn with_synonyms<I, S>(canonical: impl Into<String>, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut group = Self::new(canonical);
        group.add_synonyms(synonyms);
        group
    }

    #[must_use]
    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }

    #[must_use]
    pub fn contains(&self, spelling: &str) -> bool {
        self.synonyms.iter().any(|synonym| synonym == spelling)
    }

    /// Adds a spelling unless it is empty or already present.
    pub fn add_synonym(&mut self, spelling: impl Into<String>) -> bool {
        let spelling = spelling.into();
        if spelling.is_empty() || self.contains(&spelling) {
            return false;
        }
        self.synonyms.push(spelling);
        true
    }

    pub fn add_synonyms<I, S>(&mut self, synonyms: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for synonym in synonyms {
            self.add_synonym(synonym);
        }
    }

    pub fn remove_synonym(&mut self, spelling: &str) -> bool {
        let before = self.synonyms.len();
        self.synonyms.retain(|synonym| synonym != spelling);
        self.synonyms.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_and_empty_spellings() {
        let mut group = SynonymGroup::with_synonyms("photoshop", ["fotoshop", "photo shop"]);
        assert!(!group.add_synonym("fotoshop"));
        assert!(!group.add_synonym(""));
        assert!(group.add_synonym("ps"));
        assert_eq!(group.synonyms().len(), 3);
    }

    #[test]
    fn deserialized_groups_drop_empty_and_duplicate_spellings() {
        let group: SynonymGroup = serde_json::from_str(
            r#"{"canonical":"photoshop","synonyms":["fotoshop","","fotoshop","ps"]}"#,
        )
        .unwrap();
        assert_eq!(group.synonyms(), &["fotoshop".to_string(), "ps".to_string()]);

        let bare: SynonymGroup = serde_json::from_str(r#"{"canonical":"office"}"#).unwrap();
        assert!(bare.synonyms().is_empty());
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let mut group = SynonymGroup::with_synonyms("photoshop", ["fotoshop"]);
        assert!(group.remove_synonym("fotoshop"));
        assert!(!group.remove_synonym("fotoshop"));
        assert!(!group.contains("fotoshop"));
    }
}
