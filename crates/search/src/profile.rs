use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use querykit_protocol::{Keyword, SearchItem, SynonymGroup, DEFAULT_KEYWORD_SCORE};
use serde::Deserialize;

use crate::best::BestEntryMatcher;
use crate::boundary::BoundaryMatcher;
use crate::catalog::CatalogKeywordMatcher;
use crate::name::{NameExtractor, DEFAULT_JOIN_SEPARATOR};
use crate::quantity::{QuantityExtractor, QuantityValue};
use crate::separators::Separators;

const BUILTIN_DEFAULT: &str = include_str!("../../../profiles/default.toml");

const DEFAULT_SEPARATORS: &[&str] = &[" "];

/// Matching configuration shared by every matcher: separators, clean-name
/// rules, quantity units and the catalog threshold.
#[derive(Clone, Debug)]
pub struct MatchProfile {
    name: String,
    description: Option<String>,
    separators: Separators,
    clean_name: CleanNameConfig,
    quantity: QuantityConfig,
    catalog: CatalogConfig,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    AsciiLetters,
    AsciiLowercase,
    AsciiUppercase,
    AsciiDigits,
    Cyrillic,
}

impl CharacterClass {
    fn chars(self) -> Vec<char> {
        match self {
            Self::AsciiLetters => ('a'..='z').chain('A'..='Z').collect(),
            Self::AsciiLowercase => ('a'..='z').collect(),
            Self::AsciiUppercase => ('A'..='Z').collect(),
            Self::AsciiDigits => ('0'..='9').collect(),
            Self::Cyrillic => ('а'..='я').chain('А'..='Я').chain(['ё', 'Ё']).collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CleanNameConfig {
    pub characters: BTreeSet<char>,
    pub synonyms: Vec<SynonymGroup>,
    pub ignored_words: Vec<String>,
    pub min_word_length: usize,
    pub suppress_digit_only: bool,
    pub join_separator: String,
    pub default_score: i32,
    pub scores: BTreeMap<String, i32>,
}

impl Default for CleanNameConfig {
    fn default() -> Self {
        Self {
            characters: default_character_classes()
                .into_iter()
                .flat_map(CharacterClass::chars)
                .collect(),
            synonyms: Vec::new(),
            ignored_words: Vec::new(),
            min_word_length: 1,
            suppress_digit_only: true,
            join_separator: DEFAULT_JOIN_SEPARATOR.to_string(),
            default_score: DEFAULT_KEYWORD_SCORE,
            scores: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct QuantityConfig {
    pub units: Vec<Keyword>,
    pub spelled: BTreeMap<String, i64>,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub min_score: i32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { min_score: 1 }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawProfile {
    #[serde(default)]
    schema_version: Option<u32>,
    name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    separators: Option<Vec<String>>,
    #[serde(default)]
    clean_name: Option<RawCleanName>,
    #[serde(default)]
    quantity: Option<RawQuantity>,
    #[serde(default)]
    catalog: Option<RawCatalog>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawCleanName {
    #[serde(default)]
    character_classes: Vec<CharacterClass>,
    characters: Option<String>,
    #[serde(default)]
    synonyms: Vec<RawSynonymGroup>,
    #[serde(default)]
    ignored_words: Vec<String>,
    min_word_length: Option<usize>,
    suppress_digit_only: Option<bool>,
    join_separator: Option<String>,
    default_score: Option<i32>,
    #[serde(default)]
    scores: BTreeMap<String, i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawSynonymGroup {
    canonical: String,
    #[serde(default)]
    synonyms: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawQuantity {
    #[serde(default)]
    units: Vec<Keyword>,
    #[serde(default)]
    spelled: BTreeMap<String, i64>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
struct RawCatalog {
    min_score: Option<i32>,
}

fn default_character_classes() -> Vec<CharacterClass> {
    vec![CharacterClass::AsciiLetters, CharacterClass::AsciiDigits]
}

impl MatchProfile {
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "default" => Some(
                Self::from_bytes("default", BUILTIN_DEFAULT.as_bytes())
                    .expect("builtin default profile must parse"),
            ),
            _ => None,
        }
    }

    #[must_use]
    pub fn default_profile() -> Self {
        Self::builtin("default").expect("default profile is bundled")
    }

    /// Loads a JSON or TOML profile; the file stem names it unless the file
    /// sets `name`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read profile file {}", path.display()))?;
        let fallback_name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("custom");
        Self::from_bytes(fallback_name, &bytes)
            .with_context(|| format!("Invalid profile file {}", path.display()))
    }

    pub fn from_bytes(profile_name: &str, bytes: &[u8]) -> Result<Self> {
        let raw = parse_raw(bytes).with_context(|| {
            format!("Profile '{profile_name}' is not valid JSON/TOML configuration")
        })?;
        Self::from_raw(raw, profile_name)
    }

    fn from_raw(raw: RawProfile, fallback_name: &str) -> Result<Self> {
        if let Some(schema_version) = raw.schema_version {
            if schema_version != 1 {
                return Err(anyhow!(
                    "profile.schema_version {schema_version} is not supported (expected 1)"
                ));
            }
        }

        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());

        let separators = match raw.separators {
            Some(list) => Separators::new(list),
            None => Separators::new(DEFAULT_SEPARATORS.iter().copied()),
        };
        if separators.is_empty() {
            return Err(anyhow!(
                "separators must contain at least one non-empty separator"
            ));
        }

        let clean_name = CleanNameConfig::from_raw(raw.clean_name)
            .with_context(|| format!("Invalid clean_name config for profile '{name}'"))?;
        let quantity = QuantityConfig::from_raw(raw.quantity)
            .with_context(|| format!("Invalid quantity config for profile '{name}'"))?;
        let catalog = CatalogConfig::from_raw(raw.catalog);

        log::debug!(
            "Loaded profile '{}': {} separators, {} synonym groups, {} units",
            name,
            separators.as_slice().len(),
            clean_name.synonyms.len(),
            quantity.units.len()
        );

        Ok(Self {
            name,
            description: raw.description,
            separators,
            clean_name,
            quantity,
            catalog,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn separators(&self) -> &Separators {
        &self.separators
    }

    #[must_use]
    pub const fn clean_name(&self) -> &CleanNameConfig {
        &self.clean_name
    }

    #[must_use]
    pub const fn quantity(&self) -> &QuantityConfig {
        &self.quantity
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogConfig {
        &self.catalog
    }

    #[must_use]
    pub fn boundary_matcher(&self) -> BoundaryMatcher {
        BoundaryMatcher::new(self.separators.clone())
    }

    #[must_use]
    pub fn name_extractor(&self) -> NameExtractor {
        let cfg = &self.clean_name;
        NameExtractor::new(self.separators.clone(), cfg.characters.iter().copied())
            .with_synonym_groups(cfg.synonyms.iter().cloned())
            .with_ignored_words(cfg.ignored_words.iter().cloned())
            .with_min_word_length(cfg.min_word_length)
            .with_suppress_digit_only(cfg.suppress_digit_only)
            .with_join_separator(cfg.join_separator.clone())
            .with_default_score(cfg.default_score)
            .with_keyword_scores(cfg.scores.clone())
    }

    /// Builds a quantity extractor for `T`; spelled numbers that do not fit
    /// into `T` are left out.
    pub fn quantity_extractor<T: QuantityValue>(&self) -> crate::Result<QuantityExtractor<T>> {
        let spelled: Vec<(String, T)> = self
            .quantity
            .spelled
            .iter()
            .filter_map(|(word, value)| match T::from_whole(*value) {
                Some(converted) => Some((word.clone(), converted)),
                None => {
                    log::warn!(
                        "Spelled number '{word}' = {value} does not fit into {}",
                        std::any::type_name::<T>()
                    );
                    None
                }
            })
            .collect();

        Ok(
            QuantityExtractor::new(self.separators.clone(), self.quantity.units.clone())?
                .with_spelled_numbers(spelled),
        )
    }

    #[must_use]
    pub fn catalog_matcher(
        &self,
        entries: impl IntoIterator<Item = SearchItem<String>>,
    ) -> CatalogKeywordMatcher {
        CatalogKeywordMatcher::with_entries(
            self.boundary_matcher(),
            entries,
            self.catalog.min_score,
        )
    }

    #[must_use]
    pub fn best_entry_matcher<T: Clone>(
        &self,
        entries: impl IntoIterator<Item = SearchItem<T>>,
        default_entry: Option<SearchItem<T>>,
    ) -> BestEntryMatcher<T> {
        let mut matcher = BestEntryMatcher::with_entries(self.boundary_matcher(), entries);
        matcher.set_default_entry(default_entry);
        matcher
    }
}

impl CleanNameConfig {
    fn from_raw(raw: Option<RawCleanName>) -> Result<Self> {
        let defaults = Self::default();
        let Some(raw) = raw else {
            return Ok(defaults);
        };

        let mut classes = raw.character_classes;
        if classes.is_empty() && raw.characters.is_none() {
            classes = default_character_classes();
        }
        let mut characters: BTreeSet<char> = classes
            .into_iter()
            .flat_map(CharacterClass::chars)
            .collect();
        characters.extend(raw.characters.unwrap_or_default().chars());
        if characters.is_empty() {
            return Err(anyhow!("clean_name.characters must not be empty"));
        }

        let min_word_length = raw.min_word_length.unwrap_or(defaults.min_word_length);
        if min_word_length == 0 {
            return Err(anyhow!("clean_name.min_word_length must be at least 1"));
        }

        let mut synonyms = Vec::with_capacity(raw.synonyms.len());
        for (idx, group) in raw.synonyms.into_iter().enumerate() {
            if group.canonical.trim().is_empty() {
                return Err(anyhow!(
                    "clean_name.synonyms[{idx}].canonical must not be empty"
                ));
            }
            synonyms.push(SynonymGroup::with_synonyms(group.canonical, group.synonyms));
        }

        Ok(Self {
            characters,
            synonyms,
            ignored_words: raw.ignored_words,
            min_word_length,
            suppress_digit_only: raw
                .suppress_digit_only
                .unwrap_or(defaults.suppress_digit_only),
            join_separator: raw.join_separator.unwrap_or(defaults.join_separator),
            default_score: raw.default_score.unwrap_or(defaults.default_score),
            scores: raw.scores,
        })
    }
}

impl QuantityConfig {
    fn from_raw(raw: Option<RawQuantity>) -> Result<Self> {
        let raw = raw.unwrap_or_default();
        for (idx, unit) in raw.units.iter().enumerate() {
            if unit.name.trim().is_empty() {
                return Err(anyhow!("quantity.units[{idx}].name must not be empty"));
            }
        }
        Ok(Self {
            units: raw.units,
            spelled: raw.spelled,
        })
    }
}

impl CatalogConfig {
    fn from_raw(raw: Option<RawCatalog>) -> Self {
        let defaults = Self::default();
        Self {
            min_score: raw
                .and_then(|catalog| catalog.min_score)
                .unwrap_or(defaults.min_score),
        }
    }
}

fn parse_raw(bytes: &[u8]) -> Result<RawProfile> {
    let value: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
            let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                anyhow!(
                    "Profile is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                )
            })?;
            serde_json::to_value(toml_value)
                .map_err(|err| anyhow!("Failed to convert TOML profile to JSON: {err}"))?
        }
    };

    validate_profile_value(&value)?;
    serde_json::from_value(value).map_err(|err| anyhow!("Profile parse error: {err}"))
}

fn validate_profile_value(value: &serde_json::Value) -> Result<()> {
    fn validate_object_keys(
        unknown: &mut Vec<String>,
        obj: &serde_json::Map<String, serde_json::Value>,
        base: &str,
        allowed: &[&str],
    ) {
        for key in obj.keys() {
            if !allowed.iter().any(|a| a == &key.as_str()) {
                if base.is_empty() {
                    unknown.push(key.to_string());
                } else {
                    unknown.push(format!("{base}.{key}"));
                }
            }
        }
    }

    fn validate_array_items(
        unknown: &mut Vec<String>,
        parent: Option<&serde_json::Value>,
        base: &str,
        allowed: &[&str],
    ) {
        let Some(serde_json::Value::Array(items)) = parent else {
            return;
        };
        for (idx, item) in items.iter().enumerate() {
            if let serde_json::Value::Object(obj) = item {
                validate_object_keys(unknown, obj, &format!("{base}[{idx}]"), allowed);
            }
        }
    }

    let serde_json::Value::Object(root) = value else {
        return Err(anyhow!("Profile config must be a JSON object"));
    };

    let mut unknown = Vec::new();

    validate_object_keys(
        &mut unknown,
        root,
        "",
        &[
            "schema_version",
            "name",
            "description",
            "separators",
            "clean_name",
            "quantity",
            "catalog",
        ],
    );

    if let Some(serde_json::Value::Object(clean_name)) = root.get("clean_name") {
        validate_object_keys(
            &mut unknown,
            clean_name,
            "clean_name",
            &[
                "character_classes",
                "characters",
                "synonyms",
                "ignored_words",
                "min_word_length",
                "suppress_digit_only",
                "join_separator",
                "default_score",
                "scores",
            ],
        );
        validate_array_items(
            &mut unknown,
            clean_name.get("synonyms"),
            "clean_name.synonyms",
            &["canonical", "synonyms"],
        );
    }

    if let Some(serde_json::Value::Object(quantity)) = root.get("quantity") {
        validate_object_keys(&mut unknown, quantity, "quantity", &["units", "spelled"]);
        validate_array_items(
            &mut unknown,
            quantity.get("units"),
            "quantity.units",
            &["name", "score"],
        );
    }

    if let Some(serde_json::Value::Object(catalog)) = root.get("catalog") {
        validate_object_keys(&mut unknown, catalog, "catalog", &["min_score"]);
    }

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("Unknown profile keys: {}", unknown.join(", ")))
    }
}
