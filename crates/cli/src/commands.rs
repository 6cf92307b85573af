use anyhow::Result;
use querykit_protocol::{serialize_json, serialize_json_pretty, Keyword, SearchItem, SearchResult};
use querykit_search::MatchProfile;
use serde::Serialize;

#[derive(Serialize)]
struct AnalyzeOutput {
    profile: String,
    name: SearchResult<String>,
    quantities: Vec<SearchResult<i64>>,
    glued_quantities: Vec<SearchResult<i64>>,
    offers: Vec<SearchResult<String>>,
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serialize_json_pretty(value)
    } else {
        serialize_json(value)
    }
}

pub fn name(profile: &MatchProfile, text: &str, pretty: bool) -> Result<String> {
    let result = profile.name_extractor().extract_name(text);
    render(&result, pretty)
}

pub fn quantity(profile: &MatchProfile, text: &str, glued: bool, pretty: bool) -> Result<String> {
    let extractor = profile.quantity_extractor::<i64>()?;
    let results = if glued {
        extractor.find_glued_to_unit(text)
    } else {
        extractor.find_before_unit(text)
    };
    render(&results, pretty)
}

pub fn catalog(
    profile: &MatchProfile,
    entries: Vec<SearchItem<String>>,
    keywords: &[Keyword],
    min_score: Option<i32>,
    pretty: bool,
) -> Result<String> {
    let mut matcher = profile.catalog_matcher(entries);
    if let Some(min_score) = min_score {
        matcher.set_min_score(min_score);
    }
    render(&matcher.find_all(keywords), pretty)
}

pub fn best(
    profile: &MatchProfile,
    entries: Vec<SearchItem<String>>,
    default_value: Option<String>,
    text: &str,
    all: bool,
    pretty: bool,
) -> Result<String> {
    let default_entry = default_value.map(|value| SearchItem::new(value, 0));
    let matcher = profile.best_entry_matcher(entries, default_entry);
    if all {
        render(&matcher.find_all(text), pretty)
    } else {
        render(&matcher.find(text), pretty)
    }
}

pub fn analyze(
    profile: &MatchProfile,
    entries: Vec<SearchItem<String>>,
    text: &str,
    pretty: bool,
) -> Result<String> {
    let name = profile.name_extractor().extract_name(text);
    let extractor = profile.quantity_extractor::<i64>()?;
    let offers = if name.is_success() {
        profile
            .catalog_matcher(entries)
            .find_all(name.matched_keywords())
    } else {
        Vec::new()
    };

    let output = AnalyzeOutput {
        profile: profile.name().to_string(),
        quantities: extractor.find_before_unit(text),
        glued_quantities: extractor.find_glued_to_unit(text),
        offers,
        name,
    };
    render(&output, pretty)
}
