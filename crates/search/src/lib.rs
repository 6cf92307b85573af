//! Separator-aware matching for short free-text queries.
//!
//! Every matcher works on whole tokens: a candidate only counts when it is
//! bounded by the start or end of the text or by one of the configured
//! separators. On top of that the crate extracts a clean product name, finds
//! quantities next to unit words and ranks catalog entries by keywords.

mod best;
mod boundary;
mod catalog;
mod error;
mod name;
mod profile;
mod quantity;
mod separators;
mod words;

pub use best::BestEntryMatcher;
pub use boundary::{BoundaryMatcher, IndexMap};
pub use catalog::CatalogKeywordMatcher;
pub use error::{Result, SearchError};
pub use name::{NameExtractor, DEFAULT_JOIN_SEPARATOR};
pub use profile::{CatalogConfig, CharacterClass, CleanNameConfig, MatchProfile, QuantityConfig};
pub use quantity::{NumericDomain, QuantityExtractor, QuantityValue};
pub use separators::Separators;
pub use words::WordLocator;

pub use querykit_protocol::{Keyword, SearchItem, SearchResult, SearchStatus, SynonymGroup};
