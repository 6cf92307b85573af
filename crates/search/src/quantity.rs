use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use querykit_protocol::{merge_keywords_by_name, Keyword, SearchItem, SearchResult};

use crate::boundary::{BoundaryMatcher, IndexMap};
use crate::error::{Result, SearchError};
use crate::separators::Separators;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericDomain {
    SignedInteger,
    UnsignedInteger,
    Float,
}

impl NumericDomain {
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::SignedInteger | Self::UnsignedInteger)
    }
}

impl fmt::Display for NumericDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SignedInteger => "signed integer",
            Self::UnsignedInteger => "unsigned integer",
            Self::Float => "floating point",
        };
        f.write_str(label)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Numeric types a quantity can be parsed into.
///
/// The set is closed. Only integer domains are accepted by
/// [`QuantityExtractor::new`]; float types exist so the rejection is a
/// reported configuration error rather than a missing impl.
pub trait QuantityValue: sealed::Sealed + FromStr + Clone + Send + Sync + 'static {
    const DOMAIN: NumericDomain;

    /// Converts a whole number from configuration, `None` when out of range.
    fn from_whole(value: i64) -> Option<Self>;
}

macro_rules! integer_quantity {
    ($domain:expr => $($ty:ty),+) => {
        $(
            impl sealed::Sealed for $ty {}

            impl QuantityValue for $ty {
                const DOMAIN: NumericDomain = $domain;

                fn from_whole(value: i64) -> Option<Self> {
                    Self::try_from(value).ok()
                }
            }
        )+
    };
}

integer_quantity!(NumericDomain::SignedInteger => i8, i16, i32, i64);
integer_quantity!(NumericDomain::UnsignedInteger => u8, u16, u32, u64);

macro_rules! float_quantity {
    ($($ty:ty),+) => {
        $(
            impl sealed::Sealed for $ty {}

            impl QuantityValue for $ty {
                const DOMAIN: NumericDomain = NumericDomain::Float;

                #[allow(clippy::cast_precision_loss)]
                fn from_whole(value: i64) -> Option<Self> {
                    Some(value as $ty)
                }
            }
        )+
    };
}

float_quantity!(f32, f64);

type Parser<T> = Box<dyn Fn(&str) -> Option<T> + Send + Sync>;

/// Finds numbers attached to unit keywords, e.g. `"13 pcs"` or `"13pcs"`.
///
/// The token right before a unit is resolved through the spelled-number
/// table first (`"two" -> 2`) and then through the numeric parser. Tokens
/// neither of them understands are skipped.
pub struct QuantityExtractor<T: QuantityValue> {
    matcher: BoundaryMatcher,
    units: Vec<Keyword>,
    spelled_numbers: HashMap<String, T>,
    parser: Parser<T>,
}

impl<T: QuantityValue> fmt::Debug for QuantityExtractor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuantityExtractor")
            .field("separators", self.matcher.separators())
            .field("units", &self.units)
            .field("spelled_numbers", &self.spelled_numbers.len())
            .finish_non_exhaustive()
    }
}

impl<T: QuantityValue> QuantityExtractor<T> {
    /// Fails with [`SearchError::UnsupportedDomain`] unless `T` is an integer type.
    pub fn new(separators: Separators, units: impl IntoIterator<Item = Keyword>) -> Result<Self> {
        if !T::DOMAIN.is_integer() {
            return Err(SearchError::UnsupportedDomain {
                type_name: std::any::type_name::<T>(),
                domain: T::DOMAIN,
            });
        }

        let mut extractor = Self {
            matcher: BoundaryMatcher::new(separators),
            units: Vec::new(),
            spelled_numbers: HashMap::new(),
            parser: Box::new(|token: &str| token.parse::<T>().ok()),
        };
        extractor.set_units(units);
        Ok(extractor)
    }

    /// Replaces the numeric parser, e.g. with a locale-aware one.
    #[must_use]
    pub fn with_parser(mut self, parser: impl Fn(&str) -> Option<T> + Send + Sync + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    #[must_use]
    pub fn with_spelled_numbers(mut self, spelled: impl IntoIterator<Item = (String, T)>) -> Self {
        self.set_spelled_numbers(spelled);
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
    pub fn units(&self) -> &[Keyword] {
        &self.units
    }

    /// Replaces the unit keywords; units without a name are dropped.
    pub fn set_units(&mut self, units: impl IntoIterator<Item = Keyword>) {
        self.units = units
            .into_iter()
            .filter(|unit| !unit.name.is_empty())
            .collect();
    }

    #[must_use]
    pub const fn spelled_numbers(&self) -> &HashMap<String, T> {
        &self.spelled_numbers
    }

    pub fn set_spelled_numbers(&mut self, spelled: impl IntoIterator<Item = (String, T)>) {
        self.spelled_numbers = spelled.into_iter().collect();
    }

    /// Quantities written before a unit and separated from it: `"13 pcs"`.
    #[must_use]
    pub fn find_before_unit(&self, text: &str) -> Vec<SearchResult<T>> {
        let occurrences = self.matcher.index_map_bounded(text, &self.unit_names());
        self.collect_quantities(text, &occurrences, false)
    }

    /// Quantities glued to the unit: `"13pcs"`. Occurrences preceded by a
    /// separator are left to [`Self::find_before_unit`].
    #[must_use]
    pub fn find_glued_to_unit(&self, text: &str) -> Vec<SearchResult<T>> {
        let occurrences = self.matcher.index_map_end_bounded(text, &self.unit_names());
        self.collect_quantities(text, &occurrences, true)
    }

    fn unit_names(&self) -> Vec<&str> {
        self.units.iter().map(|unit| unit.name.as_str()).collect()
    }

    fn collect_quantities(
        &self,
        text: &str,
        occurrences: &IndexMap,
        glued: bool,
    ) -> Vec<SearchResult<T>> {
        let mut offsets: Vec<usize> = occurrences
            .values()
            .flatten()
            .copied()
            .filter(|&offset| offset != 0)
            .collect();
        offsets.sort_unstable();
        offsets.dedup();

        let results: Vec<SearchResult<T>> = offsets
            .into_iter()
            .filter_map(|offset| self.quantity_at(text, occurrences, offset, glued))
            .collect();

        log::debug!(
            "Quantity search (glued={}): {} results in '{}'",
            glued,
            results.len(),
            text
        );
        results
    }

    fn quantity_at(
        &self,
        text: &str,
        occurrences: &IndexMap,
        offset: usize,
        glued: bool,
    ) -> Option<SearchResult<T>> {
        let before = &text[..offset];
        if glued && self.separators().ends_with_separator(before) {
            return None;
        }

        let token = self.separators().split(before).pop()?;
        let Some(value) = self.resolve(token) else {
            log::trace!("Skipping unit at {offset}: '{token}' is not a quantity");
            return None;
        };

        let anchored: Vec<Keyword> = self
            .units
            .iter()
            .filter(|unit| {
                occurrences
                    .get(&unit.name)
                    .is_some_and(|offsets| offsets.contains(&offset))
            })
            .cloned()
            .collect();
        let units = merge_keywords_by_name(&anchored);

        Some(SearchResult::success(
            SearchItem::with_keywords(value, units.clone(), 1),
            units,
        ))
    }

    fn resolve(&self, token: &str) -> Option<T> {
        self.spelled_numbers
            .get(token)
            .cloned()
            .or_else(|| (self.parser)(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn extractor() -> QuantityExtractor<i32> {
        QuantityExtractor::new(Separators::new([" "]), [Keyword::new("unit")]).unwrap()
    }

    fn quantities<T: QuantityValue + Copy>(results: &[SearchResult<T>]) -> Vec<T> {
        results
            .iter()
            .filter_map(|result| result.item().map(|item| item.value))
            .collect()
    }

    #[test]
    fn finds_quantity_before_unit() {
        let results = extractor().find_before_unit("how much is adobe photoshop cloud 13 unit");
        assert_eq!(quantities(&results), vec![13]);
        assert_eq!(results[0].matched_keywords(), &[Keyword::new("unit")]);
        assert_eq!(results[0].match_score(), 1);
        assert!(results[0].is_success());
        assert_eq!(results[0].item().map(|item| item.priority), Some(1));
    }

    #[test]
    fn glued_and_separated_modes_are_exclusive() {
        let extractor = extractor();
        assert_eq!(quantities(&extractor.find_glued_to_unit("13unit")), vec![13]);
        assert!(extractor.find_before_unit("13unit").is_empty());

        assert!(extractor.find_glued_to_unit("13 unit").is_empty());
        assert_eq!(quantities(&extractor.find_before_unit("13 unit")), vec![13]);
    }

    #[test]
    fn unit_at_start_or_after_words_yields_nothing() {
        let extractor = extractor();
        assert!(extractor.find_before_unit("unit 13").is_empty());
        assert!(extractor.find_before_unit("one more unit").is_empty());
        assert!(extractor.find_glued_to_unit("abc13unit").is_empty());
    }

    #[test]
    fn spelled_numbers_take_precedence() {
        let extractor = extractor().with_spelled_numbers([
            ("two".to_string(), 2),
            ("13".to_string(), 31),
        ]);
        let results = extractor.find_before_unit("two unit and 13 unit");
        assert_eq!(quantities(&results), vec![2, 31]);
    }

    #[test]
    fn custom_parser_is_used() {
        let extractor = extractor().with_parser(|token| token.replace('_', "").parse().ok());
        let results = extractor.find_before_unit("1_000 unit");
        assert_eq!(quantities(&results), vec![1000]);
    }

    #[test]
    fn units_at_same_offset_merge() {
        let extractor = QuantityExtractor::<u16>::new(
            Separators::new([" "]),
            [
                Keyword::with_score("pcs", 2),
                Keyword::with_score("pcs box", 3),
                Keyword::with_score("pcs", 9),
            ],
        )
        .unwrap();

        let results = extractor.find_before_unit("5 pcs box");

        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].matched_keywords(),
            &[Keyword::with_score("pcs", 2), Keyword::with_score("pcs box", 3)]
        );
        assert_eq!(results[0].match_score(), 5);
    }

    #[test]
    fn overflow_is_skipped() {
        let extractor = QuantityExtractor::<u8>::new(Separators::new([" "]), [Keyword::new("unit")])
            .unwrap();
        let results = extractor.find_before_unit("300 unit 30 unit");
        assert_eq!(quantities(&results), vec![30]);
    }

    #[test]
    fn float_domain_is_rejected_at_construction() {
        let err = QuantityExtractor::<f64>::new(Separators::new([" "]), [Keyword::new("kg")])
            .unwrap_err();
        assert!(matches!(
            err,
            SearchError::UnsupportedDomain {
                domain: NumericDomain::Float,
                ..
            }
        ));
        assert!(err.to_string().contains("f64"), "{err}");
    }

    #[test]
    fn unnamed_units_are_dropped() {
        let extractor = QuantityExtractor::<i64>::new(
            Separators::new([" "]),
            [Keyword::new(""), Keyword::new("unit")],
        )
        .unwrap();
        assert_eq!(extractor.units(), &[Keyword::new("unit")]);
    }

    proptest! {
        #[test]
        fn proptest_reads_any_i64(value in any::<i64>(), glued in any::<bool>()) {
            let extractor = QuantityExtractor::<i64>::new(
                Separators::new([" "]),
                [Keyword::new("pcs")],
            )
            .unwrap();
            let results = if glued {
                extractor.find_glued_to_unit(&format!("need {value}pcs"))
            } else {
                extractor.find_before_unit(&format!("need {value} pcs"))
            };
            prop_assert_eq!(quantities(&results), vec![value]);
        }
    }
}
