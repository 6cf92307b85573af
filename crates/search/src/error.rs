use thiserror::Error;

use crate::quantity::NumericDomain;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("quantity type {type_name} has a {domain} domain; only integer domains are supported")]
    UnsupportedDomain {
        type_name: &'static str,
        domain: NumericDomain,
    },
}
