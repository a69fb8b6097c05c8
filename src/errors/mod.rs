use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnoncredsError {
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
    #[error("Item not found: {0}")]
    ItemNotFound(String),
    #[error("Predicate is not satisfied: {0}")]
    PredicateNotSatisfied(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

pub type AnoncredsResult<T> = Result<T, AnoncredsError>;

pub mod prelude {
    pub use super::{AnoncredsError, AnoncredsResult};
}
