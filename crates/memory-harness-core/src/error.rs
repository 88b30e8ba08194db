//! Typed errors raised by the core engine.

use thiserror::Error;

use crate::models::Category;

/// A `category:value` token that cannot be turned into a [`Tag`](crate::models::Tag).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// The token has no `:` separating category from value.
    #[error("invalid tag format: `{0}` (expected category:value)")]
    MissingSeparator(String),

    /// Category or value is empty after trimming.
    #[error("invalid tag `{0}`: category and value must both be non-empty")]
    EmptyPart(String),

    /// Category or value contains `:`, `[` or `]`.
    #[error("invalid tag `{0}`: category and value must not contain ':', '[' or ']'")]
    IllegalCharacter(String),
}

/// Errors building a [`QueryClassifier`](crate::classify::QueryClassifier).
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// A category name that is not part of the closed set.
    #[error("unknown category `{0}`")]
    UnknownCategory(String),

    /// A rule pattern failed to compile.
    #[error("invalid pattern `{pattern}` for category `{category}`: {source}")]
    InvalidPattern {
        category: Category,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
