use crate::record::Field;
use thiserror::Error;

/// No known naming convention matched the path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized naming convention: {path}")]
pub struct UnrecognizedFormatError {
    pub path: String,
}

/// A required token was missing or malformed under the matched convention
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to parse {field}: {reason}")]
pub struct MetadataParseError {
    pub field: Field,
    pub reason: String,
}

impl MetadataParseError {
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    /// Positional token lookup fell off the end of a split
    pub fn out_of_range(field: Field, what: &str, index: isize, len: usize) -> Self {
        Self::new(
            field,
            format!("{} has {} tokens, no token at index {}", what, len, index),
        )
    }
}

/// Everything that can stop a single path from normalizing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error(transparent)]
    Unrecognized(#[from] UnrecognizedFormatError),

    #[error(transparent)]
    Parse(#[from] MetadataParseError),
}

/// Non-fatal: a laterality or channel token fell outside the known
/// enumeration and was resolved to its fallback value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousEnumerationWarning {
    pub field: Field,
    pub token: String,
    pub resolved: String,
}

impl std::fmt::Display for AmbiguousEnumerationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} token {:?} not recognized, using {}",
            self.field, self.token, self.resolved
        )
    }
}
