//! Error types for the converter.
use std::path::PathBuf;

/// Fatal errors. The run stops and exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read input file '{}': {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input file '{}' contains no filter rules", .path.display())]
    EmptyInput { path: PathBuf },
    #[error("cannot write output file '{}': {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration '{}': {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

/// Reasons a single rule could not be converted. The rule is skipped and
/// the rest of the file is still converted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("unsupported operator '{operator}' for '{attribute}'")]
    UnsupportedOperator { attribute: String, operator: String },
    #[error("unsupported action '{0}'")]
    UnsupportedAction(String),
    #[error("unsupported search field '{0}'")]
    UnsupportedField(String),
    #[error("malformed condition '{raw}': {reason}")]
    MalformedCondition { raw: String, reason: String },
    #[error("action '{0}' has no value")]
    MissingActionValue(String),
    #[error("target folder is Trash ('{0}')")]
    TrashTarget(String),
    #[error("rule is disabled")]
    Disabled,
    #[error("rule has no condition")]
    NoConditions,
    #[error("rule has no action")]
    NoActions,
}

/// A condition field contained quote characters that had to be sanitized
/// before emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteWarning {
    pub rule: String,
    pub field: String,
    pub original: String,
    pub sanitized: String,
}

pub type Result<T> = std::result::Result<T, Error>;
