use std::path::PathBuf;

use thiserror::Error;

/// Rejections raised while validating a tree document.
///
/// `path` is the slash-joined chain of node names from the root down to the
/// offending node.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DocumentError {
    #[error("invalid document: {0}")]
    Json(String),
    #[error("invalid document: node at `{path}` is not an object")]
    NotAnObject { path: String },
    #[error("invalid document: node at `{path}` has no name")]
    MissingName { path: String },
    #[error("invalid document: node at `{path}` has a non-numeric value")]
    NonNumericValue { path: String },
    #[error("invalid document: node at `{path}` has value {value}, expected a finite number >= 0")]
    InvalidValue { path: String, value: f64 },
    #[error("invalid document: children of `{path}` is not an array")]
    ChildrenNotArray { path: String },
    #[error("invalid document: nesting below `{path}` exceeds {limit} levels")]
    TooDeep { path: String, limit: usize },
    #[error("invalid document: weights under `{path}` sum to a non-finite total")]
    WeightOverflow { path: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("no data: the document root has zero total weight")]
    NoData,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("pdf: {0}")]
    Pdf(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("palette entry `{0}` is not a #rrggbb colour")]
    BadColor(String),
    #[error("palette must contain at least one colour")]
    EmptyPalette,
}
