use crate::oracle::interface::OracleFailure;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no repositories discovered under {0}")]
    NoRepositories(PathBuf),

    #[error("fact file missing: {0}")]
    MissingFacts(PathBuf),

    #[error("malformed fact file {path}: {message}")]
    FactParse { path: PathBuf, message: String },

    #[error("extraction failed for {repo}: {message}")]
    Extraction { repo: PathBuf, message: String },

    #[error("oracle failure: {0}")]
    Oracle(OracleFailure),

    #[error("cannot write report {path}: {message}")]
    ReportWrite { path: PathBuf, message: String },

    #[error("invalid run transition: {0}")]
    InvalidTransition(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl CoreError {
    /// Fatal errors abort the whole run; everything else is handled per
    /// repository or per candidate.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::NoRepositories(_)
                | CoreError::ReportWrite { .. }
                | CoreError::Config(_)
                | CoreError::InvalidTransition(_)
        )
    }
}

impl From<OracleFailure> for CoreError {
    fn from(f: OracleFailure) -> Self {
        CoreError::Oracle(f)
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
