use crate::candidates::dependencies::DependencyGroup;
use crate::candidates::pairs::CandidatePair;
use crate::error::CoreResult;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VerdictKind {
    Conflict,
    Equivalent,
    #[serde(rename = "No Conflict")]
    NoConflict,
    /// The response named none of the expected verdicts. Kept in the report
    /// for a human to review.
    Unclassified,
}

impl VerdictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictKind::Conflict => "Conflict",
            VerdictKind::Equivalent => "Equivalent",
            VerdictKind::NoConflict => "No Conflict",
            VerdictKind::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const ENDPOINT_VERDICTS: &[VerdictKind] = &[
    VerdictKind::Conflict,
    VerdictKind::Equivalent,
    VerdictKind::NoConflict,
];

pub const DEPENDENCY_VERDICTS: &[VerdictKind] = &[VerdictKind::Conflict, VerdictKind::NoConflict];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    pub kind: VerdictKind,
    /// Full oracle text, unmodified.
    pub reasoning: String,
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OracleErrorCategory {
    TIMEOUT,
    TRANSPORT,
    HTTP_STATUS,
    MALFORMED_RESPONSE,
    EMPTY_RESPONSE,
    PROMPT_TEMPLATE,
    RUNTIME_ERROR,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OracleFailure {
    pub category: OracleErrorCategory,
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl OracleFailure {
    pub fn new(category: OracleErrorCategory, message: impl Into<String>) -> Self {
        let (code, retryable) = match category {
            OracleErrorCategory::TIMEOUT => ("ORACLE_TIMEOUT", true),
            OracleErrorCategory::TRANSPORT => ("ORACLE_TRANSPORT", true),
            OracleErrorCategory::HTTP_STATUS => ("ORACLE_HTTP_STATUS", false),
            OracleErrorCategory::MALFORMED_RESPONSE => ("ORACLE_MALFORMED_RESPONSE", false),
            OracleErrorCategory::EMPTY_RESPONSE => ("ORACLE_EMPTY_RESPONSE", false),
            OracleErrorCategory::PROMPT_TEMPLATE => ("ORACLE_PROMPT_TEMPLATE", false),
            OracleErrorCategory::RUNTIME_ERROR => ("RUNTIME_ERROR", false),
        };
        Self {
            category,
            code: code.to_string(),
            message: message.into(),
            retryable,
        }
    }
}

impl fmt::Display for OracleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Semantic classifier for candidates. Calls may be slow and may fail; a
/// failure only drops the candidate at hand.
pub trait ConflictOracle: Sync {
    fn classify_endpoints(&self, pair: &CandidatePair) -> CoreResult<Verdict>;
    fn classify_dependency(&self, group: &DependencyGroup) -> CoreResult<Verdict>;
}

/// Map a free-text transport error onto a failure category.
pub fn classify_oracle_error(err: &str) -> OracleFailure {
    let lower = err.to_ascii_lowercase();
    let category = if lower.contains("timeout") || lower.contains("timed out") {
        OracleErrorCategory::TIMEOUT
    } else if lower.contains("connection") || lower.contains("dns") || lower.contains("connect")
    {
        OracleErrorCategory::TRANSPORT
    } else if lower.contains("status") {
        OracleErrorCategory::HTTP_STATUS
    } else if lower.contains("decode") || lower.contains("json") {
        OracleErrorCategory::MALFORMED_RESPONSE
    } else {
        OracleErrorCategory::RUNTIME_ERROR
    };
    OracleFailure::new(category, err)
}
