use crate::report::writer::ArtifactRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExcludedRepository {
    pub service: String,
    pub path: String,
    pub reason: String,
}

/// Per analysis kind counters plus the artifacts written for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KindSummary {
    pub kind: String,
    pub candidates: usize,
    pub results: usize,
    pub oracle_failures: usize,
    pub unclassified: usize,
    pub artifacts: Vec<ArtifactRecord>,
}

/// Generation metadata for one run, written as the run manifest.
///
/// `generated_at` is the only field that differs between two runs over the
/// same facts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: String,
    pub generated_at: String,
    pub inputs_fingerprint: String,
    pub pairing_policy: String,
    pub repositories_discovered: usize,
    pub repositories_extracted: usize,
    pub repositories_loaded: usize,
    pub excluded_repositories: Vec<ExcludedRepository>,
    pub analyses: Vec<KindSummary>,
    pub warnings: usize,
}

impl RunSummary {
    pub fn total_results(&self) -> usize {
        self.analyses.iter().map(|a| a.results).sum()
    }

    pub fn kind(&self, kind: &str) -> Option<&KindSummary> {
        self.analyses.iter().find(|a| a.kind == kind)
    }
}

pub fn now_rfc3339_utc() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
