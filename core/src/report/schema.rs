use crate::candidates::dependencies::{DependencyGroup, VersionUsage};
use crate::candidates::pairs::CandidatePair;
use crate::facts::model::Endpoint;
use crate::oracle::interface::{Verdict, VerdictKind};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Column order of the endpoint CSV artifact.
pub const ENDPOINT_CSV_COLUMNS: &[&str] = &[
    "service_a",
    "endpoint_a_class",
    "endpoint_a_method",
    "endpoint_a_http",
    "endpoint_a_path",
    "service_b",
    "endpoint_b_class",
    "endpoint_b_method",
    "endpoint_b_http",
    "endpoint_b_path",
    "llm_reasoning",
    "verdict",
];

/// Column order of the dependency CSV artifact.
pub const DEPENDENCY_CSV_COLUMNS: &[&str] =
    &["dependency", "versions", "services", "llm_reasoning", "verdict"];

/// One classified endpoint pair. Field order is the JSON key order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EndpointConflictResult {
    pub service_a: String,
    pub endpoint_a: Endpoint,
    pub service_b: String,
    pub endpoint_b: Endpoint,
    pub llm_reasoning: String,
    pub verdict: VerdictKind,
}

impl EndpointConflictResult {
    pub fn new(pair: &CandidatePair, verdict: Verdict) -> Self {
        Self {
            service_a: pair.service_a.clone(),
            endpoint_a: pair.endpoint_a.clone(),
            service_b: pair.service_b.clone(),
            endpoint_b: pair.endpoint_b.clone(),
            llm_reasoning: verdict.reasoning,
            verdict: verdict.kind,
        }
    }

    pub fn csv_record(&self) -> Vec<String> {
        vec![
            self.service_a.clone(),
            self.endpoint_a.class_name.clone(),
            self.endpoint_a.method_name.clone(),
            self.endpoint_a.http_method.clone(),
            self.endpoint_a.path.clone(),
            self.service_b.clone(),
            self.endpoint_b.class_name.clone(),
            self.endpoint_b.method_name.clone(),
            self.endpoint_b.http_method.clone(),
            self.endpoint_b.path.clone(),
            self.llm_reasoning.clone(),
            self.verdict.to_string(),
        ]
    }
}

/// One classified dependency group.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DependencyConflictResult {
    pub dependency: String,
    pub versions: Vec<String>,
    #[serde(serialize_with = "serialize_usages")]
    pub services: Vec<VersionUsage>,
    pub latest_version: Option<String>,
    pub llm_reasoning: String,
    pub verdict: VerdictKind,
}

impl DependencyConflictResult {
    pub fn new(group: &DependencyGroup, verdict: Verdict) -> Self {
        Self {
            dependency: group.name.clone(),
            versions: group.versions(),
            services: group.usages.clone(),
            latest_version: group.latest_version.clone(),
            llm_reasoning: verdict.reasoning,
            verdict: verdict.kind,
        }
    }

    /// `version -> [service, ...]` as a single JSON-encoded cell.
    pub fn services_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&UsageMap(&self.services))
    }
}

struct UsageMap<'a>(&'a [VersionUsage]);

impl Serialize for UsageMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_usages(self.0, serializer)
    }
}

fn serialize_usages<S: Serializer>(usages: &[VersionUsage], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(usages.len()))?;
    for usage in usages {
        map.serialize_entry(&usage.version, &usage.services)?;
    }
    map.end()
}
