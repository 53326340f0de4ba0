use crate::candidates::pairs::PairingPolicy;
use crate::config::AnalysisKind;
use crate::determinism::json_canonical::to_canonical_bytes;
use crate::error::CoreResult;
use crate::facts::model::RepoFacts;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

#[derive(Serialize)]
struct RunInputs<'a> {
    analyses: BTreeSet<&'static str>,
    pairing_policy: &'static str,
    services: &'a [RepoFacts],
}

/// SHA-256 over the canonical JSON of the run inputs: the requested
/// analyses (order-insensitive), the pairing policy, and every loaded
/// repository's facts in discovery order.
pub fn inputs_fingerprint(
    facts: &[RepoFacts],
    policy: PairingPolicy,
    kinds: &[AnalysisKind],
) -> CoreResult<String> {
    let inputs = RunInputs {
        analyses: kinds.iter().map(|k| k.as_str()).collect(),
        pairing_policy: policy.as_str(),
        services: facts,
    };
    Ok(sha256_hex(&to_canonical_bytes(&inputs)?))
}

/// Identical inputs give the identical run id.
pub fn run_id_from_fingerprint(fingerprint_hex: &str) -> String {
    let hex: String = fingerprint_hex
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .take(32)
        .collect();
    format!("r_{}", hex.to_ascii_lowercase())
}
