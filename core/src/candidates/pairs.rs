use crate::error::CoreError;
use crate::facts::model::{Endpoint, RepoFacts};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How cross-service endpoint pairs are enumerated.
///
/// The two policies have different duplicate semantics and are kept apart on
/// purpose: `SameMethod` emits both directions of a logical pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PairingPolicy {
    /// Every endpoint of service A against every endpoint of each later
    /// service B. Each unordered service pair appears once; methods may differ.
    ExhaustiveOrdered,
    /// Every ordered endpoint pair across different services whose HTTP
    /// methods are identical.
    SameMethod,
}

impl PairingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairingPolicy::ExhaustiveOrdered => "exhaustive-ordered",
            PairingPolicy::SameMethod => "same-method",
        }
    }
}

impl FromStr for PairingPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exhaustive-ordered" | "exhaustive" => Ok(PairingPolicy::ExhaustiveOrdered),
            "same-method" => Ok(PairingPolicy::SameMethod),
            other => Err(CoreError::InvalidInput(format!(
                "unknown pairing policy: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidatePair {
    pub service_a: String,
    pub endpoint_a: Endpoint,
    pub service_b: String,
    pub endpoint_b: Endpoint,
}

impl CandidatePair {
    fn new(a: &Endpoint, b: &Endpoint) -> Self {
        Self {
            service_a: a.service.clone(),
            endpoint_a: a.clone(),
            service_b: b.service.clone(),
            endpoint_b: b.clone(),
        }
    }

    pub fn label(&self) -> String {
        format!(
            "{} {} {} <-> {} {} {}",
            self.service_a,
            self.endpoint_a.http_method,
            self.endpoint_a.path,
            self.service_b,
            self.endpoint_b.http_method,
            self.endpoint_b.path
        )
    }
}

pub struct PairGenerator {
    policy: PairingPolicy,
}

impl PairGenerator {
    pub fn new(policy: PairingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PairingPolicy {
        self.policy
    }

    /// `services` must be in discovery order; output order is deterministic.
    pub fn generate(&self, services: &[RepoFacts]) -> Vec<CandidatePair> {
        match self.policy {
            PairingPolicy::ExhaustiveOrdered => exhaustive_ordered(services),
            PairingPolicy::SameMethod => same_method(services),
        }
    }
}

fn exhaustive_ordered(services: &[RepoFacts]) -> Vec<CandidatePair> {
    let mut pairs = Vec::new();
    for (i, a) in services.iter().enumerate() {
        for b in &services[i + 1..] {
            if a.service == b.service {
                continue;
            }
            for ep_a in &a.endpoints {
                for ep_b in &b.endpoints {
                    pairs.push(CandidatePair::new(ep_a, ep_b));
                }
            }
        }
    }
    pairs
}

fn same_method(services: &[RepoFacts]) -> Vec<CandidatePair> {
    let all: Vec<&Endpoint> = services.iter().flat_map(|s| s.endpoints.iter()).collect();
    let mut pairs = Vec::new();
    for ep_a in &all {
        for ep_b in &all {
            if ep_a.service == ep_b.service {
                continue;
            }
            if ep_a.http_method != ep_b.http_method {
                continue;
            }
            pairs.push(CandidatePair::new(ep_a, ep_b));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(method: &str, path: &str) -> Endpoint {
        Endpoint {
            service: String::new(),
            http_method: method.to_string(),
            path: path.to_string(),
            class_name: "Ctrl".to_string(),
            method_name: "handle".to_string(),
        }
    }

    #[test]
    fn policy_names_parse() {
        assert_eq!(
            "same-method".parse::<PairingPolicy>().unwrap(),
            PairingPolicy::SameMethod
        );
        assert_eq!(
            "exhaustive-ordered".parse::<PairingPolicy>().unwrap(),
            PairingPolicy::ExhaustiveOrdered
        );
        assert!("random".parse::<PairingPolicy>().is_err());
    }

    #[test]
    fn exhaustive_ignores_method_and_never_reverses() {
        let services = vec![
            RepoFacts::new("a", vec![ep("GET", "/x"), ep("POST", "/y")], vec![]),
            RepoFacts::new("b", vec![ep("DELETE", "/z")], vec![]),
        ];
        let pairs = PairGenerator::new(PairingPolicy::ExhaustiveOrdered).generate(&services);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.service_a == "a" && p.service_b == "b"));
        assert_eq!(pairs[0].endpoint_a.path, "/x");
        assert_eq!(pairs[1].endpoint_a.path, "/y");
    }

    #[test]
    fn same_method_emits_both_directions() {
        let services = vec![
            RepoFacts::new("a", vec![ep("GET", "/x")], vec![]),
            RepoFacts::new("b", vec![ep("GET", "/x"), ep("PUT", "/x")], vec![]),
        ];
        let pairs = PairGenerator::new(PairingPolicy::SameMethod).generate(&services);
        assert_eq!(pairs.len(), 2);
        assert_eq!((pairs[0].service_a.as_str(), pairs[0].service_b.as_str()), ("a", "b"));
        assert_eq!((pairs[1].service_a.as_str(), pairs[1].service_b.as_str()), ("b", "a"));
    }

    #[test]
    fn method_match_is_exact() {
        let services = vec![
            RepoFacts::new("a", vec![ep("GET", "/x")], vec![]),
            RepoFacts::new("b", vec![ep("get", "/x")], vec![]),
        ];
        assert!(PairGenerator::new(PairingPolicy::SameMethod)
            .generate(&services)
            .is_empty());
    }
}
