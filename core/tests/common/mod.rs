#![allow(dead_code)]

use compat_core::candidates::dependencies::DependencyGroup;
use compat_core::candidates::pairs::CandidatePair;
use compat_core::config::AnalysisConfig;
use compat_core::error::{CoreError, CoreResult};
use compat_core::facts::extractor::Extractor;
use compat_core::facts::model::{Dependency, Endpoint, RepoFacts};
use compat_core::oracle::interface::{
    ConflictOracle, OracleErrorCategory, OracleFailure, Verdict, VerdictKind,
};
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn endpoint(method: &str, path: &str) -> Endpoint {
    Endpoint {
        service: String::new(),
        http_method: method.to_string(),
        path: path.to_string(),
        class_name: "com.example.Controller".to_string(),
        method_name: format!("handle{}", path.replace('/', "_")),
    }
}

pub fn dependency(name: &str, version: &str) -> Dependency {
    Dependency {
        name: Some(name.to_string()),
        version: Some(version.to_string()),
        service: String::new(),
        source: Some("build.gradle".to_string()),
        path: None,
    }
}

pub fn service(name: &str, endpoints: &[(&str, &str)], deps: &[(&str, &str)]) -> RepoFacts {
    RepoFacts::new(
        name,
        endpoints.iter().map(|(m, p)| endpoint(m, p)).collect(),
        deps.iter().map(|(n, v)| dependency(n, v)).collect(),
    )
}

/// Write `<root>/<name>/analysis_result.json` in the analyzer's format.
pub fn write_repo(
    root: &Path,
    name: &str,
    endpoints: &[(&str, &str)],
    deps: &[(&str, &str)],
) -> PathBuf {
    let repo = root.join(name);
    std::fs::create_dir_all(&repo).unwrap();
    let endpoints: Vec<_> = endpoints
        .iter()
        .map(|(m, p)| {
            json!({
                "httpMethod": m,
                "path": p,
                "className": "com.example.Controller",
                "methodName": format!("handle{}", p.replace('/', "_")),
            })
        })
        .collect();
    let deps: Vec<_> = deps
        .iter()
        .map(|(n, v)| json!({"name": n, "version": v, "source": "build.gradle"}))
        .collect();
    let doc = json!({
        "config": {"basePackage": "com.example"},
        "endpoints": endpoints,
        "dependencies": deps,
    });
    std::fs::write(
        repo.join("analysis_result.json"),
        serde_json::to_vec_pretty(&doc).unwrap(),
    )
    .unwrap();
    repo
}

pub fn config_for(repos_dir: &Path, out_dir: &Path) -> AnalysisConfig {
    let mut cfg = AnalysisConfig::default();
    cfg.repos_dir = repos_dir.to_path_buf();
    cfg.output.dir = out_dir.to_path_buf();
    cfg
}

type EndpointRule = Box<dyn Fn(&CandidatePair) -> CoreResult<String> + Send + Sync>;
type DependencyRule = Box<dyn Fn(&DependencyGroup) -> CoreResult<String> + Send + Sync>;

/// Oracle stub driven by closures. Counts calls per kind.
pub struct StubOracle {
    endpoint_rule: EndpointRule,
    dependency_rule: DependencyRule,
    pub endpoint_calls: AtomicUsize,
    pub dependency_calls: AtomicUsize,
}

impl StubOracle {
    pub fn answering(text: &'static str) -> Self {
        Self::with_rules(
            Box::new(move |_| Ok(text.to_string())),
            Box::new(move |_| Ok(text.to_string())),
        )
    }

    pub fn with_rules(endpoint_rule: EndpointRule, dependency_rule: DependencyRule) -> Self {
        Self {
            endpoint_rule,
            dependency_rule,
            endpoint_calls: AtomicUsize::new(0),
            dependency_calls: AtomicUsize::new(0),
        }
    }

    pub fn endpoint_calls(&self) -> usize {
        self.endpoint_calls.load(Ordering::SeqCst)
    }

    pub fn dependency_calls(&self) -> usize {
        self.dependency_calls.load(Ordering::SeqCst)
    }
}

fn to_verdict(text: String, allowed: &[VerdictKind]) -> CoreResult<Verdict> {
    compat_core::oracle::response::parse_verdict(&text, allowed)
}

impl ConflictOracle for StubOracle {
    fn classify_endpoints(&self, pair: &CandidatePair) -> CoreResult<Verdict> {
        self.endpoint_calls.fetch_add(1, Ordering::SeqCst);
        to_verdict(
            (self.endpoint_rule)(pair)?,
            compat_core::oracle::interface::ENDPOINT_VERDICTS,
        )
    }

    fn classify_dependency(&self, group: &DependencyGroup) -> CoreResult<Verdict> {
        self.dependency_calls.fetch_add(1, Ordering::SeqCst);
        to_verdict(
            (self.dependency_rule)(group)?,
            compat_core::oracle::interface::DEPENDENCY_VERDICTS,
        )
    }
}

pub fn timeout() -> CoreError {
    OracleFailure::new(OracleErrorCategory::TIMEOUT, "request timed out").into()
}

/// Extractor stub: canned facts per directory name, or an extraction error.
#[derive(Default)]
pub struct StubExtractor {
    pub facts: HashMap<String, RepoFacts>,
    pub calls: Mutex<Vec<PathBuf>>,
}

impl StubExtractor {
    pub fn with(mut self, facts: RepoFacts) -> Self {
        self.facts.insert(facts.service.clone(), facts);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Extractor for StubExtractor {
    fn extract(&self, repo_root: &Path) -> CoreResult<RepoFacts> {
        self.calls.lock().unwrap().push(repo_root.to_path_buf());
        let name = repo_root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.facts
            .get(&name)
            .cloned()
            .ok_or_else(|| CoreError::Extraction {
                repo: repo_root.to_path_buf(),
                message: "analyzer exited with status 1".to_string(),
            })
    }
}
