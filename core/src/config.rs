use crate::candidates::pairs::PairingPolicy;
use crate::error::{CoreError, CoreResult};
use crate::facts::store::{FactStore, DEFAULT_DEPENDENCY_FILE, DEFAULT_FACT_FILE};
use crate::oracle::endpoint::enforce_oracle_endpoint;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_ENV: &str = "COMPAT_ORACLE_MODEL";
pub const BASE_URL_ENV: &str = "COMPAT_ORACLE_BASE_URL";
pub const TIMEOUT_ENV: &str = "COMPAT_ORACLE_TIMEOUT_SECS";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    ApiConflict,
    DependencyConflict,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::ApiConflict => "api-conflict",
            AnalysisKind::DependencyConflict => "dependency-conflict",
        }
    }
}

/// Everything one run needs, passed explicitly into the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub repos_dir: PathBuf,
    pub fact_file_name: String,
    pub dependency_file_name: String,
    pub pairing_policy: PairingPolicy,
    /// Oracle worker pool size. 1 keeps calls sequential.
    pub workers: usize,
    pub output: OutputConfig,
    pub extractor: ExtractorConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            repos_dir: PathBuf::from("repos"),
            fact_file_name: DEFAULT_FACT_FILE.to_string(),
            dependency_file_name: DEFAULT_DEPENDENCY_FILE.to_string(),
            pairing_policy: PairingPolicy::ExhaustiveOrdered,
            workers: 1,
            output: OutputConfig::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| CoreError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .map_err(|e| CoreError::Config(format!("invalid config {}: {}", path.display(), e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.workers == 0 {
            return Err(CoreError::Config("workers must be at least 1".to_string()));
        }
        if self.fact_file_name.trim().is_empty() {
            return Err(CoreError::Config("fact_file_name is empty".to_string()));
        }
        if self.extractor.program.trim().is_empty() {
            return Err(CoreError::Config("extractor program is empty".to_string()));
        }
        Ok(())
    }

    pub fn fact_store(&self) -> FactStore {
        FactStore::new(&self.fact_file_name, &self.dependency_file_name)
    }
}

/// Where report artifacts land. Each file is overwritten on every run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub api_json: String,
    pub api_csv: String,
    pub dependency_json: String,
    pub dependency_csv: String,
    pub manifest: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            api_json: "api_conflict_results.json".to_string(),
            api_csv: "api_conflict_results.csv".to_string(),
            dependency_json: "dependency_conflict_results.json".to_string(),
            dependency_csv: "dependency_conflict_results.csv".to_string(),
            manifest: "run_manifest.json".to_string(),
        }
    }
}

impl OutputConfig {
    /// Point one analysis kind at an explicit JSON path; the CSV goes next to
    /// it with the same stem. The path must end in `.json` so the two
    /// artifacts never share a file.
    pub fn with_json_path(mut self, kind: AnalysisKind, json_path: &Path) -> CoreResult<Self> {
        let is_json = json_path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if !is_json {
            return Err(CoreError::Config(format!(
                "report path must end in .json: {}",
                json_path.display()
            )));
        }
        if let Some(parent) = json_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.dir = parent.to_path_buf();
        }
        let json_name = json_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = json_path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let csv_name = format!("{}.csv", stem);
        match kind {
            AnalysisKind::ApiConflict => {
                self.api_json = json_name;
                self.api_csv = csv_name;
            }
            AnalysisKind::DependencyConflict => {
                self.dependency_json = json_name;
                self.dependency_csv = csv_name;
            }
        }
        Ok(self)
    }

    pub fn json_path(&self, kind: AnalysisKind) -> PathBuf {
        match kind {
            AnalysisKind::ApiConflict => self.dir.join(&self.api_json),
            AnalysisKind::DependencyConflict => self.dir.join(&self.dependency_json),
        }
    }

    pub fn csv_path(&self, kind: AnalysisKind) -> PathBuf {
        match kind {
            AnalysisKind::ApiConflict => self.dir.join(&self.api_csv),
            AnalysisKind::DependencyConflict => self.dir.join(&self.dependency_csv),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(&self.manifest)
    }
}

/// External analyzer invocation. `{repo}` in any argument is replaced by the
/// repository path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractorConfig {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: "java".to_string(),
            args: vec![
                "-cp".to_string(),
                "springboot-backend/build/libs/springboot-backend-0.0.1-SNAPSHOT-all.jar"
                    .to_string(),
                "com.example.springboot_backend.RepoAnalysisModule".to_string(),
                "{repo}".to_string(),
            ],
            working_dir: None,
        }
    }
}

impl ExtractorConfig {
    pub fn args_for(&self, repo_root: &Path) -> Vec<String> {
        let repo = repo_root.to_string_lossy();
        self.args.iter().map(|a| a.replace("{repo}", &repo)).collect()
    }
}

/// Connection settings for the remote classifier.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl OracleConfig {
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary variable source. A missing credential is a
    /// startup failure.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CoreError::Config(format!("{} is not set", API_KEY_ENV)))?;
        let timeout_secs = match lookup(TIMEOUT_ENV) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                CoreError::Config(format!("{} must be a whole number of seconds", TIMEOUT_ENV))
            })?,
            None => 120,
        };
        let cfg = Self {
            base_url: lookup(BASE_URL_ENV)
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: lookup(MODEL_ENV).unwrap_or_else(|| "gpt-4o".to_string()),
            api_key,
            timeout_secs,
            temperature: 0.0,
        };
        enforce_oracle_endpoint(&cfg.base_url)?;
        Ok(cfg)
    }
}
