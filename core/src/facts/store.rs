use crate::error::{CoreError, CoreResult};
use crate::facts::model::{Dependency, FactFile, RepoFacts};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FACT_FILE: &str = "analysis_result.json";
pub const DEFAULT_DEPENDENCY_FILE: &str = "extracted_dependencies.json";

/// Read-only access to the per-repository fact files written by the analyzer.
#[derive(Debug, Clone)]
pub struct FactStore {
    fact_file_name: String,
    dependency_file_name: String,
}

impl Default for FactStore {
    fn default() -> Self {
        Self::new(DEFAULT_FACT_FILE, DEFAULT_DEPENDENCY_FILE)
    }
}

impl FactStore {
    pub fn new(fact_file_name: &str, dependency_file_name: &str) -> Self {
        Self {
            fact_file_name: fact_file_name.to_string(),
            dependency_file_name: dependency_file_name.to_string(),
        }
    }

    pub fn fact_path(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.fact_file_name)
    }

    pub fn has_facts(&self, repo_root: &Path) -> bool {
        self.fact_path(repo_root).is_file()
    }

    /// Load endpoints and dependencies for one repository.
    ///
    /// Returns `MissingFacts` when the fact file is absent. Dependencies come
    /// from the fact file's `dependencies` key, or from the sibling dependency
    /// file when the key is absent.
    pub fn load_facts(&self, repo_root: &Path) -> CoreResult<RepoFacts> {
        let path = self.fact_path(repo_root);
        if !path.is_file() {
            return Err(CoreError::MissingFacts(path));
        }
        let bytes = fs::read(&path)?;
        let file: FactFile = serde_json::from_slice(&bytes).map_err(|e| CoreError::FactParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let dependencies = match file.dependencies {
            Some(deps) => deps,
            None => self.load_sibling_dependencies(repo_root)?,
        };

        let service = service_name(repo_root)?;
        let facts = RepoFacts::new(&service, file.endpoints, dependencies);
        validate_endpoints(&path, &facts)?;
        Ok(facts)
    }

    fn load_sibling_dependencies(&self, repo_root: &Path) -> CoreResult<Vec<Dependency>> {
        let path = repo_root.join(&self.dependency_file_name);
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes).map_err(|e| CoreError::FactParse {
            path,
            message: e.to_string(),
        })
    }
}

/// Service identity is the repository directory name.
pub fn service_name(repo_root: &Path) -> CoreResult<String> {
    repo_root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "repository path has no directory name: {}",
                repo_root.display()
            ))
        })
}

fn validate_endpoints(path: &Path, facts: &RepoFacts) -> CoreResult<()> {
    for (idx, ep) in facts.endpoints.iter().enumerate() {
        if ep.http_method.trim().is_empty() || ep.path.trim().is_empty() {
            return Err(CoreError::FactParse {
                path: path.to_path_buf(),
                message: format!("endpoint #{} has an empty httpMethod or path", idx),
            });
        }
    }
    Ok(())
}
