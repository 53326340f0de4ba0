use crate::config::ExtractorConfig;
use crate::error::{CoreError, CoreResult};
use crate::facts::model::RepoFacts;
use crate::facts::store::FactStore;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Produces facts for a repository that has none yet.
pub trait Extractor {
    fn extract(&self, repo_root: &Path) -> CoreResult<RepoFacts>;
}

/// Runs the external static analyzer as a blocking subprocess, then reads
/// the fact file it wrote.
pub struct SubprocessExtractor {
    config: ExtractorConfig,
    store: FactStore,
}

impl SubprocessExtractor {
    pub fn new(config: ExtractorConfig, store: FactStore) -> Self {
        Self { config, store }
    }
}

impl Extractor for SubprocessExtractor {
    fn extract(&self, repo_root: &Path) -> CoreResult<RepoFacts> {
        let args = self.config.args_for(repo_root);
        info!(
            "running analyzer: {} {}",
            self.config.program,
            args.join(" ")
        );
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&args);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }
        let output = cmd.output().map_err(|e| CoreError::Extraction {
            repo: repo_root.to_path_buf(),
            message: format!("failed to spawn {}: {}", self.config.program, e),
        })?;
        debug!(
            "analyzer exited with {} ({} bytes stdout)",
            output.status,
            output.stdout.len()
        );
        if !output.status.success() {
            return Err(CoreError::Extraction {
                repo: repo_root.to_path_buf(),
                message: format!(
                    "analyzer exited with {}: {}",
                    output.status,
                    stderr_tail(&output.stderr)
                ),
            });
        }

        match self.store.load_facts(repo_root) {
            Err(CoreError::MissingFacts(path)) => Err(CoreError::Extraction {
                repo: repo_root.to_path_buf(),
                message: format!("analyzer succeeded but did not write {}", path.display()),
            }),
            other => other,
        }
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(5);
    lines[start..].join(" | ")
}
