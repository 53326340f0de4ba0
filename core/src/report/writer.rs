use crate::config::{AnalysisKind, OutputConfig};
use crate::determinism::fingerprint::sha256_hex;
use crate::error::{CoreError, CoreResult};
use crate::report::schema::{
    DependencyConflictResult, EndpointConflictResult, DEPENDENCY_CSV_COLUMNS,
    ENDPOINT_CSV_COLUMNS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A file written by the report writer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub path: String,
    pub sha256: String,
    pub bytes: u64,
    pub content_type: String,
}

pub fn render_endpoint_json(results: &[EndpointConflictResult]) -> CoreResult<String> {
    let mut s = serde_json::to_string_pretty(results)?;
    s.push('\n');
    Ok(s)
}

pub fn render_dependency_json(results: &[DependencyConflictResult]) -> CoreResult<String> {
    let mut s = serde_json::to_string_pretty(results)?;
    s.push('\n');
    Ok(s)
}

pub fn render_endpoint_csv(results: &[EndpointConflictResult]) -> CoreResult<String> {
    let mut wtr = csv_writer();
    wtr.write_record(ENDPOINT_CSV_COLUMNS)?;
    for r in results {
        wtr.write_record(r.csv_record())?;
    }
    finish_csv(wtr)
}

pub fn render_dependency_csv(results: &[DependencyConflictResult]) -> CoreResult<String> {
    let mut wtr = csv_writer();
    wtr.write_record(DEPENDENCY_CSV_COLUMNS)?;
    for r in results {
        wtr.write_record(&[
            r.dependency.clone(),
            r.versions.join(", "),
            r.services_json()?,
            r.llm_reasoning.clone(),
            r.verdict.to_string(),
        ])?;
    }
    finish_csv(wtr)
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![])
}

fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> CoreResult<String> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).to_string())
}

/// Writes the JSON + CSV artifact pair for each analysis kind. Prior content
/// is always replaced.
pub struct ReportWriter {
    output: OutputConfig,
}

impl ReportWriter {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }

    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    pub fn write_endpoint_report(
        &self,
        results: &[EndpointConflictResult],
    ) -> CoreResult<Vec<ArtifactRecord>> {
        let kind = AnalysisKind::ApiConflict;
        let json = render_endpoint_json(results)?;
        let csv = render_endpoint_csv(results)?;
        Ok(vec![
            write_artifact(&self.output.json_path(kind), &json, "application/json")?,
            write_artifact(&self.output.csv_path(kind), &csv, "text/csv")?,
        ])
    }

    pub fn write_dependency_report(
        &self,
        results: &[DependencyConflictResult],
    ) -> CoreResult<Vec<ArtifactRecord>> {
        let kind = AnalysisKind::DependencyConflict;
        let json = render_dependency_json(results)?;
        let csv = render_dependency_csv(results)?;
        Ok(vec![
            write_artifact(&self.output.json_path(kind), &json, "application/json")?,
            write_artifact(&self.output.csv_path(kind), &csv, "text/csv")?,
        ])
    }

    pub fn write_manifest<T: Serialize>(&self, manifest: &T) -> CoreResult<ArtifactRecord> {
        let mut json = serde_json::to_string_pretty(manifest)?;
        json.push('\n');
        write_artifact(&self.output.manifest_path(), &json, "application/json")
    }
}

pub(crate) fn write_artifact(path: &Path, content: &str, content_type: &str) -> CoreResult<ArtifactRecord> {
    let fail = |e: std::io::Error| CoreError::ReportWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(fail)?;
    }
    fs::write(path, content.as_bytes()).map_err(fail)?;
    Ok(ArtifactRecord {
        path: path.to_string_lossy().to_string(),
        sha256: sha256_hex(content.as_bytes()),
        bytes: content.len() as u64,
        content_type: content_type.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritable_target_is_a_report_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file, not dir").unwrap();
        let err = write_artifact(&blocker.join("out.json"), "[]", "application/json").unwrap_err();
        assert!(matches!(err, CoreError::ReportWrite { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn empty_reports_still_have_headers() {
        let csv = render_endpoint_csv(&[]).unwrap();
        assert_eq!(csv, format!("{}\n", ENDPOINT_CSV_COLUMNS.join(",")));
        assert_eq!(render_dependency_json(&[]).unwrap(), "[]\n");
    }
}
