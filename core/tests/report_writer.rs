mod common;

use common::service;
use compat_core::candidates::dependencies::DependencyAggregator;
use compat_core::candidates::pairs::{PairGenerator, PairingPolicy};
use compat_core::config::{AnalysisKind, OutputConfig};
use compat_core::determinism::fingerprint::sha256_hex;
use compat_core::oracle::interface::{Verdict, VerdictKind};
use compat_core::report::schema::{
    DependencyConflictResult, EndpointConflictResult, DEPENDENCY_CSV_COLUMNS,
    ENDPOINT_CSV_COLUMNS,
};
use compat_core::report::writer::{render_dependency_csv, render_endpoint_json, ReportWriter};
use std::fs;

fn verdict(kind: VerdictKind, text: &str) -> Verdict {
    Verdict {
        kind,
        reasoning: text.to_string(),
    }
}

fn endpoint_results() -> Vec<EndpointConflictResult> {
    let services = vec![
        service("orders", &[("GET", "/users")], &[]),
        service("users", &[("GET", "/users")], &[]),
    ];
    PairGenerator::new(PairingPolicy::ExhaustiveOrdered)
        .generate(&services)
        .iter()
        .map(|p| {
            EndpointConflictResult::new(
                p,
                verdict(VerdictKind::Equivalent, "Equivalent\nBoth list users, \"same\" shape."),
            )
        })
        .collect()
}

fn dependency_results() -> Vec<DependencyConflictResult> {
    let services = vec![
        service("orders", &[], &[("core", "1.0")]),
        service("users", &[], &[("core", "2.0")]),
        service("billing", &[], &[("core", "1.0")]),
    ];
    DependencyAggregator::default()
        .eligible(&services)
        .iter()
        .map(|g| DependencyConflictResult::new(g, verdict(VerdictKind::Conflict, "Conflict: major bump")))
        .collect()
}

#[test]
fn endpoint_json_keeps_field_order_and_reasoning() {
    let json = render_endpoint_json(&endpoint_results()).unwrap();
    let a = json.find("\"service_a\"").unwrap();
    let b = json.find("\"endpoint_a\"").unwrap();
    let c = json.find("\"service_b\"").unwrap();
    let d = json.find("\"endpoint_b\"").unwrap();
    let e = json.find("\"llm_reasoning\"").unwrap();
    assert!(a < b && b < c && c < d && d < e);

    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["endpoint_a"]["httpMethod"], "GET");
    assert_eq!(
        parsed[0]["llm_reasoning"],
        "Equivalent\nBoth list users, \"same\" shape."
    );
    assert_eq!(parsed[0]["verdict"], "Equivalent");
}

#[test]
fn dependency_csv_has_json_services_cell() {
    let csv = render_dependency_csv(&dependency_results()).unwrap();
    let mut rdr = csv::Reader::from_reader(csv.as_bytes());
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, DEPENDENCY_CSV_COLUMNS);

    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "core");
    assert_eq!(&rows[0][1], "1.0, 2.0");
    let services: serde_json::Value = serde_json::from_str(&rows[0][2]).unwrap();
    assert_eq!(services["1.0"], serde_json::json!(["orders", "billing"]));
    assert_eq!(services["2.0"], serde_json::json!(["users"]));
    assert_eq!(&rows[0][4], "Conflict");
}

#[test]
fn dependency_json_reports_latest_version() {
    let results = dependency_results();
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json[0]["latest_version"], "2.0");
    assert_eq!(json[0]["versions"], serde_json::json!(["1.0", "2.0"]));
}

#[test]
fn writer_replaces_previous_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let mut output = OutputConfig::default();
    output.dir = dir.path().join("reports");
    let writer = ReportWriter::new(output.clone());

    fs::create_dir_all(&output.dir).unwrap();
    fs::write(output.json_path(AnalysisKind::ApiConflict), b"stale stale stale").unwrap();

    let records = writer.write_endpoint_report(&endpoint_results()).unwrap();
    assert_eq!(records.len(), 2);

    let json = fs::read(output.json_path(AnalysisKind::ApiConflict)).unwrap();
    assert!(!String::from_utf8_lossy(&json).contains("stale"));
    assert_eq!(records[0].sha256, sha256_hex(&json));
    assert_eq!(records[0].bytes, json.len() as u64);

    let csv = fs::read_to_string(output.csv_path(AnalysisKind::ApiConflict)).unwrap();
    assert!(csv.starts_with(&ENDPOINT_CSV_COLUMNS.join(",")));
    // header plus one record; the quoted reasoning spans two lines
    let mut rdr = csv::Reader::from_reader(csv.as_bytes());
    assert_eq!(rdr.records().count(), 1);
}

#[test]
fn explicit_json_path_moves_csv_alongside() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out").join("deps.json");
    let output = OutputConfig::default()
        .with_json_path(AnalysisKind::DependencyConflict, &target)
        .unwrap();
    assert_eq!(output.json_path(AnalysisKind::DependencyConflict), target);
    assert_eq!(
        output.csv_path(AnalysisKind::DependencyConflict),
        dir.path().join("out").join("deps.csv")
    );

    ReportWriter::new(output)
        .write_dependency_report(&dependency_results())
        .unwrap();
    assert!(target.is_file());
    assert!(dir.path().join("out").join("deps.csv").is_file());
}
