mod common;

use common::service;
use compat_core::candidates::pairs::{PairGenerator, PairingPolicy};
use std::str::FromStr;

fn three_services() -> Vec<compat_core::facts::model::RepoFacts> {
    vec![
        service("billing", &[("GET", "/invoices"), ("POST", "/invoices")], &[]),
        service("orders", &[("GET", "/orders"), ("DELETE", "/orders/{id}"), ("GET", "/users")], &[]),
        service("users", &[("GET", "/users")], &[]),
    ]
}

#[test]
fn no_pair_stays_inside_one_service() {
    let services = three_services();
    for policy in [PairingPolicy::ExhaustiveOrdered, PairingPolicy::SameMethod] {
        let pairs = PairGenerator::new(policy).generate(&services);
        assert!(!pairs.is_empty());
        assert!(pairs.iter().all(|p| p.service_a != p.service_b));
        assert!(pairs
            .iter()
            .all(|p| p.endpoint_a.service == p.service_a && p.endpoint_b.service == p.service_b));
    }
}

#[test]
fn exhaustive_counts_each_service_pair_once() {
    let services = three_services();
    let pairs = PairGenerator::new(PairingPolicy::ExhaustiveOrdered).generate(&services);
    // 2*3 + 2*1 + 3*1
    assert_eq!(pairs.len(), 11);

    let count = |a: &str, b: &str| {
        pairs
            .iter()
            .filter(|p| p.service_a == a && p.service_b == b)
            .count()
    };
    assert_eq!(count("billing", "orders"), 6);
    assert_eq!(count("orders", "billing"), 0);
    assert_eq!(count("billing", "users"), 2);
    assert_eq!(count("orders", "users"), 3);
    assert_eq!(count("users", "orders"), 0);
}

#[test]
fn exhaustive_order_follows_discovery_then_fact_order() {
    let services = three_services();
    let pairs = PairGenerator::new(PairingPolicy::ExhaustiveOrdered).generate(&services);
    let first: Vec<(String, String)> = pairs
        .iter()
        .take(3)
        .map(|p| (p.endpoint_a.path.clone(), p.endpoint_b.path.clone()))
        .collect();
    assert_eq!(
        first,
        vec![
            ("/invoices".to_string(), "/orders".to_string()),
            ("/invoices".to_string(), "/orders/{id}".to_string()),
            ("/invoices".to_string(), "/users".to_string()),
        ]
    );
}

#[test]
fn same_method_counts_ordered_combinations() {
    let services = three_services();
    let pairs = PairGenerator::new(PairingPolicy::SameMethod).generate(&services);
    // GET endpoints: billing 1, orders 2, users 1. Ordered cross-service
    // combinations: 1*2 + 1*1 + 2*1 + 2*1 + 1*1 + 1*2 = 10.
    assert_eq!(pairs.len(), 10);
    assert!(pairs
        .iter()
        .all(|p| p.endpoint_a.http_method == p.endpoint_b.http_method));
    assert!(pairs
        .iter()
        .any(|p| p.service_a == "users" && p.service_b == "orders"));
}

#[test]
fn method_match_is_exact() {
    let services = vec![
        service("a", &[("GET", "/x")], &[]),
        service("b", &[("get", "/x")], &[]),
    ];
    assert!(PairGenerator::new(PairingPolicy::SameMethod)
        .generate(&services)
        .is_empty());
    assert_eq!(
        PairGenerator::new(PairingPolicy::ExhaustiveOrdered)
            .generate(&services)
            .len(),
        1
    );
}

#[test]
fn fewer_than_two_services_yield_nothing() {
    let services = vec![service("solo", &[("GET", "/a"), ("GET", "/b")], &[])];
    for policy in [PairingPolicy::ExhaustiveOrdered, PairingPolicy::SameMethod] {
        assert!(PairGenerator::new(policy).generate(&services).is_empty());
        assert!(PairGenerator::new(policy).generate(&[]).is_empty());
    }
}

#[test]
fn policy_names_parse() {
    assert_eq!(
        PairingPolicy::from_str("same-method").unwrap(),
        PairingPolicy::SameMethod
    );
    assert_eq!(
        PairingPolicy::from_str("exhaustive").unwrap(),
        PairingPolicy::ExhaustiveOrdered
    );
    assert!(PairingPolicy::from_str("random").is_err());
}
