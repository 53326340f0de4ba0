use crate::facts::model::{Dependency, RepoFacts};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Orders two version strings; the greatest is reported as the latest.
pub type VersionComparator = Box<dyn Fn(&str, &str) -> Ordering + Send + Sync>;

/// Plain string ordering. "10.0" sorts below "2.0"; swap in a semver-aware
/// comparator through [`DependencyAggregator::with_comparator`] if needed.
pub fn lexicographic(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Services using one version of a dependency, in first-seen order, no
/// duplicates.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VersionUsage {
    pub version: String,
    pub services: Vec<String>,
}

/// All observed versions of one dependency name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGroup {
    pub name: String,
    pub usages: Vec<VersionUsage>,
    /// Every service that declares `name`, versioned or not.
    pub declaring_services: BTreeSet<String>,
    pub latest_version: Option<String>,
}

impl DependencyGroup {
    pub fn versions(&self) -> Vec<String> {
        self.usages.iter().map(|u| u.version.clone()).collect()
    }

    pub fn services_for(&self, version: &str) -> Option<&[String]> {
        self.usages
            .iter()
            .find(|u| u.version == version)
            .map(|u| u.services.as_slice())
    }

    pub fn service_count(&self) -> usize {
        self.declaring_services.len()
    }

    pub fn is_cross_service(&self) -> bool {
        self.service_count() > 1
    }

    fn record(&mut self, version: &str, service: &str) {
        match self.usages.iter_mut().find(|u| u.version == version) {
            Some(usage) => {
                if !usage.services.iter().any(|s| s == service) {
                    usage.services.push(service.to_string());
                }
            }
            None => self.usages.push(VersionUsage {
                version: version.to_string(),
                services: vec![service.to_string()],
            }),
        }
    }
}

pub struct DependencyAggregator {
    comparator: VersionComparator,
}

impl Default for DependencyAggregator {
    fn default() -> Self {
        Self {
            comparator: Box::new(lexicographic),
        }
    }
}

impl DependencyAggregator {
    pub fn with_comparator(comparator: VersionComparator) -> Self {
        Self { comparator }
    }

    /// Group every usable record by name. Names keep first-seen order.
    pub fn aggregate(&self, services: &[RepoFacts]) -> Vec<DependencyGroup> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: BTreeMap<String, DependencyGroup> = BTreeMap::new();

        for dep in services.iter().flat_map(|s| s.dependencies.iter()) {
            let Some(name) = non_empty(&dep.name) else {
                continue;
            };
            if dep.service.is_empty() {
                continue;
            }
            let group = groups.entry(name.to_string()).or_insert_with(|| {
                order.push(name.to_string());
                DependencyGroup {
                    name: name.to_string(),
                    usages: Vec::new(),
                    declaring_services: BTreeSet::new(),
                    latest_version: None,
                }
            });
            group.declaring_services.insert(dep.service.clone());
            if let Some(version) = version_of(dep) {
                group.record(version, &dep.service);
            }
        }

        order
            .into_iter()
            .filter_map(|name| groups.remove(&name))
            .filter(|g| !g.usages.is_empty())
            .map(|mut g| {
                g.latest_version = self.latest_version(&g);
                g
            })
            .collect()
    }

    /// Groups declared by more than one distinct service. Version count does
    /// not matter.
    pub fn eligible(&self, services: &[RepoFacts]) -> Vec<DependencyGroup> {
        self.aggregate(services)
            .into_iter()
            .filter(DependencyGroup::is_cross_service)
            .collect()
    }

    pub fn latest_version(&self, group: &DependencyGroup) -> Option<String> {
        let mut versions = group.versions();
        versions.sort_by(|a, b| (self.comparator)(b, a));
        versions.into_iter().next()
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn version_of(dep: &Dependency) -> Option<&str> {
    non_empty(&dep.version)
}
