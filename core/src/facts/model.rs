use serde::{Deserialize, Serialize};

/// REST endpoint extracted from one service's source tree.
///
/// Field names follow the analyzer's fact file (`httpMethod`, `className`, ...).
/// `service` is not part of the file; the store fills it from the repository
/// directory name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(default)]
    pub service: String,
    pub http_method: String,
    pub path: String,
    pub class_name: String,
    pub method_name: String,
}

/// Declared library dependency. `name` and `version` stay optional on load;
/// incomplete records are skipped by the aggregator rather than rejected here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Dependency {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub service: String,
    /// Build tool kind the record came from (`build.gradle`, `pom.xml`).
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// Everything known about one repository for the duration of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepoFacts {
    pub service: String,
    pub endpoints: Vec<Endpoint>,
    pub dependencies: Vec<Dependency>,
}

impl RepoFacts {
    pub fn new(service: &str, endpoints: Vec<Endpoint>, dependencies: Vec<Dependency>) -> Self {
        let mut facts = Self {
            service: service.to_string(),
            endpoints,
            dependencies,
        };
        facts.assign_service(service);
        facts
    }

    /// Stamp every record with the owning service. Fact files never carry it.
    pub fn assign_service(&mut self, service: &str) {
        self.service = service.to_string();
        for ep in &mut self.endpoints {
            ep.service = service.to_string();
        }
        for dep in &mut self.dependencies {
            dep.service = service.to_string();
        }
    }
}

/// On-disk shape of the analyzer output. Unknown keys (`config`,
/// `migrationResult`, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FactFile {
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub dependencies: Option<Vec<Dependency>>,
}
