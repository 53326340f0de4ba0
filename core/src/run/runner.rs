use crate::candidates::dependencies::{DependencyAggregator, DependencyGroup};
use crate::candidates::pairs::{CandidatePair, PairGenerator};
use crate::config::{AnalysisConfig, AnalysisKind};
use crate::determinism::fingerprint::{inputs_fingerprint, run_id_from_fingerprint};
use crate::error::{CoreError, CoreResult};
use crate::facts::discovery::discover_repositories;
use crate::facts::extractor::Extractor;
use crate::facts::model::RepoFacts;
use crate::facts::store::{service_name, FactStore};
use crate::oracle::interface::{ConflictOracle, VerdictKind};
use crate::report::manifest::{now_rfc3339_utc, ExcludedRepository, KindSummary, RunSummary};
use crate::report::schema::{DependencyConflictResult, EndpointConflictResult};
use crate::report::writer::ReportWriter;
use crate::run::lifecycle::{check_transition, RunStage};
use rayon::prelude::*;
use std::path::Path;
use tracing::{info, warn};

/// Facts that survived `EnsureFacts`, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct LoadedFacts {
    pub repos_discovered: usize,
    pub repos_extracted: usize,
    pub services: Vec<RepoFacts>,
    pub excluded: Vec<ExcludedRepository>,
}

/// Results of one classification pass, in candidate order.
#[derive(Debug, Clone)]
pub struct Classified<R> {
    pub candidates: usize,
    pub results: Vec<R>,
    pub failures: usize,
}

/// Drives one run: discover, ensure facts, generate candidates, classify,
/// write. Per-repository and per-candidate failures are logged and skipped.
pub struct AnalysisRunner<E: Extractor, O: ConflictOracle> {
    config: AnalysisConfig,
    store: FactStore,
    extractor: E,
    oracle: O,
    pairs: PairGenerator,
    aggregator: DependencyAggregator,
    stage: RunStage,
}

impl<E: Extractor, O: ConflictOracle> AnalysisRunner<E, O> {
    pub fn new(config: AnalysisConfig, extractor: E, oracle: O) -> Self {
        Self {
            store: config.fact_store(),
            pairs: PairGenerator::new(config.pairing_policy),
            aggregator: DependencyAggregator::default(),
            config,
            extractor,
            oracle,
            stage: RunStage::CREATED,
        }
    }

    /// Replace the default lexicographic version ordering.
    pub fn with_aggregator(mut self, aggregator: DependencyAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Run the requested analyses over one shared set of facts and write
    /// every artifact plus the run manifest.
    pub fn run(&mut self, kinds: &[AnalysisKind]) -> CoreResult<RunSummary> {
        match self.run_stages(kinds) {
            Ok(summary) => Ok(summary),
            Err(e) => {
                if check_transition(self.stage, RunStage::FAILED).is_ok() {
                    self.stage = RunStage::FAILED;
                }
                Err(e)
            }
        }
    }

    fn run_stages(&mut self, kinds: &[AnalysisKind]) -> CoreResult<RunSummary> {
        self.advance(RunStage::DISCOVER)?;
        let repos = discover_repositories(&self.config.repos_dir)?;
        info!(
            "discovered {} repositories under {}",
            repos.len(),
            self.config.repos_dir.display()
        );

        self.advance(RunStage::ENSURE_FACTS)?;
        let loaded = self.ensure_facts(&repos);
        if loaded.services.is_empty() {
            warn!("no repository produced usable facts; reports will be empty");
        }

        self.advance(RunStage::GENERATE_CANDIDATES)?;
        let pairs = if kinds.contains(&AnalysisKind::ApiConflict) {
            let pairs = self.pairs.generate(&loaded.services);
            info!(
                "generated {} endpoint pairs ({})",
                pairs.len(),
                self.pairs.policy().as_str()
            );
            Some(pairs)
        } else {
            None
        };
        let groups = if kinds.contains(&AnalysisKind::DependencyConflict) {
            let groups = self.aggregator.eligible(&loaded.services);
            info!("found {} cross-service dependency groups", groups.len());
            Some(groups)
        } else {
            None
        };

        self.advance(RunStage::CLASSIFY_ALL)?;
        let endpoint_results = match &pairs {
            Some(pairs) => Some(self.classify_pairs(pairs)?),
            None => None,
        };
        let dependency_results = match &groups {
            Some(groups) => Some(self.classify_groups(groups)?),
            None => None,
        };

        self.advance(RunStage::WRITE)?;
        let writer = ReportWriter::new(self.config.output.clone());
        let mut analyses = Vec::new();
        if let Some(classified) = &endpoint_results {
            let artifacts = writer.write_endpoint_report(&classified.results)?;
            analyses.push(kind_summary(
                AnalysisKind::ApiConflict,
                classified,
                |r| r.verdict,
                artifacts,
            ));
        }
        if let Some(classified) = &dependency_results {
            let artifacts = writer.write_dependency_report(&classified.results)?;
            analyses.push(kind_summary(
                AnalysisKind::DependencyConflict,
                classified,
                |r| r.verdict,
                artifacts,
            ));
        }

        let fingerprint = inputs_fingerprint(&loaded.services, self.pairs.policy(), kinds)?;
        let warnings =
            loaded.excluded.len() + analyses.iter().map(|a| a.oracle_failures).sum::<usize>();
        let summary = RunSummary {
            run_id: run_id_from_fingerprint(&fingerprint),
            generated_at: now_rfc3339_utc(),
            inputs_fingerprint: fingerprint,
            pairing_policy: self.pairs.policy().as_str().to_string(),
            repositories_discovered: loaded.repos_discovered,
            repositories_extracted: loaded.repos_extracted,
            repositories_loaded: loaded.services.len(),
            excluded_repositories: loaded.excluded,
            analyses,
            warnings,
        };
        writer.write_manifest(&summary)?;

        self.advance(RunStage::COMPLETED)?;
        info!(
            "run {} complete: {} results, {} warnings",
            summary.run_id,
            summary.total_results(),
            summary.warnings
        );
        Ok(summary)
    }

    fn advance(&mut self, to: RunStage) -> CoreResult<()> {
        check_transition(self.stage, to)?;
        self.stage = to;
        Ok(())
    }

    /// Load facts for every repository, running the extractor only where the
    /// fact file is missing. A failing repository is excluded, never fatal.
    pub fn ensure_facts(&self, repos: &[std::path::PathBuf]) -> LoadedFacts {
        let mut loaded = LoadedFacts {
            repos_discovered: repos.len(),
            ..LoadedFacts::default()
        };
        for repo in repos {
            let service = match service_name(repo) {
                Ok(s) => s,
                Err(e) => {
                    warn!("skipping {}: {}", repo.display(), e);
                    loaded.excluded.push(excluded(repo, "", &e));
                    continue;
                }
            };
            match self.load_or_extract(repo, &service, &mut loaded.repos_extracted) {
                Ok(facts) => {
                    info!(
                        "{}: {} endpoints, {} dependencies",
                        service,
                        facts.endpoints.len(),
                        facts.dependencies.len()
                    );
                    loaded.services.push(facts);
                }
                Err(e) => {
                    warn!("excluding {} from this run: {}", service, e);
                    loaded.excluded.push(excluded(repo, &service, &e));
                }
            }
        }
        loaded
    }

    fn load_or_extract(
        &self,
        repo: &Path,
        service: &str,
        extracted: &mut usize,
    ) -> CoreResult<RepoFacts> {
        match self.store.load_facts(repo) {
            Ok(facts) => {
                info!("fact file already present for {}", service);
                Ok(facts)
            }
            Err(CoreError::MissingFacts(path)) => {
                info!(
                    "no fact file at {}; running extractor for {}",
                    path.display(),
                    service
                );
                *extracted += 1;
                let mut facts = self.extractor.extract(repo)?;
                facts.assign_service(service);
                Ok(facts)
            }
            Err(e) => Err(e),
        }
    }

    pub fn classify_pairs(
        &self,
        pairs: &[CandidatePair],
    ) -> CoreResult<Classified<EndpointConflictResult>> {
        let oracle = &self.oracle;
        self.classify(pairs, CandidatePair::label, |pair| {
            oracle
                .classify_endpoints(pair)
                .map(|v| EndpointConflictResult::new(pair, v))
        })
    }

    pub fn classify_groups(
        &self,
        groups: &[DependencyGroup],
    ) -> CoreResult<Classified<DependencyConflictResult>> {
        let oracle = &self.oracle;
        self.classify(
            groups,
            |g| format!("{}: {}", g.name, g.versions().join(", ")),
            |group| {
                oracle
                    .classify_dependency(group)
                    .map(|v| DependencyConflictResult::new(group, v))
            },
        )
    }

    /// One oracle call per candidate. With more than one worker the calls
    /// run on a bounded pool; results stay in candidate order either way.
    fn classify<C, R, D, F>(&self, candidates: &[C], describe: D, call: F) -> CoreResult<Classified<R>>
    where
        C: Sync,
        R: Send,
        D: Fn(&C) -> String + Sync,
        F: Fn(&C) -> CoreResult<R> + Sync,
    {
        let total = candidates.len();
        let run_one = |(idx, candidate): (usize, &C)| -> Option<R> {
            info!("[{}/{}] analyzing {}", idx + 1, total, describe(candidate));
            match call(candidate) {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!(
                        "oracle failed for {}; candidate dropped: {}",
                        describe(candidate),
                        e
                    );
                    None
                }
            }
        };

        let outcomes: Vec<Option<R>> = if self.config.workers <= 1 {
            candidates.iter().enumerate().map(&run_one).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.workers)
                .build()
                .map_err(|e| CoreError::Config(format!("cannot start oracle workers: {}", e)))?;
            pool.install(|| {
                candidates
                    .par_iter()
                    .enumerate()
                    .map(&run_one)
                    .collect::<Vec<Option<R>>>()
            })
        };

        let failures = outcomes.iter().filter(|o| o.is_none()).count();
        Ok(Classified {
            candidates: total,
            results: outcomes.into_iter().flatten().collect(),
            failures,
        })
    }
}

fn excluded(repo: &Path, service: &str, err: &CoreError) -> ExcludedRepository {
    ExcludedRepository {
        service: service.to_string(),
        path: repo.to_string_lossy().to_string(),
        reason: err.to_string(),
    }
}

fn kind_summary<R>(
    kind: AnalysisKind,
    classified: &Classified<R>,
    verdict_of: impl Fn(&R) -> VerdictKind,
    artifacts: Vec<crate::report::writer::ArtifactRecord>,
) -> KindSummary {
    let unclassified = classified
        .results
        .iter()
        .filter(|r| verdict_of(*r) == VerdictKind::Unclassified)
        .count();
    if unclassified > 0 {
        warn!(
            "{}: {} results carry no recognised verdict and need manual review",
            kind.as_str(),
            unclassified
        );
    }
    KindSummary {
        kind: kind.as_str().to_string(),
        candidates: classified.candidates,
        results: classified.results.len(),
        oracle_failures: classified.failures,
        unclassified,
        artifacts,
    }
}
