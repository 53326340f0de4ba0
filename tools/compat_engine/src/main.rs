use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use compat_core::candidates::pairs::PairingPolicy;
use compat_core::config::{AnalysisConfig, AnalysisKind, OracleConfig};
use compat_core::facts::extractor::SubprocessExtractor;
use compat_core::oracle::openai::ChatCompletionsOracle;
use compat_core::report::manifest::RunSummary;
use compat_core::run::runner::AnalysisRunner;
use std::path::PathBuf;
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "compat_engine")]
#[command(about = "Cross-service API and dependency compatibility analysis")]
#[command(version)]
struct Cli {
    /// JSON config file; command-line flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Program used to extract facts for repositories without a fact file
    #[arg(long, global = true)]
    extractor_program: Option<String>,

    /// Extractor argument, repeatable. `{repo}` expands to the repository path
    #[arg(long = "extractor-arg", global = true, allow_hyphen_values = true)]
    extractor_args: Vec<String>,

    /// Debug logging (RUST_LOG still wins when set)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Common {
    /// Directory holding one sub-directory per service repository
    repos_dir: PathBuf,

    /// Concurrent oracle calls
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify endpoint pairs across services
    ApiConflict {
        #[command(flatten)]
        common: Common,
        /// JSON report path; the CSV is written next to it
        #[arg(long)]
        output: Option<PathBuf>,
        /// exhaustive-ordered or same-method
        #[arg(long)]
        policy: Option<PairingPolicy>,
    },
    /// Classify dependencies declared by more than one service
    DependencyConflict {
        #[command(flatten)]
        common: Common,
        /// JSON report path; the CSV is written next to it
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run both analyses over one extraction pass
    Analyze {
        #[command(flatten)]
        common: Common,
        /// Directory for all report artifacts
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        policy: Option<PairingPolicy>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(summary) => print_summary(&summary),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("compat_engine: {:#}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<RunSummary> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(program) = cli.extractor_program {
        config.extractor.program = program;
    }
    if !cli.extractor_args.is_empty() {
        config.extractor.args = cli.extractor_args;
    }

    let kinds = match cli.command {
        Commands::ApiConflict {
            common,
            output,
            policy,
        } => {
            apply_common(&mut config, common);
            if let Some(policy) = policy {
                config.pairing_policy = policy;
            }
            if let Some(path) = output {
                config.output = config
                    .output
                    .with_json_path(AnalysisKind::ApiConflict, &path)?;
            }
            vec![AnalysisKind::ApiConflict]
        }
        Commands::DependencyConflict { common, output } => {
            apply_common(&mut config, common);
            if let Some(path) = output {
                config.output = config
                    .output
                    .with_json_path(AnalysisKind::DependencyConflict, &path)?;
            }
            vec![AnalysisKind::DependencyConflict]
        }
        Commands::Analyze {
            common,
            out_dir,
            policy,
        } => {
            apply_common(&mut config, common);
            if let Some(policy) = policy {
                config.pairing_policy = policy;
            }
            if let Some(dir) = out_dir {
                config.output.dir = dir;
            }
            vec![AnalysisKind::ApiConflict, AnalysisKind::DependencyConflict]
        }
    };
    config.validate()?;

    let oracle_config = OracleConfig::from_env().context("oracle is not configured")?;
    let oracle = ChatCompletionsOracle::new(oracle_config)?;
    let extractor = SubprocessExtractor::new(config.extractor.clone(), config.fact_store());

    let mut runner = AnalysisRunner::new(config, extractor, oracle);
    let summary = runner.run(&kinds)?;
    Ok(summary)
}

fn apply_common(config: &mut AnalysisConfig, common: Common) {
    config.repos_dir = common.repos_dir;
    if let Some(workers) = common.workers {
        config.workers = workers;
    }
}

fn print_summary(summary: &RunSummary) {
    println!("run {}", summary.run_id);
    println!(
        "repositories: {} discovered, {} extracted, {} loaded",
        summary.repositories_discovered,
        summary.repositories_extracted,
        summary.repositories_loaded
    );
    for excluded in &summary.excluded_repositories {
        println!("  excluded {} ({})", excluded.path, excluded.reason);
    }
    for analysis in &summary.analyses {
        println!(
            "{}: {} candidates, {} results, {} oracle failures, {} unclassified",
            analysis.kind,
            analysis.candidates,
            analysis.results,
            analysis.oracle_failures,
            analysis.unclassified
        );
        for artifact in &analysis.artifacts {
            println!("  wrote {} ({} bytes)", artifact.path, artifact.bytes);
        }
    }
    if summary.warnings > 0 {
        println!("{} warnings; see log for details", summary.warnings);
    }
}
