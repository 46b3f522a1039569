//! ep: plan pairwise tests for a pipeline and check measured outcomes
//! against the declared effects of its parameters.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use effectprobe_core::config::Config;
use effectprobe_core::logging::{LogConfig, init_logging};
use effectprobe_core::{Effect, GridGenerator, PlanStrategy, build_plan, check_outcomes, report};

mod params;

use params::{ParamsFile, load_outcomes};

#[derive(Parser, Debug)]
#[command(name = "ep", version, about = "Property-based effect testing for parameterized pipelines")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, env = "EP_CONFIG")]
    config: Option<PathBuf>,

    /// Log level, overrides the configuration file
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a test plan as JSON
    Plan {
        /// Parameters and expectations (TOML)
        #[arg(long)]
        params: PathBuf,

        /// Covering-array builder (pairwise, constrained)
        #[arg(long)]
        strategy: Option<PlanStrategy>,

        /// Seed of the pairwise row sampler
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Check measured outcomes for violated expectations
    Check {
        /// Parameters and expectations (TOML)
        #[arg(long)]
        params: PathBuf,

        /// Executed tests with their metrics (JSON)
        #[arg(long)]
        outcomes: PathBuf,

        /// Print violations as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the effects and the orderings each one allows
    Effects,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;

    let mut log_config = LogConfig::from(&config.general);
    if let Some(level) = cli.log_level {
        log_config.level = level;
    }
    init_logging(&log_config).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Plan {
            params,
            strategy,
            seed,
        } => {
            let params = ParamsFile::load(&params)?;
            let tree = params.tree()?;
            let mut options = config.plan_options();
            if let Some(strategy) = strategy {
                options.strategy = strategy;
            }
            if let Some(seed) = seed {
                options.covering.seed = seed;
            }
            let generator = GridGenerator::new(config.domain);
            let plan = build_plan(&tree, &params.pipeline, &generator, &options)?;
            tracing::debug!(
                strategy = %plan.summary.strategy,
                tests = plan.tests.len(),
                "plan ready"
            );
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            params,
            outcomes,
            json,
        } => {
            let params = ParamsFile::load(&params)?;
            let tree = params.tree()?;
            let outcomes = load_outcomes(&outcomes, &tree)?;
            tracing::debug!(outcomes = outcomes.len(), "loaded outcomes");
            let violations = check_outcomes(&outcomes, &tree)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&violations)?);
            } else {
                print!("{}", report::render_text(&violations, &tree)?);
            }
            if violations.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Effects => {
            for effect in Effect::ALL {
                println!("{:<16}{}", effect.as_str(), effect.orderings());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let remediation = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<effectprobe_core::Error>())
                .and_then(effectprobe_core::Error::remediation);
            if let Some(remediation) = remediation {
                eprint!("{}", remediation.render_plain());
            }
            ExitCode::from(2)
        }
    }
}
