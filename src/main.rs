use anyhow::{Context, Result};
use api_bump::classify::ClassificationResult;
use api_bump::config::{BumpConfig, SurfacePreset};
use api_bump::surface::{ApiSurface, ComparisonReport};
use api_bump::version::{IncrementPolicy, SemVersion};
use api_bump::{ModuleSnapshot, generate_fingerprint};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "api-bump")]
#[command(about = "Compare module API surfaces and compute the next semantic version")]
#[command(version)]
struct Args {
    #[arg(long, short, global = true, help = "Enable debug logging on stderr")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    #[command(about = "Classify the API changes between two module snapshots")]
    Compare {
        #[arg(help = "Path to the old snapshot (JSON)")]
        old_file: PathBuf,
        #[arg(help = "Path to the new snapshot (JSON)")]
        new_file: PathBuf,
        #[arg(long, help = "Output format", value_enum, default_value = "text")]
        format: OutputFormat,
        #[command(flatten)]
        selection: Selection,
        #[arg(long, help = "Rules to exclude (comma-separated)")]
        except_rules: Option<String>,
    },
    #[command(about = "Generate the API surface fingerprint of a module snapshot")]
    Fingerprint {
        #[arg(help = "Path to the snapshot (JSON)")]
        file: PathBuf,
        #[command(flatten)]
        selection: Selection,
    },
    #[command(about = "Compute the next version from two snapshots and the version history")]
    NextVersion {
        #[arg(help = "Path to the old snapshot (JSON)")]
        old_file: PathBuf,
        #[arg(help = "Path to the new snapshot (JSON)")]
        new_file: PathBuf,
        #[arg(long, help = "Previously published versions (comma-separated)")]
        previous: Option<String>,
        #[arg(long, help = "Prerelease label for the next version")]
        prerelease: Option<String>,
        #[arg(long, help = "Build metadata for the next version")]
        build: Option<String>,
        #[arg(long, help = "Increment policy", value_enum)]
        policy: Option<Policy>,
        #[arg(long, help = "Output format", value_enum, default_value = "text")]
        format: OutputFormat,
        #[command(flatten)]
        selection: Selection,
    },
}

#[derive(clap::Args)]
struct Selection {
    #[arg(long, help = "Path to a YAML configuration file")]
    config: Option<PathBuf>,
    #[arg(long, help = "Include internal types and members in the surface")]
    internal: bool,
}

impl Selection {
    fn load(&self) -> Result<BumpConfig> {
        let mut config = match &self.config {
            Some(path) => BumpConfig::from_yaml_file(path)?,
            None => BumpConfig::default(),
        };
        if self.internal {
            config.surface = SurfacePreset::Internal;
        }
        Ok(config)
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Policy {
    Patch,
    PrereleaseCounter,
}

impl From<Policy> for IncrementPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Patch => IncrementPolicy::Patch,
            Policy::PrereleaseCounter => IncrementPolicy::PrereleaseCounter,
        }
    }
}

#[derive(Serialize)]
struct NextVersionOutput<'a> {
    version: String,
    level: String,
    changes: &'a ClassificationResult,
}

fn setup_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn load_snapshot(path: &Path) -> Result<ModuleSnapshot> {
    ModuleSnapshot::from_json_file(path)
        .with_context(|| format!("Failed to load snapshot '{}'", path.display()))
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn compare(old_file: &Path, new_file: &Path, config: &BumpConfig) -> Result<ComparisonReport> {
    let old_snapshot = load_snapshot(old_file)?;
    let new_snapshot = load_snapshot(new_file)?;
    let queries = config.query_aggregator()?;

    let old_surface = ApiSurface::try_from(&old_snapshot, &queries)?;
    let new_surface = ApiSurface::try_from(&new_snapshot, &queries)?;
    Ok(old_surface.compare_with(&new_surface, &queries, &config.rule_config())?)
}

fn print_changes(report: &ComparisonReport) {
    if report.identical {
        println!("API surfaces are identical.");
        return;
    }
    if report.classification.changes.is_empty() {
        println!("No classified API changes.");
    }
    for change in &report.classification.changes {
        println!("  [{}] {} ({})", change.rule_id, change.message, change.level);
    }
    println!("Rules executed: {}", report.classification.executed_rules.len());
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    match args.command {
        Commands::Compare {
            old_file,
            new_file,
            format,
            selection,
            except_rules,
        } => {
            let mut config = selection.load()?;
            if let Some(except) = except_rules {
                config.except_rules.extend(split_list(&except));
            }

            let report = compare(&old_file, &new_file, &config)?;
            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&report)?;
                    println!("{}", json);
                }
                OutputFormat::Text => {
                    println!("Change level: {}", report.level);
                    print_changes(&report);
                }
            }

            if report.is_breaking() {
                std::process::exit(1);
            }
        }
        Commands::Fingerprint { file, selection } => {
            let config = selection.load()?;
            let snapshot = load_snapshot(&file)?;
            let queries = config.query_aggregator()?;
            let fingerprint = generate_fingerprint(&snapshot, &queries)?;
            println!("{}", fingerprint);
        }
        Commands::NextVersion {
            old_file,
            new_file,
            previous,
            prerelease,
            build,
            policy,
            format,
            selection,
        } => {
            let mut config = selection.load()?;
            if prerelease.is_some() {
                config.prerelease = prerelease;
            }
            if build.is_some() {
                config.build_metadata = build;
            }
            if let Some(policy) = policy {
                config.increment_policy = policy.into();
            }

            let history = previous
                .as_deref()
                .map(split_list)
                .unwrap_or_default()
                .iter()
                .map(|v| SemVersion::parse(v))
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let calculator = config.version_calculator();
            calculator.validate()?;
            let report = compare(&old_file, &new_file, &config)?;
            let next = calculator.calculate(report.level, &history)?;

            match format {
                OutputFormat::Json => {
                    let output = NextVersionOutput {
                        version: next.to_string(),
                        level: report.level.to_string(),
                        changes: &report.classification,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    println!("{}", next);
                }
            }
        }
    }

    Ok(())
}
