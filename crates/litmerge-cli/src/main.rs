use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use litmerge_core::storage::json_files;
use litmerge_core::{AppConfig, LitmergeError, SourceCollections, SourceRecord, SourceTag};
use litmerge_resolve::{Isbn, MergeOutcome, ResolveOptions, Resolver};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "litmerge",
    about = "Merge award, bibliographic, reception and bestseller book records",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting LITMERGE_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Log every match decision.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and merge the configured source files.
    Merge {
        /// Directory holding the collector output files.
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Directory the merged artifacts are written to.
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Fuzzy title/author similarity threshold in [0, 1].
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Print the canonical and hyphenated ISBN-13 for each identifier, or `-`.
    Isbn {
        #[arg(required = true)]
        identifiers: Vec<String>,
    },

    /// Print the effective configuration.
    Config,
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    // ── Env var overrides ──────────────────────────────────────────────────
    let json_output = cli.json || std::env::var("LITMERGE_JSON").as_deref() == Ok("1");
    init_tracing(cli.verbose);

    let mut config = AppConfig::load()?;

    match cli.command {
        Commands::Merge {
            data_dir,
            output_dir,
            threshold,
        } => {
            if let Some(dir) = data_dir {
                config.input.data_dir = dir.display().to_string();
            }
            if let Some(dir) = output_dir {
                config.output.output_dir = dir.display().to_string();
            }
            if let Some(t) = threshold {
                config.matching.similarity_threshold = t;
            }
            config.validate()?;

            let inputs = load_inputs(&config)?;
            let resolver = Resolver::new(ResolveOptions::from_config(&config.matching)?)?;
            let mut outcome = resolver.run(&inputs.collections);
            outcome
                .report
                .record_excluded(SourceTag::Award, inputs.award_excluded);
            stamp_created_date(&mut outcome);

            let written = json_files::save_artifacts(
                &config.output_dir(),
                &outcome.dataset,
                &outcome.unmatched,
                &outcome.report,
                config.output.pretty,
            )?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": outcome.report,
                    "meta": { "duration_ms": dur, "written": written }
                }))?;
            } else {
                println!("{}", outcome.report);
                println!();
                for path in &written {
                    println!("Saved: {}", path.display());
                }
            }
        }

        Commands::Isbn { identifiers } => {
            let results: Vec<(String, Option<Isbn>)> = identifiers
                .into_iter()
                .map(|raw| {
                    let parsed = Isbn::parse(&raw).ok();
                    (raw, parsed)
                })
                .collect();

            if json_output {
                let items: Vec<_> = results
                    .iter()
                    .map(|(raw, parsed)| {
                        serde_json::json!({
                            "input": raw,
                            "canonical": parsed.as_ref().map(|i| i.canonical().into_string()),
                            "formatted": parsed.as_ref().map(|i| i.formatted.as_str()),
                        })
                    })
                    .collect();
                print_json(&serde_json::json!({"status": "ok", "data": items}))?;
            } else {
                for (raw, parsed) in &results {
                    println!("{}", isbn_line(raw, parsed.as_ref()));
                }
            }
        }

        Commands::Config => {
            if json_output {
                print_json(&serde_json::json!({"status": "ok", "data": config}))?;
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `raw<TAB>canonical<TAB>hyphenated`, or `raw<TAB>-` when the input is not an ISBN.
fn isbn_line(raw: &str, parsed: Option<&Isbn>) -> String {
    match parsed {
        Some(isbn) => format!("{raw}\t{}\t{}", isbn.canonical(), isbn.formatted),
        None => format!("{raw}\t-"),
    }
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

/// A missing source file is logged and treated as an empty collection.
fn optional_input(
    path: &Path,
    loaded: litmerge_core::Result<Vec<SourceRecord>>,
) -> Result<Vec<SourceRecord>> {
    match loaded {
        Ok(records) => {
            info!(path = %path.display(), count = records.len(), "loaded source file");
            Ok(records)
        }
        Err(LitmergeError::InputNotFound(_)) => {
            warn!(path = %path.display(), "source file not found, skipping");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

struct LoadedInputs {
    collections: SourceCollections,
    /// Award listings dropped by the year window.
    award_excluded: usize,
}

/// Read every configured source file. Award listings outside the configured
/// year window are dropped here, before matching.
fn load_inputs(config: &AppConfig) -> Result<LoadedInputs> {
    let data_dir = config.data_dir();
    if !data_dir.is_dir() {
        return Err(LitmergeError::DirectoryNotFound(data_dir.display().to_string()).into());
    }

    let mut collections = SourceCollections::new();
    let mut award_excluded = 0;

    for path in config.award_paths() {
        let records = optional_input(&path, json_files::load_award_listings(&path))?;
        let before = records.len();
        let kept: Vec<SourceRecord> = records
            .into_iter()
            .filter(|r| config.award_year_in_range(r.year))
            .collect();
        if kept.len() < before {
            award_excluded += before - kept.len();
            info!(
                path = %path.display(),
                dropped = before - kept.len(),
                "award listings outside year window"
            );
        }
        collections.extend(kept);
    }

    let path = config.bibliographic_path();
    collections.extend(optional_input(&path, json_files::load_bibliographic_books(&path))?);
    let path = config.reception_path();
    collections.extend(optional_input(&path, json_files::load_reception_books(&path))?);
    let path = config.bestseller_path();
    collections.extend(optional_input(&path, json_files::load_bestseller_entries(&path))?);

    Ok(LoadedInputs {
        collections,
        award_excluded,
    })
}

fn stamp_created_date(outcome: &mut MergeOutcome) {
    let now = Utc::now();
    outcome.dataset.metadata.created_date = Some(now);
    outcome.report.created_date = Some(now);
    for collection in &mut outcome.unmatched {
        collection.metadata.created_date = Some(now);
    }
}
