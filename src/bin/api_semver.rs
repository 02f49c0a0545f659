//! api-semver CLI
//!
//! Builds API snapshots from resolver output and reports the version bump a
//! change requires.
//!
//! Usage:
//!   api-semver snapshot --symbols symbols.json --output api.json --version 1.4.0
//!   api-semver diff --old api.json --symbols symbols.json --current 1.4.0
//!   api-semver diff --rev v1.4.0 --old api.json --new next.json --format json

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use api_semver::{
    classify, ApiSemverConfig, DiffReport, ModuleVersion, Severity, Snapshot, SnapshotFile, SymbolFile,
    SymbolSource,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "api-semver")]
#[command(about = "Snapshot exported APIs and compute the required semver bump")]
struct Cli {
    /// Explicit config file (in addition to api-semver.toml lookups)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a resolver symbol table and write a snapshot
    Snapshot {
        /// Symbol table produced by the language resolver (JSON)
        #[arg(short, long)]
        symbols: PathBuf,
        /// Output snapshot file (default: snapshot.path from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Version this snapshot is released as
        #[arg(short = 'V', long)]
        version: Option<String>,
    },

    /// Compare a stored snapshot against a newer one
    Diff {
        /// Baseline snapshot file (default: snapshot.path from config)
        #[arg(short, long)]
        old: Option<PathBuf>,
        /// Read the baseline from this git revision instead of the working tree
        #[arg(long)]
        rev: Option<String>,
        /// Repository used with --rev
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// New snapshot file
        #[arg(short, long, conflicts_with = "symbols")]
        new: Option<PathBuf>,
        /// Build the new snapshot from a resolver symbol table
        #[arg(short, long)]
        symbols: Option<PathBuf>,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Any change is breaking
        #[arg(long)]
        strict: bool,
        /// Current version, used to suggest the next one
        #[arg(long)]
        current: Option<String>,
        /// Show a line diff for every changed item
        #[arg(long)]
        verbose: bool,
    },

    /// Print or save the effective configuration
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = ApiSemverConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Snapshot {
            symbols,
            output,
            version,
        } => {
            let table = SymbolFile::new(&symbols)
                .load()
                .with_context(|| format!("reading symbol table {}", symbols.display()))?;
            let classification = classify(&table);

            for diag in classification.diagnostics.at_least(Severity::Warning) {
                eprintln!("⚠️  {}", diag);
            }

            let mut file = SnapshotFile::new(&classification.module, classification.snapshot)?;
            if let Some(v) = version {
                file = file.with_version(ModuleVersion::parse(&v)?.version);
            }

            let output = output.unwrap_or_else(|| config.snapshot.path.clone());
            file.save(&output, config.snapshot.output_format)?;
            println!(
                "📸 Wrote {} items for {} to {}",
                file.items.len(),
                file.module,
                output.display()
            );
            Ok(0)
        }

        Commands::Diff {
            old,
            rev,
            repo,
            new,
            symbols,
            format,
            strict,
            current,
            verbose,
        } => {
            let old_path = old.unwrap_or_else(|| config.snapshot.path.clone());
            let baseline = match &rev {
                Some(rev) => {
                    let file = old_path.to_string_lossy();
                    SnapshotFile::load_from_git(&repo, rev, &file)
                        .with_context(|| format!("reading {} at {}", file, rev))?
                }
                None => SnapshotFile::load(&old_path)
                    .with_context(|| format!("reading {}", old_path.display()))?,
            };

            let (module, latest): (String, Snapshot) = match (new, symbols) {
                (Some(path), _) => {
                    let file = SnapshotFile::load(&path).with_context(|| format!("reading {}", path.display()))?;
                    (file.module, file.items)
                }
                (None, Some(path)) => {
                    let table = SymbolFile::new(&path)
                        .load()
                        .with_context(|| format!("reading symbol table {}", path.display()))?;
                    let classification = classify(&table);
                    for diag in classification.diagnostics.at_least(Severity::Warning) {
                        eprintln!("⚠️  {}", diag);
                    }
                    (classification.module, classification.snapshot)
                }
                (None, None) => bail!("either --new or --symbols is required"),
            };

            if module != baseline.module {
                eprintln!(
                    "⚠️  Comparing different modules: {} vs {}",
                    baseline.module, module
                );
            }

            let mut compare = config.compare.clone();
            compare.strict |= strict;
            let report = compare.checker()?.check(&baseline.items, &latest);

            let current = match current {
                Some(v) => Some(ModuleVersion::parse(&v)?.version),
                None => baseline.version.clone(),
            };
            let rendered = DiffReport::new(&module, &report, current.as_ref());

            match format.as_str() {
                "json" => println!("{}", rendered.to_json()?),
                "text" => print!("{}", rendered.to_text(verbose)),
                other => bail!("unknown output format '{}', expected text or json", other),
            }

            if report.bump >= compare.fail_on {
                eprintln!(
                    "\n❌ Required bump '{}' reaches the configured fail_on level '{}'",
                    report.bump, compare.fail_on
                );
                Ok(2)
            } else {
                Ok(0)
            }
        }

        Commands::Config { output } => {
            match output {
                Some(path) => {
                    config.save(&path)?;
                    println!("💾 Saved configuration to {}", path);
                }
                None => print!("{}", config.to_toml()?),
            }
            Ok(0)
        }
    }
}
