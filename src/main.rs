#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use packscout::{
    load_manifest, scan, CapabilityDescriptor, CapabilityIndex, ScanOptions, Settings,
};

/// Capability-based plugin discovery for WASM plugin packs.
#[derive(Parser, Debug)]
#[command(name = "packscout")]
#[command(version)]
#[command(about = "Scan plugin packs for units implementing capability contracts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a pack or directory tree for capability implementations
    Scan {
        /// Pack file or directory to scan
        path: PathBuf,
        /// Capability manifest (TOML); falls back to the `scan.capabilities`
        /// settings key
        #[arg(long)]
        capabilities: Option<PathBuf>,
        /// Settings file supplying defaults
        #[arg(long)]
        settings: Option<String>,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
        /// Narrate per-archive and per-unit progress on stderr
        #[arg(long)]
        verbose: bool,
    },
    /// List every loadable unit inside one pack
    Units {
        /// Pack file to inspect
        archive: PathBuf,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
        /// Narrate per-unit progress on stderr
        #[arg(long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respects RUST_LOG, defaults to INFO
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    match cli.command {
        Commands::Scan {
            path,
            capabilities,
            settings,
            json,
            verbose,
        } => run_scan(path, capabilities, settings, json, verbose),
        Commands::Units {
            archive,
            json,
            verbose,
        } => run_units(&archive, json, verbose),
    }
}

fn run_scan(
    path: PathBuf,
    capabilities: Option<PathBuf>,
    settings_path: Option<String>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let mut settings = Settings::new();
    if let Some(file) = &settings_path {
        if !settings.load(file) {
            anyhow::bail!("failed to load settings from {file}");
        }
    }

    let manifest_path = capabilities
        .or_else(|| settings.get("scan.capabilities").map(PathBuf::from))
        .context("no capability manifest: pass --capabilities or set scan.capabilities")?;
    let manifest = load_manifest(&manifest_path)?;

    let options = ScanOptions {
        verbose: verbose || settings.get("scan.verbose") == Some("true"),
        ..ScanOptions::default()
    };

    let mut index = scan(&manifest.capabilities, &path, &options)?;
    for extra in &manifest.paths {
        let extra = PathBuf::from(shellexpand::tilde(extra).as_ref());
        index.merge(scan(&manifest.capabilities, &extra, &options)?);
    }

    print_report(&index, json);
    Ok(())
}

fn run_units(archive: &Path, json: bool, verbose: bool) -> Result<()> {
    let universal = CapabilityDescriptor::universal("unit");
    let options = ScanOptions {
        verbose,
        ..ScanOptions::default()
    };
    let index = scan(std::slice::from_ref(&universal), archive, &options)?;

    if json {
        let units: Vec<_> = index.get(&universal).to_vec();
        println!("{}", serde_json::to_string_pretty(&units)?);
    } else {
        for unit in index.get(&universal) {
            println!("{}", unit.name);
        }
    }
    Ok(())
}

fn print_report(index: &CapabilityIndex, json: bool) {
    // HashMap iteration order is unstable; sort by name for stable reports.
    let mut entries: Vec<_> = index.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name));

    if json {
        let report = serde_json::json!({
            "total": index.len(),
            "capabilities": entries
                .iter()
                .map(|(capability, units)| {
                    serde_json::json!({
                        "name": capability.name,
                        "requires": capability.requires,
                        "units": units,
                    })
                })
                .collect::<Vec<_>>(),
        });
        println!("{report:#}");
    } else {
        for (capability, units) in &entries {
            println!("{} ({} units)", capability.name, units.len());
            for unit in *units {
                println!("    {}  [{}]", unit.name, unit.archive.display());
            }
        }
        println!("total: {}", index.len());
    }
}
