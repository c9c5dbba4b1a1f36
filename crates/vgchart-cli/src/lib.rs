//! # vgchart
//!
//! Command line front end: resolves the effective configuration from the
//! config file, environment and flags, initialises logging and builds the
//! chart site.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use vgchart_common::init_logging;
use vgchart_config::{Config, ConfigLoader, ConfigSource};
use vgchart_graphs::{SiteGenerator, SiteReport};

/// Generate interactive chart pages from a video game sales CSV
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "vgchart", version, about)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Sales CSV to read
    #[arg(short, long, value_name = "CSV")]
    pub data: Option<String>,

    /// Directory the pages are written to
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<String>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Only generate the named page; may be repeated
    #[arg(long = "page", value_name = "NAME")]
    pub pages: Vec<String>,

    /// Also write a PNG snapshot next to each page
    #[arg(long)]
    pub snapshots: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Flags take precedence over the file and the environment
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(data) = &self.data {
            config.data.path = data.clone();
        }
        if let Some(output) = &self.output {
            config.output.dir = output.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.snapshots {
            config.output.snapshots = true;
        }
    }
}

/// Configuration with every layer applied, plus where its file came from
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Resolve and validate the effective configuration for `cli`
pub fn load_config(cli: &Cli) -> anyhow::Result<EffectiveConfig> {
    let (mut config, source) = match &cli.config {
        Some(path) => {
            let source = ConfigSource::File(path.clone());
            let config = ConfigLoader::load_source(&source)
                .with_context(|| format!("Failed to load configuration from {source}"))?;
            (config, source)
        }
        None => ConfigLoader::load().context("Failed to load configuration")?,
    };

    cli.apply_overrides(&mut config);
    config
        .validate_all()
        .context("Configuration is invalid after applying command line flags")?;

    let unknown: Vec<&str> = cli
        .pages
        .iter()
        .filter(|name| !config.pages.iter().any(|page| &page.name == *name))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        bail!("Unknown page(s): {}", unknown.join(", "));
    }

    Ok(EffectiveConfig { config, source })
}

/// Summary of the loaded configuration, emitted once logging is up
pub fn log_effective_config(effective: &EffectiveConfig, only: &[String]) {
    let config = &effective.config;
    info!(
        source = %effective.source,
        data = %config.data.path,
        output = %config.output.dir,
        pages = config.selected_pages(only).count(),
        snapshots = config.output.snapshots,
        "Configuration loaded"
    );
}

/// Build the site described by `config`
pub async fn generate(config: Config, pages: Vec<String>) -> anyhow::Result<SiteReport> {
    let report = SiteGenerator::new(config)
        .with_pages(pages)
        .generate()
        .await
        .context("Site generation failed")?;

    for failure in &report.failed {
        error!(page = %failure.page, reason = %failure.reason, "Page was not generated");
    }
    for failure in &report.snapshot_failures {
        warn!(page = %failure.page, reason = %failure.reason, "Snapshot was not generated");
    }
    Ok(report)
}

/// Full command: configuration, logging, generation and exit status
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let effective = load_config(&cli)?;

    if cli.print_config {
        print!("{}", serde_yaml::to_string(&effective.config)?);
        return Ok(ExitCode::SUCCESS);
    }

    init_logging(&effective.config.logging.to_subscriber_config())
        .context("Failed to initialize logging")?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting vgchart");
    log_effective_config(&effective, &cli.pages);

    let config = effective.config;
    let output = config.output.dir.clone();
    let report = generate(config, cli.pages).await?;

    if report.is_success() {
        info!(
            pages = report.written.len(),
            snapshots = report.snapshots.len(),
            output = %output,
            "All pages generated"
        );
        Ok(ExitCode::SUCCESS)
    } else {
        error!(failed = report.failed.len(), "Some pages failed");
        Ok(ExitCode::FAILURE)
    }
}
