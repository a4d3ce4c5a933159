use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use mapui_placement::PlacementConfig;
use serde_json::json;

use crate::error::Result;
use crate::util::{OutputFormat, emit_json, emit_text};

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Load and validate a placement config file.
    Check {
        /// TOML file, or JSON when the extension is `.json`.
        file: PathBuf,
    },

    /// Print the built-in defaults (JSON, or TOML with `--format toml`).
    Defaults,
}

pub fn run_config(args: ConfigArgs, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match args.command {
        ConfigCommand::Check { file } => check(&file, format, out),
        ConfigCommand::Defaults => defaults(format, out),
    }
}

fn check(file: &Path, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let config = PlacementConfig::from_file(file)?;
    let toolbar = config.regions.toolbar().is_some();
    let timeline = config.regions.timeline().is_some();
    let retry_budget_ms = config.anchor_retry.total_max_delay().as_millis() as u64;
    tracing::info!(
        message = "config.check",
        file = %file.display(),
        toolbar,
        timeline,
        retry_budget_ms,
    );

    match format {
        OutputFormat::Text => emit_text(
            out,
            &[
                ("file", file.display().to_string()),
                ("valid", "true".to_string()),
                ("toolbar", toolbar.to_string()),
                ("timeline", timeline.to_string()),
                ("retry_budget_ms", retry_budget_ms.to_string()),
            ],
        ),
        OutputFormat::Json | OutputFormat::Toml => emit_json(
            out,
            &json!({
                "status": "ok",
                "file": file.display().to_string(),
                "toolbar": toolbar,
                "timeline": timeline,
                "retryBudgetMs": retry_budget_ms,
            }),
        ),
    }
}

fn defaults(format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let config = PlacementConfig::default();
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &config)?;
            writeln!(out)?;
            Ok(())
        }
        OutputFormat::Toml | OutputFormat::Text => {
            write!(out, "{}", config.to_toml_string()?)?;
            Ok(())
        }
    }
}
