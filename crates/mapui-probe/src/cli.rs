use std::io::Write;

use clap::{Parser, Subcommand};

use crate::arrow::{ArrowArgs, run_arrow};
use crate::config_cmd::{ConfigArgs, run_config};
use crate::error::Result;
use crate::place::{PlaceArgs, run_place};
use crate::util::{OutputFormat, init_logging};

#[derive(Debug, Parser)]
#[command(
    name = "mapui-probe",
    about = "Evaluate popover placements, arrow offsets and layout configs",
    version
)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write logs to stderr as JSON lines (filter with MAPUI_LOG).
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Solve side/align/offsets for an anchor.
    Place(PlaceArgs),

    /// Position the arrow on a rendered popover.
    Arrow(ArrowArgs),

    /// Inspect placement configs.
    Config(ConfigArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let format = cli.format;
    match cli.command {
        Commands::Place(args) => run_place(args, format, out),
        Commands::Arrow(args) => run_arrow(args, format, out),
        Commands::Config(args) => run_config(args, format, out),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tempfile::tempdir;

    use crate::error::ProbeCliError;

    use super::{Cli, run};

    fn run_args(args: &[&str]) -> Result<String, ProbeCliError> {
        let cli = Cli::try_parse_from(args).expect("arguments should parse");
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out).expect("utf8 output"))
    }

    fn run_json(args: &[&str]) -> Value {
        let output = run_args(args).expect("command should succeed");
        serde_json::from_str(&output).expect("json output")
    }

    #[test]
    fn place_reports_default_layout() {
        let value = run_json(&[
            "mapui-probe",
            "place",
            "--anchor",
            "500,400,20,20",
            "--viewport",
            "1920,1080",
        ]);
        assert_eq!(value["status"], "ok");
        assert_eq!(value["placement"]["side"], "bottom");
        assert_eq!(value["placement"]["align"], "center");
        assert_eq!(value["placement"]["sideOffset"], 38.0);
        assert_eq!(value["popover"]["width"], 500.0);
        assert_eq!(value["predictedRect"]["left"], 260.0);
        assert_eq!(value["predictedRect"]["top"], 448.0);
        assert_eq!(value["reserved"].as_array().map(Vec::len), Some(2));
        assert!(value.get("correction").is_none());
    }

    #[test]
    fn place_with_rendered_runs_measure_pass() {
        let value = run_json(&[
            "mapui-probe",
            "place",
            "--anchor",
            "500,400,20,20",
            "--viewport",
            "1920,1080",
            "--rendered",
            "260,448,500,400",
        ]);
        assert_eq!(value["correction"]["stage"], "measured");
        assert_eq!(value["correction"]["arrow"]["side"], "top");
    }

    #[test]
    fn place_text_output() {
        let output = run_args(&[
            "mapui-probe",
            "--format",
            "text",
            "place",
            "--anchor",
            "1850,60,20,20",
            "--viewport",
            "1920,1080",
        ])
        .expect("place text");
        assert!(output.contains("side          left"), "{output}");
        assert!(output.contains("overridden    true"), "{output}");
    }

    #[test]
    fn place_with_layout_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("layout.toml");
        std::fs::write(&path, "[regions.timeline]\nenabled = false\n").expect("write layout");
        let value = run_json(&[
            "mapui-probe",
            "place",
            "--anchor",
            "960,560,20,20",
            "--viewport",
            "1920,1080",
            "--config",
            path.to_str().expect("utf8 path"),
        ]);
        assert_eq!(value["placement"]["side"], "bottom");
        assert_eq!(value["reserved"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn arrow_scenario() {
        let value = run_json(&[
            "mapui-probe",
            "arrow",
            "--anchor",
            "540,470,20,20",
            "--popover",
            "300,500,500,400",
        ]);
        assert_eq!(value["arrow"]["side"], "top");
        assert_eq!(value["css"], "250px");
    }

    #[test]
    fn arrow_without_popover_uses_hint() {
        let output = run_args(&[
            "mapui-probe",
            "--format",
            "text",
            "arrow",
            "--anchor",
            "540,470,20,20",
            "--hint",
            "right",
        ])
        .expect("arrow text");
        assert_eq!(output, "edge    left\noffset  50%\n");
    }

    #[test]
    fn malformed_rect_is_a_parse_error() {
        let err = Cli::try_parse_from([
            "mapui-probe",
            "place",
            "--anchor",
            "1,2,3",
            "--viewport",
            "1920,1080",
        ])
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn toml_output_rejected_for_place() {
        let err = run_args(&[
            "mapui-probe",
            "--format",
            "toml",
            "place",
            "--anchor",
            "0,0,0,0",
            "--viewport",
            "800,600",
        ])
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn config_check_accepts_valid_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("layout.json");
        std::fs::write(&path, r#"{"regions":{"toolbar":{"enabled":false}}}"#).expect("write");
        let value = run_json(&[
            "mapui-probe",
            "config",
            "check",
            path.to_str().expect("utf8 path"),
        ]);
        assert_eq!(value["status"], "ok");
        assert_eq!(value["toolbar"], false);
        assert_eq!(value["timeline"], true);
        assert_eq!(value["retryBudgetMs"], 150);
    }

    #[test]
    fn config_check_text_reports_retry_budget() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("layout.toml");
        std::fs::write(
            &path,
            concat!(
                "[anchor_retry]\nmax_retries = 2\n\n",
                "[anchor_retry.backoff]\nkind = \"linear\"\nbase_ms = 30\nmax_ms = 100\n",
            ),
        )
        .expect("write");
        let output = run_args(&[
            "mapui-probe",
            "--format",
            "text",
            "config",
            "check",
            path.to_str().expect("utf8 path"),
        ])
        .expect("config check text");
        assert!(output.contains("retry_budget_ms  90"), "{output}");
    }

    #[test]
    fn config_check_rejects_invalid_values() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("layout.toml");
        std::fs::write(&path, "viewport_margin = -5.0\n").expect("write");
        let err = run_args(&[
            "mapui-probe",
            "config",
            "check",
            path.to_str().expect("utf8 path"),
        ])
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("viewport_margin"));
    }

    #[test]
    fn config_check_missing_file_is_io() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");
        let err = run_args(&[
            "mapui-probe",
            "config",
            "check",
            path.to_str().expect("utf8 path"),
        ])
        .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn config_defaults_roundtrip_through_check() {
        let toml = run_args(&["mapui-probe", "--format", "toml", "config", "defaults"])
            .expect("defaults toml");
        assert!(toml.contains("[regions.toolbar]"), "{toml}");

        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("defaults.toml");
        std::fs::write(&path, &toml).expect("write");
        let value = run_json(&[
            "mapui-probe",
            "config",
            "check",
            path.to_str().expect("utf8 path"),
        ]);
        assert_eq!(value["status"], "ok");

        let json = run_json(&["mapui-probe", "config", "defaults"]);
        assert_eq!(json["arrow_margin"], 25.0);
        assert_eq!(json["anchor_retry"]["backoff"]["kind"], "fixed");
    }
}
