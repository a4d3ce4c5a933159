//! Argument parsers, output formatting and logging setup shared by the
//! subcommands.

use std::io::Write;

use clap::ValueEnum;
use mapui_placement::{Rect, Size};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::error::{ProbeCliError, Result};

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "MAPUI_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
    Toml,
}

fn parse_numbers<const N: usize>(raw: &str, shape: &str) -> std::result::Result<[f64; N], String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {shape}, got {raw:?}"));
    }
    let mut values = [0.0; N];
    for (slot, part) in values.iter_mut().zip(parts) {
        let value: f64 = part
            .parse()
            .map_err(|_| format!("{part:?} is not a number in {raw:?}"))?;
        if !value.is_finite() {
            return Err(format!("{part:?} is not finite in {raw:?}"));
        }
        *slot = value;
    }
    Ok(values)
}

/// Parse `LEFT,TOP,WIDTH,HEIGHT`.
pub fn parse_rect(raw: &str) -> std::result::Result<Rect, String> {
    let [left, top, width, height] = parse_numbers::<4>(raw, "LEFT,TOP,WIDTH,HEIGHT")?;
    if width < 0.0 || height < 0.0 {
        return Err(format!("negative size in {raw:?}"));
    }
    Ok(Rect::new(left, top, width, height))
}

/// Parse `WIDTH,HEIGHT`.
pub fn parse_size(raw: &str) -> std::result::Result<Size, String> {
    let [width, height] = parse_numbers::<2>(raw, "WIDTH,HEIGHT")?;
    if width < 0.0 || height < 0.0 {
        return Err(format!("negative size in {raw:?}"));
    }
    Ok(Size::new(width, height))
}

/// Write `value` as one line of JSON.
pub fn emit_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Write aligned `key value` lines.
pub fn emit_text(out: &mut dyn Write, rows: &[(&str, String)]) -> Result<()> {
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in rows {
        writeln!(out, "{key:<width$}  {value}")?;
    }
    Ok(())
}

pub fn reject_toml(format: OutputFormat, command: &str) -> Result<()> {
    if format == OutputFormat::Toml {
        return Err(ProbeCliError::usage(format!(
            "--format toml is only supported by `config defaults`, not `{command}`"
        )));
    }
    Ok(())
}

pub fn fmt_rect(rect: Rect) -> String {
    format!("{},{} {}x{}", rect.left, rect.top, rect.width, rect.height)
}

/// Install the stderr log subscriber. Safe to call more than once.
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rect_with_spaces() {
        assert_eq!(
            parse_rect("500, 400, 20, 20"),
            Ok(Rect::new(500.0, 400.0, 20.0, 20.0))
        );
    }

    #[test]
    fn rejects_wrong_arity() {
        let err = parse_rect("1,2,3").unwrap_err();
        assert!(err.contains("LEFT,TOP,WIDTH,HEIGHT"), "{err}");
        assert!(parse_size("1920").is_err());
    }

    #[test]
    fn rejects_garbage_and_negative_sizes() {
        assert!(parse_size("wide,1080").is_err());
        assert!(parse_size("1920,-1").is_err());
        assert!(parse_rect("0,0,NaN,1").is_err());
        assert!(parse_rect("-10,-10,0,0").is_ok());
    }

    #[test]
    fn text_rows_are_aligned() {
        let mut out = Vec::new();
        emit_text(
            &mut out,
            &[("side", "bottom".to_string()), ("side_offset", "38".to_string())],
        )
        .expect("write rows");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "side         bottom\nside_offset  38\n"
        );
    }

    #[test]
    fn toml_rejected_outside_config() {
        assert!(reject_toml(OutputFormat::Json, "place").is_ok());
        let err = reject_toml(OutputFormat::Toml, "place").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
