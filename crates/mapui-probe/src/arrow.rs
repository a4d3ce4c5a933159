use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use mapui_placement::{ArrowPlacement, Rect, Side, compute_arrow_offset};
use serde::Serialize;

use crate::error::Result;
use crate::place::load_config;
use crate::util::{OutputFormat, emit_json, emit_text, parse_rect, reject_toml};

#[derive(Debug, Clone, Args)]
pub struct ArrowArgs {
    /// Anchor rectangle as LEFT,TOP,WIDTH,HEIGHT.
    #[arg(long, value_parser = parse_rect, allow_hyphen_values = true)]
    pub anchor: Rect,

    /// Rendered popover rectangle as LEFT,TOP,WIDTH,HEIGHT. Omit to get the
    /// pre-layout default.
    #[arg(long, value_parser = parse_rect, allow_hyphen_values = true)]
    pub popover: Option<Rect>,

    /// Side the popover was placed on (top, bottom, left, right).
    #[arg(long)]
    pub hint: Option<Side>,

    /// Placement config (TOML, or JSON by extension).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ArrowReport {
    status: &'static str,
    arrow: ArrowPlacement,
    css: String,
}

pub fn run_arrow(args: ArrowArgs, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    reject_toml(format, "arrow")?;
    let config = load_config(args.config.as_ref())?;
    let arrow = compute_arrow_offset(args.anchor, args.popover, args.hint, &config);

    match format {
        OutputFormat::Json | OutputFormat::Toml => emit_json(
            out,
            &ArrowReport {
                status: "ok",
                arrow,
                css: arrow.offset.to_css(),
            },
        ),
        OutputFormat::Text => emit_text(
            out,
            &[
                ("edge", arrow.side.to_string()),
                ("offset", arrow.offset.to_css()),
            ],
        ),
    }
}
