use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use mapui_placement::{
    Correction, PlacementConfig, PlacementResult, PlacementSession, Rect, Size, Viewport,
};
use serde::Serialize;

use crate::error::Result;
use crate::util::{
    OutputFormat, emit_json, emit_text, fmt_rect, parse_rect, parse_size, reject_toml,
};

#[derive(Debug, Clone, Args)]
pub struct PlaceArgs {
    /// Anchor rectangle as LEFT,TOP,WIDTH,HEIGHT.
    #[arg(long, value_parser = parse_rect, allow_hyphen_values = true)]
    pub anchor: Rect,

    /// Estimated popover size as WIDTH,HEIGHT (default from config).
    #[arg(long, value_parser = parse_size)]
    pub popover: Option<Size>,

    /// Viewport size as WIDTH,HEIGHT.
    #[arg(long, value_parser = parse_size)]
    pub viewport: Size,

    /// Placement config (TOML, or JSON by extension).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Rendered popover rectangle; runs the measure pass as well.
    #[arg(long, value_parser = parse_rect, allow_hyphen_values = true)]
    pub rendered: Option<Rect>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaceReport {
    status: &'static str,
    placement: PlacementResult,
    popover: Size,
    predicted_rect: Rect,
    reserved: Vec<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correction: Option<Correction>,
}

pub fn load_config(path: Option<&PathBuf>) -> Result<PlacementConfig> {
    match path {
        Some(path) => Ok(PlacementConfig::from_file(path)?),
        None => Ok(PlacementConfig::default()),
    }
}

pub fn run_place(args: PlaceArgs, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    reject_toml(format, "place")?;
    let config = load_config(args.config.as_ref())?;
    let viewport = Viewport::from(args.viewport);

    let mut session = PlacementSession::open(args.anchor, args.popover, viewport, &config);
    let estimate = session.size();
    let placement = session.placement();
    let correction = args.rendered.map(|rect| session.measure(Some(rect)));

    let report = PlaceReport {
        status: "ok",
        placement,
        popover: estimate,
        predicted_rect: placement.predicted_rect(args.anchor, estimate),
        reserved: config.regions.rects(viewport),
        correction,
    };

    match format {
        OutputFormat::Json | OutputFormat::Toml => emit_json(out, &report),
        OutputFormat::Text => {
            let mut rows = vec![
                ("side", placement.side.to_string()),
                ("align", placement.align.to_string()),
                ("side_offset", placement.side_offset.to_string()),
                ("align_offset", placement.align_offset.to_string()),
                ("fits", placement.fits.to_string()),
                ("overridden", placement.overridden.to_string()),
                ("popover", fmt_rect(report.predicted_rect)),
            ];
            if let Some(correction) = report.correction {
                rows.push(("changed", correction.placement_changed.to_string()));
                rows.push(("corrected_side", correction.placement.side.to_string()));
                rows.push(("arrow_edge", correction.arrow.side.to_string()));
                rows.push(("arrow_offset", correction.arrow.offset.to_css()));
            }
            emit_text(out, &rows)
        }
    }
}
