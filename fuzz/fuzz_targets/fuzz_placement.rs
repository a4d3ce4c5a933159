#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use mapui_placement::{
    PlacementConfig, PlacementSession, Rect, Size, Stage, Viewport, compute_arrow_offset,
    compute_placement,
};

#[derive(Debug, Arbitrary)]
struct Scene {
    anchor: [f64; 4],
    popover: Option<[f64; 2]>,
    viewport: [f64; 2],
    rendered: Option<[f64; 4]>,
    regions: bool,
}

fn rect(v: [f64; 4]) -> Rect {
    Rect::new(v[0], v[1], v[2], v[3])
}

fn bounded(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite() && v.abs() < 1e12)
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(scene) = Scene::arbitrary(&mut u) else {
        return;
    };

    let config = if scene.regions {
        PlacementConfig::default()
    } else {
        PlacementConfig::without_regions()
    };
    let anchor = rect(scene.anchor);
    let popover = scene.popover.map(|[w, h]| Size::new(w, h));
    let viewport = Viewport::new(scene.viewport[0], scene.viewport[1]);

    // NaN, infinities and negative sizes must never panic.
    let result = compute_placement(anchor, config.estimate_or_default(popover), viewport, &config);
    let arrow = compute_arrow_offset(anchor, scene.rendered.map(rect), Some(result.side), &config);

    let sane = bounded(&scene.anchor)
        && bounded(&scene.viewport)
        && scene.popover.is_none_or(|p| bounded(&p));
    if sane {
        assert!(result.side_offset.is_finite(), "side offset not finite");
        assert!(result.align_offset.is_finite(), "align offset not finite");
        assert!(result.side_offset >= 0.0, "negative side offset");
    }
    if let Some(px) = arrow.offset.pixels() {
        assert!(!px.is_nan(), "arrow offset is NaN");
    }

    let mut session = PlacementSession::open(anchor, popover, viewport, &config);
    let _ = session.measure(scene.rendered.map(rect));
    let _ = session.settle(scene.rendered.map(rect));
    assert_eq!(session.stage(), Stage::Settled);
});
