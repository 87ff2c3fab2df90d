//! Headless rendering of the backdrop effects
//!
//! Runs both effects through the same [`Scheduler`] the browser uses, with a
//! manual clock and recording surfaces, then writes the last frame of each
//! layer as SVG alongside a JSON report.

use std::fs;
use std::path::{Path, PathBuf};

use backdrop_fx::{
    BackdropConfig, DrawCommand, ManualClock, ParticleField, PulseGraph, RecordingSurface,
    Scheduler, Surface,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;

/// Frame interval of a 60 Hz display
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// What to render
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub width: u32,
    pub height: u32,
    pub frames: u64,
    pub seed: u64,
    /// Pointer held still for the whole run
    pub pointer: Option<(f32, f32)>,
}

/// Per-layer primitive counts of the final frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerReport {
    pub name: String,
    pub lines: usize,
    pub circles: usize,
}

/// Summary written to `stats.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotReport {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub frames: u64,
    pub elapsed_ms: f64,
    pub fps: f64,
    pub layers: Vec<LayerReport>,
}

/// Rendered output of one run
pub struct Snapshot {
    pub report: SnapshotReport,
    /// `(layer name, svg document)` in layer order
    pub svgs: Vec<(String, String)>,
}

/// Run the effects for `options.frames` frames
pub fn render(config: &BackdropConfig, options: &SnapshotOptions) -> Snapshot {
    let clock = ManualClock::new();
    let mut scheduler = Scheduler::new(&clock);

    scheduler.add_layer(
        Box::new(ParticleField::new(
            config.field.clone(),
            SmallRng::seed_from_u64(options.seed),
        )),
        RecordingSurface::new(options.width, options.height),
    );
    scheduler.add_layer(
        Box::new(PulseGraph::new(
            config.pulse.clone(),
            SmallRng::seed_from_u64(options.seed.wrapping_add(1)),
        )),
        RecordingSurface::new(options.width, options.height),
    );

    if let Some((x, y)) = options.pointer {
        scheduler.set_pointer(x, y);
    }

    scheduler.start();
    for _ in 0..options.frames {
        clock.advance(FRAME_MS);
        scheduler.tick();
    }
    scheduler.stop();

    let stats = scheduler.stats();
    let mut layers = Vec::new();
    let mut svgs = Vec::new();
    for layer in scheduler.layers() {
        let name = layer.effect.name().to_string();
        layers.push(LayerReport {
            name: name.clone(),
            lines: layer.surface.line_count(),
            circles: layer.surface.circle_count(),
        });
        svgs.push((name, to_svg(&layer.surface)));
    }

    tracing::info!(
        frames = stats.frames,
        width = options.width,
        height = options.height,
        "rendered snapshot"
    );

    Snapshot {
        report: SnapshotReport {
            width: options.width,
            height: options.height,
            seed: options.seed,
            frames: stats.frames,
            elapsed_ms: stats.elapsed_ms,
            fps: stats.fps(),
            layers,
        },
        svgs,
    }
}

/// Write `<layer>.svg` files and `stats.json`; returns the written paths
pub fn write(snapshot: &Snapshot, output: &Path) -> std::io::Result<Vec<PathBuf>> {
    fs::create_dir_all(output)?;

    let mut written = Vec::new();
    for (name, svg) in &snapshot.svgs {
        let path = output.join(format!("{name}.svg"));
        fs::write(&path, svg)?;
        written.push(path);
    }

    let stats_path = output.join("stats.json");
    let json = serde_json::to_string_pretty(&snapshot.report).map_err(std::io::Error::other)?;
    fs::write(&stats_path, json)?;
    written.push(stats_path);

    Ok(written)
}

/// Serialize the current frame of a recording surface as an SVG document
pub fn to_svg(surface: &RecordingSurface) -> String {
    let (width, height) = surface.size();
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n"
    );

    for command in surface.commands() {
        match command {
            // The document starts blank
            DrawCommand::Clear => {}
            DrawCommand::Line {
                from,
                to,
                color,
                width,
            } => svg.push_str(&format!(
                "  <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"rgb({}, {}, {})\" stroke-opacity=\"{:.3}\" stroke-width=\"{:.2}\"/>\n",
                from.0, from.1, to.0, to.1, color.r, color.g, color.b, color.a, width
            )),
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => svg.push_str(&format!(
                "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"rgb({}, {}, {})\" fill-opacity=\"{:.3}\"/>\n",
                center.0, center.1, radius, color.r, color.g, color.b, color.a
            )),
        }
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_fx::Rgb;
    use tempfile::TempDir;

    fn options(frames: u64) -> SnapshotOptions {
        SnapshotOptions {
            width: 1500,
            height: 900,
            frames,
            seed: 42,
            pointer: None,
        }
    }

    #[test]
    fn reference_viewport_counts() {
        let snapshot = render(&BackdropConfig::default(), &options(10));
        let report = &snapshot.report;

        assert_eq!(report.frames, 10);
        assert_eq!(report.layers.len(), 2);
        assert_eq!(report.layers[0].name, "particles");
        assert_eq!(report.layers[0].circles, 45);
        assert_eq!(report.layers[1].name, "pulse");
        assert_eq!(report.layers[1].circles, 15);
        assert!((report.fps - 60.0).abs() < 1e-6);
    }

    #[test]
    fn same_seed_renders_identically() {
        let config = BackdropConfig::default();
        let a = render(&config, &options(30));
        let b = render(&config, &options(30));
        assert_eq!(a.svgs, b.svgs);
        assert_eq!(a.report, b.report);
    }

    #[test]
    fn zero_frames_renders_blank_documents() {
        let snapshot = render(&BackdropConfig::default(), &options(0));
        assert_eq!(snapshot.report.layers[0].circles, 0);
        assert!(!snapshot.svgs[0].1.contains("<circle"));
    }

    #[test]
    fn writes_svgs_and_stats() {
        let dir = TempDir::new().unwrap();
        let snapshot = render(&BackdropConfig::default(), &options(5));

        let written = write(&snapshot, dir.path()).unwrap();

        assert_eq!(written.len(), 3);
        assert!(dir.path().join("particles.svg").exists());
        assert!(dir.path().join("pulse.svg").exists());
        let stats = fs::read_to_string(dir.path().join("stats.json")).unwrap();
        assert!(stats.contains("\"seed\": 42"));
        assert!(stats.contains("\"frames\": 5"));
    }

    #[test]
    fn svg_of_recorded_frame() {
        let mut surface = RecordingSurface::new(200, 100);
        surface.clear();
        surface.stroke_line((0.0, 0.0), (30.0, 40.0), Rgb::ACCENT.with_alpha(0.05), 1.0);
        surface.fill_circle((30.0, 40.0), 1.5, Rgb::ACCENT.with_alpha(0.25));

        insta::assert_snapshot!(to_svg(&surface), @r#"
        <svg xmlns="http://www.w3.org/2000/svg" width="200" height="100" viewBox="0 0 200 100">
          <line x1="0.00" y1="0.00" x2="30.00" y2="40.00" stroke="rgb(255, 107, 53)" stroke-opacity="0.050" stroke-width="1.00"/>
          <circle cx="30.00" cy="40.00" r="1.50" fill="rgb(255, 107, 53)" fill-opacity="0.250"/>
        </svg>
        "#);
    }
}
