//! Decorative canvas effects for the backdrop page
//!
//! Two independent effects share nothing but the frame loop:
//! a pointer-reactive [`ParticleField`] and a [`PulseGraph`] with a
//! travelling activation wave. Simulation and drawing are pure and run
//! natively; the browser binding lives in `web`.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use wasm_bindgen::prelude::*;

pub mod canvas2d;
pub mod config;
pub mod particles;
pub mod pointer;
pub mod pulse;
pub mod scheduler;
pub mod surface;
mod web;

pub use config::{
    BackdropConfig, BannerLine, ConfigError, FieldConfig, MIN_AREA_PER_PARTICLE, PulseConfig,
};
pub use particles::{MAX_PARTICLES, Particle, ParticleField};
pub use pointer::PointerState;
pub use pulse::{GraphEdge, GraphNode, PulseGraph, PulsePhase};
pub use scheduler::{Effect, FrameClock, FrameStats, Layer, ManualClock, Scheduler};
pub use surface::{DrawCommand, RecordingSurface, Rgb, Rgba, Surface};
pub use web::PerformanceClock;

/// Initialize WASM panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfig::default(),
        ));
    // A host that already installed a subscriber keeps it
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Mount the effects on the current page and start the frame loop.
///
/// `config_json` is an optional JSON [`BackdropConfig`]; missing fields take
/// their defaults. Canvases that are not on the page are skipped silently.
#[wasm_bindgen]
pub fn mount_backdrop(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(json) => BackdropConfig::from_json(&json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => BackdropConfig::default(),
    };
    web::mount(config)
}
