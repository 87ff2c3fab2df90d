//! Tunables for both effects
//!
//! Every field has a default so partial JSON/YAML documents are accepted.
//! Ranges are `(min, max)` pairs sampled half-open.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::surface::Rgb;

/// Smallest accepted viewport area per particle, in pixels
pub const MIN_AREA_PER_PARTICLE: f32 = 1.0;

/// Errors reported by [`BackdropConfig::validate`] and [`BackdropConfig::from_json`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A value that must be strictly positive was not
    #[error("{0} must be positive")]
    NotPositive(&'static str),

    /// A `(min, max)` pair with `min >= max`
    #[error("{name} range is empty: [{min}, {max})")]
    EmptyRange {
        name: &'static str,
        min: f32,
        max: f32,
    },

    /// The pulse grid needs at least two columns and two rows
    #[error("pulse grid must be at least 2x2, got {cols}x{rows}")]
    GridTooSmall { cols: usize, rows: usize },

    /// Pulse speed outside `(0, 1)`
    #[error("pulse_speed must be in (0, 1), got {0}")]
    PulseSpeed(f64),

    /// The attraction dead zone swallows the whole attraction radius
    #[error("dead_zone ({dead_zone}) must be smaller than attraction_radius ({radius})")]
    DeadZone { dead_zone: f32, radius: f32 },

    /// Fewer than [`MIN_AREA_PER_PARTICLE`] pixels per particle
    #[error("area_per_particle must be at least {MIN_AREA_PER_PARTICLE}, got {0}")]
    AreaPerParticle(f32),

    /// The document is not valid JSON for this configuration
    #[error("malformed config JSON: {0}")]
    Json(String),
}

/// Particle field tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Viewport pixels per particle
    pub area_per_particle: f32,
    /// Initial velocity component bound (per axis, symmetric)
    pub initial_speed: f32,
    pub radius: (f32, f32),
    pub opacity: (f32, f32),
    /// Pointer attraction reaches this far
    pub attraction_radius: f32,
    /// No attraction this close to the pointer
    pub dead_zone: f32,
    pub attraction_strength: f32,
    pub max_speed: f32,
    /// Pairs closer than this are linked
    pub link_distance: f32,
    /// Link alpha at zero distance
    pub link_alpha: f32,
    pub color: Rgb,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            area_per_particle: 30_000.0,
            initial_speed: 0.15,
            radius: (0.5, 2.0),
            opacity: (0.1, 0.4),
            attraction_radius: 120.0,
            dead_zone: 30.0,
            attraction_strength: 0.008,
            max_speed: 0.6,
            link_distance: 100.0,
            link_alpha: 0.1,
            color: Rgb::ACCENT,
        }
    }
}

/// Pulse graph tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub cols: usize,
    pub rows: usize,
    /// Inset from every viewport edge
    pub padding: f32,
    /// Jitter span as a fraction of the cell size
    pub jitter: f32,
    pub node_size: (f32, f32),
    /// Edges reach at most this many columns ahead
    pub max_col_span: usize,
    /// Edges reach at most this many rows up or down
    pub max_row_span: usize,
    /// Outgoing edges per node are drawn from `1..=max_links`
    pub max_links: usize,
    /// Phase increment per frame
    pub pulse_speed: f64,
    /// Phase offset per column
    pub column_offset: f64,
    /// Phase offset per edge index
    pub edge_offset: f64,
    pub edge_base_alpha: f32,
    pub edge_glow: f32,
    pub node_base_alpha: f32,
    pub node_glow: f32,
    pub color: Rgb,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            cols: 5,
            rows: 3,
            padding: 60.0,
            jitter: 0.4,
            node_size: (5.0, 11.0),
            max_col_span: 2,
            max_row_span: 1,
            max_links: 2,
            pulse_speed: 0.006,
            column_offset: 0.15,
            edge_offset: 0.02,
            edge_base_alpha: 0.08,
            edge_glow: 0.4,
            node_base_alpha: 0.2,
            node_glow: 0.3,
            color: Rgb::ACCENT,
        }
    }
}

/// One styled console line printed on mount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerLine {
    pub text: String,
    /// CSS applied through the `%c` console directive
    pub style: String,
}

/// Complete configuration for a mounted backdrop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    pub field: FieldConfig,
    pub pulse: PulseConfig,
    /// Element id of the particle canvas
    pub field_canvas_id: String,
    /// Element id of the pulse graph canvas
    pub pulse_canvas_id: String,
    /// Fixed seed for reproducible layouts; random when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub banner: Vec<BannerLine>,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            pulse: PulseConfig::default(),
            field_canvas_id: "graph-canvas".to_string(),
            pulse_canvas_id: "neural-canvas".to_string(),
            seed: None,
            banner: vec![
                BannerLine {
                    text: "🔥 ByteInfer Labs".to_string(),
                    style: "color: #ff6b35; font-size: 24px; font-weight: bold;".to_string(),
                },
                BannerLine {
                    text: "Inference has a new language.".to_string(),
                    style: "color: #666; font-size: 12px;".to_string(),
                },
            ],
        }
    }
}

impl BackdropConfig {
    /// Parse a JSON document, filling gaps with defaults, and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every invariant the effects rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.field.validate()?;
        self.pulse.validate()
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive(name))
    }
}

fn range(name: &'static str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    if min < max {
        Ok(())
    } else {
        Err(ConfigError::EmptyRange { name, min, max })
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.area_per_particle.is_nan() || self.area_per_particle < MIN_AREA_PER_PARTICLE {
            return Err(ConfigError::AreaPerParticle(self.area_per_particle));
        }
        positive("initial_speed", self.initial_speed)?;
        positive("max_speed", self.max_speed)?;
        positive("attraction_radius", self.attraction_radius)?;
        positive("link_distance", self.link_distance)?;
        range("radius", self.radius)?;
        range("opacity", self.opacity)?;
        if self.dead_zone >= self.attraction_radius {
            return Err(ConfigError::DeadZone {
                dead_zone: self.dead_zone,
                radius: self.attraction_radius,
            });
        }
        Ok(())
    }
}

impl PulseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Cell size divides by (cols - 1) and (rows - 1)
        if self.cols < 2 || self.rows < 2 {
            return Err(ConfigError::GridTooSmall {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if !(self.pulse_speed > 0.0 && self.pulse_speed < 1.0) {
            return Err(ConfigError::PulseSpeed(self.pulse_speed));
        }
        if self.max_links == 0 {
            return Err(ConfigError::NotPositive("max_links"));
        }
        if self.max_col_span == 0 {
            return Err(ConfigError::NotPositive("max_col_span"));
        }
        range("node_size", self.node_size)
    }
}
