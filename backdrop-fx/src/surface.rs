//! Drawing targets for effects
//!
//! Effects paint through the [`Surface`] trait so the same frame can land on
//! a browser canvas or in a [`RecordingSurface`] for tests and headless
//! rendering.

use serde::{Deserialize, Serialize};

/// Opaque RGB colour, serialized as `[r, g, b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Brand accent (#ff6b35)
    pub const ACCENT: Rgb = Rgb([255, 107, 53]);

    /// Attach an alpha channel
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba {
            r: self.0[0],
            g: self.0[1],
            b: self.0[2],
            a: alpha,
        }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::ACCENT
    }
}

/// Colour with straight alpha in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    /// CSS `rgba()` string as accepted by canvas fill/stroke styles
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// A 2D drawing target sized in pixels
pub trait Surface {
    /// Set the pixel dimensions of the target
    fn resize(&mut self, width: u32, height: u32);

    /// Current pixel dimensions
    fn size(&self) -> (u32, u32);

    /// Wipe the whole target
    fn clear(&mut self);

    /// Stroke a straight line segment
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba, width: f32);

    /// Fill a circle
    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba);
}

/// A single recorded primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: Rgba,
        width: f32,
    },
    Circle {
        center: (f32, f32),
        radius: f32,
        color: Rgba,
    },
}

/// Surface that keeps the commands of the current frame in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Commands issued since the last clear (including that clear)
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of line segments in the current frame
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    /// Number of circles in the current frame
    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.commands.clear();
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        // A clear wipes the target, so earlier commands are no longer visible
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }
}
