//! Pointer position shared between the input handler and the frame loop

/// Last known cursor position in canvas pixels, if any
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    position: Option<(f32, f32)>,
}

impl PointerState {
    /// Pointer state with no known position
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer state at a known position
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Some((x, y)),
        }
    }

    /// Record a pointer-move
    pub fn set(&mut self, x: f32, y: f32) {
        self.position = Some((x, y));
    }

    /// Forget the position (pointer left the page)
    pub fn clear(&mut self) {
        self.position = None;
    }

    pub fn position(&self) -> Option<(f32, f32)> {
        self.position
    }
}
