//! Frame scheduling for effects
//!
//! The browser loop (or a headless driver) calls [`Scheduler::tick`] once per
//! display refresh. Everything that changes per frame goes through here, so
//! frame-by-frame behaviour can be tested with a [`ManualClock`] and a
//! [`RecordingSurface`](crate::surface::RecordingSurface).

use std::cell::Cell;

use crate::pointer::PointerState;
use crate::surface::Surface;

/// One animated component
pub trait Effect {
    /// Short identifier used in logs and reports
    fn name(&self) -> &'static str;

    /// Throw away layout state and regenerate it for a new viewport
    fn resize(&mut self, width: u32, height: u32);

    /// Advance the simulation by one frame
    fn update(&mut self, pointer: &PointerState);

    /// Paint the current state (clears the surface first)
    fn draw(&self, surface: &mut dyn Surface);
}

/// Monotonic time source in milliseconds
pub trait FrameClock {
    fn now_ms(&self) -> f64;
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl FrameClock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

impl<C: FrameClock> FrameClock for &C {
    fn now_ms(&self) -> f64 {
        (*self).now_ms()
    }
}

/// Frame counters measured from the scheduler's clock
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Frames drawn since `start()`
    pub frames: u64,
    /// Clock time between `start()` and the latest frame
    pub elapsed_ms: f64,
}

impl FrameStats {
    /// Average frame rate, zero until time has passed
    pub fn fps(&self) -> f64 {
        if self.elapsed_ms > 0.0 {
            self.frames as f64 * 1000.0 / self.elapsed_ms
        } else {
            0.0
        }
    }
}

/// An effect and the surface it paints on
pub struct Layer<S> {
    pub effect: Box<dyn Effect>,
    pub surface: S,
}

/// Drives every layer from a single tick
pub struct Scheduler<C, S> {
    clock: C,
    layers: Vec<Layer<S>>,
    pointer: PointerState,
    running: bool,
    started_at: f64,
    stats: FrameStats,
}

impl<C: FrameClock, S: Surface> Scheduler<C, S> {
    /// Create an idle scheduler; nothing happens until `start()`
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            layers: Vec::new(),
            pointer: PointerState::new(),
            running: false,
            started_at: 0.0,
            stats: FrameStats::default(),
        }
    }

    /// Add an effect; it is sized to the surface's current dimensions
    pub fn add_layer(&mut self, mut effect: Box<dyn Effect>, surface: S) {
        let (width, height) = surface.size();
        effect.resize(width, height);
        tracing::debug!(effect = effect.name(), width, height, "added layer");
        self.layers.push(Layer { effect, surface });
    }

    pub fn layers(&self) -> &[Layer<S>] {
        &self.layers
    }

    /// Resize every surface and regenerate every effect
    pub fn resize(&mut self, width: u32, height: u32) {
        for layer in &mut self.layers {
            layer.surface.resize(width, height);
            layer.effect.resize(width, height);
        }
    }

    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer.set(x, y);
    }

    pub fn clear_pointer(&mut self) {
        self.pointer.clear();
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin producing frames; resets frame statistics
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.started_at = self.clock.now_ms();
        self.stats = FrameStats::default();
        tracing::info!(layers = self.layers.len(), "animation started");
    }

    /// Stop producing frames; later ticks are no-ops
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            tracing::info!(frames = self.stats.frames, "animation stopped");
        }
    }

    /// Update and draw every layer once. Returns false when idle.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        for layer in &mut self.layers {
            layer.effect.update(&self.pointer);
            layer.effect.draw(&mut layer.surface);
        }

        self.stats.frames += 1;
        self.stats.elapsed_ms = self.clock.now_ms() - self.started_at;
        true
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}
