//! Ambient particle layer
//!
//! Particles drift with constant velocity, wrap around the viewport edges
//! and are gently pulled toward the pointer. Pairs closer than the link
//! distance are joined by a faint line whose alpha falls off with distance.

use rand::Rng;

use crate::config::FieldConfig;
use crate::pointer::PointerState;
use crate::scheduler::Effect;
use crate::surface::Surface;

/// A drifting point
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub opacity: f32,
}

impl Particle {
    /// Velocity magnitude
    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Upper bound on particles per field; links are pairwise
pub const MAX_PARTICLES: usize = 5_000;

/// Pointer-reactive particle field
pub struct ParticleField<R> {
    pub particles: Vec<Particle>,
    config: FieldConfig,
    width: f32,
    height: f32,
    rng: R,
}

impl<R: Rng> ParticleField<R> {
    /// Create an empty field; particles appear on the first resize
    pub fn new(config: FieldConfig, rng: R) -> Self {
        Self {
            particles: Vec::new(),
            config,
            width: 0.0,
            height: 0.0,
            rng,
        }
    }

    /// Particle count for a viewport: one per `area_per_particle` pixels,
    /// at most [`MAX_PARTICLES`]
    pub fn count_for(config: &FieldConfig, width: u32, height: u32) -> usize {
        let area = width as f64 * height as f64;
        let count = (area / config.area_per_particle as f64).floor();
        if count.is_nan() {
            return 0;
        }
        count.min(MAX_PARTICLES as f64) as usize
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Discard every particle and scatter a fresh set over the viewport
    pub fn regenerate(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;

        let count = Self::count_for(&self.config, width, height);
        let speed = self.config.initial_speed;
        let (min_radius, max_radius) = self.config.radius;
        let (min_opacity, max_opacity) = self.config.opacity;

        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            let particle = Particle {
                x: self.rng.random_range(0.0..self.width),
                y: self.rng.random_range(0.0..self.height),
                vx: self.rng.random_range(-speed..speed),
                vy: self.rng.random_range(-speed..speed),
                radius: self.rng.random_range(min_radius..max_radius),
                opacity: self.rng.random_range(min_opacity..max_opacity),
            };
            self.particles.push(particle);
        }

        tracing::debug!(count, width, height, "regenerated particle field");
    }

    /// Integrate one frame: move, wrap, attract, clamp
    pub fn step(&mut self, pointer: &PointerState) {
        let (width, height) = (self.width, self.height);
        let config = &self.config;

        for particle in &mut self.particles {
            particle.x += particle.vx;
            particle.y += particle.vy;

            // Toroidal edges
            if particle.x < 0.0 {
                particle.x = width;
            } else if particle.x > width {
                particle.x = 0.0;
            }
            if particle.y < 0.0 {
                particle.y = height;
            } else if particle.y > height {
                particle.y = 0.0;
            }

            if let Some((px, py)) = pointer.position() {
                let dist = particle.distance_to(px, py);
                if dist > config.dead_zone && dist < config.attraction_radius {
                    let force = (config.attraction_radius - dist) / config.attraction_radius
                        * config.attraction_strength;
                    let angle = (py - particle.y).atan2(px - particle.x);
                    particle.vx += angle.cos() * force;
                    particle.vy += angle.sin() * force;
                }
            }

            let speed = particle.speed();
            if speed > config.max_speed {
                particle.vx = particle.vx / speed * config.max_speed;
                particle.vy = particle.vy / speed * config.max_speed;
            }
        }
    }

    /// Paint links first, then the particles on top
    pub fn paint(&self, surface: &mut dyn Surface) {
        surface.clear();

        let max_dist = self.config.link_distance;
        let max_dist_sq = max_dist * max_dist;

        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                let dx = a.x - b.x;
                let dy = a.y - b.y;
                let dist_sq = dx * dx + dy * dy;
                if dist_sq >= max_dist_sq {
                    continue;
                }

                let alpha = (1.0 - dist_sq.sqrt() / max_dist) * self.config.link_alpha;
                surface.stroke_line(
                    (a.x, a.y),
                    (b.x, b.y),
                    self.config.color.with_alpha(alpha),
                    1.0,
                );
            }
        }

        for particle in &self.particles {
            surface.fill_circle(
                (particle.x, particle.y),
                particle.radius,
                self.config.color.with_alpha(particle.opacity),
            );
        }
    }
}

impl<R: Rng> Effect for ParticleField<R> {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.regenerate(width, height);
    }

    fn update(&mut self, pointer: &PointerState) {
        self.step(pointer);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.paint(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn field(seed: u64) -> ParticleField<SmallRng> {
        ParticleField::new(FieldConfig::default(), SmallRng::seed_from_u64(seed))
    }

    fn still(x: f32, y: f32) -> Particle {
        Particle {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
            opacity: 0.2,
        }
    }

    #[test]
    fn count_follows_viewport_area() {
        let mut field = field(1);
        field.regenerate(1500, 900);
        assert_eq!(field.particles.len(), 45);

        field.regenerate(800, 600);
        assert_eq!(field.particles.len(), 16);
    }

    #[test]
    fn empty_viewport_has_no_particles() {
        let mut field = field(1);
        field.regenerate(0, 900);
        assert!(field.particles.is_empty());

        // Smaller than a single particle's share of area
        field.regenerate(100, 100);
        assert!(field.particles.is_empty());
    }

    #[test]
    fn unvalidated_tiny_area_is_capped() {
        let config = FieldConfig {
            area_per_particle: 1e-30,
            ..FieldConfig::default()
        };
        assert_eq!(
            ParticleField::<SmallRng>::count_for(&config, 1500, 900),
            MAX_PARTICLES
        );

        let mut field = ParticleField::new(config, SmallRng::seed_from_u64(3));
        field.regenerate(1500, 900);
        assert_eq!(field.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn regenerated_particles_respect_bounds() {
        for seed in 0..20 {
            let mut field = field(seed);
            let (width, height) = (1024 + seed as u32 * 37, 768 + seed as u32 * 11);
            field.regenerate(width, height);

            assert_eq!(
                field.particles.len(),
                ParticleField::<SmallRng>::count_for(field.config(), width, height)
            );
            for p in &field.particles {
                assert!(p.x >= 0.0 && p.x < width as f32);
                assert!(p.y >= 0.0 && p.y < height as f32);
                assert!(p.vx >= -0.15 && p.vx < 0.15);
                assert!(p.vy >= -0.15 && p.vy < 0.15);
                assert!(p.radius >= 0.5 && p.radius < 2.0);
                assert!(p.opacity >= 0.1 && p.opacity < 0.4);
            }
        }
    }

    #[test]
    fn speed_never_exceeds_limit() {
        let mut pointer_rng = SmallRng::seed_from_u64(99);
        for seed in 0..10 {
            let mut field = field(seed);
            field.regenerate(1200, 800);
            for p in &mut field.particles {
                p.vx *= 10.0;
                p.vy *= 10.0;
            }

            for _ in 0..200 {
                let pointer = PointerState::at(
                    pointer_rng.random_range(0.0..1200.0),
                    pointer_rng.random_range(0.0..800.0),
                );
                field.step(&pointer);
                for p in &field.particles {
                    assert!(p.speed() <= 0.6 + 1e-5, "speed {} too high", p.speed());
                }
            }
        }
    }

    #[test]
    fn wraps_across_each_edge() {
        let mut field = field(3);
        field.regenerate(400, 300);

        let mut left = still(0.05, 150.0);
        left.vx = -0.1;
        let mut right = still(399.95, 150.0);
        right.vx = 0.1;
        let mut top = still(200.0, 0.05);
        top.vy = -0.1;
        let mut bottom = still(200.0, 299.95);
        bottom.vy = 0.1;
        field.particles = vec![left, right, top, bottom];

        field.step(&PointerState::new());

        assert_eq!(field.particles[0].x, 400.0);
        assert_eq!(field.particles[1].x, 0.0);
        assert_eq!(field.particles[2].y, 300.0);
        assert_eq!(field.particles[3].y, 0.0);
    }

    #[test]
    fn pointer_attracts_within_band() {
        let mut field = field(4);
        field.regenerate(400, 400);
        field.particles = vec![still(100.0, 100.0)];

        field.step(&PointerState::at(150.0, 100.0));

        let expected = (120.0 - 50.0) / 120.0 * 0.008;
        let p = &field.particles[0];
        assert!((p.vx - expected).abs() < 1e-6);
        assert!(p.vy.abs() < 1e-6);
    }

    #[test]
    fn pointer_ignored_outside_band() {
        let mut field = field(5);
        field.regenerate(400, 400);

        for pointer in [
            PointerState::at(110.0, 100.0),
            PointerState::at(130.0, 100.0),
            PointerState::at(220.0, 100.0),
            PointerState::at(300.0, 300.0),
            PointerState::new(),
        ] {
            field.particles = vec![still(100.0, 100.0)];
            field.step(&pointer);
            assert_eq!(field.particles[0].vx, 0.0, "pointer {pointer:?}");
            assert_eq!(field.particles[0].vy, 0.0, "pointer {pointer:?}");
        }
    }

    #[test]
    fn links_only_close_pairs() {
        let mut field = field(6);
        field.regenerate(400, 400);
        field.particles = vec![still(0.0, 0.0), still(60.0, 80.0), still(300.0, 300.0)];

        let mut surface = RecordingSurface::new(400, 400);
        field.paint(&mut surface);

        assert_eq!(surface.commands()[0], DrawCommand::Clear);
        assert_eq!(surface.line_count(), 0, "distance 100 is not linked");
        assert_eq!(surface.circle_count(), 3);

        field.particles[1] = still(30.0, 40.0);
        field.paint(&mut surface);
        assert_eq!(surface.line_count(), 1);

        match &surface.commands()[1] {
            DrawCommand::Line { color, width, .. } => {
                assert!((color.a - 0.05).abs() < 1e-6);
                assert_eq!(*width, 1.0);
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn same_seed_same_field() {
        let mut a = field(42);
        let mut b = field(42);
        a.regenerate(1500, 900);
        b.regenerate(1500, 900);
        assert_eq!(a.particles, b.particles);
    }
}
