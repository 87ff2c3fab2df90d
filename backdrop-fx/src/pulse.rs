//! Layered "neural network" graph with a travelling activation pulse
//!
//! Nodes sit on a jittered grid. Every node links forward to one or two
//! nearby nodes in the next columns, so edges always point to a strictly
//! greater column and the graph is acyclic by construction. A global phase
//! clock, offset per column and per edge, modulates brightness so a wave
//! appears to sweep left to right.

use std::f64::consts::PI;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::PulseConfig;
use crate::pointer::PointerState;
use crate::scheduler::Effect;
use crate::surface::Surface;

/// Phase values this close to 1 count as a completed cycle; absorbs the
/// rounding error of repeated float increments.
const WRAP_EPSILON: f64 = 1e-9;

/// A grid node; `id` is its index in [`PulseGraph::nodes`]
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub col: usize,
    pub row: usize,
}

/// Directed edge between node ids, always toward a greater column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
}

/// Animation clock in `[0, 1)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulsePhase {
    value: f64,
    speed: f64,
}

impl PulsePhase {
    pub fn new(speed: f64) -> Self {
        Self { value: 0.0, speed }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Advance one frame; returns true when the clock wrapped back to 0
    pub fn advance(&mut self) -> bool {
        self.value += self.speed;
        if self.value >= 1.0 - WRAP_EPSILON {
            self.value = 0.0;
            true
        } else {
            false
        }
    }
}

/// Pulse graph effect
pub struct PulseGraph<R> {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    config: PulseConfig,
    phase: PulsePhase,
    cell: (f32, f32),
    rng: R,
}

impl<R: Rng> PulseGraph<R> {
    /// Create an empty graph; the layout appears on the first resize
    pub fn new(config: PulseConfig, rng: R) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            phase: PulsePhase::new(config.pulse_speed),
            config,
            cell: (0.0, 0.0),
            rng,
        }
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    pub fn phase(&self) -> &PulsePhase {
        &self.phase
    }

    /// Grid cell width and height of the current layout
    pub fn cell_size(&self) -> (f32, f32) {
        self.cell
    }

    /// Replace nodes and edges with a fresh layout for the viewport
    pub fn layout(&mut self, width: u32, height: u32) {
        let config = &self.config;
        let padding = config.padding;
        let cell_w = (width as f32 - padding * 2.0) / (config.cols - 1) as f32;
        let cell_h = (height as f32 - padding * 2.0) / (config.rows - 1) as f32;
        let (min_size, max_size) = config.node_size;

        let mut nodes = Vec::with_capacity(config.cols * config.rows);
        for row in 0..config.rows {
            for col in 0..config.cols {
                let jitter_x = (self.rng.random::<f32>() - 0.5) * cell_w * config.jitter;
                let jitter_y = (self.rng.random::<f32>() - 0.5) * cell_h * config.jitter;

                nodes.push(GraphNode {
                    id: nodes.len(),
                    x: padding + col as f32 * cell_w + jitter_x,
                    y: padding + row as f32 * cell_h + jitter_y,
                    size: self.rng.random_range(min_size..max_size),
                    col,
                    row,
                });
            }
        }

        let mut edges = Vec::new();
        for node in &nodes {
            let mut candidates: Vec<usize> = nodes
                .iter()
                .filter(|n| {
                    n.col > node.col
                        && n.col <= node.col + config.max_col_span
                        && n.row.abs_diff(node.row) <= config.max_row_span
                })
                .map(|n| n.id)
                .collect();

            candidates.shuffle(&mut self.rng);
            let wanted = self.rng.random_range(1..=config.max_links);
            let count = candidates.len().min(wanted);

            edges.extend(
                candidates[..count]
                    .iter()
                    .map(|&to| GraphEdge { from: node.id, to }),
            );
        }

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            width,
            height,
            "regenerated pulse graph"
        );

        self.cell = (cell_w, cell_h);
        self.nodes = nodes;
        self.edges = edges;
    }

    /// Glow of edge `index` at the current phase, in `[0, edge_glow]`
    pub fn edge_glow(&self, index: usize) -> f32 {
        let edge = &self.edges[index];
        let from = &self.nodes[edge.from];
        let offset =
            from.col as f64 * self.config.column_offset + index as f64 * self.config.edge_offset;
        pulse_shape(self.phase.value() + offset) * self.config.edge_glow
    }

    /// Activation of a node at the current phase, in `[0, node_glow]`
    pub fn node_activation(&self, node: &GraphNode) -> f32 {
        let offset = node.col as f64 * self.config.column_offset;
        pulse_shape(self.phase.value() + offset) * self.config.node_glow
    }

    /// Paint edges, then nodes on top
    pub fn paint(&self, surface: &mut dyn Surface) {
        surface.clear();

        for (i, edge) in self.edges.iter().enumerate() {
            let from = &self.nodes[edge.from];
            let to = &self.nodes[edge.to];
            let glow = self.edge_glow(i);

            surface.stroke_line(
                (from.x, from.y),
                (to.x, to.y),
                self.config.color.with_alpha(self.config.edge_base_alpha + glow),
                1.0 + glow * 2.0,
            );
        }

        for node in &self.nodes {
            let activation = self.node_activation(node);
            surface.fill_circle(
                (node.x, node.y),
                node.size,
                self.config
                    .color
                    .with_alpha(self.config.node_base_alpha + activation),
            );
        }
    }
}

/// Half-sine bump over one phase period
fn pulse_shape(phase: f64) -> f32 {
    ((phase % 1.0) * PI).sin() as f32
}

impl<R: Rng> Effect for PulseGraph<R> {
    fn name(&self) -> &'static str {
        "pulse"
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.layout(width, height);
    }

    fn update(&mut self, _pointer: &PointerState) {
        self.phase.advance();
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

    fn graph(seed: u64) -> PulseGraph<SmallRng> {
        PulseGraph::new(PulseConfig::default(), SmallRng::seed_from_u64(seed))
    }

    #[test]
    fn always_fifteen_nodes_in_row_major_order() {
        for seed in 0..25 {
            let mut graph = graph(seed);
            graph.layout(800 + seed as u32 * 40, 600 + seed as u32 * 20);

            assert_eq!(graph.nodes.len(), 15);
            for (i, node) in graph.nodes.iter().enumerate() {
                assert_eq!(node.id, i);
                assert_eq!(node.col, i % 5);
                assert_eq!(node.row, i / 5);
                assert!(node.size >= 5.0 && node.size < 11.0);
            }
        }
    }

    #[test]
    fn edges_point_forward_to_nearby_nodes() {
        for seed in 0..50 {
            let mut graph = graph(seed);
            graph.layout(1280, 720);

            for edge in &graph.edges {
                let from = &graph.nodes[edge.from];
                let to = &graph.nodes[edge.to];
                assert!(from.col < to.col, "edge {edge:?} goes backward");
                assert!(to.col <= from.col + 2);
                assert!(from.row.abs_diff(to.row) <= 1);
            }
        }
    }

    #[test]
    fn out_degree_is_one_or_two_when_candidates_exist() {
        for seed in 0..50 {
            let mut graph = graph(seed);
            graph.layout(1280, 720);

            for node in &graph.nodes {
                let out = graph.edges.iter().filter(|e| e.from == node.id).count();
                if node.col == 4 {
                    assert_eq!(out, 0);
                } else {
                    assert!((1..=2).contains(&out), "node {} has {out} edges", node.id);
                }
            }
        }
    }

    #[test]
    fn no_duplicate_edges() {
        let mut graph = graph(11);
        graph.layout(1500, 900);

        let mut seen = std::collections::HashSet::new();
        for edge in &graph.edges {
            assert!(seen.insert((edge.from, edge.to)));
        }
    }

    #[test]
    fn grid_cells_for_reference_viewport() {
        let mut graph = graph(0);
        graph.layout(1500, 900);

        assert_eq!(graph.cell_size(), (345.0, 390.0));
        for node in &graph.nodes {
            let home_x = 60.0 + node.col as f32 * 345.0;
            let home_y = 60.0 + node.row as f32 * 390.0;
            assert!((node.x - home_x).abs() <= 345.0 * 0.2 + 1e-3);
            assert!((node.y - home_y).abs() <= 390.0 * 0.2 + 1e-3);
        }
    }

    #[test]
    fn resize_replaces_layout() {
        let mut graph = graph(5);
        graph.layout(1500, 900);
        let before = graph.nodes.clone();

        graph.layout(600, 400);
        assert_eq!(graph.nodes.len(), 15);
        assert_ne!(graph.nodes, before);
        assert!(graph.nodes.iter().all(|n| n.x < 600.0));
    }

    #[test]
    fn phase_wraps_after_one_period() {
        for speed in [0.25, 0.1, 0.02] {
            let mut phase = PulsePhase::new(speed);
            let frames = (1.0_f64 / speed).round() as usize;

            let wraps = (0..frames).filter(|_| phase.advance()).count();

            assert_eq!(wraps, 1, "speed {speed}");
            assert_eq!(phase.value(), 0.0, "speed {speed}");
        }
    }

    #[test]
    fn default_phase_wraps_once_per_cycle() {
        let mut phase = PulsePhase::new(0.006);
        let frames = (1.0_f64 / 0.006).ceil() as usize;

        let wraps = (0..frames).filter(|_| phase.advance()).count();

        assert_eq!(wraps, 1);
        assert!(phase.value() < 0.006);
    }

    #[test]
    fn phase_stays_in_unit_interval() {
        let mut phase = PulsePhase::new(0.006);
        for _ in 0..1000 {
            phase.advance();
            assert!((0.0..1.0).contains(&phase.value()));
        }
    }

    #[test]
    fn activation_peaks_mid_cycle() {
        let config = PulseConfig {
            pulse_speed: 0.25,
            ..PulseConfig::default()
        };
        let mut graph = PulseGraph::new(config, SmallRng::seed_from_u64(8));
        graph.layout(1500, 900);

        let first = graph.nodes[0].clone();
        assert_eq!(graph.node_activation(&first), 0.0);

        graph.update(&PointerState::new());
        graph.update(&PointerState::new());
        assert!((graph.phase().value() - 0.5).abs() < 1e-12);
        assert!((graph.node_activation(&first) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn paints_every_edge_and_node() {
        let mut graph = graph(21);
        graph.layout(1500, 900);

        let mut surface = RecordingSurface::new(1500, 900);
        graph.paint(&mut surface);

        assert_eq!(surface.commands()[0], DrawCommand::Clear);
        assert_eq!(surface.line_count(), graph.edges.len());
        assert_eq!(surface.circle_count(), 15);

        // First edge starts from node 0 (column 0) at phase 0: no glow
        match &surface.commands()[1] {
            DrawCommand::Line { color, width, .. } => {
                assert!((color.a - 0.08).abs() < 1e-6);
                assert!((width - 1.0).abs() < 1e-6);
            }
            other => panic!("expected line, got {other:?}"),
        }
    }
}
