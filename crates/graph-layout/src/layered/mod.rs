mod crossings;
mod layers;
mod positions;

use crate::assemble::{retain_unplaced, snap_to_grid, SubgraphStack};
use crate::config::{BARYCENTER_PASSES, GRID_SNAP_SIZE};
use crate::graph::LayoutGraph;
use crate::grouping::Grouping;
use crate::{LayoutConfig, LayoutEngine, LayoutNode, Mode, Point, Positions};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;
use tracing::debug;

use crossings::{count_crossings, order_layers};
use layers::assign_layers;
use positions::assign_coordinates;

/// Layered (Sugiyama-style) layout for execution and data-flow graphs
#[derive(Debug, Clone)]
pub struct LayeredLayout {
    pub config: LayoutConfig,

    /// Number of barycenter sweeps used to reduce crossings
    pub barycenter_passes: usize,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            config: LayoutConfig::default(),
            barycenter_passes: BARYCENTER_PASSES,
        }
    }
}

impl LayeredLayout {
    /// Create a new layered layout with the given settings
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }
}

/// Nodes of one graph organized into ordered layers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layers {
    /// Layers from left to right, each one ordered top to bottom
    pub nodes: Vec<Vec<NodeIndex>>,

    /// Number of edge crossings (quality metric)
    pub crossings: usize,
}

impl LayeredLayout {
    /// Assign layers and order them
    ///
    /// This phase only depends on the graph structure, not on node sizes.
    /// The graph is expected to be a single connected component, other
    /// graphs are laid out as if their components were side by side.
    pub fn compute_layers(&self, graph: &LayoutGraph) -> Layers {
        let layers = assign_layers(graph, self.config.direction);
        let layers = order_layers(graph, layers, self.barycenter_passes);
        let crossings = count_crossings(graph, &layers);

        debug!(
            "Ordered {} nodes in {} layers with {crossings} crossing(s)",
            graph.node_count(),
            layers.len()
        );

        Layers {
            nodes: layers,
            crossings,
        }
    }

    /// Compute local positions from layers, in the graph's own frame
    pub fn compute_positions(&self, graph: &LayoutGraph, layers: &Layers) -> HashMap<NodeIndex, Point> {
        assign_coordinates(
            graph,
            &layers.nodes,
            self.config.h_spacing(),
            self.config.v_spacing(),
        )
    }

    /// Lay out every connected component of the graph and stack them
    ///
    /// Positions are neither filtered nor snapped.
    pub fn layout_graph(&self, graph: &LayoutGraph) -> Positions {
        let mut stack = SubgraphStack::new(self.config.subgraph_gap());
        for subgraph in graph.components() {
            let layers = self.compute_layers(&subgraph);
            let local = self.compute_positions(&subgraph, &layers);
            stack.push(&subgraph, local);
        }
        stack.finish()
    }
}

impl LayoutEngine for LayeredLayout {
    fn layout(&self, nodes: &[LayoutNode], existing: &Positions) -> Positions {
        if nodes.is_empty() {
            return Positions::new();
        }

        let graph = LayoutGraph::new(nodes);

        let grouping = if self.config.group_data_inputs {
            Some(Grouping::discover(&graph)).filter(|grouping| !grouping.is_empty())
        } else {
            None
        };

        let mut positions = match grouping {
            Some(grouping) => {
                let proxies = grouping.proxy_nodes(&graph, &self.config);
                let mut positions = self.layout_graph(&LayoutGraph::new(&proxies));
                grouping.expand(&graph, &self.config, &mut positions);
                positions
            }
            None => self.layout_graph(&graph),
        };

        if self.config.mode == Mode::Incremental {
            retain_unplaced(&mut positions, existing);
        }
        snap_to_grid(&mut positions, GRID_SNAP_SIZE);

        positions
    }
}
