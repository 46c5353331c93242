//! Auto-layout for node graphs
//!
//! This crate arranges the nodes of visual-scripting or shader graphs into
//! readable, non-overlapping columns. Graphs mix two kinds of edges:
//! execution edges (control flow) and data edges (values flowing from a
//! producer to a consumer). They may be disconnected, cyclic or have no
//! control flow at all.
//!
//! Hosts describe their graph as a list of [`LayoutNode`]s and apply the
//! returned positions back to their own nodes. Layout is a pure function of
//! its inputs and never fails.
//!
//! # Layout Engines
//!
//! - [`LayeredLayout`]: Sugiyama-style layered layout
//!
//! # Example
//!
//! ```
//! use nodegraph_layout::{compute_layout, LayoutConfig, LayoutNode, Positions};
//!
//! let nodes = vec![
//!     LayoutNode::new("BeginPlay").entry_point().with_exec_outputs(["Print"]),
//!     LayoutNode::new("Print"),
//!     LayoutNode::new("Message").with_data_outputs(["Print"]),
//! ];
//!
//! let positions = compute_layout(&nodes, &LayoutConfig::default(), &Positions::new());
//! assert!(positions["BeginPlay"].x < positions["Print"].x);
//! ```
//!
//! Each step can also be run on its own:
//!
//! ```
//! use nodegraph_layout::{LayeredLayout, LayoutGraph, LayoutNode};
//!
//! let nodes = vec![LayoutNode::new("A").with_exec_outputs(["B"]), LayoutNode::new("B")];
//! let graph = LayoutGraph::new(&nodes);
//! let engine = LayeredLayout::default();
//!
//! let layers = engine.compute_layers(&graph);
//! let positions = engine.compute_positions(&graph, &layers);
//! assert_eq!(layers.nodes.len(), 2);
//! assert_eq!(positions.len(), 2);
//! ```

mod assemble;
mod config;
mod engine;
mod geometry;
mod graph;
mod grouping;
mod node;

pub mod layered;

pub use config::{
    Direction, LayoutConfig, Mode, ParseConfigError, BARYCENTER_PASSES,
    DEFAULT_HORIZONTAL_SPACING, DEFAULT_VERTICAL_SPACING, GRID_SNAP_SIZE,
    INNER_GROUP_HORIZONTAL_SPACING_RATIO, INNER_GROUP_VERTICAL_SPACING_RATIO,
    SUBGRAPH_GAP_MULTIPLIER,
};
pub use engine::LayoutEngine;
pub use geometry::{Point, Size};
pub use graph::{EdgeKind, LayoutGraph};
pub use layered::{LayeredLayout, Layers};
pub use node::{LayoutNode, Positions, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH};

// Re-export petgraph's index type used by the step-by-step API
pub use petgraph::graph::NodeIndex;

/// Compute positions for a node graph
///
/// In [`Mode::Full`] every node gets a position. In [`Mode::Incremental`]
/// only the nodes missing from `existing`, or recorded at (0, 0), are
/// returned. Every coordinate is a multiple of [`GRID_SNAP_SIZE`].
pub fn compute_layout(nodes: &[LayoutNode], config: &LayoutConfig, existing: &Positions) -> Positions {
    LayeredLayout::new(config.clone()).layout(nodes, existing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn layout(nodes: &[LayoutNode], config: LayoutConfig) -> Positions {
        compute_layout(nodes, &config, &Positions::new())
    }

    fn chain(ids: &[&str]) -> Vec<LayoutNode> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                let node = LayoutNode::new(*id).with_exec_outputs(ids.get(i + 1).copied());
                if i == 0 {
                    node.entry_point()
                } else {
                    node
                }
            })
            .collect()
    }

    /// (top, bottom) of the given nodes
    fn vertical_extent(positions: &Positions, nodes: &[LayoutNode], ids: &[&str]) -> (i32, i32) {
        let mut top = i32::MAX;
        let mut bottom = i32::MIN;
        for id in ids {
            let node = nodes.iter().find(|node| node.id == *id).unwrap();
            top = top.min(positions[*id].y);
            bottom = bottom.max(positions[*id].y + node.height as i32);
        }
        (top, bottom)
    }

    fn assert_on_grid(positions: &Positions) {
        for (id, position) in positions {
            assert_eq!(position.x % GRID_SNAP_SIZE, 0, "{id} x = {}", position.x);
            assert_eq!(position.y % GRID_SNAP_SIZE, 0, "{id} y = {}", position.y);
        }
    }

    #[test]
    fn empty_input() {
        assert!(layout(&[], LayoutConfig::default()).is_empty());
    }

    #[test]
    fn every_node_is_placed() {
        let nodes = vec![
            LayoutNode::new("A").entry_point().with_exec_outputs(["B", "Ghost"]),
            LayoutNode::new("B").with_exec_outputs(["A"]),
            LayoutNode::new("C").with_data_outputs(["B", "D"]),
            LayoutNode::new("D"),
            LayoutNode::new("E").with_data_outputs(["E"]),
        ];
        let positions = layout(&nodes, LayoutConfig::default());
        assert_eq!(positions.len(), nodes.len());
        for node in &nodes {
            assert!(positions.contains_key(&node.id), "{} missing", node.id);
        }
        assert_on_grid(&positions);
    }

    #[test]
    fn linear_chain() {
        let positions = layout(&chain(&["A", "B", "C"]), LayoutConfig::default());
        assert!(positions["A"].x < positions["B"].x);
        assert!(positions["B"].x < positions["C"].x);
    }

    #[test]
    fn linear_chain_right_to_left() {
        let positions = layout(&chain(&["A", "B", "C"]), LayoutConfig::new(Direction::RightToLeft));
        assert!(positions["A"].x > positions["B"].x);
        assert!(positions["B"].x > positions["C"].x);
    }

    #[test]
    fn diamond() {
        let nodes = vec![
            LayoutNode::new("A").with_size(150, 100).entry_point().with_exec_outputs(["B", "C"]),
            LayoutNode::new("B").with_size(150, 100).with_exec_outputs(["D"]),
            LayoutNode::new("C").with_size(150, 100).with_exec_outputs(["D"]),
            LayoutNode::new("D").with_size(150, 100),
        ];
        let positions = layout(&nodes, LayoutConfig::default().with_spacing(80, 40));

        assert_eq!(positions.len(), 4);
        assert_eq!(positions["B"].x, positions["C"].x);
        assert!((positions["B"].y - positions["C"].y).abs() >= 140);
        assert!(positions["D"].x > positions["B"].x);

        let middle = (positions["B"].y + positions["C"].y) / 2;
        assert!((positions["A"].y - middle).abs() <= 50);
    }

    #[test]
    fn pure_data_graph_keeps_sink_on_the_right() {
        let nodes = vec![
            LayoutNode::new("Result").entry_point(),
            LayoutNode::new("Multiply").with_data_outputs(["Result"]),
            LayoutNode::new("TexSample").with_data_outputs(["Multiply"]),
        ];
        let positions = layout(&nodes, LayoutConfig::new(Direction::RightToLeft));

        assert_eq!(positions.len(), 3);
        assert!(positions["Result"].x > positions["Multiply"].x);
        assert!(positions["Multiply"].x > positions["TexSample"].x);
    }

    #[test]
    fn data_input_sits_left_of_consumer() {
        let nodes = vec![
            LayoutNode::new("A").entry_point().with_exec_outputs(["B"]),
            LayoutNode::new("B"),
            LayoutNode::new("D").with_data_outputs(["B"]),
        ];
        let positions = layout(&nodes, LayoutConfig::default());
        assert!(positions["D"].x <= positions["B"].x);
    }

    #[test]
    fn disconnected_subgraphs_are_stacked() {
        let nodes = vec![
            LayoutNode::new("A").entry_point().with_exec_outputs(["B"]),
            LayoutNode::new("B"),
            LayoutNode::new("C").entry_point().with_exec_outputs(["D"]),
            LayoutNode::new("D"),
        ];
        let positions = layout(&nodes, LayoutConfig::default());
        assert_eq!(positions.len(), 4);

        let (_, first_bottom) = vertical_extent(&positions, &nodes, &["A", "B"]);
        let (second_top, _) = vertical_extent(&positions, &nodes, &["C", "D"]);
        assert!(first_bottom < second_top);
    }

    #[test]
    fn taller_subgraph_below_does_not_overlap() {
        let mut nodes = chain(&["A", "B"]);
        nodes.push(LayoutNode::new("Root").entry_point().with_exec_outputs(["X", "Y", "Z"]));
        nodes.extend(["X", "Y", "Z"].map(|id| LayoutNode::new(id)));

        let positions = layout(&nodes, LayoutConfig::default());
        let (_, first_bottom) = vertical_extent(&positions, &nodes, &["A", "B"]);
        let (second_top, _) = vertical_extent(&positions, &nodes, &["Root", "X", "Y", "Z"]);
        assert!(first_bottom < second_top);
    }

    #[test]
    fn incremental_only_returns_new_nodes() {
        let nodes = vec![
            LayoutNode::new("A").entry_point().with_exec_outputs(["B"]),
            LayoutNode::new("B").with_exec_outputs(["C"]),
            LayoutNode::new("C").with_exec_outputs(["D"]),
            LayoutNode::new("D"),
        ];
        let existing = Positions::from([
            ("A".to_string(), Point::new(100, 200)),
            ("B".to_string(), Point::new(400, 200)),
            ("C".to_string(), Point::new(0, 0)),
            ("D".to_string(), Point::new(0, 0)),
        ]);
        let config = LayoutConfig::default().with_mode(Mode::Incremental);

        let positions = compute_layout(&nodes, &config, &existing);

        assert_eq!(positions.len(), 2);
        assert!(positions.contains_key("C"));
        assert!(positions.contains_key("D"));
    }

    #[test]
    fn grid_snap_with_odd_sizes() {
        let nodes = vec![
            LayoutNode::new("A").with_size(173, 61).entry_point().with_exec_outputs(["B", "C"]),
            LayoutNode::new("B").with_size(97, 33),
            LayoutNode::new("C").with_size(211, 129).with_data_outputs(["B"]),
            LayoutNode::new("Alone").with_size(55, 77),
        ];
        let positions = layout(&nodes, LayoutConfig::default().with_spacing(37, 13));
        assert_eq!(positions.len(), 4);
        assert_on_grid(&positions);
    }

    #[test]
    fn layout_is_deterministic() {
        let nodes = vec![
            LayoutNode::new("Event").entry_point().with_exec_outputs(["Branch"]),
            LayoutNode::new("Branch").with_exec_outputs(["Left", "Right"]),
            LayoutNode::new("Left").with_exec_outputs(["Join"]),
            LayoutNode::new("Right").with_exec_outputs(["Join"]),
            LayoutNode::new("Join"),
            LayoutNode::new("Value").with_data_outputs(["Left", "Right"]),
            LayoutNode::new("Tex").with_data_outputs(["Mul"]),
            LayoutNode::new("Mul").with_data_outputs(["Out"]),
            LayoutNode::new("Out").entry_point(),
        ];
        for config in [
            LayoutConfig::default(),
            LayoutConfig::new(Direction::RightToLeft).with_grouping(true),
        ] {
            let first = layout(&nodes, config.clone());
            let second = layout(&nodes, config);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn grouped_inputs_stay_with_their_node() {
        let nodes = vec![
            LayoutNode::new("ExecA").exec_node().entry_point().with_exec_outputs(["ExecB"]),
            LayoutNode::new("ExecB").exec_node(),
            LayoutNode::new("D1").with_data_outputs(["D2"]),
            LayoutNode::new("D2").with_data_outputs(["D3"]),
            LayoutNode::new("D3").with_data_outputs(["ExecB"]),
        ];
        let positions = layout(&nodes, LayoutConfig::default().with_grouping(true));

        assert_eq!(positions.len(), 5);
        assert!(positions["D1"].x < positions["D2"].x);
        assert!(positions["D2"].x < positions["D3"].x);
        assert!(positions["D3"].x < positions["ExecB"].x);
        assert!(positions["ExecA"].x < positions["ExecB"].x);
        assert!((positions["D1"].y - positions["ExecB"].y).abs() < 300);
        assert_on_grid(&positions);
    }

    #[test]
    fn grouping_keeps_shared_inputs_apart() {
        let nodes = vec![
            LayoutNode::new("ExecA").exec_node().entry_point().with_exec_outputs(["ExecB"]),
            LayoutNode::new("ExecB").exec_node(),
            LayoutNode::new("Shared").with_data_outputs(["ExecA", "ExecB"]),
            LayoutNode::new("Island"),
        ];
        let positions = layout(&nodes, LayoutConfig::default().with_grouping(true));

        assert_eq!(positions.len(), 4);
        assert!(positions["Shared"].x <= positions["ExecA"].x);
        assert_ne!(positions["Shared"], positions["ExecA"]);
        assert_ne!(positions["Shared"], positions["ExecB"]);
    }

    #[test]
    fn huge_nodes_do_not_overflow() {
        let nodes = vec![
            LayoutNode::new("A")
                .entry_point()
                .exec_node()
                .with_size(2_000_000_000, 100)
                .with_exec_outputs(["B"]),
            LayoutNode::new("B").exec_node().with_size(2_000_000_000, 100),
            LayoutNode::new("Value")
                .with_size(u32::MAX, u32::MAX)
                .with_data_outputs(["B"]),
            LayoutNode::new("Island").with_size(u32::MAX, u32::MAX),
        ];
        for grouping in [false, true] {
            let config = LayoutConfig::default()
                .with_spacing(u32::MAX, u32::MAX)
                .with_grouping(grouping);
            let positions = layout(&nodes, config);
            assert_eq!(positions.len(), nodes.len());
        }

        let positions = layout(&nodes[..2], LayoutConfig::default());
        assert!(positions["A"].x < positions["B"].x);
    }

    #[test]
    fn large_graphs() {
        let isolated: Vec<_> = (0..20_000)
            .map(|i| LayoutNode::new(format!("n{i}")))
            .collect();
        assert_eq!(layout(&isolated, LayoutConfig::default()).len(), 20_000);

        let chain: Vec<_> = (0..20_000)
            .map(|i| LayoutNode::new(format!("n{i}")).with_exec_outputs([format!("n{}", i + 1)]))
            .collect();
        let positions = layout(&chain, LayoutConfig::default());
        assert!(positions["n0"].x < positions["n19999"].x);
    }

    #[test]
    fn grouping_is_skipped_for_data_graphs() {
        let nodes = vec![
            LayoutNode::new("Tex").with_data_outputs(["Mul"]),
            LayoutNode::new("Mul").with_data_outputs(["Result"]),
            LayoutNode::new("Result").entry_point(),
        ];
        let config = LayoutConfig::new(Direction::RightToLeft);
        assert_eq!(
            layout(&nodes, config.clone().with_grouping(true)),
            layout(&nodes, config)
        );
    }
}
