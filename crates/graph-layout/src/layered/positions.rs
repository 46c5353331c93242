use crate::graph::LayoutGraph;
use crate::Point;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// Assign coordinates to nodes based on their layer structure and sizes
///
/// Coordinates are local to the graph: the first column starts at x = 0 and
/// every column is centered vertically around y = 0.
pub(crate) fn assign_coordinates(
    graph: &LayoutGraph,
    layers: &[Vec<NodeIndex>],
    horizontal_spacing: i32,
    vertical_spacing: i32,
) -> HashMap<NodeIndex, Point> {
    let mut positions = HashMap::with_capacity(graph.node_count());

    let mut x = 0;
    for layer in layers.iter().filter(|layer| !layer.is_empty()) {
        assign_column(graph, layer, x, vertical_spacing, &mut positions);

        let layer_width = layer
            .iter()
            .map(|&node| graph.size(node).width)
            .max()
            .unwrap_or(0);
        x = x.saturating_add(layer_width).saturating_add(horizontal_spacing);
    }

    positions
}

/// Stack the nodes of one layer top to bottom, centered on y = 0
fn assign_column(
    graph: &LayoutGraph,
    layer: &[NodeIndex],
    x: i32,
    vertical_spacing: i32,
    positions: &mut HashMap<NodeIndex, Point>,
) {
    let heights = layer
        .iter()
        .map(|&node| graph.size(node).height)
        .fold(0, i32::saturating_add);
    let gap_count = i32::try_from(layer.len().saturating_sub(1)).unwrap_or(i32::MAX);
    let total_height = heights.saturating_add(vertical_spacing.saturating_mul(gap_count));

    let mut y = -total_height / 2;
    for &node in layer {
        positions.insert(node, Point::new(x, y));
        y = y
            .saturating_add(graph.size(node).height)
            .saturating_add(vertical_spacing);
    }
}
