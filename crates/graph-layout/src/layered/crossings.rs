use crate::graph::LayoutGraph;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

/// Order the nodes of each layer to reduce edge crossings
///
/// Layers are first sorted with entry points on top, then by id, which makes
/// the result independent of the input order. Each pass then sweeps over the
/// layers (alternating direction) and sorts every layer by the barycenter of
/// its nodes' neighbors, whatever their kind or direction.
pub(crate) fn order_layers(
    graph: &LayoutGraph,
    mut layers: Vec<Vec<NodeIndex>>,
    passes: usize,
) -> Vec<Vec<NodeIndex>> {
    let mut rank = vec![0.0_f32; graph.node_count()];

    for layer in &mut layers {
        layer.sort_by(|&a, &b| {
            let (a_node, b_node) = (graph.node(a), graph.node(b));
            b_node
                .is_entry_point
                .cmp(&a_node.is_entry_point)
                .then_with(|| a_node.id.cmp(&b_node.id))
        });
        renumber(layer, &mut rank);
    }

    for pass in 0..passes {
        let forward = pass % 2 == 0;
        let sweep: Vec<usize> = if forward {
            (0..layers.len()).collect()
        } else {
            (0..layers.len()).rev().collect()
        };

        for layer_index in sweep {
            let layer = &mut layers[layer_index];

            for &node in layer.iter() {
                if let Some(value) = barycenter(graph, node, &rank) {
                    rank[node.index()] = value;
                }
            }

            // The layer still holds the previous order, ties keep it
            let mut keyed: Vec<(f32, usize, NodeIndex)> = layer
                .iter()
                .enumerate()
                .map(|(previous, &node)| (rank[node.index()], previous, node))
                .collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            *layer = keyed.into_iter().map(|(_, _, node)| node).collect();
            renumber(layer, &mut rank);
        }
    }

    layers
}

/// Mean rank of the distinct nodes connected to `node`, ignoring self loops
///
/// A neighbor linked by several edges, of any kind or direction, counts once.
fn barycenter(graph: &LayoutGraph, node: NodeIndex, rank: &[f32]) -> Option<f32> {
    let mut neighbors: Vec<NodeIndex> = graph
        .graph
        .neighbors_undirected(node)
        .filter(|&neighbor| neighbor != node)
        .collect();
    neighbors.sort_unstable();
    neighbors.dedup();

    let sum: f32 = neighbors.iter().map(|neighbor| rank[neighbor.index()]).sum();
    (!neighbors.is_empty()).then(|| sum / neighbors.len() as f32)
}

fn renumber(layer: &[NodeIndex], rank: &mut [f32]) {
    for (position, node) in layer.iter().enumerate() {
        rank[node.index()] = position as f32;
    }
}

/// Count the edge crossings between each pair of adjacent, non-empty layers
///
/// Edges of both kinds are considered, in either direction. Edges are
/// bucketed per pair of layers in a single pass, then every bucket is counted
/// in `O(k log k)`.
pub(crate) fn count_crossings(graph: &LayoutGraph, layers: &[Vec<NodeIndex>]) -> usize {
    let occupied: Vec<&Vec<NodeIndex>> = layers.iter().filter(|layer| !layer.is_empty()).collect();

    // (occupied layer, rank in layer) of every node
    let mut position = vec![None; graph.node_count()];
    for (slot, layer) in occupied.iter().enumerate() {
        for (rank, node) in layer.iter().enumerate() {
            position[node.index()] = Some((slot, rank));
        }
    }

    // (rank in left layer, rank in right layer) of the edges between slot and slot + 1
    let mut segments = vec![Vec::new(); occupied.len().saturating_sub(1)];
    for edge in graph.graph.edge_references() {
        let (Some(source), Some(target)) =
            (position[edge.source().index()], position[edge.target().index()])
        else {
            continue;
        };
        let (left, right) = if source.0 < target.0 {
            (source, target)
        } else {
            (target, source)
        };
        if right.0 == left.0 + 1 {
            segments[left.0].push((left.1, right.1));
        }
    }

    segments
        .into_iter()
        .map(|mut between| {
            between.sort_unstable();
            inversions(&between)
        })
        .sum()
}

/// Number of pairs whose right ends are strictly out of order
///
/// `segments` must be sorted. Uses a Fenwick tree over the right ranks.
fn inversions(segments: &[(usize, usize)]) -> usize {
    let size = segments.iter().map(|&(_, right)| right + 1).max().unwrap_or(0);
    let mut tree = vec![0_usize; size + 1];
    let mut crossings = 0;

    for (seen, &(_, right)) in segments.iter().enumerate() {
        // Segments already seen whose right end is not below this one
        let mut in_order = 0;
        let mut i = right + 1;
        while i > 0 {
            in_order += tree[i];
            i &= i - 1;
        }
        crossings += seen - in_order;

        let mut i = right + 1;
        while i <= size {
            tree[i] += 1;
            i += i & i.wrapping_neg();
        }
    }

    crossings
}
