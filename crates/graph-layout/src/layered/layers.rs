use crate::graph::{EdgeKind, LayoutGraph};
use crate::Direction;
use petgraph::graph::NodeIndex;
use petgraph::visit::{EdgeFiltered, EdgeRef, IntoNeighborsDirected, IntoNodeIdentifiers};
use petgraph::Direction::{Incoming, Outgoing};
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use tracing::{debug, trace};

/// Assign every node of the graph to a layer (column)
///
/// Layering follows execution edges first, using longest paths so that a node
/// reachable through paths of different lengths sits after the longest one.
/// Graphs without control flow are layered over their data edges instead.
/// Nodes left over (cycles, data producers hanging off the execution flow)
/// get a fallback column, so every node ends up in exactly one layer.
pub(crate) fn assign_layers(graph: &LayoutGraph, direction: Direction) -> Vec<Vec<NodeIndex>> {
    let exec_edges = graph.exec_edge_count();
    let mut layer_map: HashMap<NodeIndex, usize> = HashMap::new();

    // Execution flow, seeded from entry points and exec roots
    let exec = EdgeFiltered::from_fn(&graph.graph, |edge| *edge.weight() == EdgeKind::Exec);
    let mut seeds: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|&index| {
            graph.node(index).is_entry_point
                || (graph.has_exec_edge(index)
                    && exec.neighbors_directed(index, Incoming).next().is_none())
        })
        .collect();

    // Everything is on an execution cycle, start anywhere on it
    if seeds.is_empty() {
        seeds.extend(
            graph
                .node_indices()
                .find(|&index| graph.has_exec_edge(index)),
        );
    }
    longest_path(&exec, &seeds, &mut layer_map);

    let data_fallback = exec_edges == 0 || layer_map.len() < 2;
    if data_fallback {
        let data = EdgeFiltered::from_fn(&graph.graph, |edge| *edge.weight() == EdgeKind::Data);
        let sources: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&index| data.neighbors_directed(index, Incoming).next().is_none())
            .collect();
        longest_path(&data, &sources, &mut layer_map);
    }

    // Execution nodes never reached are stuck on a cycle
    for index in graph.node_indices() {
        if !layer_map.contains_key(&index) && graph.has_exec_edge(index) {
            trace!("Breaking cycle at {:?}", graph.id(index));
            layer_map.insert(index, 0);
        }
    }

    // Data producers go one column before their rightmost consumer
    for index in graph.node_indices() {
        if layer_map.contains_key(&index) {
            continue;
        }
        let layer = graph
            .successors(index, EdgeKind::Data)
            .into_iter()
            .filter_map(|consumer| layer_map.get(&consumer).copied())
            .max()
            .map_or(0, |consumer_layer| consumer_layer.saturating_sub(1));
        layer_map.insert(index, layer);
    }

    let max_layer = layer_map.values().copied().max().unwrap_or(0);

    // Only control flow is flipped, data-only graphs already end in their sinks
    let invert = direction == Direction::RightToLeft && exec_edges > 0;
    if invert {
        for layer in layer_map.values_mut() {
            *layer = max_layer - *layer;
        }
    }

    debug!(
        "Assigned {} nodes to {} layers ({exec_edges} exec edges, data fallback = {data_fallback}, inverted = {invert})",
        layer_map.len(),
        max_layer + 1,
    );

    // Group nodes by layer, keeping input order inside each layer
    let mut layers = vec![Vec::new(); max_layer + 1];
    for index in graph.node_indices() {
        layers[layer_map[&index]].push(index);
    }
    layers
}

/// Longest-path layering in topological (Kahn) order
///
/// Seeds start at layer 0 unless they already have one. Each edge pushes its
/// target at least one layer past its source, self loops are ignored. Nodes
/// only reachable through a cycle are never dequeued and stay unassigned.
fn longest_path<G>(graph: G, seeds: &[G::NodeId], layer_map: &mut HashMap<G::NodeId, usize>)
where
    G: IntoNodeIdentifiers + IntoNeighborsDirected,
    G::NodeId: Copy + Eq + Hash,
{
    let mut in_degree: HashMap<G::NodeId, usize> = graph
        .node_identifiers()
        .map(|node| {
            let degree = graph
                .neighbors_directed(node, Incoming)
                .filter(|&source| source != node)
                .count();
            (node, degree)
        })
        .collect();

    let mut queue = VecDeque::with_capacity(seeds.len());
    for &seed in seeds {
        layer_map.entry(seed).or_insert(0);
        queue.push_back(seed);
    }

    while let Some(current) = queue.pop_front() {
        let next_layer = layer_map.get(&current).copied().unwrap_or(0) + 1;

        for target in graph.neighbors_directed(current, Outgoing) {
            if target == current {
                continue;
            }
            let target_layer = layer_map.entry(target).or_insert(0);
            *target_layer = (*target_layer).max(next_layer);

            // Enqueue once all predecessors have been processed
            if let Some(degree) = in_degree.get_mut(&target) {
                if *degree > 0 {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(target);
                    }
                }
            }
        }
    }
}
