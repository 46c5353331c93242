use crate::{LayoutNode, Size};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{EdgeRef, VisitMap, Visitable};
use petgraph::Direction::{Incoming, Outgoing};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, trace, warn};

/// Kind of connection between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Control flow, implies sequential ordering
    Exec,
    /// Value flowing from a producer to a consumer
    Data,
}

/// Arena holding the nodes of one layout pass
///
/// Node weights borrow the caller's [`LayoutNode`]s, and every later stage
/// refers to nodes by [`NodeIndex`]. Indices follow input order. Edges whose
/// target id is unknown are dropped while building.
#[derive(Debug, Clone)]
pub struct LayoutGraph<'a> {
    pub(crate) graph: DiGraph<&'a LayoutNode, EdgeKind>,
}

impl<'a> LayoutGraph<'a> {
    /// Build the arena from a node list
    ///
    /// Only the first node carrying a given id is kept.
    pub fn new<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = &'a LayoutNode>,
    {
        let mut graph = DiGraph::new();
        let mut lookup: HashMap<&'a str, NodeIndex> = HashMap::new();

        for node in nodes {
            if lookup.contains_key(node.id.as_str()) {
                warn!("Duplicate node id {:?}, keeping the first occurrence", node.id);
                continue;
            }
            let index = graph.add_node(node);
            lookup.insert(node.id.as_str(), index);
        }

        for source in graph.node_indices().collect::<Vec<_>>() {
            let node = graph[source];
            let targets = node
                .exec_outputs
                .iter()
                .map(|id| (id, EdgeKind::Exec))
                .chain(node.data_outputs.iter().map(|id| (id, EdgeKind::Data)));

            for (target_id, kind) in targets {
                match lookup.get(target_id.as_str()) {
                    Some(&target) => {
                        graph.add_edge(source, target, kind);
                    }
                    None => trace!("Ignoring {kind:?} edge {:?} -> {target_id:?}", node.id),
                }
            }
        }

        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn node(&self, index: NodeIndex) -> &'a LayoutNode {
        self.graph[index]
    }

    pub fn id(&self, index: NodeIndex) -> &'a str {
        self.graph[index].id.as_str()
    }

    pub fn size(&self, index: NodeIndex) -> Size {
        self.graph[index].size()
    }

    /// Number of execution edges between known nodes
    pub fn exec_edge_count(&self) -> usize {
        self.graph
            .edge_references()
            .filter(|edge| *edge.weight() == EdgeKind::Exec)
            .count()
    }

    /// Whether the node has an incoming or outgoing execution edge
    pub fn has_exec_edge(&self, index: NodeIndex) -> bool {
        self.graph
            .edges_directed(index, Outgoing)
            .chain(self.graph.edges_directed(index, Incoming))
            .any(|edge| *edge.weight() == EdgeKind::Exec)
    }

    /// Targets of outgoing edges of the given kind, in declaration order
    pub fn successors(&self, index: NodeIndex, kind: EdgeKind) -> Vec<NodeIndex> {
        // petgraph walks outgoing edges newest first
        let mut targets: Vec<_> = self
            .graph
            .edges_directed(index, Outgoing)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| edge.target())
            .collect();
        targets.reverse();
        targets
    }

    /// Distinct sources of incoming edges of the given kind, in input order
    pub fn predecessors(&self, index: NodeIndex, kind: EdgeKind) -> Vec<NodeIndex> {
        let mut sources: Vec<_> = self
            .graph
            .edges_directed(index, Incoming)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| edge.source())
            .collect();
        sources.sort_unstable();
        sources.dedup();
        sources
    }

    /// Split the graph into weakly connected components
    ///
    /// Components are ordered by their first node in input order, and keep
    /// the input order of their nodes.
    pub fn components(&self) -> Vec<LayoutGraph<'a>> {
        let mut visited = self.graph.visit_map();
        let mut component_of = vec![0; self.graph.node_count()];
        let mut count = 0;

        for start in self.graph.node_indices() {
            if !visited.visit(start) {
                continue;
            }

            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                component_of[current.index()] = count;
                for neighbor in self.graph.neighbors_undirected(current) {
                    if visited.visit(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
            count += 1;
        }

        debug!(
            "Found {count} subgraph(s) in {} nodes",
            self.graph.node_count()
        );

        // Node indices restart at zero in every component, in input order
        let mut graphs = vec![DiGraph::new(); count];
        let mut local = Vec::with_capacity(self.graph.node_count());
        for index in self.graph.node_indices() {
            let graph = &mut graphs[component_of[index.index()]];
            local.push(graph.add_node(self.graph[index]));
        }
        for edge in self.graph.edge_references() {
            let graph = &mut graphs[component_of[edge.source().index()]];
            graph.add_edge(
                local[edge.source().index()],
                local[edge.target().index()],
                *edge.weight(),
            );
        }

        graphs
            .into_iter()
            .map(|graph| LayoutGraph { graph })
            .collect()
    }
}
