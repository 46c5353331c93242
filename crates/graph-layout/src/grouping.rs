//! Data-input grouping
//!
//! Pure data nodes (getters, math, literals) that only exist to feed an
//! execution node tend to be scattered over many columns by the layered
//! layout. Grouping claims those inputs for the execution node they feed,
//! lays the graph out with one proxy node per group, then unfolds every
//! proxy into a compact block: data inputs in lanes under the left part of
//! the proxy, the execution node on its top right corner.

use crate::config::{INNER_GROUP_HORIZONTAL_SPACING_RATIO, INNER_GROUP_VERTICAL_SPACING_RATIO};
use crate::graph::{EdgeKind, LayoutGraph};
use crate::{LayoutConfig, LayoutNode, Point, Positions, Size};
use petgraph::graph::NodeIndex;
use petgraph::visit::{VisitMap, Visitable};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, trace};

/// An execution node and the pure data nodes it claimed
#[derive(Debug, Clone)]
struct NodeGroup {
    exec: NodeIndex,
    data: Vec<NodeIndex>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Grouping {
    groups: Vec<NodeGroup>,
    group_of: HashMap<NodeIndex, usize>,
}

impl Grouping {
    /// Let every execution node claim the pure data nodes feeding it
    ///
    /// Execution nodes claim in input order, walking data edges backwards
    /// breadth first. A data node feeding several execution nodes belongs to
    /// the first one reaching it.
    pub fn discover(graph: &LayoutGraph) -> Self {
        let mut grouping = Self::default();

        let is_exec = |index: NodeIndex| graph.node(index).is_exec_node;
        if !graph.node_indices().any(is_exec) {
            return grouping;
        }

        let mut claimed = graph.graph.visit_map();

        for exec in graph.node_indices().filter(|&index| is_exec(index)) {
            let mut data = Vec::new();
            let mut queue = VecDeque::from([exec]);

            while let Some(current) = queue.pop_front() {
                for producer in graph.predecessors(current, EdgeKind::Data) {
                    if !is_exec(producer) && claimed.visit(producer) {
                        data.push(producer);
                        queue.push_back(producer);
                    }
                }
            }

            if data.is_empty() {
                continue;
            }

            trace!("{:?} claims {} data node(s)", graph.id(exec), data.len());
            let group_index = grouping.groups.len();
            grouping.group_of.insert(exec, group_index);
            for &member in &data {
                grouping.group_of.insert(member, group_index);
            }
            grouping.groups.push(NodeGroup { exec, data });
        }

        debug!("Discovered {} data input group(s)", grouping.groups.len());
        grouping
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Build the reduced node list: one proxy per group, then ungrouped nodes
    ///
    /// A proxy carries its execution node's id and is sized to fit the whole
    /// group. Edges pointing into a group are redirected to its proxy.
    pub fn proxy_nodes(&self, graph: &LayoutGraph, config: &LayoutConfig) -> Vec<LayoutNode> {
        let inner = InnerSpacing::new(config);
        let mut nodes = Vec::with_capacity(graph.node_count());

        for (group_index, group) in self.groups.iter().enumerate() {
            let exec = graph.node(group.exec);
            let exec_size = exec.size();
            let data_size = self.max_data_size(graph, group);
            let region_width = inner.region_width(group, data_size);

            let data_targets = std::iter::once(group.exec)
                .chain(group.data.iter().copied())
                .flat_map(|member| graph.successors(member, EdgeKind::Data));

            nodes.push(LayoutNode {
                width: to_dimension(region_width.saturating_add(exec_size.width)),
                height: to_dimension(
                    data_size
                        .height
                        .saturating_add(inner.vertical)
                        .saturating_add(exec_size.height),
                ),
                exec_outputs: self.rewrite_targets(
                    graph,
                    Some(group_index),
                    graph.successors(group.exec, EdgeKind::Exec),
                ),
                data_outputs: self.rewrite_targets(graph, Some(group_index), data_targets),
                ..exec.clone()
            });
        }

        for index in graph.node_indices() {
            if self.group_of.contains_key(&index) {
                continue;
            }
            let node = graph.node(index);
            nodes.push(LayoutNode {
                exec_outputs: self.rewrite_targets(
                    graph,
                    None,
                    graph.successors(index, EdgeKind::Exec),
                ),
                data_outputs: self.rewrite_targets(
                    graph,
                    None,
                    graph.successors(index, EdgeKind::Data),
                ),
                ..node.clone()
            });
        }

        nodes
    }

    /// Replace each proxy position by the positions of its group members
    pub fn expand(&self, graph: &LayoutGraph, config: &LayoutConfig, positions: &mut Positions) {
        let inner = InnerSpacing::new(config);

        for (group_index, group) in self.groups.iter().enumerate() {
            let exec_id = graph.id(group.exec);
            let Some(&origin) = positions.get(exec_id) else {
                continue;
            };

            let data_size = self.max_data_size(graph, group);
            let region_width = inner.region_width(group, data_size);
            positions.insert(exec_id.to_string(), origin.translate(region_width, 0));

            let (order, lanes) = self.inner_order(graph, group_index);
            let lane_height = data_size.height.saturating_add(inner.vertical).max(1);
            let base_y = origin
                .y
                .saturating_add(graph.size(group.exec).height)
                .saturating_add(inner.vertical);

            let mut x = origin.x;
            for member in order {
                let lane = lanes.get(&member).copied().unwrap_or(0);
                positions.insert(
                    graph.id(member).to_string(),
                    Point::new(x, base_y.saturating_add(lane.saturating_mul(lane_height))),
                );
                x = x
                    .saturating_add(graph.size(member).width)
                    .saturating_add(inner.horizontal);
            }
        }
    }

    /// Topological order of the group's data nodes and the lane of each one
    ///
    /// Every root (no producer inside the group) opens a new lane, nodes
    /// downstream of a root share its lane. Members on a cycle are appended in
    /// discovery order.
    fn inner_order(
        &self,
        graph: &LayoutGraph,
        group_index: usize,
    ) -> (Vec<NodeIndex>, HashMap<NodeIndex, i32>) {
        let group = &self.groups[group_index];
        let in_group = |index: &NodeIndex| {
            *index != group.exec && self.group_of.get(index) == Some(&group_index)
        };

        let forward: HashMap<NodeIndex, Vec<NodeIndex>> = group
            .data
            .iter()
            .map(|&member| {
                let targets = graph
                    .successors(member, EdgeKind::Data)
                    .into_iter()
                    .filter(in_group)
                    .collect();
                (member, targets)
            })
            .collect();

        let mut in_degree: HashMap<NodeIndex, usize> =
            group.data.iter().map(|&member| (member, 0)).collect();
        for target in forward.values().flatten() {
            *in_degree.entry(*target).or_default() += 1;
        }

        let roots: Vec<NodeIndex> = group
            .data
            .iter()
            .copied()
            .filter(|member| in_degree[member] == 0)
            .collect();

        let mut order = Vec::with_capacity(group.data.len());
        let mut queue: VecDeque<NodeIndex> = roots.iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            order.push(current);
            for target in &forward[&current] {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*target);
                    }
                }
            }
        }
        for &member in &group.data {
            if !order.contains(&member) {
                order.push(member);
            }
        }

        let mut lanes = HashMap::new();
        let mut next_lane = 0;
        for &root in &roots {
            if lanes.contains_key(&root) {
                continue;
            }
            let lane = next_lane;
            next_lane += 1;

            lanes.insert(root, lane);
            let mut queue = VecDeque::from([root]);
            while let Some(current) = queue.pop_front() {
                for &target in &forward[&current] {
                    if !lanes.contains_key(&target) {
                        lanes.insert(target, lane);
                        queue.push_back(target);
                    }
                }
            }
        }

        (order, lanes)
    }

    fn max_data_size(&self, graph: &LayoutGraph, group: &NodeGroup) -> Size {
        group
            .data
            .iter()
            .map(|&member| graph.size(member))
            .fold(Size::default(), Size::max)
    }

    /// Map targets to their group's proxy, dropping the ones in `own_group`
    fn rewrite_targets<I>(
        &self,
        graph: &LayoutGraph,
        own_group: Option<usize>,
        targets: I,
    ) -> Vec<String>
    where
        I: IntoIterator<Item = NodeIndex>,
    {
        let mut rewritten: Vec<String> = Vec::new();
        for target in targets {
            let group = self.group_of.get(&target).copied();
            if group.is_some() && group == own_group {
                continue;
            }
            let representative = group.map_or(target, |group| self.groups[group].exec);
            let id = graph.id(representative);
            if !rewritten.iter().any(|existing| existing == id) {
                rewritten.push(id.to_string());
            }
        }
        rewritten
    }
}

/// Spacing used inside a group, a fraction of the layout spacing
struct InnerSpacing {
    horizontal: i32,
    vertical: i32,
}

impl InnerSpacing {
    fn new(config: &LayoutConfig) -> Self {
        Self {
            horizontal: (config.h_spacing() as f32 * INNER_GROUP_HORIZONTAL_SPACING_RATIO).round()
                as i32,
            vertical: (config.v_spacing() as f32 * INNER_GROUP_VERTICAL_SPACING_RATIO).round()
                as i32,
        }
    }

    /// Width reserved on the left of the execution node for its inputs
    fn region_width(&self, group: &NodeGroup, data_size: Size) -> i32 {
        let members = i32::try_from(group.data.len()).unwrap_or(i32::MAX);
        members.saturating_mul(data_size.width.saturating_add(self.horizontal))
    }
}

fn to_dimension(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}
