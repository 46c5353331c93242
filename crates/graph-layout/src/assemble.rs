use crate::geometry::VerticalSpan;
use crate::graph::LayoutGraph;
use crate::{Point, Positions};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;
use tracing::debug;

/// Collects subgraph layouts, stacking them top to bottom
///
/// The first subgraph keeps its own coordinates. Every following one is
/// moved so that its top sits `gap` below the lowest node placed so far.
#[derive(Debug, Default)]
pub(crate) struct SubgraphStack {
    gap: i32,
    bottom: Option<i32>,
    positions: Positions,
}

impl SubgraphStack {
    pub fn new(gap: i32) -> Self {
        Self {
            gap,
            ..Default::default()
        }
    }

    pub fn push(&mut self, graph: &LayoutGraph, local: HashMap<NodeIndex, Point>) {
        let Some(span) = VerticalSpan::of(
            local
                .iter()
                .map(|(&node, &position)| (position, graph.size(node))),
        ) else {
            return;
        };

        let offset = self
            .bottom
            .map_or(0, |bottom| {
                bottom
                    .saturating_add(self.gap)
                    .saturating_sub(span.top)
            });

        for (node, position) in local {
            self.positions
                .insert(graph.id(node).to_string(), position.translate(0, offset));
        }

        let bottom = span.bottom.saturating_add(offset);
        self.bottom = Some(self.bottom.map_or(bottom, |previous| previous.max(bottom)));
    }

    pub fn finish(self) -> Positions {
        self.positions
    }
}

/// Keep only the nodes that the host never placed
///
/// A node counts as unplaced when it has no known position or sits exactly on
/// the origin.
pub(crate) fn retain_unplaced(positions: &mut Positions, existing: &Positions) {
    let before = positions.len();
    positions.retain(|id, _| existing.get(id).map_or(true, |known| known.is_zero()));
    debug!(
        "Incremental layout keeps {} of {before} node(s)",
        positions.len()
    );
}

/// Round every position to the layout grid
pub(crate) fn snap_to_grid(positions: &mut Positions, grid: i32) {
    for position in positions.values_mut() {
        *position = position.snap(grid);
    }
}
