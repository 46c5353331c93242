use crate::{LayoutNode, Positions};

/// A layout engine that can compute positions for graph nodes
///
/// Engines take the abstract node list produced by a host and return the
/// position of every node they decided to place. Positions already known to
/// the host are passed along so incremental engines can leave them alone.
pub trait LayoutEngine {
    /// Compute node positions for the given nodes
    ///
    /// Layouts never fail: unknown edge targets are skipped and an empty node
    /// list yields an empty result.
    fn layout(&self, nodes: &[LayoutNode], existing: &Positions) -> Positions;
}
