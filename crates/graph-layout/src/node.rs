use crate::config::clamp_to_i32;
use crate::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_NODE_WIDTH: u32 = 150;
pub const DEFAULT_NODE_HEIGHT: u32 = 100;

/// Node id to position map, used both for existing positions and results
pub type Positions = HashMap<String, Point>;

/// Abstract graph node handed to the layout engine
///
/// Hosts translate their own node objects into this description. Edges are
/// stored on the source node as lists of target ids, split by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutNode {
    pub id: String,

    pub width: u32,

    pub height: u32,

    /// Targets of control-flow connections
    pub exec_outputs: Vec<String>,

    /// Targets of value connections
    pub data_outputs: Vec<String>,

    /// Traversal root for control flow (events), or the final sink of a
    /// data-only graph (material result)
    pub is_entry_point: bool,

    /// Has execution pins; only consulted when grouping data inputs
    pub is_exec_node: bool,
}

impl Default for LayoutNode {
    fn default() -> Self {
        Self {
            id: String::new(),
            width: DEFAULT_NODE_WIDTH,
            height: DEFAULT_NODE_HEIGHT,
            exec_outputs: Vec::new(),
            data_outputs: Vec::new(),
            is_entry_point: false,
            is_exec_node: false,
        }
    }
}

impl LayoutNode {
    /// Create an unconnected node with the default size
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_exec_outputs<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exec_outputs = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_data_outputs<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_outputs = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn entry_point(mut self) -> Self {
        self.is_entry_point = true;
        self
    }

    pub fn exec_node(mut self) -> Self {
        self.is_exec_node = true;
        self
    }

    pub fn size(&self) -> Size {
        Size::new(clamp_to_i32(self.width), clamp_to_i32(self.height))
    }
}
