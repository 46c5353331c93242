use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_HORIZONTAL_SPACING: u32 = 80;
pub const DEFAULT_VERTICAL_SPACING: u32 = 40;

/// Disconnected subgraphs are separated by this many vertical spacings
pub const SUBGRAPH_GAP_MULTIPLIER: i32 = 3;

/// Every output coordinate is a multiple of this
pub const GRID_SNAP_SIZE: i32 = 16;

/// Number of alternating barycenter sweeps
pub const BARYCENTER_PASSES: usize = 4;

pub const INNER_GROUP_HORIZONTAL_SPACING_RATIO: f32 = 0.3;
pub const INNER_GROUP_VERTICAL_SPACING_RATIO: f32 = 0.5;

/// Flow direction of the layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Entry points on the left, execution flows right (blueprint style)
    #[default]
    LeftToRight,
    /// Execution entry points end up on the right (material style)
    RightToLeft,
}

/// Which nodes receive a position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Reposition every node
    #[default]
    Full,
    /// Only position nodes that were never placed, i.e. sitting at (0, 0)
    Incremental,
}

/// Errors when parsing configuration values from text
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseConfigError {
    #[error("unknown layout direction {0:?}, expected \"left-to-right\" or \"right-to-left\"")]
    Direction(String),

    #[error("unknown layout mode {0:?}, expected \"full\" or \"incremental\"")]
    Mode(String),
}

impl FromStr for Direction {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "left-to-right" | "lefttoright" | "ltr" => Ok(Direction::LeftToRight),
            "right-to-left" | "righttoleft" | "rtl" => Ok(Direction::RightToLeft),
            _ => Err(ParseConfigError::Direction(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::LeftToRight => f.write_str("left-to-right"),
            Direction::RightToLeft => f.write_str("right-to-left"),
        }
    }
}

impl FromStr for Mode {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Mode::Full),
            "incremental" => Ok(Mode::Incremental),
            _ => Err(ParseConfigError::Mode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Full => f.write_str("full"),
            Mode::Incremental => f.write_str("incremental"),
        }
    }
}

/// Per-invocation layout settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between two columns
    pub horizontal_spacing: u32,

    /// Gap between two nodes of the same column
    pub vertical_spacing: u32,

    pub direction: Direction,

    pub mode: Mode,

    /// Collapse pure-data inputs of execution nodes into compact groups
    pub group_data_inputs: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: DEFAULT_HORIZONTAL_SPACING,
            vertical_spacing: DEFAULT_VERTICAL_SPACING,
            direction: Direction::default(),
            mode: Mode::default(),
            group_data_inputs: false,
        }
    }
}

impl LayoutConfig {
    /// Create a full layout configuration flowing in the given direction
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }

    pub fn with_spacing(mut self, horizontal: u32, vertical: u32) -> Self {
        self.horizontal_spacing = horizontal;
        self.vertical_spacing = vertical;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_grouping(mut self, group_data_inputs: bool) -> Self {
        self.group_data_inputs = group_data_inputs;
        self
    }

    pub(crate) fn h_spacing(&self) -> i32 {
        clamp_to_i32(self.horizontal_spacing)
    }

    pub(crate) fn v_spacing(&self) -> i32 {
        clamp_to_i32(self.vertical_spacing)
    }

    /// Vertical gap left between two stacked subgraphs
    pub(crate) fn subgraph_gap(&self) -> i32 {
        self.v_spacing().saturating_mul(SUBGRAPH_GAP_MULTIPLIER)
    }
}

pub(crate) fn clamp_to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
