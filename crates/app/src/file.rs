use nodegraph_layout::{LayoutConfig, LayoutNode, Point, Positions};
use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors when reading a graph description
#[derive(Debug, Error)]
pub enum GraphFileError {
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid graph description: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Graph handed over by a host, stored as RON
///
/// Only `nodes` is required. `existing` holds the positions the host already
/// knows, for incremental layouts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphFile {
    pub config: LayoutConfig,
    pub nodes: Vec<LayoutNode>,
    pub existing: Positions,
}

impl GraphFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GraphFileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GraphFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, GraphFileError> {
        Ok(ron::from_str(text)?)
    }
}

/// Positions listed in the order of the graph's nodes
pub struct OrderedPositions<'a>(Vec<(&'a str, Point)>);

impl<'a> OrderedPositions<'a> {
    pub fn new(nodes: &'a [LayoutNode], positions: &Positions) -> Self {
        let mut seen = std::collections::HashSet::new();
        Self(
            nodes
                .iter()
                .filter(|node| seen.insert(node.id.as_str()))
                .filter_map(|node| Some((node.id.as_str(), *positions.get(&node.id)?)))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

impl Serialize for OrderedPositions<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(id, position)| (id, position)))
    }
}
