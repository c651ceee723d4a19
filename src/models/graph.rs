use serde::{Deserialize, Serialize};

use super::Terminal;

/// A deduplicated vertex handed to the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub tag: String,
}

/// A deduplicated directed edge between two [`GraphNode`]s.
///
/// `source` and `target` are indices into the node sequence of the same
/// [`Graph`], never neuron ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: usize,
    pub target: usize,
    #[serde(rename = "type")]
    pub category: LinkCategory,
}

/// Strength/polarity category of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkCategory {
    FullExcite,
    FullInhibit,
    PartialExcite,
    PartialInhibit,
}

impl LinkCategory {
    /// Derive the category from a terminal's wire fields: `strength == "1"`
    /// means full (else partial), `effect == "-1"` means inhibitory (else
    /// excitatory).
    pub fn from_terminal(terminal: &Terminal) -> Self {
        match (terminal.strength == "1", terminal.effect == "-1") {
            (true, true) => Self::FullInhibit,
            (true, false) => Self::FullExcite,
            (false, true) => Self::PartialInhibit,
            (false, false) => Self::PartialExcite,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullExcite => "full-excite",
            Self::FullInhibit => "full-inhibit",
            Self::PartialExcite => "partial-excite",
            Self::PartialInhibit => "partial-inhibit",
        }
    }
}

/// The node/link collections displayed by the rendering surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}
