use serde::{Deserialize, Serialize};

/// A graph vertex fetched from the remote avatar.
///
/// A neuron with [`RelativeType::NotSet`] is a standalone entity (a root in the
/// rendered tree). Any other relative type marks the record as a directed
/// relation reached from its parent, in which case `terminal` carries the edge
/// payload.
///
/// `id` is an opaque stable identifier and `version` is the optimistic
/// concurrency token expected by the command surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Neuron {
    pub id: String,
    pub tag: String,
    pub version: String,
    #[serde(rename = "type")]
    pub relative_type: RelativeType,
    #[serde(default)]
    pub terminal: Option<Terminal>,
}

impl Neuron {
    /// Whether this record represents a relation rather than a standalone entity.
    pub fn is_relative(&self) -> bool {
        self.relative_type != RelativeType::NotSet
    }
}

/// How a neuron relates to the node it was fetched under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativeType {
    #[default]
    NotSet,
    Presynaptic,
    Postsynaptic,
}

impl RelativeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotSet => "NotSet",
            Self::Presynaptic => "Presynaptic",
            Self::Postsynaptic => "Postsynaptic",
        }
    }
}

/// The directed-edge payload attached to a relation neuron.
///
/// `strength` and `effect` are numeric-as-string on the wire: `"1"` means a
/// full-strength link (anything else is partial), `"-1"` means an inhibitory
/// link (anything else is excitatory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Terminal {
    pub id: String,
    pub version: String,
    pub presynaptic_neuron_id: String,
    pub postsynaptic_neuron_id: String,
    pub strength: String,
    pub effect: String,
}

/// Envelope returned by the avatar query surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub items: Vec<Neuron>,
}

/// Filter input for neuron queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeuronQuery {
    /// Restrict to these neuron ids.
    pub ids: Vec<String>,
    /// Restrict roots to a region neuron.
    pub region_id: Option<String>,
    /// Restrict to relations targeting these postsynaptic neurons.
    pub postsynaptic: Vec<String>,
}

/// Rendering order of the root sequence.
///
/// This is a display-only transform: `BottomToTop` is the element-wise reverse
/// of the fetched order and never changes which records count as new.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderDirection {
    #[default]
    TopToBottom,
    BottomToTop,
}

impl RenderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopToBottom => "TopToBottom",
            Self::BottomToTop => "BottomToTop",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "TopToBottom" => Some(Self::TopToBottom),
            "BottomToTop" => Some(Self::BottomToTop),
            _ => None,
        }
    }
}
