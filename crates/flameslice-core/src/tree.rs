//! Call tree model shared by every slicing stage.
//!
//! A [`TreeNode`] carries either explicit timestamped [`Sample`]s on its
//! leaves or a synthetic `start_offset` (the "left sum") assigned from
//! traversal order. Both are optional so one node type serves both shapes.

use serde::{Deserialize, Deserializer, Serialize};

/// One occurrence of a leaf call.
///
/// The call ended at `timestamp` and lasted `duration`, so it started at
/// `timestamp - duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sample {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub timestamp: u64,

    /// Serialized as `period`, the name profilers use for a sample's weight.
    #[serde(rename = "period", default, deserialize_with = "lenient_u64")]
    pub duration: u64,
}

impl Sample {
    pub const fn new(timestamp: u64, duration: u64) -> Self {
        Self {
            timestamp,
            duration,
        }
    }

    /// When the call started. Saturates at 0 for malformed samples.
    pub const fn start(&self) -> u64 {
        self.timestamp.saturating_sub(self.duration)
    }
}

/// A node of a flame graph call tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Function or frame name. Not unique among siblings until merged.
    #[serde(default)]
    pub name: String,

    /// Accumulated weight. For interior nodes, the sum of the children.
    #[serde(rename = "value", default, deserialize_with = "lenient_u64")]
    pub weight: u64,

    /// Opaque classification flag carried through every transformation.
    #[serde(default)]
    pub cold: bool,

    /// Synthetic traversal-order position, see [`crate::assign_left_sums`].
    #[serde(
        rename = "left_sum",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_offset: Option<u64>,

    /// Timestamped samples. Only leaves carry them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<Sample>,

    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Creates a leaf whose weight is the sum of its sample durations.
    pub fn leaf(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        let weight = samples.iter().map(|s| s.duration).sum();
        Self {
            name: name.into(),
            weight,
            samples,
            ..Self::default()
        }
    }

    /// Creates an interior node whose weight is the sum of its children.
    pub fn with_children(name: impl Into<String>, children: Vec<Self>) -> Self {
        let mut node = Self {
            name: name.into(),
            children,
            ..Self::default()
        };
        node.weight = node.children_weight();
        node
    }

    /// Builder-style setter for the `cold` flag.
    #[must_use]
    pub fn cold(mut self, cold: bool) -> Self {
        self.cold = cold;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns true if any node in this subtree carries samples.
    pub fn has_samples(&self) -> bool {
        !self.samples.is_empty() || self.children.iter().any(Self::has_samples)
    }

    pub fn children_weight(&self) -> u64 {
        self.children.iter().map(|c| c.weight).sum()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// A childless, zero-weight copy of this node.
    ///
    /// Used to report a slice that pruned everything away while still
    /// producing a well-formed root.
    #[must_use]
    pub fn emptied(&self) -> Self {
        Self {
            name: self.name.clone(),
            cold: self.cold,
            start_offset: self.start_offset,
            ..Self::default()
        }
    }
}

/// Integers that may arrive signed from the producer.
#[derive(Deserialize)]
#[serde(untagged)]
enum Integer {
    Unsigned(u64),
    Signed(i64),
}

/// Accepts signed or unsigned integers, coercing negatives to 0.
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Integer::deserialize(deserializer)? {
        Integer::Unsigned(v) => Ok(v),
        Integer::Signed(v) => {
            if v < 0 {
                tracing::warn!(value = v, "negative integer coerced to 0");
            }
            Ok(u64::try_from(v).unwrap_or(0))
        }
    }
}
