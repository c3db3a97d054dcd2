//! Profile documents as emitted by the profiler's post-processing step.
//!
//! A document is a JSON object holding an optional `first_time` baseline and
//! one array of tree roots per counter (e.g. `walltime`). Index 0 of each
//! array is the traversal-order tree; index 1 is the time-ordered tree whose
//! leaves may carry samples.

use std::collections::BTreeMap;
use std::io::Read;

use serde_json::Value;
use thiserror::Error;

use crate::tree::TreeNode;

/// Errors raised while reading a profile document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to parse profile document")]
    Json(#[from] serde_json::Error),

    #[error("profile document must be a JSON object")]
    NotAnObject,

    #[error("counter not found: {counter}")]
    MissingCounter { counter: String },

    /// Fatal: the data is insufficient, retrying cannot help.
    #[error("counter {counter} has {found} tree root(s), at least 2 are required")]
    TooFewRoots { counter: String, found: usize },

    #[error("invalid tree {index} for counter {counter}")]
    InvalidTree {
        counter: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// The two roots stored for one counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterTrees {
    /// Root 0: siblings ordered by traversal, not by time.
    pub traversal_order: TreeNode,
    /// Root 1: the tree sliced by default.
    pub time_ordered: TreeNode,
}

/// A parsed profile document.
///
/// Trees are kept as raw JSON until requested, so only the counter being
/// sliced is materialized.
#[derive(Debug, Clone, Default)]
pub struct ProfileDocument {
    first_time: u64,
    counters: BTreeMap<String, Vec<Value>>,
}

impl ProfileDocument {
    pub fn from_json_str(s: &str) -> Result<Self, DocumentError> {
        Self::from_value(serde_json::from_str(s)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DocumentError> {
        Self::from_value(serde_json::from_reader(reader)?)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Object(map) = value else {
            return Err(DocumentError::NotAnObject);
        };

        let mut document = Self::default();
        for (key, value) in map {
            if key == "first_time" {
                document.first_time = value
                    .as_u64()
                    .or_else(|| value.as_i64().map(|v| u64::try_from(v).unwrap_or(0)))
                    .unwrap_or(0);
                continue;
            }

            match value {
                Value::Array(roots) => {
                    document.counters.insert(key, roots);
                }
                _ => tracing::debug!(key = %key, "ignoring non-counter field"),
            }
        }

        Ok(document)
    }

    /// Baseline offset of the profile's timestamps. Defaults to 0.
    pub const fn first_time(&self) -> u64 {
        self.first_time
    }

    /// Counter names in sorted order.
    pub fn counter_names(&self) -> impl Iterator<Item = &str> {
        self.counters.keys().map(String::as_str)
    }

    /// Number of roots stored for `counter`, if present.
    pub fn root_count(&self, counter: &str) -> Option<usize> {
        self.counters.get(counter).map(Vec::len)
    }

    /// Materializes both trees of `counter`.
    pub fn counter_trees(&self, counter: &str) -> Result<CounterTrees, DocumentError> {
        let roots = self
            .counters
            .get(counter)
            .ok_or_else(|| DocumentError::MissingCounter {
                counter: counter.to_string(),
            })?;

        if roots.len() < 2 {
            return Err(DocumentError::TooFewRoots {
                counter: counter.to_string(),
                found: roots.len(),
            });
        }

        let parse = |index: usize| {
            serde_json::from_value::<TreeNode>(roots[index].clone()).map_err(|source| {
                DocumentError::InvalidTree {
                    counter: counter.to_string(),
                    index,
                    source,
                }
            })
        };

        Ok(CounterTrees {
            traversal_order: parse(0)?,
            time_ordered: parse(1)?,
        })
    }
}
