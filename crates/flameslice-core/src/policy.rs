//! Partial-overlap policies and their per-counter selection.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a sample that only partly overlaps the window contributes weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Keep the part of each sample's span that lies inside the window.
    Proportional,
    /// Keep or drop whole samples based on their end timestamp alone.
    TimestampOnly,
}

impl OverlapPolicy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Proportional => "proportional",
            Self::TimestampOnly => "timestamp-only",
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OverlapPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proportional" => Ok(Self::Proportional),
            "timestamp-only" | "timestamp" => Ok(Self::TimestampOnly),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Error type for unknown policy strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown overlap policy: {0}")]
pub struct UnknownPolicy(String);

/// Maps counter names to the overlap policy used when slicing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTable {
    /// Policy for counters not listed in `counters`.
    #[serde(default = "default_policy")]
    pub default: OverlapPolicy,

    /// Per-counter overrides.
    #[serde(default)]
    pub counters: BTreeMap<String, OverlapPolicy>,
}

const fn default_policy() -> OverlapPolicy {
    OverlapPolicy::TimestampOnly
}

impl Default for PolicyTable {
    /// Wall time is apportioned by overlap; every other counter is binary.
    fn default() -> Self {
        Self {
            default: default_policy(),
            counters: BTreeMap::from([("walltime".to_string(), OverlapPolicy::Proportional)]),
        }
    }
}

impl PolicyTable {
    /// Returns the policy for `counter`, falling back to the table default.
    pub fn for_counter(&self, counter: &str) -> OverlapPolicy {
        self.counters.get(counter).copied().unwrap_or(self.default)
    }
}
