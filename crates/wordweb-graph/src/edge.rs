//! Edge types for the word graph.
//!
//! Edges are undirected: `source` and `target` only record which side the
//! edge was discovered from.

use serde::{Deserialize, Serialize};

/// The type of relationship between two words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// The provider listed one word as related to the other.
    #[default]
    Related,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Related => "related",
        };
        write!(f, "{}", s)
    }
}

/// An undirected edge between two word ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

impl WordEdge {
    /// Creates a new `related` edge.
    pub fn related(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::Related,
        }
    }

    /// Returns true if the edge touches `id`.
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    /// Returns the endpoint opposite to `id`, if `id` is an endpoint.
    pub fn other(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }

    /// The endpoints as an orientation-independent key.
    pub(crate) fn pair_key(&self) -> (String, String) {
        pair_key(&self.source, &self.target)
    }
}

/// Orders two ids so `{a, b}` and `{b, a}` produce the same key.
pub(crate) fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}
