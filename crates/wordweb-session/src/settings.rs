//! User-adjustable limits.
//!
//! Out-of-range values are never an error: every setter clamps into the
//! supported range and carries on.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::debug;

pub const MAX_NODES_RANGE: RangeInclusive<usize> = 50..=500;
pub const DEFAULT_MAX_NODES: usize = 250;

pub const MAX_RELATED_RANGE: RangeInclusive<usize> = 5..=50;
pub const DEFAULT_MAX_RELATED: usize = 20;

/// The settings that persist across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Node ceiling enforced by pruning.
    pub max_nodes: usize,
    /// Related words accepted per merge.
    pub max_related_per_node: usize,
    /// Whether the renderer runs its force simulation. Not used by the graph engine.
    pub physics_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            max_related_per_node: DEFAULT_MAX_RELATED,
            physics_enabled: true,
        }
    }
}

impl Settings {
    pub fn clamp_max_nodes(n: usize) -> usize {
        clamp_logged("max_nodes", n, &MAX_NODES_RANGE)
    }

    pub fn clamp_max_related(n: usize) -> usize {
        clamp_logged("max_related_per_node", n, &MAX_RELATED_RANGE)
    }

    /// Returns a copy with every field pulled into range.
    pub fn sanitized(self) -> Self {
        Self {
            max_nodes: Self::clamp_max_nodes(self.max_nodes),
            max_related_per_node: Self::clamp_max_related(self.max_related_per_node),
            physics_enabled: self.physics_enabled,
        }
    }
}

fn clamp_logged(name: &str, n: usize, range: &RangeInclusive<usize>) -> usize {
    let clamped = n.clamp(*range.start(), *range.end());
    if clamped != n {
        debug!("{} = {} out of range, clamped to {}", name, n, clamped);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_in_range() {
        let settings = Settings::default();
        assert!(MAX_NODES_RANGE.contains(&settings.max_nodes));
        assert!(MAX_RELATED_RANGE.contains(&settings.max_related_per_node));
        assert_eq!(settings.sanitized(), settings);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(Settings::clamp_max_nodes(0), 50);
        assert_eq!(Settings::clamp_max_nodes(100), 100);
        assert_eq!(Settings::clamp_max_nodes(10_000), 500);
        assert_eq!(Settings::clamp_max_related(1), 5);
        assert_eq!(Settings::clamp_max_related(30), 30);
        assert_eq!(Settings::clamp_max_related(99), 50);
    }

    #[test]
    fn test_sanitized() {
        let wild = Settings {
            max_nodes: 3,
            max_related_per_node: 400,
            physics_enabled: false,
        };
        let fixed = wild.sanitized();
        assert_eq!(fixed.max_nodes, 50);
        assert_eq!(fixed.max_related_per_node, 50);
        assert!(!fixed.physics_enabled);
    }
}
