//! Folding provider payloads into the graph.
//!
//! A merge is idempotent with respect to structure: replaying the same
//! payload adds no nodes and no edges. Degrees are the exception. The
//! center's degree is overwritten with the fan-out of the latest merge,
//! while every neighbour's degree counts how many times it was referenced.

use crate::edge::EdgeKind;
use crate::graph::WordGraph;
use crate::layout::seed_positions;
use crate::node::{Position, WordNode};
use tracing::debug;
use wordweb_core::{normalize_word, WordPayload};

/// What a merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Nodes created, including the center if it was new.
    pub nodes_added: usize,
    /// Edges appended.
    pub edges_added: usize,
    /// Related words accepted after truncation, skipping self-references.
    pub processed: usize,
    /// The merge moved the center flag and re-seeded the layout.
    pub repositioned: bool,
}

/// Merges `payload` into `graph` around `center_id`.
///
/// Only the first `max_related_per_node` related words are considered, in
/// provider order. Related words that normalize to nothing or to the center
/// itself are skipped.
pub fn merge(
    graph: &mut WordGraph,
    payload: &WordPayload,
    center_id: &str,
    max_related_per_node: usize,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    let was_center = graph.get(center_id).map(|n| n.is_center).unwrap_or(false);

    if !graph.contains(center_id) {
        let label = if payload.word.trim().is_empty() {
            center_id
        } else {
            payload.word.as_str()
        };
        graph.insert_node(WordNode::new(center_id, label, Position::ORIGIN));
        outcome.nodes_added += 1;
    }
    graph.set_center(center_id);

    let accepted: Vec<(&str, String)> = payload
        .related
        .iter()
        .take(max_related_per_node)
        .map(|raw| (raw.as_str(), normalize_word(raw)))
        .filter(|(_, id)| !id.is_empty() && id != center_id)
        .collect();

    let related_ids: Vec<String> = accepted.iter().map(|(_, id)| id.clone()).collect();

    // A center that was not flagged before gets a fresh circle around it.
    let force_reposition = !was_center;
    let positions = seed_positions(center_id, &related_ids, graph, force_reposition);
    if force_reposition {
        for (id, position) in &positions {
            graph.set_position(id, *position);
        }
        outcome.repositioned = true;
    }

    for (raw, id) in &accepted {
        match graph.get_mut(id) {
            Some(existing) => existing.degree += 1,
            None => {
                let position = positions.get(id).copied().unwrap_or(Position::ORIGIN);
                graph.insert_node(WordNode::new(id.clone(), *raw, position).with_degree(1));
                outcome.nodes_added += 1;
            }
        }

        if graph.add_edge(center_id, id, EdgeKind::Related) {
            outcome.edges_added += 1;
        }
        outcome.processed += 1;
    }

    if let Some(center) = graph.get_mut(center_id) {
        center.degree = outcome.processed;
    }

    debug!(
        "Merged {:?}: {} related, +{} nodes, +{} edges",
        center_id, outcome.processed, outcome.nodes_added, outcome.edges_added
    );

    outcome
}
