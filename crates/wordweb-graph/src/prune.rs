//! Size-bounded eviction.
//!
//! When the graph grows past its ceiling we walk outward from the center
//! breadth-first and keep whatever we reach first. Words that have ever been
//! a center are exempt: they survive even if that pushes the graph over the
//! ceiling, so back-navigation always has somewhere to land.

use crate::graph::WordGraph;
use petgraph::graphmap::UnGraphMap;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info};

/// Nodes at this distance from the center are kept but not expanded.
pub const MAX_BFS_DEPTH: usize = 3;

/// What a prune removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    pub nodes_removed: usize,
    pub edges_removed: usize,
}

impl PruneOutcome {
    pub fn is_noop(&self) -> bool {
        self.nodes_removed == 0 && self.edges_removed == 0
    }
}

/// Selects the ids that survive a prune.
///
/// Breadth-first from `center_id`, neighbours in edge discovery order,
/// stopping once `max_nodes` ids are selected. Every id in `history` and
/// the center itself are added afterwards regardless of the cap.
pub fn select_retained(
    graph: &WordGraph,
    center_id: &str,
    history: &[String],
    max_nodes: usize,
) -> HashSet<String> {
    let mut adjacency: UnGraphMap<&str, ()> = UnGraphMap::with_capacity(
        graph.node_count(),
        graph.edge_count(),
    );
    for node in graph.nodes() {
        adjacency.add_node(node.id.as_str());
    }
    for edge in graph.edges() {
        adjacency.add_edge(edge.source.as_str(), edge.target.as_str(), ());
    }

    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut keep: HashSet<String> = HashSet::new();

    queue.push_back((center_id, 0));

    while keep.len() < max_nodes {
        let Some((current, distance)) = queue.pop_front() else {
            break;
        };
        if !visited.insert(current) {
            continue;
        }
        keep.insert(current.to_string());

        if distance < MAX_BFS_DEPTH {
            for neighbor in adjacency.neighbors(current) {
                if !visited.contains(neighbor) {
                    queue.push_back((neighbor, distance + 1));
                }
            }
        }
    }

    for id in history {
        keep.insert(id.clone());
    }
    keep.insert(center_id.to_string());

    keep
}

/// Shrinks `graph` toward `max_nodes`.
///
/// Does nothing when the graph already fits or there is no center to walk
/// from. Edges are dropped whenever either endpoint is dropped.
pub fn prune(
    graph: &mut WordGraph,
    center_id: Option<&str>,
    history: &[String],
    max_nodes: usize,
) -> PruneOutcome {
    if graph.node_count() <= max_nodes {
        return PruneOutcome::default();
    }
    let Some(center_id) = center_id else {
        return PruneOutcome::default();
    };
    if !graph.contains(center_id) {
        debug!("Skipping prune: center {:?} is not in the graph", center_id);
        return PruneOutcome::default();
    }

    let keep = select_retained(graph, center_id, history, max_nodes);
    let (nodes_removed, edges_removed) = graph.retain(&keep);

    info!(
        "Pruned {} nodes and {} edges (cap {}, {} remain)",
        nodes_removed,
        edges_removed,
        max_nodes,
        graph.node_count()
    );

    PruneOutcome {
        nodes_removed,
        edges_removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge;
    use wordweb_core::WordPayload;

    fn payload(word: &str, related: &[String]) -> WordPayload {
        WordPayload::new(word, related.to_vec())
    }

    fn words(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn history(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    /// center -> c1 -> c2 -> ... -> c{len}
    fn chain(len: usize) -> WordGraph {
        let mut graph = WordGraph::new();
        let mut previous = "c0".to_string();
        merge(&mut graph, &payload("c0", &[]), "c0", 50);
        for i in 1..=len {
            let next = format!("c{}", i);
            merge(&mut graph, &payload(&previous, &[next.clone()]), &previous, 50);
            previous = next;
        }
        graph.set_center("c0");
        graph
    }

    #[test]
    fn test_noop_under_cap() {
        let mut graph = WordGraph::new();
        merge(&mut graph, &payload("kitap", &words("w", 10)), "kitap", 50);

        let outcome = prune(&mut graph, Some("kitap"), &history(&["kitap"]), 50);
        assert!(outcome.is_noop());
        assert_eq!(graph.node_count(), 11);
    }

    #[test]
    fn test_noop_without_center() {
        let mut graph = WordGraph::new();
        merge(&mut graph, &payload("kitap", &words("w", 10)), "kitap", 50);

        assert!(prune(&mut graph, None, &[], 5).is_noop());
        assert!(prune(&mut graph, Some("missing"), &[], 5).is_noop());
        assert_eq!(graph.node_count(), 11);
    }

    #[test]
    fn test_respects_cap_and_keeps_earliest_neighbors() {
        let mut graph = WordGraph::new();
        merge(&mut graph, &payload("kitap", &words("w", 20)), "kitap", 50);

        prune(&mut graph, Some("kitap"), &history(&["kitap"]), 6);

        assert_eq!(graph.node_count(), 6);
        for id in ["kitap", "w0", "w1", "w2", "w3", "w4"] {
            assert!(graph.contains(id), "missing {}", id);
        }
        assert_eq!(graph.edge_count(), 5);
    }

    #[test]
    fn test_depth_limit_stops_exploration() {
        let mut graph = chain(6);
        assert_eq!(graph.node_count(), 7);

        prune(&mut graph, Some("c0"), &history(&["c0"]), 6);

        let ids: Vec<_> = graph.nodes().map(|n| n.id.clone()).collect();
        assert_eq!(ids, vec!["c0", "c1", "c2", "c3"]);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_history_is_never_evicted() {
        let mut graph = WordGraph::new();
        merge(&mut graph, &payload("kitap", &words("a", 20)), "kitap", 50);
        merge(&mut graph, &payload("a19", &words("b", 20)), "a19", 50);
        merge(&mut graph, &payload("b19", &words("c", 20)), "b19", 50);

        let hist = history(&["kitap", "a19", "b19"]);
        prune(&mut graph, Some("b19"), &hist, 3);

        for id in &hist {
            assert!(graph.contains(id), "history node {} evicted", id);
        }
        for edge in graph.edges() {
            assert!(graph.contains(&edge.source) && graph.contains(&edge.target));
        }
    }

    #[test]
    fn test_large_graph_shrinks_to_range() {
        let mut graph = WordGraph::new();
        let hubs = ["h0", "h1", "h2", "h3", "h4"];
        merge(&mut graph, &payload("h0", &words("x", 50)), "h0", 50);
        for window in hubs.windows(2) {
            let mut related = words(&format!("{}n", window[1]), 49);
            related.push(window[0].to_string());
            merge(&mut graph, &payload(window[1], &related), window[1], 50);
        }
        for i in 0..50 {
            let related = words(&format!("leaf{}n", i), 1);
            merge(&mut graph, &payload(&format!("x{}", i), &related), &format!("x{}", i), 50);
        }
        graph.set_center("h4");
        assert!(graph.node_count() >= 300);

        let hist = history(&hubs);
        prune(&mut graph, Some("h4"), &hist, 100);

        let count = graph.node_count();
        assert!((100..=100 + hist.len()).contains(&count), "{} nodes", count);
        for id in &hist {
            assert!(graph.contains(id));
        }
    }
}
