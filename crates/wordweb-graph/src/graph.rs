//! Core graph data structure.
//!
//! The WordGraph keeps nodes in insertion order alongside an id index, and
//! edges in discovery order alongside an unordered pair index. Merge and
//! prune are the only writers of node flags and degrees; everything outside
//! this crate sees nodes through shared references or clones.

use crate::edge::{pair_key, EdgeKind, WordEdge};
use crate::node::{Position, WordNode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The word relationship graph.
#[derive(Debug, Clone, Default)]
pub struct WordGraph {
    /// Nodes in the order they first appeared.
    nodes: Vec<WordNode>,

    /// Maps node ids to positions in `nodes`.
    index: HashMap<String, usize>,

    /// Edges in the order they were discovered.
    edges: Vec<WordEdge>,

    /// Unordered endpoint pairs of `edges`.
    pairs: HashSet<(String, String)>,
}

impl WordGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Gets a node by id.
    pub fn get(&self, id: &str) -> Option<&WordNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut WordNode> {
        let i = *self.index.get(id)?;
        self.nodes.get_mut(i)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Iterates over nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &WordNode> {
        self.nodes.iter()
    }

    /// Iterates over edges in discovery order.
    pub fn edges(&self) -> impl Iterator<Item = &WordEdge> {
        self.edges.iter()
    }

    /// Returns the node currently flagged as center.
    pub fn center(&self) -> Option<&WordNode> {
        self.nodes.iter().find(|n| n.is_center)
    }

    /// Returns true if an edge connects `a` and `b` in either direction.
    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.pairs.contains(&pair_key(a, b))
    }

    /// Ids of the nodes sharing an edge with `id`, in edge order.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        self.edges.iter().filter_map(|e| e.other(id)).collect()
    }

    /// Adds a node. An existing node with the same id is left untouched.
    pub(crate) fn insert_node(&mut self, node: WordNode) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Appends an edge unless it would be a self-edge, a duplicate of an
    /// existing pair, or dangle off a missing node.
    pub(crate) fn add_edge(&mut self, source: &str, target: &str, kind: EdgeKind) -> bool {
        if source == target || !self.contains(source) || !self.contains(target) {
            return false;
        }
        if !self.pairs.insert(pair_key(source, target)) {
            return false;
        }
        self.edges.push(WordEdge {
            source: source.to_string(),
            target: target.to_string(),
            kind,
        });
        true
    }

    /// Flags `id` as the center and clears the flag everywhere else.
    pub fn set_center(&mut self, id: &str) {
        for node in &mut self.nodes {
            node.is_center = node.id == id;
        }
    }

    /// Sets `is_visited` on every node whose id is in `visited`.
    pub fn mark_visited(&mut self, visited: &HashSet<String>) {
        for node in &mut self.nodes {
            if visited.contains(&node.id) {
                node.is_visited = true;
            }
        }
    }

    /// Moves a node. Used by layout code that owns node coordinates.
    pub fn set_position(&mut self, id: &str, position: Position) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.set_position(position);
                true
            }
            None => false,
        }
    }

    /// Keeps only the nodes in `keep` and the edges between them.
    ///
    /// Returns the number of nodes and edges removed.
    pub(crate) fn retain(&mut self, keep: &HashSet<String>) -> (usize, usize) {
        let nodes_before = self.nodes.len();
        let edges_before = self.edges.len();

        self.nodes.retain(|n| keep.contains(&n.id));
        self.edges
            .retain(|e| keep.contains(&e.source) && keep.contains(&e.target));

        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        self.pairs = self.edges.iter().map(WordEdge::pair_key).collect();

        (
            nodes_before - self.nodes.len(),
            edges_before - self.edges.len(),
        )
    }

    /// Removes every node and edge.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.edges.clear();
        self.pairs.clear();
    }

    /// Returns a serializable copy of the graph.
    pub fn export(&self) -> GraphExport {
        GraphExport {
            nodes: self.nodes.clone(),
            links: self.edges.clone(),
        }
    }

    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            visited_count: self.nodes.iter().filter(|n| n.is_visited).count(),
            center: self.center().map(|n| n.id.clone()),
        }
    }
}

/// Nodes and links in the shape a renderer consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<WordNode>,
    pub links: Vec<WordEdge>,
}

impl GraphExport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Graph statistics for status output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub visited_count: usize,
    pub center: Option<String>,
}
