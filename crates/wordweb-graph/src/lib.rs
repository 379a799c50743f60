//! WordWeb Graph - Incremental word relationship graph
//!
//! This crate owns the node/edge collection behind the explorer and the
//! three operations that change it:
//!
//! - [`merge`] folds a `center → related[]` payload into the graph without
//!   duplicating nodes or edges
//! - [`seed_positions`] places newly introduced words on a circle around
//!   the center
//! - [`prune`] keeps the graph under a node ceiling with a breadth-first
//!   walk from the center, never evicting a former center
//!
//! # Architecture
//!
//! Nodes are stored in insertion order with an id index on the side, so
//! traversal tie-breaking is reproducible. Edges are undirected and kept in
//! the order they were discovered.
//!
//! # Example
//!
//! ```
//! use wordweb_core::WordPayload;
//! use wordweb_graph::{merge, WordGraph};
//!
//! let mut graph = WordGraph::new();
//! let payload = WordPayload::new("kitap", vec!["roman".into(), "yazar".into()]);
//! merge(&mut graph, &payload, "kitap", 20);
//!
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(graph.get("kitap").unwrap().degree, 2);
//! ```

mod edge;
mod graph;
mod layout;
mod merge;
mod node;
mod prune;

pub use edge::{EdgeKind, WordEdge};
pub use graph::{GraphExport, GraphStats, WordGraph};
pub use layout::{seed_positions, LAYOUT_RADIUS};
pub use merge::{merge, MergeOutcome};
pub use node::{Position, WordNode};
pub use prune::{prune, select_retained, PruneOutcome, MAX_BFS_DEPTH};
