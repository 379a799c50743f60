//! Word nodes.

use serde::{Deserialize, Serialize};

/// A point in layout space. The center sits at the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One word in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordNode {
    /// Normalized word; unique key.
    pub id: String,

    /// Original spelling used for display.
    pub label: String,

    /// True for the current navigation focus only.
    pub is_center: bool,

    /// True once the word has been a navigation center.
    pub is_visited: bool,

    /// Fan-out of the latest merge for a center; reference count otherwise.
    pub degree: usize,

    pub x: f64,
    pub y: f64,
}

impl WordNode {
    /// Creates a plain neighbour node.
    pub fn new(id: impl Into<String>, label: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            is_center: false,
            is_visited: false,
            degree: 0,
            x: position.x,
            y: position.y,
        }
    }

    pub fn with_degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Position) {
        self.x = position.x;
        self.y = position.y;
    }
}
