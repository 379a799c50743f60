//! Initial placement of words around the center.
//!
//! Positions are only a starting point for whatever physics the renderer
//! runs; the seeder just has to be deterministic and keep neighbours from
//! stacking on top of each other.

use crate::graph::WordGraph;
use crate::node::Position;
use std::collections::HashMap;
use std::f64::consts::PI;

/// Distance from the center to each seeded neighbour.
pub const LAYOUT_RADIUS: f64 = 120.0;

/// Computes seed positions for a center and its related words.
///
/// The center always maps to the origin. Related word `i` of `n` lands on a
/// circle at angle `i * 2π / n - π/2`, so the first one sits due north.
/// Words already in `existing` keep their coordinates unless
/// `force_reposition` is set.
pub fn seed_positions(
    center_id: &str,
    related_ids: &[String],
    existing: &WordGraph,
    force_reposition: bool,
) -> HashMap<String, Position> {
    let mut positions = HashMap::with_capacity(related_ids.len() + 1);
    positions.insert(center_id.to_string(), Position::ORIGIN);

    let angle_step = 2.0 * PI / related_ids.len().max(1) as f64;

    for (index, id) in related_ids.iter().enumerate() {
        if !force_reposition && existing.contains(id) {
            continue;
        }
        let angle = index as f64 * angle_step - PI / 2.0;
        positions.insert(
            id.clone(),
            Position::new(angle.cos() * LAYOUT_RADIUS, angle.sin() * LAYOUT_RADIUS),
        );
    }

    positions
}
