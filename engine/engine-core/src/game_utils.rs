//! Shared utilities for grid game implementations
//!
//! Small geometric helpers used by games (attack range, reward shaping) and
//! by the search engine's similarity metrics.

use crate::typed::Position;

/// Euclidean distance between two grid positions.
///
/// # Example
/// ```
/// use engine_core::game_utils::euclidean_distance;
///
/// assert_eq!(euclidean_distance((0, 0), (3, 4)), 5.0);
/// assert_eq!(euclidean_distance((3, 3), (3, 4)), 1.0);
/// ```
#[inline]
pub fn euclidean_distance(a: Position, b: Position) -> f64 {
    (squared_distance(a, b) as f64).sqrt()
}

/// Squared euclidean distance between two grid positions.
///
/// Used where an integer comparison avoids floating point, e.g. adjacency
/// checks (`squared_distance <= 2` covers the 8-neighbourhood).
#[inline]
pub fn squared_distance(a: Position, b: Position) -> i64 {
    let dx = (a.0 - b.0) as i64;
    let dy = (a.1 - b.1) as i64;
    dx * dx + dy * dy
}
