//! Console rendering of the skirmish map.

use crate::State;

/// Draw the map as rows of `.` with `P` for the player and `O` for the opponent.
///
/// Row 0 is printed first. Fighters outside the map are omitted.
pub fn render_map(state: &State, map_size: u32) -> String {
    let size = map_size as usize;
    let mut grid = vec![vec!['.'; size]; size];

    let mut place = |(x, y): (i32, i32), mark: char| {
        if x >= 0 && y >= 0 && (x as usize) < size && (y as usize) < size {
            grid[y as usize][x as usize] = mark;
        }
    };
    place(state.player.position, 'P');
    place(state.opponent.position, 'O');

    let mut out = String::with_capacity(size * size * 2 + 16);
    out.push_str("Game Map:\n");
    for row in &grid {
        let line: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Skirmish;

    #[test]
    fn test_render_places_fighters() {
        let state = Skirmish::new().state_with_positions((1, 0), (2, 2));
        let map = render_map(&state, 3);
        assert_eq!(map, "Game Map:\n. P .\n. . .\n. . O\n");
    }

    #[test]
    fn test_render_skips_off_map_fighters() {
        let state = Skirmish::new().state_with_positions((-1, 0), (5, 5));
        let map = render_map(&state, 2);
        assert_eq!(map, "Game Map:\n. .\n. .\n");
    }
}
