//! Longest road computation.
//!
//! A road's length is the number of edges in the longest simple trail of a
//! player's edges. A corner owned by another player ends a trail: the edge
//! leading into it still counts, but the trail cannot continue through it.

use crate::board::{Board, CornerId, EdgeId, PlayerId};
use std::collections::HashSet;

/// Length of the longest contiguous road owned by `player`
pub fn longest_road(board: &Board, player: PlayerId) -> u32 {
    let owned: Vec<(EdgeId, [CornerId; 2])> = board
        .edges_owned_by(player)
        .into_iter()
        .map(|e| (e.id, e.corners))
        .collect();

    let mut best = 0;
    let mut visited = HashSet::new();
    for (edge, [a, b]) in owned {
        visited.insert(edge);
        // Walk away from each endpoint in turn
        best = best.max(walk(board, player, b, &mut visited));
        best = best.max(walk(board, player, a, &mut visited));
        visited.remove(&edge);
    }
    best
}

/// Length of the best trail that has just entered `corner` along one edge
fn walk(board: &Board, player: PlayerId, corner: CornerId, visited: &mut HashSet<EdgeId>) -> u32 {
    let blocked = board.corner(corner).map_or(true, |c| c.blocks(player));
    if blocked {
        return 1;
    }

    let next: Vec<(EdgeId, CornerId)> = board
        .edges_at(corner)
        .filter(|e| e.owner == Some(player) && !visited.contains(&e.id))
        .filter_map(|e| e.other_end(corner).map(|far| (e.id, far)))
        .collect();

    let mut continuation = 0;
    for (edge, far) in next {
        visited.insert(edge);
        continuation = continuation.max(walk(board, player, far, visited));
        visited.remove(&edge);
    }

    1 + continuation
}
