//! Hex coordinate system using axial coordinates (q, r).
//!
//! This module provides the geometry the board is generated from:
//! - `HexCoord`: identifies individual hex tiles
//! - `LatticePoint`: an exact integer position for hex centers and corners
//!
//! Corners are placed on an integer lattice instead of floating point pixels so
//! that two hexes sharing a corner always produce the same key. With pointy-top
//! hexes, one x unit is half a hex width and one y unit is half a hex radius.

use serde::{Deserialize, Serialize};

/// Offsets of the six corners of a pointy-top hex, clockwise from the top.
const CORNER_OFFSETS: [(i32, i32); 6] = [(0, -2), (1, -1), (1, 1), (0, 2), (-1, 1), (-1, -1)];

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// The six neighboring hexes in clockwise order starting from East
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),     // East
            HexCoord::new(self.q, self.r + 1),     // SouthEast
            HexCoord::new(self.q - 1, self.r + 1), // SouthWest
            HexCoord::new(self.q - 1, self.r),     // West
            HexCoord::new(self.q, self.r - 1),     // NorthWest
            HexCoord::new(self.q + 1, self.r - 1), // NorthEast
        ]
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Center of this hex on the corner lattice
    pub fn center(&self) -> LatticePoint {
        LatticePoint::new(2 * self.q + self.r, 3 * self.r)
    }

    /// The six corners of this hex, clockwise from the top
    pub fn corners(&self) -> [LatticePoint; 6] {
        let center = self.center();
        CORNER_OFFSETS.map(|(dx, dy)| LatticePoint::new(center.x + dx, center.y + dy))
    }

    /// The six sides of this hex as pairs of consecutive corners
    pub fn sides(&self) -> [(LatticePoint, LatticePoint); 6] {
        let corners = self.corners();
        std::array::from_fn(|i| (corners[i], corners[(i + 1) % 6]))
    }
}

/// An exact position on the corner lattice.
///
/// Ordering is top-to-bottom, then left-to-right, which is the order board
/// identities are handed out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatticePoint {
    pub x: i32,
    pub y: i32,
}

impl LatticePoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl PartialOrd for LatticePoint {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LatticePoint {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

/// The 19 land hexes of the standard board in reading order.
///
/// Rows hold 3, 4, 5, 4 and 3 hexes; within a row hexes run west to east.
pub fn standard_land() -> Vec<HexCoord> {
    let radius = 2;
    let mut coords = Vec::with_capacity(19);
    for r in -radius..=radius {
        let q_min = (-radius).max(-radius - r);
        let q_max = radius.min(radius - r);
        for q in q_min..=q_max {
            coords.push(HexCoord::new(q, r));
        }
    }
    coords
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hex_neighbors() {
        let center = HexCoord::new(0, 0);
        let neighbors = center.neighbors();

        assert_eq!(neighbors.len(), 6);
        for neighbor in neighbors {
            assert_eq!(center.distance_to(&neighbor), 1);
        }
    }

    #[test]
    fn test_hex_distance() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(2, -1);
        let c = HexCoord::new(-2, 2);

        assert_eq!(a.distance_to(&b), 2);
        assert_eq!(a.distance_to(&c), 2);
        assert_eq!(b.distance_to(&c), 4);
    }

    #[test]
    fn test_neighbors_share_two_corners() {
        let center = HexCoord::new(0, 0);
        let own: HashSet<_> = center.corners().into_iter().collect();

        for neighbor in center.neighbors() {
            let shared = neighbor
                .corners()
                .into_iter()
                .filter(|c| own.contains(c))
                .count();
            assert_eq!(shared, 2, "neighbor {:?} should share one side", neighbor);
        }
    }

    #[test]
    fn test_standard_land_rows() {
        let land = standard_land();
        assert_eq!(land.len(), 19);

        let mut rows: Vec<usize> = Vec::new();
        let mut last_r = None;
        for coord in &land {
            if last_r != Some(coord.r) {
                rows.push(0);
                last_r = Some(coord.r);
            }
            *rows.last_mut().unwrap() += 1;
        }
        assert_eq!(rows, vec![3, 4, 5, 4, 3]);
    }

    #[test]
    fn test_standard_land_corner_and_side_counts() {
        let land = standard_land();

        let corners: HashSet<LatticePoint> = land.iter().flat_map(|h| h.corners()).collect();
        assert_eq!(corners.len(), 54);

        let sides: HashSet<(LatticePoint, LatticePoint)> = land
            .iter()
            .flat_map(|h| h.sides())
            .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
            .collect();
        assert_eq!(sides.len(), 72);
    }

    #[test]
    fn test_lattice_order_is_reading_order() {
        assert!(LatticePoint::new(5, -6) < LatticePoint::new(-5, -5));
        assert!(LatticePoint::new(-1, 0) < LatticePoint::new(1, 0));
    }
}
