//! Game board representation: hexes, corners and edges.
//!
//! This module contains:
//! - Resource types
//! - The arena-style board graph, indexed by identity
//! - Standard board generation
//! - Adjacency queries and one-way ownership transitions
//!
//! The board is the only source of adjacency truth. Edges know their two
//! corners and corners know their hexes; everything else (edges at a corner,
//! corners around a hex) is derived by scanning.

use crate::game::GameError;
use crate::hex::{self, HexCoord, LatticePoint};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Player identifier
pub type PlayerId = u8;
/// Hex identifier (index into the board's hex arena)
pub type HexId = usize;
/// Corner identifier (index into the board's corner arena)
pub type CornerId = usize;
/// Edge identifier (index into the board's edge arena)
pub type EdgeId = usize;

/// Resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Brick,
    Wood,
    Ore,
    Wheat,
    Sheep,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Brick,
        Resource::Wood,
        Resource::Ore,
        Resource::Wheat,
        Resource::Sheep,
    ];
}

/// A single hex tile on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hex {
    pub id: HexId,
    /// Resource produced, `None` for the desert
    pub resource: Option<Resource>,
    /// Dice number that triggers production (2-12, 0 for the desert)
    pub value: u8,
    /// Whether the robber is currently on this hex
    pub has_robber: bool,
}

impl Hex {
    /// Create a new resource hex
    pub fn producing(id: HexId, resource: Resource, value: u8) -> Self {
        Self {
            id,
            resource: Some(resource),
            value,
            has_robber: false,
        }
    }

    /// Create the desert hex (robber starts here)
    pub fn desert(id: HexId) -> Self {
        Self {
            id,
            resource: None,
            value: 0,
            has_robber: true,
        }
    }

    /// Resource this hex yields on `roll`, if any
    pub fn yield_for(&self, roll: u8) -> Option<Resource> {
        if self.has_robber || self.value != roll {
            return None;
        }
        self.resource
    }
}

/// A building site where three (or fewer, on the coast) hexes meet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corner {
    pub id: CornerId,
    pub owner: Option<PlayerId>,
    pub is_city: bool,
    /// Hexes touching this corner (1-3)
    pub hexes: Vec<HexId>,
}

impl Corner {
    /// Create an unclaimed corner
    pub fn new(id: CornerId, hexes: Vec<HexId>) -> Self {
        Self {
            id,
            owner: None,
            is_city: false,
            hexes,
        }
    }

    /// Resources granted per producing hex (1 settlement, 2 city)
    pub fn production_multiplier(&self) -> u32 {
        if self.is_city {
            2
        } else {
            1
        }
    }

    /// True if another player owns this corner
    pub fn blocks(&self, player: PlayerId) -> bool {
        self.owner.is_some_and(|owner| owner != player)
    }
}

/// A road slot between two corners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub owner: Option<PlayerId>,
    pub corners: [CornerId; 2],
}

impl Edge {
    /// Create an unclaimed edge
    pub fn new(id: EdgeId, a: CornerId, b: CornerId) -> Self {
        Self {
            id,
            owner: None,
            corners: [a, b],
        }
    }

    /// Whether one of the endpoints is `corner`
    pub fn touches(&self, corner: CornerId) -> bool {
        self.corners.contains(&corner)
    }

    /// The endpoint opposite `corner`, if `corner` is an endpoint
    pub fn other_end(&self, corner: CornerId) -> Option<CornerId> {
        match self.corners {
            [a, b] if a == corner => Some(b),
            [a, b] if b == corner => Some(a),
            _ => None,
        }
    }
}

/// The complete game board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    hexes: Vec<Hex>,
    corners: Vec<Corner>,
    edges: Vec<Edge>,
}

impl Board {
    /// Build a board from explicit parts, checking the adjacency invariants.
    ///
    /// Identities must equal arena positions, every edge must join two
    /// distinct existing corners, every corner must touch 1-3 existing hexes,
    /// and exactly one hex is the desert and exactly one hex holds the robber.
    pub fn from_parts(hexes: Vec<Hex>, corners: Vec<Corner>, edges: Vec<Edge>) -> Result<Self, GameError> {
        if hexes.iter().enumerate().any(|(i, h)| h.id != i)
            || corners.iter().enumerate().any(|(i, c)| c.id != i)
            || edges.iter().enumerate().any(|(i, e)| e.id != i)
        {
            return Err(GameError::InvalidBoard("identities must match arena positions"));
        }
        if hexes.iter().filter(|h| h.resource.is_none()).count() != 1 {
            return Err(GameError::InvalidBoard("board needs exactly one desert"));
        }
        if hexes.iter().filter(|h| h.has_robber).count() != 1 {
            return Err(GameError::InvalidBoard("board needs exactly one robber"));
        }
        for corner in &corners {
            if corner.hexes.is_empty() || corner.hexes.len() > 3 {
                return Err(GameError::InvalidBoard("corner must touch one to three hexes"));
            }
            if corner.hexes.iter().any(|&h| h >= hexes.len()) {
                return Err(GameError::InvalidBoard("corner touches an unknown hex"));
            }
        }
        for edge in &edges {
            let [a, b] = edge.corners;
            if a == b || a >= corners.len() || b >= corners.len() {
                return Err(GameError::InvalidBoard("edge must join two distinct corners"));
            }
        }

        Ok(Self {
            hexes,
            corners,
            edges,
        })
    }

    /// Create the standard 19-hex board with shuffled terrain and numbers
    pub fn standard<R: Rng>(rng: &mut R) -> Self {
        let land = hex::standard_land();

        // 4 wood, 4 wheat, 4 sheep, 3 ore, 3 brick, 1 desert
        let mut terrain: Vec<Option<Resource>> = Vec::with_capacity(land.len());
        terrain.extend(std::iter::repeat(Some(Resource::Wood)).take(4));
        terrain.extend(std::iter::repeat(Some(Resource::Wheat)).take(4));
        terrain.extend(std::iter::repeat(Some(Resource::Sheep)).take(4));
        terrain.extend(std::iter::repeat(Some(Resource::Ore)).take(3));
        terrain.extend(std::iter::repeat(Some(Resource::Brick)).take(3));
        terrain.push(None);
        terrain.shuffle(rng);

        let producing: Vec<usize> = (0..land.len()).filter(|&i| terrain[i].is_some()).collect();
        let numbers = assign_numbers_avoiding_adjacent_68(&land, &producing, rng);

        let mut hexes = Vec::with_capacity(land.len());
        let mut numbers = numbers.into_iter();
        for (id, resource) in terrain.into_iter().enumerate() {
            match resource {
                Some(resource) => {
                    let value = numbers.next().unwrap_or_default();
                    hexes.push(Hex::producing(id, resource, value));
                }
                None => hexes.push(Hex::desert(id)),
            }
        }

        let (corners, edges) = standard_topology(&land);
        Self {
            hexes,
            corners,
            edges,
        }
    }

    // ==================== Query Methods ====================

    pub fn hexes(&self) -> &[Hex] {
        &self.hexes
    }

    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Get a hex by id
    pub fn hex(&self, id: HexId) -> Result<&Hex, GameError> {
        self.hexes.get(id).ok_or(GameError::HexNotFound(id))
    }

    /// Get a corner by id
    pub fn corner(&self, id: CornerId) -> Result<&Corner, GameError> {
        self.corners.get(id).ok_or(GameError::CornerNotFound(id))
    }

    /// Get an edge by id
    pub fn edge(&self, id: EdgeId) -> Result<&Edge, GameError> {
        self.edges.get(id).ok_or(GameError::EdgeNotFound(id))
    }

    /// All edges owned by a player
    pub fn edges_owned_by(&self, player: PlayerId) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.owner == Some(player))
            .collect()
    }

    /// Corners touching a hex
    pub fn corners_adjacent_to_hex(&self, hex: HexId) -> Vec<&Corner> {
        self.corners
            .iter()
            .filter(|c| c.hexes.contains(&hex))
            .collect()
    }

    /// Edges with `corner` as an endpoint
    pub fn edges_at(&self, corner: CornerId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(move |e| e.touches(corner))
    }

    /// The hex currently holding the robber
    pub fn robber_hex(&self) -> Option<HexId> {
        self.hexes.iter().find(|h| h.has_robber).map(|h| h.id)
    }

    /// Owners of corners around a hex, in ascending id order
    pub fn players_adjacent_to_hex(&self, hex: HexId) -> BTreeSet<PlayerId> {
        self.corners_adjacent_to_hex(hex)
            .into_iter()
            .filter_map(|c| c.owner)
            .collect()
    }

    /// Every production claim for a roll, in corner order: (owner, resource, amount).
    pub fn production_claims(&self, roll: u8) -> Vec<(PlayerId, Resource, u32)> {
        let mut claims = Vec::new();
        for corner in &self.corners {
            let Some(owner) = corner.owner else {
                continue;
            };
            for &hex_id in &corner.hexes {
                if let Some(resource) = self.hexes.get(hex_id).and_then(|h| h.yield_for(roll)) {
                    claims.push((owner, resource, corner.production_multiplier()));
                }
            }
        }
        claims
    }

    // ==================== Validation Methods ====================

    /// Check whether a new road on `edge` would join the player's network.
    ///
    /// The edge must touch a corner the player owns, or touch another of the
    /// player's roads through a corner that no opponent occupies. `pending`
    /// is treated as already owned by the player (used while placing two
    /// roads at once).
    pub fn connects_to_network(&self, edge: &Edge, player: PlayerId, pending: Option<EdgeId>) -> bool {
        for &corner_id in &edge.corners {
            let Some(corner) = self.corners.get(corner_id) else {
                continue;
            };
            if corner.owner == Some(player) {
                return true;
            }
            if corner.blocks(player) {
                continue;
            }
            let has_road = self.edges_at(corner_id).any(|other| {
                other.id != edge.id && (other.owner == Some(player) || Some(other.id) == pending)
            });
            if has_road {
                return true;
            }
        }
        false
    }

    // ==================== Mutation Methods ====================
    // Callers validate first; ownership only ever moves from unclaimed to owned.

    pub(crate) fn claim_corner(&mut self, corner: CornerId, player: PlayerId) {
        if let Some(c) = self.corners.get_mut(corner) {
            debug_assert!(c.owner.is_none());
            c.owner = Some(player);
        }
    }

    pub(crate) fn upgrade_to_city(&mut self, corner: CornerId) {
        if let Some(c) = self.corners.get_mut(corner) {
            c.is_city = true;
        }
    }

    pub(crate) fn claim_edge(&mut self, edge: EdgeId, player: PlayerId) {
        if let Some(e) = self.edges.get_mut(edge) {
            debug_assert!(e.owner.is_none());
            e.owner = Some(player);
        }
    }

    /// Move the robber, returning the hex it left
    pub(crate) fn move_robber(&mut self, target: HexId) -> Option<HexId> {
        let previous = self.robber_hex();
        for hex in &mut self.hexes {
            hex.has_robber = hex.id == target;
        }
        previous
    }
}

/// Assign dice numbers to producing positions while trying to avoid 6 and 8 being adjacent
fn assign_numbers_avoiding_adjacent_68<R: Rng>(land: &[HexCoord], producing: &[usize], rng: &mut R) -> Vec<u8> {
    const MAX_ATTEMPTS: usize = 100;
    let numbers: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

    let mut shuffled = numbers.to_vec();
    for _ in 0..MAX_ATTEMPTS {
        shuffled.shuffle(rng);
        if is_valid_number_placement(land, producing, &shuffled) {
            break;
        }
    }
    shuffled
}

/// Check if a number placement is valid (no adjacent 6 and 8)
fn is_valid_number_placement(land: &[HexCoord], producing: &[usize], numbers: &[u8]) -> bool {
    let coord_to_number: HashMap<HexCoord, u8> = producing
        .iter()
        .zip(numbers)
        .map(|(&position, &number)| (land[position], number))
        .collect();

    coord_to_number.iter().all(|(coord, &number)| {
        if number != 6 && number != 8 {
            return true;
        }
        coord
            .neighbors()
            .iter()
            .filter_map(|n| coord_to_number.get(n))
            .all(|&n| n != 6 && n != 8)
    })
}

/// Derive corners and edges for a set of land hexes (hex id = index in `land`).
fn standard_topology(land: &[HexCoord]) -> (Vec<Corner>, Vec<Edge>) {
    let points: BTreeSet<LatticePoint> = land.iter().flat_map(|h| h.corners()).collect();
    let corner_ids: HashMap<LatticePoint, CornerId> =
        points.iter().enumerate().map(|(id, p)| (*p, id)).collect();

    let mut corners: Vec<Corner> = (0..points.len()).map(|id| Corner::new(id, Vec::new())).collect();
    let mut sides: BTreeSet<(CornerId, CornerId)> = BTreeSet::new();

    for (hex_id, coord) in land.iter().enumerate() {
        for point in coord.corners() {
            if let Some(&id) = corner_ids.get(&point) {
                corners[id].hexes.push(hex_id);
            }
        }
        for (a, b) in coord.sides() {
            if let (Some(&a), Some(&b)) = (corner_ids.get(&a), corner_ids.get(&b)) {
                sides.insert((a.min(b), a.max(b)));
            }
        }
    }

    let edges = sides
        .into_iter()
        .enumerate()
        .map(|(id, (a, b))| Edge::new(id, a, b))
        .collect();
    (corners, edges)
}
