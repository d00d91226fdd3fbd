//! Settlers - rules engine for a settlement-building board game
//!
//! This crate provides the core game logic, including:
//! - Board graph of hexes, corners and edges generated from hex coordinates
//! - Bank and player resource ledger with all-or-nothing transactions
//! - Longest road computation and trophy tracking
//! - Action resolver with full rule enforcement
//!
//! # Architecture
//!
//! The engine is transport-agnostic: callers drive a [`GameState`] either
//! through its named operations or through [`GameState::apply_action`].
//! All randomness comes from one generator owned by the game, so a seeded
//! game replays identically.
//!
//! # Modules
//!
//! - [`hex`]: Axial hex coordinates and the corner lattice
//! - [`board`]: Board graph, adjacency queries and standard generation
//! - [`player`]: Player state, resource hands and costs
//! - [`bank`]: Resource pool and development card deck
//! - [`road`]: Longest road search
//! - [`trophy`]: Longest Road and Largest Army
//! - [`game`]: Game state and action resolver
//! - [`actions`]: Actions and the events they produce

pub mod actions;
pub mod bank;
pub mod board;
pub mod game;
pub mod hex;
pub mod player;
pub mod road;
pub mod trophy;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent, TradeOffer};
pub use bank::Bank;
pub use board::{Board, Corner, CornerId, Edge, EdgeId, Hex, HexId, PlayerId, Resource};
pub use game::{GameConfig, GameError, GameState};
pub use hex::{HexCoord, LatticePoint};
pub use player::{costs, DevelopmentCard, Player, ResourceHand};
pub use road::longest_road;
pub use trophy::{Trophy, TrophyKind, TrophyState};
