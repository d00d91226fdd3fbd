//! Player state and the resource ledger.
//!
//! This module contains:
//! - ResourceHand for managing resource counts (also used as a cost)
//! - Building costs
//! - The development card kind
//! - Player struct with the all-or-nothing payment and trade primitives

use crate::bank::Bank;
use crate::board::{PlayerId, Resource};
use crate::game::GameError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DevelopmentCard {
    /// Move robber and steal, counts toward Largest Army
    Knight,
    /// All players must give you all of one resource type
    Monopoly,
    /// Worth 1 VP once played
    VictoryPoint,
    /// Build 2 roads for free
    RoadBuilding,
    /// Take any 2 resources from the bank
    YearOfPlenty,
}

impl DevelopmentCard {
    /// Create the standard development card deck (25 cards, unshuffled)
    pub fn standard_deck() -> Vec<DevelopmentCard> {
        let mut deck = Vec::with_capacity(25);

        // 14 Knights
        deck.extend(std::iter::repeat(DevelopmentCard::Knight).take(14));

        // 5 Victory Points
        deck.extend(std::iter::repeat(DevelopmentCard::VictoryPoint).take(5));

        // 2 Road Building
        deck.extend(std::iter::repeat(DevelopmentCard::RoadBuilding).take(2));

        // 2 Year of Plenty
        deck.extend(std::iter::repeat(DevelopmentCard::YearOfPlenty).take(2));

        // 2 Monopoly
        deck.extend(std::iter::repeat(DevelopmentCard::Monopoly).take(2));

        deck
    }
}

/// A hand of resources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub brick: u32,
    pub wood: u32,
    pub ore: u32,
    pub wheat: u32,
    pub sheep: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(brick: u32, wood: u32, ore: u32, wheat: u32, sheep: u32) -> Self {
        Self {
            brick,
            wood,
            ore,
            wheat,
            sheep,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Create a hand with the same amount of every resource
    pub fn uniform(amount: u32) -> Self {
        Self::with_amounts(amount, amount, amount, amount, amount)
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.brick + self.wood + self.ore + self.wheat + self.sheep
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Brick => self.brick,
            Resource::Wood => self.wood,
            Resource::Ore => self.ore,
            Resource::Wheat => self.wheat,
            Resource::Sheep => self.sheep,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Brick => &mut self.brick,
            Resource::Wood => &mut self.wood,
            Resource::Ore => &mut self.ore,
            Resource::Wheat => &mut self.wheat,
            Resource::Sheep => &mut self.sheep,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        *self.slot(resource) = count;
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Remove resources from hand (saturating; callers check first)
    pub fn remove(&mut self, resource: Resource, amount: u32) {
        let slot = self.slot(resource);
        debug_assert!(*slot >= amount);
        *slot = slot.saturating_sub(amount);
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for resource in Resource::ALL {
            self.add(resource, other.get(resource));
        }
    }

    /// Subtract another hand (saturating; callers check `can_afford` first)
    pub fn subtract(&mut self, cost: &ResourceHand) {
        for resource in Resource::ALL {
            self.remove(resource, cost.get(resource));
        }
    }

    /// Check if can afford a cost. Resources absent from the cost are unconstrained.
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) >= cost.get(r))
    }

    /// Remove one resource unit chosen uniformly across all units held.
    ///
    /// A hand with 3 wood and 1 ore gives up wood three times out of four.
    pub fn steal_random<R: Rng>(&mut self, rng: &mut R) -> Option<Resource> {
        let units: Vec<Resource> = Resource::ALL
            .iter()
            .flat_map(|&r| std::iter::repeat(r).take(self.get(r) as usize))
            .collect();

        let resource = *units.choose(rng)?;
        self.remove(resource, 1);
        Some(resource)
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 brick, 1 wood
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 brick, 1 wood, 1 wheat, 1 sheep
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 1, 1)
    }

    /// Cost to upgrade to city: 3 ore, 2 wheat
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 3, 2, 0)
    }

    /// Cost to buy a development card: 1 ore, 1 wheat, 1 sheep
    pub fn development_card() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 1, 1, 1)
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Current resources
    pub resources: ResourceHand,
    /// Development cards in hand (unplayed)
    pub cards: Vec<DevelopmentCard>,
    /// Number of knights played (for Largest Army)
    pub knights_played: u32,
    /// Cached longest road, refreshed whenever road topology changes
    pub longest_road: u32,
    /// Victory points: buildings, trophies and played VP cards
    pub points: u32,
}

impl Player {
    /// Create a new player with no resources or points
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            resources: ResourceHand::new(),
            cards: Vec::new(),
            knights_played: 0,
            longest_road: 0,
            points: 0,
        }
    }

    /// Check if player has a development card of given type
    pub fn has_card(&self, card: DevelopmentCard) -> bool {
        self.cards.contains(&card)
    }

    /// Remove one copy of a card from hand
    pub fn take_card(&mut self, card: DevelopmentCard) -> bool {
        match self.cards.iter().position(|c| *c == card) {
            Some(pos) => {
                self.cards.remove(pos);
                true
            }
            None => false,
        }
    }

    // ==================== Ledger ====================

    /// True iff the player holds at least `cost` of every resource
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        self.resources.can_afford(cost)
    }

    /// Pay a cost to the bank; nothing moves unless all of it can be paid
    pub fn pay(&mut self, cost: &ResourceHand, bank: &mut Bank) -> Result<(), GameError> {
        if !self.can_afford(cost) {
            return Err(GameError::InsufficientResources);
        }
        self.resources.subtract(cost);
        bank.receive(cost);
        Ok(())
    }

    /// Give `amounts` to another player; nothing moves unless all of it can be given
    pub fn transfer_to(&mut self, receiver: &mut Player, amounts: &ResourceHand) -> Result<(), GameError> {
        if !self.can_afford(amounts) {
            return Err(GameError::InsufficientResources);
        }
        self.resources.subtract(amounts);
        receiver.resources.add_hand(amounts);
        Ok(())
    }

    /// Swap `give` for `receive` with another player; both sides must be covered
    pub fn trade_with(
        &mut self,
        other: &mut Player,
        give: &ResourceHand,
        receive: &ResourceHand,
    ) -> Result<(), GameError> {
        if !self.can_afford(give) || !other.can_afford(receive) {
            return Err(GameError::InsufficientResources);
        }
        self.resources.subtract(give);
        other.resources.add_hand(give);
        other.resources.subtract(receive);
        self.resources.add_hand(receive);
        Ok(())
    }

    /// Trade `ratio` of `give` with the bank for one `take`
    pub fn maritime_trade(
        &mut self,
        give: Resource,
        take: Resource,
        ratio: u32,
        bank: &mut Bank,
    ) -> Result<(), GameError> {
        if ratio == 0 || give == take {
            return Err(GameError::InvalidTrade);
        }
        if self.resources.get(give) < ratio {
            return Err(GameError::InsufficientResources);
        }
        if bank.available(take) == 0 {
            return Err(GameError::BankDepleted);
        }

        self.resources.remove(give, ratio);
        bank.receive(&ResourceHand::single(give, ratio));
        bank.dispense(take, 1)?;
        self.resources.add(take, 1);
        Ok(())
    }
}
