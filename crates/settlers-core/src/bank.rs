//! The bank: resource stock and the development card deck.

use crate::board::Resource;
use crate::game::GameError;
use crate::player::{DevelopmentCard, ResourceHand};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default stock of each resource
pub const DEFAULT_STOCK: u32 = 19;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    resources: ResourceHand,
    /// Starting stock per resource kind
    stock: u32,
    /// Draw pile, top of the deck is the last element
    deck: Vec<DevelopmentCard>,
}

impl Bank {
    /// A full bank with a freshly shuffled standard deck
    pub fn new<R: Rng>(stock: u32, rng: &mut R) -> Self {
        let mut deck = DevelopmentCard::standard_deck();
        deck.shuffle(rng);
        Self::with_deck(stock, deck)
    }

    /// A full bank with a given deck (top = last element)
    pub fn with_deck(stock: u32, deck: Vec<DevelopmentCard>) -> Self {
        Self {
            resources: ResourceHand::uniform(stock),
            stock,
            deck,
        }
    }

    pub fn resources(&self) -> &ResourceHand {
        &self.resources
    }

    pub fn available(&self, resource: Resource) -> u32 {
        self.resources.get(resource)
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    /// Take resources back into the bank.
    ///
    /// Every unit in play came out of the bank, so no kind can climb above the
    /// starting stock.
    pub fn receive(&mut self, hand: &ResourceHand) {
        self.resources.add_hand(hand);
        debug_assert!(
            Resource::ALL.iter().all(|&r| self.resources.get(r) <= self.stock),
            "bank holds more than its stock of {}",
            self.stock
        );
    }

    /// Hand out `amount` of a resource if the stock covers it
    pub fn dispense(&mut self, resource: Resource, amount: u32) -> Result<(), GameError> {
        if self.resources.get(resource) < amount {
            return Err(GameError::BankDepleted);
        }
        self.resources.remove(resource, amount);
        Ok(())
    }

    /// Hand out a whole set of resources, or nothing if any kind runs short
    pub fn withdraw(&mut self, hand: &ResourceHand) -> Result<(), GameError> {
        if !self.resources.can_afford(hand) {
            return Err(GameError::BankDepleted);
        }
        self.resources.subtract(hand);
        Ok(())
    }

    /// Remove and return the top card. Drawn cards never return to the deck.
    pub fn draw_card(&mut self) -> Result<DevelopmentCard, GameError> {
        self.deck.pop().ok_or(GameError::DeckEmpty)
    }
}
