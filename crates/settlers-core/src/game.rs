//! Core game state and action resolver.
//!
//! This module contains the main `GameState` struct and all game logic.
//! Every operation validates completely before it mutates anything, so a
//! returned error always leaves the state exactly as it was.

use crate::actions::{GameAction, GameEvent, TradeOffer};
use crate::bank::{Bank, DEFAULT_STOCK};
use crate::board::{Board, CornerId, Edge, EdgeId, HexId, PlayerId, Resource};
use crate::player::{costs, DevelopmentCard, Player, ResourceHand};
use crate::road;
use crate::trophy::{Trophy, TrophyKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hands above this size must discard on a seven
const SEVEN_ROLL_HAND_LIMIT: u32 = 7;

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum GameError {
    #[error("illegal build: {0}")]
    IllegalBuild(&'static str),

    #[error("insufficient resources")]
    InsufficientResources,

    #[error("bank does not have the requested resources")]
    BankDepleted,

    #[error("road must connect to your existing network")]
    Disconnected,

    #[error("must discard exactly {required} resources you hold")]
    IllegalDiscard { required: u32 },

    #[error("robber is already on this hex")]
    IllegalRobberMove,

    #[error("no development cards left in the deck")]
    DeckEmpty,

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("hex {0} not found")]
    HexNotFound(HexId),

    #[error("corner {0} not found")]
    CornerNotFound(CornerId),

    #[error("edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("you don't have that card")]
    NoSuchCard,

    #[error("invalid trade")]
    InvalidTrade,

    #[error("invalid board: {0}")]
    InvalidBoard(&'static str),

    #[error("invalid game config: {0}")]
    InvalidConfig(&'static str),
}

/// Settings for a new game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of players (2-4)
    pub player_count: u8,
    /// Starting bank stock of each resource
    pub bank_stock: u32,
    /// Seed for the game's random number generator; random when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_count: 4,
            bank_stock: DEFAULT_STOCK,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if !(2..=4).contains(&self.player_count) {
            return Err(GameError::InvalidConfig("must have 2-4 players"));
        }
        Ok(())
    }
}

/// The complete game state
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// The game board
    pub board: Board,
    /// Resource pool and development card deck
    pub bank: Bank,
    /// All players, indexed by id
    pub players: Vec<Player>,
    /// Round number (starts at 1, advances when play returns to player 0)
    pub round: u32,
    /// Player whose turn it is
    pub current_player: PlayerId,
    /// Last dice roll
    pub dice_roll: Option<(u8, u8)>,
    pub longest_road: Trophy,
    pub largest_army: Trophy,
    /// Single source of randomness, seeded once
    #[serde(skip)]
    rng: StdRng,
}

impl GameState {
    /// Create a new game, seeding the generator from the config (or entropy)
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Create a new game driven by the given generator
    pub fn with_rng(config: GameConfig, mut rng: StdRng) -> Result<Self, GameError> {
        config.validate()?;

        let board = Board::standard(&mut rng);
        let bank = Bank::new(config.bank_stock, &mut rng);
        let players = (0..config.player_count).map(Player::new).collect();

        tracing::debug!(players = config.player_count, stock = config.bank_stock, "New game created");

        Ok(Self {
            board,
            bank,
            players,
            round: 1,
            current_player: 0,
            dice_roll: None,
            longest_road: Trophy::longest_road(),
            largest_army: Trophy::largest_army(),
            rng,
        })
    }

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by ID
    pub fn player(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(GameError::PlayerNotFound(id))
    }

    fn index_of(&self, id: PlayerId) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(GameError::PlayerNotFound(id))
    }

    /// Two distinct players, borrowed mutably at once
    fn pair_mut(&mut self, a: PlayerId, b: PlayerId) -> Result<(&mut Player, &mut Player), GameError> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        if i == j {
            return Err(GameError::InvalidTrade);
        }
        if i < j {
            let (low, high) = self.players.split_at_mut(j);
            Ok((&mut low[i], &mut high[0]))
        } else {
            let (low, high) = self.players.split_at_mut(i);
            Ok((&mut high[0], &mut low[j]))
        }
    }

    // ==================== Action Dispatch ====================

    /// Apply an action on behalf of `player`, returning what happened
    pub fn apply_action(&mut self, player: PlayerId, action: GameAction) -> Result<Vec<GameEvent>, GameError> {
        self.index_of(player)?;

        match action {
            GameAction::RollDice => {
                let (roll, distributions) = self.resolve_roll();
                let mut events = vec![GameEvent::DiceRolled {
                    player,
                    roll,
                    total: roll.0 + roll.1,
                }];
                if !distributions.is_empty() {
                    events.push(GameEvent::ResourcesDistributed { distributions });
                }
                Ok(events)
            }

            GameAction::DiscardCards(discard) => {
                let count = self.handle_seven_roll(player, &discard)?;
                Ok(vec![GameEvent::CardsDiscarded { player, count }])
            }

            GameAction::BuildSettlementOrCity(corner) => self.build_settlement_or_city(player, corner),

            GameAction::BuildRoad(edge) => self.build_road(player, edge, false),

            GameAction::BuyDevelopmentCard => {
                let card = self.buy_development_card(player)?;
                Ok(vec![GameEvent::DevelopmentCardPurchased { player, card }])
            }

            GameAction::PlayKnight(hex) => {
                self.play_card(player, DevelopmentCard::Knight, |game| game.play_knight(player, hex))
            }

            GameAction::PlayRoadBuilding(first, second) => {
                self.play_card(player, DevelopmentCard::RoadBuilding, |game| {
                    let mut events = vec![GameEvent::RoadBuildingPlayed { player }];
                    events.extend(game.play_road_building(player, first, second)?);
                    Ok(events)
                })
            }

            GameAction::PlayYearOfPlenty(first, second) => {
                self.play_card(player, DevelopmentCard::YearOfPlenty, |game| {
                    game.play_year_of_plenty(player, first, second)?;
                    Ok(vec![GameEvent::YearOfPlentyPlayed {
                        player,
                        resources: (first, second),
                    }])
                })
            }

            GameAction::PlayMonopoly(resource) => {
                self.play_card(player, DevelopmentCard::Monopoly, |game| {
                    let total_stolen = game.play_monopoly(player, resource)?;
                    Ok(vec![GameEvent::MonopolyPlayed {
                        player,
                        resource,
                        total_stolen,
                    }])
                })
            }

            GameAction::PlayVictoryPoint => {
                self.play_card(player, DevelopmentCard::VictoryPoint, |game| {
                    game.play_victory_point(player)?;
                    Ok(vec![GameEvent::VictoryPointPlayed { player }])
                })
            }

            GameAction::Trade(offer) => {
                if offer.from != player {
                    return Err(GameError::InvalidTrade);
                }
                self.execute_trade(&offer)?;
                Ok(vec![GameEvent::TradeCompleted {
                    player1: offer.from,
                    player2: offer.to,
                }])
            }

            GameAction::MaritimeTrade {
                give,
                give_count,
                receive,
            } => {
                self.maritime_trade(player, give, receive, give_count)?;
                Ok(vec![GameEvent::MaritimeTradeCompleted {
                    player,
                    gave: give,
                    gave_count: give_count,
                    received: receive,
                }])
            }

            GameAction::EndTurn => self.end_turn(player),
        }
    }

    /// Run a card effect; the card leaves the hand only if the effect succeeds
    fn play_card<F>(&mut self, player: PlayerId, card: DevelopmentCard, effect: F) -> Result<Vec<GameEvent>, GameError>
    where
        F: FnOnce(&mut Self) -> Result<Vec<GameEvent>, GameError>,
    {
        let index = self.index_of(player)?;
        if !self.players[index].has_card(card) {
            return Err(GameError::NoSuchCard);
        }

        let events = effect(self)?;
        self.players[index].take_card(card);
        Ok(events)
    }

    // ==================== Dice ====================

    /// Roll two independent six-sided dice
    pub fn roll_dice(&mut self) -> (u8, u8) {
        (self.rng.gen_range(1..=6), self.rng.gen_range(1..=6))
    }

    /// Roll the dice and distribute production unless a seven comes up; returns the total
    pub fn roll(&mut self) -> u8 {
        let ((a, b), _) = self.resolve_roll();
        a + b
    }

    fn resolve_roll(&mut self) -> ((u8, u8), Vec<(PlayerId, Resource, u32)>) {
        let roll = self.roll_dice();
        let total = roll.0 + roll.1;
        self.dice_roll = Some(roll);
        tracing::debug!(total, "Dice rolled");

        if total == 7 {
            return (roll, Vec::new());
        }
        (roll, self.distribute_resources(total))
    }

    /// Pay out every producing corner for a roll.
    ///
    /// Claims are settled in corner order. A claim the bank cannot cover in
    /// full is skipped rather than split.
    pub fn distribute_resources(&mut self, roll: u8) -> Vec<(PlayerId, Resource, u32)> {
        let mut distributed = Vec::new();

        for (owner, resource, amount) in self.board.production_claims(roll) {
            let Some(player) = self.players.iter_mut().find(|p| p.id == owner) else {
                continue;
            };
            if self.bank.dispense(resource, amount).is_err() {
                tracing::debug!(player = owner, ?resource, amount, "Bank short, production skipped");
                continue;
            }
            player.resources.add(resource, amount);
            distributed.push((owner, resource, amount));
        }

        distributed
    }

    /// Discard half of a hand larger than seven after a seven is rolled.
    ///
    /// Returns the number of resources discarded (zero for small hands).
    pub fn handle_seven_roll(&mut self, player: PlayerId, discard: &ResourceHand) -> Result<u32, GameError> {
        let index = self.index_of(player)?;
        let discarder = &mut self.players[index];

        let total = discarder.resources.total();
        if total <= SEVEN_ROLL_HAND_LIMIT {
            return Ok(0);
        }

        let required = total / 2;
        if discard.total() != required || !discarder.can_afford(discard) {
            return Err(GameError::IllegalDiscard { required });
        }

        discarder.pay(discard, &mut self.bank)?;
        tracing::debug!(player, count = required, "Resources discarded");
        Ok(required)
    }

    // ==================== Building ====================

    /// Build a settlement on an empty corner, or upgrade an own settlement to a city
    pub fn build_settlement_or_city(&mut self, player: PlayerId, corner: CornerId) -> Result<Vec<GameEvent>, GameError> {
        let index = self.index_of(player)?;
        let (owner, is_city) = {
            let site = self.board.corner(corner)?;
            (site.owner, site.is_city)
        };
        let mut events = Vec::new();

        match owner {
            None => {
                self.players[index].pay(&costs::settlement(), &mut self.bank)?;
                self.players[index].points += 1;
                self.board.claim_corner(corner, player);
                tracing::info!(player, corner, "Settlement built");
                events.push(GameEvent::SettlementBuilt { player, corner });

                // A new building can cut any player's road
                self.refresh_longest_roads();
                events.extend(self.evaluate_trophy(TrophyKind::LongestRoad));
            }
            Some(owner) if owner == player && !is_city => {
                self.players[index].pay(&costs::city(), &mut self.bank)?;
                self.players[index].points += 1;
                self.board.upgrade_to_city(corner);
                tracing::info!(player, corner, "City built");
                events.push(GameEvent::CityBuilt { player, corner });
            }
            Some(owner) if owner == player => {
                return Err(GameError::IllegalBuild("corner already holds a city"));
            }
            Some(_) => {
                return Err(GameError::IllegalBuild("corner is owned by another player"));
            }
        }

        Ok(events)
    }

    /// Build a road, paying for it unless `is_free`
    pub fn build_road(&mut self, player: PlayerId, edge: EdgeId, is_free: bool) -> Result<Vec<GameEvent>, GameError> {
        let index = self.index_of(player)?;
        let slot = self.board.edge(edge)?;

        if slot.owner.is_some() {
            return Err(GameError::IllegalBuild("edge already occupied"));
        }
        if !is_free && !self.players[index].can_afford(&costs::road()) {
            return Err(GameError::InsufficientResources);
        }
        if !self.board.connects_to_network(slot, player, None) {
            return Err(GameError::Disconnected);
        }

        if !is_free {
            self.players[index].pay(&costs::road(), &mut self.bank)?;
        }
        self.board.claim_edge(edge, player);

        Ok(self.roads_built(player, &[edge]))
    }

    /// Place two free roads at once; the second may connect through the first
    pub fn play_road_building(&mut self, player: PlayerId, first: EdgeId, second: EdgeId) -> Result<Vec<GameEvent>, GameError> {
        self.index_of(player)?;
        if first == second {
            return Err(GameError::IllegalBuild("road building needs two different edges"));
        }

        let a = self.board.edge(first)?;
        let b = self.board.edge(second)?;
        if a.owner.is_some() || b.owner.is_some() {
            return Err(GameError::IllegalBuild("edge already occupied"));
        }

        let connects = |edge: &Edge, pending: Option<EdgeId>| self.board.connects_to_network(edge, player, pending);
        let connected = (connects(a, None) && connects(b, Some(first))) || (connects(b, None) && connects(a, Some(second)));
        if !connected {
            return Err(GameError::Disconnected);
        }

        self.board.claim_edge(first, player);
        self.board.claim_edge(second, player);

        Ok(self.roads_built(player, &[first, second]))
    }

    fn roads_built(&mut self, player: PlayerId, edges: &[EdgeId]) -> Vec<GameEvent> {
        let mut events: Vec<GameEvent> = edges
            .iter()
            .map(|&edge| GameEvent::RoadBuilt { player, edge })
            .collect();
        tracing::info!(player, ?edges, "Road built");

        // Only the builder's network changed
        let length = road::longest_road(&self.board, player);
        if let Some(builder) = self.players.iter_mut().find(|p| p.id == player) {
            builder.longest_road = length;
        }
        events.extend(self.evaluate_trophy(TrophyKind::LongestRoad));
        events
    }

    /// Recompute every player's cached longest road
    fn refresh_longest_roads(&mut self) {
        for player in &mut self.players {
            player.longest_road = road::longest_road(&self.board, player.id);
        }
    }

    fn evaluate_trophy(&mut self, kind: TrophyKind) -> Option<GameEvent> {
        let trophy = match kind {
            TrophyKind::LongestRoad => &mut self.longest_road,
            TrophyKind::LargestArmy => &mut self.largest_army,
        };
        trophy.evaluate(&mut self.players).map(GameEvent::from)
    }

    // ==================== Development Cards ====================

    /// Buy the top card of the deck
    pub fn buy_development_card(&mut self, player: PlayerId) -> Result<DevelopmentCard, GameError> {
        let index = self.index_of(player)?;
        let cost = costs::development_card();

        if !self.players[index].can_afford(&cost) {
            return Err(GameError::InsufficientResources);
        }
        if self.bank.deck_len() == 0 {
            return Err(GameError::DeckEmpty);
        }

        self.players[index].pay(&cost, &mut self.bank)?;
        let card = self.bank.draw_card()?;
        self.players[index].cards.push(card);
        tracing::debug!(player, ?card, "Development card bought");
        Ok(card)
    }

    /// Move the robber, rob a random neighbour of the hex, and count the knight
    pub fn play_knight(&mut self, player: PlayerId, target: HexId) -> Result<Vec<GameEvent>, GameError> {
        let index = self.index_of(player)?;
        if self.board.hex(target)?.has_robber {
            return Err(GameError::IllegalRobberMove);
        }

        let from = self.board.move_robber(target);
        tracing::info!(player, ?from, to = target, "Robber moved");
        let mut events = vec![GameEvent::RobberMoved {
            player,
            from,
            to: target,
        }];

        let victims: Vec<PlayerId> = self
            .board
            .players_adjacent_to_hex(target)
            .into_iter()
            .filter(|&id| id != player)
            .collect();

        if let Some(&victim) = victims.choose(&mut self.rng) {
            let stolen = match self.players.iter_mut().find(|p| p.id == victim) {
                Some(robbed) => robbed.resources.steal_random(&mut self.rng),
                None => None,
            };
            if let Some(resource) = stolen {
                self.players[index].resources.add(resource, 1);
            }
            events.push(GameEvent::ResourceStolen {
                thief: player,
                victim,
                resource: stolen,
            });
        }

        self.players[index].knights_played += 1;
        events.push(GameEvent::KnightPlayed { player });
        events.extend(self.evaluate_trophy(TrophyKind::LargestArmy));

        Ok(events)
    }

    /// Take one of each named resource from the bank.
    ///
    /// Naming the same resource twice takes two of it, so the bank must hold two.
    pub fn play_year_of_plenty(&mut self, player: PlayerId, first: Resource, second: Resource) -> Result<(), GameError> {
        let index = self.index_of(player)?;

        let mut grant = ResourceHand::single(first, 1);
        grant.add(second, 1);
        self.bank.withdraw(&grant)?;
        self.players[index].resources.add_hand(&grant);
        Ok(())
    }

    /// Take every unit of `target` from every other player; returns the total taken
    pub fn play_monopoly(&mut self, player: PlayerId, target: Resource) -> Result<u32, GameError> {
        let index = self.index_of(player)?;

        let mut total = 0;
        for other in self.players.iter_mut().filter(|p| p.id != player) {
            total += other.resources.get(target);
            other.resources.set(target, 0);
        }
        self.players[index].resources.add(target, total);

        tracing::debug!(player, ?target, total, "Monopoly played");
        Ok(total)
    }

    /// Reveal a victory point card
    pub fn play_victory_point(&mut self, player: PlayerId) -> Result<(), GameError> {
        let index = self.index_of(player)?;
        self.players[index].points += 1;
        Ok(())
    }

    // ==================== Trading ====================

    /// Swap resources between two players; both sides must be covered
    pub fn execute_trade(&mut self, offer: &TradeOffer) -> Result<(), GameError> {
        let (from, to) = self.pair_mut(offer.from, offer.to)?;
        from.trade_with(to, &offer.offering, &offer.requesting)
    }

    /// Give resources to another player
    pub fn transfer(&mut self, giver: PlayerId, receiver: PlayerId, amounts: &ResourceHand) -> Result<(), GameError> {
        let (giver, receiver) = self.pair_mut(giver, receiver)?;
        giver.transfer_to(receiver, amounts)
    }

    /// Trade `ratio` of one resource for one of another with the bank
    pub fn maritime_trade(&mut self, player: PlayerId, give: Resource, take: Resource, ratio: u32) -> Result<(), GameError> {
        let index = self.index_of(player)?;
        self.players[index].maritime_trade(give, take, ratio, &mut self.bank)
    }

    // ==================== Turn Management ====================

    /// Settle both trophies and pass play to the next player
    pub fn end_turn(&mut self, player: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        self.index_of(player)?;

        let mut events = Vec::new();
        events.extend(self.evaluate_trophy(TrophyKind::LongestRoad));
        events.extend(self.evaluate_trophy(TrophyKind::LargestArmy));

        let count = self.players.len() as u32;
        let next_player = ((u32::from(player) + 1) % count) as PlayerId;
        if next_player == 0 {
            self.round += 1;
        }
        self.current_player = next_player;
        self.dice_roll = None;

        tracing::debug!(player, next_player, round = self.round, "Turn ended");
        events.push(GameEvent::TurnEnded {
            player,
            next_player,
            round: self.round,
        });
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Corner, Hex};
    use crate::trophy::TrophyState;
    use pretty_assertions::assert_eq;

    fn game() -> GameState {
        GameState::with_rng(GameConfig::default(), StdRng::seed_from_u64(42)).unwrap()
    }

    /// A simple trail of `len` edges starting at `start`
    fn trail(board: &Board, start: CornerId, len: usize) -> Vec<EdgeId> {
        let mut visited = vec![start];
        let mut edges = Vec::new();
        let mut at = start;
        while edges.len() < len {
            let next = board
                .edges_at(at)
                .find_map(|e| e.other_end(at).filter(|c| !visited.contains(c)).map(|c| (e.id, c)))
                .unwrap();
            edges.push(next.0);
            visited.push(next.1);
            at = next.1;
        }
        edges
    }

    /// Give `player` resources out of the bank
    fn fund(game: &mut GameState, player: PlayerId, hand: ResourceHand) {
        game.bank.withdraw(&hand).unwrap();
        game.players[player as usize].resources.add_hand(&hand);
    }

    /// Corners 0..=6 on one hex in a line, edges i joining i and i + 1
    fn line_board() -> Board {
        let hexes = vec![Hex::desert(0)];
        let corners = (0..7).map(|id| Corner::new(id, vec![0])).collect();
        let edges = (0..6).map(|id| Edge::new(id, id, id + 1)).collect();
        Board::from_parts(hexes, corners, edges).unwrap()
    }

    #[test]
    fn test_new_game_starts_empty() {
        let game = game();

        assert_eq!(game.player_count(), 4);
        assert_eq!(game.round, 1);
        assert_eq!(game.current_player, 0);
        assert_eq!(game.bank.resources(), &ResourceHand::uniform(19));
        assert_eq!(game.bank.deck_len(), 25);
        for player in &game.players {
            assert!(player.resources.is_empty());
            assert_eq!(player.points, 0);
        }
        assert_eq!(game.longest_road.owner(), None);
        assert_eq!(game.largest_army.owner(), None);
    }

    #[test]
    fn test_invalid_player_count() {
        for player_count in [0, 1, 5] {
            let config = GameConfig {
                player_count,
                ..GameConfig::default()
            };
            assert!(matches!(GameState::new(config), Err(GameError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_seeded_games_match() {
        let config = GameConfig {
            seed: Some(9),
            ..GameConfig::default()
        };
        let mut a = GameState::new(config.clone()).unwrap();
        let mut b = GameState::new(config).unwrap();

        assert_eq!(a.board.hexes(), b.board.hexes());
        assert_eq!(a.roll_dice(), b.roll_dice());
    }

    #[test]
    fn test_dice_in_range() {
        let mut game = game();
        for _ in 0..200 {
            let (a, b) = game.roll_dice();
            assert!((1..=6).contains(&a) && (1..=6).contains(&b));
        }
    }

    #[test]
    fn test_build_settlement_pays_and_scores() {
        let mut game = game();
        fund(&mut game, 0, costs::settlement());

        let events = game.build_settlement_or_city(0, 10).unwrap();

        assert_eq!(events, vec![GameEvent::SettlementBuilt { player: 0, corner: 10 }]);
        assert_eq!(game.board.corner(10).unwrap().owner, Some(0));
        assert_eq!(game.players[0].points, 1);
        assert!(game.players[0].resources.is_empty());
        assert_eq!(game.bank.available(Resource::Sheep), 19);
    }

    #[test]
    fn test_build_settlement_unaffordable_changes_nothing() {
        let mut game = game();
        fund(&mut game, 0, ResourceHand::with_amounts(1, 1, 0, 1, 0));
        let bank = game.bank.clone();

        let result = game.build_settlement_or_city(0, 10);

        assert_eq!(result, Err(GameError::InsufficientResources));
        assert_eq!(game.board.corner(10).unwrap().owner, None);
        assert_eq!(game.players[0].points, 0);
        assert_eq!(game.players[0].resources, ResourceHand::with_amounts(1, 1, 0, 1, 0));
        assert_eq!(game.bank, bank);
    }

    #[test]
    fn test_upgrade_to_city() {
        let mut game = game();
        fund(&mut game, 1, costs::settlement());
        fund(&mut game, 1, costs::city());
        game.build_settlement_or_city(1, 30).unwrap();

        let events = game.build_settlement_or_city(1, 30).unwrap();

        assert_eq!(events, vec![GameEvent::CityBuilt { player: 1, corner: 30 }]);
        assert!(game.board.corner(30).unwrap().is_city);
        assert_eq!(game.players[1].points, 2);

        fund(&mut game, 1, costs::city());
        assert!(matches!(
            game.build_settlement_or_city(1, 30),
            Err(GameError::IllegalBuild(_))
        ));
    }

    #[test]
    fn test_cannot_build_on_opponent_corner() {
        let mut game = game();
        fund(&mut game, 0, costs::settlement());
        game.build_settlement_or_city(0, 5).unwrap();

        fund(&mut game, 1, ResourceHand::uniform(5));
        assert!(matches!(
            game.build_settlement_or_city(1, 5),
            Err(GameError::IllegalBuild(_))
        ));
        assert_eq!(game.players[1].resources, ResourceHand::uniform(5));
    }

    #[test]
    fn test_unknown_ids() {
        let mut game = game();
        assert_eq!(game.build_settlement_or_city(9, 0), Err(GameError::PlayerNotFound(9)));
        assert_eq!(game.build_settlement_or_city(0, 54), Err(GameError::CornerNotFound(54)));
        assert_eq!(game.build_road(0, 72, true), Err(GameError::EdgeNotFound(72)));
        assert_eq!(game.play_knight(0, 19), Err(GameError::HexNotFound(19)));
    }

    #[test]
    fn test_build_road_rules() {
        let mut game = game();
        fund(&mut game, 0, costs::settlement());
        game.build_settlement_or_city(0, 20).unwrap();

        let edge = game.board.edges_at(20).next().unwrap().id;
        let far = game.board.edges().iter().find(|e| !e.touches(20) && e.owner.is_none()).unwrap().id;

        // No resources
        assert_eq!(game.build_road(0, edge, false), Err(GameError::InsufficientResources));

        fund(&mut game, 0, costs::road());
        assert_eq!(game.build_road(0, far, false), Err(GameError::Disconnected));
        assert_eq!(game.players[0].resources, costs::road());

        let events = game.build_road(0, edge, false).unwrap();
        assert_eq!(events, vec![GameEvent::RoadBuilt { player: 0, edge }]);
        assert!(game.players[0].resources.is_empty());
        assert_eq!(game.players[0].longest_road, 1);

        assert!(matches!(game.build_road(0, edge, true), Err(GameError::IllegalBuild(_))));
    }

    #[test]
    fn test_free_road_costs_nothing() {
        let mut game = game();
        fund(&mut game, 2, costs::settlement());
        game.build_settlement_or_city(2, 40).unwrap();

        let edge = game.board.edges_at(40).next().unwrap().id;
        game.build_road(2, edge, true).unwrap();

        assert_eq!(game.board.edge(edge).unwrap().owner, Some(2));
        assert_eq!(game.bank.available(Resource::Wood), 19);
    }

    #[test]
    fn test_longest_road_trophy_awarded_inline() {
        let mut game = game();
        fund(&mut game, 0, costs::settlement());
        game.build_settlement_or_city(0, 0).unwrap();

        let edges = trail(&game.board, 0, 5);
        for &edge in &edges[..4] {
            game.build_road(0, edge, true).unwrap();
        }
        assert_eq!(game.longest_road.owner(), None);

        let events = game.build_road(0, edges[4], true).unwrap();
        assert!(events.contains(&GameEvent::LongestRoadChanged {
            previous: None,
            current: 0,
            length: 5,
        }));
        assert_eq!(game.players[0].points, 3);
    }

    #[test]
    fn test_settlement_cuts_opponent_road() {
        let mut game = game();
        game.board = line_board();
        for edge in 0..6 {
            game.board.claim_edge(edge, 0);
        }
        game.refresh_longest_roads();
        game.evaluate_trophy(TrophyKind::LongestRoad);
        assert_eq!(game.longest_road.owner(), Some(0));
        assert_eq!(game.players[0].points, 2);

        fund(&mut game, 1, costs::settlement());
        game.build_settlement_or_city(1, 3).unwrap();

        assert_eq!(game.players[0].longest_road, 3);
        // Holder keeps the trophy, but a challenger still needs five roads
        assert_eq!(game.longest_road.owner(), Some(0));
        assert_eq!(game.longest_road.state(), TrophyState::Held { owner: 0, value: 3 });
        assert_eq!(game.longest_road.threshold(), 4);
    }

    #[test]
    fn test_play_knight_steals_from_neighbour() {
        let mut game = game();
        let hex = game.board.hexes().iter().find(|h| !h.has_robber).unwrap().id;
        let corner = game.board.corners_adjacent_to_hex(hex)[0].id;
        game.board.claim_corner(corner, 1);
        fund(&mut game, 1, ResourceHand::single(Resource::Ore, 1));

        let events = game.play_knight(0, hex).unwrap();

        assert_eq!(game.board.robber_hex(), Some(hex));
        assert_eq!(game.players[0].resources, ResourceHand::single(Resource::Ore, 1));
        assert!(game.players[1].resources.is_empty());
        assert_eq!(game.players[0].knights_played, 1);
        assert!(events.contains(&GameEvent::ResourceStolen {
            thief: 0,
            victim: 1,
            resource: Some(Resource::Ore),
        }));

        assert_eq!(game.play_knight(0, hex), Err(GameError::IllegalRobberMove));
        assert_eq!(game.players[0].knights_played, 1);
    }

    #[test]
    fn test_knight_never_robs_self() {
        let mut game = game();
        let hex = game.board.hexes().iter().find(|h| !h.has_robber).unwrap().id;
        let corner = game.board.corners_adjacent_to_hex(hex)[0].id;
        game.board.claim_corner(corner, 0);
        fund(&mut game, 0, ResourceHand::uniform(1));

        let events = game.play_knight(0, hex).unwrap();

        assert_eq!(game.players[0].resources, ResourceHand::uniform(1));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::ResourceStolen { .. })));
        assert_eq!(game.players[0].knights_played, 1);
    }

    #[test]
    fn test_largest_army_after_third_knight() {
        let mut game = game();
        let targets: Vec<HexId> = game.board.hexes().iter().filter(|h| !h.has_robber).map(|h| h.id).take(3).collect();

        for &hex in &targets[..2] {
            game.play_knight(3, hex).unwrap();
        }
        assert_eq!(game.largest_army.owner(), None);

        let events = game.play_knight(3, targets[2]).unwrap();
        assert!(events.contains(&GameEvent::LargestArmyChanged {
            previous: None,
            current: 3,
            knights: 3,
        }));
        assert_eq!(game.players[3].points, 2);
    }

    #[test]
    fn test_year_of_plenty() {
        let mut game = game();
        game.play_year_of_plenty(0, Resource::Wood, Resource::Ore).unwrap();

        assert_eq!(game.players[0].resources, ResourceHand::with_amounts(0, 1, 1, 0, 0));
        assert_eq!(game.bank.available(Resource::Wood), 18);
        assert_eq!(game.bank.available(Resource::Ore), 18);
    }

    #[test]
    fn test_year_of_plenty_same_resource_needs_two() {
        let config = GameConfig {
            bank_stock: 1,
            ..GameConfig::default()
        };
        let mut game = GameState::with_rng(config, StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(
            game.play_year_of_plenty(0, Resource::Wheat, Resource::Wheat),
            Err(GameError::BankDepleted)
        );
        assert!(game.players[0].resources.is_empty());

        game.play_year_of_plenty(0, Resource::Wheat, Resource::Sheep).unwrap();
        assert_eq!(
            game.play_year_of_plenty(0, Resource::Wheat, Resource::Brick),
            Err(GameError::BankDepleted)
        );
    }

    #[test]
    fn test_monopoly_collects_everything() {
        let mut game = game();
        fund(&mut game, 0, ResourceHand::single(Resource::Sheep, 1));
        fund(&mut game, 1, ResourceHand::with_amounts(0, 0, 0, 0, 3));
        fund(&mut game, 2, ResourceHand::with_amounts(2, 0, 0, 0, 4));

        let total = game.play_monopoly(0, Resource::Sheep).unwrap();

        assert_eq!(total, 7);
        assert_eq!(game.players[0].resources.get(Resource::Sheep), 8);
        assert_eq!(game.players[1].resources.get(Resource::Sheep), 0);
        assert_eq!(game.players[2].resources, ResourceHand::single(Resource::Brick, 2));
    }

    #[test]
    fn test_small_hand_ignores_seven() {
        let mut game = game();
        fund(&mut game, 0, ResourceHand::with_amounts(3, 4, 0, 0, 0));

        assert_eq!(game.handle_seven_roll(0, &ResourceHand::new()), Ok(0));
        assert_eq!(game.players[0].resources.total(), 7);
    }

    #[test]
    fn test_buy_development_card() {
        let mut game = game();
        fund(&mut game, 0, costs::development_card());

        let card = game.buy_development_card(0).unwrap();

        assert_eq!(game.players[0].cards, vec![card]);
        assert!(game.players[0].resources.is_empty());
        assert_eq!(game.bank.deck_len(), 24);
        assert_eq!(game.buy_development_card(0), Err(GameError::InsufficientResources));
    }

    #[test]
    fn test_card_play_requires_card() {
        let mut game = game();
        assert_eq!(
            game.apply_action(0, GameAction::PlayMonopoly(Resource::Ore)),
            Err(GameError::NoSuchCard)
        );
        assert_eq!(game.apply_action(0, GameAction::PlayVictoryPoint), Err(GameError::NoSuchCard));
    }

    #[test]
    fn test_failed_card_effect_keeps_card() {
        let mut game = game();
        let robber = game.board.robber_hex().unwrap();
        game.players[0].cards.push(DevelopmentCard::Knight);

        assert_eq!(
            game.apply_action(0, GameAction::PlayKnight(robber)),
            Err(GameError::IllegalRobberMove)
        );
        assert_eq!(game.players[0].cards, vec![DevelopmentCard::Knight]);

        let target = (robber + 1) % 19;
        game.apply_action(0, GameAction::PlayKnight(target)).unwrap();
        assert!(game.players[0].cards.is_empty());
    }

    #[test]
    fn test_victory_point_card() {
        let mut game = game();
        game.players[2].cards.push(DevelopmentCard::VictoryPoint);

        let events = game.apply_action(2, GameAction::PlayVictoryPoint).unwrap();

        assert_eq!(events, vec![GameEvent::VictoryPointPlayed { player: 2 }]);
        assert_eq!(game.players[2].points, 1);
        assert!(game.players[2].cards.is_empty());
    }

    #[test]
    fn test_road_building_through_first_road() {
        let mut game = game();
        fund(&mut game, 0, costs::settlement());
        game.build_settlement_or_city(0, 12).unwrap();
        game.players[0].cards.push(DevelopmentCard::RoadBuilding);

        let edges = trail(&game.board, 12, 2);
        // Second edge listed first: it only connects through the other one
        let events = game
            .apply_action(0, GameAction::PlayRoadBuilding(edges[1], edges[0]))
            .unwrap();

        assert_eq!(events[0], GameEvent::RoadBuildingPlayed { player: 0 });
        assert_eq!(game.players[0].longest_road, 2);
        assert!(game.players[0].cards.is_empty());
    }

    #[test]
    fn test_road_building_rejects_disconnected_pair() {
        let mut game = game();
        fund(&mut game, 0, costs::settlement());
        game.build_settlement_or_city(0, 12).unwrap();

        let edges = trail(&game.board, 12, 3);
        assert_eq!(
            game.play_road_building(0, edges[0], edges[2]),
            Err(GameError::Disconnected)
        );
        assert!(game.board.edges_owned_by(0).is_empty());
        assert!(matches!(
            game.play_road_building(0, edges[0], edges[0]),
            Err(GameError::IllegalBuild(_))
        ));
    }

    #[test]
    fn test_execute_trade() {
        let mut game = game();
        fund(&mut game, 0, ResourceHand::single(Resource::Wood, 2));
        fund(&mut game, 1, ResourceHand::single(Resource::Brick, 1));
        let offer = TradeOffer::new(
            0,
            1,
            ResourceHand::single(Resource::Wood, 2),
            ResourceHand::single(Resource::Brick, 1),
        );

        // Only the offering player may submit it
        assert_eq!(game.apply_action(1, GameAction::Trade(offer.clone())), Err(GameError::InvalidTrade));

        game.apply_action(0, GameAction::Trade(offer)).unwrap();
        assert_eq!(game.players[0].resources, ResourceHand::single(Resource::Brick, 1));
        assert_eq!(game.players[1].resources, ResourceHand::single(Resource::Wood, 2));
    }

    #[test]
    fn test_transfer_conserves_resources() {
        let mut game = game();
        fund(&mut game, 2, ResourceHand::with_amounts(1, 0, 2, 0, 3));
        let totals = |game: &GameState| {
            let mut totals = *game.bank.resources();
            for player in &game.players {
                totals.add_hand(&player.resources);
            }
            totals
        };
        let before = totals(&game);

        game.transfer(2, 0, &ResourceHand::with_amounts(1, 0, 2, 0, 0)).unwrap();

        assert_eq!(game.players[0].resources, ResourceHand::with_amounts(1, 0, 2, 0, 0));
        assert_eq!(game.players[2].resources, ResourceHand::single(Resource::Sheep, 3));
        assert_eq!(totals(&game), before);

        assert_eq!(
            game.transfer(2, 0, &ResourceHand::single(Resource::Sheep, 4)),
            Err(GameError::InsufficientResources)
        );
        assert_eq!(game.players[2].resources, ResourceHand::single(Resource::Sheep, 3));
        assert_eq!(totals(&game), before);
    }

    #[test]
    fn test_trade_with_self_rejected() {
        let mut game = game();
        let offer = TradeOffer::new(0, 0, ResourceHand::new(), ResourceHand::new());
        assert_eq!(game.execute_trade(&offer), Err(GameError::InvalidTrade));
        assert_eq!(
            game.transfer(0, 7, &ResourceHand::new()),
            Err(GameError::PlayerNotFound(7))
        );
    }

    #[test]
    fn test_maritime_trade_action() {
        let mut game = game();
        fund(&mut game, 1, ResourceHand::single(Resource::Wheat, 4));

        game.apply_action(
            1,
            GameAction::MaritimeTrade {
                give: Resource::Wheat,
                give_count: 4,
                receive: Resource::Brick,
            },
        )
        .unwrap();

        assert_eq!(game.players[1].resources, ResourceHand::single(Resource::Brick, 1));
    }

    #[test]
    fn test_end_turn_advances_round() {
        let mut game = GameState::with_rng(
            GameConfig {
                player_count: 3,
                ..GameConfig::default()
            },
            StdRng::seed_from_u64(3),
        )
        .unwrap();

        game.end_turn(0).unwrap();
        game.end_turn(1).unwrap();
        assert_eq!((game.current_player, game.round), (2, 1));

        let events = game.end_turn(2).unwrap();
        assert_eq!((game.current_player, game.round), (0, 2));
        assert_eq!(
            events.last(),
            Some(&GameEvent::TurnEnded {
                player: 2,
                next_player: 0,
                round: 2,
            })
        );
    }

    #[test]
    fn test_roll_action_reports_dice() {
        let mut game = game();
        let events = game.apply_action(0, GameAction::RollDice).unwrap();

        let Some(GameEvent::DiceRolled { roll, total, .. }) = events.first() else {
            panic!("expected a dice event, got {:?}", events);
        };
        assert_eq!(*total, roll.0 + roll.1);
        assert_eq!(game.dice_roll, Some(*roll));
    }
}
