//! Game actions that players can take.
//!
//! This module defines every operation that can be dispatched through
//! `GameState::apply_action` and the events that result from them.

use crate::board::{CornerId, EdgeId, HexId, PlayerId, Resource};
use crate::player::{DevelopmentCard, ResourceHand};
use crate::trophy::{TrophyKind, TrophyTransfer};
use serde::{Deserialize, Serialize};

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    // ==================== Turn Actions ====================
    /// Roll the dice and distribute production
    RollDice,
    /// Discard half of a large hand after a seven
    DiscardCards(ResourceHand),

    // ==================== Building Actions ====================
    /// Build a settlement on an empty corner, or upgrade an own settlement to a city
    BuildSettlementOrCity(CornerId),
    /// Build a road at an edge
    BuildRoad(EdgeId),
    /// Buy a development card from the deck
    BuyDevelopmentCard,

    // ==================== Development Card Actions ====================
    /// Play a knight card: move robber to the hex, steal, count toward largest army
    PlayKnight(HexId),
    /// Play road building card (build 2 free roads)
    PlayRoadBuilding(EdgeId, EdgeId),
    /// Play year of plenty (take 2 resources from bank)
    PlayYearOfPlenty(Resource, Resource),
    /// Play monopoly (take all of one resource from all players)
    PlayMonopoly(Resource),
    /// Reveal a victory point card
    PlayVictoryPoint,

    // ==================== Trading Actions ====================
    /// Swap resources with another player
    Trade(TradeOffer),
    /// Trade with the bank at the given ratio
    MaritimeTrade {
        give: Resource,
        give_count: u32,
        receive: Resource,
    },

    // ==================== Turn Management ====================
    /// End your turn
    EndTurn,
}

/// A two-sided trade between players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    /// Player making the offer
    pub from: PlayerId,
    /// Player accepting it
    pub to: PlayerId,
    /// Resources `from` gives
    pub offering: ResourceHand,
    /// Resources `to` gives back
    pub requesting: ResourceHand,
}

impl TradeOffer {
    /// Create a new trade offer
    pub fn new(from: PlayerId, to: PlayerId, offering: ResourceHand, requesting: ResourceHand) -> Self {
        Self {
            from,
            to,
            offering,
            requesting,
        }
    }
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled {
        player: PlayerId,
        roll: (u8, u8),
        total: u8,
    },

    /// Resources were distributed after a dice roll
    ResourcesDistributed {
        distributions: Vec<(PlayerId, Resource, u32)>,
    },

    /// A settlement was built
    SettlementBuilt { player: PlayerId, corner: CornerId },

    /// A settlement was upgraded to a city
    CityBuilt { player: PlayerId, corner: CornerId },

    /// A road was built
    RoadBuilt { player: PlayerId, edge: EdgeId },

    /// A development card was purchased
    DevelopmentCardPurchased {
        player: PlayerId,
        card: DevelopmentCard,
    },

    /// A knight was played
    KnightPlayed { player: PlayerId },

    /// Road building card was played
    RoadBuildingPlayed { player: PlayerId },

    /// Year of plenty card was played
    YearOfPlentyPlayed {
        player: PlayerId,
        resources: (Resource, Resource),
    },

    /// Monopoly card was played
    MonopolyPlayed {
        player: PlayerId,
        resource: Resource,
        total_stolen: u32,
    },

    /// A victory point card was revealed
    VictoryPointPlayed { player: PlayerId },

    /// The robber was moved
    RobberMoved {
        player: PlayerId,
        from: Option<HexId>,
        to: HexId,
    },

    /// A resource was stolen
    ResourceStolen {
        thief: PlayerId,
        victim: PlayerId,
        resource: Option<Resource>,
    },

    /// Player had to discard cards
    CardsDiscarded { player: PlayerId, count: u32 },

    /// A trade was completed
    TradeCompleted { player1: PlayerId, player2: PlayerId },

    /// Maritime trade completed
    MaritimeTradeCompleted {
        player: PlayerId,
        gave: Resource,
        gave_count: u32,
        received: Resource,
    },

    /// Longest road changed hands
    LongestRoadChanged {
        previous: Option<PlayerId>,
        current: PlayerId,
        length: u32,
    },

    /// Largest army changed hands
    LargestArmyChanged {
        previous: Option<PlayerId>,
        current: PlayerId,
        knights: u32,
    },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
        round: u32,
    },
}

impl From<TrophyTransfer> for GameEvent {
    fn from(transfer: TrophyTransfer) -> Self {
        match transfer.kind {
            TrophyKind::LongestRoad => GameEvent::LongestRoadChanged {
                previous: transfer.previous,
                current: transfer.current,
                length: transfer.value,
            },
            TrophyKind::LargestArmy => GameEvent::LargestArmyChanged {
                previous: transfer.previous,
                current: transfer.current,
                knights: transfer.value,
            },
        }
    }
}
