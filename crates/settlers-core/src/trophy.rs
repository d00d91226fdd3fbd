//! Longest Road and Largest Army trophies.
//!
//! Each trophy is either unclaimed or held by one player together with the
//! holder's current statistic. A challenger takes it only by strictly
//! exceeding the threshold; ties never move it.

use crate::board::PlayerId;
use crate::player::Player;
use serde::{Deserialize, Serialize};

/// Points a trophy is worth
pub const TROPHY_POINTS: u32 = 2;

/// Minimum road length for Longest Road
const MIN_LONGEST_ROAD: u32 = 5;

/// Minimum knights for Largest Army
const MIN_LARGEST_ARMY: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrophyKind {
    LongestRoad,
    LargestArmy,
}

impl TrophyKind {
    /// Smallest statistic that can claim an unclaimed trophy
    pub fn minimum(self) -> u32 {
        match self {
            TrophyKind::LongestRoad => MIN_LONGEST_ROAD,
            TrophyKind::LargestArmy => MIN_LARGEST_ARMY,
        }
    }

    /// The statistic this trophy is awarded for
    pub fn stat(self, player: &Player) -> u32 {
        match self {
            TrophyKind::LongestRoad => player.longest_road,
            TrophyKind::LargestArmy => player.knights_played,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TrophyState {
    Unclaimed,
    Held { owner: PlayerId, value: u32 },
}

/// A trophy changing hands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrophyTransfer {
    pub kind: TrophyKind,
    pub previous: Option<PlayerId>,
    pub current: PlayerId,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trophy {
    kind: TrophyKind,
    #[serde(flatten)]
    state: TrophyState,
}

impl Trophy {
    pub fn new(kind: TrophyKind) -> Self {
        Self {
            kind,
            state: TrophyState::Unclaimed,
        }
    }

    pub fn longest_road() -> Self {
        Self::new(TrophyKind::LongestRoad)
    }

    pub fn largest_army() -> Self {
        Self::new(TrophyKind::LargestArmy)
    }

    pub fn kind(&self) -> TrophyKind {
        self.kind
    }

    pub fn state(&self) -> TrophyState {
        self.state
    }

    pub fn owner(&self) -> Option<PlayerId> {
        match self.state {
            TrophyState::Unclaimed => None,
            TrophyState::Held { owner, .. } => Some(owner),
        }
    }

    /// The value a challenger must strictly exceed.
    ///
    /// Never below the claim minimum, even when the holder has dropped under it.
    pub fn threshold(&self) -> u32 {
        let floor = self.kind.minimum() - 1;
        match self.state {
            TrophyState::Unclaimed => floor,
            TrophyState::Held { value, .. } => value.max(floor),
        }
    }

    /// Re-evaluate the trophy against every player's current statistic.
    ///
    /// The holder's stored value is refreshed first. The best challenger then
    /// takes the trophy if they strictly exceed the threshold and nobody else
    /// shares their statistic. Points move with the trophy.
    pub fn evaluate(&mut self, players: &mut [Player]) -> Option<TrophyTransfer> {
        let kind = self.kind;
        let holder = self.owner();

        if let TrophyState::Held { owner, value } = &mut self.state {
            if let Some(p) = players.iter().find(|p| p.id == *owner) {
                *value = kind.stat(p);
            }
        }

        let threshold = self.threshold();
        let mut best = threshold;
        let mut leaders: Vec<PlayerId> = Vec::new();
        for player in players.iter().filter(|p| Some(p.id) != holder) {
            let stat = kind.stat(player);
            if stat > best {
                best = stat;
                leaders = vec![player.id];
            } else if stat == best && stat > threshold {
                leaders.push(player.id);
            }
        }

        let &[challenger] = leaders.as_slice() else {
            return None;
        };

        for player in players.iter_mut() {
            if Some(player.id) == holder {
                player.points = player.points.saturating_sub(TROPHY_POINTS);
            }
            if player.id == challenger {
                player.points += TROPHY_POINTS;
            }
        }
        self.state = TrophyState::Held {
            owner: challenger,
            value: best,
        };

        tracing::info!(?kind, ?holder, new_holder = challenger, value = best, "Trophy changed hands");

        Some(TrophyTransfer {
            kind,
            previous: holder,
            current: challenger,
            value: best,
        })
    }
}
