//! The single hosted game and its lock.

use settlers_core::{CornerId, GameConfig, GameError, GameEvent, GameState, Player, PlayerId};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

/// One game, shared by every request.
///
/// Every call holds the lock for its whole duration, so operations on the
/// game never interleave.
pub struct GameSession {
    game: Mutex<GameState>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let game = GameState::new(config)?;
        info!(players = game.player_count(), "Game session created");
        Ok(Self {
            game: Mutex::new(game),
        })
    }

    fn lock(&self) -> MutexGuard<'_, GameState> {
        // Game operations never leave a partial update, so poisoning carries no information
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the game
    pub fn with_game<T>(&self, f: impl FnOnce(&mut GameState) -> T) -> T {
        f(&mut self.lock())
    }

    /// Roll the dice, pay out production and report every player
    pub fn roll(&self) -> (u8, Vec<Player>) {
        self.with_game(|game| {
            let roll = game.roll();
            info!(roll, "Dice rolled");
            (roll, game.players.clone())
        })
    }

    pub fn build_settlement(&self, player: PlayerId, corner: CornerId) -> Result<Vec<GameEvent>, GameError> {
        self.with_game(|game| game.build_settlement_or_city(player, corner))
    }

    /// Serialize the whole game
    pub fn snapshot(&self) -> Result<serde_json::Value, serde_json::Error> {
        self.with_game(|game| serde_json::to_value(&*game))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settlers_core::costs;

    fn session() -> GameSession {
        GameSession::new(GameConfig {
            seed: Some(1),
            ..GameConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_roll_reports_all_players() {
        let session = session();
        let (roll, players) = session.roll();

        assert!((2..=12).contains(&roll));
        assert_eq!(players.len(), 4);
        assert!(session.with_game(|g| g.dice_roll.is_some()));
    }

    #[test]
    fn test_build_goes_through_lock() {
        let session = session();
        assert_eq!(session.build_settlement(0, 3), Err(GameError::InsufficientResources));

        session.with_game(|g| {
            g.bank.withdraw(&costs::settlement()).unwrap();
            g.players[0].resources = costs::settlement();
        });
        session.build_settlement(0, 3).unwrap();

        let owner = session.with_game(|g| g.board.corner(3).map(|c| c.owner));
        assert_eq!(owner, Ok(Some(0)));
    }

    #[test]
    fn test_snapshot_has_players() {
        let snapshot = session().snapshot().unwrap();
        assert_eq!(snapshot["players"][2]["id"], 2);
        assert_eq!(snapshot["round"], 1);
    }
}
