//! Snapshot serialization — point-in-time game state for rendering.
//!
//! A snapshot is an owned copy. Hosts render it, ship it as JSON, or keep
//! it around; none of that can reach back into the live game.

use crate::{
    config::Difficulty,
    game::{Game, GameStatus, Leak, Outcome},
    types::{Turn, UserId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub status:     GameStatus,
    pub outcome:    Option<Outcome>,
    pub difficulty: Difficulty,
    pub captain_id: UserId,
    pub turn:       Turn,
    pub hull:       i32,
    pub water:      i32,
    pub pumps:      i32,
    pub morale:     i32,
    pub crew:       Vec<UserId>,
    pub leaks:      Vec<Leak>,
    pub log:        Vec<String>,
}

impl GameSnapshot {
    /// Unpatched leaks, in the order they opened.
    pub fn active_leaks(&self) -> impl Iterator<Item = &Leak> {
        self.leaks.iter().filter(|l| !l.patched)
    }

    /// The most recent `n` log lines, oldest first.
    pub fn log_tail(&self, n: usize) -> &[String] {
        &self.log[self.log.len().saturating_sub(n)..]
    }
}

impl From<&Game> for GameSnapshot {
    fn from(game: &Game) -> Self {
        Self {
            status:     game.status(),
            outcome:    game.outcome(),
            difficulty: game.difficulty(),
            captain_id: game.captain_id().to_string(),
            turn:       game.turn(),
            hull:       game.hull(),
            water:      game.water(),
            pumps:      game.pumps(),
            morale:     game.morale(),
            crew:       game.crew().to_vec(),
            leaks:      game.leaks().to_vec(),
            log:        game.log().to_vec(),
        }
    }
}

impl Game {
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::from(self)
    }
}
