//! The per-channel game record.
//!
//! Fields are crate-private: only the engine mutates a game, and every
//! resource write goes through `adjust`, which clamps immediately.

use crate::{
    config::{Difficulty, DifficultyParams},
    event::GameEvent,
    types::{clamp_resource, LeakId, Turn, UserId},
};
use serde::{Deserialize, Serialize};

pub const INITIAL_HULL: i32 = 100;
pub const INITIAL_WATER: i32 = 0;
pub const INITIAL_PUMPS: i32 = 75;
pub const INITIAL_MORALE: i32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Running,
    Ended,
}

/// How an ended game finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Lost,
    Saved,
    Abandoned,
    EndedByCaptain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Hull,
    Water,
    Pumps,
    Morale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leak {
    pub id: LeakId,
    pub location: String,
    /// Water inflow per tick while unpatched.
    pub rate: i32,
    pub patched: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Game {
    pub(crate) status:     GameStatus,
    pub(crate) outcome:    Option<Outcome>,
    pub(crate) difficulty: Difficulty,
    pub(crate) params:     DifficultyParams,
    pub(crate) captain_id: UserId,
    pub(crate) turn:       Turn,
    pub(crate) hull:       i32,
    pub(crate) water:      i32,
    pub(crate) pumps:      i32,
    pub(crate) morale:     i32,
    pub(crate) crew:       Vec<UserId>,
    pub(crate) leaks:      Vec<Leak>,
    pub(crate) log:        Vec<String>,
}

impl Game {
    pub(crate) fn new(
        difficulty: Difficulty,
        params: DifficultyParams,
        captain_id: UserId,
        first_leak: Leak,
    ) -> Self {
        let mut game = Self {
            status:     GameStatus::Running,
            outcome:    None,
            difficulty,
            params,
            crew:       vec![captain_id.clone()],
            captain_id,
            turn:       0,
            hull:       INITIAL_HULL,
            water:      INITIAL_WATER,
            pumps:      INITIAL_PUMPS,
            morale:     INITIAL_MORALE,
            leaks:      vec![first_leak],
            log:        Vec::new(),
        };
        game.record(&GameEvent::Launched);
        game
    }

    // ── Read access ────────────────────────────────

    pub fn status(&self) -> GameStatus { self.status }
    pub fn outcome(&self) -> Option<Outcome> { self.outcome }
    pub fn difficulty(&self) -> Difficulty { self.difficulty }
    pub fn params(&self) -> &DifficultyParams { &self.params }
    pub fn captain_id(&self) -> &str { &self.captain_id }
    pub fn turn(&self) -> Turn { self.turn }
    pub fn hull(&self) -> i32 { self.hull }
    pub fn water(&self) -> i32 { self.water }
    pub fn pumps(&self) -> i32 { self.pumps }
    pub fn morale(&self) -> i32 { self.morale }
    pub fn crew(&self) -> &[UserId] { &self.crew }
    pub fn leaks(&self) -> &[Leak] { &self.leaks }
    pub fn log(&self) -> &[String] { &self.log }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    pub fn is_crew(&self, user_id: &str) -> bool {
        self.crew.iter().any(|c| c == user_id)
    }

    /// Unpatched leaks, in the order they opened.
    pub fn active_leaks(&self) -> impl Iterator<Item = &Leak> {
        self.leaks.iter().filter(|l| !l.patched)
    }

    pub fn all_leaks_patched(&self) -> bool {
        self.leaks.iter().all(|l| l.patched)
    }

    /// Total water inflow per tick from unpatched leaks.
    pub fn inflow(&self) -> i32 {
        self.active_leaks().map(|l| l.rate).sum()
    }

    /// The most recent `n` log lines, oldest first.
    pub fn log_tail(&self, n: usize) -> &[String] {
        &self.log[self.log.len().saturating_sub(n)..]
    }

    // ── Mutation (engine only) ─────────────────────

    /// Apply a delta to one pool, clamped to [0, 100] on the spot.
    /// Returns the change actually applied.
    pub(crate) fn adjust(&mut self, resource: Resource, delta: i32) -> i32 {
        let slot = match resource {
            Resource::Hull   => &mut self.hull,
            Resource::Water  => &mut self.water,
            Resource::Pumps  => &mut self.pumps,
            Resource::Morale => &mut self.morale,
        };
        let before = *slot;
        *slot = clamp_resource(before.saturating_add(delta));
        *slot - before
    }

    /// Ids are never reused, even once leaks are patched.
    pub(crate) fn next_leak_id(&self) -> LeakId {
        self.leaks.iter().map(|l| l.id).max().unwrap_or(0) + 1
    }

    /// Append the event's narrative to the log.
    pub(crate) fn record(&mut self, event: &GameEvent) {
        self.log.push(event.narrative());
    }

    pub(crate) fn finish(&mut self, outcome: Outcome) {
        self.status = GameStatus::Ended;
        self.outcome = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::new(
            Difficulty::Normal,
            DifficultyParams::NORMAL,
            "cap".into(),
            Leak { id: 1, location: "Engine room".into(), rate: 5, patched: false },
        )
    }

    #[test]
    fn adjust_clamps_both_ends() {
        let mut g = game();
        assert_eq!(g.adjust(Resource::Hull, 25), 0);
        assert_eq!(g.hull(), 100);
        assert_eq!(g.adjust(Resource::Water, -10), 0);
        assert_eq!(g.water(), 0);
        assert_eq!(g.adjust(Resource::Morale, -500), -80);
        assert_eq!(g.morale(), 0);
    }

    #[test]
    fn next_leak_id_skips_past_patched_leaks() {
        let mut g = game();
        g.leaks.push(Leak { id: 4, location: "Galley".into(), rate: 3, patched: true });
        assert_eq!(g.next_leak_id(), 5);
    }

    #[test]
    fn log_tail_handles_short_logs() {
        let g = game();
        assert_eq!(g.log_tail(4).len(), 1);
        assert!(g.log_tail(0).is_empty());
    }

    #[test]
    fn inflow_ignores_patched_leaks() {
        let mut g = game();
        g.leaks.push(Leak { id: 2, location: "Galley".into(), rate: 7, patched: true });
        assert_eq!(g.inflow(), 5);
    }
}
