//! Per-channel game store, owned by the host.
//!
//! RULE: the engine never sees this map. The store looks up one channel's
//! game and hands the engine a `&mut Game` for the length of a single call,
//! so two actions on the same game can never be in flight at once. Hosts
//! that dispatch from several threads wrap the whole store in a mutex.

use std::collections::HashMap;

use crate::{
    config::{Difficulty, ScenarioConfig},
    crew,
    engine::SinkEngine,
    error::{StoreError, StoreResult},
    event::GameEvent,
    game::Game,
    rng::{RngBank, SeededRng},
    snapshot::GameSnapshot,
    types::ChannelId,
};

pub struct GameStore {
    engine: SinkEngine,
    bank:   RngBank,
    games:  HashMap<ChannelId, Game>,
    /// One stream per channel, kept across games so a channel's whole
    /// history replays from the master seed.
    rngs:   HashMap<ChannelId, SeededRng>,
}

impl GameStore {
    /// Fails if `config` does not validate.
    pub fn new(config: ScenarioConfig, master_seed: u64) -> anyhow::Result<Self> {
        Ok(Self {
            engine: SinkEngine::new(config)?,
            bank:   RngBank::new(master_seed),
            games:  HashMap::new(),
            rngs:   HashMap::new(),
        })
    }

    /// Start a game in `channel_id`. An ended game in the channel is
    /// replaced; a running one is not.
    pub fn start(
        &mut self,
        channel_id: &str,
        captain_id: &str,
        difficulty: Option<&str>,
    ) -> StoreResult<&Game> {
        if self.games.get(channel_id).is_some_and(Game::is_running) {
            return Err(StoreError::AlreadyRunning);
        }
        let bank = self.bank;
        let rng = self
            .rngs
            .entry(channel_id.to_string())
            .or_insert_with(|| bank.for_channel(channel_id));
        let game = self.engine.create(Difficulty::from_label(difficulty), captain_id, rng);
        log::debug!("Channel {channel_id}: game started by {captain_id}");
        self.games.insert(channel_id.to_string(), game);
        self.get(channel_id).ok_or(StoreError::NoGame)
    }

    pub fn act(
        &mut self,
        channel_id: &str,
        action: &str,
        user_id: &str,
    ) -> StoreResult<Vec<GameEvent>> {
        let game = self.games.get_mut(channel_id).ok_or(StoreError::NoGame)?;
        let bank = self.bank;
        let rng = self
            .rngs
            .entry(channel_id.to_string())
            .or_insert_with(|| bank.for_channel(channel_id));
        Ok(self.engine.apply_action_str(game, action, user_id, rng)?)
    }

    pub fn join(&mut self, channel_id: &str, user_id: &str) -> StoreResult<GameEvent> {
        Ok(crew::join_crew(self.game_mut(channel_id)?, user_id)?)
    }

    pub fn leave(&mut self, channel_id: &str, user_id: &str) -> StoreResult<GameEvent> {
        Ok(crew::leave_crew(self.game_mut(channel_id)?, user_id)?)
    }

    pub fn end(&mut self, channel_id: &str, user_id: &str) -> StoreResult<GameEvent> {
        Ok(crew::end_game(self.game_mut(channel_id)?, user_id)?)
    }

    pub fn get(&self, channel_id: &str) -> Option<&Game> {
        self.games.get(channel_id)
    }

    pub fn snapshot(&self, channel_id: &str) -> StoreResult<GameSnapshot> {
        self.get(channel_id).map(Game::snapshot).ok_or(StoreError::NoGame)
    }

    /// Drop a channel's game, e.g. once the host has rendered its ending.
    pub fn remove(&mut self, channel_id: &str) -> Option<Game> {
        self.games.remove(channel_id)
    }

    pub fn running_count(&self) -> usize {
        self.games.values().filter(|g| g.is_running()).count()
    }

    fn game_mut(&mut self, channel_id: &str) -> StoreResult<&mut Game> {
        self.games.get_mut(channel_id).ok_or(StoreError::NoGame)
    }
}
