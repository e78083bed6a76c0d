//! Sink: a per-channel, turn-based "sinking ship" simulation.
//!
//! A host (chat bot, CLI, test) keeps one [`Game`] per channel, forwards
//! crew actions to [`SinkEngine::apply_action`], and renders
//! [`GameSnapshot`]s. The engine does no I/O and holds no global state.

pub mod command;
pub mod config;
pub mod crew;
pub mod engine;
pub mod error;
pub mod event;
pub mod game;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod types;

pub use command::Action;
pub use config::{Difficulty, DifficultyParams, ScenarioConfig};
pub use engine::{is_crew_member, SinkEngine};
pub use error::{ActionError, CrewError, StoreError};
pub use event::GameEvent;
pub use game::{Game, GameStatus, Leak, Outcome};
pub use rng::{FixedRng, Pick, RngBank, SeededRng, SinkRng};
pub use snapshot::GameSnapshot;
pub use store::GameStore;
