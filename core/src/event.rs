//! Game events — everything that happens to a game, in order.
//!
//! RULE: the engine never pushes free-form text onto the log.
//! Every log line is the narrative of exactly one event, so the log and the
//! event list returned to the host never disagree.

use crate::types::{LeakId, Turn, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Lifecycle ──────────────────────────────────
    Launched,
    ShipLost {
        turn: Turn,
    },
    ShipSaved {
        turn: Turn,
    },
    Abandoned {
        user: UserId,
    },
    EndedByCaptain,

    // ── Crew ───────────────────────────────────────
    CrewJoined {
        user: UserId,
    },
    CrewLeft {
        user: UserId,
    },

    // ── Player actions ─────────────────────────────
    LeakPatched {
        user: UserId,
        leak_id: LeakId,
        location: String,
    },
    PatchFailed {
        user: UserId,
        leak_id: LeakId,
    },
    NoLeaksFound {
        user: UserId,
    },
    Bailed {
        user: UserId,
        amount: i32,
    },
    Braced {
        user: UserId,
    },
    Waited {
        user: UserId,
    },

    // ── Tick hazards ───────────────────────────────
    StormHit {
        turn: Turn,
        hull_damage: i32,
    },
    LeakOpened {
        turn: Turn,
        leak_id: LeakId,
        location: String,
        rate: i32,
    },
}

impl GameEvent {
    /// The human-readable log line for this event.
    pub fn narrative(&self) -> String {
        match self {
            Self::Launched => {
                "A loud crack echoes through the hull. Water starts seeping in...".to_string()
            }
            Self::ShipLost { .. } => "The ship is lost.".to_string(),
            Self::ShipSaved { .. } => {
                "You stabilized the ship and limped into safe waters.".to_string()
            }
            Self::Abandoned { user } => format!("{} orders abandon ship.", mention(user)),
            Self::EndedByCaptain => "The scenario is ended by the captain.".to_string(),
            Self::CrewJoined { user } => format!("{} joins the crew.", mention(user)),
            Self::CrewLeft { user } => format!("{} leaves the crew.", mention(user)),
            Self::LeakPatched { user, leak_id, location } => {
                format!("{} patches leak #{leak_id} in the {location}.", mention(user))
            }
            Self::PatchFailed { user, leak_id } => format!(
                "{} fails to seal leak #{leak_id}. The crack spreads.",
                mention(user)
            ),
            Self::NoLeaksFound { user } => {
                format!("{} searches for leaks... none remain.", mention(user))
            }
            Self::Bailed { user, amount } => {
                format!("{} bails water (-{amount} water).", mention(user))
            }
            Self::Braced { user } => format!(
                "{} rallies the crew. Everyone braces and keeps working.",
                mention(user)
            ),
            Self::Waited { user } => format!("{} waits...", mention(user)),
            Self::StormHit { hull_damage, .. } => {
                format!("A storm slams the ship (-{hull_damage} hull).")
            }
            Self::LeakOpened { leak_id, location, .. } => {
                format!("A new leak opens in the {location} (leak #{leak_id}).")
            }
        }
    }
}

/// Chat-style user mention, the form hosts render back into a name.
fn mention(user: &str) -> String {
    format!("<@{user}>")
}
