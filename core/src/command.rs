use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::ActionError;

/// Every action a crew member can take against a running game.
/// Variants are only ever appended; hosts map button ids onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Try to seal the first unpatched leak, then tick.
    Patch,
    /// Throw water overboard, then tick.
    Bail,
    /// Rally the crew, then tick.
    Brace,
    /// Do nothing and let one turn pass.
    Tick,
    /// End the scenario immediately. Does not tick.
    Abandon,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Patch,
        Action::Bail,
        Action::Brace,
        Action::Tick,
        Action::Abandon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patch   => "patch",
            Self::Bail    => "bail",
            Self::Brace   => "brace",
            Self::Tick    => "tick",
            Self::Abandon => "abandon",
        }
    }

    /// Whether a successful application advances the simulation by one tick.
    pub fn advances_turn(&self) -> bool {
        !matches!(self, Self::Abandon)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match on the five action tokens.
impl FromStr for Action {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ActionError::UnknownAction(s.to_string()))
    }
}
