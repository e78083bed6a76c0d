//! Scenario configuration: the per-difficulty parameter table.
//!
//! `ScenarioConfig::default()` carries the built-in table. Hosts that want to
//! tune the scenario load a JSON file of the same shape with
//! `ScenarioConfig::load`.

use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy   => "easy",
            Self::Normal => "normal",
            Self::Hard   => "hard",
        }
    }

    /// Lenient parse used at game creation: absent or unrecognized labels
    /// fall back to `Normal`.
    pub fn from_label(label: Option<&str>) -> Self {
        label.and_then(|l| l.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy"   => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard"   => Ok(Self::Hard),
            other    => Err(anyhow::anyhow!("unknown difficulty '{other}'")),
        }
    }
}

/// Stochastic tuning for one difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    /// Probability per tick that a new leak opens.
    pub leak_chance: f64,
    /// Minimum inflow of a new leak. The seeded leak draws from
    /// `[leak_rate_min, leak_rate_min + 2]`.
    pub leak_rate_min: i32,
    /// Maximum inflow of a new leak.
    pub leak_rate_max: i32,
    /// Probability per tick that a storm hits.
    pub storm_chance: f64,
    /// Mean water removed by one bail (jittered by ±3).
    pub bail_power: i32,
}

impl DifficultyParams {
    pub const EASY: Self = Self {
        leak_chance:   0.15,
        leak_rate_min: 3,
        leak_rate_max: 7,
        storm_chance:  0.12,
        bail_power:    16,
    };

    pub const NORMAL: Self = Self {
        leak_chance:   0.22,
        leak_rate_min: 4,
        leak_rate_max: 10,
        storm_chance:  0.16,
        bail_power:    14,
    };

    pub const HARD: Self = Self {
        leak_chance:   0.30,
        leak_rate_min: 6,
        leak_rate_max: 12,
        storm_chance:  0.22,
        bail_power:    12,
    };

    fn validate(&self, label: &str) -> anyhow::Result<()> {
        for (name, p) in [("leak_chance", self.leak_chance), ("storm_chance", self.storm_chance)] {
            if !(0.0..=1.0).contains(&p) {
                anyhow::bail!("{label}.{name} must be within [0, 1], got {p}");
            }
        }
        if self.leak_rate_min < 1 {
            anyhow::bail!("{label}.leak_rate_min must be >= 1, got {}", self.leak_rate_min);
        }
        if self.leak_rate_min > self.leak_rate_max {
            anyhow::bail!(
                "{label}: leak_rate_min ({}) exceeds leak_rate_max ({})",
                self.leak_rate_min,
                self.leak_rate_max
            );
        }
        // Bail jitter is ±3; anything lower could bail negative water.
        if self.bail_power < 3 {
            anyhow::bail!("{label}.bail_power must be >= 3, got {}", self.bail_power);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub easy:   DifficultyParams,
    pub normal: DifficultyParams,
    pub hard:   DifficultyParams,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            easy:   DifficultyParams::EASY,
            normal: DifficultyParams::NORMAL,
            hard:   DifficultyParams::HARD,
        }
    }
}

impl ScenarioConfig {
    /// Load from a JSON file.
    /// In tests, use `ScenarioConfig::default()`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config = Self::from_json(&content)
            .map_err(|e| anyhow::anyhow!("Invalid scenario config {}: {e}", path.display()))?;
        log::info!("Loaded scenario config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.easy.validate("easy")?;
        self.normal.validate("normal")?;
        self.hard.validate("hard")?;
        Ok(())
    }

    pub fn params(&self, difficulty: Difficulty) -> DifficultyParams {
        match difficulty {
            Difficulty::Easy   => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Hard   => self.hard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_label_falls_back_to_normal() {
        assert_eq!(Difficulty::from_label(Some("easy")), Difficulty::Easy);
        assert_eq!(Difficulty::from_label(Some("HARD")), Difficulty::Hard);
        assert_eq!(Difficulty::from_label(Some("nightmare")), Difficulty::Normal);
        assert_eq!(Difficulty::from_label(None), Difficulty::Normal);
    }

    #[test]
    fn default_table_is_valid() {
        let config = ScenarioConfig::default();
        config.validate().unwrap();
        assert_eq!(config.params(Difficulty::Hard).bail_power, 12);
        assert_eq!(config.params(Difficulty::Easy).leak_rate_min, 3);
    }

    #[test]
    fn json_round_trips_through_validation() {
        let json = serde_json::to_string(&ScenarioConfig::default()).unwrap();
        let back = ScenarioConfig::from_json(&json).unwrap();
        assert_eq!(back, ScenarioConfig::default());
    }

    #[test]
    fn rejects_inverted_leak_range() {
        let mut config = ScenarioConfig::default();
        config.normal.leak_rate_min = 11;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("normal"), "unexpected error: {err}");
    }

    #[test]
    fn rejects_probability_above_one() {
        let mut config = ScenarioConfig::default();
        config.hard.storm_chance = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ScenarioConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Cannot read"));
    }
}
