//! Tunable constants for the battle core.
//!
//! Defaults reproduce the standard game. A rules file in RON can override any
//! subset of fields:
//!
//! ```ron
//! (
//!     action_points_per_turn: 3,
//!     escape: (offset: 40, min_chance: 0.2, max_chance: 0.9),
//! )
//! ```

use crate::errors::ConfigError;
use crate::statistics::ExperienceCurve;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Action points restored to the active creature at the start of its turn.
    pub action_points_per_turn: u32,
    pub base_max_action_points: u32,
    pub starting_skill_points: u32,
    pub skill_points_per_level: u32,
    pub max_equipped_skills: usize,
    pub experience: ExperienceRewards,
    /// Growth of the experience threshold for newly created creatures.
    pub experience_curve: ExperienceCurve,
    pub escape: EscapeRules,
    /// Health fraction under which a heuristic trainer considers switching out.
    pub low_health_threshold: f64,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            action_points_per_turn: 2,
            base_max_action_points: 10,
            starting_skill_points: 3,
            skill_points_per_level: 2,
            max_equipped_skills: 4,
            experience: ExperienceRewards::default(),
            experience_curve: ExperienceCurve::default(),
            escape: EscapeRules::default(),
            low_health_threshold: 0.2,
        }
    }
}

impl GameRules {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }
}

/// Victory experience: `sum(loser levels) * per_loser_level + turns * per_turn`,
/// split evenly between living winners, plus `active_bonus` for the creature
/// that was on the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceRewards {
    pub per_loser_level: u32,
    pub per_turn: u32,
    pub active_bonus: u32,
}

impl Default for ExperienceRewards {
    fn default() -> Self {
        Self {
            per_loser_level: 5,
            per_turn: 2,
            active_bonus: 10,
        }
    }
}

/// Escape chance is `clamp(min, max, (speed_a - speed_b + offset) / 100)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscapeRules {
    pub offset: i64,
    pub min_chance: f64,
    pub max_chance: f64,
}

impl Default for EscapeRules {
    fn default() -> Self {
        Self {
            offset: 30,
            min_chance: 0.1,
            max_chance: 0.95,
        }
    }
}

impl EscapeRules {
    pub fn chance(&self, runner_speed: u32, chaser_speed: u32) -> f64 {
        let factor = i64::from(runner_speed) - i64::from(chaser_speed) + self.offset;
        (factor as f64 / 100.0).clamp(self.min_chance, self.max_chance)
    }
}
