pub mod effect;
pub mod tree;

use crate::statistics::Statistics;
use schema::{ElementType, SkillCategory, TypeChart};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub use effect::SkillEffect;
pub use tree::{NodeId, SkillNode, SkillTree};

const BASE_SKILL_THRESHOLD: u32 = 100;
const MAX_ACCURACY: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkillId(pub String);

impl SkillId {
    pub fn new(id: impl Into<String>) -> Self {
        SkillId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SkillId {
    fn from(id: &str) -> Self {
        SkillId(id.to_string())
    }
}

/// A usable move. Every holder levels its own copy; cloning deep-copies the
/// effect templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    pub description: String,
    pub element: ElementType,
    pub category: SkillCategory,
    level: u32,
    experience: u32,
    experience_to_next: u32,
    power: u32,
    accuracy: u32,
    action_point_cost: u32,
    effects: Vec<SkillEffect>,
    evolutions: Vec<Skill>,
}

impl Skill {
    pub fn new(
        id: impl Into<SkillId>,
        name: impl Into<String>,
        element: ElementType,
        category: SkillCategory,
        power: u32,
        accuracy: u32,
        action_point_cost: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            element,
            category,
            level: 1,
            experience: 0,
            experience_to_next: BASE_SKILL_THRESHOLD,
            power,
            accuracy: accuracy.min(MAX_ACCURACY),
            action_point_cost,
            effects: Vec::new(),
            evolutions: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_effect(mut self, effect: SkillEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }

    pub fn can_use(&self, action_points: u32) -> bool {
        action_points >= self.action_point_cost
    }

    /// Bonus experience for a hit on `target`: 10 for taking more than half its
    /// max health, 5 when this skill's type is super effective, and up to 10 for
    /// the target's level.
    pub fn combat_bonus(&self, target: &Statistics, damage_dealt: u32) -> u32 {
        let mut bonus = 0;
        if f64::from(damage_dealt) > f64::from(target.max_health()) * 0.5 {
            bonus += 10;
        }
        if TypeChart::standard().against(self.element, target.types()) > 1.0 {
            bonus += 5;
        }
        bonus + (target.level() / 5).min(10)
    }

    pub fn gain_combat_experience(
        &mut self,
        base_amount: u32,
        target: &Statistics,
        damage_dealt: u32,
    ) -> bool {
        let bonus = self.combat_bonus(target, damage_dealt);
        self.gain_experience(base_amount + bonus)
    }

    /// At most one level per call.
    pub fn gain_experience(&mut self, amount: u32) -> bool {
        self.experience += amount;
        if self.experience >= self.experience_to_next {
            self.level_up();
            return true;
        }
        false
    }

    fn level_up(&mut self) {
        self.level += 1;
        self.experience -= self.experience_to_next;
        self.experience_to_next = (f64::from(self.experience_to_next) * 1.2) as u32;

        self.power += self.power / 10;
        self.accuracy = (self.accuracy + 1).min(MAX_ACCURACY);
        if self.level % 5 == 0 && self.action_point_cost > 1 {
            self.action_point_cost -= 1;
        }

        debug!(
            skill = %self.id,
            level = self.level,
            power = self.power,
            cost = self.action_point_cost,
            "skill leveled up"
        );
    }

    // === Evolution ===

    pub fn add_evolution(&mut self, evolution: Skill) {
        self.evolutions.push(evolution);
    }

    pub fn available_evolutions(&self, required_level: u32) -> &[Skill] {
        if self.level >= required_level {
            &self.evolutions
        } else {
            &[]
        }
    }

    /// The evolved form, carrying this skill's level and experience. `None` for
    /// an out-of-range index.
    pub fn evolve(&self, index: usize) -> Option<Skill> {
        let mut evolved = self.evolutions.get(index)?.clone();
        evolved.level = self.level;
        evolved.experience = self.experience;
        Some(evolved)
    }

    // === Accessors ===

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn experience(&self) -> u32 {
        self.experience
    }

    pub fn experience_to_next(&self) -> u32 {
        self.experience_to_next
    }

    pub fn power(&self) -> u32 {
        self.power
    }

    pub fn accuracy(&self) -> u32 {
        self.accuracy
    }

    pub fn action_point_cost(&self) -> u32 {
        self.action_point_cost
    }

    pub fn effects(&self) -> &[SkillEffect] {
        &self.effects
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} {}] Lv.{} Pow:{} Acc:{} AP:{}",
            self.name,
            self.element,
            self.category,
            self.level,
            self.power,
            self.accuracy,
            self.action_point_cost
        )
    }
}
