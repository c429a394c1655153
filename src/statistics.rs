use crate::errors::{TargetError, TargetResult};
use crate::rng::TurnRng;
use schema::{Attribute, ElementType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

const BASE_EXPERIENCE_THRESHOLD: u32 = 100;
const MAX_TYPES: usize = 2;

/// How the experience needed for the next level grows after each level-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExperienceCurve {
    /// `next = current + per_level * new_level`. The canonical curve.
    Additive { per_level: u32 },
    /// `next = floor(current * factor)`.
    Multiplicative { factor: f64 },
}

impl Default for ExperienceCurve {
    fn default() -> Self {
        ExperienceCurve::Additive { per_level: 20 }
    }
}

impl ExperienceCurve {
    pub fn next_threshold(&self, current: u32, new_level: u32) -> u32 {
        match *self {
            ExperienceCurve::Additive { per_level } => current + per_level * new_level,
            ExperienceCurve::Multiplicative { factor } => (current as f64 * factor) as u32,
        }
    }

    /// Threshold a creature sitting at `level` must fill to reach `level + 1`.
    pub fn threshold_for_level(&self, level: u32) -> u32 {
        (2..=level).fold(BASE_EXPERIENCE_THRESHOLD, |threshold, reached| {
            self.next_threshold(threshold, reached)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreAttributes {
    pub strength: u32,
    pub constitution: u32,
    pub spirit: u32,
    pub mental: u32,
    pub speed: u32,
}

impl Default for CoreAttributes {
    fn default() -> Self {
        Self {
            strength: 10,
            constitution: 10,
            spirit: 10,
            mental: 10,
            speed: 10,
        }
    }
}

impl CoreAttributes {
    pub fn get(&self, attribute: Attribute) -> Option<u32> {
        match attribute {
            Attribute::Strength => Some(self.strength),
            Attribute::Constitution => Some(self.constitution),
            Attribute::Spirit => Some(self.spirit),
            Attribute::Mental => Some(self.mental),
            Attribute::Speed => Some(self.speed),
            Attribute::Health | Attribute::ActionPoints => None,
        }
    }

    fn get_mut(&mut self, attribute: Attribute) -> Option<&mut u32> {
        match attribute {
            Attribute::Strength => Some(&mut self.strength),
            Attribute::Constitution => Some(&mut self.constitution),
            Attribute::Spirit => Some(&mut self.spirit),
            Attribute::Mental => Some(&mut self.mental),
            Attribute::Speed => Some(&mut self.speed),
            Attribute::Health | Attribute::ActionPoints => None,
        }
    }
}

/// A signed, timed adjustment to one core attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatModifier {
    pub delta: i32,
    pub remaining_turns: u32,
}

/// A creature's levelable attribute block.
///
/// Every pooled resource stays within `0..=max`. Attribute getters report the
/// base value plus any active modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    level: u32,
    experience: u32,
    experience_to_next: u32,
    curve: ExperienceCurve,
    health: u32,
    max_health: u32,
    vitality: u32,
    max_vitality: u32,
    vital_energy: u32,
    max_vital_energy: u32,
    attributes: CoreAttributes,
    types: Vec<ElementType>,
    modifiers: HashMap<Attribute, StatModifier>,
    description: String,
}

impl Statistics {
    /// Level 1 with the game's default base values.
    pub fn new(primary_type: ElementType) -> Self {
        Self {
            level: 1,
            experience: 0,
            experience_to_next: BASE_EXPERIENCE_THRESHOLD,
            curve: ExperienceCurve::default(),
            health: 50,
            max_health: 50,
            vitality: 30,
            max_vitality: 30,
            vital_energy: 20,
            max_vital_energy: 20,
            attributes: CoreAttributes::default(),
            types: vec![primary_type],
            modifiers: HashMap::new(),
            description: String::new(),
        }
    }

    /// Set the level directly, recomputing the threshold from the curve.
    /// Pools and attributes are left alone; used when rebuilding a saved creature.
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self.experience = 0;
        self.experience_to_next = self.curve.threshold_for_level(self.level);
        self
    }

    pub fn with_curve(mut self, curve: ExperienceCurve) -> Self {
        self.curve = curve;
        self.experience_to_next = curve.threshold_for_level(self.level);
        self
    }

    pub fn with_attributes(mut self, attributes: CoreAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set max health and refill.
    pub fn with_max_health(mut self, max_health: u32) -> Self {
        self.max_health = max_health;
        self.health = max_health;
        self
    }

    pub fn with_experience(mut self, experience: u32) -> Self {
        self.experience = experience;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    // === Progression ===

    /// Adds experience and levels up at most once per call, even when `amount`
    /// would cover several thresholds.
    pub fn gain_experience(&mut self, amount: u32, rng: &mut TurnRng) -> bool {
        self.experience += amount;
        if self.experience >= self.experience_to_next {
            self.level_up(rng);
            return true;
        }
        false
    }

    fn level_up(&mut self, rng: &mut TurnRng) {
        self.level += 1;
        self.experience -= self.experience_to_next;
        self.experience_to_next = self.curve.next_threshold(self.experience_to_next, self.level);

        let base = self.attributes;
        self.max_health += 5 + base.constitution / 2;
        self.health = self.max_health;
        self.max_vitality += 3 + base.spirit / 3;
        self.vitality = self.max_vitality;
        self.max_vital_energy += 2 + base.mental / 2;
        self.vital_energy = self.max_vital_energy;

        for attribute in Attribute::CORE {
            let growth = 1 + u32::from(rng.next_bool("attribute growth"));
            if let Some(value) = self.attributes.get_mut(attribute) {
                *value += growth;
            }
        }

        debug!(
            level = self.level,
            max_health = self.max_health,
            next_threshold = self.experience_to_next,
            "statistics leveled up"
        );
    }

    // === Health ===

    /// Returns true if this damage brought health to zero.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.health = self.health.saturating_sub(amount);
        self.health == 0
    }

    pub fn heal(&mut self, amount: u32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn set_health(&mut self, health: u32) {
        self.health = health.min(self.max_health);
    }

    /// Refill every pool.
    pub fn restore_all(&mut self) {
        self.health = self.max_health;
        self.vitality = self.max_vitality;
        self.vital_energy = self.max_vital_energy;
    }

    // === Types ===

    pub fn add_type(&mut self, element: ElementType) -> TargetResult<()> {
        if self.types.contains(&element) {
            return Ok(());
        }
        if self.types.len() >= MAX_TYPES {
            return Err(TargetError::TooManyTypes);
        }
        self.types.push(element);
        Ok(())
    }

    /// Give a single-typed creature a random second type different from its first.
    pub fn add_random_secondary_type(&mut self, roster: &[ElementType], rng: &mut TurnRng) {
        if self.types.len() >= MAX_TYPES {
            return;
        }
        let primary = self.types[0];
        let candidates: Vec<ElementType> =
            roster.iter().copied().filter(|t| *t != primary).collect();
        if candidates.is_empty() {
            return;
        }
        let pick = candidates[rng.next_index(candidates.len(), "secondary type")];
        self.types.push(pick);
    }

    // === Temporary modifiers ===

    /// Registers (or replaces) a timed modifier. Only core attributes accept one.
    pub fn add_temporary_modifier(&mut self, attribute: Attribute, delta: i32, duration: u32) -> bool {
        if !attribute.is_core() || duration == 0 {
            return false;
        }
        self.modifiers.insert(
            attribute,
            StatModifier {
                delta,
                remaining_turns: duration,
            },
        );
        true
    }

    /// Ticks every modifier down by one turn and drops the expired ones.
    pub fn update_modifiers(&mut self) {
        self.modifiers.retain(|_, modifier| {
            modifier.remaining_turns = modifier.remaining_turns.saturating_sub(1);
            modifier.remaining_turns > 0
        });
    }

    pub fn modifier(&self, attribute: Attribute) -> Option<&StatModifier> {
        self.modifiers.get(&attribute)
    }

    fn modified(&self, attribute: Attribute) -> u32 {
        let base = self.attributes.get(attribute).unwrap_or(0);
        match self.modifiers.get(&attribute) {
            Some(modifier) => (i64::from(base) + i64::from(modifier.delta)).max(0) as u32,
            None => base,
        }
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

    pub fn curve(&self) -> ExperienceCurve {
        self.curve
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn vitality(&self) -> u32 {
        self.vitality
    }

    pub fn max_vitality(&self) -> u32 {
        self.max_vitality
    }

    pub fn vital_energy(&self) -> u32 {
        self.vital_energy
    }

    pub fn max_vital_energy(&self) -> u32 {
        self.max_vital_energy
    }

    pub fn strength(&self) -> u32 {
        self.modified(Attribute::Strength)
    }

    pub fn constitution(&self) -> u32 {
        self.modified(Attribute::Constitution)
    }

    pub fn spirit(&self) -> u32 {
        self.modified(Attribute::Spirit)
    }

    pub fn mental(&self) -> u32 {
        self.modified(Attribute::Mental)
    }

    pub fn speed(&self) -> u32 {
        self.modified(Attribute::Speed)
    }

    /// Unmodified attribute values.
    pub fn base_attributes(&self) -> CoreAttributes {
        self.attributes
    }

    pub fn types(&self) -> &[ElementType] {
        &self.types
    }

    pub fn primary_type(&self) -> ElementType {
        self.types[0]
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_fainted(&self) -> bool {
        self.health == 0
    }
}
