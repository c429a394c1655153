use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum SkillCategory {
    /// Uses raw strength to strike.
    Physical,
    /// Channels elemental power.
    Special,
    /// Alters attributes or applies effects.
    Status,
}

/// The mechanical consequence a skill effect has on its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum EffectKind {
    Damage,
    Healing,
    StatBoost,
    StatReduce,
    StatusEffect,
    FieldEffect,
}

impl EffectKind {
    pub fn is_stat_change(&self) -> bool {
        matches!(self, EffectKind::StatBoost | EffectKind::StatReduce)
    }
}

/// Attributes an effect can point at.
///
/// `ActionPoints` is not a levelable attribute; effects aimed at it act on the
/// creature's action-point pool directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Attribute {
    Health,
    Strength,
    Constitution,
    Spirit,
    Mental,
    Speed,
    ActionPoints,
}

impl Attribute {
    /// The five attributes that grow on level-up and accept timed modifiers.
    pub const CORE: [Attribute; 5] = [
        Attribute::Strength,
        Attribute::Constitution,
        Attribute::Spirit,
        Attribute::Mental,
        Attribute::Speed,
    ];

    pub fn is_core(&self) -> bool {
        Self::CORE.contains(self)
    }
}
