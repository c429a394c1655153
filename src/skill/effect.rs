use crate::creature::Creature;
use crate::rng::TurnRng;
use schema::{Attribute, EffectKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// One mechanical consequence of a skill.
///
/// Skills hold these as templates. Applying one clones it onto the target, so
/// each holder ticks its own copy down independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEffect {
    pub id: String,
    pub name: String,
    pub kind: EffectKind,
    /// Remaining turns. 0 means instantaneous.
    duration: u32,
    pub intensity: u32,
    pub attribute: Option<Attribute>,
    /// Probability in [0, 1] that the effect lands.
    pub chance: f64,
}

impl SkillEffect {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: EffectKind,
        duration: u32,
        intensity: u32,
        attribute: Option<Attribute>,
        chance: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            duration,
            intensity,
            attribute,
            chance: chance.clamp(0.0, 1.0),
        }
    }

    pub fn damage(id: &str, name: &str, intensity: u32, chance: f64) -> Self {
        Self::new(id, name, EffectKind::Damage, 0, intensity, Some(Attribute::Health), chance)
    }

    pub fn healing(id: &str, name: &str, intensity: u32, chance: f64) -> Self {
        Self::new(id, name, EffectKind::Healing, 0, intensity, Some(Attribute::Health), chance)
    }

    pub fn stat_boost(
        id: &str,
        name: &str,
        attribute: Attribute,
        intensity: u32,
        duration: u32,
        chance: f64,
    ) -> Self {
        Self::new(id, name, EffectKind::StatBoost, duration, intensity, Some(attribute), chance)
    }

    pub fn stat_reduce(
        id: &str,
        name: &str,
        attribute: Attribute,
        intensity: u32,
        duration: u32,
        chance: f64,
    ) -> Self {
        Self::new(id, name, EffectKind::StatReduce, duration, intensity, Some(attribute), chance)
    }

    pub fn status(id: &str, name: &str, intensity: u32, duration: u32, chance: f64) -> Self {
        Self::new(id, name, EffectKind::StatusEffect, duration, intensity, Some(Attribute::Health), chance)
    }

    /// Rolls against `chance` and, on success, applies this effect to `target`.
    /// Effects with a duration are stored on the target; instantaneous ones are not.
    pub fn apply(&self, target: &mut Creature, rng: &mut TurnRng) -> bool {
        if !rng.roll_chance(self.chance, "effect chance") {
            debug!(effect = %self.id, target = %target.name, "effect missed");
            return false;
        }

        match self.kind {
            EffectKind::Damage => {
                target.take_damage(self.intensity);
            }
            EffectKind::Healing => target.heal(self.intensity),
            kind if kind.is_stat_change() => self.apply_stat_change(target),
            // Status and field effects are bookkeeping only.
            _ => {}
        }

        debug!(
            effect = %self.id,
            kind = %self.kind,
            intensity = self.intensity,
            duration = self.duration,
            target = %target.name,
            "effect applied"
        );

        if self.duration > 0 {
            target.store_effect(self.clone());
        }
        true
    }

    fn apply_stat_change(&self, target: &mut Creature) {
        let boost = self.kind == EffectKind::StatBoost;
        match self.attribute {
            Some(Attribute::ActionPoints) => {
                if boost {
                    target.restore_action_points(self.intensity);
                } else {
                    target.reduce_action_points(self.intensity);
                }
            }
            Some(attribute) if attribute.is_core() => {
                let delta = self.intensity as i32;
                let delta = if boost { delta } else { -delta };
                target
                    .statistics_mut()
                    .add_temporary_modifier(attribute, delta, self.duration);
            }
            other => {
                debug!(effect = %self.id, attribute = ?other, "stat change has nothing to modify");
            }
        }
    }

    /// One turn passes. Stays at 0 once expired.
    pub fn update_duration(&mut self) {
        self.duration = self.duration.saturating_sub(1);
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn is_expired(&self) -> bool {
        self.duration == 0
    }
}

impl fmt::Display for SkillEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.name, self.kind)?;
        if self.duration > 0 {
            write!(f, ", {} turns", self.duration)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::Creature;
    use crate::rules::GameRules;
    use pretty_assertions::assert_eq;
    use schema::ElementType;

    fn target() -> Creature {
        Creature::new("target", "Target", ElementType::Water, GameRules::default())
    }

    #[test]
    fn test_missed_roll_is_a_no_op() {
        let mut creature = target();
        let effect = SkillEffect::damage("sting", "Sting", 10, 0.5);
        let mut rng = TurnRng::new_for_test(vec![51]);

        assert!(!effect.apply(&mut creature, &mut rng));
        assert_eq!(creature.statistics().health(), 50);
        assert!(creature.active_effects().is_empty());
    }

    #[test]
    fn test_instant_effects_are_not_stored() {
        let mut creature = target();
        let mut rng = TurnRng::new_for_test(vec![1, 1]);

        SkillEffect::damage("sting", "Sting", 30, 1.0).apply(&mut creature, &mut rng);
        assert_eq!(creature.statistics().health(), 20);
        SkillEffect::healing("mend", "Mend", 100, 1.0).apply(&mut creature, &mut rng);
        assert_eq!(creature.statistics().health(), 50);

        assert!(creature.active_effects().is_empty());
    }

    #[test]
    fn test_stat_changes_register_timed_modifiers() {
        let mut creature = target();
        let mut rng = TurnRng::new_for_test(vec![1, 1]);

        SkillEffect::stat_boost("focus", "Focus", Attribute::Strength, 7, 3, 1.0)
            .apply(&mut creature, &mut rng);
        SkillEffect::stat_reduce("slow", "Slow", Attribute::Speed, 4, 2, 1.0)
            .apply(&mut creature, &mut rng);

        assert_eq!(creature.statistics().strength(), 17);
        assert_eq!(creature.statistics().speed(), 6);
        assert_eq!(creature.active_effects().len(), 2);
    }

    #[test]
    fn test_action_point_effects_act_immediately() {
        let mut creature = target();
        let mut rng = TurnRng::new_for_test(vec![1, 1]);
        let before = creature.action_points();

        SkillEffect::stat_reduce("drain", "Drain", Attribute::ActionPoints, 3, 0, 1.0)
            .apply(&mut creature, &mut rng);
        assert_eq!(creature.action_points(), before - 3);

        SkillEffect::stat_boost("surge", "Surge", Attribute::ActionPoints, 2, 0, 1.0)
            .apply(&mut creature, &mut rng);
        assert_eq!(creature.action_points(), before - 1);
        assert_eq!(creature.statistics().modifier(Attribute::Speed), None);
    }

    #[test]
    fn test_reapplying_replaces_instead_of_stacking() {
        let mut creature = target();
        let mut rng = TurnRng::new_for_test(vec![1, 1]);
        let burn = SkillEffect::status("burn", "Burn", 5, 3, 1.0);

        burn.apply(&mut creature, &mut rng);
        creature.update_effects();
        burn.apply(&mut creature, &mut rng);

        assert_eq!(creature.active_effects().len(), 1);
        assert_eq!(creature.active_effects()[0].duration(), 3);
    }

    #[test]
    fn test_duration_floors_at_zero() {
        let mut effect = SkillEffect::status("fear", "Fear", 1, 1, 1.0);
        effect.update_duration();
        assert!(effect.is_expired());
        effect.update_duration();
        assert_eq!(effect.duration(), 0);
    }
}
