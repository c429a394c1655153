use crate::errors::{ActionError, ActionResult, TargetError, TargetResult};
use crate::rng::TurnRng;
use crate::rules::GameRules;
use crate::skill::tree::UnlockError;
use crate::skill::{NodeId, Skill, SkillEffect, SkillId, SkillTree};
use crate::statistics::Statistics;
use schema::{ElementType, TypeChart};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// What a resolved attack did.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackOutcome {
    pub skill: SkillId,
    pub damage: u32,
    /// Product over every attacker-type x defender-type pair.
    pub effectiveness: f64,
    pub action_points_spent: u32,
    /// Ids of the effects whose chance roll succeeded.
    pub effects_applied: Vec<String>,
    pub skill_leveled: bool,
    pub defender_fainted: bool,
    /// False when no damage landed. The cost and any effects still stick.
    pub performed: bool,
}

/// Read-only view of everything needed to rebuild a creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureSnapshot {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub health: u32,
    pub max_health: u32,
    pub experience: u32,
    pub types: Vec<ElementType>,
    pub unlocked_nodes: Vec<NodeId>,
    pub equipped_skills: Vec<SkillId>,
    pub skill_points: u32,
}

#[derive(Debug, Clone)]
pub struct Creature {
    pub id: String,
    pub name: String,
    stats: Statistics,
    skill_tree: SkillTree,
    /// Loadout. Every id names an unlocked skill in `skill_tree`.
    equipped: Vec<SkillId>,
    action_points: u32,
    max_action_points: u32,
    skill_points: u32,
    active_effects: Vec<SkillEffect>,
    rules: GameRules,
}

impl Creature {
    pub fn new(id: &str, name: &str, primary_type: ElementType, rules: GameRules) -> Self {
        let stats = Statistics::new(primary_type).with_curve(rules.experience_curve);
        Self::from_statistics(id, name, stats, rules)
    }

    /// Builds the skill tree from the statistics' primary type.
    pub fn from_statistics(id: &str, name: &str, stats: Statistics, rules: GameRules) -> Self {
        let skill_tree = SkillTree::new(stats.primary_type());
        Self {
            id: id.to_string(),
            name: name.to_string(),
            stats,
            skill_tree,
            equipped: Vec::new(),
            action_points: rules.base_max_action_points,
            max_action_points: rules.base_max_action_points,
            skill_points: rules.starting_skill_points,
            active_effects: Vec::new(),
            rules,
        }
    }

    // === Skills ===

    /// Unlocks a tree node, paying its cost from the unspent skill points.
    pub fn unlock_skill_node(&mut self, node: &NodeId) -> Result<(), UnlockError> {
        let cost = self.skill_tree.unlock(node, self.skill_points)?.cost;
        self.skill_points -= cost;
        debug!(creature = %self.name, node = %node, cost, remaining = self.skill_points, "node unlocked");
        Ok(())
    }

    pub fn equip_skill(&mut self, skill: &SkillId) -> TargetResult<()> {
        if !self.skill_tree.is_skill_unlocked(skill) {
            return Err(TargetError::SkillNotUnlocked(skill.clone()));
        }
        if self.equipped.contains(skill) {
            return Err(TargetError::SkillAlreadyEquipped(skill.clone()));
        }
        if self.equipped.len() >= self.rules.max_equipped_skills {
            return Err(TargetError::LoadoutFull(self.rules.max_equipped_skills));
        }
        self.equipped.push(skill.clone());
        Ok(())
    }

    pub fn unequip_skill(&mut self, skill: &SkillId) -> bool {
        let before = self.equipped.len();
        self.equipped.retain(|equipped| equipped != skill);
        self.equipped.len() != before
    }

    /// Swaps an equipped skill for an unlocked one, keeping its slot.
    pub fn replace_skill(&mut self, old: &SkillId, new: &SkillId) -> TargetResult<()> {
        let slot = self
            .equipped
            .iter()
            .position(|equipped| equipped == old)
            .ok_or_else(|| TargetError::NotEquipped(old.clone()))?;
        if !self.skill_tree.is_skill_unlocked(new) {
            return Err(TargetError::SkillNotUnlocked(new.clone()));
        }
        if self.equipped.contains(new) {
            return Err(TargetError::SkillAlreadyEquipped(new.clone()));
        }
        self.equipped[slot] = new.clone();
        Ok(())
    }

    pub fn equipped_skill_ids(&self) -> &[SkillId] {
        &self.equipped
    }

    pub fn equipped_skills(&self) -> Vec<&Skill> {
        self.equipped
            .iter()
            .filter_map(|id| self.skill_tree.skill(id))
            .collect()
    }

    /// Equipped skills this creature can pay for right now.
    pub fn usable_skills(&self) -> Vec<&Skill> {
        self.equipped_skills()
            .into_iter()
            .filter(|skill| skill.can_use(self.action_points))
            .collect()
    }

    pub fn skill(&self, id: &SkillId) -> Option<&Skill> {
        self.skill_tree.skill(id)
    }

    pub fn skill_tree(&self) -> &SkillTree {
        &self.skill_tree
    }

    pub fn skill_tree_mut(&mut self) -> &mut SkillTree {
        &mut self.skill_tree
    }

    // === Combat ===

    /// Uses an equipped skill on `target`.
    ///
    /// On error nothing changes on either creature. On success the cost is
    /// paid, damage and effects land on `target`, and the skill gains
    /// experience. Zero damage (a status skill, an immunity) leaves
    /// `performed` unset.
    pub fn attack(
        &mut self,
        target: &mut Creature,
        skill_id: &SkillId,
        rng: &mut TurnRng,
    ) -> ActionResult<AttackOutcome> {
        if !self.equipped.contains(skill_id) {
            return Err(ActionError::SkillNotEquipped(skill_id.clone()));
        }
        let skill = self
            .skill_tree
            .skill(skill_id)
            .ok_or_else(|| ActionError::SkillNotEquipped(skill_id.clone()))?;
        if !skill.can_use(self.action_points) {
            return Err(ActionError::InsufficientActionPoints {
                required: skill.action_point_cost(),
                available: self.action_points,
            });
        }

        let cost = skill.action_point_cost();
        let power = skill.power();
        let level = skill.level();
        let effects = skill.effects().to_vec();
        self.action_points -= cost;

        let chart = TypeChart::standard();
        let effectiveness = chart.combined(self.stats.types(), target.stats.types());
        if effectiveness == 0.0 {
            let immune_types: Vec<ElementType> = target
                .stats
                .types()
                .iter()
                .copied()
                .filter(|&defending| {
                    self.stats
                        .types()
                        .iter()
                        .any(|&attacking| chart.is_immune(attacking, defending))
                })
                .collect();
            debug!(defender = %target.name, ?immune_types, "defender is immune");
        }

        let constitution = target.stats.constitution().max(1);
        let base_damage = power * self.stats.strength() / constitution;
        let level_bonus = base_damage * level / 20;
        let damage = (f64::from(base_damage + level_bonus) * effectiveness).floor() as u32;

        target.take_damage(damage);

        let effects_applied = effects
            .iter()
            .filter(|effect| effect.apply(target, rng))
            .map(|effect| effect.id.clone())
            .collect();

        let skill_leveled = match self.skill_tree.skill_mut(skill_id) {
            Some(skill) => skill.gain_combat_experience(5 + damage / 10, &target.stats, damage),
            None => false,
        };

        debug!(
            attacker = %self.name,
            defender = %target.name,
            skill = %skill_id,
            base_damage,
            level_bonus,
            effectiveness,
            damage,
            "attack resolved"
        );

        Ok(AttackOutcome {
            skill: skill_id.clone(),
            damage,
            effectiveness,
            action_points_spent: cost,
            effects_applied,
            skill_leveled,
            defender_fainted: target.is_dead(),
            performed: damage > 0,
        })
    }

    /// Stores a timed effect, replacing any active effect with the same id.
    pub(crate) fn store_effect(&mut self, effect: SkillEffect) {
        match self.active_effects.iter_mut().find(|active| active.id == effect.id) {
            Some(active) => *active = effect,
            None => self.active_effects.push(effect),
        }
    }

    /// Start-of-own-turn upkeep: ticks effects and attribute modifiers, drops
    /// what expired.
    pub fn update_effects(&mut self) {
        for effect in &mut self.active_effects {
            effect.update_duration();
        }
        self.active_effects.retain(|effect| !effect.is_expired());
        self.stats.update_modifiers();
    }

    pub fn active_effects(&self) -> &[SkillEffect] {
        &self.active_effects
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.stats.take_damage(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.stats.heal(amount);
    }

    /// Refills health, pools and action points, and clears active effects.
    pub fn full_restore(&mut self) {
        self.stats.restore_all();
        self.action_points = self.max_action_points;
        self.active_effects.clear();
    }

    pub fn is_dead(&self) -> bool {
        self.stats.is_fainted()
    }

    // === Action points ===

    pub fn action_points(&self) -> u32 {
        self.action_points
    }

    pub fn max_action_points(&self) -> u32 {
        self.max_action_points
    }

    pub fn restore_action_points(&mut self, amount: u32) {
        self.action_points = (self.action_points + amount).min(self.max_action_points);
    }

    pub fn reduce_action_points(&mut self, amount: u32) {
        self.action_points = self.action_points.saturating_sub(amount);
    }

    pub fn restore_all_action_points(&mut self) {
        self.action_points = self.max_action_points;
    }

    pub fn set_action_points(&mut self, amount: u32) {
        self.action_points = amount.min(self.max_action_points);
    }

    /// `base + speed / 10 + spirit / 15`, clamping the current value.
    pub fn recalculate_max_action_points(&mut self) {
        self.max_action_points =
            self.rules.base_max_action_points + self.stats.speed() / 10 + self.stats.spirit() / 15;
        self.action_points = self.action_points.min(self.max_action_points);
    }

    // === Progression ===

    pub fn gain_experience(&mut self, amount: u32, rng: &mut TurnRng) -> bool {
        self.stats.gain_experience(amount, rng)
    }

    pub fn on_level_up(&mut self) {
        self.gain_skill_points(self.rules.skill_points_per_level);
    }

    pub fn gain_skill_points(&mut self, amount: u32) {
        self.skill_points += amount;
    }

    pub fn skill_points(&self) -> u32 {
        self.skill_points
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn statistics_mut(&mut self) -> &mut Statistics {
        &mut self.stats
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn snapshot(&self) -> CreatureSnapshot {
        CreatureSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            level: self.stats.level(),
            health: self.stats.health(),
            max_health: self.stats.max_health(),
            experience: self.stats.experience(),
            types: self.stats.types().to_vec(),
            unlocked_nodes: self.skill_tree.unlocked_node_ids(),
            equipped_skills: self.equipped.clone(),
            skill_points: self.skill_points,
        }
    }
}

impl fmt::Display for Creature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<String> = self.stats.types().iter().map(|t| t.to_string()).collect();
        write!(
            f,
            "{} (Lv.{} {}) HP {}/{} AP {}/{}",
            self.name,
            self.stats.level(),
            types.join("/"),
            self.stats.health(),
            self.stats.max_health(),
            self.action_points,
            self.max_action_points
        )
    }
}
