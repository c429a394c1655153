//! Decision-making for whoever controls a team: a scoring heuristic for
//! computer opponents, and a queue of submitted choices for human players.

use crate::battle::state::Team;
use crate::creature::Creature;
use crate::rng::TurnRng;
use crate::rules::GameRules;
use crate::skill::{Skill, SkillId};
use ordered_float::OrderedFloat;
use schema::TypeChart;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::VecDeque;
use tracing::debug;

/// Everything a trainer may look at when deciding, borrowed from a battle.
pub struct DecisionContext<'b> {
    pub team: Team,
    pub own: &'b Creature,
    pub opponent: &'b Creature,
    pub roster: Vec<&'b Creature>,
    pub active_index: usize,
    pub rules: &'b GameRules,
    pub rng: &'b mut TurnRng,
}

impl DecisionContext<'_> {
    /// Living teammates other than the active creature, by roster index.
    pub fn switch_candidates(&self) -> Vec<usize> {
        self.roster
            .iter()
            .enumerate()
            .filter(|(i, creature)| *i != self.active_index && !creature.is_dead())
            .map(|(i, _)| i)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainerAction {
    UseSkill(SkillId),
    Switch(usize),
    /// The active creature should be swapped; ask `choose_creature` which one.
    RequestSwitch,
    Escape,
    /// Nothing usable this turn.
    Pass,
}

/// A controller for one side of a battle.
pub trait Trainer {
    fn name(&self) -> &str;

    fn choose_action(&mut self, ctx: &mut DecisionContext<'_>) -> TrainerAction;

    /// Roster index to send out next, or `None` to keep the current creature.
    fn choose_creature(&mut self, ctx: &mut DecisionContext<'_>) -> Option<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    Random,
    Balanced,
    Intelligent,
}

impl Strategy {
    /// Chance of bailing out when the active creature is nearly down.
    pub fn low_health_switch_chance(self) -> f64 {
        match self {
            Strategy::Random => 0.1,
            Strategy::Balanced => 0.3,
            Strategy::Intelligent => 0.7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeuristicTrainer {
    name: String,
    difficulty: u32,
    strategy: Strategy,
}

impl HeuristicTrainer {
    pub fn new(name: &str, difficulty: u32, strategy: Strategy) -> Self {
        Self {
            name: name.to_string(),
            difficulty: difficulty.clamp(1, 10),
            strategy,
        }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: u32) {
        self.difficulty = difficulty.clamp(1, 10);
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// `(power * effectiveness * 2 + level * 5 - cost * 3) * (0.5 + difficulty * 0.05)`,
    /// where effectiveness is the skill's type against every opponent type.
    pub fn score_skill(&self, skill: &Skill, opponent: &Creature) -> f64 {
        let effectiveness =
            TypeChart::standard().against(skill.element, opponent.statistics().types());
        let mut score = f64::from(skill.power()) * effectiveness * 2.0;
        score += f64::from(skill.level()) * 5.0;
        score -= f64::from(skill.action_point_cost()) * 3.0;
        score * (0.5 + f64::from(self.difficulty) * 0.05)
    }

    /// Level, health fraction, type matchup (every pair) and a speed edge.
    pub fn score_match(&self, candidate: &Creature, opponent: &Creature) -> f64 {
        let stats = candidate.statistics();
        let mut score = f64::from(stats.level()) * 5.0
            + f64::from(stats.health()) / f64::from(stats.max_health().max(1)) * 100.0;

        let chart = TypeChart::standard();
        for &own_type in stats.types() {
            for &enemy_type in opponent.statistics().types() {
                let effectiveness = chart.effectiveness(own_type, enemy_type);
                if effectiveness > 1.0 {
                    score += 50.0 * effectiveness;
                } else if effectiveness < 1.0 {
                    score -= 30.0 * (1.0 - effectiveness);
                }
            }
        }

        if stats.speed() > opponent.statistics().speed() {
            score += 20.0;
        }
        score
    }

    /// First skill to beat the running best (starting at -1), else the first.
    fn best_skill<'s>(&self, skills: &[&'s Skill], opponent: &Creature) -> Option<&'s Skill> {
        let mut best: Option<&Skill> = None;
        let mut best_score = -1.0;
        for &skill in skills {
            let score = self.score_skill(skill, opponent);
            if score > best_score {
                best_score = score;
                best = Some(skill);
            }
        }
        best.or_else(|| skills.first().copied())
    }

    fn choose_skill(&self, ctx: &mut DecisionContext<'_>) -> Option<SkillId> {
        let usable = ctx.own.usable_skills();
        if usable.is_empty() {
            return None;
        }

        let pick_random = |rng: &mut TurnRng| usable[rng.next_index(usable.len(), "ai skill pick")];
        let chosen = match self.strategy {
            Strategy::Intelligent => self.best_skill(&usable, ctx.opponent),
            Strategy::Balanced => {
                if ctx.rng.next_bool("ai balanced coin") {
                    self.best_skill(&usable, ctx.opponent)
                } else {
                    Some(pick_random(ctx.rng))
                }
            }
            Strategy::Random => Some(pick_random(ctx.rng)),
        };
        chosen.map(|skill| skill.id.clone())
    }
}

impl Trainer for HeuristicTrainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_action(&mut self, ctx: &mut DecisionContext<'_>) -> TrainerAction {
        let stats = ctx.own.statistics();
        let low_health =
            f64::from(stats.health()) < f64::from(stats.max_health()) * ctx.rules.low_health_threshold;
        if low_health
            && !ctx.switch_candidates().is_empty()
            && ctx
                .rng
                .roll_chance(self.strategy.low_health_switch_chance(), "ai low health switch")
        {
            debug!(trainer = %self.name, creature = %ctx.own.name, "low health, asking to switch");
            return TrainerAction::RequestSwitch;
        }

        match self.choose_skill(ctx) {
            Some(skill) => TrainerAction::UseSkill(skill),
            None => TrainerAction::Pass,
        }
    }

    fn choose_creature(&mut self, ctx: &mut DecisionContext<'_>) -> Option<usize> {
        let candidates = ctx.switch_candidates();
        if candidates.is_empty() {
            return None;
        }

        if self.strategy == Strategy::Random {
            let pick = ctx.rng.next_index(candidates.len(), "ai creature pick");
            return Some(candidates[pick]);
        }

        // min_by_key keeps the first of equal keys, so ties go to the earlier slot.
        candidates
            .into_iter()
            .map(|index| (index, self.score_match(ctx.roster[index], ctx.opponent)))
            .min_by_key(|(_, score)| Reverse(OrderedFloat(*score)))
            .map(|(index, _)| index)
    }
}

/// A player-controlled side. Decisions are submitted ahead of time and
/// consumed in order; an empty queue means the battle waits on the caller.
#[derive(Debug, Clone, Default)]
pub struct HumanTrainer {
    name: String,
    pending: VecDeque<TrainerAction>,
}

impl HumanTrainer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pending: VecDeque::new(),
        }
    }

    pub fn submit(&mut self, action: TrainerAction) {
        self.pending.push_back(action);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl Trainer for HumanTrainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_action(&mut self, _ctx: &mut DecisionContext<'_>) -> TrainerAction {
        self.pending.pop_front().unwrap_or(TrainerAction::Pass)
    }

    fn choose_creature(&mut self, ctx: &mut DecisionContext<'_>) -> Option<usize> {
        match self.pending.front() {
            Some(TrainerAction::Switch(index)) if ctx.switch_candidates().contains(index) => {
                let index = *index;
                self.pending.pop_front();
                Some(index)
            }
            _ => None,
        }
    }
}
