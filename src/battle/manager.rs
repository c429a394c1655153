use crate::battle::ai::{Trainer, TrainerAction};
use crate::battle::engine::Battle;
use crate::battle::state::{BattleEvent, BattleObserver, BattleState, Team};
use crate::creature::Creature;
use crate::errors::{ActionError, BattleResult, BattleStateError};
use crate::rng::TurnRng;
use crate::rules::GameRules;
use crate::skill::NodeId;
use schema::ElementType;
use tracing::{debug, info, warn};

/// Collects a readable line for every battle event and logs it.
#[derive(Debug, Clone, Default)]
pub struct BattleListener {
    messages: Vec<String>,
}

impl BattleListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl BattleObserver for BattleListener {
    fn on_event(&mut self, event: &BattleEvent) {
        let message = event.format();
        info!("{}", message);
        self.messages.push(message);
    }
}

/// Sets battles up from rosters and drives trainer-controlled turns.
#[derive(Debug, Clone, Default)]
pub struct BattleManager {
    rules: GameRules,
}

impl BattleManager {
    pub fn new(rules: GameRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// A battle between the living members of two rosters.
    pub fn create_battle<'a>(
        &self,
        roster_a: &'a mut [Creature],
        roster_b: &'a mut [Creature],
        rng: TurnRng,
    ) -> BattleResult<Battle<'a>> {
        let team_a: Vec<&'a mut Creature> = roster_a.iter_mut().filter(|c| !c.is_dead()).collect();
        let team_b: Vec<&'a mut Creature> = roster_b.iter_mut().filter(|c| !c.is_dead()).collect();
        if team_a.is_empty() || team_b.is_empty() {
            warn!(
                team_a = team_a.len(),
                team_b = team_b.len(),
                "no valid creatures for battle"
            );
        }
        Ok(Battle::new(team_a, team_b, self.rules.clone(), rng)?)
    }

    /// A battle against a single wild creature. Only these can be escaped.
    pub fn create_wild_battle<'a>(
        &self,
        roster: &'a mut [Creature],
        wild: &'a mut Creature,
        rng: TurnRng,
    ) -> BattleResult<Battle<'a>> {
        let team: Vec<&'a mut Creature> = roster.iter_mut().filter(|c| !c.is_dead()).collect();
        if wild.is_dead() {
            return Err(BattleStateError::EmptyRoster(Team::B.label()).into());
        }
        Ok(Battle::new(team, vec![wild], self.rules.clone(), rng)?)
    }

    /// Asks `trainer` what to do for whichever side is up, then does it.
    pub fn play_turn(
        &self,
        battle: &mut Battle<'_>,
        trainer: &mut dyn Trainer,
    ) -> BattleResult<TrainerAction> {
        let team = battle.current_team();
        let action = {
            let mut ctx = battle.decision_context();
            trainer.choose_action(&mut ctx)
        };
        debug!(trainer = trainer.name(), %team, action = ?action, "trainer decided");

        match &action {
            TrainerAction::UseSkill(skill) => {
                battle.execute_attack(skill)?;
            }
            TrainerAction::Switch(index) => battle.switch_creature(team, *index)?,
            TrainerAction::RequestSwitch => {
                let choice = {
                    let mut ctx = battle.decision_context();
                    trainer.choose_creature(&mut ctx)
                };
                match choice {
                    Some(index) => battle.switch_creature(team, index)?,
                    None => battle.pass_turn()?,
                }
            }
            TrainerAction::Escape => {
                battle.try_escape()?;
            }
            TrainerAction::Pass => battle.pass_turn()?,
        }
        Ok(action)
    }

    /// Team B's turn, decided by `trainer`.
    pub fn run_opponent_turn(
        &self,
        battle: &mut Battle<'_>,
        trainer: &mut dyn Trainer,
    ) -> BattleResult<TrainerAction> {
        if battle.current_team() != Team::B {
            return Err(ActionError::NotYourTurn.into());
        }
        self.play_turn(battle, trainer)
    }

    /// Plays the battle out between two trainers. After `max_actions` decisions
    /// without a result the battle is called a draw.
    pub fn run_battle(
        &self,
        battle: &mut Battle<'_>,
        trainer_a: &mut dyn Trainer,
        trainer_b: &mut dyn Trainer,
        max_actions: usize,
    ) -> BattleResult<BattleState> {
        if battle.state() == BattleState::NotStarted {
            battle.start()?;
        }

        for _ in 0..max_actions {
            if battle.is_over() {
                break;
            }
            let trainer: &mut dyn Trainer = match battle.current_team() {
                Team::A => &mut *trainer_a,
                Team::B => &mut *trainer_b,
            };
            if let Err(error) = self.play_turn(battle, trainer) {
                warn!(%error, "action rejected, passing the turn");
                battle.pass_turn()?;
            }
        }

        if !battle.is_over() {
            battle.end_battle(BattleState::Draw);
        }
        Ok(battle.state())
    }

    /// Builds a creature of the named type at `level`, with the roots and a few
    /// random frontier nodes unlocked and up to a full loadout equipped.
    /// Unknown type names fall back to the first type in the roster.
    pub fn spawn_creature(
        &self,
        id: &str,
        name: &str,
        type_name: &str,
        level: u32,
        rng: &mut TurnRng,
    ) -> Creature {
        let element = ElementType::from_name(type_name).unwrap_or_else(|| {
            let fallback = ElementType::roster()[0];
            warn!(type_name, %fallback, "unknown type, using fallback");
            fallback
        });
        self.spawn_with_type(id, name, element, level, rng)
    }

    /// Like [`spawn_creature`](Self::spawn_creature) with a random type.
    pub fn spawn_random_creature(
        &self,
        id: &str,
        name: &str,
        level: u32,
        rng: &mut TurnRng,
    ) -> Creature {
        let roster = ElementType::roster();
        let element = roster[rng.next_index(roster.len(), "spawn type")];
        self.spawn_with_type(id, name, element, level, rng)
    }

    fn spawn_with_type(
        &self,
        id: &str,
        name: &str,
        element: ElementType,
        level: u32,
        rng: &mut TurnRng,
    ) -> Creature {
        let mut creature = Creature::new(id, name, element, self.rules.clone());

        for _ in 1..level {
            let stats = creature.statistics();
            let needed = stats.experience_to_next() - stats.experience();
            if creature.gain_experience(needed, rng) {
                creature.on_level_up();
            }
        }

        let roots: Vec<NodeId> = creature
            .skill_tree()
            .root_nodes()
            .map(|node| node.id.clone())
            .collect();
        for node in &roots {
            if let Err(error) = creature.unlock_skill_node(node) {
                debug!(%node, %error, "root left locked");
            }
        }

        for _ in 0..level / 3 {
            let affordable: Vec<NodeId> = creature
                .skill_tree()
                .available_nodes()
                .into_iter()
                .filter(|node| node.cost <= creature.skill_points())
                .map(|node| node.id.clone())
                .collect();
            if affordable.is_empty() {
                break;
            }
            let pick = &affordable[rng.next_index(affordable.len(), "spawn node")];
            if let Err(error) = creature.unlock_skill_node(pick) {
                debug!(node = %pick, %error, "node left locked");
            }
        }

        let loadout: Vec<_> = creature
            .skill_tree()
            .unlocked_skills()
            .into_iter()
            .take(self.rules.max_equipped_skills)
            .map(|skill| skill.id.clone())
            .collect();
        for skill in &loadout {
            if let Err(error) = creature.equip_skill(skill) {
                debug!(%skill, %error, "skill not equipped");
            }
        }

        creature.recalculate_max_action_points();
        creature.restore_all_action_points();
        info!(creature = %creature, "spawned");
        creature
    }
}
