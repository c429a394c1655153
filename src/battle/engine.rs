use crate::battle::ai::DecisionContext;
use crate::battle::state::{BattleEvent, BattleObserver, BattleState, EventBus, Team};
use crate::creature::{AttackOutcome, Creature};
use crate::errors::{ActionError, BattleResult, BattleStateError, TargetError};
use crate::rng::TurnRng;
use crate::rules::GameRules;
use crate::skill::SkillId;
use tracing::{debug, info};

/// One fight between two teams.
///
/// The creatures belong to the caller and are borrowed for the battle's
/// lifetime; every change (damage, action points, experience) lands on them
/// directly.
pub struct Battle<'a> {
    team_a: Vec<&'a mut Creature>,
    team_b: Vec<&'a mut Creature>,
    active_a: usize,
    active_b: usize,
    turn: u32,
    team_a_turn: bool,
    state: BattleState,
    rules: GameRules,
    rng: TurnRng,
    events: EventBus,
    observers: Vec<Box<dyn BattleObserver + 'a>>,
}

impl<'a> Battle<'a> {
    pub fn new(
        team_a: Vec<&'a mut Creature>,
        team_b: Vec<&'a mut Creature>,
        rules: GameRules,
        rng: TurnRng,
    ) -> Result<Self, BattleStateError> {
        if team_a.is_empty() {
            return Err(BattleStateError::EmptyRoster(Team::A.label()));
        }
        if team_b.is_empty() {
            return Err(BattleStateError::EmptyRoster(Team::B.label()));
        }
        Ok(Self {
            team_a,
            team_b,
            active_a: 0,
            active_b: 0,
            turn: 0,
            team_a_turn: true,
            state: BattleState::NotStarted,
            rules,
            rng,
            events: EventBus::new(),
            observers: Vec::new(),
        })
    }

    pub fn add_observer(&mut self, observer: Box<dyn BattleObserver + 'a>) {
        self.observers.push(observer);
    }

    /// Sends out each team's first creature. The faster one moves first; ties
    /// go to team A.
    pub fn start(&mut self) -> BattleResult<()> {
        if self.state != BattleState::NotStarted {
            return Err(BattleStateError::AlreadyStarted.into());
        }

        self.active_a = 0;
        self.active_b = 0;
        self.state = BattleState::InProgress;
        self.team_a_turn =
            self.team_a[0].statistics().speed() >= self.team_b[0].statistics().speed();

        info!(
            team_a = self.team_a.len(),
            team_b = self.team_b.len(),
            first = %self.current_team(),
            "battle started"
        );
        let event = BattleEvent::BattleStarted {
            team_a: self.team_a.iter().map(|c| c.name.clone()).collect(),
            team_b: self.team_b.iter().map(|c| c.name.clone()).collect(),
            first: self.current_team(),
        };
        self.notify(event);
        self.start_next_turn();
        Ok(())
    }

    /// The current side's active creature uses `skill` on the other side's.
    ///
    /// A rejected attack changes nothing. One that deals no damage keeps its
    /// cost and effects but is not performed: no event, and the turn stays.
    /// A performed one hands the turn over, unless it knocked out the last
    /// defender, which ends the battle.
    pub fn execute_attack(&mut self, skill: &SkillId) -> BattleResult<AttackOutcome> {
        self.ensure_in_progress()?;
        let team = self.current_team();

        let (attacker, defender) = match team {
            Team::A => (&mut *self.team_a[self.active_a], &mut *self.team_b[self.active_b]),
            Team::B => (&mut *self.team_b[self.active_b], &mut *self.team_a[self.active_a]),
        };
        let outcome = match attacker.attack(defender, skill, &mut self.rng) {
            Ok(outcome) => outcome,
            Err(error) => {
                debug!(attacker = %attacker.name, %error, "attack not performed");
                return Err(error.into());
            }
        };
        if !outcome.performed {
            debug!(
                attacker = %attacker.name,
                skill = %skill,
                effectiveness = outcome.effectiveness,
                "attack dealt no damage"
            );
            return Ok(outcome);
        }
        let event = BattleEvent::AttackPerformed {
            team,
            attacker: attacker.name.clone(),
            defender: defender.name.clone(),
            skill: attacker
                .skill(skill)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| skill.to_string()),
            damage: outcome.damage,
            effectiveness: outcome.effectiveness,
        };
        let defeated = defender.is_dead().then(|| defender.name.clone());
        self.notify(event);

        if let Some(creature) = defeated {
            let defending = team.opponent();
            self.notify(BattleEvent::CreatureDefeated {
                team: defending,
                creature,
            });

            match self.first_replacement(defending) {
                Some(index) => self.replace_active(defending, index, true),
                None => {
                    self.end_battle(BattleState::victory_for(team));
                    return Ok(outcome);
                }
            }
        }

        self.advance_turn();
        Ok(outcome)
    }

    /// Puts `team`'s creature at `index` in play.
    ///
    /// Replacing a defeated active creature is free. Swapping out a healthy
    /// one is only allowed on that team's turn and uses it up.
    pub fn switch_creature(&mut self, team: Team, index: usize) -> BattleResult<()> {
        self.ensure_in_progress()?;
        let roster = self.roster(team);
        let target = roster.get(index).ok_or(TargetError::IndexOutOfRange(index))?;
        if target.is_dead() {
            return Err(TargetError::CreatureDefeated(index).into());
        }
        let active = self.active_index(team);
        if index == active {
            return Err(TargetError::AlreadyActive(index).into());
        }

        let forced = roster[active].is_dead();
        if !forced && team != self.current_team() {
            return Err(ActionError::NotYourTurn.into());
        }

        self.replace_active(team, index, forced);
        if !forced {
            self.advance_turn();
        }
        Ok(())
    }

    pub fn switch_creature_a(&mut self, index: usize) -> BattleResult<()> {
        self.switch_creature(Team::A, index)
    }

    pub fn switch_creature_b(&mut self, index: usize) -> BattleResult<()> {
        self.switch_creature(Team::B, index)
    }

    /// Team A tries to run. Only a lone wild opponent can be escaped from;
    /// against a full team this returns `false` without using the turn.
    pub fn try_escape(&mut self) -> BattleResult<bool> {
        self.ensure_in_progress()?;
        if self.current_team() != Team::A {
            return Err(ActionError::NotYourTurn.into());
        }
        if self.team_b.len() != 1 {
            debug!(opponents = self.team_b.len(), "no escaping a trainer battle");
            return Ok(false);
        }

        let chance = self.rules.escape.chance(
            self.team_a[self.active_a].statistics().speed(),
            self.team_b[self.active_b].statistics().speed(),
        );
        let success = self.rng.roll_chance(chance, "escape");
        self.notify(BattleEvent::EscapeAttempted { chance, success });

        if success {
            self.end_battle(BattleState::Escaped);
        } else {
            self.advance_turn();
        }
        Ok(success)
    }

    /// Gives up the current turn.
    pub fn pass_turn(&mut self) -> BattleResult<()> {
        self.ensure_in_progress()?;
        debug!(team = %self.current_team(), "turn passed");
        self.advance_turn();
        Ok(())
    }

    /// Moves to a terminal state. Victories pay out experience to the winners
    /// before `BattleEnded` goes out.
    /// Does nothing once the battle is already over, or if `result` is not a
    /// terminal state.
    pub fn end_battle(&mut self, result: BattleState) {
        if self.state.is_terminal() || !result.is_terminal() {
            return;
        }
        self.state = result;
        info!(result = ?result, turns = self.turn, "battle ended");

        if let Some(winner) = result.winner() {
            self.distribute_experience(winner);
        }
        self.notify(BattleEvent::BattleEnded { result });
    }

    fn distribute_experience(&mut self, winner: Team) {
        let rewards = self.rules.experience.clone();
        let loser_levels: u32 = self
            .roster(winner.opponent())
            .iter()
            .map(|c| c.statistics().level())
            .sum();
        let base = loser_levels * rewards.per_loser_level + self.turn * rewards.per_turn;

        let active = self.active_index(winner);
        let living: Vec<usize> = self
            .roster(winner)
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_dead())
            .map(|(i, _)| i)
            .collect();
        if living.is_empty() {
            return;
        }
        let share = base / living.len() as u32;
        debug!(base, share, recipients = living.len(), "distributing experience");

        for index in living {
            let amount = if index == active {
                share + rewards.active_bonus
            } else {
                share
            };
            let creature = match winner {
                Team::A => &mut *self.team_a[index],
                Team::B => &mut *self.team_b[index],
            };
            let leveled_up = creature.gain_experience(amount, &mut self.rng);
            if leveled_up {
                creature.on_level_up();
            }
            let event = BattleEvent::ExperienceGained {
                team: winner,
                creature: creature.name.clone(),
                amount,
                leveled_up,
            };
            self.notify(event);
        }
    }

    // === Turn plumbing ===

    fn ensure_in_progress(&self) -> Result<(), ActionError> {
        if self.state == BattleState::InProgress {
            Ok(())
        } else {
            Err(ActionError::BattleNotInProgress)
        }
    }

    fn advance_turn(&mut self) {
        self.team_a_turn = !self.team_a_turn;
        self.start_next_turn();
    }

    /// New turn for the side whose flag is set: restore action points and tick
    /// its active creature's effects.
    fn start_next_turn(&mut self) {
        self.turn += 1;
        let turn = self.turn;
        let team = self.current_team();
        let per_turn = self.rules.action_points_per_turn;
        let creature = self.active_mut(team);
        creature.restore_action_points(per_turn);
        creature.update_effects();

        let event = BattleEvent::TurnStarted {
            turn,
            team,
            creature: creature.name.clone(),
            action_points: creature.action_points(),
            max_action_points: creature.max_action_points(),
        };
        debug!(turn, team = %team, "turn started");
        self.notify(event);
    }

    fn first_replacement(&self, team: Team) -> Option<usize> {
        let active = self.active_index(team);
        self.roster(team)
            .iter()
            .enumerate()
            .find(|(i, c)| *i != active && !c.is_dead())
            .map(|(i, _)| i)
    }

    fn replace_active(&mut self, team: Team, index: usize, forced: bool) {
        let old = self.active_creature(team).name.clone();
        match team {
            Team::A => self.active_a = index,
            Team::B => self.active_b = index,
        }
        let new = self.active_creature(team).name.clone();
        info!(%team, %old, %new, forced, "creature switched");
        self.notify(BattleEvent::CreatureSwitched { team, old, new, forced });
    }

    fn notify(&mut self, event: BattleEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
        self.events.push(event);
    }

    fn roster(&self, team: Team) -> &[&'a mut Creature] {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }

    fn active_mut(&mut self, team: Team) -> &mut Creature {
        match team {
            Team::A => &mut *self.team_a[self.active_a],
            Team::B => &mut *self.team_b[self.active_b],
        }
    }

    // === Queries ===

    /// Borrow what a trainer needs to decide for the side whose turn it is.
    pub fn decision_context(&mut self) -> DecisionContext<'_> {
        let team = self.current_team();
        let (own_roster, other_roster, own_active, other_active) = match team {
            Team::A => (&self.team_a, &self.team_b, self.active_a, self.active_b),
            Team::B => (&self.team_b, &self.team_a, self.active_b, self.active_a),
        };
        DecisionContext {
            team,
            own: &*own_roster[own_active],
            opponent: &*other_roster[other_active],
            roster: own_roster.iter().map(|c| &**c).collect(),
            active_index: own_active,
            rules: &self.rules,
            rng: &mut self.rng,
        }
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn current_turn(&self) -> u32 {
        self.turn
    }

    pub fn is_team_a_turn(&self) -> bool {
        self.team_a_turn
    }

    pub fn current_team(&self) -> Team {
        if self.team_a_turn {
            Team::A
        } else {
            Team::B
        }
    }

    pub fn active_index(&self, team: Team) -> usize {
        match team {
            Team::A => self.active_a,
            Team::B => self.active_b,
        }
    }

    pub fn active_creature(&self, team: Team) -> &Creature {
        &*self.roster(team)[self.active_index(team)]
    }

    pub fn team(&self, team: Team) -> Vec<&Creature> {
        self.roster(team).iter().map(|c| &**c).collect()
    }

    pub fn team_size(&self, team: Team) -> usize {
        self.roster(team).len()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }
}
