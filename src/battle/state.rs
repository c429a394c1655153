use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    pub fn label(self) -> char {
        match self {
            Team::A => 'A',
            Team::B => 'B',
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team {}", self.label())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleState {
    NotStarted,
    InProgress,
    TeamAVictory,
    TeamBVictory,
    Escaped,
    Draw,
}

impl BattleState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, BattleState::NotStarted | BattleState::InProgress)
    }

    pub fn victory_for(team: Team) -> BattleState {
        match team {
            Team::A => BattleState::TeamAVictory,
            Team::B => BattleState::TeamBVictory,
        }
    }

    pub fn winner(self) -> Option<Team> {
        match self {
            BattleState::TeamAVictory => Some(Team::A),
            BattleState::TeamBVictory => Some(Team::B),
            _ => None,
        }
    }
}

/// Notifications emitted by a battle, in the order they happen.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    BattleStarted {
        team_a: Vec<String>,
        team_b: Vec<String>,
        first: Team,
    },
    TurnStarted {
        turn: u32,
        team: Team,
        creature: String,
        action_points: u32,
        max_action_points: u32,
    },
    AttackPerformed {
        team: Team,
        attacker: String,
        defender: String,
        skill: String,
        damage: u32,
        effectiveness: f64,
    },
    CreatureDefeated {
        team: Team,
        creature: String,
    },
    CreatureSwitched {
        team: Team,
        old: String,
        new: String,
        forced: bool,
    },
    EscapeAttempted {
        chance: f64,
        success: bool,
    },
    BattleEnded {
        result: BattleState,
    },
    ExperienceGained {
        team: Team,
        creature: String,
        amount: u32,
        leveled_up: bool,
    },
}

impl BattleEvent {
    /// Human-readable text for this event.
    pub fn format(&self) -> String {
        match self {
            BattleEvent::BattleStarted { team_a, team_b, first } => format!(
                "Battle started: {} vs {}. {} moves first.",
                team_a.join(", "),
                team_b.join(", "),
                first
            ),
            BattleEvent::TurnStarted {
                turn,
                team,
                creature,
                action_points,
                max_action_points,
            } => format!(
                "=== Turn {} === {}'s {} ({}/{} AP)",
                turn, team, creature, action_points, max_action_points
            ),
            BattleEvent::AttackPerformed {
                attacker,
                defender,
                skill,
                damage,
                effectiveness,
                ..
            } => {
                let mut message =
                    format!("{} used {} on {} for {} damage!", attacker, skill, defender, damage);
                if let Some(remark) = effectiveness_remark(*effectiveness) {
                    message.push(' ');
                    message.push_str(remark);
                }
                message
            }
            BattleEvent::CreatureDefeated { creature, .. } => format!("{} was defeated!", creature),
            BattleEvent::CreatureSwitched { team, old, new, forced } => {
                if *forced {
                    format!("{} sent out {} to replace {}.", team, new, old)
                } else {
                    format!("{} recalled {} and sent out {}.", team, old, new)
                }
            }
            BattleEvent::EscapeAttempted { success: true, .. } => "Got away safely!".to_string(),
            BattleEvent::EscapeAttempted { success: false, .. } => "Couldn't escape!".to_string(),
            BattleEvent::BattleEnded { result } => match result {
                BattleState::TeamAVictory => "Team A is victorious!".to_string(),
                BattleState::TeamBVictory => "Team B is victorious!".to_string(),
                BattleState::Escaped => "The battle ended in an escape.".to_string(),
                BattleState::Draw => "The battle ended in a draw.".to_string(),
                other => format!("The battle ended ({:?}).", other),
            },
            BattleEvent::ExperienceGained {
                creature,
                amount,
                leveled_up,
                ..
            } => {
                if *leveled_up {
                    format!("{} gained {} experience and leveled up!", creature, amount)
                } else {
                    format!("{} gained {} experience.", creature, amount)
                }
            }
        }
    }
}

/// Commentary for an effectiveness multiplier, if it deserves any.
pub fn effectiveness_remark(effectiveness: f64) -> Option<&'static str> {
    if effectiveness == 0.0 {
        Some("It had no effect...")
    } else if effectiveness > 1.5 {
        Some("It's super effective!")
    } else if effectiveness < 0.5 {
        Some("It's not very effective...")
    } else {
        None
    }
}

/// Receives every battle notification synchronously, as it is emitted.
pub trait BattleObserver {
    fn on_event(&mut self, event: &BattleEvent);
}

impl<T: BattleObserver + ?Sized> BattleObserver for &mut T {
    fn on_event(&mut self, event: &BattleEvent) {
        (**self).on_event(event);
    }
}

/// Every event a battle has emitted so far.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Events emitted at or after `index`.
    pub fn since(&self, index: usize) -> &[BattleEvent] {
        self.events.get(index..).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {}", event.format())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_terminal_states() {
        assert!(!BattleState::NotStarted.is_terminal());
        assert!(!BattleState::InProgress.is_terminal());
        assert!(BattleState::TeamAVictory.is_terminal());
        assert!(BattleState::Escaped.is_terminal());
        assert!(BattleState::Draw.is_terminal());
        assert_eq!(BattleState::victory_for(Team::B).winner(), Some(Team::B));
        assert_eq!(BattleState::Escaped.winner(), None);
    }

    #[test]
    fn test_effectiveness_remarks() {
        assert_eq!(effectiveness_remark(2.0), Some("It's super effective!"));
        assert_eq!(effectiveness_remark(1.0), None);
        assert_eq!(effectiveness_remark(0.5), None);
        assert_eq!(effectiveness_remark(0.25), Some("It's not very effective..."));
        assert_eq!(effectiveness_remark(0.0), Some("It had no effect..."));
    }

    #[test]
    fn test_event_bus_collects_in_order() {
        let mut bus = EventBus::new();
        bus.push(BattleEvent::BattleStarted {
            team_a: vec!["Ember".to_string()],
            team_b: vec!["Sprout".to_string()],
            first: Team::A,
        });
        bus.push(BattleEvent::AttackPerformed {
            team: Team::A,
            attacker: "Ember".to_string(),
            defender: "Sprout".to_string(),
            skill: "Basic Attack".to_string(),
            damage: 10,
            effectiveness: 2.0,
        });

        assert_eq!(bus.len(), 2);
        assert_eq!(bus.since(1).len(), 1);
        assert!(bus.since(5).is_empty());

        let output = format!("{}", bus);
        assert!(output.contains("Team A moves first"));
        assert!(output.contains("Ember used Basic Attack on Sprout for 10 damage! It's super effective!"));
    }
}
