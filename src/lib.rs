//! Creature Battle Engine
//!
//! Turn-based combat between two teams of creatures: elemental type matchups,
//! levelable statistics, skill trees, and a scoring opponent heuristic. Every
//! random decision goes through an injectable [`TurnRng`], so battles replay
//! exactly under a fixed seed.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod creature;
pub mod errors;
pub mod rng;
pub mod rules;
pub mod skill;
pub mod statistics;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{Attribute, EffectKind, ElementType, SkillCategory, TypeChart};

// --- From this crate's modules (`src/`) ---

// Battle state machine, events and orchestration.
pub use battle::ai::{DecisionContext, HeuristicTrainer, HumanTrainer, Strategy, Trainer, TrainerAction};
pub use battle::engine::Battle;
pub use battle::manager::{BattleListener, BattleManager};
pub use battle::state::{BattleEvent, BattleObserver, BattleState, EventBus, Team};

// Creatures and what they are made of.
pub use creature::{AttackOutcome, Creature, CreatureSnapshot};
pub use skill::tree::{NodeLayout, UnlockError};
pub use skill::{NodeId, Skill, SkillEffect, SkillId, SkillNode, SkillTree};
pub use statistics::{CoreAttributes, ExperienceCurve, Statistics};

// Randomness and tunables.
pub use rng::TurnRng;
pub use rules::{EscapeRules, ExperienceRewards, GameRules};

// Crate-specific error and result types.
pub use errors::{
    ActionError, ActionResult, BattleEngineError, BattleResult, BattleStateError, ConfigError,
    LookupError, TargetError, TargetResult,
};
