use crate::skill::tree::{NodeId, UnlockError};
use crate::skill::SkillId;
use thiserror::Error;

/// Main error type for the creature battle engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleEngineError {
    /// An attack, escape or switch was attempted when it is not allowed
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
    /// A switch, unlock or equip referenced something it cannot use
    #[error("Target error: {0}")]
    Target(#[from] TargetError),
    /// Error related to invalid battle state
    #[error("Battle state error: {0}")]
    BattleState(#[from] BattleStateError),
    /// A named asset does not exist
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),
    /// Rules could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<UnlockError> for BattleEngineError {
    fn from(error: UnlockError) -> Self {
        match error {
            UnlockError::Lookup(e) => BattleEngineError::Lookup(e),
            UnlockError::Target(e) => BattleEngineError::Target(e),
        }
    }
}

/// Rejected actions. Nothing is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("skill {0} is not equipped")]
    SkillNotEquipped(SkillId),
    #[error("not enough action points: need {required}, have {available}")]
    InsufficientActionPoints { required: u32, available: u32 },
    #[error("the battle is not in progress")]
    BattleNotInProgress,
    #[error("it is not this team's turn")]
    NotYourTurn,
}

/// Invalid references to creatures, nodes or skills.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("creature index {0} is out of range")]
    IndexOutOfRange(usize),
    #[error("creature at index {0} is defeated")]
    CreatureDefeated(usize),
    #[error("creature at index {0} is already active")]
    AlreadyActive(usize),
    #[error("node {0} is already unlocked")]
    AlreadyUnlocked(NodeId),
    #[error("node {0} has locked prerequisites")]
    PrerequisitesNotMet(NodeId),
    #[error("not enough skill points: need {required}, have {available}")]
    InsufficientSkillPoints { required: u32, available: u32 },
    #[error("skill {0} is not unlocked")]
    SkillNotUnlocked(SkillId),
    #[error("skill {0} is not in the loadout")]
    NotEquipped(SkillId),
    #[error("skill {0} is already equipped")]
    SkillAlreadyEquipped(SkillId),
    #[error("no free skill slot (limit {0})")]
    LoadoutFull(usize),
    #[error("a creature can carry at most two types")]
    TooManyTypes,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleStateError {
    #[error("team {0} has no creatures able to fight")]
    EmptyRoster(char),
    #[error("the battle has already started")]
    AlreadyStarted,
}

/// Something looked up by name or id does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unknown type: {0}")]
    UnknownType(String),
    #[error("unknown skill node: {0}")]
    UnknownNode(NodeId),
    #[error("unknown skill: {0}")]
    UnknownSkill(SkillId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("could not parse rules: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results of action attempts
pub type ActionResult<T> = Result<T, ActionError>;

/// Type alias for Results of unlock / equip / switch attempts
pub type TargetResult<T> = Result<T, TargetError>;
