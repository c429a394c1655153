use crate::battle::engine::Battle;
use crate::battle::state::{BattleEvent, Team};
use crate::creature::Creature;
use crate::errors::BattleResult;
use crate::rng::TurnRng;
use crate::rules::GameRules;
use crate::skill::{NodeId, Skill, SkillId, SkillNode};
use crate::statistics::{CoreAttributes, Statistics};
use schema::ElementType;

/// A builder for creating test creatures with common defaults.
///
/// Every built creature has its basic attack unlocked and equipped.
///
/// # Example
/// ```ignore
/// let creature = TestCreatureBuilder::new("ember", ElementType::Fire)
///     .with_level(5)
///     .with_speed(14)
///     .with_health(20)
///     .build();
/// ```
pub struct TestCreatureBuilder {
    id: String,
    element: ElementType,
    level: u32,
    attributes: CoreAttributes,
    health: Option<u32>,
    experience: Option<u32>,
    action_points: Option<u32>,
    tree_nodes: Vec<&'static str>,
    extra_skills: Vec<Skill>,
}

impl TestCreatureBuilder {
    /// Creates a new builder. The id doubles as the creature's name.
    pub fn new(id: &str, element: ElementType) -> Self {
        Self {
            id: id.to_string(),
            element,
            level: 1,
            attributes: CoreAttributes::default(),
            health: None,
            experience: None,
            action_points: None,
            tree_nodes: Vec::new(),
            extra_skills: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.attributes.speed = speed;
        self
    }

    pub fn with_strength(mut self, strength: u32) -> Self {
        self.attributes.strength = strength;
        self
    }

    /// Sets the current health. If not set, health will be max.
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = Some(health);
        self
    }

    pub fn with_experience(mut self, experience: u32) -> Self {
        self.experience = Some(experience);
        self
    }

    pub fn with_action_points(mut self, action_points: u32) -> Self {
        self.action_points = Some(action_points);
        self
    }

    /// Unlocks and equips a node from the creature's own tree.
    pub fn with_tree_skill(mut self, node: &'static str) -> Self {
        self.tree_nodes.push(node);
        self
    }

    /// Grafts a free root node carrying `skill` and equips it.
    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.extra_skills.push(skill);
        self
    }

    pub fn build(self) -> Creature {
        let mut stats = Statistics::new(self.element)
            .with_level(self.level)
            .with_attributes(self.attributes);
        if let Some(experience) = self.experience {
            stats = stats.with_experience(experience);
        }

        let mut creature = Creature::from_statistics(&self.id, &self.id, stats, GameRules::default());
        creature.gain_skill_points(100);

        let mut nodes: Vec<NodeId> = vec![NodeId::from("node_basic_attack")];
        nodes.extend(self.tree_nodes.iter().map(|id| NodeId::from(*id)));
        for skill in self.extra_skills {
            let node_id = format!("node_test_{}", skill.id);
            assert!(creature.skill_tree_mut().add_node(SkillNode::new(&node_id, skill, 0)));
            nodes.push(NodeId::new(node_id));
        }

        for node_id in &nodes {
            if let Err(err) = creature.unlock_skill_node(node_id) {
                panic!("Failed to unlock {} for {}: {}", node_id, self.id, err);
            }
            let skill_id = match creature.skill_tree().node(node_id) {
                Some(node) => node.skill.id.clone(),
                None => panic!("Node {} vanished from the tree", node_id),
            };
            if let Err(err) = creature.equip_skill(&skill_id) {
                panic!("Failed to equip {} for {}: {}", skill_id, self.id, err);
            }
        }

        if let Some(health) = self.health {
            creature.statistics_mut().set_health(health);
        }
        if let Some(action_points) = self.action_points {
            creature.set_action_points(action_points);
        }
        creature
    }
}

/// Id of the basic attack every creature's tree starts with.
pub fn basic_attack(element: ElementType) -> SkillId {
    SkillId::new(format!("skill_basic_{}", element.name().to_lowercase()))
}

/// Id of the shield skill from the basic defense node.
pub fn basic_defense(element: ElementType) -> SkillId {
    SkillId::new(format!("skill_defense_{}", element.name().to_lowercase()))
}

/// Wraps both rosters in a battle with default rules. Nothing is started.
pub fn create_test_battle<'a>(
    team_a: &'a mut [Creature],
    team_b: &'a mut [Creature],
    rng: TurnRng,
) -> Battle<'a> {
    match Battle::new(
        team_a.iter_mut().collect(),
        team_b.iter_mut().collect(),
        GameRules::default(),
        rng,
    ) {
        Ok(battle) => battle,
        Err(err) => panic!("Failed to create test battle: {}", err),
    }
}

/// Creates a `TurnRng` instance with a long list of default values (50).
/// Useful for tests where the specific RNG outcome is not important, preventing panics from exhaustion.
pub fn predictable_rng() -> TurnRng {
    TurnRng::new_for_test(vec![50; 100])
}

/// Helper function to assert that a Result is Ok and return the value.
/// Provides clear error messages in tests when functions unexpectedly fail.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}

/// Helper function to assert that a boolean Result is Ok and true.
pub fn assert_ok_true(result: BattleResult<bool>) -> bool {
    let value = assert_ok(result);
    assert!(value, "Expected true but got false");
    value
}

/// Helper function to assert that a boolean Result is Ok and false.
pub fn assert_ok_false(result: BattleResult<bool>) -> bool {
    let value = assert_ok(result);
    assert!(!value, "Expected false but got true");
    value
}

/// `(turn, team)` of every `TurnStarted` event so far.
pub fn turns_started(battle: &Battle<'_>) -> Vec<(u32, Team)> {
    battle
        .events()
        .events()
        .iter()
        .filter_map(|event| match event {
            BattleEvent::TurnStarted { turn, team, .. } => Some((*turn, *team)),
            _ => None,
        })
        .collect()
}
