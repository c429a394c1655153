//! Per-creature unlock graph of skills.
//!
//! Nodes live in a flat arena and refer to each other by [`NodeId`]. The
//! layout is fixed by the owner's primary type:
//!
//! ```text
//! basic_attack ──┬── status_<type>
//!                ├── physical_improved
//!                └── physical_quick
//! basic_defense ─┬── self_buff
//!                └── healing
//! <type>_1 ──────┬── <type>_2
//!                └── <type>_area
//! ```

use super::{Skill, SkillEffect, SkillId};
use crate::errors::{LookupError, TargetError};
use schema::{Attribute, ElementType, SkillCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

/// Why an unlock was refused. The tree never changes when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnlockError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Target(#[from] TargetError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillNode {
    pub id: NodeId,
    pub skill: Skill,
    /// Skill points needed to unlock.
    pub cost: u32,
    unlocked: bool,
    children: Vec<NodeId>,
    prerequisites: Vec<NodeId>,
}

impl SkillNode {
    pub fn new(id: &str, skill: Skill, cost: u32) -> Self {
        Self {
            id: NodeId::from(id),
            skill,
            cost,
            unlocked: false,
            children: Vec::new(),
            prerequisites: Vec::new(),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn prerequisites(&self) -> &[NodeId] {
        &self.prerequisites
    }
}

/// Where a presentation layer should draw a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLayout {
    pub id: NodeId,
    pub skill_name: String,
    pub depth: usize,
    pub position: usize,
    pub unlocked: bool,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTree {
    primary_type: ElementType,
    nodes: Vec<SkillNode>,
    index: HashMap<NodeId, usize>,
    roots: Vec<NodeId>,
}

impl SkillTree {
    /// Builds the standard tree for `primary_type`. Deterministic.
    pub fn new(primary_type: ElementType) -> Self {
        let mut tree = Self {
            primary_type,
            nodes: Vec::new(),
            index: HashMap::new(),
            roots: Vec::new(),
        };
        tree.build_roots();
        tree.build_branches();
        tree
    }

    fn build_roots(&mut self) {
        let element = self.primary_type;
        let type_key = element.name().to_lowercase();

        let basic_attack = Skill::new(
            format!("skill_basic_{type_key}").as_str(),
            "Basic Attack",
            element,
            SkillCategory::Physical,
            5,
            95,
            1,
        )
        .with_description("A simple strike that costs little energy.");
        self.add_root(SkillNode::new("node_basic_attack", basic_attack, 0));

        let basic_defense = Skill::new(
            format!("skill_defense_{type_key}").as_str(),
            "Basic Defense",
            element,
            SkillCategory::Status,
            0,
            100,
            1,
        )
        .with_description("Briefly hardens the body.")
        .with_effect(SkillEffect::stat_boost(
            "effect_def_boost",
            "Shield",
            Attribute::Constitution,
            5,
            3,
            1.0,
        ));
        self.add_root(SkillNode::new("node_basic_defense", basic_defense, 0));

        let type_attack = Skill::new(
            format!("skill_{type_key}_1").as_str(),
            format!("{element} Level 1"),
            element,
            SkillCategory::Special,
            15,
            90,
            2,
        )
        .with_description(format!("A basic {element} attack."));
        self.add_root(SkillNode::new(&format!("node_{type_key}_1"), type_attack, 1));

        let effect_name = match element {
            ElementType::Fire => "Burn".to_string(),
            ElementType::Water => "Soak".to_string(),
            ElementType::Nature => "Poison".to_string(),
            ElementType::Electric => "Paralysis".to_string(),
            ElementType::Dark => "Fear".to_string(),
            other => format!("{other} Effect"),
        };
        let status_skill = Skill::new(
            format!("skill_status_{type_key}").as_str(),
            effect_name.as_str(),
            element,
            SkillCategory::Status,
            5,
            85,
            2,
        )
        .with_description(format!("Inflicts {}.", effect_name.to_lowercase()))
        .with_effect(SkillEffect::status(
            &format!("effect_{type_key}_status"),
            &effect_name,
            5,
            3,
            0.7,
        ));
        let status_id = self.insert(SkillNode::new(
            &format!("node_status_{type_key}"),
            status_skill,
            2,
        ));
        self.link(&NodeId::from("node_basic_attack"), &status_id);
    }

    fn build_branches(&mut self) {
        let roots: Vec<(NodeId, SkillCategory)> = self
            .roots
            .iter()
            .filter_map(|id| self.node(id).map(|node| (id.clone(), node.skill.category)))
            .collect();

        for (root, category) in roots {
            match category {
                SkillCategory::Physical => self.physical_branch(&root),
                SkillCategory::Special => self.special_branch(&root),
                SkillCategory::Status => self.status_branch(&root),
            }
        }
    }

    fn physical_branch(&mut self, parent: &NodeId) {
        let element = self.primary_type;
        let improved = Skill::new(
            "skill_physical_improved",
            "Power Strike",
            element,
            SkillCategory::Physical,
            30,
            80,
            3,
        )
        .with_description("A heavier blow that is harder to land.");
        let quick = Skill::new(
            "skill_physical_quick",
            "Quick Attack",
            element,
            SkillCategory::Physical,
            10,
            95,
            1,
        )
        .with_description("A light blow that strikes first.");

        let improved = self.insert(SkillNode::new("node_physical_improved", improved, 3));
        self.link(parent, &improved);
        let quick = self.insert(SkillNode::new("node_physical_quick", quick, 2));
        self.link(parent, &quick);
    }

    fn special_branch(&mut self, parent: &NodeId) {
        let element = self.primary_type;
        let type_key = element.name().to_lowercase();
        let improved = Skill::new(
            format!("skill_{type_key}_2").as_str(),
            format!("{element} Level 2"),
            element,
            SkillCategory::Special,
            25,
            85,
            3,
        )
        .with_description(format!("A stronger {element} attack."));
        let area = Skill::new(
            format!("skill_{type_key}_area").as_str(),
            format!("{element} Wave"),
            element,
            SkillCategory::Special,
            20,
            80,
            4,
        )
        .with_description(format!("A {element} attack that sweeps an area."));

        let improved = self.insert(SkillNode::new(&format!("node_{type_key}_2"), improved, 4));
        self.link(parent, &improved);
        let area = self.insert(SkillNode::new(&format!("node_{type_key}_area"), area, 5));
        self.link(parent, &area);
    }

    fn status_branch(&mut self, parent: &NodeId) {
        let element = self.primary_type;
        let focus = Skill::new(
            "skill_self_buff",
            "Focus",
            element,
            SkillCategory::Status,
            0,
            100,
            2,
        )
        .with_description("Temporarily sharpens strength and speed.")
        .with_effect(SkillEffect::stat_boost(
            "effect_str_boost",
            "Strength Up",
            Attribute::Strength,
            7,
            3,
            1.0,
        ))
        .with_effect(SkillEffect::stat_boost(
            "effect_spd_boost",
            "Speed Up",
            Attribute::Speed,
            5,
            3,
            1.0,
        ));
        let restoration = Skill::new(
            "skill_healing",
            "Restoration",
            element,
            SkillCategory::Status,
            0,
            100,
            3,
        )
        .with_description("Restores part of the target's health.")
        .with_effect(SkillEffect::healing("effect_healing", "Heal", 15, 1.0));

        let focus = self.insert(SkillNode::new("node_self_buff", focus, 3));
        self.link(parent, &focus);
        let restoration = self.insert(SkillNode::new("node_healing", restoration, 4));
        self.link(parent, &restoration);
    }

    fn add_root(&mut self, node: SkillNode) {
        let id = self.insert(node);
        self.roots.push(id);
    }

    /// Adds an extra node with no prerequisites. Returns false if the id is taken.
    pub fn add_node(&mut self, node: SkillNode) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        self.insert(node);
        true
    }

    /// Adds an extra node under `parent`. Returns false if the id is taken or
    /// the parent does not exist.
    pub fn add_child(&mut self, parent: &NodeId, node: SkillNode) -> bool {
        if self.index.contains_key(&node.id) || !self.index.contains_key(parent) {
            return false;
        }
        let child = self.insert(node);
        self.link(parent, &child);
        true
    }

    fn insert(&mut self, node: SkillNode) -> NodeId {
        let id = node.id.clone();
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn link(&mut self, parent: &NodeId, child: &NodeId) {
        if let Some(&p) = self.index.get(parent) {
            self.nodes[p].children.push(child.clone());
        }
        if let Some(&c) = self.index.get(child) {
            self.nodes[c].prerequisites.push(parent.clone());
        }
    }

    // === Queries ===

    pub fn primary_type(&self) -> ElementType {
        self.primary_type
    }

    pub fn node(&self, id: &NodeId) -> Option<&SkillNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SkillNode> {
        self.nodes.iter()
    }

    pub fn root_nodes(&self) -> impl Iterator<Item = &SkillNode> {
        self.roots.iter().filter_map(|id| self.node(id))
    }

    fn prerequisites_met(&self, node: &SkillNode) -> bool {
        node.prerequisites
            .iter()
            .all(|p| self.node(p).is_some_and(SkillNode::is_unlocked))
    }

    /// The unlock frontier: locked nodes whose prerequisites are all unlocked.
    pub fn available_nodes(&self) -> Vec<&SkillNode> {
        self.nodes
            .iter()
            .filter(|node| !node.unlocked && self.prerequisites_met(node))
            .collect()
    }

    pub fn unlocked_skills(&self) -> Vec<&Skill> {
        self.nodes
            .iter()
            .filter(|node| node.unlocked)
            .map(|node| &node.skill)
            .collect()
    }

    pub fn is_skill_unlocked(&self, skill: &SkillId) -> bool {
        self.nodes
            .iter()
            .any(|node| node.unlocked && &node.skill.id == skill)
    }

    pub fn unlocked_node_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.unlocked)
            .map(|node| node.id.clone())
            .collect()
    }

    /// The unlocked skill with this id, wherever it sits in the tree.
    pub fn skill(&self, id: &SkillId) -> Option<&Skill> {
        self.nodes
            .iter()
            .find(|node| node.unlocked && &node.skill.id == id)
            .map(|node| &node.skill)
    }

    pub fn skill_mut(&mut self, id: &SkillId) -> Option<&mut Skill> {
        self.nodes
            .iter_mut()
            .find(|node| node.unlocked && &node.skill.id == id)
            .map(|node| &mut node.skill)
    }

    // === Mutation ===

    /// Marks `id` unlocked if it exists, is still locked, costs no more than
    /// `available_points` and has every prerequisite unlocked. Spending the
    /// points is the caller's job.
    pub fn unlock(&mut self, id: &NodeId, available_points: u32) -> Result<&SkillNode, UnlockError> {
        let &i = self
            .index
            .get(id)
            .ok_or_else(|| LookupError::UnknownNode(id.clone()))?;
        let node = &self.nodes[i];

        if node.unlocked {
            return Err(TargetError::AlreadyUnlocked(id.clone()).into());
        }
        if available_points < node.cost {
            return Err(TargetError::InsufficientSkillPoints {
                required: node.cost,
                available: available_points,
            }
            .into());
        }
        if !self.prerequisites_met(node) {
            return Err(TargetError::PrerequisitesNotMet(id.clone()).into());
        }

        self.nodes[i].unlocked = true;
        Ok(&self.nodes[i])
    }

    /// Depth from the roots and left-to-right slot within each depth.
    pub fn visual_layout(&self) -> Vec<NodeLayout> {
        let mut depths: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut stack: Vec<(NodeId, usize)> =
            self.roots.iter().rev().map(|id| (id.clone(), 0)).collect();

        while let Some((id, depth)) = stack.pop() {
            let Some(&i) = self.index.get(&id) else {
                continue;
            };
            if depths[i].is_some_and(|d| d <= depth) {
                continue;
            }
            depths[i] = Some(depth);
            for child in self.nodes[i].children.iter().rev() {
                stack.push((child.clone(), depth + 1));
            }
        }

        let mut slots: HashMap<usize, usize> = HashMap::new();
        self.nodes
            .iter()
            .zip(depths)
            .filter_map(|(node, depth)| {
                let depth = depth?;
                let slot = slots.entry(depth).or_insert(0);
                let position = *slot;
                *slot += 1;
                Some(NodeLayout {
                    id: node.id.clone(),
                    skill_name: node.skill.name.clone(),
                    depth,
                    position,
                    unlocked: node.unlocked,
                    available: !node.unlocked && self.prerequisites_met(node),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn ids<'a>(nodes: impl IntoIterator<Item = &'a SkillNode>) -> Vec<&'a str> {
        nodes.into_iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_standard_shape() {
        let tree = SkillTree::new(ElementType::Fire);

        assert_eq!(tree.nodes().count(), 10);
        assert_eq!(
            ids(tree.root_nodes()),
            vec!["node_basic_attack", "node_basic_defense", "node_fire_1"]
        );
        assert_eq!(
            ids(tree.available_nodes()),
            vec!["node_basic_attack", "node_basic_defense", "node_fire_1"]
        );

        let status = tree.node(&NodeId::from("node_status_fire")).unwrap();
        assert_eq!(status.skill.name, "Burn");
        assert_eq!(status.prerequisites(), &[NodeId::from("node_basic_attack")]);
        assert_eq!(status.skill.effects()[0].chance, 0.7);
    }

    #[rstest]
    #[case(ElementType::Water, "Soak")]
    #[case(ElementType::Nature, "Poison")]
    #[case(ElementType::Electric, "Paralysis")]
    #[case(ElementType::Dark, "Fear")]
    #[case(ElementType::Metal, "Metal Effect")]
    fn test_status_node_follows_type(#[case] element: ElementType, #[case] expected: &str) {
        let tree = SkillTree::new(element);
        let key = format!("node_status_{}", element.name().to_lowercase());
        assert_eq!(tree.node(&NodeId::new(key)).unwrap().skill.name, expected);
    }

    #[test]
    fn test_construction_is_deterministic() {
        assert_eq!(SkillTree::new(ElementType::Air), SkillTree::new(ElementType::Air));
    }

    #[test]
    fn test_unlock_requires_prerequisites_and_points() {
        let mut tree = SkillTree::new(ElementType::Fire);
        let quick = NodeId::from("node_physical_quick");

        assert_eq!(
            tree.unlock(&quick, 10).unwrap_err(),
            UnlockError::Target(TargetError::PrerequisitesNotMet(quick.clone()))
        );

        tree.unlock(&NodeId::from("node_basic_attack"), 0).unwrap();
        assert_eq!(
            tree.unlock(&quick, 1).unwrap_err(),
            UnlockError::Target(TargetError::InsufficientSkillPoints {
                required: 2,
                available: 1
            })
        );
        assert!(tree.unlock(&quick, 2).is_ok());
        assert!(tree.is_skill_unlocked(&SkillId::from("skill_physical_quick")));
    }

    #[test]
    fn test_unlock_twice_fails() {
        let mut tree = SkillTree::new(ElementType::Water);
        let root = NodeId::from("node_water_1");
        assert!(tree.unlock(&root, 5).is_ok());
        assert_eq!(
            tree.unlock(&root, 5).unwrap_err(),
            UnlockError::Target(TargetError::AlreadyUnlocked(root))
        );
    }

    #[test]
    fn test_unknown_node() {
        let mut tree = SkillTree::new(ElementType::Water);
        let missing = NodeId::from("node_missing");
        assert_eq!(
            tree.unlock(&missing, 99).unwrap_err(),
            UnlockError::Lookup(LookupError::UnknownNode(missing))
        );
    }

    #[test]
    fn test_frontier_moves_as_nodes_unlock() {
        let mut tree = SkillTree::new(ElementType::Dark);
        tree.unlock(&NodeId::from("node_basic_defense"), 0).unwrap();

        let frontier = ids(tree.available_nodes());
        assert!(frontier.contains(&"node_self_buff"));
        assert!(frontier.contains(&"node_healing"));
        assert!(!frontier.contains(&"node_basic_defense"));
        assert!(!frontier.contains(&"node_dark_2"));
        assert_eq!(tree.unlocked_skills().len(), 1);
    }

    #[test]
    fn test_extra_nodes() {
        let mut tree = SkillTree::new(ElementType::Ground);
        let quake = Skill::new("skill_quake", "Quake", ElementType::Ground, SkillCategory::Special, 40, 80, 5);
        let tremor = Skill::new("skill_tremor", "Tremor", ElementType::Ground, SkillCategory::Special, 10, 90, 1);

        assert!(tree.add_node(SkillNode::new("node_quake", quake.clone(), 2)));
        assert!(!tree.add_node(SkillNode::new("node_quake", quake, 2)));
        assert!(tree.add_child(&NodeId::from("node_quake"), SkillNode::new("node_tremor", tremor.clone(), 1)));
        assert!(!tree.add_child(&NodeId::from("node_nowhere"), SkillNode::new("node_x", tremor, 1)));

        let frontier = ids(tree.available_nodes());
        assert!(frontier.contains(&"node_quake"));
        assert!(!frontier.contains(&"node_tremor"));
    }

    #[test]
    fn test_visual_layout_depths() {
        let tree = SkillTree::new(ElementType::Light);
        let layout = tree.visual_layout();
        assert_eq!(layout.len(), 10);

        let find = |id: &str| layout.iter().find(|n| n.id.as_str() == id).unwrap();
        assert_eq!(find("node_basic_attack").depth, 0);
        assert_eq!(find("node_basic_attack").position, 0);
        assert_eq!(find("node_light_1").position, 2);
        assert_eq!(find("node_light_area").depth, 1);
        assert!(find("node_basic_defense").available);
        assert!(!find("node_healing").available);
    }
}
