use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The fixed roster of elemental types a creature or skill can carry.
///
/// Identity is the variant itself, so equality and hashing are by name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ElementType {
    Fire,
    Water,
    Nature,
    Electric,
    Ground,
    Air,
    Psychic,
    Dark,
    Light,
    Metal,
}

impl ElementType {
    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn description(&self) -> &'static str {
        match self {
            ElementType::Fire => "Fire type, powerful but volatile",
            ElementType::Water => "Water type, fluid and adaptable",
            ElementType::Nature => "Nature type, regenerative and patient",
            ElementType::Electric => "Electric type, fast and unpredictable",
            ElementType::Ground => "Ground type, stable and resilient",
            ElementType::Air => "Air type, agile and elusive",
            ElementType::Psychic => "Psychic type, mentally powerful",
            ElementType::Dark => "Dark type, stealthy and cunning",
            ElementType::Light => "Light type, piercing and revealing",
            ElementType::Metal => "Metal type, solid and resistant",
        }
    }

    /// Look a type up by its display name. Case-insensitive.
    pub fn from_name(name: &str) -> Option<ElementType> {
        name.trim().parse().ok()
    }

    /// All types in roster order.
    pub fn roster() -> Vec<ElementType> {
        ElementType::iter().collect()
    }
}

// Attacking type, defending type, multiplier. Pairs not listed are neutral (1.0).
const STANDARD_MATCHUPS: [(ElementType, ElementType, f64); 34] = {
    use ElementType::*;
    [
        // Fire
        (Fire, Nature, 2.0),
        (Fire, Metal, 2.0),
        (Fire, Water, 0.5),
        (Fire, Ground, 0.5),
        // Water
        (Water, Fire, 2.0),
        (Water, Ground, 2.0),
        (Water, Nature, 0.5),
        (Water, Electric, 0.5),
        // Nature
        (Nature, Water, 2.0),
        (Nature, Ground, 2.0),
        (Nature, Fire, 0.5),
        (Nature, Air, 0.5),
        // Electric
        (Electric, Water, 2.0),
        (Electric, Air, 2.0),
        (Electric, Ground, 0.0),
        (Electric, Nature, 0.5),
        // Ground
        (Ground, Fire, 2.0),
        (Ground, Electric, 2.0),
        (Ground, Metal, 2.0),
        (Ground, Air, 0.0),
        (Ground, Nature, 0.5),
        // Air
        (Air, Nature, 2.0),
        (Air, Ground, 2.0),
        (Air, Electric, 0.5),
        // Psychic
        (Psychic, Dark, 0.0),
        (Psychic, Metal, 0.5),
        (Psychic, Light, 0.5),
        // Dark
        (Dark, Psychic, 2.0),
        (Dark, Light, 0.5),
        // Light
        (Light, Dark, 2.0),
        (Light, Psychic, 0.5),
        // Metal
        (Metal, Nature, 2.0),
        (Metal, Fire, 0.5),
        (Metal, Ground, 0.5),
    ]
};

static STANDARD_CHART: LazyLock<TypeChart> =
    LazyLock::new(|| TypeChart::from_entries(STANDARD_MATCHUPS.iter().copied()));

/// Effectiveness multipliers keyed by (attacking, defending) type.
///
/// Not symmetric. Built once and read-only afterwards; unlisted pairs are 1.0.
#[derive(Debug, Clone, Default)]
pub struct TypeChart {
    entries: HashMap<(ElementType, ElementType), f64>,
}

impl TypeChart {
    pub fn from_entries(entries: impl IntoIterator<Item = (ElementType, ElementType, f64)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(attacking, defending, multiplier)| ((attacking, defending), multiplier))
                .collect(),
        }
    }

    /// The game's default chart.
    pub fn standard() -> &'static TypeChart {
        &STANDARD_CHART
    }

    /// Returns: 2.0 = Super Effective, 1.0 = Normal, 0.5 = Not Very Effective, 0.0 = No Effect
    pub fn effectiveness(&self, attacking: ElementType, defending: ElementType) -> f64 {
        self.entries
            .get(&(attacking, defending))
            .copied()
            .unwrap_or(1.0)
    }

    /// One attacking type against every type of a defender, multiplied together.
    pub fn against(&self, attacking: ElementType, defending: &[ElementType]) -> f64 {
        defending
            .iter()
            .map(|&defender| self.effectiveness(attacking, defender))
            .product()
    }

    /// Product over every attacker type x defender type pair. Never an average.
    pub fn combined(&self, attacking: &[ElementType], defending: &[ElementType]) -> f64 {
        attacking
            .iter()
            .map(|&attacker| self.against(attacker, defending))
            .product()
    }

    pub fn is_immune(&self, attacking: ElementType, defending: ElementType) -> bool {
        self.effectiveness(attacking, defending) == 0.0
    }
}
