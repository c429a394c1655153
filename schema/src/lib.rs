// Creature Battle Schema - Shared type definitions
// This crate contains the static enums and lookup tables shared by every
// part of the battle engine: the elemental type roster with its effectiveness
// chart, skill categories, effect kinds and attribute names.

// Re-export the main types
pub use element_types::*;
pub use skill_types::*;

pub mod element_types;
pub mod skill_types;
