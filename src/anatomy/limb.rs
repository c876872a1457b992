//! Limbs: named groupings of contiguous parts sharing a spinal dependency

use serde::{Deserialize, Serialize};

use crate::combat::constants::DEFAULT_LIMB_MULTIPLIER;
use crate::core::types::{PartId, StructureId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimbKind {
    Head,
    Torso,
    Arm,
    Leg,
    Wing,
    Tail,
    Appendage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limb {
    pub name: String,
    pub kind: LimbKind,
    pub root: PartId,
    /// Root first, then the remaining members in declaration order
    pub parts: Vec<PartId>,
    /// Fraction of the members' combined integrity that disables the limb
    pub damage_multiplier: f32,
    /// Fraction of the members' combined integrity, as pain, that disables it
    pub pain_multiplier: f32,
    /// Spinal segments, nearest the brain first
    pub spinal: Vec<StructureId>,
}

impl Limb {
    pub fn contains(&self, part: PartId) -> bool {
        self.parts.contains(&part)
    }

    pub fn depends_on(&self, segment: StructureId) -> bool {
        self.spinal.contains(&segment)
    }
}

/// Builder input for a limb; members and segments named by alias
#[derive(Debug, Clone, PartialEq)]
pub struct LimbSpec {
    pub name: String,
    pub kind: LimbKind,
    pub root: String,
    pub parts: Vec<String>,
    pub spinal: Vec<String>,
    pub damage_multiplier: f32,
    pub pain_multiplier: f32,
}

impl LimbSpec {
    pub fn new(name: impl Into<String>, kind: LimbKind, root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            root: root.into(),
            parts: Vec::new(),
            spinal: Vec::new(),
            damage_multiplier: DEFAULT_LIMB_MULTIPLIER,
            pain_multiplier: DEFAULT_LIMB_MULTIPLIER,
        }
    }

    pub fn with_parts<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parts.extend(parts.into_iter().map(Into::into));
        self
    }

    pub fn with_spine<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spinal.extend(segments.into_iter().map(Into::into));
        self
    }

    pub fn thresholds(mut self, damage_multiplier: f32, pain_multiplier: f32) -> Self {
        self.damage_multiplier = damage_multiplier;
        self.pain_multiplier = pain_multiplier;
        self
    }
}
