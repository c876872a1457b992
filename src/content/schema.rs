//! TOML schema for body plan files
//!
//! One file describes one body plan. References between sections are by
//! name or alias and are resolved when the plan is built. Formulas are
//! compiled while the file is deserialized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::anatomy::internal::InternalKind;
use crate::anatomy::limb::LimbKind;
use crate::armor::{ChannelSet, DamageType, Material, TransformRule};
use crate::combat::constants::{
    DEFAULT_LIMB_MULTIPLIER, DEFAULT_PART_INTEGRITY, DEFAULT_STRUCTURE_INTEGRITY,
};
use crate::core::types::{Alignment, Orientation, PenetrationDegree};
use crate::formula::Formula;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyFile {
    pub body: BodyMeta,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub armor: Vec<ArmorDef>,
    #[serde(default)]
    pub parts: Vec<PartDef>,
    #[serde(default)]
    pub internals: Vec<InternalDef>,
    #[serde(default)]
    pub coverage: Vec<CoverageDef>,
    #[serde(default)]
    pub bone_cover: Vec<BoneCoverDef>,
    #[serde(default)]
    pub limbs: Vec<LimbDef>,
    #[serde(default)]
    pub attacks: Vec<AttackDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorDef {
    pub name: String,
    #[serde(default)]
    pub quality: f32,
    #[serde(default)]
    pub transforms: Vec<TransformRule>,
    #[serde(default)]
    pub fallback: ChannelSet,
    /// Per damage type channel sets, keyed by snake_case type name
    #[serde(default)]
    pub types: BTreeMap<String, ChannelSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDef {
    pub alias: String,
    pub name: Option<String>,
    pub shape: String,
    /// Must be declared earlier in the file
    pub parent: Option<String>,
    pub alignment: Alignment,
    pub orientation: Orientation,
    pub weight: u32,
    #[serde(default = "default_part_integrity")]
    pub integrity: f32,
    pub sever_threshold: Option<f32>,
    #[serde(default)]
    pub vital: bool,
    pub material: Option<String>,
    pub armor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalDef {
    pub alias: String,
    pub name: Option<String>,
    pub kind: InternalKind,
    #[serde(default = "default_structure_integrity")]
    pub integrity: f32,
    #[serde(default)]
    pub vital: bool,
    #[serde(default)]
    pub spinal: bool,
    pub material: Option<String>,
    pub layer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageDef {
    pub part: String,
    pub structure: String,
    pub chance: f32,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub min_penetration: PenetrationDegree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneCoverDef {
    pub bone: String,
    pub organ: String,
    pub coverage: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimbDef {
    pub name: String,
    pub kind: LimbKind,
    pub root: String,
    #[serde(default)]
    pub parts: Vec<String>,
    #[serde(default)]
    pub spine: Vec<String>,
    #[serde(default = "default_limb_multiplier")]
    pub damage_multiplier: f32,
    #[serde(default = "default_limb_multiplier")]
    pub pain_multiplier: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackDef {
    pub name: String,
    pub part: String,
    pub damage_type: DamageType,
    pub damage: Formula,
    pub pain: Option<Formula>,
    pub stun: Option<Formula>,
    #[serde(default)]
    pub penetration: PenetrationDegree,
    #[serde(default)]
    pub angle: f32,
    pub alignment: Option<Alignment>,
    pub orientation: Option<Orientation>,
}

fn default_part_integrity() -> f32 {
    DEFAULT_PART_INTEGRITY
}

fn default_structure_integrity() -> f32 {
    DEFAULT_STRUCTURE_INTEGRITY
}

fn default_limb_multiplier() -> f32 {
    DEFAULT_LIMB_MULTIPLIER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_file() {
        let file: BodyFile = toml::from_str(
            r#"
            [body]
            name = "blob"

            [[parts]]
            alias = "body"
            shape = "body"
            alignment = "front"
            orientation = "centre"
            weight = 1
            "#,
        )
        .unwrap();
        assert_eq!(file.body.name, "blob");
        assert_eq!(file.parts[0].integrity, DEFAULT_PART_INTEGRITY);
        assert!(file.materials.is_empty());
        assert!(file.attacks.is_empty());
    }

    #[test]
    fn test_armor_section() {
        let file: BodyFile = toml::from_str(
            r#"
            [body]
            name = "armored"

            [[armor]]
            name = "scales"
            quality = 3.0

            [[armor.transforms]]
            from = "piercing"
            to = "crushing"
            ceiling = "minor"

            [armor.fallback.damage]
            dissipate = "damage * 0.5"
            absorb = "damage - quality"

            [armor.types.burning.damage]
            dissipate = "damage * 0.1"
            "#,
        )
        .unwrap();
        let armor = &file.armor[0];
        assert_eq!(armor.transforms[0].from, DamageType::Piercing);
        assert_eq!(
            armor.fallback.damage.absorb.as_ref().unwrap().source(),
            "damage - quality"
        );
        assert!(armor.fallback.pain.dissipate.is_none());
        assert!(armor.types.contains_key("burning"));
    }

    #[test]
    fn test_bad_formula_fails_at_load() {
        let result: Result<BodyFile, _> = toml::from_str(
            r#"
            [body]
            name = "broken"

            [[armor]]
            name = "skin"

            [armor.fallback.damage]
            dissipate = "damage * (quality"
            "#,
        );
        assert!(result.is_err());
    }
}
