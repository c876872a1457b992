//! Turns a parsed body file into a sealed plan
//!
//! Names are resolved here, once. Anything the file declares but nothing
//! uses is reported and otherwise ignored.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::schema::{ArmorDef, BodyFile};
use crate::anatomy::builder::BodyPlanBuilder;
use crate::anatomy::internal::{InternalKind, InternalSpec};
use crate::anatomy::limb::LimbSpec;
use crate::anatomy::part::PartSpec;
use crate::anatomy::plan::BodyPlan;
use crate::armor::{ArmorLayer, DamageType};
use crate::combat::natural::NaturalAttack;
use crate::core::error::ContentError;
use crate::core::types::{LayerId, MaterialId};

/// Parse and build a plan from TOML text
pub fn parse_body(content: &str) -> Result<BodyPlan, ContentError> {
    let file: BodyFile = toml::from_str(content)?;
    build_plan(file)
}

pub fn build_plan(file: BodyFile) -> Result<BodyPlan, ContentError> {
    let mut builder = BodyPlanBuilder::new(file.body.name.clone());

    let mut materials: HashMap<String, MaterialId> = HashMap::new();
    for material in file.materials {
        if materials.contains_key(&material.name) {
            return Err(ContentError::DuplicateMaterial(material.name));
        }
        let name = material.name.clone();
        materials.insert(name, builder.add_material(material));
    }

    let mut layers: HashMap<String, LayerId> = HashMap::new();
    for def in file.armor {
        if layers.contains_key(&def.name) {
            return Err(ContentError::DuplicateArmor(def.name));
        }
        let name = def.name.clone();
        layers.insert(name, builder.add_layer(armor_layer(def)?));
    }

    let mut used_materials = Vec::new();
    let mut used_layers = Vec::new();
    let mut lookup_material =
        |name: &Option<String>, by: &str| -> Result<Option<MaterialId>, ContentError> {
            let Some(name) = name else {
                return Ok(None);
            };
            let id = materials
                .get(name)
                .copied()
                .ok_or_else(|| ContentError::UnknownMaterial {
                    material: name.clone(),
                    by: by.to_string(),
                })?;
            used_materials.push(id);
            Ok(Some(id))
        };
    let mut lookup_layer =
        |name: &Option<String>, by: &str| -> Result<Option<LayerId>, ContentError> {
            let Some(name) = name else {
                return Ok(None);
            };
            let id = layers
                .get(name)
                .copied()
                .ok_or_else(|| ContentError::UnknownArmor {
                    layer: name.clone(),
                    by: by.to_string(),
                })?;
            used_layers.push(id);
            Ok(Some(id))
        };

    for def in file.parts {
        let mut spec = PartSpec::new(
            def.alias.clone(),
            def.shape,
            def.alignment,
            def.orientation,
            def.weight,
        )
        .integrity(def.integrity);
        spec.name = def.name.unwrap_or_else(|| def.alias.clone());
        spec.parent = def.parent;
        spec.sever_threshold = def.sever_threshold;
        spec.vital = def.vital;
        spec.material = lookup_material(&def.material, &def.alias)?;
        spec.armor = lookup_layer(&def.armor, &def.alias)?;
        builder.add_part(spec)?;
    }

    for def in file.internals {
        let mut spec = match def.kind {
            InternalKind::Bone => InternalSpec::bone(def.alias.clone()),
            InternalKind::Organ => InternalSpec::organ(def.alias.clone()),
        }
        .integrity(def.integrity);
        if let Some(name) = def.name {
            spec.name = name;
        }
        spec.vital = def.vital;
        spec.spinal = def.spinal;
        spec.material = lookup_material(&def.material, &def.alias)?;
        spec.layer = lookup_layer(&def.layer, &def.alias)?;
        builder.add_internal(spec)?;
    }

    for link in &file.coverage {
        builder.add_coverage(
            &link.part,
            &link.structure,
            link.chance,
            link.primary,
            link.min_penetration,
        )?;
    }

    for cover in &file.bone_cover {
        builder.add_bone_cover(&cover.bone, &cover.organ, cover.coverage)?;
    }

    for def in file.limbs {
        builder.add_limb(
            LimbSpec::new(def.name, def.kind, def.root)
                .with_parts(def.parts)
                .with_spine(def.spine)
                .thresholds(def.damage_multiplier, def.pain_multiplier),
        )?;
    }

    for def in file.attacks {
        let part = builder
            .part_id(&def.part)
            .ok_or_else(|| ContentError::UnknownAttackPart {
                part: def.part.clone(),
                attack: def.name.clone(),
            })?;
        let mut attack = NaturalAttack::new(def.name, part, def.damage_type, def.damage)
            .with_penetration(def.penetration)
            .aimed(def.alignment, def.orientation);
        attack.pain = def.pain;
        attack.stun = def.stun;
        attack.angle = def.angle;
        builder.add_attack(attack)?;
    }

    for (name, id) in &materials {
        if !used_materials.contains(id) {
            warn!(plan = %file.body.name, material = %name, "material is never used");
        }
    }
    for (name, id) in &layers {
        if !used_layers.contains(id) {
            warn!(plan = %file.body.name, armor = %name, "armor layer is never used");
        }
    }

    let plan = builder.seal()?;
    debug!(plan = %plan.name(), parts = plan.parts().len(), "loaded body plan");
    Ok(plan)
}

fn armor_layer(def: ArmorDef) -> Result<ArmorLayer, ContentError> {
    let mut layer = ArmorLayer::new(def.name.clone(), def.quality).with_fallback(def.fallback);
    for rule in def.transforms {
        layer = layer.with_transform(rule);
    }
    for (name, set) in def.types {
        let damage_type: DamageType =
            name.parse().map_err(|_| ContentError::UnknownDamageType {
                name: name.clone(),
                layer: def.name.clone(),
            })?;
        layer = layer.with_override(damage_type, set);
    }
    Ok(layer)
}
