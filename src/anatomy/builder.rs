//! Body plan construction
//!
//! The builder is the only place aliases are looked up. `seal` validates the
//! whole topology and converts it into an immutable, index-based `BodyPlan`.

use std::collections::HashMap;

use super::coverage::{BoneCover, CoverageIndex, CoverageLink};
use super::internal::{InternalSpec, InternalStructure};
use super::limb::{Limb, LimbSpec};
use super::part::{BodyPart, PartSpec};
use super::plan::BodyPlan;
use crate::armor::{ArmorLayer, Material};
use crate::combat::natural::NaturalAttack;
use crate::core::error::TopologyError;
use crate::core::types::{
    LayerId, LimbId, MaterialId, PartId, PenetrationDegree, ShapeId, StructureId,
};

/// Accumulates parts, internals and relations for one body plan
#[derive(Debug, Default)]
pub struct BodyPlanBuilder {
    name: String,
    parts: Vec<BodyPart>,
    part_aliases: HashMap<String, PartId>,
    internals: Vec<InternalStructure>,
    internal_aliases: HashMap<String, StructureId>,
    shapes: Vec<String>,
    materials: Vec<Material>,
    layers: Vec<ArmorLayer>,
    links: Vec<CoverageLink>,
    covers: Vec<BoneCover>,
    limbs: Vec<LimbSpec>,
    attacks: Vec<NaturalAttack>,
}

impl BodyPlanBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId::from_index(self.materials.len() - 1)
    }

    pub fn add_layer(&mut self, layer: ArmorLayer) -> LayerId {
        self.layers.push(layer);
        LayerId::from_index(self.layers.len() - 1)
    }

    /// Add an external part. Its parent, if any, must already exist.
    pub fn add_part(&mut self, spec: PartSpec) -> Result<PartId, TopologyError> {
        if self.part_aliases.contains_key(&spec.alias) {
            return Err(TopologyError::DuplicateAlias(spec.alias));
        }
        if spec.max_integrity <= 0.0 {
            return Err(TopologyError::InvalidValue {
                alias: spec.alias,
                field: "max_integrity",
                value: spec.max_integrity,
            });
        }
        if let Some(threshold) = spec.sever_threshold {
            if threshold <= 0.0 {
                return Err(TopologyError::InvalidValue {
                    alias: spec.alias,
                    field: "sever_threshold",
                    value: threshold,
                });
            }
        }

        let parent = match &spec.parent {
            Some(parent) => Some(self.part_id(parent).ok_or_else(|| {
                TopologyError::UnknownAncestor {
                    part: spec.alias.clone(),
                    parent: parent.clone(),
                }
            })?),
            None => None,
        };

        let id = PartId::from_index(self.parts.len());
        let shape = self.intern_shape(&spec.shape);
        self.parts.push(BodyPart {
            alias: spec.alias.clone(),
            name: spec.name,
            shape,
            alignment: spec.alignment,
            orientation: spec.orientation,
            hit_weight: spec.hit_weight,
            max_integrity: spec.max_integrity,
            sever_threshold: spec.sever_threshold,
            vital: spec.vital,
            material: spec.material,
            armor: spec.armor,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.parts[parent.index()].children.push(id);
        }
        self.part_aliases.insert(spec.alias, id);
        Ok(id)
    }

    pub fn add_internal(&mut self, spec: InternalSpec) -> Result<StructureId, TopologyError> {
        if self.internal_aliases.contains_key(&spec.alias) {
            return Err(TopologyError::DuplicateAlias(spec.alias));
        }
        if spec.max_integrity <= 0.0 {
            return Err(TopologyError::InvalidValue {
                alias: spec.alias,
                field: "max_integrity",
                value: spec.max_integrity,
            });
        }

        let id = StructureId::from_index(self.internals.len());
        self.internals.push(InternalStructure {
            alias: spec.alias.clone(),
            name: spec.name,
            kind: spec.kind,
            max_integrity: spec.max_integrity,
            vital: spec.vital,
            spinal: spec.spinal,
            material: spec.material,
            layer: spec.layer,
        });
        self.internal_aliases.insert(spec.alias, id);
        Ok(id)
    }

    /// Move `child` under `parent`, rejecting edges that would close a cycle
    pub fn link(&mut self, child: PartId, parent: PartId) -> Result<(), TopologyError> {
        self.check_part(child)?;
        self.check_part(parent)?;

        let closes_cycle =
            child == parent || self.ancestors(parent).into_iter().any(|a| a == child);
        if closes_cycle {
            return Err(TopologyError::CycleDetected {
                child: self.parts[child.index()].alias.clone(),
                parent: self.parts[parent.index()].alias.clone(),
            });
        }

        if let Some(old) = self.parts[child.index()].parent {
            self.parts[old.index()].children.retain(|&c| c != child);
        }
        self.parts[child.index()].parent = Some(parent);
        self.parts[parent.index()].children.push(child);
        Ok(())
    }

    pub fn link_aliases(&mut self, child: &str, parent: &str) -> Result<(), TopologyError> {
        let child_id = self.require_part(child)?;
        let parent_id = self
            .part_id(parent)
            .ok_or_else(|| TopologyError::UnknownAncestor {
                part: child.to_string(),
                parent: parent.to_string(),
            })?;
        self.link(child_id, parent_id)
    }

    /// Declare that striking `part` may expose `structure`
    pub fn add_coverage(
        &mut self,
        part: &str,
        structure: &str,
        hit_chance: f32,
        primary: bool,
        min_penetration: PenetrationDegree,
    ) -> Result<(), TopologyError> {
        let part_id = self.require_part(part)?;
        let structure_id = self.require_structure(structure)?;
        if hit_chance < 0.0 {
            return Err(TopologyError::InvalidValue {
                alias: structure.to_string(),
                field: "hit_chance",
                value: hit_chance,
            });
        }
        self.links.push(CoverageLink {
            part: part_id,
            structure: structure_id,
            hit_chance,
            primary,
            min_penetration,
        });
        Ok(())
    }

    /// Declare that `bone` shields `organ`
    pub fn add_bone_cover(
        &mut self,
        bone: &str,
        organ: &str,
        coverage: f32,
    ) -> Result<(), TopologyError> {
        let bone_id = self.require_structure(bone)?;
        let organ_id = self.require_structure(organ)?;
        if !self.internals[bone_id.index()].is_bone() {
            return Err(TopologyError::NotABone(bone.to_string()));
        }
        if !self.internals[organ_id.index()].is_organ() {
            return Err(TopologyError::NotAnOrgan(organ.to_string()));
        }
        self.covers.push(BoneCover {
            bone: bone_id,
            organ: organ_id,
            coverage,
        });
        Ok(())
    }

    /// Limbs are checked for contiguity when the plan is sealed
    pub fn add_limb(&mut self, spec: LimbSpec) -> Result<(), TopologyError> {
        self.require_part(&spec.root)?;
        for part in &spec.parts {
            self.require_part(part)?;
        }
        for segment in &spec.spinal {
            self.require_structure(segment)?;
        }
        self.limbs.push(spec);
        Ok(())
    }

    /// Natural attack delivered by an existing part
    pub fn add_attack(&mut self, attack: NaturalAttack) -> Result<(), TopologyError> {
        self.check_part(attack.part)?;
        self.attacks.push(attack);
        Ok(())
    }

    pub fn part_id(&self, alias: &str) -> Option<PartId> {
        self.part_aliases.get(alias).copied()
    }

    pub fn structure_id(&self, alias: &str) -> Option<StructureId> {
        self.internal_aliases.get(alias).copied()
    }

    pub fn shape_id(&self, shape: &str) -> Option<ShapeId> {
        self.shapes
            .iter()
            .position(|s| s == shape)
            .map(ShapeId::from_index)
    }

    /// Validate everything and produce the immutable plan
    pub fn seal(self) -> Result<BodyPlan, TopologyError> {
        self.check_acyclic()?;

        let mut primaries = vec![0usize; self.internals.len()];
        let mut reachable = vec![false; self.internals.len()];
        for link in &self.links {
            reachable[link.structure.index()] = true;
            if link.primary {
                primaries[link.structure.index()] += 1;
            }
        }
        for (i, structure) in self.internals.iter().enumerate() {
            if !reachable[i] {
                return Err(TopologyError::UnreachableStructure(structure.alias.clone()));
            }
            if primaries[i] > 1 {
                return Err(TopologyError::MultiplePrimary(structure.alias.clone()));
            }
        }

        let limbs = self.resolve_limbs()?;
        let mut limb_of: Vec<Option<LimbId>> = vec![None; self.parts.len()];
        for (i, limb) in limbs.iter().enumerate() {
            for part in &limb.parts {
                if let Some(first) = limb_of[part.index()] {
                    return Err(TopologyError::PartInMultipleLimbs {
                        part: self.parts[part.index()].alias.clone(),
                        first: limbs[first.index()].name.clone(),
                        second: limb.name.clone(),
                    });
                }
                limb_of[part.index()] = Some(LimbId::from_index(i));
            }
        }

        let coverage =
            CoverageIndex::build(self.parts.len(), self.internals.len(), self.links, self.covers);
        let hosts = (0..self.internals.len())
            .map(|i| {
                let structure = StructureId::from_index(i);
                coverage
                    .guaranteed_link(structure)
                    .map(|link| link.part)
                    .ok_or_else(|| {
                        TopologyError::UnreachableStructure(self.internals[i].alias.clone())
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            plan = %self.name,
            parts = self.parts.len(),
            internals = self.internals.len(),
            limbs = limbs.len(),
            attacks = self.attacks.len(),
            "sealed body plan"
        );

        Ok(BodyPlan::from_parts(
            self.name,
            self.parts,
            self.internals,
            self.shapes,
            self.materials,
            self.layers,
            coverage,
            limbs,
            limb_of,
            hosts,
            self.attacks,
        ))
    }

    fn resolve_limbs(&self) -> Result<Vec<Limb>, TopologyError> {
        let mut limbs = Vec::with_capacity(self.limbs.len());
        for spec in &self.limbs {
            let root = self.require_part(&spec.root)?;
            let mut parts = vec![root];
            for alias in &spec.parts {
                let part = self.require_part(alias)?;
                if !parts.contains(&part) {
                    parts.push(part);
                }
            }

            // Every part between a member and the root must be a member too
            for alias in &spec.parts {
                let part = self.require_part(alias)?;
                if part == root {
                    continue;
                }
                let ancestors = self.ancestors(part);
                let gap_free = match ancestors.iter().position(|&a| a == root) {
                    Some(depth) => ancestors[..depth].iter().all(|a| parts.contains(a)),
                    None => false,
                };
                if !gap_free {
                    return Err(TopologyError::LimbNotContiguous {
                        limb: spec.name.clone(),
                        part: alias.clone(),
                    });
                }
            }
            let spinal = spec
                .spinal
                .iter()
                .map(|alias| self.require_structure(alias))
                .collect::<Result<Vec<_>, _>>()?;
            limbs.push(Limb {
                name: spec.name.clone(),
                kind: spec.kind,
                root,
                parts,
                damage_multiplier: spec.damage_multiplier,
                pain_multiplier: spec.pain_multiplier,
                spinal,
            });
        }
        Ok(limbs)
    }

    /// Every part must reach a root in fewer steps than there are parts
    fn check_acyclic(&self) -> Result<(), TopologyError> {
        for part in &self.parts {
            let mut steps = 0;
            let mut current = part.parent;
            while let Some(parent) = current {
                steps += 1;
                if steps > self.parts.len() {
                    return Err(TopologyError::CycleDetected {
                        child: part.alias.clone(),
                        parent: self.parts[parent.index()].alias.clone(),
                    });
                }
                current = self.parts[parent.index()].parent;
            }
        }
        Ok(())
    }

    fn ancestors(&self, part: PartId) -> Vec<PartId> {
        let mut out = Vec::new();
        let mut current = self.parts[part.index()].parent;
        while let Some(parent) = current {
            if out.contains(&parent) {
                break;
            }
            out.push(parent);
            current = self.parts[parent.index()].parent;
        }
        out
    }

    fn intern_shape(&mut self, shape: &str) -> ShapeId {
        match self.shape_id(shape) {
            Some(id) => id,
            None => {
                self.shapes.push(shape.to_string());
                ShapeId::from_index(self.shapes.len() - 1)
            }
        }
    }

    fn check_part(&self, part: PartId) -> Result<(), TopologyError> {
        if part.index() < self.parts.len() {
            Ok(())
        } else {
            Err(TopologyError::UnknownPart(format!("#{}", part.0)))
        }
    }

    fn require_part(&self, alias: &str) -> Result<PartId, TopologyError> {
        self.part_id(alias)
            .ok_or_else(|| TopologyError::UnknownPart(alias.to_string()))
    }

    fn require_structure(&self, alias: &str) -> Result<StructureId, TopologyError> {
        self.structure_id(alias)
            .ok_or_else(|| TopologyError::UnknownStructure(alias.to_string()))
    }
}
