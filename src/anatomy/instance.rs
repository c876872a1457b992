//! Runtime state of one creature
//!
//! The plan is shared and never changes. Everything that does change during
//! combat (damage, severed parts, broken bones, disabled limbs) lives here and
//! is only mutated through `&mut Creature`.

use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::plan::BodyPlan;
use crate::armor::{ArmorLayer, Material};
use crate::combat::natural::NaturalAttack;
use crate::core::types::{LimbId, PartId, StructureId, TraitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartStatus {
    #[default]
    Intact,
    /// Cut off directly
    Severed,
    /// Lost because an ancestor was severed
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartState {
    pub status: PartStatus,
    /// Cumulative damage suffered
    pub damage: f32,
    pub pain: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureStatus {
    #[default]
    Intact,
    /// Bones only: no longer shields anything
    Broken,
    /// Organs only: terminal
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StructureState {
    pub status: StructureStatus,
    pub damage: f32,
    pub pain: f32,
}

/// An item worn over a part
#[derive(Debug, Clone, PartialEq)]
pub struct WornArmor {
    pub name: String,
    pub layer: Arc<ArmorLayer>,
    pub material: Option<Material>,
    pub quality: f32,
}

impl WornArmor {
    pub fn new(
        name: impl Into<String>,
        layer: Arc<ArmorLayer>,
        material: Option<Material>,
        quality: f32,
    ) -> Self {
        Self {
            name: name.into(),
            layer,
            material,
            quality,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimbStatus {
    Healthy,
    /// Accumulated damage or pain is past the limb's threshold
    Ineffective,
    /// Spinal signal cut
    Paralysed,
    Severed,
}

#[derive(Debug, Clone)]
pub struct Creature {
    name: String,
    plan: Arc<BodyPlan>,
    parts: Vec<PartState>,
    structures: Vec<StructureState>,
    signal_disabled: Vec<bool>,
    /// Per part, outermost item first
    worn: Vec<Vec<WornArmor>>,
    traits: AHashMap<TraitId, f32>,
    stun: f32,
    dead: bool,
}

impl Creature {
    pub fn new(name: impl Into<String>, plan: Arc<BodyPlan>) -> Self {
        let part_count = plan.parts().len();
        let structure_count = plan.internals().len();
        let limb_count = plan.limbs().len();
        Self {
            name: name.into(),
            parts: vec![PartState::default(); part_count],
            structures: vec![StructureState::default(); structure_count],
            signal_disabled: vec![false; limb_count],
            worn: vec![Vec::new(); part_count],
            traits: AHashMap::new(),
            stun: 0.0,
            dead: false,
            plan,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plan(&self) -> &BodyPlan {
        &self.plan
    }

    pub fn shared_plan(&self) -> Arc<BodyPlan> {
        Arc::clone(&self.plan)
    }

    // === PARTS ===

    pub fn part_state(&self, part: PartId) -> &PartState {
        &self.parts[part.index()]
    }

    pub(crate) fn part_state_mut(&mut self, part: PartId) -> &mut PartState {
        &mut self.parts[part.index()]
    }

    pub fn is_targetable(&self, part: PartId) -> bool {
        self.parts[part.index()].status == PartStatus::Intact
    }

    /// Intact parts in declaration order
    pub fn targetable_parts(&self) -> Vec<PartId> {
        self.plan
            .part_ids()
            .filter(|&part| self.is_targetable(part))
            .collect()
    }

    // === STRUCTURES ===

    pub fn structure_state(&self, structure: StructureId) -> &StructureState {
        &self.structures[structure.index()]
    }

    pub(crate) fn structure_state_mut(&mut self, structure: StructureId) -> &mut StructureState {
        &mut self.structures[structure.index()]
    }

    pub fn is_destroyed(&self, structure: StructureId) -> bool {
        self.structures[structure.index()].status == StructureStatus::Destroyed
    }

    /// Intact bones shield; broken ones do not
    pub fn is_shielding(&self, bone: StructureId) -> bool {
        self.structures[bone.index()].status == StructureStatus::Intact
    }

    // === ARMOR ===

    /// Put `armor` on over whatever `part` already wears
    pub fn wear(&mut self, part: PartId, armor: WornArmor) {
        self.worn[part.index()].insert(0, armor);
    }

    /// Outermost first
    pub fn worn_on(&self, part: PartId) -> &[WornArmor] {
        &self.worn[part.index()]
    }

    pub fn remove_armor(&mut self, part: PartId) -> Vec<WornArmor> {
        std::mem::take(&mut self.worn[part.index()])
    }

    // === TRAITS ===

    pub fn set_trait(&mut self, id: TraitId, value: f32) {
        self.traits.insert(id, value);
    }

    pub fn traits(&self) -> &AHashMap<TraitId, f32> {
        &self.traits
    }

    // === LIMBS ===

    pub fn is_signal_disabled(&self, limb: LimbId) -> bool {
        self.signal_disabled[limb.index()]
    }

    /// Returns false if the limb was already disabled
    pub(crate) fn disable_limb(&mut self, limb: LimbId) -> bool {
        !std::mem::replace(&mut self.signal_disabled[limb.index()], true)
    }

    pub fn limb_status(&self, limb: LimbId) -> LimbStatus {
        let def = self.plan.limb(limb);
        if !self.is_targetable(def.root) {
            return LimbStatus::Severed;
        }
        if self.is_signal_disabled(limb) {
            return LimbStatus::Paralysed;
        }

        let (mut damage, mut pain, mut integrity) = (0.0, 0.0, 0.0);
        for &part in &def.parts {
            let state = &self.parts[part.index()];
            damage += state.damage;
            pain += state.pain;
            integrity += self.plan.part(part).max_integrity;
        }
        if damage >= integrity * def.damage_multiplier || pain >= integrity * def.pain_multiplier {
            LimbStatus::Ineffective
        } else {
            LimbStatus::Healthy
        }
    }

    // === NATURAL ATTACKS ===

    /// Attacks whose delivering part is still attached
    pub fn available_attacks(&self) -> impl Iterator<Item = &NaturalAttack> {
        self.plan
            .attacks()
            .iter()
            .filter(move |attack| self.is_targetable(attack.part))
    }

    // === VITALS ===

    pub fn stun(&self) -> f32 {
        self.stun
    }

    pub(crate) fn add_stun(&mut self, stun: f32) {
        self.stun += stun;
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub(crate) fn mark_dead(&mut self) {
        self.dead = true;
    }
}
