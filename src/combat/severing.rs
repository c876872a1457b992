//! Severing and structure loss
//!
//! A severed part takes its whole subtree with it, and any limb whose spinal
//! chain is hosted inside that subtree loses signal. Organs are destroyed,
//! never severed; bones break and stop shielding.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anatomy::instance::{Creature, PartStatus, StructureStatus};
use crate::core::config::DetachPolicy;
use crate::core::types::{LimbId, PartId, StructureId};

/// Everything that changed when a part was cut off
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverEvent {
    pub part: PartId,
    /// Descendants that were still attached
    pub detached: Vec<PartId>,
    pub disabled_limbs: Vec<LimbId>,
    /// A vital part, or a vital structure hosted in the subtree, was lost
    pub fatal: bool,
}

/// Consequences of an internal structure reaching zero integrity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureLoss {
    pub destroyed: Vec<StructureId>,
    pub broken: Vec<StructureId>,
    pub disabled_limbs: Vec<LimbId>,
    pub fatal: bool,
}

/// Cut `part` and detach everything below it
pub fn sever(creature: &mut Creature, part: PartId, policy: DetachPolicy) -> SeverEvent {
    let plan = creature.shared_plan();
    let subtree = plan.subtree(part);

    creature.part_state_mut(part).status = PartStatus::Severed;
    let detached_status = match policy {
        DetachPolicy::Severed => PartStatus::Severed,
        DetachPolicy::Missing => PartStatus::Missing,
    };
    let mut detached = Vec::new();
    for &descendant in &subtree[1..] {
        let state = creature.part_state_mut(descendant);
        if state.status == PartStatus::Intact {
            state.status = detached_status;
            detached.push(descendant);
        }
    }

    let mut disabled_limbs = Vec::new();
    for limb in plan.limb_ids() {
        let cut = plan
            .limb(limb)
            .spinal
            .iter()
            .any(|&segment| subtree.contains(&plan.host_of(segment)));
        if cut && creature.disable_limb(limb) {
            disabled_limbs.push(limb);
        }
    }

    let vital_part = subtree.iter().any(|&p| plan.part(p).vital);
    let vital_structure = plan
        .internals()
        .iter()
        .enumerate()
        .any(|(i, s)| s.vital && subtree.contains(&plan.host_of(StructureId::from_index(i))));
    let fatal = vital_part || vital_structure;
    if fatal {
        creature.mark_dead();
    }

    debug!(
        creature = %creature.name(),
        part = %plan.part(part).alias,
        detached = detached.len(),
        limbs = disabled_limbs.len(),
        fatal,
        "part severed"
    );

    SeverEvent {
        part,
        detached,
        disabled_limbs,
        fatal,
    }
}

/// Apply zero-integrity consequences for a structure, if it has reached zero
///
/// Organs are destroyed and cut any limb whose spinal chain contains them.
/// Bones break. Anything already destroyed or broken is left alone.
pub fn apply_structure_loss(creature: &mut Creature, structure: StructureId, loss: &mut StructureLoss) {
    let plan = creature.shared_plan();
    let def = plan.internal(structure);
    let state = creature.structure_state_mut(structure);
    if state.status != StructureStatus::Intact || state.damage < def.max_integrity {
        return;
    }

    if def.is_bone() {
        state.status = StructureStatus::Broken;
        loss.broken.push(structure);
        debug!(creature = %creature.name(), bone = %def.alias, "bone broken");
        return;
    }

    state.status = StructureStatus::Destroyed;
    loss.destroyed.push(structure);
    if def.spinal {
        for limb in plan.limb_ids() {
            if plan.limb(limb).depends_on(structure) && creature.disable_limb(limb) {
                loss.disabled_limbs.push(limb);
            }
        }
    }
    if def.vital {
        loss.fatal = true;
        creature.mark_dead();
    }
    debug!(
        creature = %creature.name(),
        organ = %def.alias,
        fatal = def.vital,
        "organ destroyed"
    );
}
