//! Sealed body plans
//!
//! A `BodyPlan` is immutable once sealed and is shared between creature
//! instances behind an `Arc`. All relations are index lists.

use super::coverage::CoverageIndex;
use super::internal::InternalStructure;
use super::limb::Limb;
use super::part::BodyPart;
use crate::armor::{ArmorLayer, Material};
use crate::combat::natural::NaturalAttack;
use crate::core::types::{LayerId, LimbId, MaterialId, PartId, ShapeId, StructureId};

#[derive(Debug, Clone)]
pub struct BodyPlan {
    name: String,
    parts: Vec<BodyPart>,
    internals: Vec<InternalStructure>,
    shapes: Vec<String>,
    materials: Vec<Material>,
    layers: Vec<ArmorLayer>,
    coverage: CoverageIndex,
    limbs: Vec<Limb>,
    limb_of: Vec<Option<LimbId>>,
    /// Part each structure lives under (its guaranteed link)
    hosts: Vec<PartId>,
    roots: Vec<PartId>,
    attacks: Vec<NaturalAttack>,
}

impl BodyPlan {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        name: String,
        parts: Vec<BodyPart>,
        internals: Vec<InternalStructure>,
        shapes: Vec<String>,
        materials: Vec<Material>,
        layers: Vec<ArmorLayer>,
        coverage: CoverageIndex,
        limbs: Vec<Limb>,
        limb_of: Vec<Option<LimbId>>,
        hosts: Vec<PartId>,
        attacks: Vec<NaturalAttack>,
    ) -> Self {
        let roots = parts
            .iter()
            .enumerate()
            .filter(|(_, part)| part.is_root())
            .map(|(i, _)| PartId::from_index(i))
            .collect();
        Self {
            name,
            parts,
            internals,
            shapes,
            materials,
            layers,
            coverage,
            limbs,
            limb_of,
            hosts,
            roots,
            attacks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // === PARTS ===

    pub fn parts(&self) -> &[BodyPart] {
        &self.parts
    }

    pub fn part(&self, id: PartId) -> &BodyPart {
        &self.parts[id.index()]
    }

    pub fn part_ids(&self) -> impl Iterator<Item = PartId> {
        (0..self.parts.len()).map(PartId::from_index)
    }

    /// Tooling lookup; resolution never goes through aliases
    pub fn part_by_alias(&self, alias: &str) -> Option<PartId> {
        self.parts
            .iter()
            .position(|part| part.alias == alias)
            .map(PartId::from_index)
    }

    pub fn roots(&self) -> &[PartId] {
        &self.roots
    }

    pub fn children_of(&self, part: PartId) -> &[PartId] {
        &self.parts[part.index()].children
    }

    /// Parent first, root last
    pub fn ancestors_of(&self, part: PartId) -> Vec<PartId> {
        let mut out = Vec::new();
        let mut current = self.parts[part.index()].parent;
        while let Some(parent) = current {
            out.push(parent);
            current = self.parts[parent.index()].parent;
        }
        out
    }

    /// Every part below `part`, depth first in declaration order
    pub fn descendants_of(&self, part: PartId) -> Vec<PartId> {
        let mut out = Vec::new();
        let mut stack: Vec<PartId> = self.children_of(part).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children_of(next).iter().rev());
        }
        out
    }

    /// `part` followed by its descendants
    pub fn subtree(&self, part: PartId) -> Vec<PartId> {
        let mut out = vec![part];
        out.extend(self.descendants_of(part));
        out
    }

    pub fn shape_id(&self, shape: &str) -> Option<ShapeId> {
        self.shapes
            .iter()
            .position(|s| s == shape)
            .map(ShapeId::from_index)
    }

    pub fn shape_name(&self, shape: ShapeId) -> &str {
        &self.shapes[shape.index()]
    }

    // === INTERNALS ===

    pub fn internals(&self) -> &[InternalStructure] {
        &self.internals
    }

    pub fn internal(&self, id: StructureId) -> &InternalStructure {
        &self.internals[id.index()]
    }

    pub fn structure_by_alias(&self, alias: &str) -> Option<StructureId> {
        self.internals
            .iter()
            .position(|structure| structure.alias == alias)
            .map(StructureId::from_index)
    }

    pub fn coverage(&self) -> &CoverageIndex {
        &self.coverage
    }

    /// The part a structure is considered to sit in
    pub fn host_of(&self, structure: StructureId) -> PartId {
        self.hosts[structure.index()]
    }

    // === LIMBS ===

    pub fn limbs(&self) -> &[Limb] {
        &self.limbs
    }

    pub fn limb(&self, id: LimbId) -> &Limb {
        &self.limbs[id.index()]
    }

    pub fn limb_ids(&self) -> impl Iterator<Item = LimbId> {
        (0..self.limbs.len()).map(LimbId::from_index)
    }

    pub fn limb_of(&self, part: PartId) -> Option<LimbId> {
        self.limb_of[part.index()]
    }

    pub fn limb_by_name(&self, name: &str) -> Option<LimbId> {
        self.limbs
            .iter()
            .position(|limb| limb.name == name)
            .map(LimbId::from_index)
    }

    // === LAYERS ===

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.index()]
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn layer(&self, id: LayerId) -> &ArmorLayer {
        &self.layers[id.index()]
    }

    pub fn layers(&self) -> &[ArmorLayer] {
        &self.layers
    }

    pub fn attacks(&self) -> &[NaturalAttack] {
        &self.attacks
    }
}

#[cfg(test)]
mod tests {
    use crate::anatomy::builder::BodyPlanBuilder;
    use crate::anatomy::internal::InternalSpec;
    use crate::anatomy::limb::{LimbKind, LimbSpec};
    use crate::anatomy::part::PartSpec;
    use crate::core::types::{Alignment, Orientation, PenetrationDegree};

    fn plan() -> super::BodyPlan {
        let mut b = BodyPlanBuilder::new("biped");
        let spec = |alias: &str| PartSpec::new(alias, alias, Alignment::Front, Orientation::Centre, 5);
        b.add_part(spec("abdomen")).unwrap();
        b.add_part(spec("chest").under("abdomen")).unwrap();
        b.add_part(spec("neck").under("chest")).unwrap();
        b.add_part(spec("head").under("neck")).unwrap();
        b.add_part(spec("rupperarm").under("chest")).unwrap();
        b.add_part(spec("rforearm").under("rupperarm")).unwrap();
        b.add_part(spec("rhand").under("rforearm")).unwrap();
        b.add_part(spec("rthigh").under("abdomen")).unwrap();
        b.add_internal(InternalSpec::organ("brain")).unwrap();
        b.add_coverage("head", "brain", 80.0, true, PenetrationDegree::None)
            .unwrap();
        b.add_limb(
            LimbSpec::new("right arm", LimbKind::Arm, "rupperarm")
                .with_parts(["rforearm", "rhand"]),
        )
        .unwrap();
        b.seal().unwrap()
    }

    #[test]
    fn test_roots_and_children() {
        let plan = plan();
        let abdomen = plan.part_by_alias("abdomen").unwrap();
        assert_eq!(plan.roots(), &[abdomen]);
        let names: Vec<_> = plan
            .children_of(abdomen)
            .iter()
            .map(|&p| plan.part(p).alias.as_str())
            .collect();
        assert_eq!(names, vec!["chest", "rthigh"]);
    }

    #[test]
    fn test_ancestors_parent_first() {
        let plan = plan();
        let head = plan.part_by_alias("head").unwrap();
        let chain: Vec<_> = plan
            .ancestors_of(head)
            .into_iter()
            .map(|p| plan.part(p).alias.clone())
            .collect();
        assert_eq!(chain, vec!["neck", "chest", "abdomen"]);
    }

    #[test]
    fn test_descendants_depth_first() {
        let plan = plan();
        let chest = plan.part_by_alias("chest").unwrap();
        let names: Vec<_> = plan
            .descendants_of(chest)
            .into_iter()
            .map(|p| plan.part(p).alias.clone())
            .collect();
        assert_eq!(names, vec!["neck", "head", "rupperarm", "rforearm", "rhand"]);
    }

    #[test]
    fn test_limb_of() {
        let plan = plan();
        let arm = plan.limb_by_name("right arm").unwrap();
        assert_eq!(plan.limb_of(plan.part_by_alias("rhand").unwrap()), Some(arm));
        assert_eq!(plan.limb_of(plan.part_by_alias("head").unwrap()), None);
        assert_eq!(plan.limb(arm).parts.len(), 3);
    }

    #[test]
    fn test_host_of() {
        let plan = plan();
        let brain = plan.structure_by_alias("brain").unwrap();
        assert_eq!(plan.host_of(brain), plan.part_by_alias("head").unwrap());
    }
}
