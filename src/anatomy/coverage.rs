//! Coverage index: which external parts expose which internal structures,
//! and which bones shield which organs.
//!
//! Hit chances are independent gates, not a probability distribution. Sibling
//! links on one part may add up to well over or under 100.

use serde::{Deserialize, Serialize};

use crate::core::types::{PartId, PenetrationDegree, StructureId};

/// Striking `part` may expose `structure`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageLink {
    pub part: PartId,
    pub structure: StructureId,
    /// Percent chance this link's gate opens
    pub hit_chance: f32,
    /// Guaranteed path used by called shots
    pub primary: bool,
    /// Attacks below this degree never roll this link
    pub min_penetration: PenetrationDegree,
}

/// `bone` shields `organ` this percent of the time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneCover {
    pub bone: StructureId,
    pub organ: StructureId,
    pub coverage: f32,
}

/// Read-only lookup tables built when a plan is sealed
#[derive(Debug, Clone, Default)]
pub struct CoverageIndex {
    links: Vec<CoverageLink>,
    by_part: Vec<Vec<usize>>,
    by_structure: Vec<Vec<usize>>,
    covers: Vec<BoneCover>,
    by_organ: Vec<Vec<usize>>,
    by_bone: Vec<Vec<usize>>,
}

impl CoverageIndex {
    pub(crate) fn build(
        part_count: usize,
        structure_count: usize,
        links: Vec<CoverageLink>,
        covers: Vec<BoneCover>,
    ) -> Self {
        let mut by_part = vec![Vec::new(); part_count];
        let mut by_structure = vec![Vec::new(); structure_count];
        for (i, link) in links.iter().enumerate() {
            by_part[link.part.index()].push(i);
            by_structure[link.structure.index()].push(i);
        }

        let mut by_organ = vec![Vec::new(); structure_count];
        let mut by_bone = vec![Vec::new(); structure_count];
        for (i, cover) in covers.iter().enumerate() {
            by_organ[cover.organ.index()].push(i);
            by_bone[cover.bone.index()].push(i);
        }

        Self {
            links,
            by_part,
            by_structure,
            covers,
            by_organ,
            by_bone,
        }
    }

    pub fn links(&self) -> &[CoverageLink] {
        &self.links
    }

    /// Every link exposing `structure`, in declaration order
    pub fn coverage_for(&self, structure: StructureId) -> impl Iterator<Item = &CoverageLink> {
        self.by_structure[structure.index()]
            .iter()
            .map(move |&i| &self.links[i])
    }

    /// Every link on `part`, in declaration order
    pub fn links_on(&self, part: PartId) -> impl Iterator<Item = &CoverageLink> {
        self.by_part[part.index()].iter().map(move |&i| &self.links[i])
    }

    pub fn primary_link(&self, structure: StructureId) -> Option<&CoverageLink> {
        self.coverage_for(structure).find(|link| link.primary)
    }

    /// Primary link, else the link with the highest hit chance
    pub fn guaranteed_link(&self, structure: StructureId) -> Option<&CoverageLink> {
        self.primary_link(structure).or_else(|| {
            self.coverage_for(structure).fold(None, |best: Option<&CoverageLink>, link| {
                match best {
                    Some(current) if current.hit_chance >= link.hit_chance => Some(current),
                    _ => Some(link),
                }
            })
        })
    }

    /// Bones shielding `organ`
    pub fn bone_coverage_for(&self, organ: StructureId) -> impl Iterator<Item = &BoneCover> {
        self.by_organ[organ.index()]
            .iter()
            .map(move |&i| &self.covers[i])
    }

    /// Organs shielded by `bone`
    pub fn organs_under(&self, bone: StructureId) -> impl Iterator<Item = &BoneCover> {
        self.by_bone[bone.index()].iter().map(move |&i| &self.covers[i])
    }

    pub fn exposes(&self, part: PartId, structure: StructureId) -> bool {
        self.links_on(part).any(|link| link.structure == structure)
    }
}
