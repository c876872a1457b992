//! Attack descriptors handed in by the combat engine

use serde::{Deserialize, Serialize};

use crate::anatomy::part::BodyPart;
use crate::armor::{DamageTriple, DamageType};
use crate::core::types::{Alignment, Orientation, PenetrationDegree, ShapeId, StructureId};

/// Forced location; `None` fields match anything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFilter {
    pub alignment: Option<Alignment>,
    pub orientation: Option<Orientation>,
    /// Shape of the target's plan, see `BodyPlan::shape_id`
    pub shape: Option<ShapeId>,
}

impl TargetFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn shape(mut self, shape: ShapeId) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn matches(&self, part: &BodyPart) -> bool {
        self.alignment.map_or(true, |a| a == part.alignment)
            && self.orientation.map_or(true, |o| o == part.orientation)
            && self.shape.map_or(true, |s| s == part.shape)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackDescriptor {
    pub damage_type: DamageType,
    pub amount: DamageTriple,
    pub penetration: PenetrationDegree,
    pub angle: f32,
    pub filter: TargetFilter,
    /// Guaranteed internal hit on this structure; it must be exposed by the struck part
    pub called_shot: Option<StructureId>,
}

impl AttackDescriptor {
    pub fn new(damage_type: DamageType, amount: DamageTriple) -> Self {
        Self {
            damage_type,
            amount,
            penetration: PenetrationDegree::None,
            angle: 0.0,
            filter: TargetFilter::any(),
            called_shot: None,
        }
    }

    pub fn with_penetration(mut self, penetration: PenetrationDegree) -> Self {
        self.penetration = penetration;
        self
    }

    pub fn at_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn targeting(mut self, filter: TargetFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn called_shot(mut self, structure: StructureId) -> Self {
        self.called_shot = Some(structure);
        self
    }
}
