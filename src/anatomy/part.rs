//! External body parts
//!
//! Parts are data, arranged in a tree per body plan.

use serde::{Deserialize, Serialize};

use crate::combat::constants::DEFAULT_PART_INTEGRITY;
use crate::core::types::{Alignment, LayerId, MaterialId, Orientation, PartId, ShapeId};

/// An externally targetable anatomical location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPart {
    pub alias: String,
    pub name: String,
    pub shape: ShapeId,
    pub alignment: Alignment,
    pub orientation: Orientation,
    /// Relative hit weight among candidate parts
    pub hit_weight: u32,
    pub max_integrity: f32,
    /// `None` means the part cannot be severed
    pub sever_threshold: Option<f32>,
    /// Losing this part kills
    pub vital: bool,
    pub material: Option<MaterialId>,
    /// Natural armor / tissue layer
    pub armor: Option<LayerId>,
    pub parent: Option<PartId>,
    pub children: Vec<PartId>,
}

impl BodyPart {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_severable(&self) -> bool {
        self.sever_threshold.is_some()
    }
}

/// Builder input for a new part; aliases are resolved when it is added
#[derive(Debug, Clone, PartialEq)]
pub struct PartSpec {
    pub alias: String,
    pub name: String,
    pub shape: String,
    pub parent: Option<String>,
    pub alignment: Alignment,
    pub orientation: Orientation,
    pub hit_weight: u32,
    pub max_integrity: f32,
    pub sever_threshold: Option<f32>,
    pub vital: bool,
    pub material: Option<MaterialId>,
    pub armor: Option<LayerId>,
}

impl PartSpec {
    pub fn new(
        alias: impl Into<String>,
        shape: impl Into<String>,
        alignment: Alignment,
        orientation: Orientation,
        hit_weight: u32,
    ) -> Self {
        let alias = alias.into();
        Self {
            name: alias.clone(),
            alias,
            shape: shape.into(),
            parent: None,
            alignment,
            orientation,
            hit_weight,
            max_integrity: DEFAULT_PART_INTEGRITY,
            sever_threshold: None,
            vital: false,
            material: None,
            armor: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn under(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn integrity(mut self, max_integrity: f32) -> Self {
        self.max_integrity = max_integrity;
        self
    }

    pub fn severable_at(mut self, threshold: f32) -> Self {
        self.sever_threshold = Some(threshold);
        self
    }

    pub fn vital(mut self) -> Self {
        self.vital = true;
        self
    }

    pub fn material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    pub fn armor(mut self, layer: LayerId) -> Self {
        self.armor = Some(layer);
        self
    }
}
