//! Bones and organs: reached only through coverage, never targeted directly

use serde::{Deserialize, Serialize};

use crate::combat::constants::DEFAULT_STRUCTURE_INTEGRITY;
use crate::core::types::{LayerId, MaterialId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternalKind {
    /// Breaks at zero integrity; may shield organs
    Bone,
    /// Terminal layer; destroyed at zero integrity
    Organ,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalStructure {
    pub alias: String,
    pub name: String,
    pub kind: InternalKind,
    pub max_integrity: f32,
    pub vital: bool,
    /// Part of a spinal chain; destroying it cuts limb signals
    pub spinal: bool,
    pub material: Option<MaterialId>,
    pub layer: Option<LayerId>,
}

impl InternalStructure {
    pub fn is_bone(&self) -> bool {
        self.kind == InternalKind::Bone
    }

    pub fn is_organ(&self) -> bool {
        self.kind == InternalKind::Organ
    }
}

/// Builder input for a bone or organ
#[derive(Debug, Clone, PartialEq)]
pub struct InternalSpec {
    pub alias: String,
    pub name: String,
    pub kind: InternalKind,
    pub max_integrity: f32,
    pub vital: bool,
    pub spinal: bool,
    pub material: Option<MaterialId>,
    pub layer: Option<LayerId>,
}

impl InternalSpec {
    pub fn bone(alias: impl Into<String>) -> Self {
        Self::new(alias, InternalKind::Bone)
    }

    pub fn organ(alias: impl Into<String>) -> Self {
        Self::new(alias, InternalKind::Organ)
    }

    fn new(alias: impl Into<String>, kind: InternalKind) -> Self {
        let alias = alias.into();
        Self {
            name: alias.clone(),
            alias,
            kind,
            max_integrity: DEFAULT_STRUCTURE_INTEGRITY,
            vital: false,
            spinal: false,
            material: None,
            layer: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn integrity(mut self, max_integrity: f32) -> Self {
        self.max_integrity = max_integrity;
        self
    }

    pub fn vital(mut self) -> Self {
        self.vital = true;
        self
    }

    pub fn spinal(mut self) -> Self {
        self.spinal = true;
        self
    }

    pub fn material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    pub fn layer(mut self, layer: LayerId) -> Self {
        self.layer = Some(layer);
        self
    }
}
