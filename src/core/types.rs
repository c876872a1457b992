//! Core type definitions used throughout the codebase
//!
//! Every topology element lives in an arena owned by its `BodyPlan` and is
//! addressed by one of these index newtypes. Aliases are only used while a
//! plan is being built; sealed plans never look anything up by string.

use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }

            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }
    };
}

arena_id!(
    /// External body part
    PartId
);
arena_id!(
    /// Bone or organ
    StructureId
);
arena_id!(
    /// Named grouping of body parts
    LimbId
);
arena_id!(
    /// Interned shape tag ("head", "upper arm", ...)
    ShapeId
);
arena_id!(
    /// Material entry in a plan's material table
    MaterialId
);
arena_id!(
    /// Armor or tissue layer definition
    LayerId
);

/// Identifier of a trait in the external attribute system (`alias:id` in formulas)
pub type TraitId = u64;

/// Left/right/front/rear placement of an external part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Front,
    Rear,
    Left,
    Right,
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

/// Vertical band of an external part, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Lowest,
    Low,
    Centre,
    High,
    Highest,
}

/// How well an attack got through, from a glancing touch to a clean strike
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PenetrationDegree {
    #[default]
    None,
    Marginal,
    Minor,
    Moderate,
    Major,
    Total,
}

impl PenetrationDegree {
    /// Numeric degree bound to `degree` in attack formulas
    pub fn as_value(self) -> f32 {
        match self {
            PenetrationDegree::None => 0.0,
            PenetrationDegree::Marginal => 1.0,
            PenetrationDegree::Minor => 2.0,
            PenetrationDegree::Moderate => 3.0,
            PenetrationDegree::Major => 4.0,
            PenetrationDegree::Total => 5.0,
        }
    }
}
