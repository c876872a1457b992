//! Body topology: parts, internal structures, coverage and limbs
//!
//! Plans are assembled with `BodyPlanBuilder`, sealed into an immutable
//! `BodyPlan`, and shared by any number of `Creature` instances.

pub mod builder;
pub mod coverage;
pub mod instance;
pub mod internal;
pub mod limb;
pub mod part;
pub mod plan;

pub use builder::BodyPlanBuilder;
pub use coverage::{BoneCover, CoverageIndex, CoverageLink};
pub use instance::{
    Creature, LimbStatus, PartState, PartStatus, StructureState, StructureStatus, WornArmor,
};
pub use internal::{InternalKind, InternalSpec, InternalStructure};
pub use limb::{Limb, LimbKind, LimbSpec};
pub use part::{BodyPart, PartSpec};
pub use plan::BodyPlan;
