//! Resolving attacks against creatures: targeting, penetration, severing

pub mod attack;
pub mod constants;
pub mod natural;
pub mod resolution;
pub mod selection;
pub mod severing;

pub use attack::{AttackDescriptor, TargetFilter};
pub use natural::NaturalAttack;
pub use resolution::{
    resolve_volley, HitResolution, HitResolver, IneffectiveReason, LayerReport, LayerSite,
    ResolutionStage, StrikeOutcome,
};
pub use selection::{gate, weighted_pick};
pub use severing::{SeverEvent, StructureLoss};
