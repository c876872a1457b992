//! Armor and tissue layers and the pipeline that runs an attack through them

pub mod damage_type;
pub mod layer;
pub mod material;
pub mod pipeline;
pub mod severity;

pub use damage_type::DamageType;
pub use layer::{ArmorLayer, Channel, ChannelFormulas, ChannelSet, DamageTriple, TransformRule};
pub use material::Material;
pub use pipeline::{LayerOutcome, PipelineContext};
pub use severity::{Severity, SeverityBucket, SeverityTable};
