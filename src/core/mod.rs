pub mod config;
pub mod error;
pub mod types;

pub use config::{config, set_config, DetachPolicy, ResolverConfig};
pub use error::{
    AnatomyError, ConfigError, ContentError, FormulaError, ResolutionError, Result, TopologyError,
};
