//! Body plan content: TOML files describing parts, internals, coverage,
//! limbs, layers and natural attacks

pub mod loader;
pub mod registry;
pub mod schema;

pub use loader::{build_plan, parse_body};
pub use registry::BodyRegistry;
pub use schema::BodyFile;
