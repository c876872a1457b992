//! Resolution constants - all tunable values in one place

/// Coverage and hit chances are percentages
pub const PERCENT: f32 = 100.0;

// Builder defaults
pub const DEFAULT_PART_INTEGRITY: f32 = 100.0;
pub const DEFAULT_STRUCTURE_INTEGRITY: f32 = 50.0;
pub const DEFAULT_LIMB_MULTIPLIER: f32 = 0.5;
