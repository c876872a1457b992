//! Creature Anatomy - hit location and layered damage transmission
//!
//! Body plans are trees of external parts over bones and organs, joined by
//! coverage links and grouped into limbs. Attacks are resolved against a
//! creature by choosing a part, rolling through to any exposed structure,
//! and running every layer's transform/dissipate/absorb formulas in turn.

pub mod anatomy;
pub mod armor;
pub mod combat;
pub mod content;
pub mod core;
pub mod formula;
