//! Damage type enumeration
//!
//! Explicit and named; nothing infers ordering from numeric codes.

use std::str::FromStr;

use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::de::IntoDeserializer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Slashing,
    Chopping,
    Crushing,
    Piercing,
    Ballistic,
    Burning,
    Freezing,
    Chemical,
    Shockwave,
    Bite,
    Claw,
    Electrical,
    Hypoxia,
    Cellular,
    Sonic,
    Shearing,
    ArmourPiercing,
    Wrenching,
    Shrapnel,
    Necrotic,
    Falling,
    Eldritch,
    Arcane,
}

impl DamageType {
    pub fn all() -> [DamageType; 23] {
        use DamageType::*;
        [
            Slashing,
            Chopping,
            Crushing,
            Piercing,
            Ballistic,
            Burning,
            Freezing,
            Chemical,
            Shockwave,
            Bite,
            Claw,
            Electrical,
            Hypoxia,
            Cellular,
            Sonic,
            Shearing,
            ArmourPiercing,
            Wrenching,
            Shrapnel,
            Necrotic,
            Falling,
            Eldritch,
            Arcane,
        ]
    }

    /// Can accumulated damage of this type cut a part off?
    pub fn can_sever(&self) -> bool {
        matches!(
            self,
            DamageType::Slashing
                | DamageType::Chopping
                | DamageType::Shearing
                | DamageType::Bite
                | DamageType::Claw
        )
    }
}

/// Parses the snake_case names used in content files
impl FromStr for DamageType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let de: StrDeserializer<'_, ValueError> = s.into_deserializer();
        DamageType::deserialize(de)
    }
}
