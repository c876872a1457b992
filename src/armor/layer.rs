//! Armor and tissue layer definitions
//!
//! A layer holds, per damage type and per channel, an optional dissipate and
//! absorb formula, plus type-transform rules gated on severity.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::damage_type::DamageType;
use super::severity::Severity;
use crate::formula::{Formula, Variable};

/// The three quantities an attack carries through the layers
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageTriple {
    pub damage: f32,
    pub pain: f32,
    pub stun: f32,
}

impl DamageTriple {
    pub fn new(damage: f32, pain: f32, stun: f32) -> Self {
        Self { damage, pain, stun }
    }

    /// Same amount on every channel
    pub fn uniform(amount: f32) -> Self {
        Self::new(amount, amount, amount)
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Damage => self.damage,
            Channel::Pain => self.pain,
            Channel::Stun => self.stun,
        }
    }

    pub fn set(&mut self, channel: Channel, value: f32) {
        match channel {
            Channel::Damage => self.damage = value,
            Channel::Pain => self.pain = value,
            Channel::Stun => self.stun = value,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.damage <= 0.0 && self.pain <= 0.0 && self.stun <= 0.0
    }

    pub fn add(&mut self, other: DamageTriple) {
        self.damage += other.damage;
        self.pain += other.pain;
        self.stun += other.stun;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Damage,
    Pain,
    Stun,
}

impl Channel {
    pub fn all() -> [Channel; 3] {
        [Channel::Damage, Channel::Pain, Channel::Stun]
    }

    /// The formula variable carrying this channel's value
    pub fn variable(self) -> Variable {
        match self {
            Channel::Damage => Variable::Damage,
            Channel::Pain => Variable::Pain,
            Channel::Stun => Variable::Stun,
        }
    }
}

/// Formulas for one channel. A missing formula passes the value through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelFormulas {
    #[serde(default)]
    pub dissipate: Option<Formula>,
    #[serde(default)]
    pub absorb: Option<Formula>,
}

/// Formulas for all three channels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSet {
    #[serde(default)]
    pub damage: ChannelFormulas,
    #[serde(default)]
    pub pain: ChannelFormulas,
    #[serde(default)]
    pub stun: ChannelFormulas,
}

impl ChannelSet {
    pub fn get(&self, channel: Channel) -> &ChannelFormulas {
        match channel {
            Channel::Damage => &self.damage,
            Channel::Pain => &self.pain,
            Channel::Stun => &self.stun,
        }
    }

    /// Use the same formulas for every channel
    pub fn uniform(formulas: ChannelFormulas) -> Self {
        Self {
            damage: formulas.clone(),
            pain: formulas.clone(),
            stun: formulas,
        }
    }
}

/// Rewrites `from` into `to` when the incoming value is no worse than `ceiling`
///
/// e.g. light piercing against hide is treated as crushing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformRule {
    pub from: DamageType,
    pub to: DamageType,
    pub ceiling: Severity,
}

/// A layer of natural armor, worn armor, bone or organ tissue
#[derive(Debug, Clone, PartialEq)]
pub struct ArmorLayer {
    pub name: String,
    /// Bound to `quality` for natural layers; worn items supply their own
    pub quality: f32,
    pub transforms: Vec<TransformRule>,
    pub fallback: ChannelSet,
    overrides: AHashMap<DamageType, ChannelSet>,
}

impl ArmorLayer {
    pub fn new(name: impl Into<String>, quality: f32) -> Self {
        Self {
            name: name.into(),
            quality,
            transforms: Vec::new(),
            fallback: ChannelSet::default(),
            overrides: AHashMap::new(),
        }
    }

    /// A layer that suffers and passes on everything
    pub fn passthrough(name: impl Into<String>) -> Self {
        Self::new(name, 0.0)
    }

    pub fn with_fallback(mut self, set: ChannelSet) -> Self {
        self.fallback = set;
        self
    }

    pub fn with_override(mut self, damage_type: DamageType, set: ChannelSet) -> Self {
        self.overrides.insert(damage_type, set);
        self
    }

    pub fn with_transform(mut self, rule: TransformRule) -> Self {
        self.transforms.push(rule);
        self
    }

    /// Formulas used against a damage type
    pub fn channels_for(&self, damage_type: DamageType) -> &ChannelSet {
        self.overrides.get(&damage_type).unwrap_or(&self.fallback)
    }

    /// First transform rule that applies at the given severity
    pub fn transform_for(&self, damage_type: DamageType, severity: Severity) -> Option<DamageType> {
        self.transforms
            .iter()
            .find(|rule| rule.from == damage_type && severity <= rule.ceiling)
            .map(|rule| rule.to)
    }
}
