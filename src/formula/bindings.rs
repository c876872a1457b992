//! Variable bindings for formula evaluation

use ahash::AHashMap;

use super::expression::Variable;
use crate::core::error::FormulaError;
use crate::core::types::TraitId;

/// Values for the fixed vocabulary plus trait values keyed by trait id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: [Option<f32>; Variable::COUNT],
    traits: AHashMap<TraitId, f32>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, var: Variable, value: f32) -> &mut Self {
        self.values[var.slot()] = Some(value);
        self
    }

    pub fn unset(&mut self, var: Variable) -> &mut Self {
        self.values[var.slot()] = None;
        self
    }

    pub fn with(mut self, var: Variable, value: f32) -> Self {
        self.set(var, value);
        self
    }

    pub fn get(&self, var: Variable) -> Option<f32> {
        self.values[var.slot()]
    }

    pub fn set_trait(&mut self, id: TraitId, value: f32) -> &mut Self {
        self.traits.insert(id, value);
        self
    }

    pub fn with_trait(mut self, id: TraitId, value: f32) -> Self {
        self.set_trait(id, value);
        self
    }

    /// Copy in every trait value from the external attribute system
    pub fn with_traits(mut self, traits: &AHashMap<TraitId, f32>) -> Self {
        self.traits
            .extend(traits.iter().map(|(id, value)| (*id, *value)));
        self
    }

    pub fn trait_value(&self, id: TraitId) -> Option<f32> {
        self.traits.get(&id).copied()
    }

    /// Build bindings from name/value pairs.
    ///
    /// Names are either vocabulary words (`damage`) or trait references
    /// (`str:12`).
    pub fn from_names<'a, I>(pairs: I) -> Result<Self, FormulaError>
    where
        I: IntoIterator<Item = (&'a String, &'a f32)>,
    {
        let mut bindings = Self::new();
        for (name, value) in pairs {
            if let Some(var) = Variable::from_name(name) {
                bindings.set(var, *value);
                continue;
            }
            let id = name
                .split_once(':')
                .and_then(|(_, id)| id.parse::<TraitId>().ok())
                .ok_or_else(|| FormulaError::UnknownIdentifier(name.clone()))?;
            bindings.set_trait(id, *value);
        }
        Ok(bindings)
    }
}
