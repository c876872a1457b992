//! Material properties bound into layer formulas

use serde::{Deserialize, Serialize};

use crate::formula::{Bindings, Variable};

/// Physical properties of a layer's material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// kg/m³
    pub density: f32,
    /// Electrical conductivity
    pub electrical: f32,
    /// Thermal conductivity
    pub thermal: f32,
    pub organic: bool,
    /// Yield strength in kPa
    pub strength: f32,
}

impl Material {
    /// Write this material's values into formula bindings
    pub fn bind(&self, bindings: &mut Bindings) {
        bindings
            .set(Variable::Density, self.density)
            .set(Variable::Electrical, self.electrical)
            .set(Variable::Thermal, self.thermal)
            .set(Variable::Organic, if self.organic { 1.0 } else { 0.0 })
            .set(Variable::Strength, self.strength);
    }

    /// Remove every material variable, for layers with no material
    pub fn unbind(bindings: &mut Bindings) {
        bindings
            .unset(Variable::Density)
            .unset(Variable::Electrical)
            .unset(Variable::Thermal)
            .unset(Variable::Organic)
            .unset(Variable::Strength);
    }
}
