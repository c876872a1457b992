//! Natural weapon attacks (bites, claws, punches)
//!
//! Amounts are formulas over the attacker's traits and the attack's success
//! `degree`, evaluated each time the attack is used.

use serde::{Deserialize, Serialize};

use super::attack::{AttackDescriptor, TargetFilter};
use crate::armor::{DamageTriple, DamageType};
use crate::core::error::FormulaError;
use crate::core::types::{Alignment, Orientation, PartId, PenetrationDegree};
use crate::formula::{Bindings, Formula, Variable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaturalAttack {
    pub name: String,
    /// Part that delivers the attack; unusable once it is severed
    pub part: PartId,
    pub damage_type: DamageType,
    pub damage: Formula,
    pub pain: Option<Formula>,
    pub stun: Option<Formula>,
    pub penetration: PenetrationDegree,
    pub angle: f32,
    pub alignment: Option<Alignment>,
    pub orientation: Option<Orientation>,
}

impl NaturalAttack {
    pub fn new(
        name: impl Into<String>,
        part: PartId,
        damage_type: DamageType,
        damage: Formula,
    ) -> Self {
        Self {
            name: name.into(),
            part,
            damage_type,
            damage,
            pain: None,
            stun: None,
            penetration: PenetrationDegree::None,
            angle: 0.0,
            alignment: None,
            orientation: None,
        }
    }

    pub fn with_pain(mut self, pain: Formula) -> Self {
        self.pain = Some(pain);
        self
    }

    pub fn with_stun(mut self, stun: Formula) -> Self {
        self.stun = Some(stun);
        self
    }

    pub fn with_penetration(mut self, penetration: PenetrationDegree) -> Self {
        self.penetration = penetration;
        self
    }

    pub fn aimed(mut self, alignment: Option<Alignment>, orientation: Option<Orientation>) -> Self {
        self.alignment = alignment;
        self.orientation = orientation;
        self
    }

    /// Evaluate the amounts for one use of the attack
    ///
    /// `bindings` carries the attacker's traits; `degree` is set from the
    /// attack's penetration unless the caller already bound it. Pain and stun
    /// default to zero when no formula is given.
    pub fn to_descriptor(&self, bindings: &Bindings) -> Result<AttackDescriptor, FormulaError> {
        let mut bindings = bindings.clone();
        if bindings.get(Variable::Degree).is_none() {
            bindings.set(Variable::Degree, self.penetration.as_value());
        }

        let eval = |formula: Option<&Formula>| -> Result<f32, FormulaError> {
            match formula {
                Some(formula) => Ok(formula.eval(&bindings)?.max(0.0)),
                None => Ok(0.0),
            }
        };
        let amount = DamageTriple::new(
            eval(Some(&self.damage))?,
            eval(self.pain.as_ref())?,
            eval(self.stun.as_ref())?,
        );

        Ok(AttackDescriptor::new(self.damage_type, amount)
            .with_penetration(self.penetration)
            .at_angle(self.angle)
            .targeting(TargetFilter {
                alignment: self.alignment,
                orientation: self.orientation,
                shape: None,
            }))
    }
}
