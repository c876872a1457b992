//! Algebraic formulas for damage, pain and stun transforms
//!
//! Formulas are parsed and compiled once, when content is loaded, so a
//! malformed formula is a load error rather than a mid-combat failure.
//! Evaluation is pure.

pub mod bindings;
pub mod expression;
pub mod parser;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use bindings::Bindings;
pub use expression::{BinOp, Expr, Func, Node, UnaryOp, Variable};

use crate::core::error::FormulaError;

/// A compiled formula that remembers its source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Formula {
    source: String,
    root: Node,
}

impl Formula {
    /// Parse and compile a formula
    pub fn compile(source: &str) -> Result<Self, FormulaError> {
        let root = Expr::parse(source)?.compile()?;
        Ok(Self {
            source: source.trim().to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn eval(&self, bindings: &Bindings) -> Result<f32, FormulaError> {
        self.root.eval(bindings)
    }

    /// Variables from the fixed vocabulary this formula reads
    pub fn variables(&self) -> Vec<Variable> {
        let mut vars = Vec::new();
        self.root.variables(&mut vars);
        vars
    }
}

impl TryFrom<String> for Formula {
    type Error = FormulaError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Formula::compile(&source)
    }
}

impl From<Formula> for String {
    fn from(formula: Formula) -> Self {
        formula.source
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// One-shot evaluation of a formula against named bindings.
///
/// Binding names are vocabulary words or `alias:id` trait references.
pub fn evaluate(formula: &str, bindings: &HashMap<String, f32>) -> Result<f32, FormulaError> {
    let compiled = Formula::compile(formula)?;
    compiled.eval(&Bindings::from_names(bindings)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(pairs: &[(&str, f32)]) -> HashMap<String, f32> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    #[test]
    fn test_armor_dissipate_literal_case() {
        let result = evaluate(
            "damage - (quality * strength/25000 * 0.75)",
            &named(&[("damage", 10.0), ("quality", 4.0), ("strength", 25000.0)]),
        );
        assert_eq!(result, Ok(7.0));
    }

    #[test]
    fn test_min_max_clamp() {
        let bindings = named(&[("damage", 30.0)]);
        assert_eq!(evaluate("max(0, min(damage, 20))", &bindings), Ok(20.0));
        assert_eq!(evaluate("max(0, min(-damage, 20))", &bindings), Ok(0.0));
    }

    #[test]
    fn test_trait_reference_evaluation() {
        let bindings = named(&[("degree", 2.0), ("str:1", 14.0)]);
        assert_eq!(evaluate("str:1 * 0.5 + degree", &bindings), Ok(9.0));
    }

    #[test]
    fn test_unknown_identifier_fails_at_compile() {
        assert_eq!(
            Formula::compile("damage * mana"),
            Err(FormulaError::UnknownIdentifier("mana".to_string()))
        );
    }

    #[test]
    fn test_division_by_zero() {
        let bindings = named(&[("damage", 5.0), ("density", 0.0)]);
        assert_eq!(
            evaluate("damage / density", &bindings),
            Err(FormulaError::DivisionByZero)
        );
    }

    #[test]
    fn test_missing_binding() {
        let bindings = named(&[("damage", 5.0)]);
        assert_eq!(
            evaluate("damage * density", &bindings),
            Err(FormulaError::MissingBinding("density".to_string()))
        );
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let formula = Formula::compile("damage * 0.8 - max(quality, 1) / 3").unwrap();
        let bindings = Bindings::new()
            .with(Variable::Damage, 17.5)
            .with(Variable::Quality, 4.0);
        let first = formula.eval(&bindings).unwrap();
        for _ in 0..100 {
            assert_eq!(formula.eval(&bindings).unwrap(), first);
        }
    }

    #[test]
    fn test_serde_compiles_on_deserialize() {
        let formula: Formula = serde_json::from_str("\"damage * 0.5\"").unwrap();
        assert_eq!(formula.source(), "damage * 0.5");
        assert_eq!(serde_json::to_string(&formula).unwrap(), "\"damage * 0.5\"");

        let bad: Result<Formula, _> = serde_json::from_str("\"damage * \"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_variables_listed() {
        let formula = Formula::compile("damage - quality * strength / 10000").unwrap();
        assert_eq!(
            formula.variables(),
            vec![Variable::Damage, Variable::Quality, Variable::Strength]
        );
    }
}
