//! Expression types for damage, pain and stun formulas.
//!
//! Two trees live here. `Expr` is the surface syntax produced by the parser,
//! with identifiers and function names still as text. `Node` is the compiled
//! form: every identifier resolved to a `Variable` or trait reference and
//! every call checked for arity. Only `Node` is ever evaluated.

use serde::{Deserialize, Serialize};

use super::bindings::Bindings;
use crate::core::error::FormulaError;
use crate::core::types::TraitId;

/// Binary operators supported in formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
}

/// Surface expression as parsed
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal (e.g., 0.75)
    Literal(f32),
    /// A bare identifier (e.g., "damage")
    Param(String),
    /// A trait reference written `alias:id` (e.g., "str:12")
    TraitRef { alias: String, id: TraitId },
    /// A binary operation (e.g., left + right)
    BinOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// A unary operation (e.g., -x)
    UnaryOp { op: UnaryOp, operand: Box<Expr> },
    /// A function call (e.g., min(a, b))
    Function { name: String, args: Vec<Expr> },
}

/// The fixed variable vocabulary available to formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Damage,
    Pain,
    Stun,
    /// Quality of the layer (worn item quality or natural armor quality)
    Quality,
    /// Angle of the incoming attack
    Angle,
    Density,
    Electrical,
    Thermal,
    /// 1.0 for organic materials, 0.0 otherwise
    Organic,
    /// Yield strength of the layer's material
    Strength,
    /// Attack success degree, used by natural attack formulas
    Degree,
}

impl Variable {
    pub const COUNT: usize = 11;

    pub fn all() -> [Variable; Variable::COUNT] {
        [
            Variable::Damage,
            Variable::Pain,
            Variable::Stun,
            Variable::Quality,
            Variable::Angle,
            Variable::Density,
            Variable::Electrical,
            Variable::Thermal,
            Variable::Organic,
            Variable::Strength,
            Variable::Degree,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Variable::Damage => "damage",
            Variable::Pain => "pain",
            Variable::Stun => "stun",
            Variable::Quality => "quality",
            Variable::Angle => "angle",
            Variable::Density => "density",
            Variable::Electrical => "electrical",
            Variable::Thermal => "thermal",
            Variable::Organic => "organic",
            Variable::Strength => "strength",
            Variable::Degree => "degree",
        }
    }

    pub fn from_name(name: &str) -> Option<Variable> {
        Variable::all().into_iter().find(|v| v.name() == name)
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

/// Built-in functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Func {
    Min,
    Max,
}

impl Func {
    fn from_name(name: &str) -> Option<Func> {
        match name {
            "min" => Some(Func::Min),
            "max" => Some(Func::Max),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Func::Min => "min",
            Func::Max => "max",
        }
    }
}

/// Compiled expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(f32),
    Var(Variable),
    Trait { alias: String, id: TraitId },
    Binary {
        op: BinOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Neg(Box<Node>),
    Call { func: Func, args: Vec<Node> },
}

impl Expr {
    /// Resolve identifiers and check calls, producing an evaluable tree
    pub fn compile(&self) -> Result<Node, FormulaError> {
        match self {
            Expr::Literal(value) => Ok(Node::Literal(*value)),
            Expr::Param(name) => Variable::from_name(name)
                .map(Node::Var)
                .ok_or_else(|| FormulaError::UnknownIdentifier(name.clone())),
            Expr::TraitRef { alias, id } => Ok(Node::Trait {
                alias: alias.clone(),
                id: *id,
            }),
            Expr::BinOp { op, left, right } => Ok(Node::Binary {
                op: *op,
                left: Box::new(left.compile()?),
                right: Box::new(right.compile()?),
            }),
            Expr::UnaryOp {
                op: UnaryOp::Neg,
                operand,
            } => Ok(Node::Neg(Box::new(operand.compile()?))),
            Expr::Function { name, args } => {
                let func = Func::from_name(name)
                    .ok_or_else(|| FormulaError::UnknownFunction(name.clone()))?;
                if args.len() < 2 {
                    return Err(FormulaError::InvalidArgCount {
                        func: func.name().to_string(),
                        expected: "at least 2".to_string(),
                        got: args.len(),
                    });
                }
                let args = args
                    .iter()
                    .map(Expr::compile)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Node::Call { func, args })
            }
        }
    }
}

impl Node {
    /// Evaluate against a set of bindings. Pure: same inputs, same output.
    pub fn eval(&self, bindings: &Bindings) -> Result<f32, FormulaError> {
        match self {
            Node::Literal(value) => Ok(*value),
            Node::Var(var) => bindings
                .get(*var)
                .ok_or_else(|| FormulaError::MissingBinding(var.name().to_string())),
            Node::Trait { alias, id } => bindings
                .trait_value(*id)
                .ok_or_else(|| FormulaError::MissingBinding(format!("{}:{}", alias, id))),
            Node::Binary { op, left, right } => {
                let l = left.eval(bindings)?;
                let r = right.eval(bindings)?;
                match op {
                    BinOp::Add => Ok(l + r),
                    BinOp::Sub => Ok(l - r),
                    BinOp::Mul => Ok(l * r),
                    BinOp::Div => {
                        if r == 0.0 {
                            Err(FormulaError::DivisionByZero)
                        } else {
                            Ok(l / r)
                        }
                    }
                }
            }
            Node::Neg(operand) => Ok(-operand.eval(bindings)?),
            Node::Call { func, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(arg.eval(bindings)?);
                }
                let folded = match func {
                    Func::Min => values.into_iter().fold(f32::INFINITY, f32::min),
                    Func::Max => values.into_iter().fold(f32::NEG_INFINITY, f32::max),
                };
                Ok(folded)
            }
        }
    }

    /// Visit every variable the node reads
    pub fn variables(&self, out: &mut Vec<Variable>) {
        match self {
            Node::Var(var) => {
                if !out.contains(var) {
                    out.push(*var);
                }
            }
            Node::Binary { left, right, .. } => {
                left.variables(out);
                right.variables(out);
            }
            Node::Neg(operand) => operand.variables(out),
            Node::Call { args, .. } => args.iter().for_each(|arg| arg.variables(out)),
            Node::Literal(_) | Node::Trait { .. } => {}
        }
    }
}
