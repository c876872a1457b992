//! Formula parser built on nom
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | primary
//! primary := number | call | variable | '(' expr ')'
//! call    := ident '(' expr (',' expr)* ')'
//! variable:= ident (':' digits)?
//! ```

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0},
    combinator::{all_consuming, map, map_res, opt, recognize},
    multi::{many0, many0_count, separated_list0},
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};

use super::expression::{BinOp, Expr, UnaryOp};
use crate::core::error::FormulaError;
use crate::core::types::TraitId;

type Res<'a, O> = IResult<&'a str, O>;

impl Expr {
    /// Parse a formula into its surface expression tree
    pub fn parse(source: &str) -> Result<Expr, FormulaError> {
        all_consuming(delimited(multispace0, expr, multispace0))
            .parse(source)
            .map(|(_, parsed)| parsed)
            .map_err(|e| FormulaError::Syntax {
                formula: source.to_string(),
                message: e.to_string(),
            })
    }
}

fn expr(input: &str) -> Res<'_, Expr> {
    let (input, first) = term(input)?;
    let (input, rest) = many0(pair(
        delimited(multispace0, alt((char('+'), char('-'))), multispace0),
        term,
    ))
    .parse(input)?;
    Ok((input, fold(first, rest)))
}

fn term(input: &str) -> Res<'_, Expr> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(pair(
        delimited(multispace0, alt((char('*'), char('/'))), multispace0),
        unary,
    ))
    .parse(input)?;
    Ok((input, fold(first, rest)))
}

fn fold(first: Expr, rest: Vec<(char, Expr)>) -> Expr {
    rest.into_iter().fold(first, |left, (op, right)| {
        let op = match op {
            '+' => BinOp::Add,
            '-' => BinOp::Sub,
            '*' => BinOp::Mul,
            _ => BinOp::Div,
        };
        Expr::BinOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    })
}

fn unary(input: &str) -> Res<'_, Expr> {
    alt((
        map(preceded(delimited(multispace0, char('-'), multispace0), unary), |operand| {
            Expr::UnaryOp {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            }
        }),
        primary,
    ))
    .parse(input)
}

fn primary(input: &str) -> Res<'_, Expr> {
    delimited(
        multispace0,
        alt((number, call, variable, parenthesized)),
        multispace0,
    )
    .parse(input)
}

fn number(input: &str) -> Res<'_, Expr> {
    map_res(recognize_float, |text: &str| {
        text.parse::<f32>().map(Expr::Literal)
    })
    .parse(input)
}

fn identifier(input: &str) -> Res<'_, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn call(input: &str) -> Res<'_, Expr> {
    map(
        pair(
            identifier,
            delimited(
                pair(multispace0, char('(')),
                separated_list0(char(','), expr),
                char(')'),
            ),
        ),
        |(name, args)| Expr::Function {
            name: name.to_string(),
            args,
        },
    )
    .parse(input)
}

fn variable(input: &str) -> Res<'_, Expr> {
    let (input, name) = identifier(input)?;
    let (input, id) = opt(preceded(
        char(':'),
        map_res(digit1, |digits: &str| digits.parse::<TraitId>()),
    ))
    .parse(input)?;
    let parsed = match id {
        Some(id) => Expr::TraitRef {
            alias: name.to_string(),
            id,
        },
        None => Expr::Param(name.to_string()),
    };
    Ok((input, parsed))
}

fn parenthesized(input: &str) -> Res<'_, Expr> {
    delimited(char('('), expr, char(')')).parse(input)
}
