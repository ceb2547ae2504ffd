//! Safe evaluation of symbolic expressions at concrete (x, y) points.
//!
//! Evaluation is two-stage: `Expr::compile_xy` resolves the variables to
//! fixed argument slots once, producing an `XYFunction`; `XYFunction::eval`
//! then walks the compiled tree for each probe point. Because the compiled
//! tree is a closed enum over f64 intrinsics, nothing outside {x, y, the
//! fixed math functions} is reachable at evaluation time.
//!
//! Arithmetic is checked: division by zero, non-positive logarithm
//! arguments and non-finite intermediate values abort the evaluation with
//! an `EvalError` instead of flowing on as IEEE inf/NaN.

use crate::symbolic::parse_expr::ParseError;
use crate::symbolic::symbolic_engine::Expr;
use std::fmt;

/// Error types for checked evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    DivisionByZero,
    DomainError(String),
    UndefinedValue,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvalError::DivisionByZero => write!(f, "Division by zero"),
            EvalError::DomainError(what) => write!(f, "Domain error: {}", what),
            EvalError::UndefinedValue => {
                write!(f, "Evaluation produced an undefined (non-finite) value")
            }
        }
    }
}

impl std::error::Error for EvalError {}

// slot indices of the two arguments
const X_SLOT: usize = 0;
const Y_SLOT: usize = 1;

/// Compiled form of an expression with variables resolved to argument slots.
#[derive(Clone, Debug)]
enum Compiled {
    Var(usize),
    Const(f64),
    Add(Box<Compiled>, Box<Compiled>),
    Sub(Box<Compiled>, Box<Compiled>),
    Mul(Box<Compiled>, Box<Compiled>),
    Div(Box<Compiled>, Box<Compiled>),
    Pow(Box<Compiled>, Box<Compiled>),
    Exp(Box<Compiled>),
    Ln(Box<Compiled>),
    Sin(Box<Compiled>),
    Cos(Box<Compiled>),
    Tg(Box<Compiled>),
}

// every node result passes through here, so an inf or NaN produced by one
// subtree can never be cancelled away by an enclosing operation
fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::UndefinedValue)
    }
}

impl Compiled {
    fn eval(&self, args: &[f64; 2]) -> Result<f64, EvalError> {
        match self {
            Compiled::Var(index) => Ok(args[*index]),
            Compiled::Const(value) => Ok(*value),
            Compiled::Add(lhs, rhs) => finite(lhs.eval(args)? + rhs.eval(args)?),
            Compiled::Sub(lhs, rhs) => finite(lhs.eval(args)? - rhs.eval(args)?),
            Compiled::Mul(lhs, rhs) => finite(lhs.eval(args)? * rhs.eval(args)?),
            Compiled::Div(lhs, rhs) => {
                let denominator = rhs.eval(args)?;
                if denominator == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                finite(lhs.eval(args)? / denominator)
            }
            Compiled::Pow(base, exponent) => {
                let base = base.eval(args)?;
                let exponent = exponent.eval(args)?;
                let value = base.powf(exponent);
                if value.is_nan() {
                    return Err(EvalError::DomainError(format!(
                        "{} ^ {} is not a real number",
                        base, exponent
                    )));
                }
                finite(value)
            }
            Compiled::Exp(inner) => finite(inner.eval(args)?.exp()),
            Compiled::Ln(inner) => {
                let argument = inner.eval(args)?;
                if argument <= 0.0 {
                    return Err(EvalError::DomainError(format!(
                        "ln({}) is undefined",
                        argument
                    )));
                }
                finite(argument.ln())
            }
            Compiled::Sin(inner) => finite(inner.eval(args)?.sin()),
            Compiled::Cos(inner) => finite(inner.eval(args)?.cos()),
            Compiled::Tg(inner) => finite(inner.eval(args)?.tan()),
        }
    }
}

/// A symbolic expression compiled into a callable function of (x, y).
///
/// Constructed once at parse time and invoked many times by the grid
/// sampling and the derivative probes. Owns no mutable state.
#[derive(Clone, Debug)]
pub struct XYFunction {
    compiled: Compiled,
}

impl XYFunction {
    /// Evaluates the function at the point (x, y) with checked arithmetic.
    pub fn eval(&self, x: f64, y: f64) -> Result<f64, EvalError> {
        self.compiled.eval(&[x, y])
    }
}

impl Expr {
    /// Compiles the expression into a callable function of (x, y).
    ///
    /// Variable slots are resolved here once; a variable named anything
    /// other than "x" or "y" is rejected, which keeps hand-built trees
    /// under the same whitelist the parser enforces.
    pub fn compile_xy(&self) -> Result<XYFunction, ParseError> {
        let compiled = self.compile_node()?;
        Ok(XYFunction { compiled })
    }

    fn compile_node(&self) -> Result<Compiled, ParseError> {
        let compiled = match self {
            Expr::Var(name) => match name.as_str() {
                "x" => Compiled::Var(X_SLOT),
                "y" => Compiled::Var(Y_SLOT),
                other => return Err(ParseError::UnknownIdentifier(other.to_string())),
            },
            Expr::Const(value) => Compiled::Const(*value),
            Expr::Add(lhs, rhs) => Compiled::Add(
                Box::new(lhs.compile_node()?),
                Box::new(rhs.compile_node()?),
            ),
            Expr::Sub(lhs, rhs) => Compiled::Sub(
                Box::new(lhs.compile_node()?),
                Box::new(rhs.compile_node()?),
            ),
            Expr::Mul(lhs, rhs) => Compiled::Mul(
                Box::new(lhs.compile_node()?),
                Box::new(rhs.compile_node()?),
            ),
            Expr::Div(lhs, rhs) => Compiled::Div(
                Box::new(lhs.compile_node()?),
                Box::new(rhs.compile_node()?),
            ),
            Expr::Pow(base, exponent) => Compiled::Pow(
                Box::new(base.compile_node()?),
                Box::new(exponent.compile_node()?),
            ),
            Expr::Exp(inner) => Compiled::Exp(Box::new(inner.compile_node()?)),
            Expr::Ln(inner) => Compiled::Ln(Box::new(inner.compile_node()?)),
            Expr::sin(inner) => Compiled::Sin(Box::new(inner.compile_node()?)),
            Expr::cos(inner) => Compiled::Cos(Box::new(inner.compile_node()?)),
            Expr::tg(inner) => Compiled::Tg(Box::new(inner.compile_node()?)),
        };
        Ok(compiled)
    }

    /// Parse and compile in one step: the contract of the examiner boundary.
    pub fn parse_and_compile(input: &str) -> Result<XYFunction, ParseError> {
        let expr = Expr::parse_expression(input)?;
        expr.compile_xy()
    }
}
