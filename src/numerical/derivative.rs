//! Centered-difference partial derivatives of a compiled (x, y) function.
//!
//! The step is fixed at `global::DERIVATIVE_STEP`; there is no adaptive
//! step sizing. A failed evaluation at either shifted point aborts the
//! probe with a `DerivativeError` wrapping the underlying `EvalError`.

use crate::global::DERIVATIVE_STEP;
use crate::symbolic::symbolic_eval::{EvalError, XYFunction};
use std::fmt;
use strum_macros::Display;

/// Differentiation axis of a two-variable function
#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum Axis {
    X,
    Y,
}

/// Error type for a failed finite-difference probe
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeError {
    pub axis: Axis,
    pub x: f64,
    pub y: f64,
    pub source: EvalError,
}

impl fmt::Display for DerivativeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Error computing partial derivative along {} at ({}, {}): {}",
            self.axis, self.x, self.y, self.source
        )
    }
}

impl std::error::Error for DerivativeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Computes the partial derivative of `f` along `axis` at (x, y) using the
/// centered difference (f(p + delta) - f(p - delta)) / (2 * delta).
pub fn partial_derivative(
    f: &XYFunction,
    axis: Axis,
    x: f64,
    y: f64,
    delta: f64,
) -> Result<f64, DerivativeError> {
    let probe = |px: f64, py: f64| {
        f.eval(px, py).map_err(|source| DerivativeError {
            axis,
            x,
            y,
            source,
        })
    };
    let (forward, backward) = match axis {
        Axis::X => (probe(x + delta, y)?, probe(x - delta, y)?),
        Axis::Y => (probe(x, y + delta)?, probe(x, y - delta)?),
    };
    Ok((forward - backward) / (2.0 * delta))
}

/// Partial derivative with the fixed default step.
pub fn partial(f: &XYFunction, axis: Axis, x: f64, y: f64) -> Result<f64, DerivativeError> {
    partial_derivative(f, axis, x, y, DERIVATIVE_STEP)
}
