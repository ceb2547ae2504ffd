//! Sampling-based checks for a first-order equation M(x,y)dx + N(x,y)dy = 0.
//!
//! Exactness (dM/dy == dN/dx) should hold identically on an open domain;
//! the check samples a modest integer grid as a heuristic proxy, since
//! symbolic verification is out of scope. Homogeneity is probed with a
//! single scale factor t = 2 from the base point (1, 1) over an integer
//! degree search. Both verdicts are heuristics, not proofs.
//!
//! `check_equation` is the string-in / report-out boundary of the crate;
//! `EquationChecker` is a stateful front around it that also bootstraps
//! terminal logging.

use crate::global::{EXACTNESS_TOL, GRID_MAX, GRID_MIN, HOMOGENEITY_TOL, MAX_DEGREE, MIN_DEGREE};
use crate::numerical::derivative::{Axis, DerivativeError, partial};
use crate::symbolic::parse_expr::ParseError;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_eval::{EvalError, XYFunction};
use itertools::iproduct;
use log::{debug, info, warn};
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode};
use std::fmt;

/// Error taxonomy of a whole equation check. Any error aborts the check
/// for the pair; there is no partial result.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckError {
    Parse(ParseError),
    Eval(EvalError),
    Derivative(DerivativeError),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CheckError::Parse(err) => write!(f, "Invalid expression: {}", err),
            CheckError::Eval(err) => write!(f, "Error evaluating expression: {}", err),
            CheckError::Derivative(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckError::Parse(err) => Some(err),
            CheckError::Eval(err) => Some(err),
            CheckError::Derivative(err) => Some(err),
        }
    }
}

impl From<ParseError> for CheckError {
    fn from(err: ParseError) -> Self {
        CheckError::Parse(err)
    }
}

impl From<EvalError> for CheckError {
    fn from(err: EvalError) -> Self {
        CheckError::Eval(err)
    }
}

impl From<DerivativeError> for CheckError {
    fn from(err: DerivativeError) -> Self {
        CheckError::Derivative(err)
    }
}

/// Structured verdict of one equation check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquationReport {
    pub exact: bool,
    pub homogeneous: bool,
    /// shared degree of M and N when the equation is homogeneous
    pub degree: Option<u32>,
}

impl fmt::Display for EquationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let exact = if self.exact { "exact" } else { "not exact" };
        writeln!(f, "The equation is {}.", exact)?;
        match (self.homogeneous, self.degree) {
            (true, Some(degree)) => {
                write!(f, "The equation is homogeneous of degree {}.", degree)
            }
            _ => write!(f, "The equation is non-homogeneous."),
        }
    }
}

/// Checks exactness: dM/dy == dN/dx within tolerance at every point of the
/// integer grid. Returns false at the first failing point; a derivative
/// failure anywhere aborts the whole check.
pub fn is_exact(m: &XYFunction, n: &XYFunction) -> Result<bool, CheckError> {
    for (i, j) in iproduct!(GRID_MIN..=GRID_MAX, GRID_MIN..=GRID_MAX) {
        let (x, y) = (i as f64, j as f64);
        let dm_dy = partial(m, Axis::Y, x, y)?;
        let dn_dx = partial(n, Axis::X, x, y)?;
        if (dm_dy - dn_dx).abs() > EXACTNESS_TOL {
            debug!(
                "exactness fails at ({}, {}): dM/dy = {}, dN/dx = {}",
                x, y, dm_dy, dn_dx
            );
            return Ok(false);
        }
    }
    Ok(true)
}

/// Searches for an integer degree k with f(2,2) == 2^k * f(1,1) within
/// tolerance, ascending, first match wins. A function whose base-point
/// evaluation fails (or is undefined) is classified non-homogeneous; a
/// failure at the scaled point aborts the check.
pub fn degree_of(f: &XYFunction) -> Result<Option<u32>, CheckError> {
    let v0 = match f.eval(1.0, 1.0) {
        Ok(value) => value,
        Err(err) => {
            debug!("base point (1,1) not evaluable ({}), not homogeneous", err);
            return Ok(None);
        }
    };
    for k in MIN_DEGREE..=MAX_DEGREE {
        // TODO: the scaled value does not depend on k; hoisting it out of
        // the loop would change no verdicts
        let v2 = f.eval(2.0, 2.0)?;
        if (v2 - 2f64.powi(k as i32) * v0).abs() < HOMOGENEITY_TOL {
            return Ok(Some(k));
        }
    }
    Ok(None)
}

/// Checks homogeneity: M and N are classified independently and the
/// equation is homogeneous only if both carry the same degree.
pub fn is_homogeneous(m: &XYFunction, n: &XYFunction) -> Result<(bool, Option<u32>), CheckError> {
    let m_degree = degree_of(m)?;
    let n_degree = degree_of(n)?;
    match (m_degree, n_degree) {
        (Some(dm), Some(dn)) if dm == dn => Ok((true, Some(dm))),
        (Some(dm), Some(dn)) => {
            warn!("M and N are homogeneous of different degrees: {} vs {}", dm, dn);
            Ok((false, None))
        }
        _ => Ok((false, None)),
    }
}

/// Full check of one equation pair: parse both expressions, compile them
/// and run the exactness and homogeneity tests. Stateless; each call is
/// independent of prior calls.
pub fn check_equation(m_expr: &str, n_expr: &str) -> Result<EquationReport, CheckError> {
    let m_parsed = Expr::parse_expression(m_expr)?;
    let n_parsed = Expr::parse_expression(n_expr)?;
    debug!("parsed M = {}, N = {}", m_parsed, n_parsed);
    if !m_parsed.contains_variable("x") && !m_parsed.contains_variable("y") {
        debug!("M is a constant function");
    }
    if !n_parsed.contains_variable("x") && !n_parsed.contains_variable("y") {
        debug!("N is a constant function");
    }
    let m = m_parsed.compile_xy()?;
    let n = n_parsed.compile_xy()?;

    let exact = is_exact(&m, &n)?;
    let (homogeneous, degree) = is_homogeneous(&m, &n)?;
    let report = EquationReport {
        exact,
        homogeneous,
        degree,
    };
    info!(
        "verdict for M = {}, N = {}: exact = {}, homogeneous = {}, degree = {:?}",
        m_expr, n_expr, exact, homogeneous, degree
    );
    Ok(report)
}

/// Stateful front over `check_equation`: holds the two expression strings,
/// the log level and the last report.
pub struct EquationChecker {
    pub m_expr: String,
    pub n_expr: String,
    pub loglevel: Option<String>,
    pub result: Option<EquationReport>,
}

impl EquationChecker {
    pub fn new() -> EquationChecker {
        EquationChecker {
            m_expr: String::new(),
            n_expr: String::new(),
            loglevel: Some("info".to_string()),
            result: None,
        }
    }

    /// Basic methods to set the equation pair
    pub fn set_equations(&mut self, m_expr: &str, n_expr: &str) {
        self.m_expr = m_expr.to_string();
        self.n_expr = n_expr.to_string();
        self.result = None;
    }

    pub fn set_loglevel(&mut self, loglevel: Option<String>) {
        self.loglevel = if let Some(level) = loglevel {
            assert!(
                level == "off"
                    || level == "none"
                    || level == "debug"
                    || level == "info"
                    || level == "warn"
                    || level == "error",
                "loglevel must be off/none, debug, info, warn or error"
            );
            Some(level)
        } else {
            self.loglevel.clone()
        };
    }

    fn checker(&mut self) -> Result<EquationReport, CheckError> {
        let report = check_equation(&self.m_expr, &self.n_expr)?;
        self.result = Some(report);
        Ok(report)
    }

    // wrapper around the checker function to implement logging
    pub fn check(&mut self) -> Result<EquationReport, CheckError> {
        let is_logging_disabled = self
            .loglevel
            .as_ref()
            .map(|level| level == "off" || level == "none")
            .unwrap_or(false);

        if is_logging_disabled {
            self.checker()
        } else {
            let log_option = if let Some(level) = self.loglevel.clone() {
                match level.as_str() {
                    "debug" => LevelFilter::Debug,
                    "info" => LevelFilter::Info,
                    "warn" => LevelFilter::Warn,
                    "error" => LevelFilter::Error,
                    _ => LevelFilter::Info,
                }
            } else {
                LevelFilter::Info
            };
            let logger_instance = CombinedLogger::init(vec![TermLogger::new(
                log_option,
                Config::default(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )]);

            match logger_instance {
                Ok(()) => {
                    let res = self.checker();
                    info!("check finished");
                    res
                }
                Err(_) => self.checker(),
            }
        }
    }

    pub fn get_result(&self) -> Option<EquationReport> {
        self.result
    }
}

impl Default for EquationChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(input: &str) -> XYFunction {
        Expr::parse_and_compile(input).unwrap()
    }

    #[test]
    fn test_exact_m_y_n_x() {
        // dM/dy = 1 = dN/dx everywhere
        let m = compile("y");
        let n = compile("x");
        assert_eq!(is_exact(&m, &n).unwrap(), true);
    }

    #[test]
    fn test_not_exact_m_x_n_x() {
        // dM/dy = 0 but dN/dx = 1
        let m = compile("x");
        let n = compile("x");
        assert_eq!(is_exact(&m, &n).unwrap(), false);
    }

    #[test]
    fn test_exact_product_pair() {
        // dM/dy = 2x = dN/dx, the differential of x^2 * y
        let m = compile("2*x*y");
        let n = compile("x^2");
        assert_eq!(is_exact(&m, &n).unwrap(), true);
    }

    #[test]
    fn test_exactness_failure_propagates() {
        // M has a pole on the grid line x = 1; the derivative probe at
        // (1, y) divides by zero and the whole check aborts
        let m = compile("1/(x-1)");
        let n = compile("x");
        let err = is_exact(&m, &n).unwrap_err();
        assert!(matches!(err, CheckError::Derivative(_)));
    }

    #[test]
    fn test_degree_of_quadratic() {
        // v0 = 1 at (1,1), v2 = 4 at (2,2) = 2^2 * 1
        let f = compile("x*y");
        assert_eq!(degree_of(&f).unwrap(), Some(2));
    }

    #[test]
    fn test_degree_of_linear() {
        let f = compile("x + y");
        assert_eq!(degree_of(&f).unwrap(), Some(1));
    }

    #[test]
    fn test_degree_of_affine_is_none() {
        // v0 = 2, v2 = 3, and no k in [1,10] satisfies 3 = 2^k * 2
        let f = compile("x + 1");
        assert_eq!(degree_of(&f).unwrap(), None);
    }

    #[test]
    fn test_degree_zero_is_not_searched() {
        // x/y scales as t^0, but candidate degrees start at 1
        let f = compile("x/y");
        assert_eq!(degree_of(&f).unwrap(), None);
    }

    #[test]
    fn test_degree_of_unevaluable_base_point() {
        // ln(x - 1) is undefined at (1,1): classified non-homogeneous
        // rather than an error
        let f = compile("log(x-1)");
        assert_eq!(degree_of(&f).unwrap(), None);
    }

    #[test]
    fn test_degree_failure_at_scaled_point_propagates() {
        // evaluable at (1,1) but division by zero at (2,2)
        let f = compile("1/(x-2)");
        let err = degree_of(&f).unwrap_err();
        assert_eq!(err, CheckError::Eval(EvalError::DivisionByZero));
    }

    #[test]
    fn test_homogeneous_shared_degree() {
        let m = compile("x*y");
        let n = compile("x*y");
        assert_eq!(is_homogeneous(&m, &n).unwrap(), (true, Some(2)));
    }

    #[test]
    fn test_homogeneous_mismatched_degrees() {
        let m = compile("x");
        let n = compile("x*y");
        assert_eq!(is_homogeneous(&m, &n).unwrap(), (false, None));
    }

    #[test]
    fn test_non_homogeneous_pair() {
        let m = compile("x+1");
        let n = compile("x+1");
        assert_eq!(is_homogeneous(&m, &n).unwrap(), (false, None));
    }

    #[test]
    fn test_check_equation_exact_and_homogeneous() {
        let report = check_equation("y", "x").unwrap();
        assert_eq!(
            report,
            EquationReport {
                exact: true,
                homogeneous: true,
                degree: Some(1),
            }
        );
    }

    #[test]
    fn test_check_equation_parse_error() {
        let err = check_equation("foo(x,y)", "x").unwrap_err();
        assert_eq!(
            err,
            CheckError::Parse(ParseError::UnknownIdentifier("foo".to_string()))
        );
    }

    #[test]
    fn test_check_equation_division_by_zero_is_an_error() {
        // the pole at x = 1 sits on the sampling grid; the verdict must be
        // an error, not a silently swallowed infinity
        let err = check_equation("1/(x-1)", "x").unwrap_err();
        assert!(matches!(err, CheckError::Derivative(_)));
    }

    #[test]
    fn test_report_display() {
        let report = EquationReport {
            exact: true,
            homogeneous: true,
            degree: Some(2),
        };
        assert_eq!(
            format!("{}", report),
            "The equation is exact.\nThe equation is homogeneous of degree 2."
        );
        let report = EquationReport {
            exact: false,
            homogeneous: false,
            degree: None,
        };
        assert_eq!(
            format!("{}", report),
            "The equation is not exact.\nThe equation is non-homogeneous."
        );
    }

    #[test]
    fn test_equation_checker_front() {
        let mut checker = EquationChecker::new();
        checker.set_loglevel(Some("off".to_string()));
        checker.set_equations("x*y", "x*y");
        assert_eq!(checker.get_result(), None);
        let report = checker.check().unwrap();
        assert_eq!(report.homogeneous, true);
        assert_eq!(report.degree, Some(2));
        assert_eq!(checker.get_result(), Some(report));
        // setting a new pair clears the previous verdict
        checker.set_equations("x", "x");
        assert_eq!(checker.get_result(), None);
        let report = checker.check().unwrap();
        assert_eq!(report.exact, false);
    }
}
