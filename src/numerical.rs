/// # Numerical differentiation
/// centered-difference partial derivatives of a compiled (x, y) function
/// with respect to one of the two axes
pub mod derivative;
///____________________________________________________________________________________________________________________________
/// # Equation checks
/// sampling-based exactness and homogeneity tests for an equation
/// M(x,y)dx + N(x,y)dy = 0, plus the `EquationChecker` front that wires
/// parsing, checking and logging together
pub mod equation_check;
