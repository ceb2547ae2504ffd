#![allow(non_camel_case_types)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use checkxact::symbolic::symbolic_engine::Expr;
/// let input = "x^2* log(x+y)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// let parsed_function = parsed_expression.compile_xy().unwrap();
/// println!("{}, Rust function: {:?}  \n", input, parsed_function.eval(1.0, 2.0));
/// ```
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) holds the symbolic expression tree over the two free variables x and y
/// 2) provides constructors and operator overloads to build expressions in code
/// 3) prints expressions back in math notation for control of results
pub mod symbolic_engine;
///____________________________________________________________________________________________________________________________
/// # Safe evaluation
/// a module turns a symbolic expression into a regular Rust function of (x, y)
/// with checked arithmetic: division by zero, logarithm domain violations and
/// non-finite intermediate values are reported as errors, never as silent NaN
pub mod symbolic_eval;
