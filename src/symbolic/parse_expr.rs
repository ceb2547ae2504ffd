//! a module turns a String expression into a symbolic expression
//!
//! The grammar is closed: the only identifiers that resolve are the two
//! variables x and y, the constant e and the whitelisted function names
//! sin, cos, tan, log, ln, exp. Anything else is rejected at parse time,
//! which is the sandboxing boundary of the whole examiner - there is no
//! way to reference a name the grammar does not know about.
//!
//! Grammar (recursive descent, standard precedence, `^` right-associative):
//!
//!   expr   := term (('+' | '-') term)*
//!   term   := factor (('*' | '/') factor)*
//!   factor := '-' factor | power
//!   power  := atom ('^' factor)?
//!   atom   := number | 'x' | 'y' | 'e' | func '(' expr ')' | '(' expr ')'
//!
//! Implicit multiplication ("2x") is not part of the grammar and fails as
//! a syntax error.

use crate::symbolic::symbolic_engine::Expr;
use std::f64::consts::E;
use std::fmt;

/// Error types for expression parsing
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    EmptyExpression,
    UnbalancedParentheses,
    UnknownIdentifier(String),
    UnexpectedToken(String),
    UnexpectedEnd,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::EmptyExpression => write!(f, "Expression is empty"),
            ParseError::UnbalancedParentheses => write!(f, "Unbalanced parentheses"),
            ParseError::UnknownIdentifier(name) => {
                write!(f, "Unknown identifier '{}'", name)
            }
            ParseError::UnexpectedToken(token) => write!(f, "Unexpected token '{}'", token),
            ParseError::UnexpectedEnd => write!(f, "Unexpected end of expression"),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Number(val) => write!(f, "{}", val),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

// check that every '(' has a matching ')' before any token work
fn check_brackets(input: &str) -> Result<(), ParseError> {
    let mut depth: i32 = 0;
    for c in input.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseError::UnbalancedParentheses);
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ParseError::UnbalancedParentheses);
    }
    Ok(())
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ParseError::UnexpectedToken(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                tokens.push(Token::Ident(name));
            }
            _ => return Err(ParseError::UnexpectedToken(c.to_string())),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_rparen(&mut self) -> Result<(), ParseError> {
        match self.advance() {
            Some(Token::RParen) => Ok(()),
            Some(token) => Err(ParseError::UnexpectedToken(token.to_string())),
            None => Err(ParseError::UnbalancedParentheses),
        }
    }

    // expr := term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut node = self.parse_term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    node = Expr::Add(node.boxed(), rhs.boxed());
                }
                Token::Minus => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    node = Expr::Sub(node.boxed(), rhs.boxed());
                }
                _ => break,
            }
        }
        Ok(node)
    }

    // term := factor (('*' | '/') factor)*
    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut node = self.parse_factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.advance();
                    let rhs = self.parse_factor()?;
                    node = Expr::Mul(node.boxed(), rhs.boxed());
                }
                Token::Slash => {
                    self.advance();
                    let rhs = self.parse_factor()?;
                    node = Expr::Div(node.boxed(), rhs.boxed());
                }
                _ => break,
            }
        }
        Ok(node)
    }

    // factor := '-' factor | power
    // unary minus becomes (-1.0) * operand and binds looser than '^',
    // so -x^2 parses as -(x^2)
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        if let Some(Token::Minus) = self.peek() {
            self.advance();
            let operand = self.parse_factor()?;
            return Ok(Expr::Mul(Expr::Const(-1.0).boxed(), operand.boxed()));
        }
        self.parse_power()
    }

    // power := atom ('^' factor)?   right-associative via factor recursion
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_atom()?;
        if let Some(Token::Caret) = self.peek() {
            self.advance();
            let exponent = self.parse_factor()?;
            return Ok(Expr::Pow(base.boxed(), exponent.boxed()));
        }
        Ok(base)
    }

    // atom := number | 'x' | 'y' | 'e' | func '(' expr ')' | '(' expr ')'
    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Const(value)),
            Some(Token::Ident(name)) => match name.as_str() {
                "x" | "y" => Ok(Expr::Var(name)),
                "e" => Ok(Expr::Const(E)),
                "sin" | "cos" | "tan" | "log" | "ln" | "exp" => {
                    match self.advance() {
                        Some(Token::LParen) => {}
                        Some(token) => {
                            return Err(ParseError::UnexpectedToken(token.to_string()));
                        }
                        None => return Err(ParseError::UnexpectedEnd),
                    }
                    let inner = self.parse_expr()?;
                    self.expect_rparen()?;
                    Ok(match name.as_str() {
                        "sin" => Expr::sin(inner.boxed()),
                        "cos" => Expr::cos(inner.boxed()),
                        "tan" => Expr::tg(inner.boxed()),
                        "log" | "ln" => Expr::Ln(inner.boxed()),
                        "exp" => Expr::Exp(inner.boxed()),
                        _ => unreachable!(),
                    })
                }
                _ => Err(ParseError::UnknownIdentifier(name)),
            },
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect_rparen()?;
                Ok(inner)
            }
            Some(token) => Err(ParseError::UnexpectedToken(token.to_string())),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

impl Expr {
    /// Parses a textual formula in x and y into a symbolic expression.
    ///
    /// Fails with ParseError when the text is empty, has unbalanced
    /// parentheses, references an identifier outside the whitelist, or
    /// does not fit the operator grammar (e.g. implicit multiplication).
    pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::EmptyExpression);
        }
        check_brackets(input)?;
        let tokens = tokenize(input)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.parse_expr()?;
        if let Some(leftover) = parser.peek() {
            return Err(ParseError::UnexpectedToken(leftover.to_string()));
        }
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_constant() {
        let expr = Expr::parse_expression("42").unwrap();
        assert_eq!(expr, Expr::Const(42.0));
    }

    #[test]
    fn test_parse_variable() {
        let expr = Expr::parse_expression("x").unwrap();
        assert_eq!(expr, Expr::Var("x".to_string()));
    }

    #[test]
    fn test_parse_euler_constant() {
        let expr = Expr::parse_expression("e").unwrap();
        assert_eq!(expr, Expr::Const(E));
    }

    #[test]
    fn test_parse_addition() {
        let expr = Expr::parse_expression("x + 2").unwrap();
        assert_eq!(
            expr,
            Expr::Add(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::Const(2.0))
            )
        );
    }

    #[test]
    fn test_parse_subtraction() {
        let expr = Expr::parse_expression("x - 2").unwrap();
        assert_eq!(
            expr,
            Expr::Sub(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::Const(2.0))
            )
        );
    }

    #[test]
    fn test_parse_multiplication() {
        let expr = Expr::parse_expression("x * 2").unwrap();
        assert_eq!(
            expr,
            Expr::Mul(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::Const(2.0))
            )
        );
    }

    #[test]
    fn test_parse_division() {
        let expr = Expr::parse_expression("x / 2").unwrap();
        assert_eq!(
            expr,
            Expr::Div(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::Const(2.0))
            )
        );
    }

    #[test]
    fn test_parse_power() {
        let expr = Expr::parse_expression("x^2").unwrap();
        assert_eq!(
            expr,
            Expr::Pow(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::Const(2.0))
            )
        );
    }

    #[test]
    fn test_parse_exponential() {
        let expr = Expr::parse_expression("exp(x)").unwrap();
        assert_eq!(expr, Expr::Exp(Box::new(Expr::Var("x".to_string()))));
    }

    #[test]
    fn test_parse_logarithm() {
        let expr = Expr::parse_expression("log(x)").unwrap();
        assert_eq!(expr, Expr::Ln(Box::new(Expr::Var("x".to_string()))));
        // ln is an alias of log: both mean the natural logarithm
        let expr = Expr::parse_expression("ln(x)").unwrap();
        assert_eq!(expr, Expr::Ln(Box::new(Expr::Var("x".to_string()))));
    }

    #[test]
    fn test_parse_sin() {
        let expr = Expr::parse_expression("sin(x)").unwrap();
        assert_eq!(expr, Expr::sin(Box::new(Expr::Var("x".to_string()))));
    }

    #[test]
    fn test_parse_cos() {
        let expr = Expr::parse_expression("cos(x)").unwrap();
        assert_eq!(expr, Expr::cos(Box::new(Expr::Var("x".to_string()))));
    }

    #[test]
    fn test_parse_tan() {
        let expr = Expr::parse_expression("tan(x)").unwrap();
        assert_eq!(expr, Expr::tg(Box::new(Expr::Var("x".to_string()))));
    }

    #[test]
    fn test_parse_nested_trig() {
        let expr = Expr::parse_expression("sin(cos(x))").unwrap();
        assert_eq!(
            expr,
            Expr::sin(Box::new(Expr::cos(Box::new(Expr::Var("x".to_string())))))
        );
    }

    #[test]
    fn test_parse_complex_trig() {
        let expr = Expr::parse_expression("sin(x) + cos(y)").unwrap();
        assert_eq!(
            expr,
            Expr::Add(
                Box::new(Expr::sin(Box::new(Expr::Var("x".to_string())))),
                Box::new(Expr::cos(Box::new(Expr::Var("y".to_string()))))
            )
        );
    }

    #[test]
    fn test_parse_expression_with_brackets() {
        let expr = Expr::parse_expression("(x + y) * x").unwrap();
        assert_eq!(
            expr,
            Expr::Mul(
                Box::new(Expr::Add(
                    Box::new(Expr::Var("x".to_string())),
                    Box::new(Expr::Var("y".to_string()))
                )),
                Box::new(Expr::Var("x".to_string()))
            )
        );
    }

    #[test]
    fn test_parse_complex_expression() {
        let expr = Expr::parse_expression("(x + y) * (y - 2) / exp(x)").unwrap();
        let x = Box::new(Expr::Var("x".to_string()));
        let y = Box::new(Expr::Var("y".to_string()));
        let c = Box::new(Expr::Const(2.0));
        let x_plus_y = Box::new(Expr::Add(x.clone(), y.clone()));
        let y_minus_c = Box::new(Expr::Sub(y, c));
        let e = Box::new(Expr::Exp(x));
        let result = Expr::Div(Box::new(Expr::Mul(x_plus_y, y_minus_c)), e);
        assert_eq!(expr, result);
    }

    #[test]
    fn test_multiple_subtraction() {
        let result = Expr::parse_expression("x^2 - x - 1").unwrap();
        let x = Box::new(Expr::Var("x".to_string()));
        let to_check = Expr::Pow(x.clone(), Box::new(Expr::Const(2.0))) - *x - Expr::Const(1.0);
        assert_eq!(result, to_check);
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let expr = Expr::parse_expression("x + y * 2").unwrap();
        assert_eq!(
            expr,
            Expr::Add(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::Mul(
                    Box::new(Expr::Var("y".to_string())),
                    Box::new(Expr::Const(2.0))
                ))
            )
        );
    }

    #[test]
    fn test_precedence_pow_over_mul() {
        let expr = Expr::parse_expression("2 * x^3").unwrap();
        assert_eq!(
            expr,
            Expr::Mul(
                Box::new(Expr::Const(2.0)),
                Box::new(Expr::Pow(
                    Box::new(Expr::Var("x".to_string())),
                    Box::new(Expr::Const(3.0))
                ))
            )
        );
    }

    #[test]
    fn test_power_right_associative() {
        let expr = Expr::parse_expression("x^2^3").unwrap();
        assert_eq!(
            expr,
            Expr::Pow(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::Pow(
                    Box::new(Expr::Const(2.0)),
                    Box::new(Expr::Const(3.0))
                ))
            )
        );
    }

    #[test]
    fn test_unary_minus() {
        let expr = Expr::parse_expression("-x").unwrap();
        assert_eq!(
            expr,
            Expr::Mul(
                Box::new(Expr::Const(-1.0)),
                Box::new(Expr::Var("x".to_string()))
            )
        );
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        let expr = Expr::parse_expression("-x^2").unwrap();
        assert_eq!(
            expr,
            Expr::Mul(
                Box::new(Expr::Const(-1.0)),
                Box::new(Expr::Pow(
                    Box::new(Expr::Var("x".to_string())),
                    Box::new(Expr::Const(2.0))
                ))
            )
        );
    }

    #[test]
    fn test_negative_exponent() {
        let expr = Expr::parse_expression("x^-2").unwrap();
        assert_eq!(
            expr,
            Expr::Pow(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::Const(2.0))
                ))
            )
        );
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(
            Expr::parse_expression("   "),
            Err(ParseError::EmptyExpression)
        );
    }

    #[test]
    fn test_unmatched_brackets() {
        assert_eq!(
            Expr::parse_expression("(x + y"),
            Err(ParseError::UnbalancedParentheses)
        );
        assert_eq!(
            Expr::parse_expression("x + y)"),
            Err(ParseError::UnbalancedParentheses)
        );
    }

    #[test]
    fn test_invalid_expression() {
        assert!(Expr::parse_expression("x +").is_err());
        assert!(Expr::parse_expression("* x").is_err());
    }

    #[test]
    fn test_unknown_identifier_rejected() {
        assert_eq!(
            Expr::parse_expression("foo(x,y)"),
            Err(ParseError::UnknownIdentifier("foo".to_string()))
        );
        assert_eq!(
            Expr::parse_expression("z + 1"),
            Err(ParseError::UnknownIdentifier("z".to_string()))
        );
        // "sin" inside a longer word is one identifier, never a function call
        assert_eq!(
            Expr::parse_expression("using + 1"),
            Err(ParseError::UnknownIdentifier("using".to_string()))
        );
    }

    #[test]
    fn test_implicit_multiplication_rejected() {
        let result = Expr::parse_expression("2x");
        assert_eq!(result, Err(ParseError::UnexpectedToken("x".to_string())));
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let first = Expr::parse_expression("sin(x) * y + 1").unwrap();
        let second = Expr::parse_expression("sin(x) * y + 1").unwrap();
        assert_eq!(first, second);
    }
}
