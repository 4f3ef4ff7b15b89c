//! Symbol table and assignment evaluation.
//!
//! Identifiers map to textual values; a lookup miss means "not a known
//! identifier" and the token passes through as a literal. The pipeline
//! resolves every token after the leading keyword/target before a
//! statement is dispatched, so [`Environment::assign`] receives its
//! operands already resolved.

use std::collections::HashMap;

use crate::error::Error;

#[derive(Debug, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment::default()
    }

    /// Resolve a token to its stored value, or hand it back unchanged.
    pub fn resolve(&self, token: &str) -> String {
        match self.vars.get(token) {
            Some(v) => v.clone(),
            None => token.to_string(),
        }
    }

    pub fn set(&mut self, id: &str, value: &str) {
        self.vars.insert(id.to_string(), value.to_string());
    }

    /// True when the line's shape is one of the assignment forms.
    pub fn is_assignment(tokens: &[String]) -> bool {
        tokens.len() >= 2 && matches!(tokens[1].as_str(), "=" | "+=" | "-=" | "*=" | "/=")
    }

    /// Apply one assignment statement. Arithmetic failures leave the
    /// target untouched.
    pub fn assign(&mut self, tokens: &[String], line: usize) -> Result<(), Error> {
        let target = tokens[0].clone();
        match (tokens.len(), tokens[1].as_str()) {
            // id = value
            (3, "=") => {
                self.vars.insert(target, tokens[2].clone());
                Ok(())
            }
            // id = a op b
            (5, "=") => {
                let a = number(&tokens[2], line)?;
                let b = number(&tokens[4], line)?;
                let r = binop(a, &tokens[3], b, line)?;
                self.vars.insert(target, fmt_num(r));
                Ok(())
            }
            // id op= value
            (3, op @ ("+=" | "-=" | "*=" | "/=")) => {
                let cur = number(&self.resolve(&target), line)?;
                let b = number(&tokens[2], line)?;
                let r = binop(cur, &op[..1], b, line)?;
                self.vars.insert(target, fmt_num(r));
                Ok(())
            }
            _ => Err(Error::BadAssignment { line }),
        }
    }
}

fn binop(a: f64, op: &str, b: f64, line: usize) -> Result<f64, Error> {
    match op {
        "+" => Ok(a + b),
        "-" => Ok(a - b),
        "*" => Ok(a * b),
        "/" if b == 0.0 => Err(Error::DivideByZero { line }),
        "/" => Ok(a / b),
        _ => Err(Error::BadAssignment { line }),
    }
}

/// Parse a resolved token as a float.
pub(crate) fn number(token: &str, line: usize) -> Result<f64, Error> {
    token.parse().map_err(|_| Error::BadNumber {
        line,
        token: token.to_string(),
    })
}

/// Minimal textual form of a computed value, as stored back into the
/// symbol table and written into emitted attributes.
pub(crate) fn fmt_num(v: f64) -> String {
    format!("{v}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(ts: &[&str]) -> Vec<String> {
        ts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolve_is_literal_passthrough() {
        let env = Environment::new();
        assert_eq!(env.resolve("novar"), "novar");
        assert_eq!(env.resolve("\"quoted\""), "\"quoted\"");
    }

    #[test]
    fn simple_then_binary_assignment() {
        let mut env = Environment::new();
        env.assign(&toks(&["x", "=", "5"]), 1).unwrap();
        let rhs = env.resolve("x");
        env.assign(&toks(&["y", "=", &rhs, "+", "1"]), 2).unwrap();
        assert_eq!(env.resolve("y"), "6");
    }

    #[test]
    fn simple_assignment_keeps_strings_verbatim() {
        let mut env = Environment::new();
        env.assign(&toks(&["title", "=", "\"hello\""]), 1).unwrap();
        assert_eq!(env.resolve("title"), "\"hello\"");
    }

    #[test]
    fn division_by_zero_leaves_target_unset() {
        let mut env = Environment::new();
        let err = env.assign(&toks(&["a", "=", "1", "/", "0"]), 3).unwrap_err();
        assert!(matches!(err, Error::DivideByZero { line: 3 }));
        assert_eq!(env.resolve("a"), "a");
    }

    #[test]
    fn compound_assignment() {
        let mut env = Environment::new();
        env.assign(&toks(&["x", "=", "10"]), 1).unwrap();
        env.assign(&toks(&["x", "-=", "3"]), 2).unwrap();
        assert_eq!(env.resolve("x"), "7");
    }

    #[test]
    fn compound_assignment_needs_numeric_target() {
        let mut env = Environment::new();
        let err = env.assign(&toks(&["x", "+=", "1"]), 1).unwrap_err();
        assert!(matches!(err, Error::BadNumber { .. }));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let mut env = Environment::new();
        let err = env.assign(&toks(&["x", "=", "1", "+"]), 9).unwrap_err();
        assert!(matches!(err, Error::BadAssignment { line: 9 }));
    }
}
