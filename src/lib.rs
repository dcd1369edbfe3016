//! Arithmetic expression evaluator.
//!
//! Expressions are built from numbers, `+ - * /` and parentheses, with the
//! usual precedence (`*` and `/` bind tighter than `+` and `-`) and left
//! associativity. Evaluation is a tokenizer followed by a two-stack
//! (shunting-yard) reduction; nothing is shared between calls, so
//! [`evaluate`] can be called from any number of threads at once.
//!
//! # Example
//!
//! ```rust
//! use infix_calc::*;
//!
//! assert_eq!(evaluate("((10+5) * 2) / (15 * 2)"), Ok(1.0));
//! assert_eq!(evaluate("2+2*2"), Ok(6.0));
//! assert_eq!(evaluate("5/0"), Err(CalcError::DivisionByZero));
//! ```

pub mod application;

mod error;
mod evaluate;
mod token;
mod tokenize;

/// Uses the [`pest`] parsing expression grammar language.
///
/// ```text
#[doc = include_str!("grammar.pest")]
/// ```
pub mod grammar_doc {}

pub use error::CalcError;
pub use evaluate::evaluate_tokens;
pub use token::{Symbol, Token};
pub use tokenize::tokenize;

#[cfg(feature = "rayon")]
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

pub trait FloatExt: num_traits::Float + std::str::FromStr + Send + Sync {}
impl FloatExt for f32 {}
impl FloatExt for f64 {}

/// Evaluate `expression` in double precision.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    evaluate_as(expression)
}

/// Evaluate `expression` with any supported float type.
pub fn evaluate_as<R: FloatExt>(expression: &str) -> Result<R, CalcError> {
    let tokens = tokenize(expression)?;
    evaluate_tokens(&tokens)
}

/// Evaluate many independent expressions, preserving input order in the
/// output (with optional data parallelism via the `rayon` feature).
pub fn evaluate_batch<S: AsRef<str> + Sync>(expressions: &[S]) -> Vec<Result<f64, CalcError>> {
    #[cfg(feature = "rayon")]
    {
        expressions
            .par_iter()
            .map(|expression| evaluate(expression.as_ref()))
            .collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        expressions
            .iter()
            .map(|expression| evaluate(expression.as_ref()))
            .collect()
    }
}
