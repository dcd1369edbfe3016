use std::collections::HashMap;

use crate::error::CalcError;
use crate::token::{Symbol, Token};
use crate::FloatExt;

use num_traits::Zero;
use once_cell::sync::Lazy;

/// Binding strength of the binary operators. Higher binds tighter; equal
/// ranks associate left to right.
static PRECEDENCE: Lazy<HashMap<Symbol, u8>> = Lazy::new(|| {
    use Symbol::*;

    HashMap::from([(Add, 1), (Subtract, 1), (Multiply, 2), (Divide, 2)])
});

fn precedence(symbol: Symbol) -> u8 {
    PRECEDENCE.get(&symbol).copied().unwrap_or(0)
}

/// Reduces a token sequence to a single value in one left-to-right pass.
///
/// Operands and pending operators live on two explicit stacks. A `(` sits on
/// the operator stack as a barrier that precedence resolution never crosses;
/// the matching `)` unwinds everything above it.
pub fn evaluate_tokens<R: FloatExt>(tokens: &[Token<'_>]) -> Result<R, CalcError> {
    let mut stacks = Stacks::<R>::default();
    for token in tokens {
        match *token {
            Token::Number(literal) => {
                match literal.parse::<R>() {
                    Ok(value) if value.is_finite() => stacks.operands.push(value),
                    _ => {
                        return Err(CalcError::InvalidNumberFormat {
                            literal: literal.to_string(),
                        })
                    }
                }
            }
            Token::Symbol(Symbol::OpenBracket) => stacks.operators.push(Symbol::OpenBracket),
            Token::Symbol(Symbol::CloseBracket) => stacks.close_bracket()?,
            Token::Symbol(op) => stacks.push_operator(op)?,
        }
    }
    stacks.finish()
}

struct Stacks<R> {
    operands: Vec<R>,
    operators: Vec<Symbol>,
}

impl<R> Default for Stacks<R> {
    fn default() -> Self {
        Self {
            operands: vec![],
            operators: vec![],
        }
    }
}

impl<R: FloatExt> Stacks<R> {
    fn close_bracket(&mut self) -> Result<(), CalcError> {
        loop {
            match self.operators.pop() {
                Some(Symbol::OpenBracket) => return Ok(()),
                Some(op) => self.apply(op)?,
                None => return Err(CalcError::UnbalancedBrackets),
            }
        }
    }

    fn push_operator(&mut self, op: Symbol) -> Result<(), CalcError> {
        while let Some(&top) = self.operators.last() {
            if top == Symbol::OpenBracket || precedence(top) < precedence(op) {
                break;
            }
            self.operators.pop();
            self.apply(top)?;
        }
        self.operators.push(op);
        Ok(())
    }

    fn finish(mut self) -> Result<R, CalcError> {
        while let Some(op) = self.operators.pop() {
            if op == Symbol::OpenBracket {
                return Err(CalcError::UnbalancedBrackets);
            }
            self.apply(op)?;
        }
        match self.operands.as_slice() {
            [value] => Ok(*value),
            _ => Err(CalcError::InvalidExpression),
        }
    }

    /// Pops `b` then `a` and pushes `a op b`.
    fn apply(&mut self, op: Symbol) -> Result<(), CalcError> {
        let [.., a, b] = *self.operands.as_slice() else {
            return Err(CalcError::NotEnoughOperands);
        };
        self.operands.truncate(self.operands.len() - 2);
        let result = match op {
            Symbol::Add => a + b,
            Symbol::Subtract => a - b,
            Symbol::Multiply => a * b,
            Symbol::Divide => {
                if b.is_zero() {
                    return Err(CalcError::DivisionByZero);
                }
                a / b
            }
            Symbol::OpenBracket | Symbol::CloseBracket => {
                unreachable!("Brackets are never applied as operators: {op}")
            }
        };
        self.operands.push(result);
        Ok(())
    }
}
