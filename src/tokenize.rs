use crate::error::CalcError;
use crate::token::{Symbol, Token};

use pest::error::InputLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"] // relative to project `src`
struct TokenParser;

/// Split `input` into tokens, left to right.
///
/// Whitespace produces no tokens and empty input produces an empty sequence.
/// The first malformed number or unknown character aborts the whole scan, so
/// a partial token sequence is never returned.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, CalcError> {
    let mut pairs = TokenParser::parse(Rule::expression, input).map_err(|e| {
        let position = match e.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start,
        };
        unsupported_at(input, position)
    })?;
    let Some(expression) = pairs.next() else {
        return Ok(vec![]);
    };

    let mut tokens = Vec::new();
    for pair in expression.into_inner() {
        if pair.as_rule() == Rule::EOI {
            break;
        }
        tokens.push(classify(pair)?);
    }
    Ok(tokens)
}

fn classify(pair: Pair<'_, Rule>) -> Result<Token<'_>, CalcError> {
    let symbol = match pair.as_rule() {
        Rule::number => {
            let literal = pair.as_str();
            // Literals beyond the f64 range parse as infinity.
            if !matches!(literal.parse::<f64>(), Ok(value) if value.is_finite()) {
                return Err(CalcError::InvalidNumberFormat {
                    literal: literal.to_string(),
                });
            }
            return Ok(Token::Number(literal));
        }
        Rule::unsupported => {
            let span = pair.as_span();
            return Err(unsupported_at(span.get_input(), span.start()));
        }
        Rule::add => Symbol::Add,
        Rule::subtract => Symbol::Subtract,
        Rule::multiply => Symbol::Multiply,
        Rule::divide => Symbol::Divide,
        Rule::open => Symbol::OpenBracket,
        Rule::close => Symbol::CloseBracket,
        x => unreachable!("Unexpected token rule {x:?}"),
    };
    Ok(Token::Symbol(symbol))
}

fn unsupported_at(input: &str, position: usize) -> CalcError {
    CalcError::UnsupportedSymbol {
        symbol: input[position..].chars().next().unwrap_or('\0'),
        position,
    }
}
