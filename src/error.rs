/// Every way an evaluation can fail. All of them are deterministic for a
/// given input; the first one encountered aborts the evaluation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CalcError {
    #[error("invalid number format: {literal:?}")]
    InvalidNumberFormat { literal: String },
    #[error("unsupported symbol {symbol:?} at byte {position}")]
    UnsupportedSymbol { symbol: char, position: usize },
    #[error("unbalanced brackets")]
    UnbalancedBrackets,
    #[error("invalid expression")]
    InvalidExpression,
    #[error("not enough operands")]
    NotEnoughOperands,
    #[error("division by zero")]
    DivisionByZero,
}
