use std::fmt;

/// A classified fragment of the input text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// Numeric literal, kept in its source form. The tokenizer only emits
    /// literals that parse as a float.
    Number(&'a str),
    Symbol(Symbol),
}

/// Operators and brackets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    // Binary ops.
    Add,
    Subtract,
    Multiply,
    Divide,

    // Brackets.
    OpenBracket,
    CloseBracket,
}

impl Symbol {
    pub fn as_char(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
            Self::OpenBracket => '(',
            Self::CloseBracket => ')',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(literal) => f.write_str(literal),
            Self::Symbol(symbol) => fmt::Display::fmt(symbol, f),
        }
    }
}
