use thiserror::Error;

use crate::{Color, Range, Token, UserFacing};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The input could not be split into tokens.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("invalid character '{char}' at {range}")]
    InvalidChar { char: char, range: Range },
    /// A digit run directly followed by `.` or another word character.
    #[error("invalid number literal at {0}")]
    InvalidNumberFormat(Range),
}

/// The tokens do not form exactly one expression.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParseError {
    /// The input ended where an operand was required.
    #[error("unexpected end of input at {0}")]
    UnexpectedEnd(Range),
    /// An operator was found where an operand was required.
    #[error("unexpected token '{0}' at {}", .0.range().start)]
    UnexpectedToken(Token),
    /// A complete expression is followed by more tokens. This is also how an
    /// operand in place of an operator is reported, as in `3 4`, spanning the
    /// leftover tokens.
    #[error("trailing input at {0}")]
    TrailingInput(Range),
}

impl Error {
    pub const fn is_lex(&self) -> bool {
        matches!(self, Self::Lex(_))
    }

    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

impl UserFacing for Error {
    const COLOR: Color = Color::Red;

    fn description(&self) -> String {
        match self {
            Self::Lex(LexError::InvalidChar { char, .. }) => {
                format!("Found an invalid character '{char}'")
            }
            Self::Lex(LexError::InvalidNumberFormat(_)) => {
                "Invalid number literal, only integers are supported".into()
            }
            Self::Parse(ParseError::UnexpectedEnd(_)) => "Missing an operand".into(),
            Self::Parse(ParseError::UnexpectedToken(t)) => {
                format!("Found an unexpected operator '{t}'")
            }
            Self::Parse(ParseError::TrailingInput(_)) => "Missing an operator".into(),
        }
    }

    fn ranges(&self) -> Vec<Range> {
        match self {
            Self::Lex(LexError::InvalidChar { range, .. }) => vec![*range],
            Self::Lex(LexError::InvalidNumberFormat(r)) => vec![*r],
            Self::Parse(ParseError::UnexpectedEnd(r)) => vec![*r],
            Self::Parse(ParseError::UnexpectedToken(t)) => vec![t.range()],
            Self::Parse(ParseError::TrailingInput(r)) => vec![*r],
        }
    }
}
