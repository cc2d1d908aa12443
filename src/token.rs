use std::fmt::{self, Display};
use std::iter::Peekable;
use std::str::Chars;

use crate::LexError;

struct Lexer<'a> {
    tokens: Vec<Token>,
    literal: String,
    chars: Peekable<Chars<'a>>,
    cursor: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            tokens: Vec::new(),
            literal: String::new(),
            chars: input.chars().peekable(),
            cursor: 0,
        }
    }

    fn next(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.cursor += 1;
        Some(c)
    }

    fn next_if(&mut self, expected: char) -> Option<char> {
        if self.chars.peek() == Some(&expected) {
            return self.next();
        }

        None
    }

    /// Position of the last consumed char
    const fn pos(&self) -> usize {
        self.cursor.saturating_sub(1)
    }

    fn new_atom(&mut self, token: Token) -> crate::Result<()> {
        self.end_literal(token.range().start)?;
        self.tokens.push(token);
        Ok(())
    }

    fn two_char_op(&mut self, one: OpT, two: OpT, expected: char) -> crate::Result<()> {
        let start = self.pos();
        let token = match self.next_if(expected) {
            Some(_) => Token::op(two, Range::of(start, start + 2)),
            None => Token::op(one, Range::pos(start)),
        };
        self.new_atom(token)
    }

    /// Completes the pending literal, which ends right before `end`.
    fn end_literal(&mut self, end: usize) -> crate::Result<()> {
        if self.literal.is_empty() {
            return Ok(());
        }

        let literal = std::mem::take(&mut self.literal);
        let start = end - literal.chars().count();
        let range = Range::of(start, end);

        match literal.chars().next() {
            Some(c) if !c.is_ascii_digit() => {
                let range = Range::pos(start);
                return Err(LexError::InvalidChar { char: c, range }.into());
            }
            _ => (),
        }
        if !literal.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LexError::InvalidNumberFormat(range).into());
        }

        // digit runs past u64::MAX keep their (rounded) value as a float
        let val = literal
            .parse::<u64>()
            .ok()
            .map(Val::Int)
            .or_else(|| literal.parse::<f64>().ok().map(Val::Float))
            .ok_or(LexError::InvalidNumberFormat(range))?;

        self.tokens.push(Token::num(val, range));
        Ok(())
    }
}

pub fn tokenize(input: &str) -> crate::Result<Vec<Token>> {
    let mut lexer = Lexer::new(input);

    while let Some(c) = lexer.next() {
        let range = Range::pos(lexer.pos());
        match c {
            '0'..='9' => lexer.literal.push(c),
            c if c.is_whitespace() => lexer.end_literal(lexer.pos())?,
            '+' => lexer.new_atom(Token::op(OpT::Add, range))?,
            '-' => lexer.new_atom(Token::op(OpT::Sub, range))?,
            '*' => lexer.two_char_op(OpT::Mul, OpT::Pow, '*')?,
            '/' => lexer.new_atom(Token::op(OpT::Div, range))?,
            // collected so that `3.5` or `12px` are reported as a whole
            c if c.is_alphanumeric() || c == '.' || c == '_' => lexer.literal.push(c),
            _ => {
                lexer.end_literal(range.start)?;
                return Err(LexError::InvalidChar { char: c, range }.into());
            }
        }
    }

    let end = lexer.cursor;
    lexer.end_literal(end)?;

    log::trace!("tokenized {input:?} into {} tokens: {:?}", lexer.tokens.len(), lexer.tokens);
    Ok(lexer.tokens)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Token {
    Num(Num),
    Op(Op),
}

impl Token {
    pub const fn num(val: Val, range: Range) -> Self {
        Self::Num(Num { val, range })
    }

    pub const fn op(typ: OpT, range: Range) -> Self {
        Self::Op(Op { typ, range })
    }

    pub const fn range(&self) -> Range {
        match self {
            Self::Num(n) => n.range,
            Self::Op(o) => o.range,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{}", n.val),
            Self::Op(o) => write!(f, "{}", o.typ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Num {
    pub val: Val,
    pub range: Range,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Val {
    Int(u64),
    Float(f64),
}

impl Val {
    pub fn to_f64(&self) -> f64 {
        match *self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

impl Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Op {
    pub typ: OpT,
    pub range: Range,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpT {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl OpT {
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
        }
    }
}

impl Display for OpT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Half-open range of char positions in the input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Range {
    /// inclusive
    pub start: usize,
    /// exclusive
    pub end: usize,
}

impl Range {
    pub const fn of(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn pos(pos: usize) -> Self {
        Self::of(pos, pos + 1)
    }

    pub const fn span(a: Self, b: Self) -> Self {
        Self::of(a.start, b.end)
    }

    pub const fn after(&self) -> Self {
        Self::pos(self.end)
    }

    pub const fn intersects(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
