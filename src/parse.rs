use std::fmt::{self, Display};

use crate::{Op, OpT, ParseError, Range, Token, Val};

/// Parses exactly one expression spanning all `tokens`.
pub fn parse_tokens(tokens: &[Token]) -> crate::Result<Ast> {
    let mut parser = Parser::new(tokens);
    let ast = parser.parse_expr()?;

    if let Some(t) = parser.peek() {
        let last = tokens.last().map_or(t.range(), |l| l.range());
        return Err(ParseError::TrailingInput(Range::span(t.range(), last)).into());
    }

    log::debug!("parsed {} tokens into {ast}", tokens.len());
    Ok(ast)
}

struct Parser<'a> {
    tokens: &'a [Token],
    cursor: usize,
    operands: Vec<Ast>,
    ops: Vec<Op>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            cursor: 0,
            operands: Vec::new(),
            ops: Vec::new(),
        }
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.peek()?;
        self.cursor += 1;
        Some(t)
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.cursor).copied()
    }

    /// The position right after the last consumed token
    fn end(&self) -> Range {
        match self.cursor.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(t) => t.range().after(),
            None => Range::pos(0),
        }
    }

    fn expect_operand(&mut self) -> crate::Result<Ast> {
        match self.next() {
            Some(Token::Num(n)) => Ok(Ast::new(AstT::Num(n.val), n.range)),
            Some(t @ Token::Op(_)) => Err(ParseError::UnexpectedToken(t).into()),
            None => Err(ParseError::UnexpectedEnd(self.end()).into()),
        }
    }

    /// Precedence climbing without recursion. Pending operators wait on a
    /// stack until an operator binding less tightly to its left arrives, so
    /// nesting depth never turns into call depth.
    fn parse_expr(&mut self) -> crate::Result<Ast> {
        let first = self.expect_operand()?;
        self.operands.push(first);

        // an operand following an operand is left as trailing input
        while let Some(Token::Op(op)) = self.peek() {
            self.next();

            let (l_bp, _) = op.typ.infix_bp();
            while self.ops.last().is_some_and(|top| top.typ.infix_bp().1 > l_bp) {
                self.reduce();
            }
            self.ops.push(op);

            let rhs = self.expect_operand()?;
            self.operands.push(rhs);
        }

        while !self.ops.is_empty() {
            self.reduce();
        }

        // every operator pairs with one more operand, so exactly one tree is left
        self.operands
            .pop()
            .ok_or_else(|| crate::Error::from(ParseError::UnexpectedEnd(self.end())))
    }

    /// Combines the top operator with the two topmost operands.
    fn reduce(&mut self) {
        let op = self.ops.pop();
        let rhs = self.operands.pop();
        let lhs = self.operands.pop();
        if let (Some(op), Some(lhs), Some(rhs)) = (op, lhs, rhs) {
            let range = Range::span(lhs.range, rhs.range);
            self.operands.push(Ast::new(AstT::binary(op.typ, lhs, rhs), range));
        }
    }
}

impl OpT {
    /// Left and right binding power. Left associative operators bind tighter to
    /// the right, `**` binds tighter to the left.
    pub const fn infix_bp(&self) -> (u8, u8) {
        match self {
            Self::Add | Self::Sub => (1, 2),
            Self::Mul | Self::Div => (3, 4),
            Self::Pow => (6, 5),
        }
    }

    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            Self::Pow => a.powf(b),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Ast {
    pub typ: AstT,
    pub range: Range,
}

#[derive(Debug, PartialEq)]
pub enum AstT {
    Num(Val),
    Add(Box<Ast>, Box<Ast>),
    Sub(Box<Ast>, Box<Ast>),
    Mul(Box<Ast>, Box<Ast>),
    Div(Box<Ast>, Box<Ast>),
    Pow(Box<Ast>, Box<Ast>),
}

impl AstT {
    pub fn binary(op: OpT, a: Ast, b: Ast) -> Self {
        let (a, b) = (Box::new(a), Box::new(b));
        match op {
            OpT::Add => Self::Add(a, b),
            OpT::Sub => Self::Sub(a, b),
            OpT::Mul => Self::Mul(a, b),
            OpT::Div => Self::Div(a, b),
            OpT::Pow => Self::Pow(a, b),
        }
    }

    pub fn as_binary(&self) -> Option<(OpT, &Ast, &Ast)> {
        match self {
            Self::Num(_) => None,
            Self::Add(a, b) => Some((OpT::Add, a, b)),
            Self::Sub(a, b) => Some((OpT::Sub, a, b)),
            Self::Mul(a, b) => Some((OpT::Mul, a, b)),
            Self::Div(a, b) => Some((OpT::Div, a, b)),
            Self::Pow(a, b) => Some((OpT::Pow, a, b)),
        }
    }

    /// Moves the operands out, leaving a literal behind.
    fn take_operands(&mut self) -> Option<(Box<Ast>, Box<Ast>)> {
        match std::mem::replace(self, Self::Num(Val::Int(0))) {
            Self::Num(v) => {
                *self = Self::Num(v);
                None
            }
            Self::Add(a, b)
            | Self::Sub(a, b)
            | Self::Mul(a, b)
            | Self::Div(a, b)
            | Self::Pow(a, b) => Some((a, b)),
        }
    }
}

impl Ast {
    pub const fn new(typ: AstT, range: Range) -> Self {
        Self { typ, range }
    }

    /// Evaluates the tree with IEEE-754 double semantics. Division by zero
    /// yields an infinity or NaN, never an error.
    pub fn eval(&self) -> f64 {
        enum Step<'a> {
            Visit(&'a Ast),
            Apply(OpT),
        }

        let mut steps = vec![Step::Visit(self)];
        let mut vals: Vec<f64> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(ast) => {
                    if let AstT::Num(v) = &ast.typ {
                        vals.push(v.to_f64());
                    } else if let Some((op, a, b)) = ast.typ.as_binary() {
                        steps.push(Step::Apply(op));
                        steps.push(Step::Visit(b));
                        steps.push(Step::Visit(a));
                    }
                }
                Step::Apply(op) => {
                    if let (Some(b), Some(a)) = (vals.pop(), vals.pop()) {
                        vals.push(op.apply(a, b));
                    }
                }
            }
        }

        // a complete walk leaves exactly one value
        vals.pop().unwrap_or(f64::NAN)
    }
}

/// Fully parenthesized, so the grouping is visible.
impl Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Step<'a> {
            Visit(&'a Ast),
            Op(OpT),
            Close,
        }

        let mut steps = vec![Step::Visit(self)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(ast) => {
                    if let AstT::Num(v) = &ast.typ {
                        write!(f, "{v}")?;
                    } else if let Some((op, a, b)) = ast.typ.as_binary() {
                        f.write_str("(")?;
                        steps.push(Step::Close);
                        steps.push(Step::Visit(b));
                        steps.push(Step::Op(op));
                        steps.push(Step::Visit(a));
                    }
                }
                Step::Op(op) => write!(f, " {op} ")?,
                Step::Close => f.write_str(")")?,
            }
        }

        Ok(())
    }
}

/// Deep trees are torn down from a worklist instead of recursively.
impl Drop for Ast {
    fn drop(&mut self) {
        let mut pending: Vec<Box<Ast>> = Vec::new();
        if let Some((a, b)) = self.typ.take_operands() {
            pending.push(a);
            pending.push(b);
        }
        while let Some(mut ast) = pending.pop() {
            if let Some((a, b)) = ast.typ.take_operands() {
                pending.push(a);
                pending.push(b);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{tokenize, Error, Op};

    fn tree(input: &str) -> String {
        let tokens = tokenize(input).unwrap();
        parse_tokens(&tokens).unwrap().to_string()
    }

    fn assert_err(input: &str, expected: ParseError) {
        let tokens = tokenize(input).unwrap();
        match parse_tokens(&tokens) {
            Ok(a) => panic!("Expected error: {expected:?}, found {a}"),
            Err(e) => assert_eq!(e, Error::Parse(expected)),
        }
    }

    #[test]
    fn single_literal() {
        let tokens = tokenize("42").unwrap();
        let ast = parse_tokens(&tokens).unwrap();
        assert_eq!(ast, Ast::new(AstT::Num(Val::Int(42)), Range::of(0, 2)));
    }

    #[test]
    fn ranges() {
        let tokens = tokenize("1 + 2 * 3").unwrap();
        let ast = parse_tokens(&tokens).unwrap();

        let num = |v, pos| Box::new(Ast::new(AstT::Num(Val::Int(v)), Range::pos(pos)));
        let mul = Box::new(Ast::new(AstT::Mul(num(2, 4), num(3, 8)), Range::of(4, 9)));
        assert_eq!(ast, Ast::new(AstT::Add(num(1, 0), mul), Range::of(0, 9)));
    }

    #[test]
    fn left_associative() {
        assert_eq!(tree("10 - 4 - 3"), "((10 - 4) - 3)");
        assert_eq!(tree("20 / 4 / 2"), "((20 / 4) / 2)");
        assert_eq!(tree("1 + 2 - 3 + 4"), "(((1 + 2) - 3) + 4)");
        assert_eq!(tree("2 * 3 / 4 * 5"), "(((2 * 3) / 4) * 5)");
    }

    #[test]
    fn right_associative() {
        assert_eq!(tree("2 ** 3 ** 2"), "(2 ** (3 ** 2))");
        assert_eq!(tree("1 ** 2 ** 3 ** 4"), "(1 ** (2 ** (3 ** 4)))");
    }

    #[test]
    fn precedence() {
        assert_eq!(tree("2 + 3 * 4"), "(2 + (3 * 4))");
        assert_eq!(tree("2 * 3 ** 2"), "(2 * (3 ** 2))");
        assert_eq!(tree("2 ** 3 * 4"), "((2 ** 3) * 4)");
        assert_eq!(tree("1 + 2 * 3 - 4"), "((1 + (2 * 3)) - 4)");
        assert_eq!(tree("2 * 3 ** 2 + 1"), "((2 * (3 ** 2)) + 1)");
    }

    #[test]
    fn empty() {
        assert_err("", ParseError::UnexpectedEnd(Range::pos(0)));
        assert_err(" \t", ParseError::UnexpectedEnd(Range::pos(0)));
    }

    #[test]
    fn missing_operand() {
        assert_err("3 +", ParseError::UnexpectedEnd(Range::pos(3)));
        assert_err("2 ** 3 **", ParseError::UnexpectedEnd(Range::pos(9)));
    }

    #[test]
    fn unexpected_operator() {
        assert_err(
            "+ 3",
            ParseError::UnexpectedToken(Token::op(OpT::Add, Range::pos(0))),
        );
        assert_err(
            "* 5",
            ParseError::UnexpectedToken(Token::op(OpT::Mul, Range::pos(0))),
        );
        assert_err(
            "3 + + 4",
            ParseError::UnexpectedToken(Token::op(OpT::Add, Range::pos(4))),
        );
        assert_err(
            "3 * ** 4",
            ParseError::UnexpectedToken(Token::Op(Op {
                typ: OpT::Pow,
                range: Range::of(4, 6),
            })),
        );
    }

    #[test]
    fn trailing_input() {
        assert_err("3 4", ParseError::TrailingInput(Range::pos(2)));
        assert_err("1 + 2 3 * 4", ParseError::TrailingInput(Range::of(6, 11)));
        assert_err("2 ** 3 4", ParseError::TrailingInput(Range::pos(7)));
    }

    #[test]
    fn eval() {
        let eval = |input: &str| parse_tokens(&tokenize(input).unwrap()).unwrap().eval();

        assert_eq!(eval("1 / 2"), 0.5);
        assert_eq!(eval("2 ** 3 ** 2"), 512.0);
        assert_eq!(eval("10 - 2 ** 3"), 2.0);
        assert_eq!(eval("0 ** 0"), 1.0);
        assert_eq!(eval("5 / 0"), f64::INFINITY);
        assert_eq!(eval("0 - 5 / 0"), f64::NEG_INFINITY);
        assert!(eval("0 / 0").is_nan());
    }

    /// Runs `f` on a thread whose stack is far smaller than the trees it builds.
    fn on_small_stack(f: impl FnOnce() + Send + 'static) {
        std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap();
    }

    #[test]
    fn deep_left_chain() {
        on_small_stack(|| {
            let input = vec!["1"; 100_000].join(" - ");
            let ast = parse_tokens(&tokenize(&input).unwrap()).unwrap();

            assert_eq!(ast.eval(), 1.0 - 99_999.0);
            let rendered = ast.to_string();
            assert!(rendered.starts_with(&"(".repeat(99_999)));
            assert!(rendered.ends_with(" - 1) - 1)"));
        });
    }

    #[test]
    fn deep_pow_chain() {
        on_small_stack(|| {
            let input = vec!["1"; 100_000].join(" ** ");
            let ast = parse_tokens(&tokenize(&input).unwrap()).unwrap();

            assert_eq!(ast.eval(), 1.0);
            let rendered = ast.to_string();
            assert!(rendered.starts_with("(1 ** (1 ** "));
            assert!(rendered.ends_with(&")".repeat(99_999)));
        });
    }
}
