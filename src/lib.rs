//! Parses and evaluates arithmetic expressions over integer literals and the
//! binary operators `+ - * / **`.
//!
//! `**` binds tightest and is right associative, `*` and `/` come next, `+` and
//! `-` bind weakest. Evaluation uses `f64`, so `1 / 2` is `0.5` and `5 / 0` is
//! infinity.
//!
//! ```
//! assert_eq!(exprcalc::parse("2 + 3 * 4"), Ok(14.0));
//! assert_eq!(exprcalc::parse("2 ** 3 ** 2"), Ok(512.0));
//! assert!(exprcalc::parse("3 +").is_err());
//! ```

pub use display::*;
pub use error::*;
pub use parse::*;
pub use style::*;
pub use token::*;

mod display;
mod error;
mod parse;
mod style;
mod token;

/// Tokenizes, parses and evaluates `input`.
pub fn parse(input: &str) -> crate::Result<f64> {
    let ast = parse_ast(input)?;
    let val = ast.eval();
    log::debug!("evaluated {input:?} to {val}");
    Ok(val)
}

/// Tokenizes and parses `input` without evaluating it.
pub fn parse_ast(input: &str) -> crate::Result<Ast> {
    let tokens = tokenize(input)?;
    parse_tokens(&tokens)
}
