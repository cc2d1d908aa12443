use std::fmt;

pub const ANSI_ESC: &str = "\x1B[0m";

/// Prints a line to stdout in a bold [`Color`].
#[macro_export]
macro_rules! bprintln {
    ($col:expr, $pat:expr $(,$args:expr)*) => {{
        print!("{}", $col);
        print!($pat, $($args,)*);
        println!("{}", $crate::ANSI_ESC);
    }}
}

/// Bold terminal colors used in diagnostics. Displays as the escape sequence
/// that switches to the color, reset with [`ANSI_ESC`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    /// Errors
    Red,
    /// Line numbers and the gutter
    Blue,
}

impl Color {
    const fn code(self) -> u8 {
        match self {
            Self::Red => 91,
            Self::Blue => 94,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\x1B[1;{}m", self.code())
    }
}
