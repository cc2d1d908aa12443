use std::cmp::min;
use std::fmt::{self, Write};

use unicode_width::UnicodeWidthChar;

use crate::{Color, Range, ANSI_ESC};

/// Something that can be shown to the user with the input ranges it refers to marked.
pub trait UserFacing: Sized + fmt::Debug {
    /// Color of the marks and the description
    const COLOR: Color;

    fn description(&self) -> String;
    fn ranges(&self) -> Vec<Range>;

    fn display<'a>(&'a self, input: &'a str) -> DisplayUserFacing<'a, Self> {
        DisplayUserFacing { input, error: self }
    }
}

pub struct DisplayUserFacing<'a, U: UserFacing> {
    input: &'a str,
    error: &'a U,
}

impl<U: UserFacing> fmt::Display for DisplayUserFacing<'_, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ranges = self.error.ranges();

        for (nr, (lr, l)) in range_lines(self.input).iter().enumerate() {
            let intersecting: Vec<_> = ranges
                .iter()
                .filter(|r| r.intersects(lr))
                .map(|r| {
                    let ms = r.start.saturating_sub(lr.start);
                    let me = min(r.end, lr.end).saturating_sub(lr.start);
                    Range::of(ms, me)
                })
                .collect();

            if !intersecting.is_empty() {
                mark_ranges(f, nr + 1, l, &intersecting, U::COLOR)?;
            }
        }

        write!(
            f,
            "   {blue}│{esc} {col}{desc}{esc}",
            desc = self.error.description(),
            col = U::COLOR,
            blue = Color::Blue,
            esc = ANSI_ESC,
        )
    }
}

fn mark_ranges(
    f: &mut fmt::Formatter<'_>,
    line_nr: usize,
    line: &str,
    ranges: &[Range],
    color: Color,
) -> fmt::Result {
    write!(
        f,
        "{blue}{line_nr:02} │{esc} {line}\n   {blue}│{esc} ",
        blue = Color::Blue,
        esc = ANSI_ESC,
    )?;

    let mut chars = line.chars();
    let mut pos = 0;

    for r in ranges {
        let offset: usize = chars
            .by_ref()
            .take(r.start.saturating_sub(pos))
            .map(|c| c.width().unwrap_or(0))
            .sum();
        pos = pos.max(r.start);

        let width: usize = chars
            .by_ref()
            .take(r.end.saturating_sub(pos))
            .map(|c| c.width().unwrap_or(0))
            .sum();
        pos = pos.max(r.end);

        for _ in 0..offset {
            f.write_char(' ')?;
        }
        write!(f, "{color}")?;
        // past the end of the line there is nothing to underline, mark the spot
        for _ in 0..width.max(1) {
            f.write_char('^')?;
        }
        f.write_str(ANSI_ESC)?;
    }

    f.write_char('\n')
}

/// Splits the input into lines, each with the range of char positions it covers.
/// The ranges extend one past the line end, so a position right after the last
/// char still belongs to the line.
fn range_lines(input: &str) -> Vec<(Range, &str)> {
    let mut lines = Vec::new();
    let mut start = 0;

    for l in input.split('\n') {
        let len = l.chars().count();
        let line = l.strip_suffix('\r').unwrap_or(l);
        lines.push((Range::of(start, start + len + 1), line));
        start += len + 1;
    }

    lines
}
