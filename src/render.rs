//! Styled output of serialized hunks.

use std::fmt;

use termcolor::{Color, ColorSpec, WriteColor};

use crate::escape::decode;
use crate::patch::Hunk;
use crate::{Error, Result};

/// Encoded line feed that separates the sub-lines of a change line.
const LINE_FEED: &str = "%0A";

/// The two styles a diff is rendered with. Everything else is written plain.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Style {
    /// Inserted text, green.
    Insertion,
    /// Deleted text, red.
    Deletion,
}

impl Style {
    pub fn color_spec(self) -> ColorSpec {
        let color = match self {
            Style::Insertion => Color::Green,
            Style::Deletion => Color::Red,
        };
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color));
        spec
    }
}

/// Writes `args` in `style` and resets the style afterwards.
pub(crate) fn write_styled(
    out: &mut dyn WriteColor,
    style: Style,
    args: fmt::Arguments<'_>,
) -> std::io::Result<()> {
    out.set_color(&style.color_spec())?;
    out.write_fmt(args)?;
    out.reset()
}

/// A single line of a serialized patch.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PatchLine<'a> {
    Blank,
    /// An insertion or deletion. `body` is the still encoded text after the
    /// prefix and may span several lines of the original text.
    Change {
        style: Style,
        prefix: char,
        body: &'a str,
    },
    /// A hunk header or a context line, including its prefix.
    Context(&'a str),
}

impl<'a> PatchLine<'a> {
    /// Classifies `line` by its first character.
    pub fn classify(line: &'a str) -> Result<PatchLine<'a>> {
        let Some(prefix) = line.chars().next() else {
            return Ok(PatchLine::Blank);
        };
        let body = &line[prefix.len_utf8()..];
        match prefix {
            '+' => Ok(PatchLine::Change {
                style: Style::Insertion,
                prefix,
                body,
            }),
            '-' => Ok(PatchLine::Change {
                style: Style::Deletion,
                prefix,
                body,
            }),
            ' ' | '@' => Ok(PatchLine::Context(line)),
            _ => Err(Error::MalformedPatch {
                prefix,
                line: line.to_owned(),
            }),
        }
    }
}

/// Splits the body of a change line into the encoded lines it spans. A single
/// trailing line feed does not start another line.
fn sub_lines(body: &str) -> impl Iterator<Item = &str> {
    body.strip_suffix(LINE_FEED).unwrap_or(body).split(LINE_FEED)
}

/// Renders the serialized hunk text `serialized` to `out`.
///
/// Every change line is split into its sub-lines, and each one is written
/// decoded and styled, prefixed with the change marker. Header and context
/// lines are written decoded and plain, empty lines as a bare line break.
///
/// Rendering stops at the first malformed line. Everything before it has
/// already been written at that point.
pub fn render_hunk(serialized: &str, out: &mut dyn WriteColor) -> Result<()> {
    for line in serialized.split('\n') {
        match PatchLine::classify(line)? {
            PatchLine::Blank => writeln!(out)?,
            PatchLine::Change {
                style,
                prefix,
                body,
            } => {
                for sub_line in sub_lines(body) {
                    write_styled(out, style, format_args!("{prefix}{}\n", decode(sub_line)))?;
                }
            }
            PatchLine::Context(line) => writeln!(out, "{}", decode(line))?,
        }
    }
    Ok(())
}

/// Serializes every hunk on its own and renders it with [`render_hunk`], so
/// each hunk is followed by an empty line.
pub fn render_patch(hunks: &[Hunk], out: &mut dyn WriteColor) -> Result<()> {
    for hunk in hunks {
        render_hunk(&hunk.to_string(), out)?;
    }
    Ok(())
}
