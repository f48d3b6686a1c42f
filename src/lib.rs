//! `diffview` renders the difference between two values as colored terminal output.
//!
//! Both values are turned into text first. If neither text contains a line
//! break, a **word diff** is shown: a character level edit script, cleaned up
//! so that edits line up with word boundaries, is printed one operation per
//! line followed by the patch hunks for it. As soon as either text spans
//! multiple lines, a **unified diff** is computed over whole lines and only the
//! patch hunks are shown.
//!
//! Deletions are rendered red and insertions green through
//! [`termcolor::WriteColor`], so the same diff can be written to a terminal, to
//! a buffer or into a `String`:
//!
//! ```
//! use diffview::{diff_with, ColorChoice, DiffOptions, Differ, Strategy};
//!
//! let mut options = DiffOptions::default();
//! options.color(ColorChoice::Never);
//!
//! let differ = diff_with(options.clone(), "a\nb\nc", "a\nx\nc");
//! assert_eq!(differ.strategy(), Strategy::Unified);
//! assert_eq!(
//!     differ.render_to_string()?,
//!     "@@ -1,5 +1,5 @@
//!  a
//! -b
//! +x
//!  c
//!
//! "
//! );
//!
//! let differ = diff_with(options, "hello world", "hello word");
//! assert_eq!(differ.strategy(), Strategy::Word);
//! assert_eq!(
//!     differ.render_to_string()?,
//!     "hello wor
//! l
//! d
//!
//! @@ -2,10 +2,9 @@
//!  ello wor
//! -l
//!  d
//!
//! "
//! );
//! # Ok::<(), diffview::Error>(())
//! ```
//!
//! # Patch format
//!
//! Hunks are serialized in the percent-encoded format described in [`patch`]
//! and rendered line by line by [`render::render_hunk`]. Encoded line feeds
//! split a change into one output line per original line, `%09` and `%0D` are
//! shown as `^I` and `^M`.
//!
//! The edit scripts are computed by the Myers implementation of
//! [`imara_diff`]. [`ops::diff_with_sink`] hands the raw changes to any
//! [`Sink`] instead of turning them into operations:
//!
//! ```
//! use std::ops::Range;
//!
//! use diffview::ops::{diff_chars, diff_with_sink, Op};
//! use diffview::sources::lines;
//! use diffview::{Algorithm, InternedInput};
//!
//! let ops = diff_chars(Algorithm::Myers, "kitten", "sitting");
//! assert_eq!(ops[0], Op::delete("k"));
//!
//! let input = InternedInput::new(lines("a\nb\n"), lines("a\nc\n"));
//! let mut removed = 0;
//! diff_with_sink(Algorithm::Myers, &input, |before: Range<u32>, _: Range<u32>| {
//!     removed += before.len()
//! });
//! assert_eq!(removed, 1);
//! ```

use std::fmt::{self, Debug, Display};
use std::io;

use termcolor::{Buffer, BufferWriter, StandardStream};
pub use termcolor::{ColorChoice, WriteColor};

pub use imara_diff::intern::{InternedInput, TokenSource};
pub use imara_diff::Sink;

pub use crate::error::{Error, Result};
pub use crate::render::Style;
pub use crate::unified_diff::UnifiedDiff;
pub use crate::word_diff::WordDiff;

pub mod cleanup;
mod error;
pub mod escape;
pub mod ops;
pub mod patch;
pub mod render;
pub mod sink;
pub mod sources;
mod unified_diff;
mod word_diff;

#[cfg(test)]
mod tests;

/// The variant of the Myers search used to compute edit scripts.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Algorithm {
    /// Myers with gnu-diff style cost heuristics. Long searches are cut short,
    /// so scripts for large, very different inputs may be a little longer
    /// than necessary.
    #[default]
    Myers,
    /// Myers without the heuristics. Always minimal, but can be much slower
    /// on pathological inputs.
    MyersMinimal,
}

impl Algorithm {
    #[cfg(test)]
    const ALL: [Self; 2] = [Algorithm::Myers, Algorithm::MyersMinimal];
}

/// How a pair of texts is diffed and rendered.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Strategy {
    /// Character level diff with a transcript, see [`WordDiff`].
    Word,
    /// Line level diff rendered as hunks, see [`UnifiedDiff`].
    Unified,
}

impl Strategy {
    /// Selects [`Strategy::Unified`] if either text contains a line feed and
    /// [`Strategy::Word`] otherwise.
    pub fn select(before: &str, after: &str) -> Strategy {
        if before.contains('\n') || after.contains('\n') {
            Strategy::Unified
        } else {
            Strategy::Word
        }
    }
}

/// Configuration options for computing and rendering a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    algorithm: Algorithm,
    color: ColorChoice,
    /// Characters of context around each hunk.
    patch_margin: u32,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions {
            algorithm: Algorithm::default(),
            color: ColorChoice::Auto,
            patch_margin: 4,
        }
    }
}

impl DiffOptions {
    /// Sets the algorithm used to compute the edit script.
    pub fn algorithm(&mut self, algorithm: Algorithm) -> &mut Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets whether rendered output contains color escapes.
    ///
    /// With [`ColorChoice::Auto`] the usual `TERM`/`NO_COLOR` checks of
    /// `termcolor` apply, also when rendering into a `String`.
    pub fn color(&mut self, color: ColorChoice) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the minimal number of characters of unchanged text shown around
    /// each hunk. Edits separated by at most twice this many characters share
    /// a hunk.
    pub fn patch_margin(&mut self, margin: u32) -> &mut Self {
        self.patch_margin = margin;
        self
    }
}

/// A diff strategy bound to a pair of texts.
///
/// Every way of outputting the diff goes through [`Differ::render`], so all of
/// them produce the same text.
pub trait Differ: Debug {
    fn strategy(&self) -> Strategy;

    fn options(&self) -> &DiffOptions;

    /// Renders the diff to `out`.
    fn render(&self, out: &mut dyn WriteColor) -> Result<()>;

    /// Renders the diff to stdout, followed by an empty line.
    fn print(&self) -> Result<()> {
        let stdout = StandardStream::stdout(self.options().color);
        let result = print_to(self, &mut stdout.lock());
        result
    }

    /// Renders the diff into a `String`.
    fn render_to_string(&self) -> Result<String> {
        let buffer = render_buffered(self)?;
        String::from_utf8(buffer.into_inner())
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
    }

    /// Renders the diff into a buffer, writes the buffer to `sink` and returns
    /// the number of bytes written.
    fn write_to(&self, sink: &mut dyn io::Write) -> Result<u64> {
        let buffer = render_buffered(self)?;
        sink.write_all(buffer.as_slice())?;
        Ok(buffer.len() as u64)
    }
}

fn print_to<D: Differ + ?Sized>(differ: &D, out: &mut dyn WriteColor) -> Result<()> {
    differ.render(out)?;
    writeln!(out)?;
    Ok(())
}

fn render_buffered<D: Differ + ?Sized>(differ: &D) -> Result<Buffer> {
    let mut buffer = BufferWriter::stdout(differ.options().color).buffer();
    differ.render(&mut buffer)?;
    Ok(buffer)
}

/// Creates a [`Differ`] for the `Display` output of `before` and `after` with
/// the default options.
pub fn diff(before: impl Display, after: impl Display) -> Box<dyn Differ> {
    diff_with(DiffOptions::default(), before, after)
}

/// Creates a [`Differ`] for the `Display` output of `before` and `after`,
/// choosing the strategy with [`Strategy::select`].
pub fn diff_with(options: DiffOptions, before: impl Display, after: impl Display) -> Box<dyn Differ> {
    let before = before.to_string();
    let after = after.to_string();
    let strategy = Strategy::select(&before, &after);
    log::debug!(
        "selected {strategy:?} diff for inputs of {} and {} bytes",
        before.len(),
        after.len()
    );
    match strategy {
        Strategy::Word => Box::new(WordDiff::new(before, after, options)),
        Strategy::Unified => Box::new(UnifiedDiff::new(before, after, options)),
    }
}

/// Creates a [`Differ`] for the pretty printed (`{:#?}`) `Debug` output of
/// `before` and `after`.
///
/// Pretty printed structs and collections span multiple lines and are
/// therefore diffed line by line.
pub fn diff_debug(before: impl Debug, after: impl Debug) -> Box<dyn Differ> {
    diff(DebugText(before), DebugText(after))
}

struct DebugText<T>(T);

impl<T: Debug> Display for DebugText<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#?}", self.0)
    }
}
