use termcolor::WriteColor;

use crate::ops::{diff_chars, Op, OpKind};
use crate::render::{render_patch, write_styled, Style};
use crate::{cleanup, patch, DiffOptions, Differ, Result, Strategy};

/// Character level diff of two single-line texts.
///
/// Renders a transcript with one operation per line (deletions red,
/// insertions green, unchanged text plain), an empty line, and then the patch
/// hunks for the same edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordDiff {
    before: String,
    after: String,
    options: DiffOptions,
}

impl WordDiff {
    pub fn new(before: impl Into<String>, after: impl Into<String>, options: DiffOptions) -> Self {
        WordDiff {
            before: before.into(),
            after: after.into(),
            options,
        }
    }

    /// The cleaned up operations the transcript is rendered from.
    pub fn ops(&self) -> Vec<Op> {
        let mut ops = diff_chars(self.options.algorithm, &self.before, &self.after);
        cleanup::semantic_lossless(&mut ops);
        cleanup::semantic(&mut ops);
        log::trace!("word diff cleaned up to {} operations", ops.len());
        ops
    }
}

impl Differ for WordDiff {
    fn strategy(&self) -> Strategy {
        Strategy::Word
    }

    fn options(&self) -> &DiffOptions {
        &self.options
    }

    fn render(&self, out: &mut dyn WriteColor) -> Result<()> {
        let ops = self.ops();
        for op in &ops {
            match op.kind {
                OpKind::Delete => write_styled(out, Style::Deletion, format_args!("{}", op.text))?,
                OpKind::Insert => write_styled(out, Style::Insertion, format_args!("{}", op.text))?,
                OpKind::Equal => out.write_all(op.text.as_bytes())?,
            }
            writeln!(out)?;
        }
        writeln!(out)?;

        let hunks = patch::make(&ops, self.options.patch_margin as usize);
        render_patch(&hunks, out)
    }
}
