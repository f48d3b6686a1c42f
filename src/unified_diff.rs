use termcolor::WriteColor;

use crate::ops::{diff_lines, Op};
use crate::render::render_patch;
use crate::{cleanup, patch, DiffOptions, Differ, Result, Strategy};

/// Line level diff of multi-line texts, rendered as patch hunks only.
///
/// Lines (including their terminator) are interned into single tokens, so the
/// edit script is computed over whole lines. The semantic cleanup that runs
/// afterwards works on the expanded text and may still split a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedDiff {
    before: String,
    after: String,
    options: DiffOptions,
}

impl UnifiedDiff {
    pub fn new(before: impl Into<String>, after: impl Into<String>, options: DiffOptions) -> Self {
        UnifiedDiff {
            before: before.into(),
            after: after.into(),
            options,
        }
    }

    /// The cleaned up operations the patch is built from.
    pub fn ops(&self) -> Vec<Op> {
        let mut ops = diff_lines(self.options.algorithm, &self.before, &self.after);
        cleanup::semantic(&mut ops);
        log::trace!("unified diff cleaned up to {} operations", ops.len());
        ops
    }
}

impl Differ for UnifiedDiff {
    fn strategy(&self) -> Strategy {
        Strategy::Unified
    }

    fn options(&self) -> &DiffOptions {
        &self.options
    }

    fn render(&self, out: &mut dyn WriteColor) -> Result<()> {
        let hunks = patch::make(&self.ops(), self.options.patch_margin as usize);
        render_patch(&hunks, out)
    }
}
