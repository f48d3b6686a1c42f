//! Grouping of diff operations into context-padded hunks and their textual
//! serialization.
//!
//! A serialized hunk looks like this:
//!
//! ```text
//! @@ -2,10 +2,9 @@
//!  ello wor
//! -l
//!  d
//! ```
//!
//! The header carries the one-based start and the length (in characters) of
//! the hunk in both texts. Every following line holds one operation: a single
//! character prefix (`' '`, `'-'` or `'+'`) and the operation text with `%`
//! and control characters percent-encoded. Line breaks inside an operation are
//! encoded as `%0A`, so every operation occupies exactly one line.

use std::fmt::{self, Display, Write};
use std::mem::take;

use crate::ops::{before_text, Op, OpKind};

/// The longest pattern (in characters) that context is grown to while it is
/// still ambiguous.
pub const MATCH_MAX_BITS: usize = 32;

/// A group of nearby edits together with the unchanged text surrounding them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hunk {
    pub ops: Vec<Op>,
    /// Zero-based start of the hunk in the first text, in characters.
    pub start1: usize,
    /// Zero-based start of the hunk in the second text, in characters.
    pub start2: usize,
    pub length1: usize,
    pub length2: usize,
}

/// Groups `ops` into hunks.
///
/// Edits separated by an equality of at most `2 * margin` characters end up
/// in the same hunk. Each hunk is padded with `margin` characters of context on
/// both sides, and with more if that is needed to make the hunk's text occur
/// only once in the text it applies to.
///
/// Returns no hunks if `ops` contains no edits.
pub fn make(ops: &[Op], margin: usize) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    if ops.iter().all(|op| op.kind == OpKind::Equal) {
        return hunks;
    }

    let mut hunk = Hunk::default();
    let mut char_count1 = 0;
    let mut char_count2 = 0;
    // the text of the first side with all previous hunks applied, which is
    // what every hunk's context is computed against
    let mut prepatch: Vec<char> = before_text(ops).chars().collect();
    let mut postpatch = prepatch.clone();

    for (i, op) in ops.iter().enumerate() {
        let len = op.text.chars().count();
        if hunk.ops.is_empty() && op.kind != OpKind::Equal {
            hunk.start1 = char_count1;
            hunk.start2 = char_count2;
        }

        match op.kind {
            OpKind::Insert => {
                hunk.ops.push(op.clone());
                hunk.length2 += len;
                postpatch.splice(char_count2..char_count2, op.text.chars());
            }
            OpKind::Delete => {
                hunk.ops.push(op.clone());
                hunk.length1 += len;
                postpatch.drain(char_count2..char_count2 + len);
            }
            OpKind::Equal => {
                if len <= 2 * margin && !hunk.ops.is_empty() && i + 1 != ops.len() {
                    // small equality inside a hunk
                    hunk.ops.push(op.clone());
                    hunk.length1 += len;
                    hunk.length2 += len;
                } else if len >= 2 * margin && !hunk.ops.is_empty() {
                    // large equality, time for a new hunk
                    add_context(&mut hunk, &prepatch, margin);
                    hunks.push(take(&mut hunk));
                    prepatch.clone_from(&postpatch);
                    char_count1 = char_count2;
                }
            }
        }

        if op.kind != OpKind::Insert {
            char_count1 += len;
        }
        if op.kind != OpKind::Delete {
            char_count2 += len;
        }
    }

    if !hunk.ops.is_empty() {
        add_context(&mut hunk, &prepatch, margin);
        hunks.push(hunk);
    }
    log::debug!("grouped {} operations into {} hunks", ops.len(), hunks.len());
    hunks
}

/// Pads `hunk` with context from `text` until its pattern is unique (or as
/// long as the matcher could handle), then adds another `margin` characters
/// on both sides.
fn add_context(hunk: &mut Hunk, text: &[char], margin: usize) {
    if text.is_empty() {
        return;
    }
    let start2 = hunk.start2.min(text.len());
    let max_pattern = MATCH_MAX_BITS.saturating_sub(2 * margin);

    let mut pattern = &text[start2..(start2 + hunk.length1).min(text.len())];
    let mut padding = 0;
    while margin > 0 && occurs_more_than_once(text, pattern) && pattern.len() < max_pattern {
        padding += margin;
        let start = start2.saturating_sub(padding);
        let end = (start2 + hunk.length1 + padding).min(text.len());
        pattern = &text[start..end];
    }
    padding += margin;

    let prefix_start = start2.saturating_sub(padding);
    let prefix = &text[prefix_start..start2];
    let suffix_start = (start2 + hunk.length1).min(text.len());
    let suffix_end = (suffix_start + padding).min(text.len());
    let suffix = &text[suffix_start..suffix_end];

    if !prefix.is_empty() {
        hunk.ops.insert(0, Op::equal(prefix.iter().collect::<String>()));
    }
    if !suffix.is_empty() {
        hunk.ops.push(Op::equal(suffix.iter().collect::<String>()));
    }

    hunk.start1 = hunk.start1.saturating_sub(prefix.len());
    hunk.start2 = hunk.start2.saturating_sub(prefix.len());
    hunk.length1 += prefix.len() + suffix.len();
    hunk.length2 += prefix.len() + suffix.len();
}

/// An empty pattern matches everywhere.
fn occurs_more_than_once(text: &[char], pattern: &[char]) -> bool {
    if pattern.is_empty() {
        return true;
    }
    let mut matches = text
        .windows(pattern.len())
        .filter(|window| *window == pattern);
    matches.next().is_some() && matches.next().is_some()
}

impl Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "@@ -{} +{} @@",
            Coords(self.start1, self.length1),
            Coords(self.start2, self.length2)
        )?;
        for op in &self.ops {
            let prefix = match op.kind {
                OpKind::Insert => '+',
                OpKind::Delete => '-',
                OpKind::Equal => ' ',
            };
            writeln!(f, "{prefix}{}", Encoded(&op.text))?;
        }
        Ok(())
    }
}

/// Serializes `hunks` back to back.
pub fn to_text(hunks: &[Hunk]) -> String {
    hunks.iter().map(Hunk::to_string).collect()
}

struct Coords(usize, usize);

impl Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Coords(start, len) = *self;
        match len {
            0 => write!(f, "{start},0"),
            1 => write!(f, "{}", start + 1),
            _ => write!(f, "{},{len}", start + 1),
        }
    }
}

/// Percent-encodes `%` and every ASCII control character (line breaks
/// included). Everything else is written as is.
struct Encoded<'a>(&'a str);

impl Display for Encoded<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            if c == '%' || c.is_ascii_control() {
                write!(f, "%{:02X}", c as u32)?;
            } else {
                f.write_char(c)?;
            }
        }
        Ok(())
    }
}
