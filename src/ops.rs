//! Diff operations and the entry points into the diff engine.

use std::hash::Hash;

use imara_diff::intern::InternedInput;
use imara_diff::Sink;

use crate::sink::{OpBuilder, TokenText};
use crate::sources::{chars, lines};
use crate::{cleanup, Algorithm};

/// The kind of a diff [`Op`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum OpKind {
    Equal,
    Insert,
    Delete,
}

/// A single diff operation.
///
/// The operations returned by [`diff_chars`] and [`diff_lines`] reconstruct
/// both inputs: the `Equal` and `Delete` texts concatenate to the first input,
/// the `Equal` and `Insert` texts to the second.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Op {
    pub kind: OpKind,
    pub text: String,
}

impl Op {
    pub fn equal(text: impl Into<String>) -> Op {
        Op {
            kind: OpKind::Equal,
            text: text.into(),
        }
    }

    pub fn insert(text: impl Into<String>) -> Op {
        Op {
            kind: OpKind::Insert,
            text: text.into(),
        }
    }

    pub fn delete(text: impl Into<String>) -> Op {
        Op {
            kind: OpKind::Delete,
            text: text.into(),
        }
    }
}

/// Reconstructs the first input from `ops`.
pub fn before_text(ops: &[Op]) -> String {
    ops.iter()
        .filter(|op| op.kind != OpKind::Insert)
        .map(|op| op.text.as_str())
        .collect()
}

/// Reconstructs the second input from `ops`.
pub fn after_text(ops: &[Op]) -> String {
    ops.iter()
        .filter(|op| op.kind != OpKind::Delete)
        .map(|op| op.text.as_str())
        .collect()
}

/// Diffs `before` and `after` character by character.
///
/// The result is normalized with [`cleanup::merge`] but no semantic cleanup
/// has been applied yet.
pub fn diff_chars(algorithm: Algorithm, before: &str, after: &str) -> Vec<Op> {
    let input = InternedInput::new(chars(before), chars(after));
    let mut ops = run(algorithm, &input);
    cleanup::merge(&mut ops);
    log::trace!("character diff produced {} operations", ops.len());
    ops
}

/// Diffs `before` and `after` line by line.
///
/// Every line (including its terminator) is interned into a single token so the
/// edit script is computed over lines instead of characters. The texts of the
/// resulting operations always consist of whole lines.
pub fn diff_lines(algorithm: Algorithm, before: &str, after: &str) -> Vec<Op> {
    let input = InternedInput::new(lines(before), lines(after));
    let ops = run(algorithm, &input);
    log::trace!(
        "line diff over {} distinct lines produced {} operations",
        input.interner.num_tokens(),
        ops.len()
    );
    ops
}

/// Computes the edit script between `input.before` and `input.after` and
/// reports every change to `sink`.
///
/// This is what [`diff_chars`] and [`diff_lines`] are built on. A custom
/// [`Sink`] can be used to consume the changes without building operations.
///
/// # Panics
///
/// If either side has more than `i32::MAX` tokens.
pub fn diff_with_sink<S: Sink, T: Eq + Hash>(
    algorithm: Algorithm,
    input: &InternedInput<T>,
    sink: S,
) -> S::Out {
    let algorithm = match algorithm {
        Algorithm::Myers => imara_diff::Algorithm::Myers,
        Algorithm::MyersMinimal => imara_diff::Algorithm::MyersMinimal,
    };
    imara_diff::diff(algorithm, input, sink)
}

fn run<T: TokenText + Eq + Hash>(algorithm: Algorithm, input: &InternedInput<T>) -> Vec<Op> {
    diff_with_sink(algorithm, input, OpBuilder::new(input))
}
