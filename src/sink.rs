//! Turning the change ranges reported by the diff engine back into text.

use std::ops::Range;

use imara_diff::intern::{InternedInput, Token};
use imara_diff::Sink;

use crate::ops::{Op, OpKind};

/// Token data that can be turned back into text.
pub trait TokenText {
    fn push_to(&self, buf: &mut String);
}

impl TokenText for char {
    fn push_to(&self, buf: &mut String) {
        buf.push(*self)
    }
}

impl TokenText for &str {
    fn push_to(&self, buf: &mut String) {
        buf.push_str(self)
    }
}

/// A [`Sink`] that expands the change ranges back into text and produces the
/// full operation list: the unchanged gap before a change becomes an
/// [`OpKind::Equal`], the change itself a [`OpKind::Delete`] followed by an
/// [`OpKind::Insert`].
pub struct OpBuilder<'a, T> {
    input: &'a InternedInput<T>,
    pos: u32,
    ops: Vec<Op>,
}

impl<'a, T: TokenText> OpBuilder<'a, T> {
    pub fn new(input: &'a InternedInput<T>) -> Self {
        OpBuilder {
            input,
            pos: 0,
            ops: Vec::new(),
        }
    }

    fn push(&mut self, kind: OpKind, tokens: &[Token]) {
        if tokens.is_empty() {
            return;
        }
        let mut text = String::new();
        for &token in tokens {
            self.input.interner[token].push_to(&mut text);
        }
        self.ops.push(Op { kind, text });
    }
}

impl<T: TokenText> Sink for OpBuilder<'_, T> {
    type Out = Vec<Op>;

    fn process_change(&mut self, before: Range<u32>, after: Range<u32>) {
        let input = self.input;
        self.push(
            OpKind::Equal,
            &input.before[self.pos as usize..before.start as usize],
        );
        self.push(
            OpKind::Delete,
            &input.before[before.start as usize..before.end as usize],
        );
        self.push(
            OpKind::Insert,
            &input.after[after.start as usize..after.end as usize],
        );
        self.pos = before.end;
    }

    fn finish(mut self) -> Self::Out {
        let input = self.input;
        self.push(OpKind::Equal, &input.before[self.pos as usize..]);
        self.ops
    }
}
