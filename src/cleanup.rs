//! Post-processing passes that reshape a raw edit script into something a human
//! can read.
//!
//! All lengths compared by the heuristics are measured in characters. Slicing
//! always happens on char boundaries, the helpers below return byte lengths.

use std::iter;
use std::mem::take;

use crate::ops::{Op, OpKind};

/// Normalizes `ops`: adjacent operations of the same kind are joined, the
/// common prefix and suffix of a deletion/insertion pair are moved into the
/// surrounding equalities and empty operations are dropped.
///
/// Afterwards single edits are shifted sideways whenever that eliminates an
/// equality (`A<ins>BA</ins>C` becomes `<ins>AB</ins>AC`), repeating until
/// nothing moves anymore.
pub fn merge(ops: &mut Vec<Op>) {
    loop {
        coalesce(ops);
        if !shift_single_edits(ops) {
            break;
        }
    }
}

fn coalesce(ops: &mut Vec<Op>) {
    let mut merged: Vec<Op> = Vec::with_capacity(ops.len());
    let mut deleted = String::new();
    let mut inserted = String::new();
    // the trailing empty equality flushes the last run of edits
    for op in ops.drain(..).chain(iter::once(Op::equal(""))) {
        match op.kind {
            OpKind::Delete => deleted.push_str(&op.text),
            OpKind::Insert => inserted.push_str(&op.text),
            OpKind::Equal => {
                let mut equal = op.text;
                if !deleted.is_empty() && !inserted.is_empty() {
                    let prefix = common_prefix(&inserted, &deleted);
                    if prefix != 0 {
                        push_equal(&mut merged, &inserted[..prefix]);
                        inserted.drain(..prefix);
                        deleted.drain(..prefix);
                    }
                    let suffix = common_suffix(&inserted, &deleted);
                    if suffix != 0 {
                        equal.insert_str(0, &inserted[inserted.len() - suffix..]);
                        inserted.truncate(inserted.len() - suffix);
                        deleted.truncate(deleted.len() - suffix);
                    }
                }
                if !deleted.is_empty() {
                    merged.push(Op::delete(take(&mut deleted)));
                }
                if !inserted.is_empty() {
                    merged.push(Op::insert(take(&mut inserted)));
                }
                push_equal(&mut merged, &equal);
            }
        }
    }
    *ops = merged;
}

fn push_equal(ops: &mut Vec<Op>, text: &str) {
    if text.is_empty() {
        return;
    }
    match ops.last_mut() {
        Some(last) if last.kind == OpKind::Equal => last.text.push_str(text),
        _ => ops.push(Op::equal(text)),
    }
}

fn shift_single_edits(ops: &mut Vec<Op>) -> bool {
    let mut changed = false;
    let mut i = 1;
    while i + 1 < ops.len() {
        if ops[i - 1].kind == OpKind::Equal && ops[i + 1].kind == OpKind::Equal {
            if ops[i].text.ends_with(ops[i - 1].text.as_str()) {
                // A<ins>BA</ins>C -> <ins>AB</ins>AC
                let prev = ops.remove(i - 1).text;
                let edit = &mut ops[i - 1].text;
                edit.truncate(edit.len() - prev.len());
                edit.insert_str(0, &prev);
                ops[i].text.insert_str(0, &prev);
                changed = true;
            } else if ops[i].text.starts_with(ops[i + 1].text.as_str()) {
                // A<ins>BC</ins>B -> AB<ins>CB</ins>
                let next = ops.remove(i + 1).text;
                ops[i - 1].text.push_str(&next);
                let edit = &mut ops[i].text;
                edit.drain(..next.len());
                edit.push_str(&next);
                changed = true;
            }
        }
        i += 1;
    }
    changed
}

/// Slides every single edit that is surrounded by equalities to the position
/// where its edges line up best with word, sentence and line boundaries.
///
/// `The c<ins>at c</ins>ame.` becomes `The <ins>cat </ins>came.`
pub fn semantic_lossless(ops: &mut Vec<Op>) {
    let mut i = 1;
    while i + 1 < ops.len() {
        if ops[i - 1].kind != OpKind::Equal || ops[i + 1].kind != OpKind::Equal {
            i += 1;
            continue;
        }
        let mut equality1 = ops[i - 1].text.clone();
        let mut edit = ops[i].text.clone();
        let mut equality2 = ops[i + 1].text.clone();

        // shift the edit as far left as possible
        let offset = common_suffix(&equality1, &edit);
        if offset != 0 {
            let common = edit[edit.len() - offset..].to_owned();
            equality1.truncate(equality1.len() - offset);
            edit.truncate(edit.len() - offset);
            edit.insert_str(0, &common);
            equality2.insert_str(0, &common);
        }

        // then step right one char at a time, looking for the best fit
        let mut best_score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
        let mut best = (equality1.clone(), edit.clone(), equality2.clone());
        while let Some(c) = edit.chars().next().filter(|&c| equality2.starts_with(c)) {
            equality1.push(c);
            edit.remove(0);
            edit.push(c);
            equality2.remove(0);
            let score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
            // >= prefers trailing over leading whitespace on edits
            if score >= best_score {
                best_score = score;
                best = (equality1.clone(), edit.clone(), equality2.clone());
            }
        }

        let (best_equality1, best_edit, best_equality2) = best;
        if ops[i - 1].text != best_equality1 {
            if best_equality1.is_empty() {
                ops.remove(i - 1);
                i -= 1;
            } else {
                ops[i - 1].text = best_equality1;
            }
            ops[i].text = best_edit;
            if best_equality2.is_empty() {
                ops.remove(i + 1);
                i = i.saturating_sub(1);
            } else {
                ops[i + 1].text = best_equality2;
            }
        }
        i += 1;
    }
}

/// Scores how well the boundary between `one` and `two` lines up with the
/// structure of the text, from 6 (edge of the input) down to 0 (inside a word).
fn boundary_score(one: &str, two: &str) -> u32 {
    let (Some(char1), Some(char2)) = (one.chars().next_back(), two.chars().next()) else {
        return 6;
    };

    let non_alphanumeric1 = !char1.is_ascii_alphanumeric();
    let non_alphanumeric2 = !char2.is_ascii_alphanumeric();
    let whitespace1 = non_alphanumeric1 && char1.is_whitespace();
    let whitespace2 = non_alphanumeric2 && char2.is_whitespace();
    let line_break1 = whitespace1 && matches!(char1, '\r' | '\n');
    let line_break2 = whitespace2 && matches!(char2, '\r' | '\n');
    let blank_line1 = line_break1 && (one.ends_with("\n\n") || one.ends_with("\n\r\n"));
    let blank_line2 = line_break2
        && ["\n\n", "\n\r\n", "\r\n\n", "\r\n\r\n"]
            .iter()
            .any(|start| two.starts_with(start));

    if blank_line1 || blank_line2 {
        5
    } else if line_break1 || line_break2 {
        4
    } else if non_alphanumeric1 && !whitespace1 && whitespace2 {
        // end of a sentence
        3
    } else if whitespace1 || whitespace2 {
        2
    } else if non_alphanumeric1 || non_alphanumeric2 {
        1
    } else {
        0
    }
}

/// Turns a diff of many small coincidental matches into fewer, larger edits.
///
/// Equalities that are no longer than the edits on both of their sides are
/// folded into those edits, then the result is re-merged and aligned with
/// [`semantic_lossless`]. Finally overlaps between a deletion and the
/// following insertion are pulled out into an equality when the overlap makes
/// up at least half of either edit.
pub fn semantic(ops: &mut Vec<Op>) {
    let mut changes = false;
    // indices of the equalities seen so far
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<usize> = None;
    // edit lengths before (1) and after (2) the last equality
    let (mut insertions1, mut deletions1) = (0, 0);
    let (mut insertions2, mut deletions2) = (0, 0);

    let mut i = 0;
    while i < ops.len() {
        let len = char_len(&ops[i].text);
        match ops[i].kind {
            OpKind::Equal => {
                equalities.push(i);
                insertions1 = insertions2;
                deletions1 = deletions2;
                insertions2 = 0;
                deletions2 = 0;
                last_equality = Some(i);
            }
            kind => {
                if kind == OpKind::Insert {
                    insertions2 += len;
                } else {
                    deletions2 += len;
                }
                let Some(pos) = last_equality else {
                    i += 1;
                    continue;
                };
                let equality_len = char_len(&ops[pos].text);
                if equality_len <= insertions1.max(deletions1)
                    && equality_len <= insertions2.max(deletions2)
                {
                    let text = ops[pos].text.clone();
                    ops.insert(pos, Op::delete(text));
                    ops[pos + 1].kind = OpKind::Insert;
                    // the eliminated equality and the one before it (which
                    // has to be reevaluated)
                    equalities.pop();
                    equalities.pop();
                    insertions1 = 0;
                    deletions1 = 0;
                    insertions2 = 0;
                    deletions2 = 0;
                    last_equality = None;
                    changes = true;
                    match equalities.last() {
                        Some(&prev) => i = prev,
                        None => {
                            i = 0;
                            continue;
                        }
                    }
                }
            }
        }
        i += 1;
    }

    if changes {
        merge(ops);
    }
    semantic_lossless(ops);
    extract_overlaps(ops);
}

/// `<del>abcxxx</del><ins>xxxdef</ins>` becomes `<del>abc</del>xxx<ins>def</ins>`
/// and `<del>xxxabc</del><ins>defxxx</ins>` becomes `<ins>def</ins>xxx<del>abc</del>`.
fn extract_overlaps(ops: &mut Vec<Op>) {
    let mut i = 1;
    while i < ops.len() {
        if ops[i - 1].kind == OpKind::Delete && ops[i].kind == OpKind::Insert {
            let deletion = take(&mut ops[i - 1].text);
            let insertion = take(&mut ops[i].text);
            let overlap1 = common_overlap(&deletion, &insertion);
            let overlap2 = common_overlap(&insertion, &deletion);
            let chars1 = char_len(&insertion[..overlap1]);
            let chars2 = char_len(&deletion[..overlap2]);
            let deletion_len = char_len(&deletion);
            let insertion_len = char_len(&insertion);
            if chars1 >= chars2 {
                if 2 * chars1 >= deletion_len || 2 * chars1 >= insertion_len {
                    ops[i - 1].text = deletion[..deletion.len() - overlap1].to_owned();
                    ops[i].text = insertion[overlap1..].to_owned();
                    ops.insert(i, Op::equal(&insertion[..overlap1]));
                    i += 1;
                } else {
                    ops[i - 1].text = deletion;
                    ops[i].text = insertion;
                }
            } else if 2 * chars2 >= deletion_len || 2 * chars2 >= insertion_len {
                ops[i - 1] = Op::insert(&insertion[..insertion.len() - overlap2]);
                ops[i] = Op::delete(&deletion[overlap2..]);
                ops.insert(i, Op::equal(&deletion[..overlap2]));
                i += 1;
            } else {
                ops[i - 1].text = deletion;
                ops[i].text = insertion;
            }
            i += 1;
        }
        i += 1;
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte length of the common prefix of `a` and `b`.
fn common_prefix(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(c1, c2)| c1 == c2)
        .map(|(c, _)| c.len_utf8())
        .sum()
}

/// Byte length of the common suffix of `a` and `b`.
fn common_suffix(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(c1, c2)| c1 == c2)
        .map(|(c, _)| c.len_utf8())
        .sum()
}

/// Byte length of the longest suffix of `a` that is also a prefix of `b`.
fn common_overlap(a: &str, b: &str) -> usize {
    a.char_indices()
        .map(|(i, _)| i)
        .filter(|&i| a.len() - i <= b.len())
        .find(|&i| b.starts_with(&a[i..]))
        .map_or(0, |i| a.len() - i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn del(text: &str) -> Op {
        Op::delete(text)
    }

    fn ins(text: &str) -> Op {
        Op::insert(text)
    }

    fn eq(text: &str) -> Op {
        Op::equal(text)
    }

    #[test]
    fn helpers() {
        assert_eq!(common_prefix("1234abcdef", "1234xyz"), 4);
        assert_eq!(common_prefix("abc", "xyz"), 0);
        assert_eq!(common_prefix("héllo", "hélp"), 4);
        assert_eq!(common_suffix("abcdef1234", "xyz1234"), 4);
        assert_eq!(common_suffix("1234", "xyz1234"), 4);
        assert_eq!(common_overlap("", "abcd"), 0);
        assert_eq!(common_overlap("abc", "abcd"), 3);
        assert_eq!(common_overlap("123456", "abcd"), 0);
        assert_eq!(common_overlap("123456xxx", "xxxabcd"), 3);
        assert_eq!(common_overlap("fi", "\u{fb01}i"), 0);
    }

    #[test]
    fn merge_cases() {
        let cases: Vec<(Vec<Op>, Vec<Op>)> = vec![
            (vec![], vec![]),
            (
                vec![eq("a"), del("b"), ins("c")],
                vec![eq("a"), del("b"), ins("c")],
            ),
            (vec![eq("a"), eq("b"), eq("c")], vec![eq("abc")]),
            (vec![del("a"), del("b"), del("c")], vec![del("abc")]),
            (
                vec![del("a"), ins("b"), del("c"), ins("d"), eq("e"), eq("f")],
                vec![del("ac"), ins("bd"), eq("ef")],
            ),
            (
                vec![del("a"), ins("abc"), del("dc")],
                vec![eq("a"), del("d"), ins("b"), eq("c")],
            ),
            (
                vec![eq("x"), del("a"), ins("abc"), del("dc"), eq("y")],
                vec![eq("xa"), del("d"), ins("b"), eq("cy")],
            ),
            (vec![eq("a"), ins("ba"), eq("c")], vec![ins("ab"), eq("ac")]),
            (vec![eq("c"), ins("ab"), eq("a")], vec![eq("ca"), ins("ba")]),
            (
                vec![eq("a"), del("b"), eq("c"), del("ac"), eq("x")],
                vec![del("abc"), eq("acx")],
            ),
            (
                vec![eq("x"), del("ca"), eq("c"), del("b"), eq("a")],
                vec![eq("xca"), del("cba")],
            ),
            (vec![eq(""), ins("a"), eq("b")], vec![ins("a"), eq("b")]),
        ];
        for (mut ops, expected) in cases {
            merge(&mut ops);
            assert_eq!(ops, expected);
        }
    }

    #[test]
    fn lossless_cases() {
        let cases: Vec<(Vec<Op>, Vec<Op>)> = vec![
            (
                vec![eq("AAA\r\n\r\nBBB"), ins("\r\nDDD\r\n\r\nBBB"), eq("\r\nEEE")],
                vec![eq("AAA\r\n\r\n"), ins("BBB\r\nDDD\r\n\r\n"), eq("BBB\r\nEEE")],
            ),
            (
                vec![eq("AAA\r\nBBB"), ins(" DDD\r\nBBB"), eq(" EEE")],
                vec![eq("AAA\r\n"), ins("BBB DDD\r\n"), eq("BBB EEE")],
            ),
            (
                vec![eq("The c"), ins("ow and the c"), eq("at.")],
                vec![eq("The "), ins("cow and the "), eq("cat.")],
            ),
            (
                vec![eq("The-c"), ins("ow-and-the-c"), eq("at.")],
                vec![eq("The-"), ins("cow-and-the-"), eq("cat.")],
            ),
            (vec![eq("a"), del("a"), eq("ax")], vec![del("a"), eq("aax")]),
            (vec![eq("xa"), del("a"), eq("a")], vec![eq("xaa"), del("a")]),
            (
                vec![eq("The xxx. The "), ins("zzz. The "), eq("yyy.")],
                vec![eq("The xxx."), ins(" The zzz."), eq(" The yyy.")],
            ),
        ];
        for (mut ops, expected) in cases {
            semantic_lossless(&mut ops);
            assert_eq!(ops, expected);
        }
    }

    #[test]
    fn semantic_cases() {
        let cases: Vec<(Vec<Op>, Vec<Op>)> = vec![
            (vec![], vec![]),
            (
                vec![del("ab"), ins("cd"), eq("12"), del("e")],
                vec![del("ab"), ins("cd"), eq("12"), del("e")],
            ),
            (
                vec![del("abc"), ins("ABC"), eq("1234"), del("wxyz")],
                vec![del("abc"), ins("ABC"), eq("1234"), del("wxyz")],
            ),
            (vec![del("a"), eq("b"), del("c")], vec![del("abc"), ins("b")]),
            (
                vec![del("ab"), eq("cd"), del("e"), eq("f"), ins("g")],
                vec![del("abcdef"), ins("cdfg")],
            ),
            (
                vec![
                    ins("1"),
                    eq("A"),
                    del("B"),
                    ins("2"),
                    eq("_"),
                    ins("1"),
                    eq("A"),
                    del("B"),
                    ins("2"),
                ],
                vec![del("AB_AB"), ins("1A2_1A2")],
            ),
            (
                vec![eq("The c"), del("ow and the c"), eq("at.")],
                vec![eq("The "), del("cow and the "), eq("cat.")],
            ),
            (
                vec![del("abcxx"), ins("xxdef")],
                vec![del("abcxx"), ins("xxdef")],
            ),
            (
                vec![del("abcxxx"), ins("xxxdef")],
                vec![del("abc"), eq("xxx"), ins("def")],
            ),
            (
                vec![del("xxxabc"), ins("defxxx")],
                vec![ins("def"), eq("xxx"), del("abc")],
            ),
            (
                vec![del("abcd1212"), ins("1212efghi"), eq("----"), del("A3"), ins("3BC")],
                vec![
                    del("abcd"),
                    eq("1212"),
                    ins("efghi"),
                    eq("----"),
                    del("A"),
                    eq("3"),
                    ins("BC"),
                ],
            ),
        ];
        for (mut ops, expected) in cases {
            semantic(&mut ops);
            assert_eq!(ops, expected);
        }
    }
}
