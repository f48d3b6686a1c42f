use std::io;

use expect_test::expect;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::{
    diff, diff_debug, diff_with, print_to, ColorChoice, DiffOptions, Differ, Error, Strategy,
};

/// A [`WriteColor`] that wraps styled text in `<ins>`/`<del>` tags so styles
/// show up in snapshots.
#[derive(Default)]
pub(crate) struct Markup {
    pub(crate) text: String,
    open: Option<&'static str>,
}

impl io::Write for Markup {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text =
            std::str::from_utf8(buf).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        self.text.push_str(text);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WriteColor for Markup {
    fn supports_color(&self) -> bool {
        true
    }

    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        let tag = match spec.fg() {
            Some(Color::Green) => "ins",
            Some(Color::Red) => "del",
            _ => return Ok(()),
        };
        self.text.push_str(&format!("<{tag}>"));
        self.open = Some(tag);
        Ok(())
    }

    fn reset(&mut self) -> io::Result<()> {
        if let Some(tag) = self.open.take() {
            self.text.push_str(&format!("</{tag}>"));
        }
        Ok(())
    }
}

fn markup(differ: &dyn Differ) -> String {
    let mut out = Markup::default();
    differ.render(&mut out).unwrap();
    out.text
}

fn plain() -> DiffOptions {
    let mut options = DiffOptions::default();
    options.color(ColorChoice::Never);
    options
}

#[test]
fn strategy_selection() {
    let cases = [
        ("abc", "abd", Strategy::Word),
        ("", "", Strategy::Word),
        ("a\tb", "a b", Strategy::Word),
        ("a\rb", "a b", Strategy::Word),
        ("a\nb", "a", Strategy::Unified),
        ("a", "a\n", Strategy::Unified),
        ("\n", "\n", Strategy::Unified),
    ];
    for (before, after, strategy) in cases {
        assert_eq!(Strategy::select(before, after), strategy);
        assert_eq!(diff(before, after).strategy(), strategy, "{before:?} {after:?}");
    }
    assert_eq!(diff(1, 2).strategy(), Strategy::Word);
}

#[test]
fn word_substitution() {
    let differ = diff("hello world", "hello word");
    expect![[r#"
        hello wor
        <del>l</del>
        d

        @@ -2,10 +2,9 @@
         ello wor
        <del>-l
        </del> d

    "#]]
    .assert_eq(&markup(&*differ));
}

#[test]
fn unified_substitution() {
    let differ = diff("a\nb\nc", "a\nx\nc");
    expect![[r#"
        @@ -1,5 +1,5 @@
         a
        <del>-b
        </del><ins>+x
        </ins> c

    "#]]
    .assert_eq(&markup(&*differ));
}

#[test]
fn multi_line_deletion() {
    let differ = diff("a\nb\nc\nd", "a\nd");
    expect![[r#"
        @@ -1,7 +1,3 @@
         a
        <del>-b
        </del><del>-c
        </del> d

    "#]]
    .assert_eq(&markup(&*differ));
}

#[test]
fn every_hunk_ends_with_blank_line() {
    let differ = diff("a1cdefghijklmnopqrstuvwxyz2", "aXcdefghijklmnopqrstuvwxyzY");
    expect![[r#"
        a
        <del>1</del>
        <ins>X</ins>
        cdefghijklmnopqrstuvwxyz
        <del>2</del>
        <ins>Y</ins>

        @@ -1,6 +1,6 @@
         a
        <del>-1
        </del><ins>+X
        </ins> cdef

        @@ -23,5 +23,5 @@
         wxyz
        <del>-2
        </del><ins>+Y
        </ins>
    "#]]
    .assert_eq(&markup(&*differ));
}

#[test]
fn identical_inputs() {
    assert_eq!(markup(&*diff("same text", "same text")), "same text\n\n");
    assert_eq!(markup(&*diff("a\nb", "a\nb")), "");
}

#[test]
fn empty_inputs() {
    let differ = diff("", "");
    assert_eq!(differ.strategy(), Strategy::Word);
    assert_eq!(markup(&*differ), "\n");
}

#[test]
fn escapes_are_decoded() {
    let differ = diff_with(plain(), "100% (done)", "100% (gone)");
    assert_eq!(
        differ.render_to_string().unwrap(),
        "100% (\nd\ng\none)\n\n@@ -3,9 +3,9 @@\n 0% (\n-d\n+g\n one)\n\n"
    );

    let differ = diff_with(plain(), "a\tb", "a\tc");
    assert_eq!(
        differ.render_to_string().unwrap(),
        "a\t\nb\nc\n\n@@ -1,3 +1,3 @@\n a^I\n-b\n+c\n\n"
    );
}

#[test]
fn non_ascii_text() {
    let differ = diff_with(plain(), "grüße", "grüsse");
    assert_eq!(
        differ.render_to_string().unwrap(),
        "grü\nß\nss\ne\n\n@@ -1,5 +1,6 @@\n grü\n-ß\n+ss\n e\n\n"
    );
}

#[test]
fn patch_margin() {
    let mut options = plain();
    options.patch_margin(2);
    let differ = diff_with(options, "hello world", "hello word");
    assert_eq!(
        differ.render_to_string().unwrap(),
        "hello wor\nl\nd\n\n@@ -6,6 +6,5 @@\n  wor\n-l\n d\n\n"
    );
}

#[test]
fn debug_output_is_diffed_by_line() {
    let differ = diff_debug(vec![1, 2, 3], vec![1, 4, 3]);
    assert_eq!(differ.strategy(), Strategy::Unified);
    assert_eq!(
        markup(&*differ),
        "@@ -6,15 +6,15 @@\n  1,\n<del>-    2,\n</del><ins>+    4,\n</ins>     \n\n"
    );
}

#[test]
fn renders_are_idempotent() {
    for (before, after) in [("hello world", "hello word"), ("a\nb\nc", "a\nx\nc")] {
        let differ = diff_with(plain(), before, after);
        let first = differ.render_to_string().unwrap();
        assert_eq!(differ.render_to_string().unwrap(), first);
        assert_eq!(markup(&*differ), markup(&*differ));

        let mut sink = Vec::new();
        let written = differ.write_to(&mut sink).unwrap();
        assert_eq!(written as usize, sink.len());
        assert_eq!(String::from_utf8(sink).unwrap(), first);
    }
}

#[test]
fn printing_adds_blank_line() {
    for (before, after) in [("hello world", "hello word"), ("a\nb\nc", "a\nx\nc"), ("", "")] {
        let differ = diff(before, after);
        let mut out = Markup::default();
        print_to(&*differ, &mut out).unwrap();
        assert_eq!(out.text, markup(&*differ) + "\n");
    }
}

#[test]
fn colors() {
    let mut options = DiffOptions::default();
    options.color(ColorChoice::AlwaysAnsi);
    let colored = diff_with(options, "a\nb\nc", "a\nx\nc")
        .render_to_string()
        .unwrap();
    assert!(colored.contains("\x1b[31m"));
    assert!(colored.contains("\x1b[32m"));

    let uncolored = diff_with(plain(), "a\nb\nc", "a\nx\nc")
        .render_to_string()
        .unwrap();
    assert!(!uncolored.contains('\x1b'));
}

struct BrokenPipe;

impl io::Write for BrokenPipe {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn sink_errors_are_reported() {
    let err = diff("hello world", "hello word")
        .write_to(&mut BrokenPipe)
        .unwrap_err();
    match err {
        Error::Io(err) => assert_eq!(err.kind(), io::ErrorKind::BrokenPipe),
        err => panic!("unexpected error: {err}"),
    }
}
