//! Decoding of percent-encoded patch text for display.

use std::borrow::Cow;

/// Encoded token and its display form.
///
/// A line feed decodes to nothing since patch lines are split on `%0A` before
/// they are decoded. Tab and carriage return are made visible as `^I` and `^M`.
static ESCAPES: [(&str, &str); 25] = [
    ("%21", "!"),
    ("%7E", "~"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%3B", ";"),
    ("%2F", "/"),
    ("%3F", "?"),
    ("%3A", ":"),
    ("%40", "@"),
    ("%26", "&"),
    ("%3D", "="),
    ("%2B", "+"),
    ("%24", "$"),
    ("%2C", ","),
    ("%23", "#"),
    ("%2A", "*"),
    ("%0A", ""),
    ("%5B", "["),
    ("%5D", "]"),
    ("%09", "^I"),
    ("%0D", "^M"),
    ("%7B", "{"),
    ("%7D", "}"),
    ("%25", "%"),
];

fn lookup(token: &str) -> Option<&'static str> {
    ESCAPES
        .iter()
        .find(|(encoded, _)| *encoded == token)
        .map(|&(_, decoded)| decoded)
}

/// Replaces every escape token in `line` with its display form.
///
/// The line is scanned once from left to right and decoded text is never
/// scanned again, so `%252F` becomes `%2F` and not `/`. Anything that is not a
/// known token (including a lone `%` or lower case hex digits) is left as is.
pub fn decode(line: &str) -> Cow<'_, str> {
    if !line.contains('%') {
        return Cow::Borrowed(line);
    }

    let mut res = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(pos) = memchr::memchr(b'%', rest.as_bytes()) {
        res.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match candidate.get(..3).and_then(lookup) {
            Some(decoded) => {
                res.push_str(decoded);
                rest = &candidate[3..];
            }
            None => {
                res.push('%');
                rest = &candidate[1..];
            }
        }
    }
    res.push_str(rest);
    Cow::Owned(res)
}
