//! Token sources for the two diff granularities.
//!
//! The unified view diffs [`lines`], the word view diffs [`chars`].

use memchr::memchr;

use imara_diff::intern::TokenSource;

/// Returns a [`TokenSource`] that uses the lines in `data` as Tokens. The
/// newline separator is included in the emitted tokens, so a missing newline
/// on the last line is detected as a change.
pub fn lines(data: &str) -> Lines<'_> {
    Lines(data)
}

/// Returns a [`TokenSource`] that uses every `char` in `data` as a token.
pub fn chars(data: &str) -> Chars<'_> {
    Chars(data)
}

/// A [`TokenSource`] that returns the lines of a `str` as tokens. See [`lines`]
/// for details.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Lines<'a>(&'a str);

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0.is_empty() {
            return None;
        }
        // splitting after an ascii byte always lands on a char boundary
        let line_len = memchr(b'\n', self.0.as_bytes()).map_or(self.0.len(), |len| len + 1);
        let (line, rem) = self.0.split_at(line_len);
        self.0 = rem;
        Some(line)
    }
}

impl<'a> TokenSource for Lines<'a> {
    type Token = &'a str;

    type Tokenizer = Self;

    fn tokenize(&self) -> Self::Tokenizer {
        *self
    }

    fn estimate_tokens(&self) -> u32 {
        let len: usize = self.take(20).map(|line| line.len()).sum();
        if len == 0 {
            100
        } else {
            (self.0.len() * 20 / len) as u32
        }
    }
}

/// A [`TokenSource`] that returns the characters of a `str` as tokens. See
/// [`chars`] for details.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Chars<'a>(&'a str);

impl<'a> TokenSource for Chars<'a> {
    type Token = char;

    type Tokenizer = std::str::Chars<'a>;

    fn tokenize(&self) -> Self::Tokenizer {
        self.0.chars()
    }

    fn estimate_tokens(&self) -> u32 {
        self.0.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_keep_terminator() {
        let tokens: Vec<_> = lines("a\n\nb").collect();
        assert_eq!(tokens, ["a\n", "\n", "b"]);
        assert_eq!(lines("").count(), 0);
        assert_eq!(lines("x\n").collect::<Vec<_>>(), ["x\n"]);
    }

    #[test]
    fn chars_split_multibyte() {
        let tokens: Vec<_> = chars("héllo").tokenize().collect();
        assert_eq!(tokens, ['h', 'é', 'l', 'l', 'o']);
    }
}
