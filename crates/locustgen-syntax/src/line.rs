//! Indented output lines and comment handling
//!
//! Provides [`Line`], the unit every statement renders to, and [`Comments`],
//! which keeps the "one element = one line" invariant for attached comments.

use std::fmt::{self, Display, Formatter};

/// A line of text and its indentation level
///
/// Indentation is kept separate from the text so that nested scopes don't
/// have to rebuild strings at every level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    /// Text of the line, without indentation
    pub text: String,
    /// Number of [`Line::INDENT_UNIT`] prepended to `text`
    pub indent_level: usize,
}

impl Line {
    /// One level of indentation
    pub const INDENT_UNIT: &'static str = "    ";

    /// Create new line
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>, indent_level: usize) -> Self {
        Self {
            text: text.into(),
            indent_level,
        }
    }
}

impl Display for Line {
    /// Empty lines are printed without indentation to avoid trailing whitespace.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            return Ok(());
        }
        for _ in 0..self.indent_level {
            f.write_str(Self::INDENT_UNIT)?;
        }
        f.write_str(&self.text)
    }
}

/// Splits `text` at every line boundary Python recognizes.
///
/// A trailing boundary does not produce an empty last line, and an empty
/// input produces no line at all.
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let is_boundary = matches!(
            c,
            '\n' | '\r'
                | '\u{0b}'
                | '\u{0c}'
                | '\u{1c}'
                | '\u{1d}'
                | '\u{1e}'
                | '\u{85}'
                | '\u{2028}'
                | '\u{2029}'
        );
        if !is_boundary {
            continue;
        }
        lines.push(&text[start..i]);
        let mut end = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                end = j + 1;
            }
        }
        start = end;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Comment lines attached to a statement
///
/// Every element is exactly one line: multi-line strings are split on
/// insertion. Splitting an already split list is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Comments(Vec<String>);

impl Comments {
    /// No comment
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// Build from arbitrary strings, splitting multi-line ones
    #[must_use]
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut comments = Self::none();
        for part in parts {
            comments.push(part);
        }
        comments
    }

    /// Append a comment, splitting it into lines
    pub fn push(&mut self, comment: impl AsRef<str>) {
        self.0
            .extend(split_lines(comment.as_ref()).into_iter().map(str::to_string));
    }

    /// Remove all comments
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Comment lines, one per element
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comment lines with `#` prefixes, at `indent_level`
    #[must_use]
    pub fn to_lines(&self, indent_level: usize) -> Vec<Line> {
        self.0
            .iter()
            .map(|c| Line::new(format!("# {c}"), indent_level))
            .collect()
    }

    /// Attach these comments to `line`
    ///
    /// A single comment goes inline at the end of `line`; several comments
    /// are emitted on their own lines above it.
    #[must_use]
    pub fn attach(&self, mut line: Line) -> Vec<Line> {
        match self.0.as_slice() {
            [] => vec![line],
            [only] => {
                line.text.push_str("  # ");
                line.text.push_str(only);
                vec![line]
            }
            _ => {
                let mut lines = self.to_lines(line.indent_level);
                lines.push(line);
                lines
            }
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for Comments {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
