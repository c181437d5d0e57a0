//! Line buffer that keeps every line's terminator.
//!
//! Edits address text by 1-based line and 0-based column, so files are held as
//! an ordered list of `(content, terminator)` pairs rather than one byte blob.
//! Rendering the buffer reproduces the original bytes exactly, which is what
//! lets a patch leave CRLF files as CRLF and mixed files as mixed.

/// Terminator that followed a line in the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n`
    Crlf,
    /// A lone `\r`
    Cr,
    /// Final line of a file that does not end in a newline
    None,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
            LineEnding::Cr => "\r",
            LineEnding::None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub content: String,
    pub ending: LineEnding,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineBuffer {
    lines: Vec<Line>,
}

impl LineBuffer {
    /// Split text into lines, recording each terminator.
    pub fn parse(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut rest = text;

        while !rest.is_empty() {
            let Some(idx) = rest.find(|c| c == '\r' || c == '\n') else {
                lines.push(Line {
                    content: rest.to_string(),
                    ending: LineEnding::None,
                });
                break;
            };

            let (ending, width) = if rest[idx..].starts_with("\r\n") {
                (LineEnding::Crlf, 2)
            } else if rest.as_bytes()[idx] == b'\r' {
                (LineEnding::Cr, 1)
            } else {
                (LineEnding::Lf, 1)
            };

            lines.push(Line {
                content: rest[..idx].to_string(),
                ending,
            });
            rest = &rest[idx + width..];
        }

        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Content of a 1-based line, without its terminator.
    pub fn line(&self, number: usize) -> Option<&str> {
        let idx = number.checked_sub(1)?;
        self.lines.get(idx).map(|line| line.content.as_str())
    }

    /// Mutable content of a 1-based line. The terminator is not reachable.
    pub fn line_mut(&mut self, number: usize) -> Option<&mut String> {
        let idx = number.checked_sub(1)?;
        self.lines.get_mut(idx).map(|line| &mut line.content)
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Reassemble the text with the original terminators.
    pub fn render(&self) -> String {
        let capacity = self
            .lines
            .iter()
            .map(|line| line.content.len() + line.ending.as_str().len())
            .sum();
        let mut out = String::with_capacity(capacity);
        for line in &self.lines {
            out.push_str(&line.content);
            out.push_str(line.ending.as_str());
        }
        out
    }
}

/// Byte offset of a 0-based character column within a line.
///
/// A column equal to the character count maps to the end of the line.
pub fn byte_offset(content: &str, column: usize) -> Option<usize> {
    content
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(content.len()))
        .nth(column)
}

/// Number of `' '` characters at the start of a line. Tabs stop the count.
pub fn leading_spaces(content: &str) -> usize {
    content.len() - content.trim_start_matches(' ').len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_lf_with_trailing_newline() {
        let buffer = LineBuffer::parse("a\nb\n");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.line(1), Some("a"));
        assert_eq!(buffer.line(2), Some("b"));
        assert_eq!(buffer.line(3), None);
        assert_eq!(buffer.line(0), None);
    }

    #[test]
    fn test_parse_crlf_and_missing_final_newline() {
        let buffer = LineBuffer::parse("one\r\ntwo\r\nthree");
        let endings: Vec<_> = buffer.lines().map(|l| l.ending).collect();
        assert_eq!(
            endings,
            vec![LineEnding::Crlf, LineEnding::Crlf, LineEnding::None]
        );
        assert_eq!(buffer.render(), "one\r\ntwo\r\nthree");
    }

    #[test]
    fn test_parse_mixed_terminators() {
        let text = "a\r\nb\nc\rd";
        let buffer = LineBuffer::parse(text);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.line(3), Some("c"));
        assert_eq!(buffer.render(), text);
    }

    #[test]
    fn test_parse_empty_and_blank_lines() {
        assert!(LineBuffer::parse("").is_empty());

        let buffer = LineBuffer::parse("\n\n");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.line(1), Some(""));
    }

    #[test]
    fn test_line_mut_keeps_terminator() {
        let mut buffer = LineBuffer::parse("  x\r\ny\r\n");
        buffer.line_mut(1).unwrap().replace_range(0..2, "    ");
        assert_eq!(buffer.render(), "    x\r\ny\r\n");
    }

    #[test]
    fn test_byte_offset_multibyte() {
        let line = "aé→b";
        assert_eq!(byte_offset(line, 0), Some(0));
        assert_eq!(byte_offset(line, 2), Some(3));
        assert_eq!(byte_offset(line, 3), Some(6));
        assert_eq!(byte_offset(line, 4), Some(line.len()));
        assert_eq!(byte_offset(line, 5), None);
    }

    #[test]
    fn test_leading_spaces_stops_at_tab() {
        assert_eq!(leading_spaces("      foo"), 6);
        assert_eq!(leading_spaces("  \t  foo"), 2);
        assert_eq!(leading_spaces("foo"), 0);
        assert_eq!(leading_spaces("   "), 3);
    }

    proptest! {
        #[test]
        fn render_reproduces_input(text in "[a-z \t\r\n]{0,64}") {
            prop_assert_eq!(LineBuffer::parse(&text).render(), text);
        }
    }
}
