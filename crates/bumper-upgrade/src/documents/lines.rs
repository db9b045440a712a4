//! Line splitting that keeps byte offsets into the original text.

/// One line of a document. `text` excludes the terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    /// Byte offset of the first character.
    pub start: usize,
    pub text: &'a str,
    /// `"\n"`, `"\r\n"`, `"\r"` or `""` for the last line.
    pub eol: &'a str,
}

impl<'a> Line<'a> {
    /// Byte offset just past the text (before the terminator).
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// Leading spaces and tabs.
    pub fn indent(&self) -> usize {
        self.text.len() - self.text.trim_start_matches([' ', '\t']).len()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Whether the first non-blank characters start with one of `markers`.
    pub fn is_comment(&self, markers: &[&str]) -> bool {
        let trimmed = self.text.trim_start();
        markers.iter().any(|m| trimmed.starts_with(m))
    }
}

/// Split `content` into lines, recognising LF, CRLF and lone CR terminators.
pub fn split_lines(content: &str) -> Vec<Line<'_>> {
    let bytes = content.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let eol_len = match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
            b'\r' | b'\n' => 1,
            _ => {
                i += 1;
                continue;
            }
        };
        lines.push(Line {
            number: lines.len() + 1,
            start,
            text: &content[start..i],
            eol: &content[i..i + eol_len],
        });
        i += eol_len;
        start = i;
    }
    if start < content.len() {
        lines.push(Line {
            number: lines.len() + 1,
            start,
            text: &content[start..],
            eol: "",
        });
    }
    lines
}

/// 1-based (line, column) of a byte offset. Columns count characters.
pub fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(content.len());
    let before = &content[..offset];
    let line_start = before.rfind(['\n', '\r']).map_or(0, |i| i + 1);
    let line = 1 + split_lines(before).iter().filter(|l| !l.eol.is_empty()).count();
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
