//! Byte-range replacements applied to an unchanged source string.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TextEdit {
    range: Range<usize>,
    replacement: String,
}

/// A set of non-overlapping edits against one source string.
///
/// Ranges always refer to the original text, so edits can be collected in any
/// order while scanning and applied once at the end.
#[derive(Debug, Clone, Default)]
pub struct TextEdits {
    edits: Vec<TextEdit>,
}

impl TextEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `range` of the original text with `replacement`.
    pub fn replace(&mut self, range: Range<usize>, replacement: impl Into<String>) {
        self.edits.push(TextEdit {
            range,
            replacement: replacement.into(),
        });
    }

    /// Insert `text` at `offset` of the original text.
    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.replace(offset..offset, text);
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Produce the edited text.
    ///
    /// Edits are applied from the end of the text backwards so earlier
    /// offsets stay valid. An edit overlapping one already applied is dropped.
    pub fn apply(&self, source: &str) -> String {
        let mut ordered: Vec<&TextEdit> = self.edits.iter().collect();
        // Stable sort keeps insertion order for inserts at the same offset.
        ordered.sort_by_key(|e| (e.range.start, e.range.end));

        let mut output = source.to_string();
        let mut floor = usize::MAX;
        for edit in ordered.into_iter().rev() {
            if edit.range.end > floor || edit.range.end > source.len() {
                tracing::debug!(start = edit.range.start, end = edit.range.end, "dropping overlapping edit");
                continue;
            }
            output.replace_range(edit.range.clone(), &edit.replacement);
            floor = edit.range.start;
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_in_any_order() {
        let source = "net6.0;net7.0";
        let mut edits = TextEdits::new();
        edits.replace(7..13, "net8.0");
        edits.replace(0..6, "net8.0");
        edits.insert(13, ";net9.0");
        assert_eq!(edits.apply(source), "net8.0;net8.0;net9.0");
    }

    #[test]
    fn drops_overlaps() {
        let mut edits = TextEdits::new();
        edits.replace(0..4, "abcd");
        edits.replace(2..6, "zz");
        assert_eq!(edits.apply("012345"), "01zz");
    }
}
