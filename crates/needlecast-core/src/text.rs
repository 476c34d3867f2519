//! Line maps: byte offset to line/column resolution for one file.
//!
//! Lines are 1-indexed (editor convention). Columns are 0-indexed byte
//! offsets within the line, so `line_start(line) + col` recovers the
//! absolute offset exactly. A file with a trailing newline has a final
//! empty line; every offset in `[0, len]` resolves to some line.

use crate::span::Span;

/// Precomputed line-start offsets for one file's text.
///
/// Built once per file; the line folder queries it per needle fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMap {
    /// Byte offset of the start of each line, always beginning with 0.
    line_starts: Vec<usize>,
    /// Total byte length of the file.
    len: usize,
}

impl LineMap {
    /// Build a line map over file text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        LineMap {
            line_starts,
            len: text.len(),
        }
    }

    /// Total byte length of the file.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the file is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of lines, counting the empty line after a trailing newline.
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// 1-indexed line containing `offset`.
    ///
    /// Offsets past the end of the file clamp to the last line; the newline
    /// byte belongs to the line it terminates.
    pub fn line_of(&self, offset: usize) -> u32 {
        let offset = offset.min(self.len);
        self.line_starts.partition_point(|&start| start <= offset) as u32
    }

    /// Byte offset of the start of a 1-indexed line.
    ///
    /// Out-of-range lines clamp to the nearest existing line.
    pub fn line_start(&self, line: u32) -> usize {
        self.line_starts[self.clamp_index(line)]
    }

    /// Byte offset just past the visible end of a 1-indexed line, excluding
    /// the terminating newline.
    pub fn line_end(&self, line: u32) -> usize {
        let idx = self.clamp_index(line);
        match self.line_starts.get(idx + 1) {
            Some(&next_start) => next_start - 1,
            None => self.len,
        }
    }

    /// 1-indexed start and end lines touched by a span.
    ///
    /// An empty span still lands on the line containing its start offset.
    pub fn span_lines(&self, span: &Span) -> (u32, u32) {
        let start_line = self.line_of(span.start);
        let end_line = self.line_of(span.end.saturating_sub(1).max(span.start));
        (start_line, end_line)
    }

    fn clamp_index(&self, line: u32) -> usize {
        (line.max(1) as usize - 1).min(self.line_starts.len() - 1)
    }
}
