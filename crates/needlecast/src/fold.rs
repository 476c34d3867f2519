//! Span-to-line folding: from a needle stream to per-line index records.
//!
//! The folder consumes one file's full ordered needle stream and produces
//! one [`LineRecord`] per distinct line touched. Needles spanning multiple
//! lines are split into one fragment per line, with columns clipped to each
//! line's visible bounds. This is the exact payload the index sink
//! bulk-loads and the query-time facet resolver scans.
//!
//! Coordinates: lines are 1-indexed; fragment columns are 0-indexed,
//! half-open byte offsets relative to the line start, so
//! `line_start + start_col .. line_start + end_col` recovers each
//! fragment's bytes exactly.

use std::collections::BTreeMap;

use needlecast_core::error::IndexError;
use needlecast_core::text::LineMap;
use serde::Serialize;

use crate::needles::{Needle, NeedleTag, NeedleValue};

/// One needle clipped to a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineFragment {
    pub tag: NeedleTag,
    pub value: NeedleValue,
    /// 0-indexed byte column of the fragment start, relative to the line.
    pub start_col: usize,
    /// 0-indexed byte column just past the fragment end (newline excluded).
    pub end_col: usize,
}

/// All needle fragments intersecting one line, in generator emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineRecord {
    /// 1-indexed line number.
    pub line: u32,
    pub fragments: Vec<LineFragment>,
}

/// Fold a file's needle stream into per-line records.
///
/// Lines are emitted in ascending order; fragments within a line preserve
/// the original emission order (no re-sort by column). Each span is
/// validated against the span contract first: inverted offsets or an end
/// past the file's length fail the whole file with
/// [`IndexError::MalformedSpan`] rather than produce a corrupted highlight.
///
/// Work is O(total span length in lines); the fold is pure and never
/// reorders needles across files.
pub fn fold_into_lines(
    text: &str,
    needles: impl IntoIterator<Item = Needle>,
) -> Result<Vec<LineRecord>, IndexError> {
    let map = LineMap::new(text);
    let mut lines: BTreeMap<u32, Vec<LineFragment>> = BTreeMap::new();

    for needle in needles {
        let span = needle.span;
        if span.start > span.end || span.end > map.len() {
            return Err(IndexError::malformed_span(span, map.len()));
        }

        let (start_line, end_line) = map.span_lines(&span);
        for line in start_line..=end_line {
            let line_start = map.line_start(line);
            let line_end = map.line_end(line);
            let start_col = if line == start_line {
                span.start - line_start
            } else {
                0
            };
            // Spans covering the terminating newline clip to the visible end.
            let end_col = span.end.min(line_end).saturating_sub(line_start);
            lines.entry(line).or_default().push(LineFragment {
                tag: needle.tag,
                value: needle.value.clone(),
                start_col,
                end_col: end_col.max(start_col),
            });
        }
    }

    Ok(lines
        .into_iter()
        .map(|(line, fragments)| LineRecord { line, fragments })
        .collect())
}
