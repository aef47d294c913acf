//! Three-line element (3LE) text parser.
//!
//! # Responsibility
//! - Turn raw catalog text into validated `TleEntry` values.
//! - Report how much of the input was discarded.
//!
//! # Invariants
//! - Parsing is pure; the same text always yields the same entries.
//! - Malformed triples are skipped, never fatal to the batch.

use crate::model::element::{catalog_id_from_line1, has_line_markers, TleEntry};

/// Lazy iterator over the accepted triples of a 3LE text block.
///
/// Clone before consuming, or call [`parse_three_line`] again, to iterate the
/// same input twice.
#[derive(Debug, Clone)]
pub struct ThreeLineElements<'a> {
    lines: Vec<&'a str>,
    cursor: usize,
    dropped: usize,
}

/// Parse result with counters for discarded input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub entries: Vec<TleEntry>,
    /// Complete triples rejected for bad markers or an unparseable id.
    pub dropped: usize,
    /// Lines left over after the last complete triple.
    pub trailing_lines: usize,
}

/// Splits `text` into trimmed non-empty lines and iterates its triples.
pub fn parse_three_line(text: &str) -> ThreeLineElements<'_> {
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    ThreeLineElements {
        lines,
        cursor: 0,
        dropped: 0,
    }
}

/// Parses `text` eagerly and reports dropped triples.
pub fn parse_with_stats(text: &str) -> ParseOutcome {
    let mut iter = parse_three_line(text);
    let entries = iter.by_ref().collect();
    ParseOutcome {
        entries,
        dropped: iter.dropped(),
        trailing_lines: iter.trailing_lines(),
    }
}

impl ThreeLineElements<'_> {
    /// Triples rejected so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Lines that can never form a complete triple.
    pub fn trailing_lines(&self) -> usize {
        self.lines.len() % 3
    }
}

impl Iterator for ThreeLineElements<'_> {
    type Item = TleEntry;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor + 3 <= self.lines.len() {
            let name = self.lines[self.cursor];
            let line1 = self.lines[self.cursor + 1];
            let line2 = self.lines[self.cursor + 2];
            self.cursor += 3;

            if !has_line_markers(line1, line2) {
                self.dropped += 1;
                continue;
            }
            let Some(catalog_id) = catalog_id_from_line1(line1) else {
                self.dropped += 1;
                continue;
            };

            return Some(TleEntry {
                catalog_id,
                name: name.to_string(),
                line1: line1.to_string(),
                line2: line2.to_string(),
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_three_line, parse_with_stats};

    const ISS: &str = "ISS (ZARYA)
1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    #[test]
    fn blank_lines_and_padding_are_ignored() {
        let text = format!("\n\n   {}\n\n", ISS.replace('\n', "  \n\n"));
        let entries: Vec<_> = parse_three_line(&text).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "ISS (ZARYA)");
        assert!(entries[0].line1.ends_with("2927"));
    }

    #[test]
    fn iterator_is_restartable_from_same_input() {
        let iter = parse_three_line(ISS);
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn trailing_partial_triple_is_counted_not_parsed() {
        let text = format!("{ISS}\nORPHAN\n1 99999U");
        let outcome = parse_with_stats(&text);
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.dropped, 0);
        assert_eq!(outcome.trailing_lines, 2);
    }
}
