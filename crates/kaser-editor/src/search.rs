//! Search Engine
//!
//! Linear, case-insensitive substring scan over the effective lines (overlay included).
//! The term is escaped and compiled into a case-insensitive regex, so it is always matched
//! literally.

use crate::{EditOverlay, LineBuffer};
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Result of one scan: matching line indices and where navigation starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchHits {
    /// Matching line indices, ascending.
    pub matches: Vec<usize>,
    /// Index into `matches` to start from (0 when there are no matches).
    pub start_pointer: usize,
}

enum Matcher {
    Regex(Regex),
    Lowercase(String),
}

impl Matcher {
    fn new(term: &str) -> Self {
        match RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
        {
            Ok(re) => Self::Regex(re),
            // Only reachable when the escaped term exceeds the regex size limit.
            Err(_) => Self::Lowercase(term.to_lowercase()),
        }
    }

    fn is_match(&self, line: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(line),
            Self::Lowercase(term) => line.to_lowercase().contains(term.as_str()),
        }
    }
}

/// Scan every effective line for `term`.
///
/// The start pointer is `anchor_line` itself when it matches, otherwise the first match
/// after it, otherwise the first match overall. An empty term matches nothing.
pub fn search(buffer: &LineBuffer, overlay: &EditOverlay, term: &str, anchor_line: usize) -> SearchHits {
    if term.is_empty() {
        return SearchHits::default();
    }

    let matcher = Matcher::new(term);
    let matches: Vec<usize> = (0..overlay.effective_line_count(buffer))
        .filter(|&index| {
            overlay
                .get_effective(buffer, index)
                .is_ok_and(|line| matcher.is_match(&line))
        })
        .collect();

    let start_pointer = match matches.binary_search(&anchor_line) {
        Ok(pos) => pos,
        Err(pos) if pos < matches.len() => pos,
        Err(_) => 0,
    };

    debug!(term, matches = matches.len(), start_pointer, "search");
    SearchHits {
        matches,
        start_pointer,
    }
}

/// Active search: the term, its matches and the current match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    term: String,
    matches: Vec<usize>,
    pointer: Option<usize>,
}

impl SearchState {
    /// No active search.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of a scan for `term`.
    pub fn from_hits(term: impl Into<String>, hits: SearchHits) -> Self {
        let pointer = (!hits.matches.is_empty()).then_some(hits.start_pointer);
        Self {
            term: term.into(),
            matches: hits.matches,
            pointer,
        }
    }

    /// The searched term (empty when no search is active).
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Matching line indices, ascending.
    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    /// Index of the current match in [`matches`](Self::matches).
    pub fn pointer(&self) -> Option<usize> {
        self.pointer
    }

    /// Line of the current match.
    pub fn current_line(&self) -> Option<usize> {
        self.pointer.map(|p| self.matches[p])
    }

    /// `true` once a non-empty term has been searched.
    pub fn is_active(&self) -> bool {
        !self.term.is_empty()
    }

    /// Advance to the next match, wrapping to the first; returns its line.
    pub fn next_match(&mut self) -> Option<usize> {
        let pointer = self.pointer?;
        let next = if pointer + 1 < self.matches.len() {
            pointer + 1
        } else {
            0
        };
        self.pointer = Some(next);
        self.current_line()
    }

    /// Retreat to the previous match, wrapping to the last; returns its line.
    pub fn prev_match(&mut self) -> Option<usize> {
        let pointer = self.pointer?;
        let prev = pointer.checked_sub(1).unwrap_or(self.matches.len() - 1);
        self.pointer = Some(prev);
        self.current_line()
    }

    /// Forget the search.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
