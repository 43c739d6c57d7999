use std::collections::{BTreeMap, BTreeSet};

use crate::model::line::HeadingLine;

/// Sparse done-state for headings, keyed by document path then heading line.
///
/// A `(path, line)` pair is present only while it is marked done. Removing the
/// last done line of a path drops the path entry entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionRecord {
    done: BTreeMap<String, BTreeSet<HeadingLine>>,
}

impl CompletionRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the heading at `line` in `path` is marked done.
    ///
    /// Unknown paths and lines are simply not done.
    #[must_use]
    pub fn is_done(&self, path: &str, line: HeadingLine) -> bool {
        self.done
            .get(path)
            .is_some_and(|lines| lines.contains(&line))
    }

    /// Flip the done state of a heading and return the new state.
    pub fn toggle(&mut self, path: &str, line: HeadingLine) -> bool {
        if self.is_done(path, line) {
            self.unmark(path, line);
            false
        } else {
            self.mark_done(path, line);
            true
        }
    }

    /// Mark a heading done. Marking an already-done heading is a no-op.
    pub fn mark_done(&mut self, path: &str, line: HeadingLine) {
        self.done.entry(path.to_owned()).or_default().insert(line);
    }

    fn unmark(&mut self, path: &str, line: HeadingLine) {
        if let Some(lines) = self.done.get_mut(path) {
            lines.remove(&line);
            if lines.is_empty() {
                self.done.remove(path);
            }
        }
    }

    /// Done lines for `path`, ascending.
    pub fn done_lines(&self, path: &str) -> impl Iterator<Item = HeadingLine> + '_ {
        self.done.get(path).into_iter().flatten().copied()
    }

    /// Every done heading, ordered by path then line.
    pub fn iter(&self) -> impl Iterator<Item = (&str, HeadingLine)> + '_ {
        self.done
            .iter()
            .flat_map(|(path, lines)| lines.iter().map(move |line| (path.as_str(), *line)))
    }

    /// Paths with at least one done heading.
    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.done.keys().map(String::as_str)
    }

    /// Number of done headings across all paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.done.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, HeadingLine)> for CompletionRecord {
    fn from_iter<T: IntoIterator<Item = (&'a str, HeadingLine)>>(iter: T) -> Self {
        let mut record = Self::new();
        for (path, line) in iter {
            record.mark_done(path, line);
        }
        record
    }
}
