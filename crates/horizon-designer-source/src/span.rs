//! Byte spans and the bookkeeping that keeps them valid across edits.
//!
//! Every position the designer remembers about the source is stored as a
//! [`Fragment`]. After each mutation the editor hands back a [`SpanMap`]
//! describing what moved, and every live fragment is pushed through it:
//!
//! - spans before the edit are unchanged
//! - spans after the edit shift by the size difference
//! - spans enclosing the edit grow or shrink
//! - spans inside removed text, or partially overlapping it, are detached
//!
//! Relocated statements are the exception: fragments inside text that was
//! moved follow it to its new place.

use std::fmt;
use std::ops::Range;

/// A half-open byte range `start..end` in the source buffer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Span {
    /// First byte.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
}

impl Span {
    /// Create a span.
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty span at `offset`.
    #[inline]
    pub const fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `other` lies entirely within this span.
    pub fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether `offset` is inside the span.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Whether the two spans share at least one byte.
    pub fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The smallest span covering both.
    pub fn join(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The span as a `Range` for slicing.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Slice `source` by this span, if it is in bounds.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.range())
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// One primitive replacement: `range` was replaced by `inserted_len` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    /// Replaced range, in coordinates before the edit.
    pub range: Span,
    /// Length of the replacement text.
    pub inserted_len: usize,
}

impl TextEdit {
    /// Create an edit record.
    pub fn new(range: Span, inserted_len: usize) -> Self {
        Self {
            range,
            inserted_len,
        }
    }

    /// Where the replacement text lives after the edit.
    pub fn new_range(&self) -> Span {
        Span::new(self.range.start, self.range.start + self.inserted_len)
    }

    fn shift(&self, offset: usize) -> usize {
        offset + self.inserted_len - self.range.len()
    }

    /// Map a span recorded before this edit to its position after it.
    ///
    /// Returns `None` when the span no longer exists as a unit.
    pub fn map_span(&self, span: Span) -> Option<Span> {
        let range = self.range;
        if range.is_empty() {
            let at = range.start;
            return Some(if at <= span.start {
                Span::new(self.shift(span.start), self.shift(span.end))
            } else if at >= span.end {
                span
            } else {
                Span::new(span.start, self.shift(span.end))
            });
        }
        if range.end <= span.start {
            Some(Span::new(self.shift(span.start), self.shift(span.end)))
        } else if range.start >= span.end {
            Some(span)
        } else if span.contains_span(range) {
            let mapped = Span::new(span.start, self.shift(span.end));
            (!mapped.is_empty()).then_some(mapped)
        } else {
            None
        }
    }
}

/// Text that was cut from `from` and now starts at `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    /// Original location, before any edit of the move.
    pub from: Span,
    /// Start of the text after the move completed.
    pub to: usize,
}

impl Relocation {
    /// Where the relocated text lives now.
    pub fn new_range(&self) -> Span {
        Span::new(self.to, self.to + self.from.len())
    }
}

/// Everything one editor call did to the buffer, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanMap {
    edits: Vec<TextEdit>,
    relocations: Vec<Relocation>,
}

impl SpanMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a primitive edit. Edits must be pushed in application order.
    pub fn push_edit(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    /// Record text that moved as a unit.
    pub fn push_relocation(&mut self, relocation: Relocation) {
        self.relocations.push(relocation);
    }

    /// The primitive edits, in application order.
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Whether the map changes nothing.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.relocations.is_empty()
    }

    fn map_span_edits(&self, span: Span) -> Option<Span> {
        self.edits
            .iter()
            .try_fold(span, |span, edit| edit.map_span(span))
    }

    /// Map a span recorded before the edits to its position afterwards.
    pub fn map_span(&self, span: Span) -> Option<Span> {
        for relocation in &self.relocations {
            if relocation.from.contains_span(span) && !span.is_empty() {
                let start = relocation.to + (span.start - relocation.from.start);
                return Some(Span::new(start, start + span.len()));
            }
        }
        self.map_span_edits(span)
    }
}

impl From<TextEdit> for SpanMap {
    fn from(edit: TextEdit) -> Self {
        Self {
            edits: vec![edit],
            relocations: Vec::new(),
        }
    }
}

/// A span that follows the text it was taken from, or is detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fragment(Option<Span>);

impl Fragment {
    /// Track `span`.
    pub fn new(span: Span) -> Self {
        Self(Some(span))
    }

    /// A fragment that tracks nothing.
    pub const fn detached() -> Self {
        Self(None)
    }

    /// The current span, if the text still exists.
    pub fn get(&self) -> Option<Span> {
        self.0
    }

    /// Whether the tracked text was removed.
    pub fn is_detached(&self) -> bool {
        self.0.is_none()
    }

    /// Stop tracking.
    pub fn detach(&mut self) {
        self.0 = None;
    }

    /// Push the fragment through the edits described by `map`.
    pub fn apply(&mut self, map: &SpanMap) {
        if let Some(span) = self.0 {
            self.0 = map.map_span(span);
        }
    }
}

impl From<Span> for Fragment {
    fn from(span: Span) -> Self {
        Self::new(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_before_shifts() {
        let edit = TextEdit::new(Span::new(0, 2), 5);
        assert_eq!(edit.map_span(Span::new(4, 8)), Some(Span::new(7, 11)));
    }

    #[test]
    fn test_edit_after_unchanged() {
        let edit = TextEdit::new(Span::new(10, 12), 0);
        assert_eq!(edit.map_span(Span::new(4, 8)), Some(Span::new(4, 8)));
        let insert_at_end = TextEdit::new(Span::empty(8), 3);
        assert_eq!(insert_at_end.map_span(Span::new(4, 8)), Some(Span::new(4, 8)));
    }

    #[test]
    fn test_insert_at_start_shifts() {
        let edit = TextEdit::new(Span::empty(4), 3);
        assert_eq!(edit.map_span(Span::new(4, 8)), Some(Span::new(7, 11)));
    }

    #[test]
    fn test_enclosing_span_resizes() {
        let grow = TextEdit::new(Span::empty(6), 10);
        assert_eq!(grow.map_span(Span::new(0, 20)), Some(Span::new(0, 30)));
        let shrink = TextEdit::new(Span::new(5, 9), 0);
        assert_eq!(shrink.map_span(Span::new(0, 20)), Some(Span::new(0, 16)));
        let replace_whole = TextEdit::new(Span::new(0, 20), 4);
        assert_eq!(replace_whole.map_span(Span::new(0, 20)), Some(Span::new(0, 4)));
    }

    #[test]
    fn test_removed_span_detaches() {
        let remove = TextEdit::new(Span::new(2, 12), 0);
        assert_eq!(remove.map_span(Span::new(4, 8)), None);
        assert_eq!(remove.map_span(Span::new(2, 12)), None);
        // Partial overlap.
        assert_eq!(remove.map_span(Span::new(10, 20)), None);
    }

    #[test]
    fn test_relocation_follows_text() {
        // "aaa\nbbb\nccc\n": move "aaa\n" after "ccc\n".
        let mut map = SpanMap::new();
        map.push_edit(TextEdit::new(Span::empty(12), 4));
        map.push_edit(TextEdit::new(Span::new(0, 4), 0));
        map.push_relocation(Relocation {
            from: Span::new(0, 4),
            to: 8,
        });
        assert_eq!(map.map_span(Span::new(0, 3)), Some(Span::new(8, 11)));
        assert_eq!(map.map_span(Span::new(4, 7)), Some(Span::new(0, 3)));
        assert_eq!(map.map_span(Span::new(8, 11)), Some(Span::new(4, 7)));
    }

    #[test]
    fn test_fragment_detaches_and_stays_detached() {
        let mut fragment = Fragment::new(Span::new(3, 5));
        fragment.apply(&TextEdit::new(Span::new(0, 10), 0).into());
        assert!(fragment.is_detached());
        fragment.apply(&TextEdit::new(Span::empty(0), 3).into());
        assert_eq!(fragment.get(), None);
    }
}
