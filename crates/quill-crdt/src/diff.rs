//! Character-level text diff.
//!
//! [`diff`] aligns an old and a new string into a list of [`Segment`]s such
//! that the equal+delete texts concatenate back to the old string and the
//! equal+insert texts concatenate back to the new one. Positions are counted
//! in Unicode scalar values, the same unit the replica indexes by.
//!
//! Alignment is `similar`'s linear-space Myers over `char` slices, bounded by
//! [`DIFF_DEADLINE`]. Past the deadline the remaining region degrades to a
//! plain delete+insert, which is coarser but still reconstructs both sides.
//! Within each changed region the deleted text comes before the inserted
//! text, and adjacent segments never share a tag.

use std::fmt;
use std::time::{Duration, Instant};

use similar::{Algorithm, DiffOp, capture_diff_slices_deadline};

/// Longest a single diff may spend searching for a minimal alignment.
pub const DIFF_DEADLINE: Duration = Duration::from_millis(100);

/// What a segment does to the old text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffTag {
    Equal,
    Delete,
    Insert,
}

/// A run of characters sharing one [`DiffTag`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub tag: DiffTag,
    pub text: String,
}

impl Segment {
    pub fn new(tag: DiffTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sigil = match self.tag {
            DiffTag::Equal => '=',
            DiffTag::Delete => '-',
            DiffTag::Insert => '+',
        };
        write!(f, "{sigil}{:?}", self.text)
    }
}

/// Diff two strings character by character.
pub fn diff(old: &str, new: &str) -> Vec<Segment> {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();
    let deadline = Instant::now() + DIFF_DEADLINE;

    let mut out = SegmentBuilder::default();
    for op in capture_diff_slices_deadline(Algorithm::Myers, &a, &b, Some(deadline)) {
        match op {
            DiffOp::Equal { old_index, len, .. } => {
                out.push_run(DiffTag::Equal, &a[old_index..old_index + len]);
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                out.push_run(DiffTag::Delete, &a[old_index..old_index + old_len]);
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                out.push_run(DiffTag::Insert, &b[new_index..new_index + new_len]);
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                out.push_run(DiffTag::Delete, &a[old_index..old_index + old_len]);
                out.push_run(DiffTag::Insert, &b[new_index..new_index + new_len]);
            }
        }
    }
    out.finish()
}

/// Coalesces per-character edits into segments, deletes before inserts
/// inside every changed region.
#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<Segment>,
    equal: String,
    deleted: String,
    inserted: String,
}

impl SegmentBuilder {
    fn push(&mut self, tag: DiffTag, c: char) {
        match tag {
            DiffTag::Equal => {
                self.flush_change();
                self.equal.push(c);
            }
            DiffTag::Delete => {
                self.flush_equal();
                self.deleted.push(c);
            }
            DiffTag::Insert => {
                self.flush_equal();
                self.inserted.push(c);
            }
        }
    }

    fn push_run(&mut self, tag: DiffTag, run: &[char]) {
        for &c in run {
            self.push(tag, c);
        }
    }

    fn flush_equal(&mut self) {
        if !self.equal.is_empty() {
            let text = std::mem::take(&mut self.equal);
            self.segments.push(Segment::new(DiffTag::Equal, text));
        }
    }

    fn flush_change(&mut self) {
        if !self.deleted.is_empty() {
            let text = std::mem::take(&mut self.deleted);
            self.segments.push(Segment::new(DiffTag::Delete, text));
        }
        if !self.inserted.is_empty() {
            let text = std::mem::take(&mut self.inserted);
            self.segments.push(Segment::new(DiffTag::Insert, text));
        }
    }

    fn finish(mut self) -> Vec<Segment> {
        self.flush_equal();
        self.flush_change();
        self.segments
    }
}
