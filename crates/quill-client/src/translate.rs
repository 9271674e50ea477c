//! Diff-to-operation translation.
//!
//! Walks diff segments left to right with one cursor in old-text coordinates
//! and asks the replica for an operation per changed character:
//!
//! - `Equal`: cursor += segment length, nothing emitted
//! - `Delete`: one delete per character, all at the current cursor (each
//!   removal shifts the next doomed character into that slot)
//! - `Insert`: one insert per character at the current cursor, cursor += 1
//!   after each so the run stays in order
//!
//! The replica applies each operation as it is generated, which is what makes
//! the cursor arithmetic line up with its visible indexes.

use quill_crdt::{DiffTag, Replica, Result, Segment};
use quill_types::Batch;

#[derive(Debug, Default)]
pub struct Translator {
    cursor: usize,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position in old-text coordinates.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Translate one segment, appending its operations to `batch`.
    pub fn apply_segment<R: Replica>(
        &mut self,
        segment: &Segment,
        replica: &mut R,
        batch: &mut Batch,
    ) -> Result<()> {
        match segment.tag {
            DiffTag::Equal => self.cursor += segment.char_len(),
            DiffTag::Delete => {
                for c in segment.text.chars() {
                    batch.push(replica.generate_delete_operation(c, self.cursor)?);
                }
            }
            DiffTag::Insert => {
                for c in segment.text.chars() {
                    batch.push(replica.generate_insert_operation(c, self.cursor)?);
                    self.cursor += 1;
                }
            }
        }
        Ok(())
    }
}

/// Translate a full segment list into one ordered batch.
pub fn translate<R: Replica>(segments: &[Segment], replica: &mut R) -> Result<Batch> {
    let mut translator = Translator::new();
    let mut batch = Batch::new();
    for segment in segments {
        translator.apply_segment(segment, replica, &mut batch)?;
    }
    Ok(batch)
}
