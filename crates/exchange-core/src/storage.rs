//! Journaled slot storage
//!
//! The router's durable state is a flat map of 32-byte slots to 32-byte
//! words. Absent slots read as zero. Every write records the value it
//! replaced, so any suffix of writes can be rolled back.

use std::collections::HashMap;

use exchange_types::{Slot, Word, B256};
use tracing::trace;

/// Position in the write journal, plus how many checkpoints enclose it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    position: usize,
    depth: usize,
}

#[derive(Debug, Clone)]
struct JournalEntry {
    slot: Slot,
    previous: Option<Word>,
}

/// Slot storage with checkpoint / revert support
#[derive(Debug, Clone, Default)]
pub struct SlotStorage {
    slots: HashMap<Slot, Word>,
    journal: Vec<JournalEntry>,
    depth: usize,
}

impl SlotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a slot; unset slots are zero
    pub fn load(&self, slot: &Slot) -> Word {
        self.slots.get(slot).copied().unwrap_or(B256::ZERO)
    }

    /// Write a slot. Writing zero clears it.
    pub fn store(&mut self, slot: Slot, value: Word) {
        let previous = if value == B256::ZERO {
            self.slots.remove(&slot)
        } else {
            self.slots.insert(slot, value)
        };
        self.journal.push(JournalEntry { slot, previous });
    }

    /// Open a checkpoint at the current journal position.
    ///
    /// Every checkpoint must be closed by exactly one `commit` or `revert_to`.
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.depth += 1;
        Checkpoint {
            position: self.journal.len(),
            depth: self.depth,
        }
    }

    /// Undo every write made after `checkpoint`, newest first
    pub fn revert_to(&mut self, checkpoint: Checkpoint) {
        let mut undone = 0usize;
        while self.journal.len() > checkpoint.position {
            let Some(entry) = self.journal.pop() else {
                break;
            };
            match entry.previous {
                Some(value) => {
                    self.slots.insert(entry.slot, value);
                }
                None => {
                    self.slots.remove(&entry.slot);
                }
            }
            undone += 1;
        }
        self.depth = checkpoint.depth.saturating_sub(1);
        trace!(undone, depth = checkpoint.depth, "Storage reverted");
    }

    /// Accept the writes made since `checkpoint`.
    ///
    /// Only the outermost checkpoint drops the journal; nested commits keep
    /// their entries so an enclosing revert still reaches them.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        self.depth = checkpoint.depth.saturating_sub(1);
        if self.depth == 0 {
            self.journal.clear();
        }
    }

    /// Number of non-zero slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of writes not yet committed at the outermost level
    pub fn pending_writes(&self) -> usize {
        self.journal.len()
    }

    /// Iterate over every non-zero slot
    pub fn iter(&self) -> impl Iterator<Item = (&Slot, &Word)> {
        self.slots.iter()
    }
}
