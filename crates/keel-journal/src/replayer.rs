//! Rewind and replay of store history

use crate::{Error, Result};
use keel_core::{Snapshot, Store};
use tracing::debug;

/// State of the replayer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    /// Not started
    Idle,
    /// Positioned somewhere inside the recording
    Paused,
    /// Reached the last recorded snapshot
    Finished,
}

/// Replayer for a recorded history
///
/// Moves a store back and forth through a recording by restoring history
/// prefixes. Restoring never runs rules or listeners.
pub struct Replayer {
    recording: Vec<Snapshot>,
    state: ReplayState,
    position: usize,
}

impl Replayer {
    /// Create a replayer over a recorded history, oldest snapshot first
    pub fn new(recording: Vec<Snapshot>) -> Self {
        Self {
            recording,
            state: ReplayState::Idle,
            position: 0,
        }
    }

    /// Record a store's current history
    pub fn record(store: &Store) -> Self {
        Self::new(store.history().to_vec())
    }

    /// Truncate a store's history so that `index` is its current state
    pub fn rewind(store: &mut Store, index: usize) -> Result<()> {
        let len = store.history().len();
        if index >= len {
            return Err(Error::InvalidIndex { index, len });
        }
        store.set_history(store.history()[..=index].to_vec())?;
        debug!(index, dropped = len - index - 1, "rewound store history");
        Ok(())
    }

    /// Get the current state
    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Index of the snapshot the store was last moved to
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of recorded snapshots
    pub fn len(&self) -> usize {
        self.recording.len()
    }

    /// Check if the recording is empty
    pub fn is_empty(&self) -> bool {
        self.recording.is_empty()
    }

    /// The recorded snapshots
    pub fn recording(&self) -> &[Snapshot] {
        &self.recording
    }

    /// Go to a specific snapshot
    ///
    /// The store's history becomes the recording up to and including
    /// `index`.
    pub fn goto(&mut self, store: &mut Store, index: usize) -> Result<()> {
        if index >= self.recording.len() {
            return Err(Error::InvalidIndex {
                index,
                len: self.recording.len(),
            });
        }
        store.set_history(self.recording[..=index].to_vec())?;

        self.position = index;
        self.state = if index + 1 == self.recording.len() {
            ReplayState::Finished
        } else {
            ReplayState::Paused
        };
        Ok(())
    }

    /// Step forward one snapshot
    pub fn step_forward(&mut self, store: &mut Store) -> Result<bool> {
        let next = match self.state {
            ReplayState::Idle => 0,
            _ => self.position + 1,
        };
        if next >= self.recording.len() {
            self.state = ReplayState::Finished;
            return Ok(false);
        }
        self.goto(store, next)?;
        Ok(true)
    }

    /// Step backward one snapshot
    pub fn step_backward(&mut self, store: &mut Store) -> Result<bool> {
        if self.position == 0 {
            return Ok(false);
        }
        self.goto(store, self.position - 1)?;
        Ok(true)
    }

    /// Reset to the initial snapshot
    pub fn reset(&mut self, store: &mut Store) -> Result<()> {
        self.goto(store, 0)?;
        self.state = ReplayState::Idle;
        Ok(())
    }
}
