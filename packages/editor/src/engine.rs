//! # OT Engine
//!
//! Sequences commands into one deterministic document no matter the order in
//! which they arrive.
//!
//! ## Model
//!
//! - `finalized`: commands with a position from the sequencing authority,
//!   sorted by position
//! - `pending`: local commands applied optimistically, in submission order,
//!   always on top of every finalized command
//! - `pending_undos`: undo requests whose target has not arrived yet
//!
//! Replaying `finalized` (skipping reverted commands) and then `pending` on the
//! initial document always reproduces the current document.
//!
//! ## Insertion
//!
//! ```text
//! finalized: [1] [2] [4] [6]   pending: (a) (b)
//! insert 3:
//!   undo (b) (a)                      peel off pending
//!   undo [6] [4]                      rewind past 3
//!   execute [3]                       splice in
//!   execute [4] [6]                   replay finalized suffix
//!   execute (a) (b)                   replay pending
//! ```
//!
//! Undo and redo by position use the same rewind, flipping the target's
//! reverted flag before the replay.

use crate::command::Command;
use crate::errors::EngineError;
use crate::sequenced::{PendingId, Position, SequencedCommand};
use apicollab_model::ApiDocument;
use std::collections::BTreeSet;

#[derive(Debug)]
pub struct OtEngine {
    document: ApiDocument,
    finalized: Vec<SequencedCommand>,
    pending: Vec<SequencedCommand>,
    pending_undos: BTreeSet<Position>,
    /// Positions of local commands undone through `undo_last_local`, most
    /// recent last
    local_redo: Vec<Position>,
    next_pending_id: PendingId,
}

impl OtEngine {
    pub fn new(document: ApiDocument) -> Self {
        Self {
            document,
            finalized: Vec::new(),
            pending: Vec::new(),
            pending_undos: BTreeSet::new(),
            local_redo: Vec::new(),
            next_pending_id: 0,
        }
    }

    /// Apply a local command optimistically, before it has a position
    pub fn execute_pending(&mut self, command: Box<dyn Command>) -> PendingId {
        let id = self.next_pending_id;
        self.next_pending_id += 1;

        let mut sequenced = SequencedCommand::pending(id, command);
        sequenced.apply(&mut self.document);
        tracing::debug!(id, command = sequenced.command.type_tag(), "executed pending command");

        self.pending.push(sequenced);
        self.local_redo.clear();
        id
    }

    /// Insert a command that arrived from another participant with its final
    /// position. A second command at an occupied position is ignored.
    pub fn insert_finalized(&mut self, command: Box<dyn Command>, position: Position) {
        if self.index_of(position).is_some() {
            tracing::warn!(position, "duplicate delivery of finalized command, ignoring");
            return;
        }

        let mut sequenced = SequencedCommand::finalized(position, false, command);
        sequenced.reverted = self.pending_undos.remove(&position);

        self.rewind_pending();
        self.splice(sequenced);
        self.replay_pending();
    }

    /// Give a pending command its final position
    pub fn finalize_pending(&mut self, id: PendingId, position: Position) -> Result<(), EngineError> {
        let index = self
            .pending
            .iter()
            .position(|c| c.pending_id == Some(id))
            .ok_or(EngineError::UnknownPending(id))?;
        if self.index_of(position).is_some() {
            return Err(EngineError::PositionTaken(position));
        }

        let deferred_undo = self.pending_undos.contains(&position);
        let beyond_history = self.latest_position().map_or(true, |last| position > last);
        if index == 0 && beyond_history && !deferred_undo {
            let mut sequenced = self.pending.remove(0);
            sequenced.position = Some(position);
            tracing::debug!(id, position, "finalized oldest pending command in place");
            self.finalized.push(sequenced);
            return Ok(());
        }

        self.rewind_pending();
        let mut sequenced = self.pending.remove(index);
        sequenced.position = Some(position);
        sequenced.reverted = self.pending_undos.remove(&position);
        self.splice(sequenced);
        self.replay_pending();
        Ok(())
    }

    /// Revert the finalized command at `position`.
    ///
    /// If that command has not arrived yet the undo is deferred until it does.
    /// Returns the command if this call reverted it.
    pub fn undo(&mut self, position: Position) -> Option<&SequencedCommand> {
        let Some(index) = self.index_of(position) else {
            tracing::debug!(position, "undo target not arrived, deferring");
            self.pending_undos.insert(position);
            return None;
        };
        if self.finalized[index].reverted {
            return None;
        }

        self.rewind_pending();
        self.rewind_finalized(index);
        self.finalized[index].reverted = true;
        self.replay_finalized(index);
        self.replay_pending();

        tracing::debug!(position, "reverted command");
        Some(&self.finalized[index])
    }

    /// Re-apply the reverted command at `position`. A redo for a command that
    /// has not arrived cancels its deferred undo.
    pub fn redo(&mut self, position: Position) -> Option<&SequencedCommand> {
        let Some(index) = self.index_of(position) else {
            if self.pending_undos.remove(&position) {
                tracing::debug!(position, "redo cancelled deferred undo");
            }
            return None;
        };
        if !self.finalized[index].reverted {
            return None;
        }

        self.rewind_pending();
        self.rewind_finalized(index);
        self.finalized[index].reverted = false;
        self.replay_finalized(index);
        self.replay_pending();

        tracing::debug!(position, "restored command");
        Some(&self.finalized[index])
    }

    /// Undo the most recent active local finalized command
    pub fn undo_last_local(&mut self) -> Option<&SequencedCommand> {
        let position = self
            .finalized
            .iter()
            .rev()
            .find(|c| c.local && !c.reverted)
            .and_then(|c| c.position)?;
        self.local_redo.push(position);
        self.undo(position)
    }

    /// Redo the most recent command undone by [`undo_last_local`](Self::undo_last_local)
    pub fn redo_last_local(&mut self) -> Option<&SequencedCommand> {
        while let Some(position) = self.local_redo.pop() {
            let reverted = self
                .index_of(position)
                .is_some_and(|index| self.finalized[index].reverted);
            if reverted {
                return self.redo(position);
            }
        }
        None
    }

    pub fn has_pending_commands(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn current_document(&self) -> &ApiDocument {
        &self.document
    }

    pub fn into_document(self) -> ApiDocument {
        self.document
    }

    pub fn finalized(&self) -> &[SequencedCommand] {
        &self.finalized
    }

    pub fn pending(&self) -> &[SequencedCommand] {
        &self.pending
    }

    pub fn pending_undos(&self) -> &BTreeSet<Position> {
        &self.pending_undos
    }

    pub fn latest_position(&self) -> Option<Position> {
        self.finalized.last().and_then(|c| c.position)
    }

    fn index_of(&self, position: Position) -> Option<usize> {
        self.finalized
            .binary_search_by_key(&Some(position), |c| c.position)
            .ok()
    }

    /// Insert into `finalized` at its position and replay everything after it.
    /// Pending commands must already be rewound.
    fn splice(&mut self, sequenced: SequencedCommand) {
        let position = sequenced.position;
        let index = self.finalized.partition_point(|c| c.position <= position);
        self.rewind_finalized(index);
        self.finalized.insert(index, sequenced);
        self.replay_finalized(index);

        tracing::debug!(
            position = ?position,
            replayed = self.finalized.len() - index - 1,
            "spliced finalized command"
        );
    }

    /// Undo `finalized[from..]`, last first
    fn rewind_finalized(&mut self, from: usize) {
        for sequenced in self.finalized[from..].iter_mut().rev() {
            sequenced.unapply(&mut self.document);
        }
    }

    /// Execute `finalized[from..]` in order
    fn replay_finalized(&mut self, from: usize) {
        for sequenced in self.finalized[from..].iter_mut() {
            sequenced.apply(&mut self.document);
        }
    }

    fn rewind_pending(&mut self) {
        for sequenced in self.pending.iter_mut().rev() {
            sequenced.unapply(&mut self.document);
        }
    }

    fn replay_pending(&mut self) {
        for sequenced in self.pending.iter_mut() {
            sequenced.apply(&mut self.document);
        }
    }
}
