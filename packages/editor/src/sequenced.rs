//! # Sequenced Command
//!
//! A [`Command`] as the engine tracks it: where it sits in the global order,
//! who issued it, and whether its effect is currently in the document.
//!
//! ```text
//! pending ──finalize──► finalized-active ◄──redo/undo──► finalized-reverted
//! ```

use crate::command::Command;
use apicollab_model::ApiDocument;

/// Engine-issued handle for a command that has no position yet
pub type PendingId = u64;

/// Position in the global total order
pub type Position = u64;

#[derive(Debug)]
pub struct SequencedCommand {
    /// Final position; `None` while pending
    pub position: Option<Position>,

    /// Handle given out when the command was executed as pending
    pub pending_id: Option<PendingId>,

    /// Originated on this participant
    pub local: bool,

    /// Effect currently absent from the document
    pub reverted: bool,

    pub command: Box<dyn Command>,
}

impl SequencedCommand {
    /// Local command applied optimistically
    pub fn pending(pending_id: PendingId, command: Box<dyn Command>) -> Self {
        Self {
            position: None,
            pending_id: Some(pending_id),
            local: true,
            reverted: false,
            command,
        }
    }

    /// Command that arrives with its final position
    pub fn finalized(position: Position, local: bool, command: Box<dyn Command>) -> Self {
        Self {
            position: Some(position),
            pending_id: None,
            local,
            reverted: false,
            command,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.position.is_none()
    }

    /// Execute unless reverted
    pub(crate) fn apply(&mut self, document: &mut ApiDocument) {
        if !self.reverted {
            self.command.execute(document);
        }
    }

    /// Undo unless reverted (a reverted command has no effect to remove)
    pub(crate) fn unapply(&mut self, document: &mut ApiDocument) {
        if !self.reverted {
            self.command.undo(document);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::NewPathCommand;

    #[test]
    fn test_reverted_commands_are_skipped() {
        let mut doc = ApiDocument::new_openapi3("Pets", "1.0");
        let before = doc.to_json();

        let mut seq = SequencedCommand::finalized(1, false, Box::new(NewPathCommand::new("/pets")));
        seq.reverted = true;
        seq.apply(&mut doc);
        assert_eq!(doc.to_json(), before);

        seq.reverted = false;
        seq.apply(&mut doc);
        assert_ne!(doc.to_json(), before);
        seq.unapply(&mut doc);
        assert_eq!(doc.to_json(), before);
    }

    #[test]
    fn test_pending_has_no_position() {
        let seq = SequencedCommand::pending(7, Box::new(NewPathCommand::new("/pets")));
        assert!(seq.is_pending());
        assert!(seq.local);
        assert_eq!(seq.pending_id, Some(7));
    }
}
