//! Command journals: the sequence of events one participant observed.
//!
//! ```json
//! [
//!   { "kind": "finalized", "position": 2, "command": { "__type": "NewPathCommand", "newPath": "/pets" } },
//!   { "kind": "undo", "position": 2 }
//! ]
//! ```

use apicollab_editor::{
    ApiDocument, CommandRecord, CommandRegistry, EditorError, OtEngine, Position,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum JournalEvent {
    /// A command arrived with its final position
    Finalized {
        position: Position,
        command: CommandRecord,
    },
    Undo {
        position: Position,
    },
    Redo {
        position: Position,
    },
}

/// Counts reported after a replay
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub finalized: usize,
    pub undone: usize,
    pub redone: usize,
    /// Undo/redo events that changed nothing when they arrived
    pub deferred_or_ignored: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Journal {
    pub events: Vec<JournalEvent>,
}

impl Journal {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::parse(&source)?)
    }

    pub fn parse(source: &str) -> Result<Self, EditorError> {
        let events = serde_json::from_str(source)?;
        Ok(Self { events })
    }

    /// Indexes of the `finalized` events, in journal order
    pub fn finalized_indexes(&self) -> Vec<usize> {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, event)| matches!(event, JournalEvent::Finalized { .. }))
            .map(|(index, _)| index)
            .collect()
    }

    /// Positions delivered more than once
    pub fn duplicate_positions(&self) -> Vec<Position> {
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for event in &self.events {
            if let JournalEvent::Finalized { position, .. } = event {
                if !seen.insert(*position) {
                    duplicates.insert(*position);
                }
            }
        }
        duplicates.into_iter().collect()
    }

    /// Positions whose effect is absent once every undo/redo has been seen
    pub fn reverted_positions(&self) -> BTreeSet<Position> {
        let mut reverted = BTreeSet::new();
        for event in &self.events {
            match event {
                JournalEvent::Undo { position } => {
                    reverted.insert(*position);
                }
                JournalEvent::Redo { position } => {
                    reverted.remove(position);
                }
                JournalEvent::Finalized { .. } => {}
            }
        }
        reverted
    }

    /// Feed every event to the engine in journal order
    pub fn replay(
        &self,
        engine: &mut OtEngine,
        registry: &CommandRegistry,
    ) -> Result<ReplayStats, EditorError> {
        let order: Vec<usize> = (0..self.events.len()).collect();
        self.replay_order(engine, registry, &order)
    }

    /// Feed the events at `order` to the engine
    pub fn replay_order(
        &self,
        engine: &mut OtEngine,
        registry: &CommandRegistry,
        order: &[usize],
    ) -> Result<ReplayStats, EditorError> {
        let mut stats = ReplayStats::default();
        for &index in order {
            let Some(event) = self.events.get(index) else {
                continue;
            };
            match event {
                JournalEvent::Finalized { position, command } => {
                    let command = registry.unmarshal(command.clone())?;
                    engine.insert_finalized(command, *position);
                    stats.finalized += 1;
                }
                JournalEvent::Undo { position } => {
                    if engine.undo(*position).is_some() {
                        stats.undone += 1;
                    } else {
                        stats.deferred_or_ignored += 1;
                    }
                }
                JournalEvent::Redo { position } => {
                    if engine.redo(*position).is_some() {
                        stats.redone += 1;
                    } else {
                        stats.deferred_or_ignored += 1;
                    }
                }
            }
        }
        tracing::debug!(?stats, "journal replayed");
        Ok(stats)
    }

    /// Execute the active commands in position order against a fresh copy of
    /// `initial`, without the engine
    pub fn reference_document(
        &self,
        initial: &ApiDocument,
        registry: &CommandRegistry,
    ) -> Result<ApiDocument, EditorError> {
        let reverted = self.reverted_positions();
        let mut by_position: BTreeMap<Position, &CommandRecord> = BTreeMap::new();
        for event in &self.events {
            if let JournalEvent::Finalized { position, command } = event {
                by_position.entry(*position).or_insert(command);
            }
        }

        let mut document = initial.clone();
        for (position, record) in by_position {
            if reverted.contains(&position) {
                continue;
            }
            let mut command = registry.unmarshal(record.clone())?;
            command.execute(&mut document);
        }
        Ok(document)
    }
}

/// Every ordering of `items`, by Heap's algorithm
pub fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
    let mut current = items.to_vec();
    let mut all = vec![current.clone()];
    let mut counters = vec![0; current.len()];
    let mut i = 1;
    while i < current.len() {
        if counters[i] < i {
            let swap_with = if i % 2 == 0 { 0 } else { counters[i] };
            current.swap(swap_with, i);
            all.push(current.clone());
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOURNAL: &str = r#"[
        { "kind": "finalized", "position": 3,
          "command": { "__type": "NewOperationCommand", "path": "/pets", "method": "get" } },
        { "kind": "finalized", "position": 1,
          "command": { "__type": "NewPathCommand", "newPath": "/pets" } },
        { "kind": "undo", "position": 5 },
        { "kind": "finalized", "position": 5,
          "command": { "__type": "ChangeTitleCommand", "value": "Zoo" } },
        { "kind": "undo", "position": 3 },
        { "kind": "redo", "position": 3 }
    ]"#;

    #[test]
    fn test_parse_events() {
        let journal = Journal::parse(JOURNAL).unwrap();
        assert_eq!(journal.events.len(), 6);
        assert_eq!(journal.events[2], JournalEvent::Undo { position: 5 });
        assert_eq!(journal.finalized_indexes(), vec![0, 1, 3]);
        assert!(journal.duplicate_positions().is_empty());
    }

    #[test]
    fn test_reverted_positions_follow_last_event() {
        let journal = Journal::parse(JOURNAL).unwrap();
        assert_eq!(journal.reverted_positions(), BTreeSet::from([5]));
    }

    #[test]
    fn test_replay_matches_reference() {
        let journal = Journal::parse(JOURNAL).unwrap();
        let registry = CommandRegistry::with_builtin();
        let initial = ApiDocument::new_openapi3("Pets", "1.0");

        let mut engine = OtEngine::new(initial.clone());
        let stats = journal.replay(&mut engine, &registry).unwrap();
        assert_eq!(stats.finalized, 3);
        assert_eq!(stats.undone, 1);
        assert_eq!(stats.redone, 1);
        // the early undo of 5 was deferred
        assert_eq!(stats.deferred_or_ignored, 1);

        let reference = journal.reference_document(&initial, &registry).unwrap();
        assert_eq!(engine.current_document().to_json(), reference.to_json());
        assert!(!reference.to_json().contains("Zoo"));
    }

    #[test]
    fn test_unknown_command_is_reported() {
        let journal = Journal::parse(
            r#"[ { "kind": "finalized", "position": 1, "command": { "__type": "Nope" } } ]"#,
        )
        .unwrap();
        let registry = CommandRegistry::with_builtin();
        let mut engine = OtEngine::new(ApiDocument::new_openapi3("Pets", "1.0"));
        assert!(journal.replay(&mut engine, &registry).is_err());
    }

    #[test]
    fn test_bad_event_kind_fails_parse() {
        assert!(Journal::parse(r#"[ { "kind": "rewind", "position": 1 } ]"#).is_err());
    }

    #[test]
    fn test_permutations_cover_every_order() {
        let mut all = permutations(&[0, 1, 2]);
        assert_eq!(all.len(), 6);
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 6);
        assert_eq!(permutations(&[]), vec![Vec::<usize>::new()]);
    }
}
