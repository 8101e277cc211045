//! Property tests: every arrival order of the same sequenced history, with
//! the same set of undone positions, yields the same document.

use apicollab_editor::commands::{
    operation_path, ChangeDescriptionCommand, DeleteOperationCommand, NewOperationCommand,
    NewParamCommand, NewPathCommand, NewSchemaDefinitionCommand, NewSchemaPropertyCommand,
    NewTagCommand, RenamePathItemCommand, RenameSchemaDefinitionCommand, RenameTagCommand,
};
use apicollab_editor::{ApiDocument, Command, NodePath, OtEngine, Position};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

const HISTORY_LEN: usize = 12;

fn initial() -> ApiDocument {
    ApiDocument::new_swagger2("Store", "2.0")
}

fn at(position: Position, command: impl Command + 'static) -> (Position, Box<dyn Command>) {
    (position, Box::new(command))
}

fn history() -> Vec<(Position, Box<dyn Command>)> {
    let doc = initial();
    let order = NodePath::parse("/definitions/Order").unwrap_or_default();
    let history = vec![
        at(1, NewPathCommand::new("/orders/{orderId}")),
        at(2, NewOperationCommand::new("/orders/{orderId}", "get")),
        at(3, NewSchemaDefinitionCommand::for_document(&doc, "Order", None)),
        at(4, NewSchemaPropertyCommand::new(order, "quantity")),
        at(5, NewTagCommand::new("orders", None)),
        at(
            6,
            NewParamCommand::for_document(
                &doc,
                operation_path("/orders/{orderId}", "get"),
                "verbose",
                "query",
            ),
        ),
        at(7, RenameSchemaDefinitionCommand::for_document(&doc, "Order", "Purchase")),
        at(8, RenameTagCommand::new("orders", "purchases")),
        at(9, NewOperationCommand::new("/orders/{orderId}", "delete")),
        at(10, RenamePathItemCommand::new("/orders/{orderId}", "/purchases/{id}")),
        at(11, ChangeDescriptionCommand::new("Purchase API")),
        at(12, DeleteOperationCommand::new("/purchases/{id}", "delete")),
    ];
    debug_assert_eq!(history.len(), HISTORY_LEN);
    history
}

fn from_scratch(skip: &[Position]) -> String {
    let mut doc = initial();
    for (position, mut command) in history() {
        if !skip.contains(&position) {
            command.execute(&mut doc);
        }
    }
    doc.to_json()
}

/// Arrival order of the history, shuffled by the seed
fn arrival_order(seed: u64) -> Vec<usize> {
    use rand::{seq::SliceRandom, SeedableRng};
    let mut rng = rand::rngs::SmallRng::seed_from_u64(seed);

    let mut order: Vec<usize> = (0..HISTORY_LEN).collect();
    order.shuffle(&mut rng);
    order
}

fn undone_positions(mask: u16) -> Vec<Position> {
    (0..HISTORY_LEN)
        .filter(|bit| mask & (1 << bit) != 0)
        .map(|bit| bit as Position + 1)
        .collect()
}

#[quickcheck]
fn qc_arrival_order_is_irrelevant(seed: u64) -> bool {
    let mut engine = OtEngine::new(initial());
    let mut commands: Vec<_> = history().into_iter().map(Some).collect();
    for index in arrival_order(seed) {
        if let Some((position, command)) = commands[index].take() {
            engine.insert_finalized(command, position);
        }
    }
    engine.current_document().to_json() == from_scratch(&[])
}

#[quickcheck]
fn qc_undo_set_decides_state(seed: u64, mask: u16, early: bool) -> TestResult {
    let undone = undone_positions(mask);
    if undone.len() > HISTORY_LEN / 2 {
        return TestResult::discard();
    }

    let mut engine = OtEngine::new(initial());
    if early {
        // undos overtake the commands they target
        for &position in &undone {
            engine.undo(position);
        }
    }

    let mut commands: Vec<_> = history().into_iter().map(Some).collect();
    for index in arrival_order(seed) {
        if let Some((position, command)) = commands[index].take() {
            engine.insert_finalized(command, position);
        }
    }

    if !early {
        for &position in undone.iter().rev() {
            engine.undo(position);
        }
    }

    if !engine.pending_undos().is_empty() {
        return TestResult::failed();
    }
    TestResult::from_bool(engine.current_document().to_json() == from_scratch(&undone))
}

#[quickcheck]
fn qc_pending_edits_survive_reordering(seed: u64) -> bool {
    let mut engine = OtEngine::new(initial());

    // even positions are local and go through the pending queue
    let mut local = Vec::new();
    let mut remote = Vec::new();
    for (position, command) in history() {
        if position % 2 == 0 {
            local.push((position, engine.execute_pending(command)));
        } else {
            remote.push(Some((position, command)));
        }
    }

    let remote_len = remote.len();
    let order = arrival_order(seed)
        .into_iter()
        .filter(|&index| index < remote_len);
    for index in order {
        if let Some((position, command)) = remote[index].take() {
            engine.insert_finalized(command, position);
        }
    }
    for (position, id) in local {
        if engine.finalize_pending(id, position).is_err() {
            return false;
        }
    }

    !engine.has_pending_commands() && engine.current_document().to_json() == from_scratch(&[])
}
