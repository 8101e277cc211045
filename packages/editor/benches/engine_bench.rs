use apicollab_editor::commands::{
    operation_path, ChangeResponseTypeCommand, NewOperationCommand, NewPathCommand,
    NewResponseCommand, NewSchemaDefinitionCommand, RenameSchemaDefinitionCommand,
};
use apicollab_editor::{
    ApiDocument, Command, CommandRegistry, OtEngine, Position, SimplifiedType,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn path_commands(count: u64) -> Vec<(Position, Box<dyn Command>)> {
    (1..=count)
        .map(|position| {
            let command: Box<dyn Command> =
                Box::new(NewPathCommand::new(format!("/resource{}", position)));
            (position * 2, command)
        })
        .collect()
}

fn engine_with_history(count: u64) -> OtEngine {
    let mut engine = OtEngine::new(ApiDocument::new_openapi3("Bench", "1.0"));
    for (position, command) in path_commands(count) {
        engine.insert_finalized(command, position);
    }
    engine
}

fn append_in_order(c: &mut Criterion) {
    c.bench_function("append_100_in_order", |b| {
        b.iter(|| engine_with_history(black_box(100)))
    });
}

fn late_arrival_at_front(c: &mut Criterion) {
    c.bench_function("late_arrival_into_history_100", |b| {
        b.iter(|| {
            let mut engine = engine_with_history(100);
            engine.insert_finalized(Box::new(NewPathCommand::new("/late")), 1);
            black_box(engine.latest_position())
        })
    });
}

fn undo_deep_in_history(c: &mut Criterion) {
    c.bench_function("undo_redo_first_of_100", |b| {
        b.iter(|| {
            let mut engine = engine_with_history(100);
            engine.undo(black_box(2));
            engine.redo(black_box(2));
            engine.latest_position()
        })
    });
}

fn pending_over_remote(c: &mut Criterion) {
    c.bench_function("pending_10_over_remote_50", |b| {
        b.iter(|| {
            let mut engine = OtEngine::new(ApiDocument::new_openapi3("Bench", "1.0"));
            let ids: Vec<_> = (0..10)
                .map(|i| {
                    let command = NewPathCommand::new(format!("/local{}", i));
                    engine.execute_pending(Box::new(command))
                })
                .collect();
            for (position, command) in path_commands(50) {
                engine.insert_finalized(command, position);
            }
            for (offset, id) in ids.into_iter().enumerate() {
                let _ = engine.finalize_pending(id, 1000 + offset as Position);
            }
            black_box(engine.has_pending_commands())
        })
    });
}

fn rename_with_many_references(c: &mut Criterion) {
    let mut doc = ApiDocument::new_openapi3("Bench", "1.0");
    NewSchemaDefinitionCommand::for_document(&doc, "Pet", None).execute(&mut doc);
    for i in 0..50 {
        let path = format!("/pets{}", i);
        NewPathCommand::new(path.as_str()).execute(&mut doc);
        NewOperationCommand::new(path.as_str(), "get").execute(&mut doc);
        let get = operation_path(&path, "get");
        NewResponseCommand::new(get.clone(), "200").execute(&mut doc);

        let pet = SimplifiedType::reference("#/components/schemas/Pet");
        let ok = get.child("responses").child("200");
        ChangeResponseTypeCommand::for_document(&doc, ok, pet).execute(&mut doc);
    }

    c.bench_function("rename_definition_execute_undo", |b| {
        b.iter(|| {
            let mut command = RenameSchemaDefinitionCommand::for_document(&doc, "Pet", "Animal");
            let mut working = doc.clone();
            command.execute(&mut working);
            command.undo(&mut working);
            black_box(working)
        })
    });
}

fn unmarshal_records(c: &mut Criterion) {
    let registry = CommandRegistry::with_builtin();
    let record = NewPathCommand::new("/pets")
        .serialize_record()
        .map(serde_json::Value::Object)
        .unwrap_or_default();

    c.bench_function("unmarshal_new_path_record", |b| {
        b.iter(|| registry.unmarshal_value(black_box(record.clone())))
    });
}

criterion_group!(
    benches,
    append_in_order,
    late_arrival_at_front,
    undo_deep_in_history,
    pending_over_remote,
    rename_with_many_references,
    unmarshal_records
);
criterion_main!(benches);
