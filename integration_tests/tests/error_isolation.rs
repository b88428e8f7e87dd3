mod common;

use common::{mask_tree, project_names, MemoryHost};
use remap_core::{
    BagItem, ItemId, ItemPayload, LayerMapModel, MatrixAxis, PipelineState, RemapSession,
    SetupError, LAYER_COUNT,
};

fn swapped_map() -> LayerMapModel {
    let mut map = LayerMapModel::from_names(&project_names());
    // Terrain and Props trade places.
    map.move_entry(0, 1);
    map
}

fn bag(value: i64) -> ItemPayload {
    ItemPayload::Bag(BagItem {
        objects: vec![mask_tree("spawn.mask", value)],
    })
}

#[test]
fn commit_failure_is_recorded_and_the_batch_continues() {
    let mut host = MemoryHost::new(project_names());
    host.add_item("a.asset", bag(1 << 8));
    let failing = host.add_item("b.asset", bag(1 << 8));
    host.add_item("c.asset", bag(1 << 8));
    host.fail_commit_for.push(failing);

    let mut session = RemapSession::new(&mut host);
    session.begin(&swapped_map()).expect("setup succeeds");
    session.drain();

    assert_eq!(session.state(), PipelineState::Complete);
    assert_eq!(session.errors().len(), 1);
    assert_eq!(session.errors()[0].item, "b.asset");
    assert!(session.errors()[0].message.contains("commit refused"));

    // The failing item was still rewritten in memory and counted; isolation
    // applies to the batch, not to the item's own accounting.
    let report = session.report().expect("report after completion");
    assert_eq!(report.counters.assets, 3);
    assert_eq!(report.counters.masks, 3);
    assert!(report.summary().contains("Errors encountered: 1."));
    assert!(report.error_report().contains("b.asset"));

    drop(session);
    assert_eq!(host.committed, vec![ItemId(0), ItemId(2)]);
}

#[test]
fn label_store_failure_aborts_before_any_corpus_mutation() {
    let mut host = MemoryHost::new(project_names());
    host.add_item("a.asset", bag(1 << 8));
    host.fail_names_write = true;

    let mut session = RemapSession::new(&mut host);
    let err = session.begin(&swapped_map()).expect_err("setup must fail");
    assert!(matches!(err, SetupError::LabelStore(_)));
    assert_eq!(session.state(), PipelineState::Idle);
    assert_eq!(session.tick(), remap_core::StepResult::Done);

    drop(session);
    assert!(host.committed.is_empty());
    match host.payload(ItemId(0)) {
        ItemPayload::Bag(bag) => assert_eq!(bag.objects[0].leaves[0].value, 1 << 8),
        other => panic!("payload changed shape: {other:?}"),
    }
}

#[test]
fn matrix_write_failure_fails_the_axis_but_not_the_run() {
    let mut host = MemoryHost::new(project_names());
    host.add_item("a.asset", bag(1 << 8));
    host.matrices
        .insert(MatrixAxis::Physics, [0u32; LAYER_COUNT]);
    host.fail_matrix_write = true;

    let mut session = RemapSession::new(&mut host);
    session.begin(&swapped_map()).expect("setup still succeeds");
    session.drain();

    let report = session.report().expect("report after completion");
    assert!(!report.physics_matrix_completed);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].item, "physics collision matrix");
    // Corpus processing was unaffected.
    assert_eq!(report.counters.assets, 1);
}

#[test]
fn invalid_and_clean_maps_never_start_a_run() {
    let mut host = MemoryHost::new(project_names());
    let mut session = RemapSession::new(&mut host);

    let clean = LayerMapModel::from_names(&project_names());
    assert!(matches!(
        session.begin(&clean),
        Err(SetupError::NothingToApply)
    ));

    let mut invalid = LayerMapModel::from_names(&project_names());
    invalid.set_name(0, "");
    assert!(matches!(session.begin(&invalid), Err(SetupError::InvalidMap)));
    assert_eq!(session.state(), PipelineState::Idle);
}
