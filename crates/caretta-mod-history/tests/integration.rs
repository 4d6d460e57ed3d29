// Integration tests for the history system.
//
// These tests exercise full workflows spanning the HistoryStore, the chain
// policy and the PersistenceLayer together, simulating realistic usage.

use caretta_mod_history::{
    Caret, ChainPolicy, EditRecord, HistoryStore, PartialRecord, PersistenceLayer,
};
use proptest::prelude::*;

fn type_at(store: &mut HistoryStore, at: usize, text: &str, timestamp: i64) -> usize {
    let mut pos = at;
    for ch in text.chars() {
        store
            .push(PartialRecord {
                to: ch.to_string(),
                caret: Caret::collapsed(pos),
                timestamp,
            })
            .unwrap();
        pos += 1;
    }
    pos
}

fn undo(store: &mut HistoryStore, policy: &ChainPolicy) -> Vec<EditRecord> {
    store.revert_chain(|a, b| policy.is_adjacent(a, b))
}

fn redo(store: &mut HistoryStore, policy: &ChainPolicy) -> Vec<EditRecord> {
    store.apply_chain(|a, b| policy.is_adjacent(a, b))
}

// ── Word-level grouping ────────────────────────────────────────────────

#[test]
fn test_word_policy_undoes_word_by_word() {
    let policy = ChainPolicy::word(600);
    let mut store = HistoryStore::new("");
    type_at(&mut store, 0, "hello world", 1_000);

    assert_eq!(undo(&mut store, &policy).len(), 5);
    assert_eq!(store.value(), "hello ");
    assert_eq!(undo(&mut store, &policy).len(), 1);
    assert_eq!(store.value(), "hello");
    assert_eq!(undo(&mut store, &policy).len(), 5);
    assert_eq!(store.value(), "");
    assert!(undo(&mut store, &policy).is_empty());

    assert_eq!(redo(&mut store, &policy).len(), 5);
    assert_eq!(store.value(), "hello");
}

#[test]
fn test_time_gap_splits_chain() {
    let policy = ChainPolicy::word(600);
    let mut store = HistoryStore::new("");
    let pos = type_at(&mut store, 0, "ab", 0);
    type_at(&mut store, pos, "cd", 600);

    undo(&mut store, &policy);
    assert_eq!(store.value(), "ab");
    undo(&mut store, &policy);
    assert_eq!(store.value(), "");
}

#[test]
fn test_jump_splits_chain() {
    let policy = ChainPolicy::word(600);
    let mut store = HistoryStore::new("");
    type_at(&mut store, 0, "world", 0);
    type_at(&mut store, 0, "hi", 0);
    assert_eq!(store.value(), "hiworld");

    undo(&mut store, &policy);
    assert_eq!(store.value(), "world");
}

// ── Persistence round trip ─────────────────────────────────────────────

#[test]
fn test_full_workflow_edit_undo_save_reload_redo() {
    let dir = tempfile::tempdir().unwrap();
    let pl = PersistenceLayer::open(dir.path()).unwrap();
    let policy = ChainPolicy::keystroke();

    let mut store = HistoryStore::new("start:");
    type_at(&mut store, 6, "abc", 0);
    undo(&mut store, &policy);
    pl.save_store("workflow", &store).unwrap();
    drop(store);

    let mut restored = pl.load_store("workflow").unwrap().unwrap();
    assert_eq!(restored.value(), "start:ab");
    assert!(restored.can_redo());

    redo(&mut restored, &policy);
    assert_eq!(restored.value(), "start:abc");
    assert_eq!(restored.fold_value(), "start:abc");
}

#[test]
fn test_multi_document_10_documents_same_database() {
    let dir = tempfile::tempdir().unwrap();
    let pl = PersistenceLayer::open(dir.path()).unwrap();

    for i in 0..10 {
        let mut store = HistoryStore::new("");
        type_at(&mut store, 0, &format!("doc{i}"), 0);
        pl.save_store(&format!("doc-{i}"), &store).unwrap();
    }

    let docs = pl.list_documents().unwrap();
    assert_eq!(docs.len(), 10);
    for i in 0..10 {
        let store = pl.load_store(&format!("doc-{i}")).unwrap().unwrap();
        assert_eq!(store.value(), format!("doc{i}"));
    }
}

// ── Properties ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Replace { at: usize, len: usize, text: String },
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..40, 0usize..4, "[a-z é]{0,4}")
            .prop_map(|(at, len, text)| Op::Replace { at, len, text }),
        1 => Just(Op::Undo),
        1 => Just(Op::Redo),
    ]
}

proptest! {
    #[test]
    fn prop_cached_value_always_matches_fold(
        seed in "[a-z ]{0,12}",
        ops in proptest::collection::vec(op_strategy(), 0..40),
    ) {
        let policy = ChainPolicy::word(600);
        let mut store = HistoryStore::new(seed);
        for (tick, op) in ops.into_iter().enumerate() {
            match op {
                Op::Replace { at, len, text } => {
                    let start = at.min(store.len_chars());
                    let end = (start + len).min(store.len_chars());
                    store.push(PartialRecord {
                        to: text,
                        caret: Caret::new(start, end),
                        timestamp: tick as i64 * 100,
                    }).unwrap();
                }
                Op::Undo => { undo(&mut store, &policy); }
                Op::Redo => { redo(&mut store, &policy); }
            }
            prop_assert_eq!(store.value(), store.fold_value());
        }
    }

    #[test]
    fn prop_undo_all_then_redo_all_restores_value(
        ops in proptest::collection::vec((0usize..20, 0usize..3, "[a-z]{0,3}"), 1..25),
    ) {
        let policy = ChainPolicy::word(600);
        let mut store = HistoryStore::new("");
        for (tick, (at, len, text)) in ops.into_iter().enumerate() {
            let start = at.min(store.len_chars());
            let end = (start + len).min(store.len_chars());
            store.push(PartialRecord {
                to: text,
                caret: Caret::new(start, end),
                timestamp: tick as i64,
            }).unwrap();
        }
        let final_value = store.value();

        while store.can_undo() {
            undo(&mut store, &policy);
        }
        prop_assert_eq!(store.value(), "");
        while store.can_redo() {
            redo(&mut store, &policy);
        }
        prop_assert_eq!(store.value(), final_value);
    }
}
