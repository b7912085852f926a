//! Behavior every backend must share, run against each one.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use keepsake_types::{RecordId, Timestamp};

use crate::engine::PersistenceEngine;
use crate::fixtures::{Note, Task, Todo};
use crate::record::Record;
use crate::traits::StorageBackend;

fn id(s: &str) -> RecordId {
    RecordId::parse(s).unwrap()
}

fn at(millis: i64) -> Timestamp {
    Timestamp::from_millis(millis).unwrap()
}

fn note(id_str: &str, text: &str, millis: i64) -> Record<Note> {
    Record::from_parts(id(id_str), Note::new(text), at(millis))
}

fn texts<B: StorageBackend>(store: &PersistenceEngine<B>) -> Vec<String> {
    store
        .read_all::<Note>()
        .into_iter()
        .map(|r| r.into_payload().text)
        .collect()
}

pub fn write_replaces_existing_row<B: StorageBackend>(store: PersistenceEngine<B>) {
    assert!(store.write(&note("n", "first", 1_000)));
    assert!(store.write(&note("n", "second", 1_000)));
    assert_eq!(store.count(), 1);
    assert_eq!(store.read::<Note>(&id("n")).unwrap().payload().text, "second");
}

pub fn read_round_trips_record<B: StorageBackend>(store: PersistenceEngine<B>) {
    let record = note("n", "hello", 1_709_296_245_123);
    assert!(store.write(&record));
    assert_eq!(store.read::<Note>(&id("n")), Some(record));
    assert!(store.contains(&id("n")));
    assert!(!store.contains(&id("missing")));
    assert!(store.read::<Note>(&id("missing")).is_none());
}

pub fn read_as_wrong_type_is_none<B: StorageBackend>(store: PersistenceEngine<B>) {
    assert!(store.write(&note("n", "x", 1_000)));
    assert!(store.read::<Task>(&id("n")).is_none());
    assert!(store.read::<Note>(&id("n")).is_some());
}

pub fn read_all_orders_by_creation_time<B: StorageBackend>(store: PersistenceEngine<B>) {
    assert!(store.write(&note("c", "third", 3_000)));
    assert!(store.write(&note("a", "first", 1_000)));
    assert!(store.write(&note("b", "second", 2_000)));
    assert!(store.write(&Record::new(Task::new("other", false))));
    assert_eq!(texts(&store), vec!["first", "second", "third"]);
    let ids: Vec<String> = store
        .read_ids::<Note>()
        .iter()
        .map(|i| i.as_str().to_string())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

pub fn write_batch_counts_successes<B: StorageBackend>(store: PersistenceEngine<B>) {
    let batch = vec![note("a", "1", 1), note("b", "2", 2), note("c", "3", 3)];
    assert_eq!(store.write_batch(&batch), 3);
    assert_eq!(store.count_of::<Note>(), 3);
    assert_eq!(store.write_batch::<Note>(&[]), 0);
}

pub fn renamed_rows_count_as_current_type<B: StorageBackend>(store: PersistenceEngine<B>) {
    let old = Record::from_parts(
        id("old"),
        Todo {
            title: "legacy".into(),
            finished: true,
        },
        at(1_000),
    );
    assert!(store.write(&old));
    assert!(store.write(&Record::from_parts(id("new"), Task::new("fresh", false), at(2_000))));
    assert!(store.write(&note("n", "unrelated", 500)));

    assert_eq!(store.count_of::<Task>(), 2);
    let tasks: Vec<Task> = store
        .read_all::<Task>()
        .into_iter()
        .map(Record::into_payload)
        .collect();
    assert_eq!(tasks, vec![Task::new("legacy", true), Task::new("fresh", false)]);
    assert_eq!(store.read_ids::<Task>().len(), 2);
    assert_eq!(store.read::<Task>(&id("old")).unwrap().payload(), &Task::new("legacy", true));

    assert_eq!(store.delete_all::<Task>(), 2);
    assert_eq!(store.count_of::<Task>(), 0);
    assert_eq!(store.count(), 1);
}

pub fn delete_by_id<B: StorageBackend>(store: PersistenceEngine<B>) {
    assert!(store.write(&note("a", "x", 1)));
    assert!(store.write(&note("b", "y", 2)));
    assert!(store.delete(&id("a")));
    assert!(!store.delete(&id("a")));
    assert_eq!(texts(&store), vec!["y"]);
}

pub fn clear_database_reports_removed<B: StorageBackend>(store: PersistenceEngine<B>) {
    assert_eq!(store.clear_database(), 0);
    assert!(store.write(&note("a", "x", 1)));
    assert!(store.write(&Record::new(Task::new("t", false))));
    assert_eq!(store.clear_database(), 2);
    assert_eq!(store.count(), 0);
    assert_eq!(store.delete_all::<Note>(), 0);
}

pub fn commit_keeps_writes<B: StorageBackend>(store: PersistenceEngine<B>) {
    assert!(store.start_transaction(false));
    assert!(store.in_transaction());
    assert!(store.write(&note("a", "kept", 1)));
    assert_eq!(store.count(), 1);
    assert!(store.commit_transaction());
    assert!(!store.in_transaction());
    assert!(!store.commit_transaction());
    assert!(!store.rollback_transaction());
    assert_eq!(texts(&store), vec!["kept"]);
}

pub fn rollback_undoes_every_change<B: StorageBackend>(store: PersistenceEngine<B>) {
    assert!(store.write(&note("a", "original", 1)));
    assert!(store.write(&note("b", "doomed", 2)));
    assert!(store.start_transaction(false));
    assert!(store.write(&note("a", "changed", 1)));
    assert!(store.delete(&id("b")));
    assert!(store.write(&note("c", "added", 3)));
    assert_eq!(texts(&store), vec!["changed", "added"]);
    assert!(store.rollback_transaction());
    assert!(!store.rollback_transaction());
    assert_eq!(texts(&store), vec!["original", "doomed"]);
}

pub fn nested_start_needs_override<B: StorageBackend>(store: PersistenceEngine<B>) {
    assert!(store.start_transaction(false));
    assert!(store.write(&note("a", "discarded", 1)));
    assert!(!store.start_transaction(false));
    assert_eq!(store.count(), 1);

    assert!(store.start_transaction(true));
    assert!(store.in_transaction());
    assert_eq!(store.count(), 0);
    assert!(store.write(&note("b", "kept", 2)));
    assert!(store.commit_transaction());
    assert_eq!(texts(&store), vec!["kept"]);
}

pub fn override_without_open_transaction_starts_one<B: StorageBackend>(
    store: PersistenceEngine<B>,
) {
    assert!(store.start_transaction(true));
    assert!(store.in_transaction());
    assert!(store.rollback_transaction());
}

pub fn transaction_ended_by_backend_returns_to_idle<B: StorageBackend>(
    store: PersistenceEngine<B>,
) {
    assert!(store.start_transaction(false));
    assert!(store.write(&note("a", "aborted", 1)));
    store.with_backend(|backend| backend.rollback()).unwrap();

    assert!(!store.in_transaction());
    assert!(!store.commit_transaction());
    assert!(!store.rollback_transaction());
    assert_eq!(store.count(), 0);

    assert!(store.start_transaction(false));
    assert!(store.write(&note("b", "kept", 2)));
    assert!(store.commit_transaction());
    assert_eq!(texts(&store), vec!["kept"]);
}

pub fn override_after_backend_abort_starts_fresh<B: StorageBackend>(
    store: PersistenceEngine<B>,
) {
    assert!(store.start_transaction(false));
    store.with_backend(|backend| backend.rollback()).unwrap();
    assert!(store.start_transaction(true));
    assert!(store.in_transaction());
    assert!(store.rollback_transaction());
}

pub fn concurrent_writers_all_land<B: StorageBackend + 'static>(
    store: PersistenceEngine<B>,
) {
    const WRITERS: usize = 8;
    const PER_WRITER: usize = 25;

    let store = Arc::new(store);
    let (tx, rx) = mpsc::channel();
    for w in 0..WRITERS {
        let store = Arc::clone(&store);
        let tx = tx.clone();
        thread::spawn(move || {
            let mut ok = 0;
            for i in 0..PER_WRITER {
                if store.write(&Record::new(Note::new(&format!("{w}-{i}")))) {
                    ok += 1;
                }
                store.count();
            }
            tx.send(ok).unwrap();
        });
    }
    drop(tx);

    let mut written = 0;
    for _ in 0..WRITERS {
        written += rx.recv_timeout(Duration::from_secs(30)).unwrap();
    }
    assert_eq!(written, WRITERS * PER_WRITER);
    assert_eq!(store.count(), (WRITERS * PER_WRITER) as i64);
    assert_eq!(store.read_all::<Note>().len(), WRITERS * PER_WRITER);
}

pub fn rollback_covers_other_threads<B: StorageBackend + 'static>(
    store: PersistenceEngine<B>,
) {
    let store = Arc::new(store);
    assert!(store.start_transaction(false));
    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.write(&note("t", "from thread", 1)))
    };
    assert!(writer.join().unwrap());
    assert_eq!(store.count(), 1);
    assert!(store.rollback_transaction());
    assert_eq!(store.count(), 0);
}

macro_rules! backend_contract {
    ($backend:ident, $make:expr) => {
        mod $backend {
            backend_contract!(@tests $make;
                write_replaces_existing_row,
                read_round_trips_record,
                read_as_wrong_type_is_none,
                read_all_orders_by_creation_time,
                write_batch_counts_successes,
                renamed_rows_count_as_current_type,
                delete_by_id,
                clear_database_reports_removed,
                commit_keeps_writes,
                rollback_undoes_every_change,
                nested_start_needs_override,
                override_without_open_transaction_starts_one,
                transaction_ended_by_backend_returns_to_idle,
                override_after_backend_abort_starts_fresh,
                concurrent_writers_all_land,
                rollback_covers_other_threads,
            );
        }
    };
    (@tests $make:expr; $($case:ident),* $(,)?) => {
        $(
            #[test]
            fn $case() {
                super::$case($make);
            }
        )*
    };
}

backend_contract!(memory, crate::InMemoryStore::in_memory(crate::fixtures::codec()));
backend_contract!(
    sqlite,
    crate::SqliteStore::open(&crate::StoreConfig::in_memory(), crate::fixtures::codec()).unwrap()
);
