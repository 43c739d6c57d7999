use headcheck_core::model::{CompletionRecord, HeadingLine, ScopeSettings};
use storage::repository::{PersistedState, StateRepository, Storage};
use storage::sqlite::SqliteRepository;

fn line(n: u32) -> HeadingLine {
    HeadingLine::new(n)
}

fn sample_state() -> PersistedState {
    let record: CompletionRecord = [
        ("Study/Bio.md", line(12)),
        ("Study/Bio.md", line(0)),
        ("Questions/Math/Q1.md", line(4)),
    ]
    .into_iter()
    .collect();
    PersistedState::new(
        record,
        ScopeSettings::new(["Questions/", "Study/"], ["Questions/Archive", "Study/Old"]),
    )
}

#[tokio::test]
async fn sqlite_fresh_database_has_no_state() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_fresh?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load_state().await.expect("load").is_none());
}

#[tokio::test]
async fn sqlite_roundtrip_persists_record_and_settings() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let state = sample_state();
    repo.save_state(&state).await.expect("save");

    let loaded = repo.load_state().await.expect("load").expect("state");
    assert_eq!(loaded, state);
    // Root order is significant and must survive storage.
    assert_eq!(loaded.settings.include_roots(), ["Questions/", "Study/"]);
    assert_eq!(loaded.settings.exclude_roots(), ["Questions/Archive", "Study/Old"]);
}

#[tokio::test]
async fn sqlite_save_overwrites_wholesale() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save_state(&sample_state()).await.expect("first save");

    let record: CompletionRecord = [("A.md", line(3))].into_iter().collect();
    let replacement = PersistedState::new(record, ScopeSettings::default());
    repo.save_state(&replacement).await.expect("second save");

    let loaded = repo.load_state().await.expect("load").expect("state");
    assert_eq!(loaded, replacement);
    assert!(!loaded.record.is_done("Study/Bio.md", line(12)));
}

#[tokio::test]
async fn sqlite_saved_empty_state_is_distinct_from_nothing_saved() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_empty_saved?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save_state(&PersistedState::default()).await.expect("save");
    let loaded = repo.load_state().await.expect("load");
    assert_eq!(loaded, Some(PersistedState::default()));
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate_twice?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.save_state(&sample_state()).await.expect("save");
    repo.migrate().await.expect("second migrate");

    let loaded = repo.load_state().await.expect("load").expect("state");
    assert_eq!(loaded, sample_state());
}

#[tokio::test]
async fn storage_open_selects_sqlite_for_sqlite_urls() {
    let storage = Storage::open("sqlite:file:memdb_open?mode=memory&cache=shared")
        .await
        .expect("open");
    storage.state.save_state(&sample_state()).await.expect("save");
    let loaded = storage.state.load_state().await.expect("load");
    assert_eq!(loaded, Some(sample_state()));
}
