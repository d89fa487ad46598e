use lifeplan_core::db::migrations::latest_version;
use lifeplan_core::db::{open_db, open_db_in_memory, DbError};
use lifeplan_core::{DocumentRepository, RepoError, SqliteDocumentRepository, DOCUMENT_KEY};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_store");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lifeplan.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "kv_store");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_preflight_rejects_unprepared_connections() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteDocumentRepository::try_new(&conn).unwrap_err();
    match err {
        RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        } => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn save_load_delete_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();

    assert_eq!(repo.load_raw(DOCUMENT_KEY).unwrap(), None);

    repo.save_raw(DOCUMENT_KEY, "{\"version\":7}").unwrap();
    assert_eq!(
        repo.load_raw(DOCUMENT_KEY).unwrap().as_deref(),
        Some("{\"version\":7}")
    );

    repo.save_raw(DOCUMENT_KEY, "{\"version\":8}").unwrap();
    assert_eq!(
        repo.load_raw(DOCUMENT_KEY).unwrap().as_deref(),
        Some("{\"version\":8}"),
        "saving replaces the stored blob"
    );

    repo.delete(DOCUMENT_KEY).unwrap();
    assert_eq!(repo.load_raw(DOCUMENT_KEY).unwrap(), None);

    // Deleting a missing key stays silent.
    repo.delete(DOCUMENT_KEY).unwrap();
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
