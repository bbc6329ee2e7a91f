use carlot_db::{bootstrap, create_pool, unit_of_work, DbPool, DbRuntimeSettings, SessionError};
use tempfile::TempDir;

fn file_pool(dir: &TempDir) -> DbPool {
    let path = dir.path().join("carlot-test.db");
    create_pool(
        path.to_str().expect("temp path should be valid utf-8"),
        DbRuntimeSettings {
            busy_timeout_ms: 1_000,
            pool_max_size: 2,
        },
    )
    .expect("failed to create pool")
}

fn count_cars(pool: &DbPool) -> i64 {
    let conn = pool.get().expect("failed to get connection");
    conn.query_row("SELECT COUNT(*) FROM cars", [], |row| row.get(0))
        .expect("failed to count cars")
}

#[allow(dead_code)]
#[derive(Debug)]
enum TestError {
    Session(SessionError),
    Db(rusqlite::Error),
    Abort,
}

impl From<SessionError> for TestError {
    fn from(e: SessionError) -> Self {
        TestError::Session(e)
    }
}

impl From<rusqlite::Error> for TestError {
    fn from(e: rusqlite::Error) -> Self {
        TestError::Db(e)
    }
}

#[test]
fn db_bootstrap_on_file_pool() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let pool = file_pool(&dir);
    {
        let conn = pool.get().expect("failed to get connection");
        let seeded = bootstrap(&conn).expect("failed to bootstrap");
        assert_eq!(seeded, 3);

        let mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .expect("failed to read journal mode");
        assert_eq!(mode, "wal");
    }
    assert_eq!(count_cars(&pool), 3);
}

#[test]
fn unit_of_work_commits_on_ok() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let pool = file_pool(&dir);
    bootstrap(&pool.get().expect("failed to get connection")).expect("failed to bootstrap");

    let inserted: usize = unit_of_work(&pool, |tx| -> Result<usize, TestError> {
        Ok(tx.execute(
            "INSERT INTO cars (plate, model, total_km) VALUES ('4444DDD', 'Opel Corsa', 500)",
            [],
        )?)
    })
    .expect("unit of work should commit");

    assert_eq!(inserted, 1);
    assert_eq!(count_cars(&pool), 4);
}

#[test]
fn unit_of_work_rolls_back_on_err() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let pool = file_pool(&dir);
    bootstrap(&pool.get().expect("failed to get connection")).expect("failed to bootstrap");

    let result: Result<(), TestError> = unit_of_work(&pool, |tx| {
        tx.execute("DELETE FROM cars", [])?;
        Err(TestError::Abort)
    });

    assert!(matches!(result, Err(TestError::Abort)));
    assert_eq!(count_cars(&pool), 3, "delete should have been rolled back");
}

#[test]
fn unit_of_work_releases_connection() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let pool = file_pool(&dir);
    bootstrap(&pool.get().expect("failed to get connection")).expect("failed to bootstrap");

    for _ in 0..5 {
        let _: Result<(), TestError> = unit_of_work(&pool, |_tx| Err(TestError::Abort));
    }

    let state = pool.state();
    assert_eq!(
        state.connections, state.idle_connections,
        "every connection should be back in the pool"
    );
}
