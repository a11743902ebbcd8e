//! Schema migrations for the student store.
//!
//! Versions are strictly increasing and the highest applied one is kept in
//! `PRAGMA user_version`. Pending steps run in a single transaction, so a
//! failing step leaves the store at its previous version.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_students.sql"),
}];

/// Returns the latest schema version this binary can open.
pub fn latest_version() -> u32 {
    registry_version(MIGRATIONS)
}

/// Brings `conn` up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    apply_registry(conn, MIGRATIONS)
}

fn registry_version(registry: &[Migration]) -> u32 {
    registry.last().map_or(0, |migration| migration.version)
}

fn apply_registry(conn: &mut Connection, registry: &[Migration]) -> DbResult<()> {
    let stored: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = registry_version(registry);

    if stored > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: latest,
        });
    }

    let pending = registry
        .iter()
        .filter(|migration| migration.version > stored)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_registry, Migration};
    use crate::db::DbError;
    use rusqlite::Connection;

    const STEPS: &[Migration] = &[
        Migration {
            version: 1,
            sql: "CREATE TABLE a (id INTEGER PRIMARY KEY);",
        },
        Migration {
            version: 2,
            sql: "CREATE TABLE b (id INTEGER PRIMARY KEY);",
        },
        Migration {
            version: 3,
            sql: "ALTER TABLE b ADD COLUMN note TEXT;",
        },
    ];

    fn user_version(conn: &Connection) -> u32 {
        conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap()
    }

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name;")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn applies_only_pending_steps() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_registry(&mut conn, &STEPS[..1]).unwrap();
        assert_eq!(user_version(&conn), 1);

        apply_registry(&mut conn, STEPS).unwrap();
        assert_eq!(user_version(&conn), 3);
        assert_eq!(table_names(&conn), vec!["a", "b"]);

        // rerunning a complete registry is a no-op
        apply_registry(&mut conn, STEPS).unwrap();
        assert_eq!(user_version(&conn), 3);
    }

    #[test]
    fn failing_step_rolls_back_whole_batch() {
        let broken = [
            STEPS[0],
            STEPS[1],
            Migration {
                version: 3,
                sql: "ALTER TABLE missing ADD COLUMN note TEXT;",
            },
        ];
        let mut conn = Connection::open_in_memory().unwrap();

        assert!(matches!(
            apply_registry(&mut conn, &broken),
            Err(DbError::Sqlite(_))
        ));
        assert_eq!(user_version(&conn), 0);
        assert!(table_names(&conn).is_empty());
    }

    #[test]
    fn newer_store_is_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", 7).unwrap();

        assert!(matches!(
            apply_registry(&mut conn, STEPS),
            Err(DbError::UnsupportedSchemaVersion {
                db_version: 7,
                latest_supported: 3,
            })
        ));
    }
}
