use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, Transaction, TransactionBehavior};
use std::path::Path;

use crate::comments::CommentRepository;
use crate::error::Result;
use crate::models::{Comment, Ticket};
use crate::tickets::TicketRepository;

const SCHEMA_VERSION: i32 = 1;

pub(crate) const TICKET_COLUMNS: &str =
    "id, title, description, status, priority, assignee, tags, created_at, updated_at";

pub(crate) const COMMENT_COLUMNS: &str = "id, ticket_id, author, body, created_at";

/// Handle to one ticket database file.
///
/// Repository views borrow the connection and are created per call with
/// [`Database::tickets`] and [`Database::comments`]. Nothing is cached; every
/// read goes to the file.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "opening ticket database");
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.ensure_schema()?;
        Ok(db)
    }

    /// Create the tables and indexes if they are missing. Safe to call on a
    /// populated database: existing rows are never touched.
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL CHECK (length(trim(title)) > 0),
                description TEXT,
                status TEXT NOT NULL DEFAULT 'open'
                    CHECK (status IN ('open', 'in_progress', 'closed')),
                priority TEXT NOT NULL DEFAULT 'medium'
                    CHECK (priority IN ('low', 'medium', 'high', 'urgent')),
                assignee TEXT,
                tags TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticket_id INTEGER NOT NULL,
                author TEXT,
                body TEXT NOT NULL CHECK (length(trim(body)) > 0),
                created_at TEXT NOT NULL,
                FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
            CREATE INDEX IF NOT EXISTS idx_tickets_priority ON tickets(priority);
            CREATE INDEX IF NOT EXISTS idx_tickets_assignee ON tickets(assignee);
            CREATE INDEX IF NOT EXISTS idx_comments_ticket ON comments(ticket_id);
            "#,
        )?;

        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version < SCHEMA_VERSION {
            self.conn
                .execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))?;
            tracing::info!(version = SCHEMA_VERSION, "initialized ticket schema");
        }

        Ok(())
    }

    pub fn tickets(&self) -> TicketRepository<'_> {
        TicketRepository::new(&self.conn)
    }

    pub fn comments(&self) -> CommentRepository<'_> {
        CommentRepository::new(&self.conn)
    }
}

/// Storage form of a timestamp. Fixed width so text order is time order.
pub(crate) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time truncated to the precision the store keeps.
pub(crate) fn now() -> DateTime<Utc> {
    let now = Utc::now();
    parse_timestamp(&format_timestamp(&now)).unwrap_or(now)
}

fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Map a row selected with [`TICKET_COLUMNS`].
/// Start a transaction that takes the write lock up front. A deferred
/// transaction that reads before writing cannot wait on the busy timeout when
/// another connection already holds the lock.
pub(crate) fn write_transaction(conn: &Connection) -> rusqlite::Result<Transaction<'_>> {
    Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
}

pub(crate) fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        priority: row.get(4)?,
        assignee: row.get(5)?,
        tags: row.get(6)?,
        created_at: timestamp_column(row, 7)?,
        updated_at: timestamp_column(row, 8)?,
    })
}

/// Map a row selected with [`COMMENT_COLUMNS`].
pub(crate) fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        author: row.get(2)?,
        body: row.get(3)?,
        created_at: timestamp_column(row, 4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTicket;
    use std::fs;
    use tempfile::tempdir;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        (db, dir)
    }

    #[test]
    fn test_open_creates_tables() {
        let (db, _dir) = setup_test_db();
        let tables: Vec<String> = db
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('tickets', 'comments') ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(tables, vec!["comments".to_string(), "tickets".to_string()]);
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let (db, _dir) = setup_test_db();
        db.tickets().create(NewTicket::new("Keep me")).unwrap();
        db.ensure_schema().unwrap();
        db.ensure_schema().unwrap();
        assert_eq!(db.tickets().list(&Default::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_reopen_preserves_data() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("tickets.db");
        let id = {
            let db = Database::open(&db_path).unwrap();
            db.tickets().create(NewTicket::new("Survives restart")).unwrap().id
        };
        let db = Database::open(&db_path).unwrap();
        assert_eq!(db.tickets().get(id).unwrap().title, "Survives restart");
    }

    #[test]
    fn test_schema_version_stamped() {
        let (db, _dir) = setup_test_db();
        let version: i32 = db
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let (db, _dir) = setup_test_db();
        let enabled: i32 = db
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_missing_directory_is_storage_unavailable() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no").join("such").join("dir").join("tickets.db");
        let err = Database::open(&db_path).err().unwrap();
        assert!(err.is_storage_unavailable());
    }

    #[test]
    fn test_corrupt_file_is_storage_unavailable() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("garbage.db");
        fs::write(&db_path, "this is definitely not a sqlite database\n".repeat(100)).unwrap();
        let err = Database::open(&db_path).err().unwrap();
        assert!(err.is_storage_unavailable());
    }

    #[test]
    fn test_timestamp_format_sorts_lexically() {
        let a = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        let b = parse_timestamp("2024-01-01T00:00:00.5Z").unwrap();
        assert_eq!(format_timestamp(&a), "2024-01-01T00:00:00.000000Z");
        assert!(format_timestamp(&a) < format_timestamp(&b));
    }

    #[test]
    fn test_now_roundtrips_through_storage_form() {
        let ts = now();
        assert_eq!(parse_timestamp(&format_timestamp(&ts)).unwrap(), ts);
    }
}
