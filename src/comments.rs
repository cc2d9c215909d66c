use rusqlite::{params, Connection};

use crate::db::{self, comment_from_row, format_timestamp, COMMENT_COLUMNS};
use crate::error::{Error, Result};
use crate::models::Comment;
use crate::tickets::ticket_exists;

/// Append-only access to the comments of a ticket.
pub struct CommentRepository<'a> {
    conn: &'a Connection,
}

impl<'a> CommentRepository<'a> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        CommentRepository { conn }
    }

    pub fn add(&self, ticket_id: i64, body: &str) -> Result<Comment> {
        self.add_by(ticket_id, None, body)
    }

    /// Add a comment, recording who wrote it.
    pub fn add_by(&self, ticket_id: i64, author: Option<&str>, body: &str) -> Result<Comment> {
        let body = body.trim();
        if body.is_empty() {
            return Err(Error::invalid("body", "comment must not be empty"));
        }
        let author = author.map(str::trim).filter(|a| !a.is_empty());

        let tx = db::write_transaction(self.conn)?;
        if !ticket_exists(&tx, ticket_id)? {
            return Err(Error::ticket_not_found(ticket_id));
        }

        tx.execute(
            "INSERT INTO comments (ticket_id, author, body, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![ticket_id, author, body, format_timestamp(&db::now())],
        )?;
        let comment = tx.query_row(
            &format!("SELECT {} FROM comments WHERE id = ?1", COMMENT_COLUMNS),
            [tx.last_insert_rowid()],
            comment_from_row,
        )?;
        tx.commit()?;

        tracing::info!(ticket_id, id = comment.id, "added comment");
        Ok(comment)
    }

    /// Comments of a ticket, oldest first. Fails if the ticket is missing so
    /// callers can tell "no comments" from "no such ticket".
    pub fn list_for(&self, ticket_id: i64) -> Result<Vec<Comment>> {
        let tx = self.conn.unchecked_transaction()?;
        if !ticket_exists(&tx, ticket_id)? {
            return Err(Error::ticket_not_found(ticket_id));
        }

        let comments = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {} FROM comments WHERE ticket_id = ?1 ORDER BY created_at, id",
                COMMENT_COLUMNS
            ))?;
            let rows = stmt.query_map([ticket_id], comment_from_row)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };
        tx.commit()?;

        tracing::debug!(ticket_id, count = comments.len(), "listed comments");
        Ok(comments)
    }
}
