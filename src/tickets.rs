use rusqlite::{params, Connection, OptionalExtension, ToSql};

use crate::db::{self, format_timestamp, ticket_from_row, TICKET_COLUMNS};
use crate::error::{Error, Result};
use crate::models::{NewTicket, Ticket, TicketFilter, TicketOrder, TicketUpdate};

const TRIAGE_ORDER: &str = r#"
    ORDER BY
        CASE status WHEN 'open' THEN 0 WHEN 'in_progress' THEN 1 ELSE 2 END,
        CASE priority WHEN 'urgent' THEN 0 WHEN 'high' THEN 1 WHEN 'medium' THEN 2 ELSE 3 END,
        created_at DESC,
        id DESC
"#;

/// CRUD and query operations over the `tickets` table.
pub struct TicketRepository<'a> {
    conn: &'a Connection,
}

impl<'a> TicketRepository<'a> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        TicketRepository { conn }
    }

    pub fn create(&self, new: NewTicket) -> Result<Ticket> {
        let title = required_title(&new.title)?;
        let now = format_timestamp(&db::now());

        let tx = db::write_transaction(self.conn)?;
        tx.execute(
            "INSERT INTO tickets (title, description, status, priority, assignee, tags, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                title,
                optional_text(new.description),
                new.status,
                new.priority,
                optional_text(new.assignee),
                optional_text(new.tags),
                now
            ],
        )?;
        let ticket = fetch(&tx, tx.last_insert_rowid())?;
        tx.commit()?;

        tracing::info!(id = ticket.id, status = %ticket.status, priority = %ticket.priority, "created ticket");
        Ok(ticket)
    }

    pub fn get(&self, id: i64) -> Result<Ticket> {
        fetch(self.conn, id)
    }

    /// Apply the supplied fields and bump `updated_at`. An empty update only
    /// bumps the timestamp.
    pub fn update(&self, id: i64, update: TicketUpdate) -> Result<Ticket> {
        if let Some(title) = &update.title {
            required_title(title)?;
        }

        let tx = db::write_transaction(self.conn)?;
        let mut ticket = fetch(&tx, id)?;
        update.apply(&mut ticket);

        // Never move backwards, even if the wall clock does.
        let updated_at = db::now().max(ticket.updated_at);

        tx.execute(
            "UPDATE tickets SET title = ?1, description = ?2, status = ?3, priority = ?4, assignee = ?5, tags = ?6, updated_at = ?7 WHERE id = ?8",
            params![
                ticket.title.trim(),
                optional_text(ticket.description),
                ticket.status,
                ticket.priority,
                optional_text(ticket.assignee),
                optional_text(ticket.tags),
                format_timestamp(&updated_at),
                id
            ],
        )?;
        let ticket = fetch(&tx, id)?;
        tx.commit()?;

        tracing::info!(id, "updated ticket");
        Ok(ticket)
    }

    pub fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let mut sql = format!("SELECT {} FROM tickets", TICKET_COLUMNS);
        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params_vec.push(Box::new(status));
        }

        if let Some(priority) = filter.priority {
            conditions.push("priority = ?");
            params_vec.push(Box::new(priority));
        }

        // Stored assignees are trimmed and never blank, so match the same way.
        if let Some(assignee) = optional_text(filter.assignee.clone()) {
            conditions.push("assignee = ?");
            params_vec.push(Box::new(assignee));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        match filter.order {
            TicketOrder::Id => sql.push_str(" ORDER BY id ASC"),
            TicketOrder::Triage => sql.push_str(TRIAGE_ORDER),
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let tickets = stmt
            .query_map(params_refs.as_slice(), ticket_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!(count = tickets.len(), ?filter, "listed tickets");
        Ok(tickets)
    }

    /// Case-insensitive substring search over title, description and tags.
    /// A blank query matches every ticket. Results keep `list` order.
    pub fn search(&self, query: &str) -> Result<Vec<Ticket>> {
        let mut tickets = self.list(&TicketFilter::default())?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(tickets);
        }

        tickets.retain(|t| {
            [Some(&t.title), t.description.as_ref(), t.tags.as_ref()]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
        });

        tracing::debug!(query, count = tickets.len(), "searched tickets");
        Ok(tickets)
    }

    /// Delete a ticket together with its comments.
    pub fn delete(&self, id: i64) -> Result<()> {
        let tx = db::write_transaction(self.conn)?;
        if !ticket_exists(&tx, id)? {
            return Err(Error::ticket_not_found(id));
        }

        // Explicit so the cascade holds even on connections without foreign_keys.
        let comments = tx.execute("DELETE FROM comments WHERE ticket_id = ?1", [id])?;
        tx.execute("DELETE FROM tickets WHERE id = ?1", [id])?;
        tx.commit()?;

        tracing::info!(id, comments, "deleted ticket");
        Ok(())
    }
}

pub(crate) fn ticket_exists(conn: &Connection, id: i64) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tickets WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn fetch(conn: &Connection, id: i64) -> Result<Ticket> {
    conn.query_row(
        &format!("SELECT {} FROM tickets WHERE id = ?1", TICKET_COLUMNS),
        [id],
        ticket_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::ticket_not_found(id))
}

fn required_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::invalid("title", "must not be empty"));
    }
    Ok(title)
}

/// Blank optional text is stored as NULL.
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
