//! CSV export of tickets.
//!
//! Columns are fixed: `id, title, description, status, priority, assignee,
//! tags, created_at, updated_at`. Missing optional values become empty cells
//! and timestamps use the same RFC 3339 form as the database. Comments are
//! not exported.

use csv::Writer;
use std::io;

use crate::db::{format_timestamp, Database};
use crate::error::Result;
use crate::models::{Ticket, TicketFilter};

pub const COLUMNS: [&str; 9] = [
    "id",
    "title",
    "description",
    "status",
    "priority",
    "assignee",
    "tags",
    "created_at",
    "updated_at",
];

/// Render the tickets matching `filter` as CSV bytes.
pub fn export_csv(db: &Database, filter: &TicketFilter) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(db, filter, &mut buf)?;
    Ok(buf)
}

/// Stream the tickets matching `filter` as CSV into `out`. Returns the number
/// of ticket rows written.
pub fn write_csv<W: io::Write>(db: &Database, filter: &TicketFilter, out: W) -> Result<usize> {
    let tickets = db.tickets().list(filter)?;

    let mut writer = Writer::from_writer(out);
    writer.write_record(COLUMNS)?;
    for ticket in &tickets {
        writer.write_record(record(ticket))?;
    }
    writer.flush().map_err(csv::Error::from)?;

    tracing::info!(count = tickets.len(), "exported tickets to csv");
    Ok(tickets.len())
}

fn record(ticket: &Ticket) -> [String; 9] {
    [
        ticket.id.to_string(),
        ticket.title.clone(),
        ticket.description.clone().unwrap_or_default(),
        ticket.status.to_string(),
        ticket.priority.to_string(),
        ticket.assignee.clone().unwrap_or_default(),
        ticket.tags.clone().unwrap_or_default(),
        format_timestamp(&ticket.created_at),
        format_timestamp(&ticket.updated_at),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTicket, Priority, Status};
    use csv::ReaderBuilder;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        (db, dir)
    }

    fn parse(bytes: &[u8]) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes);
        let headers = reader
            .headers()
            .unwrap()
            .iter()
            .map(String::from)
            .collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        (headers, rows)
    }

    #[test]
    fn test_export_empty_database_has_header() {
        let (db, _dir) = setup_test_db();
        let text = String::from_utf8(export_csv(&db, &TicketFilter::default()).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec!["id,title,description,status,priority,assignee,tags,created_at,updated_at"]
        );
    }

    #[test]
    fn test_export_roundtrip_with_quoting() {
        let (db, _dir) = setup_test_db();
        let tricky = db
            .tickets()
            .create(
                NewTicket::new("Quote \"this\"")
                    .description("First line, with comma\nsecond line")
                    .priority(Priority::Urgent)
                    .assignee("dave")
                    .tags("a,b c"),
            )
            .unwrap();
        let plain = db.tickets().create(NewTicket::new("Plain")).unwrap();

        let bytes = export_csv(&db, &TicketFilter::default()).unwrap();
        let (headers, rows) = parse(&bytes);
        assert_eq!(headers, COLUMNS.to_vec());
        assert_eq!(rows.len(), 2);

        for (row, ticket) in rows.iter().zip([&tricky, &plain]) {
            assert_eq!(row.as_slice(), record(ticket).as_slice());
            assert_eq!(row[0], ticket.id.to_string());
            assert_eq!(row[1], ticket.title);
            assert_eq!(row[2], ticket.description.clone().unwrap_or_default());
            assert_eq!(row[3], ticket.status.as_str());
            assert_eq!(row[4], ticket.priority.as_str());
        }
        assert_eq!(rows[0][2], "First line, with comma\nsecond line");
        assert_eq!(rows[1][5], "");
    }

    #[test]
    fn test_export_applies_filter() {
        let (db, _dir) = setup_test_db();
        db.tickets().create(NewTicket::new("open one")).unwrap();
        let closed = db
            .tickets()
            .create(NewTicket::new("closed one").status(Status::Closed))
            .unwrap();

        let bytes = export_csv(&db, &TicketFilter::default().status(Status::Closed)).unwrap();
        let (_, rows) = parse(&bytes);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], closed.id.to_string());
    }

    #[test]
    fn test_export_timestamps_parse_back() {
        let (db, _dir) = setup_test_db();
        let ticket = db.tickets().create(NewTicket::new("When")).unwrap();
        let (_, rows) = parse(&export_csv(&db, &TicketFilter::default()).unwrap());
        let created = chrono::DateTime::parse_from_rfc3339(&rows[0][7]).unwrap();
        assert_eq!(created, ticket.created_at);
    }

    #[test]
    fn test_write_csv_counts_rows() {
        let (db, _dir) = setup_test_db();
        for title in ["a", "b", "c"] {
            db.tickets().create(NewTicket::new(title)).unwrap();
        }
        let mut out = Vec::new();
        let count = write_csv(&db, &TicketFilter::default(), &mut out).unwrap();
        assert_eq!(count, 3);
        assert_eq!(out, export_csv(&db, &TicketFilter::default()).unwrap());
    }

    #[test]
    fn test_export_excludes_comments() {
        let (db, _dir) = setup_test_db();
        let ticket = db.tickets().create(NewTicket::new("Commented")).unwrap();
        db.comments().add(ticket.id, "secret note").unwrap();
        let text = String::from_utf8(export_csv(&db, &TicketFilter::default()).unwrap()).unwrap();
        assert!(!text.contains("secret note"));
    }

    proptest! {
        #[test]
        fn prop_description_survives_export(desc in "[a-zA-Z0-9 ,\"\\n\\r]{1,60}") {
            let (db, _dir) = setup_test_db();
            let ticket = db
                .tickets()
                .create(NewTicket::new("Prop").description(desc))
                .unwrap();
            let (_, rows) = parse(&export_csv(&db, &TicketFilter::default()).unwrap());
            prop_assert_eq!(rows.len(), 1);
            prop_assert_eq!(&rows[0][2], &ticket.description.unwrap_or_default());
        }
    }
}
