#![no_main]

//! Fuzz target for the ticket store.
//!
//! Drives create/update/search/comment/export with arbitrary Unicode and
//! checks that nothing panics, that search never returns a ticket missing
//! the query, and that every exported row parses back to its ticket.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tempfile::tempdir;

use tickets::{export, Database, NewTicket, Priority, Status, TicketFilter, TicketUpdate};

#[derive(Arbitrary, Debug)]
struct StoreInput {
    title: String,
    description: Option<String>,
    tags: Option<String>,
    status: u8,
    priority: u8,
    comment: String,
    query: String,
    /// Number of tickets to create
    num_tickets: u8,
}

fuzz_target!(|input: StoreInput| {
    let num_tickets = (input.num_tickets % 10).max(1);

    let dir = match tempdir() {
        Ok(d) => d,
        Err(_) => return,
    };
    let db = match Database::open(&dir.path().join("tickets.db")) {
        Ok(d) => d,
        Err(_) => return,
    };

    let status = Status::ALL[input.status as usize % Status::ALL.len()];
    let priority = Priority::ALL[input.priority as usize % Priority::ALL.len()];

    let mut created = Vec::new();
    for i in 0..num_tickets {
        let new = NewTicket {
            title: format!("{} {}", input.title, i),
            description: input.description.clone(),
            status,
            priority,
            assignee: None,
            tags: input.tags.clone(),
        };
        if let Ok(ticket) = db.tickets().create(new) {
            created.push(ticket);
        }
    }

    if let Some(first) = created.first() {
        let _ = db.tickets().update(
            first.id,
            TicketUpdate {
                title: Some(input.title.clone()),
                ..Default::default()
            },
        );
        let _ = db.comments().add(first.id, &input.comment);
        let _ = db.comments().list_for(first.id);
    }

    if let Ok(found) = db.tickets().search(&input.query) {
        let needle = input.query.trim().to_lowercase();
        for ticket in found {
            let haystack = [
                Some(ticket.title.as_str()),
                ticket.description.as_deref(),
                ticket.tags.as_deref(),
            ];
            assert!(haystack
                .into_iter()
                .flatten()
                .any(|f| f.to_lowercase().contains(&needle)));
        }
    }

    let tickets = db.tickets().list(&TicketFilter::default()).unwrap_or_default();
    if let Ok(bytes) = export::export_csv(&db, &TicketFilter::default()) {
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), tickets.len());
        for (row, ticket) in rows.iter().zip(&tickets) {
            assert_eq!(&row[1], ticket.title);
            assert_eq!(&row[2], ticket.description.as_deref().unwrap_or(""));
        }
    }
});
