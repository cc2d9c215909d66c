use anyhow::Result;

use tickets::{Database, NewTicket, Priority, Status};

pub fn run(
    db: &Database,
    title: &str,
    description: Option<&str>,
    status: &str,
    priority: &str,
    assignee: Option<&str>,
    tags: Option<&str>,
) -> Result<()> {
    let status: Status = status.parse()?;
    let priority: Priority = priority.parse()?;

    let new = NewTicket {
        title: title.to_string(),
        description: description.map(String::from),
        status,
        priority,
        assignee: assignee.map(String::from),
        tags: tags.map(String::from),
    };

    let ticket = db.tickets().create(new)?;
    println!("Created ticket #{}", ticket.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;
    use tickets::TicketFilter;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        (db, dir)
    }

    fn all_tickets(db: &Database) -> Vec<tickets::Ticket> {
        db.tickets().list(&TicketFilter::default()).unwrap()
    }

    #[test]
    fn test_create_minimal() {
        let (db, _dir) = setup_test_db();
        run(&db, "Printer jam", None, "open", "high", None, None).unwrap();

        let tickets = all_tickets(&db);
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].title, "Printer jam");
        assert_eq!(tickets[0].status, Status::Open);
        assert_eq!(tickets[0].priority, Priority::High);
        assert_eq!(tickets[0].assignee, None);
    }

    #[test]
    fn test_create_all_fields() {
        let (db, _dir) = setup_test_db();
        run(
            &db,
            "Badge reader",
            Some("Lobby door"),
            "in_progress",
            "urgent",
            Some("erin"),
            Some("facilities access"),
        )
        .unwrap();

        let ticket = &all_tickets(&db)[0];
        assert_eq!(ticket.description.as_deref(), Some("Lobby door"));
        assert_eq!(ticket.status, Status::InProgress);
        assert_eq!(ticket.assignee.as_deref(), Some("erin"));
        assert_eq!(ticket.tags.as_deref(), Some("facilities access"));
    }

    #[test]
    fn test_create_invalid_priority() {
        let (db, _dir) = setup_test_db();
        let result = run(&db, "Test", None, "open", "critical", None, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid priority"));
        assert!(all_tickets(&db).is_empty());
    }

    #[test]
    fn test_create_invalid_status() {
        let (db, _dir) = setup_test_db();
        let result = run(&db, "Test", None, "done", "medium", None, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid status"));
        assert!(all_tickets(&db).is_empty());
    }

    #[test]
    fn test_create_empty_title() {
        let (db, _dir) = setup_test_db();
        let result = run(&db, "", None, "open", "medium", None, None);
        assert!(result.is_err());
        assert!(all_tickets(&db).is_empty());
    }

    proptest! {
        #[test]
        fn prop_valid_values_accepted(
            status in "open|in_progress|closed",
            priority in "low|medium|high|urgent"
        ) {
            let (db, _dir) = setup_test_db();
            prop_assert!(run(&db, "Test", None, &status, &priority, None, None).is_ok());
            let ticket = &all_tickets(&db)[0];
            prop_assert_eq!(ticket.status.as_str(), status.as_str());
            prop_assert_eq!(ticket.priority.as_str(), priority.as_str());
        }

        #[test]
        fn prop_invalid_priority_rejected(
            priority in "[a-zA-Z]{1,10}"
                .prop_filter("Exclude valid priorities", |s| {
                    !["low", "medium", "high", "urgent"].contains(&s.as_str())
                })
        ) {
            let (db, _dir) = setup_test_db();
            prop_assert!(run(&db, "Test", None, "open", &priority, None, None).is_err());
            prop_assert!(all_tickets(&db).is_empty());
        }
    }
}
