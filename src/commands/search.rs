use anyhow::Result;

use tickets::Database;

use crate::commands::list::print_tickets;

pub fn run(db: &Database, query: &str, json: bool) -> Result<()> {
    let tickets = db.tickets().search(query)?;
    print_tickets(&tickets, json)
}
