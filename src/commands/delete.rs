use anyhow::Result;
use std::io::{self, Write};

use tickets::Database;

pub fn run(db: &Database, id: i64, force: bool) -> Result<()> {
    // Fails with "not found" before prompting.
    let ticket = db.tickets().get(id)?;

    if !force {
        print!("Delete ticket #{} \"{}\" and its comments? [y/N] ", id, ticket.title);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    db.tickets().delete(id)?;
    println!("Deleted ticket #{}", id);
    Ok(())
}
