use anyhow::{bail, Result};

use tickets::{Database, Priority, Status, TicketUpdate};

/// Field edits as given on the command line.
#[derive(Debug, Default)]
pub struct UpdateArgs<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub status: Option<&'a str>,
    pub priority: Option<&'a str>,
    pub assignee: Option<&'a str>,
    pub tags: Option<&'a str>,
    pub clear_assignee: bool,
    pub clear_tags: bool,
}

impl UpdateArgs<'_> {
    fn into_update(self) -> Result<TicketUpdate> {
        Ok(TicketUpdate {
            title: self.title.map(String::from),
            description: self.description.map(|d| Some(d.to_string())),
            status: self.status.map(str::parse::<Status>).transpose()?,
            priority: self.priority.map(str::parse::<Priority>).transpose()?,
            assignee: if self.clear_assignee {
                Some(None)
            } else {
                self.assignee.map(|a| Some(a.to_string()))
            },
            tags: if self.clear_tags {
                Some(None)
            } else {
                self.tags.map(|t| Some(t.to_string()))
            },
        })
    }
}

pub fn run(db: &Database, id: i64, args: UpdateArgs<'_>) -> Result<()> {
    let update = args.into_update()?;
    if update.is_empty() {
        bail!("Nothing to update. Use --title, --description, --status, --priority, --assignee or --tags");
    }

    let ticket = db.tickets().update(id, update)?;
    println!("Updated ticket #{}", ticket.id);
    Ok(())
}
