use anyhow::Result;
use serde_json::json;

use tickets::Database;

pub fn run(db: &Database, id: i64, json: bool) -> Result<()> {
    let ticket = db.tickets().get(id)?;
    let comments = db.comments().list_for(id)?;

    if json {
        let out = json!({ "ticket": ticket, "comments": comments });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Ticket #{}: {}", ticket.id, ticket.title);
    println!("Status: {}", ticket.status);
    println!("Priority: {}", ticket.priority);
    println!("Assignee: {}", ticket.assignee.as_deref().unwrap_or("-"));
    if let Some(tags) = &ticket.tags {
        println!("Tags: {}", tags);
    }
    println!("Created: {}", ticket.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Updated: {}", ticket.updated_at.format("%Y-%m-%d %H:%M:%S"));

    if let Some(desc) = &ticket.description {
        println!("\nDescription:");
        for line in desc.lines() {
            println!("  {}", line);
        }
    }

    if comments.is_empty() {
        println!("\nNo comments yet.");
    } else {
        println!("\nComments:");
        for comment in comments {
            println!(
                "  [{}] {}: {}",
                comment.created_at.format("%Y-%m-%d %H:%M"),
                comment.author.as_deref().unwrap_or("Anonymous"),
                comment.body
            );
        }
    }

    Ok(())
}
