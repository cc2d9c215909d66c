use anyhow::Result;

use tickets::{Database, Priority, Status, Ticket, TicketFilter, TicketOrder};

pub fn build_filter(
    status: Option<&str>,
    priority: Option<&str>,
    assignee: Option<&str>,
    triage: bool,
) -> Result<TicketFilter> {
    Ok(TicketFilter {
        status: status.map(str::parse::<Status>).transpose()?,
        priority: priority.map(str::parse::<Priority>).transpose()?,
        assignee: assignee.map(String::from),
        order: if triage {
            TicketOrder::Triage
        } else {
            TicketOrder::Id
        },
    })
}

pub fn run(db: &Database, filter: &TicketFilter, json: bool) -> Result<()> {
    let tickets = db.tickets().list(filter)?;
    print_tickets(&tickets, json)
}

pub fn print_tickets(tickets: &[Ticket], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tickets)?);
        return Ok(());
    }

    if tickets.is_empty() {
        println!("No tickets found.");
        return Ok(());
    }

    for line in tickets.iter().map(format_row) {
        println!("{}", line);
    }

    Ok(())
}

fn format_row(ticket: &Ticket) -> String {
    let status_display = format!("[{}]", ticket.status);
    format!(
        "#{:<4} {:13} {:<40} {:7} {:<12} {}",
        ticket.id,
        status_display,
        truncate(&ticket.title, 40),
        ticket.priority,
        truncate(ticket.assignee.as_deref().unwrap_or("-"), 12),
        ticket.created_at.format("%Y-%m-%d")
    )
}

fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}
