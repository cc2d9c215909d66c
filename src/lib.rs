//! Ticket tracking on top of a single SQLite file.
//!
//! [`db::Database`] owns the connection and hands out short-lived
//! repository views: [`tickets::TicketRepository`] for ticket CRUD, filtering
//! and search, [`comments::CommentRepository`] for the append-only comment
//! log. [`export`] renders tickets as CSV.

pub mod comments;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod tickets;

pub use db::Database;
pub use error::{Error, Result};
pub use models::{
    Comment, NewTicket, Priority, Status, Ticket, TicketFilter, TicketOrder, TicketUpdate,
};
