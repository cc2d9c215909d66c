mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use tickets::Database;

use commands::update::UpdateArgs;

#[derive(Parser)]
#[command(name = "tickets")]
#[command(about = "A small ticket tracker backed by a local SQLite file")]
#[command(version)]
struct Cli {
    /// Path to the ticket database
    #[arg(long, global = true, env = "TICKETS_DB", default_value = "tickets.db")]
    db: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database file and tables
    Init,

    /// Create a new ticket
    Create {
        /// Ticket title
        title: String,
        /// Ticket description
        #[arg(short, long)]
        description: Option<String>,
        /// Status (open, in_progress, closed)
        #[arg(short, long, default_value = "open")]
        status: String,
        /// Priority (low, medium, high, urgent)
        #[arg(short, long, default_value = "medium")]
        priority: String,
        /// Person responsible for the ticket
        #[arg(short, long)]
        assignee: Option<String>,
        /// Free-form labels, comma or space separated
        #[arg(short, long)]
        tags: Option<String>,
    },

    /// List tickets
    List {
        /// Filter by status
        #[arg(short, long)]
        status: Option<String>,
        /// Filter by priority
        #[arg(short, long)]
        priority: Option<String>,
        /// Filter by assignee (exact match)
        #[arg(short, long)]
        assignee: Option<String>,
        /// Sort open and urgent tickets first
        #[arg(long)]
        triage: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show ticket details and comments
    Show {
        /// Ticket ID
        id: i64,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Update a ticket
    Update {
        /// Ticket ID
        id: i64,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New status
        #[arg(short, long)]
        status: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<String>,
        /// New assignee
        #[arg(short, long, conflicts_with = "clear_assignee")]
        assignee: Option<String>,
        /// New tags
        #[arg(short, long, conflicts_with = "clear_tags")]
        tags: Option<String>,
        /// Remove the assignee
        #[arg(long)]
        clear_assignee: bool,
        /// Remove all tags
        #[arg(long)]
        clear_tags: bool,
    },

    /// Delete a ticket and its comments
    Delete {
        /// Ticket ID
        id: i64,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Add a comment to a ticket
    Comment {
        /// Ticket ID
        id: i64,
        /// Comment text
        text: String,
        /// Name of the commenter
        #[arg(long)]
        author: Option<String>,
    },

    /// Search title, description and tags
    Search {
        /// Text to look for (case-insensitive)
        query: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Export tickets as CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Filter by status
        #[arg(short, long)]
        status: Option<String>,
        /// Filter by priority
        #[arg(short, long)]
        priority: Option<String>,
        /// Filter by assignee (exact match)
        #[arg(short, long)]
        assignee: Option<String>,
    },
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn get_db(path: &Path) -> Result<Database> {
    Database::open(path).with_context(|| format!("Failed to open database {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    match cli.command {
        Commands::Init => commands::init::run(&cli.db),

        Commands::Create {
            title,
            description,
            status,
            priority,
            assignee,
            tags,
        } => {
            let db = get_db(&cli.db)?;
            commands::create::run(
                &db,
                &title,
                description.as_deref(),
                &status,
                &priority,
                assignee.as_deref(),
                tags.as_deref(),
            )
        }

        Commands::List {
            status,
            priority,
            assignee,
            triage,
            json,
        } => {
            let db = get_db(&cli.db)?;
            let filter = commands::list::build_filter(
                status.as_deref(),
                priority.as_deref(),
                assignee.as_deref(),
                triage,
            )?;
            commands::list::run(&db, &filter, json)
        }

        Commands::Show { id, json } => {
            let db = get_db(&cli.db)?;
            commands::show::run(&db, id, json)
        }

        Commands::Update {
            id,
            title,
            description,
            status,
            priority,
            assignee,
            tags,
            clear_assignee,
            clear_tags,
        } => {
            let db = get_db(&cli.db)?;
            commands::update::run(
                &db,
                id,
                UpdateArgs {
                    title: title.as_deref(),
                    description: description.as_deref(),
                    status: status.as_deref(),
                    priority: priority.as_deref(),
                    assignee: assignee.as_deref(),
                    tags: tags.as_deref(),
                    clear_assignee,
                    clear_tags,
                },
            )
        }

        Commands::Delete { id, force } => {
            let db = get_db(&cli.db)?;
            commands::delete::run(&db, id, force)
        }

        Commands::Comment { id, text, author } => {
            let db = get_db(&cli.db)?;
            commands::comment::run(&db, id, &text, author.as_deref())
        }

        Commands::Search { query, json } => {
            let db = get_db(&cli.db)?;
            commands::search::run(&db, &query, json)
        }

        Commands::Export {
            output,
            status,
            priority,
            assignee,
        } => {
            let db = get_db(&cli.db)?;
            let filter = commands::list::build_filter(
                status.as_deref(),
                priority.as_deref(),
                assignee.as_deref(),
                false,
            )?;
            commands::export::run(&db, &filter, output.as_deref())
        }
    }
}
