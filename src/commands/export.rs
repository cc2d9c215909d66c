use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use tickets::{export, Database, TicketFilter};

pub fn run(db: &Database, filter: &TicketFilter, output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create export file {}", path.display()))?;
            let count = export::write_csv(db, filter, BufWriter::new(file))
                .context("Failed to write export file")?;
            eprintln!("Exported {} tickets to {}", count, path.display());
        }
        None => {
            export::write_csv(db, filter, io::stdout().lock())?;
        }
    }
    Ok(())
}
