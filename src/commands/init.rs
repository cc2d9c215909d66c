use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use tickets::Database;

pub fn run(db_path: &Path) -> Result<()> {
    let existed = db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    Database::open(db_path)
        .with_context(|| format!("Failed to initialize {}", db_path.display()))?;

    if existed {
        println!("Database already present at {}, schema verified", db_path.display());
    } else {
        println!("Created ticket database at {}", db_path.display());
        println!("\nNext steps:");
        println!("  tickets create \"Printer jam\" -p high   # Create a ticket");
        println!("  tickets list                           # See open work");
    }

    Ok(())
}
