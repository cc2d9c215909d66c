use anyhow::Result;

use tickets::Database;

pub fn run(db: &Database, id: i64, text: &str, author: Option<&str>) -> Result<()> {
    let comment = db.comments().add_by(id, author, text)?;
    println!("Added comment #{} to ticket #{}", comment.id, id);
    Ok(())
}
