use anyhow::{bail, Result};

use crate::db::Database;

pub fn run(
    db: &Database,
    id: i64,
    title: Option<&str>,
    description: Option<&str>,
    priority: Option<&str>,
    tags: Option<&str>,
) -> Result<()> {
    if title.is_none() && description.is_none() && priority.is_none() && tags.is_none() {
        println!("No changes specified.");
        return Ok(());
    }

    match db.update_ticket(id, title, description, None, priority, tags)? {
        Some(_) => println!("Updated ticket #{}.", id),
        None => bail!("Ticket #{} not found", id),
    }

    Ok(())
}
