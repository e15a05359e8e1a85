use anyhow::{bail, Result};
use std::io::{self, Write};

use crate::db::Database;

pub fn run(db: &Database, id: i64, yes: bool) -> Result<()> {
    let ticket = match db.get_ticket(id)? {
        Some(t) => t,
        None => bail!("Ticket #{} not found", id),
    };

    if !yes {
        print!("Delete ticket #{} \"{}\"? [y/N] ", id, ticket.title);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if db.delete_ticket(id)? {
        println!("Deleted ticket #{}.", id);
    } else {
        bail!("Failed to delete ticket #{}", id);
    }

    Ok(())
}

/// Internal function for testing without stdin interaction
#[cfg(test)]
pub fn run_force(db: &Database, id: i64) -> Result<()> {
    run(db, id, true)
}
