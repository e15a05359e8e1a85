use anyhow::{bail, Result};

use crate::db::Database;
use crate::project::project_basename;

pub fn run(db: &Database, id: i64) -> Result<()> {
    let ticket = match db.get_ticket(id)? {
        Some(t) => t,
        None => bail!("Ticket #{} not found", id),
    };

    println!("Ticket #{}: {}", ticket.id, ticket.title);
    println!("Status: {}", ticket.status);
    println!("Priority: {}", ticket.priority);
    println!(
        "Tags: {}",
        if ticket.tags.is_empty() { "none" } else { &ticket.tags }
    );
    println!("Project: {}", project_basename(&ticket.project));
    println!("Created: {}", ticket.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Updated: {}", ticket.updated_at.format("%Y-%m-%d %H:%M:%S"));

    println!("\nDescription:");
    if ticket.description.is_empty() {
        println!("  (none)");
    } else {
        for line in ticket.description.lines() {
            println!("  {}", line);
        }
    }

    let comments = db.get_comments(id)?;
    if comments.is_empty() {
        println!("\nNo comments.");
    } else {
        println!("\nComments ({}):", comments.len());
        for comment in comments {
            println!(
                "  [{}] {}: {}",
                comment.author,
                comment.created_at.format("%Y-%m-%d %H:%M"),
                comment.content
            );
        }
    }

    Ok(())
}
