use anyhow::Result;

use crate::commands::format_ticket_line;
use crate::db::Database;

pub fn run(
    db: &Database,
    project: Option<&str>,
    status: Option<&str>,
    priority: Option<&str>,
    tag: Option<&str>,
) -> Result<()> {
    let tickets = db.list_tickets(project, status, priority, tag)?;

    if tickets.is_empty() {
        println!("No tickets found.");
        return Ok(());
    }

    let show_project = project.is_none();
    for ticket in &tickets {
        println!("{}", format_ticket_line(ticket, show_project));
    }
    println!("{} ticket(s)", tickets.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_list_empty() {
        let db = setup_test_db();
        assert!(run(&db, None, None, None, None).is_ok());
    }

    #[test]
    fn test_list_invalid_status_filter() {
        let db = setup_test_db();
        let result = run(&db, None, Some("open"), None, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid status"));
    }

    #[test]
    fn test_list_scoped_to_project() {
        let db = setup_test_db();
        db.create_ticket("/a", "mine", "D", "medium", "").unwrap();
        db.create_ticket("/b", "other", "D", "medium", "").unwrap();

        assert!(run(&db, Some("/a"), None, None, None).is_ok());
        let got = db.list_tickets(Some("/a"), None, None, None).unwrap();
        assert_eq!(got.len(), 1);
    }
}
