use anyhow::Result;

use crate::commands::format_ticket_line;
use crate::db::Database;

pub fn run(db: &Database, query: &str, project: Option<&str>, status: Option<&str>) -> Result<()> {
    let tickets = db.search_tickets(query, project, status)?;

    if tickets.is_empty() {
        println!("No tickets matching '{}'.", query);
        return Ok(());
    }

    let show_project = project.is_none();
    for ticket in &tickets {
        println!("{}", format_ticket_line(ticket, show_project));
    }
    println!("{} result(s)", tickets.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_search_no_results() {
        let db = setup_test_db();
        assert!(run(&db, "nothing", None, None).is_ok());
    }

    #[test]
    fn test_search_finds_comment_text() {
        let db = setup_test_db();
        let t = db.create_ticket("/p", "T", "D", "medium", "").unwrap();
        db.add_comment(t.id, "user", "mentions needle here").unwrap();

        assert!(run(&db, "needle", None, None).is_ok());
        let got = db.search_tickets("needle", None, None).unwrap();
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn test_search_invalid_status() {
        let db = setup_test_db();
        assert!(run(&db, "x", None, Some("done")).is_err());
    }
}
