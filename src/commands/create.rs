use anyhow::Result;

use crate::db::Database;

pub fn run(
    db: &Database,
    project: &str,
    title: &str,
    description: &str,
    priority: &str,
    tags: &str,
) -> Result<()> {
    let ticket = db.create_ticket(project, title, description, priority, tags)?;
    println!("Created ticket #{}: {}", ticket.id, ticket.title);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn setup_test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_create_defaults() {
        let db = setup_test_db();
        run(&db, "/p", "First ticket", "Something to do", "medium", "").unwrap();

        let tickets = db.list_tickets(None, None, None, None).unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].status, "pending");
        assert_eq!(tickets[0].priority, "medium");
    }

    #[test]
    fn test_create_invalid_priority_fails() {
        let db = setup_test_db();
        let result = run(&db, "/p", "T", "D", "urgent", "");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid priority"));
    }

    proptest! {
        #[test]
        fn prop_create_any_valid_priority(priority in "high|medium|low") {
            let db = setup_test_db();
            prop_assert!(run(&db, "/p", "T", "D", &priority, "").is_ok());
        }
    }
}
