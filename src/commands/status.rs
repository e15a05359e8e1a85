use anyhow::{bail, Result};

use crate::db::Database;

pub fn run(db: &Database, id: i64, new_status: &str) -> Result<()> {
    match db.update_ticket(id, None, None, Some(new_status), None, None)? {
        Some(_) => println!("Ticket #{} status changed to {}", id, new_status),
        None => bail!("Ticket #{} not found", id),
    }

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
    fn test_status_change() {
        let db = setup_test_db();
        let t = db.create_ticket("/p", "T", "D", "medium", "").unwrap();

        run(&db, t.id, "in_progress").unwrap();

        let got = db.get_ticket(t.id).unwrap().unwrap();
        assert_eq!(got.status, "in_progress");
    }

    #[test]
    fn test_status_invalid_value() {
        let db = setup_test_db();
        let t = db.create_ticket("/p", "T", "D", "medium", "").unwrap();

        let result = run(&db, t.id, "done");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid status"));
    }

    #[test]
    fn test_status_missing_ticket() {
        let db = setup_test_db();
        let result = run(&db, 99999, "closed");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    proptest! {
        #[test]
        fn prop_status_any_valid(status in "pending|in_progress|ready_to_test|closed") {
            let db = setup_test_db();
            let t = db.create_ticket("/p", "T", "D", "medium", "").unwrap();

            run(&db, t.id, &status).unwrap();

            let got = db.get_ticket(t.id).unwrap().unwrap();
            prop_assert_eq!(got.status, status);
        }
    }
}
