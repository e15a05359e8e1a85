use anyhow::{bail, Result};

use crate::db::Database;

/// Author recorded for comments added from the command line.
pub const CLI_AUTHOR: &str = "user";

pub fn run(db: &Database, id: i64, message: &str) -> Result<()> {
    match db.add_comment(id, CLI_AUTHOR, message)? {
        Some(_) => println!("Added comment to ticket #{}.", id),
        None => bail!("Ticket #{} not found", id),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_comment_added_with_cli_author() {
        let db = setup_test_db();
        let t = db.create_ticket("/p", "T", "D", "medium", "").unwrap();

        run(&db, t.id, "progress note").unwrap();

        let comments = db.get_comments(t.id).unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author, "user");
        assert_eq!(comments[0].content, "progress note");
    }

    #[test]
    fn test_comment_missing_ticket() {
        let db = setup_test_db();
        let result = run(&db, 99999, "note");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
