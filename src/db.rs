use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::error::StoreError;
use crate::models::{validate_priority, validate_status, Comment, Ticket};

/// Timestamp layout used for every stored date. Lexicographic order on the
/// stored text matches chronological order, which the listing queries rely on.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Default priority ordering shared by list and search.
const PRIORITY_ORDER: &str =
    "CASE priority WHEN 'high' THEN 1 WHEN 'medium' THEN 2 ELSE 3 END, created_at DESC";

pub type Result<T> = std::result::Result<T, StoreError>;

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if absent) the ticket database at `path` and ensure the
    /// schema exists. Safe to call on every startup.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                priority TEXT NOT NULL DEFAULT 'medium',
                tags TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticket_id INTEGER NOT NULL,
                author TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_tickets_project ON tickets(project);
            CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
            CREATE INDEX IF NOT EXISTS idx_comments_ticket ON comments(ticket_id);
            "#,
        )?;

        // Required for the comment cascade on ticket deletion
        self.conn.execute_batch("PRAGMA foreign_keys = ON")?;

        Ok(())
    }

    // ==================== Ticket operations ====================

    pub fn create_ticket(
        &self,
        project: &str,
        title: &str,
        description: &str,
        priority: &str,
        tags: &str,
    ) -> Result<Ticket> {
        if !validate_priority(priority) {
            return Err(StoreError::InvalidPriority(priority.to_string()));
        }

        let now = now_stamp();
        self.conn.execute(
            "INSERT INTO tickets (project, title, description, status, priority, tags, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'pending', ?4, ?5, ?6, ?6)",
            params![project, title, description, priority, tags, now],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_ticket(id)?
            .ok_or(StoreError::Storage(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project, title, description, status, priority, tags, created_at, updated_at
             FROM tickets WHERE id = ?1",
        )?;

        let ticket = stmt.query_row([id], ticket_from_row).optional()?;
        Ok(ticket)
    }

    pub fn list_tickets(
        &self,
        project: Option<&str>,
        status: Option<&str>,
        priority: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Vec<Ticket>> {
        let mut sql = String::from(
            "SELECT id, project, title, description, status, priority, tags, created_at, updated_at
             FROM tickets",
        );
        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(project) = project {
            conditions.push("project = ?".to_string());
            params_vec.push(Box::new(project.to_string()));
        }

        if let Some(status) = status {
            if !validate_status(status) {
                return Err(StoreError::InvalidStatus(status.to_string()));
            }
            conditions.push("status = ?".to_string());
            params_vec.push(Box::new(status.to_string()));
        }

        if let Some(priority) = priority {
            if !validate_priority(priority) {
                return Err(StoreError::InvalidPriority(priority.to_string()));
            }
            conditions.push("priority = ?".to_string());
            params_vec.push(Box::new(priority.to_string()));
        }

        if let Some(tag) = tag {
            // Comma boundaries so "bug" matches "bug,urgent" but not "bugfix"
            conditions.push("(',' || tags || ',') LIKE ?".to_string());
            params_vec.push(Box::new(format!("%,{},%", tag)));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql.push_str(" ORDER BY ");
        sql.push_str(PRIORITY_ORDER);

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let tickets = stmt
            .query_map(params_refs.as_slice(), ticket_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tickets)
    }

    pub fn update_ticket(
        &self,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
        status: Option<&str>,
        priority: Option<&str>,
        tags: Option<&str>,
    ) -> Result<Option<Ticket>> {
        let existing = match self.get_ticket(id)? {
            Some(t) => t,
            None => return Ok(None),
        };

        // Validate everything before writing anything
        if let Some(s) = status {
            if !validate_status(s) {
                return Err(StoreError::InvalidStatus(s.to_string()));
            }
        }
        if let Some(p) = priority {
            if !validate_priority(p) {
                return Err(StoreError::InvalidPriority(p.to_string()));
            }
        }

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(t) = title {
            updates.push(format!("title = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(t.to_string()));
        }
        if let Some(d) = description {
            updates.push(format!("description = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(d.to_string()));
        }
        if let Some(s) = status {
            updates.push(format!("status = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(s.to_string()));
        }
        if let Some(p) = priority {
            updates.push(format!("priority = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(p.to_string()));
        }
        if let Some(t) = tags {
            updates.push(format!("tags = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(t.to_string()));
        }

        if updates.is_empty() {
            return Ok(Some(existing));
        }

        updates.push(format!("updated_at = ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(now_stamp()));
        params_vec.push(Box::new(id));

        let sql = format!(
            "UPDATE tickets SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len()
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        self.conn.execute(&sql, params_refs.as_slice())?;

        self.get_ticket(id)
    }

    /// Delete a ticket and, via the foreign key cascade, its comments.
    /// Returns true if a ticket existed.
    pub fn delete_ticket(&self, id: i64) -> Result<bool> {
        let rows = self.conn.execute("DELETE FROM tickets WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Match `query` as a substring of title, description, tags, or any
    /// comment's content. SQLite LIKE, so matching is case-insensitive for
    /// ASCII. A ticket matching through several comments appears once.
    pub fn search_tickets(
        &self,
        query: &str,
        project: Option<&str>,
        status: Option<&str>,
    ) -> Result<Vec<Ticket>> {
        let mut sql = String::from(
            "SELECT DISTINCT t.id, t.project, t.title, t.description, t.status, t.priority, t.tags, t.created_at, t.updated_at
             FROM tickets t
             LEFT JOIN comments c ON c.ticket_id = t.id
             WHERE (t.title LIKE ?1 OR t.description LIKE ?1 OR t.tags LIKE ?1 OR c.content LIKE ?1)",
        );
        let pattern = format!("%{}%", query);
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(pattern)];

        if let Some(project) = project {
            sql.push_str(&format!(" AND t.project = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(project.to_string()));
        }

        if let Some(status) = status {
            if !validate_status(status) {
                return Err(StoreError::InvalidStatus(status.to_string()));
            }
            sql.push_str(&format!(" AND t.status = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(status.to_string()));
        }

        sql.push_str(
            " ORDER BY CASE t.priority WHEN 'high' THEN 1 WHEN 'medium' THEN 2 ELSE 3 END, t.created_at DESC",
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let tickets = stmt
            .query_map(params_refs.as_slice(), ticket_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tickets)
    }

    // ==================== Comment operations ====================

    /// Add a comment and refresh the owning ticket's updated_at in one
    /// transaction. Returns None if the ticket does not exist.
    pub fn add_comment(&self, ticket_id: i64, author: &str, content: &str) -> Result<Option<Comment>> {
        if self.get_ticket(ticket_id)?.is_none() {
            return Ok(None);
        }

        let now = now_stamp();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO comments (ticket_id, author, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![ticket_id, author, content, now],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE tickets SET updated_at = ?1 WHERE id = ?2",
            params![now, ticket_id],
        )?;
        tx.commit()?;

        Ok(Some(Comment {
            id,
            ticket_id,
            author: author.to_string(),
            content: content.to_string(),
            created_at: parse_datetime(now),
        }))
    }

    pub fn get_comments(&self, ticket_id: i64) -> Result<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, ticket_id, author, content, created_at
             FROM comments WHERE ticket_id = ?1 ORDER BY created_at ASC",
        )?;

        let comments = stmt
            .query_map([ticket_id], |row| {
                Ok(Comment {
                    id: row.get(0)?,
                    ticket_id: row.get(1)?,
                    author: row.get(2)?,
                    content: row.get(3)?,
                    created_at: parse_datetime(row.get::<_, String>(4)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(comments)
    }
}

fn ticket_from_row(row: &Row) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        project: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        priority: row.get(5)?,
        tags: row.get(6)?,
        created_at: parse_datetime(row.get::<_, String>(7)?),
        updated_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

fn now_stamp() -> String {
    Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string()
}

fn parse_datetime(s: String) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| Local::now().naive_local())
}
