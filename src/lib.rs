//! A lean project-scoped ticket tracker.
//!
//! All persistent state lives in a single SQLite database; three front-ends
//! (CLI, terminal UI, MCP server) share the [`db::Database`] store.

pub mod commands;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod project;
pub mod tui;
