use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment override for the project identifier, set by automation
/// front-ends that run outside the project's working directory.
pub const PROJECT_ENV: &str = "TICKETS_PROJECT";

/// The project a ticket belongs to is the absolute path of the directory it
/// was created from, or an explicit override.
pub fn current_project(explicit: Option<&str>) -> Result<String> {
    if let Some(p) = explicit {
        return Ok(p.to_string());
    }
    if let Ok(p) = env::var(PROJECT_ENV) {
        if !p.is_empty() {
            return Ok(p);
        }
    }
    let cwd = env::current_dir().context("Failed to determine working directory")?;
    Ok(cwd.to_string_lossy().into_owned())
}

/// Default database location: ~/.tickets/tickets.db. A relative fallback is
/// used only when no home directory can be resolved.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".tickets").join("tickets.db"))
        .unwrap_or_else(|| PathBuf::from(".tickets/tickets.db"))
}

/// Make sure the database's parent directory exists before first open.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Short display name for a project path: its final component.
pub fn project_basename(project: &str) -> &str {
    project
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(project)
}
