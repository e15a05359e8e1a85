use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use tickets::commands;
use tickets::db::Database;
use tickets::mcp;
use tickets::project;
use tickets::tui;

#[derive(Parser)]
#[command(name = "tickets")]
#[command(about = "A lean project-scoped ticket tracker")]
#[command(version)]
struct Cli {
    /// Path to the ticket database
    #[arg(long, global = true, env = "TICKETS_DB")]
    db: Option<PathBuf>,

    /// Project identifier (defaults to the current directory)
    #[arg(long, global = true, env = "TICKETS_PROJECT")]
    project: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tickets for the current project
    List {
        /// Filter by status (pending, in_progress, ready_to_test, closed)
        #[arg(short, long)]
        status: Option<String>,
        /// Filter by priority (high, medium, low)
        #[arg(short, long)]
        priority: Option<String>,
        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Show tickets from all projects
        #[arg(short, long)]
        all_projects: bool,
    },

    /// Show details of a ticket, including comments
    Show {
        /// Ticket ID
        id: i64,
    },

    /// Search tickets by title, description, tags, and comments
    Search {
        /// Text to search for
        query: String,
        /// Filter by status
        #[arg(short, long)]
        status: Option<String>,
        /// Search across all projects
        #[arg(short, long)]
        all_projects: bool,
    },

    /// Create a new ticket
    Create {
        /// Ticket title
        title: String,
        /// Ticket description
        description: String,
        /// Priority (high, medium, low)
        #[arg(short, long, default_value = "medium")]
        priority: String,
        /// Comma-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,
    },

    /// Edit a ticket's fields
    Edit {
        /// Ticket ID
        id: i64,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<String>,
        /// New tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,
    },

    /// Change a ticket's status
    Status {
        /// Ticket ID
        id: i64,
        /// New status (pending, in_progress, ready_to_test, closed)
        new_status: String,
    },

    /// Delete a ticket and its comments
    Delete {
        /// Ticket ID
        id: i64,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Add a comment to a ticket
    Comment {
        /// Ticket ID
        id: i64,
        /// Comment text
        message: String,
    },

    /// Browse tickets in the terminal UI
    Tui,

    /// MCP server for automation tooling
    Mcp {
        #[command(subcommand)]
        action: McpCommands,
    },
}

#[derive(Subcommand)]
enum McpCommands {
    /// Run the stdio MCP server
    Serve,
}

fn open_db(cli: &Cli) -> Result<Database> {
    let path = cli.db.clone().unwrap_or_else(project::default_db_path);
    project::ensure_parent_dir(&path)?;
    Database::open(&path).with_context(|| format!("Failed to open database at {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = open_db(&cli)?;

    match &cli.command {
        Commands::List {
            status,
            priority,
            tag,
            all_projects,
        } => {
            let project = scoped_project(&cli, *all_projects)?;
            commands::list::run(
                &db,
                project.as_deref(),
                status.as_deref(),
                priority.as_deref(),
                tag.as_deref(),
            )
        }

        Commands::Show { id } => commands::show::run(&db, *id),

        Commands::Search {
            query,
            status,
            all_projects,
        } => {
            let project = scoped_project(&cli, *all_projects)?;
            commands::search::run(&db, query, project.as_deref(), status.as_deref())
        }

        Commands::Create {
            title,
            description,
            priority,
            tags,
        } => {
            let project = project::current_project(cli.project.as_deref())?;
            commands::create::run(&db, &project, title, description, priority, tags)
        }

        Commands::Edit {
            id,
            title,
            description,
            priority,
            tags,
        } => commands::edit::run(
            &db,
            *id,
            title.as_deref(),
            description.as_deref(),
            priority.as_deref(),
            tags.as_deref(),
        ),

        Commands::Status { id, new_status } => commands::status::run(&db, *id, new_status),

        Commands::Delete { id, yes } => commands::delete::run(&db, *id, *yes),

        Commands::Comment { id, message } => commands::comment::run(&db, *id, message),

        Commands::Tui => {
            let project = project::current_project(cli.project.as_deref())?;
            tui::run(db, project)
        }

        Commands::Mcp { action } => match action {
            McpCommands::Serve => {
                let project = project::current_project(cli.project.as_deref())?;
                mcp::serve(&db, &project)
            }
        },
    }
}

/// None means "all projects"; otherwise scope to the resolved project.
fn scoped_project(cli: &Cli, all_projects: bool) -> Result<Option<String>> {
    if all_projects {
        Ok(None)
    } else {
        project::current_project(cli.project.as_deref()).map(Some)
    }
}
