//! MCP (Model Context Protocol) server front-end.
//!
//! Speaks line-delimited JSON-RPC 2.0 over stdio. Every store operation is
//! exposed as a tool whose result is flattened to human-readable text, so
//! automation clients get the same wording the CLI prints.

use anyhow::Result;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::debug;

use crate::db::Database;
use crate::models::{Ticket, VALID_PRIORITIES, VALID_STATUSES};

const PROTOCOL_VERSION: &str = "2024-11-05";

/// Author recorded for comments added through the MCP server.
pub const MCP_AUTHOR: &str = "agent";

/// Run the server until stdin closes. Responses go to stdout; stdout is
/// reserved for the protocol, so logging goes to stderr via tracing.
pub fn serve(db: &Database, project: &str) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "discarding unparseable request");
                let resp = error_response(Value::Null, -32700, "Parse error");
                writeln!(stdout, "{}", resp)?;
                stdout.flush()?;
                continue;
            }
        };

        if let Some(response) = handle_request(db, project, &request) {
            writeln!(stdout, "{}", response)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Dispatch one JSON-RPC message. Returns None for notifications (no id).
pub fn handle_request(db: &Database, project: &str, request: &Value) -> Option<Value> {
    let method = request.get("method").and_then(Value::as_str).unwrap_or("");
    let id = request.get("id").cloned();
    debug!(method, "mcp request");

    // Notifications get no response
    let id = id?;

    let response = match method {
        "initialize" => ok_response(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": "tickets",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        ),
        "tools/list" => ok_response(id, json!({ "tools": tool_definitions() })),
        "tools/call" => {
            let params = request.get("params").cloned().unwrap_or(Value::Null);
            let name = params.get("name").and_then(Value::as_str).unwrap_or("");
            let empty = json!({});
            let args = params.get("arguments").unwrap_or(&empty);

            match call_tool(db, project, name, args) {
                Ok(text) => ok_response(
                    id,
                    json!({ "content": [{ "type": "text", "text": text }] }),
                ),
                Err(e) => error_response(id, -32602, &e.to_string()),
            }
        }
        "ping" => ok_response(id, json!({})),
        _ => error_response(id, -32601, "Method not found"),
    };

    Some(response)
}

fn ok_response(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

fn tool_definitions() -> Vec<Value> {
    let status_desc = format!("Status, one of: {}", VALID_STATUSES.join(", "));
    let priority_desc = format!("Priority, one of: {}", VALID_PRIORITIES.join(", "));

    vec![
        json!({
            "name": "list_tickets",
            "description": "List tickets for the current project",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "status": { "type": "string", "description": status_desc },
                    "priority": { "type": "string", "description": priority_desc },
                    "tag": { "type": "string", "description": "Filter by tag" },
                },
            },
        }),
        json!({
            "name": "get_ticket",
            "description": "Get full details of a ticket including all comments",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "ticket_id": { "type": "integer", "description": "Ticket ID" },
                },
                "required": ["ticket_id"],
            },
        }),
        json!({
            "name": "create_ticket",
            "description": "Create a new ticket in the current project",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "Short title" },
                    "description": { "type": "string", "description": "Full description" },
                    "priority": { "type": "string", "description": priority_desc },
                    "tags": { "type": "string", "description": "Comma-separated tags" },
                },
                "required": ["title", "description"],
            },
        }),
        json!({
            "name": "update_ticket_status",
            "description": "Update the status of a ticket",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "ticket_id": { "type": "integer", "description": "Ticket ID" },
                    "status": { "type": "string", "description": status_desc },
                },
                "required": ["ticket_id", "status"],
            },
        }),
        json!({
            "name": "add_comment",
            "description": "Add a comment to a ticket",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "ticket_id": { "type": "integer", "description": "Ticket ID" },
                    "content": { "type": "string", "description": "Comment text" },
                },
                "required": ["ticket_id", "content"],
            },
        }),
        json!({
            "name": "search_tickets",
            "description": "Search tickets by title, description, tags, and comments",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Text to search for" },
                    "status": { "type": "string", "description": status_desc },
                },
                "required": ["query"],
            },
        }),
    ]
}

/// Run one tool. Validation and not-found outcomes come back as `Ok` text so
/// the client sees them as a normal tool result; only malformed requests and
/// storage failures become protocol errors.
fn call_tool(db: &Database, project: &str, name: &str, args: &Value) -> Result<String> {
    let text = match name {
        "list_tickets" => {
            let result = db.list_tickets(
                Some(project),
                opt_str(args, "status"),
                opt_str(args, "priority"),
                opt_str(args, "tag"),
            );
            match result {
                Ok(tickets) if tickets.is_empty() => "No tickets found for this project.".to_string(),
                Ok(tickets) => {
                    let mut lines = vec![format!("Found {} ticket(s):\n", tickets.len())];
                    lines.extend(tickets.iter().map(summary_line));
                    lines.join("\n")
                }
                Err(e) if e.is_validation() => format!("Error: {}", e),
                Err(e) => return Err(e.into()),
            }
        }

        "get_ticket" => {
            let ticket_id = req_i64(args, "ticket_id")?;
            match db.get_ticket(ticket_id)? {
                None => format!("Ticket #{} not found.", ticket_id),
                Some(t) => {
                    let mut lines = vec![
                        format!("Ticket #{}: {}", t.id, t.title),
                        format!("Status: {}", t.status),
                        format!("Priority: {}", t.priority),
                        format!("Tags: {}", if t.tags.is_empty() { "none" } else { &t.tags }),
                        format!("Project: {}", t.project),
                        format!("Created: {}", t.created_at.format("%Y-%m-%d %H:%M:%S")),
                        format!("Updated: {}", t.updated_at.format("%Y-%m-%d %H:%M:%S")),
                        String::new(),
                        "Description:".to_string(),
                        t.description.clone(),
                    ];

                    let comments = db.get_comments(ticket_id)?;
                    if !comments.is_empty() {
                        lines.push(String::new());
                        lines.push(format!("Comments ({}):", comments.len()));
                        for c in comments {
                            lines.push(format!(
                                "  [{}] {}: {}",
                                c.author,
                                c.created_at.format("%Y-%m-%d %H:%M:%S"),
                                c.content
                            ));
                        }
                    }
                    lines.join("\n")
                }
            }
        }

        "create_ticket" => {
            let title = req_str(args, "title")?;
            let description = req_str(args, "description")?;
            let priority = opt_str(args, "priority").unwrap_or("medium");
            let tags = opt_str(args, "tags").unwrap_or("");

            match db.create_ticket(project, title, description, priority, tags) {
                Ok(t) => format!("Created ticket #{}: {}", t.id, t.title),
                Err(e) if e.is_validation() => format!("Error: {}", e),
                Err(e) => return Err(e.into()),
            }
        }

        "update_ticket_status" => {
            let ticket_id = req_i64(args, "ticket_id")?;
            let status = req_str(args, "status")?;

            match db.update_ticket(ticket_id, None, None, Some(status), None, None) {
                Ok(Some(_)) => format!("Ticket #{} status updated to: {}", ticket_id, status),
                Ok(None) => format!("Ticket #{} not found.", ticket_id),
                Err(e) if e.is_validation() => format!("Error: {}", e),
                Err(e) => return Err(e.into()),
            }
        }

        "add_comment" => {
            let ticket_id = req_i64(args, "ticket_id")?;
            let content = req_str(args, "content")?;

            match db.add_comment(ticket_id, MCP_AUTHOR, content)? {
                Some(_) => format!("Added comment to ticket #{}.", ticket_id),
                None => format!("Ticket #{} not found.", ticket_id),
            }
        }

        "search_tickets" => {
            let query = req_str(args, "query")?;
            match db.search_tickets(query, Some(project), opt_str(args, "status")) {
                Ok(tickets) if tickets.is_empty() => format!("No tickets matching '{}'.", query),
                Ok(tickets) => {
                    let mut lines =
                        vec![format!("Found {} ticket(s) matching '{}':\n", tickets.len(), query)];
                    lines.extend(tickets.iter().map(summary_line));
                    lines.join("\n")
                }
                Err(e) if e.is_validation() => format!("Error: {}", e),
                Err(e) => return Err(e.into()),
            }
        }

        _ => anyhow::bail!("Unknown tool: {}", name),
    };

    Ok(text)
}

fn summary_line(t: &Ticket) -> String {
    let tags = if t.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", t.tags)
    };
    format!("#{} [{}] [{}]{} {}", t.id, t.status, t.priority, tags, t.title)
}

fn opt_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn req_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("Missing required argument: {}", key))
}

fn req_i64(args: &Value, key: &str) -> Result<i64> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| anyhow::anyhow!("Missing required argument: {}", key))
}
