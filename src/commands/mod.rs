pub mod comment;
pub mod create;
pub mod delete;
pub mod edit;
pub mod list;
pub mod search;
pub mod show;
pub mod status;

/// Render a table row for list/search output. Shared so the two listings
/// stay visually identical.
pub(crate) fn format_ticket_line(
    ticket: &crate::models::Ticket,
    show_project: bool,
) -> String {
    let tags = if ticket.tags.is_empty() { "-" } else { &ticket.tags };
    let mut line = format!(
        "#{:<4} {:<14} {:<8} {:<40} {}",
        ticket.id,
        format!("[{}]", ticket.status),
        ticket.priority,
        truncate(&ticket.title, 40),
        tags
    );
    if show_project {
        line.push_str("  ");
        line.push_str(crate::project::project_basename(&ticket.project));
    }
    line
}

pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}
