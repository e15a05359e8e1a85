use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::models::{Comment, Ticket, VALID_STATUSES};
use crate::project::project_basename;

use super::app::{App, Modal, TicketForm, View};

pub fn render(frame: &mut Frame, app: &mut App) {
    if let View::Detail { ticket, comments } = &app.view {
        render_detail(frame, ticket, comments);
    } else {
        render_list(frame, app);
    }

    if let Some(modal) = &app.modal {
        render_modal(frame, modal);
    }
}

fn status_style(status: &str) -> Style {
    match status {
        "pending" => Style::default().fg(Color::Yellow),
        "in_progress" => Style::default().fg(Color::Blue),
        "ready_to_test" => Style::default().fg(Color::Magenta),
        "closed" => Style::default().fg(Color::Green),
        _ => Style::default(),
    }
}

fn priority_style(priority: &str) -> Style {
    match priority {
        "high" => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        "medium" => Style::default().fg(Color::Yellow),
        "low" => Style::default().fg(Color::DarkGray),
        _ => Style::default(),
    }
}

fn render_list(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Filter / scope bar
    let mut spans = vec![
        Span::raw(" status:"),
        Span::styled(
            app.status_filter.unwrap_or("all"),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  priority:"),
        Span::styled(
            app.priority_filter.unwrap_or("all"),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
    ];
    if let Some(query) = &app.search_query {
        spans.push(Span::styled(
            format!("Search: '{}' (Esc to clear)", query),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    } else if app.show_all_projects {
        spans.push(Span::styled(
            "All projects",
            Style::default().fg(Color::Cyan),
        ));
    } else {
        spans.push(Span::styled(
            format!("Project: {}", project_basename(app.project())),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    // Ticket table
    let header = Row::new(vec!["ID", "Title", "Status", "Priority", "Tags", "Updated"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .tickets
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(t.id.to_string()),
                Cell::from(t.title.clone()),
                Cell::from(Span::styled(t.status.clone(), status_style(&t.status))),
                Cell::from(Span::styled(t.priority.clone(), priority_style(&t.priority))),
                Cell::from(if t.tags.is_empty() {
                    "-".to_string()
                } else {
                    t.tags.clone()
                }),
                Cell::from(t.updated_at.format("%Y-%m-%d").to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(30),
            Constraint::Length(14),
            Constraint::Length(8),
            Constraint::Length(15),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Tickets ({}) ", app.tickets.len())),
    );
    frame.render_stateful_widget(table, chunks[1], &mut app.table_state);

    // Key hints / notice
    let footer = match &app.notice {
        Some(notice) => Line::from(Span::styled(
            format!(" {}", notice),
            Style::default().fg(Color::Green),
        )),
        None => Line::from(Span::styled(
            " enter:view  n:new  f:status  p:priority  a:all  /:search  r:refresh  q:quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(footer), chunks[2]);
}

fn render_detail(frame: &mut Frame, ticket: &Ticket, comments: &[Comment]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.area());

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("#{} ", ticket.id),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(ticket.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::default(),
        meta_line("Status", &ticket.status, status_style(&ticket.status)),
        meta_line("Priority", &ticket.priority, priority_style(&ticket.priority)),
        meta_line(
            "Tags",
            if ticket.tags.is_empty() { "-" } else { &ticket.tags },
            Style::default().fg(Color::Cyan),
        ),
        meta_line(
            "Project",
            project_basename(&ticket.project),
            Style::default(),
        ),
        meta_line(
            "Created",
            &ticket.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            Style::default(),
        ),
        meta_line(
            "Updated",
            &ticket.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            Style::default(),
        ),
        Line::default(),
        Line::from(Span::styled("Description:", Style::default().add_modifier(Modifier::BOLD))),
    ];

    for text in ticket.description.lines() {
        lines.push(Line::from(format!("  {}", text)));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("Comments ({}):", comments.len()),
        Style::default().add_modifier(Modifier::BOLD),
    )));

    if comments.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No comments yet.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for comment in comments {
        let author_style = if comment.author == "user" {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Blue)
        };
        lines.push(Line::from(vec![
            Span::styled(comment.author.clone(), author_style),
            Span::styled(
                format!(" {}", comment.created_at.format("%Y-%m-%d %H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.push(Line::from(format!("  {}", comment.content)));
    }

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Ticket "));
    frame.render_widget(body, chunks[0]);

    let footer = Line::from(Span::styled(
        " e:edit  s:status  c:comment  d:delete  esc:back",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(footer), chunks[1]);
}

fn meta_line<'a>(label: &'a str, value: &str, style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<9}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value.to_string(), style),
    ])
}

fn render_modal(frame: &mut Frame, modal: &Modal) {
    match modal {
        Modal::Create(form) => render_form(frame, "Create New Ticket", form),
        Modal::Edit { id, form } => {
            render_form(frame, &format!("Edit Ticket #{}", id), form)
        }
        Modal::Status { selected, .. } => render_status_picker(frame, *selected),
        Modal::Comment { input, .. } => {
            render_input(frame, "Add Comment", "Comment", input)
        }
        Modal::Search { input } => render_input(
            frame,
            "Search Tickets",
            "Across titles, descriptions, tags, and comments",
            input,
        ),
        Modal::ConfirmDelete { ticket_id, title } => {
            render_confirm_delete(frame, *ticket_id, title)
        }
    }
}

fn render_form(frame: &mut Frame, title: &str, form: &TicketForm) {
    let area = centered_rect(60, 12, frame.area());
    frame.render_widget(Clear, area);

    let field = |label: &str, value: &str, focused: bool| {
        let marker = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::raw(marker.to_string()),
            Span::styled(format!("{:<13}", label), Style::default().fg(Color::DarkGray)),
            Span::styled(value.to_string(), style),
        ])
    };

    let lines = vec![
        field("Title:", &form.title, form.focus == 0),
        field("Description:", &form.description, form.focus == 1),
        field(
            "Priority:",
            &format!("< {} >", form.priority()),
            form.focus == 2,
        ),
        field("Tags:", &form.tags, form.focus == 3),
        Line::default(),
        Line::from(Span::styled(
            "tab:next field  left/right:priority  enter:save  esc:cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_picker(frame: &mut Frame, selected: usize) {
    let area = centered_rect(40, VALID_STATUSES.len() as u16 + 4, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = Vec::new();
    for (i, status) in VALID_STATUSES.iter().enumerate() {
        let style = if i == selected {
            status_style(status).add_modifier(Modifier::REVERSED)
        } else {
            status_style(status)
        };
        lines.push(Line::from(Span::styled(format!("  {}", status), style)));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "up/down:select  enter:apply  esc:cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default().borders(Borders::ALL).title(" Change Status ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_input(frame: &mut Frame, title: &str, label: &str, input: &str) {
    let area = centered_rect(60, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(label.to_string(), Style::default().fg(Color::DarkGray))),
        Line::from(format!("{}_", input)),
        Line::default(),
        Line::from(Span::styled(
            "enter:submit  esc:cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_confirm_delete(frame: &mut Frame, ticket_id: i64, title: &str) {
    let area = centered_rect(60, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(format!("Delete ticket #{}: {}?", ticket_id, title)),
        Line::from(Span::styled(
            "This cannot be undone.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
        Line::from(Span::styled(
            "y/enter:delete  n/esc:cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            " Delete Ticket? ",
            Style::default().fg(Color::Red).bold(),
        ));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
