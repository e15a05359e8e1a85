use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::TableState;

use crate::db::Database;
use crate::error::StoreError;
use crate::models::{Comment, Ticket, VALID_PRIORITIES, VALID_STATUSES};

/// Author recorded for comments added from the terminal UI.
const TUI_AUTHOR: &str = "user";

pub enum View {
    List,
    Detail {
        ticket: Ticket,
        comments: Vec<Comment>,
    },
}

/// Input form shared by the create and edit modals.
pub struct TicketForm {
    pub title: String,
    pub description: String,
    pub priority_idx: usize,
    pub tags: String,
    pub focus: usize,
}

impl TicketForm {
    const FIELDS: usize = 4;

    fn empty() -> Self {
        TicketForm {
            title: String::new(),
            description: String::new(),
            priority_idx: 1, // medium
            tags: String::new(),
            focus: 0,
        }
    }

    fn from_ticket(ticket: &Ticket) -> Self {
        TicketForm {
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            priority_idx: VALID_PRIORITIES
                .iter()
                .position(|p| *p == ticket.priority)
                .unwrap_or(1),
            tags: ticket.tags.clone(),
            focus: 0,
        }
    }

    pub fn priority(&self) -> &'static str {
        VALID_PRIORITIES[self.priority_idx]
    }

    /// Returns true when the key was consumed by the form.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % Self::FIELDS;
                true
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + Self::FIELDS - 1) % Self::FIELDS;
                true
            }
            KeyCode::Left if self.focus == 2 => {
                self.priority_idx =
                    (self.priority_idx + VALID_PRIORITIES.len() - 1) % VALID_PRIORITIES.len();
                true
            }
            KeyCode::Right if self.focus == 2 => {
                self.priority_idx = (self.priority_idx + 1) % VALID_PRIORITIES.len();
                true
            }
            KeyCode::Char(c) if self.focus != 2 => {
                self.active_field_mut().push(c);
                true
            }
            KeyCode::Backspace if self.focus != 2 => {
                self.active_field_mut().pop();
                true
            }
            _ => false,
        }
    }

    fn active_field_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.title,
            1 => &mut self.description,
            _ => &mut self.tags,
        }
    }
}

pub enum Modal {
    Create(TicketForm),
    Edit { id: i64, form: TicketForm },
    Status { ticket_id: i64, selected: usize },
    Comment { ticket_id: i64, input: String },
    Search { input: String },
    ConfirmDelete { ticket_id: i64, title: String },
}

pub struct App {
    db: Database,
    project: String,
    pub tickets: Vec<Ticket>,
    pub table_state: TableState,
    pub show_all_projects: bool,
    pub search_query: Option<String>,
    pub status_filter: Option<&'static str>,
    pub priority_filter: Option<&'static str>,
    pub view: View,
    pub modal: Option<Modal>,
    pub notice: Option<String>,
    quit: bool,
}

impl App {
    pub fn new(db: Database, project: String) -> Self {
        App {
            db,
            project,
            tickets: Vec::new(),
            table_state: TableState::default(),
            show_all_projects: false,
            search_query: None,
            status_filter: None,
            priority_filter: None,
            view: View::List,
            modal: None,
            notice: None,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Re-query the ticket listing with the active filters, keeping the
    /// cursor on a valid row.
    pub fn refresh(&mut self) -> Result<()> {
        let project = if self.show_all_projects {
            None
        } else {
            Some(self.project.as_str())
        };

        self.tickets = match &self.search_query {
            Some(query) => self.db.search_tickets(query, project, self.status_filter)?,
            None => self.db.list_tickets(
                project,
                self.status_filter,
                self.priority_filter,
                None,
            )?,
        };

        if self.tickets.is_empty() {
            self.table_state.select(None);
        } else {
            let row = self
                .table_state
                .selected()
                .map_or(0, |i| i.min(self.tickets.len() - 1));
            self.table_state.select(Some(row));
        }

        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        self.notice = None;

        if self.modal.is_some() {
            return self.handle_modal_key(key);
        }

        match self.view {
            View::List => self.handle_list_key(key),
            View::Detail { .. } => self.handle_detail_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Enter => self.open_selected()?,
            KeyCode::Char('n') => self.modal = Some(Modal::Create(TicketForm::empty())),
            KeyCode::Char('r') => {
                self.refresh()?;
                self.notice = Some("Refreshed".to_string());
            }
            KeyCode::Char('a') => {
                self.show_all_projects = !self.show_all_projects;
                self.refresh()?;
            }
            KeyCode::Char('f') => {
                self.status_filter = cycle_filter(&VALID_STATUSES, self.status_filter);
                self.refresh()?;
            }
            KeyCode::Char('p') => {
                self.priority_filter = cycle_filter(&VALID_PRIORITIES, self.priority_filter);
                self.refresh()?;
            }
            KeyCode::Char('/') => {
                self.modal = Some(Modal::Search {
                    input: String::new(),
                })
            }
            KeyCode::Esc => {
                if self.search_query.take().is_some() {
                    self.refresh()?;
                    self.notice = Some("Search cleared".to_string());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Result<()> {
        let ticket_id = match &self.view {
            View::Detail { ticket, .. } => ticket.id,
            View::List => return Ok(()),
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.view = View::List;
                self.refresh()?;
            }
            KeyCode::Char('e') => {
                if let View::Detail { ticket, .. } = &self.view {
                    self.modal = Some(Modal::Edit {
                        id: ticket.id,
                        form: TicketForm::from_ticket(ticket),
                    });
                }
            }
            KeyCode::Char('s') => {
                let current = match &self.view {
                    View::Detail { ticket, .. } => VALID_STATUSES
                        .iter()
                        .position(|s| *s == ticket.status)
                        .unwrap_or(0),
                    View::List => 0,
                };
                self.modal = Some(Modal::Status {
                    ticket_id,
                    selected: current,
                });
            }
            KeyCode::Char('c') => {
                self.modal = Some(Modal::Comment {
                    ticket_id,
                    input: String::new(),
                })
            }
            KeyCode::Char('d') => {
                if let View::Detail { ticket, .. } = &self.view {
                    self.modal = Some(Modal::ConfirmDelete {
                        ticket_id,
                        title: ticket.title.clone(),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Esc {
            self.modal = None;
            return Ok(());
        }

        let modal = match self.modal.take() {
            Some(m) => m,
            None => return Ok(()),
        };

        match modal {
            Modal::Create(mut form) => {
                if key.code == KeyCode::Enter {
                    // Keep the form (and its contents) open on a rejected submit
                    if !self.submit_create(&form)? {
                        self.modal = Some(Modal::Create(form));
                    }
                } else {
                    form.handle_key(key);
                    self.modal = Some(Modal::Create(form));
                }
            }
            Modal::Edit { id, mut form } => {
                if key.code == KeyCode::Enter {
                    if !self.submit_edit(id, &form)? {
                        self.modal = Some(Modal::Edit { id, form });
                    }
                } else {
                    form.handle_key(key);
                    self.modal = Some(Modal::Edit { id, form });
                }
            }
            Modal::Status {
                ticket_id,
                mut selected,
            } => match key.code {
                KeyCode::Enter => self.submit_status(ticket_id, VALID_STATUSES[selected])?,
                KeyCode::Up | KeyCode::Char('k') => {
                    selected = (selected + VALID_STATUSES.len() - 1) % VALID_STATUSES.len();
                    self.modal = Some(Modal::Status {
                        ticket_id,
                        selected,
                    });
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    selected = (selected + 1) % VALID_STATUSES.len();
                    self.modal = Some(Modal::Status {
                        ticket_id,
                        selected,
                    });
                }
                _ => {
                    self.modal = Some(Modal::Status {
                        ticket_id,
                        selected,
                    })
                }
            },
            Modal::Comment {
                ticket_id,
                mut input,
            } => match key.code {
                KeyCode::Enter => self.submit_comment(ticket_id, input.trim())?,
                KeyCode::Char(c) => {
                    input.push(c);
                    self.modal = Some(Modal::Comment { ticket_id, input });
                }
                KeyCode::Backspace => {
                    input.pop();
                    self.modal = Some(Modal::Comment { ticket_id, input });
                }
                _ => self.modal = Some(Modal::Comment { ticket_id, input }),
            },
            Modal::Search { mut input } => match key.code {
                KeyCode::Enter => {
                    let query = input.trim().to_string();
                    if query.is_empty() {
                        self.notice = Some("Enter a search query".to_string());
                        self.modal = Some(Modal::Search { input });
                    } else {
                        self.search_query = Some(query);
                        self.refresh()?;
                    }
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    self.modal = Some(Modal::Search { input });
                }
                KeyCode::Backspace => {
                    input.pop();
                    self.modal = Some(Modal::Search { input });
                }
                _ => self.modal = Some(Modal::Search { input }),
            },
            Modal::ConfirmDelete { ticket_id, title } => match key.code {
                KeyCode::Enter | KeyCode::Char('y') => {
                    self.db.delete_ticket(ticket_id)?;
                    self.view = View::List;
                    self.refresh()?;
                    self.notice = Some(format!("Deleted ticket #{}", ticket_id));
                }
                KeyCode::Char('n') => {}
                _ => self.modal = Some(Modal::ConfirmDelete { ticket_id, title }),
            },
        }

        Ok(())
    }

    fn move_selection(&mut self, delta: i64) {
        if self.tickets.is_empty() {
            return;
        }
        let last = self.tickets.len() as i64 - 1;
        let current = self.table_state.selected().unwrap_or(0) as i64;
        let next = (current + delta).clamp(0, last);
        self.table_state.select(Some(next as usize));
    }

    fn open_selected(&mut self) -> Result<()> {
        let id = match self.table_state.selected() {
            Some(i) => self.tickets[i].id,
            None => return Ok(()),
        };
        self.open_detail(id)
    }

    fn open_detail(&mut self, id: i64) -> Result<()> {
        match self.db.get_ticket(id)? {
            Some(ticket) => {
                let comments = self.db.get_comments(id)?;
                self.view = View::Detail { ticket, comments };
            }
            None => self.notice = Some(format!("Ticket #{} not found", id)),
        }
        Ok(())
    }

    /// Ok(true) when the ticket was created and the modal may close.
    fn submit_create(&mut self, form: &TicketForm) -> Result<bool> {
        let title = form.title.trim();
        let description = form.description.trim();
        if title.is_empty() {
            self.notice = Some("Title is required".to_string());
            return Ok(false);
        }
        if description.is_empty() {
            self.notice = Some("Description is required".to_string());
            return Ok(false);
        }

        let project = self.project.clone();
        match self.db.create_ticket(
            &project,
            title,
            description,
            form.priority(),
            form.tags.trim(),
        ) {
            Ok(ticket) => {
                self.notice = Some(format!("Created ticket #{}", ticket.id));
                self.refresh()?;
                Ok(true)
            }
            Err(e) => {
                self.report_store_error(e)?;
                Ok(false)
            }
        }
    }

    fn submit_edit(&mut self, id: i64, form: &TicketForm) -> Result<bool> {
        let title = form.title.trim();
        if title.is_empty() {
            self.notice = Some("Title is required".to_string());
            return Ok(false);
        }

        let result = self.db.update_ticket(
            id,
            Some(title),
            Some(form.description.trim()),
            None,
            Some(form.priority()),
            Some(form.tags.trim()),
        );
        match result {
            Ok(Some(_)) => {
                self.notice = Some(format!("Updated ticket #{}", id));
                self.open_detail(id)?;
                Ok(true)
            }
            Ok(None) => {
                self.notice = Some(format!("Ticket #{} not found", id));
                Ok(true)
            }
            Err(e) => {
                self.report_store_error(e)?;
                Ok(false)
            }
        }
    }

    fn submit_status(&mut self, ticket_id: i64, status: &str) -> Result<()> {
        match self
            .db
            .update_ticket(ticket_id, None, None, Some(status), None, None)
        {
            Ok(Some(_)) => {
                self.notice = Some(format!("Status changed to {}", status));
                self.open_detail(ticket_id)?;
            }
            Ok(None) => self.notice = Some(format!("Ticket #{} not found", ticket_id)),
            Err(e) => self.report_store_error(e)?,
        }
        Ok(())
    }

    fn submit_comment(&mut self, ticket_id: i64, content: &str) -> Result<()> {
        if content.is_empty() {
            self.notice = Some("Comment cannot be empty".to_string());
            self.modal = Some(Modal::Comment {
                ticket_id,
                input: String::new(),
            });
            return Ok(());
        }

        match self.db.add_comment(ticket_id, TUI_AUTHOR, content)? {
            Some(_) => {
                self.notice = Some("Comment added".to_string());
                self.open_detail(ticket_id)?;
            }
            None => self.notice = Some(format!("Ticket #{} not found", ticket_id)),
        }
        Ok(())
    }

    /// Validation problems become a notice; storage failures abort the UI.
    fn report_store_error(&mut self, err: StoreError) -> Result<()> {
        if err.is_validation() {
            self.notice = Some(err.to_string());
            Ok(())
        } else {
            Err(err.into())
        }
    }
}

fn cycle_filter(
    values: &[&'static str],
    current: Option<&'static str>,
) -> Option<&'static str> {
    match current {
        None => Some(values[0]),
        Some(value) => {
            let idx = values.iter().position(|v| *v == value).unwrap_or(0);
            if idx + 1 < values.len() {
                Some(values[idx + 1])
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup_app() -> App {
        let db = Database::open_in_memory().unwrap();
        App::new(db, "/p".to_string())
    }

    #[test]
    fn test_cycle_filter_walks_and_wraps_to_none() {
        let mut current = None;
        let mut seen = Vec::new();
        for _ in 0..=VALID_STATUSES.len() {
            current = cycle_filter(&VALID_STATUSES, current);
            seen.push(current);
        }
        assert_eq!(seen[0], Some("pending"));
        assert_eq!(seen[VALID_STATUSES.len() - 1], Some("closed"));
        assert_eq!(seen[VALID_STATUSES.len()], None);
    }

    #[test]
    fn test_create_via_form() {
        let mut app = setup_app();
        app.handle_key(key(KeyCode::Char('n'))).unwrap();
        assert!(matches!(app.modal, Some(Modal::Create(_))));

        for c in "Fix it".chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        app.handle_key(key(KeyCode::Tab)).unwrap();
        for c in "Details".chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        app.handle_key(key(KeyCode::Enter)).unwrap();

        assert!(app.modal.is_none());
        assert_eq!(app.tickets.len(), 1);
        assert_eq!(app.tickets[0].title, "Fix it");
        assert_eq!(app.tickets[0].project, "/p");
    }

    #[test]
    fn test_create_requires_title() {
        let mut app = setup_app();
        app.handle_key(key(KeyCode::Char('n'))).unwrap();
        app.handle_key(key(KeyCode::Enter)).unwrap();

        assert_eq!(app.notice.as_deref(), Some("Title is required"));
        assert!(app.tickets.is_empty());
        // Form stays open so the input is not lost
        assert!(matches!(app.modal, Some(Modal::Create(_))));
    }

    #[test]
    fn test_all_projects_toggle_widens_listing() {
        let mut app = setup_app();
        app.db.create_ticket("/p", "mine", "D", "medium", "").unwrap();
        app.db.create_ticket("/other", "theirs", "D", "medium", "").unwrap();

        app.refresh().unwrap();
        assert_eq!(app.tickets.len(), 1);

        app.handle_key(key(KeyCode::Char('a'))).unwrap();
        assert_eq!(app.tickets.len(), 2);
    }

    #[test]
    fn test_search_and_clear() {
        let mut app = setup_app();
        app.db.create_ticket("/p", "has needle", "D", "medium", "").unwrap();
        app.db.create_ticket("/p", "other", "D", "medium", "").unwrap();

        app.handle_key(key(KeyCode::Char('/'))).unwrap();
        for c in "needle".chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(app.tickets.len(), 1);

        app.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(app.search_query.is_none());
        assert_eq!(app.tickets.len(), 2);
    }

    #[test]
    fn test_detail_delete_returns_to_list() {
        let mut app = setup_app();
        let t = app.db.create_ticket("/p", "T", "D", "medium", "").unwrap();
        app.refresh().unwrap();

        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(app.view, View::Detail { .. }));

        app.handle_key(key(KeyCode::Char('d'))).unwrap();
        app.handle_key(key(KeyCode::Enter)).unwrap();

        assert!(matches!(app.view, View::List));
        assert!(app.db.get_ticket(t.id).unwrap().is_none());
    }

    #[test]
    fn test_status_modal_cycles_and_applies() {
        let mut app = setup_app();
        let t = app.db.create_ticket("/p", "T", "D", "medium", "").unwrap();
        app.refresh().unwrap();
        app.handle_key(key(KeyCode::Enter)).unwrap();

        app.handle_key(key(KeyCode::Char('s'))).unwrap();
        app.handle_key(key(KeyCode::Down)).unwrap();
        app.handle_key(key(KeyCode::Enter)).unwrap();

        let got = app.db.get_ticket(t.id).unwrap().unwrap();
        assert_eq!(got.status, "in_progress");
    }

    #[test]
    fn test_comment_from_detail() {
        let mut app = setup_app();
        let t = app.db.create_ticket("/p", "T", "D", "medium", "").unwrap();
        app.refresh().unwrap();
        app.handle_key(key(KeyCode::Enter)).unwrap();

        app.handle_key(key(KeyCode::Char('c'))).unwrap();
        for c in "note".chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        app.handle_key(key(KeyCode::Enter)).unwrap();

        let comments = app.db.get_comments(t.id).unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author, "user");
    }
}
