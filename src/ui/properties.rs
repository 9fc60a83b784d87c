use std::collections::HashMap;

use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::catalog::Catalog;
use crate::models::{Project, ProjectStatus};
use crate::photos::{card_image, cycle_index, describe_source};
use crate::ui::components::popup::render_confirmation;
use crate::ui::components::text_field::edit_text;
use crate::ui::{render_header, render_help, HeaderInfo, Page};

// Represents the state of the property list screen
pub struct PropertiesState {
    search: String,
    searching: bool,
    status_filter: Option<ProjectStatus>,
    list_state: ListState,
    // Current photo per project id
    photo_index: HashMap<String, usize>,
    // Project id awaiting delete confirmation
    pending_delete: Option<String>,
}

pub enum PropertyAction {
    Quit,
    Refresh,
    Navigate(Page),
    NewProject,
    EditProject(String),   // Contains project id
    DeleteProject(String), // Contains project id
}

impl Default for PropertiesState {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertiesState {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            search: String::new(),
            searching: false,
            status_filter: None,
            list_state,
            photo_index: HashMap::new(),
            pending_delete: None,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn status_filter(&self) -> Option<&ProjectStatus> {
        self.status_filter.as_ref()
    }

    /// All -> Ongoing -> Upcoming -> Finished -> All
    pub fn cycle_status_filter(&mut self) {
        self.status_filter = match &self.status_filter {
            None => Some(ProjectStatus::Ongoing),
            Some(ProjectStatus::Ongoing) => Some(ProjectStatus::Upcoming),
            Some(ProjectStatus::Upcoming) => Some(ProjectStatus::Finished),
            Some(_) => None,
        };
        self.list_state.select(Some(0));
    }

    pub fn visible<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Project> {
        catalog.filter(&self.search, self.status_filter.as_ref())
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => (i - 1).min(len - 1),
        };
        self.list_state.select(Some(i));
    }

    /// Keep the selection inside the list after the catalog changed
    fn clamp(&mut self, len: usize) {
        match self.list_state.selected() {
            Some(i) if len > 0 && i >= len => self.list_state.select(Some(len - 1)),
            None if len > 0 => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn selected_project<'a>(&self, catalog: &'a Catalog) -> Option<&'a Project> {
        let visible = self.visible(catalog);
        self.list_state.selected().and_then(|i| visible.get(i).copied())
    }

    pub fn photo_index(&self, project: &Project) -> usize {
        let index = self.photo_index.get(&project.id).copied().unwrap_or(0);
        if index < project.photos.len() { index } else { 0 }
    }

    /// Step the selected project's photo, wrapping at both ends
    pub fn navigate_photo(&mut self, catalog: &Catalog, direction: isize) {
        let Some(project) = self.selected_project(catalog) else {
            return;
        };
        if project.photos.len() < 2 {
            return;
        }
        let next = cycle_index(self.photo_index(project), direction, project.photos.len());
        self.photo_index.insert(project.id.clone(), next);
    }

    /// Ask to delete the selected project, remembering which one was asked about
    pub fn request_delete(&mut self, catalog: &Catalog) {
        self.pending_delete = self.selected_project(catalog).map(|p| p.id.clone());
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }
}

pub fn render_properties<B: Backend>(
    frame: &mut Frame<B>,
    state: &mut PropertiesState,
    catalog: &Catalog,
    header: &HeaderInfo,
) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    render_header(frame, chunks[0], Page::Properties, header);
    render_filters(frame, chunks[1], state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)].as_ref())
        .split(chunks[2]);

    let visible = state.visible(catalog);
    state.clamp(visible.len());

    if visible.is_empty() {
        let message = if catalog.is_empty() && header.loading {
            "Loading projects..."
        } else {
            "No projects found"
        };
        let empty = Paragraph::new(message)
            .block(Block::default().title("Projects").borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, chunks[2]);
    } else {
        let items: Vec<ListItem> = visible
            .iter()
            .map(|project| {
                ListItem::new(Spans::from(vec![
                    Span::styled(
                        format!("[{}] ", project.status),
                        Style::default().fg(status_color(&project.status)),
                    ),
                    Span::raw(project.name.as_str()),
                    Span::raw(" - "),
                    Span::raw(project.location.as_str()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("Projects ({})", visible.len()))
                    .borders(Borders::ALL),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_stateful_widget(list, body[0], &mut state.list_state);

        if let Some(project) = state.list_state.selected().and_then(|i| visible.get(i)) {
            render_card(frame, body[1], project, state.photo_index(project));
        }
    }

    let help = if state.searching {
        "Type to search | <Enter>/<Esc> Done"
    } else if state.selected_project(catalog).is_some() {
        "</> Search | <F> Status filter | <[/]> Photo | <N> New | <E> Edit | <D> Delete | <R> Refresh | <1> Dashboard"
    } else {
        "</> Search | <F> Status filter | <N> New | <R> Refresh | <1> Dashboard"
    };
    render_help(frame, chunks[3], help);

    if state.pending_delete.is_some() {
        render_confirmation(
            frame,
            "Confirm Delete",
            &["Are you sure you want to delete this project?"],
        );
    }
}

fn status_color(status: &ProjectStatus) -> Color {
    match status {
        ProjectStatus::Ongoing => Color::Green,
        ProjectStatus::Upcoming => Color::Blue,
        _ => Color::Gray,
    }
}

fn render_filters<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &PropertiesState) {
    let search_style = if state.searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let cursor = if state.searching { "|" } else { "" };
    let filter = state
        .status_filter
        .as_ref()
        .map(|s| s.as_str())
        .unwrap_or("All");

    let line = Paragraph::new(Spans::from(vec![
        Span::styled("Search: ", search_style),
        Span::raw(format!("{}{}", state.search, cursor)),
        Span::raw("    Status: "),
        Span::styled(filter, Style::default().add_modifier(Modifier::BOLD)),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(line, area);
}

fn render_card<B: Backend>(frame: &mut Frame<B>, area: Rect, project: &Project, photo_index: usize) {
    let photo_line = if project.photos.is_empty() {
        format!("Photo: {}", describe_source(&card_image(project)))
    } else {
        let src = project
            .photos
            .get(photo_index)
            .map(String::as_str)
            .unwrap_or_default();
        format!(
            "Photo {}/{}: {}",
            photo_index + 1,
            project.photos.len(),
            describe_source(src)
        )
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let text = vec![
        Spans::from(Span::styled(project.name.as_str(), bold)),
        Spans::from(vec![
            Span::raw("Status: "),
            Span::styled(
                project.status.as_str(),
                Style::default().fg(status_color(&project.status)),
            ),
        ]),
        Spans::from(format!("Location: {}", project.location)),
        Spans::from(""),
        Spans::from(project.description.as_str()),
        Spans::from(""),
        Spans::from(photo_line),
    ];

    let card = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Project").borders(Borders::ALL));
    frame.render_widget(card, area);
}

pub fn handle_input(state: &mut PropertiesState, key: KeyCode, catalog: &Catalog) -> Option<PropertyAction> {
    if state.searching {
        match key {
            KeyCode::Enter | KeyCode::Esc => state.searching = false,
            other => {
                if edit_text(&mut state.search, other) {
                    state.list_state.select(Some(0));
                }
            }
        }
        return None;
    }

    if state.pending_delete.is_some() {
        match key {
            KeyCode::Char('y') => {
                return state.pending_delete.take().map(PropertyAction::DeleteProject);
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                state.pending_delete = None;
            }
            _ => {}
        }
        return None;
    }

    let len = state.visible(catalog).len();
    match key {
        KeyCode::Char('q') => return Some(PropertyAction::Quit),
        KeyCode::Esc | KeyCode::Char('1') => return Some(PropertyAction::Navigate(Page::Dashboard)),
        KeyCode::Char('3') => return Some(PropertyAction::Navigate(Page::Settings)),
        KeyCode::Char('r') => return Some(PropertyAction::Refresh),
        KeyCode::Char('n') => return Some(PropertyAction::NewProject),
        KeyCode::Char('/') => state.searching = true,
        KeyCode::Char('f') => state.cycle_status_filter(),
        KeyCode::Char('[') | KeyCode::Left => state.navigate_photo(catalog, -1),
        KeyCode::Char(']') | KeyCode::Right => state.navigate_photo(catalog, 1),
        KeyCode::Down => state.next(len),
        KeyCode::Up => state.previous(len),
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(project) = state.selected_project(catalog) {
                return Some(PropertyAction::EditProject(project.id.clone()));
            }
        }
        KeyCode::Char('d') => state.request_delete(catalog),
        _ => {}
    }
    None
}
