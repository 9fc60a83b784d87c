use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::catalog::Catalog;
use crate::models::ProjectStatus;
use crate::ui::{render_header, render_help, HeaderInfo, Page};

// Focus within the three recent-project panels
pub struct DashboardState {
    panel: usize,
    row: usize,
}

pub enum DashboardAction {
    Quit,
    Refresh,
    Navigate(Page),
    NewProject(ProjectStatus),
    EditProject(String), // Contains project id
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self { panel: 0, row: 0 }
    }

    pub fn panel_status(&self) -> ProjectStatus {
        ProjectStatus::ALL[self.panel].clone()
    }

    pub fn next_panel(&mut self) {
        self.panel = (self.panel + 1) % ProjectStatus::ALL.len();
        self.row = 0;
    }

    pub fn previous_panel(&mut self) {
        self.panel = (self.panel + ProjectStatus::ALL.len() - 1) % ProjectStatus::ALL.len();
        self.row = 0;
    }

    pub fn next_row(&mut self, len: usize) {
        if len > 0 {
            self.row = (self.row + 1) % len;
        }
    }

    pub fn previous_row(&mut self, len: usize) {
        if len > 0 {
            self.row = (self.row + len - 1) % len;
        }
    }

    pub fn selected_project_id(&self, catalog: &Catalog) -> Option<String> {
        catalog
            .recent(&self.panel_status())
            .get(self.row)
            .map(|p| p.id.clone())
    }
}

fn panel_title(status: &ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Ongoing => "Ongoing Projects",
        ProjectStatus::Upcoming => "Upcoming Projects",
        _ => "Finished Projects",
    }
}

pub fn render_dashboard<B: Backend>(
    frame: &mut Frame<B>,
    state: &DashboardState,
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

    render_header(frame, chunks[0], Page::Dashboard, header);
    render_stats(frame, chunks[1], catalog);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ].as_ref())
        .split(chunks[2]);

    for (i, status) in ProjectStatus::ALL.iter().enumerate() {
        let focused = i == state.panel;
        render_recent_panel(frame, columns[i], catalog, status, focused.then_some(state.row));
    }

    render_help(
        frame,
        chunks[3],
        "<Left/Right> Panel | <Up/Down> Select | <Enter> Edit | <N> New in panel | <R> Refresh | <Q> Quit",
    );
}

fn render_stats<B: Backend>(frame: &mut Frame<B>, area: Rect, catalog: &Catalog) {
    let counts = catalog.counts();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let stats = Paragraph::new(Spans::from(vec![
        Span::raw("Total Projects: "),
        Span::styled(counts.total.to_string(), bold),
        Span::raw("   Ongoing: "),
        Span::styled(counts.ongoing.to_string(), bold.fg(Color::Green)),
        Span::raw("   Upcoming: "),
        Span::styled(counts.upcoming.to_string(), bold.fg(Color::Blue)),
        Span::raw("   Finished: "),
        Span::styled(counts.finished.to_string(), bold.fg(Color::Gray)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Overview"));

    frame.render_widget(stats, area);
}

fn render_recent_panel<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    catalog: &Catalog,
    status: &ProjectStatus,
    selected: Option<usize>,
) {
    let recent = catalog.recent(status);
    let label = status.as_str().to_lowercase();

    let items: Vec<ListItem> = if recent.is_empty() {
        vec![ListItem::new(vec![
            Spans::from(Span::styled(
                format!("No {} projects yet", label),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Spans::from(format!("Add your first {} project", label)),
        ])]
    } else {
        recent
            .iter()
            .enumerate()
            .map(|(i, project)| {
                let style = if selected == Some(i) {
                    Style::default().bg(Color::Blue).fg(Color::White)
                } else {
                    Style::default()
                };
                ListItem::new(vec![
                    Spans::from(Span::styled(
                        project.name.clone(),
                        style.add_modifier(Modifier::BOLD),
                    )),
                    Spans::from(Span::styled(project.location.clone(), style)),
                ])
            })
            .collect()
    };

    let border_style = if selected.is_some() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let list = List::new(items).block(
        Block::default()
            .title(panel_title(status))
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(list, area);
}

pub fn handle_input(state: &mut DashboardState, key: KeyCode, catalog: &Catalog) -> Option<DashboardAction> {
    let recent_len = catalog.recent(&state.panel_status()).len();

    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(DashboardAction::Quit),
        KeyCode::Char('r') => return Some(DashboardAction::Refresh),
        KeyCode::Char('2') => return Some(DashboardAction::Navigate(Page::Properties)),
        KeyCode::Char('3') => return Some(DashboardAction::Navigate(Page::Settings)),
        KeyCode::Char('n') => {
            return Some(DashboardAction::NewProject(state.panel_status()));
        }
        KeyCode::Right | KeyCode::Tab => state.next_panel(),
        KeyCode::Left | KeyCode::BackTab => state.previous_panel(),
        KeyCode::Down => state.next_row(recent_len),
        KeyCode::Up => state.previous_row(recent_len),
        KeyCode::Enter => {
            if let Some(id) = state.selected_project_id(catalog) {
                return Some(DashboardAction::EditProject(id));
            }
        }
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui::{backend::TestBackend, Terminal};

    use crate::ui::buffer_text;
    use crate::ui::fixtures::project;

    fn header() -> HeaderInfo<'static> {
        HeaderInfo {
            company: "GreenEstate Pro",
            today: "Friday, October 16, 2026",
            loading: false,
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            project("1", "Palm Residency", "Banani", "Ongoing", &[]),
            project("2", "Lake View", "Gulshan", "Ongoing", &[]),
            project("3", "Green Tower", "Dhanmondi", "Upcoming", &[]),
        ])
    }

    #[test]
    fn renders_counts_recent_items_and_placeholders() {
        let mut terminal = Terminal::new(TestBackend::new(140, 24)).unwrap();
        let catalog = catalog();

        terminal
            .draw(|f| render_dashboard(f, &DashboardState::new(), &catalog, &header()))
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Total Projects: 3"));
        assert!(text.contains("Friday, October 16, 2026"));
        assert!(text.contains("Lake View"));
        assert!(text.contains("Green Tower"));
        assert!(text.contains("No finished projects yet"));
        assert!(text.contains("Add your first finished project"));
    }

    #[test]
    fn enter_opens_newest_project_of_focused_panel() {
        let catalog = catalog();
        let mut state = DashboardState::new();

        match handle_input(&mut state, KeyCode::Enter, &catalog) {
            Some(DashboardAction::EditProject(id)) => assert_eq!(id, "2"),
            _ => panic!("expected edit action"),
        }

        handle_input(&mut state, KeyCode::Down, &catalog);
        match handle_input(&mut state, KeyCode::Enter, &catalog) {
            Some(DashboardAction::EditProject(id)) => assert_eq!(id, "1"),
            _ => panic!("expected edit action"),
        }
    }

    #[test]
    fn new_project_presets_panel_status() {
        let catalog = catalog();
        let mut state = DashboardState::new();

        handle_input(&mut state, KeyCode::Right, &catalog);
        handle_input(&mut state, KeyCode::Right, &catalog);
        match handle_input(&mut state, KeyCode::Char('n'), &catalog) {
            Some(DashboardAction::NewProject(status)) => assert_eq!(status, ProjectStatus::Finished),
            _ => panic!("expected new project action"),
        }

        assert!(handle_input(&mut state, KeyCode::Enter, &catalog).is_none());
    }
}
