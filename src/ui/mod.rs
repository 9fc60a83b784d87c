pub mod components;
pub mod dashboard;
pub mod properties;
pub mod property_wizard;
pub mod settings;

use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

/// Pages reachable from the navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Properties,
    Settings,
}

impl Page {
    const TITLES: [&'static str; 3] = ["1 Dashboard", "2 Projects", "3 Settings"];

    fn index(self) -> usize {
        match self {
            Page::Dashboard => 0,
            Page::Properties => 1,
            Page::Settings => 2,
        }
    }
}

/// What the navigation bar needs to know about the app
pub struct HeaderInfo<'a> {
    pub company: &'a str,
    pub today: &'a str,
    pub loading: bool,
}

/// Navigation bar with the company name, current date and fetch indicator
pub fn render_header<B: Backend>(frame: &mut Frame<B>, area: Rect, page: Page, info: &HeaderInfo) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(area);

    let titles = Page::TITLES.iter().map(|t| Spans::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(info.company))
        .select(page.index())
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[0]);

    let mut status = vec![Span::raw(info.today)];
    if info.loading {
        status.push(Span::styled(
            "  Loading projects...",
            Style::default().fg(Color::Yellow),
        ));
    }
    let date = Paragraph::new(Spans::from(status)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(date, chunks[1]);
}

/// Key hints along the bottom of a screen
pub fn render_help<B: Backend>(frame: &mut Frame<B>, area: Rect, text: &str) {
    let help = Paragraph::new(text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(help, area);
}

#[cfg(test)]
pub(crate) fn buffer_text(buffer: &tui::buffer::Buffer) -> String {
    let mut text = String::new();
    for y in buffer.area.top()..buffer.area.bottom() {
        for x in buffer.area.left()..buffer.area.right() {
            text.push_str(&buffer.get(x, y).symbol);
        }
        text.push('\n');
    }
    text
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;

    use crate::models::{Project, ProjectStatus};

    pub fn project(id: &str, name: &str, location: &str, status: &str, photos: &[&str]) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            location: location.to_string(),
            status: ProjectStatus::from_label(status),
            description: format!("About {}", name),
            photos: photos.iter().map(|p| p.to_string()).collect(),
            created_at: Utc::now(),
        }
    }
}
