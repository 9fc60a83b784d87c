use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Blocking message shown over the current screen until a key is pressed
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

impl Alert {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            title: "Notice".to_string(),
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
            is_error: true,
        }
    }
}

pub fn render_alert<B: Backend>(frame: &mut Frame<B>, alert: &Alert) {
    let area = centered_rect(60, 30, frame.size());
    let color = if alert.is_error { Color::Red } else { Color::Green };

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(alert.message.as_str()),
        Spans::from(""),
        Spans::from(Span::styled(
            "Press any key to continue",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(
                alert.title.as_str(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL),
    )
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

/// Yes/No confirmation popup
pub fn render_confirmation<B: Backend>(frame: &mut Frame<B>, title: &str, lines: &[&str]) {
    let area = centered_rect(50, 25, frame.size());

    let mut text = vec![Spans::from("")];
    for line in lines {
        text.push(Spans::from(*line));
        text.push(Spans::from(""));
    }
    text.push(Spans::from("<Y> Yes  <N> No"));

    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title).borders(Borders::ALL))
        .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui::{backend::TestBackend, Terminal};

    use crate::ui::buffer_text;

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(50, 20, area);

        assert_eq!(popup.width, 50);
        assert_eq!(popup.x, 25);
        assert!(popup.y + popup.height <= area.height);
    }

    #[test]
    fn alert_shows_message_and_hint() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let alert = Alert::error("Failed to delete project: boom");

        terminal.draw(|f| render_alert(f, &alert)).unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Failed to delete project: boom"));
        assert!(text.contains("Press any key to continue"));
        assert!(text.contains("Error"));
    }
}
