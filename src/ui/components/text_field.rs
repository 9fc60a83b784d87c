use crossterm::event::KeyCode;
use tui::{
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::ListItem,
};

/// Apply a key press to a text value. Returns true when the key was consumed.
pub fn edit_text(value: &mut String, key: KeyCode) -> bool {
    match key {
        KeyCode::Char(c) => {
            value.push(c);
            true
        }
        KeyCode::Backspace => {
            value.pop();
            true
        }
        _ => false,
    }
}

/// One `Label: value` row of a form, highlighted when focused and showing a
/// cursor while being edited
pub fn form_row<'a>(name: &'a str, value: &'a str, focused: bool, editing: bool) -> ListItem<'a> {
    let content = if focused && editing {
        Spans::from(vec![
            Span::styled(format!("{}: ", name), Style::default().fg(Color::Yellow)),
            Span::styled(format!("{}|", value), Style::default().add_modifier(Modifier::BOLD)),
        ])
    } else {
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Spans::from(vec![
            Span::styled(format!("{}: ", name), style),
            Span::raw(value),
        ])
    };

    ListItem::new(content)
}
