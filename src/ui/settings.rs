use std::path::PathBuf;

use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::models::Settings;
use crate::ui::components::popup::render_confirmation;
use crate::ui::components::text_field::{edit_text, form_row};
use crate::ui::{render_header, render_help, HeaderInfo, Page};

pub const DEFAULT_EXPORT_PATH: &str = "estate_admin_export.json";

pub enum SettingsAction {
    Save(Settings),
    Export(PathBuf),
    ClearData,
    Navigate(Page),
    Refresh,
    Quit,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SettingsField {
    CompanyName,
    ContactEmail,
    PhoneNumber,
    Address,
    ExportPath,
}

impl SettingsField {
    const ORDER: [SettingsField; 5] = [
        SettingsField::CompanyName,
        SettingsField::ContactEmail,
        SettingsField::PhoneNumber,
        SettingsField::Address,
        SettingsField::ExportPath,
    ];

    fn label(self) -> &'static str {
        match self {
            SettingsField::CompanyName => "Company Name",
            SettingsField::ContactEmail => "Contact Email",
            SettingsField::PhoneNumber => "Phone Number",
            SettingsField::Address => "Address",
            SettingsField::ExportPath => "Export file",
        }
    }
}

pub struct SettingsState {
    pub form: Settings,
    pub export_path: String,
    pub current_field: usize,
    pub editing: bool,
    pub show_clear_confirmation: bool,
}

impl SettingsState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            form: settings.clone(),
            export_path: DEFAULT_EXPORT_PATH.to_string(),
            current_field: 0,
            editing: false,
            show_clear_confirmation: false,
        }
    }

    /// Discard unsaved edits
    pub fn reset(&mut self, settings: &Settings) {
        self.form = settings.clone();
        self.editing = false;
        self.show_clear_confirmation = false;
    }

    pub fn field(&self) -> SettingsField {
        SettingsField::ORDER[self.current_field]
    }

    fn value(&self, field: SettingsField) -> &str {
        match field {
            SettingsField::CompanyName => &self.form.company_name,
            SettingsField::ContactEmail => &self.form.contact_email,
            SettingsField::PhoneNumber => &self.form.phone_number,
            SettingsField::Address => &self.form.address,
            SettingsField::ExportPath => &self.export_path,
        }
    }

    fn value_mut(&mut self, field: SettingsField) -> &mut String {
        match field {
            SettingsField::CompanyName => &mut self.form.company_name,
            SettingsField::ContactEmail => &mut self.form.contact_email,
            SettingsField::PhoneNumber => &mut self.form.phone_number,
            SettingsField::Address => &mut self.form.address,
            SettingsField::ExportPath => &mut self.export_path,
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % SettingsField::ORDER.len();
    }

    pub fn previous_field(&mut self) {
        let len = SettingsField::ORDER.len();
        self.current_field = (self.current_field + len - 1) % len;
    }
}

pub fn render_settings<B: Backend>(frame: &mut Frame<B>, state: &SettingsState, header: &HeaderInfo) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(7),
            Constraint::Length(3),
        ].as_ref())
        .split(frame.size());

    render_header(frame, chunks[0], Page::Settings, header);

    let items: Vec<ListItem> = SettingsField::ORDER
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let focused = i == state.current_field;
            form_row(field.label(), state.value(*field), focused, focused && state.editing)
        })
        .collect();

    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("Company Settings"));
    frame.render_widget(form, chunks[1]);

    let help = if state.editing {
        "<Enter> Done | <Esc> Done"
    } else {
        "<Up/Down> Field | <Enter> Edit | <S> Save | <X> Export JSON | <C> Clear all data | <Esc> Back | <Q> Quit"
    };
    render_help(frame, chunks[2], help);

    if state.show_clear_confirmation {
        render_confirmation(
            frame,
            "Clear All Data",
            &["Are you sure you want to clear all data?"],
        );
    }
}

pub fn handle_input(state: &mut SettingsState, key: KeyCode) -> Option<SettingsAction> {
    if state.show_clear_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.show_clear_confirmation = false;
                return Some(SettingsAction::ClearData);
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_clear_confirmation = false,
            _ => {}
        }
        return None;
    }

    if state.editing {
        match key {
            KeyCode::Enter | KeyCode::Esc => state.editing = false,
            other => {
                let field = state.field();
                edit_text(state.value_mut(field), other);
            }
        }
        return None;
    }

    match key {
        KeyCode::Char('q') => return Some(SettingsAction::Quit),
        KeyCode::Char('r') => return Some(SettingsAction::Refresh),
        KeyCode::Char('1') | KeyCode::Esc => return Some(SettingsAction::Navigate(Page::Dashboard)),
        KeyCode::Char('2') => return Some(SettingsAction::Navigate(Page::Properties)),
        KeyCode::Char('s') => return Some(SettingsAction::Save(state.form.clone())),
        KeyCode::Char('x') => {
            let path = state.export_path.trim();
            let path = if path.is_empty() { DEFAULT_EXPORT_PATH } else { path };
            return Some(SettingsAction::Export(PathBuf::from(path)));
        }
        KeyCode::Char('c') => state.show_clear_confirmation = true,
        KeyCode::Enter => state.editing = true,
        KeyCode::Down | KeyCode::Tab => state.next_field(),
        KeyCode::Up => state.previous_field(),
        _ => {}
    }
    None
}
