use std::path::PathBuf;

use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{Project, ProjectDraft, ProjectStatus};
use crate::photos::describe_source;
use crate::ui::components::text_field::{edit_text, form_row};

pub enum PropertyWizardAction {
    Cancel,
    Save(ProjectDraft),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum PropertyField {
    Name,
    Location,
    Status,
    Description,
    Photos,
    NewImages,
}

impl PropertyField {
    const ORDER: [PropertyField; 6] = [
        PropertyField::Name,
        PropertyField::Location,
        PropertyField::Status,
        PropertyField::Description,
        PropertyField::Photos,
        PropertyField::NewImages,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    /// Fields edited as free text
    fn is_text(self) -> bool {
        matches!(
            self,
            PropertyField::Name
                | PropertyField::Location
                | PropertyField::Description
                | PropertyField::NewImages
        )
    }
}

pub struct PropertyWizardState {
    pub draft: ProjectDraft,
    pub current_field: PropertyField,
    pub editing: bool,
    /// Comma-separated image file paths
    pub new_images: String,
    pub photo_cursor: usize,
    pub validation_error: Option<String>,
}

impl PropertyWizardState {
    pub fn new(status: ProjectStatus) -> Self {
        Self {
            draft: ProjectDraft::new(status),
            current_field: PropertyField::Name,
            editing: false,
            new_images: String::new(),
            photo_cursor: 0,
            validation_error: None,
        }
    }

    pub fn from_existing(project: &Project) -> Self {
        Self {
            draft: ProjectDraft::from_project(project),
            current_field: PropertyField::Name,
            editing: false,
            new_images: String::new(),
            photo_cursor: 0,
            validation_error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.draft.is_update() {
            "Edit Project"
        } else {
            "Add New Project"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.draft.is_update() {
            "Update Project"
        } else {
            "Add Project"
        }
    }

    pub fn toggle_editing(&mut self) {
        if self.current_field.is_text() {
            self.editing = !self.editing;
        }
    }

    pub fn next_field(&mut self) {
        let next = (self.current_field.position() + 1) % PropertyField::ORDER.len();
        self.current_field = PropertyField::ORDER[next];
    }

    pub fn previous_field(&mut self) {
        let len = PropertyField::ORDER.len();
        let previous = (self.current_field.position() + len - 1) % len;
        self.current_field = PropertyField::ORDER[previous];
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let value = match self.current_field {
            PropertyField::Name => &mut self.draft.name,
            PropertyField::Location => &mut self.draft.location,
            PropertyField::Description => &mut self.draft.description,
            PropertyField::NewImages => &mut self.new_images,
            PropertyField::Status | PropertyField::Photos => return,
        };
        edit_text(value, key);
    }

    /// Left/Right on the non-text fields
    pub fn adjust_current_field(&mut self, forward: bool) {
        match self.current_field {
            PropertyField::Status => {
                self.draft.status = if forward {
                    self.draft.status.next()
                } else {
                    self.draft.status.previous()
                };
            }
            PropertyField::Photos => {
                let len = self.draft.existing_photos.len();
                if len > 0 {
                    self.photo_cursor = if forward {
                        (self.photo_cursor + 1) % len
                    } else {
                        (self.photo_cursor + len - 1) % len
                    };
                }
            }
            _ => {}
        }
    }

    /// Drop the highlighted existing photo from the record
    pub fn remove_selected_photo(&mut self) {
        if self.current_field != PropertyField::Photos {
            return;
        }
        if self.photo_cursor < self.draft.existing_photos.len() {
            self.draft.existing_photos.remove(self.photo_cursor);
        }
        if self.photo_cursor >= self.draft.existing_photos.len() {
            self.photo_cursor = self.draft.existing_photos.len().saturating_sub(1);
        }
    }

    pub fn new_image_paths(&self) -> Vec<PathBuf> {
        self.new_images
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.draft.name.trim().is_empty() {
            return Err("Project name is required".to_string());
        }
        if self.draft.location.trim().is_empty() {
            return Err("Location is required".to_string());
        }
        if let Some(missing) = self.new_image_paths().iter().find(|p| !p.is_file()) {
            return Err(format!("Image file not found: {}", missing.display()));
        }
        Ok(())
    }

    /// The draft to submit, with the picked image files attached
    pub fn submit(&mut self) -> Option<ProjectDraft> {
        match self.validate() {
            Ok(()) => {
                self.validation_error = None;
                let mut draft = self.draft.clone();
                draft.new_files = self.new_image_paths();
                Some(draft)
            }
            Err(message) => {
                self.validation_error = Some(message);
                None
            }
        }
    }
}

pub fn render_property_wizard<B: Backend>(f: &mut Frame<B>, state: &PropertyWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(8),
                Constraint::Min(4),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new(state.title())
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);
    render_photos(f, state, chunks[2]);

    let help_text = if let Some(error) = &state.validation_error {
        Spans::from(Span::styled(error.as_str(), Style::default().fg(Color::Red)))
    } else if state.editing {
        Spans::from("Enter - Save field | Esc - Cancel editing")
    } else {
        Spans::from(format!(
            "Enter - Edit field | Up/Down - Navigate | Left/Right - Change | X - Remove photo | S - {} | Esc - Cancel",
            state.submit_label()
        ))
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &PropertyWizardState, area: Rect) {
    let photos_summary = format!("{} kept (Left/Right to browse)", state.draft.existing_photos.len());
    let status = format!("< {} >", state.draft.status);

    let rows: [(&str, &str, PropertyField); 6] = [
        ("Name", state.draft.name.as_str(), PropertyField::Name),
        ("Location", state.draft.location.as_str(), PropertyField::Location),
        ("Status", status.as_str(), PropertyField::Status),
        ("Description", state.draft.description.as_str(), PropertyField::Description),
        ("Photos", photos_summary.as_str(), PropertyField::Photos),
        ("New images (comma-separated paths)", state.new_images.as_str(), PropertyField::NewImages),
    ];

    let items: Vec<ListItem> = rows
        .iter()
        .map(|(name, value, field)| {
            let focused = *field == state.current_field;
            form_row(name, value, focused, focused && state.editing)
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Project Details"));
    f.render_widget(form_list, area);
}

fn render_photos<B: Backend>(f: &mut Frame<B>, state: &PropertyWizardState, area: Rect) {
    let items: Vec<ListItem> = if state.draft.existing_photos.is_empty() {
        vec![ListItem::new("No photos")]
    } else {
        state
            .draft
            .existing_photos
            .iter()
            .enumerate()
            .map(|(i, src)| {
                let selected = state.current_field == PropertyField::Photos && i == state.photo_cursor;
                let style = if selected {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Span::styled(format!("{}. {}", i + 1, describe_source(src)), style))
            })
            .collect()
    };

    let title = if state.new_image_paths().is_empty() {
        "Current Photos".to_string()
    } else {
        "Current Photos (replaced by new images on save)".to_string()
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

pub fn handle_input(state: &mut PropertyWizardState, key: KeyCode) -> Option<PropertyWizardAction> {
    if state.editing {
        match key {
            KeyCode::Esc | KeyCode::Enter => state.toggle_editing(),
            other => state.edit_current_field(other),
        }
        return None;
    }

    match key {
        KeyCode::Esc => return Some(PropertyWizardAction::Cancel),
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up => state.previous_field(),
        KeyCode::Down | KeyCode::Tab => state.next_field(),
        KeyCode::Left => state.adjust_current_field(false),
        KeyCode::Right => state.adjust_current_field(true),
        KeyCode::Char('x') => state.remove_selected_photo(),
        KeyCode::Char('s') => {
            if let Some(draft) = state.submit() {
                return Some(PropertyWizardAction::Save(draft));
            }
        }
        _ => {}
    }
    None
}
