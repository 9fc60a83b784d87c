mod project;
mod settings;

pub use project::{ApiProject, Project, ProjectDraft, ProjectPayload, ProjectStatus};
pub use settings::Settings;
