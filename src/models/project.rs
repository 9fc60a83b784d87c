use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::photos::clean_image_url;

/// Lifecycle label of a project. Labels match by exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectStatus {
    Ongoing,
    Upcoming,
    Finished,
    /// Any label outside the three known ones, kept verbatim
    Other(String),
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::Ongoing,
        ProjectStatus::Upcoming,
        ProjectStatus::Finished,
    ];

    pub fn from_label(label: &str) -> Self {
        match label {
            "Ongoing" => ProjectStatus::Ongoing,
            "Upcoming" => ProjectStatus::Upcoming,
            "Finished" => ProjectStatus::Finished,
            other => ProjectStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProjectStatus::Ongoing => "Ongoing",
            ProjectStatus::Upcoming => "Upcoming",
            ProjectStatus::Finished => "Finished",
            ProjectStatus::Other(label) => label,
        }
    }

    /// Next known status, used by the form's status selector
    pub fn next(&self) -> Self {
        match self {
            ProjectStatus::Ongoing => ProjectStatus::Upcoming,
            ProjectStatus::Upcoming => ProjectStatus::Finished,
            ProjectStatus::Finished | ProjectStatus::Other(_) => ProjectStatus::Ongoing,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            ProjectStatus::Ongoing | ProjectStatus::Other(_) => ProjectStatus::Finished,
            ProjectStatus::Upcoming => ProjectStatus::Ongoing,
            ProjectStatus::Finished => ProjectStatus::Upcoming,
        }
    }

    /// CSS class used by the HTML snapshot. Unknown labels style as finished.
    pub fn css_class(&self) -> &'static str {
        match self {
            ProjectStatus::Ongoing => "status-ongoing",
            ProjectStatus::Upcoming => "status-upcoming",
            ProjectStatus::Finished | ProjectStatus::Other(_) => "status-finished",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProjectStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProjectStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(ProjectStatus::from_label(&label))
    }
}

/// A real-estate listing as held by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// External database id, stringified
    pub id: String,
    pub name: String,
    pub location: String,
    pub status: ProjectStatus,
    pub description: String,
    /// URLs or `data:image/...;base64,` strings
    pub photos: Vec<String>,
    /// Set when the record was mapped, not authoritative
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn from_api(record: ApiProject, created_at: DateTime<Utc>) -> Option<Self> {
        let id = record.id?;
        let status = record.status.or(record.kind).unwrap_or_default();

        let photos = match record.photo {
            Some(PhotoField::One(url)) => vec![url],
            Some(PhotoField::Many(urls)) => urls.into_iter().flatten().collect(),
            None => Vec::new(),
        }
        .iter()
        .map(|url| clean_image_url(url))
        .filter(|url| !url.is_empty())
        .collect();

        Some(Self {
            id,
            name: record.project_name.unwrap_or_default(),
            location: record.location.unwrap_or_default(),
            status: ProjectStatus::from_label(&status),
            description: record.description.unwrap_or_default(),
            photos,
            created_at,
        })
    }
}

/// Photo field on the wire: a single string or a list of strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PhotoField {
    One(String),
    Many(Vec<Option<String>>),
}

/// Project record as returned by the listing webhook
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProject {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Older listings carry the status under `type`
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo: Option<PhotoField>,
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

/// Body sent to the create and update webhooks
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub id: i64,
    pub project_name: String,
    pub location: String,
    pub description: String,
    pub status: String,
    pub photo: Vec<String>,
}

impl ProjectPayload {
    pub fn from_draft(id: i64, draft: &ProjectDraft, photos: Vec<String>) -> Self {
        Self {
            id,
            project_name: draft.name.clone(),
            location: draft.location.clone(),
            description: draft.description.clone(),
            status: draft.status.as_str().to_string(),
            photo: photos,
        }
    }
}

/// Output of the project form
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    /// Set when editing an existing record
    pub id: Option<String>,
    pub name: String,
    pub location: String,
    pub status: ProjectStatus,
    pub description: String,
    /// Photos of the existing record the user kept
    pub existing_photos: Vec<String>,
    /// Image files picked in the form
    pub new_files: Vec<PathBuf>,
}

impl ProjectDraft {
    pub fn new(status: ProjectStatus) -> Self {
        Self {
            id: None,
            name: String::new(),
            location: String::new(),
            status,
            description: String::new(),
            existing_photos: Vec::new(),
            new_files: Vec::new(),
        }
    }

    pub fn from_project(project: &Project) -> Self {
        Self {
            id: Some(project.id.clone()),
            name: project.name.clone(),
            location: project.location.clone(),
            status: project.status.clone(),
            description: project.description.clone(),
            existing_photos: project.photos.clone(),
            new_files: Vec::new(),
        }
    }

    pub fn is_update(&self) -> bool {
        self.id.is_some()
    }
}
