//! Client for the webhook endpoints that back the catalog.

pub mod error;
pub mod fetch;

pub use error::{ApiError, Result};
pub use fetch::{FetchReport, ProjectFetcher, RetryPolicy, fetch_with_retry};

use std::path::Path;

use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::config::Config;
use crate::models::{ApiProject, Project, ProjectDraft, ProjectPayload};
use crate::photos::{mime_for_path, sha256_hex};

/// HTTP client for the list, create, update, delete and image webhooks
pub struct ApiClient {
    client: reqwest::Client,
    list_url: String,
    create_url: String,
    update_url: String,
    delete_url: String,
    image_base_url: String,
}

/// What a successful save did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            list_url: config.list_url.clone(),
            create_url: config.create_url.clone(),
            update_url: config.update_url.clone(),
            delete_url: config.delete_url.clone(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// One GET against the listing endpoint, mapped to projects
    pub async fn fetch_projects_once(&self) -> Result<Vec<Project>> {
        let resp = self.client.get(&self.list_url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: reason(status),
            });
        }

        let body: Value = resp.json().await?;
        Ok(map_listing(body, Utc::now()))
    }

    pub async fn create_project(&self, payload: &ProjectPayload) -> Result<Value> {
        self.post_json(&self.create_url, payload).await
    }

    pub async fn update_project(&self, payload: &ProjectPayload) -> Result<Value> {
        self.post_json(&self.update_url, payload).await
    }

    /// Create or update depending on whether the draft carries an id
    pub async fn save_project(&self, draft: &ProjectDraft, photos: Vec<String>) -> Result<SaveKind> {
        match &draft.id {
            Some(id) => {
                let numeric = id
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ApiError::InvalidId(id.clone()))?;
                let payload = ProjectPayload::from_draft(numeric, draft, photos);
                let response = self.update_project(&payload).await?;
                tracing::info!(id = numeric, %response, "Project updated");
                Ok(SaveKind::Updated)
            }
            None => {
                let new_id = Utc::now().timestamp_millis();
                let payload = ProjectPayload::from_draft(new_id, draft, photos);
                let response = self.create_project(&payload).await?;
                tracing::info!(id = new_id, %response, "Project added");
                Ok(SaveKind::Created)
            }
        }
    }

    pub async fn delete_project(&self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(ApiError::MissingId);
        }

        let mut url = parse_url(&self.delete_url)?;
        url.query_pairs_mut().append_pair("id", id);

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = if text.trim().is_empty() { reason(status) } else { text };
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!(id, "Project deleted");
        Ok(())
    }

    /// Push an image to the hosting webhook and return its public URL
    pub async fn upload_image(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin")
            .to_string();
        let hash = sha256_hex(&Utc::now().timestamp_millis().to_string());
        let file_name = format!("{}.{}", hash, ext);

        let part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(mime_for_path(path).as_ref())?;
        let form = Form::new().part("data", part);

        let mut url = parse_url(&format!("{}/webhook/postimage", self.image_base_url))?;
        url.query_pairs_mut()
            .append_pair("name", &hash)
            .append_pair("ext", &ext);

        let resp = self.client.post(url).multipart(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: format!("Image upload failed with status: {}", status.as_u16()),
            });
        }

        tracing::info!(file = %file_name, "Image uploaded");
        Ok(format!("{}/webhook/getimage?name={}", self.image_base_url, file_name))
    }

    async fn post_json(&self, url: &str, payload: &ProjectPayload) -> Result<Value> {
        let resp = self.client.post(url).json(payload).send().await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| reason(status));
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

/// Map a listing body to projects. Anything but an array is an empty list;
/// unusable elements are skipped.
pub fn map_listing(body: Value, created_at: DateTime<Utc>) -> Vec<Project> {
    let Value::Array(items) = body else {
        tracing::warn!("Listing response is not an array");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<ApiProject>(item) {
            Ok(record) => {
                let project = Project::from_api(record, created_at);
                if project.is_none() {
                    tracing::warn!("Skipping listing record without id");
                }
                project
            }
            Err(err) => {
                tracing::warn!(error = %err, "Skipping malformed listing record");
                None
            }
        })
        .collect()
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|err| ApiError::InvalidUrl(format!("{raw}: {err}")))
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown status")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::models::ProjectStatus;

    fn client_for(server: &MockServer) -> ApiClient {
        let uri = server.uri();
        let config = Config::from_pairs(vec![
            ("ESTATE_LIST_URL".to_string(), format!("{uri}/list")),
            ("ESTATE_CREATE_URL".to_string(), format!("{uri}/create")),
            ("ESTATE_UPDATE_URL".to_string(), format!("{uri}/update")),
            ("ESTATE_DELETE_URL".to_string(), format!("{uri}/delete")),
            ("ESTATE_IMAGE_BASE_URL".to_string(), format!("{uri}/")),
        ])
        .unwrap();
        ApiClient::new(&config).unwrap()
    }

    fn draft(id: Option<&str>) -> ProjectDraft {
        let mut draft = ProjectDraft::new(ProjectStatus::Ongoing);
        draft.id = id.map(str::to_string);
        draft.name = "Green Tower".to_string();
        draft.location = "Gulshan".to_string();
        draft
    }

    #[test]
    fn non_array_listing_is_empty() {
        assert!(map_listing(json!({"error": "nope"}), Utc::now()).is_empty());
        assert!(map_listing(Value::Null, Utc::now()).is_empty());
    }

    #[test]
    fn malformed_records_are_skipped() {
        let projects = map_listing(
            json!([
                {"id": 1, "projectName": "Kept", "status": "Ongoing"},
                {"id": 2, "projectName": 17},
                "not an object",
                {"projectName": "No id"}
            ]),
            Utc::now(),
        );

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Kept");
    }

    #[tokio::test]
    async fn fetches_and_maps_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 5, "projectName": "Palm", "location": "Banani", "status": "Finished", "photo": []}
            ])))
            .mount(&server)
            .await;

        let projects = client_for(&server).fetch_projects_once().await.unwrap();

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, "5");
        assert_eq!(projects[0].status, ProjectStatus::Finished);
    }

    #[tokio::test]
    async fn listing_http_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_projects_once().await.unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn update_sends_numeric_id_and_photos() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/update"))
            .and(body_json(json!({
                "id": 42,
                "projectName": "Green Tower",
                "location": "Gulshan",
                "description": "",
                "status": "Ongoing",
                "photo": ["https://img.example/a.png"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let kind = client_for(&server)
            .save_project(&draft(Some("42")), vec!["https://img.example/a.png".to_string()])
            .await
            .unwrap();

        assert_eq!(kind, SaveKind::Updated);
    }

    #[tokio::test]
    async fn create_failure_surfaces_message_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "name taken"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .save_project(&draft(None), Vec::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "API error: 400 - name taken");
    }

    #[tokio::test]
    async fn create_failure_without_body_uses_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .save_project(&draft(None), Vec::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "API error: 500 - Internal Server Error");
    }

    #[tokio::test]
    async fn update_rejects_non_numeric_id() {
        let server = MockServer::start().await;

        let err = client_for(&server)
            .save_project(&draft(Some("abc")), Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidId(id) if id == "abc"));
    }

    #[tokio::test]
    async fn delete_passes_id_as_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/delete"))
            .and(query_param("id", "17"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).delete_project("17").await.unwrap();
    }

    #[tokio::test]
    async fn delete_failure_uses_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/delete"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such row"))
            .mount(&server)
            .await;

        let err = client_for(&server).delete_project("9").await.unwrap_err();

        assert_eq!(err.to_string(), "API error: 404 - no such row");
    }

    #[tokio::test]
    async fn delete_without_id_sends_nothing() {
        let server = MockServer::start().await;

        let err = client_for(&server).delete_project("  ").await.unwrap_err();

        assert!(matches!(err, ApiError::MissingId));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_returns_public_image_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook/postimage"))
            .and(query_param("ext", "png"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"png bytes").unwrap();

        let url = client_for(&server).upload_image(file.path()).await.unwrap();

        let prefix = format!("{}/webhook/getimage?name=", server.uri());
        assert!(url.starts_with(&prefix), "{url}");
        let name = &url[prefix.len()..];
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 64 + ".png".len());
    }

    #[tokio::test]
    async fn upload_failure_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook/postimage"))
            .respond_with(ResponseTemplate::new(413))
            .mount(&server)
            .await;

        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(b"jpg bytes").unwrap();

        let err = client_for(&server).upload_image(file.path()).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "API error: 413 - Image upload failed with status: 413"
        );
    }
}
