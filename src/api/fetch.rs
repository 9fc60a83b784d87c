//! Cancel-and-retry list fetch.
//!
//! A fetch makes up to `max_retries + 1` attempts with a fixed delay between
//! them. An empty list counts as a failed attempt. Starting a new fetch
//! through [`ProjectFetcher::refresh`] cancels the one in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::models::Project;

use super::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: config.retry_delay(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum FetchOutcome {
    /// A non-empty list arrived
    Loaded(Vec<Project>),
    /// Every attempt failed or came back empty
    Exhausted,
    /// A newer fetch took over
    Cancelled,
}

impl FetchOutcome {
    /// Projects the catalog should hold afterwards. `None` leaves it untouched.
    pub fn into_projects(self) -> Option<Vec<Project>> {
        match self {
            FetchOutcome::Loaded(projects) => Some(projects),
            FetchOutcome::Exhausted => Some(Vec::new()),
            FetchOutcome::Cancelled => None,
        }
    }
}

pub async fn fetch_with_retry(
    client: &ApiClient,
    policy: RetryPolicy,
    token: &CancellationToken,
) -> FetchOutcome {
    let attempts = policy.max_retries.saturating_add(1);

    for attempt in 1..=attempts {
        tracing::info!(attempt, "Fetching projects");

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::info!("Fetch aborted, exiting retry loop");
                return FetchOutcome::Cancelled;
            }
            result = client.fetch_projects_once() => result,
        };

        match result {
            Ok(projects) if !projects.is_empty() => {
                tracing::info!(count = projects.len(), "Fetched projects");
                return FetchOutcome::Loaded(projects);
            }
            Ok(_) => tracing::warn!(attempt, "Empty project list received"),
            Err(err) => tracing::warn!(attempt, error = %err, "Project fetch failed"),
        }

        if attempt < attempts {
            tracing::info!(
                delay_ms = policy.delay.as_millis() as u64,
                retry = attempt,
                max_retries = policy.max_retries,
                "Waiting before retry"
            );
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::info!("Fetch aborted, exiting retry loop");
                    return FetchOutcome::Cancelled;
                }
                _ = tokio::time::sleep(policy.delay) => {}
            }
        }
    }

    tracing::warn!("Max retries reached, showing empty state");
    FetchOutcome::Exhausted
}

/// Result of one background fetch, tagged with the refresh that started it
#[derive(Debug)]
pub struct FetchReport {
    pub generation: u64,
    pub outcome: FetchOutcome,
}

/// Runs list fetches in the background, one at a time
pub struct ProjectFetcher {
    client: Arc<ApiClient>,
    policy: RetryPolicy,
    current: Option<CancellationToken>,
    generation: u64,
    tx: UnboundedSender<FetchReport>,
}

impl ProjectFetcher {
    pub fn new(client: Arc<ApiClient>, policy: RetryPolicy) -> (Self, UnboundedReceiver<FetchReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let fetcher = Self {
            client,
            policy,
            current: None,
            generation: 0,
            tx,
        };
        (fetcher, rx)
    }

    /// Cancel any fetch in flight and start a new one
    pub fn refresh(&mut self) -> u64 {
        self.cancel();

        self.generation += 1;
        let generation = self.generation;
        let token = CancellationToken::new();
        self.current = Some(token.clone());

        let client = Arc::clone(&self.client);
        let policy = self.policy;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = fetch_with_retry(&client, policy, &token).await;
            if tx.send(FetchReport { generation, outcome }).is_err() {
                tracing::debug!(generation, "Fetch result dropped, receiver closed");
            }
        });

        generation
    }

    /// Stop the fetch in flight. Reports already queued become stale.
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
        self.generation += 1;
    }

    pub fn in_flight(&self) -> bool {
        self.current.is_some()
    }

    /// Accept a report. Returns the new catalog contents when the report
    /// belongs to the latest refresh and was not cancelled.
    pub fn finish(&mut self, report: FetchReport) -> Option<Vec<Project>> {
        if report.generation != self.generation {
            tracing::debug!(generation = report.generation, "Ignoring stale fetch result");
            return None;
        }
        self.current = None;
        report.outcome.into_projects()
    }
}

impl Drop for ProjectFetcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let config = Config::from_pairs(vec![(
            "ESTATE_LIST_URL".to_string(),
            format!("{}/list", server.uri()),
        )])
        .unwrap();
        ApiClient::new(&config).unwrap()
    }

    fn quick(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay: Duration::from_millis(10),
        }
    }

    fn listing() -> serde_json::Value {
        json!([{"id": 1, "projectName": "Palm", "location": "Banani", "status": "Ongoing"}])
    }

    #[test]
    fn defaults_match_dashboard_behavior() {
        assert_eq!(
            RetryPolicy::default(),
            RetryPolicy {
                max_retries: 5,
                delay: Duration::from_millis(2000)
            }
        );
    }

    #[tokio::test]
    async fn retries_empty_lists_until_data_arrives() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .up_to_n_times(2)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .mount(&server)
            .await;

        let outcome = fetch_with_retry(&client_for(&server), quick(5), &CancellationToken::new()).await;

        let projects = match outcome {
            FetchOutcome::Loaded(projects) => projects,
            other => panic!("expected loaded outcome, got {other:?}"),
        };
        assert_eq!(projects.len(), 1);
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries_plus_one_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcome = fetch_with_retry(&client_for(&server), quick(2), &CancellationToken::new()).await;

        assert_eq!(outcome, FetchOutcome::Exhausted);
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
        assert_eq!(FetchOutcome::Exhausted.into_projects(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn zero_retries_means_a_single_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let outcome = fetch_with_retry(&client_for(&server), quick(0), &CancellationToken::new()).await;

        assert_eq!(outcome, FetchOutcome::Exhausted);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancellation_interrupts_a_slow_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(listing())
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let outcome = fetch_with_retry(&client_for(&server), quick(5), &token).await;

        assert_eq!(outcome, FetchOutcome::Cancelled);
        assert_eq!(FetchOutcome::Cancelled.into_projects(), None);
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_retry_delay() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let policy = RetryPolicy {
            max_retries: 5,
            delay: Duration::from_secs(30),
        };
        let outcome = fetch_with_retry(&client_for(&server), policy, &token).await;

        assert_eq!(outcome, FetchOutcome::Cancelled);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn refresh_supersedes_the_fetch_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(listing())
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let (mut fetcher, mut rx) = ProjectFetcher::new(Arc::new(client_for(&server)), quick(1));
        let first = fetcher.refresh();
        let second = fetcher.refresh();
        assert!(fetcher.in_flight());

        let mut loaded = None;
        while loaded.is_none() {
            let report = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap();
            if report.generation == first {
                assert_eq!(report.outcome, FetchOutcome::Cancelled);
                assert_eq!(fetcher.finish(report), None);
            } else {
                assert_eq!(report.generation, second);
                loaded = fetcher.finish(report);
            }
        }

        assert_eq!(loaded.unwrap().len(), 1);
        assert!(!fetcher.in_flight());
    }

    #[tokio::test]
    async fn queued_result_is_dropped_after_cancel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .mount(&server)
            .await;

        let (mut fetcher, mut rx) = ProjectFetcher::new(Arc::new(client_for(&server)), quick(0));
        fetcher.refresh();
        let report = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(report.outcome, FetchOutcome::Loaded(_)));

        fetcher.cancel();

        assert_eq!(fetcher.finish(report), None);
        assert!(!fetcher.in_flight());
    }

    #[tokio::test]
    async fn huge_retry_budget_does_not_overflow() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .mount(&server)
            .await;

        let outcome = fetch_with_retry(&client_for(&server), quick(u32::MAX), &CancellationToken::new()).await;

        assert!(matches!(outcome, FetchOutcome::Loaded(ref projects) if projects.len() == 1));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}
