//! Turnstile clearance through CapSolver.
//!
//! Ahrefs guards its free tools with a Cloudflare Turnstile widget whose token
//! is bound to the page URL. [`CapSolverBroker`] submits an
//! `AntiTurnstileTaskProxyLess` task for that URL and polls `getTaskResult`
//! until the task is ready, fails, or the poll ceiling/deadline is reached.
//!
//! Callers depend on the [`TokenBroker`] trait so tests can swap the solver.

use crate::core::config::SeoConfig;
use crate::core::error::TokenError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Per-request timeout for solver calls, independent of the overall deadline.
const SOLVER_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const TASK_TYPE: &str = "AntiTurnstileTaskProxyLess";

/// Opaque Turnstile clearance token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "AccessToken({}…)", prefix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Ready(AccessToken),
    Failed(String),
}

/// One in-flight task on the solver side.
#[derive(Debug, Clone)]
pub struct SolveTask {
    pub task_id: String,
    pub status: TaskStatus,
}

#[async_trait]
pub trait TokenBroker: Send + Sync {
    /// Clear the challenge bound to `target_url` and return the resulting token.
    async fn acquire(&self, target_url: &str) -> Result<AccessToken, TokenError>;
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SolverResponse {
    #[serde(default)]
    error_id: i64,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    task_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    solution: Option<Solution>,
}

#[derive(Debug, Deserialize, Default)]
struct Solution {
    #[serde(default)]
    token: Option<String>,
}

impl SolverResponse {
    fn error_message(&self) -> Option<String> {
        if self.error_id == 0 {
            return None;
        }
        Some(match (&self.error_code, &self.error_description) {
            (Some(code), Some(desc)) => format!("{}: {}", code, desc),
            (Some(code), None) => code.clone(),
            (None, Some(desc)) => desc.clone(),
            (None, None) => format!("errorId {}", self.error_id),
        })
    }

    fn task_status(self) -> Result<TaskStatus, TokenError> {
        if let Some(msg) = self.error_message() {
            return Ok(TaskStatus::Failed(msg));
        }
        match self.status.as_deref() {
            Some("ready") => self
                .solution
                .and_then(|s| s.token)
                .filter(|t| !t.is_empty())
                .map(|t| TaskStatus::Ready(AccessToken::new(t)))
                .ok_or(TokenError::MalformedSolution),
            Some("failed") => Ok(TaskStatus::Failed("task failed".to_string())),
            _ => Ok(TaskStatus::Pending),
        }
    }
}

#[derive(Clone)]
pub struct CapSolverBroker {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    website_key: String,
    poll_interval: Duration,
    max_polls: u32,
    solve_timeout: Duration,
}

impl std::fmt::Debug for CapSolverBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapSolverBroker")
            .field("api_key_set", &self.api_key.is_some())
            .field("base_url", &self.base_url)
            .field("poll_interval", &self.poll_interval)
            .field("max_polls", &self.max_polls)
            .field("solve_timeout", &self.solve_timeout)
            .finish()
    }
}

impl CapSolverBroker {
    pub fn new(client: reqwest::Client, config: &SeoConfig) -> Self {
        Self {
            client,
            api_key: config.capsolver_api_key.clone(),
            base_url: config.capsolver_base_url.clone(),
            website_key: config.website_key.clone(),
            poll_interval: config.poll_interval,
            max_polls: config.max_polls,
            solve_timeout: config.solve_timeout,
        }
    }

    async fn post(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> Result<SolverResponse, TokenError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let resp = self
            .client
            .post(&url)
            .timeout(SOLVER_REQUEST_TIMEOUT)
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        match serde_json::from_str::<SolverResponse>(&body) {
            // CapSolver reports key/balance problems as 4xx with an errorId body.
            Ok(parsed) if status.is_success() || parsed.error_id != 0 => Ok(parsed),
            Ok(_) => Err(TokenError::Submission(format!(
                "{} returned HTTP {}",
                endpoint, status
            ))),
            Err(e) => Err(TokenError::Submission(format!(
                "{} returned HTTP {} with undecodable body: {}",
                endpoint, status, e
            ))),
        }
    }

    /// `createTask` for the given page URL.
    pub async fn submit(&self, api_key: &str, target_url: &str) -> Result<SolveTask, TokenError> {
        let payload = serde_json::json!({
            "clientKey": api_key,
            "task": {
                "type": TASK_TYPE,
                "websiteKey": self.website_key,
                "websiteURL": target_url,
            }
        });

        let resp = self.post("createTask", &payload).await?;
        if let Some(msg) = resp.error_message() {
            return Err(TokenError::Submission(msg));
        }
        let task_id = resp
            .task_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| TokenError::Submission("no taskId in createTask response".to_string()))?;

        // Some task types come back solved on creation.
        let status = resp.task_status()?;
        Ok(SolveTask { task_id, status })
    }

    /// One `getTaskResult` round trip.
    pub async fn poll(&self, api_key: &str, task_id: &str) -> Result<TaskStatus, TokenError> {
        let payload = serde_json::json!({
            "clientKey": api_key,
            "taskId": task_id,
        });
        self.post("getTaskResult", &payload).await?.task_status()
    }
}

#[async_trait]
impl TokenBroker for CapSolverBroker {
    async fn acquire(&self, target_url: &str) -> Result<AccessToken, TokenError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            warn!("captcha: CAPSOLVER_API_KEY not set; refusing to contact solver");
            TokenError::MissingApiKey
        })?;

        let started = Instant::now();
        let deadline = started + self.solve_timeout;

        let task = self.submit(api_key, target_url).await?;
        info!("captcha: task {} submitted for {}", task.task_id, target_url);

        match task.status {
            TaskStatus::Ready(token) => return Ok(token),
            TaskStatus::Failed(reason) => return Err(TokenError::SolverFailed(reason)),
            TaskStatus::Pending => {}
        }

        let mut polls = 0u32;
        while polls < self.max_polls {
            if Instant::now() + self.poll_interval >= deadline {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
            polls += 1;

            let status = match tokio::time::timeout_at(deadline, self.poll(api_key, &task.task_id)).await {
                Ok(result) => result?,
                Err(_) => break,
            };

            match status {
                TaskStatus::Ready(token) => {
                    info!(
                        "captcha: task {} ready after {} polls ({:?})",
                        task.task_id,
                        polls,
                        started.elapsed()
                    );
                    return Ok(token);
                }
                TaskStatus::Failed(reason) => {
                    warn!("captcha: task {} failed: {}", task.task_id, reason);
                    return Err(TokenError::SolverFailed(reason));
                }
                TaskStatus::Pending => debug!("captcha: task {} pending (poll {})", task.task_id, polls),
            }
        }

        let waited = started.elapsed();
        warn!(
            "captcha: task {} gave up after {} polls ({:?})",
            task.task_id, polls, waited
        );
        Err(TokenError::Timeout { polls, waited })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> SolverResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn ready_response_yields_token() {
        let status = parse(r#"{"errorId":0,"status":"ready","solution":{"token":"0.abc"}}"#)
            .task_status()
            .unwrap();
        assert_eq!(status, TaskStatus::Ready(AccessToken::new("0.abc")));
    }

    #[test]
    fn processing_and_idle_are_pending() {
        for s in ["processing", "idle"] {
            let raw = format!(r#"{{"errorId":0,"status":"{}"}}"#, s);
            assert_eq!(parse(&raw).task_status().unwrap(), TaskStatus::Pending);
        }
    }

    #[test]
    fn error_id_wins_over_status() {
        let status = parse(
            r#"{"errorId":1,"errorCode":"ERROR_CAPTCHA_UNSOLVABLE","errorDescription":"nope","status":"ready"}"#,
        )
        .task_status()
        .unwrap();
        assert_eq!(
            status,
            TaskStatus::Failed("ERROR_CAPTCHA_UNSOLVABLE: nope".to_string())
        );
    }

    #[test]
    fn ready_without_token_is_malformed() {
        let err = parse(r#"{"errorId":0,"status":"ready","solution":{}}"#)
            .task_status()
            .unwrap_err();
        assert!(matches!(err, TokenError::MalformedSolution));
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AccessToken::new("0.secret-token-value");
        let shown = format!("{:?}", token);
        assert!(!shown.contains("secret-token-value"));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        // Unroutable base URL: reaching the network would surface as Transport, not MissingApiKey.
        let config = SeoConfig {
            capsolver_api_key: None,
            capsolver_base_url: "http://127.0.0.1:9".to_string(),
            ..SeoConfig::default()
        };
        let broker = CapSolverBroker::new(reqwest::Client::new(), &config);
        let err = broker.acquire("https://ahrefs.com/x").await.unwrap_err();
        assert!(matches!(err, TokenError::MissingApiKey));
    }
}
