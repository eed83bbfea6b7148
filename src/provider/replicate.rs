use std::time::{Duration, Instant};

use anyhow::anyhow;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{
    CONFIG, GUIDANCE_SCALE, IMAGE_HEIGHT, IMAGE_WIDTH, NUM_INFERENCE_STEPS, NUM_OUTPUTS,
    POLL_DEADLINE, POLL_INTERVAL,
};
use crate::error::AppError;
use crate::utils::http::get_http_client;

/// Outcome of submitting a generation request. The provider either answers
/// with the finished output inline or hands back a job to poll.
#[derive(Debug, Clone)]
pub enum Submission {
    Completed(Vec<String>),
    Queued { poll_url: String },
}

/// Terminal and non-terminal job states reported by the provider. Anything
/// unrecognized (the provider also reports `starting` and `processing`) is
/// still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Pending,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    #[serde(default)]
    get: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default = "pending_status")]
    status: JobStatus,
    #[serde(default)]
    output: Option<Vec<String>>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
    #[serde(default)]
    error: Option<Value>,
}

fn pending_status() -> JobStatus {
    JobStatus::Pending
}

impl Prediction {
    fn error_detail(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            Some(value) => value.to_string(),
            None => "no detail provided".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ReplicateClient {
    base_url: String,
    api_token: String,
    model_version: String,
    poll_interval: Duration,
    poll_deadline: Duration,
}

impl ReplicateClient {
    pub fn new(base_url: String, api_token: String, model_version: String) -> Self {
        ReplicateClient {
            base_url,
            api_token,
            model_version,
            poll_interval: POLL_INTERVAL,
            poll_deadline: POLL_DEADLINE,
        }
    }

    pub fn from_config() -> Self {
        Self::new(
            CONFIG.replicate_base_url.clone(),
            CONFIG.replicate_api_token.clone(),
            CONFIG.replicate_model_version.clone(),
        )
    }

    /// Overrides the polling cadence. Production uses the fixed service
    /// policy from `new`.
    pub fn with_timing(mut self, poll_interval: Duration, poll_deadline: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.poll_deadline = poll_deadline;
        self
    }

    /// Submits a generation request and classifies the provider's answer as
    /// either an inline result or a job handle to poll.
    pub async fn submit(&self, prompt: &str) -> Result<Submission, AppError> {
        let payload = json!({
            "version": self.model_version,
            "input": {
                "prompt": prompt,
                "width": IMAGE_WIDTH,
                "height": IMAGE_HEIGHT,
                "num_outputs": NUM_OUTPUTS,
                "guidance_scale": GUIDANCE_SCALE,
                "num_inference_steps": NUM_INFERENCE_STEPS,
            }
        });

        let response = get_http_client()
            .post(format!(
                "{}/v1/predictions",
                self.base_url.trim_end_matches('/')
            ))
            .header("Authorization", format!("Token {}", self.api_token))
            .json(&payload)
            .send()
            .await
            .map_err(|err| AppError::ProviderSubmission(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Replicate submission rejected: status={status}, body={body}");
            return Err(AppError::ProviderSubmission(format!(
                "status {status}: {body}"
            )));
        }

        let prediction: Prediction = response
            .json()
            .await
            .map_err(|err| AppError::ProviderSubmission(format!("unreadable response: {err}")))?;

        match prediction.status {
            JobStatus::Succeeded => Ok(Submission::Completed(
                prediction.output.unwrap_or_default(),
            )),
            JobStatus::Failed | JobStatus::Canceled => Err(AppError::ProviderGenerationFailed(
                format!("failed at submission: {}", prediction.error_detail()),
            )),
            JobStatus::Pending => {
                let poll_url = prediction
                    .urls
                    .and_then(|urls| urls.get)
                    .map(|url| url.trim().to_string())
                    .filter(|url| !url.is_empty());
                match poll_url {
                    Some(poll_url) => Ok(Submission::Queued { poll_url }),
                    None => Err(AppError::ProviderSubmission(
                        "response carried neither output nor a poll endpoint".to_string(),
                    )),
                }
            }
        }
    }

    /// Polls the job at a fixed interval until it reaches a terminal status
    /// or the wall-clock deadline elapses. The deadline only stops polling;
    /// no cancellation is sent to the provider.
    pub async fn wait_for_output(&self, poll_url: &str) -> Result<Vec<String>, AppError> {
        let deadline = Instant::now() + self.poll_deadline;

        loop {
            if Instant::now() >= deadline {
                warn!("Generation job did not finish before the deadline: {poll_url}");
                return Err(AppError::ProviderTimeout);
            }

            tokio::time::sleep(self.poll_interval).await;

            let prediction = self.fetch_status(poll_url).await?;
            match prediction.status {
                JobStatus::Succeeded => {
                    return Ok(prediction.output.unwrap_or_default());
                }
                JobStatus::Failed => {
                    return Err(AppError::ProviderGenerationFailed(format!(
                        "failed: {}",
                        prediction.error_detail()
                    )));
                }
                JobStatus::Canceled => {
                    return Err(AppError::ProviderGenerationFailed(
                        "was canceled by the provider".to_string(),
                    ));
                }
                JobStatus::Pending => {
                    debug!("Generation job still pending: {poll_url}");
                }
            }
        }
    }

    async fn fetch_status(&self, poll_url: &str) -> Result<Prediction, AppError> {
        let response = get_http_client()
            .get(poll_url)
            .header("Authorization", format!("Token {}", self.api_token))
            .send()
            .await
            .map_err(|err| AppError::Internal(anyhow!("Status poll failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::Internal(anyhow!(
                "Status poll failed with status {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|err| AppError::Internal(anyhow!("Unreadable poll response: {err}")))
    }
}
