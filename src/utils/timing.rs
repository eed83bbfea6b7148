use std::time::Instant;

use chrono::Utc;
use tracing::info;

/// Wraps a provider call and emits request/response events with wall-clock
/// duration on the dedicated timing target.
pub async fn log_provider_timing<T, F, Fut>(
    provider: &str,
    operation: &str,
    call: F,
) -> Result<T, crate::error::AppError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, crate::error::AppError>>,
{
    let started_at = Utc::now();
    let started_perf = Instant::now();
    info!(
        target: "service.timing",
        "event=provider_request provider={} operation={} started_at={}",
        provider,
        operation,
        started_at.to_rfc3339()
    );

    let result = call().await;
    let status = if result.is_ok() { "success" } else { "error" };

    let completed_at = Utc::now();
    let duration = started_perf.elapsed().as_secs_f64();
    info!(
        target: "service.timing",
        "event=provider_response provider={} operation={} completed_at={} duration_s={:.3} status={}",
        provider,
        operation,
        completed_at.to_rfc3339(),
        duration,
        status
    );

    result
}
