//! Submission intake pipeline: identify client, rate-check, validate,
//! persist, notify, classify.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::Value;
use tracing::{error, info};

use crate::models::ApiResponse;
use crate::state::AppState;
use crate::utils::format_timestamp;
use crate::validation::validate_submission;

const WARNING_STORAGE: &str = "Failed to save the report.";
const WARNING_NOTIFY: &str = "Failed to send the email notification.";

pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let client_key = client_key(&headers);

    // Rejected clients cause no mutation and no downstream attempt.
    if state.rate_limiter.has_exceeded_limit(&client_key) {
        info!("Submission from {client_key} rejected by rate limit");
        let message = format!(
            "You have already submitted {} times. Please contact the administrator directly.",
            state.rate_limiter.limit()
        );
        return respond(StatusCode::TOO_MANY_REQUESTS, ApiResponse::failure(message));
    }

    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            info!("Rejected unreadable submission body: {rejection}");
            return respond(
                StatusCode::BAD_REQUEST,
                ApiResponse::failure("Request body must be a JSON object"),
            );
        }
    };

    let submission = match validate_submission(&body) {
        Ok(submission) => submission,
        Err(err) => {
            info!("Submission from {client_key} failed validation: {err}");
            return respond(StatusCode::BAD_REQUEST, ApiResponse::failure(err.0));
        }
    };

    // Quota is spent before the side effects run, so a failure further down
    // the pipeline still consumes a slot.
    let count = state.rate_limiter.increment_count(&client_key);
    info!(
        "Submission accepted from {client_key} (count {count}) for unit {}",
        submission.unit_number
    );

    let submitted_at = format_timestamp(Utc::now(), state.utc_offset_hours);

    // The two side effects run sequentially and independently; neither
    // failure masks or skips the other.
    let storage_result = state.storage.append(&submission, &submitted_at).await;
    if let Err(err) = &storage_result {
        error!("Failed to persist submission: {err}");
    }
    let notify_result = state.notifier.notify(&submission, &submitted_at).await;
    if let Err(err) = &notify_result {
        error!("Failed to send admin notification: {err}");
    }

    match classify(storage_result.is_ok(), notify_result.is_ok()) {
        Outcome::Complete => respond(
            StatusCode::OK,
            ApiResponse::ok("Your report was submitted successfully."),
        ),
        Outcome::Partial(warnings) => respond(
            StatusCode::MULTI_STATUS,
            ApiResponse::ok_with_warnings(
                "Your report was submitted.",
                warnings.into_iter().map(str::to_string).collect(),
            ),
        ),
        Outcome::Failed => respond(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiResponse::failure(
                "Something went wrong while submitting. Please contact the administrator directly.",
            ),
        ),
    }
}

pub async fn method_not_allowed() -> Response {
    respond(
        StatusCode::METHOD_NOT_ALLOWED,
        ApiResponse::failure("Method not allowed"),
    )
}

/// Advisory client key from transport metadata: first forwarded address if
/// present, else the real-IP header, else a fixed sentinel. Never
/// authenticated; only used to bucket abuse-deterrent counters.
fn client_key(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    "unknown".to_string()
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Complete,
    Partial(Vec<&'static str>),
    Failed,
}

/// Reduce the two independent side-effect results to one response class.
fn classify(storage_ok: bool, notify_ok: bool) -> Outcome {
    match (storage_ok, notify_ok) {
        (true, true) => Outcome::Complete,
        (true, false) => Outcome::Partial(vec![WARNING_NOTIFY]),
        (false, true) => Outcome::Partial(vec![WARNING_STORAGE]),
        (false, false) => Outcome::Failed,
    }
}

fn respond(status: StatusCode, body: ApiResponse) -> Response {
    (status, Json(body)).into_response()
}
