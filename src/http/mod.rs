use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::AppState;

mod records;
mod submit;

pub fn router(state: AppState) -> Router {
    assert!(
        state.start_time.elapsed() < Duration::from_secs(86_400),
        "Application uptime exceeds 24 hours before router creation"
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_live))
        .route(
            "/submit",
            post(submit::submit).fallback(submit::method_not_allowed),
        )
        .route("/records", get(records::view_records))
        .route("/records/export.csv", get(records::export_csv))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_live(State(state): State<AppState>) -> Result<Json<HealthResponse>, HttpError> {
    let uptime = state.start_time.elapsed().as_secs();
    assert!(
        uptime <= 31_536_000,
        "Uptime exceeds one year without restart"
    );
    let response = HealthResponse {
        status: "live",
        uptime_seconds: uptime,
    };
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: String) -> Self {
        assert!(status != StatusCode::OK, "Error status cannot be 200");
        assert!(!message.is_empty(), "Error message cannot be empty");
        Self { status, message }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        info!("HTTP error: {}", self.message);
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    use async_trait::async_trait;

    use crate::models::{NewSubmission, SubmissionRecord};
    use crate::notify::{NotificationError, Notifier};
    use crate::rate_limit::{DEFAULT_TTL, RateLimiter};
    use crate::state::AppState;
    use crate::storage::{StorageError, SubmissionStore};

    /// In-memory store that can be told to fail every call.
    #[derive(Debug, Default)]
    pub(crate) struct MockStore {
        fail: bool,
        records: Mutex<Vec<SubmissionRecord>>,
    }

    impl MockStore {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                records: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn seeded(records: Vec<SubmissionRecord>) -> Self {
            Self {
                fail: false,
                records: Mutex::new(records),
            }
        }
    }

    #[async_trait]
    impl SubmissionStore for MockStore {
        async fn append(
            &self,
            submission: &NewSubmission,
            submitted_at: &str,
        ) -> Result<(), StorageError> {
            if self.fail {
                return Err(StorageError::Io(std::io::Error::other(
                    "mock storage failure",
                )));
            }
            let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
            records.push(SubmissionRecord {
                unit_number: submission.unit_number,
                name: submission.name.clone(),
                submitted_at: submitted_at.to_string(),
            });
            Ok(())
        }

        async fn list_all(&self) -> Result<Vec<SubmissionRecord>, StorageError> {
            if self.fail {
                return Err(StorageError::Io(std::io::Error::other(
                    "mock storage failure",
                )));
            }
            let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
            Ok(records.clone())
        }
    }

    /// Notifier that records successful sends and can be told to fail.
    #[derive(Debug, Default)]
    pub(crate) struct MockNotifier {
        fail: bool,
        pub(crate) sent: AtomicUsize,
    }

    impl MockNotifier {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                sent: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn notify(
            &self,
            _submission: &NewSubmission,
            _submitted_at: &str,
        ) -> Result<(), NotificationError> {
            if self.fail {
                return Err(NotificationError::Config);
            }
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    pub(crate) fn test_state() -> (AppState, Arc<MockStore>, Arc<MockNotifier>) {
        let store = Arc::new(MockStore::new());
        let notifier = Arc::new(MockNotifier::new());
        let rate_limiter = Arc::new(RateLimiter::new(3, 500, DEFAULT_TTL));
        let state = AppState::new(store.clone(), notifier.clone(), rate_limiter, 9);
        (state, store, notifier)
    }
}
