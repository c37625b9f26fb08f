use std::sync::Arc;
use std::time::Instant;

use crate::notify::Notifier;
use crate::rate_limit::RateLimiter;
use crate::storage::SubmissionStore;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn SubmissionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub rate_limiter: Arc<RateLimiter>,
    pub utc_offset_hours: i32,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn SubmissionStore>,
        notifier: Arc<dyn Notifier>,
        rate_limiter: Arc<RateLimiter>,
        utc_offset_hours: i32,
    ) -> Self {
        assert!(
            rate_limiter.limit() > 0,
            "Rate limiter must be configured with a positive limit"
        );
        assert!(
            (-12..=14).contains(&utc_offset_hours),
            "UTC offset out of bounds"
        );
        Self {
            storage,
            notifier,
            rate_limiter,
            utc_offset_hours,
            start_time: Instant::now(),
        }
    }
}
