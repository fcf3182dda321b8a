//! # Rate Limiting
//!
//! Two guards in front of the verify endpoint, both non-blocking:
//!
//! - a fixed-window counter: at most `max_requests` per `window`, reset
//!   when the window elapses;
//! - an in-flight semaphore: at most `max_in_flight` requests being served
//!   at once (provider calls can be slow).
//!
//! Excess requests are rejected immediately with `429 RATE_LIMITED`; nothing
//! is queued.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use crate::api::AppState;
use crate::error::{ApiError, OracleError};

#[derive(Debug)]
struct Window {
    started_at: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    state: Mutex<Window>,
    in_flight: Arc<Semaphore>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32, max_in_flight: usize) -> Self {
        Self {
            window,
            max_requests,
            state: Mutex::new(Window {
                started_at: Instant::now(),
                count: 0,
            }),
            in_flight: Arc::new(Semaphore::new(max_in_flight)),
        }
    }

    /// Count one request against the current window.
    pub fn check(&self) -> Result<(), OracleError> {
        let mut guard = self.state.lock();
        if guard.started_at.elapsed() >= self.window {
            guard.started_at = Instant::now();
            guard.count = 0;
        }
        if guard.count >= self.max_requests {
            return Err(OracleError::RateLimited);
        }
        guard.count = guard.count.saturating_add(1);
        Ok(())
    }

    /// Take an in-flight slot. Released when the permit drops.
    pub fn try_enter(&self) -> Result<OwnedSemaphorePermit, OracleError> {
        Arc::clone(&self.in_flight)
            .try_acquire_owned()
            .map_err(|_| OracleError::RateLimited)
    }

    /// Both guards for one request. The slot is taken first and released
    /// again if the window is full, so a request turned away by either guard
    /// never counts against the window.
    pub fn admit(&self) -> Result<OwnedSemaphorePermit, OracleError> {
        let permit = self.try_enter()?;
        self.check()?;
        Ok(permit)
    }

    pub fn available_slots(&self) -> usize {
        self.in_flight.available_permits()
    }
}

/// Middleware applied to the verify routes.
pub async fn enforce(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let permit = match state.limiter.admit() {
        Ok(permit) => permit,
        Err(e) => {
            state.metrics.rate_limited_total.inc();
            state
                .metrics
                .rejections_total
                .with_label_values(&[e.code().as_str()])
                .inc();
            warn!(path = %request.uri().path(), "request rate limited");
            return ApiError::new(e, state.dev_mode).into_response();
        }
    };
    debug!(free_slots = state.limiter.available_slots(), "verify request admitted");
    let response = next.run(request).await;
    drop(permit);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_caps_requests() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3, 8);
        for _ in 0..3 {
            limiter.check().unwrap();
        }
        assert!(matches!(limiter.check(), Err(OracleError::RateLimited)));
    }

    #[test]
    fn window_resets_after_elapse() {
        let limiter = RateLimiter::new(Duration::from_millis(20), 1, 8);
        limiter.check().unwrap();
        assert!(limiter.check().is_err());
        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn in_flight_slots_are_released_on_drop() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 100, 1);
        let permit = limiter.try_enter().unwrap();
        assert!(limiter.try_enter().is_err());
        assert_eq!(limiter.available_slots(), 0);
        drop(permit);
        assert!(limiter.try_enter().is_ok());
    }

    #[test]
    fn busy_rejections_do_not_spend_the_window() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 2, 1);
        let held = limiter.admit().unwrap();
        for _ in 0..5 {
            assert!(matches!(limiter.admit(), Err(OracleError::RateLimited)));
        }
        drop(held);

        // One of two window slots used so far.
        let second = limiter.admit().unwrap();
        drop(second);
        assert!(matches!(limiter.admit(), Err(OracleError::RateLimited)));
        assert_eq!(limiter.available_slots(), 1);
    }
}
