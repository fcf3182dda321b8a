//! # Prometheus Metrics
//!
//! Operational metrics for the oracle, served at `GET /metrics`.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] with
//! the `notabot` prefix so they do not collide with any default global
//! registry consumers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metric handles. Cheap to clone; every handle is reference counted.
#[derive(Clone)]
pub struct OracleMetrics {
    registry: Registry,
    /// Verification requests received, by source.
    pub verify_requests_total: IntCounterVec,
    /// Attestations signed, by source.
    pub attestations_issued_total: IntCounterVec,
    /// Rejected requests, by public error code.
    pub rejections_total: IntCounterVec,
    /// Requests turned away by the rate limiter.
    pub rate_limited_total: IntCounter,
    /// Provider round-trip latency in seconds, by source.
    pub upstream_latency_seconds: HistogramVec,
}

impl OracleMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("notabot".into()), None)?;

        let verify_requests_total = IntCounterVec::new(
            Opts::new(
                "oracle_verify_requests_total",
                "Verification requests received",
            ),
            &["source"],
        )?;
        registry.register(Box::new(verify_requests_total.clone()))?;

        let attestations_issued_total = IntCounterVec::new(
            Opts::new(
                "oracle_attestations_issued_total",
                "Attestations signed and returned to clients",
            ),
            &["source"],
        )?;
        registry.register(Box::new(attestations_issued_total.clone()))?;

        let rejections_total = IntCounterVec::new(
            Opts::new("oracle_rejections_total", "Rejected requests by error code"),
            &["code"],
        )?;
        registry.register(Box::new(rejections_total.clone()))?;

        let rate_limited_total = IntCounter::new(
            "oracle_rate_limited_total",
            "Requests rejected by the rate limiter",
        )?;
        registry.register(Box::new(rate_limited_total.clone()))?;

        let upstream_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "oracle_upstream_latency_seconds",
                "Identity provider round-trip latency in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["source"],
        )?;
        registry.register(Box::new(upstream_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            verify_requests_total,
            attestations_issued_total,
            rejections_total,
            rate_limited_total,
            upstream_latency_seconds,
        })
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub type SharedMetrics = Arc<OracleMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(State(metrics): State<SharedMetrics>) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        let metrics = OracleMetrics::new().unwrap();
        metrics
            .attestations_issued_total
            .with_label_values(&["gitcoin"])
            .inc();
        metrics.rate_limited_total.inc();

        let text = metrics.encode().unwrap();
        assert!(text.contains("notabot_oracle_attestations_issued_total{source=\"gitcoin\"} 1"));
        assert!(text.contains("notabot_oracle_rate_limited_total 1"));
    }

    #[test]
    fn separate_instances_do_not_collide() {
        let a = OracleMetrics::new().unwrap();
        let b = OracleMetrics::new().unwrap();
        a.rate_limited_total.inc();
        assert_eq!(b.rate_limited_total.get(), 0);
    }
}
