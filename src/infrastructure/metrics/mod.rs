//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Active gateway connections
//! - Active event bridge subscriptions
//! - Dispatched events by kind
//! - Per-connection pushes by outcome

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Registered gateway connections
pub static GATEWAY_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "gateway_connections_active",
            "Number of registered gateway connections",
        )
        .namespace("chat_realtime"),
    )
    .expect("Failed to create GATEWAY_CONNECTIONS_ACTIVE metric")
});

/// Live event bridge subscriptions
pub static BRIDGE_SUBSCRIPTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "bridge_subscriptions_active",
            "Number of live event bridge subscriptions",
        )
        .namespace("chat_realtime"),
    )
    .expect("Failed to create BRIDGE_SUBSCRIPTIONS_ACTIVE metric")
});

/// Dispatched events by kind
pub static EVENTS_DISPATCHED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("events_dispatched_total", "Total number of dispatched events")
            .namespace("chat_realtime"),
        &["kind"], // "message", "notification"
    )
    .expect("Failed to create EVENTS_DISPATCHED_TOTAL metric")
});

/// Gateway pushes by outcome
pub static PUSHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pushes_total", "Total number of gateway pushes").namespace("chat_realtime"),
        &["outcome"], // "delivered", "dropped"
    )
    .expect("Failed to create PUSHES_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(GATEWAY_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register GATEWAY_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(BRIDGE_SUBSCRIPTIONS_ACTIVE.clone()))
        .expect("Failed to register BRIDGE_SUBSCRIPTIONS_ACTIVE");
    registry
        .register(Box::new(EVENTS_DISPATCHED_TOTAL.clone()))
        .expect("Failed to register EVENTS_DISPATCHED_TOTAL");
    registry
        .register(Box::new(PUSHES_TOTAL.clone()))
        .expect("Failed to register PUSHES_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Set the registered gateway connection count
pub fn set_gateway_connections(count: usize) {
    GATEWAY_CONNECTIONS_ACTIVE.set(count as i64);
}

/// Track a bridge subscription being opened (`1`) or closed (`-1`)
pub fn add_bridge_subscriptions(delta: i64) {
    BRIDGE_SUBSCRIPTIONS_ACTIVE.add(delta);
}

/// Record one dispatched event and its gateway push outcomes
pub fn record_dispatch(kind: &str, delivered: usize, dropped: usize) {
    EVENTS_DISPATCHED_TOTAL.with_label_values(&[kind]).inc();
    PUSHES_TOTAL
        .with_label_values(&["delivered"])
        .inc_by(delivered as u64);
    PUSHES_TOTAL
        .with_label_values(&["dropped"])
        .inc_by(dropped as u64);
}
