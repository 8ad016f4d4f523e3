//! Prometheus metrics for the liquidation bot.
//!
//! Metrics are registered in the default registry. [`Metrics::encode`]
//! renders them in the Prometheus text format, which the metrics server
//! serves at `/metrics`.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means duplicate metric names, which is a programming error that should
//! crash at first use rather than silently drop data.

use once_cell::sync::Lazy;
use crate::error::{TelemetryError, TelemetryResult};
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, CounterVec, Encoder,
    GaugeVec, HistogramVec, TextEncoder,
};
use std::time::Instant;

/// Calls per instrumented operation.
pub static FUNC_CALLS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "liquidator_func_calls_total",
        "Total calls per instrumented operation",
        &["func"]
    )
    .unwrap()
});

/// Errors per instrumented operation.
pub static FUNC_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "liquidator_func_errors_total",
        "Total errors per instrumented operation",
        &["func"]
    )
    .unwrap()
});

/// Wall time per instrumented operation.
pub static FUNC_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "liquidator_func_duration_seconds",
        "Duration of instrumented operations in seconds",
        &["func"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap()
});

/// Liquidation attempts by outcome.
/// Labels: market_id, outcome (submitted/failed/skipped)
pub static LIQUIDATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "liquidator_liquidations_total",
        "Liquidation attempts by outcome",
        &["market_id", "outcome"]
    )
    .unwrap()
});

/// Liquidable positions seen in the last successful scan.
pub static LIQUIDABLE_POSITIONS: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "liquidator_liquidable_positions",
        "Liquidable positions found by the last scan",
        &["market_id"]
    )
    .unwrap()
});

/// Loop state (1 = active, 0 = inactive).
pub static LOOP_STATE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "liquidator_loop_state",
        "Liquidation loop current state (1=active, 0=inactive)",
        &["state"]
    )
    .unwrap()
});

const LOOP_STATES: [&str; 4] = ["scanning", "processing", "sleeping", "stopped"];

/// Metrics helper for recording values.
pub struct Metrics;

impl Metrics {
    /// Record a call to `func`.
    pub fn func_call(func: &str) {
        FUNC_CALLS_TOTAL.with_label_values(&[func]).inc();
    }

    /// Record a failed call to `func`.
    pub fn func_error(func: &str) {
        FUNC_ERRORS_TOTAL.with_label_values(&[func]).inc();
    }

    /// Record how long `func` took.
    pub fn func_timing(func: &str, seconds: f64) {
        FUNC_DURATION_SECONDS
            .with_label_values(&[func])
            .observe(seconds);
    }

    pub fn liquidation_submitted(market_id: &str) {
        LIQUIDATIONS_TOTAL
            .with_label_values(&[market_id, "submitted"])
            .inc();
    }

    pub fn liquidation_failed(market_id: &str) {
        LIQUIDATIONS_TOTAL
            .with_label_values(&[market_id, "failed"])
            .inc();
    }

    pub fn liquidation_skipped(market_id: &str) {
        LIQUIDATIONS_TOTAL
            .with_label_values(&[market_id, "skipped"])
            .inc();
    }

    pub fn liquidable_positions(market_id: &str, count: usize) {
        LIQUIDABLE_POSITIONS
            .with_label_values(&[market_id])
            .set(count as f64);
    }

    /// Set the loop state. Only the active state is 1.
    pub fn loop_state_set(state: &str) {
        for s in &LOOP_STATES {
            LOOP_STATE.with_label_values(&[s]).set(0.0);
        }
        LOOP_STATE.with_label_values(&[state]).set(1.0);
    }

    /// Everything in the default registry, in the Prometheus text format.
    pub fn encode() -> TelemetryResult<String> {
        let families = prometheus::gather();
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buf)
            .map_err(|e| TelemetryError::MetricsEncode(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::MetricsEncode(e.to_string()))
    }
}

/// Records a call on creation and its duration when finished.
///
/// Dropping the timer without calling [`FuncTimer::finish`] still records
/// the duration, so early returns are timed too.
pub struct FuncTimer {
    func: &'static str,
    started: Instant,
    recorded: bool,
}

impl FuncTimer {
    pub fn start(func: &'static str) -> Self {
        Metrics::func_call(func);
        Self {
            func,
            started: Instant::now(),
            recorded: false,
        }
    }

    /// Record the duration, and an error when `failed`.
    pub fn finish(mut self, failed: bool) {
        if failed {
            Metrics::func_error(self.func);
        }
        self.record();
    }

    fn record(&mut self) {
        if !self.recorded {
            self.recorded = true;
            Metrics::func_timing(self.func, self.started.elapsed().as_secs_f64());
        }
    }
}

impl Drop for FuncTimer {
    fn drop(&mut self) {
        self.record();
    }
}
