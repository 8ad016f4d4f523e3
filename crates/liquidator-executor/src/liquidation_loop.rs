//! Liquidation polling loop.
//!
//! One sequential task per market:
//!
//! ```text
//! Scanning -> Processing -> Sleeping -> Scanning ...
//!     \_____ scan error _____/
//! ```
//!
//! Failures while sizing, building or broadcasting one position are logged
//! and the next position is processed. A scan failure is retried after the
//! poll interval. The loop stops when the shutdown token is cancelled, or
//! terminally when [`LiquidationLoop::run_guarded`] catches a panic.

use crate::broadcaster::Broadcaster;
use crate::builder::MessageBuilder;
use crate::error::{ExecutorError, ExecutorResult, LoopError};
use crate::scanner::PositionScanner;
use futures_util::FutureExt;
use liquidator_core::{MarketMetadata, PositionSnapshot};
use liquidator_telemetry::Metrics;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default delay between scans.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Scanning,
    Processing,
    Sleeping,
    Stopped,
}

impl LoopState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scanning => "scanning",
            Self::Processing => "processing",
            Self::Sleeping => "sleeping",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome counts of one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub found: usize,
    pub submitted: usize,
    pub failed: usize,
    pub skipped: usize,
}

enum PositionOutcome {
    Submitted,
    Failed,
    Skipped,
}

/// Scan -> size -> build -> broadcast on a fixed interval.
pub struct LiquidationLoop {
    market: Arc<MarketMetadata>,
    scanner: PositionScanner,
    builder: MessageBuilder,
    broadcaster: Broadcaster,
    poll_interval: Duration,
    state: LoopState,
}

impl LiquidationLoop {
    pub fn new(
        market: Arc<MarketMetadata>,
        scanner: PositionScanner,
        builder: MessageBuilder,
        broadcaster: Broadcaster,
        poll_interval: Duration,
    ) -> Self {
        Self {
            market,
            scanner,
            builder,
            broadcaster,
            poll_interval,
            state: LoopState::Stopped,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn market(&self) -> &MarketMetadata {
        &self.market
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn set_state(&mut self, state: LoopState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "Loop state transition");
        }
        self.state = state;
        Metrics::loop_state_set(state.as_str());
    }

    /// One scan and the processing of every position it found.
    ///
    /// Only a scan failure is returned as an error.
    pub async fn run_cycle(&mut self) -> ExecutorResult<CycleReport> {
        self.set_state(LoopState::Scanning);
        let market_id = self.market.id.clone();
        let positions = self.scanner.fetch_liquidable_positions(&market_id).await?;

        Metrics::liquidable_positions(&market_id, positions.len());
        let mut report = CycleReport {
            found: positions.len(),
            ..CycleReport::default()
        };
        if positions.is_empty() {
            return Ok(report);
        }

        self.set_state(LoopState::Processing);
        info!(market = %self.market, count = positions.len(), "Found liquidable positions");

        for position in &positions {
            match self.process_position(position).await {
                PositionOutcome::Submitted => {
                    report.submitted += 1;
                    Metrics::liquidation_submitted(&market_id);
                }
                PositionOutcome::Failed => {
                    report.failed += 1;
                    Metrics::liquidation_failed(&market_id);
                }
                PositionOutcome::Skipped => {
                    report.skipped += 1;
                    Metrics::liquidation_skipped(&market_id);
                }
            }
        }

        info!(
            found = report.found,
            submitted = report.submitted,
            failed = report.failed,
            skipped = report.skipped,
            "Liquidation cycle complete"
        );
        Ok(report)
    }

    async fn process_position(&self, position: &PositionSnapshot) -> PositionOutcome {
        let msg = match self.builder.build(position, &self.market) {
            Ok(msg) => msg,
            Err(ExecutorError::Sizing(e)) => {
                warn!(position = %position, reason = %e, "Skipping position");
                return PositionOutcome::Skipped;
            }
            Err(e) => {
                error!(position = %position, error = %e, "Failed to build liquidation message");
                return PositionOutcome::Failed;
            }
        };

        match self.broadcaster.broadcast(&msg).await {
            Ok(_) => PositionOutcome::Submitted,
            Err(e) => {
                error!(position = %position, error = %e, "Failed liquidating position");
                PositionOutcome::Failed
            }
        }
    }

    /// Run until `shutdown` is cancelled.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!(
            market = %self.market,
            poll_interval_secs = self.poll_interval.as_secs(),
            "Liquidation loop starting"
        );

        while !shutdown.is_cancelled() {
            if let Err(e) = self.run_cycle().await {
                warn!(error = %e, market_id = %self.market.id, "Failed to get liquidable positions");
            }

            self.set_state(LoopState::Sleeping);
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        self.set_state(LoopState::Stopped);
        info!("Liquidation loop stopped");
    }

    /// [`Self::run`] with panics converted into [`LoopError::Fault`].
    pub async fn run_guarded(&mut self, shutdown: CancellationToken) -> Result<(), LoopError> {
        let outcome = AssertUnwindSafe(self.run(shutdown)).catch_unwind().await;
        match outcome {
            Ok(()) => Ok(()),
            Err(payload) => {
                self.set_state(LoopState::Stopped);
                let reason = panic_message(payload.as_ref());
                error!(reason = %reason, "Liquidation loop panicked");
                Err(LoopError::Fault(reason))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
