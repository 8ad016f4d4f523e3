//! Main application orchestration.
//!
//! Startup sequence:
//! 1. Wait for the exchange and chain endpoints (1s polling, bounded)
//! 2. Log the exchange API version
//! 3. Load market metadata and resolve the configured market
//! 4. Run the liquidation loop until shutdown or a fault
//!
//! When configured, the metrics endpoint is served for the whole run.

use crate::config::LiquidatorSettings;
use crate::error::{AppError, AppResult};
use liquidator_exchange::{DynExchangeClient, HttpExchangeClient, MarketsAssistant};
use liquidator_telemetry::MetricsServer;
use liquidator_executor::{
    Broadcaster, DryRunChainClient, DynChainClient, GatewayChainClient, LiquidationLoop,
    MessageBuilder, PositionScanner,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Delay between readiness probes.
const SERVICE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll `probe` every second until it reports ready or `timeout` elapses.
pub async fn wait_for_service<F, Fut>(
    service: &'static str,
    timeout: Duration,
    mut probe: F,
) -> AppResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if probe().await {
            info!(service, "Service ready");
            return Ok(());
        }
        if Instant::now() + SERVICE_POLL_INTERVAL > deadline {
            return Err(AppError::ServiceWaitTimeout { service, timeout });
        }
        debug!(service, "Service not ready, retrying");
        tokio::time::sleep(SERVICE_POLL_INTERVAL).await;
    }
}

/// Main application.
pub struct Application {
    settings: LiquidatorSettings,
    exchange: DynExchangeClient,
    chain: DynChainClient,
}

impl Application {
    /// Create the application with HTTP clients for the configured network.
    ///
    /// Observation mode uses a dry-run chain client and never contacts the
    /// broadcast gateway.
    pub fn new(settings: LiquidatorSettings) -> AppResult<Self> {
        let exchange: DynExchangeClient =
            Arc::new(HttpExchangeClient::new(&settings.network.exchange_url)?);

        let chain: DynChainClient = if settings.is_observation_mode() {
            info!("Observation mode: liquidation messages are logged, not broadcast");
            Arc::new(DryRunChainClient::new(settings.self_address()))
        } else {
            let gateway = settings.network.chain_gateway_url.as_deref().ok_or_else(|| {
                AppError::Config("trading mode requires network.chain_gateway_url".to_string())
            })?;
            Arc::new(GatewayChainClient::new(
                gateway,
                &settings.network.chain_id,
                settings.self_address(),
            )?)
        };

        Ok(Self::with_clients(settings, exchange, chain))
    }

    /// Create the application with caller-provided clients.
    pub fn with_clients(
        settings: LiquidatorSettings,
        exchange: DynExchangeClient,
        chain: DynChainClient,
    ) -> Self {
        Self {
            settings,
            exchange,
            chain,
        }
    }

    pub fn settings(&self) -> &LiquidatorSettings {
        &self.settings
    }

    /// Wait until both the chain and the exchange respond.
    pub async fn wait_for_services(&self) -> AppResult<()> {
        info!("Waiting for services");
        let timeout = self.settings.service_wait_timeout;

        let chain = self.chain.clone();
        wait_for_service("chain", timeout, || {
            let chain = chain.clone();
            async move { chain.is_ready().await }
        })
        .await?;

        let exchange = self.exchange.clone();
        wait_for_service("exchange", timeout, || {
            let exchange = exchange.clone();
            async move { exchange.version().await.is_ok() }
        })
        .await
    }

    /// Log the exchange API version. Failure is only a warning.
    pub async fn log_exchange_version(&self) {
        match self.exchange.version().await {
            Ok(version) => info!(
                version = %version.version,
                build = version.build_date(),
                "Connected to Exchange API"
            ),
            Err(e) => warn!(error = %e, "Failed to get exchange API version"),
        }
    }

    /// Resolve the market and assemble the liquidation loop.
    pub async fn build_loop(&self) -> AppResult<LiquidationLoop> {
        let markets = MarketsAssistant::initialize_from_exchange(self.exchange.as_ref()).await?;
        let market = markets.require_derivative_market(&self.settings.market_id)?;
        info!(market = %market, "Liquidating market");

        let delegation = self.settings.delegation.clone();
        info!(
            sender = %delegation.self_account.address,
            subaccount_id = %delegation.self_account.subaccount_id,
            granter = ?delegation.granter.as_ref().map(|g| g.address.to_string()),
            "Using account"
        );

        let builder = MessageBuilder::new(self.chain.clone(), self.settings.policy, delegation)?;
        Ok(LiquidationLoop::new(
            market,
            PositionScanner::new(self.exchange.clone()),
            builder,
            Broadcaster::new(self.chain.clone()),
            self.settings.poll_interval,
        ))
    }

    /// Run until `shutdown` is cancelled or the loop faults.
    pub async fn run(&self, shutdown: CancellationToken) -> AppResult<()> {
        info!(
            network = %self.settings.network.name,
            chain_id = %self.settings.network.chain_id,
            mode = ?self.settings.mode,
            "Service starts"
        );

        let metrics_shutdown = shutdown.child_token();
        let metrics = self.start_metrics_server(&metrics_shutdown).await?;

        let result = self.run_liquidation(shutdown).await;

        metrics_shutdown.cancel();
        if let Some(server) = metrics {
            server.stopped().await;
        }
        result
    }

    async fn run_liquidation(&self, shutdown: CancellationToken) -> AppResult<()> {
        self.wait_for_services().await?;
        self.log_exchange_version().await;

        let mut liquidation_loop = self.build_loop().await?;
        liquidation_loop.run_guarded(shutdown).await?;
        Ok(())
    }

    /// Start the `/metrics` endpoint if an address is configured.
    pub async fn start_metrics_server(
        &self,
        shutdown: &CancellationToken,
    ) -> AppResult<Option<MetricsServer>> {
        let Some(addr) = self.settings.metrics_addr else {
            return Ok(None);
        };
        let token = shutdown.clone();
        let server = MetricsServer::start(addr, async move { token.cancelled().await }).await?;
        Ok(Some(server))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_service_ready_after_retries() {
        let attempts = AtomicUsize::new(0);
        let result = wait_for_service("test", Duration::from_secs(60), || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move { n >= 2 }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_service_times_out() {
        let attempts = AtomicUsize::new(0);
        let started = Instant::now();
        let result = wait_for_service("test", Duration::from_secs(5), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { false }
        })
        .await;

        assert!(matches!(
            result,
            Err(AppError::ServiceWaitTimeout { service: "test", .. })
        ));
        assert!(started.elapsed() <= Duration::from_secs(5));
        assert_eq!(attempts.load(Ordering::SeqCst), 6);
    }
}
