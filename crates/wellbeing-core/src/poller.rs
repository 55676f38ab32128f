// ── Appliance poller ──
//
// Owns the authenticated client and turns vendor responses into domain
// snapshots. The `try_*` methods surface errors for one-shot callers;
// the plain methods log and swallow them so a poll cycle never fails.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use wellbeing_api::AuthenticatedClient;

use crate::config::BridgeConfig;
use crate::error::CoreError;
use crate::mapper;
use crate::model::{ApplianceCommand, ApplianceIdentity, ApplianceSnapshot};

/// Shortest allowed poll period.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub const POLL_CLAMP_WARNING: &str = "poll time is below 5s, forcing 5s";

/// Poll period after applying the 5 s floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollInterval {
    pub period: Duration,
    /// `true` when the requested value was missing or below the floor.
    pub clamped: bool,
}

/// Resolve the configured poll time (seconds) into a period.
pub fn effective_poll_interval(requested_secs: Option<u64>) -> PollInterval {
    match requested_secs {
        Some(secs) if secs >= MIN_POLL_INTERVAL.as_secs() => {
            debug!("refreshing every {secs}s");
            PollInterval {
                period: Duration::from_secs(secs),
                clamped: false,
            }
        }
        _ => {
            warn!("{POLL_CLAMP_WARNING}");
            PollInterval {
                period: MIN_POLL_INTERVAL,
                clamped: true,
            }
        }
    }
}

/// Run `cycle` every `period` until `cancel` fires.
///
/// Each tick spawns its cycle as a separate task, so a cycle that outlives
/// the period overlaps the next one. In-flight cycles are not cancelled.
pub fn spawn_poll_timer<F, Fut>(
    period: Duration,
    cancel: CancellationToken,
    cycle: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    debug!("poll tick");
                    tokio::spawn(cycle());
                }
            }
        }
        debug!("poll timer stopped");
    })
}

// ── Poller ───────────────────────────────────────────────────────

/// Cheaply cloneable handle to the Wellbeing session.
#[derive(Clone)]
pub struct Poller {
    inner: Arc<PollerInner>,
}

struct PollerInner {
    config: BridgeConfig,
    client: Mutex<Option<Arc<AuthenticatedClient>>>,
}

impl Poller {
    /// Create a poller. Does NOT connect.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                config,
                client: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Build a fresh authenticated client, replacing any previous one.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        let credentials = config.credentials()?;
        let client = AuthenticatedClient::connect(
            credentials,
            config.endpoints.clone(),
            &config.transport(),
        )
        .await?;

        *self.inner.client.lock().await = Some(Arc::new(client));
        info!("connected to Wellbeing");
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.client.lock().await.is_some()
    }

    /// Clone the client out and release the lock before any request.
    async fn client(&self) -> Result<Arc<AuthenticatedClient>, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::NotConnected)
    }

    // ── Discovery ────────────────────────────────────────────────

    pub async fn try_list_appliances(&self) -> Result<Vec<ApplianceIdentity>, CoreError> {
        let client = self.client().await?;
        let entries = client.list_appliances().await?;
        Ok(entries.into_iter().map(ApplianceIdentity::from).collect())
    }

    /// Look up one appliance on the account by pnc id.
    pub async fn try_find_appliance(&self, pnc_id: &str) -> Result<ApplianceIdentity, CoreError> {
        self.try_list_appliances()
            .await?
            .into_iter()
            .find(|a| a.id == pnc_id)
            .ok_or_else(|| CoreError::UnknownAppliance {
                pnc_id: pnc_id.to_owned(),
            })
    }

    /// List the account's appliances. Failure yields an empty list.
    pub async fn list_appliances(&self) -> Vec<ApplianceIdentity> {
        match self.try_list_appliances().await {
            Ok(appliances) => {
                debug!(count = appliances.len(), "fetched appliances");
                appliances
            }
            Err(e) => {
                error!(error = %e, "could not fetch appliances");
                Vec::new()
            }
        }
    }

    // ── Telemetry ────────────────────────────────────────────────

    pub async fn try_fetch_snapshot(&self, pnc_id: &str) -> Result<ApplianceSnapshot, CoreError> {
        let client = self.client().await?;
        let data = client
            .get_appliance(pnc_id)
            .await
            .map_err(|e| CoreError::from(e).into_fetch(pnc_id))?;
        Ok(mapper::project_snapshot(pnc_id, &data))
    }

    /// Fetch one snapshot.
    ///
    /// On failure, rebuilds the session once and returns `None` whether or
    /// not that worked; the next tick tries again.
    pub async fn fetch_snapshot(&self, pnc_id: &str) -> Option<ApplianceSnapshot> {
        match self.try_fetch_snapshot(pnc_id).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(pnc_id, error = %e, "could not fetch appliance data");
                if let Err(e) = self.connect().await {
                    error!(error = %e, "reconnection failure");
                }
                None
            }
        }
    }

    /// Fetch every appliance concurrently. The result is index-aligned with
    /// `appliances`.
    pub async fn poll_all(&self, appliances: &[ApplianceIdentity]) -> Vec<Option<ApplianceSnapshot>> {
        join_all(appliances.iter().map(|a| self.fetch_snapshot(&a.id))).await
    }

    // ── Commands ─────────────────────────────────────────────────

    pub async fn try_send_command(
        &self,
        pnc_id: &str,
        command: &ApplianceCommand,
    ) -> Result<Value, CoreError> {
        let client = self.client().await?;
        client
            .send_command(pnc_id, command.field(), command.value())
            .await
            .map_err(|e| CoreError::from(e).into_command(pnc_id, command.field()))
    }

    /// Send a command and forget about it. Errors are logged only.
    pub async fn send_command(&self, pnc_id: &str, command: &ApplianceCommand) {
        debug!(pnc_id, field = command.field(), value = %command.value(), "sending command");
        match self.try_send_command(pnc_id, command).await {
            Ok(response) => debug!(pnc_id, %response, "command responded"),
            Err(e) => error!(pnc_id, error = %e, "could not run command"),
        }
    }
}
