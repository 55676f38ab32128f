// ── Accessory bridge ──
//
// Full lifecycle for mirroring Wellbeing appliances into an accessory
// host: connect, discover, register, poll, and route characteristic
// writes back as commands. The host itself sits behind `AccessorySink`.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::BridgeConfig;
use crate::error::CoreError;
use crate::mapper;
use crate::model::{
    AccessoryInfo, AccessoryState, ApplianceCommand, ApplianceIdentity, ApplianceSnapshot,
    CharacteristicWrite,
};
use crate::poller::{POLL_CLAMP_WARNING, Poller, effective_poll_interval, spawn_poll_timer};

pub const DISCONTINUED_WARNING: &str = "AEG have discontinued the Wellbeing API, this bridge \
                                        will no longer work against the production service.";

/// The accessory host.
///
/// Calls are made from poll tasks, so implementations must not block.
pub trait AccessorySink: Send + Sync {
    /// Whether an accessory with this UUID is already known to the host.
    fn is_registered(&self, uuid: &Uuid) -> bool;

    /// Register a new accessory.
    fn register(&self, info: AccessoryInfo);

    /// Push fresh characteristic values for one accessory.
    fn update(&self, state: &AccessoryState);
}

/// What [`Bridge::start`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Username or password missing; nothing was contacted.
    NeedsConfiguration,
    Started { appliances: usize },
}

// ── Bridge ───────────────────────────────────────────────────────

/// Cheaply cloneable via `Arc<BridgeInner>`.
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    poller: Poller,
    sink: Arc<dyn AccessorySink>,
    appliances: Mutex<Vec<ApplianceIdentity>>,
    /// Last state pushed to the sink, keyed by pnc id. Used to skip writes
    /// that change nothing.
    cache: DashMap<String, AccessoryState>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    warnings: Mutex<Vec<String>>,
}

impl Bridge {
    /// Create a bridge. Does NOT connect; call [`start()`](Self::start).
    pub fn new(config: BridgeConfig, sink: Arc<dyn AccessorySink>) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                poller: Poller::new(config),
                sink,
                appliances: Mutex::new(Vec::new()),
                cache: DashMap::new(),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
                warnings: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn poller(&self) -> &Poller {
        &self.inner.poller
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Connect, discover and register appliances, push their first state,
    /// then start the poll timer.
    ///
    /// Only connection errors are returned; a failed listing or snapshot
    /// just means fewer accessories.
    pub async fn start(&self) -> Result<StartOutcome, CoreError> {
        warn!("{DISCONTINUED_WARNING}");
        self.push_warning(DISCONTINUED_WARNING).await;

        let config = self.inner.poller.config();
        if config.needs_configuration() {
            info!("please configure a Wellbeing username and password first");
            return Ok(StartOutcome::NeedsConfiguration);
        }

        if let Err(e) = self.inner.poller.connect().await {
            debug!(error = %e, "error while creating client");
            return Err(e);
        }

        let appliances = self.inner.poller.list_appliances().await;
        let snapshots = self.inner.poller.poll_all(&appliances).await;
        debug!(?appliances, "fetched appliances");

        for (identity, snapshot) in appliances.iter().zip(&snapshots) {
            let info = mapper::accessory_info(
                identity,
                snapshot.as_ref(),
                &config.manufacturer,
                &config.model_prefix,
            );
            debug!(
                name = %info.name,
                model = %identity.model_name,
                fixed = %info.model,
                services = ?info.services,
                "accessory info"
            );

            if self.inner.sink.is_registered(&info.uuid) {
                info!("accessory {} already added, loading from cache", info.name);
            } else {
                info!(uuid = %info.uuid, "adding new accessory {}", info.name);
                self.inner.sink.register(info);
            }
        }

        self.apply(&appliances, snapshots);
        let count = appliances.len();
        *self.inner.appliances.lock().await = appliances;

        let interval = effective_poll_interval(config.poll_time_secs);
        if interval.clamped {
            self.push_warning(POLL_CLAMP_WARNING).await;
        }

        let bridge = self.clone();
        let timer = spawn_poll_timer(interval.period, self.inner.cancel.child_token(), move || {
            let bridge = bridge.clone();
            async move { bridge.poll_cycle().await }
        });
        self.inner.task_handles.lock().await.push(timer);

        info!(appliances = count, "bridge started");
        Ok(StartOutcome::Started { appliances: count })
    }

    /// One poll cycle: fetch every known appliance and push the results.
    pub async fn poll_cycle(&self) {
        let appliances = self.inner.appliances.lock().await.clone();
        let snapshots = self.inner.poller.poll_all(&appliances).await;
        self.apply(&appliances, snapshots);
    }

    /// Stop the poll timer. Cycles already in flight run to completion.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "poll timer task failed");
            }
        }
        debug!("bridge shut down");
    }

    fn apply(&self, appliances: &[ApplianceIdentity], snapshots: Vec<Option<ApplianceSnapshot>>) {
        for (identity, snapshot) in appliances.iter().zip(snapshots) {
            // Guard against missing data due to API request failure.
            let Some(snapshot) = snapshot.filter(ApplianceSnapshot::has_name) else {
                debug!("no appliance data returned by API for {}", identity.id);
                continue;
            };

            let state = mapper::accessory_state(&snapshot);
            debug!(
                pnc_id = %identity.id,
                features = ?mapper::compute_feature_set(&snapshot),
                "state"
            );
            self.inner.sink.update(&state);
            self.inner.cache.insert(identity.id.clone(), state);
        }
    }

    // ── Host events ──────────────────────────────────────────────

    /// Handle a characteristic write from the host.
    ///
    /// Returns the command that was sent, or `None` when the write matched
    /// the current state. Send failures are logged only.
    pub async fn handle_set(
        &self,
        pnc_id: &str,
        write: CharacteristicWrite,
    ) -> Option<ApplianceCommand> {
        let current = self
            .inner
            .cache
            .get(pnc_id)
            .map(|entry| entry.purifier.clone());

        let Some(command) = mapper::command_for(write, current.as_ref()) else {
            debug!(pnc_id, ?write, "characteristic unchanged, no command sent");
            return None;
        };

        self.inner.poller.send_command(pnc_id, &command).await;
        info!(
            "{} {} was set to: {}",
            self.display_name(pnc_id).await,
            command.field(),
            command.value()
        );

        if let Some(mut entry) = self.inner.cache.get_mut(pnc_id) {
            mapper::apply_write(&mut entry.purifier, write);
        }
        Some(command)
    }

    /// The host asked the accessory to identify itself.
    pub async fn identify(&self, pnc_id: &str) {
        info!("{} identified!", self.display_name(pnc_id).await);
    }

    // ── Accessors ────────────────────────────────────────────────

    /// Appliances discovered at startup.
    pub async fn appliances(&self) -> Vec<ApplianceIdentity> {
        self.inner.appliances.lock().await.clone()
    }

    /// Last state pushed for `pnc_id`.
    pub fn cached(&self, pnc_id: &str) -> Option<AccessoryState> {
        self.inner.cache.get(pnc_id).map(|entry| entry.value().clone())
    }

    /// Drain warnings accumulated during start.
    pub async fn take_warnings(&self) -> Vec<String> {
        std::mem::take(&mut *self.inner.warnings.lock().await)
    }

    async fn push_warning(&self, message: &str) {
        self.inner.warnings.lock().await.push(message.to_owned());
    }

    async fn display_name(&self, pnc_id: &str) -> String {
        self.inner
            .appliances
            .lock()
            .await
            .iter()
            .find(|a| a.id == pnc_id)
            .map_or_else(|| pnc_id.to_owned(), |a| a.display_name.clone())
    }
}
