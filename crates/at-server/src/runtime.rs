//! Periodic tick runtime
//!
//! Drives the rule engine on a fixed interval. Each cycle holds the store's
//! write lock from input sampling through output driving, so a configuration
//! decode can never interleave with a tick.

use at_automation::{Clock, IoBackend, IoReconciler, RuleEngine, TickReport};
use at_store::{AutomationStore, SharedStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, trace, warn};

/// Engine and reconciliation state carried between cycles
#[derive(Debug, Default)]
pub struct Controller {
    engine: RuleEngine,
    reconciler: IoReconciler,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one cycle against an exclusively held store
    ///
    /// Inputs are sampled and outputs driven on every cycle. Rules are only
    /// evaluated while the device's run switch is on; the returned report is
    /// `None` otherwise.
    pub fn cycle(
        &mut self,
        store: &mut AutomationStore,
        backend: &dyn IoBackend,
        now_ms: u64,
    ) -> Option<TickReport> {
        self.reconciler.sample_inputs(store, backend, now_ms);
        let report = if store.device.run {
            Some(self.engine.tick(store))
        } else {
            trace!("Run switch off, skipping rules");
            None
        };
        self.reconciler.drive_outputs(store, backend);
        report
    }

    pub fn ticks(&self) -> u64 {
        self.engine.ticks()
    }
}

/// Background task that cycles the controller on an interval
pub struct TickRuntime {
    store: SharedStore,
    backend: Arc<dyn IoBackend>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,
}

impl TickRuntime {
    pub fn new(
        store: SharedStore,
        backend: Arc<dyn IoBackend>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            store,
            backend,
            clock,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Spawn the tick loop
    ///
    /// Returns `None` if the loop is already running.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Tick runtime already running");
            return None;
        }

        info!(interval_ms = self.interval.as_millis() as u64, "Starting tick runtime");

        let store = self.store.clone();
        let backend = self.backend.clone();
        let clock = self.clock.clone();
        let running = self.running.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Some(tokio::spawn(async move {
            let mut controller = Controller::new();
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut store = store.write().await;
                        controller.cycle(&mut store, backend.as_ref(), clock.now_ms());
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Received shutdown signal");
                        break;
                    }
                }
            }
            running.store(false, Ordering::SeqCst);
            info!(ticks = controller.ticks(), "Tick runtime stopped");
        }))
    }

    /// Signal the tick loop to stop after its current cycle
    pub fn stop(&self) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }

        info!("Stopping tick runtime");
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
