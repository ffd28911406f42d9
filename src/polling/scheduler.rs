use crate::config::Config;
use crate::polling::visibility::VisibilitySignal;
use futures_util::future::BoxFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Zero-argument async callback invoked on every tick. The callback owns
/// its error handling; the scheduler keeps ticking no matter what the
/// previous tick did.
pub type PollCallback = Box<dyn FnMut() -> BoxFuture<'static, ()> + Send>;

#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Emit start/stop/pause/resume diagnostics.
    pub enable_logs: bool,
    /// Label used in diagnostics.
    pub polling_name: String,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            enable_logs: false,
            polling_name: "smart polling".to_string(),
        }
    }
}

struct PollShared {
    callback: Mutex<PollCallback>,
    running: AtomicBool,
    interval: Duration,
    options: PollOptions,
}

impl PollShared {
    async fn invoke(&self) {
        let tick = {
            let mut callback = match self.callback.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            (*callback)()
        };
        // The lock is released before awaiting so the callback can be
        // rebound while a slow tick is still in flight.
        tick.await;
    }
}

/// Polls a callback on a fixed cadence, pausing while the application is
/// hidden and restarting the cadence (with an immediate tick) when it
/// becomes visible again. Hidden time never counts toward the next tick.
///
/// Ticks are serialized: at most one callback invocation is ever in
/// flight. Ticks that come due while a slow callback runs collapse into
/// at most one late tick, after which the cadence realigns to the
/// interval boundaries. Dropping the scheduler cancels the worker and
/// its visibility subscription.
pub struct PollScheduler {
    shared: Arc<PollShared>,
    visibility: VisibilitySignal,
    enabled_tx: watch::Sender<bool>,
    worker: Option<JoinHandle<()>>,
}

impl PollScheduler {
    pub fn new(
        callback: PollCallback,
        interval: Duration,
        enabled: bool,
        options: PollOptions,
        visibility: &VisibilitySignal,
    ) -> Self {
        let (enabled_tx, _rx) = watch::channel(enabled);
        Self {
            shared: Arc::new(PollShared {
                callback: Mutex::new(callback),
                running: AtomicBool::new(false),
                interval,
                options,
            }),
            visibility: visibility.clone(),
            enabled_tx,
            worker: None,
        }
    }

    /// Spawns the polling worker. No-op when it is already alive.
    pub fn start(&mut self) {
        if self.worker.as_ref().is_some_and(|w| !w.is_finished()) {
            return;
        }
        let shared = self.shared.clone();
        let visible_rx = self.visibility.subscribe();
        let enabled_rx = self.enabled_tx.subscribe();
        self.worker = Some(tokio::spawn(run(shared, visible_rx, enabled_rx)));
    }

    /// Cancels the worker and its timer. Safe to call repeatedly or when
    /// the scheduler was never started.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
        if self.shared.running.swap(false, Ordering::SeqCst) && self.shared.options.enable_logs {
            info!("{} stopped", self.shared.options.polling_name);
        }
    }

    /// True while the cadence is active: started, enabled, and visible.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled_tx.borrow()
    }

    /// External enable toggle. Disabling parks the worker with its
    /// visibility subscription still registered; re-enabling fires an
    /// immediate tick and restarts the cadence.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled_tx.send_if_modified(|current| {
            if *current == enabled {
                false
            } else {
                *current = enabled;
                true
            }
        });
    }

    /// Rebinds the callback. The worker dereferences the holder on every
    /// tick, so the next tick picks this up without restarting the timer.
    pub fn set_callback(&self, callback: PollCallback) {
        let mut guard = match self.shared.callback.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = callback;
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    shared: Arc<PollShared>,
    mut visible: watch::Receiver<bool>,
    mut enabled: watch::Receiver<bool>,
) {
    let logs = shared.options.enable_logs;
    let name = shared.options.polling_name.clone();

    loop {
        // Park until the task is both enabled and the application visible.
        // A closed channel means the owner is gone; bail out.
        while !(*enabled.borrow() && *visible.borrow()) {
            tokio::select! {
                changed = enabled.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                changed = visible.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        shared.running.store(true, Ordering::SeqCst);
        if logs {
            info!(
                "{} started ({}s interval)",
                name,
                shared.interval.as_secs()
            );
        }

        // Fresh ticker on every activation: the first tick fires
        // immediately and hidden time never counts toward the next one.
        // Skipping missed ticks keeps slow callbacks from piling up.
        let mut ticker = tokio::time::interval(shared.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        'active: loop {
            tokio::select! {
                // State changes win over a due tick, otherwise a pause and
                // a tick arriving together could fire a hidden tick.
                biased;
                changed = enabled.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                changed = visible.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = ticker.tick() => {
                    shared.invoke().await;
                }
            }

            if !(*enabled.borrow() && *visible.borrow()) {
                break 'active;
            }
        }

        shared.running.store(false, Ordering::SeqCst);
        if logs {
            if !*visible.borrow() {
                info!("{} paused, application hidden", name);
            } else {
                info!("{} stopped", name);
            }
        }
    }
}

/// The sanctioned unread-notification-count cadence: the configured
/// interval (30 seconds by default) with diagnostics on.
pub fn notifications_poller(
    config: &Config,
    callback: PollCallback,
    enabled: bool,
    visibility: &VisibilitySignal,
) -> PollScheduler {
    PollScheduler::new(
        callback,
        Duration::from_secs(config.polling.notifications_interval),
        enabled,
        PollOptions {
            enable_logs: true,
            polling_name: "unread notifications count polling".to_string(),
        },
        visibility,
    )
}
