use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lazyfeed::{Bounds, Intersection, TriggerOptions, ViewportTrigger};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::clock::Clock;

/// Published state of a [`TriggerTask`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TriggerStatus {
    pub eligible: bool,
    pub visible: bool,
    pub should_load: bool,
}

impl TriggerStatus {
    fn of(trigger: &ViewportTrigger) -> Self {
        Self {
            eligible: trigger.is_eligible(),
            visible: trigger.is_visible(),
            should_load: trigger.should_load(),
        }
    }
}

struct Shared {
    trigger: Mutex<ViewportTrigger>,
    status: watch::Sender<TriggerStatus>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ViewportTrigger> {
        self.trigger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `f` and publishes the resulting status.
    fn update<R>(&self, f: impl FnOnce(&mut ViewportTrigger) -> R) -> R {
        let (r, status) = {
            let mut trigger = self.lock();
            let r = f(&mut trigger);
            (r, TriggerStatus::of(&trigger))
        };
        self.status.send_if_modified(|cur| {
            let changed = *cur != status;
            *cur = status;
            changed
        });
        r
    }
}

/// A mounted [`ViewportTrigger`] whose start-up delay runs on a tokio timer.
///
/// The adapter forwards intersection observations with [`Self::report`] (or raw geometry with
/// [`Self::report_bounds`]) and watches [`TriggerStatus::should_load`]. Unmounting or dropping the
/// task cancels the timer and stops observation.
pub struct TriggerTask {
    clock: Clock,
    shared: Arc<Shared>,
    timer: Option<JoinHandle<()>>,
}

impl TriggerTask {
    /// Mounts a trigger now. With `delay_ms == 0` it is eligible before this returns.
    ///
    /// Must be called from within a tokio runtime when `delay_ms > 0`.
    pub fn mount(options: TriggerOptions) -> Self {
        let clock = Clock::start();
        let mut trigger = ViewportTrigger::new(options);
        trigger.mount(0);
        let (status, _) = watch::channel(TriggerStatus::of(&trigger));
        let shared = Arc::new(Shared {
            trigger: Mutex::new(trigger),
            status,
        });

        let timer = (options.delay_ms > 0).then(|| {
            let shared = Arc::clone(&shared);
            let wake = clock.instant_at(options.delay_ms);
            tokio::spawn(async move {
                tokio::time::sleep_until(wake).await;
                shared.update(|t| t.tick(clock.now_ms()));
                ftrace!("TriggerTask delay elapsed");
            })
        });

        Self {
            clock,
            shared,
            timer,
        }
    }

    /// Forwards an intersection observation. Returns `true` when the element just became visible.
    pub fn report(&self, entry: Intersection) -> bool {
        self.shared.update(|t| t.report(entry))
    }

    pub fn report_bounds(&self, target: Bounds, viewport: Bounds) -> bool {
        self.shared.update(|t| t.report_bounds(target, viewport))
    }

    pub fn status(&self) -> TriggerStatus {
        TriggerStatus::of(&self.shared.lock())
    }

    pub fn should_load(&self) -> bool {
        self.shared.lock().should_load()
    }

    /// Whether intersection reports are currently wanted.
    pub fn is_observing(&self) -> bool {
        self.shared.lock().is_observing()
    }

    /// Milliseconds since mount.
    pub fn elapsed_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn subscribe(&self) -> watch::Receiver<TriggerStatus> {
        self.shared.status.subscribe()
    }

    /// Waits until `should_load` holds.
    ///
    /// Returns immediately if it already does. Never resolves after `unmount` unless it already
    /// held.
    pub async fn loaded(&self) {
        let mut rx = self.subscribe();
        let held = rx.wait_for(|s| s.should_load).await.is_ok();
        if !held {
            std::future::pending::<()>().await;
        }
    }

    /// Cancels the delay timer and stops observation.
    pub fn unmount(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.shared.update(ViewportTrigger::unmount);
    }
}

impl Drop for TriggerTask {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl std::fmt::Debug for TriggerTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerTask")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
