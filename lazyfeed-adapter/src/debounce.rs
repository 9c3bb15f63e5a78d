use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lazyfeed::{DebounceOptions, Debounced, DebouncedCall};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::clock::{Clock, duration_ms};

type Callback<A> = Arc<dyn Fn(A) + Send + Sync>;

/// A trailing-edge debounced callback on tokio timers.
///
/// Each [`Self::call`] replaces the pending arguments and restarts the delay; the callback runs
/// at most once per quiet window, with the arguments of the last call. Dropping the debouncer
/// cancels anything pending.
///
/// Must be used from within a tokio runtime.
pub struct Debouncer<A> {
    clock: Clock,
    call: Arc<Mutex<DebouncedCall<A>>>,
    callback: Callback<A>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new(delay: Duration, callback: impl Fn(A) + Send + Sync + 'static) -> Self {
        Self {
            clock: Clock::start(),
            call: Arc::new(Mutex::new(DebouncedCall::new(DebounceOptions::new(
                duration_ms(delay),
            )))),
            callback: Arc::new(callback),
            task: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(lock(&self.call).delay_ms())
    }

    /// Schedules the callback with `args`, cancelling the pending one.
    pub fn call(&self, args: A) {
        let deadline_ms = {
            let mut call = lock(&self.call);
            call.call(args, self.clock.now_ms());
            call.deadline_ms()
        };
        let Some(deadline_ms) = deadline_ms else {
            return;
        };

        let wake = self.clock.instant_at(deadline_ms);
        let clock = self.clock;
        let call = Arc::clone(&self.call);
        let callback = Arc::clone(&self.callback);
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(wake).await;
            let args = lock(&call).poll(clock.now_ms());
            if let Some(args) = args {
                ftrace!("Debouncer fired");
                callback(args);
            }
        });

        if let Some(prev) = lock(&self.task).replace(task) {
            prev.abort();
        }
    }

    /// Runs the pending callback now, if any. Returns `true` if it ran.
    pub fn flush(&self) -> bool {
        self.abort_task();
        let args = lock(&self.call).flush();
        match args {
            Some(args) => {
                (self.callback)(args);
                true
            }
            None => false,
        }
    }

    /// Drops the pending call without running it.
    pub fn cancel(&self) {
        self.abort_task();
        lock(&self.call).cancel();
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.call).is_pending()
    }
}

impl<A> Debouncer<A> {
    fn abort_task(&self) {
        if let Some(task) = lock(&self.task).take() {
            task.abort();
        }
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        self.abort_task();
    }
}

impl<A> std::fmt::Debug for Debouncer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer").finish_non_exhaustive()
    }
}

/// A debounced view of a `watch` channel, created by [`debounce_watch`].
///
/// Dropping it stops the forwarding task.
pub struct DebouncedWatch<T> {
    rx: watch::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T> DebouncedWatch<T> {
    pub fn receiver(&self) -> &watch::Receiver<T> {
        &self.rx
    }

    pub fn receiver_mut(&mut self) -> &mut watch::Receiver<T> {
        &mut self.rx
    }

    /// Another receiver of the debounced output. It stays valid only while `self` is alive.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.rx.clone()
    }

    pub fn borrow(&self) -> watch::Ref<'_, T> {
        self.rx.borrow()
    }

    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }
}

impl<T> Drop for DebouncedWatch<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Debounces a `watch` channel: the output only takes an input value once the input has been
/// stable for `delay`. Intermediate values are never published.
///
/// When the input sender closes, a pending value is published and the output closes.
///
/// Must be called from within a tokio runtime.
pub fn debounce_watch<T>(mut input: watch::Receiver<T>, delay: Duration) -> DebouncedWatch<T>
where
    T: Clone + Send + Sync + 'static,
{
    let clock = Clock::start();
    let initial = input.borrow_and_update().clone();
    let (tx, rx) = watch::channel(initial.clone());
    let mut debounced = Debounced::new(initial, DebounceOptions::new(duration_ms(delay)));

    let task = tokio::spawn(async move {
        loop {
            let deadline = debounced.deadline_ms();
            let wake = clock.instant_at(deadline.unwrap_or(0));
            tokio::select! {
                changed = input.changed() => {
                    if changed.is_err() {
                        if debounced.flush() {
                            tx.send_replace(debounced.value().clone());
                        }
                        break;
                    }
                    let value = input.borrow_and_update().clone();
                    debounced.set(value, clock.now_ms());
                }
                _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                    if debounced.poll(clock.now_ms()) && tx.send(debounced.value().clone()).is_err() {
                        break;
                    }
                }
            }
        }
    });

    DebouncedWatch { rx, task }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
