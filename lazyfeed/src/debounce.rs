use crate::DebounceOptions;

/// A clock-driven, trailing-edge debounced value.
///
/// The output only changes once the input has been stable for `delay_ms`. Each `set`
/// replaces the pending value and restarts the delay; there is no leading-edge update.
///
/// The adapter owns the clock: call [`Self::poll`] from a timer or frame tick.
#[derive(Clone, Debug)]
pub struct Debounced<T> {
    delay_ms: u64,
    value: T,
    pending: Option<Pending<T>>,
}

#[derive(Clone, Debug)]
struct Pending<T> {
    value: T,
    deadline_ms: u64,
}

impl<T> Debounced<T> {
    pub fn new(initial: T, options: DebounceOptions) -> Self {
        Self {
            delay_ms: options.delay_ms,
            value: initial,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Changes the delay. A pending value keeps its current deadline.
    pub fn set_delay_ms(&mut self, delay_ms: u64) {
        self.delay_ms = delay_ms;
    }

    /// The current (debounced) output.
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Feeds a new input at `now_ms`, cancelling any value still waiting.
    pub fn set(&mut self, value: T, now_ms: u64) {
        let deadline_ms = now_ms.saturating_add(self.delay_ms);
        ftrace!(now_ms, deadline_ms, replaced = self.pending.is_some(), "Debounced::set");
        self.pending = Some(Pending { value, deadline_ms });
    }

    /// Publishes the pending value if its deadline has passed.
    ///
    /// Returns `true` when the output changed.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if !self.is_due(now_ms) {
            return false;
        }
        self.flush()
    }

    /// Publishes the pending value immediately. Returns `true` if there was one.
    pub fn flush(&mut self) -> bool {
        let Some(p) = self.pending.take() else {
            return false;
        };
        self.value = p.value;
        true
    }

    /// Drops the pending value without publishing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.deadline_ms)
    }

    fn is_due(&self, now_ms: u64) -> bool {
        self.deadline_ms().is_some_and(|d| now_ms >= d)
    }
}

/// A clock-driven, trailing-edge debounced call.
///
/// Wraps the *arguments* of a callback: repeated [`Self::call`]s inside one delay window collapse
/// into a single invocation with the arguments of the last call. [`Self::poll`] hands those
/// arguments back once the window closes; the caller runs the real callback with them.
#[derive(Clone, Debug)]
pub struct DebouncedCall<A> {
    delay_ms: u64,
    pending: Option<Pending<A>>,
}

impl<A> DebouncedCall<A> {
    pub fn new(options: DebounceOptions) -> Self {
        Self {
            delay_ms: options.delay_ms,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn set_delay_ms(&mut self, delay_ms: u64) {
        self.delay_ms = delay_ms;
    }

    /// Schedules a call with `args`, replacing any call still waiting.
    pub fn call(&mut self, args: A, now_ms: u64) {
        let deadline_ms = now_ms.saturating_add(self.delay_ms);
        ftrace!(now_ms, deadline_ms, replaced = self.pending.is_some(), "DebouncedCall::call");
        self.pending = Some(Pending {
            value: args,
            deadline_ms,
        });
    }

    /// Returns the arguments to invoke the callback with, once the window has closed.
    pub fn poll(&mut self, now_ms: u64) -> Option<A> {
        if !self.is_due(now_ms) {
            return None;
        }
        self.flush()
    }

    /// Returns the pending arguments immediately, regardless of the deadline.
    pub fn flush(&mut self) -> Option<A> {
        self.pending.take().map(|p| p.value)
    }

    /// Drops the pending call. Call this on teardown so nothing fires after disposal.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            ftrace!("DebouncedCall::cancel");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.deadline_ms)
    }

    fn is_due(&self, now_ms: u64) -> bool {
        self.deadline_ms().is_some_and(|d| now_ms >= d)
    }
}

impl<A> Default for DebouncedCall<A> {
    fn default() -> Self {
        Self::new(DebounceOptions::default())
    }
}
