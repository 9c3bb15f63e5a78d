use crate::{Bounds, Intersection, TriggerOptions};

/// A one-shot "load when near the viewport" trigger.
///
/// Two conditions gate [`Self::should_load`]:
/// - eligibility: granted on mount when `delay_ms == 0`, otherwise once `delay_ms` has elapsed
///   since mount (driven by [`Self::tick`]);
/// - visibility: the first intersection report at or above `threshold` received while observing.
///   Observation starts once eligible and stops for good after the first hit. The latest report
///   received while mounted but not yet eligible is replayed when eligibility is granted, like an
///   observer's initial callback.
///
/// With `observe_visibility = false`, eligibility alone drives `should_load`.
#[derive(Clone, Debug)]
pub struct ViewportTrigger {
    options: TriggerOptions,
    mounted_at_ms: Option<u64>,
    eligible: bool,
    visible: bool,
    observing: bool,
    latest: Option<Intersection>,
}

impl ViewportTrigger {
    pub fn new(options: TriggerOptions) -> Self {
        Self {
            options,
            mounted_at_ms: None,
            eligible: false,
            visible: false,
            observing: false,
            latest: None,
        }
    }

    pub fn options(&self) -> &TriggerOptions {
        &self.options
    }

    /// Starts the trigger at `now_ms`. Remounting restarts the delay; a hit is never re-armed.
    pub fn mount(&mut self, now_ms: u64) {
        self.mounted_at_ms = Some(now_ms);
        self.observing = false;
        self.latest = None;
        if self.options.delay_ms == 0 {
            self.become_eligible();
        } else {
            self.eligible = false;
        }
    }

    /// Advances the delay timer. Returns `true` when the trigger just became eligible.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.eligible {
            return false;
        }
        let Some(deadline) = self.eligible_at_ms() else {
            return false;
        };
        if now_ms < deadline {
            return false;
        }
        self.become_eligible();
        true
    }

    /// Feeds one intersection observation. Returns `true` when the element just became visible.
    ///
    /// While mounted and waiting for eligibility, the report is only remembered. Otherwise reports
    /// are ignored unless the trigger is observing.
    pub fn report(&mut self, entry: Intersection) -> bool {
        if self.is_waiting() {
            self.latest = Some(entry);
            return false;
        }
        if !self.observing {
            return false;
        }
        if !entry.is_intersecting || entry.ratio < self.options.threshold {
            return false;
        }
        self.visible = true;
        self.observing = false;
        fdebug!(ratio = entry.ratio, "ViewportTrigger visible");
        true
    }

    /// Same as [`Self::report`], computing the observation from raw geometry with the configured
    /// `root_margin`.
    pub fn report_bounds(&mut self, target: Bounds, viewport: Bounds) -> bool {
        if !self.observing && !self.is_waiting() {
            return false;
        }
        self.report(Intersection::compute(
            target,
            viewport,
            self.options.root_margin,
        ))
    }

    /// Stops the delay timer and the observation. Nothing changes after this until `mount`.
    pub fn unmount(&mut self) {
        ftrace!(observing = self.observing, "ViewportTrigger::unmount");
        self.mounted_at_ms = None;
        self.observing = false;
        self.latest = None;
    }

    /// Returns the trigger to its pristine, unmounted state.
    pub fn reset(&mut self) {
        *self = Self::new(self.options);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted_at_ms.is_some()
    }

    pub fn is_eligible(&self) -> bool {
        self.eligible
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether intersection reports are currently wanted.
    pub fn is_observing(&self) -> bool {
        self.observing
    }

    pub fn should_load(&self) -> bool {
        self.eligible && (self.visible || !self.options.observe_visibility)
    }

    /// When the delay elapses, if the trigger is mounted and not yet eligible.
    pub fn eligible_at_ms(&self) -> Option<u64> {
        if self.eligible {
            return None;
        }
        self.mounted_at_ms
            .map(|t| t.saturating_add(self.options.delay_ms))
    }

    fn is_waiting(&self) -> bool {
        self.mounted_at_ms.is_some() && !self.eligible
    }

    fn become_eligible(&mut self) {
        self.eligible = true;
        self.observing = self.options.observe_visibility && !self.visible;
        fdebug!(observing = self.observing, "ViewportTrigger eligible");
        if let Some(entry) = self.latest.take() {
            self.report(entry);
        }
    }
}

impl Default for ViewportTrigger {
    fn default() -> Self {
        Self::new(TriggerOptions::default())
    }
}
