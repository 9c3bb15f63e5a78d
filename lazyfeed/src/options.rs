use crate::types::clamp_unit;

/// Configuration for [`crate::PageLoader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoaderOptions {
    /// Items requested per page. A page shorter than this marks the loader exhausted.
    pub page_size: usize,
    /// The page index requested by the first `begin_load` (and again after `reset`).
    pub initial_page: u32,
}

impl LoaderOptions {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            initial_page: 0,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_initial_page(mut self, initial_page: u32) -> Self {
        self.initial_page = initial_page;
        self
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self::new(20)
    }
}

/// Configuration for [`crate::WindowedList`].
///
/// Heights share the unit of the scroll offset (pixels, rows, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowOptions {
    pub count: usize,
    /// Fixed per-item height. `0` is treated as `1`.
    pub item_height: u32,
    pub container_height: u32,
    /// Extra items rendered on each side of the visible bounds.
    pub overscan: usize,
}

impl WindowOptions {
    pub fn new(count: usize, item_height: u32, container_height: u32) -> Self {
        Self {
            count,
            item_height: item_height.max(1),
            container_height,
            overscan: 5,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_item_height(mut self, item_height: u32) -> Self {
        self.item_height = item_height.max(1);
        self
    }

    pub fn with_container_height(mut self, container_height: u32) -> Self {
        self.container_height = container_height;
        self
    }
}

/// Configuration for [`crate::ViewportTrigger`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerOptions {
    /// Time after mount before the trigger becomes eligible. `0` means eligible on mount.
    pub delay_ms: u64,
    /// Margin added around the viewport so the trigger fires before the element scrolls in.
    pub root_margin: f32,
    /// Minimum intersection ratio, in `[0, 1]`.
    pub threshold: f32,
    /// When `false`, `should_load` only waits for the delay and ignores visibility.
    pub observe_visibility: bool,
}

impl TriggerOptions {
    pub fn new() -> Self {
        Self {
            delay_ms: 0,
            root_margin: 50.0,
            threshold: 0.1,
            observe_visibility: true,
        }
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_root_margin(mut self, root_margin: f32) -> Self {
        self.root_margin = root_margin;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = clamp_unit(threshold);
        self
    }

    pub fn with_observe_visibility(mut self, observe_visibility: bool) -> Self {
        self.observe_visibility = observe_visibility;
        self
    }
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for [`crate::Debounced`] and [`crate::DebouncedCall`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebounceOptions {
    pub delay_ms: u64,
}

impl DebounceOptions {
    pub fn new(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}
