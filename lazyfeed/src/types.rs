/// Lifecycle of a [`crate::PageLoader`].
///
/// Exactly one state holds at a time. `Exhausted` is terminal until `reset()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    /// The last fetch failed. Loading may be retried from here.
    Error,
    Exhausted,
}

impl LoadState {
    /// Whether `begin_load` would start a new fetch from this state.
    pub fn can_load(self) -> bool {
        matches!(self, Self::Idle | Self::Error)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    Auto,
}

/// A half-open `[start_index, end_index)` range of item indexes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl WindowRange {
    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }
}

/// An axis-aligned box in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Grows the box by `margin` on every side (shrinks it when negative).
    pub fn inflate(&self, margin: f32) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: (self.width + margin * 2.0).max(0.0),
            height: (self.height + margin * 2.0).max(0.0),
        }
    }

    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        if right < left || bottom < top {
            return None;
        }
        Some(Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }
}

/// A single intersection observation for a watched element.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Intersection {
    pub is_intersecting: bool,
    /// Fraction of the target's area inside the (margin-inflated) viewport, in `[0, 1]`.
    pub ratio: f32,
}

impl Intersection {
    pub fn new(is_intersecting: bool, ratio: f32) -> Self {
        Self {
            is_intersecting,
            ratio: clamp_unit(ratio),
        }
    }

    /// Computes an observation from raw geometry, for adapters without a native observer.
    ///
    /// `root_margin` inflates the viewport so targets just outside it already count as
    /// intersecting. Edge-adjacent boxes intersect with a ratio of `0`.
    pub fn compute(target: Bounds, viewport: Bounds, root_margin: f32) -> Self {
        let root = viewport.inflate(root_margin);
        let Some(overlap) = target.intersection(&root) else {
            return Self::default();
        };
        let area = target.area();
        let ratio = if area > 0.0 {
            overlap.area() / area
        } else {
            // Zero-area targets (e.g. an empty sentinel) are fully visible once they touch.
            1.0
        };
        Self::new(true, ratio)
    }
}

pub(crate) fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}
