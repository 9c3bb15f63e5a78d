//! Headless infinite-scroll primitives.
//!
//! This crate holds the state machines behind lazily loaded, windowed lists:
//!
//! - [`PageLoader`]: accumulates pages from an abstract fetch, guards against concurrent fetches
//!   and tracks exhaustion.
//! - [`WindowedList`]: computes the visible slice of a large fixed-height list from the scroll
//!   offset.
//! - [`ViewportTrigger`]: a one-shot "near the viewport" trigger with an optional start-up delay.
//! - [`Debounced`] / [`DebouncedCall`]: trailing-edge debouncing of values and calls.
//!
//! It is runtime-agnostic. Nothing here spawns tasks or reads a clock: time is passed in as
//! `now_ms`, fetches are split into `begin_load`/`finish`, and intersection observations are
//! reported by the adapter. For tokio-based drivers, see the `lazyfeed-adapter` crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod debounce;
mod error;
mod loader;
mod options;
mod trigger;
mod types;
mod window;


pub use debounce::{Debounced, DebouncedCall};
pub use error::FetchError;
pub use loader::{LoadOutcome, LoaderSnapshot, PageLoader, PageRequest};
pub use options::{DebounceOptions, LoaderOptions, TriggerOptions, WindowOptions};
pub use trigger::ViewportTrigger;
pub use types::{Align, Bounds, Intersection, LoadState, WindowRange};
pub use window::{Window, WindowedList};
