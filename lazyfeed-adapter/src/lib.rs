//! Tokio drivers for the `lazyfeed` crate.
//!
//! `lazyfeed` is runtime-agnostic: its state machines take `now_ms` and split fetches into
//! `begin_load`/`finish`. This crate wires them to a real runtime:
//!
//! - [`InfiniteFeed`]: drives a `PageLoader` with an async [`PageFetcher`], publishing progress on
//!   a `watch` channel. Late responses after `reset` are dropped.
//! - [`Debouncer`] / [`debounce_watch`]: trailing-edge debouncing on tokio timers.
//! - [`TriggerTask`]: a `ViewportTrigger` with its start-up delay on a tokio timer.
//! - [`ListController`]: a `WindowedList` bundled with the items it windows.
//!
//! Every type that owns a timer task aborts it on drop, so nothing fires after disposal.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod clock;
mod controller;
mod debounce;
mod error;
mod feed;
mod fetch;
mod trigger;

#[cfg(test)]
mod tests;

pub use controller::ListController;
pub use debounce::{DebouncedWatch, Debouncer, debounce_watch};
pub use error::FeedError;
pub use feed::InfiniteFeed;
pub use fetch::{FnFetcher, PageFetcher, fetch_fn};
pub use trigger::{TriggerStatus, TriggerTask};

pub use lazyfeed;
