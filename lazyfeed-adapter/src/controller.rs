use lazyfeed::{Align, Window, WindowOptions, WindowRange, WindowedList};

use crate::{InfiniteFeed, PageFetcher};

/// A framework-neutral list controller: the items plus the [`WindowedList`] that windows them.
///
/// The adapter wires [`Self::on_scroll`] to the scroll container and renders [`Self::window`].
/// `count` in the window options always tracks the number of items held here.
#[derive(Clone, Debug)]
pub struct ListController<T> {
    items: Vec<T>,
    list: WindowedList,
    generation: Option<u64>,
}

impl<T> ListController<T> {
    pub fn new(item_height: u32, container_height: u32) -> Self {
        Self::from_items(Vec::new(), WindowOptions::new(0, item_height, container_height))
    }

    /// Creates a controller over `items`. `options.count` is replaced by `items.len()`.
    pub fn from_items(items: Vec<T>, options: WindowOptions) -> Self {
        let mut options = options;
        options.count = items.len();
        Self {
            items,
            list: WindowedList::new(options),
            generation: None,
        }
    }

    pub fn windowed_list(&self) -> &WindowedList {
        &self.list
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Scroll handler. Returns the rendered range for the new offset.
    pub fn on_scroll(&mut self, scroll_offset: u64) -> WindowRange {
        self.list.on_scroll(scroll_offset)
    }

    /// Container resize handler.
    pub fn on_resize(&mut self, container_height: u32) {
        self.list.set_container_height(container_height);
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.list.set_overscan(overscan);
    }

    /// The rendering-ready slice at the current scroll offset.
    pub fn window(&self) -> Window<'_, T> {
        self.list.slice(&self.items)
    }

    /// Whether the rendered range reaches within `threshold` items of the end.
    ///
    /// Typical use: call `load_more` on the feed when this turns `true`.
    pub fn near_end(&self, threshold: usize) -> bool {
        self.list.range().end_index.saturating_add(threshold) >= self.items.len()
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.extend(items);
        self.list.set_count(self.items.len());
    }

    /// Replaces all items and scrolls back to the top.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.list.set_count(self.items.len());
        self.list.on_scroll(0);
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    /// Scrolls so `index` is in view and returns the applied offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        let offset = self.list.scroll_to_index_offset(index, align);
        self.list.on_scroll(offset);
        offset
    }
}

impl<T: Clone> ListController<T> {
    /// Mirrors an append-only source (such as a feed's items) tagged with the loader generation.
    ///
    /// Within one generation new trailing items are appended. The first sync, a changed
    /// generation, or a source shorter than what is held replaces the controller's items
    /// wholesale and scrolls back to the top.
    pub fn sync_items(&mut self, generation: u64, source: &[T]) {
        if self.generation != Some(generation) || source.len() < self.items.len() {
            self.generation = Some(generation);
            self.replace(source.to_vec());
            return;
        }
        let new = &source[self.items.len()..];
        if new.is_empty() {
            return;
        }
        self.extend(new.iter().cloned());
    }

    /// Syncs with the feed's current items and generation, read under one lock.
    pub fn sync_with<F>(&mut self, feed: &InfiniteFeed<F>)
    where
        F: PageFetcher<Item = T>,
    {
        feed.with_generation_and_items(|generation, items| self.sync_items(generation, items));
    }
}
