use core::cmp;

use crate::{Align, WindowOptions, WindowRange};

/// The rendering-ready slice produced by [`WindowedList::slice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window<'a, T> {
    /// Items in `range`, in list order.
    pub items: &'a [T],
    /// Index range of `items` in the full list (overscan included).
    pub range: WindowRange,
    /// Height of the whole scrollable content.
    pub total_height: u64,
    /// Offset at which the first item of `items` must be positioned.
    pub offset_y: u64,
}

impl<'a, T> Window<'a, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates `(index_in_full_list, item)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a T)> {
        let start = self.range.start_index;
        self.items.iter().enumerate().map(move |(i, it)| (start + i, it))
    }
}

/// Fixed-height list windowing.
///
/// Given the scroll offset, the visible range starts at `floor(offset / item_height)` and spans
/// `ceil(container_height / item_height)` items. The rendered range widens that by `overscan` on
/// both sides and is clamped to `[0, count]`.
///
/// Recomputation is pure and cheap, so [`Self::on_scroll`] should be called for every scroll
/// event with no debouncing.
#[derive(Clone, Debug)]
pub struct WindowedList {
    options: WindowOptions,
    scroll_offset: u64,
}

impl WindowedList {
    pub fn new(options: WindowOptions) -> Self {
        fdebug!(
            count = options.count,
            item_height = options.item_height,
            container_height = options.container_height,
            overscan = options.overscan,
            "WindowedList::new"
        );
        Self {
            options,
            scroll_offset: 0,
        }
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: WindowOptions) {
        self.options = options;
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn set_count(&mut self, count: usize) {
        self.options.count = count;
    }

    pub fn item_height(&self) -> u32 {
        self.options.item_height.max(1)
    }

    pub fn set_item_height(&mut self, item_height: u32) {
        self.options.item_height = item_height.max(1);
    }

    pub fn container_height(&self) -> u32 {
        self.options.container_height
    }

    pub fn set_container_height(&mut self, container_height: u32) {
        self.options.container_height = container_height;
    }

    pub fn overscan(&self) -> usize {
        self.options.overscan
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.options.overscan = overscan;
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    /// Scroll handler: records the new offset and returns the rendered range for it.
    pub fn on_scroll(&mut self, scroll_offset: u64) -> WindowRange {
        self.scroll_offset = scroll_offset;
        let range = self.range();
        ftrace!(
            scroll_offset,
            start = range.start_index,
            end = range.end_index,
            "on_scroll"
        );
        range
    }

    pub fn set_scroll_offset_clamped(&mut self, scroll_offset: u64) {
        self.scroll_offset = self.clamp_scroll_offset(scroll_offset);
    }

    pub fn total_height(&self) -> u64 {
        total_height(self.options.count, self.item_height())
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.total_height()
            .saturating_sub(self.options.container_height as u64)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    /// Strictly visible range (no overscan) at the current scroll offset.
    pub fn visible_range(&self) -> WindowRange {
        self.visible_range_for(self.scroll_offset)
    }

    pub fn visible_range_for(&self, scroll_offset: u64) -> WindowRange {
        self.compute_visible_range(self.options.count, scroll_offset)
    }

    /// Rendered range (overscan included) at the current scroll offset.
    pub fn range(&self) -> WindowRange {
        self.range_for(self.scroll_offset)
    }

    pub fn range_for(&self, scroll_offset: u64) -> WindowRange {
        self.compute_range(self.options.count, scroll_offset)
    }

    /// Vertical position of the first rendered item.
    pub fn offset_y(&self) -> u64 {
        self.range().start_index as u64 * self.item_height() as u64
    }

    /// Slices `items` for the current scroll offset.
    ///
    /// The slice is computed against `items.len()`, so it stays in bounds even when the
    /// configured `count` lags behind the data.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> Window<'a, T> {
        let h = self.item_height();
        let range = self.compute_range(items.len(), self.scroll_offset);
        Window {
            items: &items[range.start_index..range.end_index],
            range,
            total_height: total_height(items.len(), h),
            offset_y: range.start_index as u64 * h as u64,
        }
    }

    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let count = self.options.count;
        if count == 0 {
            return None;
        }
        let index = offset / self.item_height() as u64;
        Some(cmp::min(index, (count - 1) as u64) as usize)
    }

    pub fn item_start(&self, index: usize) -> Option<u64> {
        (index < self.options.count).then(|| index as u64 * self.item_height() as u64)
    }

    /// Computes the (clamped) scroll offset that brings `index` into view.
    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        let count = self.options.count;
        if count == 0 {
            return 0;
        }
        let index = index.min(count - 1);
        let size = self.item_height() as u64;
        let start = index as u64 * size;
        let end = start.saturating_add(size);
        let view = self.options.container_height as u64;

        let target = match align {
            Align::Start => start,
            Align::End => end.saturating_sub(view),
            Align::Center => start.saturating_add(size / 2).saturating_sub(view / 2),
            Align::Auto => {
                let cur = self.scroll_offset;
                let cur_end = cur.saturating_add(view);
                if start >= cur && end <= cur_end {
                    cur
                } else if start < cur {
                    start
                } else {
                    end.saturating_sub(view)
                }
            }
        };

        self.clamp_scroll_offset(target)
    }

    fn compute_range(&self, count: usize, scroll_offset: u64) -> WindowRange {
        let mut range = self.compute_visible_range(count, scroll_offset);
        if count == 0 {
            return range;
        }
        let overscan = self.options.overscan;
        range.start_index = range.start_index.saturating_sub(overscan);
        range.end_index = cmp::min(count, range.end_index.saturating_add(overscan));
        range
    }

    fn compute_visible_range(&self, count: usize, scroll_offset: u64) -> WindowRange {
        let view = self.options.container_height as u64;
        if count == 0 {
            return WindowRange::default();
        }

        let h = self.item_height() as u64;
        let max_scroll = total_height(count, self.item_height()).saturating_sub(view);
        let offset = scroll_offset.min(max_scroll);

        let first = cmp::min(offset / h, count as u64) as usize;
        let visible = view.div_ceil(h);
        let last = cmp::min((first as u64).saturating_add(visible), count as u64) as usize;

        WindowRange {
            start_index: first,
            end_index: last,
        }
    }
}

fn total_height(count: usize, item_height: u32) -> u64 {
    (count as u64).saturating_mul(item_height as u64)
}
