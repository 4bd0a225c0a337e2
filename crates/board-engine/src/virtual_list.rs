//! Virtual List Geometry
//!
//! Row sizes, offsets and the visible window for one column's card list,
//! plus the scroll watcher that decides when to page in older cards.

use std::ops::Range;

use crate::model::{Column, ColumnId};
use crate::row_height::RowHeightEstimator;

/// Sizes and offsets of a column's rows.
///
/// The size cache is keyed by row index and rebuilt whenever the column's
/// card sequence changes (tracked through `Column::revision`).
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualList {
    measured: Option<(ColumnId, u64)>,
    sizes: Vec<f64>,
    /// offsets[i] is the top of row i; one extra entry for the end
    offsets: Vec<f64>,
    placeholder: bool,
    placeholder_height: f64,
}

impl VirtualList {
    pub fn new(placeholder_height: f64) -> Self {
        Self {
            measured: None,
            sizes: Vec::new(),
            offsets: vec![0.0],
            placeholder: false,
            placeholder_height,
        }
    }

    /// Remeasure if `column` is not the sequence last measured. Returns
    /// whether the cache was rebuilt.
    pub fn sync(&mut self, column: &Column, estimator: &impl RowHeightEstimator) -> bool {
        let key = (column.id.clone(), column.revision);
        if self.measured.as_ref() == Some(&key) && self.sizes.len() == column.cards.len() {
            return false;
        }
        self.sizes = column.cards.iter().map(|card| estimator.row_height(card)).collect();
        self.offsets = Vec::with_capacity(self.sizes.len() + 1);
        let mut top = 0.0;
        self.offsets.push(top);
        for size in &self.sizes {
            top += size;
            self.offsets.push(top);
        }
        self.measured = Some(key);
        true
    }

    /// Drop every cached size
    pub fn invalidate(&mut self) {
        self.measured = None;
    }

    /// Show a trailing empty row as the drop slot after the last card
    pub fn set_placeholder(&mut self, visible: bool) {
        self.placeholder = visible;
    }

    pub fn has_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Card rows only
    pub fn card_count(&self) -> usize {
        self.sizes.len()
    }

    /// Rows to render, including the placeholder
    pub fn item_count(&self) -> usize {
        self.sizes.len() + usize::from(self.placeholder)
    }

    pub fn row_size(&self, index: usize) -> f64 {
        match self.sizes.get(index) {
            Some(size) => *size,
            None if self.placeholder && index == self.sizes.len() => self.placeholder_height,
            None => 0.0,
        }
    }

    pub fn row_offset(&self, index: usize) -> f64 {
        let index = index.min(self.sizes.len());
        self.offsets[index]
    }

    /// Height of all card rows; what the bottom trigger compares against
    pub fn content_height(&self) -> f64 {
        self.offsets.last().copied().unwrap_or_default()
    }

    /// Scrollable height including the placeholder
    pub fn scroll_extent(&self) -> f64 {
        self.content_height() + if self.placeholder { self.placeholder_height } else { 0.0 }
    }

    /// Rows intersecting `[scroll_offset, scroll_offset + viewport)`, widened
    /// by `overscan` on each side
    pub fn visible_range(&self, scroll_offset: f64, viewport: f64, overscan: usize) -> Range<usize> {
        let count = self.item_count();
        if count == 0 {
            return 0..0;
        }
        let top = scroll_offset.max(0.0);
        let bottom = top + viewport.max(0.0);

        // first row whose bottom edge is below `top`
        let first = self.offsets[1..].partition_point(|end| *end <= top);
        let mut last = first;
        while last < count && self.row_offset(last) < bottom {
            last += 1;
        }
        let start = first.saturating_sub(overscan).min(count);
        let end = (last + overscan).min(count).max(start);
        start..end
    }
}

/// Decides when a scrolled list has reached its loaded bottom
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollWatcher {
    seen_first: bool,
    tolerance: f64,
}

impl ScrollWatcher {
    pub fn new(tolerance: f64) -> Self {
        Self {
            seen_first: false,
            tolerance,
        }
    }

    /// Feed one scroll event. The first event after mount is the list
    /// positioning itself and never triggers. `suppressed` is set while a
    /// card is dragged over the list.
    pub fn on_scroll(&mut self, scroll_offset: f64, viewport: f64, content_height: f64, suppressed: bool) -> bool {
        if !self.seen_first {
            self.seen_first = true;
            return false;
        }
        !suppressed && near_bottom(scroll_offset, viewport, content_height, self.tolerance)
    }

    /// Forget the mount event, e.g. after the list remounts
    pub fn reset(&mut self) {
        self.seen_first = false;
    }
}

/// Whether the viewport bottom has reached the content bottom
pub fn near_bottom(scroll_offset: f64, viewport: f64, content_height: f64, tolerance: f64) -> bool {
    scroll_offset + viewport >= content_height - tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Card;

    struct FixedHeight(f64);

    impl RowHeightEstimator for FixedHeight {
        fn row_height(&self, _card: &Card) -> f64 {
            self.0
        }
    }

    fn column(n: usize) -> Column {
        Column::new("todo", "To Do").with_cards((0..n).map(|i| Card::new(format!("c{}", i), "t")).collect())
    }

    #[test]
    fn test_offsets_accumulate() {
        let mut list = VirtualList::new(50.0);
        assert!(list.sync(&column(3), &FixedHeight(100.0)));

        assert_eq!(list.row_offset(0), 0.0);
        assert_eq!(list.row_offset(2), 200.0);
        assert_eq!(list.content_height(), 300.0);
    }

    #[test]
    fn test_cache_rebuilds_only_on_revision_change() {
        let mut list = VirtualList::new(50.0);
        let mut col = column(3);
        assert!(list.sync(&col, &FixedHeight(100.0)));
        assert!(!list.sync(&col, &FixedHeight(10.0)));
        assert_eq!(list.content_height(), 300.0);

        col.revision += 1;
        assert!(list.sync(&col, &FixedHeight(10.0)));
        assert_eq!(list.content_height(), 30.0);

        list.invalidate();
        assert!(list.sync(&col, &FixedHeight(20.0)));
    }

    #[test]
    fn test_placeholder_adds_trailing_row() {
        let mut list = VirtualList::new(50.0);
        list.sync(&column(2), &FixedHeight(100.0));
        assert_eq!(list.item_count(), 2);

        list.set_placeholder(true);
        assert_eq!(list.item_count(), 3);
        assert_eq!(list.row_size(2), 50.0);
        assert_eq!(list.row_offset(2), 200.0);
        assert_eq!(list.content_height(), 200.0);
        assert_eq!(list.scroll_extent(), 250.0);
    }

    #[test]
    fn test_placeholder_in_empty_column() {
        let mut list = VirtualList::new(50.0);
        list.sync(&column(0), &FixedHeight(100.0));
        assert_eq!(list.visible_range(0.0, 600.0, 2), 0..0);

        list.set_placeholder(true);
        assert_eq!(list.visible_range(0.0, 600.0, 2), 0..1);
    }

    #[test]
    fn test_visible_range_renders_only_the_window() {
        let mut list = VirtualList::new(50.0);
        list.sync(&column(100), &FixedHeight(100.0));

        assert_eq!(list.visible_range(0.0, 600.0, 0), 0..6);
        assert_eq!(list.visible_range(1050.0, 600.0, 0), 10..17);
        assert_eq!(list.visible_range(1050.0, 600.0, 2), 8..19);
        assert_eq!(list.visible_range(9500.0, 600.0, 3), 92..100);
    }

    #[test]
    fn test_first_scroll_is_ignored() {
        let mut watcher = ScrollWatcher::new(1.0);
        assert!(!watcher.on_scroll(400.0, 600.0, 1000.0, false));
        assert!(watcher.on_scroll(400.0, 600.0, 1000.0, false));
    }

    #[test]
    fn test_trigger_respects_tolerance_and_suppression() {
        let mut watcher = ScrollWatcher::new(1.0);
        watcher.on_scroll(0.0, 600.0, 1000.0, false);

        assert!(!watcher.on_scroll(398.0, 600.0, 1000.0, false));
        assert!(watcher.on_scroll(399.0, 600.0, 1000.0, false));
        assert!(!watcher.on_scroll(400.0, 600.0, 1000.0, true));
    }
}
