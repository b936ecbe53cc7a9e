//! Scrollable list over a filtered view of its items.
//!
//! The list does not decide what is visible: the owner computes the
//! positions that pass the current filter and hands them over with
//! [`ScrollableList::set_view`]. Selection follows the selected item across
//! view changes when it is still visible.

pub struct ScrollableList<T> {
    pub items: Vec<T>,
    pub view: Vec<usize>,
    pub selected: usize,
    pub scroll_offset: usize,
}

impl<T> ScrollableList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            view: Vec::new(),
            selected: 0,
            scroll_offset: 0,
        }
    }

    /// Replace the items and the view together.
    pub fn set_items(&mut self, items: Vec<T>, view: Vec<usize>) {
        self.items = items;
        self.set_view(view);
    }

    pub fn set_view(&mut self, view: Vec<usize>) {
        let previous = self.selected_original_index();
        self.view = view.into_iter().filter(|&i| i < self.items.len()).collect();
        match previous.and_then(|p| self.view.iter().position(|&i| i == p)) {
            Some(pos) => self.selected = pos,
            None => self.selected = self.selected.min(self.view.len().saturating_sub(1)),
        }
        if self.scroll_offset > self.selected {
            self.scroll_offset = self.selected;
        }
    }

    pub fn select_up(&mut self, n: usize) {
        if self.view.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        if self.view.is_empty() {
            return;
        }
        self.selected = (self.selected + n).min(self.view.len().saturating_sub(1));
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.view.len().saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&T> {
        let idx = self.view.get(self.selected)?;
        self.items.get(*idx)
    }

    pub fn selected_original_index(&self) -> Option<usize> {
        self.view.get(self.selected).copied()
    }

    /// (original_index, &item) pairs for `rows` slots starting at the scroll
    /// offset. Call `ensure_visible` first.
    pub fn visible_items(&self, rows: usize) -> Vec<(usize, &T)> {
        if rows == 0 || self.view.is_empty() {
            return Vec::new();
        }
        let start = self.scroll_offset.min(self.view.len());
        let end = (start + rows).min(self.view.len());
        self.view[start..end]
            .iter()
            .map(|&i| (i, &self.items[i]))
            .collect()
    }

    pub fn ensure_visible(&mut self, rows: usize) {
        if rows == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + rows {
            self.scroll_offset = self.selected.saturating_sub(rows - 1);
        }
    }

    /// Select the slot at `row` (counted from the scroll offset).
    /// Returns true if it held an item.
    pub fn handle_click(&mut self, row: usize) -> bool {
        let target = self.scroll_offset + row;
        if target < self.view.len() {
            self.selected = target;
            return true;
        }
        false
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn total_len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for ScrollableList<T> {
    fn default() -> Self {
        Self::new()
    }
}
