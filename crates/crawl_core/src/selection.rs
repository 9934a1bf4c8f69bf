//! Page-scoped row selection and pagination.
//!
//! Selection is keyed by page number, not by item identity across the filtered set:
//! checking a row on page 1 says nothing about page 2, and moving to another page shows
//! that page's own record.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::JobId;

pub const PAGE_SIZES: [usize; 5] = [10, 20, 30, 40, 50];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// page number -> (job id -> checked)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionRecord {
    pages: BTreeMap<usize, BTreeMap<JobId, bool>>,
}

impl SelectionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the page's record with every rendered id set to `checked`.
    pub fn toggle_all(&mut self, page: usize, rendered: &[JobId], checked: bool) {
        let record = rendered.iter().map(|id| (*id, checked)).collect();
        self.pages.insert(page, record);
    }

    pub fn toggle_one(&mut self, page: usize, id: JobId, checked: bool) {
        self.pages.entry(page).or_default().insert(id, checked);
    }

    pub fn is_checked(&self, page: usize, id: JobId) -> bool {
        self.pages
            .get(&page)
            .and_then(|record| record.get(&id))
            .copied()
            .unwrap_or(false)
    }

    /// Checked ids on `page` that are still rendered there; stale entries are skipped.
    pub fn checked_ids(&self, page: usize, rendered: &[JobId]) -> Vec<JobId> {
        rendered
            .iter()
            .copied()
            .filter(|id| self.is_checked(page, *id))
            .collect()
    }

    pub fn all_checked(&self, page: usize, rendered: &[JobId]) -> bool {
        !rendered.is_empty() && rendered.iter().all(|id| self.is_checked(page, *id))
    }

    pub fn any_checked(&self, page: usize, rendered: &[JobId]) -> bool {
        rendered.iter().any(|id| self.is_checked(page, *id))
    }

    /// Drops exactly `ids` from `page`'s record; other pages are left alone.
    pub fn remove_ids(&mut self, page: usize, ids: &[JobId]) {
        if let Some(record) = self.pages.get_mut(&page) {
            record.retain(|id, _| !ids.contains(id));
        }
    }

    /// Raw record for one page, stale ids included.
    pub fn page(&self, page: usize) -> Option<&BTreeMap<JobId, bool>> {
        self.pages.get(&page)
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}

/// Current page (1-based) and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    items_per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(items_per_page: usize) -> Self {
        let items_per_page = if PAGE_SIZES.contains(&items_per_page) {
            items_per_page
        } else {
            DEFAULT_PAGE_SIZE
        };
        Self {
            current_page: 1,
            items_per_page,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn total_pages(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.items_per_page)
    }

    /// Moves to `page` if it lies within `1..=total_pages`.
    pub fn go_to(&mut self, page: usize, item_count: usize) -> bool {
        if page < 1 || page > self.total_pages(item_count) {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Changes the page size and pulls the current page back inside the new page count.
    pub fn set_items_per_page(&mut self, items_per_page: usize, item_count: usize) -> bool {
        if !PAGE_SIZES.contains(&items_per_page) {
            return false;
        }
        self.items_per_page = items_per_page;
        self.clamp(item_count);
        true
    }

    pub fn clamp(&mut self, item_count: usize) {
        let last = self.total_pages(item_count).max(1);
        self.current_page = self.current_page.clamp(1, last);
    }

    /// Index range of the current page within a list of `item_count` rows.
    pub fn range(&self, item_count: usize) -> Range<usize> {
        let start = ((self.current_page - 1) * self.items_per_page).min(item_count);
        let end = (self.current_page * self.items_per_page).min(item_count);
        start..end
    }
}
