use std::sync::Arc;

use crate::projection::{ProjectionCache, TableQuery};
use crate::selection::{Pagination, SelectionRecord};
use crate::{Column, Job, JobId, JobStatus, JobStore, PendingSendList, SortKey, TableNotice};

/// Table-owned state: query, pagination, selection, its own send list and the memoized
/// projection of the canonical store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableState {
    query: TableQuery,
    pagination: Pagination,
    selection: SelectionRecord,
    send_list: PendingSendList,
    projection: ProjectionCache,
    notice: Option<TableNotice>,
}

impl TableState {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            pagination: Pagination::new(items_per_page),
            ..Self::default()
        }
    }

    pub fn query(&self) -> &TableQuery {
        &self.query
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn selection(&self) -> &SelectionRecord {
        &self.selection
    }

    pub fn send_list(&self) -> &PendingSendList {
        &self.send_list
    }

    pub fn notice(&self) -> Option<&TableNotice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Option<TableNotice>) {
        self.notice = notice;
    }

    /// Filtered and sorted rows across all pages.
    pub fn rows(&self) -> &Arc<[Job]> {
        self.projection.rows()
    }

    pub fn page_rows(&self) -> &[Job] {
        let rows = self.projection.rows();
        &rows[self.pagination.range(rows.len())]
    }

    pub fn rendered_ids(&self) -> Vec<JobId> {
        self.page_rows().iter().map(|job| job.id).collect()
    }

    pub fn current_page(&self) -> usize {
        self.pagination.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.projection.rows().len())
    }

    /// AND over the rows rendered on the current page.
    pub fn select_all(&self) -> bool {
        self.selection
            .all_checked(self.current_page(), &self.rendered_ids())
    }

    pub fn any_checked(&self) -> bool {
        self.selection
            .any_checked(self.current_page(), &self.rendered_ids())
    }

    pub fn checked_ids(&self) -> Vec<JobId> {
        self.selection
            .checked_ids(self.current_page(), &self.rendered_ids())
    }

    /// Re-derives the projection from the store and keeps the page in range.
    pub fn refresh(&mut self, store: &JobStore) {
        self.projection.refresh(store, &self.query);
        self.pagination.clamp(self.projection.rows().len());
    }

    pub fn toggle_facet(&mut self, status: JobStatus, store: &JobStore) {
        self.query.facets.toggle(status);
        self.pagination.reset();
        self.query.search.clear();
        self.refresh(store);
    }

    pub fn clear_facets(&mut self, store: &JobStore) {
        self.query.facets.clear();
        self.refresh(store);
    }

    pub fn set_search(&mut self, term: String, store: &JobStore) {
        self.query.search = term;
        self.pagination.reset();
        self.refresh(store);
    }

    pub fn set_column_filter(&mut self, column: Column, value: String, store: &JobStore) {
        self.query.columns.set(column, value);
        self.pagination.reset();
        self.refresh(store);
    }

    pub fn set_sort(&mut self, sort: SortKey, store: &JobStore) {
        self.query.sort = sort;
        self.refresh(store);
    }

    pub fn go_to_page(&mut self, page: usize) -> bool {
        let count = self.projection.rows().len();
        self.pagination.go_to(page, count)
    }

    pub fn set_items_per_page(&mut self, items_per_page: usize) -> bool {
        let count = self.projection.rows().len();
        self.pagination.set_items_per_page(items_per_page, count)
    }

    /// Checks or unchecks the whole current page and stages its URLs accordingly.
    pub fn toggle_all(&mut self, checked: bool) {
        let page = self.current_page();
        let rendered = self.rendered_ids();
        self.selection.toggle_all(page, &rendered, checked);
        if checked {
            let urls: Vec<String> = self.page_rows().iter().map(|job| job.url.clone()).collect();
            self.send_list.replace(urls);
        } else {
            self.send_list.clear();
        }
    }

    pub fn toggle_row(&mut self, id: JobId, checked: bool) {
        let page = self.current_page();
        self.selection.toggle_one(page, id, checked);
        let url = self
            .page_rows()
            .iter()
            .find(|job| job.id == id)
            .map(|job| job.url.clone());
        if let Some(url) = url {
            if checked {
                self.send_list.push(url);
            } else {
                self.send_list.remove(&url);
            }
        }
    }

    pub fn row_url(&self, id: JobId) -> Option<String> {
        self.projection
            .rows()
            .iter()
            .find(|job| job.id == id)
            .map(|job| job.url.clone())
    }

    /// Drops `ids` from the current page's selection only.
    pub fn forget_deleted(&mut self, ids: &[JobId]) {
        let page = self.current_page();
        self.selection.remove_ids(page, ids);
    }

    /// Empties the view-local send list and every page's selection.
    pub fn reset_selection(&mut self) {
        self.send_list.clear();
        self.selection.clear();
    }
}
