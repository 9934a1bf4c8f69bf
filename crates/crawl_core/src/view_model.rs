use std::collections::BTreeMap;

use crate::{JobId, JobStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub url_input: String,
    pub add_url_error: Option<String>,
    pub notice: Option<String>,
    pub analyzing: bool,
    pub working: Vec<WorkingRowView>,
    pub pending_urls: Vec<String>,
    pub job_count: usize,
    pub table: TableView,
    pub dirty: bool,
}

/// One entry of the dashboard's in-flight list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingRowView {
    pub id: JobId,
    pub url: String,
    pub status: JobStatus,
    pub should_pause: bool,
    pub toggling: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableView {
    pub rows: Vec<JobRowView>,
    pub filtered_count: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub items_per_page: usize,
    pub select_all: bool,
    pub any_checked: bool,
    pub status_counts: BTreeMap<JobStatus, usize>,
    pub send_urls: Vec<String>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub id: JobId,
    pub url: String,
    pub status: JobStatus,
    pub should_pause: bool,
    pub checked: bool,
    pub title: Option<String>,
    pub html_version: Option<String>,
    pub internal_links_count: Option<u32>,
    pub external_links_count: Option<u32>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
