use std::collections::BTreeMap;

use crate::bridge::{EventBridge, WorkingList};
use crate::projection::status_counts;
use crate::view_model::{AppViewModel, JobRowView, TableView, WorkingRowView};
use crate::{
    JobId, JobStore, PendingSendList, StageSchedule, Surface, TableState, UserNotice,
    ValidationError,
};

pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// create -> enqueue -> set-running -> fetch-result
    Batch,
    /// set-running -> fetch-result after a resume
    Resume,
}

/// One scheduled pass of a set of jobs through the remote stages. Dropped once its
/// fetch-result answer is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub kind: RunKind,
    pub surface: Surface,
    pub urls: Vec<String>,
    pub ids: Vec<JobId>,
    pub failed_urls: Vec<String>,
}

impl Run {
    pub(crate) fn new(kind: RunKind, surface: Surface, urls: Vec<String>) -> Self {
        Self {
            kind,
            surface,
            urls,
            ids: Vec::new(),
            failed_urls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub(crate) jobs: JobStore,
    pub(crate) working: WorkingList,
    pub(crate) pending: PendingSendList,
    pub(crate) url_input: String,
    pub(crate) add_url_error: Option<ValidationError>,
    pub(crate) notice: Option<UserNotice>,
    pub(crate) runs: BTreeMap<RunId, Run>,
    pub(crate) next_run: RunId,
    pub(crate) toggles_in_flight: BTreeMap<JobId, Surface>,
    pub(crate) table: TableState,
    pub(crate) bridge: EventBridge,
    pub(crate) schedule: StageSchedule,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(StageSchedule::default(), crate::selection::DEFAULT_PAGE_SIZE)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(schedule: StageSchedule, items_per_page: usize) -> Self {
        Self {
            jobs: JobStore::new(),
            working: WorkingList::default(),
            pending: PendingSendList::new(),
            url_input: String::new(),
            add_url_error: None,
            notice: None,
            runs: BTreeMap::new(),
            next_run: 1,
            toggles_in_flight: BTreeMap::new(),
            table: TableState::new(items_per_page),
            bridge: EventBridge::default(),
            schedule,
            dirty: false,
        }
    }

    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    pub fn working(&self) -> &WorkingList {
        &self.working
    }

    pub fn pending(&self) -> &PendingSendList {
        &self.pending
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn notice(&self) -> Option<&UserNotice> {
        self.notice.as_ref()
    }

    pub fn add_url_error(&self) -> Option<&ValidationError> {
        self.add_url_error.as_ref()
    }

    pub fn run(&self, id: RunId) -> Option<&Run> {
        self.runs.get(&id)
    }

    pub fn is_toggling(&self, id: JobId) -> bool {
        self.toggles_in_flight.contains_key(&id)
    }

    /// True while a dashboard batch has not reached its fetch-result answer.
    pub fn is_analyzing(&self) -> bool {
        self.runs
            .values()
            .any(|run| run.kind == RunKind::Batch && run.surface == Surface::Dashboard)
    }

    pub fn view(&self) -> AppViewModel {
        let page = self.table.current_page();
        let rows = self
            .table
            .page_rows()
            .iter()
            .map(|job| JobRowView {
                id: job.id,
                url: job.url.clone(),
                status: job.status,
                should_pause: job.should_pause,
                checked: self.table.selection().is_checked(page, job.id),
                title: job.title.clone(),
                html_version: job.html_version.clone(),
                internal_links_count: job.internal_links_count,
                external_links_count: job.external_links_count,
                created_at: job.created_at.clone(),
                updated_at: job.updated_at.clone(),
            })
            .collect();

        AppViewModel {
            url_input: self.url_input.clone(),
            add_url_error: self.add_url_error.as_ref().map(ToString::to_string),
            notice: self.notice.as_ref().map(ToString::to_string),
            analyzing: self.is_analyzing(),
            working: self
                .working
                .entries()
                .iter()
                .map(|job| WorkingRowView {
                    id: job.id,
                    url: job.url.clone(),
                    status: job.status,
                    should_pause: job.should_pause,
                    toggling: self.is_toggling(job.id),
                })
                .collect(),
            pending_urls: self.pending.urls().to_vec(),
            job_count: self.jobs.len(),
            table: TableView {
                rows,
                filtered_count: self.table.rows().len(),
                current_page: page,
                total_pages: self.table.total_pages(),
                items_per_page: self.table.pagination().items_per_page(),
                select_all: self.table.select_all(),
                any_checked: self.table.any_checked(),
                status_counts: status_counts(self.jobs.jobs()),
                send_urls: self.table.send_list().urls().to_vec(),
                notice: self.table.notice().map(ToString::to_string),
            },
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Applies queued bridge events to the working and pending lists.
    pub(crate) fn pump_bridge(&mut self) {
        let events: Vec<_> = self.bridge.drain().collect();
        for event in events {
            self.working.apply(&mut self.pending, event);
        }
    }

    pub(crate) fn is_paused(&self, id: JobId) -> bool {
        self.jobs.is_paused(id) || self.working.get(id).is_some_and(|job| job.should_pause)
    }

    pub(crate) fn start_run(&mut self, run: Run) -> RunId {
        let id = self.next_run;
        self.next_run += 1;
        self.runs.insert(id, run);
        id
    }
}
