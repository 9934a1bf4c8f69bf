//! Row-level lifecycle updates travelling from the table to the page-level working list.
//!
//! Every event names the job it is about, so events can be applied in arrival order
//! without any reset between unrelated toggles.

use std::collections::VecDeque;

use crate::{Job, JobId, JobStatus, PendingSendList};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// The server accepted a pause toggle.
    PauseToggled { id: JobId, should_pause: bool },
    /// A follow-up stage returned this job record.
    StageResult { job: Job },
    /// Fetch-result settled the job's status.
    Settled {
        id: JobId,
        url: String,
        status: JobStatus,
    },
    /// These URLs were deleted on the server.
    JobsRemoved { urls: Vec<String> },
}

/// FIFO of bridge events awaiting the page-level holder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventBridge {
    queue: VecDeque<BridgeEvent>,
}

impl EventBridge {
    pub fn post(&mut self, event: BridgeEvent) {
        self.queue.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = BridgeEvent> + '_ {
        self.queue.drain(..)
    }
}

/// The dashboard's in-flight view: URLs staged or submitted and not yet done.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkingList {
    entries: Vec<Job>,
}

impl WorkingList {
    pub fn entries(&self) -> &[Job] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.entries.iter().any(|entry| entry.url == url)
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn push_unsaved(&mut self, url: impl Into<String>) {
        self.entries.push(Job::unsaved(url));
    }

    pub fn replace(&mut self, entries: Vec<Job>) {
        self.entries = entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops entries that were never created on the server.
    pub fn clear_unsaved(&mut self) {
        self.entries.retain(|entry| !entry.is_unsaved());
    }

    pub fn remove_url(&mut self, url: &str) {
        self.entries.retain(|entry| entry.url != url);
    }

    /// Overwrites the entry with the same id; never inserts.
    pub fn overwrite(&mut self, job: &Job) {
        for entry in self.entries.iter_mut().filter(|entry| entry.id == job.id) {
            *entry = job.clone();
        }
    }

    pub fn set_should_pause(&mut self, id: JobId, should_pause: bool) {
        for entry in self.entries.iter_mut().filter(|entry| entry.id == id) {
            entry.should_pause = should_pause;
        }
    }

    /// Done leaves the working list and the pending list; error stays visible as error.
    pub fn settle(&mut self, pending: &mut PendingSendList, url: &str, status: JobStatus) {
        match status {
            JobStatus::Done => {
                pending.remove(url);
                self.remove_url(url);
            }
            JobStatus::Error => {
                for entry in self.entries.iter_mut().filter(|entry| entry.url == url) {
                    entry.status = JobStatus::Error;
                }
            }
            JobStatus::Queued | JobStatus::Running => {}
        }
    }

    pub fn apply(&mut self, pending: &mut PendingSendList, event: BridgeEvent) {
        match event {
            BridgeEvent::PauseToggled { id, should_pause } => {
                self.set_should_pause(id, should_pause);
            }
            BridgeEvent::StageResult { job } => self.overwrite(&job),
            BridgeEvent::Settled { url, status, .. } => self.settle(pending, &url, status),
            BridgeEvent::JobsRemoved { urls } => {
                for url in &urls {
                    pending.remove(url);
                    self.remove_url(url);
                }
            }
        }
    }
}
