use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type JobId = i64;

/// Id carried by a job that was added locally and has not been created on the server yet.
pub const UNSAVED_JOB_ID: JobId = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Error,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Queued,
        JobStatus::Running,
        JobStatus::Done,
        JobStatus::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDetail {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// One analyzed URL as the server reports it.
///
/// Everything past `should_pause` is only meaningful once the job is `done`; the server
/// sends `null` or omits the fields before that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub url: String,
    pub status: JobStatus,
    #[serde(default)]
    pub should_pause: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub html_version: Option<String>,
    #[serde(default)]
    pub heading_counts: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    pub internal_links_count: Option<u32>,
    #[serde(default)]
    pub external_links_count: Option<u32>,
    #[serde(default)]
    pub inaccessible_links_count: Option<u32>,
    #[serde(default)]
    pub has_login_form: Option<bool>,
    #[serde(default)]
    pub internal_links: Option<Vec<LinkDetail>>,
    #[serde(default)]
    pub external_links: Option<Vec<LinkDetail>>,
    #[serde(default)]
    pub inaccessible_links: Option<Vec<LinkDetail>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Job {
    /// A bare job record with no result attributes.
    pub fn new(id: JobId, url: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id,
            user_id: None,
            url: url.into(),
            status,
            should_pause: false,
            title: None,
            html_version: None,
            heading_counts: None,
            internal_links_count: None,
            external_links_count: None,
            inaccessible_links_count: None,
            has_login_form: None,
            internal_links: None,
            external_links: None,
            inaccessible_links: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// A locally added entry waiting for its first submission.
    pub fn unsaved(url: impl Into<String>) -> Self {
        Self::new(UNSAVED_JOB_ID, url, JobStatus::Queued)
    }

    pub fn is_unsaved(&self) -> bool {
        self.id == UNSAVED_JOB_ID
    }
}

/// Canonical job list, in server order, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobStore {
    jobs: Vec<Job>,
    revision: u64,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Bumped on every mutation; lets derived views skip recomputation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn find_by_url(&self, url: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.url == url)
    }

    pub fn replace_all(&mut self, jobs: Vec<Job>) {
        self.jobs = jobs
            .into_iter()
            .filter(|job| !job.is_unsaved())
            .collect();
        self.revision += 1;
    }

    /// Last writer wins: an existing entry with the same id is overwritten in place,
    /// otherwise the job is appended.
    pub fn upsert(&mut self, job: Job) {
        if job.is_unsaved() {
            return;
        }
        match self.jobs.iter_mut().find(|existing| existing.id == job.id) {
            Some(existing) => *existing = job,
            None => self.jobs.push(job),
        }
        self.revision += 1;
    }

    pub fn set_should_pause(&mut self, id: JobId, should_pause: bool) -> bool {
        match self.jobs.iter_mut().find(|job| job.id == id) {
            Some(job) => {
                job.should_pause = should_pause;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn remove_ids(&mut self, ids: &[JobId]) -> Vec<Job> {
        let (removed, kept): (Vec<Job>, Vec<Job>) = std::mem::take(&mut self.jobs)
            .into_iter()
            .partition(|job| ids.contains(&job.id));
        self.jobs = kept;
        if !removed.is_empty() {
            self.revision += 1;
        }
        removed
    }

    pub fn is_paused(&self, id: JobId) -> bool {
        self.get(id).is_some_and(|job| job.should_pause)
    }
}
