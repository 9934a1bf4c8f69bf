//! Filter, search and sort over the canonical job list.
//!
//! [`project`] is a pure function of the jobs and a [`TableQuery`]. [`ProjectionCache`]
//! wraps it so that an unchanged input hands back the same shared result instead of a
//! fresh, structurally equal copy.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::DateTime;

use crate::{Job, JobStatus, JobStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Id,
    Url,
    Title,
    Status,
    HtmlVersion,
    InternalLinksCount,
    ExternalLinksCount,
    InaccessibleLinksCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Title,
    Status,
    HtmlVersion,
}

/// Per-column substring filters, case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnFilters {
    pub id: String,
    pub title: String,
    pub status: String,
    pub html_version: String,
}

impl ColumnFilters {
    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        let value = value.into();
        match column {
            Column::Id => self.id = value,
            Column::Title => self.title = value,
            Column::Status => self.status = value,
            Column::HtmlVersion => self.html_version = value,
        }
    }

    fn matches(&self, job: &Job) -> bool {
        contains_folded(&job.id.to_string(), &self.id)
            && contains_folded(job.title.as_deref().unwrap_or(""), &self.title)
            && contains_folded(job.status.as_str(), &self.status)
            && contains_folded(job.html_version.as_deref().unwrap_or(""), &self.html_version)
    }
}

/// Selected status facets. An empty set means "all".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FacetSet {
    selected: BTreeSet<JobStatus>,
}

impl FacetSet {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of(statuses: impl IntoIterator<Item = JobStatus>) -> Self {
        Self {
            selected: statuses.into_iter().collect(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, status: JobStatus) -> bool {
        self.selected.contains(&status)
    }

    /// Adds the facet, or removes it when already selected. Removing the last facet
    /// falls back to "all".
    pub fn toggle(&mut self, status: JobStatus) {
        if !self.selected.remove(&status) {
            self.selected.insert(status);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableQuery {
    pub facets: FacetSet,
    pub columns: ColumnFilters,
    pub search: String,
    pub sort: SortKey,
}

impl TableQuery {
    fn search_active(&self) -> bool {
        !self.search.trim().is_empty()
    }

    /// A non-empty search replaces the column filters entirely.
    fn matches(&self, job: &Job) -> bool {
        if self.search_active() {
            let term = self.search.as_str();
            contains_folded(&job.id.to_string(), term)
                || contains_folded(job.title.as_deref().unwrap_or(""), term)
                || contains_folded(job.html_version.as_deref().unwrap_or(""), term)
                || contains_folded(job.status.as_str(), term)
        } else {
            self.columns.matches(job)
        }
    }
}

/// Facet union, then search or column filters, then a stable sort.
pub fn project(jobs: &[Job], query: &TableQuery) -> Vec<Job> {
    let mut rows: Vec<&Job> = if query.facets.is_all() {
        jobs.iter().collect()
    } else {
        JobStatus::ALL
            .into_iter()
            .filter(|status| query.facets.contains(*status))
            .flat_map(|status| jobs.iter().filter(move |job| job.status == status))
            .collect()
    };
    rows.retain(|job| query.matches(job));
    rows.sort_by(|a, b| compare_jobs(a, b, query.sort));
    rows.into_iter().cloned().collect()
}

/// Count of jobs per status over the full set, for the facet picker.
pub fn status_counts(jobs: &[Job]) -> BTreeMap<JobStatus, usize> {
    let mut counts: BTreeMap<JobStatus, usize> =
        JobStatus::ALL.into_iter().map(|status| (status, 0)).collect();
    for job in jobs {
        *counts.entry(job.status).or_default() += 1;
    }
    counts
}

enum SortValue<'a> {
    Text(&'a str),
    Timestamp(Option<i64>),
    Number(Option<i64>),
}

fn sort_value(job: &Job, field: SortField) -> SortValue<'_> {
    match field {
        SortField::Id => SortValue::Number(Some(job.id)),
        SortField::Url => SortValue::Text(&job.url),
        SortField::Title => SortValue::Text(job.title.as_deref().unwrap_or("")),
        SortField::Status => SortValue::Text(job.status.as_str()),
        SortField::HtmlVersion => SortValue::Text(job.html_version.as_deref().unwrap_or("")),
        SortField::InternalLinksCount => SortValue::Number(job.internal_links_count.map(i64::from)),
        SortField::ExternalLinksCount => SortValue::Number(job.external_links_count.map(i64::from)),
        SortField::InaccessibleLinksCount => {
            SortValue::Number(job.inaccessible_links_count.map(i64::from))
        }
        SortField::CreatedAt => SortValue::Timestamp(parse_timestamp(job.created_at.as_deref())),
        SortField::UpdatedAt => SortValue::Timestamp(parse_timestamp(job.updated_at.as_deref())),
    }
}

fn compare_jobs(a: &Job, b: &Job, key: SortKey) -> Ordering {
    let ordering = match (sort_value(a, key.field), sort_value(b, key.field)) {
        (SortValue::Text(a), SortValue::Text(b)) => locale_compare(a, b),
        (SortValue::Timestamp(a), SortValue::Timestamp(b)) => a.cmp(&b),
        (SortValue::Number(a), SortValue::Number(b)) => a.cmp(&b),
        _ => Ordering::Equal,
    };
    match key.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Case-insensitive ordering; strings differing only by case put lowercase first.
fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn parse_timestamp(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|parsed| parsed.timestamp_millis())
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Memoized [`project`] keyed on the store revision and the query.
#[derive(Debug, Clone)]
pub struct ProjectionCache {
    key: Option<(u64, TableQuery)>,
    rows: Arc<[Job]>,
}

impl Default for ProjectionCache {
    fn default() -> Self {
        Self {
            key: None,
            rows: Arc::from(Vec::new()),
        }
    }
}

impl PartialEq for ProjectionCache {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
    }
}

impl Eq for ProjectionCache {}

impl ProjectionCache {
    /// Recomputes only when the store or query moved, and keeps the previous result when
    /// the recomputed rows are structurally identical.
    pub fn refresh(&mut self, store: &JobStore, query: &TableQuery) -> Arc<[Job]> {
        if let Some((revision, cached_query)) = &self.key {
            if *revision == store.revision() && cached_query == query {
                return Arc::clone(&self.rows);
            }
        }
        let next = project(store.jobs(), query);
        if self.rows.as_ref() != next.as_slice() {
            self.rows = Arc::from(next);
        }
        self.key = Some((store.revision(), query.clone()));
        Arc::clone(&self.rows)
    }

    pub fn rows(&self) -> &Arc<[Job]> {
        &self.rows
    }
}
