use crate::{ApiFailure, Column, Job, JobId, JobStatus, RunId, SortKey, Stage, Surface};

/// Parsed answer to a create call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateOutcome {
    pub created: Vec<Job>,
    pub existing: Vec<Job>,
    pub failed: Vec<FailedUrl>,
}

/// A URL the server refused to create. Records for already-analyzed URLs carry their id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUrl {
    pub url: String,
    pub id: Option<JobId>,
}

/// Answer to a pause toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauseState {
    pub id: JobId,
    pub should_pause: bool,
    pub status: Option<JobStatus>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL input box.
    UrlInputChanged(String),
    /// User asked to stage the current input.
    AddUrlClicked,
    /// User removed one staged URL from the working list.
    RemovePendingUrl(String),
    /// User dismissed the whole working list.
    ClearWorkingList,
    /// Offer the built-in suggestions when nothing is staged.
    SeedSuggested,
    /// User started a bulk analysis of the pending list.
    AnalyzeClicked,
    /// User paused or resumed one job, from either surface.
    TogglePauseClicked { id: JobId, surface: Surface },
    /// Table interaction.
    Table(TableMsg),
    /// Ask for a fresh copy of the user's jobs.
    ProfileRequested,
    ProfileLoaded(Result<Vec<Job>, ApiFailure>),
    JobsCreated {
        run: RunId,
        result: Result<CreateOutcome, ApiFailure>,
    },
    /// A scheduled stage delay elapsed.
    StageDue { run: RunId, stage: Stage },
    StageCompleted {
        run: RunId,
        stage: Stage,
        result: Result<Vec<Job>, ApiFailure>,
    },
    PauseToggled {
        id: JobId,
        result: Result<PauseState, ApiFailure>,
    },
    JobsDeleted {
        ids: Vec<JobId>,
        result: Result<(), ApiFailure>,
    },
    JobDeleted {
        id: JobId,
        result: Result<(), ApiFailure>,
    },
    /// Render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableMsg {
    FacetToggled(JobStatus),
    FacetsCleared,
    SearchChanged(String),
    ColumnFilterChanged { column: Column, value: String },
    SortChanged(SortKey),
    PageChanged(usize),
    ItemsPerPageChanged(usize),
    SelectAllToggled(bool),
    RowChecked { id: JobId, checked: bool },
    RerunSelectedClicked,
    RerunRowClicked(JobId),
    DeleteSelectedClicked,
    DeleteRowClicked(JobId),
}
