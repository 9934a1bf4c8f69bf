//! Crawl core: job store, table projection and the pure lifecycle state machine.
mod bridge;
mod effect;
mod error;
mod job;
mod msg;
mod orchestrator;
mod pending;
mod projection;
mod schedule;
mod selection;
mod state;
mod table;
mod update;
mod view_model;

pub use bridge::{BridgeEvent, EventBridge, WorkingList};
pub use effect::{Effect, Surface};
pub use error::{ApiFailure, FailureKind, TableNotice, UserNotice, ValidationError};
pub use job::{Job, JobId, JobStatus, JobStore, LinkDetail, UNSAVED_JOB_ID};
pub use msg::{CreateOutcome, FailedUrl, Msg, PauseState, TableMsg};
pub use pending::{validate_url, PendingSendList, SEED_URLS};
pub use projection::{
    project, status_counts, Column, ColumnFilters, FacetSet, ProjectionCache, SortDirection,
    SortField, SortKey, TableQuery,
};
pub use schedule::{Stage, StageSchedule};
pub use selection::{Pagination, SelectionRecord, DEFAULT_PAGE_SIZE, PAGE_SIZES};
pub use state::{AppState, Run, RunId, RunKind};
pub use table::TableState;
pub use update::update;
pub use view_model::{AppViewModel, JobRowView, TableView, WorkingRowView};
