use std::time::Duration;

use crate::{JobId, RunId, Stage};

/// Which request channel a call goes out on. A new request on a channel supersedes the
/// one still in flight there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Dashboard,
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CreateJobs {
        run: RunId,
        surface: Surface,
        urls: Vec<String>,
    },
    /// Deliver `Msg::StageDue { run, stage }` after `delay`.
    ScheduleStage {
        run: RunId,
        stage: Stage,
        delay: Duration,
    },
    RunStage {
        run: RunId,
        surface: Surface,
        stage: Stage,
        ids: Vec<JobId>,
        failed_urls: Vec<String>,
    },
    TogglePause {
        id: JobId,
        surface: Surface,
    },
    FetchProfile,
    DeleteJobs {
        ids: Vec<JobId>,
    },
    DeleteJob {
        id: JobId,
    },
}

impl Effect {
    /// Request channel used by this effect; `None` for pure scheduling.
    pub fn surface(&self) -> Option<Surface> {
        match self {
            Effect::CreateJobs { surface, .. }
            | Effect::RunStage { surface, .. }
            | Effect::TogglePause { surface, .. } => Some(*surface),
            Effect::FetchProfile => Some(Surface::Dashboard),
            Effect::DeleteJobs { .. } | Effect::DeleteJob { .. } => Some(Surface::Table),
            Effect::ScheduleStage { .. } => None,
        }
    }
}
