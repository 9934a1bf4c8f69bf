use std::fmt;
use std::time::Duration;

/// Follow-up remote stages issued after a create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Enqueue,
    SetRunning,
    FetchResult,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Enqueue => write!(f, "enqueue"),
            Stage::SetRunning => write!(f, "set-running"),
            Stage::FetchResult => write!(f, "fetch-result"),
        }
    }
}

/// Delays, measured from the create (or toggle) response, at which each follow-up fires.
///
/// These stand in for polling; they are tuned to one backend's batch timing and carry no
/// protocol guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSchedule {
    pub enqueue: Duration,
    pub set_running: Duration,
    pub fetch_result: Duration,
    pub resume_running: Duration,
    pub resume_result: Duration,
}

impl Default for StageSchedule {
    fn default() -> Self {
        Self {
            enqueue: Duration::from_millis(300),
            set_running: Duration::from_millis(1000),
            fetch_result: Duration::from_millis(5000),
            resume_running: Duration::from_millis(600),
            resume_result: Duration::from_millis(5000),
        }
    }
}

impl StageSchedule {
    /// The three stages that follow a successful create.
    pub fn batch(&self) -> [(Stage, Duration); 3] {
        [
            (Stage::Enqueue, self.enqueue),
            (Stage::SetRunning, self.set_running),
            (Stage::FetchResult, self.fetch_result),
        ]
    }

    /// The two stages that follow a resume.
    pub fn resume(&self) -> [(Stage, Duration); 2] {
        [
            (Stage::SetRunning, self.resume_running),
            (Stage::FetchResult, self.resume_result),
        ]
    }
}
