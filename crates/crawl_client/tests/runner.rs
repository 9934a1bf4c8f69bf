use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use crawl_client::{EffectRunner, Profile, Scheduler, TransitionClient};
use crawl_core::{
    update, ApiFailure, AppState, CreateOutcome, Effect, FailureKind, Job, JobId, JobStatus, Msg,
    PauseState, RunId, Stage,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    crawl_logging::initialize_for_tests();
}

/// Keeps the relative stage order but runs a hundred times faster.
struct ScaledScheduler;

#[async_trait::async_trait]
impl Scheduler for ScaledScheduler {
    async fn wait(&self, _run: RunId, _stage: Stage, delay: Duration) {
        tokio::time::sleep(delay / 100).await;
    }
}

#[derive(Default)]
struct FakeServer {
    calls: Mutex<Vec<String>>,
    jobs: Mutex<Vec<Job>>,
}

impl FakeServer {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TransitionClient for FakeServer {
    async fn create(&self, urls: &[String]) -> Result<CreateOutcome, ApiFailure> {
        self.record("create");
        if urls.iter().any(|url| url.contains("dup")) {
            return Err(ApiFailure::new(FailureKind::HttpStatus(409), "already analyzed"));
        }
        let created: Vec<Job> = urls
            .iter()
            .zip(7..)
            .map(|(url, id)| Job::new(id, url.clone(), JobStatus::Queued))
            .collect();
        *self.jobs.lock().unwrap() = created.clone();
        Ok(CreateOutcome {
            created,
            ..CreateOutcome::default()
        })
    }

    async fn advance(
        &self,
        stage: Stage,
        ids: &[JobId],
        _failed_urls: &[String],
    ) -> Result<Vec<Job>, ApiFailure> {
        self.record(stage.to_string());
        let status = match stage {
            Stage::Enqueue => JobStatus::Queued,
            Stage::SetRunning => JobStatus::Running,
            Stage::FetchResult => JobStatus::Done,
        };
        let mut jobs = self.jobs.lock().unwrap();
        for job in jobs.iter_mut().filter(|job| ids.contains(&job.id)) {
            job.status = status;
        }
        Ok(jobs.iter().filter(|job| ids.contains(&job.id)).cloned().collect())
    }

    async fn toggle_pause(&self, id: JobId) -> Result<PauseState, ApiFailure> {
        self.record(format!("toggle {id}"));
        Err(ApiFailure::new(FailureKind::HttpStatus(404), "URL not found"))
    }

    async fn profile(&self) -> Result<Profile, ApiFailure> {
        self.record("profile");
        Ok(Profile {
            urls: self.jobs.lock().unwrap().clone(),
            ..Profile::default()
        })
    }

    async fn delete_jobs(&self, _ids: &[JobId]) -> Result<(), ApiFailure> {
        self.record("delete many");
        Ok(())
    }

    async fn delete_job(&self, _id: JobId) -> Result<(), ApiFailure> {
        self.record("delete one");
        Ok(())
    }
}

/// Feeds effects to the runner and messages back into `update` until `done` holds.
fn drive(
    mut state: AppState,
    runner: &EffectRunner,
    msg_rx: &mpsc::Receiver<Msg>,
    effects: Vec<Effect>,
    done: impl Fn(&AppState) -> bool,
) -> AppState {
    runner.enqueue(effects);
    while !done(&state) {
        let msg = msg_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("runner message");
        let (next, effects) = update(state, msg);
        state = next;
        runner.enqueue(effects);
    }
    state
}

fn start(server: &Arc<FakeServer>) -> (EffectRunner, mpsc::Receiver<Msg>) {
    let (msg_tx, msg_rx) = mpsc::channel();
    let client: Arc<dyn TransitionClient> = server.clone();
    let runner = EffectRunner::with_scheduler(client, Arc::new(ScaledScheduler), msg_tx)
        .expect("runner");
    (runner, msg_rx)
}

#[test]
fn batch_runs_to_done_through_the_runner() {
    init_logging();
    let server = Arc::new(FakeServer::default());
    let (runner, msg_rx) = start(&server);

    let (state, _) = update(AppState::new(), Msg::UrlInputChanged("https://a.test".into()));
    let (state, _) = update(state, Msg::AddUrlClicked);
    let (state, effects) = update(state, Msg::AnalyzeClicked);

    let state = drive(state, &runner, &msg_rx, effects, |state| {
        !state.is_analyzing() && state.jobs().get(7).is_some_and(|job| job.status == JobStatus::Done)
    });

    assert!(state.working().is_empty());
    assert!(state.pending().is_empty());
    let calls = server.calls();
    assert_eq!(calls[0], "create");
    assert!(calls.contains(&"fetch-result".to_string()));
}

#[test]
fn conflict_surfaces_as_notice() {
    init_logging();
    let server = Arc::new(FakeServer::default());
    let (runner, msg_rx) = start(&server);

    let (state, _) = update(AppState::new(), Msg::UrlInputChanged("https://dup.test".into()));
    let (state, _) = update(state, Msg::AddUrlClicked);
    let (state, effects) = update(state, Msg::AnalyzeClicked);

    let state = drive(state, &runner, &msg_rx, effects, |state| !state.is_analyzing());

    assert_eq!(
        state.view().notice.as_deref(),
        Some("This URL has already been analyzed.")
    );
    assert_eq!(server.calls(), vec!["create".to_string()]);
}

#[test]
fn failed_toggle_clears_the_in_flight_guard() {
    init_logging();
    let server = Arc::new(FakeServer::default());
    let (runner, msg_rx) = start(&server);

    let (state, _) = update(
        AppState::new(),
        Msg::ProfileLoaded(Ok(vec![Job::new(3, "https://a.test", JobStatus::Running)])),
    );
    let (state, effects) = update(
        state,
        Msg::TogglePauseClicked {
            id: 3,
            surface: crawl_core::Surface::Table,
        },
    );
    assert!(state.is_toggling(3));

    let state = drive(state, &runner, &msg_rx, effects, |state| !state.is_toggling(3));
    assert!(!state.jobs().is_paused(3));
    assert_eq!(server.calls(), vec!["toggle 3".to_string()]);
}
