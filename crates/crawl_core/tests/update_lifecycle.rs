use std::time::Duration;

use crawl_core::{
    update, ApiFailure, AppState, CreateOutcome, Effect, FailedUrl, FailureKind, Job, JobStatus,
    Msg, PauseState, RunId, Stage, Surface, TableMsg,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    crawl_logging::initialize_for_tests();
}

fn add_urls(mut state: AppState, urls: &[&str]) -> AppState {
    for url in urls {
        let (next, _) = update(state, Msg::UrlInputChanged(url.to_string()));
        let (next, _) = update(next, Msg::AddUrlClicked);
        state = next;
    }
    state
}

fn submit_urls(state: AppState, urls: &[&str]) -> (AppState, RunId) {
    let state = add_urls(state, urls);
    let (state, effects) = update(state, Msg::AnalyzeClicked);
    let run = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::CreateJobs { run, .. } => Some(*run),
            _ => None,
        })
        .expect("create effect");
    (state, run)
}

fn created(jobs: Vec<Job>) -> Result<CreateOutcome, ApiFailure> {
    Ok(CreateOutcome {
        created: jobs,
        ..CreateOutcome::default()
    })
}

fn stage_ids(effects: &[Effect]) -> Vec<i64> {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::RunStage { ids, .. } => Some(ids.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

fn advance(state: AppState, run: RunId, stage: Stage, jobs: Vec<Job>) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::StageDue { run, stage });
    update(
        state,
        Msg::StageCompleted {
            run,
            stage,
            result: Ok(jobs),
        },
    )
}

#[test]
fn batch_walks_through_every_stage_and_leaves_the_working_list() {
    init_logging();
    let (state, run) = submit_urls(AppState::new(), &["https://a.test"]);
    assert!(state.is_analyzing());

    let (state, effects) = update(
        state,
        Msg::JobsCreated {
            run,
            result: created(vec![Job::new(7, "https://a.test", JobStatus::Queued)]),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::ScheduleStage {
                run,
                stage: Stage::Enqueue,
                delay: Duration::from_millis(300),
            },
            Effect::ScheduleStage {
                run,
                stage: Stage::SetRunning,
                delay: Duration::from_millis(1000),
            },
            Effect::ScheduleStage {
                run,
                stage: Stage::FetchResult,
                delay: Duration::from_millis(5000),
            },
        ]
    );
    assert_eq!(state.working().entries()[0].id, 7);

    let (state, effects) = update(
        state,
        Msg::StageDue {
            run,
            stage: Stage::Enqueue,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::RunStage {
            run,
            surface: Surface::Dashboard,
            stage: Stage::Enqueue,
            ids: vec![7],
            failed_urls: Vec::new(),
        }]
    );

    let (state, _) = update(
        state,
        Msg::StageCompleted {
            run,
            stage: Stage::Enqueue,
            result: Ok(vec![Job::new(7, "https://a.test", JobStatus::Queued)]),
        },
    );
    let (state, _) = advance(
        state,
        run,
        Stage::SetRunning,
        vec![Job::new(7, "https://a.test", JobStatus::Running)],
    );
    assert_eq!(state.working().get(7).map(|job| job.status), Some(JobStatus::Running));
    assert!(state.is_analyzing());

    let (state, effects) = advance(
        state,
        run,
        Stage::FetchResult,
        vec![Job::new(7, "https://a.test", JobStatus::Done)],
    );
    assert_eq!(effects, vec![Effect::FetchProfile]);
    assert!(state.working().is_empty());
    assert!(state.pending().is_empty());
    assert!(!state.is_analyzing());
    assert_eq!(state.jobs().get(7).map(|job| job.status), Some(JobStatus::Done));
    assert_eq!(state.view().table.filtered_count, 1);
}

#[test]
fn errored_job_stays_visible_after_fetch_result() {
    init_logging();
    let (state, run) = submit_urls(AppState::new(), &["https://a.test"]);
    let (state, _) = update(
        state,
        Msg::JobsCreated {
            run,
            result: created(vec![Job::new(3, "https://a.test", JobStatus::Queued)]),
        },
    );
    let (state, _) = advance(
        state,
        run,
        Stage::FetchResult,
        vec![Job::new(3, "https://a.test", JobStatus::Error)],
    );

    assert_eq!(state.working().get(3).map(|job| job.status), Some(JobStatus::Error));
    assert!(!state.is_analyzing());
}

#[test]
fn already_analyzed_urls_are_reported_and_carried_to_fetch_result() {
    init_logging();
    let (state, run) = submit_urls(AppState::new(), &["https://a.test", "https://b.test"]);
    let (state, _) = update(
        state,
        Msg::JobsCreated {
            run,
            result: Ok(CreateOutcome {
                created: vec![Job::new(7, "https://a.test", JobStatus::Queued)],
                existing: Vec::new(),
                failed: vec![FailedUrl {
                    url: "https://b.test".into(),
                    id: None,
                }],
            }),
        },
    );

    let view = state.view();
    assert_eq!(view.notice.as_deref(), Some("Already analyzed: https://b.test"));
    assert_eq!(view.pending_urls, vec!["https://a.test".to_string()]);

    let (_, effects) = update(
        state,
        Msg::StageDue {
            run,
            stage: Stage::FetchResult,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::RunStage {
            run,
            surface: Surface::Dashboard,
            stage: Stage::FetchResult,
            ids: vec![7],
            failed_urls: vec!["https://b.test".into()],
        }]
    );
}

#[test]
fn server_fault_shows_message_and_resets_the_batch() {
    init_logging();
    let (state, run) = submit_urls(AppState::new(), &["https://a.test"]);
    let (state, effects) = update(
        state,
        Msg::JobsCreated {
            run,
            result: Err(ApiFailure::new(FailureKind::HttpStatus(500), "database down")),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().notice.as_deref(), Some("database down"));
    assert!(state.pending().is_empty());
    assert!(state.working().is_empty());
    assert!(!state.is_analyzing());
}

#[test]
fn conflict_text_depends_on_batch_size() {
    init_logging();
    let conflict = || Err(ApiFailure::new(FailureKind::HttpStatus(409), "conflict"));

    let (state, run) = submit_urls(AppState::new(), &["https://a.test"]);
    let (state, _) = update(state, Msg::JobsCreated { run, result: conflict() });
    assert_eq!(
        state.view().notice.as_deref(),
        Some("This URL has already been analyzed.")
    );

    let (state, run) = submit_urls(AppState::new(), &["https://a.test", "https://b.test"]);
    let (state, _) = update(state, Msg::JobsCreated { run, result: conflict() });
    assert_eq!(
        state.view().notice.as_deref(),
        Some("Some URLs have already been analyzed")
    );
}

#[test]
fn create_without_ids_schedules_nothing() {
    init_logging();
    let (state, run) = submit_urls(AppState::new(), &["https://a.test"]);
    let (state, effects) = update(
        state,
        Msg::JobsCreated {
            run,
            result: Ok(CreateOutcome {
                failed: vec![FailedUrl {
                    url: "https://a.test".into(),
                    id: None,
                }],
                ..CreateOutcome::default()
            }),
        },
    );

    assert!(effects.is_empty());
    assert!(!state.is_analyzing());
    assert!(state.run(run).is_none());
}

#[test]
fn late_answers_merge_in_arrival_order() {
    init_logging();
    let (state, run) = submit_urls(AppState::new(), &["https://a.test"]);
    let (state, _) = update(
        state,
        Msg::JobsCreated {
            run,
            result: created(vec![Job::new(7, "https://a.test", JobStatus::Queued)]),
        },
    );

    let (state, _) = update(
        state,
        Msg::StageCompleted {
            run,
            stage: Stage::FetchResult,
            result: Ok(vec![Job::new(7, "https://a.test", JobStatus::Done)]),
        },
    );
    let (state, _) = update(
        state,
        Msg::StageCompleted {
            run,
            stage: Stage::SetRunning,
            result: Ok(vec![Job::new(7, "https://a.test", JobStatus::Running)]),
        },
    );

    assert_eq!(
        state.jobs().get(7).map(|job| job.status),
        Some(JobStatus::Running)
    );
    assert!(state.working().is_empty());
    assert!(state.run(run).is_none());
}

#[test]
fn paused_jobs_are_skipped_when_a_stage_comes_due() {
    init_logging();
    let (state, run) = submit_urls(AppState::new(), &["https://a.test", "https://b.test"]);
    let (state, _) = update(
        state,
        Msg::JobsCreated {
            run,
            result: created(vec![
                Job::new(7, "https://a.test", JobStatus::Queued),
                Job::new(8, "https://b.test", JobStatus::Queued),
            ]),
        },
    );
    let (state, _) = update(
        state,
        Msg::TogglePauseClicked {
            id: 8,
            surface: Surface::Dashboard,
        },
    );
    let (state, effects) = update(
        state,
        Msg::PauseToggled {
            id: 8,
            result: Ok(PauseState {
                id: 8,
                should_pause: true,
                status: Some(JobStatus::Queued),
                url: "https://b.test".into(),
            }),
        },
    );
    assert_eq!(effects, vec![Effect::FetchProfile]);

    let (_, effects) = update(
        state,
        Msg::StageDue {
            run,
            stage: Stage::Enqueue,
        },
    );
    assert_eq!(stage_ids(&effects), vec![7]);
}

#[test]
fn submit_is_ignored_while_analyzing() {
    init_logging();
    let (state, _) = submit_urls(AppState::new(), &["https://a.test"]);
    let (state, effects) = update(state, Msg::AnalyzeClicked);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::UrlInputChanged("https://b.test".into()));
    let (state, _) = update(state, Msg::AddUrlClicked);
    assert_eq!(state.pending().len(), 1);
}

#[test]
fn failed_table_rerun_leaves_dashboard_staging_alone() {
    init_logging();
    let state = add_urls(AppState::new(), &["https://staged.test"]);
    let (state, _) = update(
        state,
        Msg::ProfileLoaded(Ok(vec![Job::new(1, "https://old.test", JobStatus::Done)])),
    );
    let (state, effects) = update(state, Msg::Table(TableMsg::RerunRowClicked(1)));
    let run = match effects.as_slice() {
        [Effect::CreateJobs {
            run,
            surface: Surface::Table,
            ..
        }] => *run,
        other => panic!("unexpected effects: {other:?}"),
    };

    let (state, effects) = update(
        state,
        Msg::JobsCreated {
            run,
            result: Err(ApiFailure::new(FailureKind::Network, "connection reset")),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.pending().urls(), ["https://staged.test".to_string()]);
    assert!(state.working().contains_url("https://staged.test"));
    assert_eq!(state.notice(), None);
    assert!(state.run(run).is_none());
}
