//! Job lifecycle: batch submission, stage scheduling, pause/resume and the merge of
//! server answers into the canonical store and the working list.
//!
//! Answers are merged by id in arrival order. Nothing here orders stages against each
//! other, so a slow set-running answer that lands after fetch-result wins for that id.

use crawl_logging::{crawl_debug, crawl_error, crawl_info, crawl_warn};

use crate::bridge::BridgeEvent;
use crate::pending::{validate_url, SEED_URLS};
use crate::state::{Run, RunKind};
use crate::{
    ApiFailure, AppState, CreateOutcome, Effect, Job, JobId, JobStatus, PauseState, RunId,
    Stage, Surface, TableNotice, UserNotice, ValidationError, UNSAVED_JOB_ID,
};

impl AppState {
    pub(crate) fn set_url_input(&mut self, text: String) {
        self.url_input = text;
        self.add_url_error = None;
        self.mark_dirty();
    }

    /// Stages the input URL in the working and pending lists.
    pub(crate) fn add_url(&mut self) {
        if self.is_analyzing() {
            return;
        }
        let trimmed = self.url_input.trim().to_string();
        if trimmed.is_empty() {
            return;
        }
        self.notice = None;
        self.mark_dirty();

        if self.working.contains_url(&trimmed) {
            self.add_url_error = Some(ValidationError::DuplicateUrl);
            return;
        }
        match validate_url(&trimmed) {
            Ok(url) => {
                self.working.push_unsaved(url.clone());
                self.pending.push(url);
                self.url_input.clear();
                self.add_url_error = None;
            }
            Err(err) => self.add_url_error = Some(err),
        }
    }

    pub(crate) fn remove_pending_url(&mut self, url: &str) {
        self.working.remove_url(url);
        self.pending.remove(url);
        self.mark_dirty();
    }

    pub(crate) fn clear_working_list(&mut self) {
        self.working.clear();
        self.pending.clear();
        self.mark_dirty();
    }

    pub(crate) fn seed_suggestions(&mut self) {
        if !self.working.is_empty() || !self.pending.is_empty() {
            return;
        }
        for url in SEED_URLS {
            self.working.push_unsaved(url);
            self.pending.push(url);
        }
        self.mark_dirty();
    }

    /// Starts a dashboard batch over the pending list.
    pub(crate) fn submit_batch(&mut self) -> Vec<Effect> {
        if self.pending.is_empty() || self.is_analyzing() {
            return Vec::new();
        }
        self.notice = None;
        self.add_url_error = None;
        let urls = self.pending.urls().to_vec();
        let run = self.start_run(Run::new(RunKind::Batch, Surface::Dashboard, urls.clone()));
        crawl_info!("Submitting batch run={} urls={}", run, urls.len());
        self.mark_dirty();
        vec![Effect::CreateJobs {
            run,
            surface: Surface::Dashboard,
            urls,
        }]
    }

    /// Starts a table re-run. The table's send list and selection are spent on start.
    pub(crate) fn rerun(&mut self, urls: Vec<String>) -> Vec<Effect> {
        self.table.reset_selection();
        self.mark_dirty();
        if urls.is_empty() {
            self.table.set_notice(Some(TableNotice::NothingSelected));
            return Vec::new();
        }
        self.table.set_notice(None);
        let run = self.start_run(Run::new(RunKind::Batch, Surface::Table, urls.clone()));
        crawl_info!("Re-running run={} urls={}", run, urls.len());
        vec![Effect::CreateJobs {
            run,
            surface: Surface::Table,
            urls,
        }]
    }

    pub(crate) fn on_jobs_created(
        &mut self,
        run_id: RunId,
        result: Result<CreateOutcome, ApiFailure>,
    ) -> Vec<Effect> {
        let Some(run) = self.runs.get(&run_id).cloned() else {
            crawl_warn!("Create answer for unknown run={}", run_id);
            return Vec::new();
        };
        match result {
            Ok(outcome) => self.accept_created(run_id, run, outcome),
            Err(failure) => {
                self.abort_run(run_id, &run, failure);
                Vec::new()
            }
        }
    }

    fn accept_created(&mut self, run_id: RunId, run: Run, outcome: CreateOutcome) -> Vec<Effect> {
        let CreateOutcome {
            created,
            mut existing,
            failed,
        } = outcome;

        // Re-runs resubmit known URLs; the server reports those as failed records with ids.
        let mut failed_urls = Vec::new();
        for failure in failed {
            match (run.surface, failure.id) {
                (Surface::Table, Some(id)) => {
                    existing.push(Job::new(id, failure.url, JobStatus::Queued));
                }
                _ => failed_urls.push(failure.url),
            }
        }

        let visible: Vec<Job> = created.into_iter().chain(existing).collect();
        let ids: Vec<JobId> = visible.iter().map(|job| job.id).collect();
        for job in &visible {
            self.jobs.upsert(job.clone());
        }

        let mut effects = Vec::new();
        match run.surface {
            Surface::Dashboard => {
                self.working.replace(visible);
                for url in &failed_urls {
                    self.pending.remove(url);
                }
                if !failed_urls.is_empty() {
                    self.notice = Some(UserNotice::AlreadyAnalyzed {
                        urls: failed_urls.clone(),
                    });
                }
            }
            Surface::Table => effects.push(Effect::FetchProfile),
        }

        crawl_info!(
            "Created run={} ids={:?} failed={}",
            run_id,
            ids,
            failed_urls.len()
        );
        if ids.is_empty() {
            self.finish_run(run_id);
        } else if let Some(entry) = self.runs.get_mut(&run_id) {
            entry.ids = ids;
            entry.failed_urls = failed_urls;
            effects.extend(
                self.schedule
                    .batch()
                    .into_iter()
                    .map(|(stage, delay)| Effect::ScheduleStage {
                        run: run_id,
                        stage,
                        delay,
                    }),
            );
        }
        self.mark_dirty();
        effects
    }

    /// A failed create drops the batch and returns to an empty-selection baseline.
    fn abort_run(&mut self, run_id: RunId, run: &Run, failure: ApiFailure) {
        self.finish_run(run_id);
        if failure.is_cancelled() {
            crawl_debug!("Create for run={} was cancelled", run_id);
            return;
        }
        crawl_error!("Create for run={} failed: {}", run_id, failure);

        if run.surface == Surface::Dashboard {
            self.notice = Some(if failure.is_conflict() {
                UserNotice::Conflict {
                    multiple: run.urls.len() > 1,
                }
            } else if failure.is_server_fault() {
                UserNotice::ServerFault {
                    message: failure.message.clone(),
                }
            } else {
                self.working.clear();
                UserNotice::RequestFailed {
                    message: failure.message.clone(),
                }
            });
            self.pending.clear();
            self.working.clear_unsaved();
        }
        self.table.reset_selection();
    }

    /// A stage delay elapsed: issue the call for every id of the run that is not paused.
    pub(crate) fn on_stage_due(&mut self, run_id: RunId, stage: Stage) -> Vec<Effect> {
        let Some(run) = self.runs.get(&run_id) else {
            crawl_debug!("Stage {} due for unknown run={}", stage, run_id);
            return Vec::new();
        };
        let ids: Vec<JobId> = run
            .ids
            .iter()
            .copied()
            .filter(|id| !self.is_paused(*id))
            .collect();
        let surface = run.surface;
        let failed_urls = match (run.kind, stage) {
            (RunKind::Batch, Stage::FetchResult) => run.failed_urls.clone(),
            _ => Vec::new(),
        };

        if ids.is_empty() {
            crawl_debug!("Stage {} skipped for run={}: nothing to advance", stage, run_id);
            if stage == Stage::FetchResult {
                self.finish_run(run_id);
            }
            return Vec::new();
        }
        crawl_debug!("Stage {} due for run={} ids={:?}", stage, run_id, ids);
        vec![Effect::RunStage {
            run: run_id,
            surface,
            stage,
            ids,
            failed_urls,
        }]
    }

    pub(crate) fn on_stage_completed(
        &mut self,
        run_id: RunId,
        stage: Stage,
        result: Result<Vec<Job>, ApiFailure>,
    ) -> Vec<Effect> {
        let Some(run) = self.runs.get(&run_id).cloned() else {
            // Stages are not ordered; an answer after fetch-result still wins per id.
            if let Ok(jobs) = result {
                crawl_debug!("Late stage {} answer for retired run={}", stage, run_id);
                for job in jobs {
                    self.jobs.upsert(job);
                }
                self.mark_dirty();
            }
            return Vec::new();
        };

        let jobs = match result {
            Ok(jobs) => jobs,
            Err(failure) => {
                if failure.is_cancelled() {
                    crawl_debug!("Stage {} for run={} was cancelled", stage, run_id);
                } else {
                    crawl_warn!("Stage {} for run={} failed: {}", stage, run_id, failure);
                }
                if stage == Stage::FetchResult {
                    self.finish_run(run_id);
                }
                return Vec::new();
            }
        };

        for job in &jobs {
            self.jobs.upsert(job.clone());
        }

        let mut effects = Vec::new();
        match (run.kind, run.surface) {
            (RunKind::Batch, Surface::Dashboard) => {
                for job in &jobs {
                    self.working.overwrite(job);
                }
                if stage == Stage::FetchResult {
                    for job in &jobs {
                        self.working.settle(&mut self.pending, &job.url, job.status);
                    }
                    effects.push(Effect::FetchProfile);
                }
            }
            (RunKind::Batch, Surface::Table) => effects.push(Effect::FetchProfile),
            (RunKind::Resume, _) => {
                for job in jobs {
                    let event = match stage {
                        Stage::FetchResult => BridgeEvent::Settled {
                            id: job.id,
                            url: job.url,
                            status: job.status,
                        },
                        Stage::Enqueue | Stage::SetRunning => BridgeEvent::StageResult { job },
                    };
                    self.bridge.post(event);
                }
                self.pump_bridge();
                effects.push(Effect::FetchProfile);
            }
        }

        if stage == Stage::FetchResult {
            self.finish_run(run_id);
        }
        self.mark_dirty();
        effects
    }

    /// Retires the run; later answers for it only reach the job store.
    fn finish_run(&mut self, run_id: RunId) {
        if self.runs.remove(&run_id).is_some() {
            crawl_info!("Run {} finished", run_id);
        }
        self.mark_dirty();
    }

    /// Issues a pause toggle unless one is already in flight for this id.
    pub(crate) fn toggle_pause(&mut self, id: JobId, surface: Surface) -> Vec<Effect> {
        if id == UNSAVED_JOB_ID {
            crawl_debug!("Ignoring toggle for a job that was never created");
            return Vec::new();
        }
        let done = self
            .jobs
            .get(id)
            .or_else(|| self.working.get(id))
            .is_some_and(|job| job.status == JobStatus::Done);
        if done {
            crawl_debug!("Ignoring toggle for finished job {}", id);
            return Vec::new();
        }
        if self.toggles_in_flight.contains_key(&id) {
            crawl_debug!("Toggle for job {} already in flight", id);
            return Vec::new();
        }
        self.toggles_in_flight.insert(id, surface);
        if surface == Surface::Dashboard {
            self.notice = None;
            self.add_url_error = None;
        }
        self.mark_dirty();
        vec![Effect::TogglePause { id, surface }]
    }

    pub(crate) fn on_pause_toggled(
        &mut self,
        id: JobId,
        result: Result<PauseState, ApiFailure>,
    ) -> Vec<Effect> {
        let surface = self
            .toggles_in_flight
            .remove(&id)
            .unwrap_or(Surface::Dashboard);
        self.mark_dirty();

        let state = match result {
            Ok(state) => state,
            Err(failure) => {
                if failure.is_cancelled() {
                    crawl_debug!("Toggle for job {} was cancelled", id);
                } else {
                    crawl_warn!("Toggle for job {} failed: {}", id, failure);
                    if surface == Surface::Dashboard {
                        self.notice = Some(UserNotice::ToggleFailed {
                            id,
                            message: failure.message,
                        });
                    }
                }
                return Vec::new();
            }
        };

        self.jobs.set_should_pause(state.id, state.should_pause);
        self.bridge.post(BridgeEvent::PauseToggled {
            id: state.id,
            should_pause: state.should_pause,
        });
        self.pump_bridge();

        let mut effects = vec![Effect::FetchProfile];
        if state.should_pause {
            crawl_info!("Job {} paused", state.id);
            return effects;
        }

        crawl_info!("Job {} resumed", state.id);
        let mut run = Run::new(RunKind::Resume, surface, vec![state.url]);
        run.ids = vec![state.id];
        let run_id = self.start_run(run);
        effects.extend(
            self.schedule
                .resume()
                .into_iter()
                .map(|(stage, delay)| Effect::ScheduleStage {
                    run: run_id,
                    stage,
                    delay,
                }),
        );
        effects
    }

    pub(crate) fn on_profile_loaded(&mut self, result: Result<Vec<Job>, ApiFailure>) {
        match result {
            Ok(jobs) => {
                crawl_debug!("Profile refreshed with {} jobs", jobs.len());
                self.jobs.replace_all(jobs);
                self.mark_dirty();
            }
            Err(failure) if failure.is_cancelled() => {
                crawl_debug!("Profile refresh was cancelled");
            }
            Err(failure) => crawl_warn!("Profile refresh failed: {}", failure),
        }
    }

    pub(crate) fn delete_selected(&mut self) -> Vec<Effect> {
        let ids = self.table.checked_ids();
        self.mark_dirty();
        if ids.is_empty() {
            self.table.set_notice(Some(TableNotice::NothingSelected));
            return Vec::new();
        }
        self.table.set_notice(None);
        vec![Effect::DeleteJobs { ids }]
    }

    pub(crate) fn delete_row(&mut self, id: JobId) -> Vec<Effect> {
        self.table.set_notice(None);
        self.mark_dirty();
        vec![Effect::DeleteJob { id }]
    }

    pub(crate) fn on_jobs_deleted(
        &mut self,
        ids: Vec<JobId>,
        result: Result<(), ApiFailure>,
    ) -> Vec<Effect> {
        self.mark_dirty();
        if let Err(failure) = result {
            self.report_delete_failure(failure);
            return Vec::new();
        }
        self.table.forget_deleted(&ids);
        self.table.set_notice(Some(TableNotice::SelectedDeleted { count: ids.len() }));
        self.drop_deleted(&ids);
        vec![Effect::FetchProfile]
    }

    pub(crate) fn on_job_deleted(
        &mut self,
        id: JobId,
        result: Result<(), ApiFailure>,
    ) -> Vec<Effect> {
        self.mark_dirty();
        if let Err(failure) = result {
            self.report_delete_failure(failure);
            return Vec::new();
        }
        self.table.set_notice(Some(TableNotice::RowDeleted { id }));
        self.drop_deleted(&[id]);
        vec![Effect::FetchProfile]
    }

    fn drop_deleted(&mut self, ids: &[JobId]) {
        let urls: Vec<String> = self
            .jobs
            .remove_ids(ids)
            .into_iter()
            .map(|job| job.url)
            .collect();
        if !urls.is_empty() {
            self.bridge.post(BridgeEvent::JobsRemoved { urls });
            self.pump_bridge();
        }
    }

    fn report_delete_failure(&mut self, failure: ApiFailure) {
        if failure.is_cancelled() {
            crawl_debug!("Delete was cancelled");
            return;
        }
        crawl_warn!("Delete failed: {}", failure);
        self.table.set_notice(Some(TableNotice::DeleteFailed {
            message: failure.message,
        }));
    }
}
