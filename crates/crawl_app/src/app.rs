use std::collections::BTreeSet;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use crawl_client::{ClientError, EffectRunner, Scheduler, TransitionClient};
use crawl_core::{
    update, AppState, AppViewModel, JobId, JobStatus, Msg, SortKey, Surface, TableMsg,
};
use crawl_logging::{crawl_debug, crawl_info, crawl_warn};
use thiserror::Error;

use crate::cli::{sort_direction, Commands};
use crate::report;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no answer within {timeout:?} with {outstanding} request(s) outstanding")]
    Stalled {
        timeout: Duration,
        outstanding: usize,
    },
    #[error("effect runner stopped with {outstanding} request(s) outstanding")]
    Disconnected { outstanding: usize },
}

/// Owns the state machine and feeds runner messages back into it.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
    outstanding: usize,
    idle_timeout: Duration,
}

impl Session {
    pub fn new(
        state: AppState,
        client: Arc<dyn TransitionClient>,
        scheduler: Arc<dyn Scheduler>,
        idle_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
        let runner = EffectRunner::with_scheduler(client, scheduler, msg_tx)?;
        Ok(Self {
            state,
            runner,
            msg_rx,
            outstanding: 0,
            idle_timeout,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Applies one message; returns the new view when something changed.
    pub fn dispatch(&mut self, msg: Msg) -> Option<AppViewModel> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        // Every effect answers with exactly one message.
        self.outstanding += effects.len();
        self.runner.enqueue(effects);
        let view = state.consume_dirty().then(|| state.view());
        self.state = state;
        view
    }

    /// Processes runner messages until no effect is left unanswered.
    pub fn run_until_idle(&mut self) -> Result<(), SessionError> {
        while self.outstanding > 0 {
            let msg = match self.msg_rx.recv_timeout(self.idle_timeout) {
                Ok(msg) => msg,
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    return Err(SessionError::Stalled {
                        timeout: self.idle_timeout,
                        outstanding: self.outstanding,
                    })
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(SessionError::Disconnected {
                        outstanding: self.outstanding,
                    })
                }
            };
            self.outstanding -= 1;
            if let Some(view) = self.dispatch(msg) {
                crawl_debug!("{}", report::progress_line(&view));
            }
        }
        Ok(())
    }

    fn refresh_profile(&mut self) -> Result<(), SessionError> {
        self.dispatch(Msg::ProfileRequested);
        self.run_until_idle()
    }

    fn table(&mut self, msg: TableMsg) {
        self.dispatch(Msg::Table(msg));
    }
}

pub fn run_command(session: &mut Session, command: Commands) -> Result<(), SessionError> {
    session.refresh_profile()?;
    match command {
        Commands::Analyze { urls, seed } => analyze(session, urls, seed),
        Commands::List {
            status,
            search,
            sort,
            desc,
            page,
            per_page,
        } => {
            // Facets toggle, so a repeated status must only be sent once.
            let statuses: BTreeSet<JobStatus> = status.into_iter().map(Into::into).collect();
            for status in statuses {
                session.table(TableMsg::FacetToggled(status));
            }
            if let Some(term) = search {
                session.table(TableMsg::SearchChanged(term));
            }
            session.table(TableMsg::SortChanged(SortKey::new(
                sort.into(),
                sort_direction(desc),
            )));
            if let Some(size) = per_page {
                session.table(TableMsg::ItemsPerPageChanged(size));
            }
            session.table(TableMsg::PageChanged(page));
            Ok(())
        }
        Commands::Pause { id } => {
            session.dispatch(Msg::TogglePauseClicked {
                id,
                surface: Surface::Table,
            });
            session.run_until_idle()
        }
        Commands::Rerun { id } => {
            session.table(TableMsg::RerunRowClicked(id));
            session.run_until_idle()
        }
        Commands::Delete { ids } => delete(session, &ids),
    }
}

fn analyze(session: &mut Session, urls: Vec<String>, seed: bool) -> Result<(), SessionError> {
    if urls.is_empty() && seed {
        session.dispatch(Msg::SeedSuggested);
    }
    for url in urls {
        session.dispatch(Msg::UrlInputChanged(url.clone()));
        session.dispatch(Msg::AddUrlClicked);
        if let Some(err) = session.state().add_url_error() {
            crawl_warn!("Skipping {}: {}", url, err);
        }
    }
    let pending = session.state().pending().len();
    if pending == 0 {
        crawl_info!("Nothing to analyze");
        return Ok(());
    }
    crawl_info!("Analyzing {} url(s)", pending);
    session.dispatch(Msg::AnalyzeClicked);
    session.run_until_idle()
}

fn delete(session: &mut Session, ids: &[JobId]) -> Result<(), SessionError> {
    for id in ids {
        if session.state().jobs().get(*id).is_none() {
            crawl_warn!("No job with id {}", id);
            continue;
        }
        session.table(TableMsg::DeleteRowClicked(*id));
        session.run_until_idle()?;
    }
    Ok(())
}
