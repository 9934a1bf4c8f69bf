use std::sync::{mpsc, Arc};
use std::thread;

use crawl_core::{Effect, Msg};
use crawl_logging::{crawl_debug, crawl_info, crawl_warn};
use tokio_util::sync::CancellationToken;

use crate::channel::{until_cancelled, RequestChannels};
use crate::{ClientError, FixedDelayScheduler, Scheduler, TransitionClient};

/// Executes effects on a background tokio runtime and reports their outcome as messages.
pub struct EffectRunner {
    cmd_tx: mpsc::Sender<Effect>,
}

impl EffectRunner {
    pub fn new(
        client: Arc<dyn TransitionClient>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Result<Self, ClientError> {
        Self::with_scheduler(client, Arc::new(FixedDelayScheduler), msg_tx)
    }

    pub fn with_scheduler(
        client: Arc<dyn TransitionClient>,
        scheduler: Arc<dyn Scheduler>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Result<Self, ClientError> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<Effect>();
        let channels = RequestChannels::new();

        thread::spawn(move || {
            while let Ok(effect) = cmd_rx.recv() {
                // Claim the channel here so supersession follows effect order.
                let token = effect
                    .surface()
                    .map(|surface| channels.begin(surface))
                    .unwrap_or_default();
                let client = Arc::clone(&client);
                let scheduler = Arc::clone(&scheduler);
                let msg_tx = msg_tx.clone();
                runtime.spawn(async move {
                    let msg = execute(client.as_ref(), scheduler.as_ref(), effect, token).await;
                    if msg_tx.send(msg).is_err() {
                        crawl_debug!("Message receiver gone; dropping effect outcome");
                    }
                });
            }
        });

        Ok(Self { cmd_tx })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            if self.cmd_tx.send(effect).is_err() {
                crawl_warn!("Effect runner stopped; dropping remaining effects");
                return;
            }
        }
    }
}

async fn execute(
    client: &dyn TransitionClient,
    scheduler: &dyn Scheduler,
    effect: Effect,
    token: CancellationToken,
) -> Msg {
    match effect {
        Effect::CreateJobs { run, urls, .. } => {
            crawl_info!("CreateJobs run={} urls={}", run, urls.len());
            let result = until_cancelled(token, client.create(&urls)).await;
            Msg::JobsCreated { run, result }
        }
        Effect::ScheduleStage { run, stage, delay } => {
            scheduler.wait(run, stage, delay).await;
            Msg::StageDue { run, stage }
        }
        Effect::RunStage {
            run,
            stage,
            ids,
            failed_urls,
            ..
        } => {
            crawl_debug!("RunStage run={} stage={} ids={:?}", run, stage, ids);
            let result = until_cancelled(token, client.advance(stage, &ids, &failed_urls)).await;
            Msg::StageCompleted { run, stage, result }
        }
        Effect::TogglePause { id, .. } => {
            let result = until_cancelled(token, client.toggle_pause(id)).await;
            Msg::PauseToggled { id, result }
        }
        Effect::FetchProfile => {
            let result = until_cancelled(token, client.profile()).await;
            Msg::ProfileLoaded(result.map(|profile| profile.urls))
        }
        Effect::DeleteJobs { ids } => {
            let result = until_cancelled(token, client.delete_jobs(&ids)).await;
            Msg::JobsDeleted { ids, result }
        }
        Effect::DeleteJob { id } => {
            let result = until_cancelled(token, client.delete_job(id)).await;
            Msg::JobDeleted { id, result }
        }
    }
}
