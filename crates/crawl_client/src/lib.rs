//! Crawl client: HTTP transition calls and effect execution.
mod api;
mod channel;
mod runner;
mod scheduler;
mod settings;
mod transition;

pub use api::{Profile, UserSummary};
pub use channel::{until_cancelled, RequestChannels};
pub use runner::EffectRunner;
pub use scheduler::{FixedDelayScheduler, Scheduler};
pub use settings::{ClientError, ClientSettings};
pub use transition::{HttpTransitionClient, TransitionClient};
