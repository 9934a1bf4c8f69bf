use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use crawl_core::{ApiFailure, Surface};
use tokio_util::sync::CancellationToken;

/// One outstanding request per [`Surface`]: starting a request cancels the one still in
/// flight on the same surface.
#[derive(Debug, Clone, Default)]
pub struct RequestChannels {
    current: Arc<Mutex<HashMap<Surface, CancellationToken>>>,
}

impl RequestChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the surface's previous request and hands out the token for the next one.
    pub fn begin(&self, surface: Surface) -> CancellationToken {
        let token = CancellationToken::new();
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = current.insert(surface, token.clone()) {
            previous.cancel();
        }
        token
    }
}

/// Drives `request` to completion unless `token` is cancelled first.
pub async fn until_cancelled<T, F>(token: CancellationToken, request: F) -> Result<T, ApiFailure>
where
    F: Future<Output = Result<T, ApiFailure>>,
{
    tokio::select! {
        _ = token.cancelled() => Err(ApiFailure::cancelled()),
        result = request => result,
    }
}
