use crawl_core::{ApiFailure, CreateOutcome, FailureKind, Job, JobId, PauseState, Stage};
use crawl_logging::{crawl_debug, crawl_warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;

use crate::api::{
    error_message, CreateResponse, IdsBody, StageResponse, ToggleResponse, UrlsBody,
};
use crate::{ClientError, ClientSettings, Profile};

/// Remote calls that move jobs through the server pipeline. Holds no job state.
#[async_trait::async_trait]
pub trait TransitionClient: Send + Sync {
    async fn create(&self, urls: &[String]) -> Result<CreateOutcome, ApiFailure>;

    /// Enqueue, set-running or fetch-result for `ids`. `failed_urls` is only sent with
    /// fetch-result.
    async fn advance(
        &self,
        stage: Stage,
        ids: &[JobId],
        failed_urls: &[String],
    ) -> Result<Vec<Job>, ApiFailure>;

    async fn toggle_pause(&self, id: JobId) -> Result<PauseState, ApiFailure>;

    async fn profile(&self) -> Result<Profile, ApiFailure>;

    async fn delete_jobs(&self, ids: &[JobId]) -> Result<(), ApiFailure>;

    async fn delete_job(&self, id: JobId) -> Result<(), ApiFailure>;
}

#[derive(Debug, Clone)]
pub struct HttpTransitionClient {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpTransitionClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        let root = format!("{}/", settings.base_url.trim_end_matches('/'));
        let base = Url::parse(&root).map_err(|err| ClientError::InvalidBaseUrl {
            url: settings.base_url.clone(),
            reason: err.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: settings.base_url.clone(),
                reason: "not a hierarchical url".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base,
            token: settings.token.clone(),
        })
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiFailure>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|err| ApiFailure::new(FailureKind::Network, err.to_string()))?;
        crawl_debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            let payload = serde_json::to_vec(body)
                .map_err(|err| ApiFailure::new(FailureKind::Decode, err.to_string()))?;
            request = request.header(CONTENT_TYPE, "application/json").body(payload);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            let message = error_message(&bytes).unwrap_or_else(|| status.to_string());
            crawl_warn!("{} {} answered {}: {}", method, path, status.as_u16(), message);
            return Err(ApiFailure::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| ApiFailure::new(FailureKind::Decode, err.to_string()))
    }
}

fn stage_path(stage: Stage) -> &'static str {
    match stage {
        Stage::Enqueue => "analyses/queued",
        Stage::SetRunning => "analyses/running",
        Stage::FetchResult => "analyses/result",
    }
}

#[async_trait::async_trait]
impl TransitionClient for HttpTransitionClient {
    async fn create(&self, urls: &[String]) -> Result<CreateOutcome, ApiFailure> {
        let response: CreateResponse = self
            .send(Method::POST, "analyses/create", Some(&UrlsBody { urls }))
            .await?;
        Ok(response.into())
    }

    async fn advance(
        &self,
        stage: Stage,
        ids: &[JobId],
        failed_urls: &[String],
    ) -> Result<Vec<Job>, ApiFailure> {
        let body = IdsBody { ids, failed_urls };
        let response: StageResponse = self
            .send(Method::POST, stage_path(stage), Some(&body))
            .await?;
        Ok(response.into_jobs())
    }

    async fn toggle_pause(&self, id: JobId) -> Result<PauseState, ApiFailure> {
        let path = format!("analyses/{id}/toggle_should_pause");
        let response: ToggleResponse = self.send::<(), _>(Method::POST, &path, None).await?;
        Ok(response.into())
    }

    async fn profile(&self) -> Result<Profile, ApiFailure> {
        self.send::<(), _>(Method::GET, "profile", None).await
    }

    async fn delete_jobs(&self, ids: &[JobId]) -> Result<(), ApiFailure> {
        let body = IdsBody {
            ids,
            failed_urls: &[],
        };
        let _: IgnoredAny = self
            .send(Method::DELETE, "profile/urls", Some(&body))
            .await?;
        Ok(())
    }

    async fn delete_job(&self, id: JobId) -> Result<(), ApiFailure> {
        let path = format!("analyses/{id}");
        let _: IgnoredAny = self.send::<(), _>(Method::DELETE, &path, None).await?;
        Ok(())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiFailure {
    if err.is_timeout() {
        return ApiFailure::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiFailure::new(FailureKind::Decode, err.to_string());
    }
    ApiFailure::new(FailureKind::Network, err.to_string())
}
