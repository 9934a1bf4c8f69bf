//! Request and response bodies of the crawl server.

use std::collections::BTreeMap;

use crawl_core::{CreateOutcome, FailedUrl, Job, JobId, JobStatus, PauseState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct UrlsBody<'a> {
    pub urls: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct IdsBody<'a> {
    pub ids: &'a [JobId],
    #[serde(rename = "failedURLs", skip_serializing_if = "<[String]>::is_empty")]
    pub failed_urls: &'a [String],
}

/// A job record, optionally with the analysis nested under `result`.
#[derive(Debug, Deserialize)]
struct JobRecord {
    #[serde(flatten)]
    job: Job,
    #[serde(default)]
    result: Option<AnalysisResult>,
}

/// Analysis summary as the result stage nests it; link fields are counts here.
#[derive(Debug, Default, Deserialize)]
struct AnalysisResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    html_version: Option<String>,
    #[serde(default)]
    heading_counts: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    internal_links: Option<u32>,
    #[serde(default)]
    external_links: Option<u32>,
    #[serde(default)]
    inaccessible_links: Option<u32>,
    #[serde(default)]
    has_login_form: Option<bool>,
}

impl JobRecord {
    fn into_job(self) -> Job {
        let mut job = self.job;
        if let Some(result) = self.result {
            job.title = result.title.or(job.title);
            job.html_version = result.html_version.or(job.html_version);
            job.heading_counts = result.heading_counts.or(job.heading_counts);
            job.internal_links_count = result.internal_links.or(job.internal_links_count);
            job.external_links_count = result.external_links.or(job.external_links_count);
            job.inaccessible_links_count =
                result.inaccessible_links.or(job.inaccessible_links_count);
            job.has_login_form = result.has_login_form.or(job.has_login_form);
        }
        job
    }
}

/// `failedURLs` entries are records from the server, plain strings from older builds.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FailedRecord {
    Url(String),
    Record {
        url: String,
        #[serde(default)]
        id: Option<JobId>,
    },
}

impl From<FailedRecord> for FailedUrl {
    fn from(record: FailedRecord) -> Self {
        match record {
            FailedRecord::Url(url) => FailedUrl { url, id: None },
            FailedRecord::Record { url, id } => FailedUrl { url, id },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateResponse {
    #[serde(default)]
    data: Option<Vec<JobRecord>>,
    #[serde(default, rename = "existURLs")]
    exist_urls: Option<Vec<JobRecord>>,
    #[serde(default, rename = "failedURLs")]
    failed_urls: Option<Vec<FailedRecord>>,
}

impl From<CreateResponse> for CreateOutcome {
    fn from(response: CreateResponse) -> Self {
        CreateOutcome {
            created: jobs_of(response.data),
            existing: jobs_of(response.exist_urls),
            failed: response
                .failed_urls
                .unwrap_or_default()
                .into_iter()
                .map(FailedUrl::from)
                .collect(),
        }
    }
}

/// Body of the enqueue, set-running and fetch-result stages.
#[derive(Debug, Deserialize)]
pub(crate) struct StageResponse {
    #[serde(default)]
    data: Option<Vec<JobRecord>>,
}

impl StageResponse {
    pub(crate) fn into_jobs(self) -> Vec<Job> {
        jobs_of(self.data)
    }
}

fn jobs_of(records: Option<Vec<JobRecord>>) -> Vec<Job> {
    records
        .unwrap_or_default()
        .into_iter()
        .map(JobRecord::into_job)
        .collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleResponse {
    id: JobId,
    should_pause: bool,
    #[serde(default)]
    status: Option<JobStatus>,
    #[serde(default)]
    url: String,
}

impl From<ToggleResponse> for PauseState {
    fn from(response: ToggleResponse) -> Self {
        PauseState {
            id: response.id,
            should_pause: response.should_pause,
            status: response.status,
            url: response.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct UserSummary {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// The signed-in user and every job they own.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub user: UserSummary,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub urls: Vec<Job>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Job>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Job>>::deserialize(deserializer)?.unwrap_or_default())
}

/// First string found under `message`, `error` or `errorMessage`, in that order.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error", "errorMessage"]
        .into_iter()
        .find_map(|key| value.get(key).and_then(|field| field.as_str()))
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
