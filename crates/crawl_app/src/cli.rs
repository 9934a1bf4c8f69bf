use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use crawl_core::{JobId, JobStatus, SortDirection, SortField};
use crawl_logging::LogDestination;

/// Submit URLs to a crawl server and follow them through its analysis pipeline.
#[derive(Parser, Debug)]
#[command(name = "crawl")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, help = "RON config file (defaults to ./crawl.ron when present)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override the server base url")]
    pub base_url: Option<String>,

    #[arg(long, value_enum, help = "Where log output goes")]
    pub log: Option<LogArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit URLs and follow them until their result is fetched.
    Analyze {
        urls: Vec<String>,

        #[arg(long, help = "Use the built-in suggestion list when no URLs are given")]
        seed: bool,
    },
    /// Show the job table.
    List {
        #[arg(long, value_enum, help = "Only these statuses (repeatable)")]
        status: Vec<StatusArg>,

        #[arg(long, help = "Search id, title, html version and status")]
        search: Option<String>,

        #[arg(long, value_enum, default_value = "id")]
        sort: SortArg,

        #[arg(long)]
        desc: bool,

        #[arg(long, default_value = "1")]
        page: usize,

        #[arg(long, help = "Rows per page: 10, 20, 30, 40 or 50")]
        per_page: Option<usize>,
    },
    /// Pause a job, or resume it if already paused.
    Pause { id: JobId },
    /// Submit an existing job again.
    Rerun { id: JobId },
    /// Delete jobs by id.
    Delete {
        #[arg(required = true)]
        ids: Vec<JobId>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogArg {
    File,
    Terminal,
    Both,
}

impl From<LogArg> for LogDestination {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::File => LogDestination::File,
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::Both => LogDestination::Both,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    Queued,
    Running,
    Done,
    Error,
}

impl From<StatusArg> for JobStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Queued => JobStatus::Queued,
            StatusArg::Running => JobStatus::Running,
            StatusArg::Done => JobStatus::Done,
            StatusArg::Error => JobStatus::Error,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    Id,
    Url,
    Title,
    Status,
    HtmlVersion,
    Internal,
    External,
    Inaccessible,
    Created,
    Updated,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Id => SortField::Id,
            SortArg::Url => SortField::Url,
            SortArg::Title => SortField::Title,
            SortArg::Status => SortField::Status,
            SortArg::HtmlVersion => SortField::HtmlVersion,
            SortArg::Internal => SortField::InternalLinksCount,
            SortArg::External => SortField::ExternalLinksCount,
            SortArg::Inaccessible => SortField::InaccessibleLinksCount,
            SortArg::Created => SortField::CreatedAt,
            SortArg::Updated => SortField::UpdatedAt,
        }
    }
}

pub fn sort_direction(desc: bool) -> SortDirection {
    if desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    }
}
