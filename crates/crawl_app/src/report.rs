//! Plain-text rendering of the view model.

use std::fmt::Write;

use crawl_core::{AppViewModel, JobRowView, WorkingRowView};

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "! {notice}");
    }
    if let Some(error) = &view.add_url_error {
        let _ = writeln!(out, "! {error}");
    }
    if let Some(notice) = &view.table.notice {
        let _ = writeln!(out, "! {notice}");
    }

    if !view.working.is_empty() {
        let _ = writeln!(out, "In progress ({}):", view.working.len());
        for row in &view.working {
            let _ = writeln!(out, "  {}", working_line(row));
        }
    }

    let table = &view.table;
    let counts = table
        .status_counts
        .iter()
        .map(|(status, count)| format!("{status}={count}"))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(
        out,
        "Jobs {} of {} | page {}/{} | {}",
        table.filtered_count,
        view.job_count,
        table.current_page,
        table.total_pages.max(1),
        counts
    );
    for row in &table.rows {
        let _ = writeln!(out, "  {}", job_line(row));
    }
    out
}

/// One-line summary logged whenever the state changes.
pub fn progress_line(view: &AppViewModel) -> String {
    let pending = view.pending_urls.len();
    let paused = view.working.iter().filter(|row| row.should_pause).count();
    format!(
        "analyzing={} working={} pending={} paused={} jobs={}",
        view.analyzing,
        view.working.len(),
        pending,
        paused,
        view.job_count
    )
}

fn working_line(row: &WorkingRowView) -> String {
    let id = if row.id < 0 {
        "-".to_string()
    } else {
        row.id.to_string()
    };
    let mut line = format!("[{id}] {:<7} {}", row.status.as_str(), row.url);
    if row.should_pause {
        line.push_str(" (paused)");
    }
    if row.toggling {
        line.push_str(" (toggling)");
    }
    line
}

fn job_line(row: &JobRowView) -> String {
    let mut line = format!(
        "{:>5} {:<7} {:<8} {}",
        row.id,
        row.status.as_str(),
        row.html_version.as_deref().unwrap_or("-"),
        row.url
    );
    if let Some(title) = row.title.as_deref().filter(|title| !title.is_empty()) {
        let _ = write!(line, " \"{title}\"");
    }
    if let (Some(internal), Some(external)) = (row.internal_links_count, row.external_links_count)
    {
        let _ = write!(line, " links={internal}/{external}");
    }
    if row.should_pause {
        line.push_str(" (paused)");
    }
    line
}
