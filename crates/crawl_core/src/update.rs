use crate::{AppState, Effect, Msg, TableMsg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlInputChanged(text) => {
            state.set_url_input(text);
            Vec::new()
        }
        Msg::AddUrlClicked => {
            state.add_url();
            Vec::new()
        }
        Msg::RemovePendingUrl(url) => {
            state.remove_pending_url(&url);
            Vec::new()
        }
        Msg::ClearWorkingList => {
            state.clear_working_list();
            Vec::new()
        }
        Msg::SeedSuggested => {
            state.seed_suggestions();
            Vec::new()
        }
        Msg::AnalyzeClicked => state.submit_batch(),
        Msg::TogglePauseClicked { id, surface } => state.toggle_pause(id, surface),
        Msg::Table(table_msg) => update_table(&mut state, table_msg),
        Msg::ProfileRequested => vec![Effect::FetchProfile],
        Msg::ProfileLoaded(result) => {
            state.on_profile_loaded(result);
            Vec::new()
        }
        Msg::JobsCreated { run, result } => state.on_jobs_created(run, result),
        Msg::StageDue { run, stage } => state.on_stage_due(run, stage),
        Msg::StageCompleted { run, stage, result } => state.on_stage_completed(run, stage, result),
        Msg::PauseToggled { id, result } => state.on_pause_toggled(id, result),
        Msg::JobsDeleted { ids, result } => state.on_jobs_deleted(ids, result),
        Msg::JobDeleted { id, result } => state.on_job_deleted(id, result),
        Msg::Tick | Msg::NoOp => return (state, Vec::new()),
    };

    // Keep the table's projection in step with whatever the store now holds.
    let AppState { table, jobs, .. } = &mut state;
    table.refresh(jobs);

    (state, effects)
}

fn update_table(state: &mut AppState, msg: TableMsg) -> Vec<Effect> {
    state.mark_dirty();
    let store = &state.jobs;
    let table = &mut state.table;
    match msg {
        TableMsg::FacetToggled(status) => table.toggle_facet(status, store),
        TableMsg::FacetsCleared => table.clear_facets(store),
        TableMsg::SearchChanged(term) => table.set_search(term, store),
        TableMsg::ColumnFilterChanged { column, value } => {
            table.set_column_filter(column, value, store)
        }
        TableMsg::SortChanged(sort) => table.set_sort(sort, store),
        TableMsg::PageChanged(page) => {
            table.go_to_page(page);
        }
        TableMsg::ItemsPerPageChanged(size) => {
            table.set_items_per_page(size);
        }
        TableMsg::SelectAllToggled(checked) => table.toggle_all(checked),
        TableMsg::RowChecked { id, checked } => table.toggle_row(id, checked),
        TableMsg::RerunSelectedClicked => {
            let urls = table.send_list().urls().to_vec();
            return state.rerun(urls);
        }
        TableMsg::RerunRowClicked(id) => {
            let urls = table.row_url(id).into_iter().collect();
            return state.rerun(urls);
        }
        TableMsg::DeleteSelectedClicked => return state.delete_selected(),
        TableMsg::DeleteRowClicked(id) => return state.delete_row(id),
    }
    Vec::new()
}
