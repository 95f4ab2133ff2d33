//! The dashboard controller.
//!
//! One `Dashboard` owns every piece of dashboard state: the uploaded column
//! set, which columns are being filtered on, the filter inputs, the last
//! results and the status line. Handlers receive it explicitly; the egui
//! side lives in `panels.rs`.

use crate::client::{Backend, SearchRequest, SearchResponse, UploadFile, UploadResponse};
use crate::error::{DashError, Result};
use crate::export::{write_export, ExportFormat};
use crate::filter::{FilterBlock, FilterMode};
use crate::progress::{ProgressTicker, Tick};
use crate::results::ResultsTable;
use crate::selection::ColumnSelection;
use crate::status::StatusMessage;
use crate::tasks::{SequenceGuard, TaskOutcome, TaskRunner};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shown in the sidebar after a successful upload.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadInfo {
    pub file_name: String,
    pub file_size: usize,
    pub message: String,
}

pub struct Dashboard {
    pub(crate) selection: ColumnSelection,
    pub(crate) numeric_max: HashMap<String, f64>,
    pub(crate) blocks: Vec<FilterBlock>,
    pub(crate) dropdown_open: bool,
    /// Filters and results stay hidden until the first successful upload.
    pub(crate) ready: bool,
    pub(crate) pending_file: Option<UploadFile>,
    pub(crate) progress: Option<ProgressTicker>,
    /// Upload sequence number reserved for the running animation.
    progress_seq: Option<u64>,
    pub(crate) upload_info: Option<UploadInfo>,
    pub(crate) results: Option<ResultsTable>,
    pub(crate) results_query: String,
    pub(crate) message: Option<StatusMessage>,
    pub(crate) sidebar_minimized: bool,
    pub(crate) results_fullscreen: bool,
    /// A file is being dragged over the window.
    pub(crate) file_hover: bool,
    pub(crate) export_format: ExportFormat,
    tasks: TaskRunner,
    upload_seq: SequenceGuard,
    search_seq: SequenceGuard,
}

/// Validation and application errors already read well on their own;
/// everything else gets the action as a prefix.
fn failure_message(action: &str, err: &DashError) -> String {
    if err.is_validation() || matches!(err, DashError::Application(_)) {
        err.to_string()
    } else {
        format!("{}: {}", action, err)
    }
}

/// Where a pointer click landed relative to the filter dropdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropdownClick {
    /// The "Filter columns" button.
    Header,
    /// An entry in the open option panel.
    Option(String),
    /// The remove button on a selected column's tag.
    RemoveTag(String),
    /// Somewhere in the header or panel that is not a control.
    Inside,
    Outside,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn Backend>, export_format: ExportFormat) -> Self {
        Self::with_runner(TaskRunner::new(backend), export_format)
    }

    pub fn with_runner(tasks: TaskRunner, export_format: ExportFormat) -> Self {
        Self {
            selection: ColumnSelection::default(),
            numeric_max: HashMap::new(),
            blocks: Vec::new(),
            dropdown_open: false,
            ready: false,
            pending_file: None,
            progress: None,
            progress_seq: None,
            upload_info: None,
            results: None,
            results_query: String::new(),
            message: None,
            sidebar_minimized: false,
            results_fullscreen: false,
            file_hover: false,
            export_format,
            tasks,
            upload_seq: SequenceGuard::default(),
            search_seq: SequenceGuard::default(),
        }
    }

    pub fn columns(&self) -> &[String] {
        self.selection.columns()
    }

    pub fn available_columns(&self) -> &[String] {
        self.selection.available()
    }

    pub fn selected_filters(&self) -> &[String] {
        self.selection.selected()
    }

    pub fn blocks(&self) -> &[FilterBlock] {
        &self.blocks
    }

    pub fn block_mut(&mut self, column: &str) -> Option<&mut FilterBlock> {
        self.blocks.iter_mut().find(|b| b.column == column)
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn results(&self) -> Option<&ResultsTable> {
        self.results.as_ref()
    }

    pub fn upload_info(&self) -> Option<&UploadInfo> {
        self.upload_info.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_dropdown_open(&self) -> bool {
        self.dropdown_open
    }

    pub fn progress(&self) -> Option<&ProgressTicker> {
        self.progress.as_ref()
    }

    /// Lets worker threads wake the UI when a call finishes.
    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.tasks.set_repaint_context(ctx);
    }

    pub(crate) fn report(&mut self, message: StatusMessage) {
        if message.is_error() {
            log::error!("{}", message.text);
        } else {
            log::info!("{}", message.text);
        }
        self.message = Some(message);
    }

    // ---- upload ----------------------------------------------------------

    /// A file was picked or dropped. Restarts the progress animation; any
    /// animation still running for an earlier file is cancelled, and any
    /// upload already in flight is outdated.
    pub fn choose_file(&mut self, file: UploadFile, now: Instant) {
        log::info!("selected {} ({} bytes)", file.name, file.size());
        if let Some(ticker) = self.progress.as_mut() {
            ticker.cancel();
        }
        self.pending_file = Some(file);
        self.progress = Some(ProgressTicker::start(now));
        self.progress_seq = Some(self.upload_seq.next());
    }

    /// Advances the progress animation and starts the upload when it
    /// completes. Returns when the next frame is needed, if at all.
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        let ticker = self.progress.as_mut()?;
        if ticker.is_cancelled() {
            return None;
        }
        match ticker.advance(now) {
            Tick::Running(p) if p < 100 => Some(ticker.until_next(now)),
            Tick::Running(_) => None,
            Tick::Complete => {
                match self.progress_seq {
                    Some(seq) => self.send_upload(seq),
                    None => self.start_upload(),
                }
                None
            }
        }
    }

    pub fn start_upload(&mut self) {
        let seq = self.upload_seq.next();
        self.send_upload(seq);
    }

    fn send_upload(&mut self, seq: u64) {
        let Some(file) = self.pending_file.clone() else {
            self.report(StatusMessage::error(DashError::NoFileSelected.to_string()));
            return;
        };
        self.tasks.upload(seq, file);
    }

    pub fn apply_upload(
        &mut self,
        seq: u64,
        file_name: String,
        file_size: usize,
        result: Result<UploadResponse>,
    ) {
        if !self.upload_seq.is_current(seq) {
            log::debug!("dropping stale upload response #{}", seq);
            return;
        }
        match result.and_then(UploadResponse::into_success) {
            Ok(resp) => {
                log::info!("upload ok: {} columns", resp.columns.len());
                self.selection = ColumnSelection::new(resp.columns);
                self.numeric_max = resp.numeric_max;
                self.blocks.clear();
                self.dropdown_open = false;
                self.ready = true;
                if self.progress_seq == Some(seq) {
                    self.progress = None;
                    self.progress_seq = None;
                }
                self.report(StatusMessage::success(format!(
                    "File uploaded successfully: {}",
                    resp.message
                )));
                self.upload_info = Some(UploadInfo {
                    file_name,
                    file_size,
                    message: resp.message,
                });
            }
            Err(err) => {
                self.report(StatusMessage::error(failure_message(
                    "Error uploading file",
                    &err,
                )));
            }
        }
    }

    // ---- filter dropdown -------------------------------------------------

    pub fn select_filter(&mut self, column: &str) {
        if self.selection.select(column) {
            self.blocks.push(FilterBlock::new(column));
        }
    }

    pub fn remove_filter(&mut self, column: &str) {
        if self.selection.remove(column) {
            self.blocks.retain(|b| b.column != column);
        }
    }

    pub fn toggle_dropdown(&mut self) {
        self.dropdown_open = !self.dropdown_open;
    }

    pub fn close_dropdown(&mut self) {
        self.dropdown_open = false;
    }

    /// Clicking an option selects it and then toggles the panel.
    pub fn pick_option(&mut self, column: &str) {
        self.select_filter(column);
        self.toggle_dropdown();
    }

    /// Applies one click on or around the dropdown. Removing a tag leaves
    /// the panel as it was; a click elsewhere on the page closes it.
    pub fn dropdown_click(&mut self, click: DropdownClick) {
        match click {
            DropdownClick::Header => self.toggle_dropdown(),
            DropdownClick::Option(column) => self.pick_option(&column),
            DropdownClick::RemoveTag(column) => self.remove_filter(&column),
            DropdownClick::Outside => self.close_dropdown(),
            DropdownClick::Inside => {}
        }
    }

    pub fn set_filter_mode(&mut self, column: &str, mode: FilterMode) {
        let bound = self.numeric_max.get(column).copied();
        if let Some(block) = self.block_mut(column) {
            block.set_mode(mode, bound);
        }
    }

    // ---- search ----------------------------------------------------------

    /// Collects what each filter block contributes. Blocks with nothing
    /// filled in are left out.
    pub fn build_search_request(&self) -> Result<SearchRequest> {
        let mut specs = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            if let Some(spec) = block.to_spec()? {
                specs.push((block.column.clone(), spec));
            }
        }
        SearchRequest::new(specs, self.selection.selected().to_vec())
    }

    pub fn search(&mut self) {
        match self.build_search_request() {
            Ok(request) => {
                let seq = self.search_seq.next();
                self.tasks.search(seq, request);
            }
            Err(err) => {
                self.report(StatusMessage::error(failure_message(
                    "Error during search",
                    &err,
                )));
            }
        }
    }

    pub fn apply_search(&mut self, seq: u64, result: Result<SearchResponse>) {
        if !self.search_seq.is_current(seq) {
            log::debug!("dropping stale search response #{}", seq);
            return;
        }
        match result.and_then(SearchResponse::into_success) {
            Ok(resp) => {
                self.report(StatusMessage::success(format!(
                    "Displaying {} records",
                    resp.results.len()
                )));
                let mut table = ResultsTable::from_records(&resp.results);
                table.set_query(&self.results_query);
                self.results = Some(table);
            }
            // earlier results stay on screen
            Err(err) => {
                self.report(StatusMessage::error(failure_message(
                    "Error during search",
                    &err,
                )));
            }
        }
    }

    /// Applies every background call that finished since the last frame.
    pub fn poll_tasks(&mut self) -> bool {
        let outcomes = self.tasks.drain();
        let any = !outcomes.is_empty();
        for outcome in outcomes {
            match outcome {
                TaskOutcome::Upload {
                    seq,
                    file_name,
                    file_size,
                    result,
                } => self.apply_upload(seq, file_name, file_size, result),
                TaskOutcome::Search { seq, result } => self.apply_search(seq, result),
            }
        }
        any
    }

    // ---- results ---------------------------------------------------------

    pub fn set_results_query(&mut self, query: &str) {
        self.results_query = query.to_owned();
        if let Some(table) = self.results.as_mut() {
            table.set_query(query);
        }
    }

    pub fn export_to(&mut self, path: &Path, format: ExportFormat) {
        let Some(table) = self.results.as_ref() else {
            self.report(StatusMessage::error("No results to export"));
            return;
        };
        match write_export(path, table, format) {
            Ok(()) => self.report(StatusMessage::success(format!(
                "Exported results to {}",
                path.display()
            ))),
            Err(err) => self.report(StatusMessage::error(format!("Export failed: {}", err))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterValue, RangeInput};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorded {
        searches: Vec<SearchRequest>,
        uploads: Vec<String>,
    }

    struct FakeBackend {
        upload: serde_json::Value,
        search: serde_json::Value,
        calls: Mutex<Recorded>,
    }

    impl Backend for FakeBackend {
        fn upload(&self, file: &UploadFile) -> Result<UploadResponse> {
            self.calls.lock().unwrap().uploads.push(file.name.clone());
            Ok(serde_json::from_value(self.upload.clone())?)
        }

        fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
            self.calls.lock().unwrap().searches.push(request.clone());
            Ok(serde_json::from_value(self.search.clone())?)
        }
    }

    fn dashboard(upload: serde_json::Value, search: serde_json::Value) -> (Dashboard, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend {
            upload,
            search,
            calls: Mutex::new(Recorded::default()),
        });
        let runner = TaskRunner::inline(backend.clone());
        (Dashboard::with_runner(runner, ExportFormat::Csv), backend)
    }

    fn uploaded(upload: serde_json::Value, search: serde_json::Value) -> (Dashboard, Arc<FakeBackend>) {
        let (mut dash, backend) = dashboard(upload, search);
        dash.pending_file = Some(UploadFile {
            name: "people.csv".into(),
            bytes: vec![0; 2048],
        });
        dash.start_upload();
        dash.poll_tasks();
        (dash, backend)
    }

    #[test]
    fn upload_without_file_makes_no_call() {
        let (mut dash, backend) = dashboard(json!({}), json!({}));
        dash.start_upload();
        dash.poll_tasks();
        assert!(backend.calls.lock().unwrap().uploads.is_empty());
        assert_eq!(dash.message().unwrap().text, "Please select a file to upload.");
        assert!(!dash.is_ready());
    }

    #[test]
    fn progress_completion_triggers_upload() {
        let (mut dash, backend) = dashboard(
            json!({"status": "success", "message": "ok", "columns": ["a"]}),
            json!({}),
        );
        let t0 = Instant::now();
        dash.choose_file(UploadFile { name: "a.csv".into(), bytes: vec![1] }, t0);
        assert!(dash.tick(t0 + Duration::from_millis(1000)).is_some());
        assert!(backend.calls.lock().unwrap().uploads.is_empty());
        assert_eq!(dash.tick(t0 + Duration::from_millis(2000)), None);
        dash.poll_tasks();
        assert_eq!(backend.calls.lock().unwrap().uploads, vec!["a.csv"]);
        assert!(dash.is_ready());
        assert!(dash.progress().is_none());
    }

    #[test]
    fn successful_upload_resets_filter_state() {
        let (mut dash, _) = uploaded(
            json!({"status": "success", "message": "ok", "columns": ["name", "age"], "numericMax": {"age": 50}}),
            json!({}),
        );
        assert_eq!(dash.available_columns(), ["name", "age"]);
        assert_eq!(dash.message().unwrap().text, "File uploaded successfully: ok");
        let info = dash.upload_info().unwrap();
        assert_eq!(info.file_name, "people.csv");
        assert_eq!(info.file_size, 2048);

        dash.select_filter("age");
        // a second upload clears the selection and the blocks
        dash.pending_file = Some(UploadFile { name: "b.csv".into(), bytes: vec![] });
        dash.start_upload();
        dash.poll_tasks();
        assert!(dash.selected_filters().is_empty());
        assert!(dash.blocks().is_empty());
        assert_eq!(dash.available_columns(), ["name", "age"]);
    }

    #[test]
    fn failed_upload_leaves_state_alone() {
        let (dash, _) = uploaded(json!({"status": "error", "message": "bad file"}), json!({}));
        assert!(!dash.is_ready());
        assert!(dash.columns().is_empty());
        assert_eq!(dash.message().unwrap().text, "Error: bad file");
    }

    #[test]
    fn stale_upload_response_is_dropped() {
        let (mut dash, _) = dashboard(json!({}), json!({}));
        let stale = dash.upload_seq.next();
        let _current = dash.upload_seq.next();
        dash.apply_upload(
            stale,
            "old.csv".into(),
            1,
            Ok(serde_json::from_value(json!({"status": "success", "message": "", "columns": ["x"]})).unwrap()),
        );
        assert!(!dash.is_ready());
    }

    #[test]
    fn new_file_choice_outdates_upload_in_flight() {
        let (mut dash, backend) = dashboard(
            json!({"status": "success", "message": "ok", "columns": ["a"]}),
            json!({}),
        );
        let t0 = Instant::now();
        dash.choose_file(UploadFile { name: "old.csv".into(), bytes: vec![1] }, t0);
        assert_eq!(dash.tick(t0 + Duration::from_secs(2)), None);

        // old.csv's response is waiting in the channel when new.csv is picked
        let t1 = t0 + Duration::from_secs(3);
        dash.choose_file(UploadFile { name: "new.csv".into(), bytes: vec![1, 2] }, t1);
        dash.poll_tasks();
        assert!(dash.upload_info().is_none());
        assert!(dash.columns().is_empty());
        assert!(!dash.is_ready());
        assert_eq!(dash.progress().map(ProgressTicker::is_cancelled), Some(false));

        assert!(dash.tick(t1 + Duration::from_millis(500)).is_some());
        assert_eq!(dash.tick(t1 + Duration::from_secs(2)), None);
        dash.poll_tasks();
        assert_eq!(backend.calls.lock().unwrap().uploads, vec!["old.csv", "new.csv"]);
        let info = dash.upload_info().unwrap();
        assert_eq!(info.file_name, "new.csv");
        assert_eq!(info.file_size, 2);
        assert!(dash.is_ready());
        assert!(dash.progress().is_none());
    }

    #[test]
    fn blocks_follow_selection() {
        let (mut dash, _) = uploaded(
            json!({"status": "success", "message": "ok", "columns": ["a", "b", "c"]}),
            json!({}),
        );
        dash.select_filter("c");
        dash.select_filter("a");
        dash.select_filter("a");
        let cols: Vec<&str> = dash.blocks().iter().map(|b| b.column.as_str()).collect();
        assert_eq!(cols, vec!["c", "a"]);
        dash.remove_filter("c");
        dash.remove_filter("b");
        assert_eq!(dash.blocks().len(), 1);
        assert_eq!(dash.available_columns(), ["b", "c"]);
    }

    #[test]
    fn dropdown_toggles_on_option_pick() {
        let (mut dash, _) = uploaded(
            json!({"status": "success", "message": "ok", "columns": ["a", "b"]}),
            json!({}),
        );
        dash.toggle_dropdown();
        assert!(dash.is_dropdown_open());
        dash.pick_option("a");
        assert!(!dash.is_dropdown_open());
        assert_eq!(dash.selected_filters(), ["a"]);
    }

    #[test]
    fn dropdown_click_resolution() {
        let (mut dash, _) = uploaded(
            json!({"status": "success", "message": "ok", "columns": ["a", "b", "c"]}),
            json!({}),
        );
        dash.dropdown_click(DropdownClick::Header);
        assert!(dash.is_dropdown_open());
        dash.dropdown_click(DropdownClick::Inside);
        assert!(dash.is_dropdown_open());
        dash.dropdown_click(DropdownClick::Header);
        assert!(!dash.is_dropdown_open());

        dash.select_filter("a");
        dash.select_filter("b");
        dash.dropdown_click(DropdownClick::Header);
        dash.dropdown_click(DropdownClick::RemoveTag("a".into()));
        assert!(dash.is_dropdown_open());
        assert_eq!(dash.selected_filters(), ["b"]);
        assert_eq!(dash.available_columns(), ["a", "c"]);

        dash.dropdown_click(DropdownClick::Outside);
        assert!(!dash.is_dropdown_open());
        // closed stays closed
        dash.dropdown_click(DropdownClick::Outside);
        assert!(!dash.is_dropdown_open());

        dash.dropdown_click(DropdownClick::Header);
        dash.dropdown_click(DropdownClick::Option("c".into()));
        assert!(!dash.is_dropdown_open());
        assert_eq!(dash.selected_filters(), ["b", "c"]);
    }

    #[test]
    fn range_mode_uses_numeric_bound() {
        let (mut dash, _) = uploaded(
            json!({"status": "success", "message": "ok", "columns": ["age", "city"], "numericMax": {"age": 100}}),
            json!({}),
        );
        dash.select_filter("age");
        dash.select_filter("city");
        dash.set_filter_mode("age", FilterMode::Range);
        dash.set_filter_mode("city", FilterMode::Range);
        assert_eq!(
            dash.blocks()[0].value,
            FilterValue::Range(RangeInput::Bounded { bound: 100.0, min: 0.0, max: 100.0 })
        );
        assert!(matches!(
            dash.blocks()[1].value,
            FilterValue::Range(RangeInput::Free { .. })
        ));
    }

    #[test]
    fn empty_text_filter_is_omitted() {
        let (mut dash, _) = uploaded(
            json!({"status": "success", "message": "ok", "columns": ["name", "city"]}),
            json!({}),
        );
        dash.select_filter("name");
        dash.select_filter("city");
        if let Some(block) = dash.block_mut("city") {
            block.value = FilterValue::Text("Oslo".into());
        }
        let request = dash.build_search_request().unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"filters": {"city": {"text": "Oslo"}}, "selectedColumns": ["name", "city"]})
        );
    }

    #[test]
    fn invalid_number_blocks_the_search() {
        let (mut dash, backend) = uploaded(
            json!({"status": "success", "message": "ok", "columns": ["score"]}),
            json!({"status": "success", "results": []}),
        );
        dash.select_filter("score");
        dash.set_filter_mode("score", FilterMode::Range);
        if let Some(block) = dash.block_mut("score") {
            block.value = FilterValue::Range(RangeInput::Free { min: "x".into(), max: "2".into() });
        }
        dash.search();
        dash.poll_tasks();
        assert!(backend.calls.lock().unwrap().searches.is_empty());
        assert_eq!(dash.message().unwrap().text, "Invalid number for 'score': x");
    }

    #[test]
    fn failed_search_keeps_previous_results() {
        let (mut dash, _) = uploaded(
            json!({"status": "success", "message": "ok", "columns": ["name"]}),
            json!({}),
        );
        let seq = dash.search_seq.next();
        dash.apply_search(
            seq,
            Ok(serde_json::from_value(json!({"status": "success", "results": [{"name": "Al"}]})).unwrap()),
        );
        let seq = dash.search_seq.next();
        dash.apply_search(seq, Err(DashError::HttpStatus(500)));
        assert_eq!(dash.results().unwrap().rows().len(), 1);
        assert_eq!(
            dash.message().unwrap().text,
            "Error during search: Network response was not ok (HTTP 500)"
        );
        let seq = dash.search_seq.next();
        dash.apply_search(
            seq,
            Ok(serde_json::from_value(json!({"status": "error", "message": "No data available"})).unwrap()),
        );
        assert_eq!(dash.message().unwrap().text, "Error: No data available");
        assert_eq!(dash.results().unwrap().rows().len(), 1);
    }

    #[test]
    fn stale_search_response_is_dropped() {
        let (mut dash, _) = uploaded(
            json!({"status": "success", "message": "ok", "columns": ["name"]}),
            json!({}),
        );
        let first = dash.search_seq.next();
        let second = dash.search_seq.next();
        dash.apply_search(
            second,
            Ok(serde_json::from_value(json!({"status": "success", "results": [{"name": "new"}]})).unwrap()),
        );
        dash.apply_search(
            first,
            Ok(serde_json::from_value(json!({"status": "success", "results": [{"name": "old"}]})).unwrap()),
        );
        assert_eq!(dash.results().unwrap().rows()[0], ["new"]);
    }

    #[test]
    fn results_query_survives_new_search() {
        let (mut dash, _) = uploaded(
            json!({"status": "success", "message": "ok", "columns": ["name"]}),
            json!({"status": "success", "results": [{"name": "Al"}, {"name": "Bo"}]}),
        );
        dash.set_results_query("bo");
        dash.search();
        dash.poll_tasks();
        assert_eq!(dash.results().unwrap().visible_count(), 1);
        dash.set_results_query("");
        assert_eq!(dash.results().unwrap().visible_count(), 2);
    }

    #[test]
    fn export_without_results_reports_error() {
        let (mut dash, _) = dashboard(json!({}), json!({}));
        let path = std::env::temp_dir().join("filterdash-never-written.csv");
        dash.export_to(&path, ExportFormat::Csv);
        assert_eq!(dash.message().unwrap().text, "No results to export");
        assert!(!path.exists());
    }
}
