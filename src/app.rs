use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::event::Event;
use crate::fs::node::{DirEntry, NodeKind};
use crate::fs::path;
use crate::fs::sync::Gateways;
use crate::fs::tree::{
    Activation, FetchRequest, FlatItem, Mutation, MutationOutcome, MutationPlan, TreeStore,
};
use crate::preview_content::{self, PreviewContent};
use crate::session::{Session, MIN_SIDEBAR_WIDTH};
use crate::theme::Palette;

/// How long a status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(3);
/// Columns added or removed per sidebar resize key press.
const SIDEBAR_STEP: u16 = 2;
/// Columns always left for the preview pane.
const MIN_PREVIEW_WIDTH: u16 = 20;

/// The kind of dialog being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    Rename { path: String },
    DeleteConfirm { path: String, kind: NodeKind },
    OpenFolder,
    Error { message: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    Dialog(DialogKind),
}

/// Single-line text input. `cursor` is a byte offset on a char boundary.
#[derive(Debug, Default)]
pub struct DialogState {
    pub input: String,
    pub cursor: usize,
}

impl DialogState {
    /// Input prefilled with `text`, cursor at the end.
    pub fn with_input(text: &str) -> Self {
        Self {
            input: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Backspace.
    pub fn delete_char(&mut self) {
        if let Some(prev) = self.input[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
            self.input.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.input[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.input.len();
    }
}

/// What the preview pane currently holds.
#[derive(Debug, Default)]
pub struct PreviewState {
    /// File the pane belongs to; a late load for another path is ignored.
    pub path: Option<String>,
    pub lines: Vec<String>,
    pub scroll_offset: usize,
    pub loading: bool,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

/// Config values the app consults after startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub confirm_delete: bool,
    pub use_icons: bool,
    pub preview_enabled: bool,
    pub preview_max_bytes: u64,
}

impl From<&AppConfig> for Settings {
    fn from(config: &AppConfig) -> Self {
        Self {
            confirm_delete: config.confirm_delete(),
            use_icons: config.use_icons(),
            preview_enabled: config.preview_enabled(),
            preview_max_bytes: config.preview_max_bytes(),
        }
    }
}

/// Main application state.
pub struct App {
    pub store: TreeStore,
    gateways: Gateways,
    event_tx: UnboundedSender<Event>,
    /// Visible rows, rebuilt from the store after every change.
    pub flat_items: Vec<FlatItem>,
    /// Row under the keyboard cursor.
    pub cursor: usize,
    pub scroll_offset: usize,
    pub mode: AppMode,
    pub dialog_state: DialogState,
    pub preview: PreviewState,
    pub status_message: Option<StatusMessage>,
    pub session: Session,
    session_path: Option<PathBuf>,
    pub palette: Palette,
    pub settings: Settings,
    /// Folder whose opening listing is in flight.
    opening: Option<String>,
    /// Spawned gateway tasks that have not reported back.
    in_flight: usize,
    /// Window title waiting to be written to the terminal.
    pending_title: Option<String>,
    pub terminal_width: u16,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        gateways: Gateways,
        event_tx: UnboundedSender<Event>,
        config: &AppConfig,
        session: Session,
        session_path: Option<PathBuf>,
    ) -> Self {
        Self {
            store: TreeStore::new(),
            gateways,
            event_tx,
            flat_items: Vec::new(),
            cursor: 0,
            scroll_offset: 0,
            mode: AppMode::Normal,
            dialog_state: DialogState::default(),
            preview: PreviewState::default(),
            status_message: None,
            session,
            session_path,
            palette: Palette::for_scheme(config.theme_scheme()),
            settings: Settings::from(config),
            opening: None,
            in_flight: 0,
            pending_title: None,
            terminal_width: 0,
            should_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Title set by the last successful folder open, if not yet applied.
    pub fn take_title(&mut self) -> Option<String> {
        self.pending_title.take()
    }

    /// Dispatch every event except key presses.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(_) => {}
            Event::Tick => self.clear_expired_status(),
            Event::Resize(width, _) => self.terminal_width = width,
            Event::RootOpened { path, result } => self.handle_root_opened(path, result),
            Event::Fetched { request, result } => self.handle_fetched(request, result),
            Event::Mutated { plan, result } => self.handle_mutated(plan, result),
            Event::PreviewLoaded { path, result } => self.handle_preview_loaded(path, result),
        }
    }

    // ── Spawned gateway work ────────────────────────────────────────────────

    fn spawn<F>(&mut self, task: F)
    where
        F: std::future::Future<Output = Event> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(task.await);
        });
    }

    fn finish_task(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Start opening `folder` as the new root.
    pub fn open_folder(&mut self, folder: &str) {
        let folder = path::normalize(folder);
        info!(folder = %folder, "opening folder");
        self.opening = Some(folder.clone());
        let gateways = self.gateways.clone();
        self.spawn(async move {
            let result = gateways.open_root(&folder).await;
            Event::RootOpened {
                path: folder,
                result,
            }
        });
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        debug!(dir = %request.path, "fetching");
        let gateways = self.gateways.clone();
        self.spawn(async move {
            let result = gateways.fetch(&request).await;
            Event::Fetched { request, result }
        });
    }

    fn spawn_mutation(&mut self, plan: MutationPlan) {
        debug!(mutation = ?plan.mutation, "running mutation");
        let gateways = self.gateways.clone();
        self.spawn(async move {
            let result = gateways.execute(&plan).await;
            Event::Mutated { plan, result }
        });
    }

    fn spawn_preview(&mut self, file: String) {
        if !self.settings.preview_enabled {
            return;
        }
        self.preview = PreviewState {
            path: Some(file.clone()),
            loading: true,
            ..Default::default()
        };
        let max_bytes = self.settings.preview_max_bytes;
        self.spawn(async move {
            let result = preview_content::load_preview(&file, max_bytes).await;
            Event::PreviewLoaded { path: file, result }
        });
    }

    // ── Completions ─────────────────────────────────────────────────────────

    pub fn handle_root_opened(&mut self, folder: String, result: Result<Vec<DirEntry>>) {
        self.finish_task();
        if self.opening.as_deref() != Some(folder.as_str()) {
            debug!(folder = %folder, "ignoring listing for a superseded open");
            return;
        }
        self.opening = None;
        match result {
            Ok(entries) => {
                self.store.replace_root(&folder, entries);
                self.preview = PreviewState::default();
                self.cursor = 0;
                self.scroll_offset = 0;
                self.refresh_items();
                self.pending_title = Some(format!("{folder} - innote"));
                self.session.last_folder = Some(folder.clone());
                self.save_session();
                self.set_status_message(format!("Opened {folder}"));
            }
            Err(e) => {
                warn!(folder = %folder, error = %e, "cannot open folder");
                self.show_error(format!("Cannot open {folder}: {e}"));
            }
        }
    }

    pub fn handle_fetched(&mut self, request: FetchRequest, result: Result<Vec<DirEntry>>) {
        self.finish_task();
        if !self.store.is_current(request.generation) {
            debug!(dir = %request.path, "ignoring listing for a previous root");
            return;
        }
        if let Err(e) = self.store.complete_fetch(&request, result) {
            warn!(dir = %request.path, error = %e, "expand failed");
            self.set_error_status(format!("Cannot expand {}: {e}", request.path));
        }
        self.refresh_items();
    }

    pub fn handle_mutated(&mut self, plan: MutationPlan, result: Result<MutationOutcome>) {
        self.finish_task();
        if !self.store.is_current(plan.generation) {
            debug!(mutation = ?plan.mutation, "ignoring completion for a previous root");
            return;
        }
        match self.store.complete_mutation(&plan, result) {
            Ok(result_path) => {
                self.refresh_items();
                self.sync_cursor_to_selection();
                if let Some(message) = describe(&plan.mutation, result_path.as_deref()) {
                    self.set_status_message(message);
                }
                self.follow_selection();
            }
            Err(e) => {
                warn!(mutation = ?plan.mutation, error = %e, "mutation failed");
                self.refresh_items();
                match &plan.mutation {
                    Mutation::Rename { from, to } if self.store.editing_path() == Some(from.as_str()) => {
                        self.reopen_rename(from.clone(), path::last_segment(to));
                        self.set_error_status(e.to_string());
                    }
                    _ => self.show_error(e.to_string()),
                }
            }
        }
    }

    pub fn handle_preview_loaded(&mut self, file: String, result: Result<PreviewContent>) {
        self.finish_task();
        if self.preview.path.as_deref() != Some(file.as_str()) {
            return;
        }
        self.preview.loading = false;
        self.preview.lines = match result {
            Ok(content) => content.display_lines(),
            Err(e) => {
                warn!(file = %file, error = %e, "preview failed");
                vec![format!("Cannot read {}: {e}", path::last_segment(&file))]
            }
        };
    }

    // ── Tree actions ────────────────────────────────────────────────────────

    /// Row under the cursor.
    pub fn current_item(&self) -> Option<&FlatItem> {
        self.flat_items.get(self.cursor)
    }

    /// Directory new entries go into: the directory under the cursor, the
    /// parent of the file under the cursor, or the root.
    pub fn current_dir(&self) -> Option<String> {
        match self.current_item() {
            Some(item) if item.kind == NodeKind::Directory => Some(item.path.clone()),
            Some(item) => Some(path::parent_directory_path(&item.path)),
            None => self.store.root_path().map(str::to_string),
        }
    }

    /// Enter on a row: select a file, or toggle a directory.
    pub fn activate_current(&mut self) {
        let Some(target) = self.current_item().map(|item| item.path.clone()) else {
            return;
        };
        match self.store.activate(&target) {
            Ok(Activation::Selected) => self.follow_selection(),
            Ok(Activation::Collapsed) => {}
            Ok(Activation::Fetch(request)) => self.spawn_fetch(request),
            Err(AppError::Busy(_)) => self.set_status_message("Still loading…".to_string()),
            Err(e) => {
                warn!(target = %target, error = %e, "activate on a row the store does not know");
            }
        }
        self.refresh_items();
    }

    /// Collapse the directory under the cursor, or move to its parent row.
    pub fn collapse_or_parent(&mut self) {
        let Some(item) = self.current_item() else {
            return;
        };
        let target = item.path.clone();
        if item.kind == NodeKind::Directory && item.is_expanded && item.depth > 0 {
            self.store.collapse(&target);
            self.refresh_items();
            return;
        }
        let parent = path::parent_directory_path(&target);
        if let Some(index) = self.flat_items.iter().position(|row| row.path == parent) {
            self.cursor = index;
        }
    }

    pub fn create(&mut self, kind: NodeKind) {
        let Some(dir) = self.current_dir() else {
            return;
        };
        match self.store.plan_create(&dir, kind) {
            Ok(plan) => self.spawn_mutation(plan),
            Err(e) => self.report_plan_error(e),
        }
    }

    pub fn begin_rename(&mut self) {
        let Some(target) = self.current_item().map(|item| item.path.clone()) else {
            return;
        };
        match self.store.begin_rename(&target) {
            Ok(()) => {
                let name = path::last_segment(&target).to_string();
                self.dialog_state = DialogState::with_input(&name);
                self.mode = AppMode::Dialog(DialogKind::Rename { path: target });
            }
            Err(e) => self.report_plan_error(e),
        }
    }

    /// Show the rename dialog again for `target`, keeping what the user typed.
    fn reopen_rename(&mut self, target: String, typed: &str) {
        self.dialog_state = DialogState::with_input(typed);
        self.mode = AppMode::Dialog(DialogKind::Rename { path: target });
    }

    /// Submit the rename dialog. The new name stays in the same directory.
    pub fn confirm_rename(&mut self, from: &str) {
        let name = self.dialog_state.input.trim().to_string();
        self.close_dialog();
        let plan = validate_name(&name).and_then(|name| {
            let to = path::join(&path::parent_directory_path(from), name);
            self.store.plan_rename(from, &to)
        });
        match plan {
            Ok(plan) => self.spawn_mutation(plan),
            Err(e) => {
                self.store.cancel_rename();
                self.report_plan_error(e);
            }
        }
    }

    /// Delete the row under the cursor, asking first when configured to.
    pub fn request_delete(&mut self) {
        let Some(item) = self.current_item() else {
            return;
        };
        if item.depth == 0 {
            self.set_error_status("The opened folder cannot be deleted".to_string());
            return;
        }
        let (target, kind) = (item.path.clone(), item.kind);
        if self.settings.confirm_delete {
            self.mode = AppMode::Dialog(DialogKind::DeleteConfirm { path: target, kind });
        } else {
            self.delete(&target);
        }
    }

    pub fn delete(&mut self, target: &str) {
        match self.store.plan_delete(target) {
            Ok(plan) => self.spawn_mutation(plan),
            Err(e) => self.report_plan_error(e),
        }
    }

    pub fn begin_open_folder(&mut self) {
        let prefill = self.store.root_path().unwrap_or_default().to_string();
        self.dialog_state = DialogState::with_input(&prefill);
        self.mode = AppMode::Dialog(DialogKind::OpenFolder);
    }

    pub fn confirm_open_folder(&mut self) {
        let input = self.dialog_state.input.clone();
        self.close_dialog();
        match resolve_folder_input(&input) {
            Ok(folder) => self.open_folder(&folder),
            Err(e) => self.show_error(e.to_string()),
        }
    }

    /// Show the opened folder in the system file manager.
    pub fn reveal_root(&mut self) {
        let Some(root) = self.store.root_path().map(str::to_string) else {
            self.set_error_status("No folder open".to_string());
            return;
        };
        match opener::open(&root) {
            Ok(()) => {
                info!(folder = %root, "opened in file manager");
                self.set_status_message(format!("Opened {root} in the file manager"));
            }
            Err(e) => {
                warn!(folder = %root, error = %e, "cannot open file manager");
                self.set_error_status(format!("Cannot open {root}: {e}"));
            }
        }
    }

    fn report_plan_error(&mut self, e: AppError) {
        match e {
            AppError::Busy(_) => self.set_status_message("Another change is in progress".into()),
            AppError::NotFound(p) => warn!(path = %p, "row is not in the tree"),
            other => self.set_error_status(other.to_string()),
        }
    }

    // ── Dialogs ─────────────────────────────────────────────────────────────

    pub fn show_error(&mut self, message: String) {
        self.dialog_state = DialogState::default();
        self.mode = AppMode::Dialog(DialogKind::Error { message });
    }

    pub fn close_dialog(&mut self) {
        self.mode = AppMode::Normal;
        self.dialog_state = DialogState::default();
    }

    /// Esc in a dialog.
    pub fn cancel_dialog(&mut self) {
        if let AppMode::Dialog(DialogKind::Rename { .. }) = self.mode {
            self.store.cancel_rename();
        }
        self.close_dialog();
    }

    // ── Status bar ──────────────────────────────────────────────────────────

    pub fn set_status_message(&mut self, text: String) {
        self.status_message = Some(StatusMessage {
            text,
            is_error: false,
            created: Instant::now(),
        });
    }

    pub fn set_error_status(&mut self, text: String) {
        self.status_message = Some(StatusMessage {
            text,
            is_error: true,
            created: Instant::now(),
        });
    }

    pub fn clear_expired_status(&mut self) {
        if self
            .status_message
            .as_ref()
            .is_some_and(|msg| msg.created.elapsed() > STATUS_TTL)
        {
            self.status_message = None;
        }
    }

    // ── Cursor and scrolling ────────────────────────────────────────────────

    fn refresh_items(&mut self) {
        self.flat_items = self.store.flatten();
        self.cursor = self.cursor.min(self.flat_items.len().saturating_sub(1));
    }

    fn sync_cursor_to_selection(&mut self) {
        let Some(selected) = self.store.selected_path() else {
            return;
        };
        if let Some(index) = self.flat_items.iter().position(|row| row.path == selected) {
            self.cursor = index;
        }
    }

    /// Point the preview at the store's selection.
    fn follow_selection(&mut self) {
        match self.store.selected_path() {
            Some(selected) if self.preview.path.as_deref() == Some(selected) => {}
            Some(selected) => {
                let is_file = self
                    .store
                    .resolve_node(selected)
                    .is_ok_and(|node| node.kind == NodeKind::File);
                let selected = selected.to_string();
                if is_file {
                    self.spawn_preview(selected);
                } else {
                    self.preview = PreviewState::default();
                }
            }
            None => self.preview = PreviewState::default(),
        }
    }

    pub fn select_next(&mut self) {
        if self.cursor + 1 < self.flat_items.len() {
            self.cursor += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.cursor = 0;
    }

    pub fn select_last(&mut self) {
        self.cursor = self.flat_items.len().saturating_sub(1);
    }

    /// Keep the cursor row inside a window `visible_height` rows tall.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + visible_height {
            self.scroll_offset = self.cursor + 1 - visible_height;
        }
    }

    pub fn scroll_preview(&mut self, delta: isize) {
        let max = self.preview.lines.len().saturating_sub(1);
        self.preview.scroll_offset = self
            .preview
            .scroll_offset
            .saturating_add_signed(delta)
            .min(max);
    }

    // ── Sidebar ─────────────────────────────────────────────────────────────

    pub fn sidebar_width(&self) -> u16 {
        self.session.sidebar_columns(self.terminal_width)
    }

    /// Widen (`grow`) or narrow the sidebar and remember the width.
    pub fn resize_sidebar(&mut self, grow: bool) {
        let current = self.sidebar_width();
        let max = self
            .terminal_width
            .saturating_sub(MIN_PREVIEW_WIDTH)
            .max(MIN_SIDEBAR_WIDTH);
        let width = if grow {
            current.saturating_add(SIDEBAR_STEP)
        } else {
            current.saturating_sub(SIDEBAR_STEP)
        }
        .clamp(MIN_SIDEBAR_WIDTH, max);
        if self.session.sidebar_width != Some(width) {
            self.session.sidebar_width = Some(width);
            self.save_session();
        }
    }

    fn save_session(&self) {
        if let Some(session_path) = &self.session_path {
            if let Err(e) = self.session.save(session_path) {
                warn!(error = %e, "cannot save session");
            }
        }
    }
}

/// Status line for a finished mutation. A create or rename without a result
/// path was dropped by the store and gets no message.
fn describe(mutation: &Mutation, result_path: Option<&str>) -> Option<String> {
    match mutation {
        Mutation::CreateFile { .. } | Mutation::CreateDirectory { .. } => {
            result_path.map(|p| format!("Created {}", path::last_segment(p)))
        }
        Mutation::Rename { .. } => {
            result_path.map(|p| format!("Renamed to {}", path::last_segment(p)))
        }
        Mutation::Delete { path: deleted, .. } => {
            Some(format!("Deleted {}", path::last_segment(deleted)))
        }
    }
}

/// A single path segment typed by the user.
fn validate_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(AppError::InvalidPath("name cannot be empty".into()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(AppError::InvalidPath(format!("{name} is not a valid name")));
    }
    Ok(name)
}

/// Turn dialog or CLI input into an absolute, normalized folder path.
///
/// `~` expands to the home directory and relative input is taken from the
/// working directory. `.` and `..` are resolved lexically.
pub fn resolve_folder_input(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AppError::InvalidPath("no folder given".into()));
    }
    let expanded = match input.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => {
            let home = dirs::home_dir()
                .ok_or_else(|| AppError::InvalidPath("no home directory".into()))?;
            home.join(rest.trim_start_matches(['/', '\\']))
        }
        _ => PathBuf::from(input),
    };
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };
    Ok(path::normalize(&lexical_clean(&absolute).to_string_lossy()))
}

fn lexical_clean(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in p.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
