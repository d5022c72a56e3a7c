use crate::config::{Config, RunOptions};
use crate::data::Row;
use crate::github::{actions, GitHubClient};
use crate::pipeline::{self, filter, Filtered};
use crate::tui::search::FuzzySearch;
use crate::tui::Message;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Braille spinner frames for the reload indicator
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// The interactive loop's state machine.
///
/// Listing ⇄ Previewing via the preview key; reload, mark-read, and
/// mark-done move to Reloading until the background collection lands.
/// Exit is handled by `update()` returning `Ok(true)` or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Listing,
    Previewing,
    Reloading,
}

/// Modal overlay; at most one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Help,
    Comment,
}

/// Result from the background reload task.
pub enum ReloadResult {
    Rows(Vec<Row>),
    AllCaughtUp,
    Error(String),
}

pub struct App {
    pub config: Arc<Config>,
    pub opts: RunOptions,
    pub phase: Phase,
    pub overlay: Overlay,

    /// Enriched rows in fetch order; the sole source of truth per reload.
    pub rows: Vec<Row>,
    /// The last reload came back empty with no filter hiding anything.
    pub all_caught_up: bool,
    /// Indices into `rows` currently visible under the live query.
    pub filtered_indices: Vec<usize>,
    /// Position within `filtered_indices`.
    pub cursor: usize,
    /// Multi-selected row indices (into `rows`); cleared on reload.
    pub selected: HashSet<usize>,

    pub search_mode: bool,
    pub query: String,
    pub comment_draft: String,
    pub spinner_frame: usize,

    reload_rx: Option<mpsc::Receiver<ReloadResult>>,
    fuzzy: FuzzySearch,
}

impl App {
    pub fn new(config: Arc<Config>, opts: RunOptions, initial: Filtered) -> Self {
        let (rows, all_caught_up) = match initial {
            Filtered::Rows(rows) => (rows, false),
            Filtered::AllCaughtUp => (vec![], true),
        };

        let mut app = Self {
            config,
            opts,
            phase: Phase::Listing,
            overlay: Overlay::None,
            rows,
            all_caught_up,
            filtered_indices: vec![],
            cursor: 0,
            selected: HashSet::new(),
            search_mode: false,
            query: String::new(),
            comment_draft: String::new(),
            spinner_frame: 0,
            reload_rx: None,
            fuzzy: FuzzySearch::new(),
        };
        app.apply_query();
        app
    }

    /// Process a message and update app state (Elm Architecture update
    /// function). Returns `Ok(true)` if the app should quit.
    pub async fn update(&mut self, msg: Message) -> Result<bool> {
        // Remote-state actions and selection changes wait for the in-flight
        // reload to settle; an index chosen against the old rows could land
        // on a different thread in the fresh set.
        if self.phase == Phase::Reloading
            && matches!(
                msg,
                Message::Reload | Message::MarkRead | Message::MarkDone | Message::ToggleSelect
            )
        {
            return Ok(false);
        }

        match msg {
            Message::Quit => return Ok(true),

            Message::MoveUp => self.move_cursor(-1),
            Message::MoveDown => self.move_cursor(1),
            Message::GotoTop => self.cursor = 0,
            Message::GotoBottom => {
                self.cursor = self.filtered_indices.len().saturating_sub(1);
            }

            Message::ToggleSelect => self.toggle_select(),
            Message::TogglePreview => self.toggle_preview(),

            Message::Reload => self.start_reload(),
            Message::MarkRead => {
                let targets = self.targets();
                if !targets.is_empty() {
                    actions::mark_read(&self.config, &targets).await?;
                    self.start_reload();
                }
            }
            Message::MarkDone => {
                let targets = self.targets();
                if !targets.is_empty() {
                    actions::mark_done(&self.config, &targets).await?;
                    self.start_reload();
                }
            }
            Message::OpenBrowser => {
                let url = self.single_target()?.browse_url();
                open_url(&url)?;
            }

            Message::EnterSearch => self.search_mode = true,
            Message::ExitSearch => {
                self.search_mode = false;
                self.query.clear();
                self.apply_query();
            }
            Message::ConfirmSearch => self.search_mode = false,
            Message::SearchInput(c) => {
                self.query.push(c);
                self.apply_query();
            }
            Message::SearchBackspace => {
                self.query.pop();
                self.apply_query();
            }

            Message::EnterComment => {
                let row = self.single_target()?;
                // Refuse non-commentable subject types before taking input.
                actions::comment_target(row)?;
                self.comment_draft.clear();
                self.overlay = Overlay::Comment;
            }
            Message::CancelComment => {
                self.overlay = Overlay::None;
                self.comment_draft.clear();
            }
            Message::CommentInput(c) => self.comment_draft.push(c),
            Message::CommentBackspace => {
                self.comment_draft.pop();
            }
            Message::SubmitComment => {
                let body = self.comment_draft.trim().to_string();
                if body.is_empty() {
                    self.overlay = Overlay::None;
                    return Ok(false);
                }
                let row = self.single_target()?.clone();
                actions::comment(&self.config, &row, &body).await?;
                // The comment flow is terminal: post, then leave.
                return Ok(true);
            }

            Message::ToggleHelp => {
                self.overlay = match self.overlay {
                    Overlay::Help => Overlay::None,
                    _ => Overlay::Help,
                };
            }

            Message::None => {}
        }
        Ok(false)
    }

    /// Row under the cursor, honoring the live query.
    pub fn cursor_row(&self) -> Option<&Row> {
        self.filtered_indices
            .get(self.cursor)
            .and_then(|&i| self.rows.get(i))
    }

    /// The single row a browse/comment action applies to. More than one
    /// selected row is a fatal error for single-target actions.
    pub fn single_target(&self) -> Result<&Row> {
        if self.selected.len() > 1 {
            anyhow::bail!(
                "{} rows selected for a single-target action",
                self.selected.len()
            );
        }
        if let Some(&idx) = self.selected.iter().next() {
            return self.rows.get(idx).context("Selection is stale");
        }
        self.cursor_row().context("No row highlighted")
    }

    /// Rows a bulk action applies to: the selection in row order, or the
    /// cursor row when nothing is selected.
    pub fn targets(&self) -> Vec<Row> {
        if self.selected.is_empty() {
            return self.cursor_row().cloned().into_iter().collect();
        }
        let mut indices: Vec<usize> = self.selected.iter().copied().collect();
        indices.sort_unstable();
        indices
            .into_iter()
            .filter_map(|i| self.rows.get(i).cloned())
            .collect()
    }

    pub fn toggle_select(&mut self) {
        if let Some(&idx) = self.filtered_indices.get(self.cursor) {
            if !self.selected.remove(&idx) {
                self.selected.insert(idx);
            }
            self.move_cursor(1);
        }
    }

    fn toggle_preview(&mut self) {
        self.phase = match self.phase {
            Phase::Listing => Phase::Previewing,
            Phase::Previewing => Phase::Listing,
            Phase::Reloading => Phase::Reloading,
        };
    }

    fn move_cursor(&mut self, delta: i64) {
        if self.filtered_indices.is_empty() {
            self.cursor = 0;
            return;
        }
        let max = self.filtered_indices.len() as i64 - 1;
        self.cursor = (self.cursor as i64 + delta).clamp(0, max) as usize;
    }

    /// Recompute the visible set from the live query without refetching.
    pub fn apply_query(&mut self) {
        self.filtered_indices = self.fuzzy.filter_rows(&self.rows, &self.query);
        if self.cursor >= self.filtered_indices.len() {
            self.cursor = self.filtered_indices.len().saturating_sub(1);
        }
    }

    /// Kick off a background re-collection of the pipeline. The selection
    /// is cleared: the fresh row set is the sole source of truth.
    pub fn start_reload(&mut self) {
        if self.phase == Phase::Reloading {
            return;
        }
        self.phase = Phase::Reloading;
        self.selected.clear();

        let (tx, rx) = mpsc::channel(1);
        self.reload_rx = Some(rx);

        let config = Arc::clone(&self.config);
        let opts = self.opts.clone();
        let has_query = !self.query.trim().is_empty();

        tokio::spawn(async move {
            let source = GitHubClient::new(config, opts.clone());
            let msg = match pipeline::collect(&source, opts.requested).await {
                Ok(rows) => {
                    let ctx = filter::FilterContext {
                        is_reload: true,
                        has_query,
                    };
                    match filter::apply(rows, opts.exclude.as_ref(), opts.include.as_ref(), ctx) {
                        Filtered::Rows(rows) => ReloadResult::Rows(rows),
                        Filtered::AllCaughtUp => ReloadResult::AllCaughtUp,
                    }
                }
                Err(e) => ReloadResult::Error(format!("{:#}", e)),
            };
            crate::util::send_or_log(&tx, msg, "reload result").await;
        });
    }

    /// Poll for background reload results (non-blocking). A failed reload
    /// is a fetch failure and therefore fatal.
    pub fn poll_reload(&mut self) -> Result<()> {
        let Some(rx) = self.reload_rx.as_mut() else {
            return Ok(());
        };
        match rx.try_recv() {
            Ok(ReloadResult::Rows(rows)) => {
                self.rows = rows;
                self.all_caught_up = false;
                self.finish_reload();
            }
            Ok(ReloadResult::AllCaughtUp) => {
                self.rows.clear();
                self.all_caught_up = true;
                self.finish_reload();
            }
            Ok(ReloadResult::Error(msg)) => {
                self.reload_rx = None;
                anyhow::bail!("{}", msg);
            }
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.reload_rx = None;
                self.phase = Phase::Listing;
            }
        }
        Ok(())
    }

    fn finish_reload(&mut self) {
        self.reload_rx = None;
        self.phase = Phase::Listing;
        self.cursor = 0;
        // Stale indices must never carry over to the fresh row set.
        self.selected.clear();
        self.apply_query();
    }

    pub fn on_tick(&mut self) {
        if self.phase == Phase::Reloading {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }
}

fn open_url(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    let launcher = "open";
    #[cfg(not(target_os = "macos"))]
    let launcher = "xdg-open";

    std::process::Command::new(launcher)
        .arg(url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to launch {}", launcher))?;
    Ok(())
}
