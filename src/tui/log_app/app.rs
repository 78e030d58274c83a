use crate::api::LogLevel;
use crate::cache_manager::SyncContext;
use crate::impl_tui_table_state;
use crate::sync::config::DEFAULT_LOGS_PAGE_SIZE;
use crate::sync::pagination::FILTER_LEVEL;
use crate::sync::{CacheEntry, DataRequest, PaginationFilterState};
use crate::tui::common::base_table_state::BaseTableState;
use crate::tui::common::key_handler::{KeyHandlerResult, handle_table_keys};
use crate::tui::data::{LogRow, log_constraint_len_calculator};
use crate::tui::log_app::ui;
use crate::tui::style::{LOGS_INFO_TEXT, TableColors};
use crate::tui::table_ui::TuiTableState;
use crate::tui::ui_loop::{Action, AppBehavior};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use std::sync::Arc;

/// Level filter choices, `None` meaning every level
pub const LEVELS: [Option<LogLevel>; 4] = [
    None,
    Some(LogLevel::Info),
    Some(LogLevel::Warn),
    Some(LogLevel::Error),
];

#[derive(Clone, Debug)]
pub struct App {
    pub(crate) base: BaseTableState<LogRow>,
    pub(crate) timestamp_len: u16,
    pub(crate) pagination: PaginationFilterState,
    pub(crate) entry: Option<Arc<CacheEntry>>,
}

impl_tui_table_state!(App, LogRow);

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        // a constant from the allowed set cannot be rejected
        let pagination =
            PaginationFilterState::with_page_size(DEFAULT_LOGS_PAGE_SIZE).unwrap_or_default();
        Self {
            base: BaseTableState::new(Vec::new()),
            timestamp_len: 0,
            pagination,
            entry: None,
        }
    }

    #[must_use]
    pub fn request(&self) -> DataRequest {
        DataRequest::Logs(self.pagination.query().clone())
    }

    #[must_use]
    pub fn level(&self) -> Option<LogLevel> {
        let current = self.pagination.filter(FILTER_LEVEL)?;
        LEVELS
            .into_iter()
            .flatten()
            .find(|level| level.as_str() == current)
    }

    pub fn cycle_level(&mut self) {
        let position = LEVELS
            .iter()
            .position(|level| *level == self.level())
            .unwrap_or(0);
        match LEVELS[(position + 1) % LEVELS.len()] {
            Some(level) => self.pagination.set_filter(FILTER_LEVEL, level.as_str()),
            None => self.pagination.clear_filter(FILTER_LEVEL),
        }
    }
}

impl AppBehavior for App {
    fn requests(&self) -> Vec<DataRequest> {
        vec![self.request()]
    }

    fn on_entry(&mut self, entry: &Arc<CacheEntry>) {
        if entry.identity != self.request().identity() {
            return;
        }
        let rows: Vec<LogRow> = entry
            .data
            .as_ref()
            .and_then(|data| data.logs())
            .map(|page| {
                self.pagination.observe_pages(page.pages);
                page.data.iter().map(LogRow::from).collect()
            })
            .unwrap_or_default();
        self.timestamp_len = log_constraint_len_calculator(&rows);
        self.base.items = rows;
        self.clamp_selection();
        self.entry = Some(Arc::clone(entry));
    }

    fn handle_key(&mut self, key: &KeyEvent, _ctx: &SyncContext) -> Action {
        if handle_table_keys(self, key) == KeyHandlerResult::Handled {
            return Action::None;
        }
        match key.code {
            KeyCode::Char('n') if self.pagination.next_page() => Action::Resubscribe,
            KeyCode::Char('p') if self.pagination.prev_page() => Action::Resubscribe,
            KeyCode::Char('+') => {
                self.pagination.cycle_page_size(true);
                Action::Resubscribe
            }
            KeyCode::Char('-') => {
                self.pagination.cycle_page_size(false);
                Action::Resubscribe
            }
            KeyCode::Char('l') => {
                self.cycle_level();
                Action::Resubscribe
            }
            KeyCode::Char('c') => {
                self.next_color();
                Action::None
            }
            KeyCode::Char('r') => Action::Refetch(self.request().identity()),
            _ => Action::None,
        }
    }

    fn draw(&mut self, f: &mut Frame, area: Rect, _ctx: &SyncContext) {
        ui::ui(f, area, self);
    }

    fn captures_input(&self) -> bool {
        false
    }

    fn info_text(&self) -> &'static str {
        LOGS_INFO_TEXT
    }

    fn colors(&self) -> &TableColors {
        &self.base.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncConfig;
    use crate::tui::test_support::{ctx, key};

    #[test]
    fn test_starts_with_logs_page_size() {
        let app = App::new();
        assert_eq!(app.pagination.page_size(), DEFAULT_LOGS_PAGE_SIZE);
        assert_eq!(app.level(), None);
    }

    #[test]
    fn test_level_cycle_wraps_to_all() {
        let mut app = App::new();
        app.pagination.set_page(4);
        app.cycle_level();
        assert_eq!(app.level(), Some(LogLevel::Info));
        assert_eq!(app.pagination.page(), 1);
        app.cycle_level();
        app.cycle_level();
        assert_eq!(app.level(), Some(LogLevel::Error));
        app.cycle_level();
        assert_eq!(app.level(), None);
        assert!(app.request().identity().param("level").is_none());
    }

    #[tokio::test]
    async fn test_page_size_key_changes_identity() {
        let ctx = ctx(&SyncConfig::default());
        let mut app = App::new();
        let before = app.request().identity();
        assert_eq!(app.handle_key(&key(KeyCode::Char('+')), &ctx), Action::Resubscribe);
        assert_eq!(app.pagination.page_size(), 200);
        assert_ne!(app.request().identity(), before);
    }
}
