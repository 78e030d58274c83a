use crate::api::BatchDelete;
use crate::cache_manager::SyncContext;
use crate::impl_tui_table_state;
use crate::sync::pagination::{
    FILTER_END_DATE, FILTER_SOURCE, FILTER_START_DATE, FILTER_UNIT_NAME,
};
use crate::sync::{
    CacheEntry, Confirmed, DataRequest, Mutation, MutationKind, PaginationFilterState,
};
use crate::tui::common::base_table_state::BaseTableState;
use crate::tui::common::key_handler::{
    InputResult, KeyHandlerResult, confirm_answer, handle_input_keys, handle_table_keys,
};
use crate::tui::data::{EventRow, event_constraint_len_calculator};
use crate::tui::event_app::ui;
use crate::tui::shared_ui::{Confirm, Prompt};
use crate::tui::style::{EVENTS_INFO_TEXT, TableColors};
use crate::tui::table_ui::TuiTableState;
use crate::tui::ui_loop::{Action, AppBehavior};
use chrono::{DateTime, NaiveDate, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// What an open prompt edits
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventPrompt {
    Filter(&'static str),
    Rename { id: String },
}

#[derive(Clone, Debug)]
pub struct App {
    pub(crate) base: BaseTableState<EventRow>,
    pub(crate) longest_item_lens: (u16, u16, u16, u16, u16),
    pub(crate) pagination: PaginationFilterState,
    pub(crate) entry: Option<Arc<CacheEntry>>,
    pub(crate) prompt: Option<Prompt<EventPrompt>>,
    pub(crate) confirm: Option<Confirm>,
}

impl_tui_table_state!(App, EventRow);

/// `YYYY-MM-DD` or RFC 3339. A bare end date covers the whole day.
pub fn parse_filter_date(name: &str, value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let time = if name == FILTER_END_DATE {
        day.and_hms_opt(23, 59, 59)?
    } else {
        day.and_hms_opt(0, 0, 0)?
    };
    Some(time.and_utc())
}

fn filter_title(name: &str) -> &'static str {
    match name {
        FILTER_SOURCE => "Filter by source (blank clears)",
        FILTER_UNIT_NAME => "Filter by unit (blank clears)",
        FILTER_START_DATE => "From date YYYY-MM-DD (blank clears)",
        _ => "To date YYYY-MM-DD (blank clears)",
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: BaseTableState::new(Vec::new()),
            longest_item_lens: (0, 0, 0, 0, 0),
            pagination: PaginationFilterState::default(),
            entry: None,
            prompt: None,
            confirm: None,
        }
    }

    #[must_use]
    pub fn request(&self) -> DataRequest {
        DataRequest::Events(self.pagination.query().clone())
    }

    fn open_filter(&mut self, name: &'static str) {
        let current = self.pagination.filter(name).unwrap_or_default();
        // show dates the way they are typed
        let current = match name {
            FILTER_START_DATE | FILTER_END_DATE => current.get(..10).unwrap_or(current),
            _ => current,
        };
        self.prompt = Some(Prompt::new(filter_title(name), EventPrompt::Filter(name), current));
    }

    fn submit_prompt(&mut self, prompt: Prompt<EventPrompt>, ctx: &SyncContext) -> Action {
        let value = prompt.input.value.trim().to_string();
        match prompt.target {
            EventPrompt::Filter(name @ (FILTER_START_DATE | FILTER_END_DATE)) => {
                if value.is_empty() {
                    self.pagination.clear_filter(name);
                } else if let Some(date) = parse_filter_date(name, &value) {
                    self.pagination.set_date_filter(name, Some(date));
                } else {
                    ctx.notifications.error(format!("Invalid date: {value}"));
                    return Action::None;
                }
                Action::Resubscribe
            }
            EventPrompt::Filter(name) => {
                self.pagination.set_filter(name, value);
                Action::Resubscribe
            }
            EventPrompt::Rename { id } if !value.is_empty() => {
                let mut changes = serde_json::Map::new();
                changes.insert("name".to_string(), serde_json::Value::String(value));
                Action::Mutate(Mutation::UpdateEvent { id, changes })
            }
            EventPrompt::Rename { .. } => Action::None,
        }
    }

    fn batch_delete(&mut self, ctx: &SyncContext) {
        let filter = BatchDelete {
            source: self.pagination.filter(FILTER_SOURCE).map(str::to_string),
            before_date: self.pagination.filter(FILTER_END_DATE).map(str::to_string),
        };
        let prompt = match (&filter.source, &filter.before_date) {
            (None, None) => {
                ctx.notifications
                    .error("Set a source or end date filter before batch delete");
                return;
            }
            (Some(source), None) => format!("Delete every event from {source}?"),
            (None, Some(before)) => format!("Delete every event before {before}?"),
            (Some(source), Some(before)) => {
                format!("Delete every event from {source} before {before}?")
            }
        };
        self.confirm = Some(Confirm {
            prompt,
            mutation: Mutation::DeleteEventsBatch {
                filter,
                confirmed: Confirmed::by_operator(),
            },
        });
    }

    fn handle_view_keys(&mut self, key: &KeyEvent, ctx: &SyncContext) -> Action {
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
            KeyCode::Char('s') => {
                self.open_filter(FILTER_SOURCE);
                Action::None
            }
            KeyCode::Char('u') => {
                self.open_filter(FILTER_UNIT_NAME);
                Action::None
            }
            KeyCode::Char('f') => {
                self.open_filter(FILTER_START_DATE);
                Action::None
            }
            KeyCode::Char('t') => {
                self.open_filter(FILTER_END_DATE);
                Action::None
            }
            KeyCode::Char('c') if !self.pagination.filters().is_empty() => {
                self.pagination.clear_filters();
                Action::Resubscribe
            }
            KeyCode::Char('e') if !ctx.mutations.is_pending(MutationKind::UpdateEvent) => {
                if let Some(row) = self.selected_item() {
                    let (id, name) = (row.id.clone(), row.name.clone());
                    self.prompt = Some(Prompt::new("Rename event", EventPrompt::Rename { id }, name));
                }
                Action::None
            }
            KeyCode::Char('d') if !ctx.mutations.is_pending(MutationKind::DeleteEvent) => {
                if let Some(row) = self.selected_item() {
                    let prompt = format!("Delete event {} of unit {}?", row.id, row.unit);
                    let id = row.id.clone();
                    self.confirm = Some(Confirm {
                        prompt,
                        mutation: Mutation::DeleteEvent {
                            id,
                            confirmed: Confirmed::by_operator(),
                        },
                    });
                }
                Action::None
            }
            KeyCode::Char('D') if !ctx.mutations.is_pending(MutationKind::DeleteEventsBatch) => {
                self.batch_delete(ctx);
                Action::None
            }
            KeyCode::Char('r') => Action::Refetch(self.request().identity()),
            _ => Action::None,
        }
    }
}

impl AppBehavior for App {
    fn requests(&self) -> Vec<DataRequest> {
        vec![self.request()]
    }

    fn on_entry(&mut self, entry: &Arc<CacheEntry>) {
        // late snapshots of a page we already left
        if entry.identity != self.request().identity() {
            return;
        }
        let rows: Vec<EventRow> = entry
            .data
            .as_ref()
            .and_then(|data| data.events())
            .map(|page| {
                self.pagination.observe_pages(page.pages);
                page.data.iter().map(EventRow::from).collect()
            })
            .unwrap_or_default();
        debug!("events view: {} rows for {}", rows.len(), entry.identity);
        self.longest_item_lens = event_constraint_len_calculator(&rows);
        self.base.items = rows;
        self.clamp_selection();
        self.entry = Some(Arc::clone(entry));
    }

    fn handle_key(&mut self, key: &KeyEvent, ctx: &SyncContext) -> Action {
        if let Some(confirm) = self.confirm.take() {
            return match confirm_answer(key) {
                Some(true) => Action::Mutate(confirm.mutation),
                Some(false) => Action::None,
                None => {
                    self.confirm = Some(confirm);
                    Action::None
                }
            };
        }
        if let Some(mut prompt) = self.prompt.take() {
            return match handle_input_keys(&mut prompt.input, key) {
                InputResult::Submit => self.submit_prompt(prompt, ctx),
                InputResult::Cancel => Action::None,
                InputResult::Continue => {
                    self.prompt = Some(prompt);
                    Action::None
                }
            };
        }
        match handle_table_keys(self, key) {
            KeyHandlerResult::Handled => Action::None,
            KeyHandlerResult::NotHandled => self.handle_view_keys(key, ctx),
        }
    }

    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &SyncContext) {
        ui::ui(f, area, self, ctx);
    }

    fn captures_input(&self) -> bool {
        self.prompt.is_some() || self.confirm.is_some()
    }

    fn info_text(&self) -> &'static str {
        EVENTS_INFO_TEXT
    }

    fn colors(&self) -> &TableColors {
        &self.base.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Event, Page};
    use crate::sync::{FetchResult, SyncConfig};
    use crate::tui::test_support::{ctx, key};

    fn page_entry(app: &App, ids: &[&str], pages: u32) -> Arc<CacheEntry> {
        let page = Page {
            data: ids
                .iter()
                .map(|id| Event {
                    id: (*id).to_string(),
                    unit_name: "101".to_string(),
                    ..Event::default()
                })
                .collect(),
            page: app.pagination.page(),
            pages,
            total: ids.len() as u64,
        };
        Arc::new(CacheEntry::new(app.request().identity()).complete(FetchResult::Events(page)))
    }

    fn type_text(app: &mut App, ctx: &SyncContext, text: &str) -> Action {
        for c in text.chars() {
            app.handle_key(&key(KeyCode::Char(c)), ctx);
        }
        app.handle_key(&key(KeyCode::Enter), ctx)
    }

    #[tokio::test]
    async fn test_entry_fills_rows_and_page_bound() {
        let ctx = ctx(&SyncConfig::default());
        let mut app = App::new();
        let entry = page_entry(&app, &["a", "b"], 1);
        app.on_entry(&entry);
        assert_eq!(app.get_items().len(), 2);
        assert_eq!(app.pagination.known_pages(), Some(1));

        // last page known: next does nothing
        assert_eq!(app.handle_key(&key(KeyCode::Char('n')), &ctx), Action::None);
    }

    #[test]
    fn test_late_entry_for_other_page_is_ignored() {
        let mut app = App::new();
        let stale = page_entry(&app, &["a"], 3);
        app.pagination.set_page(2);
        app.on_entry(&stale);
        assert!(app.get_items().is_empty());
        assert!(app.entry.is_none());
    }

    #[tokio::test]
    async fn test_filter_prompt_resets_page_and_resubscribes() {
        let ctx = ctx(&SyncConfig::default());
        let mut app = App::new();
        app.pagination.set_page(3);

        app.handle_key(&key(KeyCode::Char('u')), &ctx);
        assert!(app.captures_input());
        assert_eq!(type_text(&mut app, &ctx, "101"), Action::Resubscribe);
        assert_eq!(app.pagination.filter(FILTER_UNIT_NAME), Some("101"));
        assert_eq!(app.pagination.page(), 1);
        assert_eq!(app.request().identity().param("unitName"), Some("101"));
    }

    #[tokio::test]
    async fn test_invalid_date_is_reported_not_applied() {
        let ctx = ctx(&SyncConfig::default());
        let mut app = App::new();
        app.handle_key(&key(KeyCode::Char('f')), &ctx);
        assert_eq!(type_text(&mut app, &ctx, "yesterday"), Action::None);
        assert!(app.pagination.filter(FILTER_START_DATE).is_none());
        assert_eq!(ctx.notifications.active().len(), 1);
    }

    #[test]
    fn test_parse_filter_date_covers_whole_end_day() {
        let start = parse_filter_date(FILTER_START_DATE, "2026-03-01").unwrap();
        let end = parse_filter_date(FILTER_END_DATE, "2026-03-01").unwrap();
        assert_eq!(start.to_rfc3339(), "2026-03-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-03-01T23:59:59+00:00");
        assert!(parse_filter_date(FILTER_START_DATE, "2026-03-01T08:00:00+02:00").is_some());
        assert!(parse_filter_date(FILTER_START_DATE, "03/01/2026").is_none());
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let ctx = ctx(&SyncConfig::default());
        let mut app = App::new();
        let entry = page_entry(&app, &["ev-1"], 1);
        app.on_entry(&entry);

        assert_eq!(app.handle_key(&key(KeyCode::Char('d')), &ctx), Action::None);
        assert_eq!(
            app.handle_key(&key(KeyCode::Char('y')), &ctx),
            Action::Mutate(Mutation::DeleteEvent {
                id: "ev-1".to_string(),
                confirmed: Confirmed::by_operator(),
            })
        );
    }

    #[tokio::test]
    async fn test_batch_delete_needs_a_filter() {
        let ctx = ctx(&SyncConfig::default());
        let mut app = App::new();
        app.handle_key(&key(KeyCode::Char('D')), &ctx);
        assert!(!app.captures_input());
        assert_eq!(ctx.notifications.active().len(), 1);

        app.pagination.set_filter(FILTER_SOURCE, "akva");
        app.handle_key(&key(KeyCode::Char('D')), &ctx);
        let Some(confirm) = app.confirm.clone() else {
            panic!("expected a confirmation dialog");
        };
        assert_eq!(
            confirm.mutation,
            Mutation::DeleteEventsBatch {
                filter: BatchDelete {
                    source: Some("akva".to_string()),
                    before_date: None,
                },
                confirmed: Confirmed::by_operator(),
            }
        );
    }

    #[tokio::test]
    async fn test_rename_builds_update() {
        let ctx = ctx(&SyncConfig::default());
        let mut app = App::new();
        let entry = page_entry(&app, &["ev-9"], 1);
        app.on_entry(&entry);

        app.handle_key(&key(KeyCode::Char('e')), &ctx);
        let action = type_text(&mut app, &ctx, "Jaula 7");
        let Action::Mutate(Mutation::UpdateEvent { id, changes }) = action else {
            panic!("expected an update, got {action:?}");
        };
        assert_eq!(id, "ev-9");
        assert_eq!(changes["name"], serde_json::json!("Jaula 7"));
    }
}
