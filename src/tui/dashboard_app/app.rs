use crate::api::Status;
use crate::cache_manager::SyncContext;
use crate::sync::{
    CacheEntry, Confirmed, DataRequest, Endpoint, Mutation, MutationKind, QueryIdentity,
};
use crate::tui::common::key_handler::confirm_answer;
use crate::tui::dashboard_app::ui;
use crate::tui::shared_ui::Confirm;
use crate::tui::style::{DASHBOARD_INFO_TEXT, TableColors};
use crate::tui::ui_loop::{Action, AppBehavior};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use std::sync::Arc;

/// Which worker control a key maps to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Start,
    Stop,
    Reset,
}

impl Control {
    pub const ALL: [Self; 3] = [Self::Start, Self::Stop, Self::Reset];

    #[must_use]
    pub const fn kind(self) -> MutationKind {
        match self {
            Self::Start => MutationKind::StartWorker,
            Self::Stop => MutationKind::StopWorker,
            Self::Reset => MutationKind::ResetWatermark,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Start => "(s) Start",
            Self::Stop => "(x) Stop",
            Self::Reset => "(r) Reset watermark",
        }
    }

    #[must_use]
    pub const fn busy_label(self) -> &'static str {
        match self {
            Self::Start => "Starting…",
            Self::Stop => "Stopping…",
            Self::Reset => "Resetting…",
        }
    }
}

#[derive(Clone, Debug)]
pub struct App {
    pub entry: Option<Arc<CacheEntry>>,
    pub confirm: Option<Confirm>,
    pub colors: TableColors,
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
            entry: None,
            confirm: None,
            colors: TableColors::default(),
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        self.entry.as_ref()?.data.as_ref()?.status()
    }

    /// A control is enabled when the worker state allows it and its mutation is not pending.
    /// Nothing is enabled before the first status arrives.
    #[must_use]
    pub fn is_enabled(&self, control: Control, ctx: &SyncContext) -> bool {
        let Some(status) = self.status() else {
            return false;
        };
        let allowed = match control {
            Control::Start | Control::Reset => !status.worker_running,
            Control::Stop => status.worker_running,
        };
        allowed && !ctx.mutations.is_pending(control.kind())
    }
}

impl AppBehavior for App {
    fn requests(&self) -> Vec<DataRequest> {
        vec![DataRequest::Status]
    }

    fn on_entry(&mut self, entry: &Arc<CacheEntry>) {
        if entry.identity.endpoint == Endpoint::Status {
            self.entry = Some(Arc::clone(entry));
        }
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

        match key.code {
            KeyCode::Char('s') if self.is_enabled(Control::Start, ctx) => {
                Action::Mutate(Mutation::StartWorker)
            }
            KeyCode::Char('x') if self.is_enabled(Control::Stop, ctx) => {
                Action::Mutate(Mutation::StopWorker)
            }
            KeyCode::Char('r') if self.is_enabled(Control::Reset, ctx) => {
                self.confirm = Some(Confirm {
                    prompt: "Reset the watermark? The worker will re-ingest from the beginning."
                        .to_string(),
                    mutation: Mutation::ResetWatermark(Confirmed::by_operator()),
                });
                Action::None
            }
            KeyCode::Char('R') => Action::Refetch(QueryIdentity::new(Endpoint::Status)),
            _ => Action::None,
        }
    }

    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &SyncContext) {
        ui::ui(f, area, self, ctx);
    }

    fn captures_input(&self) -> bool {
        self.confirm.is_some()
    }

    fn info_text(&self) -> &'static str {
        DASHBOARD_INFO_TEXT
    }

    fn colors(&self) -> &TableColors {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Status;
    use crate::sync::{FetchResult, SyncConfig};
    use crate::tui::test_support::{ctx, key};

    fn with_status(running: bool) -> App {
        let entry = CacheEntry::new(QueryIdentity::new(Endpoint::Status)).complete(
            FetchResult::Status(Status {
                worker_running: running,
                ..Status::default()
            }),
        );
        let mut app = App::new();
        app.on_entry(&Arc::new(entry));
        app
    }

    #[tokio::test]
    async fn test_controls_follow_worker_state() {
        let ctx = ctx(&SyncConfig::default());
        let stopped = with_status(false);
        assert!(stopped.is_enabled(Control::Start, &ctx));
        assert!(stopped.is_enabled(Control::Reset, &ctx));
        assert!(!stopped.is_enabled(Control::Stop, &ctx));

        let running = with_status(true);
        assert!(!running.is_enabled(Control::Start, &ctx));
        assert!(!running.is_enabled(Control::Reset, &ctx));
        assert!(running.is_enabled(Control::Stop, &ctx));

        assert!(!App::new().is_enabled(Control::Start, &ctx));
    }

    #[tokio::test]
    async fn test_reset_goes_through_confirmation() {
        let ctx = ctx(&SyncConfig::default());
        let mut app = with_status(false);

        assert_eq!(app.handle_key(&key(KeyCode::Char('r')), &ctx), Action::None);
        assert!(app.captures_input());
        assert_eq!(app.handle_key(&key(KeyCode::Char('n')), &ctx), Action::None);
        assert!(!app.captures_input());

        app.handle_key(&key(KeyCode::Char('r')), &ctx);
        assert_eq!(
            app.handle_key(&key(KeyCode::Char('y')), &ctx),
            Action::Mutate(Mutation::ResetWatermark(Confirmed::by_operator()))
        );
    }

    #[tokio::test]
    async fn test_start_key_ignored_while_running() {
        let ctx = ctx(&SyncConfig::default());
        let mut app = with_status(true);
        assert_eq!(app.handle_key(&key(KeyCode::Char('s')), &ctx), Action::None);
        assert_eq!(
            app.handle_key(&key(KeyCode::Char('x')), &ctx),
            Action::Mutate(Mutation::StopWorker)
        );
    }

    #[test]
    fn test_ignores_other_endpoints() {
        let mut app = App::new();
        app.on_entry(&Arc::new(CacheEntry::new(QueryIdentity::new(Endpoint::Config))));
        assert!(app.entry.is_none());
    }
}
