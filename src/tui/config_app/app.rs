use crate::api::AdminConfig;
use crate::cache_manager::SyncContext;
use crate::sync::{
    CacheEntry, DataRequest, Endpoint, Mutation, MutationKind, MutationOutcome, QueryIdentity,
};
use crate::tui::common::key_handler::{InputResult, handle_input_keys};
use crate::tui::config_app::fields::{Field, Section};
use crate::tui::config_app::ui;
use crate::tui::shared_ui::Prompt;
use crate::tui::style::{CONFIG_INFO_TEXT, TableColors};
use crate::tui::ui_loop::{Action, AppBehavior};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use std::sync::Arc;
use tracing::info;

/// Configuration editor.
///
/// Edits go to a draft copy of the server configuration. A successful save
/// drops the draft unless it was edited again while the save was pending; a
/// failed one keeps it so nothing typed is lost. Reload discards it and
/// refetches.
#[derive(Clone, Debug)]
pub struct App {
    pub(crate) entry: Option<Arc<CacheEntry>>,
    pub(crate) draft: Option<AdminConfig>,
    /// Copy of the draft last sent with a save
    pub(crate) submitted: Option<AdminConfig>,
    pub(crate) section: usize,
    pub(crate) field: usize,
    pub(crate) prompt: Option<Prompt<Field>>,
    pub(crate) colors: TableColors,
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
            draft: None,
            submitted: None,
            section: 0,
            field: 0,
            prompt: None,
            colors: TableColors::default(),
        }
    }

    #[must_use]
    pub fn server_config(&self) -> Option<&AdminConfig> {
        self.entry.as_ref()?.data.as_ref()?.config()
    }

    /// The draft when there is one, else the server copy
    #[must_use]
    pub fn current(&self) -> Option<&AdminConfig> {
        self.draft.as_ref().or_else(|| self.server_config())
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        match (&self.draft, self.server_config()) {
            (Some(draft), Some(server)) => draft != server,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    #[must_use]
    pub const fn section(&self) -> Section {
        Section::ALL[self.section]
    }

    #[must_use]
    pub fn selected_field(&self) -> Field {
        let fields = self.section().fields();
        fields[self.field.min(fields.len() - 1)]
    }

    fn move_section(&mut self, forward: bool) {
        let len = Section::ALL.len();
        self.section = if forward {
            (self.section + 1) % len
        } else {
            (self.section + len - 1) % len
        };
        self.field = 0;
    }

    fn move_field(&mut self, forward: bool) {
        let len = self.section().fields().len();
        self.field = if forward {
            (self.field + 1) % len
        } else {
            (self.field + len - 1) % len
        };
    }

    fn open_editor(&mut self) {
        let Some(config) = self.current() else {
            return;
        };
        let field = self.selected_field();
        let title = format!("{} · {}", self.section().title(), field.label());
        self.prompt = Some(Prompt::new(title, field, field.get(config)));
    }

    fn apply_edit(&mut self, field: Field, value: &str, ctx: &SyncContext) {
        let Some(mut draft) = self.current().cloned() else {
            return;
        };
        match field.set(&mut draft, value) {
            Ok(()) => self.draft = Some(draft),
            Err(e) => {
                ctx.notifications.error(e.to_string());
            }
        }
    }

    fn save(&mut self) -> Action {
        let Some(draft) = self.draft.clone() else {
            return Action::None;
        };
        self.submitted = Some(draft.clone());
        Action::Mutate(Mutation::SaveConfig(Box::new(draft)))
    }

    fn identity() -> QueryIdentity {
        QueryIdentity::new(Endpoint::Config)
    }
}

impl AppBehavior for App {
    fn requests(&self) -> Vec<DataRequest> {
        vec![DataRequest::Config]
    }

    fn on_entry(&mut self, entry: &Arc<CacheEntry>) {
        if entry.identity.endpoint == Endpoint::Config {
            self.entry = Some(Arc::clone(entry));
        }
    }

    fn on_outcome(&mut self, kind: MutationKind, outcome: &MutationOutcome) {
        if kind != MutationKind::SaveConfig {
            return;
        }
        let submitted = self.submitted.take();
        if outcome.is_success() {
            if submitted.is_some() && self.draft == submitted {
                info!("configuration saved, dropping draft");
                self.draft = None;
            } else {
                info!("configuration saved, keeping later edits");
            }
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, ctx: &SyncContext) -> Action {
        if let Some(mut prompt) = self.prompt.take() {
            match handle_input_keys(&mut prompt.input, key) {
                InputResult::Submit => {
                    let value = prompt.input.value.clone();
                    self.apply_edit(prompt.target, &value, ctx);
                }
                InputResult::Cancel => {}
                InputResult::Continue => self.prompt = Some(prompt),
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Char('h') | KeyCode::Left => {
                self.move_section(false);
                Action::None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.move_section(true);
                Action::None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_field(true);
                Action::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_field(false);
                Action::None
            }
            KeyCode::Enter => {
                self.open_editor();
                Action::None
            }
            KeyCode::Char('s') if !ctx.mutations.is_pending(MutationKind::SaveConfig) => {
                self.save()
            }
            KeyCode::Char('t') => match self.section().integration() {
                Some(integration)
                    if !ctx
                        .mutations
                        .is_pending(MutationKind::TestConnection(integration)) =>
                {
                    Action::Mutate(Mutation::TestConnection(integration))
                }
                _ => Action::None,
            },
            KeyCode::Char('u') => {
                self.draft = None;
                self.submitted = None;
                Action::Refetch(Self::identity())
            }
            _ => Action::None,
        }
    }

    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &SyncContext) {
        ui::ui(f, area, self, ctx);
    }

    fn captures_input(&self) -> bool {
        self.prompt.is_some()
    }

    fn info_text(&self) -> &'static str {
        CONFIG_INFO_TEXT
    }

    fn colors(&self) -> &TableColors {
        &self.colors
    }
}
