use crate::cache_manager::SyncContext;
use crate::sync::{CacheEntry, DataRequest, Mutation, MutationKind, MutationOutcome, QueryIdentity};
use crate::tui::common::stream_factory::ViewSubscriptions;
use crate::tui::shared_ui::{render_footer, render_notifications, render_tabs};
use crate::tui::stream::{Message, async_key_events, message_channel, tick_events};
use crate::tui::style::TableColors;
use crate::tui::{config_app, dashboard_app, event_app, log_app};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::stream::StreamExt;
use ratatui::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::{error::Error, io};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Events,
    Logs,
    Config,
}

impl Tab {
    pub const ALL: [Self; 4] = [Self::Dashboard, Self::Events, Self::Logs, Self::Config];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Events => "Events",
            Self::Logs => "Logs",
            Self::Config => "Configuration",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }

    const fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    const fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// What a view asks the loop to do after a key press
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    None,
    Quit,
    Switch(Tab),
    /// The view's requests changed (page, filter, level)
    Resubscribe,
    Mutate(Mutation),
    Refetch(QueryIdentity),
}

pub(crate) trait AppBehavior {
    /// Queries the view wants subscribed while it is visible
    fn requests(&self) -> Vec<DataRequest>;

    fn on_entry(&mut self, entry: &Arc<CacheEntry>);

    fn on_outcome(&mut self, _kind: MutationKind, _outcome: &MutationOutcome) {}

    fn handle_key(&mut self, key: &KeyEvent, ctx: &SyncContext) -> Action;

    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &SyncContext);

    /// True while a prompt or dialog owns the keyboard
    fn captures_input(&self) -> bool;

    fn info_text(&self) -> &'static str;

    fn colors(&self) -> &TableColors;
}

/// # Errors
///
/// Will return `Err` if function cannot access a terminal or render a ui
pub async fn run(ctx: SyncContext) -> Result<(), Box<dyn Error>> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_root_ui_loop(&mut terminal, &ctx).await;

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("{err:?}");
    }

    Ok(())
}

fn build_views() -> Vec<Box<dyn AppBehavior>> {
    vec![
        Box::new(dashboard_app::app::App::new()),
        Box::new(event_app::app::App::new()),
        Box::new(log_app::app::App::new()),
        Box::new(config_app::app::App::new()),
    ]
}

fn spawn_mutation(ctx: &SyncContext, tx: &mpsc::Sender<Message>, mutation: Mutation) {
    let mutations = ctx.mutations.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let kind = mutation.kind();
        let outcome = mutations.execute(mutation).await;
        let _ = tx.send(Message::Mutation(kind, outcome)).await;
    });
}

fn spawn_refetch(ctx: &SyncContext, identity: QueryIdentity) {
    let cache = ctx.cache.clone();
    tokio::spawn(async move {
        if let Err(e) = cache.refetch(&identity).await {
            error!("Refetch of {} failed to start: {}", identity, e);
        }
    });
}

/// Keys the loop handles itself unless the view has a prompt open
fn global_action(key: &KeyEvent, current: Tab) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Tab => Some(Action::Switch(current.next())),
        KeyCode::BackTab => Some(Action::Switch(current.previous())),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            Some(Action::Switch(Tab::ALL[index]))
        }
        _ => None,
    }
}

async fn run_root_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ctx: &SyncContext,
) -> io::Result<()> {
    let should_stop = Arc::new(AtomicBool::new(false));
    let (tx, data_events) = message_channel();
    let key_events = async_key_events(should_stop.clone());
    let mut events = futures::stream::select(
        futures::stream::select(key_events, data_events),
        tick_events(),
    );

    let mut views = build_views();
    let mut current = Tab::Dashboard;
    let mut subscriptions = ViewSubscriptions::new(ctx.cache.clone(), tx.clone());
    subscriptions.sync(views[current.index()].requests()).await;
    info!("Console started on {}", current.title());

    loop {
        let notifications = ctx.notifications.active();
        terminal
            .draw(|f| {
                let rects = Layout::vertical([
                    Constraint::Length(1),
                    Constraint::Min(5),
                    Constraint::Length(3),
                ])
                .split(f.area());
                let view = &mut views[current.index()];
                let titles = Tab::ALL.map(Tab::title);
                render_tabs(f, rects[0], &titles, current.index(), view.colors());
                view.draw(f, rects[1], ctx);
                render_footer(f, rects[2], view.info_text(), view.colors());
                render_notifications(f, rects[1], &notifications);
            })?;

        let Some(message) = events.next().await else {
            break;
        };

        let action = match message {
            Message::Key(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                let view = &mut views[current.index()];
                let global = if view.captures_input() {
                    None
                } else {
                    global_action(&key, current)
                };
                global.unwrap_or_else(|| view.handle_key(&key, ctx))
            }
            Message::Key(_) | Message::Tick => Action::None,
            Message::Entry(entry) => {
                views[current.index()].on_entry(&entry);
                Action::None
            }
            Message::Mutation(kind, outcome) => {
                debug!("Mutation {} finished: success={}", kind, outcome.is_success());
                for view in &mut views {
                    view.on_outcome(kind, &outcome);
                }
                Action::None
            }
        };

        match action {
            Action::None => {}
            Action::Quit => break,
            Action::Switch(tab) => {
                if tab != current {
                    current = tab;
                    subscriptions.sync(views[current.index()].requests()).await;
                }
            }
            Action::Resubscribe => {
                subscriptions.sync(views[current.index()].requests()).await;
            }
            Action::Mutate(mutation) => spawn_mutation(ctx, &tx, mutation),
            Action::Refetch(identity) => spawn_refetch(ctx, identity),
        }
    }

    should_stop.store(true, Ordering::Relaxed);
    subscriptions.release_all().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_tab_cycling_wraps() {
        assert_eq!(Tab::Config.next(), Tab::Dashboard);
        assert_eq!(Tab::Dashboard.previous(), Tab::Config);
        assert_eq!(Tab::Events.next(), Tab::Logs);
    }

    #[test]
    fn test_digit_keys_switch_views() {
        let key = KeyEvent::new(KeyCode::Char('3'), KeyModifiers::NONE);
        assert_eq!(global_action(&key, Tab::Dashboard), Some(Action::Switch(Tab::Logs)));
        let key = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(global_action(&key, Tab::Logs), Some(Action::Switch(Tab::Config)));
        let key = KeyEvent::new(KeyCode::Char('9'), KeyModifiers::NONE);
        assert_eq!(global_action(&key, Tab::Dashboard), None);
    }
}
