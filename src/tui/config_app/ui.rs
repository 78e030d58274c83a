use crate::cache_manager::SyncContext;
use crate::sync::{DisplayState, MutationKind};
use crate::tui::config_app::app::App;
use crate::tui::config_app::fields::Section;
use crate::tui::shared_ui::{render_input, status_line};
use crate::tui::style::{MUTED, WARNING, connection_color};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Tabs},
};

const MASK: &str = "********";

pub fn ui(f: &mut Frame, area: Rect, app: &App, ctx: &SyncContext) {
    let rects = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .split(area);

    let state = app.entry.as_ref().map(|entry| entry.display_state());
    match state {
        None | Some(DisplayState::Loading) => {
            placeholder(f, rects[2], "Loading configuration…", MUTED);
            return;
        }
        Some(DisplayState::Failed(error)) => {
            placeholder(f, rects[2], &format!("Cannot load configuration: {error}"), Color::Red);
            return;
        }
        Some(DisplayState::Ready {
            refreshing, error, ..
        }) => {
            f.render_widget(Paragraph::new(status_line(refreshing, error)), rects[0]);
        }
    }

    let tabs = Tabs::new(Section::ALL.map(Section::title))
        .select(app.section)
        .style(Style::new().fg(MUTED))
        .highlight_style(Style::new().fg(app.colors.selected_style_fg).bold())
        .divider("│");
    f.render_widget(tabs, rects[1]);

    render_fields(f, app, rects[2]);
    render_actions(f, app, ctx, rects[3]);

    if let Some(prompt) = &app.prompt {
        render_input(f, prompt, &app.colors);
    }
}

fn placeholder(f: &mut Frame, area: Rect, text: &str, color: Color) {
    f.render_widget(
        Paragraph::new(text)
            .style(Style::new().fg(color))
            .alignment(Alignment::Center),
        area,
    );
}

fn render_fields(f: &mut Frame, app: &App, area: Rect) {
    let Some(config) = app.current() else {
        return;
    };
    let server = app.server_config();
    let selected = app.selected_field();

    let rows = app.section().fields().iter().map(|field| {
        let value = field.get(config);
        let edited = server.is_some_and(|server| field.get(server) != value);
        let shown = if field.is_secret() && !edited {
            MASK.to_string()
        } else if field.is_secret() {
            "•".repeat(value.chars().count())
        } else {
            value
        };
        let marker = if edited { "*" } else { " " };
        let style = if *field == selected {
            Style::new()
                .fg(app.colors.selected_style_fg)
                .add_modifier(Modifier::REVERSED)
        } else {
            Style::new().fg(app.colors.row_fg)
        };
        Row::new([
            Cell::from(marker).style(Style::new().fg(WARNING)),
            Cell::from(field.label()),
            Cell::from(shown),
        ])
        .style(style)
    });

    let title = if app.is_dirty() {
        format!("{} (unsaved changes)", app.section().title())
    } else {
        app.section().title().to_string()
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(1),
            Constraint::Length(14),
            Constraint::Min(10),
        ],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(app.colors.footer_border_color))
            .title(title),
    )
    .bg(app.colors.buffer_bg);
    f.render_widget(table, area);
}

fn render_actions(f: &mut Frame, app: &App, ctx: &SyncContext, area: Rect) {
    let mut spans = Vec::new();
    if ctx.mutations.is_pending(MutationKind::SaveConfig) {
        spans.push(Span::styled("Saving…", Style::new().fg(Color::Yellow)));
    } else if app.is_dirty() {
        spans.push(Span::styled("(s) Save", Style::new().fg(app.colors.selected_style_fg).bold()));
    } else {
        spans.push(Span::styled("(s) Save", Style::new().fg(MUTED)));
    }
    spans.push(Span::raw("    "));

    if let Some(integration) = app.section().integration() {
        if ctx.mutations.is_pending(MutationKind::TestConnection(integration)) {
            spans.push(Span::styled("Testing…", Style::new().fg(Color::Yellow)));
        } else {
            spans.push(Span::styled(
                format!("(t) Test {}", integration.label()),
                Style::new().fg(connection_color(true)),
            ));
        }
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
