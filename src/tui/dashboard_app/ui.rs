use crate::api::{Integration, Status};
use crate::cache_manager::SyncContext;
use crate::sync::DisplayState;
use crate::tui::dashboard_app::app::{App, Control};
use crate::tui::data::format_uptime;
use crate::tui::shared_ui::{render_confirm, status_line};
use crate::tui::style::{MUTED, connection_color};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

pub fn ui(f: &mut Frame, area: Rect, app: &App, ctx: &SyncContext) {
    let rects = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .split(area);

    let Some(entry) = app.entry.as_ref() else {
        render_placeholder(f, rects[1], "Loading status…", MUTED);
        return;
    };

    match entry.display_state() {
        DisplayState::Loading => render_placeholder(f, rects[1], "Loading status…", MUTED),
        DisplayState::Failed(error) => {
            render_placeholder(f, rects[1], &format!("Cannot load status: {error}"), Color::Red);
        }
        DisplayState::Ready {
            data,
            refreshing,
            error,
        } => {
            f.render_widget(Paragraph::new(status_line(refreshing, error)), rects[0]);
            if let Some(status) = data.status() {
                render_cards(f, rects[1], status);
                render_connections(f, rects[2], status);
            }
            render_controls(f, rects[3], app, ctx);
        }
    }

    if let Some(confirm) = &app.confirm {
        render_confirm(f, confirm, &app.colors);
    }
}

fn render_placeholder(f: &mut Frame, area: Rect, text: &str, color: Color) {
    f.render_widget(
        Paragraph::new(text)
            .style(Style::new().fg(color))
            .alignment(Alignment::Center),
        area,
    );
}

fn card<'a>(title: &'a str, value: String) -> Paragraph<'a> {
    Paragraph::new(vec![
        Line::from(""),
        Line::from(value).bold().centered(),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(title),
    )
}

fn render_cards(f: &mut Frame, area: Rect, status: &Status) {
    let cols = Layout::horizontal([Constraint::Ratio(1, 5); 5]).split(area);
    let last = if status.last_fecha_hora.is_empty() {
        "—".to_string()
    } else {
        status.last_fecha_hora.clone()
    };
    let worker = if status.worker_running {
        "Worker running"
    } else {
        "Worker stopped"
    };
    f.render_widget(card(worker, last), cols[0]);
    f.render_widget(card("Events today", status.events_today.to_string()), cols[1]);
    f.render_widget(
        card("Ingestion rate", format!("{:.2} ev/min", status.ingestion_rate)),
        cols[2],
    );
    f.render_widget(card("Total events", status.total_events.to_string()), cols[3]);
    f.render_widget(card("Uptime", format_uptime(status.uptime_seconds)), cols[4]);
}

fn render_connections(f: &mut Frame, area: Rect, status: &Status) {
    let cols = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    for (integration, col) in Integration::ALL.into_iter().zip(cols.iter()) {
        let connected = status.connections.is_connected(integration);
        let text = if connected { "● connected" } else { "○ disconnected" };
        f.render_widget(
            Paragraph::new(vec![
                Line::from(""),
                Line::from(text)
                    .style(Style::new().fg(connection_color(connected)))
                    .centered(),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(integration.label()),
            ),
            *col,
        );
    }
}

fn render_controls(f: &mut Frame, area: Rect, app: &App, ctx: &SyncContext) {
    let spans: Vec<Span> = Control::ALL
        .into_iter()
        .flat_map(|control| {
            let span = if ctx.mutations.is_pending(control.kind()) {
                Span::styled(control.busy_label(), Style::new().fg(Color::Yellow))
            } else if app.is_enabled(control, ctx) {
                Span::styled(control.label(), Style::new().fg(app.colors.selected_style_fg).bold())
            } else {
                Span::styled(control.label(), Style::new().fg(MUTED))
            };
            [span, Span::raw("    ")]
        })
        .collect();
    f.render_widget(
        Paragraph::new(Line::from(spans).centered()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::new().fg(app.colors.footer_border_color))
                .title("Worker"),
        ),
        area,
    );
}
