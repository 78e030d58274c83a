use crate::sync::DisplayState;
use crate::tui::log_app::app::App;
use crate::tui::shared_ui::status_line;
use crate::tui::style::{MUTED, level_color};
use crate::tui::table_ui::TuiTableState;
use ratatui::{
    prelude::*,
    widgets::{Cell, HighlightSpacing, Paragraph, Row, Scrollbar, ScrollbarOrientation, Table},
};

pub fn ui(f: &mut Frame, area: Rect, app: &mut App) {
    let rects = Layout::vertical([Constraint::Length(2), Constraint::Min(5)]).split(area);

    app.set_colors();

    let level = app.level().map_or("all", |level| level.as_str());
    let pages = app
        .pagination
        .known_pages()
        .map_or_else(|| "?".to_string(), |p| p.max(1).to_string());
    let summary = Line::from(format!(
        "Page {}/{} · {} per page · level: {}",
        app.pagination.page(),
        pages,
        app.pagination.page_size(),
        level
    ));

    match app.entry.as_ref().map(|entry| entry.display_state()) {
        None | Some(DisplayState::Loading) => {
            f.render_widget(Paragraph::new(summary), rects[0]);
            placeholder(f, rects[1], "Loading logs…", MUTED);
        }
        Some(DisplayState::Failed(error)) => {
            f.render_widget(Paragraph::new(summary), rects[0]);
            placeholder(f, rects[1], &format!("Cannot load logs: {error}"), Color::Red);
        }
        Some(DisplayState::Ready {
            refreshing, error, ..
        }) => {
            f.render_widget(
                Paragraph::new(vec![summary, status_line(refreshing, error)]),
                rects[0],
            );
            if app.get_items().is_empty() {
                placeholder(f, rects[1], "No log entries", MUTED);
            } else {
                render_table(f, app, rects[1]);
                render_scrollbar(f, app, rects[1]);
            }
        }
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

fn render_table(f: &mut Frame, app: &mut App, area: Rect) {
    let header_style = Style::default()
        .fg(app.base.colors.header_fg)
        .bg(app.base.colors.header_bg);
    let selected_style = Style::default()
        .add_modifier(Modifier::REVERSED)
        .fg(app.base.colors.selected_style_fg);

    let header = ["Timestamp", "Level", "Message"]
        .iter()
        .copied()
        .map(Cell::from)
        .collect::<Row>()
        .style(header_style)
        .height(1);
    let rows = app.base.items.iter().enumerate().map(|(i, log)| {
        let color = match i % 2 {
            0 => app.base.colors.normal_row_color,
            _ => app.base.colors.alt_row_color,
        };
        Row::new([
            Cell::from(log.timestamp.as_str()),
            Cell::from(log.level.as_str().to_uppercase())
                .style(Style::new().fg(level_color(log.level)).bold()),
            Cell::from(log.message.as_str()),
        ])
        .style(Style::new().fg(app.base.colors.row_fg).bg(color))
    });
    let t = Table::new(
        rows,
        [
            Constraint::Length(app.timestamp_len + 1),
            Constraint::Length(6),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .row_highlight_style(selected_style)
    .highlight_symbol(" █ ")
    .bg(app.base.colors.buffer_bg)
    .highlight_spacing(HighlightSpacing::Always);
    f.render_stateful_widget(t, area, &mut app.base.state);
}

fn render_scrollbar(f: &mut Frame, app: &mut App, area: Rect) {
    f.render_stateful_widget(
        Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None),
        area.inner(Margin {
            vertical: 1,
            horizontal: 1,
        }),
        &mut app.base.scroll_state,
    );
}
