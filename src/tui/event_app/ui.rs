use crate::cache_manager::SyncContext;
use crate::sync::{DisplayState, MutationKind};
use crate::tui::data::describe_filters;
use crate::tui::event_app::app::App;
use crate::tui::shared_ui::{render_confirm, render_input, status_line};
use crate::tui::style::MUTED;
use crate::tui::table_ui::TuiTableState;
use ratatui::{
    prelude::*,
    widgets::{
        Cell, HighlightSpacing, Paragraph, Row, Scrollbar, ScrollbarOrientation, Table,
    },
};

pub fn ui(f: &mut Frame, area: Rect, app: &mut App, ctx: &SyncContext) {
    let rects = Layout::vertical([Constraint::Length(2), Constraint::Min(5)]).split(area);

    app.set_colors();

    render_header(f, app, ctx, rects[0]);

    match app.entry.as_ref().map(|entry| entry.display_state()) {
        None | Some(DisplayState::Loading) => placeholder(f, rects[1], "Loading events…", MUTED),
        Some(DisplayState::Failed(error)) => {
            placeholder(f, rects[1], &format!("Cannot load events: {error}"), Color::Red);
        }
        Some(DisplayState::Ready { .. }) if app.get_items().is_empty() => {
            placeholder(f, rects[1], "No events match", MUTED);
        }
        Some(DisplayState::Ready { .. }) => {
            render_table(f, app, rects[1]);
            render_scrollbar(f, app, rects[1]);
        }
    }

    if let Some(prompt) = &app.prompt {
        render_input(f, prompt, &app.base.colors);
    }
    if let Some(confirm) = &app.confirm {
        render_confirm(f, confirm, &app.base.colors);
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

fn render_header(f: &mut Frame, app: &App, ctx: &SyncContext, area: Rect) {
    let total = app
        .entry
        .as_ref()
        .and_then(|entry| entry.data.as_ref())
        .and_then(|data| data.events())
        .map_or(0, |page| page.total);
    let pages = app
        .pagination
        .known_pages()
        .map_or_else(|| "?".to_string(), |p| p.max(1).to_string());
    let summary = format!(
        "Page {}/{} · {} per page · {} events · filters: {}",
        app.pagination.page(),
        pages,
        app.pagination.page_size(),
        total,
        describe_filters(app.pagination.filters())
    );

    let busy: Vec<&str> = [
        (MutationKind::DeleteEvent, "deleting…"),
        (MutationKind::DeleteEventsBatch, "batch deleting…"),
        (MutationKind::UpdateEvent, "saving…"),
    ]
    .into_iter()
    .filter(|(kind, _)| ctx.mutations.is_pending(*kind))
    .map(|(_, label)| label)
    .collect();

    let state = match app.entry.as_ref().map(|entry| entry.display_state()) {
        Some(DisplayState::Ready {
            refreshing, error, ..
        }) => status_line(refreshing, error),
        _ => Line::from(""),
    };
    let mut second = state;
    if !busy.is_empty() {
        second.push_span(Span::styled(format!("  {}", busy.join(" ")), Style::new().fg(Color::Yellow)));
    }

    f.render_widget(Paragraph::new(vec![Line::from(summary), second]), area);
}

fn render_table(f: &mut Frame, app: &mut App, area: Rect) {
    let header_style = Style::default()
        .fg(app.base.colors.header_fg)
        .bg(app.base.colors.header_bg);
    let selected_style = Style::default()
        .add_modifier(Modifier::REVERSED)
        .fg(app.base.colors.selected_style_fg);

    let header = ["Unit", "Source", "Name", "FechaHora", "Feed", "Amount", "Fish"]
        .iter()
        .copied()
        .map(Cell::from)
        .collect::<Row>()
        .style(header_style)
        .height(1);
    let rows = app.base.items.iter().enumerate().map(|(i, data)| {
        let color = match i % 2 {
            0 => app.base.colors.normal_row_color,
            _ => app.base.colors.alt_row_color,
        };
        data.ref_array()
            .into_iter()
            .map(|content| Cell::from(content.as_str()))
            .collect::<Row>()
            .style(Style::new().fg(app.base.colors.row_fg).bg(color))
            .height(1)
    });
    let bar = " █ ";
    let t = Table::new(
        rows,
        [
            // + 1 is for padding.
            Constraint::Length(app.longest_item_lens.0 + 1),
            Constraint::Length(app.longest_item_lens.1 + 1),
            Constraint::Min(app.longest_item_lens.2 + 1),
            Constraint::Length(app.longest_item_lens.3 + 1),
            Constraint::Min(app.longest_item_lens.4 + 1),
            Constraint::Length(12),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .row_highlight_style(selected_style)
    .highlight_symbol(bar)
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
