use crate::sync::{Mutation, Notification};
use crate::tui::common::text_input::TextInput;
use crate::tui::style::{MUTED, TableColors, WARNING, notification_color};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};

/// A destructive action waiting for a yes/no answer
#[derive(Clone, Debug)]
pub struct Confirm {
    pub prompt: String,
    pub mutation: Mutation,
}

/// An open text prompt and what its value is for
#[derive(Clone, Debug)]
pub struct Prompt<T> {
    pub title: String,
    pub target: T,
    pub input: TextInput,
}

impl<T> Prompt<T> {
    pub fn new(title: impl Into<String>, target: T, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            target,
            input: TextInput::new(value),
        }
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

pub fn render_tabs(f: &mut Frame, area: Rect, titles: &[&str], selected: usize, colors: &TableColors) {
    let tabs = Tabs::new(
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| format!(" {} {t} ", i + 1)),
    )
    .select(selected)
    .style(Style::new().fg(colors.row_fg).bg(colors.buffer_bg))
    .highlight_style(
        Style::new()
            .fg(colors.header_fg)
            .bg(colors.header_bg)
            .add_modifier(Modifier::BOLD),
    )
    .divider("│");
    f.render_widget(tabs, area);
}

/// Newest notification on top, one line each
pub fn render_notifications(f: &mut Frame, area: Rect, notifications: &[Notification]) {
    if notifications.is_empty() {
        return;
    }
    #[allow(clippy::cast_possible_truncation)]
    let height = (notifications.len().min(3) as u16) + 2;
    let width = area.width.min(60);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + 1,
        width,
        height: height.min(area.height),
    };
    let lines: Vec<Line> = notifications
        .iter()
        .rev()
        .take(3)
        .map(|n| {
            Line::from(n.message.as_str())
                .style(Style::new().fg(Color::White).bg(notification_color(n.kind)))
        })
        .collect();
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title("Notifications"),
        ),
        popup,
    );
}

pub fn render_confirm(f: &mut Frame, confirm: &Confirm, colors: &TableColors) {
    let area = centered_rect(50, 20, f.area());
    let text = vec![
        Line::from(confirm.prompt.as_str()),
        Line::from(""),
        Line::from("(y) confirm   (n) cancel").style(Style::new().fg(MUTED)),
    ];
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .style(Style::new().fg(colors.header_fg).bg(colors.buffer_bg))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::new().fg(WARNING))
                    .title(confirm.mutation.label()),
            ),
        area,
    );
}

pub fn render_input<T>(f: &mut Frame, prompt: &Prompt<T>, colors: &TableColors) {
    let edit_style = Style::default().fg(colors.header_fg).bg(colors.header_bg);
    let area = f.area();
    let input_area = centered_rect(60, 20, area);
    let input_area = Rect {
        height: input_area.height.min(3),
        ..input_area
    };

    let block = Paragraph::new(prompt.input.value.as_str())
        .style(edit_style)
        .block(Block::default().borders(Borders::ALL).title(prompt.title.as_str()));

    f.render_widget(Clear, input_area);
    f.render_widget(block, input_area);

    #[allow(clippy::cast_possible_truncation)]
    let p = Position {
        x: input_area.x + prompt.input.cursor as u16 + 1,
        y: input_area.y + 1,
    };
    f.set_cursor_position(p);
}

pub fn render_footer(f: &mut Frame, area: Rect, text: &str, colors: &TableColors) {
    let info_footer = Paragraph::new(Line::from(text))
        .style(Style::new().fg(colors.row_fg).bg(colors.buffer_bg))
        .centered()
        .block(
            Block::bordered()
                .border_type(BorderType::Double)
                .border_style(Style::new().fg(colors.footer_border_color)),
        );
    f.render_widget(info_footer, area);
}

/// `"refreshing…"`, the last error, or nothing
pub fn status_line<'a>(refreshing: bool, error: Option<&'a str>) -> Line<'a> {
    match (refreshing, error) {
        (_, Some(error)) => Line::from(format!("⚠ {error}")).style(Style::new().fg(WARNING)),
        (true, None) => Line::from("refreshing…").style(Style::new().fg(MUTED)),
        (false, None) => Line::from(""),
    }
}
