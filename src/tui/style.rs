use crate::api::LogLevel;
use crate::sync::NotificationKind;
use ratatui::prelude::*;
use style::palette::tailwind;

pub const PALETTES: [tailwind::Palette; 4] = [
    tailwind::BLUE,
    tailwind::EMERALD,
    tailwind::INDIGO,
    tailwind::RED,
];

pub const DASHBOARD_INFO_TEXT: &str =
    "(q) quit | (1-4/Tab) views | (s) start | (x) stop | (r) reset watermark | (R) refresh";
pub const EVENTS_INFO_TEXT: &str = "(j/k) move | (n/p) page | (+/-) page size | (s/u/f/t) filter source/unit/from/to | (c) clear | (e) edit | (d) delete | (D) batch delete | (r) refresh";
pub const LOGS_INFO_TEXT: &str =
    "(j/k) move | (n/p) page | (+/-) page size | (l) level | (r) refresh | (c) next color";
pub const CONFIG_INFO_TEXT: &str =
    "(h/l) section | (j/k) field | (Enter) edit | (s) save | (t) test connection | (u) reload";

pub const ITEM_HEIGHT: usize = 1;

#[derive(Clone, Debug)]
pub struct TableColors {
    pub(crate) buffer_bg: Color,
    pub(crate) header_bg: Color,
    pub(crate) header_fg: Color,
    pub(crate) row_fg: Color,
    pub(crate) selected_style_fg: Color,
    pub(crate) normal_row_color: Color,
    pub(crate) alt_row_color: Color,
    pub(crate) footer_border_color: Color,
}

impl TableColors {
    pub const fn new(color: &tailwind::Palette) -> Self {
        Self {
            buffer_bg: tailwind::SLATE.c950,
            header_bg: color.c900,
            header_fg: tailwind::SLATE.c200,
            row_fg: tailwind::SLATE.c200,
            selected_style_fg: color.c400,
            normal_row_color: tailwind::SLATE.c950,
            alt_row_color: tailwind::SLATE.c900,
            footer_border_color: color.c400,
        }
    }
}

impl Default for TableColors {
    fn default() -> Self {
        Self::new(&PALETTES[0])
    }
}

#[must_use]
pub const fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Error => tailwind::RED.c400,
        LogLevel::Warn => tailwind::AMBER.c400,
        LogLevel::Info => tailwind::SKY.c400,
        LogLevel::Debug => tailwind::SLATE.c400,
    }
}

#[must_use]
pub const fn notification_color(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Success => tailwind::EMERALD.c700,
        NotificationKind::Error => tailwind::RED.c700,
    }
}

#[must_use]
pub const fn connection_color(connected: bool) -> Color {
    if connected {
        tailwind::EMERALD.c400
    } else {
        tailwind::RED.c400
    }
}

pub const MUTED: Color = tailwind::SLATE.c500;
pub const WARNING: Color = tailwind::AMBER.c400;
