use crate::tui::style::{ITEM_HEIGHT, PALETTES, TableColors};
use ratatui::widgets::{ScrollbarState, TableState};

/// Table state shared by every list view
///
/// - selection and scrolling
/// - colour palette cycling
#[derive(Clone, Debug)]
pub struct BaseTableState<T> {
    pub state: TableState,
    pub items: Vec<T>,
    pub scroll_state: ScrollbarState,
    pub colors: TableColors,
    pub color_index: usize,
}

impl<T> BaseTableState<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        let scroll = ScrollbarState::new(items.len().saturating_sub(1) * ITEM_HEIGHT);
        Self {
            state: TableState::default().with_selected(0),
            items,
            scroll_state: scroll,
            colors: TableColors::new(&PALETTES[0]),
            color_index: 0,
        }
    }
}

impl<T> Default for BaseTableState<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Generates the `TuiTableState` impl for an app holding a `base: BaseTableState`
#[macro_export]
macro_rules! impl_tui_table_state {
    ($app_type:ty, $item_type:ty) => {
        impl $crate::tui::table_ui::TuiTableState for $app_type {
            type Item = $item_type;

            fn get_items(&self) -> &[Self::Item] {
                &self.base.items
            }

            fn get_state(&mut self) -> &mut ratatui::widgets::TableState {
                &mut self.base.state
            }

            fn get_scroll_state(&self) -> &ratatui::widgets::ScrollbarState {
                &self.base.scroll_state
            }

            fn set_scroll_state(&mut self, scroll_state: ratatui::widgets::ScrollbarState) {
                self.base.scroll_state = scroll_state;
            }

            fn set_table_colors(&mut self, colors: $crate::tui::style::TableColors) {
                self.base.colors = colors;
            }

            fn get_color_index(&self) -> usize {
                self.base.color_index
            }

            fn set_color_index(&mut self, color_index: usize) {
                self.base.color_index = color_index;
            }
        }
    };
}
