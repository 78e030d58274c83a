use crate::tui::style::{ITEM_HEIGHT, PALETTES, TableColors};
use ratatui::widgets::{ScrollbarState, TableState};

pub trait TuiTableState {
    type Item;

    fn next(&mut self) {
        if self.get_items().is_empty() {
            return;
        }
        let last = self.get_items().len() - 1;
        let i = self
            .get_state()
            .selected()
            .map_or(0, |i| if i >= last { 0 } else { i + 1 });

        self.get_state().select(Some(i));
        let new_scroll_state = self.get_scroll_state().position(i * ITEM_HEIGHT);
        self.set_scroll_state(new_scroll_state);
    }

    fn previous(&mut self) {
        if self.get_items().is_empty() {
            return;
        }
        let last = self.get_items().len() - 1;
        let i = self
            .get_state()
            .selected()
            .map_or(0, |i| if i == 0 { last } else { i - 1 });

        self.get_state().select(Some(i));
        let new_scroll_state = self.get_scroll_state().position(i * ITEM_HEIGHT);
        self.set_scroll_state(new_scroll_state);
    }

    fn next_color(&mut self) {
        let new_color_index = (self.get_color_index() + 1) % PALETTES.len();
        self.set_color_index(new_color_index);
        self.set_colors();
    }

    fn set_colors(&mut self) {
        let new_colors = TableColors::new(&PALETTES[self.get_color_index()]);
        self.set_table_colors(new_colors);
    }

    /// Keep the selection inside the current rows after a data update
    fn clamp_selection(&mut self) {
        let len = self.get_items().len();
        let selected = self.get_state().selected();
        let clamped = match (len, selected) {
            (0, _) => None,
            (len, Some(i)) if i >= len => Some(len - 1),
            (_, Some(i)) => Some(i),
            (_, None) => Some(0),
        };
        self.get_state().select(clamped);
        let scroll = ScrollbarState::new(len.saturating_sub(1) * ITEM_HEIGHT)
            .position(clamped.unwrap_or(0) * ITEM_HEIGHT);
        self.set_scroll_state(scroll);
    }

    fn selected_item(&mut self) -> Option<&Self::Item> {
        let i = self.get_state().selected()?;
        self.get_items().get(i)
    }

    fn get_items(&self) -> &[Self::Item];
    fn get_state(&mut self) -> &mut TableState;
    fn get_scroll_state(&self) -> &ScrollbarState;
    fn set_scroll_state(&mut self, scroll_state: ScrollbarState);
    fn set_table_colors(&mut self, colors: TableColors);
    fn get_color_index(&self) -> usize;
    fn set_color_index(&mut self, color_index: usize);
}
