//! Menu rendering: the selectable rows of the action views

use crate::app::{AppState, MenuItem};
use crate::drafts::DraftState;
use crate::theme::{Colors, Styles};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
};

/// Style for a row; fields read as data, runnable rows as commands
fn row_style(item: &MenuItem) -> Style {
    match item {
        MenuItem::Field(_) => Styles::text(),
        MenuItem::TogglePolling | MenuItem::UseCurrentOrderId => Styles::text_secondary(),
        _ => Style::default().fg(Colors::PRIMARY),
    }
}

/// Render the current view's rows with the selection highlighted
pub fn render_menu(f: &mut Frame, state: &AppState, drafts: &DraftState, area: Rect, title: &str) {
    let items = MenuItem::for_mode(state.effective_mode());

    let rows: Vec<ListItem> = items
        .iter()
        .map(|item| ListItem::new(format!(" {}", item.label(drafts, state.polling))).style(row_style(item)))
        .collect();

    let menu = List::new(rows)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_active())
                .title(format!(" {} ", title)),
        )
        .highlight_style(
            Style::default()
                .bg(Colors::INFO)
                .fg(Colors::FG_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸");

    let mut list_state = ListState::default().with_selected(Some(state.selection));
    f.render_stateful_widget(menu, area, &mut list_state);
}
