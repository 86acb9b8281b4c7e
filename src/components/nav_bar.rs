//! Bottom navigation bar showing the keys that matter in the current view

use super::keybindings::NavBarItem;
use crate::theme::{Colors, Styles};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

pub struct NavBar {
    items: Vec<NavBarItem>,
}

impl NavBar {
    pub fn new(items: Vec<NavBarItem>) -> Self {
        Self { items }
    }

    /// Spans for the bar, `key label` pairs separated by a muted divider
    pub fn spans(&self) -> Vec<Span<'static>> {
        let mut spans = Vec::with_capacity(self.items.len() * 3);
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  │  ", Styles::nav_hint()));
            }
            spans.push(Span::styled(
                item.key_display.clone(),
                Style::default()
                    .fg(Colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(" {}", item.action_label),
                Styles::text_secondary(),
            ));
        }
        spans
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }
        f.render_widget(Paragraph::new(Line::from(self.spans())), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_alternate_key_and_label() {
        let bar = NavBar::new(vec![
            NavBarItem {
                key_display: "Enter".to_string(),
                action_label: "Replay".to_string(),
            },
            NavBarItem {
                key_display: "Q".to_string(),
                action_label: "Quit".to_string(),
            },
        ]);
        let text: String = bar.spans().iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "Enter Replay  │  Q Quit");
    }
}
