//! Header, status line and common widget rendering

use crate::app::{AppMode, AppState};
use crate::components::help_overlay::HelpOverlay;
use crate::components::keybindings::KeybindingContext;
use crate::components::nav_bar::NavBar;
use crate::store::ConsoleState;
use crate::theme::{Colors, Styles, Theme};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};

/// Renders the title bar with view tabs and the operator badge
#[derive(Default)]
pub struct HeaderRenderer;

impl HeaderRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_header(&self, f: &mut Frame, area: Rect, state: &AppState, console: &ConsoleState) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border_inactive())
            .title(Span::styled(" Ticketing Console ", Styles::title()));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let [tabs_area, badge_area] =
            Layout::horizontal([Constraint::Min(10), Constraint::Length(40)]).areas(inner);

        if state.mode != AppMode::Login {
            let titles: Vec<Line> = AppMode::tabs()
                .iter()
                .enumerate()
                .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab)))
                .collect();
            let view = state.effective_mode();
            let tabs = Tabs::new(titles)
                .select(AppMode::tabs().iter().position(|tab| *tab == view).unwrap_or(0))
                .style(Styles::unselected())
                .highlight_style(Styles::selected())
                .divider(Span::styled("│", Styles::nav_hint()));
            f.render_widget(tabs, tabs_area);
        }

        let badge = Paragraph::new(Line::from(badge_spans(state, console)))
            .alignment(Alignment::Right);
        f.render_widget(badge, badge_area);
    }
}

/// Operator, overall health and in-flight task count
fn badge_spans(state: &AppState, console: &ConsoleState) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    if state.pending_tasks > 0 {
        spans.push(Span::styled(
            format!("⟳ {} ", state.pending_tasks),
            Styles::warning(),
        ));
    }
    if state.polling {
        spans.push(Span::styled("polling ", Styles::info()));
    }
    let overall = console.health.overall();
    spans.push(Span::styled(format!("{} ", overall), Theme::overall_style(overall)));
    match &console.session {
        Some(session) => spans.push(Span::styled(
            format!("│ {}", session.username),
            Style::default().fg(Colors::SECONDARY),
        )),
        None => spans.push(Span::styled("│ signed out", Styles::text_muted())),
    }
    spans
}

/// Render the one-line status message
pub fn render_status_line(f: &mut Frame, state: &AppState, area: Rect) {
    let status = Paragraph::new(Span::styled(
        format!(" {}", state.status_message),
        Theme::status_style(state.status_level),
    ));
    f.render_widget(status, area);
}

/// Render the navigation bar
pub fn render_nav_bar(f: &mut Frame, state: &AppState, keybinding_ctx: &KeybindingContext, area: Rect) {
    let nav_items = keybinding_ctx.get_nav_items(&state.mode);
    NavBar::new(nav_items).render(f, area);
}

/// Render the help overlay
pub fn render_help_overlay(f: &mut Frame, state: &AppState, keybinding_ctx: &KeybindingContext) {
    let help_overlay = HelpOverlay::new(&state.mode, keybinding_ctx);
    help_overlay.render(f, f.area());
}
