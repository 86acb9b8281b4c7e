//! Console screens: login, dashboard, action views and history.

use super::menus;
use crate::app::{AppMode, AppState, LoginField};
use crate::components::help_overlay::centered;
use crate::history::HistoryEntry;
use crate::store::{ConsoleState, ResultView};
use crate::theme::{Colors, Styles, Theme, UiConstants};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use serde_json::Value;

/// Pretty JSON for display; raw text bodies are shown as-is
fn pretty_body(data: &Value) -> String {
    match data {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

// ============================================================================
// Login
// ============================================================================

pub fn render_login(f: &mut Frame, state: &AppState, area: Rect) {
    let area = centered(area, 50, 9);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .title(Span::styled(" Sign in ", Styles::title()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let form = &state.login;
    let masked = "•".repeat(form.password.chars().count());
    let field = |label: &str, value: String, focused: bool| {
        let style = if focused {
            Styles::focused()
        } else {
            Styles::text()
        };
        let cursor = if focused { "█" } else { "" };
        Line::from(vec![
            Span::styled(format!("{:<10}", label), Styles::text_secondary()),
            Span::styled(format!("{}{}", value, cursor), style),
        ])
    };

    let lines = vec![
        Line::from(""),
        field(
            "Username",
            form.username.clone(),
            form.focus == LoginField::Username,
        ),
        Line::from(""),
        field("Password", masked, form.focus == LoginField::Password),
        Line::from(""),
        Line::from(Span::styled(
            "Any non-empty credentials are accepted",
            Styles::text_muted(),
        )),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

// ============================================================================
// Shared panels
// ============================================================================

/// Most recent execution: title, status, latency and body
pub fn render_result(f: &mut Frame, result: &ResultView, area: Rect) {
    let mut title = vec![Span::styled(format!(" {} ", result.title), Styles::title())];
    if let Some(status) = result.status {
        title.push(Span::styled(
            format!("HTTP {} ", status),
            Theme::http_status_style(Some(status)),
        ));
    }
    if let Some(ms) = result.duration_ms {
        title.push(Span::styled(format!("{}ms ", ms), Styles::text_muted()));
    }

    let body = Paragraph::new(pretty_body(&result.data))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_inactive())
                .title(Line::from(title)),
        )
        .style(Styles::text())
        .wrap(Wrap { trim: false });
    f.render_widget(body, area);
}

fn history_row(entry: &HistoryEntry) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(format!("{} ", entry.at), Styles::text_muted()),
        Span::styled(format!("{:<4} ", entry.method.to_string()), Theme::method_style(entry.method)),
        Span::styled(format!("{:<3} ", entry.status), Theme::http_status_style(Some(entry.status))),
        Span::styled(format!("{:>5}ms ", entry.duration_ms), Styles::text_muted()),
        Span::styled(entry.label.clone(), Styles::text()),
    ]))
}

// ============================================================================
// Dashboard
// ============================================================================

pub fn render_dashboard(f: &mut Frame, state: &AppState, console: &ConsoleState, area: Rect) {
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);
    let [menu_area, board_area] =
        Layout::vertical([Constraint::Length(9), Constraint::Min(3)]).areas(left);
    let [result_area, recent_area] =
        Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(right);

    menus::render_menu(f, state, &console.drafts, menu_area, "Health");

    let mut lines: Vec<Line> = console
        .health
        .iter()
        .map(|(service, health)| {
            Line::from(vec![
                Span::styled(
                    format!(" {} ", Theme::health_icon(health)),
                    Theme::health_style(health),
                ),
                Span::styled(format!("{:<16}", service.label()), Styles::text()),
                Span::styled(health.to_string(), Theme::health_style(health)),
            ])
        })
        .collect();
    let overall = console.health.overall();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" Overall ", Styles::text_secondary()),
        Span::styled(overall.to_string(), Theme::overall_style(overall)),
    ]));
    let board = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border_inactive())
            .title(" Services "),
    );
    f.render_widget(board, board_area);

    render_result(f, &console.result, result_area);

    let recent: Vec<ListItem> = console
        .history
        .entries()
        .iter()
        .take(UiConstants::RECENT_HISTORY_ROWS)
        .map(history_row)
        .collect();
    let recent = List::new(recent).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border_inactive())
            .title(format!(" Recent ({} total) ", console.history.len())),
    );
    f.render_widget(recent, recent_area);
}

// ============================================================================
// Action views
// ============================================================================

/// Orders, inventory and booking: editable rows beside the last result
pub fn render_action_view(f: &mut Frame, state: &AppState, console: &ConsoleState, area: Rect) {
    let [menu_area, result_area] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);

    let title = match state.effective_mode() {
        AppMode::Orders => "Order Service",
        AppMode::Inventory => "Inventory Service",
        AppMode::Booking => "Booking Flows",
        _ => "Actions",
    };
    menus::render_menu(f, state, &console.drafts, menu_area, title);
    render_result(f, &console.result, result_area);
}

// ============================================================================
// History
// ============================================================================

pub fn render_history(f: &mut Frame, state: &AppState, console: &ConsoleState, area: Rect) {
    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);

    let entries = console.history.entries();
    let rows: Vec<ListItem> = entries.iter().map(history_row).collect();
    let list = List::new(rows)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_active())
                .title(format!(" History ({}) ", entries.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Colors::INFO)
                .fg(Colors::FG_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸");
    let selected = (!entries.is_empty()).then_some(state.history_selection);
    let mut list_state = ListState::default().with_selected(selected);
    f.render_stateful_widget(list, list_area, &mut list_state);

    let detail = match entries.get(state.history_selection) {
        Some(entry) => entry_detail(entry),
        None => vec![Line::from(Span::styled("No requests yet", Styles::text_muted()))],
    };
    let detail = Paragraph::new(detail)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_inactive())
                .title(" Request "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(detail, detail_area);
}

fn entry_detail(entry: &HistoryEntry) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(entry.label.clone(), Styles::title())),
        Line::from(vec![
            Span::styled(format!("{} ", entry.method), Theme::method_style(entry.method)),
            Span::styled(entry.path.clone(), Styles::text()),
            Span::styled(format!(" ({})", entry.service), Styles::text_muted()),
        ]),
        Line::from(vec![
            Span::styled("HTTP ", Styles::text_secondary()),
            Span::styled(entry.status.to_string(), Theme::http_status_style(Some(entry.status))),
            Span::styled(
                format!("  {}ms  at {}", entry.duration_ms, entry.at),
                Styles::text_muted(),
            ),
        ]),
        Line::from(Span::styled(format!("id {}", entry.id), Styles::text_muted())),
    ];
    if let Some(body) = &entry.body {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Body", Styles::text_secondary())));
        lines.extend(pretty_body(body).lines().map(|l| Line::from(l.to_string())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Enter or R to replay", Styles::nav_hint())));
    lines
}
