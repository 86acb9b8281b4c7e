//! Dialog rendering: the draft field editor

use crate::app::FieldEditor;
use crate::components::help_overlay::centered;
use crate::theme::{Colors, Styles};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Render the single-line editor popup over the current view
pub fn render_edit_dialog(f: &mut Frame, editor: &FieldEditor) {
    let area = centered(f.area(), 50, 7);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .title(Span::styled(format!(" Edit {} ", editor.field), Styles::title()))
        .style(Styles::panel_bg());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [hint_area, input_area, _, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let hint = if editor.field.is_numeric() {
        "Whole number"
    } else {
        "Text"
    };
    f.render_widget(Paragraph::new(Span::styled(hint, Styles::text_muted())), hint_area);

    let input = Line::from(vec![
        Span::styled("> ", Style::default().fg(Colors::SECONDARY)),
        Span::styled(editor.buffer.clone(), Styles::text()),
        Span::styled("█", Styles::focused()),
    ]);
    f.render_widget(Paragraph::new(input), input_area);

    f.render_widget(
        Paragraph::new(Span::styled("Enter save │ Esc cancel", Styles::nav_hint())),
        footer_area,
    );
}
