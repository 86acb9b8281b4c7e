//! User interface rendering module
//!
//! - `header` - Title bar, tabs, status line, nav bar and help overlay
//! - `menus` - Selectable rows of the action views
//! - `dialogs` - Draft field editor popup
//! - `screens` - Login, dashboard, action and history screens

mod dialogs;
mod header;
mod menus;
pub mod screens;

use crate::app::{AppMode, AppState};
use crate::components::keybindings::KeybindingContext;
use crate::store::ConsoleState;
use crate::theme::UiConstants;
use header::HeaderRenderer;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

/// Draws one frame from the terminal state and a console snapshot
#[derive(Default)]
pub struct UiRenderer {
    header: HeaderRenderer,
}

impl UiRenderer {
    pub fn new() -> Self {
        Self {
            header: HeaderRenderer::new(),
        }
    }

    pub fn render(
        &self,
        f: &mut Frame,
        state: &AppState,
        console: &ConsoleState,
        keybinding_ctx: &KeybindingContext,
    ) {
        let [header_area, content_area, status_area, nav_bar_area] = Layout::vertical([
            Constraint::Length(UiConstants::HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(UiConstants::STATUS_BAR_HEIGHT),
            Constraint::Length(UiConstants::NAV_BAR_HEIGHT),
        ])
        .areas(f.area());

        self.header.render_header(f, header_area, state, console);

        // The editor floats over the view it was opened from
        match state.effective_mode() {
            AppMode::Login => screens::render_login(f, state, content_area),
            AppMode::Dashboard => screens::render_dashboard(f, state, console, content_area),
            AppMode::Orders | AppMode::Inventory | AppMode::Booking => {
                screens::render_action_view(f, state, console, content_area)
            }
            AppMode::History => screens::render_history(f, state, console, content_area),
            AppMode::EditField => {}
        }

        header::render_status_line(f, state, status_area);
        header::render_nav_bar(f, state, keybinding_ctx, nav_bar_area);

        if let Some(editor) = &state.editor {
            dialogs::render_edit_dialog(f, editor);
        }

        // Render help overlay last so it appears on top
        if state.help_visible {
            header::render_help_overlay(f, state, keybinding_ctx);
        }
    }
}
