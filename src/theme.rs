//! Centralized theme and styling for the TUI
//!
//! Single source of truth for the colors, styles and layout constants used
//! by the console screens.
//!
//! # Usage
//! ```rust
//! use ticketing_console::theme::{Colors, Styles, Theme};
//! use ticketing_console::ServiceHealth;
//! use ratatui::style::Style;
//!
//! let style = Style::default().fg(Colors::PRIMARY);
//! let title_style = Styles::title();
//! let ready = Theme::health_style(ServiceHealth::Ready);
//! ```

use crate::app::StatusLevel;
use crate::health::{OverallHealth, ServiceHealth};
use crate::types::HttpMethod;
use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Core color palette for the application
pub struct Colors;

impl Colors {
    // -------------------------------------------------------------------------
    // Base Colors (backgrounds, foregrounds)
    // -------------------------------------------------------------------------

    /// Primary dark background for popups
    pub const BG_PRIMARY: Color = Color::Rgb(20, 20, 30);

    pub const FG_PRIMARY: Color = Color::White;

    pub const FG_SECONDARY: Color = Color::Gray;

    pub const FG_MUTED: Color = Color::DarkGray;

    // -------------------------------------------------------------------------
    // Accent Colors
    // -------------------------------------------------------------------------

    /// Titles, active borders, key hints
    pub const PRIMARY: Color = Color::Cyan;

    pub const SECONDARY: Color = Color::Yellow;

    // -------------------------------------------------------------------------
    // Semantic Colors
    // -------------------------------------------------------------------------

    pub const SUCCESS: Color = Color::Green;

    pub const WARNING: Color = Color::Yellow;

    pub const ERROR: Color = Color::Red;

    pub const INFO: Color = Color::Blue;

    // -------------------------------------------------------------------------
    // UI Element Colors
    // -------------------------------------------------------------------------

    pub const BORDER_ACTIVE: Color = Color::Cyan;

    pub const BORDER_INACTIVE: Color = Color::DarkGray;

    pub const SELECTED_BG: Color = Color::Yellow;

    pub const SELECTED_FG: Color = Color::Black;

    pub const UNSELECTED: Color = Color::Gray;

    pub const NAV_HINT: Color = Color::DarkGray;
}

// =============================================================================
// PRE-BUILT STYLES
// =============================================================================

/// Pre-built style combinations
pub struct Styles;

impl Styles {
    /// Default text style
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    pub fn text_secondary() -> Style {
        Style::default().fg(Colors::FG_SECONDARY)
    }

    /// Main title style (cyan, bold)
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_active() -> Style {
        Style::default().fg(Colors::BORDER_ACTIVE)
    }

    pub fn border_inactive() -> Style {
        Style::default().fg(Colors::BORDER_INACTIVE)
    }

    /// Popup background
    pub fn panel_bg() -> Style {
        Style::default().bg(Colors::BG_PRIMARY)
    }

    /// Selected/highlighted item
    pub fn selected() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn unselected() -> Style {
        Style::default().fg(Colors::UNSELECTED)
    }

    /// Focused input (cyan highlight)
    pub fn focused() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        Style::default().fg(Colors::SUCCESS)
    }

    pub fn warning() -> Style {
        Style::default().fg(Colors::WARNING)
    }

    pub fn error() -> Style {
        Style::default().fg(Colors::ERROR)
    }

    pub fn info() -> Style {
        Style::default().fg(Colors::INFO)
    }

    /// Navigation hint (keybindings)
    pub fn nav_hint() -> Style {
        Style::default().fg(Colors::NAV_HINT)
    }
}

// =============================================================================
// THEME CONTEXT
// =============================================================================

/// Semantic style lookups
pub struct Theme;

impl Theme {
    /// Status line style by severity
    pub fn status_style(level: StatusLevel) -> Style {
        match level {
            StatusLevel::Info => Styles::text_secondary(),
            StatusLevel::Success => Styles::success(),
            StatusLevel::Error => Styles::error(),
        }
    }

    pub fn health_style(health: ServiceHealth) -> Style {
        match health {
            ServiceHealth::Ready => Styles::success(),
            ServiceHealth::Down => Styles::error(),
            ServiceHealth::Unknown => Styles::text_muted(),
        }
    }

    pub fn overall_style(overall: OverallHealth) -> Style {
        match overall {
            OverallHealth::AllReady => Styles::success(),
            OverallHealth::HasDown => Styles::error(),
            OverallHealth::Partial => Styles::warning(),
        }
    }

    pub fn health_icon(health: ServiceHealth) -> &'static str {
        match health {
            ServiceHealth::Ready => "●",
            ServiceHealth::Down => "✗",
            ServiceHealth::Unknown => "○",
        }
    }

    /// Style for an HTTP status code; 2xx green, 4xx yellow, everything else red
    pub fn http_status_style(status: Option<u16>) -> Style {
        match status {
            Some(200..=299) => Styles::success(),
            Some(400..=499) => Styles::warning(),
            Some(_) => Styles::error(),
            None => Styles::text_muted(),
        }
    }

    pub fn method_style(method: HttpMethod) -> Style {
        match method {
            HttpMethod::Get => Styles::info().add_modifier(Modifier::BOLD),
            HttpMethod::Post => Style::default()
                .fg(Colors::SECONDARY)
                .add_modifier(Modifier::BOLD),
        }
    }
}

// =============================================================================
// UI CONSTANTS
// =============================================================================

/// UI dimension and layout constants
pub struct UiConstants;

impl UiConstants {
    /// Nav bar height
    pub const NAV_BAR_HEIGHT: u16 = 1;

    /// Title plus tab bar
    pub const HEADER_HEIGHT: u16 = 3;

    pub const STATUS_BAR_HEIGHT: u16 = 1;

    /// History rows shown on the dashboard
    pub const RECENT_HISTORY_ROWS: usize = 8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_style_buckets() {
        assert_eq!(Theme::http_status_style(Some(201)), Styles::success());
        assert_eq!(Theme::http_status_style(Some(409)), Styles::warning());
        assert_eq!(Theme::http_status_style(Some(503)), Styles::error());
        assert_eq!(Theme::http_status_style(None), Styles::text_muted());
    }

    #[test]
    fn test_health_lookups() {
        assert_eq!(Theme::health_style(ServiceHealth::Down), Styles::error());
        assert_eq!(Theme::health_icon(ServiceHealth::Ready), "●");
        assert_eq!(
            Theme::overall_style(OverallHealth::Partial),
            Styles::warning()
        );
    }
}
