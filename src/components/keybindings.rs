//! Keybinding system for context-aware keyboard shortcuts
//!
//! Provides a registry of keybindings that change based on the current application mode.

use crate::app::AppMode;
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

/// Actions that can be triggered by keybindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    NavigateUp,
    NavigateDown,
    NextTab,
    PreviousTab,
    Select,
    Submit,
    SwitchField,
    Confirm,
    Cancel,
    Replay,
    ClearHistory,
    TogglePolling,
    Logout,
    Quit,
    Help,
}

/// A keybinding definition
#[derive(Debug, Clone)]
pub struct Keybinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: KeyAction,
    pub display: String,
    pub description: String,
}

impl Keybinding {
    /// Create a new keybinding with no modifiers
    pub fn new(key: KeyCode, action: KeyAction, display: &str, description: &str) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    /// Create a keybinding with modifiers
    pub fn with_modifiers(
        key: KeyCode,
        modifiers: KeyModifiers,
        action: KeyAction,
        display: &str,
        description: &str,
    ) -> Self {
        Self {
            key,
            modifiers,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    fn matches(&self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        // Shift is implied by the character itself for printable keys
        let modifiers = match key {
            KeyCode::Char(_) | KeyCode::BackTab => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        self.key == key && self.modifiers == modifiers
    }
}

/// Context-aware keybinding registry
pub struct KeybindingContext {
    /// Mode-specific keybindings
    mode_bindings: HashMap<AppMode, Vec<Keybinding>>,
    /// Global keybindings for the tabbed views
    global_bindings: Vec<Keybinding>,
}

impl Default for KeybindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl KeybindingContext {
    /// Create a new keybinding context with default bindings
    pub fn new() -> Self {
        let mut ctx = Self {
            mode_bindings: HashMap::new(),
            global_bindings: Vec::new(),
        };
        ctx.register_defaults();
        ctx
    }

    /// Register default keybindings for all modes
    fn register_defaults(&mut self) {
        self.global_bindings = vec![
            Keybinding::new(KeyCode::Tab, KeyAction::NextTab, "Tab", "Next view"),
            Keybinding::new(KeyCode::BackTab, KeyAction::PreviousTab, "S-Tab", "Previous view"),
            Keybinding::new(KeyCode::Char('x'), KeyAction::Logout, "X", "Log out"),
            Keybinding::new(KeyCode::Char('?'), KeyAction::Help, "?", "Help"),
            Keybinding::new(KeyCode::Char('q'), KeyAction::Quit, "Q", "Quit"),
        ];

        // Login form: printable keys are text, so only control keys are bound
        self.mode_bindings.insert(
            AppMode::Login,
            vec![
                Keybinding::new(KeyCode::Tab, KeyAction::SwitchField, "Tab", "Switch field"),
                Keybinding::new(KeyCode::Up, KeyAction::SwitchField, "Up", "Switch field"),
                Keybinding::new(KeyCode::Down, KeyAction::SwitchField, "Down", "Switch field"),
                Keybinding::new(KeyCode::Enter, KeyAction::Submit, "Enter", "Log in"),
                Keybinding::new(KeyCode::Esc, KeyAction::Quit, "Esc", "Quit"),
            ],
        );

        let action_view = vec![
            Keybinding::new(KeyCode::Up, KeyAction::NavigateUp, "Up", "Navigate up"),
            Keybinding::new(KeyCode::Down, KeyAction::NavigateDown, "Down", "Navigate down"),
            Keybinding::new(KeyCode::Char('k'), KeyAction::NavigateUp, "K", "Navigate up"),
            Keybinding::new(KeyCode::Char('j'), KeyAction::NavigateDown, "J", "Navigate down"),
            Keybinding::new(KeyCode::Enter, KeyAction::Select, "Enter", "Edit / run"),
        ];
        self.mode_bindings
            .insert(AppMode::Dashboard, action_view.clone());
        self.mode_bindings.insert(AppMode::Orders, action_view.clone());
        self.mode_bindings
            .insert(AppMode::Inventory, action_view.clone());

        let mut booking = action_view.clone();
        booking.push(Keybinding::new(
            KeyCode::Char('p'),
            KeyAction::TogglePolling,
            "P",
            "Toggle polling",
        ));
        self.mode_bindings.insert(AppMode::Booking, booking);

        let mut history = action_view;
        history.pop();
        history.extend([
            Keybinding::new(KeyCode::Enter, KeyAction::Replay, "Enter", "Replay"),
            Keybinding::new(KeyCode::Char('r'), KeyAction::Replay, "R", "Replay"),
            Keybinding::new(KeyCode::Char('c'), KeyAction::ClearHistory, "C", "Clear history"),
        ]);
        self.mode_bindings.insert(AppMode::History, history);

        self.mode_bindings.insert(
            AppMode::EditField,
            vec![
                Keybinding::new(KeyCode::Enter, KeyAction::Confirm, "Enter", "Save"),
                Keybinding::new(KeyCode::Esc, KeyAction::Cancel, "Esc", "Cancel"),
            ],
        );
    }

    /// Whether global bindings apply; text-entry modes own the keyboard
    fn uses_globals(mode: &AppMode) -> bool {
        !matches!(mode, AppMode::Login | AppMode::EditField)
    }

    /// Get keybindings for a specific mode (includes global bindings)
    pub fn get_bindings(&self, mode: &AppMode) -> Vec<&Keybinding> {
        let mut bindings: Vec<&Keybinding> = Vec::new();

        if let Some(mode_bindings) = self.mode_bindings.get(mode) {
            bindings.extend(mode_bindings.iter());
        }

        if Self::uses_globals(mode) {
            bindings.extend(self.global_bindings.iter());
        }

        bindings
    }

    /// Action bound to a key press in the given mode
    pub fn resolve(&self, mode: &AppMode, key: KeyCode, modifiers: KeyModifiers) -> Option<KeyAction> {
        self.get_bindings(mode)
            .into_iter()
            .find(|binding| binding.matches(key, modifiers))
            .map(|binding| binding.action)
    }

    /// Get navigation bar items for display
    pub fn get_nav_items(&self, mode: &AppMode) -> Vec<NavBarItem> {
        let bindings = self.get_bindings(mode);

        let priority_actions = match mode {
            AppMode::Login => vec![KeyAction::SwitchField, KeyAction::Submit, KeyAction::Quit],
            AppMode::Dashboard | AppMode::Orders | AppMode::Inventory => vec![
                KeyAction::NavigateUp,
                KeyAction::Select,
                KeyAction::NextTab,
                KeyAction::Logout,
                KeyAction::Help,
                KeyAction::Quit,
            ],
            AppMode::Booking => vec![
                KeyAction::NavigateUp,
                KeyAction::Select,
                KeyAction::TogglePolling,
                KeyAction::NextTab,
                KeyAction::Help,
                KeyAction::Quit,
            ],
            AppMode::History => vec![
                KeyAction::NavigateUp,
                KeyAction::Replay,
                KeyAction::ClearHistory,
                KeyAction::NextTab,
                KeyAction::Help,
                KeyAction::Quit,
            ],
            AppMode::EditField => vec![KeyAction::Confirm, KeyAction::Cancel],
        };

        let mut items: Vec<NavBarItem> = Vec::new();
        for action in priority_actions {
            if let Some(binding) = bindings.iter().find(|b| b.action == action) {
                // Combine Up/Down into single item for cleaner display
                if matches!(action, KeyAction::NavigateUp | KeyAction::NavigateDown) {
                    items.push(NavBarItem {
                        key_display: "Up/Dn".to_string(),
                        action_label: "Navigate".to_string(),
                    });
                } else {
                    items.push(NavBarItem {
                        key_display: binding.display.clone(),
                        action_label: binding.description.clone(),
                    });
                }
            }
        }

        items
    }

    /// Get full help content for a mode (for help overlay)
    pub fn get_help_content(&self, mode: &AppMode) -> Vec<HelpSection> {
        let groups: [(&str, fn(KeyAction) -> bool); 3] = [
            ("Navigation", |a| {
                matches!(
                    a,
                    KeyAction::NavigateUp
                        | KeyAction::NavigateDown
                        | KeyAction::NextTab
                        | KeyAction::PreviousTab
                        | KeyAction::SwitchField
                )
            }),
            ("Actions", |a| {
                matches!(
                    a,
                    KeyAction::Select
                        | KeyAction::Submit
                        | KeyAction::Confirm
                        | KeyAction::Cancel
                        | KeyAction::Replay
                        | KeyAction::ClearHistory
                        | KeyAction::TogglePolling
                )
            }),
            ("General", |a| {
                matches!(a, KeyAction::Logout | KeyAction::Help | KeyAction::Quit)
            }),
        ];

        let bindings = self.get_bindings(mode);
        let mut sections: Vec<HelpSection> = groups
            .iter()
            .filter_map(|(title, wanted)| {
                let items: Vec<(String, String)> = bindings
                    .iter()
                    .filter(|b| wanted(b.action))
                    .map(|b| (b.display.clone(), b.description.clone()))
                    .collect();
                (!items.is_empty()).then(|| HelpSection {
                    title: title.to_string(),
                    items,
                })
            })
            .collect();

        if Self::uses_globals(mode) {
            sections.push(HelpSection {
                title: "Views".to_string(),
                items: AppMode::tabs()
                    .iter()
                    .enumerate()
                    .map(|(i, tab)| ((i + 1).to_string(), tab.to_string()))
                    .collect(),
            });
        }

        sections
    }
}

/// Navigation bar item for display
#[derive(Debug, Clone)]
pub struct NavBarItem {
    pub key_display: String,
    pub action_label: String,
}

/// Help section for the help overlay
#[derive(Debug, Clone)]
pub struct HelpSection {
    pub title: String,
    pub items: Vec<(String, String)>,
}
