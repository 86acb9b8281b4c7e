//! Application state definitions
//!
//! Terminal-only state: which view is shown, what is selected, what is being
//! typed. Console data (session, drafts, history, results, health) lives in
//! the shared store.

use crate::actions::{Action, ActionGroup};
use crate::drafts::{DraftField, DraftState};
use crate::types::ServiceKey;
use crate::workflow::Flow;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Application operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum AppMode {
    /// Mock login form, shown until a session exists
    Login,
    /// Health board, last result and recent history
    Dashboard,
    /// Order service actions
    Orders,
    /// Inventory service actions
    Inventory,
    /// Flows, read-model query and polling
    Booking,
    /// Request history with replay
    History,
    /// Editing one draft field
    #[strum(to_string = "Edit Field")]
    EditField,
}

impl AppMode {
    /// Views reachable from the tab bar, in tab order
    pub fn tabs() -> Vec<Self> {
        Self::iter()
            .filter(|mode| !matches!(mode, Self::Login | Self::EditField))
            .collect()
    }

    /// Tab reached by a digit key, 1-based
    pub fn from_tab_number(n: usize) -> Option<Self> {
        n.checked_sub(1).and_then(|index| Self::tabs().get(index).copied())
    }

    pub fn is_tab(&self) -> bool {
        Self::tabs().contains(self)
    }
}

/// One selectable row on an action view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Field(DraftField),
    Run(Action),
    RunFlow(Flow),
    UseCurrentOrderId,
    TogglePolling,
    HealthSweep,
    HealthCheck(ServiceKey),
}

impl MenuItem {
    /// Rows of a view, fields first
    pub fn for_mode(mode: AppMode) -> Vec<Self> {
        match mode {
            AppMode::Dashboard => {
                let mut items = vec![Self::HealthSweep];
                items.extend(ServiceKey::all().into_iter().map(Self::HealthCheck));
                items
            }
            AppMode::Orders => {
                let mut items: Vec<Self> = [
                    DraftField::OrderId,
                    DraftField::IdempotencyKey,
                    DraftField::AmountCents,
                    DraftField::ProviderTxnId,
                    DraftField::PaymentStatus,
                ]
                .into_iter()
                .map(Self::Field)
                .collect();
                items.extend(ActionGroup::Orders.actions().into_iter().map(Self::Run));
                items.extend(Self::query_rows());
                items
            }
            AppMode::Inventory => {
                let mut items: Vec<Self> = [
                    DraftField::PartitionKey,
                    DraftField::HoldId,
                    DraftField::Qty,
                    DraftField::Capacity,
                ]
                .into_iter()
                .map(Self::Field)
                .collect();
                items.extend(ActionGroup::Inventory.actions().into_iter().map(Self::Run));
                items
            }
            AppMode::Booking => {
                let mut items: Vec<Self> = Flow::all().into_iter().map(Self::RunFlow).collect();
                items.extend(Self::query_rows());
                items.push(Self::TogglePolling);
                items
            }
            AppMode::Login | AppMode::History | AppMode::EditField => Vec::new(),
        }
    }

    /// Read-model query rows shared by the orders and booking views
    fn query_rows() -> Vec<Self> {
        let mut rows = vec![Self::Field(DraftField::QueryOrderId), Self::UseCurrentOrderId];
        rows.extend(ActionGroup::Query.actions().into_iter().map(Self::Run));
        rows
    }

    /// Row text; fields show their current draft value
    pub fn label(&self, drafts: &DraftState, polling: bool) -> String {
        match self {
            Self::Field(field) => format!("{:<16} {}", field.to_string(), drafts.get_field(*field)),
            Self::Run(action) => format!("▶ {}", action.label()),
            Self::RunFlow(flow) => format!("▶ Run {}", flow),
            Self::UseCurrentOrderId => "⇢ Use current order id".to_string(),
            Self::TogglePolling => {
                if polling {
                    "■ Stop polling".to_string()
                } else {
                    "● Start polling".to_string()
                }
            }
            Self::HealthSweep => "▶ Check all services".to_string(),
            Self::HealthCheck(service) => format!("▶ Check {}", service.label()),
        }
    }
}

/// Which login input has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            username: "demo-user".to_string(),
            password: "123456".to_string(),
            focus: LoginField::Username,
        }
    }
}

impl LoginForm {
    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }
}

/// Draft field being edited and its pending text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEditor {
    pub field: DraftField,
    pub buffer: String,
}

/// Severity of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusLevel {
    #[default]
    Info,
    Success,
    Error,
}

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Current application mode
    pub mode: AppMode,
    /// Mode to return to after editing
    pub pre_dialog_mode: Option<AppMode>,
    /// Selected row on the current action view
    pub selection: usize,
    /// Selected history entry (0 = newest)
    pub history_selection: usize,
    /// Status message for user feedback
    pub status_message: String,
    pub status_level: StatusLevel,
    /// Whether help overlay is visible
    pub help_visible: bool,
    pub login: LoginForm,
    pub editor: Option<FieldEditor>,
    /// Whether the booking view is polling the read model
    pub polling: bool,
    /// Tasks submitted and not yet reported
    pub pending_tasks: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Login,
            pre_dialog_mode: None,
            selection: 0,
            history_selection: 0,
            status_message: "Welcome to the Ticketing Console".to_string(),
            status_level: StatusLevel::Info,
            help_visible: false,
            login: LoginForm::default(),
            editor: None,
            polling: false,
            pending_tasks: 0,
        }
    }
}

impl AppState {
    pub fn set_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.status_level = level;
        self.status_message = message.into();
    }

    /// The view on screen; the field editor sits on top of the view it was opened from
    pub fn effective_mode(&self) -> AppMode {
        match self.mode {
            AppMode::EditField => self.pre_dialog_mode.unwrap_or(AppMode::Dashboard),
            mode => mode,
        }
    }

    /// Rows of the current view
    pub fn menu_items(&self) -> Vec<MenuItem> {
        MenuItem::for_mode(self.mode)
    }

    pub fn selected_item(&self) -> Option<MenuItem> {
        self.menu_items().get(self.selection).copied()
    }

    /// Switch to another view, resetting the row selection
    pub fn switch_to(&mut self, mode: AppMode) {
        if self.mode != mode {
            self.mode = mode;
            self.selection = 0;
        }
    }

    pub fn next_tab(&mut self) {
        self.step_tab(1);
    }

    pub fn previous_tab(&mut self) {
        let count = AppMode::tabs().len();
        self.step_tab(count.saturating_sub(1));
    }

    fn step_tab(&mut self, offset: usize) {
        let tabs = AppMode::tabs();
        if let Some(index) = tabs.iter().position(|tab| *tab == self.mode) {
            self.switch_to(tabs[(index + offset) % tabs.len()]);
        }
    }

    /// Move the selection by one row, wrapping at both ends
    pub fn move_selection(&mut self, down: bool, history_len: usize) {
        let (current, len) = match self.mode {
            AppMode::History => (&mut self.history_selection, history_len),
            _ => {
                let len = self.menu_items().len();
                (&mut self.selection, len)
            }
        };
        if len == 0 {
            *current = 0;
            return;
        }
        *current = if down {
            (*current + 1) % len
        } else {
            (*current + len - 1) % len
        };
    }

    /// Keep the history cursor inside the list after it shrinks
    pub fn clamp_history_selection(&mut self, history_len: usize) {
        if self.history_selection >= history_len {
            self.history_selection = history_len.saturating_sub(1);
        }
    }

    pub fn begin_edit(&mut self, field: DraftField, current: String) {
        self.pre_dialog_mode = Some(self.mode);
        self.mode = AppMode::EditField;
        self.editor = Some(FieldEditor {
            field,
            buffer: current,
        });
    }

    /// Leave the editor, returning what was being edited
    pub fn end_edit(&mut self) -> Option<FieldEditor> {
        self.mode = self.pre_dialog_mode.take().unwrap_or(AppMode::Dashboard);
        self.editor.take()
    }
}
