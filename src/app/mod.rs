//! Application module
//!
//! Contains the main application logic, state management, and event handling.
//!
//! # Module Structure
//! - `state` - Application state types (AppState, AppMode, MenuItem, etc.)
//! - Main module - App struct and event loop
//!
//! The UI thread never performs I/O. Key handlers submit [`Task`]s to the
//! background worker and the loop drains their reports once per tick.

mod state;

// Re-export state types for external use
pub use state::{AppMode, AppState, FieldEditor, LoginField, LoginForm, MenuItem, StatusLevel};

use crate::components::keybindings::{KeyAction, KeybindingContext};
use crate::error::Result;
use crate::executor::Executor;
use crate::poll::{POLL_LABEL, Poller};
use crate::session::Session;
use crate::store::{ConsoleState, SharedStore, lock_store};
use crate::tasks::{Task, TaskOutput, TaskReport, TaskRunner};
use crate::ui::UiRenderer;
use crate::workflow::Flow;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Main application struct
pub struct App {
    state: AppState,
    store: SharedStore,
    tasks: TaskRunner,
    poller: Poller,
    /// A poll is queued or running; at most one at a time
    poll_in_flight: bool,
    ui_renderer: UiRenderer,
    keybinding_context: KeybindingContext,
}

impl App {
    /// Create a new application instance
    pub fn new(executor: Executor, poll_interval: Duration) -> Self {
        info!("Creating new App instance");
        let store = executor.store().clone();

        let mut state = AppState::default();
        if let Ok(store) = lock_store(&store) {
            if let Some(session) = store.session() {
                debug!("Resuming session for {}", session.username);
                state.mode = AppMode::Dashboard;
                state.set_status(StatusLevel::Info, format!("Welcome back, {}", session.username));
            }
        }

        Self {
            state,
            store,
            tasks: TaskRunner::spawn(executor),
            poller: Poller::new(poll_interval),
            poll_in_flight: false,
            ui_renderer: UiRenderer::new(),
            keybinding_context: KeybindingContext::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    /// Run the main application loop
    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        info!("Starting main application loop");

        loop {
            self.tick(Instant::now())?;

            if crossterm::event::poll(Duration::from_millis(50))? {
                if let Event::Key(key_event) = crossterm::event::read()? {
                    if self.handle_key(key_event)? {
                        break;
                    }
                }
            }

            let console = self.snapshot()?;
            terminal.draw(|f| {
                self.ui_renderer
                    .render(f, &self.state, &console, &self.keybinding_context);
            })?;
        }

        self.poller.disable();
        info!("Leaving main application loop");
        Ok(())
    }

    /// Copy of the console state for one frame
    fn snapshot(&self) -> Result<ConsoleState> {
        Ok(lock_store(&self.store)?.state().clone())
    }

    /// Drain finished tasks and fire the poller when due
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        for report in self.tasks.drain() {
            self.apply_report(report);
        }
        self.state.pending_tasks = self.tasks.pending();

        // Polling belongs to the booking view only
        if self.state.effective_mode() != AppMode::Booking && self.poller.is_enabled() {
            self.set_polling(false, now);
        }
        if self.poller.poll_due(now) {
            if self.poll_in_flight {
                debug!("Previous poll still running, skipping this interval");
            } else {
                self.poll_in_flight = true;
                self.submit(Task::Poll(self.poller.ticket()));
            }
        }
        Ok(())
    }

    fn apply_report(&mut self, report: TaskReport) {
        if report.task == POLL_LABEL {
            self.poll_in_flight = false;
        }
        if matches!(report.outcome, Ok(TaskOutput::Stale)) {
            debug!("{}", report.summary());
            return;
        }

        let level = if report.is_ok() {
            StatusLevel::Success
        } else {
            StatusLevel::Error
        };
        if let Err(e) = &report.outcome {
            warn!("{} failed: {}", report.task, e);
        }
        self.state.set_status(level, report.summary());

        let history_len = self.history_len();
        self.state.clamp_history_selection(history_len);
    }

    fn submit(&mut self, task: Task) {
        let name = task.describe();
        match self.tasks.submit(task) {
            Ok(()) => self.state.set_status(StatusLevel::Info, format!("{}…", name)),
            Err(e) => self.state.set_status(StatusLevel::Error, e.to_string()),
        }
        self.state.pending_tasks = self.tasks.pending();
    }

    fn history_len(&self) -> usize {
        lock_store(&self.store)
            .map(|store| store.history().len())
            .unwrap_or(0)
    }

    fn set_polling(&mut self, enabled: bool, now: Instant) {
        if enabled {
            self.poller.enable(now);
        } else {
            self.poller.disable();
        }
        self.state.polling = self.poller.is_enabled();
        debug!("Polling {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Handle one key press; returns true when the user asked to quit
    pub fn handle_key(&mut self, key_event: KeyEvent) -> Result<bool> {
        if key_event.kind != KeyEventKind::Press {
            return Ok(false);
        }
        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            return Ok(true);
        }

        // Handle help overlay - ? or Esc dismisses it
        if self.state.help_visible {
            if matches!(key_event.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_visible = false;
            }
            return Ok(false);
        }

        let mode = self.state.mode;
        let action = self
            .keybinding_context
            .resolve(&mode, key_event.code, key_event.modifiers);

        match mode {
            AppMode::Login => self.handle_login_key(key_event, action),
            AppMode::EditField => {
                self.handle_edit_key(key_event, action)?;
                Ok(false)
            }
            _ => self.handle_view_key(key_event, action),
        }
    }

    fn handle_login_key(&mut self, key_event: KeyEvent, action: Option<KeyAction>) -> Result<bool> {
        match action {
            Some(KeyAction::Quit) => return Ok(true),
            Some(KeyAction::SwitchField) => self.state.login.toggle_focus(),
            Some(KeyAction::Submit) => self.submit_login()?,
            _ => edit_text(self.state.login.focused_mut(), key_event),
        }
        Ok(false)
    }

    fn submit_login(&mut self) -> Result<()> {
        let form = &self.state.login;
        match Session::login(&form.username, &form.password) {
            Ok(session) => {
                info!("Logged in as {}", session.username);
                let message = format!("Logged in as {}", session.username);
                lock_store(&self.store)?.set_session(Some(session));
                self.state.switch_to(AppMode::Dashboard);
                self.state.set_status(StatusLevel::Success, message);
            }
            Err(e) => self.state.set_status(StatusLevel::Error, e.to_string()),
        }
        Ok(())
    }

    fn logout(&mut self) -> Result<()> {
        self.set_polling(false, Instant::now());
        lock_store(&self.store)?.set_session(None);
        self.state.switch_to(AppMode::Login);
        self.state.set_status(StatusLevel::Info, "Logged out");
        info!("Logged out");
        Ok(())
    }

    fn handle_edit_key(&mut self, key_event: KeyEvent, action: Option<KeyAction>) -> Result<()> {
        match action {
            Some(KeyAction::Cancel) => {
                self.state.end_edit();
                self.state.set_status(StatusLevel::Info, "Edit cancelled");
            }
            Some(KeyAction::Confirm) => self.commit_edit()?,
            _ => {
                if let Some(editor) = self.state.editor.as_mut() {
                    edit_text(&mut editor.buffer, key_event);
                }
            }
        }
        Ok(())
    }

    /// Write the editor buffer to the drafts; invalid input keeps the editor open
    fn commit_edit(&mut self) -> Result<()> {
        let Some(editor) = self.state.editor.clone() else {
            self.state.end_edit();
            return Ok(());
        };
        let outcome = lock_store(&self.store)?
            .update_drafts(|drafts| drafts.set_field(editor.field, &editor.buffer));
        match outcome {
            Ok(()) => {
                self.state.end_edit();
                self.state
                    .set_status(StatusLevel::Success, format!("{} updated", editor.field));
            }
            Err(e) => self.state.set_status(StatusLevel::Error, e.to_string()),
        }
        Ok(())
    }

    fn handle_view_key(&mut self, key_event: KeyEvent, action: Option<KeyAction>) -> Result<bool> {
        if let KeyCode::Char(c) = key_event.code {
            let tab = c
                .to_digit(10)
                .and_then(|n| AppMode::from_tab_number(n as usize));
            if let Some(tab) = tab {
                self.state.switch_to(tab);
                return Ok(false);
            }
        }

        let Some(action) = action else {
            return Ok(false);
        };

        match action {
            KeyAction::NavigateUp | KeyAction::NavigateDown => {
                let history_len = self.history_len();
                self.state
                    .move_selection(action == KeyAction::NavigateDown, history_len);
            }
            KeyAction::NextTab => self.state.next_tab(),
            KeyAction::PreviousTab => self.state.previous_tab(),
            KeyAction::Select => self.activate_selected()?,
            KeyAction::TogglePolling => self.toggle_polling(),
            KeyAction::Replay => self.replay_selected()?,
            KeyAction::ClearHistory => {
                lock_store(&self.store)?.clear_history();
                self.state.clamp_history_selection(0);
                self.state.set_status(StatusLevel::Info, "History cleared");
            }
            KeyAction::Logout => self.logout()?,
            KeyAction::Help => self.state.help_visible = true,
            KeyAction::Quit => return Ok(true),
            KeyAction::SwitchField | KeyAction::Submit | KeyAction::Confirm | KeyAction::Cancel => {}
        }
        Ok(false)
    }

    fn toggle_polling(&mut self) {
        let enabled = !self.poller.is_enabled();
        self.set_polling(enabled, Instant::now());
        let message = if enabled {
            format!("Polling every {}s", self.poller.interval().as_secs())
        } else {
            "Polling stopped".to_string()
        };
        self.state.set_status(StatusLevel::Info, message);
    }

    fn activate_selected(&mut self) -> Result<()> {
        let Some(item) = self.state.selected_item() else {
            return Ok(());
        };
        match item {
            MenuItem::Field(field) => {
                let current = lock_store(&self.store)?.drafts().get_field(field);
                self.state.begin_edit(field, current);
            }
            MenuItem::Run(action) => self.submit(Task::Action(action)),
            MenuItem::RunFlow(Flow::Order) => self.submit(Task::OrderFlow),
            MenuItem::RunFlow(Flow::Inventory) => self.submit(Task::InventoryFlow),
            MenuItem::UseCurrentOrderId => {
                lock_store(&self.store)?.update_drafts(|drafts| drafts.use_current_order_id());
                self.state
                    .set_status(StatusLevel::Info, "Query order id set from current order");
            }
            MenuItem::TogglePolling => self.toggle_polling(),
            MenuItem::HealthSweep => self.submit(Task::HealthSweep),
            MenuItem::HealthCheck(service) => self.submit(Task::HealthCheck(service)),
        }
        Ok(())
    }

    fn replay_selected(&mut self) -> Result<()> {
        let entry = lock_store(&self.store)?
            .history()
            .entries()
            .get(self.state.history_selection)
            .cloned();
        match entry {
            Some(entry) => self.submit(Task::Replay(Box::new(entry))),
            None => self.state.set_status(StatusLevel::Info, "History is empty"),
        }
        Ok(())
    }
}

/// Apply a key press to a single-line text buffer
fn edit_text(buffer: &mut String, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Backspace => {
            buffer.pop();
        }
        KeyCode::Char(c)
            if !key_event
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            buffer.push(c);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiClient, HttpTransport, TransportResponse};
    use crate::config::ConsoleConfig;
    use crate::drafts::DraftField;
    use crate::store::{ConsoleStore, MemoryBackend};
    use crate::types::HttpMethod;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::{Arc, Mutex};

    /// Answers every request with 200 and an order id
    struct StubTransport {
        urls: Mutex<Vec<String>>,
    }

    impl HttpTransport for StubTransport {
        fn send(&self, _method: HttpMethod, url: &str, _body: Option<&str>) -> Result<TransportResponse> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(TransportResponse {
                status: 200,
                body: r#"{"OrderID":"abc"}"#.to_string(),
            })
        }
    }

    /// Holds every request until the test hands out a permit
    struct GatedTransport {
        permits: Mutex<Receiver<()>>,
        urls: Mutex<Vec<String>>,
    }

    impl HttpTransport for GatedTransport {
        fn send(&self, _method: HttpMethod, url: &str, _body: Option<&str>) -> Result<TransportResponse> {
            let _ = self.permits.lock().unwrap().recv();
            self.urls.lock().unwrap().push(url.to_string());
            Ok(TransportResponse {
                status: 200,
                body: "{}".to_string(),
            })
        }
    }

    fn app_with(transport: Arc<dyn HttpTransport>) -> App {
        let store = ConsoleStore::open(Box::new(MemoryBackend::new())).into_shared();
        let client = ApiClient::with_transport(&ConsoleConfig::default(), transport);
        App::new(Executor::new(client, store), Duration::from_secs(3))
    }

    fn app() -> (App, Arc<StubTransport>) {
        let transport = Arc::new(StubTransport {
            urls: Mutex::new(Vec::new()),
        });
        (app_with(transport.clone()), transport)
    }

    fn gated_app() -> (App, Arc<GatedTransport>, Sender<()>) {
        let (permit_tx, permit_rx) = mpsc::channel();
        let transport = Arc::new(GatedTransport {
            permits: Mutex::new(permit_rx),
            urls: Mutex::new(Vec::new()),
        });
        let mut app = app_with(transport.clone());
        press(&mut app, KeyCode::Enter);
        (app, transport, permit_tx)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Wait for every submitted task to report back
    fn settle(app: &mut App) {
        while app.tasks.is_busy() {
            let report = app.tasks.recv().unwrap();
            app.apply_report(report);
        }
    }

    fn logged_in() -> (App, Arc<StubTransport>) {
        let (mut app, transport) = app();
        press(&mut app, KeyCode::Enter);
        (app, transport)
    }

    #[test]
    fn test_starts_on_login_without_session() {
        let (app, _) = app();
        assert_eq!(app.state().mode, AppMode::Login);
    }

    #[test]
    fn test_login_form_edits_and_submits() {
        let (mut app, _) = app();
        for _ in 0.."demo-user".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "qa");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state().mode, AppMode::Dashboard);
        let store = lock_store(&app.store).unwrap();
        assert_eq!(store.session().unwrap().username, "qa");
    }

    #[test]
    fn test_blank_login_is_rejected() {
        let (mut app, _) = app();
        for _ in 0.."demo-user".len() {
            press(&mut app, KeyCode::Backspace);
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().mode, AppMode::Login);
        assert_eq!(app.state().status_level, StatusLevel::Error);
    }

    #[test]
    fn test_q_quits_outside_text_entry() {
        let (mut app, _) = app();
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state().login.username, "demo-userq");
        press(&mut app, KeyCode::Enter);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_edit_numeric_field_rejects_text() {
        let (mut app, _) = logged_in();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.state().mode, AppMode::Inventory);
        // partition_key, hold_id, qty
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().mode, AppMode::EditField);

        type_text(&mut app, "x");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().mode, AppMode::EditField);
        assert_eq!(app.state().status_level, StatusLevel::Error);

        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "5");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().mode, AppMode::Inventory);
        assert_eq!(lock_store(&app.store).unwrap().drafts().qty, 15);
    }

    #[test]
    fn test_escape_cancels_edit() {
        let (mut app, _) = logged_in();
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "zzz");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state().mode, AppMode::Orders);
        assert_eq!(lock_store(&app.store).unwrap().drafts().order_id, "");
    }

    #[test]
    fn test_run_action_records_history_and_replays() {
        let (mut app, transport) = logged_in();
        press(&mut app, KeyCode::Char('2'));
        // five fields, then Create Order
        for _ in 0..5 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(
            app.state().selected_item(),
            Some(MenuItem::Run(crate::actions::Action::CreateOrder))
        );
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        {
            let store = lock_store(&app.store).unwrap();
            assert_eq!(store.history().len(), 1);
            assert_eq!(store.drafts().order_id, "abc");
        }

        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Char('r'));
        settle(&mut app);

        let store = lock_store(&app.store).unwrap();
        assert_eq!(store.history().len(), 2);
        assert_eq!(store.history().entries()[0].label, "Create Order (replay)");
        assert_eq!(transport.urls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_clear_history() {
        let (mut app, _) = logged_in();
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Enter);
        settle(&mut app);
        assert!(!lock_store(&app.store).unwrap().history().is_empty());

        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Char('c'));
        assert!(lock_store(&app.store).unwrap().history().is_empty());
    }

    #[test]
    fn test_polling_stops_when_leaving_booking() {
        let (mut app, _) = logged_in();
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('p'));
        assert!(app.poller().is_enabled());
        assert!(app.state().polling);

        press(&mut app, KeyCode::Char('1'));
        app.tick(Instant::now()).unwrap();
        assert!(!app.poller().is_enabled());
        assert!(!app.state().polling);
    }

    #[test]
    fn test_editing_in_booking_keeps_polling() {
        let (mut app, _) = logged_in();
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('p'));
        // two flows, then the query order id field
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().mode, AppMode::EditField);

        app.tick(Instant::now()).unwrap();
        assert!(app.poller().is_enabled());

        press(&mut app, KeyCode::Esc);
        app.tick(Instant::now()).unwrap();
        assert_eq!(app.state().mode, AppMode::Booking);
        assert!(app.poller().is_enabled());
        assert!(app.state().polling);
    }

    #[test]
    fn test_slow_poll_is_not_stacked_and_stops_with_polling() {
        let (mut app, transport, permits) = gated_app();
        lock_store(&app.store)
            .unwrap()
            .update_drafts(|d| d.order_id = "o-1".to_string());
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('p'));

        // the first poll hangs in the transport while several intervals pass
        let start = Instant::now();
        for secs in [4, 7, 10, 13] {
            app.tick(start + Duration::from_secs(secs)).unwrap();
        }
        assert_eq!(app.tasks.pending(), 1);

        press(&mut app, KeyCode::Char('1'));
        app.tick(start + Duration::from_secs(14)).unwrap();
        assert!(!app.poller().is_enabled());

        permits.send(()).unwrap();
        settle(&mut app);
        for secs in [20, 30, 40] {
            app.tick(start + Duration::from_secs(secs)).unwrap();
        }
        assert!(!app.tasks.is_busy());
        assert!(transport.urls.lock().unwrap().len() <= 1);
        assert!(lock_store(&app.store).unwrap().history().len() <= 1);
    }

    #[test]
    fn test_poll_without_order_id_is_skipped() {
        let (mut app, transport) = logged_in();
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('p'));
        app.tick(Instant::now() + Duration::from_secs(4)).unwrap();
        settle(&mut app);
        assert!(transport.urls.lock().unwrap().is_empty());
        assert!(app.state().status_message.contains("skipped"));
    }

    #[test]
    fn test_logout_returns_to_login() {
        let (mut app, _) = logged_in();
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.state().mode, AppMode::Login);
        assert!(lock_store(&app.store).unwrap().session().is_none());
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let (mut app, _) = logged_in();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.state().help_visible);
        assert!(!press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Esc);
        assert!(!app.state().help_visible);
    }

    #[test]
    fn test_use_current_order_id() {
        let (mut app, _) = logged_in();
        lock_store(&app.store)
            .unwrap()
            .update_drafts(|d| d.set_field(DraftField::OrderId, "o-7"))
            .unwrap();
        press(&mut app, KeyCode::Char('4'));
        // two flows, query field, then the copy row
        for _ in 0..3 {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(lock_store(&app.store).unwrap().drafts().query_order_id, "o-7");
    }
}
