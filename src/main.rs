//! Ticketing Console - Main entry point
//!
//! Without a subcommand the interactive terminal console starts; every
//! subcommand runs one operation headlessly and prints the result.

use anyhow::{Context, bail};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::OpenOptions;
use std::io::stdout;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use ticketing_console::actions::Action;
use ticketing_console::app::App;
use ticketing_console::cli::{
    Cli, Commands, DraftCommands, DraftOverrides, FlowCommands, HistoryCommands, QueryCommands,
};
use ticketing_console::client::{ApiCall, ApiClient};
use ticketing_console::config::ConsoleConfig;
use ticketing_console::drafts::{DraftField, DraftState};
use ticketing_console::executor::{ExecutionRequest, Executor};
use ticketing_console::health::{self, ServiceHealth};
use ticketing_console::history::HistoryEntry;
use ticketing_console::poll::{self, Poller};
use ticketing_console::session::{self, Session};
use ticketing_console::store::{
    ConsoleStore, FileBackend, MemoryBackend, SharedStore, StateBackend, lock_store,
};
use ticketing_console::types::ServiceKey;
use ticketing_console::workflow::{Flow, FlowOutcome};

/// Initialize tracing; the terminal console logs to a file so the screen stays clean
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {:?}", parent))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
    Ok(())
}

/// Main application entry point
fn main() {
    let cli = Cli::parse_args();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ConsoleConfig> {
    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::load_from_file(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(dir) = &cli.state_dir {
        config.state_dir = Some(dir.clone());
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let state_dir = config.resolved_state_dir();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));

    let log_file = interactive.then(|| {
        if cli.ephemeral {
            std::env::temp_dir().join("ticketing-console.log")
        } else {
            state_dir.join("console.log")
        }
    });
    init_logging(log_file.as_deref())?;
    info!("Ticketing Console starting up");

    let backend: Box<dyn StateBackend> = if cli.ephemeral {
        debug!("Using in-memory state");
        Box::new(MemoryBackend::new())
    } else {
        debug!("Using state directory {:?}", state_dir);
        Box::new(FileBackend::new(&state_dir))
    };
    let store = ConsoleStore::open(backend).into_shared();
    let executor = Executor::new(ApiClient::from_config(&config), store.clone());

    let Some(command) = cli.command else {
        return run_tui(executor, &config);
    };

    match command {
        Commands::Tui => run_tui(executor, &config),
        Commands::Login { username, password } => {
            let session = Session::login(&username, &password)?;
            println!("✓ Logged in as {}", session.username);
            lock_store(&store)?.set_session(Some(session));
            Ok(())
        }
        Commands::Logout => {
            lock_store(&store)?.set_session(None);
            println!("✓ Logged out");
            Ok(())
        }
        Commands::Whoami => {
            let store = lock_store(&store)?;
            let session = session::require(store.session())?;
            println!("{} (token {})", session.username, session.token);
            Ok(())
        }
        command => {
            require_session(&store)?;
            run_headless(command, &executor, &config)
        }
    }
}

fn require_session(store: &SharedStore) -> anyhow::Result<()> {
    session::require(lock_store(store)?.session())?;
    Ok(())
}

/// Commands that need a session
fn run_headless(command: Commands, executor: &Executor, config: &ConsoleConfig) -> anyhow::Result<()> {
    let store = executor.store();
    match command {
        Commands::Exec {
            service,
            method,
            path,
            body,
            label,
        } => {
            if !path.starts_with('/') {
                bail!("Path must start with '/', got '{}'", path);
            }
            let body = body
                .map(|raw| serde_json::from_str(&raw).context("--body is not valid JSON"))
                .transpose()?;
            let label = label.unwrap_or_else(|| format!("{} {}", method, path));
            let call = ApiCall {
                service,
                method,
                path,
                body,
            };
            run_request(executor, ExecutionRequest::new(label, call))
        }
        Commands::Order { action } => {
            let (action, overrides) = action.plan();
            run_action(executor, action, &overrides)
        }
        Commands::Inventory { action } => {
            let (action, overrides) = action.plan();
            run_action(executor, action, &overrides)
        }
        Commands::Query {
            target: QueryCommands::Order {
                order_id,
                use_current,
            },
        } => {
            if use_current {
                lock_store(store)?.update_drafts(DraftState::use_current_order_id);
            }
            let overrides: DraftOverrides = order_id
                .map(|id| vec![(DraftField::QueryOrderId, id)])
                .unwrap_or_default();
            run_action(executor, Action::QueryOrderView, &overrides)
        }
        Commands::Flow { flow } => {
            let flow = match flow {
                FlowCommands::Order => Flow::Order,
                FlowCommands::Inventory => Flow::Inventory,
            };
            run_flow(executor, flow)
        }
        Commands::Health { service } => run_health(executor, service),
        Commands::History { action } => run_history(executor, action),
        Commands::Draft { action } => run_draft(store, action),
        Commands::Watch { count } => run_watch(executor, config.poll_interval(), count),
        Commands::Tui | Commands::Login { .. } | Commands::Logout | Commands::Whoami => Ok(()),
    }
}

/// Print the last result projection
fn print_result(store: &SharedStore) -> anyhow::Result<()> {
    let store = lock_store(store)?;
    let result = store.result();
    let marker = match result.status {
        Some(status) if (200..300).contains(&status) => "✓",
        Some(_) => "✗",
        None => "·",
    };
    let status = result
        .status
        .map(|s| format!("HTTP {}", s))
        .unwrap_or_else(|| "-".to_string());
    let duration = result
        .duration_ms
        .map(|ms| format!("{} ms", ms))
        .unwrap_or_else(|| "-".to_string());
    println!("{} {}  {}  {}", marker, result.title, status, duration);
    println!("{}", serde_json::to_string_pretty(&result.data)?);
    Ok(())
}

/// True when the executor got as far as recording the call
fn was_recorded<T>(outcome: &ticketing_console::Result<T>) -> bool {
    match outcome {
        Ok(_) => true,
        Err(e) => e.http_status().is_some(),
    }
}

/// Execute one request and print whatever was recorded
fn run_request(executor: &Executor, request: ExecutionRequest) -> anyhow::Result<()> {
    let outcome = executor.execute(request);
    if was_recorded(&outcome) {
        print_result(executor.store())?;
    }
    outcome?;
    Ok(())
}

fn apply_overrides(store: &SharedStore, overrides: &DraftOverrides) -> anyhow::Result<()> {
    if overrides.is_empty() {
        return Ok(());
    }
    lock_store(store)?.update_drafts(|drafts| {
        overrides
            .iter()
            .try_for_each(|(field, value)| drafts.set_field(*field, value))
    })?;
    Ok(())
}

fn run_action(executor: &Executor, action: Action, overrides: &DraftOverrides) -> anyhow::Result<()> {
    apply_overrides(executor.store(), overrides)?;
    let drafts = lock_store(executor.store())?.drafts().clone();
    run_request(executor, action.build(&drafts))?;
    if action == Action::CreateOrder {
        let order_id = lock_store(executor.store())?.drafts().order_id.clone();
        if !order_id.is_empty() {
            println!("Draft order id: {}", order_id);
        }
    }
    Ok(())
}

fn run_flow(executor: &Executor, flow: Flow) -> anyhow::Result<()> {
    let outcome = flow.run(executor);
    if was_recorded(&outcome) {
        print_result(executor.store())?;
    }
    match outcome? {
        FlowOutcome::Completed { steps, order_id } => {
            match order_id {
                Some(id) => println!("✓ {} completed ({} steps), order {}", flow, steps, id),
                None => println!("✓ {} completed ({} steps)", flow, steps),
            }
            Ok(())
        }
        FlowOutcome::Aborted { after } => {
            println!("! {} stopped after {}: response had no OrderID", flow, after);
            Ok(())
        }
    }
}

fn run_health(
    executor: &Executor,
    service: Option<ServiceKey>,
) -> anyhow::Result<()> {
    let board = match service {
        Some(service) => {
            let health = health::check(executor, service)?;
            println!("{} {}: {}", health_marker(health), service.label(), health);
            if health == ServiceHealth::Down {
                bail!("{} is down", service.label());
            }
            return Ok(());
        }
        None => health::sweep(executor)?,
    };

    for (service, health) in board.iter() {
        println!("{} {:<18} {}", health_marker(health), service.label(), health);
    }
    let overall = board.overall();
    println!("Overall: {}", overall);
    if board.iter().any(|(_, h)| h == ServiceHealth::Down) {
        bail!("Overall health is {}", overall);
    }
    Ok(())
}

fn health_marker(health: ServiceHealth) -> &'static str {
    match health {
        ServiceHealth::Ready => "✓",
        ServiceHealth::Down => "✗",
        ServiceHealth::Unknown => "·",
    }
}

fn run_history(executor: &Executor, action: HistoryCommands) -> anyhow::Result<()> {
    let store = executor.store();
    match action {
        HistoryCommands::List { limit } => {
            let store = lock_store(store)?;
            let entries = store.history().entries();
            if entries.is_empty() {
                println!("History is empty");
            }
            for (index, entry) in entries.iter().take(limit.unwrap_or(usize::MAX)).enumerate() {
                let marker = if entry.ok { "✓" } else { "✗" };
                println!(
                    "{:>3}. {} {:<28} {}  [{}]",
                    index + 1,
                    marker,
                    entry.label,
                    entry.summary(),
                    entry.id
                );
            }
            Ok(())
        }
        HistoryCommands::Show { reference } => {
            let entry = find_entry(store, &reference)?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
            Ok(())
        }
        HistoryCommands::Clear => {
            lock_store(store)?.clear_history();
            println!("✓ History cleared");
            Ok(())
        }
        HistoryCommands::Replay { reference } => {
            let entry = find_entry(store, &reference)?;
            let outcome = executor.replay(&entry);
            if was_recorded(&outcome) {
                print_result(store)?;
            }
            outcome?;
            Ok(())
        }
    }
}

fn find_entry(
    store: &SharedStore,
    reference: &str,
) -> anyhow::Result<HistoryEntry> {
    lock_store(store)?
        .history()
        .find(reference)
        .cloned()
        .with_context(|| format!("No history entry '{}'", reference))
}

fn run_draft(store: &SharedStore, action: DraftCommands) -> anyhow::Result<()> {
    match action {
        DraftCommands::Show => {
            let store = lock_store(store)?;
            let drafts = store.drafts();
            for field in DraftField::all() {
                println!("{:<16} {}", field.to_string(), drafts.get_field(field));
            }
            Ok(())
        }
        DraftCommands::Set { field, value } => {
            lock_store(store)?.update_drafts(|drafts| drafts.set_field(field, &value))?;
            println!("✓ {} = {}", field, value);
            Ok(())
        }
    }
}

/// Poll the read model for the draft order until Ctrl-C or `count` polls
fn run_watch(executor: &Executor, interval: Duration, count: Option<usize>) -> anyhow::Result<()> {
    let order_id = lock_store(executor.store())?.drafts().order_id.clone();
    if order_id.is_empty() {
        bail!("No order id to watch; create an order or run `draft set order_id <ID>`");
    }

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))
        .context("Failed to install Ctrl-C handler")?;

    println!(
        "Polling order {} every {}s (Ctrl-C to stop)",
        order_id,
        interval.as_secs()
    );
    let mut poller = Poller::new(interval);
    poller.enable(Instant::now());
    let mut polls = 0usize;

    while running.load(Ordering::SeqCst) && count.is_none_or(|limit| polls < limit) {
        if poller.poll_due(Instant::now()) {
            polls += 1;
            match poll::poll_once(executor) {
                Ok(_) => print_result(executor.store())?,
                Err(e) if e.http_status().is_some() => {
                    print_result(executor.store())?;
                    eprintln!("✗ {}", e);
                }
                Err(e) => eprintln!("✗ {}", e),
            }
        }
        thread::sleep(Duration::from_millis(100));
    }

    poller.disable();
    info!("Watch stopped after {} polls", polls);
    Ok(())
}

/// Run the interactive terminal console
fn run_tui(executor: Executor, config: &ConsoleConfig) -> anyhow::Result<()> {
    debug!("Initializing terminal for TUI mode");

    enable_raw_mode().context("Failed to enable raw mode")?;
    crossterm::execute!(stdout(), crossterm::terminal::EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(executor, config.poll_interval());
    let result = app.run(&mut terminal);

    // Cleanup terminal (always attempt cleanup, even if app failed)
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(stdout(), crossterm::terminal::LeaveAlternateScreen);

    result.map_err(Into::into)
}
