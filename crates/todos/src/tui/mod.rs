use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEventKind};
use tokio::runtime::{Handle, Runtime};
use tokio::sync::mpsc;
use todos_app::{ClientConfig, RemoteStore, TodoSync};
use todos_store_http::HttpStore;
use tracing::subscriber::NoSubscriber;

use crate::config::keybindings::{KeyBindingsConfig, load_config, validate_keybindings_config};
use crate::config::Action;

pub mod constants;
mod handlers;
mod terminal;
mod text_field;
mod view;
mod visible_items;
mod widgets;

use self::constants::{EVENT_CHANNEL_CAPACITY, TUI_TICK_RATE_MS};
use self::terminal::{TuiTerminal, enter_terminal, restore_terminal};
use self::view::{Ui, UiAction, UiEvent};
use self::widgets::guidance::draw_guidance;

/// Launch the interactive TUI.
pub fn run(client: &ClientConfig, config_path: Option<&Path>) -> Result<()> {
    let keybindings = match load_config(config_path)? {
        Some(config) => {
            validate_keybindings_config(&config.tui.keybindings)?;
            config.tui.keybindings
        }
        None => KeyBindingsConfig::default(),
    };

    // Without an owner nothing may reach the network, so no store is built.
    let session = match client.owner() {
        Some(owner) => {
            let store = client.store()?;
            let runtime = Runtime::new().context("failed to start async runtime")?;
            Some((runtime, Arc::new(TodoSync::new(store, owner, client.sync_options()))))
        }
        None => None,
    };
    let config_hint = config_path
        .map(Path::to_path_buf)
        .or_else(ClientConfig::default_path)
        .map_or_else(|| "the config file".to_owned(), |path| path.display().to_string());

    let mut terminal = enter_terminal()?;
    let result = tracing::subscriber::with_default(NoSubscriber::default(), || match &session {
        Some((runtime, sync)) => run_event_loop(&mut terminal, runtime, sync, keybindings),
        None => run_guidance(&mut terminal, &keybindings, &config_hint),
    });
    restore_terminal(&mut terminal);

    result
}

fn run_event_loop(
    terminal: &mut TuiTerminal,
    runtime: &Runtime,
    sync: &Arc<TodoSync<HttpStore>>,
    keybindings: KeyBindingsConfig,
) -> Result<()> {
    let mut state_rx = sync.subscribe();
    let (events_tx, mut events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut ui = Ui::new(state_rx.borrow_and_update().clone(), keybindings);

    let loader = Arc::clone(sync);
    runtime.spawn(async move { loader.load().await });

    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(TUI_TICK_RATE_MS);

    loop {
        // Events are sent after the state change they report, so collecting
        // them before reading the state keeps the two consistent.
        let finished: Vec<UiEvent> = std::iter::from_fn(|| events_rx.try_recv().ok()).collect();
        if state_rx.has_changed().unwrap_or(false) {
            let state = state_rx.borrow_and_update().clone();
            ui.apply_state(state);
        }
        for event in finished {
            ui.handle_event(event);
        }

        terminal.draw(|f| ui.draw(f))?;
        if ui.should_quit {
            break;
        }

        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or_default();

        if event::poll(timeout)?
            && let CrosstermEvent::Key(key) = event::read()?
            && let Some(action) = ui.handle_key(key)
        {
            dispatch(runtime.handle(), sync, &events_tx, action);
        }

        if last_tick.elapsed() >= tick_rate {
            sync.expire_error();
            ui.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

fn run_guidance(terminal: &mut TuiTerminal, keybindings: &KeyBindingsConfig, config_hint: &str) -> Result<()> {
    loop {
        terminal.draw(|f| draw_guidance(f, config_hint))?;
        if let CrosstermEvent::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && (key.code == KeyCode::Esc || keybindings.matches(Action::Quit, &key))
        {
            return Ok(());
        }
    }
}

/// Hand `action` to the synchronization core.
///
/// Filter and error changes apply at once; everything else runs as a task on
/// `runtime` and reports through `events` when the UI needs the outcome.
fn dispatch<S>(
    runtime: &Handle,
    sync: &Arc<TodoSync<S>>,
    events: &mpsc::Sender<UiEvent>,
    action: UiAction,
) where
    S: RemoteStore + 'static,
{
    match action {
        UiAction::SetFilter(filter) => sync.set_filter(filter),
        UiAction::DismissError => {
            sync.dismiss_error();
        }
        action => {
            let sync = Arc::clone(sync);
            let events = events.clone();
            runtime.spawn(async move {
                if let Some(event) = perform(&sync, action).await {
                    // The UI may already be gone on quit.
                    let _ = events.send(event).await;
                }
            });
        }
    }
}

async fn perform<S: RemoteStore>(sync: &TodoSync<S>, action: UiAction) -> Option<UiEvent> {
    match action {
        UiAction::Create { title } => return Some(UiEvent::Created(sync.create(&title).await)),
        UiAction::Rename { id, title } => {
            let result = sync.rename(id, &title).await.map_err(|err| err.kind());
            return Some(UiEvent::Renamed { id, result });
        }
        UiAction::Toggle { id } => sync.toggle(id).await,
        UiAction::ToggleAll => sync.toggle_all().await,
        UiAction::Remove { id } => sync.remove(id).await,
        UiAction::ClearCompleted => sync.clear_completed().await,
        UiAction::SetFilter(filter) => sync.set_filter(filter),
        UiAction::DismissError => {
            sync.dismiss_error();
        }
    }
    None
}
