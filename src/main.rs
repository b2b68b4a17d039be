//! Pokedex - browse the PokeAPI catalog from the terminal

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventKind,
    HandlerResponse, Keybindings,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokedex::action::Action;
use pokedex::api;
use pokedex::effect::Effect;
use pokedex::logging;
use pokedex::reducer::reducer;
use pokedex::state::{AppState, View, DEFAULT_PAGE_SIZE};
use pokedex::ui::{DexComponentId, DexContext, DexUi};

#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Browse and search the PokeAPI catalog")]
struct Args {
    /// Entries fetched per listing page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..=100))]
    page_size: u32,

    /// Write tracing output to this file (filter with POKEDEX_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        page_size,
        log_file,
        debug: debug_args,
    } = Args::parse();

    logging::init_tracing(log_file.as_deref())?;
    tracing::info!(page_size, "starting pokedex");

    let debug = DebugSession::new(debug_args);

    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(page_size))
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    tracing::info!("pokedex exited");
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(DexUi::new()));
    let mut bus: EventBus<AppState, Action, DexComponentId, DexContext> = EventBus::new();
    let keybindings: Keybindings<DexContext> = Keybindings::new();

    let ui_search = Rc::clone(&ui);
    bus.register(DexComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    let ui_list = Rc::clone(&ui);
    bus.register(DexComponentId::List, move |event, state| {
        ui_list.borrow_mut().handle_list_event(&event.kind, state)
    });

    let ui_detail = Rc::clone(&ui);
    bus.register(DexComponentId::Detail, move |event, state| {
        ui_detail
            .borrow_mut()
            .handle_detail_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) if !state.search_active => match key.code {
            KeyCode::Char('q') => HandlerResponse::action(Action::Quit),
            KeyCode::Char('/') if state.view == View::List => {
                HandlerResponse::action(Action::SearchStart)
            }
            KeyCode::Char('r') if state.view == View::List => {
                HandlerResponse::action(Action::ListRefresh)
            }
            KeyCode::Char('t') => HandlerResponse::action(Action::UiToggleTheme),
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(120), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

/// Turn declared effects into tasks. Completions come back as actions tagged
/// with the generation they were issued under.
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    let key = effect.task_key();
    match effect {
        Effect::FetchPage {
            generation,
            limit,
            offset,
        } => {
            ctx.tasks().spawn(key, async move {
                page_action(generation, limit, offset).await
            });
        }
        Effect::DebounceFirstPage {
            generation,
            limit,
            delay,
        } => {
            ctx.tasks().debounce(key, delay, async move {
                page_action(generation, limit, 0).await
            });
        }
        Effect::DebounceSearch {
            generation,
            query,
            delay,
        } => {
            ctx.tasks().debounce(key, delay, async move {
                match api::find_entry_by_name(&query).await {
                    Ok(entry) => Action::SearchDidLoad { generation, entry },
                    Err(err) => Action::SearchDidError {
                        generation,
                        error: err.to_string(),
                    },
                }
            });
        }
        Effect::FetchDetail {
            generation,
            identifier,
        } => {
            ctx.tasks().spawn(key, async move {
                match api::get_entity(&identifier).await {
                    Ok(entity) => Action::DetailDidLoad {
                        generation,
                        identifier,
                        entity,
                    },
                    Err(err) => Action::DetailDidError {
                        generation,
                        identifier,
                        error: err.to_string(),
                    },
                }
            });
        }
    }
}

async fn page_action(generation: u64, limit: u32, offset: u32) -> Action {
    match api::list_entries(limit, offset).await {
        Ok(page) => Action::ListPageDidLoad {
            generation,
            offset,
            page,
        },
        Err(err) => Action::ListPageDidError {
            generation,
            error: err.to_string(),
        },
    }
}
