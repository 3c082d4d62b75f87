//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates terminal events into `core::Action` values and performs the
//! `Effect`s the core hands back (HTTP requests, clipboard writes).
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (request in flight, toast on screen): draws every ~80ms so
//!   the spinner turns and toasts expire on time.
//! - **Idle**: sleeps up to 500ms, only redraws on events or completions.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod clipboard;
mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use log::{debug, error, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::layout::{Position, Rect};

use crate::api::{ApiRequest, ChatApi, HttpChatApi, perform};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::model::Role;
use crate::core::request::Ticket;
use crate::core::state::App;
use crate::tui::clipboard::Clipboard;
use crate::tui::component::EventHandler;
use crate::tui::components::sidebar::hit_test as sidebar_hit_test;
use crate::tui::components::{
    InputBox, InputEvent, MessageListState, SidebarEvent, SidebarHit, SidebarState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which panel receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Sidebar,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub sidebar: SidebarState,
    pub focus: Focus,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            sidebar: SidebarState::new(),
            focus: Focus::Input, // User expects to type immediately
        }
    }

    /// Pull presentation state back in line after the core changed.
    fn sync(&mut self, app: &mut App) {
        if app.scroll_to_end {
            app.scroll_to_end = false;
            self.message_list.thread_replaced();
        }
        if self.focus == Focus::Sidebar && !app.sidebar_open {
            self.focus = Focus::Input;
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter through; terminals without it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Performs the core's effects: requests go to background tasks, whose
/// completions come back over `tx` as `Action::Completed`.
struct Executor {
    api: Arc<dyn ChatApi>,
    timeout: Duration,
    tx: mpsc::Sender<Action>,
    clipboard: Clipboard,
}

impl Executor {
    /// Run `action` through the core and perform what it asks for.
    /// Returns true when the core asked to quit.
    fn dispatch(&mut self, app: &mut App, action: Action) -> bool {
        let mut quit = false;
        for effect in update(app, action) {
            match effect {
                Effect::Request(ticket, request) => self.spawn_request(ticket, request),
                Effect::Copy(text) => {
                    let result = self.clipboard.copy(text);
                    quit |= self.dispatch(app, Action::CopyFinished(result));
                }
                Effect::Quit => quit = true,
            }
        }
        quit
    }

    fn spawn_request(&self, ticket: Ticket, request: ApiRequest) {
        info!("Spawning {:?} request (ticket {})", ticket.kind, ticket.seq);
        let api = self.api.clone();
        let tx = self.tx.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            let result = perform(api.as_ref(), &request, timeout).await;
            if tx
                .send(Action::Completed {
                    ticket,
                    request,
                    result,
                })
                .is_err()
            {
                warn!("Dropping {:?} completion: event loop has exited", ticket.kind);
            }
        });
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let api: Arc<dyn ChatApi> = match HttpChatApi::new(&config.base_url, config.api_variant) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            error!("Cannot build API client: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };
    info!(
        "Using {} ({:?} API), request timeout {:?}",
        config.base_url, config.api_variant, config.request_timeout
    );

    let mut app = App::from_config(&config);
    let mut tui = TuiState::new();

    // Channel for completions from background tasks
    let (tx, rx) = mpsc::channel();
    let mut executor = Executor {
        api,
        timeout: config.request_timeout,
        tx,
        clipboard: Clipboard::new(),
    };

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let width = terminal.size()?.width;
    executor.dispatch(&mut app, Action::Resize(width));
    executor.dispatch(&mut app, Action::Bootstrap);

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        let now = Instant::now();
        executor.dispatch(&mut app, Action::Tick(now));
        tui.sync(&mut app);

        let animating = app.is_loading() || !app.toasts.is_empty();
        if needs_redraw || animating {
            let spinner_frame = (start_time.elapsed().as_millis() / 80) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        let screen = terminal.get_frame().area();
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            for action in route(event, &app, &mut tui, screen) {
                should_quit |= executor.dispatch(&mut app, action);
            }
            tui.sync(&mut app);
        }

        // Completions from background requests
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            should_quit |= executor.dispatch(&mut app, action);
        }

        if should_quit {
            break;
        }
    }

    info!("Exiting");
    ratatui::restore();
    Ok(())
}

/// Translate one terminal event into core actions, updating presentation
/// state (focus, selection, scroll) along the way. `screen` is the full
/// terminal area, used to hit test mouse clicks.
fn route(event: TuiEvent, app: &App, tui: &mut TuiState, screen: Rect) -> Vec<Action> {
    match event {
        TuiEvent::ForceQuit => vec![Action::Quit],
        TuiEvent::Resize(width, _) => vec![Action::Resize(width)],
        TuiEvent::NewConversation => vec![Action::CreateConversation],
        TuiEvent::ClearConversation => vec![Action::ClearConversation],
        TuiEvent::RefreshList => vec![Action::RefreshList],
        TuiEvent::ToggleSidebar => vec![Action::ToggleSidebar],
        TuiEvent::Copy => copy_target(app, tui.message_list.selected_index)
            .map(Action::CopyMessage)
            .into_iter()
            .collect(),
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(&event);
            vec![]
        }
        TuiEvent::MouseClick(col, row) => click(app, tui, screen, col, row),
        _ => match tui.focus {
            Focus::Input => route_input(event, app, tui),
            Focus::Sidebar => route_sidebar(event, app, tui),
        },
    }
}

fn route_input(event: TuiEvent, app: &App, tui: &mut TuiState) -> Vec<Action> {
    if event == TuiEvent::FocusNext {
        tui.focus = Focus::Sidebar;
        tui.sidebar.select_active(app.sidebar().rows());
        return if app.sidebar_open {
            vec![]
        } else {
            vec![Action::ToggleSidebar]
        };
    }
    match tui.input_box.handle_event(&event) {
        Some(InputEvent::Submit(text)) => vec![Action::Submit(text)],
        Some(InputEvent::ContentChanged) | None => vec![],
    }
}

fn route_sidebar(event: TuiEvent, app: &App, tui: &mut TuiState) -> Vec<Action> {
    let view = app.sidebar();
    match tui.sidebar.handle_event(&event, view.rows()) {
        Some(SidebarEvent::Switch(id)) => {
            tui.focus = Focus::Input;
            vec![Action::SwitchConversation(id)]
        }
        Some(SidebarEvent::Delete(id)) => vec![Action::DeleteConversation(id)],
        Some(SidebarEvent::Dismiss) => {
            tui.focus = Focus::Input;
            vec![]
        }
        None => vec![],
    }
}

fn click(app: &App, tui: &mut TuiState, screen: Rect, col: u16, row: u16) -> Vec<Action> {
    let regions = ui::regions(screen, app.sidebar_open, |w| tui.input_box.height(w));
    let at = Position { x: col, y: row };

    if let Some(sidebar_area) = regions.sidebar
        && sidebar_area.contains(at)
    {
        let view = app.sidebar();
        let rows = view.rows();
        // The delete button sits inside the row; its hit never also switches
        return match sidebar_hit_test(sidebar_area, &tui.sidebar, rows.len(), col, row) {
            Some(SidebarHit::DeleteButton(i)) => {
                vec![Action::DeleteConversation(rows[i].id.clone())]
            }
            Some(SidebarHit::Row(i)) => vec![Action::SwitchConversation(rows[i].id.clone())],
            None => vec![],
        };
    }

    if regions.thread.contains(at) {
        if let Some(hit) = tui.message_list.hit_test(regions.thread, col, row) {
            if hit.on_copy_label {
                return vec![Action::CopyMessage(hit.index)];
            }
            tui.message_list.selected_index = Some(hit.index);
        }
        return vec![];
    }

    if regions.input.contains(at) {
        tui.focus = Focus::Input;
    }
    vec![]
}

/// The selected message if it is an assistant reply, else the latest reply.
fn copy_target(app: &App, selected: Option<usize>) -> Option<usize> {
    selected
        .filter(|&i| app.thread.get(i).is_some_and(|m| m.role == Role::Assistant))
        .or_else(|| app.thread.iter().rposition(|m| m.role == Role::Assistant))
}
