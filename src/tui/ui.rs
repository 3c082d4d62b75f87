use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::sidebar::SIDEBAR_WIDTH;
use crate::tui::components::{Header, MessageList, Sidebar, ToastStack};
use crate::tui::{Focus, TuiState};

/// Screen regions for one frame. Drawing and mouse hit testing both go
/// through [`regions`] so a click always lands where the frame was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub header: Rect,
    pub sidebar: Option<Rect>,
    pub thread: Rect,
    pub input: Rect,
}

/// ```text
/// ┌──────────────── header ────────────────┐
/// │ sidebar │ thread                        │
/// │         ├───────────────────────────────┤
/// │         │ input (grows with content)    │
/// └─────────┴───────────────────────────────┘
/// ```
///
/// `input_height` maps the width left for the thread column to the input box height.
pub fn regions(area: Rect, sidebar_open: bool, input_height: impl Fn(u16) -> u16) -> Regions {
    use Constraint::{Length, Min};
    let [header, body] = Layout::vertical([Length(1), Min(0)]).areas(area);

    let (sidebar, main) = if sidebar_open {
        let width = SIDEBAR_WIDTH.min(body.width / 2);
        let [sidebar, main] = Layout::horizontal([Length(width), Min(0)]).areas(body);
        (Some(sidebar), main)
    } else {
        (None, body)
    };

    let [thread, input] = Layout::vertical([Min(0), Length(input_height(main.width))]).areas(main);
    Regions {
        header,
        sidebar,
        thread,
        input,
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    let r = regions(frame.area(), app.sidebar_open, |w| tui.input_box.height(w));

    Header::new(&app.header_title, app.is_loading(), spinner_frame).render(frame, r.header);

    if let Some(sidebar_area) = r.sidebar {
        let view = app.sidebar();
        Sidebar::new(&mut tui.sidebar, &view, tui.focus == Focus::Sidebar).render(frame, sidebar_area);
    }

    MessageList::new(&mut tui.message_list, &app.thread).render(frame, r.thread);

    tui.input_box.focused = tui.focus == Focus::Input;
    tui.input_box.render(frame, r.input);

    ToastStack::new(&app.toasts).render(frame, r.thread);
}
