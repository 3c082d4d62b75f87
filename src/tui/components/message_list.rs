//! # MessageList Component
//!
//! Scrollable view of the active conversation's thread.
//!
//! ## Responsibilities
//!
//! - Lay out each message once per width and cache the wrapped lines
//! - Render only the visible window into a `ScrollView`
//! - Stick to the bottom while new messages arrive, unless the user scrolled up
//! - Hit testing for clicks (select a message, press its copy label)
//! - Show a welcome placeholder when the thread is empty
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) wrapping
//! `&'a mut MessageListState` (persistent state) and the thread (props).
//! The event loop calls [`MessageListState::thread_replaced`] whenever the
//! core reports a thread change, which drops the layout cache and re-pins
//! the view to the newest message.

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};
use unicode_width::UnicodeWidthStr;

use crate::core::model::{Message as ChatMessage, Role};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::{COPY_LABEL, Message};
use crate::tui::event::TuiEvent;

const WELCOME_TITLE: &str = "AI Chat Assistant";
const WELCOME_BODY: &str = "Ask me anything and I'll do my best to assist you!";

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Message picked by a click; Ctrl+Y copies it if it is an assistant reply
    pub selected_index: Option<usize>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

/// What a click on the thread landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHit {
    pub index: usize,
    /// The click was on the message's copy label.
    pub on_copy_label: bool,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            selected_index: None,
            viewport_height: 0,
        }
    }

    /// The thread was appended to or repainted: re-measure and follow the end.
    pub fn thread_replaced(&mut self) {
        self.layout.invalidate();
        self.stick_to_bottom = true;
        self.selected_index = None;
    }

    fn max_offset(&self) -> u16 {
        self.layout.total_height().saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    /// Re-engage auto-scroll once the user has scrolled back to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    /// Map a screen position inside `area` (the list's last render area) to a message.
    pub fn hit_test(&self, area: Rect, col: u16, row: u16) -> Option<MessageHit> {
        let content_width = area.width.saturating_sub(1);
        if row < area.y || row >= area.bottom() || col < area.x || col >= area.x + content_width {
            return None;
        }
        let offset = self.scroll_state.offset().y.min(self.max_offset());
        let content_y = (row - area.y).saturating_add(offset);
        let index = self
            .layout
            .prefix_heights
            .partition_point(|&end| end <= content_y);
        if index >= self.layout.heights.len() {
            return None;
        }

        let top = self.layout.top_of(index);
        let label_end = area.x + content_width.saturating_sub(1);
        let label_start = label_end.saturating_sub(COPY_LABEL.width() as u16);
        let on_copy_label = self.layout.copyable.get(index).copied().unwrap_or(false)
            && content_y == top
            && (label_start..label_end).contains(&col);
        Some(MessageHit {
            index,
            on_copy_label,
        })
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub thread: &'a [ChatMessage],
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, thread: &'a [ChatMessage]) -> Self {
        Self { state, thread }
    }

    fn render_welcome(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                WELCOME_TITLE,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled(WELCOME_BODY, Style::default().fg(Color::DarkGray))),
        ];
        let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).min(area.height);
        let top = area.y + area.height.saturating_sub(height) / 2;
        let welcome_area = Rect::new(area.x, top, area.width, height);
        frame.render_widget(Paragraph::new(lines).centered(), welcome_area);
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.viewport_height = area.height;
        if self.thread.is_empty() {
            self.state.layout.invalidate();
            self.render_welcome(frame, area);
            return;
        }

        // 1. Measure (only what the cache lacks)
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        self.state.layout.measure(self.thread, content_width);
        let total_height = self.state.layout.total_height();

        // 2. Clamp scroll offset to prevent overscrolling past content
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        // 3. Render visible messages into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let scroll_offset = if self.state.stick_to_bottom {
            total_height.saturating_sub(area.height)
        } else {
            self.state.scroll_state.offset().y
        };
        let layout = &self.state.layout;
        for i in layout.visible_range(scroll_offset, area.height) {
            let rect = Rect::new(0, layout.top_of(i), content_width, layout.heights[i]);
            let message = Message::new(
                self.thread[i].role,
                &layout.lines[i],
                self.state.selected_index == Some(i),
            );
            scroll_view.render_widget(message, rect);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.set_offset(Position { x: 0, y: scroll_offset });
        }
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler lives on `MessageListState` because `MessageList` is rebuilt
/// every frame and cannot hold the scroll position.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Wrapped lines and heights per message, valid for one content width.
#[derive(Default)]
pub struct LayoutCache {
    pub lines: Vec<Vec<Line<'static>>>,
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    /// Assistant messages carry a copy label.
    pub copyable: Vec<bool>,
    width: u16,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.lines.clear();
        self.heights.clear();
        self.prefix_heights.clear();
        self.copyable.clear();
    }

    /// Bring the cache up to date with `thread` at `width`. A width change
    /// re-measures everything; otherwise only messages past the cached
    /// prefix are measured.
    pub fn measure(&mut self, thread: &[ChatMessage], width: u16) {
        if width != self.width || self.lines.len() > thread.len() {
            self.invalidate();
            self.width = width;
        }
        for message in &thread[self.lines.len()..] {
            let lines = Message::layout(message, width);
            let height = Message::height_for(&lines);
            let end = self.prefix_heights.last().copied().unwrap_or(0).saturating_add(height);
            self.lines.push(lines);
            self.heights.push(height);
            self.prefix_heights.push(end);
            self.copyable.push(message.role == Role::Assistant);
        }
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn top_of(&self, index: usize) -> u16 {
        if index == 0 {
            0
        } else {
            self.prefix_heights[index - 1]
        }
    }

    /// Messages intersecting the viewport, plus half a viewport either side.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
