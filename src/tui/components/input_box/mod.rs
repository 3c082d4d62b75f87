//! # InputBox Component
//!
//! Multi-line message composer.
//!
//! ## Responsibilities
//!
//! - Capture text input and paste
//! - Handle editing (backspace, delete, cursor movement)
//! - Grow with its content up to [`MAX_VISIBLE_LINES`] rows, then scroll
//! - Emit the buffer on Enter and clear itself
//!
//! ## State Management
//!
//! The buffer, cursor byte offset and scroll row are internal state. Whether
//! the box has keyboard focus is a prop set by the parent each frame.

mod layout;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use layout::{
    CONTENT_OFFSET, MAX_VISIBLE_LINES, VERTICAL_OVERHEAD, inner_width, locate, next_char_boundary,
    offset_at, prev_char_boundary, rows,
};

const PLACEHOLDER: &str = "Type your message...";
const HINT: &str = " Enter send · ^J newline ";

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted non-blank text (Enter pressed)
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    /// Prop: draw the cursor and highlight the border
    pub focused: bool,
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    cursor: usize,
    /// First visible row when the content exceeds the box
    scroll: u16,
    /// Inner width from the last render, used for vertical movement
    last_width: u16,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            focused: true,
            cursor: 0,
            scroll: 0,
            last_width: 80,
        }
    }

    /// Box height for the current content at `area_width`, borders included.
    pub fn height(&self, area_width: u16) -> u16 {
        let content = u16::try_from(rows(&self.buffer, inner_width(area_width)).len()).unwrap_or(u16::MAX);
        content.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    fn insert(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn move_vertically(&mut self, down: bool) -> bool {
        let rows = rows(&self.buffer, self.last_width);
        let (row, col) = locate(&self.buffer, &rows, self.cursor);
        let target = match (down, row) {
            (false, 0) => return false,
            (false, r) => r - 1,
            (true, r) if r + 1 >= rows.len() => return false,
            (true, r) => r + 1,
        };
        self.cursor = offset_at(&self.buffer, &rows[target], col);
        true
    }

    /// Keep the cursor row inside the visible window.
    fn follow_cursor(&mut self, cursor_row: u16, total_rows: u16) {
        let visible = total_rows.min(MAX_VISIBLE_LINES);
        if cursor_row < self.scroll {
            self.scroll = cursor_row;
        } else if cursor_row >= self.scroll + visible {
            self.scroll = cursor_row + 1 - visible;
        }
        self.scroll = self.scroll.min(total_rows.saturating_sub(visible));
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect, total_rows: u16) {
        if total_rows <= MAX_VISIBLE_LINES {
            return;
        }
        // ScrollbarState content_length is max scrollable position, not total items
        let mut state = ScrollbarState::default()
            .content_length(usize::from(total_rows - MAX_VISIBLE_LINES))
            .position(usize::from(self.scroll));
        let scrollbar_area = Rect {
            x: area.right().saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            scrollbar_area,
            &mut state,
        );
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = inner_width(area.width);
        self.last_width = width;
        let rows = rows(&self.buffer, width);
        let total_rows = u16::try_from(rows.len()).unwrap_or(u16::MAX);
        let (cursor_row, cursor_col) = locate(&self.buffer, &rows, self.cursor);
        self.follow_cursor(u16::try_from(cursor_row).unwrap_or(u16::MAX), total_rows);

        let border_style = if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title("Message")
            .title_bottom(Line::from(HINT).right_aligned())
            .padding(Padding::horizontal(1));

        let lines: Vec<Line> = if self.buffer.is_empty() {
            vec![Line::styled(
                PLACEHOLDER,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )]
        } else {
            rows.iter()
                .skip(usize::from(self.scroll))
                .take(usize::from(MAX_VISIBLE_LINES))
                .map(|r| Line::raw(&self.buffer[r.clone()]))
                .collect()
        };

        frame.render_widget(Paragraph::new(lines).block(block), area);
        self.render_scrollbar(frame, area, total_rows);

        if self.focused {
            let x = (area.x + CONTENT_OFFSET + cursor_col).min(area.right().saturating_sub(1));
            let y = area.y + 1 + u16::try_from(cursor_row).unwrap_or(u16::MAX).saturating_sub(self.scroll);
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let changed = match event {
            TuiEvent::InputChar(c) => {
                self.insert(c.encode_utf8(&mut [0; 4]));
                true
            }
            TuiEvent::Paste(text) => {
                self.insert(text);
                true
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                true
            }
            TuiEvent::Delete if self.cursor < self.buffer.len() => {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                true
            }
            TuiEvent::CursorLeft if self.cursor > 0 => {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                true
            }
            TuiEvent::CursorRight if self.cursor < self.buffer.len() => {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                true
            }
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
                std::mem::replace(&mut self.cursor, line_start) != line_start
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.cursor..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.cursor + i);
                std::mem::replace(&mut self.cursor, line_end) != line_end
            }
            TuiEvent::CursorUp => self.move_vertically(false),
            TuiEvent::CursorDown => self.move_vertically(true),
            TuiEvent::Submit => {
                if self.buffer.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.clear();
                return Some(InputEvent::Submit(text));
            }
            _ => false,
        };
        changed.then_some(InputEvent::ContentChanged)
    }
}
