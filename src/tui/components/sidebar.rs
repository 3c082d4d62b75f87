//! # Sidebar Component
//!
//! Conversation list panel on the left. One row per cached conversation with
//! its title, an active marker, and a `✕` delete affordance in the last
//! column.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SidebarState` (selection, delete confirmation, scroll) lives in `TuiState`
//! - `Sidebar` is created each frame from the projected `SidebarView`
//!
//! ```text
//! Conversations   │
//! ● What is Rust? ✕│
//!   Groceries     ✕│
//!                  │
//! ↑↓ ⏎ open d del  │
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::sidebar::{EMPTY_SIDEBAR_TEXT, SidebarRow, SidebarView};
use crate::tui::component::Component;
use crate::tui::event::TuiEvent;

pub const SIDEBAR_WIDTH: u16 = 32;
const DELETE_GLYPH: &str = "✕";

/// Persistent sidebar presentation state.
#[derive(Debug, Default)]
pub struct SidebarState {
    /// Highlighted row while the sidebar has keyboard focus.
    pub selected: usize,
    /// First `d` pressed; the next `d` deletes.
    pub confirm_delete: bool,
    /// First visible row.
    pub offset: usize,
}

/// Events emitted by the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarEvent {
    Switch(String),
    Delete(String),
    /// Give focus back to the input box.
    Dismiss,
}

/// What a click inside the sidebar landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarHit {
    Row(usize),
    DeleteButton(usize),
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put the highlight on the active conversation (used when focus arrives).
    pub fn select_active(&mut self, rows: &[SidebarRow]) {
        self.selected = rows.iter().position(|r| r.active).unwrap_or(0);
        self.confirm_delete = false;
    }

    pub fn handle_event(&mut self, event: &TuiEvent, rows: &[SidebarRow]) -> Option<SidebarEvent> {
        if !matches!(event, TuiEvent::InputChar('d')) {
            self.confirm_delete = false;
        }
        self.selected = self.selected.min(rows.len().saturating_sub(1));

        match event {
            TuiEvent::Escape | TuiEvent::FocusNext => Some(SidebarEvent::Dismiss),
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                if self.selected + 1 < rows.len() {
                    self.selected += 1;
                }
                None
            }
            TuiEvent::Submit => rows
                .get(self.selected)
                .map(|row| SidebarEvent::Switch(row.id.clone())),
            TuiEvent::InputChar('d') => {
                let row = rows.get(self.selected)?;
                if self.confirm_delete {
                    self.confirm_delete = false;
                    Some(SidebarEvent::Delete(row.id.clone()))
                } else {
                    self.confirm_delete = true;
                    None
                }
            }
            _ => None,
        }
    }

    /// Scroll so the selected row stays within `visible` rows.
    fn follow_selection(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + visible {
            self.offset = self.selected + 1 - visible;
        }
    }
}

/// Rows region inside the panel: below the heading, above the help line,
/// left of the divider.
fn rows_area(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(1),
        height: area.height.saturating_sub(2),
    }
}

/// Map a click at (`col`, `row`) to a sidebar row. Clicks on a row's last
/// column hit its delete button instead of the row.
pub fn hit_test(area: Rect, state: &SidebarState, row_count: usize, col: u16, row: u16) -> Option<SidebarHit> {
    let rows = rows_area(area);
    if col < rows.x || col >= rows.right() || row < rows.y || row >= rows.bottom() {
        return None;
    }
    let index = state.offset + usize::from(row - rows.y);
    if index >= row_count {
        return None;
    }
    if col + 1 == rows.right() {
        Some(SidebarHit::DeleteButton(index))
    } else {
        Some(SidebarHit::Row(index))
    }
}

pub struct Sidebar<'a> {
    pub state: &'a mut SidebarState,
    pub view: &'a SidebarView,
    pub focused: bool,
}

impl<'a> Sidebar<'a> {
    pub fn new(state: &'a mut SidebarState, view: &'a SidebarView, focused: bool) -> Self {
        Self {
            state,
            view,
            focused,
        }
    }

    fn row_line(&self, index: usize, row: &SidebarRow, width: u16) -> Line<'static> {
        let highlighted = self.focused && index == self.state.selected;
        let marker = if row.active { "● " } else { "  " };
        let title_room = usize::from(width).saturating_sub(marker.width() + 2);
        let title = truncate(&row.title, title_room);
        let pad = title_room.saturating_sub(title.width());

        let mut style = if row.active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        if highlighted {
            style = style.bg(Color::DarkGray);
        }
        let delete_style = if highlighted && self.state.confirm_delete {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        Line::from(vec![
            Span::styled(marker, style),
            Span::styled(format!("{title}{}", " ".repeat(pad + 1)), style),
            Span::styled(DELETE_GLYPH, delete_style),
        ])
    }
}

impl<'a> Component for Sidebar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let divider = Block::default()
            .borders(Borders::RIGHT)
            .border_style(if self.focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            });
        frame.render_widget(divider, area);

        let heading = Line::from(Span::styled(
            "Conversations",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(
            Paragraph::new(heading),
            Rect { height: area.height.min(1), width: area.width.saturating_sub(1), ..area },
        );

        let rows = rows_area(area);
        let lines: Vec<Line<'static>> = match self.view {
            SidebarView::Empty => vec![Line::from(Span::styled(
                EMPTY_SIDEBAR_TEXT,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))],
            SidebarView::Rows(all) => {
                self.state.selected = self.state.selected.min(all.len().saturating_sub(1));
                self.state.follow_selection(usize::from(rows.height));
                all.iter()
                    .enumerate()
                    .skip(self.state.offset)
                    .take(usize::from(rows.height))
                    .map(|(i, row)| self.row_line(i, row, rows.width))
                    .collect()
            }
        };
        frame.render_widget(Paragraph::new(lines), rows);

        if area.height >= 2 {
            let help = if self.focused && self.state.confirm_delete {
                Span::styled("d again to delete", Style::default().fg(Color::Red))
            } else if self.focused {
                Span::styled("↑↓ ⏎ open  d delete", Style::default().fg(Color::DarkGray))
            } else {
                Span::styled("Tab to browse", Style::default().fg(Color::DarkGray))
            };
            let help_area = Rect {
                y: area.bottom() - 1,
                height: 1,
                width: area.width.saturating_sub(1),
                ..area
            };
            frame.render_widget(Paragraph::new(Line::from(help)), help_area);
        }
    }
}

/// Cut `text` to `max` columns, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
