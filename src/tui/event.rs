use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use log::{debug, warn};

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq)]
pub enum TuiEvent {
    // Mapped onto core actions by the event loop
    ForceQuit,
    Submit,
    NewConversation,
    ClearConversation,
    ToggleSidebar,
    RefreshList,
    Copy,
    /// Tab: move focus between input and sidebar
    FocusNext,

    // Editing (InputBox)
    InputChar(char),
    Paste(String), // Bracketed paste - preserves newlines
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorHome,
    CursorEnd,
    Escape,

    // Thread scrolling
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,

    MouseClick(u16, u16),
    Resize(u16, u16),
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(Duration::ZERO)
}

/// Poll for an event, blocking up to `timeout`. Terminal read errors are
/// logged and reported as "no event".
pub fn poll_event_timeout(timeout: Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            warn!("Polling terminal events failed: {}", e);
            return None;
        }
    }
    match event::read() {
        Ok(event) => map_event(event),
        Err(e) => {
            warn!("Reading terminal event failed: {}", e);
            None
        }
    }
}

fn map_event(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                Some(TuiEvent::MouseClick(mouse.column, mouse.row))
            }
            MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
            _ => None,
        },
        Event::Paste(data) => Some(TuiEvent::Paste(data.replace("\r\n", "\n").replace('\r', "\n"))),
        Event::Resize(w, h) => Some(TuiEvent::Resize(w, h)),
        _ => None,
    }
}

pub fn map_key(key: KeyEvent) -> Option<TuiEvent> {
    // Terminals with the enhancement protocol also report releases
    if key.kind == KeyEventKind::Release {
        return None;
    }
    debug!("Key event: {:?} with modifiers {:?}", key.code, key.modifiers);

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(TuiEvent::ForceQuit),
        // Ctrl+J inserts newline (ASCII LF; Ctrl+Enter sends this in most terminals)
        KeyCode::Char('j') if ctrl => Some(TuiEvent::InputChar('\n')),
        KeyCode::Char('n') if ctrl => Some(TuiEvent::NewConversation),
        KeyCode::Char('l') if ctrl => Some(TuiEvent::ClearConversation),
        KeyCode::Char('b') if ctrl => Some(TuiEvent::ToggleSidebar),
        KeyCode::Char('r') if ctrl => Some(TuiEvent::RefreshList),
        KeyCode::Char('y') if ctrl => Some(TuiEvent::Copy),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(TuiEvent::InputChar(c)),
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
            Some(TuiEvent::InputChar('\n'))
        }
        KeyCode::Enter => Some(TuiEvent::Submit),
        KeyCode::Tab | KeyCode::BackTab => Some(TuiEvent::FocusNext),
        KeyCode::Backspace => Some(TuiEvent::Backspace),
        KeyCode::Delete => Some(TuiEvent::Delete),
        KeyCode::Left => Some(TuiEvent::CursorLeft),
        KeyCode::Right => Some(TuiEvent::CursorRight),
        KeyCode::Up => Some(TuiEvent::CursorUp),
        KeyCode::Down => Some(TuiEvent::CursorDown),
        KeyCode::Home => Some(TuiEvent::CursorHome),
        KeyCode::End => Some(TuiEvent::CursorEnd),
        KeyCode::PageUp => Some(TuiEvent::ScrollPageUp),
        KeyCode::PageDown => Some(TuiEvent::ScrollPageDown),
        KeyCode::Esc => Some(TuiEvent::Escape),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn ctrl_shortcuts_map_to_commands() {
        let ctrl = KeyModifiers::CONTROL;
        assert_eq!(map_key(key(KeyCode::Char('c'), ctrl)), Some(TuiEvent::ForceQuit));
        assert_eq!(map_key(key(KeyCode::Char('n'), ctrl)), Some(TuiEvent::NewConversation));
        assert_eq!(map_key(key(KeyCode::Char('l'), ctrl)), Some(TuiEvent::ClearConversation));
        assert_eq!(map_key(key(KeyCode::Char('b'), ctrl)), Some(TuiEvent::ToggleSidebar));
        assert_eq!(map_key(key(KeyCode::Char('y'), ctrl)), Some(TuiEvent::Copy));
        assert_eq!(map_key(key(KeyCode::Char('j'), ctrl)), Some(TuiEvent::InputChar('\n')));
        assert_eq!(map_key(key(KeyCode::Char('q'), ctrl)), None);
    }

    #[test]
    fn plain_keys_edit() {
        let none = KeyModifiers::NONE;
        assert_eq!(map_key(key(KeyCode::Char('x'), none)), Some(TuiEvent::InputChar('x')));
        assert_eq!(
            map_key(key(KeyCode::Char('X'), KeyModifiers::SHIFT)),
            Some(TuiEvent::InputChar('X'))
        );
        assert_eq!(map_key(key(KeyCode::Enter, none)), Some(TuiEvent::Submit));
        assert_eq!(map_key(key(KeyCode::Tab, none)), Some(TuiEvent::FocusNext));
    }

    #[test]
    fn releases_are_ignored() {
        let mut release = key(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key(release), None);
    }

    #[test]
    fn paste_normalises_line_endings() {
        assert_eq!(
            map_event(Event::Paste("a\r\nb\rc".into())),
            Some(TuiEvent::Paste("a\nb\nc".into()))
        );
    }
}
