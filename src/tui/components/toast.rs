//! Toast overlay: stacked notifications in the bottom-right corner of the
//! thread area, newest at the bottom. Long error texts wrap at
//! [`MAX_WIDTH`] columns.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::toast::{Toast, ToastLevel};
use crate::tui::component::Component;

/// Widest a toast gets, borders included.
const MAX_WIDTH: u16 = 48;
/// Gap kept between a toast and the edges of the area.
const MARGIN: u16 = 1;

pub struct ToastStack<'a> {
    pub toasts: &'a [Toast],
}

impl<'a> ToastStack<'a> {
    pub fn new(toasts: &'a [Toast]) -> Self {
        Self { toasts }
    }
}

fn level_style(level: ToastLevel) -> Style {
    match level {
        ToastLevel::Success => Style::default().fg(Color::Green),
        ToastLevel::Error => Style::default().fg(Color::Red),
    }
}

fn wrap_text(text: &str, width: u16) -> Vec<String> {
    textwrap::wrap(text, usize::from(width.max(1)))
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

impl<'a> Component for ToastStack<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let max_width = MAX_WIDTH.min(area.width.saturating_sub(MARGIN * 2));
        if max_width < 5 {
            return;
        }
        let mut bottom = area.bottom().saturating_sub(MARGIN);
        for toast in self.toasts.iter().rev() {
            let lines = wrap_text(&toast.text, max_width - 4);
            let text_width = lines
                .iter()
                .map(|l| l.width() as u16)
                .max()
                .unwrap_or(0);
            let width = (text_width + 4).min(max_width);
            let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
            if bottom < area.y + height {
                break;
            }
            let rect = Rect::new(
                area.right().saturating_sub(width + MARGIN),
                bottom - height,
                width,
                height,
            );
            bottom -= height;

            let style = level_style(toast.level);
            let block = Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(style)
                .padding(Padding::horizontal(1));
            frame.render_widget(Clear, rect);
            frame.render_widget(Paragraph::new(lines.join("\n")).style(style).block(block), rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn draw(toasts: &[Toast], w: u16, h: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
        terminal
            .draw(|f| ToastStack::new(toasts).render(f, f.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..h)
            .map(|y| (0..w).map(|x| buffer[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    #[test]
    fn newest_toast_is_lowest() {
        let ttl = Duration::from_secs(2);
        let toasts = vec![
            Toast::new(ToastLevel::Success, "Copied to clipboard", ttl),
            Toast::new(ToastLevel::Error, "Failed to send message", ttl),
        ];
        let rows = draw(&toasts, 60, 12);
        let copied = rows.iter().position(|r| r.contains("Copied")).unwrap();
        let failed = rows.iter().position(|r| r.contains("Failed to send")).unwrap();
        assert!(copied < failed);
    }

    #[test]
    fn long_text_wraps() {
        let text = "Failed to load conversations: network error: connection refused by remote host";
        let toasts = vec![Toast::new(ToastLevel::Error, text, Duration::from_secs(5))];
        let rows = draw(&toasts, 40, 10);
        let used = rows.iter().filter(|r| r.contains('│')).count();
        assert!(used >= 3, "{:?}", rows);
        assert!(rows.iter().any(|r| r.contains("refused")));
    }

    #[test]
    fn no_toasts_draws_nothing() {
        let rows = draw(&[], 20, 4);
        assert!(rows.iter().all(|r| r.trim().is_empty()));
    }
}
