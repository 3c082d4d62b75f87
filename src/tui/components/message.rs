use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};

use crate::core::model::{Message as ChatMessage, Role};
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// Label in the top-right corner of assistant messages. Clicking it copies.
pub const COPY_LABEL: &str = " copy ^Y ";

/// One message bubble.
///
/// Content is laid out once per width by [`Message::layout`] and the wrapped
/// lines are cached by the parent `MessageList`, so the height used for
/// scrolling is exactly the height drawn.
///
/// - **User** (green): text inserted literally. Markup-like input such as
///   `<b>` or `**x**` is shown as typed.
/// - **Assistant** (blue): rendered markdown with highlighted code blocks
///   and a copy label.
pub struct Message<'a> {
    pub role: Role,
    pub lines: &'a [Line<'static>],
    pub is_selected: bool,
}

impl<'a> Message<'a> {
    pub fn new(role: Role, lines: &'a [Line<'static>], is_selected: bool) -> Self {
        Self {
            role,
            lines,
            is_selected,
        }
    }

    /// Wrap a message's content to fit a bubble `width` columns wide.
    pub fn layout(message: &ChatMessage, width: u16) -> Vec<Line<'static>> {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD).max(1);
        let style = role_style(message.role);
        let lines = match message.role {
            Role::User => message
                .content
                .trim_end()
                .lines()
                .map(|l| Line::styled(l.replace('\t', "    "), style))
                .collect(),
            Role::Assistant => markdown::render(&message.content, style),
        };
        markdown::wrap(&lines, content_width)
    }

    /// Bubble height for already laid out content.
    pub fn height_for(lines: &[Line<'_>]) -> u16 {
        u16::try_from(lines.len())
            .unwrap_or(u16::MAX)
            .max(1)
            .saturating_add(VERTICAL_OVERHEAD)
    }
}

pub fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Green),
        Role::Assistant => Style::default().fg(Color::Blue),
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "assistant",
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = role_style(self.role);
        let border_style = if self.is_selected {
            Style::default().fg(Color::Cyan)
        } else {
            style.add_modifier(Modifier::DIM)
        };

        let mut block = Block::bordered()
            .title(role_label(self.role))
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));
        if self.role == Role::Assistant {
            block = block.title(Line::from(COPY_LABEL).right_aligned());
        }

        let inner = block.inner(area);
        block.render(area, buf);
        Paragraph::new(self.lines.to_vec()).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(message: &ChatMessage, width: u16) -> Vec<String> {
        let lines = Message::layout(message, width);
        let height = Message::height_for(&lines);
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| f.render_widget(Message::new(message.role, &lines, false), f.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    #[test]
    fn height_saturates_for_huge_replies() {
        let lines = vec![Line::default(); 70_000];
        assert_eq!(Message::height_for(&lines), u16::MAX);
        assert_eq!(Message::height_for(&[]), 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn user_markup_renders_literally() {
        let rows = draw(&ChatMessage::user("<img src=x> **not bold**"), 40);
        assert!(rows[1].contains("<img src=x> **not bold**"), "{:?}", rows);
    }

    #[test]
    fn assistant_markdown_is_rendered() {
        let message = ChatMessage::assistant("**Hi there**");
        let lines = Message::layout(&message, 40);
        let span = lines[0].spans.iter().find(|s| s.content == "Hi there").unwrap();
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        let rows = draw(&message, 40);
        assert!(rows[0].contains("copy"));
        assert!(rows[1].contains("Hi there"));
        assert!(!rows[1].contains("**"));
    }

    #[test]
    fn user_message_has_no_copy_label() {
        let rows = draw(&ChatMessage::user("hello"), 30);
        assert!(rows[0].contains("you"));
        assert!(!rows[0].contains("copy"));
    }

    #[test]
    fn height_matches_wrapped_lines() {
        // 11 columns of text in a 9-wide bubble leaves 5 content columns
        let lines = Message::layout(&ChatMessage::user("Hello world"), 9);
        assert_eq!(lines.len(), 2);
        assert_eq!(Message::height_for(&lines), 4);
    }

    #[test]
    fn multiline_user_text_keeps_breaks() {
        let lines = Message::layout(&ChatMessage::user("one\n\nthree"), 40);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_content_still_has_a_row() {
        let lines = Message::layout(&ChatMessage::assistant(""), 40);
        assert_eq!(Message::height_for(&lines), 1 + VERTICAL_OVERHEAD);
    }
}
