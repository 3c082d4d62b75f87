//! # Header Component
//!
//! Single line at the top of the screen: the active conversation's title on
//! the left, the loading indicator and key hints on the right.
//!
//! Stateless: every frame builds a fresh `Header` from `App` props.
//!
//! ```text
//! ≡ What is Rust?                                  ⠹ thinking…  ^N new  ^B list
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const HINTS: &str = "^N new  ^L clear  ^B list  ^Y copy";

pub struct Header<'a> {
    pub title: &'a str,
    pub loading: bool,
    pub spinner_frame: usize,
}

impl<'a> Header<'a> {
    pub fn new(title: &'a str, loading: bool, spinner_frame: usize) -> Self {
        Self {
            title,
            loading,
            spinner_frame,
        }
    }

    fn status(&self) -> Line<'static> {
        let mut spans = Vec::new();
        if self.loading {
            let glyph = SPINNER[self.spinner_frame % SPINNER.len()];
            spans.push(Span::styled(
                format!("{glyph} thinking…  "),
                Style::default().fg(Color::Yellow),
            ));
        }
        spans.push(Span::styled(HINTS, Style::default().fg(Color::DarkGray)));
        Line::from(spans)
    }
}

impl<'a> Component for Header<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let status = self.status();
        // Hints give way to the title on narrow terminals; the spinner never does.
        let status_width = (status.width() as u16).min(area.width / 2);
        let [title_area, status_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(status_width)]).areas(area);

        let title = Line::from(vec![
            Span::styled("≡ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                self.title.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(title), title_area);
        frame.render_widget(Paragraph::new(status).right_aligned(), status_area);
    }
}
