//! Markdown → ratatui lines, for assistant replies.
//!
//! `pulldown_cmark` events are folded into styled `Line`s. Fenced code blocks
//! are highlighted with syntect once the whole block has been collected, so
//! multi-line constructs (strings, comments) highlight correctly. Raw HTML in
//! a reply is shown as literal text, never interpreted.
//!
//! [`wrap`] splits styled lines to a width without losing span styles, and is
//! shared with plain user messages so both measure exactly what they draw.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use unicode_width::UnicodeWidthChar;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME: LazyLock<Theme> = LazyLock::new(|| {
    let mut themes = ThemeSet::load_defaults().themes;
    themes
        .remove("base16-ocean.dark")
        .or_else(|| themes.into_values().next())
        .unwrap_or_default()
});

const TAB: &str = "    ";

/// Render assistant markdown into styled lines (unwrapped).
pub fn render(content: &str, base: Style) -> Vec<Line<'static>> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_TABLES);

    let mut renderer = Renderer::new(base);
    for event in Parser::new_ext(content, opts) {
        renderer.event(event);
    }
    renderer.finish()
}

struct CodeBlock {
    lang: String,
    source: String,
}

struct Renderer {
    lines: Vec<Line<'static>>,
    base: Style,
    inline: Vec<Style>,
    /// Prefixes repeated on every line of the current block (quote bars).
    gutters: Vec<Span<'static>>,
    /// Open lists: None = bullets, Some(n) = next ordinal.
    lists: Vec<Option<u64>>,
    /// A list marker was just written and no paragraph has claimed its line.
    item_open: bool,
    code: Option<CodeBlock>,
    link: Option<String>,
    /// A block closed; the next block starts after a blank line.
    pending_gap: bool,
}

impl Renderer {
    fn new(base: Style) -> Self {
        Self {
            lines: Vec::new(),
            base,
            inline: Vec::new(),
            gutters: Vec::new(),
            lists: Vec::new(),
            item_open: false,
            code: None,
            link: None,
            pending_gap: false,
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }

    fn style(&self) -> Style {
        self.inline.last().copied().unwrap_or(self.base)
    }

    fn push_inline(&mut self, overlay: Style) {
        let next = self.style().patch(overlay);
        self.inline.push(next);
    }

    fn new_line(&mut self) {
        let mut line = Line::default();
        for gutter in &self.gutters {
            line.spans.push(gutter.clone());
        }
        self.lines.push(line);
    }

    fn start_block(&mut self) {
        if self.pending_gap && !self.lines.is_empty() {
            self.new_line();
        }
        self.pending_gap = false;
    }

    fn span(&mut self, span: Span<'static>) {
        if self.lines.is_empty() {
            self.new_line();
        }
        if let Some(line) = self.lines.last_mut() {
            line.spans.push(span);
        }
    }

    fn event(&mut self, event: Event<'_>) {
        if let Some(code) = self.code.as_mut() {
            match event {
                Event::Text(text) => code.source.push_str(&text),
                Event::End(TagEnd::CodeBlock) => self.close_code(),
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => {
                let style = self.style();
                self.span(Span::styled(text.replace('\t', TAB), style));
            }
            Event::Code(code) => {
                self.span(Span::styled(
                    code.to_string(),
                    Style::default().fg(Color::Yellow).bg(Color::Black),
                ));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                // Literal, dimmed. Multi-line HTML blocks keep their breaks.
                let style = self.style().add_modifier(Modifier::DIM);
                let mut parts = html.split('\n').peekable();
                while let Some(part) = parts.next() {
                    if !part.is_empty() {
                        self.span(Span::styled(part.to_string(), style));
                    }
                    if parts.peek().is_some_and(|next| !next.is_empty()) {
                        self.new_line();
                    }
                }
            }
            Event::SoftBreak => self.span(Span::raw(" ")),
            Event::HardBreak => self.new_line(),
            Event::Rule => {
                self.start_block();
                self.new_line();
                self.span(Span::styled("─".repeat(32), Style::default().fg(Color::DarkGray)));
                self.pending_gap = true;
            }
            Event::TaskListMarker(done) => {
                self.span(Span::raw(if done { "☑ " } else { "☐ " }));
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // The first paragraph of a list item continues the bullet's line.
                if self.item_open {
                    self.item_open = false;
                } else {
                    self.start_block();
                    self.new_line();
                }
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                self.new_line();
                let style = heading_style(self.base, level);
                self.push_inline(style);
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.gutters
                    .push(Span::styled("▌ ", Style::default().fg(Color::DarkGray)));
                self.push_inline(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or("").to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some(CodeBlock {
                    lang,
                    source: String::new(),
                });
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.new_line();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}{}. ", "  ".repeat(depth), n);
                        *n += 1;
                        marker
                    }
                    _ => format!("{}• ", "  ".repeat(depth)),
                };
                self.span(Span::styled(marker, Style::default().fg(Color::DarkGray)));
                self.item_open = true;
            }
            Tag::TableRow | Tag::TableHead => self.new_line(),
            Tag::TableCell => {
                self.span(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
            }
            Tag::Emphasis => self.push_inline(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_inline(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_inline(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.to_string());
                self.push_inline(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Table => self.pending_gap = true,
            TagEnd::Heading(_) => {
                self.inline.pop();
                self.pending_gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.gutters.pop();
                self.inline.pop();
                self.pending_gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.item_open = false;
                self.pending_gap = self.lists.is_empty();
            }
            TagEnd::Item => self.pending_gap = false,
            TagEnd::TableCell => self.span(Span::raw(" ")),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.inline.pop();
            }
            TagEnd::Link => {
                self.inline.pop();
                if let Some(url) = self.link.take() {
                    self.span(Span::styled(
                        format!(" <{url}>"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            _ => {}
        }
    }

    fn close_code(&mut self) {
        let Some(CodeBlock { lang, source }) = self.code.take() else {
            return;
        };
        let frame = Style::default().fg(Color::DarkGray);
        let label = if lang.is_empty() { "code".to_string() } else { lang.clone() };
        self.new_line();
        self.span(Span::styled(format!("┌ {label}"), frame));

        for line in highlight(&lang, &source) {
            self.new_line();
            self.span(Span::styled("│ ", frame));
            if let Some(current) = self.lines.last_mut() {
                current.spans.extend(line);
            }
        }
        self.new_line();
        self.span(Span::styled("└", frame));
        self.pending_gap = true;
    }
}

/// Highlight a code block. Unknown languages come back in a flat code colour.
fn highlight(lang: &str, source: &str) -> Vec<Vec<Span<'static>>> {
    let syntax = (!lang.is_empty())
        .then(|| SYNTAX_SET.find_syntax_by_token(lang))
        .flatten();
    let Some(syntax) = syntax else {
        let plain = Style::default().fg(Color::Gray);
        return source
            .lines()
            .map(|l| vec![Span::styled(l.replace('\t', TAB), plain)])
            .collect();
    };

    let mut highlighter = HighlightLines::new(syntax, &THEME);
    let mut out = Vec::new();
    for line in LinesWithEndings::from(source) {
        let spans = match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => ranges
                .into_iter()
                .filter_map(|(style, fragment)| {
                    let text = fragment.trim_end_matches(['\n', '\r']).replace('\t', TAB);
                    (!text.is_empty()).then(|| {
                        let fg = style.foreground;
                        Span::styled(text, Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)))
                    })
                })
                .collect(),
            Err(e) => {
                log::debug!("Highlighting {} failed: {}", lang, e);
                vec![Span::raw(line.trim_end_matches(['\n', '\r']).replace('\t', TAB))]
            }
        };
        out.push(spans);
    }
    out
}

fn heading_style(base: Style, level: HeadingLevel) -> Style {
    let style = base.add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => style.add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => style,
        _ => style.add_modifier(Modifier::ITALIC),
    }
}

// ============================================================================
// Wrapping
// ============================================================================

/// Wrap styled lines to `width` columns, breaking at spaces where possible.
///
/// Every input line yields at least one output line, so blank lines survive.
pub fn wrap(lines: &[Line<'static>], width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let mut out = Vec::new();

    for line in lines {
        let cells: Vec<(char, Style)> = line
            .spans
            .iter()
            .flat_map(|span| {
                let style = line.style.patch(span.style);
                span.content.chars().map(move |c| (c, style))
            })
            .collect();

        let mut row: Vec<(char, Style)> = Vec::new();
        let mut row_width = 0;
        let mut last_space: Option<usize> = None;

        for (c, style) in cells {
            let w = c.width().unwrap_or(0);
            if c == ' ' && row_width + w > width {
                out.push(join(&std::mem::take(&mut row)));
                row_width = 0;
                last_space = None;
                continue;
            }
            if row_width + w > width && !row.is_empty() {
                match last_space {
                    Some(at) if at > 0 => {
                        let tail = row.split_off(at + 1);
                        row.pop();
                        out.push(join(&row));
                        row = tail;
                    }
                    _ => out.push(join(&std::mem::take(&mut row))),
                }
                row_width = row.iter().map(|(c, _)| c.width().unwrap_or(0)).sum();
                last_space = row.iter().rposition(|(c, _)| *c == ' ');
            }
            if c == ' ' {
                last_space = Some(row.len());
            }
            row.push((c, style));
            row_width += w;
        }
        out.push(join(&row));
    }
    out
}

fn join(cells: &[(char, Style)]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut text = String::new();
    let mut current: Option<Style> = None;
    for &(c, style) in cells {
        if current.is_some_and(|s| s != style) {
            spans.push(Span::styled(std::mem::take(&mut text), current.unwrap_or_default()));
        }
        current = Some(style);
        text.push(c);
    }
    if let Some(style) = current {
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

/// Plain text of a line, for tests and hit-testing labels.
pub fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}
