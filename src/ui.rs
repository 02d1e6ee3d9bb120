use std::io::{self, Stdout};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use textwrap::wrap;
use tracing::debug;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::assemble::{AUTHOR_CLASS, HIDDEN_CLASS};
use crate::document::{ClickEvent, Document};
use crate::model::UserId;
use crate::node::Element;
use crate::refresh::{Rendered, PLACEHOLDER_CLASS};
use crate::selection::{PendingSelection, SelectionController};
use crate::toggle::{toggle_comments, CommentVisibility};

const COLOR_BG: Color = Color::Rgb(30, 30, 46);
const COLOR_PANEL_BG: Color = Color::Rgb(24, 24, 36);
const COLOR_PANEL_FOCUSED_BG: Color = Color::Rgb(49, 50, 68);
const COLOR_PANEL_SELECTED_BG: Color = Color::Rgb(69, 71, 90);
const COLOR_BORDER_IDLE: Color = Color::Rgb(49, 50, 68);
const COLOR_BORDER_FOCUSED: Color = Color::Rgb(137, 180, 250);
const COLOR_TEXT_PRIMARY: Color = Color::Rgb(205, 214, 244);
const COLOR_TEXT_SECONDARY: Color = Color::Rgb(166, 173, 200);
const COLOR_ACCENT: Color = Color::Rgb(137, 180, 250);
const COLOR_COMMENT: Color = Color::Rgb(250, 179, 135);

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Pane {
    Employees,
    Posts,
}

impl Pane {
    fn title(self) -> &'static str {
        match self {
            Pane::Employees => "Employees",
            Pane::Posts => "Posts",
        }
    }

    fn other(self) -> Pane {
        match self {
            Pane::Employees => Pane::Posts,
            Pane::Posts => Pane::Employees,
        }
    }
}

struct Spinner {
    index: usize,
    last_tick: Instant,
}

impl Spinner {
    fn new() -> Self {
        Self {
            index: 0,
            last_tick: Instant::now(),
        }
    }

    fn frame(&self) -> &'static str {
        SPINNER_FRAMES[self.index % SPINNER_FRAMES.len()]
    }

    fn advance(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_tick) >= Duration::from_millis(120) {
            self.index = (self.index + 1) % SPINNER_FRAMES.len();
            self.last_tick = now;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.index = 0;
        self.last_tick = Instant::now();
    }
}

struct PendingRender {
    selection: PendingSelection,
    cancel_flag: Arc<AtomicBool>,
}

enum AsyncResponse {
    Render {
        selection: PendingSelection,
        rendered: Rendered,
    },
}

pub struct Options {
    pub status_message: String,
    pub document: Document,
    pub controller: SelectionController,
}

pub struct Model {
    status_message: String,
    doc: Document,
    controller: SelectionController,
    focused_pane: Pane,
    nav_index: usize,
    loaded_user: Option<UserId>,
    selected_article: usize,
    content_scroll: u16,
    article_starts: Vec<usize>,
    spinner: Spinner,
    needs_redraw: bool,
    response_tx: Sender<AsyncResponse>,
    response_rx: Receiver<AsyncResponse>,
    pending: Option<PendingRender>,
}

impl Model {
    pub fn new(options: Options) -> Self {
        let (response_tx, response_rx) = unbounded();
        Self {
            status_message: options.status_message,
            doc: options.document,
            controller: options.controller,
            focused_pane: Pane::Employees,
            nav_index: 0,
            loaded_user: None,
            selected_article: 0,
            content_scroll: 0,
            article_starts: Vec::new(),
            spinner: Spinner::new(),
            needs_redraw: true,
            response_tx,
            response_rx,
            pending: None,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        let tick_rate = Duration::from_millis(120);

        loop {
            if self.poll_async() {
                self.mark_dirty();
            }

            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(16));

            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key.code) {
                        break;
                    }
                }
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
                if self.pending.is_some() {
                    if self.spinner.advance() {
                        self.mark_dirty();
                    }
                } else {
                    self.spinner.reset();
                }
            }
        }

        if let Some(pending) = self.pending.take() {
            pending.cancel_flag.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    fn poll_async(&mut self) -> bool {
        let mut changed = false;
        while let Ok(message) = self.response_rx.try_recv() {
            self.handle_async_response(message);
            changed = true;
        }
        changed
    }

    fn handle_async_response(&mut self, message: AsyncResponse) {
        match message {
            AsyncResponse::Render {
                selection,
                rendered,
            } => {
                let Some(pending) = &self.pending else {
                    return;
                };
                if pending.cancel_flag.load(Ordering::SeqCst) || pending.selection != selection {
                    return;
                }
                self.pending = None;
                if self
                    .controller
                    .complete_selection(&mut self.doc, selection, rendered)
                {
                    self.loaded_user = Some(selection.user_id);
                    self.selected_article = 0;
                    self.content_scroll = 0;
                    let count = self.doc.articles().len();
                    self.status_message = match self.option_label_for(selection.user_id) {
                        Some(name) => format!("{count} posts by {name}."),
                        None => format!("{count} posts by employee {}.", selection.user_id),
                    };
                }
                self.mark_dirty();
            }
        }
    }

    fn option_label_for(&self, user_id: UserId) -> Option<String> {
        let wanted = user_id.to_string();
        self.doc
            .select_menu()
            .children()
            .iter()
            .find(|option| option.attr("value") == Some(wanted.as_str()))
            .and_then(|option| option.text())
            .map(str::to_string)
    }

    /// Selector "change": load the highlighted employee.
    fn select_user(&mut self) {
        let selected = self.doc.option_values().get(self.nav_index).copied().flatten();

        if let Some(previous) = self.pending.take() {
            previous.cancel_flag.store(true, Ordering::SeqCst);
        }

        let selection = self.controller.begin_selection(&mut self.doc, selected);
        let cancel_flag = Arc::new(AtomicBool::new(false));
        self.pending = Some(PendingRender {
            selection,
            cancel_flag: cancel_flag.clone(),
        });
        self.article_starts.clear();
        self.status_message = format!("Loading posts for employee {}…", selection.user_id);
        self.spinner.reset();

        let tx = self.response_tx.clone();
        let remote = self.controller.remote();
        thread::spawn(move || {
            if cancel_flag.load(Ordering::SeqCst) {
                return;
            }
            let rendered = SelectionController::resolve(remote.as_ref(), selection.user_id);
            if cancel_flag.load(Ordering::SeqCst) {
                debug!(user = %selection.user_id, "selection superseded before delivery");
                return;
            }
            let _ = tx.send(AsyncResponse::Render {
                selection,
                rendered,
            });
        });
    }

    /// Button "click" on the focused article.
    fn click_selected(&mut self) {
        let post_id = self.doc.button_post_ids().get(self.selected_article).copied();
        match toggle_comments(&mut self.doc, ClickEvent { post_id }) {
            Some(CommentVisibility::Visible) => {
                self.status_message = "Comments shown.".to_string();
            }
            Some(CommentVisibility::Hidden) => {
                self.status_message = "Comments hidden.".to_string();
            }
            None => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') | KeyCode::Left
            | KeyCode::Right => {
                self.focused_pane = self.focused_pane.other();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.select_user(),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::PageDown | KeyCode::Char(' ') => {
                self.content_scroll = self.content_scroll.saturating_add(10);
            }
            KeyCode::PageUp => {
                self.content_scroll = self.content_scroll.saturating_sub(10);
            }
            KeyCode::Enter => match self.focused_pane {
                Pane::Employees => self.select_user(),
                Pane::Posts => self.click_selected(),
            },
            KeyCode::Char('c') => self.click_selected(),
            _ => return false,
        }
        self.mark_dirty();
        false
    }

    fn move_selection(&mut self, delta: i32) {
        match self.focused_pane {
            Pane::Employees => {
                let len = self.doc.select_menu().children().len();
                self.nav_index = step(self.nav_index, delta, len);
            }
            Pane::Posts => {
                let len = self.doc.button_post_ids().len();
                self.selected_article = step(self.selected_article, delta, len);
                if let Some(start) = self.article_starts.get(self.selected_article) {
                    self.content_scroll = u16::try_from(*start).unwrap_or(u16::MAX);
                }
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let full = frame.size();
        frame.render_widget(Block::default().style(Style::default().bg(COLOR_BG)), full);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(full);

        let status_text = if self.pending.is_some() {
            format!("{} {}", self.spinner.frame(), self.status_message)
        } else {
            self.status_message.clone()
        };
        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .fg(COLOR_TEXT_PRIMARY)
                .bg(COLOR_PANEL_FOCUSED_BG)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status_line, layout[0]);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
            .split(layout[1]);
        self.draw_employees(frame, panes[0]);
        self.draw_posts(frame, panes[1]);

        let footer = Paragraph::new(self.footer_text())
            .style(
                Style::default()
                    .fg(COLOR_TEXT_SECONDARY)
                    .bg(COLOR_PANEL_BG)
                    .add_modifier(Modifier::ITALIC),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(footer, layout[2]);
    }

    fn pane_block(&self, pane: Pane) -> Block<'static> {
        let focused = self.focused_pane == pane;
        Block::default()
            .title(pane.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                COLOR_BORDER_FOCUSED
            } else {
                COLOR_BORDER_IDLE
            }))
            .style(Style::default().bg(if focused {
                COLOR_PANEL_FOCUSED_BG
            } else {
                COLOR_PANEL_BG
            }))
    }

    fn draw_employees(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = self.pane_block(Pane::Employees);
        let inner_width = usize::from(block.inner(area).width.saturating_sub(2));
        let loaded = self.loaded_user.map(|id| id.to_string());
        let items: Vec<ListItem> = self
            .doc
            .select_menu()
            .children()
            .iter()
            .map(|option| {
                let active = loaded.is_some() && option.attr("value") == loaded.as_deref();
                let marker = if active { "●" } else { "○" };
                let label = truncate_to_width(option.text().unwrap_or(""), inner_width);
                ListItem::new(format!("{marker} {label}"))
                    .style(Style::default().fg(COLOR_TEXT_PRIMARY))
            })
            .collect();
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(COLOR_PANEL_SELECTED_BG)
                .add_modifier(Modifier::BOLD),
        );
        let mut state = ListState::default();
        if !self.doc.select_menu().children().is_empty() {
            state.select(Some(self.nav_index));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_posts(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let block = self.pane_block(Pane::Posts);
        let width = usize::from(block.inner(area).width.max(10));
        let selected = (self.focused_pane == Pane::Posts).then_some(self.selected_article);
        let (lines, starts) = main_lines(self.doc.main(), width, selected);
        self.article_starts = starts;
        let paragraph = Paragraph::new(Text::from(lines))
            .block(block)
            .scroll((self.content_scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn footer_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        match self.focused_pane {
            Pane::Employees => {
                parts.push("Employees: j/k move, Enter load posts");
            }
            Pane::Posts => {
                parts.push("Posts: j/k move, Enter/c toggle comments");
                parts.push("Space/PageUp scroll");
            }
        }
        parts.push("Tab switch pane");
        parts.push("r reload");
        parts.push("q quit");
        parts.join(" · ")
    }
}

fn step(current: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if delta < 0 {
        current.saturating_sub(delta.unsigned_abs() as usize)
    } else {
        (current + delta as usize).min(len - 1)
    }
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn wrapped(text: &str, width: usize, indent: &str, style: Style) -> Vec<Line<'static>> {
    let avail = width.saturating_sub(indent.len()).max(1);
    wrap(text, avail)
        .into_iter()
        .map(|piece| Line::from(Span::styled(format!("{indent}{piece}"), style)))
        .collect()
}

/// Lays out the main region as terminal lines. Returns the lines and the
/// index of the first line of each article.
fn main_lines(main: &Element, width: usize, selected: Option<usize>) -> (Vec<Line<'static>>, Vec<usize>) {
    let primary = Style::default().fg(COLOR_TEXT_PRIMARY);
    let secondary = Style::default().fg(COLOR_TEXT_SECONDARY);
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut starts = Vec::new();

    for node in main.children() {
        if node.tag() != "article" {
            let style = if node.has_class(PLACEHOLDER_CLASS) {
                secondary.add_modifier(Modifier::ITALIC)
            } else {
                primary
            };
            lines.extend(wrapped(node.text().unwrap_or(""), width, "", style));
            continue;
        }

        let index = starts.len();
        starts.push(lines.len());
        let focused = selected == Some(index);
        for child in node.children() {
            let text = child.text().unwrap_or("");
            match child.tag() {
                "h2" => {
                    let mut style = Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD);
                    if focused {
                        style = style.bg(COLOR_PANEL_SELECTED_BG);
                    }
                    lines.extend(wrapped(text, width, "", style));
                }
                "button" => {
                    let mut style = Style::default().fg(COLOR_ACCENT);
                    if focused {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    lines.push(Line::from(Span::styled(format!("[ {text} ]"), style)));
                }
                "section" => {
                    if child.has_class(HIDDEN_CLASS) {
                        continue;
                    }
                    if child.children().is_empty() {
                        lines.push(Line::from(Span::styled("  (no comments)", secondary)));
                    }
                    for comment in child.children() {
                        for (n, part) in comment.children().iter().enumerate() {
                            let part_text = part.text().unwrap_or("");
                            if n == 0 {
                                let style = Style::default().fg(COLOR_COMMENT).add_modifier(Modifier::BOLD);
                                lines.extend(wrapped(part_text, width, "  ▸ ", style));
                            } else {
                                lines.extend(wrapped(part_text, width, "    ", secondary));
                            }
                        }
                    }
                }
                _ if child.has_class(AUTHOR_CLASS) => {
                    lines.extend(wrapped(text, width, "", secondary.add_modifier(Modifier::ITALIC)));
                }
                _ => lines.extend(wrapped(text, width, "", primary)),
            }
        }
        lines.push(Line::default());
    }

    (lines, starts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_text_element;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn article(id: u64, hidden: bool) -> Element {
        let mut section = Element::new("section")
            .with_data("post-id", id.to_string())
            .with_child(
                Element::new("article")
                    .with_child(build_text_element("h3", "reply", None))
                    .with_child(build_text_element("p", "body", None))
                    .with_child(build_text_element("p", "From: a@b.c", None)),
            );
        if hidden {
            section = section.with_class(HIDDEN_CLASS);
        }
        Element::new("article")
            .with_child(build_text_element("h2", "Title", None))
            .with_child(build_text_element("p", "Author: A with B", Some(AUTHOR_CLASS)))
            .with_child(
                Element::new("button")
                    .with_data("post-id", id.to_string())
                    .with_text("Show Comments"),
            )
            .with_child(section)
    }

    #[test]
    fn hidden_sections_are_not_drawn() {
        let main = Element::new("main").with_child(article(1, true));
        let (lines, starts) = main_lines(&main, 40, None);
        let texts: Vec<_> = lines.iter().map(line_text).collect();
        assert_eq!(starts, vec![0]);
        assert!(texts.contains(&"[ Show Comments ]".to_string()));
        assert!(!texts.iter().any(|t| t.contains("reply")));
    }

    #[test]
    fn visible_sections_list_comments() {
        let main = Element::new("main").with_child(article(1, false));
        let (lines, _) = main_lines(&main, 40, None);
        let texts: Vec<_> = lines.iter().map(line_text).collect();
        assert!(texts.contains(&"  ▸ reply".to_string()));
        assert!(texts.contains(&"    From: a@b.c".to_string()));
    }

    #[test]
    fn article_starts_track_each_article() {
        let main = Element::new("main")
            .with_child(article(1, true))
            .with_child(article(2, true));
        let (_, starts) = main_lines(&main, 40, Some(1));
        assert_eq!(starts.len(), 2);
        assert!(starts[1] > starts[0]);
    }

    #[test]
    fn step_clamps_to_bounds() {
        assert_eq!(step(0, -1, 3), 0);
        assert_eq!(step(2, 1, 3), 2);
        assert_eq!(step(1, 1, 3), 2);
        assert_eq!(step(5, 1, 0), 0);
    }

    #[test]
    fn truncate_respects_display_width() {
        assert_eq!(truncate_to_width("Leanne Graham", 20), "Leanne Graham");
        assert_eq!(truncate_to_width("Leanne Graham", 6), "Leann…");
    }
}
