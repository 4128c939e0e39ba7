use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio_util::sync::CancellationToken;

use empath_core::io::input::InputSender;
use empath_core::io::output::{OutputMessage, OutputReceiver, Reply};

use crate::event::AppEvent;
use crate::widgets;

/// One line of the conversation log.
pub enum ChatEntry {
    User(String),
    Reply(Reply),
    Notice(String),
}

/// TUI application state.
pub struct App {
    pub entries: Vec<ChatEntry>,
    pub input: String,
    pub cursor: usize,
    pub scroll_offset: u16,
    pub thinking: bool,
    pub anim_frame: usize,
    /// Most recent detection; drives the bar chart and the background color.
    pub latest: Option<Reply>,
    pub turn_count: u64,
    pub should_exit: bool,
}

impl App {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            input: String::new(),
            cursor: 0,
            scroll_offset: 0,
            thinking: false,
            anim_frame: 0,
            latest: None,
            turn_count: 0,
            should_exit: false,
        }
    }

    /// Submit the input line. Whitespace-only input is dropped without a turn.
    pub fn submit_input(&mut self) -> Option<String> {
        let text = self.input.trim().to_owned();
        self.input.clear();
        self.cursor = 0;
        if text.is_empty() {
            return None;
        }
        self.scroll_offset = 0;
        self.entries.push(ChatEntry::User(text.clone()));
        self.thinking = true;
        Some(text)
    }

    /// Record a finished turn from the session.
    pub fn receive(&mut self, msg: OutputMessage) {
        self.thinking = false;
        self.scroll_offset = 0;
        match msg {
            OutputMessage::Reply(reply) => {
                self.turn_count += 1;
                self.latest = Some(reply.clone());
                self.entries.push(ChatEntry::Reply(reply));
            }
            OutputMessage::Failure(err) => {
                self.entries.push(ChatEntry::Notice(err));
            }
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn delete_char_before_cursor(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.input[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.input.drain(prev..self.cursor);
        self.cursor = prev;
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = self.input[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor >= self.input.len() {
            return;
        }
        self.cursor = self.input[self.cursor..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| self.cursor + i)
            .unwrap_or(self.input.len());
    }
}

/// Run the TUI event loop. Blocks until the user exits (Ctrl+C).
pub async fn run_app(
    event_tx: InputSender,
    mut output_rx: OutputReceiver,
    token: CancellationToken,
) -> anyhow::Result<()> {
    // Enter raw mode + alternate screen
    terminal::enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let stop = Arc::new(AtomicBool::new(false));
    let mut event_rx = crate::event::spawn(stop.clone());

    let mut app = App::new();
    let mut anim_interval = tokio::time::interval(std::time::Duration::from_millis(80));
    anim_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // Initial draw
    terminal.draw(|f| widgets::draw(f, &app))?;

    loop {
        if app.should_exit {
            break;
        }
        tokio::select! {
            _ = token.cancelled() => {
                break;
            }
            evt = event_rx.recv() => {
                let Some(evt) = evt else { break };
                match evt {
                    AppEvent::Key(key) => handle_key(&mut app, key, &event_tx).await,
                    AppEvent::Resize => {}
                }
            }
            msg = output_rx.recv() => {
                if let Some(msg) = msg {
                    app.receive(msg);
                }
            }
            _ = anim_interval.tick() => {
                if app.thinking {
                    app.anim_frame = app.anim_frame.wrapping_add(1);
                }
            }
        }
        terminal.draw(|f| widgets::draw(f, &app))?;
    }

    // Cleanup
    stop.store(true, Ordering::Relaxed);
    terminal::disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

async fn handle_key(app: &mut App, key: crossterm::event::KeyEvent, event_tx: &InputSender) {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            app.should_exit = true;
        }
        (_, KeyCode::Enter) => {
            if let Some(text) = app.submit_input() {
                let _ = empath_core::io::input::submit_text(event_tx, text).await;
            }
        }
        (_, KeyCode::Backspace) => {
            app.delete_char_before_cursor();
        }
        (_, KeyCode::Left) => {
            app.move_cursor_left();
        }
        (_, KeyCode::Right) => {
            app.move_cursor_right();
        }
        (_, KeyCode::Up) => {
            app.scroll_offset = app.scroll_offset.saturating_add(1);
        }
        (_, KeyCode::Down) => {
            app.scroll_offset = app.scroll_offset.saturating_sub(1);
        }
        (_, KeyCode::Home) => {
            app.cursor = 0;
        }
        (_, KeyCode::End) => {
            app.cursor = app.input.len();
        }
        (_, KeyCode::Char(c)) => {
            app.insert_char(c);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use empath_core::types::Detection;

    fn reply(label: &str, confidence: f32) -> Reply {
        Reply {
            detection: Detection {
                label: label.into(),
                confidence,
                scores: Vec::new(),
            },
            response: "hi".into(),
        }
    }

    #[test]
    fn whitespace_submission_is_dropped() {
        let mut app = App::new();
        app.input = "   \t ".into();
        app.cursor = app.input.len();
        assert!(app.submit_input().is_none());
        assert!(app.entries.is_empty());
        assert!(!app.thinking);
        assert!(app.input.is_empty());
    }

    #[test]
    fn submission_records_entry_and_starts_spinner() {
        let mut app = App::new();
        app.input = "  hello there  ".into();
        app.cursor = app.input.len();
        assert_eq!(app.submit_input().as_deref(), Some("hello there"));
        assert!(app.thinking);
        assert_eq!(app.entries.len(), 1);
    }

    #[test]
    fn reply_updates_latest_and_turn_count() {
        let mut app = App::new();
        app.thinking = true;
        app.receive(OutputMessage::Reply(reply("joy", 0.82)));
        assert!(!app.thinking);
        assert_eq!(app.turn_count, 1);
        assert_eq!(app.latest.as_ref().unwrap().detection.label, "joy");
    }

    #[test]
    fn failure_keeps_previous_detection() {
        let mut app = App::new();
        app.receive(OutputMessage::Reply(reply("anger", 0.7)));
        app.receive(OutputMessage::Failure("[classifier error] down".into()));
        assert_eq!(app.latest.as_ref().unwrap().detection.label, "anger");
        assert_eq!(app.turn_count, 1);
    }

    #[test]
    fn cursor_editing_is_utf8_safe() {
        let mut app = App::new();
        for c in "héllo".chars() {
            app.insert_char(c);
        }
        app.move_cursor_left();
        app.move_cursor_left();
        app.delete_char_before_cursor();
        assert_eq!(app.input, "hélo");
    }
}
