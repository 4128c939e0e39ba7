use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use empath_core::palette;

use crate::tui::{App, ChatEntry};

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Whole-frame background keyed to the latest dominant emotion;
/// white before the first detection and for unmapped labels.
fn frame_background(app: &App) -> Color {
    let (r, g, b) = match &app.latest {
        Some(reply) => palette::background(&reply.detection.label),
        None => palette::WHITE,
    };
    Color::Rgb(r, g, b)
}

/// Foreground that stays readable on the light palette colors.
const FG: Color = Color::Black;

pub fn draw(f: &mut Frame, app: &App) {
    let bg = frame_background(app);
    f.render_widget(
        Block::default().style(Style::default().bg(bg).fg(FG)),
        f.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(10),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_chat(f, app, chunks[0]);
    draw_chart(f, app, chunks[1]);
    draw_input(f, app, chunks[2]);
    draw_status(f, app, chunks[3]);
}

fn draw_chat(f: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for entry in &app.entries {
        match entry {
            ChatEntry::User(text) => {
                if !lines.is_empty() {
                    lines.push(Line::default());
                }
                lines.push(Line::from(vec![Span::raw("> "), Span::raw(text.as_str())]));
            }
            ChatEntry::Reply(reply) => {
                lines.push(Line::from(Span::styled(
                    format!(
                        "detected: {} ({:.2})",
                        reply.detection.label, reply.detection.confidence
                    ),
                    Style::default().italic(),
                )));
                lines.push(Line::from(Span::raw(format!("empath: {}", reply.response))));
            }
            ChatEntry::Notice(text) => {
                lines.push(Line::from(Span::styled(
                    text.as_str(),
                    Style::default().dim(),
                )));
            }
        }
    }
    if app.thinking {
        let frame = SPINNER[app.anim_frame % SPINNER.len()];
        lines.push(Line::from(Span::styled(
            format!("{frame} reading the mood..."),
            Style::default().dim(),
        )));
    }

    // Pin the tail of the log to the bottom, minus manual scroll.
    let visible = area.height.saturating_sub(2);
    let scroll = (lines.len() as u16)
        .saturating_sub(visible)
        .saturating_sub(app.scroll_offset);

    let block = Block::default().borders(Borders::ALL).title(" empath ");
    let para = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(para, area);
}

fn draw_chart(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" emotion confidence ");

    let Some(reply) = &app.latest else {
        let para = Paragraph::new(Line::from(Span::styled(
            "scores appear here after your first message",
            Style::default().dim(),
        )))
        .block(block);
        f.render_widget(para, area);
        return;
    };

    let bars: Vec<Bar> = reply
        .detection
        .scores
        .iter()
        .map(|s| {
            let (r, g, b) = palette::background(&s.label);
            Bar::default()
                .label(Line::from(s.label.clone()))
                .value((s.score.clamp(0.0, 1.0) * 100.0).round() as u64)
                .text_value(format!("{:.2}", s.score))
                .style(Style::default().fg(Color::Rgb(r, g, b)).bg(FG))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(2)
        .max(100);
    f.render_widget(chart, area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" ask me ");
    let inner_w = area.width.saturating_sub(2) as usize;

    // Horizontal scroll keeps the cursor visible on long lines.
    let before_cursor_w = app.input[..app.cursor].width();
    let h_scroll = before_cursor_w.saturating_sub(inner_w.saturating_sub(1));

    let para = Paragraph::new(Line::from(Span::raw(app.input.as_str())))
        .block(block)
        .scroll((0, h_scroll as u16));
    f.render_widget(para, area);

    f.set_cursor_position(Position::new(
        area.x + 1 + (before_cursor_w - h_scroll) as u16,
        area.y + 1,
    ));
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let text = match &app.latest {
        Some(reply) => format!(
            " emotion {}  |  confidence {:.2}  |  turn {}",
            reply.detection.label, reply.detection.confidence, app.turn_count
        ),
        None => " waiting for your first message  |  Ctrl+C to quit".to_owned(),
    };

    let para = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(para, area);
}
