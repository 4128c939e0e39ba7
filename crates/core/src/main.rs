//! Line-oriented REPL frontend.
//!
//! Plain stdin/stdout alternative to the full-screen `empath` TUI: reads a
//! line, prints the detected emotion, the response, and textual score bars.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use empath_core::config::EmpathCfg;
use empath_core::io::input::InputSender;
use empath_core::io::output::{OutputMessage, OutputReceiver, Reply};
use empath_classifier::provider::EmotionClassifier;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Arc::new(EmpathCfg::from_env());
    let classifier: Arc<dyn EmotionClassifier> = Arc::new(empath_classifier::http::from_env());
    tracing::info!(model = classifier.name(), "classifier initialized");

    let (mut session, event_tx, output_rx) = empath_core::session::Session::new(cfg, classifier);
    let token = session.token();
    spawn_sigint_canceler(token.clone());

    let repl_token = token.clone();
    let session_fut = session.run();
    let repl_fut = run_repl(event_tx, output_rx, repl_token);
    tokio::pin!(session_fut);
    tokio::pin!(repl_fut);

    tokio::select! {
        _ = &mut session_fut => {
            token.cancel();
            (&mut repl_fut).await
        }
        result = &mut repl_fut => {
            token.cancel();
            (&mut session_fut).await;
            result
        }
    }
}

async fn run_repl(
    event_tx: InputSender,
    mut output_rx: OutputReceiver,
    token: CancellationToken,
) -> anyhow::Result<()> {
    const SPINNER: [&str; 4] = ["-", "\\", "|", "/"];

    println!("empath: type something and I'll read the mood. /q to quit.");

    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<ReplEvent>();
    let (ready_tx, ready_rx) = std::sync::mpsc::channel::<()>();
    spawn_input_thread(line_tx, ready_rx);
    request_next_prompt(&ready_tx);

    let mut waiting_for_reply = false;
    let mut spinner_idx: usize = 0;
    let mut spinner_interval = tokio::time::interval(Duration::from_millis(100));
    spinner_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                break;
            }
            _ = spinner_interval.tick(), if waiting_for_reply => {
                spinner_idx = (spinner_idx + 1) % SPINNER.len();
                draw_thinking_frame(SPINNER[spinner_idx])?;
            }
            line = line_rx.recv() => {
                let Some(line) = line else {
                    break;
                };
                match line {
                    ReplEvent::Line(line) => {
                        let text = line.trim();
                        if text.is_empty() {
                            // Whitespace-only input: no classification, just re-prompt.
                            request_next_prompt(&ready_tx);
                            continue;
                        }
                        if matches!(text, "/q" | "/exit" | "/quit") {
                            break;
                        }
                        if empath_core::io::input::submit_text(&event_tx, text.to_owned()).await.is_err() {
                            break;
                        }
                        if !waiting_for_reply {
                            spinner_idx = 0;
                            draw_thinking_frame(SPINNER[spinner_idx])?;
                            waiting_for_reply = true;
                        }
                    }
                    ReplEvent::Interrupted => {
                        token.cancel();
                        break;
                    }
                    ReplEvent::Eof => break,
                    ReplEvent::Error(err) => {
                        eprintln!("input error: {err}");
                        break;
                    }
                }
            }
            msg = output_rx.recv() => {
                let Some(msg) = msg else {
                    break;
                };
                if waiting_for_reply {
                    waiting_for_reply = false;
                    clear_current_line()?;
                }
                match msg {
                    OutputMessage::Reply(reply) => print_reply(&reply)?,
                    OutputMessage::Failure(err) => println!("{err}"),
                }
                request_next_prompt(&ready_tx);
            }
        }
    }
    drop(ready_tx);

    if waiting_for_reply {
        clear_current_line()?;
    }
    println!();
    Ok(())
}

/// Print one finished turn: emotion, confidence to two decimals, response,
/// and a textual bar per label.
fn print_reply(reply: &Reply) -> anyhow::Result<()> {
    let d = &reply.detection;
    println!("emotion: {} ({:.2})", d.label, d.confidence);
    println!("empath: {}", reply.response);
    for s in &d.scores {
        let filled = (s.score.clamp(0.0, 1.0) * 20.0).round() as usize;
        println!("  {:<10} {:<20} {:.2}", s.label, "#".repeat(filled), s.score);
    }
    io::stdout().flush()?;
    Ok(())
}

fn draw_thinking_frame(frame: &str) -> anyhow::Result<()> {
    print!("\rthinking... {frame}");
    io::stdout().flush()?;
    Ok(())
}

fn clear_current_line() -> anyhow::Result<()> {
    print!("\r\x1b[2K");
    io::stdout().flush()?;
    Ok(())
}

fn request_next_prompt(ready_tx: &std::sync::mpsc::Sender<()>) {
    let _ = ready_tx.send(());
}

fn spawn_input_thread(
    line_tx: mpsc::UnboundedSender<ReplEvent>,
    ready_rx: std::sync::mpsc::Receiver<()>,
) {
    std::thread::spawn(move || {
        let mut editor = match rustyline::DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                let _ = line_tx.send(ReplEvent::Error(e.to_string()));
                return;
            }
        };

        while ready_rx.recv().is_ok() {
            match editor.readline("You> ") {
                Ok(line) => {
                    if line_tx.send(ReplEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    let _ = line_tx.send(ReplEvent::Interrupted);
                    break;
                }
                Err(ReadlineError::Eof) => {
                    let _ = line_tx.send(ReplEvent::Eof);
                    break;
                }
                Err(e) => {
                    let _ = line_tx.send(ReplEvent::Error(e.to_string()));
                    break;
                }
            }
        }
    });
}

enum ReplEvent {
    Line(String),
    Interrupted,
    Eof,
    Error(String),
}

fn spawn_sigint_canceler(token: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            if let Ok(mut sigint) =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            {
                let _ = sigint.recv().await;
                token.cancel();
            }
        }
        #[cfg(not(unix))]
        {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        }
    });
}
