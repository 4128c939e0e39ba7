mod event;
mod tui;
mod widgets;

use empath_classifier::provider::EmotionClassifier;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Panic hook: restore terminal even on panic in raw mode
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        default_hook(info);
    }));

    // Tracing: write to file when RUST_LOG is set (raw mode breaks stderr)
    if std::env::var("RUST_LOG").is_ok() {
        let file = std::fs::File::create("/tmp/empath.log")?;
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(fmt::layer().json().with_target(true).with_writer(file))
            .init();
    }

    let cfg = std::sync::Arc::new(empath_core::config::EmpathCfg::from_env());

    // The model handle is created once here and passed into the session;
    // classification happens over HTTP against a pretrained checkpoint.
    let classifier: std::sync::Arc<dyn EmotionClassifier> =
        std::sync::Arc::new(empath_classifier::http::from_env());
    tracing::info!(model = classifier.name(), "classifier initialized");

    let (mut session, event_tx, output_rx) =
        empath_core::session::Session::new(cfg, classifier);
    let token = session.token();

    // Run session and TUI on the same task; whichever exits first cancels
    // the other and waits for its cleanup (terminal restore / shutdown logs).
    let tui_token = token.clone();
    let session_fut = session.run();
    let tui_fut = tui::run_app(event_tx, output_rx, tui_token);
    tokio::pin!(session_fut);
    tokio::pin!(tui_fut);

    let mut session_done = false;
    let mut tui_result: Option<anyhow::Result<()>> = None;

    loop {
        tokio::select! {
            _ = &mut session_fut, if !session_done => {
                session_done = true;
                token.cancel();
                if tui_result.is_none() {
                    tui_result = Some((&mut tui_fut).await);
                }
            }
            result = &mut tui_fut, if tui_result.is_none() => {
                tui_result = Some(result);
                token.cancel();
            }
        }

        if session_done && tui_result.is_some() {
            break;
        }
    }

    tui_result.unwrap_or(Ok(()))
}
