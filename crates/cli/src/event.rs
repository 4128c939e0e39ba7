use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};
use tokio::sync::mpsc;

/// Events consumed by the TUI main loop.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Terminal resized; triggers a redraw so the chart re-fits.
    Resize,
}

/// Spawn crossterm event reader in a dedicated thread.
/// Returns a receiver of `AppEvent`. The thread exits when `stop` is set to true.
pub fn spawn(stop: Arc<AtomicBool>) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            // 50ms poll is fast enough for responsive input, low CPU
            if !event::poll(Duration::from_millis(50)).unwrap_or(false) {
                continue;
            }
            let app_event = match event::read() {
                Ok(Event::Key(key)) => AppEvent::Key(key),
                Ok(Event::Resize(_, _)) => AppEvent::Resize,
                _ => continue,
            };
            if tx.send(app_event).is_err() {
                break;
            }
        }
    });
    rx
}
