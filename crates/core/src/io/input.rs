use tokio::sync::mpsc;

use crate::types::InputEvent;

/// Input channel sender. Frontends push user submissions here.
pub type InputSender = mpsc::Sender<InputEvent>;
/// Input channel receiver. The session consumes from here.
pub type InputReceiver = mpsc::Receiver<InputEvent>;

/// Create an input channel with the given buffer size.
pub fn channel(buffer: usize) -> (InputSender, InputReceiver) {
    mpsc::channel(buffer)
}

/// Submit user text as an input event.
pub async fn submit_text(
    tx: &InputSender,
    text: impl Into<String>,
) -> Result<(), mpsc::error::SendError<InputEvent>> {
    tx.send(InputEvent::new(text)).await
}
