use tokio::sync::mpsc;

use crate::types::Detection;

/// A completed turn: the resolved emotion plus the chosen response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub detection: Detection,
    pub response: String,
}

/// An outbound message to deliver to the frontend.
#[derive(Debug, Clone)]
pub enum OutputMessage {
    Reply(Reply),
    /// The classification collaborator failed; this interaction is lost.
    Failure(String),
}

/// Output channel sender. The session pushes turn results here.
pub type OutputSender = mpsc::Sender<OutputMessage>;
/// Output channel receiver. Frontends consume from here.
pub type OutputReceiver = mpsc::Receiver<OutputMessage>;

/// Create an output channel with the given buffer size.
pub fn channel(buffer: usize) -> (OutputSender, OutputReceiver) {
    mpsc::channel(buffer)
}
