//! Interactive session loop.
//!
//! One stateless turn per submission: classify, threshold, pick a response,
//! emit. Nothing persists across turns beyond the classifier handle and the
//! immutable response table.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::EmpathCfg;
use crate::io::input::{InputReceiver, InputSender};
use crate::io::output::{OutputMessage, OutputReceiver, OutputSender, Reply};
use crate::types::InputEvent;
use crate::{detect, respond};
use empath_classifier::provider::EmotionClassifier;

/// Manages graceful shutdown via CancellationToken.
/// Listens for SIGTERM and cancels the token.
#[derive(Debug)]
pub struct ShutdownGuard {
    token: CancellationToken,
}

impl ShutdownGuard {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// The cancellation token that all tasks should monitor.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Spawn a background task that listens for OS signals and triggers cancellation.
    pub fn spawn_signal_listener(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            #[cfg(unix)]
            {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        let _ = sigterm.recv().await;
                        tracing::info!("received SIGTERM, initiating shutdown");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to register SIGTERM handler");
                        return;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                let _ = signal::ctrl_c().await;
                tracing::info!("received Ctrl+C, initiating shutdown");
            }
            token.cancel();
        });
    }
}

impl Default for ShutdownGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Core session that serves classification turns.
///
/// The classifier handle is created once at startup and passed in explicitly;
/// the session never loads model state of its own.
pub struct Session {
    cfg: Arc<EmpathCfg>,
    shutdown: ShutdownGuard,
    event_rx: InputReceiver,
    output_tx: OutputSender,
    classifier: Arc<dyn EmotionClassifier>,
    turn_count: u64,
}

impl Session {
    /// Create a new Session. Returns (Session, input_sender, output_receiver).
    /// Send `InputEvent`s into the sender to drive turns; consume
    /// `OutputMessage`s from the receiver for the results.
    pub fn new(
        cfg: Arc<EmpathCfg>,
        classifier: Arc<dyn EmotionClassifier>,
    ) -> (Self, InputSender, OutputReceiver) {
        let (tx, rx) = crate::io::input::channel(cfg.input_buffer);
        let (output_tx, output_rx) = crate::io::output::channel(cfg.output_buffer);
        let session = Self {
            cfg,
            shutdown: ShutdownGuard::new(),
            event_rx: rx,
            output_tx,
            classifier,
            turn_count: 0,
        };
        (session, tx, output_rx)
    }

    /// Returns the cancellation token for coordinating with frontends.
    pub fn token(&self) -> CancellationToken {
        self.shutdown.token()
    }

    /// Start the signal listener and serve turns until cancelled or the
    /// input channel closes.
    pub async fn run(&mut self) {
        self.shutdown.spawn_signal_listener();
        let token = self.shutdown.token();

        tracing::info!(classifier = self.classifier.name(), "empath session started");

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!(turn_count = self.turn_count, "shutdown signal received, exiting session loop");
                    break;
                },
                event = self.event_rx.recv() => {
                    let Some(event) = event else {
                        tracing::info!("input channel closed, exiting session loop");
                        break;
                    };
                    self.serve_turn(event).await;
                },
            }
        }

        tracing::info!("empath session stopped");
    }

    /// One turn: classify, threshold, select a response, emit.
    async fn serve_turn(&mut self, event: InputEvent) {
        if event.content.trim().is_empty() {
            // Whitespace-only input never reaches the classifier.
            tracing::debug!(event_id = %event.id, "empty submission skipped");
            return;
        }

        self.turn_count += 1;
        let span = tracing::info_span!("turn", n = self.turn_count, event_id = %event.id);
        self.classify_and_reply(&event).instrument(span).await;
    }

    async fn classify_and_reply(&self, event: &InputEvent) {
        let timeout = Duration::from_secs(self.cfg.request_timeout_secs);
        let detected = tokio::time::timeout(
            timeout,
            detect::detect(
                self.classifier.as_ref(),
                &event.content,
                self.cfg.confidence_threshold,
            ),
        )
        .await;

        let detection = match detected {
            Ok(Ok(detection)) => detection,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "classification failed");
                self.send(OutputMessage::Failure(format!("[classifier error] {e}")));
                return;
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.cfg.request_timeout_secs,
                    "classification timed out"
                );
                self.send(OutputMessage::Failure(format!(
                    "[classifier error] request timed out after {}s",
                    self.cfg.request_timeout_secs
                )));
                return;
            }
        };

        let response = respond::pick(&detection.label);
        tracing::info!(
            label = %detection.label,
            confidence = detection.confidence,
            "turn served"
        );

        self.send(OutputMessage::Reply(Reply {
            detection,
            response: response.to_owned(),
        }));
    }

    /// Push a message to the output channel, logging if full.
    fn send(&self, message: OutputMessage) {
        if self.output_tx.try_send(message).is_err() {
            tracing::warn!("output channel full, message dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::input::submit_text;
    use empath_classifier::provider::{ClassifierError, EmotionScore, MockClassifier};
    use std::future::Future;
    use std::pin::Pin;

    struct FailingClassifier;

    impl EmotionClassifier for FailingClassifier {
        fn name(&self) -> &str {
            "failing"
        }

        fn classify(
            &self,
            _text: &str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<EmotionScore>, ClassifierError>> + Send + '_>>
        {
            Box::pin(async { Err(ClassifierError::Unavailable("model offline".into())) })
        }
    }

    fn spawn_session(
        classifier: Arc<dyn EmotionClassifier>,
    ) -> (InputSender, OutputReceiver, CancellationToken) {
        let cfg = Arc::new(EmpathCfg::default());
        let (mut session, tx, rx) = Session::new(cfg, classifier);
        let token = session.token();
        tokio::spawn(async move { session.run().await });
        (tx, rx, token)
    }

    #[tokio::test]
    async fn turn_produces_reply_from_label_list() {
        let mock = Arc::new(MockClassifier::new(&[
            ("joy", 0.82),
            ("sadness", 0.1),
            ("anger", 0.05),
            ("neutral", 0.03),
        ]));
        let (tx, mut rx, token) = spawn_session(mock);

        submit_text(&tx, "today was wonderful").await.unwrap();
        match rx.recv().await.unwrap() {
            OutputMessage::Reply(reply) => {
                assert_eq!(reply.detection.label, "joy");
                assert!((reply.detection.confidence - 0.82).abs() < f32::EPSILON);
                assert_eq!(reply.detection.scores.len(), 4);
                assert!(
                    respond::candidates("joy").unwrap().contains(&reply.response.as_str())
                );
            }
            other => panic!("expected reply, got {other:?}"),
        }
        token.cancel();
    }

    #[tokio::test]
    async fn whitespace_submission_is_ignored() {
        let mock = Arc::new(MockClassifier::new(&[("joy", 0.9)]));
        let (tx, mut rx, token) = spawn_session(mock);

        submit_text(&tx, "   \t  ").await.unwrap();
        submit_text(&tx, "real input").await.unwrap();

        // The only output must come from the non-empty submission.
        match rx.recv().await.unwrap() {
            OutputMessage::Reply(reply) => assert_eq!(reply.detection.label, "joy"),
            other => panic!("expected reply, got {other:?}"),
        }
        token.cancel();
    }

    #[tokio::test]
    async fn classifier_failure_surfaces_as_failure_message() {
        let (tx, mut rx, token) = spawn_session(Arc::new(FailingClassifier));

        submit_text(&tx, "hello?").await.unwrap();
        match rx.recv().await.unwrap() {
            OutputMessage::Failure(msg) => {
                assert!(msg.contains("model offline"), "got: {msg}");
            }
            other => panic!("expected failure, got {other:?}"),
        }

        // The session keeps serving after a failed interaction.
        token.cancel();
    }

    #[tokio::test]
    async fn sub_threshold_turn_reports_neutral() {
        let mock = Arc::new(MockClassifier::new(&[
            ("joy", 0.3),
            ("sadness", 0.25),
            ("anger", 0.25),
            ("neutral", 0.2),
        ]));
        let (tx, mut rx, token) = spawn_session(mock);

        submit_text(&tx, "it is a day").await.unwrap();
        match rx.recv().await.unwrap() {
            OutputMessage::Reply(reply) => {
                assert_eq!(reply.detection.label, "neutral");
                assert_eq!(reply.detection.confidence, 0.0);
                assert!(
                    respond::candidates("neutral")
                        .unwrap()
                        .contains(&reply.response.as_str())
                );
            }
            other => panic!("expected reply, got {other:?}"),
        }
        token.cancel();
    }
}
