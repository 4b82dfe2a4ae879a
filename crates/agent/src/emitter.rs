//! Ordered, unbatched event delivery to the waiting client.

use cowork_core::Error;
use tokio::sync::mpsc;

use crate::stream_event::StreamEvent;

/// Events buffered between the loop and a slow client.
pub const EVENT_BUFFER: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("event stream closed by receiver")]
    Closed,
}

impl From<EmitError> for Error {
    fn from(_: EmitError) -> Self {
        Error::StreamClosed
    }
}

/// Sends one request's events, in order, to its client transport.
///
/// `finish` and `fail` consume the emitter, so nothing can be sent after a
/// terminal event.
#[derive(Debug)]
pub struct StreamEmitter {
    tx: mpsc::Sender<StreamEvent>,
}

impl StreamEmitter {
    pub fn new(tx: mpsc::Sender<StreamEvent>) -> Self {
        Self { tx }
    }

    /// A connected emitter/receiver pair.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }

    pub async fn emit(&self, event: StreamEvent) -> Result<(), EmitError> {
        self.tx.send(event).await.map_err(|_| EmitError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the receiver has gone away.
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    /// Emit the final answer, then `done`.
    pub async fn finish(self, text: impl Into<String>) -> Result<(), EmitError> {
        self.emit(StreamEvent::Text { text: text.into() }).await?;
        self.emit(StreamEvent::Done).await
    }

    /// Emit a terminal `error`.
    pub async fn fail(self, message: impl Into<String>) -> Result<(), EmitError> {
        self.emit(StreamEvent::Error {
            error: message.into(),
        })
        .await
    }
}
