//! Transport abstraction for the command layer.
//!
//! The transport delivers inbound text messages and carries replies back.
//! Implementations may wrap a chat API, a socket, or a terminal.

use async_trait::async_trait;
use entitle::PrincipalId;

use crate::error::Result;

/// One inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Transport-assigned id, unique per connection.
    pub id: u64,
    /// Who sent it.
    pub sender: PrincipalId,
    pub text: String,
}

/// Transport trait for receiving commands and sending replies.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// (Re)establish the connection. Called before the first receive and
    /// after every failure.
    async fn connect(&self) -> Result<()>;

    /// Receive the next message. `Ok(None)` means the source is closed for
    /// good and the receive loop should stop.
    ///
    /// Must be cancel-safe: dropping the future must not lose a message.
    async fn next_message(&self) -> Result<Option<InboundMessage>>;

    /// Reply to a previously received message.
    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<()>;
}

/// A channel-backed transport for testing.
pub mod memory {
    use super::*;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::{mpsc, Mutex};

    use crate::error::BotError;

    enum Inbound {
        Message(PrincipalId, String),
        Fail(String),
    }

    /// A reply captured by the transport.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Reply {
        pub to: PrincipalId,
        pub in_reply_to: u64,
        pub text: String,
    }

    /// In-memory transport implementation.
    pub struct MemoryTransport {
        inbound: Mutex<mpsc::UnboundedReceiver<Inbound>>,
        replies: mpsc::UnboundedSender<Reply>,
        next_id: AtomicU64,
        connects: Arc<AtomicUsize>,
    }

    /// The test side of a [`MemoryTransport`].
    pub struct MemoryHandle {
        inbound: Option<mpsc::UnboundedSender<Inbound>>,
        replies: mpsc::UnboundedReceiver<Reply>,
        connects: Arc<AtomicUsize>,
    }

    impl MemoryTransport {
        /// Create a connected transport / handle pair.
        pub fn new() -> (Self, MemoryHandle) {
            let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
            let (reply_tx, reply_rx) = mpsc::unbounded_channel();
            let connects = Arc::new(AtomicUsize::new(0));
            let transport = Self {
                inbound: Mutex::new(inbound_rx),
                replies: reply_tx,
                next_id: AtomicU64::new(1),
                connects: Arc::clone(&connects),
            };
            let handle = MemoryHandle {
                inbound: Some(inbound_tx),
                replies: reply_rx,
                connects,
            };
            (transport, handle)
        }
    }

    #[async_trait]
    impl MessageTransport for MemoryTransport {
        async fn connect(&self) -> Result<()> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn next_message(&self) -> Result<Option<InboundMessage>> {
            let mut rx = self.inbound.lock().await;
            match rx.recv().await {
                Some(Inbound::Message(sender, text)) => Ok(Some(InboundMessage {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    sender,
                    text,
                })),
                Some(Inbound::Fail(reason)) => Err(BotError::Transport(reason)),
                None => Ok(None),
            }
        }

        async fn reply(&self, to: &InboundMessage, text: &str) -> Result<()> {
            self.replies
                .send(Reply {
                    to: to.sender.clone(),
                    in_reply_to: to.id,
                    text: text.to_string(),
                })
                .map_err(|_| BotError::Transport("reply channel closed".into()))
        }
    }

    impl MemoryHandle {
        /// Queue a message from `sender`.
        pub fn send(&self, sender: &PrincipalId, text: &str) {
            if let Some(tx) = &self.inbound {
                let _ = tx.send(Inbound::Message(sender.clone(), text.to_string()));
            }
        }

        /// Make the transport's next receive fail.
        pub fn inject_failure(&self, reason: &str) {
            if let Some(tx) = &self.inbound {
                let _ = tx.send(Inbound::Fail(reason.to_string()));
            }
        }

        /// Close the inbound side. Queued messages are still delivered.
        pub fn close(&mut self) {
            self.inbound = None;
        }

        /// Wait for the next reply.
        pub async fn next_reply(&mut self) -> Option<Reply> {
            self.replies.recv().await
        }

        /// How many times the transport was connected.
        pub fn connect_count(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }
}

/// A line-oriented transport over any async reader and writer.
///
/// Each input line is `<user-id> <text>`. Replies are written as
/// `[<user-id>] <text>`, one line per reply line.
pub mod console {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
    use tokio::sync::Mutex;
    use tracing::{debug, warn};

    /// Console transport implementation.
    pub struct ConsoleTransport<R, W> {
        lines: Mutex<Lines<BufReader<R>>>,
        output: Mutex<W>,
        next_id: AtomicU64,
    }

    impl ConsoleTransport<io::Stdin, io::Stdout> {
        /// Read from stdin, write to stdout.
        pub fn stdio() -> Self {
            Self::new(io::stdin(), io::stdout())
        }
    }

    impl<R, W> ConsoleTransport<R, W>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        pub fn new(input: R, output: W) -> Self {
            Self {
                lines: Mutex::new(BufReader::new(input).lines()),
                output: Mutex::new(output),
                next_id: AtomicU64::new(1),
            }
        }
    }

    /// Split a console line into sender and text.
    pub fn parse_line(line: &str) -> Option<(PrincipalId, String)> {
        let (sender, text) = line.trim().split_once(char::is_whitespace)?;
        let sender = PrincipalId::new(sender).ok()?;
        Some((sender, text.trim().to_string()))
    }

    #[async_trait]
    impl<R, W> MessageTransport for ConsoleTransport<R, W>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        async fn connect(&self) -> Result<()> {
            debug!("console transport ready");
            Ok(())
        }

        async fn next_message(&self) -> Result<Option<InboundMessage>> {
            let mut lines = self.lines.lock().await;
            while let Some(line) = lines.next_line().await? {
                if line.trim().is_empty() {
                    continue;
                }
                match parse_line(&line) {
                    Some((sender, text)) => {
                        return Ok(Some(InboundMessage {
                            id: self.next_id.fetch_add(1, Ordering::SeqCst),
                            sender,
                            text,
                        }))
                    }
                    None => warn!(line = %line, "expected `<user-id> <text>`, skipping"),
                }
            }
            Ok(None)
        }

        async fn reply(&self, to: &InboundMessage, text: &str) -> Result<()> {
            let mut out = String::new();
            for line in text.lines() {
                out.push_str(&format!("[{}] {}\n", to.sender, line));
            }
            let mut output = self.output.lock().await;
            output.write_all(out.as_bytes()).await?;
            output.flush().await?;
            Ok(())
        }
    }

}
