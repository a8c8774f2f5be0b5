//! The supervised receive loop.
//!
//! Messages are handled as independent tasks. A transport failure drops the
//! connection, waits a fixed back-off and reconnects; ledger state lives in
//! the store and is untouched by restarts.

use std::sync::Arc;
use std::time::Duration;

use entitle::core::Clock;
use entitle::store::LedgerStore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::transport::{InboundMessage, MessageTransport};

/// Default wait between a transport failure and the reconnect.
pub const DEFAULT_RESTART_BACKOFF: Duration = Duration::from_secs(15);

/// Runs a transport against a dispatcher until the transport closes.
pub struct Supervisor<T, S: LedgerStore, C: Clock> {
    transport: Arc<T>,
    dispatcher: Arc<Dispatcher<S, C>>,
    backoff: Duration,
}

impl<T, S, C> Supervisor<T, S, C>
where
    T: MessageTransport + 'static,
    S: LedgerStore + 'static,
    C: Clock + 'static,
{
    pub fn new(transport: Arc<T>, dispatcher: Arc<Dispatcher<S, C>>) -> Self {
        Self {
            transport,
            dispatcher,
            backoff: DEFAULT_RESTART_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Receive and dispatch until the transport reports it is closed.
    ///
    /// Failures never end the loop; only a clean close does. In-flight
    /// messages are allowed to finish before this returns.
    pub async fn run(&self) {
        let mut tasks = JoinSet::new();
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            info!(attempt, "starting receive loop");
            match self.receive(&mut tasks).await {
                Ok(()) => {
                    info!("transport closed");
                    break;
                }
                Err(e) => {
                    error!(error = %e, backoff_secs = self.backoff.as_secs(), "receive loop failed, restarting");
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }
    }

    async fn receive(&self, tasks: &mut JoinSet<()>) -> Result<()> {
        self.transport.connect().await?;

        loop {
            tokio::select! {
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => log_join(joined),
                message = self.transport.next_message() => match message? {
                    Some(message) => self.spawn(tasks, message),
                    None => return Ok(()),
                },
            }
        }
    }

    fn spawn(&self, tasks: &mut JoinSet<()>, message: InboundMessage) {
        let transport = Arc::clone(&self.transport);
        let dispatcher = Arc::clone(&self.dispatcher);
        tasks.spawn(async move {
            let reply = dispatcher.handle(&message).await;
            if let Err(e) = transport.reply(&message, &reply).await {
                warn!(message_id = message.id, sender = %message.sender, error = %e, "failed to send reply");
            } else {
                debug!(message_id = message.id, "replied");
            }
        });
    }
}

fn log_join(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "message task panicked");
    }
}
