//! Command dispatch: authorization, ledger calls and reply rendering.

use std::collections::HashSet;
use std::sync::Arc;

use entitle::core::{Clock, SystemClock, ValidationError};
use entitle::store::LedgerStore;
use entitle::{Ledger, LedgerError, PrincipalId};
use tracing::{debug, error, warn};

use crate::command::{Command, CommandKind};
use crate::error::{BotError, Result};
use crate::render;
use crate::transport::InboundMessage;

/// Turns inbound messages into ledger calls and reply text.
pub struct Dispatcher<S: LedgerStore, C: Clock = SystemClock> {
    ledger: Arc<Ledger<S, C>>,
    admins: HashSet<PrincipalId>,
    bot_name: Option<String>,
}

impl<S: LedgerStore, C: Clock> Dispatcher<S, C> {
    pub fn new(ledger: Arc<Ledger<S, C>>, admins: impl IntoIterator<Item = PrincipalId>) -> Self {
        Self {
            ledger,
            admins: admins.into_iter().collect(),
            bot_name: None,
        }
    }

    /// Accept `/command@name` mentions of this bot.
    pub fn with_bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = Some(name.into());
        self
    }

    pub fn ledger(&self) -> &Ledger<S, C> {
        &self.ledger
    }

    pub fn is_admin(&self, principal: &PrincipalId) -> bool {
        self.admins.contains(principal)
    }

    /// Handle one message and produce the reply. Never fails: every error is
    /// rendered into reply text.
    pub async fn handle(&self, message: &InboundMessage) -> String {
        let command = Command::parse(&message.text, self.bot_name.as_deref());
        debug!(sender = %message.sender, command = %command.kind, "dispatching");

        match self.execute(&message.sender, &command).await {
            Ok(reply) => reply,
            Err(BotError::NotAuthorized) => {
                warn!(sender = %message.sender, command = %command.kind, "unauthorized command");
                render::NOT_AUTHORIZED.to_string()
            }
            Err(BotError::Usage(kind)) => render::usage(kind),
            Err(BotError::Ledger(LedgerError::Validation(
                ValidationError::TrialDurationOutOfRange { min, max, .. },
            ))) => render::trial_days_out_of_range(min, max),
            Err(BotError::Ledger(LedgerError::CorruptData(e))) => {
                error!(sender = %message.sender, command = %command.kind, error = %e, "stored data unreadable");
                render::STORED_DATA_UNREADABLE.to_string()
            }
            Err(BotError::Ledger(e)) if !e.is_transient() => render::usage(command.kind),
            Err(e) => {
                error!(sender = %message.sender, command = %command.kind, error = %e, "command failed");
                render::STORAGE_UNAVAILABLE.to_string()
            }
        }
    }

    async fn execute(&self, sender: &PrincipalId, command: &Command) -> Result<String> {
        let kind = command.kind;
        if kind.requires_admin() && !self.is_admin(sender) {
            return Err(BotError::NotAuthorized);
        }

        let ledger = &self.ledger;
        match kind {
            CommandKind::Start => {
                let public_trail = ledger.settings().public_trail_enabled().await?;
                Ok(render::start(self.is_admin(sender), public_trail))
            }
            CommandKind::Check => {
                let target = match command.arg(0) {
                    Some(id) if !self.is_admin(sender) => {
                        warn!(sender = %sender, requested = id, "non-admin checked another principal");
                        return Ok(render::CHECK_OWN_ONLY.to_string());
                    }
                    Some(id) => principal_arg(kind, id)?,
                    None => sender.clone(),
                };
                let result = ledger.evaluate(&target).await?;
                Ok(render::check(&target, &result))
            }
            CommandKind::Trial => {
                let outcome = ledger.request_trial(sender).await?;
                Ok(render::trial(&outcome))
            }
            CommandKind::Add => {
                let (id, token) = match command.args.as_slice() {
                    [id, token] => (principal_arg(kind, id)?, token),
                    _ => return Err(BotError::Usage(kind)),
                };
                let record = ledger.grant(&id, token, Some(&issuer(sender))).await?;
                Ok(render::added(&id, &record))
            }
            CommandKind::Remove => {
                let id = match command.args.as_slice() {
                    [id] => principal_arg(kind, id)?,
                    _ => return Err(BotError::Usage(kind)),
                };
                let existed = ledger.revoke(&id).await?;
                Ok(render::removed(&id, existed))
            }
            CommandKind::GiveTrail => {
                let (id, token) = match command.args.as_slice() {
                    [id] => (principal_arg(kind, id)?, None),
                    [id, token] => (principal_arg(kind, id)?, Some(token.as_str())),
                    _ => return Err(BotError::Usage(kind)),
                };
                let outcome = ledger.give_trail(&id, token, Some(&issuer(sender))).await?;
                Ok(render::give_trail(&id, &outcome))
            }
            CommandKind::Users => {
                let entries = ledger.entries().await?;
                Ok(render::users(&entries))
            }
            CommandKind::Stats => {
                let stats = ledger.stats().await?;
                Ok(render::stats(&stats))
            }
            CommandKind::TrailOn | CommandKind::TrailOff => {
                let enabled = kind == CommandKind::TrailOn;
                ledger.settings().set_public_trail_enabled(enabled).await?;
                Ok(render::public_trail(enabled))
            }
            CommandKind::TrialOn | CommandKind::TrialOff => {
                let enabled = kind == CommandKind::TrialOn;
                ledger.settings().set_trial_request_enabled(enabled).await?;
                Ok(render::trial_requests(enabled))
            }
            CommandKind::TrialDays => {
                let days = match command.args.as_slice() {
                    [days] => days.parse::<i64>().map_err(|_| BotError::Usage(kind))?,
                    _ => return Err(BotError::Usage(kind)),
                };
                let days = ledger.settings().set_trial_duration_days(days).await?;
                Ok(render::trial_days(days))
            }
            CommandKind::Unknown => Ok(render::UNKNOWN_COMMAND.to_string()),
        }
    }
}

fn principal_arg(kind: CommandKind, id: &str) -> Result<PrincipalId> {
    PrincipalId::new(id).map_err(|_| BotError::Usage(kind))
}

fn issuer(sender: &PrincipalId) -> String {
    format!("admin:{sender}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use entitle::store::{EntitlementStore, MemoryStore};
    use entitle::LedgerConfig;
    use entitle_testkit::FaultyStore;

    fn dispatcher() -> Dispatcher<MemoryStore> {
        let ledger = Ledger::new(MemoryStore::new(), LedgerConfig::default());
        Dispatcher::new(Arc::new(ledger), [PrincipalId::from(1u64)])
    }

    fn message(sender: u64, text: &str) -> InboundMessage {
        InboundMessage {
            id: 1,
            sender: PrincipalId::from(sender),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_admin_commands_need_admin() {
        let dispatcher = dispatcher();
        for text in ["/add 5 30d", "/remove 5", "/users", "/stats", "/trailon", "/trialdays 5"] {
            assert_eq!(dispatcher.handle(&message(2, text)).await, "Not authorized.");
        }
        // Rejected before any write.
        assert!(!dispatcher
            .ledger()
            .settings()
            .public_trail_enabled()
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_authorization_precedes_usage() {
        let dispatcher = dispatcher();
        assert_eq!(dispatcher.handle(&message(2, "/add")).await, "Not authorized.");
        assert!(dispatcher
            .handle(&message(1, "/add"))
            .await
            .starts_with("*Usage:* `/add <id> <30d>`"));
    }

    #[tokio::test]
    async fn test_bad_duration_gets_usage_hint() {
        let dispatcher = dispatcher();
        let reply = dispatcher.handle(&message(1, "/add 5 30x")).await;
        assert!(reply.contains("*Examples:*"));
    }

    #[tokio::test]
    async fn test_unknown_input() {
        let dispatcher = dispatcher();
        assert_eq!(
            dispatcher.handle(&message(2, "hello")).await,
            "Unknown command. Use /start"
        );
        assert_eq!(
            dispatcher.handle(&message(1, "/nope")).await,
            "Unknown command. Use /start"
        );
    }

    #[tokio::test]
    async fn test_check_other_principal_is_admin_only() {
        let dispatcher = dispatcher();
        assert_eq!(
            dispatcher.handle(&message(2, "/check 3")).await,
            "You can only check your own access."
        );
        assert_eq!(
            dispatcher.handle(&message(2, "/check")).await,
            "User `2` not registered."
        );
        assert_eq!(
            dispatcher.handle(&message(1, "/check 3")).await,
            "User `3` not registered."
        );
    }

    #[tokio::test]
    async fn test_trial_days_range_message() {
        let dispatcher = dispatcher();
        assert_eq!(
            dispatcher.handle(&message(1, "/trialdays 400")).await,
            "Trial length must be between 1 and 365 days."
        );
        assert_eq!(
            dispatcher.handle(&message(1, "/trialdays ten")).await,
            "*Usage:* `/trialdays <1-365>`"
        );
        assert_eq!(
            dispatcher.handle(&message(1, "/trialdays 10")).await,
            "Trial length set to `10` days."
        );
    }

    #[tokio::test]
    async fn test_storage_outage_is_reported_and_recovers() {
        let ledger = Arc::new(Ledger::new(FaultyStore::default(), LedgerConfig::default()));
        let dispatcher = Dispatcher::new(Arc::clone(&ledger), [PrincipalId::from(1u64)]);

        ledger.store().set_failing(true);
        for (sender, text) in [(2, "/check"), (1, "/add 5 30d"), (1, "/stats"), (2, "/start")] {
            assert_eq!(
                dispatcher.handle(&message(sender, text)).await,
                "Storage is temporarily unavailable. Try again later."
            );
        }
        assert_eq!(ledger.store().inner().list_all().await.unwrap().len(), 0);

        ledger.store().set_failing(false);
        assert!(dispatcher
            .handle(&message(1, "/add 5 30d"))
            .await
            .starts_with("User `5` added!"));
    }
}
