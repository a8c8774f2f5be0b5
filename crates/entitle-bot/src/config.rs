use std::collections::HashSet;
use std::time::Duration;

use config::{builder::DefaultState, ConfigBuilder};
use entitle::PrincipalId;
use serde::Deserialize;

use crate::error::{BotError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Comma-separated administrator ids, e.g. "5316048641,5819790024"
    #[serde(default)]
    pub admin_ids: String,

    /// SQLite file holding records and settings (default "entitle.db")
    #[serde(default = "default_ledger_db_path")]
    pub ledger_db_path: String,

    /// Seconds to wait before reconnecting after a transport failure
    #[serde(default = "default_restart_backoff_secs")]
    pub restart_backoff_secs: u64,

    /// This bot's handle, without the `@`. Commands addressed to other
    /// handles are ignored.
    pub bot_name: Option<String>,
}

impl BotConfig {
    /// Load from the environment, after reading an optional `.env`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::build(config::Config::builder().add_source(config::Environment::default()))
    }

    pub fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let cfg: BotConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.admins()?.is_empty() {
            tracing::warn!("ADMIN_IDS is empty; administrative commands are disabled");
        }
        Ok(())
    }

    pub fn admins(&self) -> Result<HashSet<PrincipalId>> {
        self.admin_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                PrincipalId::new(id)
                    .map_err(|e| BotError::Config(format!("bad admin id {id:?}: {e}")))
            })
            .collect()
    }

    pub fn restart_backoff(&self) -> Duration {
        Duration::from_secs(self.restart_backoff_secs)
    }
}

fn default_ledger_db_path() -> String {
    "entitle.db".to_string()
}

fn default_restart_backoff_secs() -> u64 {
    15
}
