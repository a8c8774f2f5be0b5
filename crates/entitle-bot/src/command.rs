//! Command tokenizing.
//!
//! A command is `/name arg arg ...`. The name may carry an `@botname` suffix,
//! which is dropped when it names this bot (or when no bot name is
//! configured). Anything else is [`CommandKind::Unknown`].

use std::fmt;

/// The commands the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Start,
    Check,
    Trial,
    Add,
    Remove,
    GiveTrail,
    Users,
    Stats,
    TrailOn,
    TrailOff,
    TrialOn,
    TrialOff,
    TrialDays,
    /// Plain text, an unrecognized name, or a command for another bot.
    Unknown,
}

impl CommandKind {
    pub const ALL: [CommandKind; 13] = [
        CommandKind::Start,
        CommandKind::Check,
        CommandKind::Trial,
        CommandKind::Add,
        CommandKind::Remove,
        CommandKind::GiveTrail,
        CommandKind::Users,
        CommandKind::Stats,
        CommandKind::TrailOn,
        CommandKind::TrailOff,
        CommandKind::TrialOn,
        CommandKind::TrialOff,
        CommandKind::TrialDays,
    ];

    /// Name as typed after the slash.
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Start => "start",
            CommandKind::Check => "check",
            CommandKind::Trial => "trial",
            CommandKind::Add => "add",
            CommandKind::Remove => "remove",
            CommandKind::GiveTrail => "givetrail",
            CommandKind::Users => "users",
            CommandKind::Stats => "stats",
            CommandKind::TrailOn => "trailon",
            CommandKind::TrailOff => "trailoff",
            CommandKind::TrialOn => "trialon",
            CommandKind::TrialOff => "trialoff",
            CommandKind::TrialDays => "trialdays",
            CommandKind::Unknown => "unknown",
        }
    }

    fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .unwrap_or(CommandKind::Unknown)
    }

    /// Whether only administrators may run this command.
    ///
    /// `/check` is decided per invocation: checking someone else is
    /// administrative, checking yourself is not.
    pub fn requires_admin(&self) -> bool {
        !matches!(
            self,
            CommandKind::Start | CommandKind::Check | CommandKind::Trial | CommandKind::Unknown
        )
    }

    /// Argument synopsis shown in usage hints.
    pub fn usage(&self) -> &'static str {
        match self {
            CommandKind::Check => "/check [id]",
            CommandKind::Add => "/add <id> <30d>",
            CommandKind::Remove => "/remove <id>",
            CommandKind::GiveTrail => "/givetrail <id> [duration]",
            CommandKind::TrialDays => "/trialdays <1-365>",
            CommandKind::Start => "/start",
            CommandKind::Trial => "/trial",
            CommandKind::Users => "/users",
            CommandKind::Stats => "/stats",
            CommandKind::TrailOn => "/trailon",
            CommandKind::TrailOff => "/trailoff",
            CommandKind::TrialOn => "/trialon",
            CommandKind::TrialOff => "/trialoff",
            CommandKind::Unknown => "/start",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name())
    }
}

/// A tokenized inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub args: Vec<String>,
}

impl Command {
    /// Tokenize `text`. `bot_name` is this bot's handle, without the `@`.
    pub fn parse(text: &str, bot_name: Option<&str>) -> Self {
        let mut tokens = text.split_whitespace();
        let Some(head) = tokens.next().and_then(|t| t.strip_prefix('/')) else {
            return Self::unknown();
        };

        let name = match head.split_once('@') {
            Some((name, mention)) => match bot_name {
                Some(ours) if !mention.eq_ignore_ascii_case(ours) => return Self::unknown(),
                _ => name,
            },
            None => head,
        };

        Self {
            kind: CommandKind::from_name(&name.to_ascii_lowercase()),
            args: tokens.map(str::to_string).collect(),
        }
    }

    fn unknown() -> Self {
        Self {
            kind: CommandKind::Unknown,
            args: Vec::new(),
        }
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}
