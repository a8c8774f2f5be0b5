//! Reply text.

use entitle::{
    AccessResult, EntitlementRecord, GiveTrailOutcome, GrantType, LedgerEntry, LedgerStats,
    PrincipalId, TimeStatus, TrialOutcome, TrialRejection,
};

use crate::command::CommandKind;

/// Rows shown by `/users` before the remainder is summarized.
pub const MAX_LISTED: usize = 20;

pub const NOT_AUTHORIZED: &str = "Not authorized.";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Use /start";
pub const STORAGE_UNAVAILABLE: &str = "Storage is temporarily unavailable. Try again later.";
pub const STORED_DATA_UNREADABLE: &str = "Stored data could not be read. Ask an administrator to check the ledger.";
pub const CHECK_OWN_ONLY: &str = "You can only check your own access.";

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "ON"
    } else {
        "OFF"
    }
}

pub fn start(is_admin: bool, public_trail: bool) -> String {
    let trail = if public_trail {
        "ON (Everyone has access)"
    } else {
        "OFF"
    };
    if is_admin {
        format!(
            "*Admin Panel*\n\n\
             *Trail Status:* `{trail}`\n\
             *Commands:*\n\
             • `/add <id> <30d>` – Add user\n\
             • `/remove <id>` – Remove user\n\
             • `/givetrail <id> [duration]` – Give trail access\n\
             • `/check <id>` – Check access\n\
             • `/users` – List users\n\
             • `/trailon` – Enable public trail\n\
             • `/trailoff` – Disable public trail\n\
             • `/trialon` / `/trialoff` – Toggle trial requests\n\
             • `/trialdays <n>` – Set trial length\n\
             • `/stats` – Bot stats"
        )
    } else {
        format!(
            "*Access Bot*\n\n\
             *Trail Status:* `{trail}`\n\
             Use `/check` to see your access.\n\
             Use `/trial` to request a trial."
        )
    }
}

pub fn usage(kind: CommandKind) -> String {
    match kind {
        CommandKind::Add | CommandKind::GiveTrail => format!(
            "*Usage:* `{}`\n*Examples:* `30d`, `12h`, `6m`",
            kind.usage()
        ),
        _ => format!("*Usage:* `{}`", kind.usage()),
    }
}

pub fn trial_days_out_of_range(min: u32, max: u32) -> String {
    format!("Trial length must be between {min} and {max} days.")
}

pub fn added(principal: &PrincipalId, record: &EntitlementRecord) -> String {
    format!(
        "User `{principal}` added!\nExpires: `{}`",
        short_expiry(record)
    )
}

pub fn removed(principal: &PrincipalId, existed: bool) -> String {
    if existed {
        format!("User `{principal}` removed.")
    } else {
        "User not found.".to_string()
    }
}

pub fn check(principal: &PrincipalId, result: &AccessResult) -> String {
    match result {
        AccessResult::PublicTrail => {
            format!("User `{principal}`\n*Access:* PUBLIC TRAIL ACTIVE")
        }
        AccessResult::NotFound => format!("User `{principal}` not registered."),
        AccessResult::Granted {
            grant_type,
            expires_at,
            remaining,
        } => status_card(
            principal,
            *grant_type,
            &TimeStatus::Active(*remaining),
            &expires_at.format(entitle::core::TIMESTAMP_FORMAT).to_string(),
        ),
        AccessResult::Expired {
            grant_type,
            expires_at,
        } => status_card(
            principal,
            *grant_type,
            &TimeStatus::Expired,
            &expires_at.to_stored(),
        ),
        AccessResult::Invalid { grant_type } => {
            status_card(principal, *grant_type, &TimeStatus::Invalid, "unknown")
        }
    }
}

fn status_card(
    principal: &PrincipalId,
    grant_type: GrantType,
    status: &TimeStatus,
    expires: &str,
) -> String {
    format!(
        "*User:* `{principal}`\n\
         *Type:* `{grant_type}`\n\
         *Status:* `{}`\n\
         *Remaining:* `{}`\n\
         *Expires:* `{expires}`",
        status.state().label(),
        status.remaining_text(),
    )
}

pub fn users(entries: &[LedgerEntry]) -> String {
    if entries.is_empty() {
        return "No users.".to_string();
    }
    let mut text = String::from("*Registered Users:*");
    for entry in entries.iter().take(MAX_LISTED) {
        text.push_str(&format!(
            "\n`{}` – {} {}",
            entry.principal,
            entry.status.state().label(),
            entry.status.remaining_text()
        ));
    }
    if entries.len() > MAX_LISTED {
        text.push_str(&format!("\n... and {} more.", entries.len() - MAX_LISTED));
    }
    text
}

pub fn stats(stats: &LedgerStats) -> String {
    format!(
        "*Stats*\n\
         • Total Users: `{}`\n\
         • Active: `{}`\n\
         • Public Trail: `{}`",
        stats.total,
        stats.active,
        on_off(stats.public_trail_enabled)
    )
}

pub fn public_trail(enabled: bool) -> String {
    if enabled {
        "PUBLIC TRAIL ENABLED – Everyone has file access!".to_string()
    } else {
        "PUBLIC TRAIL DISABLED – Only registered users.".to_string()
    }
}

pub fn trial_requests(enabled: bool) -> String {
    format!("Trial requests: `{}`", on_off(enabled))
}

pub fn trial_days(days: u32) -> String {
    format!("Trial length set to `{days}` days.")
}

pub fn trial(outcome: &TrialOutcome) -> String {
    match outcome {
        TrialOutcome::Granted(record) => format!(
            "Trial activated!\nExpires: `{}`",
            short_expiry(record)
        ),
        TrialOutcome::Rejected(TrialRejection::Disabled) => {
            "Trial requests are currently closed.".to_string()
        }
        TrialOutcome::Rejected(TrialRejection::AlreadyRegistered { grant_type }) => {
            format!("You are already registered (`{grant_type}`). Trials are one per user.")
        }
    }
}

pub fn give_trail(principal: &PrincipalId, outcome: &GiveTrailOutcome) -> String {
    match outcome {
        GiveTrailOutcome::Granted { record, replaced } => {
            let mut text = format!(
                "Trail given to `{principal}`.\nExpires: `{}`",
                short_expiry(record)
            );
            if let Some(previous) = replaced {
                text.push_str(&format!("\nReplaced `{previous}` record."));
            }
            text
        }
        GiveTrailOutcome::AlreadyHeld { grant_type } => {
            format!("User `{principal}` already has `{grant_type}` access. Nothing changed.")
        }
    }
}

fn short_expiry(record: &EntitlementRecord) -> String {
    match record.expires_at.instant() {
        Some(instant) => instant.format("%Y-%m-%d %H:%M").to_string(),
        None => record.expires_at.to_stored(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use entitle::core::Remaining;

    fn pid(id: &str) -> PrincipalId {
        PrincipalId::new(id).unwrap()
    }

    #[test]
    fn test_check_granted_card() {
        let expires_at = Utc.with_ymd_and_hms(2024, 8, 1, 12, 30, 0).unwrap();
        let text = check(
            &pid("42"),
            &AccessResult::Granted {
                grant_type: GrantType::Premium,
                expires_at,
                remaining: Remaining {
                    days: 2,
                    hours: 3,
                    minutes: 15,
                },
            },
        );
        assert!(text.contains("*Type:* `premium`"));
        assert!(text.contains("*Status:* `ACTIVE`"));
        assert!(text.contains("*Remaining:* `2d 3h`"));
        assert!(text.contains("*Expires:* `2024-08-01 12:30:00`"));
    }

    #[test]
    fn test_users_truncates_listing() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let entries: Vec<_> = (0..25)
            .map(|i| {
                let record =
                    EntitlementRecord::new(GrantType::Trial, now, now + Duration::hours(1));
                LedgerEntry {
                    principal: pid(&format!("u{i:02}")),
                    status: record.status_at(now),
                    record,
                }
            })
            .collect();

        let text = users(&entries);
        assert_eq!(text.lines().count(), 1 + MAX_LISTED + 1);
        assert!(text.ends_with("... and 5 more."));
        assert!(text.contains("`u00` – ACTIVE 1h"));
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(users(&[]), "No users.");
    }
}
