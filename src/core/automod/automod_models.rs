// AutoMod domain models - data structures for the moderation pipeline.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer converts these into Discord-specific actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutomodError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// How bad a violation is. Severity decides the escalation path:
/// Low = delete only, Medium = delete + warn, High = delete + warn +
/// immediate short timeout on top of the warn flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// The output of the detector cascade: at most one per message.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub reason: String,
    pub severity: Severity,
}

impl Violation {
    pub fn new(reason: impl Into<String>, severity: Severity) -> Self {
        Self {
            reason: reason.into(),
            severity,
        }
    }
}

/// What to do when active warns reach `max_warns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarnAction {
    Mute,
    Kick,
    Ban,
}

impl WarnAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarnAction::Mute => "mute",
            WarnAction::Kick => "kick",
            WarnAction::Ban => "ban",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mute" => Some(WarnAction::Mute),
            "kick" => Some(WarnAction::Kick),
            "ban" => Some(WarnAction::Ban),
            _ => None,
        }
    }
}

impl std::fmt::Display for WarnAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-guild AutoMod configuration. One row per guild; every detector has
/// its own toggle so a disabled rule is skipped entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomodConfig {
    pub enabled: bool,
    pub log_channel_id: Option<u64>,

    // Detector toggles
    pub anti_spam: bool,
    pub anti_caps: bool,
    pub anti_mention_spam: bool,
    pub anti_emoji_spam: bool,
    pub anti_newline_spam: bool,
    pub anti_invite: bool,
    pub anti_link: bool,
    pub anti_zalgo: bool,
    pub anti_massping: bool,
    pub bad_words_enabled: bool,
    pub blocked_links_enabled: bool,

    // Thresholds
    pub spam_threshold: u32,
    pub spam_interval_secs: u32,
    pub caps_percentage: u32,
    pub caps_min_length: u32,
    pub max_mentions: u32,
    pub max_emojis: u32,
    pub max_lines: u32,
    pub max_links: u32,

    // Escalation policy
    pub warn_expire_days: u32,
    pub max_warns: u32,
    pub warn_action: WarnAction,
    pub warn_action_duration_secs: u32,
}

impl Default for AutomodConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_channel_id: None,
            anti_spam: true,
            anti_caps: true,
            anti_mention_spam: true,
            anti_emoji_spam: true,
            anti_newline_spam: true,
            anti_invite: true,
            anti_link: false,
            anti_zalgo: true,
            anti_massping: true,
            bad_words_enabled: true,
            blocked_links_enabled: true,
            spam_threshold: 5,
            spam_interval_secs: 5,
            caps_percentage: 70,
            caps_min_length: 10,
            max_mentions: 5,
            max_emojis: 10,
            max_lines: 30,
            max_links: 3,
            warn_expire_days: 30,
            max_warns: 3,
            warn_action: WarnAction::Mute,
            warn_action_duration_secs: 600,
        }
    }
}

impl AutomodConfig {
    /// Reject out-of-range thresholds before they are persisted or cached.
    /// Ranges match the admin-panel input limits.
    pub fn validate(&self) -> Result<(), AutomodError> {
        fn check(name: &str, value: u32, min: u32, max: u32) -> Result<(), AutomodError> {
            if value < min || value > max {
                return Err(AutomodError::InvalidConfig(format!(
                    "{} must be between {} and {} (got {})",
                    name, min, max, value
                )));
            }
            Ok(())
        }

        check("spam_threshold", self.spam_threshold, 2, 20)?;
        check("spam_interval_secs", self.spam_interval_secs, 3, 30)?;
        check("caps_percentage", self.caps_percentage, 50, 100)?;
        check("caps_min_length", self.caps_min_length, 5, 50)?;
        check("max_mentions", self.max_mentions, 2, 30)?;
        check("max_emojis", self.max_emojis, 3, 50)?;
        check("max_lines", self.max_lines, 5, 100)?;
        check("max_links", self.max_links, 1, 20)?;
        check("max_warns", self.max_warns, 1, 10)?;
        check("warn_expire_days", self.warn_expire_days, 1, 365)?;
        check(
            "warn_action_duration_secs",
            self.warn_action_duration_secs,
            60,
            604_800,
        )?;
        Ok(())
    }
}

/// A persisted warning. Cleared/expired warns are soft-deactivated
/// (active = false), never physically deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warn {
    pub id: i64,
    pub guild_id: u64,
    pub user_id: u64,
    pub moderator_id: u64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub active: bool,
}

/// One row in the append-only action log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub guild_id: u64,
    pub user_id: u64,
    pub action: String,
    pub reason: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

/// Whitelist entries bypass the whole pipeline for a user, role or channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitelistKind {
    User,
    Role,
    Channel,
}

impl WhitelistKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhitelistKind::User => "user",
            WhitelistKind::Role => "role",
            WhitelistKind::Channel => "channel",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(WhitelistKind::User),
            "role" => Some(WhitelistKind::Role),
            "channel" => Some(WhitelistKind::Channel),
            _ => None,
        }
    }
}

/// Platform-agnostic view of an inbound message. The Discord layer fills
/// this in from a serenity `Message`; the core never sees serenity types.
#[derive(Debug, Clone)]
pub struct MessageSnapshot {
    pub guild_id: u64,
    pub channel_id: u64,
    pub author_id: u64,
    pub author_role_ids: Vec<u64>,
    pub content: String,
    pub attachment_count: usize,
    pub mention_count: usize,
    pub mentions_everyone: bool,
}

/// Warn counter attached to a medium/high outcome so the user notice can
/// show "n/max".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarnNotice {
    pub count: u32,
    pub max: u32,
}

/// Auto-punishment issued when the warn budget is spent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Punishment {
    pub action: WarnAction,
    pub duration_secs: u32,
    pub warn_count: u32,
}

/// Everything the Discord adapter must do for a detected violation.
/// Warn/log persistence has already happened by the time this is returned;
/// every field here is a best-effort platform side effect.
#[derive(Debug, Clone)]
pub struct ModOutcome {
    pub violation: Violation,
    pub delete_message: bool,
    pub warn: Option<WarnNotice>,
    /// High severity: short fixed timeout layered on top of the warn flow.
    pub immediate_timeout_secs: Option<u64>,
    pub punishment: Option<Punishment>,
    pub log_channel_id: Option<u64>,
}
