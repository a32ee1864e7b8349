// SQLite-backed AutoMod store for persistent moderation data.
//
// Tables:
// - automod_settings: Per-guild configuration, one row per guild
// - automod_bad_words: Guild-specific blocked words
// - automod_blocked_links: Guild-specific blocked domains
// - automod_whitelist: Users, roles and channels that bypass AutoMod
// - automod_warns: Warnings, soft-deactivated instead of deleted
// - automod_actions: Append-only log of everything AutoMod did

use crate::core::automod::{
    ActionLogEntry, AutomodConfig, AutomodError, AutomodStore, Warn, WarnAction, WhitelistKind,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteAutomodStore {
    pool: Pool<Sqlite>,
}

fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            tracing::warn!("Malformed timestamp {:?} in database: {}", raw, e);
            Utc::now()
        })
}

impl SqliteAutomodStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), AutomodError> {
        // Settings table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS automod_settings (
                guild_id INTEGER PRIMARY KEY,
                enabled BOOLEAN NOT NULL DEFAULT 0,
                log_channel_id INTEGER,
                anti_spam BOOLEAN NOT NULL DEFAULT 1,
                anti_caps BOOLEAN NOT NULL DEFAULT 1,
                anti_mention_spam BOOLEAN NOT NULL DEFAULT 1,
                anti_emoji_spam BOOLEAN NOT NULL DEFAULT 1,
                anti_newline_spam BOOLEAN NOT NULL DEFAULT 1,
                anti_invite BOOLEAN NOT NULL DEFAULT 1,
                anti_link BOOLEAN NOT NULL DEFAULT 0,
                anti_zalgo BOOLEAN NOT NULL DEFAULT 1,
                anti_massping BOOLEAN NOT NULL DEFAULT 1,
                bad_words_enabled BOOLEAN NOT NULL DEFAULT 1,
                blocked_links_enabled BOOLEAN NOT NULL DEFAULT 1,
                spam_threshold INTEGER NOT NULL DEFAULT 5,
                spam_interval_secs INTEGER NOT NULL DEFAULT 5,
                caps_percentage INTEGER NOT NULL DEFAULT 70,
                caps_min_length INTEGER NOT NULL DEFAULT 10,
                max_mentions INTEGER NOT NULL DEFAULT 5,
                max_emojis INTEGER NOT NULL DEFAULT 10,
                max_lines INTEGER NOT NULL DEFAULT 30,
                max_links INTEGER NOT NULL DEFAULT 3,
                warn_expire_days INTEGER NOT NULL DEFAULT 30,
                max_warns INTEGER NOT NULL DEFAULT 3,
                warn_action TEXT NOT NULL DEFAULT 'mute',
                warn_action_duration_secs INTEGER NOT NULL DEFAULT 600
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;

        // Custom lexicon tables
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS automod_bad_words (
                guild_id INTEGER NOT NULL,
                word TEXT NOT NULL,
                PRIMARY KEY (guild_id, word)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS automod_blocked_links (
                guild_id INTEGER NOT NULL,
                domain TEXT NOT NULL,
                PRIMARY KEY (guild_id, domain)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;

        // Whitelist table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS automod_whitelist (
                guild_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                target_id INTEGER NOT NULL,
                PRIMARY KEY (guild_id, kind, target_id)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;

        // Warns table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS automod_warns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                moderator_id INTEGER NOT NULL DEFAULT 0,
                reason TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                active BOOLEAN NOT NULL DEFAULT 1
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_automod_warns_guild_user
                ON automod_warns(guild_id, user_id, active);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;

        // Action log table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS automod_actions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                action TEXT NOT NULL,
                reason TEXT NOT NULL,
                details TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_automod_actions_guild
                ON automod_actions(guild_id, id);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl AutomodStore for SqliteAutomodStore {
    async fn get_config(&self, guild_id: u64) -> Result<Option<AutomodConfig>, AutomodError> {
        let row = sqlx::query("SELECT * FROM automod_settings WHERE guild_id = ?")
            .bind(guild_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AutomodError::Storage(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let warn_action: String = row.get("warn_action");
        Ok(Some(AutomodConfig {
            enabled: row.get("enabled"),
            log_channel_id: row
                .get::<Option<i64>, _>("log_channel_id")
                .map(|id| id as u64),
            anti_spam: row.get("anti_spam"),
            anti_caps: row.get("anti_caps"),
            anti_mention_spam: row.get("anti_mention_spam"),
            anti_emoji_spam: row.get("anti_emoji_spam"),
            anti_newline_spam: row.get("anti_newline_spam"),
            anti_invite: row.get("anti_invite"),
            anti_link: row.get("anti_link"),
            anti_zalgo: row.get("anti_zalgo"),
            anti_massping: row.get("anti_massping"),
            bad_words_enabled: row.get("bad_words_enabled"),
            blocked_links_enabled: row.get("blocked_links_enabled"),
            spam_threshold: row.get::<i32, _>("spam_threshold") as u32,
            spam_interval_secs: row.get::<i32, _>("spam_interval_secs") as u32,
            caps_percentage: row.get::<i32, _>("caps_percentage") as u32,
            caps_min_length: row.get::<i32, _>("caps_min_length") as u32,
            max_mentions: row.get::<i32, _>("max_mentions") as u32,
            max_emojis: row.get::<i32, _>("max_emojis") as u32,
            max_lines: row.get::<i32, _>("max_lines") as u32,
            max_links: row.get::<i32, _>("max_links") as u32,
            warn_expire_days: row.get::<i32, _>("warn_expire_days") as u32,
            max_warns: row.get::<i32, _>("max_warns") as u32,
            warn_action: WarnAction::parse(&warn_action).unwrap_or(WarnAction::Mute),
            warn_action_duration_secs: row.get::<i64, _>("warn_action_duration_secs") as u32,
        }))
    }

    async fn save_config(
        &self,
        guild_id: u64,
        config: &AutomodConfig,
    ) -> Result<(), AutomodError> {
        sqlx::query(
            r#"
            INSERT INTO automod_settings (
                guild_id, enabled, log_channel_id,
                anti_spam, anti_caps, anti_mention_spam, anti_emoji_spam,
                anti_newline_spam, anti_invite, anti_link, anti_zalgo,
                anti_massping, bad_words_enabled, blocked_links_enabled,
                spam_threshold, spam_interval_secs, caps_percentage,
                caps_min_length, max_mentions, max_emojis, max_lines, max_links,
                warn_expire_days, max_warns, warn_action, warn_action_duration_secs
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(guild_id) DO UPDATE SET
                enabled = excluded.enabled,
                log_channel_id = excluded.log_channel_id,
                anti_spam = excluded.anti_spam,
                anti_caps = excluded.anti_caps,
                anti_mention_spam = excluded.anti_mention_spam,
                anti_emoji_spam = excluded.anti_emoji_spam,
                anti_newline_spam = excluded.anti_newline_spam,
                anti_invite = excluded.anti_invite,
                anti_link = excluded.anti_link,
                anti_zalgo = excluded.anti_zalgo,
                anti_massping = excluded.anti_massping,
                bad_words_enabled = excluded.bad_words_enabled,
                blocked_links_enabled = excluded.blocked_links_enabled,
                spam_threshold = excluded.spam_threshold,
                spam_interval_secs = excluded.spam_interval_secs,
                caps_percentage = excluded.caps_percentage,
                caps_min_length = excluded.caps_min_length,
                max_mentions = excluded.max_mentions,
                max_emojis = excluded.max_emojis,
                max_lines = excluded.max_lines,
                max_links = excluded.max_links,
                warn_expire_days = excluded.warn_expire_days,
                max_warns = excluded.max_warns,
                warn_action = excluded.warn_action,
                warn_action_duration_secs = excluded.warn_action_duration_secs
            "#,
        )
        .bind(guild_id as i64)
        .bind(config.enabled)
        .bind(config.log_channel_id.map(|id| id as i64))
        .bind(config.anti_spam)
        .bind(config.anti_caps)
        .bind(config.anti_mention_spam)
        .bind(config.anti_emoji_spam)
        .bind(config.anti_newline_spam)
        .bind(config.anti_invite)
        .bind(config.anti_link)
        .bind(config.anti_zalgo)
        .bind(config.anti_massping)
        .bind(config.bad_words_enabled)
        .bind(config.blocked_links_enabled)
        .bind(config.spam_threshold as i32)
        .bind(config.spam_interval_secs as i32)
        .bind(config.caps_percentage as i32)
        .bind(config.caps_min_length as i32)
        .bind(config.max_mentions as i32)
        .bind(config.max_emojis as i32)
        .bind(config.max_lines as i32)
        .bind(config.max_links as i32)
        .bind(config.warn_expire_days as i32)
        .bind(config.max_warns as i32)
        .bind(config.warn_action.as_str())
        .bind(config.warn_action_duration_secs as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn list_words(&self, guild_id: u64) -> Result<Vec<String>, AutomodError> {
        let rows =
            sqlx::query("SELECT word FROM automod_bad_words WHERE guild_id = ? ORDER BY word")
                .bind(guild_id as i64)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AutomodError::Storage(e.to_string()))?;

        Ok(rows.iter().map(|row| row.get("word")).collect())
    }

    async fn add_word(&self, guild_id: u64, word: &str) -> Result<bool, AutomodError> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO automod_bad_words (guild_id, word) VALUES (?, ?)")
                .bind(guild_id as i64)
                .bind(word)
                .execute(&self.pool)
                .await
                .map_err(|e| AutomodError::Storage(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_word(&self, guild_id: u64, word: &str) -> Result<bool, AutomodError> {
        let result =
            sqlx::query("DELETE FROM automod_bad_words WHERE guild_id = ? AND word = ?")
                .bind(guild_id as i64)
                .bind(word)
                .execute(&self.pool)
                .await
                .map_err(|e| AutomodError::Storage(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_domains(&self, guild_id: u64) -> Result<Vec<String>, AutomodError> {
        let rows = sqlx::query(
            "SELECT domain FROM automod_blocked_links WHERE guild_id = ? ORDER BY domain",
        )
        .bind(guild_id as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;

        Ok(rows.iter().map(|row| row.get("domain")).collect())
    }

    async fn add_domain(&self, guild_id: u64, domain: &str) -> Result<bool, AutomodError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO automod_blocked_links (guild_id, domain) VALUES (?, ?)",
        )
        .bind(guild_id as i64)
        .bind(domain)
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_domain(&self, guild_id: u64, domain: &str) -> Result<bool, AutomodError> {
        let result =
            sqlx::query("DELETE FROM automod_blocked_links WHERE guild_id = ? AND domain = ?")
                .bind(guild_id as i64)
                .bind(domain)
                .execute(&self.pool)
                .await
                .map_err(|e| AutomodError::Storage(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_whitelist(
        &self,
        guild_id: u64,
        kind: WhitelistKind,
        target_id: u64,
    ) -> Result<bool, AutomodError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO automod_whitelist (guild_id, kind, target_id) VALUES (?, ?, ?)",
        )
        .bind(guild_id as i64)
        .bind(kind.as_str())
        .bind(target_id as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_whitelist(
        &self,
        guild_id: u64,
        kind: WhitelistKind,
        target_id: u64,
    ) -> Result<bool, AutomodError> {
        let result = sqlx::query(
            "DELETE FROM automod_whitelist WHERE guild_id = ? AND kind = ? AND target_id = ?",
        )
        .bind(guild_id as i64)
        .bind(kind.as_str())
        .bind(target_id as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_whitelist(
        &self,
        guild_id: u64,
    ) -> Result<Vec<(WhitelistKind, u64)>, AutomodError> {
        let rows = sqlx::query(
            "SELECT kind, target_id FROM automod_whitelist WHERE guild_id = ? ORDER BY kind",
        )
        .bind(guild_id as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let kind: String = row.get("kind");
            // Rows with an unknown kind are skipped rather than failing the
            // whole listing.
            if let Some(kind) = WhitelistKind::parse(&kind) {
                entries.push((kind, row.get::<i64, _>("target_id") as u64));
            }
        }
        Ok(entries)
    }

    async fn is_whitelisted(
        &self,
        guild_id: u64,
        user_id: u64,
        role_ids: &[u64],
        channel_id: u64,
    ) -> Result<bool, AutomodError> {
        let entries = self.list_whitelist(guild_id).await?;
        Ok(entries.iter().any(|(kind, target)| match kind {
            WhitelistKind::User => *target == user_id,
            WhitelistKind::Role => role_ids.contains(target),
            WhitelistKind::Channel => *target == channel_id,
        }))
    }

    async fn add_warn(
        &self,
        guild_id: u64,
        user_id: u64,
        moderator_id: u64,
        reason: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AutomodError> {
        sqlx::query(
            r#"
            INSERT INTO automod_warns (guild_id, user_id, moderator_id, reason, created_at, expires_at, active)
            VALUES (?, ?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .bind(moderator_id as i64)
        .bind(reason)
        .bind(Utc::now().to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn count_active_warns(
        &self,
        guild_id: u64,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<u32, AutomodError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS n FROM automod_warns
            WHERE guild_id = ? AND user_id = ? AND active = 1 AND expires_at > ?
            "#,
        )
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;

        Ok(row.get::<i64, _>("n") as u32)
    }

    async fn list_warns(&self, guild_id: u64, user_id: u64) -> Result<Vec<Warn>, AutomodError> {
        let rows = sqlx::query(
            r#"
            SELECT id, moderator_id, reason, created_at, expires_at, active
            FROM automod_warns
            WHERE guild_id = ? AND user_id = ?
            ORDER BY id DESC
            "#,
        )
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;

        let mut warns = Vec::new();
        for row in rows {
            let created_at: String = row.get("created_at");
            let expires_at: String = row.get("expires_at");
            warns.push(Warn {
                id: row.get("id"),
                guild_id,
                user_id,
                moderator_id: row.get::<i64, _>("moderator_id") as u64,
                reason: row.get("reason"),
                created_at: parse_ts(&created_at),
                expires_at: parse_ts(&expires_at),
                active: row.get("active"),
            });
        }
        Ok(warns)
    }

    async fn clear_warns(&self, guild_id: u64, user_id: u64) -> Result<u64, AutomodError> {
        let result = sqlx::query(
            "UPDATE automod_warns SET active = 0 WHERE guild_id = ? AND user_id = ? AND active = 1",
        )
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn log_action(&self, entry: &ActionLogEntry) -> Result<(), AutomodError> {
        sqlx::query(
            r#"
            INSERT INTO automod_actions (guild_id, user_id, action, reason, details, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.guild_id as i64)
        .bind(entry.user_id as i64)
        .bind(&entry.action)
        .bind(&entry.reason)
        .bind(&entry.details)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn recent_actions(
        &self,
        guild_id: u64,
        limit: u32,
    ) -> Result<Vec<ActionLogEntry>, AutomodError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, action, reason, details, created_at
            FROM automod_actions
            WHERE guild_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(guild_id as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AutomodError::Storage(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let created_at: String = row.get("created_at");
            entries.push(ActionLogEntry {
                guild_id,
                user_id: row.get::<i64, _>("user_id") as u64,
                action: row.get("action"),
                reason: row.get("reason"),
                details: row.get("details"),
                created_at: parse_ts(&created_at),
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    // Each test gets its own database file; the TempDir guard keeps it
    // alive for the duration of the test.
    async fn store() -> (tempfile::TempDir, SqliteAutomodStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("automod.db");
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .unwrap();
        let store = SqliteAutomodStore::new(pool);
        store.migrate().await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn config_upsert_roundtrip() {
        let (_dir, store) = store().await;
        assert!(store.get_config(1).await.unwrap().is_none());

        let mut config = AutomodConfig {
            enabled: true,
            log_channel_id: Some(999),
            ..AutomodConfig::default()
        };
        store.save_config(1, &config).await.unwrap();
        assert_eq!(store.get_config(1).await.unwrap(), Some(config.clone()));

        // Saving again updates in place instead of duplicating the row.
        config.max_warns = 5;
        config.warn_action = WarnAction::Ban;
        store.save_config(1, &config).await.unwrap();
        assert_eq!(store.get_config(1).await.unwrap(), Some(config));
    }

    #[tokio::test]
    async fn word_add_is_idempotent() {
        let (_dir, store) = store().await;
        assert!(store.add_word(1, "zut").await.unwrap());
        assert!(!store.add_word(1, "zut").await.unwrap());
        assert_eq!(store.list_words(1).await.unwrap(), vec!["zut"]);
        assert!(store.remove_word(1, "zut").await.unwrap());
        assert!(!store.remove_word(1, "zut").await.unwrap());
    }

    #[tokio::test]
    async fn warns_expire_and_soft_deactivate() {
        let (_dir, store) = store().await;
        let now = Utc::now();

        store
            .add_warn(1, 2, 0, "old", now - Duration::days(1))
            .await
            .unwrap();
        store
            .add_warn(1, 2, 0, "fresh", now + Duration::days(30))
            .await
            .unwrap();
        assert_eq!(store.count_active_warns(1, 2, now).await.unwrap(), 1);

        assert_eq!(store.clear_warns(1, 2).await.unwrap(), 2);
        assert_eq!(store.count_active_warns(1, 2, now).await.unwrap(), 0);

        // History survives, just inactive, newest first.
        let warns = store.list_warns(1, 2).await.unwrap();
        assert_eq!(warns.len(), 2);
        assert_eq!(warns[0].reason, "fresh");
        assert!(warns.iter().all(|w| !w.active));
    }

    #[tokio::test]
    async fn whitelist_matches_by_kind() {
        let (_dir, store) = store().await;
        store
            .add_whitelist(1, WhitelistKind::Role, 77)
            .await
            .unwrap();

        assert!(store.is_whitelisted(1, 2, &[5, 77], 9).await.unwrap());
        assert!(!store.is_whitelisted(1, 2, &[5, 6], 9).await.unwrap());
    }

    #[tokio::test]
    async fn recent_actions_are_newest_first() {
        let (_dir, store) = store().await;
        for i in 0..3 {
            store
                .log_action(&ActionLogEntry {
                    guild_id: 1,
                    user_id: 2,
                    action: "warn".to_string(),
                    reason: format!("violation {}", i),
                    details: String::new(),
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        let actions = store.recent_actions(1, 2).await.unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].reason, "violation 2");
    }

    #[test]
    fn timestamps_roundtrip_and_survive_corruption() {
        let now = Utc::now();
        assert_eq!(parse_ts(&now.to_rfc3339()), now);

        // A corrupt value must not panic and must not land in the past,
        // which would silently expire a warn.
        let before = Utc::now();
        assert!(parse_ts("not a timestamp") >= before);
    }
}
