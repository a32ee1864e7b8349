// AutoMod service - core business logic for message moderation.
//
// This service handles:
// - Running the detector cascade over incoming messages
// - Warn escalation (warn -> auto punish at the guild's warn budget)
// - Guild config, custom lexicon and whitelist management
//
// NO Discord dependencies here - just pure domain logic. The Discord layer
// builds a MessageSnapshot, calls check_message and applies the returned
// ModOutcome. All store writes happen before the outcome is returned, so
// a failed platform action never loses a recorded warn.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use super::automod_models::{
    ActionLogEntry, AutomodConfig, AutomodError, MessageSnapshot, ModOutcome, Punishment,
    Severity, Violation, Warn, WarnNotice, WhitelistKind,
};
use super::detectors::{run_cascade, DetectorContext};
use super::lexicon::GuildLexicon;
use super::normalizer::normalize;
use super::tracker::RollingTracker;

/// Timeout applied on top of the warn flow for high-severity violations.
const HIGH_SEVERITY_TIMEOUT_SECS: u64 = 300;

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting AutoMod data.
#[async_trait]
pub trait AutomodStore: Send + Sync {
    /// Get the guild config. `None` means the guild never ran setup.
    async fn get_config(&self, guild_id: u64) -> Result<Option<AutomodConfig>, AutomodError>;

    /// Create or replace the guild config.
    async fn save_config(&self, guild_id: u64, config: &AutomodConfig)
        -> Result<(), AutomodError>;

    /// Custom bad words for a guild.
    async fn list_words(&self, guild_id: u64) -> Result<Vec<String>, AutomodError>;

    /// Add a custom word. Returns false if it was already present.
    async fn add_word(&self, guild_id: u64, word: &str) -> Result<bool, AutomodError>;

    /// Remove a custom word. Returns false if it was not present.
    async fn remove_word(&self, guild_id: u64, word: &str) -> Result<bool, AutomodError>;

    /// Custom blocked domains for a guild.
    async fn list_domains(&self, guild_id: u64) -> Result<Vec<String>, AutomodError>;

    async fn add_domain(&self, guild_id: u64, domain: &str) -> Result<bool, AutomodError>;

    async fn remove_domain(&self, guild_id: u64, domain: &str) -> Result<bool, AutomodError>;

    /// Whitelist entries bypass the whole pipeline.
    async fn add_whitelist(
        &self,
        guild_id: u64,
        kind: WhitelistKind,
        target_id: u64,
    ) -> Result<bool, AutomodError>;

    async fn remove_whitelist(
        &self,
        guild_id: u64,
        kind: WhitelistKind,
        target_id: u64,
    ) -> Result<bool, AutomodError>;

    async fn list_whitelist(
        &self,
        guild_id: u64,
    ) -> Result<Vec<(WhitelistKind, u64)>, AutomodError>;

    /// Whether the author, one of their roles or the channel is whitelisted.
    async fn is_whitelisted(
        &self,
        guild_id: u64,
        user_id: u64,
        role_ids: &[u64],
        channel_id: u64,
    ) -> Result<bool, AutomodError>;

    /// Persist a warning. `moderator_id` 0 means AutoMod itself.
    async fn add_warn(
        &self,
        guild_id: u64,
        user_id: u64,
        moderator_id: u64,
        reason: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AutomodError>;

    /// Warns that are active and not yet expired.
    async fn count_active_warns(
        &self,
        guild_id: u64,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<u32, AutomodError>;

    /// All warns for a user, newest first, including inactive ones.
    async fn list_warns(&self, guild_id: u64, user_id: u64) -> Result<Vec<Warn>, AutomodError>;

    /// Deactivate all active warns for a user. Returns how many changed.
    async fn clear_warns(&self, guild_id: u64, user_id: u64) -> Result<u64, AutomodError>;

    /// Append to the action log.
    async fn log_action(&self, entry: &ActionLogEntry) -> Result<(), AutomodError>;

    /// Most recent action log entries for a guild, newest first.
    async fn recent_actions(
        &self,
        guild_id: u64,
        limit: u32,
    ) -> Result<Vec<ActionLogEntry>, AutomodError>;
}

// ============================================================================
// ENTITLEMENTS
// ============================================================================

/// Premium-gated AutoMod features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    AntiInvite,
    AntiLink,
    BadWords,
    FullAutomod,
}

/// Decides which gated features a guild may use. The default provider
/// grants everything; a billing integration can swap in its own.
pub trait EntitlementProvider: Send + Sync {
    fn has_feature(&self, guild_id: u64, feature: Feature) -> bool;
}

/// Grants every feature to every guild.
pub struct AllowAllEntitlements;

impl EntitlementProvider for AllowAllEntitlements {
    fn has_feature(&self, _guild_id: u64, _feature: Feature) -> bool {
        true
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// AutoMod service owning the detector cascade, the rolling trackers and
/// the read-through caches for guild config and lexicon.
pub struct AutomodService<S: AutomodStore, E: EntitlementProvider> {
    store: S,
    entitlements: E,
    tracker: RollingTracker,
    config_cache: DashMap<u64, Option<AutomodConfig>>,
    lexicon_cache: DashMap<u64, GuildLexicon>,
}

impl<S: AutomodStore, E: EntitlementProvider> AutomodService<S, E> {
    pub fn new(store: S, entitlements: E) -> Self {
        Self {
            store,
            entitlements,
            tracker: RollingTracker::new(),
            config_cache: DashMap::new(),
            lexicon_cache: DashMap::new(),
        }
    }

    /// Run the full pipeline over one message.
    ///
    /// Returns `None` when AutoMod is off for the guild, the sender is
    /// whitelisted or no detector fired. The caller is expected to have
    /// filtered out bots, webhooks and administrators already.
    pub async fn check_message(
        &self,
        snapshot: &MessageSnapshot,
    ) -> Result<Option<ModOutcome>, AutomodError> {
        let Some(config) = self.cached_config(snapshot.guild_id).await? else {
            return Ok(None);
        };
        if !config.enabled {
            return Ok(None);
        }

        if self
            .store
            .is_whitelisted(
                snapshot.guild_id,
                snapshot.author_id,
                &snapshot.author_role_ids,
                snapshot.channel_id,
            )
            .await?
        {
            return Ok(None);
        }

        let effective = self.effective_config(snapshot.guild_id, &config);
        let lexicon = self.cached_lexicon(snapshot.guild_id).await?;
        let normalized = normalize(&snapshot.content);

        let ctx = DetectorContext {
            snapshot,
            normalized: &normalized,
            config: &effective,
            lexicon: &lexicon,
            tracker: &self.tracker,
            now: Instant::now(),
        };
        let Some(violation) = run_cascade(&ctx) else {
            return Ok(None);
        };

        self.escalate(snapshot, violation, &config).await.map(Some)
    }

    /// Mask off plan-gated toggles before the cascade sees the config.
    fn effective_config(&self, guild_id: u64, config: &AutomodConfig) -> AutomodConfig {
        let mut effective = config.clone();
        if !self.entitlements.has_feature(guild_id, Feature::AntiInvite) {
            effective.anti_invite = false;
        }
        if !self.entitlements.has_feature(guild_id, Feature::AntiLink) {
            effective.anti_link = false;
            effective.blocked_links_enabled = false;
        }
        if !self.entitlements.has_feature(guild_id, Feature::BadWords) {
            effective.bad_words_enabled = false;
        }
        effective
    }

    /// Turn a violation into persisted state plus a platform to-do list.
    ///
    /// Low severity only deletes and logs. Medium and high add a warn; when
    /// the active count reaches the budget, the configured punishment fires
    /// and the slate is wiped so the next violation starts at one again.
    async fn escalate(
        &self,
        snapshot: &MessageSnapshot,
        violation: Violation,
        config: &AutomodConfig,
    ) -> Result<ModOutcome, AutomodError> {
        let now = Utc::now();
        let details = format!("<#{}>", snapshot.channel_id);

        if violation.severity == Severity::Low {
            self.store
                .log_action(&ActionLogEntry {
                    guild_id: snapshot.guild_id,
                    user_id: snapshot.author_id,
                    action: "delete".to_string(),
                    reason: violation.reason.clone(),
                    details,
                    created_at: now,
                })
                .await?;
            return Ok(ModOutcome {
                violation,
                delete_message: true,
                warn: None,
                immediate_timeout_secs: None,
                punishment: None,
                log_channel_id: config.log_channel_id,
            });
        }

        let expires_at = now + Duration::days(i64::from(config.warn_expire_days));
        self.store
            .add_warn(
                snapshot.guild_id,
                snapshot.author_id,
                0,
                &violation.reason,
                expires_at,
            )
            .await?;
        self.store
            .log_action(&ActionLogEntry {
                guild_id: snapshot.guild_id,
                user_id: snapshot.author_id,
                action: "warn".to_string(),
                reason: violation.reason.clone(),
                details,
                created_at: now,
            })
            .await?;

        let count = self
            .store
            .count_active_warns(snapshot.guild_id, snapshot.author_id, now)
            .await?;

        let immediate_timeout_secs =
            (violation.severity == Severity::High).then_some(HIGH_SEVERITY_TIMEOUT_SECS);

        let punishment = if count >= config.max_warns {
            self.store
                .log_action(&ActionLogEntry {
                    guild_id: snapshot.guild_id,
                    user_id: snapshot.author_id,
                    action: config.warn_action.as_str().to_string(),
                    reason: format!("Reached {} warns", count),
                    details: violation.reason.clone(),
                    created_at: now,
                })
                .await?;
            self.store
                .clear_warns(snapshot.guild_id, snapshot.author_id)
                .await?;
            // A punished user starts fresh, flood windows included.
            self.tracker.reset_user(snapshot.guild_id, snapshot.author_id);
            Some(Punishment {
                action: config.warn_action,
                duration_secs: config.warn_action_duration_secs,
                warn_count: count,
            })
        } else {
            None
        };

        Ok(ModOutcome {
            violation,
            delete_message: true,
            warn: Some(WarnNotice {
                count,
                max: config.max_warns,
            }),
            immediate_timeout_secs,
            punishment,
            log_channel_id: config.log_channel_id,
        })
    }

    // ------------------------------------------------------------------
    // Config management
    // ------------------------------------------------------------------

    /// First-time setup: enable AutoMod with defaults and a log channel.
    /// Re-running setup keeps existing thresholds and moves the channel.
    pub async fn setup(&self, guild_id: u64, log_channel_id: u64) -> Result<(), AutomodError> {
        let mut config = self
            .store
            .get_config(guild_id)
            .await?
            .unwrap_or_default();
        config.enabled = true;
        config.log_channel_id = Some(log_channel_id);
        self.save_config(guild_id, config).await
    }

    pub async fn get_config(&self, guild_id: u64) -> Result<Option<AutomodConfig>, AutomodError> {
        self.cached_config(guild_id).await
    }

    /// Validate and persist a config, then drop the cache entry.
    pub async fn save_config(
        &self,
        guild_id: u64,
        config: AutomodConfig,
    ) -> Result<(), AutomodError> {
        config.validate()?;
        self.store.save_config(guild_id, &config).await?;
        self.config_cache.remove(&guild_id);
        Ok(())
    }

    /// Flip the master switch. Errors if the guild never ran setup.
    pub async fn set_enabled(&self, guild_id: u64, enabled: bool) -> Result<(), AutomodError> {
        let Some(mut config) = self.store.get_config(guild_id).await? else {
            return Err(AutomodError::InvalidConfig(
                "AutoMod has not been set up for this server yet".to_string(),
            ));
        };
        config.enabled = enabled;
        self.save_config(guild_id, config).await
    }

    pub fn has_feature(&self, guild_id: u64, feature: Feature) -> bool {
        self.entitlements.has_feature(guild_id, feature)
    }

    // ------------------------------------------------------------------
    // Lexicon management
    // ------------------------------------------------------------------

    pub async fn list_words(&self, guild_id: u64) -> Result<Vec<String>, AutomodError> {
        self.store.list_words(guild_id).await
    }

    pub async fn add_word(&self, guild_id: u64, word: &str) -> Result<bool, AutomodError> {
        let added = self.store.add_word(guild_id, &word.to_lowercase()).await?;
        if added {
            self.lexicon_cache.remove(&guild_id);
        }
        Ok(added)
    }

    pub async fn remove_word(&self, guild_id: u64, word: &str) -> Result<bool, AutomodError> {
        let removed = self
            .store
            .remove_word(guild_id, &word.to_lowercase())
            .await?;
        if removed {
            self.lexicon_cache.remove(&guild_id);
        }
        Ok(removed)
    }

    pub async fn list_domains(&self, guild_id: u64) -> Result<Vec<String>, AutomodError> {
        self.store.list_domains(guild_id).await
    }

    pub async fn add_domain(&self, guild_id: u64, domain: &str) -> Result<bool, AutomodError> {
        let added = self
            .store
            .add_domain(guild_id, &domain.to_lowercase())
            .await?;
        if added {
            self.lexicon_cache.remove(&guild_id);
        }
        Ok(added)
    }

    pub async fn remove_domain(&self, guild_id: u64, domain: &str) -> Result<bool, AutomodError> {
        let removed = self
            .store
            .remove_domain(guild_id, &domain.to_lowercase())
            .await?;
        if removed {
            self.lexicon_cache.remove(&guild_id);
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Whitelist management
    // ------------------------------------------------------------------

    pub async fn add_whitelist(
        &self,
        guild_id: u64,
        kind: WhitelistKind,
        target_id: u64,
    ) -> Result<bool, AutomodError> {
        self.store.add_whitelist(guild_id, kind, target_id).await
    }

    pub async fn remove_whitelist(
        &self,
        guild_id: u64,
        kind: WhitelistKind,
        target_id: u64,
    ) -> Result<bool, AutomodError> {
        self.store.remove_whitelist(guild_id, kind, target_id).await
    }

    pub async fn list_whitelist(
        &self,
        guild_id: u64,
    ) -> Result<Vec<(WhitelistKind, u64)>, AutomodError> {
        self.store.list_whitelist(guild_id).await
    }

    // ------------------------------------------------------------------
    // Manual warn management (moderator commands)
    // ------------------------------------------------------------------

    /// Add a manual warn. Follows the same escalation as automatic warns,
    /// so a moderator warn can also trip the auto punishment.
    pub async fn warn_user(
        &self,
        guild_id: u64,
        user_id: u64,
        moderator_id: u64,
        reason: &str,
    ) -> Result<(WarnNotice, Option<Punishment>), AutomodError> {
        let config = self
            .store
            .get_config(guild_id)
            .await?
            .unwrap_or_default();
        let now = Utc::now();
        let expires_at = now + Duration::days(i64::from(config.warn_expire_days));

        self.store
            .add_warn(guild_id, user_id, moderator_id, reason, expires_at)
            .await?;
        self.store
            .log_action(&ActionLogEntry {
                guild_id,
                user_id,
                action: "warn".to_string(),
                reason: reason.to_string(),
                details: format!("manual, by <@{}>", moderator_id),
                created_at: now,
            })
            .await?;

        let count = self.store.count_active_warns(guild_id, user_id, now).await?;
        let punishment = if count >= config.max_warns {
            self.store
                .log_action(&ActionLogEntry {
                    guild_id,
                    user_id,
                    action: config.warn_action.as_str().to_string(),
                    reason: format!("Reached {} warns", count),
                    details: reason.to_string(),
                    created_at: now,
                })
                .await?;
            self.store.clear_warns(guild_id, user_id).await?;
            Some(Punishment {
                action: config.warn_action,
                duration_secs: config.warn_action_duration_secs,
                warn_count: count,
            })
        } else {
            None
        };

        Ok((
            WarnNotice {
                count,
                max: config.max_warns,
            },
            punishment,
        ))
    }

    pub async fn warnings(&self, guild_id: u64, user_id: u64) -> Result<Vec<Warn>, AutomodError> {
        self.store.list_warns(guild_id, user_id).await
    }

    pub async fn active_warn_count(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<u32, AutomodError> {
        self.store
            .count_active_warns(guild_id, user_id, Utc::now())
            .await
    }

    pub async fn clear_warns(&self, guild_id: u64, user_id: u64) -> Result<u64, AutomodError> {
        self.store.clear_warns(guild_id, user_id).await
    }

    pub async fn recent_actions(
        &self,
        guild_id: u64,
        limit: u32,
    ) -> Result<Vec<ActionLogEntry>, AutomodError> {
        self.store.recent_actions(guild_id, limit).await
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Prune rolling tracker state. Called from a periodic task.
    pub fn sweep_trackers(&self) {
        self.tracker.sweep(Instant::now());
    }

    async fn cached_config(
        &self,
        guild_id: u64,
    ) -> Result<Option<AutomodConfig>, AutomodError> {
        if let Some(cached) = self.config_cache.get(&guild_id) {
            return Ok(cached.clone());
        }
        let config = self.store.get_config(guild_id).await?;
        self.config_cache.insert(guild_id, config.clone());
        Ok(config)
    }

    async fn cached_lexicon(&self, guild_id: u64) -> Result<GuildLexicon, AutomodError> {
        if let Some(cached) = self.lexicon_cache.get(&guild_id) {
            return Ok(cached.clone());
        }
        let words = self.store.list_words(guild_id).await?;
        let domains = self.store.list_domains(guild_id).await?;
        let lexicon = GuildLexicon::new(words, domains);
        self.lexicon_cache.insert(guild_id, lexicon.clone());
        Ok(lexicon)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::automod::InMemoryAutomodStore;

    type Service = AutomodService<InMemoryAutomodStore, AllowAllEntitlements>;

    async fn enabled_service() -> Service {
        let service = AutomodService::new(InMemoryAutomodStore::new(), AllowAllEntitlements);
        service.setup(1, 999).await.unwrap();
        service
    }

    fn snapshot(content: &str) -> MessageSnapshot {
        MessageSnapshot {
            guild_id: 1,
            channel_id: 2,
            author_id: 3,
            author_role_ids: vec![],
            content: content.to_string(),
            attachment_count: 0,
            mention_count: 0,
            mentions_everyone: false,
        }
    }

    #[tokio::test]
    async fn unconfigured_guild_is_ignored() {
        let service = AutomodService::new(InMemoryAutomodStore::new(), AllowAllEntitlements);
        let outcome = service
            .check_message(&snapshot("discord.gg/abc123"))
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn disabled_guild_is_ignored() {
        let service = enabled_service().await;
        service.set_enabled(1, false).await.unwrap();
        let outcome = service
            .check_message(&snapshot("discord.gg/abc123"))
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn clean_message_has_no_outcome() {
        let service = enabled_service().await;
        let outcome = service
            .check_message(&snapshot("good afternoon everyone"))
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn flood_triggers_once_then_resets() {
        let service = enabled_service().await;

        // Distinct bodies so the duplicate detector stays quiet.
        let mut hits = 0;
        for i in 0..5 {
            let body = format!("quick message {}", i);
            if let Some(outcome) = service.check_message(&snapshot(&body)).await.unwrap() {
                assert_eq!(outcome.violation.reason, "Spam Detected (Message Flood)");
                hits += 1;
            }
        }
        assert_eq!(hits, 1);

        // Window cleared on the hit: the next message passes.
        let outcome = service.check_message(&snapshot("back again")).await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn duplicate_content_triggers_on_third() {
        let service = enabled_service().await;

        assert!(service
            .check_message(&snapshot("buy now"))
            .await
            .unwrap()
            .is_none());
        assert!(service
            .check_message(&snapshot("BUY NOW"))
            .await
            .unwrap()
            .is_none());
        let outcome = service
            .check_message(&snapshot("buy now"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            outcome.violation.reason,
            "Spam Detected (Duplicate Messages)"
        );
        assert_eq!(outcome.violation.severity, Severity::Medium);
    }

    #[tokio::test]
    async fn low_severity_deletes_without_warn() {
        let service = enabled_service().await;
        let outcome = service
            .check_message(&snapshot("HELLO WORLD!!!"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.violation.reason, "Excessive Caps (100%)");
        assert!(outcome.delete_message);
        assert!(outcome.warn.is_none());
        assert!(outcome.punishment.is_none());
        assert_eq!(service.active_warn_count(1, 3).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn medium_severity_warns_and_counts() {
        let service = enabled_service().await;
        let outcome = service
            .check_message(&snapshot("join discord.gg/abc123"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.violation.reason, "Discord Invite Link");
        assert_eq!(outcome.warn, Some(WarnNotice { count: 1, max: 3 }));
        assert!(outcome.immediate_timeout_secs.is_none());
        assert!(outcome.punishment.is_none());
        assert_eq!(service.active_warn_count(1, 3).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn high_severity_adds_immediate_timeout() {
        let service = enabled_service().await;
        let outcome = service
            .check_message(&snapshot("click https://grabify.link/xyz"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.violation.severity, Severity::High);
        assert_eq!(outcome.immediate_timeout_secs, Some(300));
        assert_eq!(outcome.warn, Some(WarnNotice { count: 1, max: 3 }));
    }

    #[tokio::test]
    async fn warn_budget_punishes_once_and_resets() {
        let service = enabled_service().await;

        // Three medium violations with distinct content to stay clear of
        // the duplicate detector.
        let first = service
            .check_message(&snapshot("discord.gg/aaa111"))
            .await
            .unwrap()
            .unwrap();
        assert!(first.punishment.is_none());

        let second = service
            .check_message(&snapshot("discord.gg/bbb222"))
            .await
            .unwrap()
            .unwrap();
        assert!(second.punishment.is_none());
        assert_eq!(second.warn, Some(WarnNotice { count: 2, max: 3 }));

        let third = service
            .check_message(&snapshot("discord.gg/ccc333"))
            .await
            .unwrap()
            .unwrap();
        let punishment = third.punishment.unwrap();
        assert_eq!(punishment.action, crate::core::automod::WarnAction::Mute);
        assert_eq!(punishment.duration_secs, 600);
        assert_eq!(punishment.warn_count, 3);

        // Slate wiped: the fourth violation starts the count at one.
        assert_eq!(service.active_warn_count(1, 3).await.unwrap(), 0);
        let fourth = service
            .check_message(&snapshot("discord.gg/ddd444"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fourth.warn, Some(WarnNotice { count: 1, max: 3 }));
        assert!(fourth.punishment.is_none());
    }

    #[tokio::test]
    async fn first_match_wins_for_mixed_violations() {
        let service = enabled_service().await;
        let outcome = service
            .check_message(&snapshot("fuck this, join discord.gg/abc123"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.violation.reason, "Discord Invite Link");
        // Exactly one warn recorded for the message.
        assert_eq!(service.active_warn_count(1, 3).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn whitelisted_user_bypasses_pipeline() {
        let service = enabled_service().await;
        service
            .add_whitelist(1, WhitelistKind::User, 3)
            .await
            .unwrap();

        let outcome = service
            .check_message(&snapshot("discord.gg/abc123"))
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn whitelisted_channel_bypasses_pipeline() {
        let service = enabled_service().await;
        service
            .add_whitelist(1, WhitelistKind::Channel, 2)
            .await
            .unwrap();

        let outcome = service
            .check_message(&snapshot("discord.gg/abc123"))
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn custom_word_is_enforced_after_add() {
        let service = enabled_service().await;
        assert!(service
            .check_message(&snapshot("bananas are fine"))
            .await
            .unwrap()
            .is_none());

        assert!(service.add_word(1, "Bananas").await.unwrap());
        let outcome = service
            .check_message(&snapshot("bananas again"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.violation.reason, "Blocked Word Detected");

        // Removing it lifts the block again.
        assert!(service.remove_word(1, "bananas").await.unwrap());
        assert!(service
            .check_message(&snapshot("bananas forever"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn manual_warn_escalates_like_automatic() {
        let service = enabled_service().await;

        for i in 0..2 {
            let (notice, punishment) = service
                .warn_user(1, 3, 42, &format!("rule {}", i))
                .await
                .unwrap();
            assert_eq!(notice.count, i + 1);
            assert!(punishment.is_none());
        }

        let (notice, punishment) = service.warn_user(1, 3, 42, "final").await.unwrap();
        assert_eq!(notice.count, 3);
        assert!(punishment.is_some());
        assert_eq!(service.active_warn_count(1, 3).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn config_validation_rejects_out_of_range() {
        let service = enabled_service().await;
        let mut config = service.get_config(1).await.unwrap().unwrap();
        config.spam_threshold = 1;
        let err = service.save_config(1, config).await.unwrap_err();
        assert!(matches!(err, AutomodError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn config_cache_invalidated_on_save() {
        let service = enabled_service().await;

        // Prime the cache.
        assert!(service.get_config(1).await.unwrap().unwrap().anti_invite);

        let mut config = service.get_config(1).await.unwrap().unwrap();
        config.anti_invite = false;
        service.save_config(1, config).await.unwrap();

        assert!(!service.get_config(1).await.unwrap().unwrap().anti_invite);
        let outcome = service
            .check_message(&snapshot("discord.gg/abc123"))
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn action_log_records_the_trail() {
        let service = enabled_service().await;
        service
            .check_message(&snapshot("join discord.gg/abc123"))
            .await
            .unwrap();

        let actions = service.recent_actions(1, 10).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, "warn");
        assert_eq!(actions[0].reason, "Discord Invite Link");
    }

    struct FreeTier;

    impl EntitlementProvider for FreeTier {
        fn has_feature(&self, _guild_id: u64, feature: Feature) -> bool {
            !matches!(feature, Feature::AntiInvite)
        }
    }

    #[tokio::test]
    async fn missing_entitlement_masks_detector() {
        let service = AutomodService::new(InMemoryAutomodStore::new(), FreeTier);
        service.setup(1, 999).await.unwrap();

        let outcome = service
            .check_message(&snapshot("discord.gg/abc123"))
            .await
            .unwrap();
        assert!(outcome.is_none());
    }
}
