// This is the infra layer - it implements the traits defined in core.
// This file provides an IN-MEMORY implementation of AutomodStore.
//
// Used by the service tests and handy for running the bot without a
// database. State disappears on restart; the SQLite store is the one
// wired up in main.

use crate::core::automod::{
    ActionLogEntry, AutomodConfig, AutomodError, AutomodStore, Warn, WhitelistKind,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// A composite key for per-user state within a guild.
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
struct GuildUserKey {
    guild_id: u64,
    user_id: u64,
}

/// In-memory implementation of AutomodStore backed by DashMaps.
pub struct InMemoryAutomodStore {
    configs: DashMap<u64, AutomodConfig>,
    words: DashMap<u64, Vec<String>>,
    domains: DashMap<u64, Vec<String>>,
    whitelist: DashMap<u64, Vec<(WhitelistKind, u64)>>,
    warns: DashMap<GuildUserKey, Vec<Warn>>,
    actions: DashMap<u64, Vec<ActionLogEntry>>,
    next_warn_id: AtomicI64,
}

impl InMemoryAutomodStore {
    pub fn new() -> Self {
        Self {
            configs: DashMap::new(),
            words: DashMap::new(),
            domains: DashMap::new(),
            whitelist: DashMap::new(),
            warns: DashMap::new(),
            actions: DashMap::new(),
            next_warn_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryAutomodStore {
    fn default() -> Self {
        Self::new()
    }
}

fn add_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|v| v == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

fn remove_value(list: &mut Vec<String>, value: &str) -> bool {
    let before = list.len();
    list.retain(|v| v != value);
    list.len() != before
}

#[async_trait]
impl AutomodStore for InMemoryAutomodStore {
    async fn get_config(&self, guild_id: u64) -> Result<Option<AutomodConfig>, AutomodError> {
        Ok(self.configs.get(&guild_id).map(|c| c.clone()))
    }

    async fn save_config(
        &self,
        guild_id: u64,
        config: &AutomodConfig,
    ) -> Result<(), AutomodError> {
        self.configs.insert(guild_id, config.clone());
        Ok(())
    }

    async fn list_words(&self, guild_id: u64) -> Result<Vec<String>, AutomodError> {
        Ok(self.words.get(&guild_id).map(|w| w.clone()).unwrap_or_default())
    }

    async fn add_word(&self, guild_id: u64, word: &str) -> Result<bool, AutomodError> {
        Ok(add_unique(
            &mut self.words.entry(guild_id).or_default(),
            word,
        ))
    }

    async fn remove_word(&self, guild_id: u64, word: &str) -> Result<bool, AutomodError> {
        Ok(self
            .words
            .get_mut(&guild_id)
            .map(|mut list| remove_value(&mut list, word))
            .unwrap_or(false))
    }

    async fn list_domains(&self, guild_id: u64) -> Result<Vec<String>, AutomodError> {
        Ok(self
            .domains
            .get(&guild_id)
            .map(|d| d.clone())
            .unwrap_or_default())
    }

    async fn add_domain(&self, guild_id: u64, domain: &str) -> Result<bool, AutomodError> {
        Ok(add_unique(
            &mut self.domains.entry(guild_id).or_default(),
            domain,
        ))
    }

    async fn remove_domain(&self, guild_id: u64, domain: &str) -> Result<bool, AutomodError> {
        Ok(self
            .domains
            .get_mut(&guild_id)
            .map(|mut list| remove_value(&mut list, domain))
            .unwrap_or(false))
    }

    async fn add_whitelist(
        &self,
        guild_id: u64,
        kind: WhitelistKind,
        target_id: u64,
    ) -> Result<bool, AutomodError> {
        let mut entries = self.whitelist.entry(guild_id).or_default();
        if entries.contains(&(kind, target_id)) {
            return Ok(false);
        }
        entries.push((kind, target_id));
        Ok(true)
    }

    async fn remove_whitelist(
        &self,
        guild_id: u64,
        kind: WhitelistKind,
        target_id: u64,
    ) -> Result<bool, AutomodError> {
        Ok(self
            .whitelist
            .get_mut(&guild_id)
            .map(|mut entries| {
                let before = entries.len();
                entries.retain(|e| *e != (kind, target_id));
                entries.len() != before
            })
            .unwrap_or(false))
    }

    async fn list_whitelist(
        &self,
        guild_id: u64,
    ) -> Result<Vec<(WhitelistKind, u64)>, AutomodError> {
        Ok(self
            .whitelist
            .get(&guild_id)
            .map(|e| e.clone())
            .unwrap_or_default())
    }

    async fn is_whitelisted(
        &self,
        guild_id: u64,
        user_id: u64,
        role_ids: &[u64],
        channel_id: u64,
    ) -> Result<bool, AutomodError> {
        Ok(self
            .whitelist
            .get(&guild_id)
            .map(|entries| {
                entries.iter().any(|(kind, target)| match kind {
                    WhitelistKind::User => *target == user_id,
                    WhitelistKind::Role => role_ids.contains(target),
                    WhitelistKind::Channel => *target == channel_id,
                })
            })
            .unwrap_or(false))
    }

    async fn add_warn(
        &self,
        guild_id: u64,
        user_id: u64,
        moderator_id: u64,
        reason: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AutomodError> {
        let id = self.next_warn_id.fetch_add(1, Ordering::Relaxed);
        self.warns
            .entry(GuildUserKey { guild_id, user_id })
            .or_default()
            .push(Warn {
                id,
                guild_id,
                user_id,
                moderator_id,
                reason: reason.to_string(),
                created_at: Utc::now(),
                expires_at,
                active: true,
            });
        Ok(())
    }

    async fn count_active_warns(
        &self,
        guild_id: u64,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<u32, AutomodError> {
        Ok(self
            .warns
            .get(&GuildUserKey { guild_id, user_id })
            .map(|warns| {
                warns
                    .iter()
                    .filter(|w| w.active && w.expires_at > now)
                    .count() as u32
            })
            .unwrap_or(0))
    }

    async fn list_warns(&self, guild_id: u64, user_id: u64) -> Result<Vec<Warn>, AutomodError> {
        let mut warns = self
            .warns
            .get(&GuildUserKey { guild_id, user_id })
            .map(|w| w.clone())
            .unwrap_or_default();
        warns.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(warns)
    }

    async fn clear_warns(&self, guild_id: u64, user_id: u64) -> Result<u64, AutomodError> {
        Ok(self
            .warns
            .get_mut(&GuildUserKey { guild_id, user_id })
            .map(|mut warns| {
                let mut changed = 0;
                for warn in warns.iter_mut().filter(|w| w.active) {
                    warn.active = false;
                    changed += 1;
                }
                changed
            })
            .unwrap_or(0))
    }

    async fn log_action(&self, entry: &ActionLogEntry) -> Result<(), AutomodError> {
        self.actions
            .entry(entry.guild_id)
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn recent_actions(
        &self,
        guild_id: u64,
        limit: u32,
    ) -> Result<Vec<ActionLogEntry>, AutomodError> {
        Ok(self
            .actions
            .get(&guild_id)
            .map(|entries| {
                entries
                    .iter()
                    .rev()
                    .take(limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn config_roundtrip() {
        let store = InMemoryAutomodStore::new();
        assert!(store.get_config(1).await.unwrap().is_none());

        let config = AutomodConfig {
            enabled: true,
            max_warns: 5,
            ..AutomodConfig::default()
        };
        store.save_config(1, &config).await.unwrap();
        assert_eq!(store.get_config(1).await.unwrap(), Some(config));
    }

    #[tokio::test]
    async fn word_add_is_idempotent() {
        let store = InMemoryAutomodStore::new();
        assert!(store.add_word(1, "zut").await.unwrap());
        assert!(!store.add_word(1, "zut").await.unwrap());
        assert_eq!(store.list_words(1).await.unwrap(), vec!["zut"]);
        assert!(store.remove_word(1, "zut").await.unwrap());
        assert!(!store.remove_word(1, "zut").await.unwrap());
    }

    #[tokio::test]
    async fn expired_warns_do_not_count() {
        let store = InMemoryAutomodStore::new();
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
        assert_eq!(store.list_warns(1, 2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn clear_warns_soft_deactivates() {
        let store = InMemoryAutomodStore::new();
        let expires = Utc::now() + Duration::days(30);

        store.add_warn(1, 2, 0, "one", expires).await.unwrap();
        store.add_warn(1, 2, 0, "two", expires).await.unwrap();

        assert_eq!(store.clear_warns(1, 2).await.unwrap(), 2);
        assert_eq!(store.count_active_warns(1, 2, Utc::now()).await.unwrap(), 0);

        // History survives, just inactive.
        let warns = store.list_warns(1, 2).await.unwrap();
        assert_eq!(warns.len(), 2);
        assert!(warns.iter().all(|w| !w.active));
    }

    #[tokio::test]
    async fn whitelist_matches_roles() {
        let store = InMemoryAutomodStore::new();
        store
            .add_whitelist(1, WhitelistKind::Role, 77)
            .await
            .unwrap();

        assert!(store.is_whitelisted(1, 2, &[5, 77], 9).await.unwrap());
        assert!(!store.is_whitelisted(1, 2, &[5, 6], 9).await.unwrap());
    }
}
