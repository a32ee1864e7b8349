// Rolling per-user message state for the flood and duplicate detectors.
// Everything lives in process memory; a restart simply forgets the windows.

use std::time::{Duration, Instant};

use dashmap::DashMap;

const DUPLICATE_HISTORY_CAP: usize = 15;
const DUPLICATE_HISTORY_TRIM: usize = 10;
const DUPLICATE_WINDOW: usize = 5;
const DUPLICATE_THRESHOLD: usize = 3;
const SWEEP_MAX_AGE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GuildUserKey {
    guild_id: u64,
    user_id: u64,
}

#[derive(Debug, Default)]
struct UserWindow {
    timestamps: Vec<Instant>,
    recent_bodies: Vec<String>,
}

/// Concurrent tracker keyed by (guild, user). The entry API gives one
/// lock per bucket, so two messages from the same user serialize while
/// different users proceed in parallel.
#[derive(Debug, Default)]
pub struct RollingTracker {
    windows: DashMap<GuildUserKey, UserWindow>,
}

impl RollingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message timestamp and report whether the flood threshold
    /// was hit: `threshold` or more messages within `interval_secs`.
    /// On a hit the window clears, so the next burst counts from zero.
    pub fn note_message(
        &self,
        guild_id: u64,
        user_id: u64,
        now: Instant,
        interval_secs: u32,
        threshold: u32,
    ) -> bool {
        let key = GuildUserKey { guild_id, user_id };
        let mut window = self.windows.entry(key).or_default();
        let interval = Duration::from_secs(u64::from(interval_secs));

        window.timestamps.push(now);
        window
            .timestamps
            .retain(|t| now.duration_since(*t) < interval);

        if window.timestamps.len() >= threshold as usize {
            window.timestamps.clear();
            return true;
        }
        false
    }

    /// Record a message body and report whether the user just sent
    /// identical content three times in a row. Attachment-only messages
    /// (empty bodies) are not recorded. On a hit the history clears.
    pub fn note_body(&self, guild_id: u64, user_id: u64, content: &str) -> bool {
        let body = content.trim().to_lowercase();
        if body.is_empty() {
            return false;
        }

        let key = GuildUserKey { guild_id, user_id };
        let mut window = self.windows.entry(key).or_default();

        window.recent_bodies.push(body);
        if window.recent_bodies.len() > DUPLICATE_HISTORY_CAP {
            let drop = window.recent_bodies.len() - DUPLICATE_HISTORY_TRIM;
            window.recent_bodies.drain(..drop);
        }

        let recent: Vec<&String> = window
            .recent_bodies
            .iter()
            .rev()
            .take(DUPLICATE_WINDOW)
            .collect();
        if recent.len() >= DUPLICATE_THRESHOLD && recent.windows(2).all(|w| w[0] == w[1]) {
            window.recent_bodies.clear();
            return true;
        }
        false
    }

    /// Drop stale timestamps, trim oversized duplicate histories and
    /// remove empty buckets. Called from a periodic background task.
    pub fn sweep(&self, now: Instant) {
        self.windows.retain(|_, window| {
            window
                .timestamps
                .retain(|t| now.duration_since(*t) < SWEEP_MAX_AGE);
            if window.recent_bodies.len() > DUPLICATE_HISTORY_TRIM {
                let drop = window.recent_bodies.len() - DUPLICATE_WINDOW;
                window.recent_bodies.drain(..drop);
            }
            !window.timestamps.is_empty() || !window.recent_bodies.is_empty()
        });
    }

    /// Forget one user's windows. Used when their message triggers a
    /// flood or duplicate hit so the punishment does not cascade.
    pub fn reset_user(&self, guild_id: u64, user_id: u64) {
        self.windows.remove(&GuildUserKey { guild_id, user_id });
    }

    #[cfg(test)]
    fn bucket_count(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flood_triggers_at_threshold_and_resets() {
        let tracker = RollingTracker::new();
        let now = Instant::now();

        for i in 0..4 {
            assert!(!tracker.note_message(1, 10, now + Duration::from_millis(i * 100), 5, 5));
        }
        assert!(tracker.note_message(1, 10, now + Duration::from_millis(400), 5, 5));

        // Window cleared: the next message counts from one again.
        assert!(!tracker.note_message(1, 10, now + Duration::from_millis(500), 5, 5));
    }

    #[test]
    fn flood_window_slides() {
        let tracker = RollingTracker::new();
        let now = Instant::now();

        for i in 0..4 {
            tracker.note_message(1, 10, now + Duration::from_secs(i), 5, 5);
        }
        // Fifth message 6s after the first: the first two fell out.
        assert!(!tracker.note_message(1, 10, now + Duration::from_secs(6), 5, 5));
    }

    #[test]
    fn users_are_independent() {
        let tracker = RollingTracker::new();
        let now = Instant::now();

        for _ in 0..4 {
            tracker.note_message(1, 10, now, 5, 5);
            tracker.note_message(1, 11, now, 5, 5);
        }
        assert!(tracker.note_message(1, 10, now, 5, 5));
        assert!(tracker.note_message(1, 11, now, 5, 5));
    }

    #[test]
    fn duplicate_triggers_on_three_identical() {
        let tracker = RollingTracker::new();
        assert!(!tracker.note_body(1, 10, "buy my stuff"));
        assert!(!tracker.note_body(1, 10, "Buy My Stuff"));
        assert!(tracker.note_body(1, 10, "BUY MY STUFF  "));
    }

    #[test]
    fn duplicate_requires_consecutive_identical() {
        let tracker = RollingTracker::new();
        assert!(!tracker.note_body(1, 10, "spam"));
        assert!(!tracker.note_body(1, 10, "spam"));
        assert!(!tracker.note_body(1, 10, "something else"));
        assert!(!tracker.note_body(1, 10, "spam"));
    }

    #[test]
    fn duplicate_history_clears_on_hit() {
        let tracker = RollingTracker::new();
        for _ in 0..2 {
            tracker.note_body(1, 10, "again");
        }
        assert!(tracker.note_body(1, 10, "again"));
        assert!(!tracker.note_body(1, 10, "again"));
        assert!(!tracker.note_body(1, 10, "again"));
        assert!(tracker.note_body(1, 10, "again"));
    }

    #[test]
    fn empty_bodies_are_ignored() {
        let tracker = RollingTracker::new();
        for _ in 0..5 {
            assert!(!tracker.note_body(1, 10, "   "));
        }
    }

    #[test]
    fn sweep_drops_stale_buckets() {
        let tracker = RollingTracker::new();
        let now = Instant::now();

        tracker.note_message(1, 10, now, 5, 5);
        tracker.note_message(1, 11, now + Duration::from_secs(90), 5, 5);
        assert_eq!(tracker.bucket_count(), 2);

        tracker.sweep(now + Duration::from_secs(120));
        assert_eq!(tracker.bucket_count(), 1);
    }

    #[test]
    fn reset_user_forgets_state() {
        let tracker = RollingTracker::new();
        let now = Instant::now();

        for _ in 0..4 {
            tracker.note_message(1, 10, now, 5, 5);
        }
        tracker.reset_user(1, 10);
        assert!(!tracker.note_message(1, 10, now, 5, 5));
    }
}
