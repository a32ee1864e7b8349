// The detector cascade. Detectors run in a fixed order and the first hit
// wins, so a message carrying both an invite and a blocked word is reported
// as an invite violation only. Reordering entries changes user-visible
// behavior; treat the CASCADE slice as part of the contract.

use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;

use super::automod_models::{AutomodConfig, MessageSnapshot, Severity, Violation};
use super::lexicon::{is_allowed_domain, GuildLexicon};
use super::tracker::RollingTracker;

static INVITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(discord\.(gg|io|me|li|com/invite)|discordapp\.com/invite|discord\.com/invite)/?[a-zA-Z0-9-]+",
    )
    .unwrap()
});

static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)https?://([^\s/<>"']+)"#).unwrap());

// Custom Discord emoji tokens plus the common Unicode emoji blocks. A run
// of adjacent emoji is one match, matching how users perceive "one blob".
static EMOJI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"<a?:\w+:\d+>|[\u{1F600}-\u{1F64F}\u{1F300}-\u{1F5FF}\u{1F680}-\u{1F6FF}\u{1F1E0}-\u{1F1FF}\u{2702}-\u{27B0}\u{24C2}-\u{1F251}\u{1F900}-\u{1F9FF}\u{1FA00}-\u{1FA6F}\u{1FA70}-\u{1FAFF}\u{2600}-\u{26FF}]+",
    )
    .unwrap()
});

// Three or more stacked combining marks. Runs on the raw content; the
// normalizer would have stripped the marks already.
static ZALGO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{0300}-\u{036F}\u{0489}\u{1DC0}-\u{1DFF}\u{20D0}-\u{20FF}\u{FE20}-\u{FE2F}]{3,}")
        .unwrap()
});

const REPEATED_CHAR_LIMIT: usize = 10;
const REPEATED_WORD_LIMIT: usize = 5;
const WALL_OF_TEXT_CHARS: usize = 2000;
const ATTACHMENT_LIMIT: usize = 5;

/// Everything a detector may look at. `config` is the guild's effective
/// configuration with plan-gated toggles already masked off.
pub struct DetectorContext<'a> {
    pub snapshot: &'a MessageSnapshot,
    pub normalized: &'a str,
    pub config: &'a AutomodConfig,
    pub lexicon: &'a GuildLexicon,
    pub tracker: &'a RollingTracker,
    pub now: Instant,
}

type DetectorFn = fn(&DetectorContext<'_>) -> Option<Violation>;

/// Evaluation order is the contract: stateful spam checks first, link
/// checks before text checks, cheap counters before the lexicon scan.
pub const CASCADE: &[DetectorFn] = &[
    message_flood,
    duplicate_messages,
    invite_link,
    blocked_link,
    too_many_links,
    excessive_caps,
    mass_ping,
    mention_spam,
    emoji_spam,
    newline_spam,
    zalgo_text,
    repeated_characters,
    repeated_words,
    bad_words,
    wall_of_text,
    attachment_spam,
];

/// Run the cascade, returning the first violation found.
pub fn run_cascade(ctx: &DetectorContext<'_>) -> Option<Violation> {
    CASCADE.iter().find_map(|detector| detector(ctx))
}

fn message_flood(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_spam {
        return None;
    }
    let hit = ctx.tracker.note_message(
        ctx.snapshot.guild_id,
        ctx.snapshot.author_id,
        ctx.now,
        ctx.config.spam_interval_secs,
        ctx.config.spam_threshold,
    );
    hit.then(|| Violation::new("Spam Detected (Message Flood)", Severity::Medium))
}

fn duplicate_messages(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_spam {
        return None;
    }
    let hit = ctx.tracker.note_body(
        ctx.snapshot.guild_id,
        ctx.snapshot.author_id,
        &ctx.snapshot.content,
    );
    hit.then(|| Violation::new("Spam Detected (Duplicate Messages)", Severity::Medium))
}

fn invite_link(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_invite || ctx.snapshot.content.is_empty() {
        return None;
    }
    INVITE_RE
        .is_match(&ctx.snapshot.content)
        .then(|| Violation::new("Discord Invite Link", Severity::Medium))
}

/// Host part of each URL in the message, lowercased with any port stripped.
fn message_hosts(content: &str) -> impl Iterator<Item = String> + '_ {
    LINK_RE.captures_iter(content).filter_map(|caps| {
        let host = caps.get(1)?.as_str().to_lowercase();
        Some(host.split(':').next().unwrap_or(&host).to_string())
    })
}

fn blocked_link(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.blocked_links_enabled || ctx.snapshot.content.is_empty() {
        return None;
    }
    for host in message_hosts(&ctx.snapshot.content) {
        if ctx.lexicon.find_blocked_domain(&host).is_some() {
            return Some(Violation::new(
                format!("Blocked Link Detected: `{}`", host),
                Severity::High,
            ));
        }
    }
    None
}

fn too_many_links(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_link || ctx.snapshot.content.is_empty() {
        return None;
    }
    let count = message_hosts(&ctx.snapshot.content)
        .filter(|host| !is_allowed_domain(host))
        .count();
    let max = ctx.config.max_links as usize;
    (count > max).then(|| {
        Violation::new(format!("Too Many Links ({}/{})", count, max), Severity::Low)
    })
}

fn excessive_caps(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_caps || ctx.snapshot.content.is_empty() {
        return None;
    }
    let alpha: Vec<char> = ctx
        .snapshot
        .content
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect();
    if alpha.len() < ctx.config.caps_min_length as usize {
        return None;
    }
    let upper = alpha.iter().filter(|c| c.is_uppercase()).count();
    let ratio = (upper as f64 / alpha.len() as f64) * 100.0;
    (ratio >= f64::from(ctx.config.caps_percentage)).then(|| {
        Violation::new(format!("Excessive Caps ({:.0}%)", ratio), Severity::Low)
    })
}

fn mass_ping(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_mention_spam || !ctx.config.anti_massping {
        return None;
    }
    ctx.snapshot
        .mentions_everyone
        .then(|| Violation::new("Mass Ping (@everyone/@here)", Severity::High))
}

fn mention_spam(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_mention_spam {
        return None;
    }
    let count = ctx.snapshot.mention_count;
    let max = ctx.config.max_mentions as usize;
    (count > max).then(|| {
        Violation::new(
            format!("Mention Spam ({}/{})", count, max),
            Severity::Medium,
        )
    })
}

fn emoji_spam(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_emoji_spam || ctx.snapshot.content.is_empty() {
        return None;
    }
    let count = EMOJI_RE.find_iter(&ctx.snapshot.content).count();
    let max = ctx.config.max_emojis as usize;
    (count > max)
        .then(|| Violation::new(format!("Emoji Spam ({}/{})", count, max), Severity::Low))
}

fn newline_spam(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_newline_spam || ctx.snapshot.content.is_empty() {
        return None;
    }
    let count = ctx.snapshot.content.matches('\n').count();
    let max = ctx.config.max_lines as usize;
    (count > max).then(|| {
        Violation::new(
            format!("Newline Spam ({}/{} lines)", count, max),
            Severity::Low,
        )
    })
}

fn zalgo_text(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_zalgo || ctx.snapshot.content.is_empty() {
        return None;
    }
    ZALGO_RE
        .is_match(&ctx.snapshot.content)
        .then(|| Violation::new("Zalgo/Corrupted Text", Severity::Medium))
}

fn repeated_characters(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_spam || ctx.snapshot.content.is_empty() {
        return None;
    }
    let mut run = 0usize;
    let mut last: Option<char> = None;
    for c in ctx.snapshot.content.chars() {
        if last == Some(c) {
            run += 1;
        } else {
            run = 1;
            last = Some(c);
        }
        if run >= REPEATED_CHAR_LIMIT {
            return Some(Violation::new(
                "Character Spam (Repeated Characters)",
                Severity::Low,
            ));
        }
    }
    None
}

fn repeated_words(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_spam || ctx.snapshot.content.is_empty() {
        return None;
    }
    let mut run = 0usize;
    let mut last: Option<&str> = None;
    for word in ctx.snapshot.content.split_whitespace() {
        if last == Some(word) {
            run += 1;
        } else {
            run = 1;
            last = Some(word);
        }
        if run >= REPEATED_WORD_LIMIT {
            return Some(Violation::new("Word Spam (Repeated Words)", Severity::Low));
        }
    }
    None
}

fn bad_words(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.bad_words_enabled || ctx.normalized.is_empty() {
        return None;
    }
    ctx.lexicon
        .find_bad_word(ctx.normalized)
        .map(|_| Violation::new("Blocked Word Detected", Severity::Medium))
}

fn wall_of_text(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_newline_spam {
        return None;
    }
    (ctx.snapshot.content.chars().count() > WALL_OF_TEXT_CHARS)
        .then(|| Violation::new("Wall of Text (2000+ chars)", Severity::Low))
}

fn attachment_spam(ctx: &DetectorContext<'_>) -> Option<Violation> {
    if !ctx.config.anti_spam {
        return None;
    }
    let count = ctx.snapshot.attachment_count;
    (count > ATTACHMENT_LIMIT).then(|| {
        Violation::new(format!("Attachment Spam ({} files)", count), Severity::Medium)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::automod::normalizer::normalize;

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

    struct Fixture {
        config: AutomodConfig,
        lexicon: GuildLexicon,
        tracker: RollingTracker,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                config: AutomodConfig {
                    enabled: true,
                    ..AutomodConfig::default()
                },
                lexicon: GuildLexicon::default(),
                tracker: RollingTracker::new(),
            }
        }

        fn check(&self, snapshot: &MessageSnapshot) -> Option<Violation> {
            let normalized = normalize(&snapshot.content);
            run_cascade(&DetectorContext {
                snapshot,
                normalized: &normalized,
                config: &self.config,
                lexicon: &self.lexicon,
                tracker: &self.tracker,
                now: Instant::now(),
            })
        }
    }

    #[test]
    fn clean_message_passes() {
        let fx = Fixture::new();
        assert_eq!(fx.check(&snapshot("just saying hi")), None);
    }

    #[test]
    fn invite_link_is_medium() {
        let fx = Fixture::new();
        let v = fx.check(&snapshot("join us https://discord.gg/abc123")).unwrap();
        assert_eq!(v.reason, "Discord Invite Link");
        assert_eq!(v.severity, Severity::Medium);
    }

    #[test]
    fn invite_beats_bad_word() {
        // First match wins: invite (position 3) outranks bad words (14).
        let fx = Fixture::new();
        let v = fx
            .check(&snapshot("fuck it, join discord.gg/abc123"))
            .unwrap();
        assert_eq!(v.reason, "Discord Invite Link");
    }

    #[test]
    fn blocked_link_is_high() {
        let fx = Fixture::new();
        let v = fx
            .check(&snapshot("free nitro at https://grabify.link/xyz"))
            .unwrap();
        assert_eq!(v.reason, "Blocked Link Detected: `grabify.link`");
        assert_eq!(v.severity, Severity::High);
    }

    #[test]
    fn blocked_link_strips_port() {
        let fx = Fixture::new();
        let v = fx
            .check(&snapshot("http://grabify.link:8080/xyz"))
            .unwrap();
        assert_eq!(v.reason, "Blocked Link Detected: `grabify.link`");
    }

    #[test]
    fn link_count_respects_allow_list() {
        let mut fx = Fixture::new();
        fx.config.anti_link = true;
        fx.config.max_links = 1;

        // Two YouTube links are allowed, two unknown hosts exceed max 1.
        assert_eq!(
            fx.check(&snapshot(
                "https://youtube.com/a https://youtube.com/b"
            )),
            None
        );
        let v = fx
            .check(&snapshot("https://foo.example/a https://bar.example/b"))
            .unwrap();
        assert_eq!(v.reason, "Too Many Links (2/1)");
        assert_eq!(v.severity, Severity::Low);
    }

    #[test]
    fn excessive_caps_reports_ratio() {
        let fx = Fixture::new();
        let v = fx.check(&snapshot("HELLO WORLD!!!")).unwrap();
        assert_eq!(v.reason, "Excessive Caps (100%)");
        assert_eq!(v.severity, Severity::Low);
    }

    #[test]
    fn short_shouting_is_tolerated() {
        // Nine letters, below the default minimum of ten.
        let fx = Fixture::new();
        assert_eq!(fx.check(&snapshot("NICE SHOT")), None);
    }

    #[test]
    fn mixed_case_below_threshold_passes() {
        let fx = Fixture::new();
        assert_eq!(fx.check(&snapshot("Hello World, nothing loud here")), None);
    }

    #[test]
    fn mass_ping_is_high() {
        let fx = Fixture::new();
        let mut snap = snapshot("hey @everyone");
        snap.mentions_everyone = true;
        let v = fx.check(&snap).unwrap();
        assert_eq!(v.reason, "Mass Ping (@everyone/@here)");
        assert_eq!(v.severity, Severity::High);
    }

    #[test]
    fn mention_spam_is_medium() {
        let fx = Fixture::new();
        let mut snap = snapshot("ping ping ping");
        snap.mention_count = 6;
        let v = fx.check(&snap).unwrap();
        assert_eq!(v.reason, "Mention Spam (6/5)");
        assert_eq!(v.severity, Severity::Medium);
    }

    #[test]
    fn emoji_runs_count_once() {
        let mut fx = Fixture::new();
        fx.config.max_emojis = 3;

        // One run of emoji is a single blob.
        assert_eq!(fx.check(&snapshot("😀😀😀😀😀😀")), None);
        let v = fx
            .check(&snapshot("😀 x 😀 x 😀 x 😀 x"))
            .unwrap();
        assert_eq!(v.reason, "Emoji Spam (4/3)");
    }

    #[test]
    fn custom_emoji_tokens_count() {
        let mut fx = Fixture::new();
        fx.config.max_emojis = 2;
        let v = fx
            .check(&snapshot("<:a:1> b <:a:1> c <a:spin:22> d"))
            .unwrap();
        assert_eq!(v.reason, "Emoji Spam (3/2)");
    }

    #[test]
    fn newline_spam_counts_breaks() {
        let mut fx = Fixture::new();
        fx.config.max_lines = 3;
        let v = fx.check(&snapshot("a\nb\nc\nd\ne")).unwrap();
        assert_eq!(v.reason, "Newline Spam (4/3 lines)");
    }

    #[test]
    fn zalgo_is_medium() {
        let fx = Fixture::new();
        let v = fx
            .check(&snapshot("h\u{0300}\u{0301}\u{0302}\u{0303}ello there friend"))
            .unwrap();
        assert_eq!(v.reason, "Zalgo/Corrupted Text");
        assert_eq!(v.severity, Severity::Medium);
    }

    #[test]
    fn light_diacritics_pass() {
        let fx = Fixture::new();
        assert_eq!(fx.check(&snapshot("crème brûlée is great")), None);
    }

    #[test]
    fn repeated_characters_need_ten() {
        let fx = Fixture::new();
        assert_eq!(fx.check(&snapshot("weeeeeell okay")), None);
        let v = fx.check(&snapshot("weeeeeeeeeeell okay")).unwrap();
        assert_eq!(v.reason, "Character Spam (Repeated Characters)");
    }

    #[test]
    fn repeated_words_need_five() {
        let fx = Fixture::new();
        assert_eq!(fx.check(&snapshot("no no no no way")), None);
        let v = fx.check(&snapshot("no no no no no way")).unwrap();
        assert_eq!(v.reason, "Word Spam (Repeated Words)");
    }

    #[test]
    fn bad_word_detected_after_normalization() {
        let fx = Fixture::new();
        let v = fx.check(&snapshot("you are a b1tch")).unwrap();
        assert_eq!(v.reason, "Blocked Word Detected");
        assert_eq!(v.severity, Severity::Medium);
    }

    #[test]
    fn boundary_rule_spares_class() {
        let fx = Fixture::new();
        assert_eq!(fx.check(&snapshot("heading to class now, see you")), None);
        assert!(fx.check(&snapshot("you ass")).is_some());
    }

    #[test]
    fn wall_of_text_is_low() {
        let fx = Fixture::new();
        let v = fx.check(&snapshot(&"a b ".repeat(600))).unwrap();
        assert_eq!(v.reason, "Wall of Text (2000+ chars)");
        assert_eq!(v.severity, Severity::Low);
    }

    #[test]
    fn attachment_spam_is_medium() {
        let fx = Fixture::new();
        let mut snap = snapshot("");
        snap.attachment_count = 6;
        let v = fx.check(&snap).unwrap();
        assert_eq!(v.reason, "Attachment Spam (6 files)");
        assert_eq!(v.severity, Severity::Medium);
    }

    #[test]
    fn disabled_toggle_skips_detector() {
        let mut fx = Fixture::new();
        fx.config.anti_invite = false;
        let v = fx.check(&snapshot("https://discord.gg/abc123"));
        assert_eq!(v, None);
    }
}
