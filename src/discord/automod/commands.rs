// AutoMod slash commands for configuration and moderation.
//
// Everything hangs off one `/automod` command with subcommands and
// subcommand groups, mirroring how moderators expect to find things:
// setup/status/config for the guild, word/domain/whitelist for lists,
// warn/warnings/clearwarns/log for the moderation trail.

use std::sync::Arc;

use crate::core::automod::{
    lexicon, AllowAllEntitlements, AutomodError, AutomodService, Feature, WarnAction,
    WhitelistKind,
};
use crate::discord::events::enforce_punishment;
use crate::infra::automod::SqliteAutomodStore;
use poise::serenity_prelude as serenity;

/// Shared state for all commands.
pub struct Data {
    pub automod: Arc<AutomodService<SqliteAutomodStore, AllowAllEntitlements>>,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

#[derive(poise::ChoiceParameter)]
pub enum PunishmentChoice {
    #[name = "mute"]
    Mute,
    #[name = "kick"]
    Kick,
    #[name = "ban"]
    Ban,
}

impl From<PunishmentChoice> for WarnAction {
    fn from(choice: PunishmentChoice) -> Self {
        match choice {
            PunishmentChoice::Mute => WarnAction::Mute,
            PunishmentChoice::Kick => WarnAction::Kick,
            PunishmentChoice::Ban => WarnAction::Ban,
        }
    }
}

#[derive(poise::ChoiceParameter)]
pub enum RuleChoice {
    #[name = "anti_spam"]
    AntiSpam,
    #[name = "anti_caps"]
    AntiCaps,
    #[name = "anti_mention_spam"]
    AntiMentionSpam,
    #[name = "anti_emoji_spam"]
    AntiEmojiSpam,
    #[name = "anti_newline_spam"]
    AntiNewlineSpam,
    #[name = "anti_invite"]
    AntiInvite,
    #[name = "anti_link"]
    AntiLink,
    #[name = "anti_zalgo"]
    AntiZalgo,
    #[name = "anti_massping"]
    AntiMassping,
    #[name = "bad_words"]
    BadWords,
    #[name = "blocked_links"]
    BlockedLinks,
}

/// AutoMod configuration and moderation commands.
#[poise::command(
    slash_command,
    subcommands(
        "setup",
        "status",
        "enable",
        "disable",
        "config",
        "rule",
        "punishment",
        "word",
        "domain",
        "whitelist",
        "warn",
        "warnings",
        "clearwarns",
        "log"
    ),
    required_permissions = "MANAGE_GUILD",
    guild_only
)]
pub async fn automod(_ctx: Context<'_>) -> Result<(), Error> {
    // Parent command - shows help
    Ok(())
}

/// Enable AutoMod and set the moderation log channel.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn setup(
    ctx: Context<'_>,
    #[description = "Channel for moderation log embeds"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    ctx.data()
        .automod
        .setup(guild_id.get(), channel.id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    ctx.say(format!(
        "✅ AutoMod is now **enabled**. Moderation logs go to <#{}>.",
        channel.id
    ))
    .await?;
    Ok(())
}

/// Show current AutoMod status and settings.
#[poise::command(slash_command, guild_only)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let automod = &ctx.data().automod;

    let Some(config) = automod
        .get_config(guild_id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?
    else {
        ctx.say("❌ AutoMod has not been set up yet. Run `/automod setup` first.")
            .await?;
        return Ok(());
    };

    let custom_words = automod
        .list_words(guild_id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;
    let custom_domains = automod
        .list_domains(guild_id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    let onoff = |enabled: bool| if enabled { "✅" } else { "❌" };

    let embed = serenity::CreateEmbed::new()
        .title("🛡️ AutoMod Status")
        .color(if config.enabled { 0x57F287 } else { 0xED4245 })
        .field(
            "Status",
            format!(
                "{} {}",
                onoff(config.enabled),
                if config.enabled { "Enabled" } else { "Disabled" }
            ),
            false,
        )
        .field(
            "Spam",
            format!(
                "{} flood ({} msgs / {}s)\n{} attachments, repeats, duplicates",
                onoff(config.anti_spam),
                config.spam_threshold,
                config.spam_interval_secs,
                onoff(config.anti_spam),
            ),
            true,
        )
        .field(
            "Text",
            format!(
                "{} caps (≥{}%, min {} letters)\n{} newlines (max {})\n{} zalgo",
                onoff(config.anti_caps),
                config.caps_percentage,
                config.caps_min_length,
                onoff(config.anti_newline_spam),
                config.max_lines,
                onoff(config.anti_zalgo),
            ),
            true,
        )
        .field(
            "Mentions & Emoji",
            format!(
                "{} mass ping\n{} mentions (max {})\n{} emoji (max {})",
                onoff(config.anti_massping),
                onoff(config.anti_mention_spam),
                config.max_mentions,
                onoff(config.anti_emoji_spam),
                config.max_emojis,
            ),
            true,
        )
        .field(
            "Links & Words",
            format!(
                "{} invites\n{} blocked links ({} built-in + {} custom)\n{} link limit (max {})\n{} bad words ({} built-in + {} custom)",
                onoff(config.anti_invite),
                onoff(config.blocked_links_enabled),
                lexicon::builtin_domain_count(),
                custom_domains.len(),
                onoff(config.anti_link),
                config.max_links,
                onoff(config.bad_words_enabled),
                lexicon::builtin_word_count(),
                custom_words.len(),
            ),
            false,
        )
        .field(
            "Escalation",
            format!(
                "{} warns → {} ({}min)\nWarns expire after {} days",
                config.max_warns,
                config.warn_action,
                config.warn_action_duration_secs / 60,
                config.warn_expire_days,
            ),
            false,
        );

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Enable AutoMod protection.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn enable(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    match ctx.data().automod.set_enabled(guild_id.get(), true).await {
        Ok(()) => {
            ctx.say("✅ AutoMod has been **enabled**.").await?;
        }
        Err(AutomodError::InvalidConfig(msg)) => {
            ctx.say(format!("❌ {}", msg)).await?;
        }
        Err(e) => return Err(Error::from(e.to_string())),
    }
    Ok(())
}

/// Disable AutoMod protection.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn disable(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    match ctx.data().automod.set_enabled(guild_id.get(), false).await {
        Ok(()) => {
            ctx.say("❌ AutoMod has been **disabled**.").await?;
        }
        Err(AutomodError::InvalidConfig(msg)) => {
            ctx.say(format!("❌ {}", msg)).await?;
        }
        Err(e) => return Err(Error::from(e.to_string())),
    }
    Ok(())
}

/// Adjust AutoMod thresholds.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
#[allow(clippy::too_many_arguments)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "Messages before a flood triggers (2-20)"] spam_threshold: Option<u32>,
    #[description = "Flood window in seconds (3-30)"] spam_interval: Option<u32>,
    #[description = "Caps percentage that triggers (50-100)"] caps_percentage: Option<u32>,
    #[description = "Minimum letters before caps are checked (5-50)"] caps_min_length: Option<u32>,
    #[description = "Max mentions per message (2-30)"] max_mentions: Option<u32>,
    #[description = "Max emoji per message (3-50)"] max_emojis: Option<u32>,
    #[description = "Max line breaks per message (5-100)"] max_lines: Option<u32>,
    #[description = "Max links per message (1-20)"] max_links: Option<u32>,
    #[description = "Warns before the punishment fires (1-10)"] max_warns: Option<u32>,
    #[description = "Days until a warn expires (1-365)"] warn_expire_days: Option<u32>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let automod = &ctx.data().automod;

    if !automod.has_feature(guild_id.get(), Feature::FullAutomod) {
        ctx.say("❌ Custom thresholds are not available on this server's plan.")
            .await?;
        return Ok(());
    }

    let Some(mut config) = automod
        .get_config(guild_id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?
    else {
        ctx.say("❌ AutoMod has not been set up yet. Run `/automod setup` first.")
            .await?;
        return Ok(());
    };

    if let Some(v) = spam_threshold {
        config.spam_threshold = v;
    }
    if let Some(v) = spam_interval {
        config.spam_interval_secs = v;
    }
    if let Some(v) = caps_percentage {
        config.caps_percentage = v;
    }
    if let Some(v) = caps_min_length {
        config.caps_min_length = v;
    }
    if let Some(v) = max_mentions {
        config.max_mentions = v;
    }
    if let Some(v) = max_emojis {
        config.max_emojis = v;
    }
    if let Some(v) = max_lines {
        config.max_lines = v;
    }
    if let Some(v) = max_links {
        config.max_links = v;
    }
    if let Some(v) = max_warns {
        config.max_warns = v;
    }
    if let Some(v) = warn_expire_days {
        config.warn_expire_days = v;
    }

    match automod.save_config(guild_id.get(), config.clone()).await {
        Ok(()) => {
            ctx.say(format!(
                "✅ AutoMod configuration updated!\n\
                 • Flood: {} msgs / {}s\n\
                 • Caps: ≥{}% over {} letters\n\
                 • Limits: {} mentions, {} emoji, {} lines, {} links\n\
                 • Escalation: {} warns, expiring after {} days",
                config.spam_threshold,
                config.spam_interval_secs,
                config.caps_percentage,
                config.caps_min_length,
                config.max_mentions,
                config.max_emojis,
                config.max_lines,
                config.max_links,
                config.max_warns,
                config.warn_expire_days,
            ))
            .await?;
        }
        Err(AutomodError::InvalidConfig(msg)) => {
            ctx.say(format!("❌ {}", msg)).await?;
        }
        Err(e) => return Err(Error::from(e.to_string())),
    }
    Ok(())
}

/// Turn an individual rule on or off.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn rule(
    ctx: Context<'_>,
    #[description = "Which rule to change"] rule: RuleChoice,
    #[description = "On or off"] enabled: bool,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let automod = &ctx.data().automod;

    let Some(mut config) = automod
        .get_config(guild_id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?
    else {
        ctx.say("❌ AutoMod has not been set up yet. Run `/automod setup` first.")
            .await?;
        return Ok(());
    };

    let name = match rule {
        RuleChoice::AntiSpam => {
            config.anti_spam = enabled;
            "anti_spam"
        }
        RuleChoice::AntiCaps => {
            config.anti_caps = enabled;
            "anti_caps"
        }
        RuleChoice::AntiMentionSpam => {
            config.anti_mention_spam = enabled;
            "anti_mention_spam"
        }
        RuleChoice::AntiEmojiSpam => {
            config.anti_emoji_spam = enabled;
            "anti_emoji_spam"
        }
        RuleChoice::AntiNewlineSpam => {
            config.anti_newline_spam = enabled;
            "anti_newline_spam"
        }
        RuleChoice::AntiInvite => {
            config.anti_invite = enabled;
            "anti_invite"
        }
        RuleChoice::AntiLink => {
            config.anti_link = enabled;
            "anti_link"
        }
        RuleChoice::AntiZalgo => {
            config.anti_zalgo = enabled;
            "anti_zalgo"
        }
        RuleChoice::AntiMassping => {
            config.anti_massping = enabled;
            "anti_massping"
        }
        RuleChoice::BadWords => {
            config.bad_words_enabled = enabled;
            "bad_words"
        }
        RuleChoice::BlockedLinks => {
            config.blocked_links_enabled = enabled;
            "blocked_links"
        }
    };

    ctx.data()
        .automod
        .save_config(guild_id.get(), config)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    ctx.say(format!(
        "{} Rule `{}` is now **{}**.",
        if enabled { "✅" } else { "❌" },
        name,
        if enabled { "on" } else { "off" }
    ))
    .await?;
    Ok(())
}

/// Set what happens when a user runs out of warns.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn punishment(
    ctx: Context<'_>,
    #[description = "Action at the warn limit"] action: PunishmentChoice,
    #[description = "Mute duration in seconds (60-604800)"] duration: Option<u32>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let automod = &ctx.data().automod;

    let Some(mut config) = automod
        .get_config(guild_id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?
    else {
        ctx.say("❌ AutoMod has not been set up yet. Run `/automod setup` first.")
            .await?;
        return Ok(());
    };

    config.warn_action = action.into();
    if let Some(secs) = duration {
        config.warn_action_duration_secs = secs;
    }

    match automod.save_config(guild_id.get(), config.clone()).await {
        Ok(()) => {
            ctx.say(format!(
                "✅ Punishment at {} warns: **{}**{}",
                config.max_warns,
                config.warn_action,
                if config.warn_action == WarnAction::Mute {
                    format!(" for {} minutes", config.warn_action_duration_secs / 60)
                } else {
                    String::new()
                }
            ))
            .await?;
        }
        Err(AutomodError::InvalidConfig(msg)) => {
            ctx.say(format!("❌ {}", msg)).await?;
        }
        Err(e) => return Err(Error::from(e.to_string())),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Custom word group
// ---------------------------------------------------------------------------

/// Manage the guild's custom blocked words.
#[poise::command(
    slash_command,
    subcommands("word_add", "word_remove", "word_list"),
    guild_only
)]
pub async fn word(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Block a custom word.
#[poise::command(slash_command, rename = "add", guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn word_add(
    ctx: Context<'_>,
    #[description = "Word to block"] word: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let added = ctx
        .data()
        .automod
        .add_word(guild_id.get(), &word)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if added {
        ctx.say(format!("✅ Blocked `{}`.", word.to_lowercase()))
            .await?;
    } else {
        ctx.say(format!("❌ `{}` is already blocked.", word.to_lowercase()))
            .await?;
    }
    Ok(())
}

/// Unblock a custom word.
#[poise::command(slash_command, rename = "remove", guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn word_remove(
    ctx: Context<'_>,
    #[description = "Word to unblock"] word: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let removed = ctx
        .data()
        .automod
        .remove_word(guild_id.get(), &word)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if removed {
        ctx.say(format!("✅ Unblocked `{}`.", word.to_lowercase()))
            .await?;
    } else {
        ctx.say(format!(
            "❌ `{}` is not on the custom list.",
            word.to_lowercase()
        ))
        .await?;
    }
    Ok(())
}

/// List the guild's custom blocked words.
#[poise::command(slash_command, rename = "list", guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn word_list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let words = ctx
        .data()
        .automod
        .list_words(guild_id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if words.is_empty() {
        ctx.say("No custom blocked words. The built-in lists still apply.")
            .await?;
    } else {
        ctx.say(format!(
            "Custom blocked words ({}): `{}`",
            words.len(),
            words.join("`, `")
        ))
        .await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Custom domain group
// ---------------------------------------------------------------------------

/// Manage the guild's custom blocked domains.
#[poise::command(
    slash_command,
    subcommands("domain_add", "domain_remove", "domain_list"),
    guild_only
)]
pub async fn domain(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Block a domain.
#[poise::command(slash_command, rename = "add", guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn domain_add(
    ctx: Context<'_>,
    #[description = "Domain to block, e.g. evil.example"] domain: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let added = ctx
        .data()
        .automod
        .add_domain(guild_id.get(), &domain)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if added {
        ctx.say(format!("✅ Blocked `{}`.", domain.to_lowercase()))
            .await?;
    } else {
        ctx.say(format!(
            "❌ `{}` is already blocked.",
            domain.to_lowercase()
        ))
        .await?;
    }
    Ok(())
}

/// Unblock a domain.
#[poise::command(slash_command, rename = "remove", guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn domain_remove(
    ctx: Context<'_>,
    #[description = "Domain to unblock"] domain: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let removed = ctx
        .data()
        .automod
        .remove_domain(guild_id.get(), &domain)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if removed {
        ctx.say(format!("✅ Unblocked `{}`.", domain.to_lowercase()))
            .await?;
    } else {
        ctx.say(format!(
            "❌ `{}` is not on the custom list.",
            domain.to_lowercase()
        ))
        .await?;
    }
    Ok(())
}

/// List the guild's custom blocked domains.
#[poise::command(slash_command, rename = "list", guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn domain_list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let domains = ctx
        .data()
        .automod
        .list_domains(guild_id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if domains.is_empty() {
        ctx.say("No custom blocked domains. The built-in lists still apply.")
            .await?;
    } else {
        ctx.say(format!(
            "Custom blocked domains ({}): `{}`",
            domains.len(),
            domains.join("`, `")
        ))
        .await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Whitelist group
// ---------------------------------------------------------------------------

/// Manage users, roles and channels that bypass AutoMod.
#[poise::command(
    slash_command,
    subcommands("whitelist_add", "whitelist_remove", "whitelist_list"),
    guild_only
)]
pub async fn whitelist(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

fn whitelist_target(
    user: Option<serenity::User>,
    role: Option<serenity::Role>,
    channel: Option<serenity::GuildChannel>,
) -> Option<(WhitelistKind, u64, String)> {
    if let Some(user) = user {
        return Some((WhitelistKind::User, user.id.get(), format!("<@{}>", user.id)));
    }
    if let Some(role) = role {
        return Some((WhitelistKind::Role, role.id.get(), format!("<@&{}>", role.id)));
    }
    if let Some(channel) = channel {
        return Some((
            WhitelistKind::Channel,
            channel.id.get(),
            format!("<#{}>", channel.id),
        ));
    }
    None
}

/// Whitelist a user, role or channel.
#[poise::command(slash_command, rename = "add", guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn whitelist_add(
    ctx: Context<'_>,
    #[description = "User to whitelist"] user: Option<serenity::User>,
    #[description = "Role to whitelist"] role: Option<serenity::Role>,
    #[description = "Channel to whitelist"] channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let Some((kind, target_id, mention)) = whitelist_target(user, role, channel) else {
        ctx.say("❌ Pass a user, a role or a channel.").await?;
        return Ok(());
    };

    let added = ctx
        .data()
        .automod
        .add_whitelist(guild_id.get(), kind, target_id)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if added {
        ctx.say(format!("✅ {} now bypasses AutoMod.", mention))
            .await?;
    } else {
        ctx.say(format!("❌ {} is already whitelisted.", mention))
            .await?;
    }
    Ok(())
}

/// Remove a whitelist entry.
#[poise::command(slash_command, rename = "remove", guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn whitelist_remove(
    ctx: Context<'_>,
    #[description = "User to remove"] user: Option<serenity::User>,
    #[description = "Role to remove"] role: Option<serenity::Role>,
    #[description = "Channel to remove"] channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let Some((kind, target_id, mention)) = whitelist_target(user, role, channel) else {
        ctx.say("❌ Pass a user, a role or a channel.").await?;
        return Ok(());
    };

    let removed = ctx
        .data()
        .automod
        .remove_whitelist(guild_id.get(), kind, target_id)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if removed {
        ctx.say(format!("✅ {} no longer bypasses AutoMod.", mention))
            .await?;
    } else {
        ctx.say(format!("❌ {} was not whitelisted.", mention))
            .await?;
    }
    Ok(())
}

/// List all whitelist entries.
#[poise::command(slash_command, rename = "list", guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn whitelist_list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let entries = ctx
        .data()
        .automod
        .list_whitelist(guild_id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if entries.is_empty() {
        ctx.say("The whitelist is empty.").await?;
        return Ok(());
    }

    let lines: Vec<String> = entries
        .iter()
        .map(|(kind, id)| match kind {
            WhitelistKind::User => format!("• user <@{}>", id),
            WhitelistKind::Role => format!("• role <@&{}>", id),
            WhitelistKind::Channel => format!("• channel <#{}>", id),
        })
        .collect();
    ctx.say(format!("AutoMod whitelist:\n{}", lines.join("\n")))
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Warn commands
// ---------------------------------------------------------------------------

/// Manually warn a user. Counts toward the auto-punishment budget.
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "User to warn"] user: serenity::User,
    #[description = "Reason for the warn"] reason: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let (notice, punishment) = ctx
        .data()
        .automod
        .warn_user(guild_id.get(), user.id.get(), ctx.author().id.get(), &reason)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if let Some(punishment) = &punishment {
        enforce_punishment(ctx.serenity_context(), guild_id, user.id, punishment).await;
        ctx.say(format!(
            "⚠️ Warned <@{}> ({}/{}) — warn limit reached, **{}** applied.",
            user.id, notice.count, notice.max, punishment.action
        ))
        .await?;
    } else {
        ctx.say(format!(
            "⚠️ Warned <@{}> ({}/{}): {}",
            user.id, notice.count, notice.max, reason
        ))
        .await?;
    }
    Ok(())
}

/// Show a user's warnings.
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "User to inspect"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let automod = &ctx.data().automod;

    let active = automod
        .active_warn_count(guild_id.get(), user.id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;
    let warns = automod
        .warnings(guild_id.get(), user.id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if warns.is_empty() {
        ctx.say(format!("<@{}> has no warnings.", user.id)).await?;
        return Ok(());
    }

    let lines: Vec<String> = warns
        .iter()
        .take(10)
        .map(|w| {
            format!(
                "{} {} — {}",
                if w.active { "🔴" } else { "⚪" },
                w.created_at.format("%Y-%m-%d"),
                w.reason
            )
        })
        .collect();

    let embed = serenity::CreateEmbed::new()
        .title(format!("Warnings — {} active", active))
        .color(0x5865F2)
        .description(lines.join("\n"));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Clear a user's active warnings.
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn clearwarns(
    ctx: Context<'_>,
    #[description = "User to clear"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let cleared = ctx
        .data()
        .automod
        .clear_warns(guild_id.get(), user.id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    ctx.say(format!(
        "✅ Cleared {} warning{} for <@{}>.",
        cleared,
        if cleared == 1 { "" } else { "s" },
        user.id
    ))
    .await?;
    Ok(())
}

/// Show the most recent AutoMod actions.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn log(
    ctx: Context<'_>,
    #[description = "How many entries to show (default 10)"] limit: Option<u32>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let limit = limit.unwrap_or(10).min(25);

    let actions = ctx
        .data()
        .automod
        .recent_actions(guild_id.get(), limit)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if actions.is_empty() {
        ctx.say("No AutoMod actions recorded yet.").await?;
        return Ok(());
    }

    let lines: Vec<String> = actions
        .iter()
        .map(|a| {
            format!(
                "`{}` <@{}> — {} ({})",
                a.action,
                a.user_id,
                a.reason,
                a.created_at.format("%Y-%m-%d %H:%M")
            )
        })
        .collect();

    let embed = serenity::CreateEmbed::new()
        .title("🛡️ AutoMod Log")
        .color(0x5865F2)
        .description(lines.join("\n"));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
