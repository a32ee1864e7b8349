// Discord-specific AutoMod handling - translates core outcomes into
// Discord actions: deleting messages, DMing warns, timeouts, kicks, bans
// and log-channel embeds.
//
// Everything here is best-effort. The warn is already persisted by the
// time an outcome arrives, so a missing permission or a Discord hiccup
// only costs the platform side effect, never the record.

use std::time::Duration;

use crate::core::automod::{
    AutomodService, AutomodStore, EntitlementProvider, ModOutcome, Severity, WarnAction,
};
use crate::discord::Error;
use poise::serenity_prelude as serenity;

/// How long any single platform call may take before it is skipped.
const APPLY_TIMEOUT: Duration = Duration::from_secs(5);

const AUTOMOD_COLOR: u32 = 0x5865F2;
const ERROR_COLOR: u32 = 0xED4245;

/// Check a message and apply whatever the service decides.
///
/// Returns `true` if a violation was handled.
pub async fn handle_message<S: AutomodStore, E: EntitlementProvider>(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    automod: &AutomodService<S, E>,
) -> Result<bool, Error> {
    // Bots, webhooks and DMs are out of scope.
    if msg.author.bot || msg.webhook_id.is_some() {
        return Ok(false);
    }
    let guild_id = match msg.guild_id {
        Some(id) => id.get(),
        None => return Ok(false),
    };

    let (role_ids, is_admin) = member_info(ctx, msg);
    if is_admin {
        return Ok(false);
    }

    let snapshot = crate::core::automod::MessageSnapshot {
        guild_id,
        channel_id: msg.channel_id.get(),
        author_id: msg.author.id.get(),
        author_role_ids: role_ids,
        content: msg.content.clone(),
        attachment_count: msg.attachments.len(),
        mention_count: msg.mentions.len() + msg.mention_roles.len(),
        mentions_everyone: msg.mention_everyone,
    };

    let outcome = automod
        .check_message(&snapshot)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    let Some(outcome) = outcome else {
        return Ok(false);
    };

    apply_outcome(ctx, msg, &outcome).await;

    Ok(true)
}

/// Re-check an edited message. Editing a clean message into a violation
/// must not be a loophole.
pub async fn handle_message_edit<S: AutomodStore, E: EntitlementProvider>(
    ctx: &serenity::Context,
    old: Option<&serenity::Message>,
    new: Option<&serenity::Message>,
    automod: &AutomodService<S, E>,
) -> Result<bool, Error> {
    let Some(new) = new else {
        return Ok(false);
    };
    // Embed unfurls also fire MessageUpdate; only re-check real edits.
    if old.is_some_and(|old| old.content == new.content) {
        return Ok(false);
    }
    handle_message(ctx, new, automod).await
}

/// Role ids and admin flag for the author, from the cache when possible.
fn member_info(ctx: &serenity::Context, msg: &serenity::Message) -> (Vec<u64>, bool) {
    if let Some(guild) = msg.guild(&ctx.cache) {
        if let Some(member) = guild.members.get(&msg.author.id) {
            let roles = member.roles.iter().map(|r| r.get()).collect();
            let is_admin = guild.member_permissions(member).administrator();
            return (roles, is_admin);
        }
    }
    // Cache miss: fall back to the partial member on the message.
    let roles = msg
        .member
        .as_ref()
        .map(|m| m.roles.iter().map(|r| r.get()).collect())
        .unwrap_or_default();
    let is_admin = msg
        .member
        .as_ref()
        .and_then(|m| m.permissions)
        .is_some_and(|p| p.administrator());
    (roles, is_admin)
}

/// Run one platform call under its own deadline. A stalled HTTP request
/// is logged and skipped; the remaining side effects still run.
async fn bounded<T>(what: &str, call: impl std::future::Future<Output = T>) -> Option<T> {
    match tokio::time::timeout(APPLY_TIMEOUT, call).await {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Timed out during {}", what);
            None
        }
    }
}

async fn apply_outcome(ctx: &serenity::Context, msg: &serenity::Message, outcome: &ModOutcome) {
    let user_id = msg.author.id;

    if outcome.delete_message {
        if let Some(Err(e)) = bounded("message delete", msg.delete(&ctx.http)).await {
            tracing::warn!("Failed to delete flagged message: {}", e);
        }
    }

    if let Some(notice) = &outcome.warn {
        let dm = serenity::CreateEmbed::new()
            .title("⚠️ AutoMod Warning")
            .color(AUTOMOD_COLOR)
            .description(format!(
                "You received a warning in **{}**.",
                guild_name(ctx, msg)
            ))
            .field("Reason", outcome.violation.reason.clone(), false)
            .field(
                "Warnings",
                format!("{}/{}", notice.count, notice.max),
                true,
            );
        if let Some(Err(e)) = bounded(
            "warn DM",
            user_id.direct_message(&ctx.http, serenity::CreateMessage::new().embed(dm)),
        )
        .await
        {
            tracing::debug!("Could not DM warned user {}: {}", user_id, e);
        }
    }

    if let Some(secs) = outcome.immediate_timeout_secs {
        if let Some(guild_id) = msg.guild_id {
            timeout_member(
                ctx,
                guild_id,
                user_id,
                secs,
                &format!("AutoMod: {}", outcome.violation.reason),
            )
            .await;
        }
    }

    if let Some(punishment) = &outcome.punishment {
        if let Some(guild_id) = msg.guild_id {
            enforce_punishment(ctx, guild_id, user_id, punishment).await;
        }
    }

    send_log_embed(ctx, msg, outcome).await;
}

/// Carry out an auto punishment. Also used by the manual warn command
/// when a moderator warn exhausts the budget.
pub async fn enforce_punishment(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    punishment: &crate::core::automod::Punishment,
) {
    let reason = format!("AutoMod: {} warns", punishment.warn_count);

    match punishment.action {
        WarnAction::Mute => {
            timeout_member(
                ctx,
                guild_id,
                user_id,
                u64::from(punishment.duration_secs),
                &reason,
            )
            .await;
        }
        WarnAction::Kick => {
            // DM first: after the kick there is no shared guild to DM through.
            notify_punishment(ctx, guild_id, user_id, "You have been kicked", &reason).await;
            if let Some(Err(e)) =
                bounded("kick", guild_id.kick_with_reason(&ctx.http, user_id, &reason)).await
            {
                tracing::error!("Failed to kick {}: {}", user_id, e);
            }
        }
        WarnAction::Ban => {
            notify_punishment(ctx, guild_id, user_id, "You have been banned", &reason).await;
            if let Some(Err(e)) = bounded(
                "ban",
                guild_id.ban_with_reason(&ctx.http, user_id, 0, &reason),
            )
            .await
            {
                tracing::error!("Failed to ban {}: {}", user_id, e);
            }
        }
    }
}

async fn timeout_member(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    duration_secs: u64,
    reason: &str,
) {
    let until = match serenity::Timestamp::from_unix_timestamp(
        chrono::Utc::now().timestamp() + duration_secs as i64,
    ) {
        Ok(ts) => ts,
        Err(e) => {
            tracing::error!("Failed to create timeout timestamp: {}", e);
            return;
        }
    };

    if let Some(Err(e)) = bounded(
        "member timeout",
        guild_id.edit_member(
            &ctx.http,
            user_id,
            serenity::EditMember::new()
                .disable_communication_until_datetime(until)
                .audit_log_reason(reason),
        ),
    )
    .await
    {
        tracing::error!("Failed to timeout {}: {}", user_id, e);
    }
}

async fn notify_punishment(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    title: &str,
    reason: &str,
) {
    let guild = guild_id
        .name(&ctx.cache)
        .unwrap_or_else(|| "this server".to_string());
    let embed = serenity::CreateEmbed::new()
        .title(format!("🔨 {}", title))
        .color(ERROR_COLOR)
        .description(format!("**{}**: {}", guild, reason));
    if let Some(Err(e)) = bounded(
        "punishment DM",
        user_id.direct_message(&ctx.http, serenity::CreateMessage::new().embed(embed)),
    )
    .await
    {
        tracing::debug!("Could not DM punished user {}: {}", user_id, e);
    }
}

/// Post the moderation embed to the configured log channel.
async fn send_log_embed(ctx: &serenity::Context, msg: &serenity::Message, outcome: &ModOutcome) {
    let Some(channel_id) = outcome.log_channel_id else {
        return;
    };

    let action = match (&outcome.punishment, &outcome.warn) {
        (Some(p), _) => match p.action {
            WarnAction::Mute => format!("Muted {}min", p.duration_secs / 60),
            WarnAction::Kick => "Kicked".to_string(),
            WarnAction::Ban => "Banned".to_string(),
        },
        (None, Some(notice)) => format!("Warned ({}/{})", notice.count, notice.max),
        (None, None) => "Message Deleted".to_string(),
    };

    let color = match outcome.violation.severity {
        Severity::High => ERROR_COLOR,
        _ => AUTOMOD_COLOR,
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("🛡️ AutoMod — {}", outcome.violation.reason))
        .color(color)
        .timestamp(serenity::Timestamp::now())
        .field(
            "👤 User",
            format!("<@{}> (`{}`)", msg.author.id, msg.author.id),
            true,
        )
        .field("⚡ Action", format!("`{}`", action), true)
        .field("📝 Reason", outcome.violation.reason.clone(), false);

    if !msg.content.is_empty() {
        let mut snippet: String = msg.content.chars().take(300).collect();
        if msg.content.chars().count() > 300 {
            snippet.push_str("...");
        }
        embed = embed.field("💬 Message", snippet, false);
    }

    if let Some(Err(e)) = bounded(
        "log embed",
        serenity::ChannelId::new(channel_id)
            .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed)),
    )
    .await
    {
        tracing::warn!("Failed to send moderation log embed: {}", e);
    }
}

fn guild_name(ctx: &serenity::Context, msg: &serenity::Message) -> String {
    msg.guild(&ctx.cache)
        .map(|g| g.name.clone())
        .unwrap_or_else(|| "this server".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn stalled_call_is_skipped() {
        let result = bounded("stalled call", std::future::pending::<()>()).await;
        assert!(result.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_call_does_not_starve_later_ones() {
        // Each call carries its own deadline, so a hung delete still leaves
        // the DM, punishment and log embed free to run.
        assert!(bounded("first", std::future::pending::<()>()).await.is_none());
        assert_eq!(bounded("second", async { 7 }).await, Some(7));
    }
}
