// This is the entry point of the Discord bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (databases)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::automod::{AllowAllEntitlements, AutomodService};
use crate::discord::events;
use crate::discord::{Data, Error};
use crate::infra::automod::SqliteAutomodStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// How often the rolling spam trackers drop stale per-user state.
const TRACKER_SWEEP_INTERVAL_SECS: u64 = 300;

/// Event handler for non-command Discord events.
/// Every guild message (and edit) flows through the AutoMod cascade here.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = events::handle_message(ctx, new_message, &data.automod).await {
                tracing::error!("Error handling message: {}", e);
            }
        }
        serenity::FullEvent::MessageUpdate {
            old_if_available,
            new,
            event: _,
        } => {
            if let Err(e) = events::handle_message_edit(
                ctx,
                old_if_available.as_ref(),
                new.as_ref(),
                &data.automod,
            )
            .await
            {
                tracing::error!("Error handling message edit: {}", e);
            }
        }
        _ => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Get Discord bot token from environment
    let token = std::env::var("DISCORD_TOKEN").expect(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    );

    // Keep runtime databases in a dedicated folder so the repo root stays tidy.
    let data_dir = "data";
    std::fs::create_dir_all(data_dir).expect("Failed to create data directory for SQLite files");
    let automod_db_path = format!("{}/automod.db", data_dir);

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&format!("sqlite://{}?mode=rwc", automod_db_path))
        .await
        .expect("Failed to connect to AutoMod DB");
    let store = SqliteAutomodStore::new(pool);
    store.migrate().await.expect("Failed to migrate AutoMod DB");

    let automod_service = Arc::new(AutomodService::new(store, AllowAllEntitlements));

    // Create the data structure that will be shared across all commands
    let data = Data {
        automod: Arc::clone(&automod_service),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================
    // Configure the poise framework with our commands and settings.

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            // Register all our commands here
            commands: vec![discord::commands::automod()],
            // Event handler for messages and edits
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                println!("🤖 Bot is starting up...");

                // Register slash commands globally (can take up to an hour to propagate)
                // For faster development, use register_in_guild instead:
                // poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id).await?;
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                println!("✅ Commands registered!");
                println!("🚀 Bot is ready!");

                // Background sweep so idle users don't pin flood/duplicate state forever.
                let automod = Arc::clone(&data.automod);
                tokio::spawn(async move {
                    use std::time::Duration as StdDuration;
                    use tokio::time::sleep;

                    loop {
                        sleep(StdDuration::from_secs(TRACKER_SWEEP_INTERVAL_SECS)).await;
                        automod.sweep_trackers();
                        tracing::debug!("Swept rolling spam trackers");
                    }
                });

                Ok(data)
            })
        })
        .build();

    // Keep a decent message cache so edit events carry the old content and
    // admin checks resolve from the cache instead of the HTTP API.
    let mut settings = serenity::cache::Settings::default();
    settings.max_messages = 10000;

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .cache_settings(settings)
        .await
        .expect("Error creating client");

    client.start().await.expect("Error running bot");
}
