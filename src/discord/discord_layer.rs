// Discord layer - commands and event handlers.

#[path = "automod/commands.rs"]
pub mod commands;

#[path = "automod/events.rs"]
pub mod events;

// Re-export shared framework types for convenience
pub use commands::{Data, Error};
