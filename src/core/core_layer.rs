// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "automod/mod.rs"]
pub mod automod;
