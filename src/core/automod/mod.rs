// Core AutoMod module - normalization, detection and escalation logic.

pub mod automod_models;
pub mod automod_service;
pub mod detectors;
pub mod lexicon;
pub mod normalizer;
pub mod tracker;

pub use automod_models::*;
pub use automod_service::*;
