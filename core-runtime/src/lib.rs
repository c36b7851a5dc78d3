//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the music discovery core:
//! - Logging and tracing infrastructure
//! - Configuration management (catalog, player, host bridges)
//! - Event bus system
//!
//! ## Overview
//!
//! The catalog client, the playback engine and the service façade all take
//! their settings from [`config::CoreConfig`] and publish on a shared
//! [`events::EventBus`].

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
