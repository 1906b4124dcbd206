//! Common types and utilities for the webhook relay

pub mod config;
pub mod error;
pub mod models;

pub use config::{Config, Credentials, NotifyMode, SourceSettings, SuccessBody};
pub use error::{Error, Result};
pub use models::{InboundEvent, NormalizedPayload, SourceKind};
