//! # Folio Core
//!
//! Core types, configuration, and validation for the Folio portfolio backend.
//!
//! This crate provides:
//! - Configuration loading (JSON5 file plus environment overrides)
//! - Domain types shared by the gateway and its collaborators
//! - Secret wrappers that keep credentials out of logs
//! - Input validation for relayed transcripts

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod secrets;
pub mod types;
pub mod validation;

pub use config::{Config, ConfigError, Deployment};
pub use secrets::ApiKey;
pub use types::{ChatMessage, ChatRole, ClientIdentity, ContactForm, ContactSubmission, TokenUsage};
pub use validation::{ValidationError, validate_message_content, validate_transcript};

