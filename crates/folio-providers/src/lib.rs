//! # Folio Providers
//!
//! External collaborators of the Folio gateway: the AI completion API and
//! the outbound mail relay. Each sits behind a narrow trait so the gateway
//! can be exercised with stubs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod traits;
mod deepseek;
pub mod mail;
mod unavailable;

pub use traits::{CompletionRequest, CompletionResponse, Provider, ProviderError};
pub use deepseek::DeepSeekProvider;
pub use mail::{MailError, Mailer, OutboundEmail, SmtpMailer};
pub use unavailable::{UnavailableMailer, UnavailableProvider};
