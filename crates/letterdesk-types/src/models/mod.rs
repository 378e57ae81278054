//! Domain models.

pub mod config;
mod document;
mod letter;
mod rate;

pub use config::{
    AppConfig, DocumentsConfig, FailurePolicy, RateLimitConfig, ServerConfig, SessionConfig,
    StoreConfig, UpstreamConfig,
};
pub use document::{Document, DocumentFormat, ReferenceFileInfo, Upload};
pub use letter::{GeneratedLetter, LetterFields, LetterKind, LetterRequest, LetterResult};
pub use rate::{RateLimitRule, RateWindow};
