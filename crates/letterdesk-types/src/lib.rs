//! # Letterdesk Types
//!
//! Core types, models, and error definitions for Letterdesk.
//!
//! - **`error`** - Typed error taxonomy for letter generation and configuration
//! - **`models`** - Domain models (letter kinds, fields, documents, rate windows, config)
//! - **`protocol`** - Anthropic Messages API wire types
//!
//! ## Architecture Role
//!
//! `letterdesk-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!        letterdesk-types (this crate)
//!                │
//!                ▼
//!        letterdesk-core
//!                │
//!                ▼
//!        letterdesk-server
//! ```

pub mod error;
pub mod models;
pub mod protocol;

pub use error::{ConfigError, LetterError};

pub use models::{
    AppConfig, Document, DocumentFormat, FailurePolicy, GeneratedLetter, LetterFields, LetterKind,
    LetterRequest, LetterResult, RateLimitRule, RateWindow, ReferenceFileInfo, Upload,
};
