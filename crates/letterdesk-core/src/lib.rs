//! # Letterdesk Core
//!
//! Business logic behind the letter pages.
//!
//! ```text
//! letterdesk-core/src/
//! ├── store/        # KvStore trait, in-memory and PostgreSQL backends
//! ├── documents/    # Text extraction for uploads and reference files
//! ├── rate_limit/   # Fixed-window admission control
//! ├── prompt/       # Pure prompt construction per letter kind
//! ├── upstream/     # Anthropic Messages API client
//! ├── service/      # Generation pipeline (admit → extract → build → call → map)
//! ├── session/      # Signed session tokens and saved form values
//! └── identity.rs   # Client identity derivation
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

pub mod documents;
pub mod error;
pub mod identity;
pub mod prompt;
pub mod rate_limit;
pub mod service;
pub mod session;
pub mod store;
pub mod upstream;

pub use documents::{DocumentError, ReferenceLibrary};
pub use error::{AppError, AppResult};
pub use identity::ClientIdentity;
pub use prompt::{Attachments, PromptBuilder, PromptText, ValidationError};
pub use rate_limit::{Admission, Clock, EndpointClass, FixedWindowLimiter, SystemClock};
pub use service::{Accepted, LetterService};
pub use session::{SessionId, SessionManager};
pub use store::{KvStore, MemoryStore, PostgresStore, StoreError};
pub use upstream::{AnthropicClient, LlmClient, UpstreamFailure};
