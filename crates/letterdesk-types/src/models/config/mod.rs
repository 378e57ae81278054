//! Application configuration models.

mod app;
mod documents;
mod enums;
mod limits;
mod session;
mod upstream;

pub use app::{AppConfig, ServerConfig};
pub use documents::DocumentsConfig;
pub use enums::FailurePolicy;
pub use limits::RateLimitConfig;
pub use session::{SessionConfig, StoreConfig};
pub use upstream::UpstreamConfig;
