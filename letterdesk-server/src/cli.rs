use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use letterdesk_types::FailurePolicy;

#[derive(Parser)]
#[command(
    name = "letterdesk",
    about = "Letterdesk - academic letter drafting service",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub serve: ServeArgs,

    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LETTERDESK_LOG_DIR", help = "Also write daily-rotated logs here")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the web server (default if no command specified)")]
    Serve,

    #[command(subcommand, about = "Inspect configuration")]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show the effective configuration (secrets masked)")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },
}

/// Overrides applied on top of defaults and the optional config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    #[arg(short, long, env = "LETTERDESK_CONFIG", help = "JSON config file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "LETTERDESK_HOST")]
    pub host: Option<String>,

    #[arg(short, long, env = "LETTERDESK_PORT")]
    pub port: Option<u16>,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "LETTERDESK_MODEL")]
    pub model: Option<String>,

    #[arg(long, env = "LETTERDESK_UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    #[arg(long, env = "LETTERDESK_UPSTREAM_TIMEOUT", help = "Upstream call bound in seconds")]
    pub upstream_timeout: Option<u64>,

    #[arg(long, env = "LETTERDESK_SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    #[arg(long, help = "Mark the session cookie Secure (HTTPS deployments)")]
    pub secure_cookie: bool,

    #[arg(
        long,
        env = "LETTERDESK_STORE_URL",
        hide_env_values = true,
        help = "postgres://... for a shared store, memory:// (default) for in-process"
    )]
    pub store_url: Option<String>,

    #[arg(long, env = "LETTERDESK_GENERATE_LIMIT")]
    pub generate_limit: Option<u32>,

    #[arg(long, env = "LETTERDESK_GENERATE_WINDOW", help = "Window length in seconds")]
    pub generate_window: Option<u64>,

    #[arg(long, env = "LETTERDESK_PAGE_LIMIT")]
    pub page_limit: Option<u32>,

    #[arg(long, env = "LETTERDESK_PAGE_WINDOW", help = "Window length in seconds")]
    pub page_window: Option<u64>,

    #[arg(long, env = "LETTERDESK_FAILURE_POLICY", help = "fail_closed (default) or fail_open")]
    pub failure_policy: Option<FailurePolicy>,

    #[arg(
        long,
        env = "LETTERDESK_TRUST_FORWARDED",
        value_parser = clap::builder::BoolishValueParser::new(),
        help = "Take the client address from X-Forwarded-For / X-Real-IP"
    )]
    pub trust_forwarded: Option<bool>,

    #[arg(
        long,
        env = "LETTERDESK_REFERENCE_DIR",
        help = "Folder with one sub-folder of reference files per letter page"
    )]
    pub reference_dir: Option<PathBuf>,

    #[arg(long, env = "LETTERDESK_MAX_DOCUMENT_BYTES")]
    pub max_document_bytes: Option<usize>,
}
