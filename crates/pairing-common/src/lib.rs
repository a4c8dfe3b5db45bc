//! # pairing-common
//!
//! Shared utilities including configuration, error handling, session token claims, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::SessionClaims;
pub use config::{
    AppConfig, AppSettings, ConfigError, Environment, GraphqlConfig, IdentityConfig, TimingConfig,
};
pub use error::{AppError, ErrorSummary};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
