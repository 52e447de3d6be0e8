pub mod config;
pub mod error;
pub mod handlers;
pub mod server;

pub use config::{AppConfig, ConfigError};
pub use error::ApiError;
pub use handlers::AppState;
pub use server::{build_router, run_retention_sweep, start, ServerConfig, ServerHandle};
