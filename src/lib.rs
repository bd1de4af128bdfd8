pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::http::{router, serve_with_shutdown, AppState, JwtAuthenticator};
pub use adapters::sqlite::SqliteStore;
pub use config::{CliConfig, TomlConfig};
pub use utils::error::{AppError, Result};
