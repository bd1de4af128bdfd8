use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use portfolio_api::domain::ports::ConfigProvider;
use portfolio_api::utils::error::{AppError, ErrorSeverity};
use portfolio_api::utils::{logger, validation::Validate};
use portfolio_api::{serve_with_shutdown, AppState, CliConfig, JwtAuthenticator, SqliteStore, TomlConfig};
use tokio::net::TcpListener;

enum Settings {
    Cli(CliConfig),
    Toml(TomlConfig),
}

impl Settings {
    fn provider(&self) -> &dyn ConfigProvider {
        match self {
            Settings::Cli(config) => config,
            Settings::Toml(config) => config,
        }
    }

    fn validate(&self) -> portfolio_api::Result<()> {
        match self {
            Settings::Cli(config) => config.validate(),
            Settings::Toml(config) => config.validate(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let settings = match cli.config.clone() {
        Some(path) => match TomlConfig::from_file(&path) {
            Ok(config) => Settings::Toml(config),
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => Settings::Cli(cli.clone()),
    };

    // 初始化日誌
    let verbose = match &settings {
        Settings::Toml(config) => cli.verbose || config.verbose(),
        Settings::Cli(_) => cli.verbose,
    };
    if cli.json_logs || settings.provider().json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("🚀 Starting portfolio-api v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &cli.config {
        tracing::info!("📁 Configuration loaded from: {}", path);
    }

    // 驗證配置
    if let Err(e) = settings.validate() {
        exit_with(e);
    }
    let config = settings.provider();
    tracing::debug!(
        "Server config: bind={}, database={}, issuer={:?}, token_ttl={}m",
        config.bind_address(),
        config.database_path(),
        config.jwt_issuer(),
        config.token_ttl_minutes()
    );

    let store = match SqliteStore::open(config.database_path()) {
        Ok(store) => store,
        Err(e) => exit_with(e),
    };
    let verifier = Arc::new(JwtAuthenticator::from_config(config));
    let state = AppState::new(store, verifier);

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;

    serve_with_shutdown(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        }
        tracing::info!("🛑 Shutdown signal received, draining connections");
    })
    .await
    .context("server failed")?;

    tracing::info!("✅ Server stopped");
    Ok(())
}

fn exit_with(e: AppError) -> ! {
    tracing::error!(
        "❌ Startup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
