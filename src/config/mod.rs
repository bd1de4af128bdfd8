pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_bind_address, validate_path, validate_range, validate_secret, Validate,
};
use clap::Parser;

pub use toml_config::TomlConfig;

/// HS256 金鑰最短長度
pub const MIN_SECRET_LEN: usize = 16;

/// token 有效期上限（分鐘），一週
pub const MAX_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, Parser)]
#[command(name = "portfolio-api")]
#[command(about = "Portfolio / initiative / epic / requirement REST API")]
pub struct CliConfig {
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub bind: String,

    #[arg(long, default_value = "./data/portfolio.db")]
    pub database: String,

    #[arg(long, env = "PORTFOLIO_JWT_SECRET", default_value = "", hide_env_values = true)]
    pub jwt_secret: String,

    #[arg(long)]
    pub jwt_issuer: Option<String>,

    #[arg(long, default_value = "60")]
    pub token_ttl_minutes: i64,

    #[arg(long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON log lines")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn bind_address(&self) -> &str {
        &self.bind
    }

    fn database_path(&self) -> &str {
        &self.database
    }

    fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    fn jwt_issuer(&self) -> Option<&str> {
        self.jwt_issuer.as_deref()
    }

    fn token_ttl_minutes(&self) -> i64 {
        self.token_ttl_minutes
    }

    fn json_logs(&self) -> bool {
        self.json_logs
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_config(self)
    }
}

/// 兩種配置來源共用的檢查
pub(crate) fn validate_config(config: &dyn ConfigProvider) -> Result<()> {
    validate_bind_address("bind", config.bind_address())?;
    validate_path("database", config.database_path())?;
    validate_secret("jwt_secret", config.jwt_secret(), MIN_SECRET_LEN)?;
    validate_token_ttl("token_ttl_minutes", config.token_ttl_minutes())?;
    Ok(())
}

pub fn validate_token_ttl(field_name: &str, minutes: i64) -> Result<()> {
    validate_range(field_name, minutes, 1, MAX_TOKEN_TTL_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::AppError;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["portfolio-api"];
        argv.extend_from_slice(args);
        CliConfig::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--jwt-secret", "0123456789abcdef"]);
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.database_path(), "./data/portfolio.db");
        assert_eq!(config.token_ttl_minutes(), 60);
        assert!(config.jwt_issuer().is_none());
        assert!(!config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let config = parse(&["--jwt-secret", "short"]);
        assert!(matches!(
            config.validate(),
            Err(AppError::InvalidConfigValueError { ref field, .. }) if field == "jwt_secret"
        ));
    }

    #[test]
    fn test_invalid_bind_is_rejected() {
        let config = parse(&["--bind", "localhost", "--jwt-secret", "0123456789abcdef"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_ttl_is_rejected() {
        let config = parse(&[
            "--jwt-secret",
            "0123456789abcdef",
            "--token-ttl-minutes",
            "0",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ttl_upper_bound() {
        let week = MAX_TOKEN_TTL_MINUTES.to_string();
        let config = parse(&["--jwt-secret", "0123456789abcdef", "--token-ttl-minutes", week.as_str()]);
        assert!(config.validate().is_ok());

        let config = parse(&[
            "--jwt-secret",
            "0123456789abcdef",
            "--token-ttl-minutes",
            "9223372036854775807",
        ]);
        assert!(config.validate().is_err());
    }
}
