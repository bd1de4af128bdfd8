use anyhow::Context;
use clap::Parser;
use portfolio_api::domain::ports::ConfigProvider;
use portfolio_api::utils::validation::{validate_required_field, Validate};
use portfolio_api::config::validate_token_ttl;
use portfolio_api::{JwtAuthenticator, TomlConfig};

#[derive(Parser)]
#[command(name = "issue-token")]
#[command(about = "Mint a development bearer token for the portfolio API")]
struct Args {
    /// Token subject (user id)
    #[arg(long, default_value = "dev-user")]
    subject: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    role: Option<String>,

    /// Signing secret; ignored when --config is given
    #[arg(long, env = "PORTFOLIO_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    #[arg(long)]
    jwt_issuer: Option<String>,

    #[arg(long, default_value = "60")]
    ttl_minutes: i64,

    /// Path to the server's TOML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    validate_token_ttl("ttl_minutes", args.ttl_minutes).context("invalid --ttl-minutes")?;

    let authenticator = match &args.config {
        Some(path) => {
            let config = TomlConfig::from_file(path)
                .with_context(|| format!("failed to load config file '{}'", path))?;
            config.validate().context("invalid configuration")?;
            JwtAuthenticator::from_config(&config as &dyn ConfigProvider)
        }
        None => {
            let secret = validate_required_field("jwt_secret", &args.jwt_secret)
                .context("--jwt-secret or PORTFOLIO_JWT_SECRET is required without --config")?;
            JwtAuthenticator::new(secret, args.jwt_issuer.as_deref(), args.ttl_minutes)
        }
    };

    let token = authenticator
        .issue(&args.subject, args.name.as_deref(), args.role.as_deref())
        .context("failed to sign token")?;
    println!("{}", token);
    Ok(())
}
