//! CLI module for the token service
//!
//! Provides subcommands that drive [`AuthenticationService`] from the
//! application configuration:
//! - `issue`: sign a token for a set of claims
//! - `verify`: validate a token and print its principal
//! - `inspect-key`: resolve a key and describe it
//! - `refresh-token`: print a fresh refresh token

mod commands;

use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::Claim;
use crate::infrastructure::auth::AuthenticationService;
use crate::infrastructure::keys::KeyProviderFactory;
use crate::infrastructure::logging;

/// PMP Token Auth - issue and validate RS256 bearer tokens
#[derive(Parser)]
#[command(name = "pmp-token-auth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign a token carrying the given claims
    Issue(IssueArgs),

    /// Validate a token and print its claims
    Verify(VerifyArgs),

    /// Resolve a key and print its properties
    InspectKey(KeyArgs),

    /// Print a new refresh token
    RefreshToken,
}

/// Arguments for the issue command
#[derive(Args, Clone)]
pub struct IssueArgs {
    /// Logical key identifier to sign with
    #[arg(long)]
    pub key_id: String,

    /// Claim as name=value (repeatable)
    #[arg(long = "claim", value_parser = parse_claim)]
    pub claims: Vec<Claim>,
}

/// Arguments for the verify command
#[derive(Args, Clone)]
pub struct VerifyArgs {
    /// Logical key identifier to verify with
    #[arg(long)]
    pub key_id: String,

    /// Compact JWT to validate
    #[arg(long)]
    pub token: String,
}

/// Arguments for commands that only need a key
#[derive(Args, Clone)]
pub struct KeyArgs {
    /// Logical key identifier to resolve
    #[arg(long)]
    pub key_id: String,
}

/// Run the selected subcommand
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    match cli.command {
        Command::RefreshToken => commands::refresh_token(),
        Command::Issue(args) => commands::issue(&build_service(&config).await?, args).await,
        Command::Verify(args) => commands::verify(&build_service(&config).await?, args).await,
        Command::InspectKey(args) => {
            commands::inspect_key(&build_service(&config).await?, args).await
        }
    }
}

async fn build_service(config: &AppConfig) -> anyhow::Result<AuthenticationService> {
    let provider = KeyProviderFactory::from_app_config(config).await?;
    tracing::debug!(provider = provider.provider_name(), "Key provider ready");

    Ok(AuthenticationService::new(config.jwt.clone(), provider)?)
}

/// Parse a `name=value` claim argument
fn parse_claim(raw: &str) -> Result<Claim, String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok(Claim::new(name.trim(), value)),
        _ => Err(format!("expected name=value, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_claim() {
        let claim = parse_claim("name=testuser").unwrap();
        assert_eq!(claim.name(), "name");
        assert_eq!(claim.value(), "testuser");

        let claim = parse_claim("filter=a=b").unwrap();
        assert_eq!(claim.value(), "a=b");

        let claim = parse_claim("note=").unwrap();
        assert_eq!(claim.value(), "");

        assert!(parse_claim("novalue").is_err());
        assert!(parse_claim("=value").is_err());
    }

    #[test]
    fn test_issue_args_collect_claims() {
        let cli = Cli::try_parse_from([
            "pmp-token-auth",
            "issue",
            "--key-id",
            "signing",
            "--claim",
            "name=testuser",
            "--claim",
            "role=admin",
        ])
        .unwrap();

        match cli.command {
            Command::Issue(args) => {
                assert_eq!(args.key_id, "signing");
                assert_eq!(args.claims.len(), 2);
                assert_eq!(args.claims[1].name(), "role");
            }
            _ => panic!("expected issue command"),
        }
    }

    #[test]
    fn test_refresh_token_takes_no_arguments() {
        let cli = Cli::try_parse_from(["pmp-token-auth", "refresh-token"]).unwrap();
        assert!(matches!(cli.command, Command::RefreshToken));
    }
}
