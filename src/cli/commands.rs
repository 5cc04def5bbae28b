//! Subcommand bodies

use crate::domain::ClaimSet;
use crate::infrastructure::auth::{
    generate_refresh_token, AuthenticationService, TokenAuthenticator,
};

use super::{IssueArgs, KeyArgs, VerifyArgs};

pub(super) fn refresh_token() -> anyhow::Result<()> {
    println!("{}", generate_refresh_token());
    Ok(())
}

pub(super) async fn issue(
    service: &AuthenticationService,
    args: IssueArgs,
) -> anyhow::Result<()> {
    let claims = ClaimSet::from(args.claims);
    let token = service
        .generate_token(Some(&claims), Some(&args.key_id))
        .await?;

    println!("{}", token);
    Ok(())
}

pub(super) async fn verify(
    service: &AuthenticationService,
    args: VerifyArgs,
) -> anyhow::Result<()> {
    let principal = service
        .get_token_principal(Some(&args.token), Some(&args.key_id))
        .await?;

    println!("{}", serde_json::to_string_pretty(&principal)?);
    Ok(())
}

pub(super) async fn inspect_key(
    service: &AuthenticationService,
    args: KeyArgs,
) -> anyhow::Result<()> {
    let key = service.get_security_key(Some(&args.key_id)).await?;

    println!("key_id:   {}", key.key_id());
    println!("provider: {}", service.provider().provider_name());
    println!("bits:     {}", key.size_bits());
    println!("can_sign: {}", key.can_sign());
    Ok(())
}
