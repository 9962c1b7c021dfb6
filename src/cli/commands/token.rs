use anyhow::{bail, Context};
use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims, Permission};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "User id placed in the `sub` claim")]
    pub user: String,

    #[arg(long, help = "Username (defaults to the user id)")]
    pub username: Option<String>,

    #[arg(long = "perm", help = "Permission key to grant, repeatable (e.g. city.add)")]
    pub perm: Vec<String>,

    #[arg(long, help = "Grant every permission")]
    pub all: bool,

    #[arg(long, help = "Validity in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    config.validate()?;

    let permissions = resolve_permissions(&args.perm, args.all)?;
    let hours = args.hours.unwrap_or(config.security.jwt_expiry_hours);
    let username = args.username.unwrap_or_else(|| args.user.clone());

    let claims = Claims::new(args.user, username, permissions.clone(), hours)?;
    let token = generate_jwt(&claims, &config.security.jwt_secret).context("failed to sign token")?;

    match output_format {
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => output_success(
            &output_format,
            "token issued",
            Some(json!({ "token": token, "permissions": permissions, "expires_at": claims.exp })),
        )?,
    }
    Ok(())
}

fn resolve_permissions(requested: &[String], all: bool) -> anyhow::Result<Vec<String>> {
    if all {
        return Ok(Permission::ALL.iter().map(|p| p.as_str().to_string()).collect());
    }

    let mut granted = Vec::new();
    for key in requested {
        match Permission::parse(key) {
            Some(p) if !granted.contains(&p.as_str().to_string()) => granted.push(p.as_str().to_string()),
            Some(_) => {}
            None => bail!("unknown permission '{}' (see `tourism permissions`)", key),
        }
    }
    Ok(granted)
}
