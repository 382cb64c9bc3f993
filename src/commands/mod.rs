//! `backoffice` command line.
//!
//! Each subcommand builds what it needs from the shared `Context` and
//! prints a plain-text result. Notices go to stderr.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod reports;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use clap::{Parser, Subcommand};

use crate::api::{normalize_api_url, ApiClient};
use crate::config::AppConfig;
use crate::session::SessionContext;

#[derive(Parser, Debug)]
#[command(name = "backoffice")]
#[command(
    about = "Back-office client for the POS backend: open carts, menu and sales reports",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BACKOFFICE_GIT_SHA"), ")"),
    long_about = None
)]
pub struct Cli {
    /// Backend base URL (overrides BACKOFFICE_API_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bearer token from a previous `signin` (overrides BACKOFFICE_TOKEN).
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Operator id from a previous `signin` (overrides BACKOFFICE_USER_ID).
    #[arg(long, global = true, value_name = "ID")]
    pub user_id: Option<i64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and print the session variables to export
    Signin(auth::SigninArgs),
    /// Open cart operations for one table
    #[command(arg_required_else_help = true)]
    Cart(cart::CartArgs),
    /// Menu catalog maintenance
    #[command(arg_required_else_help = true)]
    Food(catalog::FoodArgs),
    /// Sales reports and bill history
    #[command(arg_required_else_help = true)]
    Report(reports::ReportArgs),
    /// Staff accounts and shop profile
    #[command(arg_required_else_help = true)]
    Admin(admin::AdminArgs),
}

impl Cli {
    /// Layer CLI flags over the environment configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.api_url {
            config.api_url = normalize_api_url(url);
        }
        if let Some(token) = &self.token {
            config.token = Some(token.trim().to_string());
        }
        if let Some(id) = self.user_id {
            config.user_id = Some(id);
        }
    }
}

/// Composition root shared by every subcommand.
pub struct Context {
    pub config: AppConfig,
    pub session: Arc<SessionContext>,
    pub api: ApiClient,
}

impl Context {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let session = Arc::new(SessionContext::new());
        if let (Some(token), Some(user_id)) = (config.token.as_deref(), config.user_id) {
            session.establish(token, user_id, "operator", Default::default());
        }
        let api = ApiClient::new(&config, session.clone())?;
        Ok(Self {
            config,
            session,
            api,
        })
    }
}

pub async fn dispatch(cli: Cli, ctx: Context) -> anyhow::Result<()> {
    match cli.command {
        Commands::Signin(args) => auth::run(&ctx, args).await,
        Commands::Cart(args) => cart::run(&ctx, args).await,
        Commands::Food(args) => catalog::run(&ctx, args).await,
        Commands::Report(args) => reports::run(&ctx, args).await,
        Commands::Admin(args) => admin::run(&ctx, args).await,
    }
}

pub(crate) fn money(amount: f64) -> String {
    format!("฿{amount:.2}")
}

/// Read a file for upload: its bare file name and contents.
pub(crate) async fn read_upload(path: &Path) -> anyhow::Result<(String, Vec<u8>)> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("{} has no usable file name", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    Ok((file_name, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_environment_config() {
        let cli = Cli::try_parse_from([
            "backoffice",
            "--api-url",
            "pos.example.com/api",
            "--user-id",
            "3",
            "cart",
            "--table",
            "2",
            "show",
        ])
        .expect("parse");
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.api_url, "https://pos.example.com");
        assert_eq!(config.user_id, Some(3));
        assert!(config.token.is_none());
    }

    #[test]
    fn context_signs_in_only_with_token_and_user() {
        let config = AppConfig {
            token: Some("tok".into()),
            ..AppConfig::default()
        };
        let ctx = Context::new(config).expect("context");
        assert!(!ctx.session.is_signed_in());

        let config = AppConfig {
            token: Some("tok".into()),
            user_id: Some(2),
            ..AppConfig::default()
        };
        let ctx = Context::new(config).expect("context");
        assert_eq!(ctx.session.user_id(), Some(2));
    }

    #[test]
    fn money_has_two_decimals() {
        assert_eq!(money(110.0), "฿110.00");
    }

    #[tokio::test]
    async fn upload_file_name_comes_from_path() {
        let path = std::env::temp_dir().join(format!("backoffice-logo-{}.png", std::process::id()));
        std::fs::write(&path, b"png").unwrap();
        let (name, bytes) = read_upload(&path).await.expect("read");
        assert_eq!(name, path.file_name().unwrap().to_str().unwrap());
        assert_eq!(bytes, b"png");
        std::fs::remove_file(&path).ok();

        assert!(read_upload(Path::new("/nonexistent/menu.png")).await.is_err());
    }
}
