//! Back-office client for the POS REST backend.
//!
//! The heart of the crate is [`cart::CartView`]: the open cart of one table,
//! reconciled against the server after every write. Catalog maintenance,
//! sales reports and staff administration sit beside it and share the same
//! [`api::ApiClient`] and [`session::SessionContext`].

pub mod admin;
pub mod api;
pub mod cart;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod notice;
pub mod reports;
pub mod session;

use anyhow::Context as _;
use clap::Parser;
use tracing::info;

pub use api::ApiClient;
pub use cart::{CartTotals, CartView, CheckoutOutcome, LineEditor, SaleTempBackend};
pub use config::AppConfig;
pub use error::{ApiError, CartError, ConfigError};
pub use notice::{Notice, NoticeLevel, Notices};
pub use session::SessionContext;

/// Entry point of the `backoffice` binary.
pub fn run() -> anyhow::Result<()> {
    let cli = commands::Cli::parse();

    let mut config = AppConfig::from_env()?;
    cli.apply(&mut config);

    // Dropping the guard flushes the file writer.
    let _log_guard = logging::init(&config);

    let ctx = commands::Context::new(config)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_sha = env!("BACKOFFICE_GIT_SHA"),
        api_url = ctx.api.base_url(),
        "Starting backoffice"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(commands::dispatch(cli, ctx))
}
