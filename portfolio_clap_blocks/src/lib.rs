//! Reusable `clap` argument blocks for configuring the portfolio catalog from the command line
//! and the environment.

pub mod cache;
pub mod image;
pub mod logging;
pub mod store;

/// Errors building runtime objects out of parsed configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("--{setting}={value} requires --{missing} to be set")]
    MissingConfig {
        setting: &'static str,
        value: &'static str,
        missing: &'static str,
    },

    #[error("invalid client configuration: {0}")]
    Client(#[from] portfolio_client::Error),
}
