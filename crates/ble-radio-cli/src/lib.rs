//! Radio CLI library
//!
//! Argument parsing, configuration loading and command handlers behind the
//! `ble-radio` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::{Cli, Commands};
pub use commands::CommandDispatcher;
pub use config::AppConfig;
pub use error::{CliError, Result};
