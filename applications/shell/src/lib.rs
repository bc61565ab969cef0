//! Encore Shell
//!
//! Terminal front end for a player session: layered configuration, a line
//! command parser, and the [`Shell`] that renders session events as text.

pub mod commands;
pub mod config;
pub mod error;
pub mod shell;

pub use commands::Command;
pub use config::ShellConfig;
pub use error::{Result, ShellError};
pub use shell::{Flow, Shell};
