#![forbid(unsafe_code)]

//! Command-line probe for the popover placement engine.
//!
//! Solves placements, positions arrows and validates layout configs without
//! a browser, printing JSON (default) or aligned text.

pub mod arrow;
pub mod cli;
pub mod config_cmd;
pub mod error;
pub mod place;
pub mod util;

pub use cli::{Cli, run, run_from_env};
pub use error::{ProbeCliError, Result};
