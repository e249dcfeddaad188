//! `locustgen` command-line tool
//!
//! Reads HAR files and scenario directories, writes the locustfile to
//! standard output.
//!
//! # Exit codes
//!
//! - `0`: locustfile written
//! - [`EXIT_NO_INPUT`]: no input path given
//! - [`EXIT_PLUGIN_ERROR`]: a plugin bundle couldn't be resolved
//! - [`EXIT_FAILURE`]: any other error

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;

use std::io::Write;

use anyhow::Context;

pub use config::{parse_list, Cli, Config, ConfigError, INPUT_PATHS_ENV, PLUGINS_ENV};

/// No input path was given
pub const EXIT_NO_INPUT: u8 = 1;

/// Plugin resolution failed
pub const EXIT_PLUGIN_ERROR: u8 = 2;

/// Any other failure
pub const EXIT_FAILURE: u8 = 3;

/// Write the locustfile described by `config` into `out`
///
/// # Errors
/// Conversion and write errors, with the inputs as context
pub fn run<W: Write>(config: &Config, out: &mut W) -> anyhow::Result<()> {
    locustgen_core::dump(out, &config.paths, &config.transform_options()).with_context(|| {
        let paths: Vec<String> = config.paths.iter().map(|p| p.display().to_string()).collect();
        format!("converting {}", paths.join(", "))
    })
}

/// Process exit code for `err`
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<locustgen_core::Error>() {
        Some(locustgen_core::Error::Plugin(_)) => EXIT_PLUGIN_ERROR,
        _ => EXIT_FAILURE,
    }
}
