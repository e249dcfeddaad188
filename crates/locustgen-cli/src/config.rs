//! Command-line and environment configuration
//!
//! Input paths and plugin names can come from arguments or from environment
//! variables ([`INPUT_PATHS_ENV`], [`PLUGINS_ENV`]) holding either a JSON array
//! of strings or a comma-separated list. Argument paths replace environment
//! paths; argument plugins are appended to environment plugins.

use std::path::PathBuf;

use clap::Parser;
use tracing::warn;

use locustgen_core::TransformOptions;
use locustgen_har::Denylist;

/// Environment variable listing input paths
pub const INPUT_PATHS_ENV: &str = "LOCUSTGEN_INPUT_PATHS";

/// Environment variable listing plugin bundles
pub const PLUGINS_ENV: &str = "LOCUSTGEN_PLUGINS";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable starting like a JSON array but not one of strings
    #[error("{var} is not a JSON array of strings: {source}")]
    InvalidList {
        var: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Convert HAR recordings into a Locust load test script.
///
/// The locustfile is written to standard output; logs go to standard error.
#[derive(Debug, Clone, Parser)]
#[command(name = "locustgen", version, about)]
pub struct Cli {
    /// Plugin bundle to use; repeat to use several
    #[arg(short = 'p', long = "plugin", value_name = "PLUGIN")]
    pub plugins: Vec<String>,

    /// Don't use the default plugins
    #[arg(long)]
    pub no_default_plugins: bool,

    /// File of hosts to leave out, one per line [default: ./.urlignore]
    #[arg(long, value_name = "FILE")]
    pub denylist: Option<PathBuf>,

    /// HAR files or directories of HAR files
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

/// Merged configuration of one run
#[derive(Debug, Clone)]
pub struct Config {
    /// Inputs, one top-level scenario each
    pub paths: Vec<PathBuf>,
    /// Plugin bundles, environment first
    pub plugins: Vec<String>,
    pub with_default_plugins: bool,
    pub denylist: Denylist,
}

impl Config {
    /// Merge `cli` with the environment read through `env`
    ///
    /// # Errors
    /// [`ConfigError::InvalidList`] if an environment variable is malformed
    pub fn merge<F>(cli: Cli, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_paths = env_list(&env, INPUT_PATHS_ENV)?;
        let env_plugins = env_list(&env, PLUGINS_ENV)?;

        let paths = match (env_paths.is_empty(), cli.paths.is_empty()) {
            (_, true) => env_paths.into_iter().map(PathBuf::from).collect(),
            (true, false) => cli.paths,
            (false, false) => {
                warn!(
                    "paths given both as arguments and in {INPUT_PATHS_ENV}: \
                     using only the arguments"
                );
                cli.paths
            }
        };

        if !env_plugins.is_empty() && !cli.plugins.is_empty() {
            warn!(
                "plugins given both as arguments and in {PLUGINS_ENV}: \
                 using the arguments after the environment"
            );
        }
        let mut plugins = env_plugins;
        plugins.extend(cli.plugins);

        let denylist = match &cli.denylist {
            Some(path) => Denylist::from_path(path),
            None => Denylist::from_current_dir(),
        };

        Ok(Self {
            paths,
            plugins,
            with_default_plugins: !cli.no_default_plugins,
            denylist,
        })
    }

    /// Merge `cli` with the process environment
    ///
    /// # Errors
    /// See [`Config::merge`]
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        Self::merge(cli, |var| std::env::var(var).ok())
    }

    /// Library options for this run
    #[must_use]
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions::new()
            .plugins(self.plugins.iter().cloned())
            .with_default_plugins(self.with_default_plugins)
            .denylist(self.denylist.clone())
    }
}

fn env_list<F>(env: &F, var: &'static str) -> Result<Vec<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match env(var) {
        Some(value) => parse_list(&value).map_err(|source| ConfigError::InvalidList { var, source }),
        None => Ok(Vec::new()),
    }
}

/// Items of a JSON array of strings, or of a comma-separated list
///
/// Blank items of a comma-separated list are dropped.
///
/// # Errors
/// If `value` starts with `[` but is not a JSON array of strings
pub fn parse_list(value: &str) -> Result<Vec<String>, serde_json::Error> {
    let value = value.trim();
    if value.starts_with('[') {
        return serde_json::from_str(value);
    }
    Ok(value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect())
}
