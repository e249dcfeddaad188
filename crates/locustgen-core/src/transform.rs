//! Entry points: from recordings to locustfile
//!
//! [`dumps`] and [`dump`] run the whole conversion: resolve plugin bundles,
//! build one scenario per input path, apply plugins at every level and render
//! the program.

use std::io::Write;
use std::path::Path;

use tracing::debug;

use locustgen_har::Denylist;

use crate::error::Result;
use crate::locust::locustfile_lines;
use crate::plugins::{default_plugins, group_by_contract, Plugin, PluginRegistry};
use crate::scenario::{Scenario, ScenarioBuilder};

/// Options of a conversion
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Names of plugin bundles to use, in order
    pub plugins: Vec<String>,
    /// Whether the default plugins run before the named ones
    pub with_default_plugins: bool,
    /// Plugins used when `with_default_plugins` is set
    pub default_plugins: Vec<Plugin>,
    /// Hosts whose requests are left out
    pub denylist: Denylist,
    /// Where plugin bundles are looked up
    pub registry: PluginRegistry,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            plugins: Vec::new(),
            with_default_plugins: true,
            default_plugins: default_plugins(),
            denylist: Denylist::empty(),
            registry: PluginRegistry::with_defaults(),
        }
    }
}

impl TransformOptions {
    /// Default options: default plugins, no denylist, built-in bundles
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use bundle `name` after those already requested
    #[must_use]
    pub fn plugin(mut self, name: impl Into<String>) -> Self {
        self.plugins.push(name.into());
        self
    }

    /// Use these bundles after those already requested
    #[must_use]
    pub fn plugins<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plugins.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_default_plugins(mut self, enabled: bool) -> Self {
        self.with_default_plugins = enabled;
        self
    }

    /// Replace the default plugins
    #[must_use]
    pub fn default_plugin_list(mut self, plugins: Vec<Plugin>) -> Self {
        self.default_plugins = plugins;
        self
    }

    #[must_use]
    pub fn denylist(mut self, denylist: Denylist) -> Self {
        self.denylist = denylist;
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Default plugins (if enabled) followed by the resolved bundles
    fn resolve_plugins(&self) -> Result<Vec<Plugin>> {
        let mut plugins = if self.with_default_plugins {
            self.default_plugins.clone()
        } else {
            Vec::new()
        };
        plugins.extend(self.registry.resolve_all(&self.plugins)?);
        debug!(
            plugins = ?plugins.iter().map(Plugin::name).collect::<Vec<_>>(),
            "resolved plugins"
        );
        Ok(plugins)
    }
}

/// Lines of the locustfile for `paths`
fn dump_as_lines<P: AsRef<Path>>(
    paths: impl IntoIterator<Item = P>,
    options: &TransformOptions,
) -> Result<Vec<String>> {
    let plugins = options.resolve_plugins()?;
    let groups = group_by_contract(&plugins);

    let builder = ScenarioBuilder::new()
        .with_task_plugins(groups.on_task)
        .with_sequence_plugins(groups.on_task_sequence)
        .with_denylist(options.denylist.clone());

    let scenarios = paths
        .into_iter()
        .map(|path| {
            builder
                .build(path)
                .map(|s| s.apply_plugins(&groups.on_scenario))
        })
        .collect::<std::result::Result<Vec<Scenario>, _>>()?;

    Ok(locustfile_lines(&scenarios, &groups.on_program)?)
}

/// Locustfile for the recordings at `paths` (HAR files or scenario
/// directories), as a string ending with a newline
///
/// # Errors
/// - [`Error::Plugin`](crate::Error::Plugin) if a bundle can't be resolved
/// - [`Error::Scenario`](crate::Error::Scenario) if a path can't become a
///   scenario
/// - [`Error::Syntax`](crate::Error::Syntax) if a plugin produced invalid code
///
/// # Example
///
/// ```rust,no_run
/// use locustgen_core::{dumps, TransformOptions};
///
/// let options = TransformOptions::new().plugin("dummy");
/// let locustfile = dumps(["recordings/"], &options)?;
/// print!("{locustfile}");
/// # Ok::<(), locustgen_core::Error>(())
/// ```
pub fn dumps<P: AsRef<Path>>(
    paths: impl IntoIterator<Item = P>,
    options: &TransformOptions,
) -> Result<String> {
    let mut text = dump_as_lines(paths, options)?.join("\n");
    text.push('\n');
    Ok(text)
}

/// Write the locustfile for `paths` into `writer`
///
/// Same output as [`dumps`]. Nothing is written if the conversion fails.
///
/// # Errors
/// Those of [`dumps`], plus [`Error::Io`](crate::Error::Io) if writing fails
pub fn dump<W: Write, P: AsRef<Path>>(
    writer: &mut W,
    paths: impl IntoIterator<Item = P>,
    options: &TransformOptions,
) -> Result<()> {
    let text = dumps(paths, options)?;
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}
