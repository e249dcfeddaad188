//! Plugin registry
//!
//! Plugins are looked up by bundle name, the way users name them on the
//! command line (`-p dummy`). Bundles are registered explicitly at startup;
//! nothing is loaded dynamically.
//!
//! Resolution is strict: an unknown name and a bundle without any valid
//! plugin are both errors. Invalid plugins inside a bundle are skipped with a
//! warning, as long as the bundle keeps at least one valid plugin.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::PluginError;
use crate::plugins::contracts::{check, Plugin};
use crate::plugins::{dummy, sanitize_headers};

/// Plugins that apply unless explicitly disabled
#[must_use]
pub fn default_plugins() -> Vec<Plugin> {
    vec![sanitize_headers::plugin()]
}

/// Named bundles of plugins
#[derive(Debug, Default, Clone)]
pub struct PluginRegistry {
    bundles: BTreeMap<String, Vec<Plugin>>,
}

impl PluginRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            bundles: BTreeMap::new(),
        }
    }

    /// Create registry with built-in bundles
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(sanitize_headers::NAME, vec![sanitize_headers::plugin()]);
        registry.register(dummy::NAME, vec![dummy::plugin()]);
        registry
    }

    /// Register a bundle, replacing any bundle of the same name
    pub fn register(&mut self, name: impl Into<String>, plugins: Vec<Plugin>) {
        self.bundles.insert(name.into(), plugins);
    }

    /// Append one plugin to a bundle, creating the bundle if needed
    pub fn register_plugin(&mut self, bundle: impl Into<String>, plugin: Plugin) {
        self.bundles.entry(bundle.into()).or_default().push(plugin);
    }

    /// Check if bundle exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bundles.contains_key(name)
    }

    /// Remove bundle
    #[inline]
    pub fn remove(&mut self, name: &str) -> bool {
        self.bundles.remove(name).is_some()
    }

    /// Registered bundle names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.bundles.keys().map(String::as_str).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Valid plugins of bundle `name`, in registration order
    ///
    /// # Errors
    /// - [`PluginError::NotFound`] if no bundle has that name
    /// - [`PluginError::NoPlugins`] if the bundle has no valid plugin
    pub fn resolve(&self, name: &str) -> Result<Vec<Plugin>, PluginError> {
        let bundle = self.bundles.get(name).ok_or_else(|| PluginError::NotFound {
            name: name.to_string(),
            known: self.names().into_iter().map(str::to_string).collect(),
        })?;

        let mut plugins = Vec::with_capacity(bundle.len());
        for plugin in bundle {
            if plugin.contract().is_empty() {
                debug!(bundle = name, plugin = plugin.name(), "ignoring untagged plugin");
                continue;
            }
            let decision = check(plugin);
            if decision.is_valid() {
                plugins.push(plugin.clone());
            } else {
                warn!(
                    bundle = name,
                    plugin = plugin.name(),
                    "ignoring plugin: {}",
                    decision.reason()
                );
            }
        }

        if plugins.is_empty() {
            return Err(PluginError::NoPlugins(name.to_string()));
        }
        Ok(plugins)
    }

    /// Resolve several bundles, concatenating their plugins in order
    ///
    /// # Errors
    /// The first resolution error
    pub fn resolve_all<I, S>(&self, names: I) -> Result<Vec<Plugin>, PluginError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut plugins = Vec::new();
        for name in names {
            plugins.extend(self.resolve(name.as_ref())?);
        }
        Ok(plugins)
    }
}
