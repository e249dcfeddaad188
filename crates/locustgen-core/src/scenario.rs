//! Scenarios: weighted trees of tasks
//!
//! A [`Scenario`] is made for each HAR file, and for each directory containing
//! HAR files or other such directories. Scenarios therefore form a tree whose
//! leaves are all [`Task`]s, which maps onto nested Locust task sets.
//!
//! # Weights
//!
//! The weight of `x.har` (or of directory `x`) is read from a sibling file
//! `x.weight` holding a positive integer. Without that file, the weight is 1.
//!
//! # Errors
//!
//! A directory child that can't become a scenario (unreadable file, not a
//! HAR document, directory without scenarios) is skipped with a warning. The
//! following are never skipped and abort the whole assembly:
//! - a weight file that matches no sibling scenario
//! - two sibling scenarios with the same name (`x.har` and `x.json`)
//! - a weight file whose content is not a positive integer

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{error, info, warn};

use locustgen_har::{read_har_file, to_identifier, Denylist};

use crate::error::{ScenarioError, ScenarioResult};
use crate::plugins::{apply, Plugin};
use crate::task::Task;

/// Extension of weight files
pub const WEIGHT_FILE_EXTENSION: &str = "weight";

/// Weight of a scenario without weight file
pub const DEFAULT_WEIGHT: u32 = 1;

/// Element of a scenario
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    /// One request, rendered as a method of the task set
    Task(Task),
    /// Nested scenario, rendered as a nested task set
    Scenario(Scenario),
}

impl Child {
    /// Legacy top-level code blocks needed by this child
    #[must_use]
    pub fn global_code_blocks(&self) -> IndexMap<String, Vec<String>> {
        match self {
            Child::Task(task) => task.global_code_blocks.clone(),
            Child::Scenario(scenario) => scenario.global_code_blocks(),
        }
    }
}

impl From<Task> for Child {
    fn from(task: Task) -> Self {
        Child::Task(task)
    }
}

impl From<Scenario> for Child {
    fn from(scenario: Scenario) -> Self {
        Child::Scenario(scenario)
    }
}

/// A web browsing session to emulate
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Name of the generated task set, a valid identifier
    pub name: String,
    /// Tasks and sub-scenarios, in execution order
    pub children: Vec<Child>,
    /// HAR file or directory this scenario was made from
    pub origin: Option<PathBuf>,
    /// Relative frequency of this scenario among its siblings
    pub weight: u32,
}

impl Scenario {
    /// Scenario without origin and with the default weight
    #[must_use]
    pub fn new(name: impl Into<String>, children: Vec<Child>) -> Self {
        Self {
            name: name.into(),
            children,
            origin: None,
            weight: DEFAULT_WEIGHT,
        }
    }

    /// Scenario for `path`, without plugins or denylist
    ///
    /// # Errors
    /// See [`ScenarioBuilder::build`]
    pub fn from_path(path: impl AsRef<Path>) -> ScenarioResult<Self> {
        ScenarioBuilder::new().build(path)
    }

    /// Weight of the scenario made from `path`
    ///
    /// # Errors
    /// [`ScenarioError::InvalidWeight`] if the weight file exists but doesn't
    /// hold a positive integer
    pub fn weight_from_path(path: &Path) -> ScenarioResult<u32> {
        let weight_path = path.with_extension(WEIGHT_FILE_EXTENSION);
        let text = match fs::read_to_string(&weight_path) {
            Ok(text) => text,
            Err(err) => {
                info!(
                    "No {} provided for {}: assigning default weight {DEFAULT_WEIGHT} ({err})",
                    weight_path.display(),
                    path.display()
                );
                return Ok(DEFAULT_WEIGHT);
            }
        };
        let value = text.trim();
        let weight = if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            value.parse::<u32>().ok().filter(|w| *w > 0)
        } else {
            None
        };
        weight.ok_or_else(|| {
            error!(
                "invalid weight file {}: weights must be positive integers, got {value:?}",
                weight_path.display()
            );
            ScenarioError::InvalidWeight {
                path: weight_path.clone(),
                value: value.to_string(),
            }
        })
    }

    /// Legacy top-level code blocks of all tasks in this tree
    ///
    /// When several tasks define the same block name, the last definition
    /// wins and keeps the position of the first.
    #[must_use]
    pub fn global_code_blocks(&self) -> IndexMap<String, Vec<String>> {
        let mut blocks = IndexMap::new();
        for child in &self.children {
            blocks.extend(child.global_code_blocks());
        }
        blocks
    }

    /// Apply scenario plugins to every scenario of this tree, bottom-up
    ///
    /// Sub-scenarios are rewritten before their parent, so each plugin sees
    /// already rewritten children. Tasks are left untouched. Without plugins,
    /// `self` is returned as is.
    #[must_use]
    pub fn apply_plugins(self, plugins: &[Plugin]) -> Scenario {
        if plugins.is_empty() {
            return self;
        }
        let children = self
            .children
            .into_iter()
            .map(|child| match child {
                Child::Scenario(s) => Child::Scenario(s.apply_plugins(plugins)),
                task => task,
            })
            .collect();
        apply(plugins, Scenario { children, ..self })
    }

    /// Tasks of this scenario only, not of sub-scenarios
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.children.iter().filter_map(|c| match c {
            Child::Task(task) => Some(task),
            Child::Scenario(_) => None,
        })
    }

    /// Direct sub-scenarios
    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.children.iter().filter_map(|c| match c {
            Child::Scenario(scenario) => Some(scenario),
            Child::Task(_) => None,
        })
    }
}

/// Builds scenario trees from the file system
///
/// Task plugins and task sequence plugins run while tasks are created;
/// scenario plugins are applied afterwards with [`Scenario::apply_plugins`].
#[derive(Debug, Clone, Default)]
pub struct ScenarioBuilder {
    task_plugins: Vec<Plugin>,
    sequence_plugins: Vec<Plugin>,
    denylist: Denylist,
}

impl ScenarioBuilder {
    /// Builder without plugins or denylist
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plugins applied to each task
    #[must_use]
    pub fn with_task_plugins(mut self, plugins: Vec<Plugin>) -> Self {
        self.task_plugins = plugins;
        self
    }

    /// Deprecated plugins applied to the task list of each recording, before
    /// task plugins
    #[must_use]
    pub fn with_sequence_plugins(mut self, plugins: Vec<Plugin>) -> Self {
        self.sequence_plugins = plugins;
        self
    }

    /// Hosts whose requests are left out
    #[must_use]
    pub fn with_denylist(mut self, denylist: Denylist) -> Self {
        self.denylist = denylist;
        self
    }

    /// Scenario for `path`, a HAR file or a scenario directory
    ///
    /// The root scenario is named after the full `path`, which keeps names
    /// distinct across several roots; nested scenarios are named after their
    /// file stem only.
    ///
    /// # Errors
    /// - [`ScenarioError::Skippable`] if `path` can't be read or decoded, or
    ///   is a directory without any scenario
    /// - [`ScenarioError::DanglingWeights`], [`ScenarioError::CollidingNames`],
    ///   [`ScenarioError::InvalidWeight`] anywhere in the tree
    pub fn build(&self, path: impl AsRef<Path>) -> ScenarioResult<Scenario> {
        self.from_path(path.as_ref(), false)
    }

    fn from_path(&self, path: &Path, short_name: bool) -> ScenarioResult<Scenario> {
        if path.is_dir() {
            self.from_dir(path, short_name)
        } else {
            self.from_har_file(path, short_name)
        }
    }

    fn from_dir(&self, path: &Path, short_name: bool) -> ScenarioResult<Scenario> {
        let mut entries: Vec<PathBuf> = fs::read_dir(path)
            .and_then(|dir| {
                dir.map(|e| e.map(|e| e.path()))
                    .collect::<std::io::Result<Vec<_>>>()
            })
            .map_err(|err| ScenarioError::skippable(path, err))?;
        entries.sort();

        let (weight_files, candidates): (Vec<PathBuf>, Vec<PathBuf>) =
            entries.into_iter().partition(|p| is_weight_file(p));

        let mut scenarios = Vec::new();
        for child in candidates {
            match self.from_path(&child, true) {
                Ok(scenario) => scenarios.push(scenario),
                Err(err) if err.is_skippable() => {
                    warn!(
                        "while searching for HAR files, skipping {}: {err}",
                        child.display()
                    );
                }
                Err(err) => return Err(err),
            }
        }

        check_dangling_weights(path, &scenarios, &weight_files)?;
        if scenarios.is_empty() {
            return Err(ScenarioError::skippable(path, "no scenarios inside the directory"));
        }
        check_name_collisions(path, &scenarios)?;

        Ok(Scenario {
            name: scenario_name(path, short_name),
            children: scenarios.into_iter().map(Child::Scenario).collect(),
            origin: Some(path.to_path_buf()),
            weight: Scenario::weight_from_path(path)?,
        })
    }

    fn from_har_file(&self, path: &Path, short_name: bool) -> ScenarioResult<Scenario> {
        let requests = read_har_file(path).map_err(|err| ScenarioError::skippable(path, err))?;
        let tasks: Vec<Task> = Task::from_requests(requests, &self.denylist).collect();
        let tasks = apply(&self.sequence_plugins, tasks);
        let children = tasks
            .into_iter()
            .map(|task| Child::Task(apply(&self.task_plugins, task)))
            .collect();

        Ok(Scenario {
            name: scenario_name(path, short_name),
            children,
            origin: Some(path.to_path_buf()),
            weight: Scenario::weight_from_path(path)?,
        })
    }
}

fn is_weight_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == WEIGHT_FILE_EXTENSION)
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn scenario_name(path: &Path, short_name: bool) -> String {
    if short_name {
        to_identifier(&stem(path))
    } else {
        to_identifier(&path.to_string_lossy())
    }
}

fn check_dangling_weights(
    path: &Path,
    scenarios: &[Scenario],
    weight_files: &[PathBuf],
) -> ScenarioResult<()> {
    let known: BTreeSet<String> = scenarios
        .iter()
        .filter_map(|s| s.origin.as_deref())
        .map(stem)
        .collect();
    let dangling: Vec<PathBuf> = weight_files
        .iter()
        .filter(|w| !known.contains(&stem(w)))
        .cloned()
        .collect();
    if dangling.is_empty() {
        return Ok(());
    }
    let err = ScenarioError::DanglingWeights {
        path: path.to_path_buf(),
        files: dangling,
    };
    error!("{err}");
    info!(
        "For any value of X, if there exists a weight file X.weight, \
         there must exist either an X.har file or an X scenario subdirectory."
    );
    Err(err)
}

fn check_name_collisions(path: &Path, scenarios: &[Scenario]) -> ScenarioResult<()> {
    let mut by_name: IndexMap<&str, Vec<PathBuf>> = IndexMap::new();
    for scenario in scenarios {
        by_name
            .entry(scenario.name.as_str())
            .or_default()
            .extend(scenario.origin.clone());
    }
    let groups: Vec<Vec<PathBuf>> = by_name
        .into_values()
        .filter(|origins| origins.len() > 1)
        .collect();
    if groups.is_empty() {
        return Ok(());
    }
    let err = ScenarioError::CollidingNames {
        path: path.to_path_buf(),
        groups,
    };
    error!("{err}");
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::Plugin;
    use locustgen_har::HttpMethod;
    use locustgen_test_utils::{request, ScenarioDir};

    fn leaf(name: &str) -> Scenario {
        let task = Task::from_request(request(HttpMethod::Get, "https://example.com/"));
        Scenario::new(name, vec![Child::Task(task)])
    }

    #[test]
    fn weight_defaults_to_one() {
        let dir = ScenarioDir::new();
        let har = dir.har("a.har");
        assert_eq!(Scenario::weight_from_path(&har).unwrap(), 1);
    }

    #[test]
    fn weight_is_trimmed() {
        let dir = ScenarioDir::new();
        let har = dir.har("a.har");
        dir.weight("a.har", " 12\n");
        assert_eq!(Scenario::weight_from_path(&har).unwrap(), 12);
    }

    #[test]
    fn invalid_weights() {
        for value in ["0", "-2", "2.1", "abc", " ", "", "99999999999"] {
            let dir = ScenarioDir::new();
            let har = dir.har("a.har");
            dir.weight("a.har", value);
            let err = Scenario::weight_from_path(&har).unwrap_err();
            assert!(
                matches!(err, ScenarioError::InvalidWeight { value: ref got, .. } if got == value.trim()),
                "{value:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn global_code_blocks_merge_last_wins() {
        let mut a = leaf("a");
        if let Child::Task(task) = &mut a.children[0] {
            task.global_code_blocks.insert("x".into(), vec!["1".into()]);
            task.global_code_blocks.insert("y".into(), vec!["2".into()]);
        }
        let mut b = leaf("b");
        if let Child::Task(task) = &mut b.children[0] {
            task.global_code_blocks.insert("x".into(), vec!["3".into()]);
        }
        let root = Scenario::new("root", vec![a.into(), b.into()]);
        let blocks = root.global_code_blocks();
        let keys: Vec<&String> = blocks.keys().collect();
        assert_eq!(keys, ["x", "y"]);
        assert_eq!(blocks["x"], vec!["3".to_string()]);
    }

    #[test]
    fn apply_plugins_without_plugins_is_identity() {
        let root = Scenario::new("root", vec![leaf("a").into()]);
        assert_eq!(root.clone().apply_plugins(&[]), root);
    }

    #[test]
    fn apply_plugins_is_bottom_up() {
        let root = Scenario::new(
            "root",
            vec![
                Scenario::new("mid", vec![leaf("a").into()]).into(),
                leaf("b").into(),
            ],
        );
        // Each scenario records the names its children had when it was visited.
        let plugin = Plugin::on_scenario("trace", |mut s: Scenario| {
            let seen: Vec<String> = s.scenarios().map(|c| c.name.clone()).collect();
            s.name = format!("{}[{}]", s.name, seen.join(","));
            s
        });
        let root = root.apply_plugins(&[plugin]);
        assert_eq!(root.name, "root[mid[a[]],b[]]");
        assert!(root.tasks().next().is_none());
        assert_eq!(root.scenarios().count(), 2);
    }
}
