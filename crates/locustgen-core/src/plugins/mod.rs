//! Plugin system
//!
//! - [`contracts`]: contracts, handler traits, validation, grouping and
//!   application
//! - [`registry`]: lookup of plugin bundles by name
//! - [`decision`]: verdicts with reasons, used to explain rejections
//! - [`sanitize_headers`], [`dummy`]: built-in plugins

pub mod contracts;
pub mod decision;
pub mod dummy;
pub mod registry;
pub mod sanitize_headers;

pub use contracts::{
    apply, check, group_by_contract, validate, Contract, ContractGroups, OnProgram, OnScenario,
    OnTask, OnTaskSequence, Plugin, Transform,
};
pub use decision::Decision;
pub use registry::{default_plugins, PluginRegistry};
