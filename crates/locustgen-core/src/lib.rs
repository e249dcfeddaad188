//! Turn HAR recordings into Locust load test scripts
//!
//! # Pipeline
//!
//! 1. Each input path becomes a [`Scenario`]: a HAR file gives a scenario of
//!    [`Task`]s (one per request, in timestamp order), a directory gives a
//!    scenario of sub-scenarios, weighted by optional `.weight` files.
//! 2. [`plugins`] rewrite tasks while they are created, then scenarios
//!    bottom-up, then the generated program.
//! 3. [`locust`] renders the program: one `TaskSequence` class and one
//!    `HttpLocust` class per input path.
//!
//! [`dumps`] and [`dump`] run all of it.
//!
//! # Example
//!
//! ```rust,no_run
//! use locustgen_core::{dumps, TransformOptions};
//! use locustgen_har::Denylist;
//!
//! let options = TransformOptions::new()
//!     .plugin("dummy")
//!     .denylist(Denylist::from_current_dir());
//! let locustfile = dumps(["checkout.har", "browsing/"], &options)?;
//! std::fs::write("locustfile.py", locustfile)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod locust;
pub mod plugins;
pub mod scenario;
pub mod task;
pub mod transform;

pub use error::{ContractError, Error, PluginError, Result, ScenarioError, ScenarioResult};
pub use locust::{locust_program, locustfile, locustfile_lines};
pub use plugins::{Contract, Decision, Plugin, PluginRegistry};
pub use scenario::{Child, Scenario, ScenarioBuilder};
pub use task::{req_to_expr, Task};
pub use transform::{dump, dumps, TransformOptions};

/// Version of this crate, written in generated files
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for writing plugins
    pub use crate::plugins::{Contract, Plugin, PluginRegistry};
    pub use crate::scenario::{Child, Scenario};
    pub use crate::task::Task;
    pub use crate::transform::{dump, dumps, TransformOptions};
    pub use locustgen_syntax::prelude::*;
}
