//! Example plugin: logs the first request of every scenario

use locustgen_har::Request;
use tracing::info;

use crate::plugins::contracts::Plugin;
use crate::scenario::{Child, Scenario};

/// Name under which this plugin is registered
pub const NAME: &str = "dummy";

/// Request of the first task reached by always descending into the first child
#[must_use]
pub fn first_request(scenario: &Scenario) -> Option<&Request> {
    match scenario.children.first()? {
        Child::Task(task) => Some(&task.request),
        Child::Scenario(nested) => first_request(nested),
    }
}

/// Log the first request of `scenario` and return it unchanged
#[must_use]
pub fn log_first_request(scenario: Scenario) -> Scenario {
    if let Some(request) = first_request(&scenario) {
        info!("The first request was {}", request.url);
    }
    scenario
}

/// The plugin, ready to register
#[must_use]
pub fn plugin() -> Plugin {
    Plugin::on_scenario(NAME, log_first_request)
}
