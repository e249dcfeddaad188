//! Default plugin: header cleanup
//!
//! Removes the Chrome-specific, RFC-non-compliant pseudo-headers starting with
//! `:`, removes `Cookie` (Locust's HTTP session manages cookies itself), and
//! lower-cases header names so that later plugins can override them without
//! caring about case.

use locustgen_har::Header;

use crate::plugins::contracts::Plugin;
use crate::task::{zip_kv_pairs, Task};

/// Name under which this plugin is registered
pub const NAME: &str = "sanitize_headers";

/// Clean up the headers of `task`'s request
///
/// When a name appears several times (possibly with different cases), the
/// last value wins and the first position is kept.
#[must_use]
pub fn sanitize_headers(mut task: Task) -> Task {
    let lowered: Vec<(String, &str)> = task
        .request
        .headers
        .iter()
        .filter(|h| !h.name.starts_with(':') && !h.name.eq_ignore_ascii_case("cookie"))
        .map(|h| (h.name.to_lowercase(), h.value.as_str()))
        .collect();
    let headers = zip_kv_pairs(lowered.iter().map(|(k, v)| (k.as_str(), *v)))
        .into_iter()
        .map(|(name, value)| Header { name, value })
        .collect();
    task.request.headers = headers;
    task
}

/// The plugin, ready to register
#[must_use]
pub fn plugin() -> Plugin {
    Plugin::on_task(NAME, sanitize_headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use locustgen_har::HttpMethod;
    use locustgen_test_utils::request;
    use pretty_assertions::assert_eq;

    fn headers(task: &Task) -> Vec<(&str, &str)> {
        task.request
            .headers
            .iter()
            .map(|h| (h.name.as_str(), h.value.as_str()))
            .collect()
    }

    #[test]
    fn removes_pseudo_headers_and_cookies() {
        let req = request(HttpMethod::Get, "https://example.com/")
            .with_header(":authority", "example.com")
            .with_header("Cookie", "a=1")
            .with_header("COOKIE", "b=2")
            .with_header("Accept", "*/*");
        let task = sanitize_headers(Task::from_request(req));
        assert_eq!(headers(&task), vec![("accept", "*/*")]);
    }

    #[test]
    fn lowercases_and_merges_names() {
        let req = request(HttpMethod::Get, "https://example.com/")
            .with_header("X-A", "1")
            .with_header("x-b", "2")
            .with_header("x-a", "3");
        let task = sanitize_headers(Task::from_request(req));
        assert_eq!(headers(&task), vec![("x-a", "3"), ("x-b", "2")]);
    }

    #[test]
    fn keeps_other_fields() {
        let task = Task::from_request(request(HttpMethod::Post, "https://example.com/"));
        let sanitized = sanitize_headers(task.clone());
        assert_eq!(sanitized, task);
    }
}
