//! Testing utilities for locustgen workspace
//!
//! Shared fixtures: a minimal HAR recording, request builders, and temporary
//! scenario directory trees.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use locustgen_har::{parse_timestamp, HttpMethod, RecordedUrl, Request};
use serde_json::json;
use tempfile::TempDir;

/// One GET request to `https://www.zalando.de`, on 2018-01-01
pub const DUMMY_HAR_STRING: &str = r#"{"log":{"entries":[{"startedDateTime":"2018-01-01","request":{"method":"GET","url":"https://www.zalando.de"}}]}}"#;

/// URL of the request in [`DUMMY_HAR_STRING`]
pub const DUMMY_URL: &str = "https://www.zalando.de";

/// HAR document with one entry per `(startedDateTime, method, url)`
pub fn har_with_entries(entries: &[(&str, &str, &str)]) -> String {
    let entries: Vec<_> = entries
        .iter()
        .map(|(ts, method, url)| {
            json!({
                "startedDateTime": ts,
                "request": {"method": method, "url": url},
            })
        })
        .collect();
    json!({"log": {"entries": entries}}).to_string()
}

/// Request built without going through HAR decoding
pub fn request(method: HttpMethod, url: &str) -> Request {
    let timestamp = parse_timestamp("2018-01-01T00:00:00Z").unwrap();
    Request::new(timestamp, method, url.parse::<RecordedUrl>().unwrap())
}

/// Request at a given timestamp
pub fn request_at(timestamp: &str, method: HttpMethod, url: &str) -> Request {
    let mut request = request(method, url);
    request.timestamp = parse_timestamp(timestamp).unwrap();
    request
}

/// Temporary directory to lay out scenario trees in
pub struct ScenarioDir {
    dir: TempDir,
}

impl ScenarioDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `relative` inside the tree
    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write `contents` at `relative`, creating parent directories
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    /// Write [`DUMMY_HAR_STRING`] at `relative`
    pub fn har(&self, relative: &str) -> PathBuf {
        self.write(relative, DUMMY_HAR_STRING)
    }

    /// Write the weight file of `relative` (same path, `.weight` extension)
    pub fn weight(&self, relative: &str, value: &str) -> PathBuf {
        let path = self.join(relative).with_extension("weight");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, value).unwrap();
        path
    }

    /// Create an empty directory at `relative`
    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.join(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }
}

impl Default for ScenarioDir {
    fn default() -> Self {
        Self::new()
    }
}
