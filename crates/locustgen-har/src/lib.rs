//! HAR recordings
//!
//! Reads HTTP Archive 1.2 files into typed [`Request`]s and provides the
//! helpers that turn them into task names: [`to_identifier`] for Python
//! identifiers, and [`Denylist`] to exclude hosts from a recording.
//!
//! # Example
//!
//! ```rust
//! use locustgen_har::{parse_har, HttpMethod};
//!
//! let har = r#"{"log": {"entries": [{
//!     "startedDateTime": "2018-01-01",
//!     "request": {"method": "GET", "url": "https://www.zalando.de"}
//! }]}}"#;
//! let requests = parse_har(har).unwrap();
//! assert_eq!(requests[0].method, HttpMethod::Get);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod denylist;
pub mod error;
pub mod naming;
pub mod request;

pub use denylist::Denylist;
pub use error::{HarError, HarResult};
pub use naming::to_identifier;
pub use request::{
    parse_har, parse_timestamp, read_har_file, Body, Header, HttpMethod, PostData, QueryPair,
    RecordedUrl, Request, JSON_MIME_TYPE,
};
