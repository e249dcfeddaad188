//! HTTP requests read from HAR recordings
//!
//! A [`Request`] is decoded from one HAR 1.2 `entries[]` object. Decoding is
//! strict about what later stages rely on (method, URL, timestamp, body shape)
//! and lenient about everything else: unknown fields are ignored, and the
//! original entry is kept in [`Request::har_entry`] for read-only access.

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::ops::Deref;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::{Position, Url};

use crate::error::{HarError, HarResult};
use crate::naming::to_identifier;

/// MIME type whose `text` body is sent as JSON
pub const JSON_MIME_TYPE: &str = "application/json";

/// Supported HTTP methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Options,
    Delete,
}

impl HttpMethod {
    /// All supported methods
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Options,
        HttpMethod::Delete,
    ];

    /// Upper-case name, as found in HAR files
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether requests with this method never carry a body
    #[inline]
    #[must_use]
    pub const fn is_bodyless(&self) -> bool {
        matches!(
            self,
            HttpMethod::Get | HttpMethod::Options | HttpMethod::Delete
        )
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = HarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| HarError::UnsupportedMethod(s.to_string()))
    }
}

/// An HTTP header, as recorded in a HAR file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A name/value pair of a query string or a form body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryPair {
    pub name: String,
    pub value: String,
}

impl QueryPair {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A URL as recorded, along with its parsed form
///
/// [`RecordedUrl::as_str`] and `Display` give the recorded text, which may
/// differ from the normalised serialisation of [`Url`] (trailing `/`,
/// default port, percent escapes). Parsed accessors are reached through
/// `Deref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUrl {
    raw: String,
    parsed: Url,
}

impl RecordedUrl {
    /// Parse `raw`, keeping it verbatim
    ///
    /// # Errors
    /// [`HarError::InvalidUrl`] if `raw` is not an absolute URL
    pub fn parse(raw: &str) -> HarResult<Self> {
        let parsed = Url::parse(raw).map_err(|source| HarError::InvalidUrl {
            value: raw.to_string(),
            source,
        })?;
        Ok(Self {
            raw: raw.to_string(),
            parsed,
        })
    }

    /// Recorded text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed form
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.parsed
    }

    /// Authority as written: `[user[:password]@]host[:port]`
    #[must_use]
    pub fn netloc(&self) -> &str {
        let authority = self
            .raw
            .trim()
            .split_once("://")
            .map(|(_, rest)| rest.split(['/', '?', '#']).next().unwrap_or_default());
        match authority {
            Some(authority) if !authority.is_empty() => authority,
            _ => &self.parsed[Position::BeforeUsername..Position::AfterPort],
        }
    }
}

impl Deref for RecordedUrl {
    type Target = Url;

    fn deref(&self) -> &Url {
        &self.parsed
    }
}

impl Display for RecordedUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for RecordedUrl {
    type Err = HarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Url> for RecordedUrl {
    fn from(parsed: Url) -> Self {
        Self {
            raw: parsed.as_str().to_string(),
            parsed,
        }
    }
}

/// Textual body of a request
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Raw text, sent as bytes (typically form-urlencoded)
    Text(String),
    /// Decoded JSON document
    Json(Value),
}

/// Payload of a request, decoded from a HAR `postData` object
///
/// HAR says `text` and `params` are mutually exclusive but recorders often
/// fill both; both are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct PostData {
    /// `mimeType` field
    pub mime_type: String,
    /// `text` field, decoded according to `mime_type`
    pub body: Option<Body>,
    /// `params` field
    pub params: Option<Vec<QueryPair>>,
}

impl PostData {
    /// Build post data from its HAR fields
    ///
    /// # Errors
    /// [`HarError::InvalidPostData`] if neither `text` nor `params` is given,
    /// or if a JSON body is absent or unparseable
    pub fn new(
        mime_type: impl Into<String>,
        text: Option<String>,
        params: Option<Vec<QueryPair>>,
    ) -> HarResult<Self> {
        let mime_type = mime_type.into();
        if text.is_none() && params.is_none() {
            return Err(HarError::invalid_post_data("should contain 'text' or 'params'"));
        }
        let body = if mime_type == JSON_MIME_TYPE {
            let text = text.ok_or_else(|| {
                HarError::invalid_post_data(format!(
                    "missing 'text' field for {JSON_MIME_TYPE} content"
                ))
            })?;
            let json = serde_json::from_str(&text).map_err(|e| {
                HarError::invalid_post_data(format!("unreadable JSON from field 'text': {e}"))
            })?;
            Some(Body::Json(json))
        } else {
            text.map(Body::Text)
        };
        Ok(Self {
            mime_type,
            body,
            params,
        })
    }

    /// Decode a HAR `postData` object
    ///
    /// # Errors
    /// [`HarError::InvalidPostData`] if a field is missing or malformed
    pub fn from_har(post_data: &Value) -> HarResult<Self> {
        let mime_type = post_data
            .get("mimeType")
            .and_then(Value::as_str)
            .ok_or_else(|| HarError::invalid_post_data("missing 'mimeType' field"))?;
        let text = match post_data.get("text") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(HarError::invalid_post_data("'text' should be a string")),
        };
        let params = match post_data.get("params") {
            None | Some(Value::Null) => None,
            Some(params) => Some(
                Vec::<QueryPair>::deserialize(params)
                    .map_err(|_| HarError::invalid_post_data("unreadable params field"))?,
            ),
        };
        Self::new(mime_type, text, params)
    }

    fn fingerprint_into(&self, hasher: &mut blake3::Hasher) {
        hasher.update(self.mime_type.as_bytes());
        match &self.body {
            Some(Body::Text(text)) => hasher.update(text.as_bytes()),
            Some(Body::Json(json)) => hasher.update(json.to_string().as_bytes()),
            None => hasher.update(&[0]),
        };
        for pair in self.params.iter().flatten() {
            update_pair(hasher, &pair.name, &pair.value);
        }
    }
}

/// An HTTP request, as recorded in a HAR file
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// When the request was started
    pub timestamp: DateTime<FixedOffset>,
    pub method: HttpMethod,
    pub url: RecordedUrl,
    /// Entry this request was decoded from (`Null` for built requests)
    pub har_entry: Value,
    pub headers: Vec<Header>,
    pub post_data: Option<PostData>,
    /// Key-value arguments of the query string
    pub query: Vec<QueryPair>,
    /// Value for Locust's `name` parameter, grouping URLs with dynamic parts
    pub name: Option<String>,
}

impl Request {
    /// Request without headers, body or query
    #[must_use]
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        method: HttpMethod,
        url: impl Into<RecordedUrl>,
    ) -> Self {
        Self {
            timestamp,
            method,
            url: url.into(),
            har_entry: Value::Null,
            headers: Vec::new(),
            post_data: None,
            query: Vec::new(),
            name: None,
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// Add a query pair
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push(QueryPair::new(name, value));
        self
    }

    /// Set the body
    #[must_use]
    pub fn with_post_data(mut self, post_data: PostData) -> Self {
        self.post_data = Some(post_data);
        self
    }

    /// Set Locust's grouping name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Decode a HAR `entries[]` object
    ///
    /// # Errors
    /// - [`HarError::MissingField`] if `startedDateTime`, `request`,
    ///   `request.method` or `request.url` is absent
    /// - [`HarError::UnsupportedMethod`], [`HarError::InvalidTimestamp`],
    ///   [`HarError::InvalidUrl`], [`HarError::InvalidPostData`] for
    ///   unusable values
    /// - [`HarError::Json`] if headers or query pairs are malformed
    pub fn from_har_entry(entry: &Value) -> HarResult<Self> {
        let request = field(entry, "request")?;
        let timestamp = parse_timestamp(str_field(entry, "startedDateTime")?)?;
        let method = str_field(request, "method")?.parse()?;
        let url = RecordedUrl::parse(str_field(request, "url")?)?;
        let headers = match request.get("headers") {
            Some(headers) => Vec::<Header>::deserialize(headers)?,
            None => Vec::new(),
        };
        let query = match request.get("queryString") {
            Some(query) => Vec::<QueryPair>::deserialize(query)?,
            None => Vec::new(),
        };
        let post_data = match request.get("postData") {
            None | Some(Value::Null) => None,
            Some(post_data) => Some(PostData::from_har(post_data)?),
        };
        Ok(Self {
            timestamp,
            method,
            url,
            har_entry: entry.clone(),
            headers,
            post_data,
            query,
            name: None,
        })
    }

    /// Lazily decode every entry of a top-level HAR object
    ///
    /// # Errors
    /// [`HarError::MissingField`] if `log.entries` is absent or not a list;
    /// each item of the iterator carries its own decoding result.
    pub fn all_from_har(har: &Value) -> HarResult<impl Iterator<Item = HarResult<Request>> + '_> {
        let entries = field(har, "log")?
            .get("entries")
            .and_then(Value::as_array)
            .ok_or(HarError::MissingField("entries"))?;
        Ok(entries.iter().map(Request::from_har_entry))
    }

    /// `[user[:password]@]host[:port]` part of the URL, as recorded
    #[must_use]
    pub fn netloc(&self) -> String {
        self.url.netloc().to_string()
    }

    /// Deterministic digest of everything that identifies this request
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.timestamp.to_rfc3339().as_bytes());
        hasher.update(self.method.as_str().as_bytes());
        hasher.update(self.url.as_str().as_bytes());
        hasher.update(b"\x01");
        for header in &self.headers {
            update_pair(&mut hasher, &header.name, &header.value);
        }
        hasher.update(b"\x02");
        if let Some(post_data) = &self.post_data {
            post_data.fingerprint_into(&mut hasher);
        }
        hasher.update(b"\x03");
        for pair in &self.query {
            update_pair(&mut hasher, &pair.name, &pair.value);
        }
        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }

    /// Name for the task performing this request:
    /// `METHOD_scheme_host_path_fingerprint`, usable as a Python identifier
    #[must_use]
    pub fn task_name(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.method,
            self.url.scheme(),
            to_identifier(self.url.host_str().unwrap_or_default()),
            to_identifier(self.url.path()),
            self.fingerprint()
        )
    }
}

fn update_pair(hasher: &mut blake3::Hasher, name: &str, value: &str) {
    hasher.update(name.as_bytes());
    hasher.update(&[0]);
    hasher.update(value.as_bytes());
    hasher.update(&[0]);
}

fn field<'a>(object: &'a Value, name: &'static str) -> HarResult<&'a Value> {
    object.get(name).ok_or(HarError::MissingField(name))
}

fn str_field<'a>(object: &'a Value, name: &'static str) -> HarResult<&'a str> {
    field(object, name)?
        .as_str()
        .ok_or(HarError::MissingField(name))
}

/// Parse a HAR timestamp: RFC 3339, a date-time without offset (taken as
/// UTC), or a plain date (midnight UTC)
///
/// # Errors
/// [`HarError::InvalidTimestamp`] if none of these forms match
pub fn parse_timestamp(value: &str) -> HarResult<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts);
    }
    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| HarError::InvalidTimestamp(value.to_string()))?;
    Ok(Utc.from_utc_datetime(&naive).into())
}

/// Read every request of a HAR file
///
/// The requests are collected: tasks are ordered by timestamp, which needs
/// the whole recording anyway. Use [`Request::all_from_har`] to decode entries
/// one at a time.
///
/// # Errors
/// [`HarError::Io`] if the file can't be read, [`HarError::Json`] if it is not
/// JSON, or the first entry decoding error
pub fn read_har_file(path: impl AsRef<Path>) -> HarResult<Vec<Request>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| HarError::io_error(path, e))?;
    parse_har(&text)
}

/// Decode every request of a HAR document
///
/// # Errors
/// [`HarError::Json`] if `text` is not JSON, or the first entry decoding error
pub fn parse_har(text: &str) -> HarResult<Vec<Request>> {
    let har: Value = serde_json::from_str(text)?;
    let requests = Request::all_from_har(&har)?.collect();
    requests
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entry(request: Value) -> Value {
        json!({"startedDateTime": "2018-01-01T10:00:00+02:00", "request": request})
    }

    #[test]
    fn method_parsing() {
        assert_eq!("PUT".parse::<HttpMethod>().unwrap(), HttpMethod::Put);
        assert!(matches!(
            "PATCH".parse::<HttpMethod>(),
            Err(HarError::UnsupportedMethod(m)) if m == "PATCH"
        ));
        assert!("get".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn minimal_entry() {
        let req = Request::from_har_entry(&entry(json!({
            "method": "GET",
            "url": "https://example.com/a?b=1",
        })))
        .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url.path(), "/a");
        assert!(req.headers.is_empty());
        assert!(req.post_data.is_none());
        assert_eq!(req.name, None);
        assert_eq!(req.timestamp.to_rfc3339(), "2018-01-01T10:00:00+02:00");
    }

    #[test]
    fn url_is_kept_as_recorded() {
        let req = Request::from_har_entry(&entry(json!({
            "method": "GET",
            "url": "https://www.zalando.de",
        })))
        .unwrap();
        assert_eq!(req.url.as_str(), "https://www.zalando.de");
        assert_eq!(req.url.to_string(), "https://www.zalando.de");
        assert_eq!(req.url.url().as_str(), "https://www.zalando.de/");
        assert_eq!(req.url.path(), "/");
    }

    #[test]
    fn netloc_keeps_userinfo_and_default_port() {
        let cases = [
            ("https://user:pw@example.com:443/a", "user:pw@example.com:443"),
            ("https://example.com?q=1", "example.com"),
            ("http://localhost:8080#top", "localhost:8080"),
            ("https://Example.com/", "Example.com"),
        ];
        for (raw, netloc) in cases {
            let url: RecordedUrl = raw.parse().unwrap();
            assert_eq!(url.netloc(), netloc, "{raw}");
        }
        let normalised: RecordedUrl = Url::parse("http:example.com").unwrap().into();
        assert_eq!(normalised.netloc(), "example.com");
        assert!(matches!(
            "not a url".parse::<RecordedUrl>(),
            Err(HarError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn full_entry() {
        let req = Request::from_har_entry(&entry(json!({
            "method": "POST",
            "url": "http://localhost:8080/login",
            "headers": [{"name": "Accept", "value": "*/*", "comment": ""}],
            "queryString": [{"name": "q", "value": "x"}],
            "postData": {"mimeType": "application/json", "text": "{\"b\": 1, \"a\": [true]}"},
        })))
        .unwrap();
        assert_eq!(req.headers, vec![Header::new("Accept", "*/*")]);
        assert_eq!(req.query, vec![QueryPair::new("q", "x")]);
        assert_eq!(req.netloc(), "localhost:8080");
        let post = req.post_data.unwrap();
        assert_eq!(post.body, Some(Body::Json(json!({"b": 1, "a": [true]}))));
    }

    #[test]
    fn missing_fields() {
        let no_request = json!({"startedDateTime": "2018-01-01"});
        assert!(matches!(
            Request::from_har_entry(&no_request),
            Err(HarError::MissingField("request"))
        ));
        assert!(matches!(
            Request::from_har_entry(&entry(json!({"method": "GET"}))),
            Err(HarError::MissingField("url"))
        ));
    }

    #[test]
    fn unsupported_method_entry() {
        let result = Request::from_har_entry(&entry(json!({"method": "PATCH", "url": "https://x"})));
        assert!(matches!(result, Err(HarError::UnsupportedMethod(_))));
    }

    #[test]
    fn timestamp_forms() {
        assert_eq!(
            parse_timestamp("2018-01-01").unwrap().to_rfc3339(),
            "2018-01-01T00:00:00+00:00"
        );
        assert_eq!(
            parse_timestamp("2018-01-01T12:30:00.5").unwrap().to_rfc3339(),
            "2018-01-01T12:30:00.500+00:00"
        );
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(HarError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn post_data_validation() {
        let none = PostData::from_har(&json!({"mimeType": "text/plain"}));
        assert!(matches!(none, Err(HarError::InvalidPostData(_))));

        let no_mime = PostData::from_har(&json!({"text": "x"}));
        assert!(matches!(no_mime, Err(HarError::InvalidPostData(_))));

        let bad_json = PostData::from_har(&json!({"mimeType": JSON_MIME_TYPE, "text": "{"}));
        assert!(matches!(bad_json, Err(HarError::InvalidPostData(_))));

        let json_without_text =
            PostData::from_har(&json!({"mimeType": JSON_MIME_TYPE, "params": []}));
        assert!(matches!(json_without_text, Err(HarError::InvalidPostData(_))));

        let bad_params = PostData::from_har(&json!({"mimeType": "x", "params": [{"name": "a"}]}));
        assert!(matches!(bad_params, Err(HarError::InvalidPostData(_))));

        let form = PostData::from_har(&json!({
            "mimeType": "application/x-www-form-urlencoded",
            "text": "a=1",
            "params": [{"name": "a", "value": "1"}],
        }))
        .unwrap();
        assert_eq!(form.body, Some(Body::Text("a=1".to_string())));
        assert_eq!(form.params, Some(vec![QueryPair::new("a", "1")]));
    }

    #[test]
    fn all_from_har_needs_entries() {
        assert!(matches!(
            Request::all_from_har(&json!({"log": {}})).err(),
            Some(HarError::MissingField("entries"))
        ));
        assert!(matches!(
            Request::all_from_har(&json!({})).err(),
            Some(HarError::MissingField("log"))
        ));
    }

    #[test]
    fn task_name_shape() {
        let ts = parse_timestamp("2018-01-01").unwrap();
        let url = Url::parse("https://www.example.com/search").unwrap();
        let req = Request::new(ts, HttpMethod::Get, url);
        let name = req.task_name();
        assert!(name.starts_with("GET_https_www_example_com_"));
        assert!(name.ends_with(&format!("_{}", req.fingerprint())));
        assert_eq!(name, req.clone().task_name());
    }

    #[test]
    fn fingerprint_depends_on_content() {
        let ts = parse_timestamp("2018-01-01").unwrap();
        let url = Url::parse("https://example.com").unwrap();
        let a = Request::new(ts, HttpMethod::Get, url);
        let b = a.clone().with_header("x", "1");
        let c = a.clone().with_query("x", "1");
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_ne!(b.fingerprint(), c.fingerprint());
    }
}
