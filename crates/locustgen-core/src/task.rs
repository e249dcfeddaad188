//! Tasks: one recorded request plus the code around it
//!
//! Each HTTP request of a recording becomes a [`Task`], which later renders as
//! one `@seq_task`-decorated method of a Locust `TaskSequence`. Besides the
//! request, a task holds the body of that method. By default the body is a
//! single `response = ...` assignment whose right-hand side is a placeholder
//! for the request: the task itself resolves it, so plugins may keep
//! changing [`Task::request`] and the generated call follows.

use indexmap::IndexMap;
use tracing::debug;

use locustgen_har::{Body, Denylist, HttpMethod, QueryPair, Request};
use locustgen_syntax::{
    Assignment, Expression, ExpressionView, FunctionCall, Resolve, Statement, Value, ViewKey,
};

/// `timeout` argument of every generated request
pub const TIMEOUT: i64 = 30;

/// Name bound to the result of the request in the default body
pub const RESPONSE_NAME: &str = "response";

/// A recorded request and the statements performing it
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Name of the generated method
    pub name: String,
    /// Request performed by this task
    pub request: Request,
    /// Body of the generated method. One of these statements holds the
    /// [`Task::REQUEST_VIEW`] placeholder; statements before and after it
    /// are pre- and post-processing code.
    pub statements: Vec<Statement>,
    /// Top-level code blocks this task needs, by name
    ///
    /// Legacy channel from before whole-program plugins existed; new plugins
    /// should rewrite the program instead.
    pub global_code_blocks: IndexMap<String, Vec<String>>,
}

impl Task {
    /// Placeholder key standing for [`Task::request`]
    pub const REQUEST_VIEW: ViewKey = ViewKey(0);

    /// Task with the default body
    #[must_use]
    pub fn new(name: impl Into<String>, request: Request) -> Self {
        Self {
            name: name.into(),
            request,
            statements: vec![Assignment::new(RESPONSE_NAME, Self::request_view()).into()],
            global_code_blocks: IndexMap::new(),
        }
    }

    /// Task named after its request
    #[must_use]
    pub fn from_request(request: Request) -> Self {
        Self::new(request.task_name(), request)
    }

    /// Tasks for `requests`, ordered by increasing timestamp, without the
    /// requests whose host is on `denylist`
    pub fn from_requests<'a>(
        requests: impl IntoIterator<Item = Request>,
        denylist: &'a Denylist,
    ) -> impl Iterator<Item = Task> + 'a {
        let mut requests: Vec<Request> = requests.into_iter().collect();
        requests.sort_by_key(|r| r.timestamp);
        requests.into_iter().filter_map(move |request| {
            let netloc = request.netloc();
            if denylist.contains(&netloc) {
                debug!(url = %request.url, "skipping denylisted request");
                None
            } else {
                Some(Task::from_request(request))
            }
        })
    }

    /// Placeholder expression for the request of the enclosing task
    #[inline]
    #[must_use]
    pub fn request_view() -> Expression {
        Expression::view(Self::REQUEST_VIEW, "this task's request field")
    }

    /// Add a global code block, builder style
    #[must_use]
    pub fn with_global_code_block<I, S>(mut self, name: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.global_code_blocks
            .insert(name.into(), lines.into_iter().map(Into::into).collect());
        self
    }

    /// Body with the request placeholder replaced by the current call
    #[must_use]
    pub fn resolved_statements(&self) -> Vec<Statement> {
        self.statements.iter().map(|s| s.resolved(self)).collect()
    }
}

impl Resolve for Task {
    fn resolve(&self, view: &ExpressionView) -> Option<Expression> {
        (view.key == Self::REQUEST_VIEW).then(|| req_to_expr(&self.request).into())
    }
}

/// Locust client call performing `request`
///
/// Keyword arguments, in order: `url`, `name`, `timeout`, `allow_redirects`,
/// then `headers` if any, then the body (`data`, `params`, `json`) for POST and
/// PUT. PUT always gets `params`, extended with the query pairs.
#[must_use]
pub fn req_to_expr(request: &Request) -> FunctionCall {
    let url = Expression::literal(request.url.as_str());
    let name = match request.name.as_deref() {
        Some(name) if !name.is_empty() => Expression::literal(name),
        _ => url.clone(),
    };
    let mut call = FunctionCall::new(format!("self.client.{}", request.method.as_str().to_lowercase()))
        .kwarg("url", url)
        .kwarg("name", name)
        .kwarg("timeout", Expression::literal(TIMEOUT))
        .kwarg("allow_redirects", Expression::literal(false));

    let headers = zip_kv_pairs(request.headers.iter().map(|h| (h.name.as_str(), h.value.as_str())));
    if !headers.is_empty() {
        call = call.kwarg("headers", Expression::literal(Value::str_dict(headers)));
    }

    if request.method.is_bodyless() {
        return call;
    }

    let mut params = None;
    if let Some(post_data) = &request.post_data {
        if let Some(Body::Text(text)) = &post_data.body {
            call = call.kwarg("data", Expression::literal(Value::bytes(text.as_bytes())));
        }
        if let Some(pairs) = &post_data.params {
            params = Some(pairs_as_bytes(pairs));
            call = call.kwarg("params", Expression::literal(Value::List(Vec::new())));
        }
        if let Some(Body::Json(json)) = &post_data.body {
            call = call.kwarg("json", Expression::literal(Value::from(json)));
        }
    }
    if request.method == HttpMethod::Put {
        params
            .get_or_insert_with(Vec::new)
            .extend(pairs_as_bytes(&request.query));
    }
    if let Some(params) = params {
        call = call.kwarg("params", Expression::literal(Value::List(params)));
    }
    call
}

/// Name/value pairs as a map; later duplicates overwrite earlier values but
/// keep the position of the first occurrence.
pub(crate) fn zip_kv_pairs<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> IndexMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn pairs_as_bytes(pairs: &[QueryPair]) -> Vec<Value> {
    pairs
        .iter()
        .map(|p| {
            Value::Tuple(vec![
                Value::bytes(p.name.as_bytes()),
                Value::bytes(p.value.as_bytes()),
            ])
        })
        .collect()
}
