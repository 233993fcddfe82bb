use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};
use time::{OffsetDateTime, UtcOffset};

use crate::names::named_enum;
use crate::trace_context::{SpanId, TraceId};

/// Timestamp in milliseconds since UNIX epoch
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const MILLIS_PER_HOUR: u64 = 60 * 60 * 1000;
    pub const MILLIS_PER_DAY: u64 = 24 * Self::MILLIS_PER_HOUR;

    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self(millis)
    }

    /// Whole seconds since the epoch
    pub fn as_secs(self) -> i64 {
        (self.0 / 1000) as i64
    }

    /// Calendar view of this instant at the given offset
    pub fn to_datetime(self, offset: UtcOffset) -> OffsetDateTime {
        let nanos = self.0 as i128 * 1_000_000;
        OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
            .to_offset(offset)
    }

    pub fn saturating_sub(self, millis: u64) -> Self {
        Self(self.0.saturating_sub(millis))
    }
}

named_enum! {
    /// Kind of work a span represents
    pub enum SpanOperation: "span operation" {
        HttpServer => "http.server",
        HttpClient => "http.client",
        DbQuery => "db.query",
        DbTransaction => "db.transaction",
        DbConnection => "db.connection",
        UiMount => "ui.mount",
        UiRender => "ui.render",
        UiPaint => "ui.paint",
        UiInteraction => "ui.interaction",
        NavigationNavigate => "navigation.navigate",
        NavigationLoad => "navigation.load",
        ResourceScript => "resource.script",
        ResourceStylesheet => "resource.stylesheet",
        ResourceImage => "resource.image",
        ResourceFont => "resource.font",
        FunctionCall => "function.call",
        FunctionAsync => "function.async",
        FileRead => "file.read",
        FileWrite => "file.write",
        FileUpload => "file.upload",
        CacheGet => "cache.get",
        CacheSet => "cache.set",
        CacheMiss => "cache.miss",
        AuthLogin => "auth.login",
        AuthVerify => "auth.verify",
        AuthLogout => "auth.logout",
        ProcessData => "process.data",
        ProcessImage => "process.image",
        ProcessVideo => "process.video",
    }
}

impl SpanOperation {
    /// Operation family, e.g. `"http"` for `http.server`
    pub fn category(self) -> &'static str {
        let name = self.as_str();
        name.split_once('.').map_or(name, |(category, _)| category)
    }
}

named_enum! {
    /// Span completion status
    pub enum SpanStatus: "span status" {
        Ok => "ok",
        Cancelled => "cancelled",
        InternalError => "internal_error",
        InvalidArgument => "invalid_argument",
        DeadlineExceeded => "deadline_exceeded",
        NotFound => "not_found",
        AlreadyExists => "already_exists",
        PermissionDenied => "permission_denied",
        ResourceExhausted => "resource_exhausted",
        FailedPrecondition => "failed_precondition",
        Aborted => "aborted",
        OutOfRange => "out_of_range",
        Unimplemented => "unimplemented",
        Unknown => "unknown",
        Unauthenticated => "unauthenticated",
    }
}

impl SpanStatus {
    pub fn is_ok(self) -> bool {
        self == SpanStatus::Ok
    }
}

named_enum! {
    /// Broad shape of a project
    pub enum ProjectKind: "project kind" {
        Frontend => "frontend",
        Backend => "backend",
        Mobile => "mobile",
        Fullstack => "fullstack",
    }
}

/// Catalog entry for a project that emits spans
#[derive(Clone, Debug, Serialize)]
pub struct ProjectInfo {
    pub name: &'static str,
    pub id: &'static str,
    #[serde(rename = "type")]
    pub kind: ProjectKind,
    pub technology: &'static [&'static str],
}

impl ProjectInfo {
    pub fn to_ref(&self) -> ProjectRef {
        ProjectRef {
            name: self.name.to_string(),
            id: self.id.to_string(),
        }
    }
}

/// Project a span or trace belongs to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub name: String,
    pub id: String,
}

/// Attribute value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// Span represents a single operation in a trace
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Span {
    pub span_id: SpanId,
    pub trace_id: TraceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<SpanId>,
    pub description: String,
    pub op: SpanOperation,
    /// Milliseconds
    pub duration: u64,
    pub start_timestamp: Timestamp,
    pub end_timestamp: Timestamp,
    pub project: ProjectRef,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub data: BTreeMap<String, AttributeValue>,
    pub status: SpanStatus,
}

impl Span {
    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_none()
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Complete trace (collection of spans)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trace {
    pub trace_id: TraceId,
    pub spans: Vec<Span>,
    pub root_span_id: SpanId,
    /// Milliseconds between the earliest start and the latest end
    pub duration: u64,
    pub start_timestamp: Timestamp,
    pub end_timestamp: Timestamp,
    pub project: ProjectRef,
}

impl Trace {
    /// Build a trace from a flat list of spans.
    ///
    /// Returns `None` if no span is a root.
    pub fn from_spans(mut spans: Vec<Span>, project: ProjectRef) -> Option<Self> {
        // Find root span (one with no parent)
        let root_index = spans.iter().position(Span::is_root)?;
        let root = spans.remove(root_index);
        Some(Self::with_root(root, spans, project))
    }

    /// Build a trace around a known root span.
    ///
    /// Spans end up sorted by start time; ties keep the root first.
    pub fn with_root(root: Span, rest: Vec<Span>, project: ProjectRef) -> Self {
        let trace_id = root.trace_id;
        let root_span_id = root.span_id;
        let bounds = (root.start_timestamp, root.end_timestamp);

        let mut spans = Vec::with_capacity(rest.len() + 1);
        spans.push(root);
        spans.extend(rest);
        spans.sort_by_key(|s| s.start_timestamp);

        let (start_timestamp, end_timestamp) = spans.iter().fold(bounds, |(start, end), s| {
            (start.min(s.start_timestamp), end.max(s.end_timestamp))
        });

        Self {
            trace_id,
            spans,
            root_span_id,
            duration: end_timestamp.0.saturating_sub(start_timestamp.0),
            start_timestamp,
            end_timestamp,
            project,
        }
    }

    pub fn root(&self) -> Option<&Span> {
        self.spans.iter().find(|s| s.span_id == self.root_span_id)
    }

    pub fn span(&self, span_id: SpanId) -> Option<&Span> {
        self.spans.iter().find(|s| s.span_id == span_id)
    }

    pub fn has_errors(&self) -> bool {
        self.spans.iter().any(|s| !s.status.is_ok())
    }

    /// Deepest nesting level reached by walking `parent_span_id` chains.
    ///
    /// The root sits at depth 0. A parent id that does not resolve inside
    /// the trace ends the chain there.
    pub fn max_depth(&self) -> usize {
        let parents: HashMap<SpanId, Option<SpanId>> = self
            .spans
            .iter()
            .map(|s| (s.span_id, s.parent_span_id))
            .collect();

        self.spans
            .iter()
            .map(|span| {
                let mut depth = 0;
                let mut current = span.parent_span_id;
                while let Some(parent_id) = current {
                    let Some(next) = parents.get(&parent_id) else {
                        break;
                    };
                    depth += 1;
                    // a malformed cycle can't be deeper than the trace itself
                    if depth >= self.spans.len() {
                        break;
                    }
                    current = *next;
                }
                depth
            })
            .max()
            .unwrap_or(0)
    }
}

/// Summary of a trace (for listing)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceSummary {
    pub trace_id: TraceId,
    pub root_description: String,
    pub root_op: SpanOperation,
    pub project: ProjectRef,
    pub start_timestamp: Timestamp,
    pub duration: u64,
    pub span_count: usize,
    pub has_errors: bool,
}

/// Filter for querying traces
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TraceFilter {
    /// Project name
    pub project: Option<String>,
    pub min_duration: Option<u64>,
    pub max_duration: Option<u64>,
    pub has_errors: Option<bool>,
    pub limit: Option<usize>,
}
