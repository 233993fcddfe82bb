//! Filters and group-bys over generated spans, traces and envelopes.
//!
//! Nothing here mutates its input: every helper returns a fresh collection
//! of borrows, possibly empty.

use serde::Serialize;
use std::collections::BTreeMap;
use synthtel_protocol::*;
use time::{Date, UtcOffset};

use crate::envelope_generator::classify_exception_type;

/// Listing limit when a [`TraceFilter`] doesn't set one
pub const DEFAULT_TRACE_LIMIT: usize = 100;

const FRONTEND_PROJECTS: [&str; 2] = ["Sentry Dashboard", "Mobile App"];
const BACKEND_PROJECTS: [&str; 3] = ["API Gateway", "User Service", "Analytics Engine"];

/// Coarse span speed class
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    /// Under 20ms
    Fast,
    /// 20ms up to 100ms
    Medium,
    /// 100ms up to 500ms
    Slow,
    /// 500ms and above
    VerySlow,
}

impl DurationBucket {
    pub fn of(duration: u64) -> Self {
        match duration {
            0..=19 => Self::Fast,
            20..=99 => Self::Medium,
            100..=499 => Self::Slow,
            _ => Self::VerySlow,
        }
    }
}

pub fn spans_by_project<'a>(spans: &'a [Span], project_name: &str) -> Vec<&'a Span> {
    spans
        .iter()
        .filter(|s| s.project.name == project_name)
        .collect()
}

pub fn spans_by_operation(spans: &[Span], op: SpanOperation) -> Vec<&Span> {
    spans.iter().filter(|s| s.op == op).collect()
}

/// Spans whose description contains `needle`
pub fn spans_by_description<'a>(spans: &'a [Span], needle: &str) -> Vec<&'a Span> {
    spans
        .iter()
        .filter(|s| s.description.contains(needle))
        .collect()
}

/// Spans with `min <= duration <= max`
pub fn spans_in_duration_range(spans: &[Span], min: u64, max: u64) -> Vec<&Span> {
    spans
        .iter()
        .filter(|s| (min..=max).contains(&s.duration))
        .collect()
}

/// Spans lying entirely inside `[start, end]`
pub fn spans_in_time_range(spans: &[Span], start: Timestamp, end: Timestamp) -> Vec<&Span> {
    spans
        .iter()
        .filter(|s| s.start_timestamp >= start && s.end_timestamp <= end)
        .collect()
}

/// Spans tagged with the given environment
pub fn spans_by_environment(spans: &[Span], environment: Environment) -> Vec<&Span> {
    spans
        .iter()
        .filter(|s| s.tag("environment") == Some(environment.as_str()))
        .collect()
}

pub fn successful_spans(spans: &[Span]) -> Vec<&Span> {
    spans.iter().filter(|s| s.status.is_ok()).collect()
}

pub fn failed_spans(spans: &[Span]) -> Vec<&Span> {
    spans.iter().filter(|s| !s.status.is_ok()).collect()
}

pub fn spans_in_bucket(spans: &[Span], bucket: DurationBucket) -> Vec<&Span> {
    spans
        .iter()
        .filter(|s| DurationBucket::of(s.duration) == bucket)
        .collect()
}

/// Spans from client-side projects, or of UI and resource-loading operations
pub fn frontend_spans(spans: &[Span]) -> Vec<&Span> {
    spans
        .iter()
        .filter(|s| {
            FRONTEND_PROJECTS.contains(&s.project.name.as_str())
                || matches!(s.op.category(), "ui" | "resource")
        })
        .collect()
}

/// Spans from server-side projects, or of database and `http.server`
/// operations
pub fn backend_spans(spans: &[Span]) -> Vec<&Span> {
    spans
        .iter()
        .filter(|s| {
            BACKEND_PROJECTS.contains(&s.project.name.as_str())
                || s.op.category() == "db"
                || s.op == SpanOperation::HttpServer
        })
        .collect()
}

/// The `limit` most recently started spans, newest first
pub fn recent_spans(spans: &[Span], limit: usize) -> Vec<&Span> {
    let mut recent: Vec<&Span> = spans.iter().collect();
    recent.sort_by(|a, b| b.start_timestamp.cmp(&a.start_timestamp));
    recent.truncate(limit);
    recent
}

/// List traces matching `filter`, newest first
pub fn list_traces(traces: &[Trace], filter: &TraceFilter) -> Vec<TraceSummary> {
    let mut summaries: Vec<TraceSummary> = traces
        .iter()
        .filter_map(|trace| {
            // Apply filters
            if let Some(project) = &filter.project {
                if &trace.project.name != project {
                    return None;
                }
            }

            if filter.min_duration.is_some_and(|min| trace.duration < min) {
                return None;
            }

            if filter.max_duration.is_some_and(|max| trace.duration > max) {
                return None;
            }

            let has_errors = trace.has_errors();
            if filter.has_errors.is_some_and(|want| want != has_errors) {
                return None;
            }

            let root = trace.root()?;

            Some(TraceSummary {
                trace_id: trace.trace_id,
                root_description: root.description.clone(),
                root_op: root.op,
                project: trace.project.clone(),
                start_timestamp: trace.start_timestamp,
                duration: trace.duration,
                span_count: trace.spans.len(),
                has_errors,
            })
        })
        .collect();

    // Sort by start time (newest first)
    summaries.sort_by(|a, b| b.start_timestamp.cmp(&a.start_timestamp));
    summaries.truncate(filter.limit.unwrap_or(DEFAULT_TRACE_LIMIT));

    summaries
}

pub fn envelopes_by_environment(envelopes: &[Envelope], environment: Environment) -> Vec<&Envelope> {
    envelopes
        .iter()
        .filter(|e| e.environment == environment)
        .collect()
}

pub fn envelopes_by_level(envelopes: &[Envelope], level: Level) -> Vec<&Envelope> {
    envelopes.iter().filter(|e| e.level == level).collect()
}

pub fn envelopes_by_platform<'a>(envelopes: &'a [Envelope], platform: &str) -> Vec<&'a Envelope> {
    envelopes
        .iter()
        .filter(|e| e.platform == platform)
        .collect()
}

/// Envelopes with `start <= timestamp <= end`, in seconds since the epoch
pub fn envelopes_in_time_range(envelopes: &[Envelope], start: i64, end: i64) -> Vec<&Envelope> {
    envelopes
        .iter()
        .filter(|e| (start..=end).contains(&e.timestamp))
        .collect()
}

/// Envelopes per level; every level is present
pub fn group_by_level(envelopes: &[Envelope]) -> BTreeMap<Level, Vec<&Envelope>> {
    Level::ALL
        .iter()
        .map(|&level| (level, envelopes_by_level(envelopes, level)))
        .collect()
}

/// Envelopes per environment; every environment is present
pub fn group_by_environment(envelopes: &[Envelope]) -> BTreeMap<Environment, Vec<&Envelope>> {
    Environment::ALL
        .iter()
        .map(|&environment| (environment, envelopes_by_environment(envelopes, environment)))
        .collect()
}

/// Envelopes per category, classified from the exception type name.
///
/// Every category is present. Classification is heuristic, see
/// [`classify_exception_type`].
pub fn group_by_type(envelopes: &[Envelope]) -> BTreeMap<ErrorType, Vec<&Envelope>> {
    let mut groups: BTreeMap<ErrorType, Vec<&Envelope>> =
        ErrorType::ALL.iter().map(|&t| (t, Vec::new())).collect();

    for envelope in envelopes {
        let error_type = envelope
            .exception_type()
            .map_or(ErrorType::Javascript, classify_exception_type);
        groups.entry(error_type).or_default().push(envelope);
    }

    groups
}

/// Envelopes that occurred on one UTC calendar day
#[derive(Clone, Debug)]
pub struct DailyErrors<'a> {
    pub date: Date,
    pub envelopes: Vec<&'a Envelope>,
}

/// One entry per UTC day for the last `days` days, oldest first.
///
/// The last entry is the day containing `now`.
pub fn daily_time_series(envelopes: &[Envelope], now: Timestamp, days: u32) -> Vec<DailyErrors<'_>> {
    (0..u64::from(days))
        .rev()
        .map(|ago| {
            let date = now
                .saturating_sub(ago * Timestamp::MILLIS_PER_DAY)
                .to_datetime(UtcOffset::UTC)
                .date();
            let start = date.midnight().assume_utc().unix_timestamp();
            let end = start + 24 * 60 * 60;

            DailyErrors {
                date,
                envelopes: envelopes
                    .iter()
                    .filter(|e| e.timestamp >= start && e.timestamp < end)
                    .collect(),
            }
        })
        .collect()
}
