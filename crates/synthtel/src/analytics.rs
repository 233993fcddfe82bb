//! Statistics and heuristic insights over generated spans and traces.
//!
//! [`analyze`] is a pure function of its input: the same spans and traces
//! always produce the same [`SpanAnalytics`].

use serde::Serialize;
use std::collections::BTreeMap;
use synthtel_protocol::*;
use time::UtcOffset;

use crate::grouping::DurationBucket;
use crate::stats::{mean, mode, percentile, round2, standard_deviation};

/// Default trailing window for [`analyze_recent`]
pub const RECENT_WINDOW_MS: u64 = 5 * 60 * 1000;

/// Spans further than this many standard deviations from the mean are
/// duration outliers
const OUTLIER_SIGMAS: f64 = 3.0;

/// Operations seen fewer times than this are low-frequency anomalies
const LOW_FREQUENCY: usize = 3;

const BOTTLENECK_COUNT: usize = 5;
const PEAK_HOUR_COUNT: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("no spans to analyze")]
    NoSpans,
}

#[derive(Clone, Copy, Debug)]
pub struct AnalyticsConfig {
    /// Offset used to place span starts into hour-of-day buckets
    pub utc_offset: UtcOffset,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            utc_offset: UtcOffset::UTC,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SpanAnalytics {
    pub duration_stats: DurationStats,
    pub operation_stats: OperationStats,
    pub project_stats: ProjectStats,
    pub temporal_stats: TemporalStats,
    /// `None` when no traces were supplied
    pub trace_stats: Option<TraceStats>,
    pub insights: Insights,
}

#[derive(Clone, Debug, Serialize)]
pub struct DurationStats {
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub standard_deviation: f64,
    pub percentiles: Percentiles,
    pub distribution: DurationDistribution,
}

#[derive(Clone, Debug, Serialize)]
pub struct Percentiles {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Span counts per duration bucket
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DurationDistribution {
    /// Under 20ms
    pub fast: usize,
    /// 20ms up to 100ms
    pub medium: usize,
    /// 100ms up to 500ms
    pub slow: usize,
    /// 500ms and above
    pub very_slow: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct OperationStats {
    pub frequency: BTreeMap<SpanOperation, usize>,
    pub avg_duration: BTreeMap<SpanOperation, f64>,
    pub total_duration: BTreeMap<SpanOperation, u64>,
    /// Sorted by `impact`, largest first
    pub performance_rank: Vec<OperationImpact>,
}

#[derive(Clone, Debug, Serialize)]
pub struct OperationImpact {
    pub operation: SpanOperation,
    pub avg_duration: f64,
    pub frequency: usize,
    /// `frequency * avg_duration`
    pub impact: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProjectStats {
    /// Keyed by project name
    pub distribution: BTreeMap<String, usize>,
    pub avg_duration: BTreeMap<String, f64>,
    pub operation_mix: BTreeMap<String, BTreeMap<SpanOperation, usize>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TemporalStats {
    pub time_range: TimeRange,
    /// Span starts per hour of day
    pub hourly_distribution: [usize; 24],
    /// Busiest hours, busiest first; ties keep the earlier hour first
    pub peak_hours: Vec<u8>,
}

/// Range of span start timestamps
#[derive(Clone, Copy, Debug, Serialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
    pub duration: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct TraceStats {
    pub avg_spans_per_trace: f64,
    pub max_spans_per_trace: usize,
    pub avg_trace_depth: f64,
    pub avg_trace_duration: f64,
    /// `avg_spans_per_trace * avg_trace_depth`
    pub hierarchy_complexity: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Insights {
    pub bottlenecks: Vec<Bottleneck>,
    pub patterns: Vec<Pattern>,
    pub anomalies: Vec<Anomaly>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, Serialize)]
pub struct Bottleneck {
    pub operation: SpanOperation,
    pub reason: String,
    pub severity: Severity,
    pub recommendation: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct Pattern {
    pub name: &'static str,
    pub description: &'static str,
    pub operations: &'static [SpanOperation],
    /// Lowest frequency among `operations`
    pub frequency: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyKind {
    Duration,
    Frequency,
}

#[derive(Clone, Debug, Serialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub description: String,
    pub affected_spans: usize,
}

struct PatternDef {
    name: &'static str,
    description: &'static str,
    operations: &'static [SpanOperation],
}

const PATTERNS: [PatternDef; 3] = [
    PatternDef {
        name: "HTTP Request Chain",
        description: "Server requests followed by client requests",
        operations: &[SpanOperation::HttpServer, SpanOperation::HttpClient],
    },
    PatternDef {
        name: "UI Rendering Flow",
        description: "Mount -> Render -> Paint sequence",
        operations: &[
            SpanOperation::UiMount,
            SpanOperation::UiRender,
            SpanOperation::UiPaint,
        ],
    },
    PatternDef {
        name: "Database Transaction",
        description: "Connection -> Query -> Transaction",
        operations: &[
            SpanOperation::DbConnection,
            SpanOperation::DbQuery,
            SpanOperation::DbTransaction,
        ],
    },
];

/// Analyze with the default configuration
pub fn analyze(spans: &[Span], traces: &[Trace]) -> Result<SpanAnalytics, AnalyticsError> {
    analyze_with(&AnalyticsConfig::default(), spans, traces)
}

pub fn analyze_with(
    config: &AnalyticsConfig,
    spans: &[Span],
    traces: &[Trace],
) -> Result<SpanAnalytics, AnalyticsError> {
    if spans.is_empty() {
        return Err(AnalyticsError::NoSpans);
    }

    let durations: Vec<f64> = spans.iter().map(|s| s.duration as f64).collect();
    let mean = mean(&durations).ok_or(AnalyticsError::NoSpans)?;
    let stddev = standard_deviation(&durations, mean).ok_or(AnalyticsError::NoSpans)?;

    let duration_stats = duration_stats(spans, &durations, mean, stddev)?;
    let operation_stats = operation_stats(spans);
    let project_stats = project_stats(spans);
    let temporal_stats = temporal_stats(config, spans);
    let trace_stats = trace_stats(traces);
    // outliers are judged against unrounded figures
    let insights = insights(spans, &operation_stats, mean, stddev);

    tracing::debug!(
        spans = spans.len(),
        traces = traces.len(),
        "computed span analytics"
    );

    Ok(SpanAnalytics {
        duration_stats,
        operation_stats,
        project_stats,
        temporal_stats,
        trace_stats,
        insights,
    })
}

/// Analyze only the spans that started within `window` milliseconds
/// before `now`, with the default configuration and no trace statistics.
///
/// Returns `None` when nothing falls inside the window.
pub fn analyze_recent(spans: &[Span], now: Timestamp, window: u64) -> Option<SpanAnalytics> {
    analyze_recent_with(&AnalyticsConfig::default(), spans, &[], now, window)
}

/// Like [`analyze_recent`], but hour buckets follow `config` and the trace
/// statistics are computed over `traces` as given.
pub fn analyze_recent_with(
    config: &AnalyticsConfig,
    spans: &[Span],
    traces: &[Trace],
    now: Timestamp,
    window: u64,
) -> Option<SpanAnalytics> {
    let cutoff = now.saturating_sub(window);
    let recent: Vec<Span> = spans
        .iter()
        .filter(|s| s.start_timestamp > cutoff)
        .cloned()
        .collect();

    analyze_with(config, &recent, traces).ok()
}

fn duration_stats(
    spans: &[Span],
    durations: &[f64],
    mean: f64,
    standard_deviation: f64,
) -> Result<DurationStats, AnalyticsError> {
    let p = |q: f64| percentile(durations, q).map(round2).ok_or(AnalyticsError::NoSpans);

    let mut distribution = DurationDistribution::default();
    for span in spans {
        match DurationBucket::of(span.duration) {
            DurationBucket::Fast => distribution.fast += 1,
            DurationBucket::Medium => distribution.medium += 1,
            DurationBucket::Slow => distribution.slow += 1,
            DurationBucket::VerySlow => distribution.very_slow += 1,
        }
    }

    Ok(DurationStats {
        mean: round2(mean),
        median: p(50.0)?,
        mode: mode(durations).ok_or(AnalyticsError::NoSpans)?,
        standard_deviation: round2(standard_deviation),
        percentiles: Percentiles {
            p25: p(25.0)?,
            p50: p(50.0)?,
            p75: p(75.0)?,
            p90: p(90.0)?,
            p95: p(95.0)?,
            p99: p(99.0)?,
        },
        distribution,
    })
}

fn operation_stats(spans: &[Span]) -> OperationStats {
    let mut frequency: BTreeMap<SpanOperation, usize> = BTreeMap::new();
    let mut total_duration: BTreeMap<SpanOperation, u64> = BTreeMap::new();
    // ranking ties keep the order operations were first seen in
    let mut first_seen: Vec<SpanOperation> = Vec::new();

    for span in spans {
        let count = frequency.entry(span.op).or_insert(0);
        if *count == 0 {
            first_seen.push(span.op);
        }
        *count += 1;
        *total_duration.entry(span.op).or_insert(0) += span.duration;
    }

    let avg_duration: BTreeMap<SpanOperation, f64> = frequency
        .iter()
        .map(|(op, &count)| (*op, total_duration[op] as f64 / count as f64))
        .collect();

    let mut performance_rank: Vec<OperationImpact> = first_seen
        .into_iter()
        .map(|operation| {
            let frequency = frequency[&operation];
            let avg_duration = avg_duration[&operation];
            OperationImpact {
                operation,
                avg_duration,
                frequency,
                impact: frequency as f64 * avg_duration,
            }
        })
        .collect();
    performance_rank.sort_by(|a, b| b.impact.total_cmp(&a.impact));

    OperationStats {
        frequency,
        avg_duration,
        total_duration,
        performance_rank,
    }
}

fn project_stats(spans: &[Span]) -> ProjectStats {
    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    let mut operation_mix: BTreeMap<String, BTreeMap<SpanOperation, usize>> = BTreeMap::new();

    for span in spans {
        let name = &span.project.name;
        *distribution.entry(name.clone()).or_insert(0) += 1;
        *totals.entry(name.clone()).or_insert(0) += span.duration;
        *operation_mix
            .entry(name.clone())
            .or_default()
            .entry(span.op)
            .or_insert(0) += 1;
    }

    let avg_duration = totals
        .iter()
        .map(|(name, &total)| (name.clone(), total as f64 / distribution[name] as f64))
        .collect();

    ProjectStats {
        distribution,
        avg_duration,
        operation_mix,
    }
}

fn temporal_stats(config: &AnalyticsConfig, spans: &[Span]) -> TemporalStats {
    let start = spans
        .iter()
        .map(|s| s.start_timestamp)
        .min()
        .unwrap_or_default();
    let end = spans
        .iter()
        .map(|s| s.start_timestamp)
        .max()
        .unwrap_or_default();

    let mut hourly_distribution = [0usize; 24];
    for span in spans {
        let hour = span.start_timestamp.to_datetime(config.utc_offset).hour();
        hourly_distribution[hour as usize] += 1;
    }

    let mut hours: Vec<u8> = (0..24).collect();
    // stable: equal counts keep ascending hour order
    hours.sort_by(|a, b| hourly_distribution[*b as usize].cmp(&hourly_distribution[*a as usize]));
    hours.truncate(PEAK_HOUR_COUNT);

    TemporalStats {
        time_range: TimeRange {
            start,
            end,
            duration: end.0 - start.0,
        },
        hourly_distribution,
        peak_hours: hours,
    }
}

fn trace_stats(traces: &[Trace]) -> Option<TraceStats> {
    if traces.is_empty() {
        return None;
    }
    let n = traces.len() as f64;

    let span_counts: Vec<usize> = traces.iter().map(|t| t.spans.len()).collect();
    let avg_spans = span_counts.iter().sum::<usize>() as f64 / n;
    let max_spans = span_counts.iter().copied().max().unwrap_or(0);
    let avg_duration = traces.iter().map(|t| t.duration as f64).sum::<f64>() / n;
    let avg_depth = traces.iter().map(|t| t.max_depth() as f64).sum::<f64>() / n;

    Some(TraceStats {
        avg_spans_per_trace: round2(avg_spans),
        max_spans_per_trace: max_spans,
        avg_trace_depth: round2(avg_depth),
        avg_trace_duration: round2(avg_duration),
        hierarchy_complexity: round2(avg_spans * avg_depth),
    })
}

fn insights(
    spans: &[Span],
    operation_stats: &OperationStats,
    mean: f64,
    standard_deviation: f64,
) -> Insights {
    let bottlenecks = operation_stats
        .performance_rank
        .iter()
        .take(BOTTLENECK_COUNT)
        .map(|item| {
            let (severity, reason, recommendation) = if item.avg_duration > 500.0 {
                (
                    Severity::High,
                    format!(
                        "Very slow average duration ({}ms)",
                        item.avg_duration.round() as u64
                    ),
                    "Optimize operation or consider caching",
                )
            } else if item.impact > 10_000.0 {
                (
                    Severity::Medium,
                    format!(
                        "High total impact ({}ms across {} calls)",
                        item.impact.round() as u64,
                        item.frequency
                    ),
                    "Focus on frequency reduction or duration optimization",
                )
            } else {
                (
                    Severity::Low,
                    "Moderate performance impact".to_string(),
                    "Monitor for trends",
                )
            };

            Bottleneck {
                operation: item.operation,
                reason,
                severity,
                recommendation,
            }
        })
        .collect();

    let patterns = PATTERNS
        .iter()
        .map(|def| Pattern {
            name: def.name,
            description: def.description,
            operations: def.operations,
            frequency: def
                .operations
                .iter()
                .map(|op| operation_stats.frequency.get(op).copied().unwrap_or(0))
                .min()
                .unwrap_or(0),
        })
        .collect();

    let mut anomalies = Vec::new();

    let outliers = spans
        .iter()
        .filter(|s| (s.duration as f64 - mean).abs() > OUTLIER_SIGMAS * standard_deviation)
        .count();
    if outliers > 0 {
        anomalies.push(Anomaly {
            kind: AnomalyKind::Duration,
            description: format!("{outliers} spans with unusual duration patterns"),
            affected_spans: outliers,
        });
    }

    let low_frequency = operation_stats
        .frequency
        .values()
        .filter(|&&count| count < LOW_FREQUENCY)
        .count();
    if low_frequency > 0 {
        anomalies.push(Anomaly {
            kind: AnomalyKind::Frequency,
            description: format!("{low_frequency} operations with very low frequency"),
            affected_spans: low_frequency,
        });
    }

    Insights {
        bottlenecks,
        patterns,
        anomalies,
    }
}
