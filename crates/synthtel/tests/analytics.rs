use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use synthtel::analytics::{AnomalyKind, Severity};
use synthtel::stats::{mean, mode, percentile, round2, standard_deviation};
use synthtel::*;
use time::UtcOffset;

// 2024-06-01T00:00:00Z
const MIDNIGHT: u64 = 1_717_200_000_000;

fn span(op: SpanOperation, project: &str, start: u64, duration: u64) -> Span {
    Span {
        span_id: SpanId::new(),
        trace_id: TraceId::new(),
        parent_span_id: None,
        description: op.to_string(),
        op,
        duration,
        start_timestamp: Timestamp(start),
        end_timestamp: Timestamp(start + duration),
        project: ProjectRef {
            name: project.to_string(),
            id: project.to_lowercase().replace(' ', "-"),
        },
        tags: BTreeMap::new(),
        data: BTreeMap::new(),
        status: SpanStatus::Ok,
    }
}

#[test]
fn percentile_interpolates_linearly() {
    let values = [1.0, 2.0, 3.0, 4.0];
    assert_eq!(percentile(&values, 50.0), Some(2.5));
    assert_eq!(percentile(&values, 0.0), Some(1.0));
    assert_eq!(percentile(&values, 100.0), Some(4.0));
    assert_eq!(percentile(&[4.0, 1.0, 3.0, 2.0], 25.0), Some(1.75));
    assert_eq!(percentile(&[7.0], 90.0), Some(7.0));
    assert_eq!(percentile(&[], 50.0), None);
}

#[test]
fn standard_deviation_is_population() {
    let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    assert_eq!(mean(&values), Some(5.0));
    assert_eq!(standard_deviation(&values, 5.0), Some(2.0));
    assert_eq!(standard_deviation(&[], 0.0), None);
}

#[test]
fn mode_buckets_to_tens() {
    assert_eq!(mode(&[12.0, 14.0, 31.0, 29.0, 33.0]), Some(30.0));
    // 15 rounds up into the 20 bucket
    assert_eq!(mode(&[15.0, 21.0, 40.0]), Some(20.0));
    // tie: first bucket seen wins
    assert_eq!(mode(&[101.0, 52.0, 99.0, 48.0]), Some(100.0));
    assert_eq!(mode(&[]), None);
}

#[test]
fn round2_keeps_two_decimals() {
    assert_eq!(round2(3.14159), 3.14);
    assert_eq!(round2(-1.006), -1.01);
    assert_eq!(round2(12.0), 12.0);
}

#[test]
fn empty_input_is_an_error() {
    assert!(matches!(analyze(&[], &[]), Err(AnalyticsError::NoSpans)));
}

#[test]
fn identical_durations_have_no_spread() {
    let spans: Vec<Span> = (0..10)
        .map(|i| span(SpanOperation::DbQuery, "API Gateway", MIDNIGHT + i * 1_000, 42))
        .collect();

    let analytics = analyze(&spans, &[]).unwrap();
    let stats = &analytics.duration_stats;

    assert_eq!(stats.mean, 42.0);
    assert_eq!(stats.median, 42.0);
    assert_eq!(stats.mode, 40.0);
    assert_eq!(stats.standard_deviation, 0.0);
    for p in [
        stats.percentiles.p25,
        stats.percentiles.p50,
        stats.percentiles.p75,
        stats.percentiles.p90,
        stats.percentiles.p95,
        stats.percentiles.p99,
    ] {
        assert_eq!(p, 42.0);
    }
    assert!(analytics.trace_stats.is_none());
    assert!(analytics
        .insights
        .anomalies
        .iter()
        .all(|a| a.kind != AnomalyKind::Duration));
}

#[test]
fn durations_fall_into_buckets() {
    let spans: Vec<Span> = [1, 19, 20, 99, 100, 499, 500, 2_000]
        .into_iter()
        .map(|d| span(SpanOperation::FunctionCall, "API Gateway", MIDNIGHT, d))
        .collect();

    let distribution = analyze(&spans, &[]).unwrap().duration_stats.distribution;
    assert_eq!(distribution.fast, 2);
    assert_eq!(distribution.medium, 2);
    assert_eq!(distribution.slow, 2);
    assert_eq!(distribution.very_slow, 2);
}

#[test]
fn operations_are_ranked_by_impact() {
    let mut spans = Vec::new();
    // 10 x 100ms = 1000
    spans.extend((0..10).map(|_| span(SpanOperation::HttpServer, "API Gateway", MIDNIGHT, 100)));
    // 2 x 900ms = 1800
    spans.extend((0..2).map(|_| span(SpanOperation::ProcessVideo, "Analytics Engine", MIDNIGHT, 900)));
    // 30 x 5ms = 150
    spans.extend((0..30).map(|_| span(SpanOperation::CacheGet, "User Service", MIDNIGHT, 5)));

    let analytics = analyze(&spans, &[]).unwrap();
    let ops = &analytics.operation_stats;

    assert_eq!(ops.frequency[&SpanOperation::HttpServer], 10);
    assert_eq!(ops.avg_duration[&SpanOperation::ProcessVideo], 900.0);
    assert_eq!(ops.total_duration[&SpanOperation::CacheGet], 150);

    let ranked: Vec<SpanOperation> = ops.performance_rank.iter().map(|r| r.operation).collect();
    assert_eq!(
        ranked,
        vec![
            SpanOperation::ProcessVideo,
            SpanOperation::HttpServer,
            SpanOperation::CacheGet
        ]
    );
    assert_eq!(ops.performance_rank[0].impact, 1_800.0);

    let bottlenecks = &analytics.insights.bottlenecks;
    assert_eq!(bottlenecks.len(), 3);
    assert_eq!(bottlenecks[0].severity, Severity::High);
    assert_eq!(bottlenecks[0].reason, "Very slow average duration (900ms)");
    assert_eq!(bottlenecks[1].severity, Severity::Low);
    assert_eq!(bottlenecks[1].recommendation, "Monitor for trends");

    // process.video was seen only twice
    let frequency: Vec<_> = analytics
        .insights
        .anomalies
        .iter()
        .filter(|a| a.kind == AnomalyKind::Frequency)
        .collect();
    assert_eq!(frequency.len(), 1);
    assert_eq!(frequency[0].affected_spans, 1);
    assert_eq!(frequency[0].description, "1 operations with very low frequency");
}

#[test]
fn high_impact_bottleneck_is_medium() {
    let spans: Vec<Span> = (0..120)
        .map(|_| span(SpanOperation::HttpClient, "API Gateway", MIDNIGHT, 250))
        .collect();

    let bottleneck = &analyze(&spans, &[]).unwrap().insights.bottlenecks[0];
    assert_eq!(bottleneck.severity, Severity::Medium);
    assert_eq!(
        bottleneck.reason,
        "High total impact (30000ms across 120 calls)"
    );
}

#[test]
fn patterns_report_the_weakest_link() {
    let mut spans = Vec::new();
    spans.extend((0..4).map(|_| span(SpanOperation::DbConnection, "API Gateway", MIDNIGHT, 50)));
    spans.extend((0..9).map(|_| span(SpanOperation::DbQuery, "API Gateway", MIDNIGHT, 80)));
    spans.extend((0..3).map(|_| span(SpanOperation::DbTransaction, "API Gateway", MIDNIGHT, 200)));
    spans.extend((0..5).map(|_| span(SpanOperation::HttpServer, "API Gateway", MIDNIGHT, 150)));

    let patterns = analyze(&spans, &[]).unwrap().insights.patterns;
    let frequency = |name: &str| patterns.iter().find(|p| p.name == name).unwrap().frequency;

    assert_eq!(frequency("Database Transaction"), 3);
    assert_eq!(frequency("HTTP Request Chain"), 0);
    assert_eq!(frequency("UI Rendering Flow"), 0);
}

#[test]
fn outliers_are_flagged() {
    let mut spans: Vec<Span> = (0..50)
        .map(|_| span(SpanOperation::UiPaint, "Sentry Dashboard", MIDNIGHT, 16))
        .collect();
    spans.push(span(SpanOperation::UiPaint, "Sentry Dashboard", MIDNIGHT, 5_000));

    let anomalies = analyze(&spans, &[]).unwrap().insights.anomalies;
    let duration = anomalies
        .iter()
        .find(|a| a.kind == AnomalyKind::Duration)
        .unwrap();
    assert_eq!(duration.affected_spans, 1);
    assert_eq!(duration.description, "1 spans with unusual duration patterns");
}

#[test]
fn projects_are_tallied() {
    let spans = vec![
        span(SpanOperation::UiMount, "Sentry Dashboard", MIDNIGHT, 40),
        span(SpanOperation::UiPaint, "Sentry Dashboard", MIDNIGHT, 20),
        span(SpanOperation::UiPaint, "Sentry Dashboard", MIDNIGHT, 12),
        span(SpanOperation::DbQuery, "User Service", MIDNIGHT, 90),
    ];

    let projects = analyze(&spans, &[]).unwrap().project_stats;
    assert_eq!(projects.distribution["Sentry Dashboard"], 3);
    assert_eq!(projects.avg_duration["Sentry Dashboard"], 24.0);
    assert_eq!(projects.operation_mix["Sentry Dashboard"][&SpanOperation::UiPaint], 2);
    assert_eq!(projects.operation_mix["User Service"].len(), 1);
}

#[test]
fn hourly_histogram_respects_offset() {
    let hour = Timestamp::MILLIS_PER_HOUR;
    let spans = vec![
        span(SpanOperation::CacheGet, "API Gateway", MIDNIGHT + 3 * hour, 2),
        span(SpanOperation::CacheGet, "API Gateway", MIDNIGHT + 3 * hour + 10, 2),
        span(SpanOperation::CacheGet, "API Gateway", MIDNIGHT + 5 * hour, 2),
        span(SpanOperation::CacheGet, "API Gateway", MIDNIGHT + 23 * hour, 2),
    ];

    let utc = analyze(&spans, &[]).unwrap().temporal_stats;
    assert_eq!(utc.hourly_distribution[3], 2);
    assert_eq!(utc.hourly_distribution.iter().sum::<usize>(), 4);
    assert_eq!(utc.peak_hours, vec![3, 5, 23]);
    assert_eq!(utc.time_range.start, Timestamp(MIDNIGHT + 3 * hour));
    assert_eq!(utc.time_range.duration, 20 * hour);

    let config = AnalyticsConfig {
        utc_offset: UtcOffset::from_hms(2, 0, 0).unwrap(),
    };
    let shifted = analyze_with(&config, &spans, &[]).unwrap().temporal_stats;
    assert_eq!(shifted.hourly_distribution[5], 2);
    assert_eq!(shifted.hourly_distribution[1], 1);
}

#[test]
fn trace_shape_statistics() {
    let mut generator = SpanGenerator::with_rng(StdRng::seed_from_u64(3), Timestamp(MIDNIGHT));
    let traces = generator.traces(30);
    let spans: Vec<Span> = traces.iter().flat_map(|t| t.spans.clone()).collect();

    let stats = analyze(&spans, &traces).unwrap().trace_stats.unwrap();
    let avg_spans = spans.len() as f64 / 30.0;
    let avg_depth = traces.iter().map(|t| t.max_depth() as f64).sum::<f64>() / 30.0;

    assert_eq!(stats.avg_spans_per_trace, round2(avg_spans));
    assert_eq!(
        stats.max_spans_per_trace,
        traces.iter().map(|t| t.spans.len()).max().unwrap()
    );
    assert!(stats.avg_trace_depth >= 1.0);
    assert_eq!(stats.avg_trace_depth, round2(avg_depth));
    assert_eq!(stats.hierarchy_complexity, round2(avg_spans * avg_depth));
}

#[test]
fn recent_window_only_sees_recent_spans() {
    let now = Timestamp(MIDNIGHT);
    let spans = vec![
        span(SpanOperation::HttpServer, "API Gateway", MIDNIGHT - 60_000, 100),
        span(SpanOperation::HttpServer, "API Gateway", MIDNIGHT - 10 * 60_000, 300),
    ];

    let recent = analyze_recent(&spans, now, analytics::RECENT_WINDOW_MS).unwrap();
    assert_eq!(recent.duration_stats.mean, 100.0);

    assert!(analyze_recent(&spans, now, 1_000).is_none());
}

#[test]
fn recent_window_honours_offset_and_traces() {
    let now = Timestamp(MIDNIGHT);
    let spans = vec![
        span(SpanOperation::DbQuery, "User Service", MIDNIGHT - 60_000, 40),
        span(SpanOperation::DbQuery, "User Service", MIDNIGHT - 2 * 60_000, 60),
    ];
    let traces = SpanGenerator::with_rng(StdRng::seed_from_u64(3), now).traces(4);
    let config = AnalyticsConfig {
        utc_offset: UtcOffset::from_hms(2, 0, 0).unwrap(),
    };

    // 23:58 and 23:59 UTC are 01:58 and 01:59 at +02:00
    let recent =
        analyze_recent_with(&config, &spans, &traces, now, analytics::RECENT_WINDOW_MS).unwrap();
    assert_eq!(recent.temporal_stats.hourly_distribution[1], 2);
    assert_eq!(recent.temporal_stats.hourly_distribution[23], 0);
    let most_spans = traces.iter().map(|t| t.spans.len()).max().unwrap();
    assert_eq!(recent.trace_stats.as_ref().unwrap().max_spans_per_trace, most_spans);

    let utc = analyze_recent(&spans, now, analytics::RECENT_WINDOW_MS).unwrap();
    assert_eq!(utc.temporal_stats.hourly_distribution[23], 2);
    assert!(utc.trace_stats.is_none());
}

proptest! {
    #[test]
    fn percentile_stays_within_bounds(
        values in prop::collection::vec(0.0f64..10_000.0, 1..200),
        p in 0.0f64..=100.0,
    ) {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let value = percentile(&values, p).unwrap();
        prop_assert!(value >= min - 1e-9 && value <= max + 1e-9);
    }

    #[test]
    fn percentile_is_monotonic(
        values in prop::collection::vec(0.0f64..10_000.0, 1..200),
        a in 0.0f64..=100.0,
        b in 0.0f64..=100.0,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(percentile(&values, lo).unwrap() <= percentile(&values, hi).unwrap() + 1e-9);
    }

    #[test]
    fn standard_deviation_is_non_negative(values in prop::collection::vec(0.0f64..10_000.0, 1..200)) {
        let m = mean(&values).unwrap();
        prop_assert!(standard_deviation(&values, m).unwrap() >= 0.0);
    }

    #[test]
    fn mode_is_a_multiple_of_ten(values in prop::collection::vec(0u32..5_000, 1..200)) {
        let values: Vec<f64> = values.into_iter().map(f64::from).collect();
        let mode = mode(&values).unwrap();
        prop_assert_eq!(mode % 10.0, 0.0);
    }
}
