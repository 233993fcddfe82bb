use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use synthtel::grouping::*;
use synthtel::*;
use time::{Date, Month};

// 2024-06-01T00:00:00Z
const MIDNIGHT: u64 = 1_717_200_000_000;
const DAY_SECS: i64 = 24 * 60 * 60;

fn span(op: SpanOperation, project: &str, start: u64, duration: u64) -> Span {
    Span {
        span_id: SpanId::new(),
        trace_id: TraceId::new(),
        parent_span_id: None,
        description: format!("{op} work"),
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

fn tagged(mut span: Span, environment: Environment) -> Span {
    span.tags
        .insert("environment".to_string(), environment.to_string());
    span
}

fn envelopes(count: usize) -> Vec<Envelope> {
    EnvelopeGenerator::with_rng(StdRng::seed_from_u64(99), Timestamp(MIDNIGHT)).envelopes(count)
}

#[test]
fn span_filters_select_by_field() {
    let mut failing = span(SpanOperation::DbQuery, "User Service", MIDNIGHT + 100, 250);
    failing.status = SpanStatus::DeadlineExceeded;

    let spans = vec![
        tagged(span(SpanOperation::UiRender, "Sentry Dashboard", MIDNIGHT, 15), Environment::Production),
        tagged(span(SpanOperation::HttpServer, "API Gateway", MIDNIGHT + 50, 120), Environment::Staging),
        failing,
        span(SpanOperation::ProcessVideo, "Analytics Engine", MIDNIGHT + 200, 3_000),
    ];

    assert_eq!(spans_by_project(&spans, "API Gateway").len(), 1);
    assert_eq!(spans_by_operation(&spans, SpanOperation::DbQuery).len(), 1);
    assert_eq!(spans_by_description(&spans, "ui.render").len(), 1);
    assert!(spans_by_description(&spans, "nothing like this").is_empty());

    let ranged = spans_in_duration_range(&spans, 120, 250);
    assert_eq!(ranged.len(), 2, "bounds are inclusive");

    let windowed = spans_in_time_range(&spans, Timestamp(MIDNIGHT), Timestamp(MIDNIGHT + 350));
    assert_eq!(windowed.len(), 3);

    assert_eq!(spans_by_environment(&spans, Environment::Staging).len(), 1);
    assert!(spans_by_environment(&spans, Environment::Development).is_empty());

    assert_eq!(successful_spans(&spans).len(), 3);
    let failed = failed_spans(&spans);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].op, SpanOperation::DbQuery);

    assert_eq!(spans_in_bucket(&spans, DurationBucket::Fast).len(), 1);
    assert_eq!(spans_in_bucket(&spans, DurationBucket::Slow).len(), 2);
    assert_eq!(spans_in_bucket(&spans, DurationBucket::VerySlow).len(), 1);
    assert!(spans_in_bucket(&spans, DurationBucket::Medium).is_empty());
}

#[test]
fn duration_buckets_have_sharp_edges() {
    assert_eq!(DurationBucket::of(0), DurationBucket::Fast);
    assert_eq!(DurationBucket::of(19), DurationBucket::Fast);
    assert_eq!(DurationBucket::of(20), DurationBucket::Medium);
    assert_eq!(DurationBucket::of(100), DurationBucket::Slow);
    assert_eq!(DurationBucket::of(499), DurationBucket::Slow);
    assert_eq!(DurationBucket::of(500), DurationBucket::VerySlow);
}

#[test]
fn frontend_and_backend_overlap_on_mixed_spans() {
    let spans = vec![
        span(SpanOperation::UiMount, "Sentry Dashboard", MIDNIGHT, 30),
        span(SpanOperation::ResourceScript, "API Gateway", MIDNIGHT, 30),
        span(SpanOperation::DbQuery, "Mobile App", MIDNIGHT, 30),
        span(SpanOperation::CacheGet, "Payment Service", MIDNIGHT, 3),
    ];

    let frontend: Vec<SpanOperation> = frontend_spans(&spans).iter().map(|s| s.op).collect();
    assert_eq!(
        frontend,
        vec![
            SpanOperation::UiMount,
            SpanOperation::ResourceScript,
            SpanOperation::DbQuery
        ]
    );

    let backend: Vec<SpanOperation> = backend_spans(&spans).iter().map(|s| s.op).collect();
    assert_eq!(backend, vec![SpanOperation::ResourceScript, SpanOperation::DbQuery]);
}

#[test]
fn recent_spans_are_newest_first() {
    let spans: Vec<Span> = (0..10)
        .map(|i| span(SpanOperation::CacheGet, "User Service", MIDNIGHT + i * 1_000, 2))
        .collect();

    let recent = recent_spans(&spans, 3);
    let starts: Vec<u64> = recent.iter().map(|s| s.start_timestamp.0 - MIDNIGHT).collect();
    assert_eq!(starts, vec![9_000, 8_000, 7_000]);

    assert_eq!(recent_spans(&spans, 50).len(), 10);
}

#[test]
fn list_traces_filters_sorts_and_limits() {
    let mut generator = SpanGenerator::with_rng(StdRng::seed_from_u64(12), Timestamp(MIDNIGHT));
    let traces = generator.traces(150);

    let all = list_traces(&traces, &TraceFilter::default());
    assert_eq!(all.len(), DEFAULT_TRACE_LIMIT);
    assert!(all.windows(2).all(|w| w[0].start_timestamp >= w[1].start_timestamp));

    let project = traces[0].project.name.clone();
    let filter = TraceFilter {
        project: Some(project.clone()),
        limit: Some(500),
        ..Default::default()
    };
    let by_project = list_traces(&traces, &filter);
    let expected = traces.iter().filter(|t| t.project.name == project).count();
    assert_eq!(by_project.len(), expected);
    assert!(by_project.iter().all(|s| s.project.name == project));

    let filter = TraceFilter {
        min_duration: Some(200),
        max_duration: Some(800),
        has_errors: Some(false),
        limit: Some(500),
        ..Default::default()
    };
    for summary in list_traces(&traces, &filter) {
        assert!((200..=800).contains(&summary.duration));
        assert!(!summary.has_errors);
    }

    let limited = list_traces(
        &traces,
        &TraceFilter {
            limit: Some(7),
            ..Default::default()
        },
    );
    assert_eq!(limited.len(), 7);

    let first = &all[0];
    let trace = traces.iter().find(|t| t.trace_id == first.trace_id).unwrap();
    let root = trace.root().unwrap();
    assert_eq!(first.root_op, root.op);
    assert_eq!(first.root_description, root.description);
    assert_eq!(first.span_count, trace.spans.len());
}

#[test]
fn envelope_filters_select_by_field() {
    let envelopes = envelopes(120);

    for environment in Environment::ALL {
        let selected = envelopes_by_environment(&envelopes, *environment);
        assert!(selected.iter().all(|e| e.environment == *environment));
    }

    let fatal = envelopes_by_level(&envelopes, Level::Fatal);
    assert!(fatal.iter().all(|e| e.platform == "node"));

    let node = envelopes_by_platform(&envelopes, "node");
    let javascript = envelopes_by_platform(&envelopes, "javascript");
    assert_eq!(node.len() + javascript.len(), envelopes.len());

    let newest = envelopes[0].timestamp;
    let same_second = envelopes_in_time_range(&envelopes, newest, newest);
    assert!(!same_second.is_empty());
    assert!(same_second.iter().all(|e| e.timestamp == newest));
}

#[test]
fn groupings_cover_every_key() {
    let envelopes = envelopes(80);

    let by_level = group_by_level(&envelopes);
    assert_eq!(by_level.len(), Level::ALL.len());
    assert!(by_level[&Level::Debug].is_empty());
    assert_eq!(by_level.values().map(Vec::len).sum::<usize>(), 80);

    let by_environment = group_by_environment(&envelopes);
    assert_eq!(by_environment.len(), 3);
    assert_eq!(by_environment.values().map(Vec::len).sum::<usize>(), 80);

    let by_type = group_by_type(&envelopes);
    assert_eq!(by_type.len(), 9);
    assert_eq!(by_type.values().map(Vec::len).sum::<usize>(), 80);
    for (error_type, group) in &by_type {
        for envelope in group {
            let name = envelope.exception_type().unwrap();
            assert_eq!(classify_exception_type(name), *error_type);
        }
    }

    assert!(group_by_type(&[]).values().all(Vec::is_empty));
}

#[test]
fn daily_series_buckets_by_utc_day() {
    let template = envelopes(1).remove(0);
    let midnight_secs = (MIDNIGHT / 1000) as i64;
    let at = |secs: i64| {
        let mut envelope = template.clone();
        envelope.timestamp = secs;
        envelope
    };

    let envelopes = vec![
        at(midnight_secs),
        at(midnight_secs + 3_600),
        at(midnight_secs - 1),
        at(midnight_secs - 2 * DAY_SECS),
        at(midnight_secs - 30 * DAY_SECS),
    ];

    // noon on 2024-06-01
    let now = Timestamp(MIDNIGHT + 12 * Timestamp::MILLIS_PER_HOUR);
    let series = daily_time_series(&envelopes, now, 7);

    assert_eq!(series.len(), 7);
    assert_eq!(
        series.last().unwrap().date,
        Date::from_calendar_date(2024, Month::June, 1).unwrap()
    );
    assert_eq!(
        series[0].date,
        Date::from_calendar_date(2024, Month::May, 26).unwrap()
    );

    let counts: Vec<usize> = series.iter().map(|d| d.envelopes.len()).collect();
    assert_eq!(counts, vec![0, 0, 0, 0, 1, 1, 2]);

    assert!(daily_time_series(&envelopes, now, 0).is_empty());
}
