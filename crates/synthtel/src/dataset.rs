//! The sample dataset: traces, spans, envelopes and the statistics derived
//! from them, generated once and then only read.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use synthtel_protocol::*;

use crate::analytics::{analyze, SpanAnalytics};
use crate::envelope_generator::{error_type_distribution, EnvelopeGenerator, ExceptionDraw};
use crate::grouping::{envelopes_by_environment, envelopes_by_level};
use crate::span_generator::{projects, SpanGenerator};

pub const DEFAULT_TRACE_COUNT: usize = 50;
pub const DEFAULT_ENVELOPE_COUNT: usize = 100;

/// Envelope totals are spread over this many days for the per-day average
const DAYS_PER_WEEK: usize = 7;

/// Extra spans generated for the login flow
const LOGIN_AUTH_SPANS: [(SpanOperation, usize); 2] =
    [(SpanOperation::AuthLogin, 8), (SpanOperation::AuthVerify, 6)];

/// Leading slices of the busiest operation sets
const FREQUENT_OPERATION_SLICES: [(SpanOperation, usize); 5] = [
    (SpanOperation::HttpServer, 15),
    (SpanOperation::UiPaint, 15),
    (SpanOperation::HttpClient, 10),
    (SpanOperation::DbQuery, 10),
    (SpanOperation::UiRender, 10),
];

pub const HIGH_FREQUENCY_COUNT: usize = 30;
pub const SMALL_SAMPLE_SIZE: usize = 10;
pub const LARGE_SAMPLE_SIZE: usize = 500;

/// Spans generated per operation for the operation-focused sets
pub const OPERATION_SAMPLE_COUNTS: [(SpanOperation, usize); 29] = [
    (SpanOperation::HttpServer, 25),
    (SpanOperation::HttpClient, 20),
    (SpanOperation::UiPaint, 30),
    (SpanOperation::UiMount, 15),
    (SpanOperation::DbQuery, 18),
    (SpanOperation::UiRender, 25),
    (SpanOperation::NavigationNavigate, 12),
    (SpanOperation::ResourceScript, 10),
    (SpanOperation::FunctionCall, 20),
    (SpanOperation::CacheGet, 15),
    (SpanOperation::DbTransaction, 8),
    (SpanOperation::ResourceImage, 10),
    (SpanOperation::AuthVerify, 12),
    (SpanOperation::UiInteraction, 18),
    (SpanOperation::NavigationLoad, 8),
    (SpanOperation::ResourceStylesheet, 6),
    (SpanOperation::CacheSet, 10),
    (SpanOperation::ProcessData, 5),
    (SpanOperation::DbConnection, 5),
    (SpanOperation::ResourceFont, 6),
    (SpanOperation::FunctionAsync, 4),
    (SpanOperation::FileRead, 8),
    (SpanOperation::CacheMiss, 12),
    (SpanOperation::AuthLogin, 6),
    (SpanOperation::AuthLogout, 4),
    (SpanOperation::FileWrite, 5),
    (SpanOperation::FileUpload, 3),
    (SpanOperation::ProcessImage, 4),
    (SpanOperation::ProcessVideo, 2),
];

/// Envelopes generated per category for the category-focused sets
pub const ERROR_TYPE_SAMPLE_COUNTS: [(ErrorType, usize); 9] = [
    (ErrorType::Javascript, 15),
    (ErrorType::Network, 12),
    (ErrorType::Database, 10),
    (ErrorType::Authentication, 8),
    (ErrorType::Validation, 10),
    (ErrorType::Permission, 6),
    (ErrorType::Timeout, 8),
    (ErrorType::Memory, 5),
    (ErrorType::Syntax, 7),
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got `{value}`")]
    InvalidNumber { var: &'static str, value: String },

    #[error("SYNTHTEL_EXCEPTION_DRAW: {0}")]
    InvalidExceptionDraw(#[from] ParseError),
}

/// Knobs for [`SampleData::generate`]
#[derive(Clone, Debug)]
pub struct SampleConfig {
    pub trace_count: usize,
    pub envelope_count: usize,
    /// `None` draws from OS entropy
    pub seed: Option<u64>,
    pub exception_draw: ExceptionDraw,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            trace_count: DEFAULT_TRACE_COUNT,
            envelope_count: DEFAULT_ENVELOPE_COUNT,
            seed: None,
            exception_draw: ExceptionDraw::default(),
        }
    }
}

impl SampleConfig {
    /// Read `SYNTHTEL_SEED`, `SYNTHTEL_TRACE_COUNT`,
    /// `SYNTHTEL_ENVELOPE_COUNT` and `SYNTHTEL_EXCEPTION_DRAW`, falling back
    /// to the defaults for unset variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`SampleConfig::from_env`] with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let number = |var: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(var)
                .map(|value| {
                    value
                        .trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidNumber { var, value })
                })
                .transpose()
        };

        let defaults = Self::default();
        Ok(Self {
            trace_count: number("SYNTHTEL_TRACE_COUNT")?
                .map_or(defaults.trace_count, |n| n as usize),
            envelope_count: number("SYNTHTEL_ENVELOPE_COUNT")?
                .map_or(defaults.envelope_count, |n| n as usize),
            seed: number("SYNTHTEL_SEED")?,
            exception_draw: match lookup("SYNTHTEL_EXCEPTION_DRAW") {
                Some(value) => value.trim().parse()?,
                None => defaults.exception_draw,
            },
        })
    }
}

/// Headline numbers over the sample spans
#[derive(Clone, Debug, Serialize)]
pub struct SpanStatistics {
    pub total: usize,
    pub traces: usize,
    pub operations: Vec<SpanOperation>,
    pub projects: Vec<&'static str>,
    /// Rounded to whole milliseconds
    pub average_duration: Option<u64>,
    pub max_duration: Option<u64>,
    pub min_duration: Option<u64>,
    /// Percentage of spans with status `ok`, rounded
    pub success_rate: Option<u64>,
    pub environments: Vec<Environment>,
    /// Earliest start and latest end
    pub time_range: Option<(Timestamp, Timestamp)>,
}

impl SpanStatistics {
    pub fn compute(spans: &[Span], trace_count: usize) -> Self {
        let n = spans.len();
        let total_duration: u64 = spans.iter().map(|s| s.duration).sum();
        let successes = spans.iter().filter(|s| s.status.is_ok()).count();

        let time_range = spans
            .iter()
            .map(|s| s.start_timestamp)
            .min()
            .zip(spans.iter().map(|s| s.end_timestamp).max());

        Self {
            total: n,
            traces: trace_count,
            operations: SpanOperation::ALL.to_vec(),
            projects: projects().iter().map(|p| p.name).collect(),
            average_duration: (n > 0).then(|| (total_duration as f64 / n as f64).round() as u64),
            max_duration: spans.iter().map(|s| s.duration).max(),
            min_duration: spans.iter().map(|s| s.duration).min(),
            success_rate: (n > 0).then(|| (successes as f64 / n as f64 * 100.0).round() as u64),
            environments: Environment::ALL.to_vec(),
            time_range,
        }
    }
}

/// Headline numbers over the sample envelopes
#[derive(Clone, Debug, Serialize)]
pub struct ErrorStatistics {
    pub total: usize,
    pub by_level: BTreeMap<Level, usize>,
    pub by_environment: BTreeMap<Environment, usize>,
    /// Sizes of the category-focused sets
    pub by_type: BTreeMap<ErrorType, usize>,
    /// Heuristic classification of the main envelope set
    pub distribution: BTreeMap<ErrorType, usize>,
    pub average_errors_per_day: usize,
    pub most_common_error_type: ErrorType,
    pub critical_errors_count: usize,
    pub production_errors_count: usize,
}

/// Everything generated for one run
#[derive(Debug)]
pub struct SampleData {
    pub now: Timestamp,
    pub traces: Vec<Trace>,
    /// Spans of `traces`, flattened
    pub spans: Vec<Span>,
    pub spans_by_operation: BTreeMap<SpanOperation, Vec<Span>>,
    pub envelopes: Vec<Envelope>,
    pub envelopes_by_type: BTreeMap<ErrorType, Vec<Envelope>>,
    /// `auth.login` and `auth.verify` spans generated for the login flow
    pub login_auth_spans: Vec<Span>,
    /// The newest envelopes, each tagged with a recurrence count of 10 to 59
    pub high_frequency_errors: Vec<Envelope>,
    /// A separate batch for load testing consumers
    pub large_sample: Vec<Envelope>,
    /// `None` when no traces were generated
    pub analytics: Option<SpanAnalytics>,
    pub span_statistics: SpanStatistics,
    pub error_statistics: ErrorStatistics,
}

impl SampleData {
    pub fn generate(config: &SampleConfig) -> Self {
        Self::generate_at(config, Timestamp::now())
    }

    /// Generate with every timestamp placed relative to `now`
    pub fn generate_at(config: &SampleConfig, now: Timestamp) -> Self {
        let mut span_gen = SpanGenerator::with_rng(rng_for(config.seed, 0), now);
        let mut envelope_gen = EnvelopeGenerator::with_rng(rng_for(config.seed, 1), now)
            .exception_draw(config.exception_draw);

        let traces = span_gen.traces(config.trace_count);
        let spans: Vec<Span> = traces.iter().flat_map(|t| t.spans.iter().cloned()).collect();

        let spans_by_operation = OPERATION_SAMPLE_COUNTS
            .iter()
            .map(|&(op, count)| (op, span_gen.spans_for_operation(op, count)))
            .collect();

        let envelopes = envelope_gen.envelopes(config.envelope_count);
        let envelopes_by_type: BTreeMap<ErrorType, Vec<Envelope>> = ERROR_TYPE_SAMPLE_COUNTS
            .iter()
            .map(|&(error_type, count)| (error_type, envelope_gen.envelopes_for_type(error_type, count)))
            .collect();

        let login_auth_spans: Vec<Span> = LOGIN_AUTH_SPANS
            .iter()
            .flat_map(|&(op, count)| span_gen.spans_for_operation(op, count))
            .collect();

        let high_frequency_errors: Vec<Envelope> = envelopes
            .iter()
            .take(HIGH_FREQUENCY_COUNT)
            .cloned()
            .map(|mut envelope| {
                envelope.meta.frequency = Some(envelope_gen.rng_mut().gen_range(10..60));
                envelope
            })
            .collect();
        let large_sample = envelope_gen.envelopes(LARGE_SAMPLE_SIZE);

        let analytics = match analyze(&spans, &traces) {
            Ok(analytics) => Some(analytics),
            Err(err) => {
                tracing::debug!(%err, "skipping span analytics");
                None
            }
        };

        let span_statistics = SpanStatistics::compute(&spans, traces.len());
        let error_statistics = error_statistics(&envelopes, &envelopes_by_type);

        tracing::info!(
            traces = traces.len(),
            spans = spans.len(),
            envelopes = envelopes.len(),
            seeded = config.seed.is_some(),
            "generated sample dataset"
        );

        Self {
            now,
            traces,
            spans,
            spans_by_operation,
            envelopes,
            envelopes_by_type,
            login_auth_spans,
            high_frequency_errors,
            large_sample,
            analytics,
            span_statistics,
            error_statistics,
        }
    }

    /// The operation-focused set for `op`
    pub fn spans_for(&self, op: SpanOperation) -> &[Span] {
        self.spans_by_operation
            .get(&op)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The category-focused set for `error_type`
    pub fn envelopes_for(&self, error_type: ErrorType) -> &[Envelope] {
        self.envelopes_by_type
            .get(&error_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Homepage requests, GET calls and the dashboard paint and app render
    pub fn homepage_spans(&self) -> Vec<&Span> {
        use SpanOperation::*;

        described(self.spans_for(HttpServer), |d| d == "GET /homepage")
            .chain(described(self.spans_for(HttpClient), |d| {
                d.contains("homepage") || d.contains("GET /")
            }))
            .chain(described(self.spans_for(UiPaint), |d| d == "Paint Dashboard"))
            .chain(described(self.spans_for(UiRender), |d| d == "Render App Component"))
            .collect()
    }

    pub fn login_spans(&self) -> Vec<&Span> {
        use SpanOperation::*;

        described(self.spans_for(HttpServer), |d| d == "POST /api/login")
            .chain(&self.login_auth_spans)
            .chain(described(self.spans_for(UiMount), |d| d == "Mount User Profile"))
            .collect()
    }

    pub fn dashboard_spans(&self) -> Vec<&Span> {
        use SpanOperation::*;

        described(self.spans_for(HttpServer), |d| d == "GET /dashboard")
            .chain(described(self.spans_for(UiPaint), |d| d == "Paint Dashboard"))
            .chain(described(self.spans_for(UiMount), |d| d == "Mount Dashboard Component"))
            .chain(described(self.spans_for(DbQuery), |d| {
                d.contains("SELECT") && d.contains("projects")
            }))
            .collect()
    }

    /// Server API routes, GETs before POSTs, then client API calls
    pub fn api_spans(&self) -> Vec<&Span> {
        use SpanOperation::*;

        let server = self.spans_for(HttpServer);
        described(server, |d| d.starts_with("GET /api/"))
            .chain(described(server, |d| d.starts_with("POST /api/")))
            .chain(described(self.spans_for(HttpClient), |d| d.contains("/api/")))
            .collect()
    }

    pub fn frequent_operations(&self) -> Vec<&Span> {
        FREQUENT_OPERATION_SLICES
            .iter()
            .flat_map(|&(op, count)| self.spans_for(op).iter().take(count))
            .collect()
    }

    pub fn all_http_spans(&self) -> Vec<&Span> {
        self.concat(&[SpanOperation::HttpServer, SpanOperation::HttpClient])
    }

    pub fn all_ui_spans(&self) -> Vec<&Span> {
        self.concat(&[SpanOperation::UiPaint, SpanOperation::UiMount, SpanOperation::UiRender])
    }

    pub fn all_db_spans(&self) -> Vec<&Span> {
        self.concat(&[
            SpanOperation::DbQuery,
            SpanOperation::DbTransaction,
            SpanOperation::DbConnection,
        ])
    }

    pub fn all_cache_spans(&self) -> Vec<&Span> {
        self.concat(&[SpanOperation::CacheGet, SpanOperation::CacheSet, SpanOperation::CacheMiss])
    }

    fn concat(&self, ops: &[SpanOperation]) -> Vec<&Span> {
        ops.iter().flat_map(|&op| self.spans_for(op)).collect()
    }

    /// The first few envelopes of the main set
    pub fn small_sample(&self) -> &[Envelope] {
        &self.envelopes[..self.envelopes.len().min(SMALL_SAMPLE_SIZE)]
    }

    /// Fatal memory errors, erroring database calls and production
    /// authentication failures
    pub fn critical_errors(&self) -> Vec<&Envelope> {
        critical_errors(&self.envelopes_by_type)
    }

    pub fn production_errors(&self) -> Vec<&Envelope> {
        envelopes_by_environment(&self.envelopes, Environment::Production)
    }

    /// Up to `limit` envelopes from the 24 hours before `now`
    pub fn recent_errors(&self, limit: usize) -> Vec<&Envelope> {
        let cutoff = self.now.saturating_sub(Timestamp::MILLIS_PER_DAY).as_secs();
        self.envelopes
            .iter()
            .filter(|e| e.timestamp > cutoff)
            .take(limit)
            .collect()
    }
}

/// Process-wide sample dataset, generated on first use from
/// [`SampleConfig::from_env`]
pub fn sample_data() -> &'static SampleData {
    static SAMPLE: OnceLock<SampleData> = OnceLock::new();

    SAMPLE.get_or_init(|| {
        let config = SampleConfig::from_env().unwrap_or_else(|err| {
            tracing::warn!(%err, "ignoring sample configuration from environment");
            SampleConfig::default()
        });
        SampleData::generate(&config)
    })
}

fn rng_for(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        // separate streams keep span and envelope draws independent
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}

fn described<'a>(
    spans: &'a [Span],
    matches: impl Fn(&str) -> bool + 'a,
) -> impl Iterator<Item = &'a Span> + 'a {
    spans.iter().filter(move |s| matches(&s.description))
}

fn critical_errors(by_type: &BTreeMap<ErrorType, Vec<Envelope>>) -> Vec<&Envelope> {
    let of = |error_type: ErrorType| by_type.get(&error_type).into_iter().flatten();

    of(ErrorType::Memory)
        .filter(|e| e.level == Level::Fatal)
        .chain(of(ErrorType::Database).filter(|e| e.level == Level::Error))
        .chain(of(ErrorType::Authentication).filter(|e| e.environment == Environment::Production))
        .collect()
}

fn error_statistics(
    envelopes: &[Envelope],
    by_type: &BTreeMap<ErrorType, Vec<Envelope>>,
) -> ErrorStatistics {
    let distribution = error_type_distribution(envelopes);

    // ties go to the later category
    let most_common_error_type = distribution
        .iter()
        .fold(None, |best: Option<(ErrorType, usize)>, (&t, &count)| match best {
            Some((_, best_count)) if best_count > count => best,
            _ => Some((t, count)),
        })
        .map_or(ErrorType::Javascript, |(t, _)| t);

    ErrorStatistics {
        total: envelopes.len(),
        by_level: Level::ALL
            .iter()
            .map(|&level| (level, envelopes_by_level(envelopes, level).len()))
            .collect(),
        by_environment: Environment::ALL
            .iter()
            .map(|&env| (env, envelopes_by_environment(envelopes, env).len()))
            .collect(),
        by_type: by_type.iter().map(|(&t, set)| (t, set.len())).collect(),
        distribution,
        average_errors_per_day: envelopes.len() / DAYS_PER_WEEK,
        most_common_error_type,
        critical_errors_count: critical_errors(by_type).len(),
        production_errors_count: envelopes_by_environment(envelopes, Environment::Production)
            .len(),
    }
}
