//! Synthetic observability data for demos and visualizations.
//!
//! Generates spans grouped into traces, Sentry-style error envelopes, and
//! the descriptive statistics computed over them. Everything is produced
//! in memory; nothing is ingested or persisted.
//!
//! # Example
//!
//! ```
//! use synthtel::{analyze, SpanGenerator};
//!
//! let mut generator = SpanGenerator::seeded(42);
//! let traces = generator.traces(10);
//! let spans: Vec<_> = traces.iter().flat_map(|t| t.spans.clone()).collect();
//!
//! let analytics = analyze(&spans, &traces).unwrap();
//! println!("p95: {}ms", analytics.duration_stats.percentiles.p95);
//! ```

mod random;

pub mod analytics;
pub mod dataset;
pub mod envelope_generator;
pub mod grouping;
pub mod span_generator;
pub mod stats;
pub mod weighted;

pub use synthtel_protocol::*;

pub use analytics::{
    analyze, analyze_recent, analyze_recent_with, analyze_with, AnalyticsConfig, AnalyticsError,
    SpanAnalytics,
};
pub use dataset::{sample_data, ConfigError, ErrorStatistics, SampleConfig, SampleData, SpanStatistics};
pub use envelope_generator::{
    classify_exception_type, error_template, error_type_distribution, EnvelopeGenerator,
    ExceptionDraw,
};
pub use span_generator::{
    operation_distribution, operation_template, operations, projects, SpanGenerator,
};
pub use weighted::WeightedTable;
