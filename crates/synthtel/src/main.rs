use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use synthtel::analytics::RECENT_WINDOW_MS;
use synthtel::grouping::list_traces;
use synthtel::*;
use time::UtcOffset;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synthtel")]
#[command(about = "Synthetic spans, traces and error envelopes", long_about = None)]
struct Cli {
    /// Seed for reproducible output
    #[arg(long, global = true, env = "SYNTHTEL_SEED")]
    seed: Option<u64>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate traces
    Traces {
        #[arg(short, long, default_value = "50")]
        count: usize,

        /// Print one summary row per trace instead of full traces
        #[arg(long)]
        list: bool,

        /// Only list traces from this project (by name)
        #[arg(long, requires = "list")]
        project: Option<String>,

        /// Only list traces at least this long, in milliseconds
        #[arg(long, requires = "list")]
        min_duration: Option<u64>,

        /// Only list traces at most this long, in milliseconds
        #[arg(long, requires = "list")]
        max_duration: Option<u64>,

        /// Only list traces with (true) or without (false) failed spans
        #[arg(long, requires = "list")]
        has_errors: Option<bool>,

        /// Maximum number of rows to list
        #[arg(long, requires = "list")]
        limit: Option<usize>,
    },

    /// Generate root spans of a single operation
    Spans {
        /// Operation name, e.g. `http.server`
        #[arg(long)]
        op: SpanOperation,

        #[arg(short, long, default_value = "25")]
        count: usize,
    },

    /// Generate error envelopes
    Envelopes {
        #[arg(short, long, default_value = "100")]
        count: usize,

        /// Restrict to one error category, e.g. `network`
        #[arg(long = "type")]
        error_type: Option<ErrorType>,

        /// `consistent` or `independent`
        #[arg(long, default_value = "consistent")]
        exception_draw: ExceptionDraw,

        /// Print the per-category distribution instead of the envelopes
        #[arg(long)]
        distribution: bool,
    },

    /// Generate traces and print analytics over their spans
    Analyze {
        #[arg(short, long, default_value = "50")]
        traces: usize,

        /// Hour offset from UTC used for the hourly histogram
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        utc_offset_hours: i8,

        /// Only analyze spans from the last five minutes
        #[arg(long)]
        recent: bool,
    },

    /// Print span and error statistics for the sample dataset
    Summary,
}

fn main() -> anyhow::Result<()> {
    // JSON goes to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Traces {
            count,
            list,
            project,
            min_duration,
            max_duration,
            has_errors,
            limit,
        } => {
            let traces = span_generator(cli.seed).traces(count);
            if list {
                let filter = TraceFilter {
                    project,
                    min_duration,
                    max_duration,
                    has_errors,
                    limit,
                };
                emit(&list_traces(&traces, &filter), cli.pretty)
            } else {
                emit(&traces, cli.pretty)
            }
        }
        Commands::Spans { op, count } => {
            emit(&span_generator(cli.seed).spans_for_operation(op, count), cli.pretty)
        }
        Commands::Envelopes {
            count,
            error_type,
            exception_draw,
            distribution,
        } => {
            let mut generator = envelope_generator(cli.seed).exception_draw(exception_draw);
            let envelopes = match error_type {
                Some(error_type) => generator.envelopes_for_type(error_type, count),
                None => generator.envelopes(count),
            };
            if distribution {
                emit(&error_type_distribution(&envelopes), cli.pretty)
            } else {
                emit(&envelopes, cli.pretty)
            }
        }
        Commands::Analyze {
            traces,
            utc_offset_hours,
            recent,
        } => {
            let mut generator = span_generator(cli.seed);
            let now = generator.now();
            let traces = generator.traces(traces);
            let spans: Vec<Span> = traces.iter().flat_map(|t| t.spans.iter().cloned()).collect();

            let config = AnalyticsConfig {
                utc_offset: UtcOffset::from_hms(utc_offset_hours, 0, 0)
                    .context("invalid UTC offset")?,
            };

            if recent {
                let analytics =
                    analyze_recent_with(&config, &spans, &traces, now, RECENT_WINDOW_MS);
                // None serializes as null when nothing is recent
                return emit(&analytics, cli.pretty);
            }

            emit(&analyze_with(&config, &spans, &traces)?, cli.pretty)
        }
        Commands::Summary => {
            let mut config = SampleConfig::from_env()?;
            if cli.seed.is_some() {
                config.seed = cli.seed;
            }
            let data = SampleData::generate(&config);

            #[derive(Serialize)]
            struct Summary<'a> {
                spans: &'a SpanStatistics,
                errors: &'a ErrorStatistics,
            }

            emit(
                &Summary {
                    spans: &data.span_statistics,
                    errors: &data.error_statistics,
                },
                cli.pretty,
            )
        }
    }
}

fn span_generator(seed: Option<u64>) -> SpanGenerator {
    match seed {
        Some(seed) => SpanGenerator::seeded(seed),
        None => SpanGenerator::new(),
    }
}

fn envelope_generator(seed: Option<u64>) -> EnvelopeGenerator {
    match seed {
        Some(seed) => EnvelopeGenerator::seeded(seed),
        None => EnvelopeGenerator::new(),
    }
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}
