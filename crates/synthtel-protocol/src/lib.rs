//! Data model for synthetic observability data.
//!
//! This crate defines spans, traces and Sentry-style error envelopes, plus
//! the ids and string-backed enums they are built from.

mod names;

pub mod envelope;
pub mod span;
pub mod trace_context;

pub use envelope::*;
pub use names::ParseError;
pub use span::*;
pub use trace_context::*;
