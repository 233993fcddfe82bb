//! Sentry-style error envelopes.
//!
//! Field names follow the Sentry event payload so the JSON output can be
//! fed to anything that already understands those events.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

use crate::names::named_enum;
use crate::trace_context::{EventId, TraceContext, TraceId};

named_enum! {
    /// Category of a fabricated error
    pub enum ErrorType: "error type" {
        Javascript => "javascript",
        Network => "network",
        Database => "database",
        Authentication => "authentication",
        Validation => "validation",
        Permission => "permission",
        Timeout => "timeout",
        Memory => "memory",
        Syntax => "syntax",
    }
}

named_enum! {
    /// Severity of an error event
    pub enum Level: "level" {
        Debug => "debug",
        Info => "info",
        Warning => "warning",
        Error => "error",
        Fatal => "fatal",
    }
}

named_enum! {
    /// Deployment environment
    pub enum Environment: "environment" {
        Production => "production",
        Staging => "staging",
        Development => "development",
    }
}

/// Static description of one error category
#[derive(Clone, Debug, Serialize)]
pub struct ErrorTemplate {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub platform: &'static str,
    pub level: Level,
    pub exception_types: &'static [&'static str],
    pub common_messages: &'static [&'static str],
    pub common_functions: &'static [&'static str],
    pub common_modules: &'static [&'static str],
    pub environments: &'static [Environment],
}

impl ErrorTemplate {
    pub fn handled(&self) -> bool {
        self.level != Level::Fatal
    }

    pub fn is_node(&self) -> bool {
        self.platform == "node"
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameData {
    pub client_in_app: bool,
    pub symbolicated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub function: String,
    pub module: String,
    pub filename: String,
    pub abs_path: String,
    pub lineno: u32,
    pub colno: u32,
    pub pre_context: Vec<String>,
    pub context_line: String,
    pub post_context: Vec<String>,
    pub in_app: bool,
    pub data: FrameData,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stacktrace {
    pub frames: Vec<Frame>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mechanism {
    #[serde(rename = "type")]
    pub kind: String,
    pub handled: bool,
    pub exception_id: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exception {
    #[serde(rename = "type")]
    pub exception_type: String,
    pub value: String,
    pub stacktrace: Stacktrace,
    pub raw_stacktrace: Stacktrace,
    pub mechanism: Mechanism,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionValues {
    pub values: Vec<Exception>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geo {
    pub country_code: String,
    pub city: String,
    pub subdivision: String,
    pub region: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppContext {
    #[serde(with = "time::serde::rfc3339")]
    pub app_start_time: OffsetDateTime,
    pub app_memory: u64,
    pub free_memory: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CultureContext {
    pub locale: String,
    pub timezone: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceContext {
    pub arch: String,
    pub memory_size: u64,
    pub free_memory: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub boot_time: OffsetDateTime,
    pub processor_count: u32,
    pub cpu_description: String,
    pub processor_frequency: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsContext {
    pub os: String,
    pub name: String,
    pub version: String,
    pub build: String,
    pub kernel_version: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeContext {
    pub runtime: String,
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserContext {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Contexts {
    pub app: AppContext,
    pub culture: CultureContext,
    pub device: DeviceContext,
    pub os: OsContext,
    pub runtime: RuntimeContext,
    pub trace: TraceContext,
    /// Only present for browser platforms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserContext>,
    pub cloud_resource: CloudResourceContext,
    pub user: User,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudResourceContext {
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for CloudResourceContext {
    fn default() -> Self {
        Self {
            kind: "cloud_resource".to_string(),
        }
    }
}

/// Processing error attached by ingestion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventError {
    #[serde(rename = "type")]
    pub kind: String,
    pub symbolicator_type: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub filename: String,
    pub function: String,
    pub in_app_frame_mix: String,
    #[serde(rename = "type")]
    pub exception_type: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkPackage {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sdk {
    pub name: String,
    pub version: String,
    pub integrations: Vec<String>,
    pub packages: Vec<SdkPackage>,
}

/// Dynamic sampling context
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicSamplingContext {
    pub environment: Environment,
    pub org_id: String,
    pub public_key: String,
    pub replay_id: Option<String>,
    pub trace_id: TraceId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestMetrics {
    pub bytes_ingested_event: u64,
    pub bytes_stored_event: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingConfig {
    pub enhancements: String,
    pub id: String,
}

/// One relay the event passed through on its way in
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestHop {
    pub version: String,
    pub public_key: String,
}

/// A processing remark: rule id, remark kind and the affected byte range,
/// serialized as a four-element array
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remark(pub String, pub String, pub u32, pub u32);

/// Remarks on one field plus its original length
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub rem: Vec<Remark>,
    pub len: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMeta {
    #[serde(rename = "")]
    pub value: FieldMeta,
}

/// Ingestion annotations, serialized as `_meta`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub transaction: TransactionMeta,
    /// How often the event recurred; only set on high-frequency samples
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u32>,
}

/// One fabricated error report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub event_id: EventId,
    pub project: u64,
    pub release: Option<String>,
    pub dist: Option<String>,
    pub platform: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub datetime: OffsetDateTime,
    pub tags: Vec<(String, String)>,
    #[serde(rename = "_dsc")]
    pub dsc: DynamicSamplingContext,
    #[serde(rename = "_metrics")]
    pub metrics: IngestMetrics,
    #[serde(rename = "_meta")]
    pub meta: EnvelopeMeta,
    pub contexts: Contexts,
    pub culprit: String,
    pub environment: Environment,
    pub errors: Vec<EventError>,
    pub exception: ExceptionValues,
    pub fingerprint: Vec<String>,
    pub grouping_config: GroupingConfig,
    pub hashes: Vec<String>,
    pub ingest_path: Vec<IngestHop>,
    pub key_id: String,
    pub level: Level,
    pub location: String,
    pub logger: String,
    pub main_exception_id: u32,
    pub metadata: Metadata,
    pub modules: BTreeMap<String, String>,
    /// Seconds since the epoch, fractional
    pub nodestore_insert: f64,
    pub received: i64,
    pub sdk: Sdk,
    pub symbolicated_in_app: bool,
    /// Seconds since the epoch
    pub timestamp: i64,
    pub title: String,
    pub transaction: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub user: User,
    pub version: String,
}

impl Envelope {
    /// Type name of the first exception, if any
    pub fn exception_type(&self) -> Option<&str> {
        self.exception
            .values
            .first()
            .map(|e| e.exception_type.as_str())
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
