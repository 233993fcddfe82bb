//! Synthetic Sentry-style error envelopes.
//!
//! Each envelope is built from the fixed template of its [`ErrorType`]: the
//! template pins `level` and `platform`, and supplies the messages,
//! functions, modules and environments everything else is drawn from.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use synthtel_protocol::*;
use time::UtcOffset;

use crate::random::{chance, hex_string, instant_within, pick, version_string};

/// How the exception type shown in `title` and `metadata` relates to the
/// one carried in the stack trace
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExceptionDraw {
    /// Draw one exception and reuse it for title and metadata
    #[default]
    Consistent,
    /// Draw title and metadata exceptions afresh, so they may disagree with
    /// the stack trace
    Independent,
}

impl std::str::FromStr for ExceptionDraw {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consistent" => Ok(Self::Consistent),
            "independent" => Ok(Self::Independent),
            _ => Err(ParseError {
                kind: "exception draw",
                value: s.to_string(),
            }),
        }
    }
}

/// Envelopes land somewhere in the last 30 days
const ENVELOPE_WINDOW_MS: u64 = 30 * Timestamp::MILLIS_PER_DAY;

const FRAMES_PER_STACKTRACE: usize = 5;
const IN_APP_PROBABILITY: f64 = 0.7;
const SYMBOLICATED_PROBABILITY: f64 = 0.8;

const SDK_VERSION: &str = "7.99.0";
const RELAY_VERSION: &str = "25.7.0";
const GROUPING_CONFIG_ID: &str = "newstyle:2023-01-11";
/// Relay public keys are 43 hex digits
const INGEST_KEY_LEN: usize = 43;
const NODE_RUNTIME: &str = "node v20.10.0";
const NODE_VERSION: &str = "v20.10.0";

static ERROR_TEMPLATES: [ErrorTemplate; 9] = [
    ErrorTemplate {
        error_type: ErrorType::Javascript,
        platform: "javascript",
        level: Level::Error,
        exception_types: &["TypeError", "ReferenceError", "SyntaxError", "RangeError"],
        common_messages: &[
            "Cannot read property of undefined",
            "TypeError: Cannot read properties of null",
            "ReferenceError: variable is not defined",
            "TypeError: Cannot call method of undefined",
            "SyntaxError: Unexpected token",
            "RangeError: Maximum call stack size exceeded",
        ],
        common_functions: &[
            "onClick",
            "handleSubmit",
            "componentDidMount",
            "useEffect",
            "render",
            "fetchData",
        ],
        common_modules: &[
            "app/components/Button.tsx",
            "app/pages/Dashboard.tsx",
            "app/utils/helpers.ts",
            "app/hooks/useAuth.ts",
            "node_modules/react/index.js",
        ],
        environments: &[
            Environment::Production,
            Environment::Staging,
            Environment::Development,
        ],
    },
    ErrorTemplate {
        error_type: ErrorType::Network,
        platform: "javascript",
        level: Level::Error,
        exception_types: &["NetworkError", "FetchError", "TimeoutError"],
        common_messages: &[
            "NetworkError: Failed to fetch",
            "CORS error: Access-Control-Allow-Origin",
            "Timeout: Request timed out after 30s",
            "HTTP 404: Resource not found",
            "HTTP 500: Internal server error",
            "Connection refused",
        ],
        common_functions: &[
            "fetch",
            "axios.get",
            "XMLHttpRequest.send",
            "apiCall",
            "loadData",
            "submitForm",
        ],
        common_modules: &[
            "app/api/client.ts",
            "app/services/userService.ts",
            "node_modules/axios/lib/core/xhr.js",
            "app/utils/fetchWrapper.ts",
        ],
        environments: &[Environment::Production, Environment::Staging],
    },
    ErrorTemplate {
        error_type: ErrorType::Database,
        platform: "node",
        level: Level::Error,
        exception_types: &["DatabaseError", "QueryError", "ConnectionError"],
        common_messages: &[
            "Connection timeout",
            "Query failed: syntax error",
            "Constraint violation: duplicate key",
            "Table does not exist",
            "Permission denied for table",
            "Connection refused to database",
        ],
        common_functions: &[
            "query",
            "connect",
            "transaction",
            "findById",
            "create",
            "update",
        ],
        common_modules: &[
            "node_modules/pg/lib/client.js",
            "node_modules/mysql2/index.js",
            "app/models/User.ts",
            "app/database/connection.ts",
        ],
        environments: &[
            Environment::Production,
            Environment::Staging,
            Environment::Development,
        ],
    },
    ErrorTemplate {
        error_type: ErrorType::Authentication,
        platform: "javascript",
        level: Level::Warning,
        exception_types: &["AuthenticationError", "TokenError", "SessionError"],
        common_messages: &[
            "Invalid credentials",
            "Token expired",
            "Unauthorized access",
            "Session not found",
            "Invalid JWT token",
            "Authentication failed",
        ],
        common_functions: &[
            "login",
            "authenticate",
            "verifyToken",
            "checkAuth",
            "refreshToken",
            "logout",
        ],
        common_modules: &[
            "app/auth/AuthProvider.tsx",
            "app/services/authService.ts",
            "app/middleware/auth.ts",
            "node_modules/jsonwebtoken/index.js",
        ],
        environments: &[Environment::Production, Environment::Staging],
    },
    ErrorTemplate {
        error_type: ErrorType::Validation,
        platform: "javascript",
        level: Level::Warning,
        exception_types: &["ValidationError", "SchemaError", "FormatError"],
        common_messages: &[
            "Required field missing",
            "Invalid email format",
            "Password too weak",
            "Invalid phone number",
            "Value out of range",
            "Invalid date format",
        ],
        common_functions: &[
            "validateForm",
            "checkEmail",
            "validatePassword",
            "sanitizeInput",
            "parseDate",
            "validateSchema",
        ],
        common_modules: &[
            "app/utils/validation.ts",
            "app/components/Form.tsx",
            "node_modules/joi/lib/index.js",
            "app/schemas/userSchema.ts",
        ],
        environments: &[
            Environment::Production,
            Environment::Staging,
            Environment::Development,
        ],
    },
    ErrorTemplate {
        error_type: ErrorType::Permission,
        platform: "javascript",
        level: Level::Warning,
        exception_types: &["PermissionError", "AuthorizationError", "AccessError"],
        common_messages: &[
            "Access denied",
            "Insufficient permissions",
            "Role not authorized",
            "Resource forbidden",
            "Admin access required",
            "User not in group",
        ],
        common_functions: &[
            "checkPermission",
            "hasRole",
            "canAccess",
            "authorize",
            "validateRole",
            "enforcePolicy",
        ],
        common_modules: &[
            "app/middleware/rbac.ts",
            "app/services/permissionService.ts",
            "app/utils/acl.ts",
            "app/guards/RoleGuard.tsx",
        ],
        environments: &[Environment::Production, Environment::Staging],
    },
    ErrorTemplate {
        error_type: ErrorType::Timeout,
        platform: "javascript",
        level: Level::Error,
        exception_types: &["TimeoutError", "AbortError"],
        common_messages: &[
            "Request timeout",
            "Operation timed out",
            "Connection timeout",
            "Script execution timeout",
            "Promise timeout",
            "Async operation timeout",
        ],
        common_functions: &[
            "setTimeout",
            "fetch",
            "waitFor",
            "delay",
            "promiseWithTimeout",
            "asyncOperation",
        ],
        common_modules: &[
            "app/utils/timeout.ts",
            "app/api/client.ts",
            "node_modules/axios/lib/adapters/xhr.js",
            "app/services/fileUpload.ts",
        ],
        environments: &[Environment::Production, Environment::Staging],
    },
    ErrorTemplate {
        error_type: ErrorType::Memory,
        platform: "node",
        level: Level::Fatal,
        exception_types: &["MemoryError", "OutOfMemoryError"],
        common_messages: &[
            "Out of memory",
            "Memory limit exceeded",
            "Heap out of memory",
            "Stack overflow",
            "Memory leak detected",
            "GC allocation failed",
        ],
        common_functions: &[
            "allocateMemory",
            "processLargeFile",
            "recursiveFunction",
            "loadBigData",
            "createBuffer",
            "handleUpload",
        ],
        common_modules: &[
            "node_modules/node/lib/buffer.js",
            "app/services/dataProcessor.ts",
            "app/utils/fileHandler.ts",
            "node_modules/sharp/lib/index.js",
        ],
        environments: &[Environment::Production, Environment::Staging],
    },
    ErrorTemplate {
        error_type: ErrorType::Syntax,
        platform: "javascript",
        level: Level::Error,
        exception_types: &["SyntaxError", "ParseError"],
        common_messages: &[
            "Unexpected token",
            "Unexpected end of input",
            "Invalid left-hand side",
            "Missing ) after argument list",
            "Unexpected identifier",
            "Invalid regular expression",
        ],
        common_functions: &[
            "parse",
            "eval",
            "compile",
            "transpile",
            "validate",
            "transform",
        ],
        common_modules: &[
            "app/utils/parser.ts",
            "node_modules/babel-core/lib/index.js",
            "app/compiler/index.ts",
            "node_modules/typescript/lib/typescript.js",
        ],
        environments: &[Environment::Development, Environment::Staging],
    },
];

/// Every error template, in [`ErrorType::ALL`] order
pub fn error_templates() -> &'static [ErrorTemplate] {
    &ERROR_TEMPLATES
}

pub fn error_template(error_type: ErrorType) -> &'static ErrorTemplate {
    // ERROR_TEMPLATES is laid out in declaration order
    &ERROR_TEMPLATES[error_type as usize]
}

struct Browser {
    name: &'static str,
    version: &'static str,
}

static BROWSERS: [Browser; 4] = [
    Browser { name: "Chrome", version: "120.0.6099.109" },
    Browser { name: "Firefox", version: "121.0.1" },
    Browser { name: "Safari", version: "17.2.1" },
    Browser { name: "Edge", version: "120.0.2210.91" },
];

struct OperatingSystem {
    os: &'static str,
    name: &'static str,
    version: &'static str,
    build: &'static str,
}

static OPERATING_SYSTEMS: [OperatingSystem; 4] = [
    OperatingSystem { os: "macOS 14.2", name: "macOS", version: "14.2", build: "23C64" },
    OperatingSystem { os: "Windows 11", name: "Windows", version: "11", build: "22631.2861" },
    OperatingSystem { os: "Ubuntu 22.04", name: "Ubuntu", version: "22.04", build: "jammy" },
    OperatingSystem { os: "iOS 17.2", name: "iOS", version: "17.2", build: "21C62" },
];

/// (id, email, username)
static USERS: [(&str, &str, &str); 4] = [
    ("user_1234", "john.doe@example.com", "johndoe"),
    ("user_5678", "jane.smith@company.org", "janesmith"),
    ("user_9012", "alex.wilson@startup.io", "alexw"),
    ("user_3456", "sarah.brown@corp.net", "sarahb"),
];

/// (country_code, city, subdivision, region)
static LOCATIONS: [(&str, &str, &str, &str); 5] = [
    ("US", "New York", "New York", "United States"),
    ("GB", "London", "England", "United Kingdom"),
    ("DE", "Berlin", "Berlin", "Germany"),
    ("CA", "Toronto", "Ontario", "Canada"),
    ("AU", "Sydney", "New South Wales", "Australia"),
];

const LOCALES: [&str; 5] = ["en-US", "en-GB", "de-DE", "fr-FR", "es-ES"];
const TIMEZONES: [&str; 4] = [
    "America/New_York",
    "Europe/London",
    "Europe/Berlin",
    "Asia/Tokyo",
];
const ARCHS: [&str; 3] = ["x64", "arm64", "x86"];
const PROCESSOR_COUNTS: [u32; 4] = [4, 8, 12, 16];
const CPUS: [&str; 4] = [
    "Intel Core i7-12700K",
    "AMD Ryzen 7 5800X",
    "Apple M2 Pro",
    "Intel Xeon E5-2686",
];
const PROCESSOR_FREQUENCIES: [u32; 4] = [2400, 2800, 3200, 3600];
const HTTP_METHODS: [&str; 4] = ["GET", "POST", "PUT", "DELETE"];

const SDK_INTEGRATIONS: [&str; 7] = [
    "InboundFilters",
    "FunctionToString",
    "LinkedErrors",
    "Breadcrumbs",
    "GlobalHandlers",
    "HttpContext",
    "Dedupe",
];

const MODULES: [(&str, &str); 5] = [
    ("@sentry/browser", "7.99.0"),
    ("react", "18.2.0"),
    ("typescript", "5.3.3"),
    ("vite", "5.0.10"),
    ("three", "0.160.0"),
];

const PRE_CONTEXT: [&str; 3] = [
    "  const result = await processData();",
    "  if (!result) {",
    "    throw new Error(\"Processing failed\");",
];
const POST_CONTEXT: [&str; 3] = [
    "  } catch (error) {",
    "    console.error(\"Error:\", error);",
    "    throw error;",
];

const GIB: u64 = 1024 * 1024 * 1024;

/// Module name of a path: file stem without directories or extension
fn module_name(path: &str) -> &str {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Produces error envelopes from the template catalog.
pub struct EnvelopeGenerator<R = StdRng> {
    rng: R,
    now: Timestamp,
    draw: ExceptionDraw,
}

impl EnvelopeGenerator<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy(), Timestamp::now())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), Timestamp::now())
    }
}

impl Default for EnvelopeGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> EnvelopeGenerator<R> {
    pub fn with_rng(rng: R, now: Timestamp) -> Self {
        Self {
            rng,
            now,
            draw: ExceptionDraw::default(),
        }
    }

    pub fn exception_draw(mut self, draw: ExceptionDraw) -> Self {
        self.draw = draw;
        self
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Generate one envelope of the given category
    pub fn envelope(&mut self, error_type: ErrorType) -> Envelope {
        let template = error_template(error_type);
        let rng = &mut self.rng;

        let date = instant_within(rng, self.now, ENVELOPE_WINDOW_MS);
        let datetime = date.to_datetime(UtcOffset::UTC);
        let trace_id = TraceId::random(rng);
        let browser = pick(rng, &BROWSERS);
        let os = pick(rng, &OPERATING_SYSTEMS);
        let user = self.user();
        let rng = &mut self.rng;
        let environment = *pick(rng, template.environments);

        let (runtime_tag, runtime_name, runtime_version, runtime) = if template.is_node() {
            (
                NODE_RUNTIME.to_string(),
                "node".to_string(),
                NODE_VERSION.to_string(),
                NODE_RUNTIME.to_string(),
            )
        } else {
            (
                browser.name.to_string(),
                browser.name.to_lowercase(),
                browser.version.to_string(),
                format!("{} {}", browser.name, browser.version),
            )
        };

        let tags = vec![
            ("environment".to_string(), environment.to_string()),
            (
                "handled".to_string(),
                if template.handled() { "yes" } else { "no" }.to_string(),
            ),
            ("level".to_string(), template.level.to_string()),
            ("mechanism".to_string(), "generic".to_string()),
            ("os".to_string(), os.os.to_string()),
            ("os.name".to_string(), os.name.to_string()),
            ("runtime".to_string(), runtime_tag),
            ("runtime.name".to_string(), runtime_name.clone()),
            (
                "server_name".to_string(),
                format!("app-server-{}", rng.gen_range(0..100)),
            ),
            (
                "transaction".to_string(),
                format!("{} /{}-error", pick(rng, &HTTP_METHODS), error_type),
            ),
        ];

        let dsc = DynamicSamplingContext {
            environment,
            org_id: rng.gen_range(0..1_000_000u32).to_string(),
            public_key: hex_string(rng, 16),
            replay_id: chance(rng, 0.3).then(|| hex_string(rng, 16)),
            trace_id,
        };

        let metrics = IngestMetrics {
            bytes_ingested_event: rng.gen_range(10_000..60_000),
            bytes_stored_event: rng.gen_range(20_000..120_000),
        };

        let contexts = Contexts {
            app: AppContext {
                app_start_time: date
                    .saturating_sub((rng.gen::<f64>() * Timestamp::MILLIS_PER_HOUR as f64) as u64)
                    .to_datetime(UtcOffset::UTC),
                app_memory: rng.gen_range(500_000_000..2_500_000_000),
                free_memory: rng.gen_range(100_000_000..600_000_000),
            },
            culture: CultureContext {
                locale: pick(rng, &LOCALES).to_string(),
                timezone: pick(rng, &TIMEZONES).to_string(),
            },
            device: DeviceContext {
                arch: pick(rng, &ARCHS).to_string(),
                memory_size: rng.gen_range(0..64) * GIB + 8 * GIB,
                free_memory: rng.gen_range(100_000_000..600_000_000),
                boot_time: date
                    .saturating_sub(
                        (rng.gen::<f64>() * 7.0 * Timestamp::MILLIS_PER_DAY as f64) as u64,
                    )
                    .to_datetime(UtcOffset::UTC),
                processor_count: *pick(rng, &PROCESSOR_COUNTS),
                cpu_description: pick(rng, &CPUS).to_string(),
                processor_frequency: *pick(rng, &PROCESSOR_FREQUENCIES),
            },
            os: OsContext {
                os: os.os.to_string(),
                name: os.name.to_string(),
                version: os.version.to_string(),
                build: os.build.to_string(),
                kernel_version: format!(
                    "{}.{}.{}",
                    rng.gen_range(0..10),
                    rng.gen_range(0..10),
                    rng.gen_range(0..10)
                ),
            },
            runtime: RuntimeContext {
                runtime,
                name: runtime_name,
                version: runtime_version,
            },
            trace: TraceContext::new(trace_id, SpanId::random(rng)),
            browser: (!template.is_node()).then(|| BrowserContext {
                name: browser.name.to_string(),
                version: browser.version.to_string(),
            }),
            cloud_resource: CloudResourceContext::default(),
            user: User {
                ip_address: None,
                geo: None,
                ..user.clone()
            },
        };

        let culprit = format!(
            "{} in {}",
            pick(rng, template.common_functions),
            pick(rng, template.common_modules)
        );
        let errors = if chance(rng, 0.3) {
            vec![EventError {
                kind: "js_no_source".to_string(),
                symbolicator_type: "missing_source".to_string(),
                url: pick(rng, template.common_modules).to_string(),
            }]
        } else {
            vec![]
        };

        let exception = self.exception(template);

        // title and metadata either mirror the stack exception or redraw
        let (title_type, metadata_type) = match self.draw {
            ExceptionDraw::Consistent => (
                exception.exception_type.clone(),
                exception.exception_type.clone(),
            ),
            ExceptionDraw::Independent => (
                self.exception(template).exception_type,
                self.exception(template).exception_type,
            ),
        };
        let (title_message, metadata_message) = match self.draw {
            ExceptionDraw::Consistent => (exception.value.clone(), exception.value.clone()),
            ExceptionDraw::Independent => (
                pick(&mut self.rng, template.common_messages).to_string(),
                pick(&mut self.rng, template.common_messages).to_string(),
            ),
        };

        let rng = &mut self.rng;
        let location = pick(rng, template.common_modules).to_string();
        let metadata = Metadata {
            filename: pick(rng, template.common_modules).to_string(),
            function: pick(rng, template.common_functions).to_string(),
            in_app_frame_mix: "mixed".to_string(),
            exception_type: metadata_type,
            value: metadata_message,
        };

        let sdk_flavor = if template.is_node() { "node" } else { "browser" };

        let meta = EnvelopeMeta {
            transaction: TransactionMeta {
                value: FieldMeta {
                    rem: vec![Remark("!limit".to_string(), "s".to_string(), 197, 200)],
                    len: rng.gen_range(1_000..3_000),
                },
            },
            frequency: None,
        };
        let mut ingest_key = hex_string(rng, INGEST_KEY_LEN.div_ceil(2));
        ingest_key.truncate(INGEST_KEY_LEN);

        Envelope {
            event_id: EventId::random(rng),
            project: rng.gen_range(1_000_000_000_000_000..10_000_000_000_000_000),
            release: chance(rng, 0.7).then(|| version_string(rng)),
            dist: chance(rng, 0.5).then(|| hex_string(rng, 4)),
            platform: template.platform.to_string(),
            message: String::new(),
            datetime,
            tags,
            dsc,
            metrics,
            meta,
            contexts,
            culprit,
            environment,
            errors,
            exception: ExceptionValues {
                values: vec![exception],
            },
            fingerprint: vec!["{{ default }}".to_string()],
            grouping_config: GroupingConfig {
                enhancements: hex_string(rng, 50),
                id: GROUPING_CONFIG_ID.to_string(),
            },
            hashes: vec![hex_string(rng, 16), hex_string(rng, 16)],
            ingest_path: vec![IngestHop {
                version: RELAY_VERSION.to_string(),
                public_key: ingest_key,
            }],
            key_id: rng.gen_range(0..10_000_000u32).to_string(),
            level: template.level,
            location,
            logger: String::new(),
            main_exception_id: 0,
            metadata,
            modules: MODULES
                .iter()
                .map(|(name, version)| (name.to_string(), version.to_string()))
                .collect::<BTreeMap<_, _>>(),
            nodestore_insert: date.as_secs() as f64 + rng.gen::<f64>() * 100.0,
            received: date.as_secs(),
            sdk: Sdk {
                name: format!("sentry.javascript.{sdk_flavor}"),
                version: SDK_VERSION.to_string(),
                integrations: strings(&SDK_INTEGRATIONS),
                packages: vec![SdkPackage {
                    name: format!("npm:@sentry/{sdk_flavor}"),
                    version: SDK_VERSION.to_string(),
                }],
            },
            symbolicated_in_app: false,
            timestamp: date.as_secs(),
            title: format!("{title_type}: {title_message}"),
            transaction: format!("{} /{}-endpoint", pick(rng, &HTTP_METHODS), error_type),
            event_type: "error".to_string(),
            user,
            version: "7".to_string(),
        }
    }

    /// Generate `count` envelopes of uniformly chosen categories, newest
    /// first
    pub fn envelopes(&mut self, count: usize) -> Vec<Envelope> {
        let mut envelopes: Vec<Envelope> = (0..count)
            .map(|_| {
                let error_type = *pick(&mut self.rng, ErrorType::ALL);
                self.envelope(error_type)
            })
            .collect();
        envelopes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        tracing::debug!(count, "generated envelopes");
        envelopes
    }

    /// Generate `count` envelopes of one category, newest first
    pub fn envelopes_for_type(&mut self, error_type: ErrorType, count: usize) -> Vec<Envelope> {
        let mut envelopes: Vec<Envelope> =
            (0..count).map(|_| self.envelope(error_type)).collect();
        envelopes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        tracing::debug!(error_type = %error_type, count, "generated envelopes for type");
        envelopes
    }

    fn user(&mut self) -> User {
        let rng = &mut self.rng;
        let (id, email, username) = *pick(rng, &USERS);
        let (country_code, city, subdivision, region) = *pick(rng, &LOCATIONS);
        let ip_address = format!(
            "{}.{}.{}.{}",
            rng.gen_range(0..255),
            rng.gen_range(0..255),
            rng.gen_range(0..255),
            rng.gen_range(0..255)
        );

        User {
            id: id.to_string(),
            email: email.to_string(),
            username: username.to_string(),
            ip_address: Some(ip_address),
            geo: Some(Geo {
                country_code: country_code.to_string(),
                city: city.to_string(),
                subdivision: subdivision.to_string(),
                region: region.to_string(),
            }),
        }
    }

    fn exception(&mut self, template: &ErrorTemplate) -> Exception {
        let value = pick(&mut self.rng, template.common_messages).to_string();
        let exception_type = pick(&mut self.rng, template.exception_types).to_string();

        Exception {
            exception_type,
            value,
            stacktrace: self.stacktrace(template),
            raw_stacktrace: self.stacktrace(template),
            mechanism: Mechanism {
                kind: "generic".to_string(),
                handled: template.handled(),
                exception_id: 0,
            },
        }
    }

    fn stacktrace(&mut self, template: &ErrorTemplate) -> Stacktrace {
        let frames = (0..FRAMES_PER_STACKTRACE)
            .map(|_| {
                let rng = &mut self.rng;
                let in_app = chance(rng, IN_APP_PROBABILITY);
                let path = *pick(rng, template.common_modules);
                let function = *pick(rng, template.common_functions);

                Frame {
                    function: function.to_string(),
                    module: module_name(path).to_string(),
                    filename: path.to_string(),
                    abs_path: format!("/Users/developer/project/{path}"),
                    lineno: rng.gen_range(1..=500),
                    colno: rng.gen_range(1..=80),
                    pre_context: strings(&PRE_CONTEXT),
                    context_line: format!("  return {function}(data);"),
                    post_context: strings(&POST_CONTEXT),
                    in_app,
                    data: FrameData {
                        client_in_app: in_app,
                        symbolicated: chance(rng, SYMBOLICATED_PROBABILITY),
                    },
                }
            })
            .collect();

        Stacktrace { frames }
    }
}

/// Map an exception type name back to a category by keyword.
///
/// Checks run in a fixed order against the lowercased name and the first
/// hit wins; unmatched names count as javascript. This is not an inverse of
/// generation: a network `TimeoutError` classifies as timeout, and a
/// database `ConnectionError` falls through to javascript.
pub fn classify_exception_type(name: &str) -> ErrorType {
    let name = name.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

    if has(&["type"]) {
        ErrorType::Javascript
    } else if has(&["network", "fetch"]) {
        ErrorType::Network
    } else if has(&["database", "query"]) {
        ErrorType::Database
    } else if has(&["auth", "token"]) {
        ErrorType::Authentication
    } else if has(&["validation", "schema"]) {
        ErrorType::Validation
    } else if has(&["permission", "access"]) {
        ErrorType::Permission
    } else if has(&["timeout", "abort"]) {
        ErrorType::Timeout
    } else if has(&["memory", "heap"]) {
        ErrorType::Memory
    } else if has(&["syntax", "parse"]) {
        ErrorType::Syntax
    } else {
        ErrorType::Javascript
    }
}

/// Count envelopes per classified category; all nine categories present.
///
/// Envelopes without an exception count as javascript.
pub fn error_type_distribution(envelopes: &[Envelope]) -> BTreeMap<ErrorType, usize> {
    let mut distribution: BTreeMap<ErrorType, usize> =
        ErrorType::ALL.iter().map(|&t| (t, 0)).collect();

    for envelope in envelopes {
        let error_type = envelope
            .exception_type()
            .map_or(ErrorType::Javascript, classify_exception_type);
        *distribution.entry(error_type).or_insert(0) += 1;
    }

    distribution
}

pub fn generate_envelope(error_type: ErrorType) -> Envelope {
    EnvelopeGenerator::new().envelope(error_type)
}

pub fn generate_envelopes(count: usize) -> Vec<Envelope> {
    EnvelopeGenerator::new().envelopes(count)
}

pub fn generate_envelopes_for_type(error_type: ErrorType, count: usize) -> Vec<Envelope> {
    EnvelopeGenerator::new().envelopes_for_type(error_type, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_name_strips_directories_and_extension() {
        assert_eq!(module_name("app/components/Button.tsx"), "Button");
        assert_eq!(module_name("node_modules/react/index.js"), "index");
        assert_eq!(module_name("plain"), "plain");
    }

    #[test]
    fn templates_line_up_with_error_types() {
        for &error_type in ErrorType::ALL {
            assert_eq!(error_template(error_type).error_type, error_type);
        }
    }
}
