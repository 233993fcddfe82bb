//! Synthetic span and trace generation.
//!
//! Generates plausible tracing data for visualizations without needing a
//! running application. Operations are drawn from a weighted catalog so
//! busy operations (`http.server`, `db.query`) dominate and exotic ones
//! (`process.video`) stay rare.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use synthtel_protocol::*;

use crate::random::{hex_string, instant_within, pick, version_string};
use crate::weighted::WeightedTable;

/// How a span of a given operation looks
#[derive(Clone, Debug)]
pub struct OperationTemplate {
    pub op: SpanOperation,
    pub descriptions: &'static [&'static str],
    /// Milliseconds
    pub avg_duration: u64,
    /// Milliseconds either side of `avg_duration`
    pub variance: u64,
    pub weight: u32,
}

static PROJECTS: [ProjectInfo; 6] = [
    ProjectInfo {
        name: "Sentry Dashboard",
        id: "sentry-dash",
        kind: ProjectKind::Frontend,
        technology: &["React", "TypeScript", "Three.js"],
    },
    ProjectInfo {
        name: "API Gateway",
        id: "api-gateway",
        kind: ProjectKind::Backend,
        technology: &["Node.js", "Express", "PostgreSQL"],
    },
    ProjectInfo {
        name: "User Service",
        id: "user-service",
        kind: ProjectKind::Backend,
        technology: &["Python", "FastAPI", "Redis"],
    },
    ProjectInfo {
        name: "Mobile App",
        id: "mobile-app",
        kind: ProjectKind::Mobile,
        technology: &["React Native", "JavaScript"],
    },
    ProjectInfo {
        name: "Analytics Engine",
        id: "analytics-engine",
        kind: ProjectKind::Backend,
        technology: &["Java", "Spring Boot", "Kafka"],
    },
    ProjectInfo {
        name: "Admin Portal",
        id: "admin-portal",
        kind: ProjectKind::Fullstack,
        technology: &["Vue.js", "Node.js", "MongoDB"],
    },
];

/// Status pool for spans inside traces: two thirds succeed
const TRACE_SPAN_STATUSES: [SpanStatus; 9] = [
    SpanStatus::Ok,
    SpanStatus::Ok,
    SpanStatus::Ok,
    SpanStatus::Ok,
    SpanStatus::Ok,
    SpanStatus::Ok,
    SpanStatus::Cancelled,
    SpanStatus::InternalError,
    SpanStatus::NotFound,
];

/// Status pool for operation-focused batches
const OPERATION_SPAN_STATUSES: [SpanStatus; 6] = [
    SpanStatus::Ok,
    SpanStatus::Ok,
    SpanStatus::Ok,
    SpanStatus::Ok,
    SpanStatus::Cancelled,
    SpanStatus::InternalError,
];

const TRACE_REGIONS: [&str; 4] = ["us-east-1", "us-west-2", "eu-west-1", "ap-southeast-1"];
const OPERATION_REGIONS: [&str; 3] = ["us-east-1", "us-west-2", "eu-west-1"];

const HTTP_METHODS: [&str; 5] = ["GET", "POST", "PUT", "DELETE", "PATCH"];
const HTTP_STATUS_CODES: [i64; 8] = [200, 201, 204, 400, 401, 403, 404, 500];
const UI_COMPONENTS: [&str; 5] = ["Button", "Form", "Chart", "Modal", "Table"];

/// Children share the first 80% of their parent's duration as start offset
const CHILD_START_WINDOW: f64 = 0.8;

/// Every project spans can be attributed to
pub fn projects() -> &'static [ProjectInfo] {
    &PROJECTS
}

/// Every operation the generator knows about
pub fn operations() -> &'static [SpanOperation] {
    SpanOperation::ALL
}

/// Catalog entry for an operation
pub fn operation_template(op: SpanOperation) -> &'static OperationTemplate {
    use SpanOperation::*;

    match op {
        HttpServer => &OperationTemplate {
            op: HttpServer,
            descriptions: &[
                "GET /homepage",
                "POST /api/login",
                "GET /api/users",
                "PUT /api/profile",
                "DELETE /api/sessions",
                "GET /dashboard",
                "POST /api/events",
                "GET /api/projects",
                "PATCH /api/settings",
                "GET /health",
            ],
            avg_duration: 150,
            variance: 100,
            weight: 25,
        },
        HttpClient => &OperationTemplate {
            op: HttpClient,
            descriptions: &[
                "GET /api/user-profile",
                "POST /auth/verify-token",
                "GET /api/notifications",
                "PUT /api/preferences",
                "GET /external/weather-api",
                "POST /analytics/track-event",
                "GET /cdn/assets/bundle.js",
                "GET /api/real-time-data",
                "POST /payment/process",
                "GET /search/autocomplete",
            ],
            avg_duration: 250,
            variance: 200,
            weight: 20,
        },
        UiPaint => &OperationTemplate {
            op: UiPaint,
            descriptions: &[
                "Paint Dashboard",
                "Render Error List",
                "Draw Chart Component",
                "Paint Navigation",
                "Render Modal Dialog",
                "Paint Data Grid",
                "Render Loading Spinner",
                "Paint Form Elements",
                "Draw Progress Bar",
                "Render Card Layout",
            ],
            avg_duration: 16,
            variance: 8,
            weight: 15,
        },
        UiMount => &OperationTemplate {
            op: UiMount,
            descriptions: &[
                "Mount Dashboard Component",
                "Mount Error Boundary",
                "Mount Chart Widget",
                "Mount User Profile",
                "Mount Navigation Menu",
                "Mount Search Component",
                "Mount Settings Panel",
                "Mount Notification Center",
                "Mount Data Table",
                "Mount Upload Component",
            ],
            avg_duration: 45,
            variance: 25,
            weight: 12,
        },
        DbQuery => &OperationTemplate {
            op: DbQuery,
            descriptions: &[
                "SELECT users WHERE active = true",
                "INSERT INTO events (data, timestamp)",
                "UPDATE user_sessions SET last_seen",
                "SELECT * FROM projects ORDER BY created",
                "DELETE FROM expired_tokens",
                "SELECT COUNT(*) FROM error_events",
                "UPDATE project_settings SET theme",
                "SELECT user_permissions JOIN roles",
                "INSERT INTO audit_log (action, user)",
                "SELECT recent_activity LIMIT 50",
            ],
            avg_duration: 85,
            variance: 60,
            weight: 18,
        },
        UiRender => &OperationTemplate {
            op: UiRender,
            descriptions: &[
                "Render App Component",
                "Render Error Details",
                "Render Chart Canvas",
                "Render User Avatar",
                "Render Table Rows",
                "Render Button Group",
                "Render Form Fields",
                "Render Tooltip",
                "Render Dropdown Menu",
                "Render Status Badge",
            ],
            avg_duration: 12,
            variance: 6,
            weight: 10,
        },
        NavigationNavigate => &OperationTemplate {
            op: NavigationNavigate,
            descriptions: &[
                "Navigate to /dashboard",
                "Navigate to /projects",
                "Navigate to /settings",
                "Navigate to /profile",
                "Navigate to /errors",
                "Navigate to /analytics",
                "Navigate to /team",
                "Navigate to /billing",
                "Navigate to /integrations",
                "Navigate to /help",
            ],
            avg_duration: 120,
            variance: 50,
            weight: 8,
        },
        ResourceScript => &OperationTemplate {
            op: ResourceScript,
            descriptions: &[
                "Load main.js bundle",
                "Load vendor.js chunk",
                "Load analytics.js",
                "Load chart-library.js",
                "Load auth-module.js",
                "Load utils.js",
                "Load components.js",
                "Load polyfills.js",
                "Load feature-flags.js",
                "Load theme.js",
            ],
            avg_duration: 180,
            variance: 100,
            weight: 7,
        },
        FunctionCall => &OperationTemplate {
            op: FunctionCall,
            descriptions: &[
                "processErrorData()",
                "validateUserInput()",
                "formatTimestamp()",
                "calculateMetrics()",
                "parseJsonPayload()",
                "sanitizeHtmlContent()",
                "generateReportData()",
                "transformChartData()",
                "encryptSensitiveData()",
                "cacheUserPreferences()",
            ],
            avg_duration: 8,
            variance: 5,
            weight: 6,
        },
        CacheGet => &OperationTemplate {
            op: CacheGet,
            descriptions: &[
                "Get user:12345 from cache",
                "Get session:abc123 from cache",
                "Get project:config from cache",
                "Get api:rate-limits from cache",
                "Get chart:data-2024 from cache",
                "Get feature:flags from cache",
                "Get user:preferences from cache",
                "Get system:health from cache",
                "Get auth:permissions from cache",
                "Get dashboard:widgets from cache",
            ],
            avg_duration: 3,
            variance: 2,
            weight: 5,
        },
        DbTransaction => &OperationTemplate {
            op: DbTransaction,
            descriptions: &[
                "Create new user transaction",
                "Update profile transaction",
                "Delete expired data transaction",
                "Bulk insert events transaction",
                "Migrate user data transaction",
                "Archive old projects transaction",
                "Update permissions transaction",
                "Sync external data transaction",
                "Cleanup session data transaction",
                "Backup critical data transaction",
            ],
            avg_duration: 200,
            variance: 150,
            weight: 4,
        },
        ResourceImage => &OperationTemplate {
            op: ResourceImage,
            descriptions: &[
                "Load avatar-placeholder.png",
                "Load company-logo.svg",
                "Load chart-background.jpg",
                "Load loading-spinner.gif",
                "Load error-icon.svg",
                "Load success-checkmark.png",
                "Load dashboard-hero.jpg",
                "Load feature-screenshot.png",
                "Load profile-banner.jpg",
                "Load notification-bell.svg",
            ],
            avg_duration: 95,
            variance: 70,
            weight: 3,
        },
        AuthVerify => &OperationTemplate {
            op: AuthVerify,
            descriptions: &[
                "Verify JWT token",
                "Verify session cookie",
                "Verify API key",
                "Verify 2FA code",
                "Verify password hash",
                "Verify OAuth token",
                "Verify refresh token",
                "Verify CSRF token",
                "Verify user permissions",
                "Verify rate limits",
            ],
            avg_duration: 25,
            variance: 15,
            weight: 3,
        },
        UiInteraction => &OperationTemplate {
            op: UiInteraction,
            descriptions: &[
                "Handle button click",
                "Process form submission",
                "Handle dropdown selection",
                "Process checkbox change",
                "Handle modal close",
                "Process search input",
                "Handle tab switch",
                "Process file upload",
                "Handle scroll event",
                "Process keyboard shortcut",
            ],
            avg_duration: 5,
            variance: 3,
            weight: 2,
        },
        NavigationLoad => &OperationTemplate {
            op: NavigationLoad,
            descriptions: &[
                "Load page assets",
                "Load route components",
                "Load page data",
                "Load navigation state",
                "Load user context",
                "Load page permissions",
                "Load feature flags",
                "Load theme preferences",
                "Load breadcrumb data",
                "Load sidebar state",
            ],
            avg_duration: 80,
            variance: 40,
            weight: 2,
        },
        ResourceStylesheet => &OperationTemplate {
            op: ResourceStylesheet,
            descriptions: &[
                "Load main.css",
                "Load theme-dark.css",
                "Load components.css",
                "Load charts.css",
                "Load responsive.css",
                "Load animations.css",
                "Load icons.css",
                "Load forms.css",
                "Load tables.css",
                "Load utilities.css",
            ],
            avg_duration: 60,
            variance: 30,
            weight: 2,
        },
        CacheSet => &OperationTemplate {
            op: CacheSet,
            descriptions: &[
                "Cache user session data",
                "Cache API response",
                "Cache computed metrics",
                "Cache chart data",
                "Cache user preferences",
                "Cache feature flags",
                "Cache auth tokens",
                "Cache search results",
                "Cache dashboard widgets",
                "Cache system config",
            ],
            avg_duration: 4,
            variance: 2,
            weight: 2,
        },
        ProcessData => &OperationTemplate {
            op: ProcessData,
            descriptions: &[
                "Process error events batch",
                "Transform analytics data",
                "Aggregate user metrics",
                "Process uploaded file",
                "Generate report data",
                "Calculate dashboard stats",
                "Process webhook payload",
                "Transform API response",
                "Validate input data",
                "Compress output data",
            ],
            avg_duration: 300,
            variance: 200,
            weight: 2,
        },
        DbConnection => &OperationTemplate {
            op: DbConnection,
            descriptions: &[
                "Connect to user database",
                "Connect to analytics DB",
                "Connect to cache store",
                "Connect to audit log DB",
                "Connect to session store",
                "Connect to metrics DB",
                "Connect to backup DB",
                "Connect to read replica",
                "Connect to search index",
                "Connect to config store",
            ],
            avg_duration: 50,
            variance: 30,
            weight: 1,
        },
        ResourceFont => &OperationTemplate {
            op: ResourceFont,
            descriptions: &[
                "Load Inter-Regular.woff2",
                "Load Inter-Bold.woff2",
                "Load Monaco-Regular.woff",
                "Load Roboto-Medium.woff2",
                "Load icons.woff2",
                "Load Inter-SemiBold.woff2",
                "Load source-code-pro.woff",
                "Load Inter-Light.woff2",
                "Load system-ui.woff2",
                "Load emoji-font.woff2",
            ],
            avg_duration: 120,
            variance: 60,
            weight: 1,
        },
        FunctionAsync => &OperationTemplate {
            op: FunctionAsync,
            descriptions: &[
                "Async data fetch",
                "Async file processing",
                "Async user notification",
                "Async cache warming",
                "Async log submission",
                "Async metric collection",
                "Async backup creation",
                "Async email sending",
                "Async image optimization",
                "Async search indexing",
            ],
            avg_duration: 400,
            variance: 300,
            weight: 1,
        },
        FileRead => &OperationTemplate {
            op: FileRead,
            descriptions: &[
                "Read config.json",
                "Read user-preferences.json",
                "Read error-templates.json",
                "Read feature-flags.json",
                "Read translations.json",
                "Read dashboard-layout.json",
                "Read chart-config.json",
                "Read theme-settings.json",
                "Read api-endpoints.json",
                "Read manifest.json",
            ],
            avg_duration: 15,
            variance: 10,
            weight: 1,
        },
        CacheMiss => &OperationTemplate {
            op: CacheMiss,
            descriptions: &[
                "Cache miss: user session",
                "Cache miss: API response",
                "Cache miss: chart data",
                "Cache miss: user preferences",
                "Cache miss: feature flags",
                "Cache miss: auth permissions",
                "Cache miss: dashboard config",
                "Cache miss: search results",
                "Cache miss: system metrics",
                "Cache miss: theme settings",
            ],
            avg_duration: 2,
            variance: 1,
            weight: 1,
        },
        AuthLogin => &OperationTemplate {
            op: AuthLogin,
            descriptions: &[
                "User login flow",
                "SSO authentication",
                "API key authentication",
                "OAuth2 flow",
                "SAML authentication",
                "2FA verification",
                "Social login",
                "Guest user creation",
                "Service account auth",
                "Token refresh flow",
            ],
            avg_duration: 180,
            variance: 100,
            weight: 1,
        },
        AuthLogout => &OperationTemplate {
            op: AuthLogout,
            descriptions: &[
                "User logout",
                "Session cleanup",
                "Token invalidation",
                "Clear user cache",
                "Audit log entry",
                "SSO logout",
                "Cleanup temp data",
                "Update last seen",
                "Clear permissions",
                "Destroy session",
            ],
            avg_duration: 35,
            variance: 20,
            weight: 1,
        },
        FileWrite => &OperationTemplate {
            op: FileWrite,
            descriptions: &[
                "Write error log",
                "Save user preferences",
                "Write audit entry",
                "Save chart config",
                "Write backup file",
                "Save session data",
                "Write metrics data",
                "Save feature flags",
                "Write cache file",
                "Save system config",
            ],
            avg_duration: 25,
            variance: 15,
            weight: 1,
        },
        FileUpload => &OperationTemplate {
            op: FileUpload,
            descriptions: &[
                "Upload profile image",
                "Upload error dump",
                "Upload CSV data",
                "Upload backup file",
                "Upload log archive",
                "Upload screenshot",
                "Upload document",
                "Upload config file",
                "Upload report PDF",
                "Upload source map",
            ],
            avg_duration: 800,
            variance: 600,
            weight: 1,
        },
        ProcessImage => &OperationTemplate {
            op: ProcessImage,
            descriptions: &[
                "Resize profile image",
                "Generate thumbnail",
                "Optimize PNG",
                "Convert to WebP",
                "Apply image filter",
                "Compress JPEG",
                "Generate avatar",
                "Create chart image",
                "Process screenshot",
                "Generate QR code",
            ],
            avg_duration: 150,
            variance: 100,
            weight: 1,
        },
        ProcessVideo => &OperationTemplate {
            op: ProcessVideo,
            descriptions: &[
                "Process screen recording",
                "Generate video thumbnail",
                "Compress video file",
                "Extract video frame",
                "Convert video format",
                "Apply video filter",
                "Trim video clip",
                "Merge video segments",
                "Add video watermark",
                "Generate video preview",
            ],
            avg_duration: 2000,
            variance: 1500,
            weight: 1,
        },
    }
}

/// Weighted table over every operation in the catalog
pub fn operation_weights() -> WeightedTable<SpanOperation> {
    let entries = SpanOperation::ALL
        .iter()
        .map(|&op| (op, operation_template(op).weight))
        .collect();
    // every catalog weight is at least 1
    WeightedTable::new(entries).unwrap_or_else(|| unreachable!("operation catalog is empty"))
}

/// Helper to create string attributes
fn attr_str(key: &str, value: &str) -> (String, AttributeValue) {
    (key.to_string(), AttributeValue::String(value.to_string()))
}

/// Helper to create int attributes
fn attr_int(key: &str, value: i64) -> (String, AttributeValue) {
    (key.to_string(), AttributeValue::Int(value))
}

/// Produces spans and traces from the catalog.
///
/// All timestamps are placed relative to `now`, captured when the generator
/// is created.
pub struct SpanGenerator<R = StdRng> {
    rng: R,
    now: Timestamp,
    operations: WeightedTable<SpanOperation>,
}

impl SpanGenerator<StdRng> {
    /// Unseeded generator anchored at the current time
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy(), Timestamp::now())
    }

    /// Reproducible generator anchored at the current time
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), Timestamp::now())
    }
}

impl Default for SpanGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SpanGenerator<R> {
    pub fn with_rng(rng: R, now: Timestamp) -> Self {
        Self {
            rng,
            now,
            operations: operation_weights(),
        }
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Generate a single span with a weighted-random operation.
    ///
    /// Without `base_timestamp` the span starts somewhere in the last 24
    /// hours.
    pub fn span(
        &mut self,
        trace_id: TraceId,
        project: &ProjectInfo,
        parent_span_id: Option<SpanId>,
        base_timestamp: Option<Timestamp>,
    ) -> Span {
        let op = *self.operations.pick(&mut self.rng);
        let template = operation_template(op);
        let description = *pick(&mut self.rng, template.descriptions);
        let duration = self.duration(template);

        let start_timestamp = base_timestamp
            .unwrap_or_else(|| instant_within(&mut self.rng, self.now, Timestamp::MILLIS_PER_DAY));

        let tags = self.tags(project, &TRACE_REGIONS);

        let mut data = BTreeMap::new();
        match op.category() {
            "http" => {
                data.extend([
                    attr_str("http.method", *pick(&mut self.rng, &HTTP_METHODS)),
                    attr_int("http.status_code", *pick(&mut self.rng, &HTTP_STATUS_CODES)),
                ]);
            }
            "db" => {
                data.extend([attr_str("db.statement", description)]);
            }
            "ui" => {
                data.extend([attr_str("component", *pick(&mut self.rng, &UI_COMPONENTS))]);
            }
            _ => {}
        }
        data.extend(self.session_data());

        Span {
            span_id: SpanId::random(&mut self.rng),
            trace_id,
            parent_span_id,
            description: description.to_string(),
            op,
            duration,
            start_timestamp,
            end_timestamp: Timestamp(start_timestamp.0.saturating_add(duration)),
            project: project.to_ref(),
            tags,
            data,
            status: *pick(&mut self.rng, &TRACE_SPAN_STATUSES),
        }
    }

    /// Generate a trace: one root plus 2 to 9 children.
    ///
    /// Each child hangs off a uniformly chosen span generated before it, so
    /// nesting can go several levels deep. Children never end after their
    /// parent.
    pub fn trace(&mut self, project: Option<&ProjectInfo>) -> Trace {
        let project = match project {
            Some(project) => project,
            None => pick(&mut self.rng, &PROJECTS),
        };
        let trace_id = TraceId::random(&mut self.rng);

        let mut spans = vec![self.span(trace_id, project, None, None)];

        let child_count = self.rng.gen_range(2..=9);
        for _ in 0..child_count {
            let parent = &spans[self.rng.gen_range(0..spans.len())];
            let parent_id = parent.span_id;
            let parent_start = parent.start_timestamp;
            let parent_end = parent.end_timestamp;
            let window = parent.duration as f64 * CHILD_START_WINDOW;

            let offset = (self.rng.gen::<f64>() * window) as u64;
            let child_start = Timestamp(parent_start.0.saturating_add(offset));
            let mut child = self.span(trace_id, project, Some(parent_id), Some(child_start));

            if child.end_timestamp > parent_end {
                // a 1ms parent leaves no room to end strictly before it
                let end = parent_end.0.saturating_sub(1).max(child.start_timestamp.0.saturating_add(1));
                child.end_timestamp = Timestamp(end);
                child.duration = end.saturating_sub(child.start_timestamp.0);
            }

            spans.push(child);
        }

        let root = spans.remove(0);
        Trace::with_root(root, spans, project.to_ref())
    }

    /// Generate `count` independent traces, most recent first
    pub fn traces(&mut self, count: usize) -> Vec<Trace> {
        let mut traces: Vec<Trace> = (0..count).map(|_| self.trace(None)).collect();
        traces.sort_by(|a, b| b.start_timestamp.cmp(&a.start_timestamp));

        tracing::debug!(
            count,
            spans = traces.iter().map(|t| t.spans.len()).sum::<usize>(),
            "generated traces"
        );
        traces
    }

    /// Generate `count` root spans of a single operation, most recent first.
    ///
    /// Every span gets its own trace id; the whole batch shares one project.
    pub fn spans_for_operation(&mut self, op: SpanOperation, count: usize) -> Vec<Span> {
        let project = pick(&mut self.rng, &PROJECTS);
        let template = operation_template(op);

        let mut spans: Vec<Span> = (0..count)
            .map(|_| {
                let trace_id = TraceId::random(&mut self.rng);
                let description = *pick(&mut self.rng, template.descriptions);
                let duration = self.duration(template);
                let start_timestamp =
                    instant_within(&mut self.rng, self.now, Timestamp::MILLIS_PER_DAY);
                let tags = self.tags(project, &OPERATION_REGIONS);

                Span {
                    span_id: SpanId::random(&mut self.rng),
                    trace_id,
                    parent_span_id: None,
                    description: description.to_string(),
                    op,
                    duration,
                    start_timestamp,
                    end_timestamp: Timestamp(start_timestamp.0.saturating_add(duration)),
                    project: project.to_ref(),
                    tags,
                    data: self.session_data().into_iter().collect(),
                    status: *pick(&mut self.rng, &OPERATION_SPAN_STATUSES),
                }
            })
            .collect();

        spans.sort_by(|a, b| b.start_timestamp.cmp(&a.start_timestamp));

        tracing::debug!(op = %op, count, "generated operation spans");
        spans
    }

    /// Uniform in `[max(1, avg - variance), avg + variance]`, rounded
    fn duration(&mut self, template: &OperationTemplate) -> u64 {
        let min = template.avg_duration.saturating_sub(template.variance).max(1) as f64;
        let max = (template.avg_duration + template.variance) as f64;
        (min + self.rng.gen::<f64>() * (max - min)).round() as u64
    }

    fn tags(&mut self, project: &ProjectInfo, regions: &[&str]) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "environment".to_string(),
                pick(&mut self.rng, Environment::ALL).to_string(),
            ),
            (
                "technology".to_string(),
                pick(&mut self.rng, project.technology).to_string(),
            ),
            ("region".to_string(), pick(&mut self.rng, regions).to_string()),
            ("version".to_string(), version_string(&mut self.rng)),
        ])
    }

    fn session_data(&mut self) -> [(String, AttributeValue); 2] {
        [
            attr_str(
                "user.id",
                &format!("user_{}", self.rng.gen_range(0..10_000)),
            ),
            attr_str("session.id", &hex_string(&mut self.rng, 8)),
        ]
    }
}

/// Count spans per operation; every known operation is present, possibly 0
pub fn operation_distribution(spans: &[Span]) -> BTreeMap<SpanOperation, usize> {
    let mut distribution: BTreeMap<SpanOperation, usize> =
        SpanOperation::ALL.iter().map(|&op| (op, 0)).collect();

    for span in spans {
        *distribution.entry(span.op).or_insert(0) += 1;
    }

    distribution
}

/// Generate one span with a fresh unseeded generator
pub fn generate_span(
    trace_id: TraceId,
    project: &ProjectInfo,
    parent_span_id: Option<SpanId>,
    base_timestamp: Option<Timestamp>,
) -> Span {
    SpanGenerator::new().span(trace_id, project, parent_span_id, base_timestamp)
}

/// Generate one trace with a fresh unseeded generator
pub fn generate_trace(project: Option<&ProjectInfo>) -> Trace {
    SpanGenerator::new().trace(project)
}

/// Generate `count` traces with a fresh unseeded generator
pub fn generate_traces(count: usize) -> Vec<Trace> {
    SpanGenerator::new().traces(count)
}

/// Generate `count` spans of one operation with a fresh unseeded generator
pub fn generate_spans_for_operation(op: SpanOperation, count: usize) -> Vec<Span> {
    SpanGenerator::new().spans_for_operation(op, count)
}
