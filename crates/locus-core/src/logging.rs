//! Structured logging field name constants for locus.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data |

/// Correlation ID propagated across a request. Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "sync", "inference"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "reconciler", "orchestrator", "pool", "openai"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "sync", "reconcile", "create_batch", "stream_chat"
pub const OPERATION: &str = "op";

/// Content row id being operated on.
pub const CONTENT_ID: &str = "content_id";

/// Remote (zotero) key being operated on.
pub const ZOTERO_KEY: &str = "zotero_key";

/// Remote collection version (sync watermark).
pub const VERSION: &str = "version";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of items processed by a batch operation.
pub const ITEM_COUNT: &str = "item_count";

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
