use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::utils::RetryResult;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Draft composition (drafts started, line changes, rejected input)
// - Commits and submissions
// - Order filtering (runs and matched rows)
// - Retries of collaborator calls
//
// ============================================================================

/// Central metrics registry for an order-desk session
pub struct Metrics {
    registry: Registry,

    // Draft Metrics
    pub drafts_started: IntCounter,
    pub draft_line_changes: IntCounterVec,
    pub draft_rejections: IntCounterVec,
    pub orders_committed: IntCounter,

    // Filter Metrics
    pub filter_runs: IntCounter,
    pub filter_matches: IntCounter,

    // Retry Metrics
    pub retry_attempts_total: IntCounterVec,
    pub retry_success: IntCounterVec,
    pub retry_failure: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Draft Metrics
        let drafts_started = IntCounter::new("drafts_started_total", "Total draft orders started")?;
        registry.register(Box::new(drafts_started.clone()))?;

        let draft_line_changes = IntCounterVec::new(
            Opts::new("draft_line_changes_total", "Draft line changes by kind"),
            &["change"],
        )?;
        registry.register(Box::new(draft_line_changes.clone()))?;

        let draft_rejections = IntCounterVec::new(
            Opts::new("draft_rejections_total", "Draft operations rejected by business rules"),
            &["reason"],
        )?;
        registry.register(Box::new(draft_rejections.clone()))?;

        let orders_committed = IntCounter::new(
            "orders_committed_total",
            "Total drafts committed into order records",
        )?;
        registry.register(Box::new(orders_committed.clone()))?;

        // Filter Metrics
        let filter_runs = IntCounter::new("order_filter_runs_total", "Total order filter runs")?;
        registry.register(Box::new(filter_runs.clone()))?;

        let filter_matches = IntCounter::new(
            "order_filter_matches_total",
            "Total orders returned by filter runs",
        )?;
        registry.register(Box::new(filter_matches.clone()))?;

        // Retry Metrics
        let retry_attempts_total = IntCounterVec::new(
            Opts::new("retry_attempts_total", "Total retry attempts"),
            &["operation", "attempt"],
        )?;
        registry.register(Box::new(retry_attempts_total.clone()))?;

        let retry_success = IntCounterVec::new(
            Opts::new("retry_success_total", "Total successful retried operations"),
            &["operation"],
        )?;
        registry.register(Box::new(retry_success.clone()))?;

        let retry_failure = IntCounterVec::new(
            Opts::new("retry_failure_total", "Total operations that failed after all attempts"),
            &["operation"],
        )?;
        registry.register(Box::new(retry_failure.clone()))?;

        Ok(Self {
            registry,
            drafts_started,
            draft_line_changes,
            draft_rejections,
            orders_committed,
            filter_runs,
            filter_matches,
            retry_attempts_total,
            retry_success,
            retry_failure,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn record_line_change(&self, change: &str) {
        self.draft_line_changes.with_label_values(&[change]).inc();
    }

    pub fn record_rejection(&self, reason: &str) {
        self.draft_rejections.with_label_values(&[reason]).inc();
    }

    pub fn record_filter_run(&self, matched: usize) {
        self.filter_runs.inc();
        self.filter_matches.inc_by(matched as u64);
    }

    /// Helper to record retry attempt
    pub fn record_retry_attempt(&self, operation: &str, attempt: u32) {
        let attempt = attempt.to_string();
        self.retry_attempts_total
            .with_label_values(&[operation, attempt.as_str()])
            .inc();
    }

    /// Helper to record retry outcome
    pub fn record_retry_outcome(&self, operation: &str, success: bool) {
        if success {
            self.retry_success.with_label_values(&[operation]).inc();
        } else {
            self.retry_failure.with_label_values(&[operation]).inc();
        }
    }

    /// Record the outcome of a finished retry loop and hand back its result
    pub fn record_retry_result<T, E>(
        &self,
        operation: &str,
        result: RetryResult<T, E>,
    ) -> Result<T, E> {
        let result = result.into_result();
        self.record_retry_outcome(operation, result.is_ok());
        result
    }
}
