//! Statement metrics and tracing spans.
//!
//! Counters and histograms are registered on the `opentelemetry` global meter; installing
//! an exporter is left to the application.

#[cfg(feature = "metrics")]
use once_cell::sync::Lazy;
#[cfg(feature = "metrics")]
use opentelemetry::{
    global,
    metrics::{Counter, Histogram},
    KeyValue,
};

#[cfg(feature = "metrics")]
pub static METRICS: Lazy<CqlMetrics> = Lazy::new(CqlMetrics::init);

#[cfg(feature = "metrics")]
pub struct CqlMetrics {
    pub statements_total: Counter<u64>,
    pub statement_errors_total: Counter<u64>,
    pub statement_duration: Histogram<f64>,
}

#[cfg(feature = "metrics")]
impl CqlMetrics {
    pub fn init() -> Self {
        let meter = global::meter("cql");

        let statements_total = meter
            .u64_counter("cql_statements_total")
            .with_description("Total statements executed")
            .build();

        let statement_errors_total = meter
            .u64_counter("cql_statement_errors_total")
            .with_description("Statements that failed in the driver")
            .build();

        let statement_duration = meter
            .f64_histogram("cql_statement_duration_seconds")
            .with_description("Duration of statements")
            .build();

        Self {
            statements_total,
            statement_errors_total,
            statement_duration,
        }
    }

    /// `kind` is the statement kind: select, insert, update or delete
    pub fn record_statement(&self, kind: &'static str, elapsed: std::time::Duration) {
        let labels = [KeyValue::new("kind", kind)];
        self.statements_total.add(1, &labels);
        self.statement_duration.record(elapsed.as_secs_f64(), &labels);
    }

    pub fn record_error(&self, kind: &'static str) {
        self.statement_errors_total
            .add(1, &[KeyValue::new("kind", kind)]);
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{info_span, Span};

    pub fn statement_span(kind: &'static str, sql: &str) -> Span {
        info_span!("cql.statement", kind = kind, sql = sql)
    }
}
