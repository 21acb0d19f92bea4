use std::fmt;
use std::sync::Arc;

use crate::error::ConversionError;
use crate::types::ConversionStats;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConversionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (run failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

/// Context about a conversion run.
#[derive(Debug, Clone)]
pub struct ConversionContext {
    /// Root record name of the schema driving the run.
    pub schema: String,
}

/// Observer interface for conversion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts. Callbacks are
/// best-effort from the pipeline's point of view; they cannot fail the run.
pub trait ConversionObserver: Send + Sync {
    /// Called when a run completes, with its partition counters.
    fn on_success(&self, _ctx: &ConversionContext, _stats: ConversionStats) {}

    /// Called when a run fails with a fatal error.
    fn on_failure(
        &self,
        _ctx: &ConversionContext,
        _severity: ConversionSeverity,
        _error: &ConversionError,
    ) {
    }

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(
        &self,
        ctx: &ConversionContext,
        severity: ConversionSeverity,
        error: &ConversionError,
    ) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ConversionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ConversionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ConversionObserver for CompositeObserver {
    fn on_success(&self, ctx: &ConversionContext, stats: ConversionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(
        &self,
        ctx: &ConversionContext,
        severity: ConversionSeverity,
        error: &ConversionError,
    ) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(
        &self,
        ctx: &ConversionContext,
        severity: ConversionSeverity,
        error: &ConversionError,
    ) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs conversion events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ConversionObserver for StdErrObserver {
    fn on_success(&self, ctx: &ConversionContext, stats: ConversionStats) {
        eprintln!(
            "[convert][ok] schema={} rows={} valid={} rejected={}",
            ctx.schema, stats.input_rows, stats.valid_rows, stats.rejected_rows
        );
    }

    fn on_failure(
        &self,
        ctx: &ConversionContext,
        severity: ConversionSeverity,
        error: &ConversionError,
    ) {
        eprintln!(
            "[convert][{:?}] schema={} err={}",
            severity, ctx.schema, error
        );
    }

    fn on_alert(
        &self,
        ctx: &ConversionContext,
        severity: ConversionSeverity,
        error: &ConversionError,
    ) {
        eprintln!(
            "[ALERT][convert][{:?}] schema={} err={}",
            severity, ctx.schema, error
        );
    }
}
