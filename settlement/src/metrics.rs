//! Metrics collection for observability
//!
//! Prometheus metrics for the group actors. Each `Metrics` owns its own
//! registry so several collectors can live in one process (and in tests).
//!
//! # Metrics
//!
//! - `moim_settlements_total` - Periods sealed
//! - `moim_settlement_noop_total` - Settle requests with no open period
//! - `moim_settle_duration_seconds` - Histogram of settlement latencies
//! - `moim_attendance_updates_total` - Attendance records written
//! - `moim_expenses_total` - Expenses recorded
//! - `moim_expense_amount_total` - Sum of recorded expense amounts
//! - `moim_members_active` - Active members across groups

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Periods sealed
    pub settlements_total: IntCounter,

    /// Settle requests that found no open period
    pub settlement_noop_total: IntCounter,

    /// Settlement duration histogram
    pub settle_duration: Histogram,

    /// Attendance records written
    pub attendance_updates_total: IntCounter,

    /// Expenses recorded
    pub expenses_total: IntCounter,

    /// Sum of recorded expense amounts
    pub expense_amount_total: IntCounter,

    /// Active members
    pub members_active: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let settlements_total = IntCounter::new("moim_settlements_total", "Periods sealed")?;
        registry.register(Box::new(settlements_total.clone()))?;

        let settlement_noop_total = IntCounter::new(
            "moim_settlement_noop_total",
            "Settle requests with no open period",
        )?;
        registry.register(Box::new(settlement_noop_total.clone()))?;

        let settle_duration = Histogram::with_opts(
            HistogramOpts::new(
                "moim_settle_duration_seconds",
                "Histogram of settlement latencies",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.050, 0.100]),
        )?;
        registry.register(Box::new(settle_duration.clone()))?;

        let attendance_updates_total = IntCounter::new(
            "moim_attendance_updates_total",
            "Attendance records written",
        )?;
        registry.register(Box::new(attendance_updates_total.clone()))?;

        let expenses_total = IntCounter::new("moim_expenses_total", "Expenses recorded")?;
        registry.register(Box::new(expenses_total.clone()))?;

        let expense_amount_total = IntCounter::new(
            "moim_expense_amount_total",
            "Sum of recorded expense amounts",
        )?;
        registry.register(Box::new(expense_amount_total.clone()))?;

        let members_active = IntGauge::new("moim_members_active", "Active members")?;
        registry.register(Box::new(members_active.clone()))?;

        Ok(Self {
            settlements_total,
            settlement_noop_total,
            settle_duration,
            attendance_updates_total,
            expenses_total,
            expense_amount_total,
            members_active,
            registry,
        })
    }

    /// Record a sealed period
    pub fn record_settlement(&self, duration_seconds: f64) {
        self.settlements_total.inc();
        self.settle_duration.observe(duration_seconds);
    }

    /// Record a settle request with nothing to seal
    pub fn record_settlement_noop(&self) {
        self.settlement_noop_total.inc();
    }

    /// Record an attendance write
    pub fn record_attendance_update(&self) {
        self.attendance_updates_total.inc();
    }

    /// Record an expense
    pub fn record_expense(&self, amount: i64) {
        self.expenses_total.inc();
        self.expense_amount_total.inc_by(amount.max(0) as u64);
    }

    /// Adjust active member count
    pub fn add_members(&self, delta: i64) {
        self.members_active.add(delta);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.settlements_total.get(), 0);
        assert_eq!(metrics.members_active.get(), 0);

        // Private registries: a second collector does not clash
        assert!(Metrics::new().is_ok());
    }

    #[test]
    fn test_record_expense() {
        let metrics = Metrics::new().unwrap();
        metrics.record_expense(25_000);
        metrics.record_expense(18_500);
        assert_eq!(metrics.expenses_total.get(), 2);
        assert_eq!(metrics.expense_amount_total.get(), 43_500);
    }

    #[test]
    fn test_record_settlement() {
        let metrics = Metrics::new().unwrap();
        metrics.record_settlement(0.002);
        metrics.record_settlement_noop();
        assert_eq!(metrics.settlements_total.get(), 1);
        assert_eq!(metrics.settlement_noop_total.get(), 1);
        assert_eq!(metrics.settle_duration.get_sample_count(), 1);
    }

    #[test]
    fn test_registry_gathers() {
        let metrics = Metrics::new().unwrap();
        metrics.add_members(3);
        let families = metrics.registry().gather();
        assert!(families.iter().any(|f| f.get_name() == "moim_members_active"));
    }
}
