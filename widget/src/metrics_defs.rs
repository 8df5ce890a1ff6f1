//! Metrics definitions for the polling loop.

use shared::metrics_defs::{MetricDef, MetricType};

pub const POLL_SUCCESS: MetricDef = MetricDef {
    name: "widget.poll.success",
    metric_type: MetricType::Counter,
    description: "Number of poll cycles that completed without error",
};

pub const POLL_FAILURE: MetricDef = MetricDef {
    name: "widget.poll.failure",
    metric_type: MetricType::Counter,
    description: "Number of poll cycles that failed and backed off",
};

pub const ALL_METRICS: &[MetricDef] = &[POLL_SUCCESS, POLL_FAILURE];
