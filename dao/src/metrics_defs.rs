//! Metrics definitions for the DAO layer.

use shared::metrics_defs::{MetricDef, MetricType};

pub const PAYLOAD_CACHE_HIT: MetricDef = MetricDef {
    name: "dao.payload_cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of requests served from the payload cache",
};

pub const PAYLOAD_CACHE_MISS: MetricDef = MetricDef {
    name: "dao.payload_cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of requests that missed the payload cache",
};

pub const UPSTREAM_REQUESTS: MetricDef = MetricDef {
    name: "dao.upstream.requests",
    metric_type: MetricType::Counter,
    description: "Number of requests issued to external APIs",
};

pub const ALL_METRICS: &[MetricDef] = &[PAYLOAD_CACHE_HIT, PAYLOAD_CACHE_MISS, UPSTREAM_REQUESTS];
