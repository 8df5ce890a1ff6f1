pub mod metrics_defs;
pub mod substitute;
pub mod wire;
