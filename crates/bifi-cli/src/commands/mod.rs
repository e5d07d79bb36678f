pub mod metrics;
pub mod perf;
