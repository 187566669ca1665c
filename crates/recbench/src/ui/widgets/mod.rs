pub mod distribution;
pub mod log;
pub mod metrics;
pub mod percentiles;
pub mod summary;
pub mod wall_time;
