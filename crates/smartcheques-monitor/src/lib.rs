pub mod alert;
pub mod engine;
pub mod error;
pub mod store;
pub mod threshold;

pub use alert::Alert;
pub use engine::{MetricSample, MetricSource, MonitorConfig, MonitorEngine, NoopMetricSource};
pub use error::MonitorError;
pub use store::{InMemoryMonitorStore, MonitorStore};
pub use threshold::{Operator, Severity, Threshold};
