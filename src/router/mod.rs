pub mod config;
pub mod context;
pub mod dispatcher;
pub mod health;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{QuotaLimit, RouterConfig};
pub use context::{Priority, ResponseTime, TaskContext, TaskType};
pub use dispatcher::{Generated, Router};
pub use health::{HealthReport, HealthState, ProviderStatus};
pub use stats::{ProviderStats, StatsTable};
