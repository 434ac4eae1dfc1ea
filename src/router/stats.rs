use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::llm::providers::ProviderError;


/// Lifetime counters for one provider. Only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub success_count: u64,
    pub failure_count: u64,
    /// Sum over successful attempts only.
    pub total_latency_ms: u64,
    pub last_used: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl ProviderStats {

    pub fn average_response_time_ms(&self) -> Option<f64> {
        (self.success_count > 0).then(|| self.total_latency_ms as f64 / self.success_count as f64)
    }


    pub fn total_attempts(&self) -> u64 {
        self.success_count + self.failure_count
    }
}


/// One lock per provider so concurrent calls on different providers never
/// contend, and each record's fields change together.
pub struct StatsTable {
    entries: HashMap<String, Mutex<ProviderStats>>,
}

impl StatsTable {

    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            entries: names
                .into_iter()
                .map(|name| (name.to_string(), Mutex::new(ProviderStats::default())))
                .collect(),
        }
    }


    pub fn record_success(&self, provider: &str, latency: Duration) {
        if let Some(entry) = self.entries.get(provider) {
            let mut stats = entry.lock();
            stats.success_count += 1;
            stats.total_latency_ms += latency.as_millis() as u64;
            stats.last_used = Some(Utc::now());
        }
    }


    pub fn record_failure(&self, provider: &str, error: &ProviderError) {
        if let Some(entry) = self.entries.get(provider) {
            let mut stats = entry.lock();
            stats.failure_count += 1;
            stats.last_error = Some(error.to_string());
            stats.last_used = Some(Utc::now());
        }
    }


    pub fn snapshot(&self, provider: &str) -> Option<ProviderStats> {
        self.entries.get(provider).map(|entry| entry.lock().clone())
    }
}
