use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use super::config::QuotaLimit;
use super::stats::ProviderStats;
use crate::llm::providers::PrivacyLevel;


/// Read view of one provider, computed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub name: String,
    pub model: String,
    pub available: bool,
    pub privacy_level: PrivacyLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_response_time_ms: Option<f64>,
    pub success_count: u64,
    pub failure_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaLimit>,
}

impl ProviderStatus {
    pub(crate) fn from_parts(
        name: &str,
        model: &str,
        available: bool,
        privacy_level: PrivacyLevel,
        stats: ProviderStats,
        quota: Option<QuotaLimit>,
    ) -> Self {
        Self {
            name: name.to_string(),
            model: model.to_string(),
            available,
            privacy_level,
            average_response_time_ms: stats.average_response_time_ms(),
            success_count: stats.success_count,
            failure_count: stats.failure_count,
            last_error: stats.last_error,
            last_used: stats.last_used,
            quota,
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HealthState {
    /// Every provider is available.
    Healthy,
    /// Some, not all.
    Degraded,
    /// None, including an empty registry.
    Down,
}

impl HealthState {

    pub fn from_counts(available: usize, total: usize) -> Self {
        match available {
            0 => Self::Down,
            n if n == total => Self::Healthy,
            _ => Self::Degraded,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthState,
    pub available: usize,
    pub total: usize,
    pub providers: Vec<ProviderStatus>,
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {

    pub fn from_statuses(providers: Vec<ProviderStatus>) -> Self {
        let available = providers.iter().filter(|p| p.available).count();
        let total = providers.len();
        Self {
            status: HealthState::from_counts(available, total),
            available,
            total,
            providers,
            checked_at: Utc::now(),
        }
    }
}
