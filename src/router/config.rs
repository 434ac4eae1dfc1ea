use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use strum::IntoEnumIterator;

use super::context::TaskType;
use crate::core::Result;
use crate::DEFAULT_CALL_TIMEOUT_SECS;


/// Advisory per-provider quota hints. Reported in status, never enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaLimit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_minute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_per_day: Option<u64>,
}


/// Static routing policy, fixed once the router is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Global order used for the fallback walk after any failed attempt.
    pub fallback_chain: Vec<String>,
    /// Preferred providers per task type, best first.
    #[serde(deserialize_with = "deserialize_task_routing")]
    pub task_routing: HashMap<TaskType, Vec<String>>,
    pub quota_limits: HashMap<String, QuotaLimit>,
    /// Provider picked first for `realtime` requests when it is up.
    pub realtime_provider: Option<String>,
    /// Upper bound on a single provider attempt.
    pub call_timeout_secs: u64,
}

impl RouterConfig {

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("AI_ROUTER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("fallback_chain")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }


    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }


    pub fn routes_for(&self, task_type: TaskType) -> &[String] {
        self.task_routing
            .get(&task_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }


    pub fn quota_for(&self, provider: &str) -> Option<QuotaLimit> {
        self.quota_limits.get(provider).copied()
    }

    /// Every provider name the policy mentions, for validation against the
    /// registry.
    pub fn referenced_providers(&self) -> impl Iterator<Item = &str> {
        self.fallback_chain
            .iter()
            .chain(self.task_routing.values().flatten())
            .chain(self.realtime_provider.iter())
            .chain(self.quota_limits.keys())
            .map(String::as_str)
    }
}

// Keys go through strum so that string-keyed sources (TOML tables,
// environment) parse the same way as JSON.
fn deserialize_task_routing<'de, D>(
    deserializer: D,
) -> std::result::Result<HashMap<TaskType, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<String, Vec<String>>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, providers)| {
            TaskType::from_str(&key)
                .map(|task| (task, providers))
                .map_err(|_| serde::de::Error::custom(format!("unknown task type '{key}'")))
        })
        .collect()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for RouterConfig {
    fn default() -> Self {
        let task_routing = TaskType::iter()
            .map(|task| {
                let order = match task {
                    TaskType::Chat => ["groq", "gemini", "openai", "ollama"],
                    TaskType::Analysis => ["openai", "gemini", "groq", "ollama"],
                    TaskType::Generation => ["openai", "gemini", "groq", "ollama"],
                    TaskType::Extraction => ["groq", "gemini", "openai", "ollama"],
                    TaskType::Summary => ["gemini", "groq", "openai", "ollama"],
                    TaskType::Classification => ["groq", "gemini", "ollama", "openai"],
                };
                (task, names(&order))
            })
            .collect();

        let quota_limits = HashMap::from([
            (
                "groq".to_string(),
                QuotaLimit {
                    requests_per_minute: Some(30),
                    tokens_per_day: Some(500_000),
                },
            ),
            (
                "gemini".to_string(),
                QuotaLimit {
                    requests_per_minute: Some(15),
                    tokens_per_day: Some(1_000_000),
                },
            ),
            (
                "openai".to_string(),
                QuotaLimit {
                    requests_per_minute: Some(60),
                    tokens_per_day: None,
                },
            ),
        ]);

        Self {
            fallback_chain: names(&["groq", "gemini", "openai", "ollama"]),
            task_routing,
            quota_limits,
            realtime_provider: Some("groq".to_string()),
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
        }
    }
}
