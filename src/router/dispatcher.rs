//! Provider selection and the select → invoke → fallback → record pipeline.
//!
//! The router is built once at startup and shared as `Arc<Router>`. Registry
//! and policy are read-only after construction; the only shared mutable state
//! is the per-provider stats table.

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::config::RouterConfig;
use super::context::{ResponseTime, TaskContext};
use super::health::{HealthReport, ProviderStatus};
use super::stats::{ProviderStats, StatsTable};
use crate::core::{AiConfig, Result, RouterError};
use crate::llm::factory::ProviderFactory;
use crate::llm::providers::{AiProvider, GenerateOptions, PrivacyLevel, ProviderError};


/// A successful result together with the provider that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generated<T> {
    pub output: T,
    pub provider: String,
}


pub struct Router {
    providers: Vec<Arc<dyn AiProvider>>,
    config: RouterConfig,
    stats: StatsTable,
}

impl Router {

    pub fn new(providers: Vec<Arc<dyn AiProvider>>, config: RouterConfig) -> Result<Self> {
        if config.call_timeout_secs == 0 {
            return Err(RouterError::Config(
                "call_timeout_secs must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for provider in &providers {
            if !seen.insert(provider.name().to_string()) {
                return Err(RouterError::Config(format!(
                    "duplicate provider name '{}'",
                    provider.name()
                )));
            }
        }

        for name in config.referenced_providers() {
            if !seen.contains(name) {
                warn!("Routing policy references unknown provider '{}'", name);
            }
        }

        let stats = StatsTable::new(providers.iter().map(|p| p.name()));
        info!(
            "Router initialized: providers=[{}], fallback_chain=[{}]",
            providers
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", "),
            config.fallback_chain.join(", ")
        );

        Ok(Self {
            providers,
            config,
            stats,
        })
    }

    /// Builds every adapter from `ai` with the given policy.
    pub fn from_config(ai: &AiConfig, config: RouterConfig) -> Result<Self> {
        Self::new(ProviderFactory::create_all(ai), config)
    }


    pub fn from_env() -> Result<Self> {
        Self::from_config(&AiConfig::from_env(), RouterConfig::default())
    }


    pub fn config(&self) -> &RouterConfig {
        &self.config
    }


    pub fn provider(&self, name: &str) -> Option<&Arc<dyn AiProvider>> {
        self.providers.iter().find(|p| p.name() == name)
    }


    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }


    pub fn stats_snapshot(&self, name: &str) -> Option<ProviderStats> {
        self.stats.snapshot(name)
    }

    /// Picks the first provider for `ctx`, or `None` when nothing usable is up.
    ///
    /// Privacy-sensitive requests only ever see `local` providers.
    pub async fn select(&self, ctx: &TaskContext) -> Option<Arc<dyn AiProvider>> {
        if ctx.requires_privacy() {
            let mut local: Vec<&Arc<dyn AiProvider>> = self
                .providers
                .iter()
                .filter(|p| p.capabilities().privacy_level == PrivacyLevel::Local)
                .collect();
            local.sort_by_key(|p| p.capabilities().priority);

            for provider in local {
                if provider.is_available().await {
                    debug!("Selected local provider {} for private request", provider.name());
                    return Some(Arc::clone(provider));
                }
            }
            warn!("No local provider available for privacy-sensitive request");
            return None;
        }

        if ctx.expected_response_time() == ResponseTime::Realtime {
            let realtime = self
                .config
                .realtime_provider
                .as_deref()
                .and_then(|name| self.provider(name));
            if let Some(provider) = realtime {
                if provider.is_available().await {
                    debug!("Selected realtime provider {}", provider.name());
                    return Some(Arc::clone(provider));
                }
            }
        }

        if let Some(provider) = self
            .first_available(self.config.routes_for(ctx.task_type()))
            .await
        {
            debug!("Selected {} from {} routing", provider.name(), ctx.task_type());
            return Some(provider);
        }

        if let Some(provider) = self.first_available(&self.config.fallback_chain).await {
            debug!("Selected {} from fallback chain", provider.name());
            return Some(provider);
        }

        for provider in &self.providers {
            if provider.is_available().await {
                debug!("Selected {} from registry scan", provider.name());
                return Some(Arc::clone(provider));
            }
        }

        None
    }


    pub async fn generate_text(
        &self,
        prompt: &str,
        ctx: &TaskContext,
        options: &GenerateOptions,
    ) -> Result<Generated<String>> {
        self.dispatch(prompt, ctx, |provider| {
            async move { provider.generate_text(prompt, options).await }.boxed()
        })
        .await
    }


    pub async fn generate_json(
        &self,
        prompt: &str,
        ctx: &TaskContext,
        schema: Option<&Value>,
    ) -> Result<Generated<Value>> {
        self.dispatch(prompt, ctx, |provider| {
            async move { provider.generate_json(prompt, schema).await }.boxed()
        })
        .await
    }

    /// JSON generation with the schema derived from `T`.
    ///
    /// A response that parses as JSON but does not fit `T` is a
    /// `RouterError::Decode`; it has already been counted as a success for
    /// the provider.
    pub async fn generate_typed<T>(&self, prompt: &str, ctx: &TaskContext) -> Result<Generated<T>>
    where
        T: DeserializeOwned + JsonSchema,
    {
        let schema = serde_json::to_value(schemars::schema_for!(T))
            .map_err(|e| RouterError::Config(format!("unserializable JSON schema: {e}")))?;
        let generated = self.generate_json(prompt, ctx, Some(&schema)).await?;
        Ok(Generated {
            output: serde_json::from_value(generated.output)?,
            provider: generated.provider,
        })
    }


    pub async fn status(&self) -> Vec<ProviderStatus> {
        join_all(self.providers.iter().map(|provider| async move {
            let available = provider.is_available().await;
            ProviderStatus::from_parts(
                provider.name(),
                provider.model_name(),
                available,
                provider.capabilities().privacy_level,
                self.stats.snapshot(provider.name()).unwrap_or_default(),
                self.config.quota_for(provider.name()),
            )
        }))
        .await
    }


    pub async fn health_check(&self) -> HealthReport {
        let report = HealthReport::from_statuses(self.status().await);
        info!(
            "AI health: {} ({}/{} providers available)",
            report.status, report.available, report.total
        );
        report
    }

    async fn first_available(&self, names: &[String]) -> Option<Arc<dyn AiProvider>> {
        for name in names {
            if let Some(provider) = self.provider(name) {
                if provider.is_available().await {
                    return Some(Arc::clone(provider));
                }
            }
        }
        None
    }

    async fn dispatch<'f, T, F>(
        &self,
        prompt: &str,
        ctx: &TaskContext,
        op: F,
    ) -> Result<Generated<T>>
    where
        F: Fn(Arc<dyn AiProvider>) -> BoxFuture<'f, std::result::Result<T, ProviderError>>,
    {
        let span = info_span!(
            "ai_request",
            request_id = %Uuid::new_v4(),
            task_type = %ctx.task_type(),
            private = ctx.requires_privacy(),
        );

        async {
            debug!("Dispatching prompt: {}", crate::safe_truncate_ellipsis(prompt, 80));

            let Some(first) = self.select(ctx).await else {
                warn!("No AI provider available for {} task", ctx.task_type());
                return Err(RouterError::NoProviderAvailable {
                    task_type: ctx.task_type(),
                });
            };

            if let Some(budget) = self.over_daily_budget(first.name(), ctx) {
                debug!(
                    "Estimated tokens exceed advisory daily budget {} for {}",
                    budget,
                    first.name()
                );
            }

            let mut attempted = vec![first.name().to_string()];
            let mut last_error = match self.attempt(&first, &op).await {
                Ok(output) => {
                    return Ok(Generated {
                        output,
                        provider: first.name().to_string(),
                    });
                }
                Err(e) => e,
            };

            for candidate in self.fallback_after(first.name()) {
                let name = candidate.name();
                if attempted.iter().any(|a| a == name) {
                    continue;
                }
                if ctx.requires_privacy()
                    && candidate.capabilities().privacy_level != PrivacyLevel::Local
                {
                    continue;
                }
                if !candidate.is_available().await {
                    debug!("Skipping unavailable fallback {}", name);
                    continue;
                }

                warn!("Falling back to {} after: {}", name, last_error);
                attempted.push(name.to_string());
                match self.attempt(candidate, &op).await {
                    Ok(output) => {
                        return Ok(Generated {
                            output,
                            provider: name.to_string(),
                        });
                    }
                    Err(e) => last_error = e,
                }
            }

            warn!("All AI providers failed: attempted=[{}]", attempted.join(", "));
            Err(RouterError::AllProvidersExhausted {
                attempted,
                last_error,
            })
        }
        .instrument(span)
        .await
    }

    /// Runs one attempt under the call timeout and records its outcome.
    ///
    /// Nothing is recorded if the caller drops the future mid-attempt.
    async fn attempt<'f, T, F>(
        &self,
        provider: &Arc<dyn AiProvider>,
        op: &F,
    ) -> std::result::Result<T, ProviderError>
    where
        F: Fn(Arc<dyn AiProvider>) -> BoxFuture<'f, std::result::Result<T, ProviderError>>,
    {
        let name = provider.name();
        let timeout = self.config.call_timeout();
        let started = Instant::now();

        let result = match tokio::time::timeout(timeout, op(Arc::clone(provider))).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Transport(format!(
                "no response within {}s",
                timeout.as_secs_f64()
            ))),
        };

        match &result {
            Ok(_) => {
                let latency = started.elapsed();
                self.stats.record_success(name, latency);
                info!("AI request served by {} in {}ms", name, latency.as_millis());
            }
            Err(e) => {
                self.stats.record_failure(name, e);
                warn!("AI provider {} failed: {}", name, e);
            }
        }
        result
    }

    /// Providers after `failed` in the global chain, or the whole chain when
    /// `failed` is not part of it.
    fn fallback_after(&self, failed: &str) -> impl Iterator<Item = &Arc<dyn AiProvider>> {
        let chain = &self.config.fallback_chain;
        let start = chain
            .iter()
            .position(|name| name == failed)
            .map_or(0, |i| i + 1);
        chain[start..].iter().filter_map(|name| self.provider(name))
    }

    /// The provider's advisory daily token budget, when `ctx` estimates more
    /// than it.
    fn over_daily_budget(&self, provider: &str, ctx: &TaskContext) -> Option<u64> {
        let tokens = u64::from(ctx.estimated_tokens()?);
        let budget = self.config.quota_for(provider)?.tokens_per_day?;
        (tokens > budget).then_some(budget)
    }
}
