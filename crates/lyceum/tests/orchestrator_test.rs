//! End-to-end tests for the orchestration facade.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use lyceum::{
    AccessTier, ChatProvider, ChatRequest, ChatResponse, GenerateOptions, LyceumConfig,
    LyceumResult, MemoryQuotaStore, Message, Orchestrator, ProviderError, ProviderErrorKind,
    QuotaStore, TierQuota, TierSettings,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Provider double that fails its first `failures` calls with `status`, then
/// succeeds, recording every model requested.
struct ScriptedProvider {
    failures: AtomicUsize,
    status: u16,
    delay: std::time::Duration,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn healthy() -> Arc<Self> {
        Self::failing_first(0, 503)
    }

    fn failing_first(failures: usize, status: u16) -> Arc<Self> {
        Arc::new(Self {
            failures: AtomicUsize::new(failures),
            status,
            delay: std::time::Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn slow(delay: std::time::Duration) -> Arc<Self> {
        Arc::new(Self {
            failures: AtomicUsize::new(0),
            status: 503,
            delay,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn chat(&self, request: &ChatRequest) -> LyceumResult<ChatResponse> {
        self.calls.lock().unwrap().push(request.model.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(ProviderError::new(ProviderErrorKind::Api {
                status: self.status,
                message: "scripted failure".to_string(),
            })
            .into());
        }
        Ok(ChatResponse {
            text: format!("reply from {}", request.model),
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

fn tier(model: &str, daily: u32) -> TierSettings {
    TierSettings {
        model: model.to_string(),
        max_tokens: 1024,
        temperature: 0.7,
        daily_requests: daily,
    }
}

fn test_config() -> LyceumConfig {
    let mut config = LyceumConfig::default();
    config.rate_limit.requests_per_window = 100;
    config.rate_limit.window_seconds = 60;
    config.queue.concurrency = 2;
    config.retry.max_retries = 3;
    config.retry.initial_delay_ms = 5;
    config.retry.max_delay_ms = 20;
    config.tiers = HashMap::from([
        ("base".to_string(), tier("base-model", 50)),
        ("standard".to_string(), tier("standard-model", 500)),
        ("premium".to_string(), tier("premium-model", 2_000)),
    ]);
    config
}

fn prompt() -> Vec<Message> {
    vec![Message::user("Summarize the French Revolution.")]
}

#[tokio::test]
async fn admits_and_routes_by_entitlement_tier() {
    let provider = ScriptedProvider::healthy();
    let store = Arc::new(MemoryQuotaStore::new());
    store
        .save(
            "premium-student",
            &TierQuota {
                tier: AccessTier::Premium,
                requests_today: 0,
                reset_at: Utc::now(),
                tier_expires_at: Some(Utc::now() + ChronoDuration::days(30)),
            },
        )
        .await
        .unwrap();
    let orchestrator = Orchestrator::new(&test_config(), provider.clone(), store).unwrap();

    let completion = orchestrator
        .chat("premium-student", &prompt(), GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(completion.model_used, "premium-model");
    assert_eq!(completion.tier, AccessTier::Premium);
    assert_eq!(completion.text, "reply from premium-model");

    let summary = orchestrator.rate_limit_summary("premium-student");
    assert_eq!(summary.limit, 100);
    assert_eq!(summary.remaining, 99);
    assert_eq!(summary.retry_after_seconds, None);
}

#[tokio::test]
async fn unknown_callers_default_to_base_tier() {
    let provider = ScriptedProvider::healthy();
    let store = Arc::new(MemoryQuotaStore::new());
    let orchestrator = Orchestrator::new(&test_config(), provider, store).unwrap();

    let completion = orchestrator
        .chat("anonymous", &prompt(), GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(completion.tier, AccessTier::Base);
    assert_eq!(completion.model_used, "base-model");
}

#[tokio::test]
async fn rate_limited_requests_never_touch_quota() {
    let mut config = test_config();
    config.rate_limit.requests_per_window = 2;
    let provider = ScriptedProvider::healthy();
    let store = Arc::new(MemoryQuotaStore::new());
    let orchestrator = Orchestrator::new(&config, provider, store.clone()).unwrap();

    for _ in 0..2 {
        orchestrator
            .chat("bursty", &prompt(), GenerateOptions::default())
            .await
            .unwrap();
    }

    let error = orchestrator
        .chat("bursty", &prompt(), GenerateOptions::default())
        .await
        .unwrap_err();
    assert!(error.is_rate_limited());

    // The denial happened before the quota check, so only the two admitted
    // requests consumed quota.
    let record = store.load("bursty").await.unwrap().unwrap();
    assert_eq!(record.requests_today, 2);

    let summary = orchestrator.rate_limit_summary("bursty");
    assert_eq!(summary.remaining, 0);
    assert!(summary.retry_after_seconds.is_some());
    let headers = summary.as_headers();
    assert!(headers.iter().any(|(name, _)| *name == "retry-after"));
}

#[tokio::test]
async fn exhausted_daily_quota_is_a_typed_denial() {
    let mut config = test_config();
    if let Some(base) = config.tiers.get_mut("base") {
        base.daily_requests = 1;
    }
    let provider = ScriptedProvider::healthy();
    let store = Arc::new(MemoryQuotaStore::new());
    let orchestrator = Orchestrator::new(&config, provider, store).unwrap();

    orchestrator
        .chat("diligent", &prompt(), GenerateOptions::default())
        .await
        .unwrap();

    let error = orchestrator
        .chat("diligent", &prompt(), GenerateOptions::default())
        .await
        .unwrap_err();
    assert!(error.is_quota_denial());
    assert!(format!("{error}").contains("daily quota exceeded"));
}

#[tokio::test]
async fn expired_tier_denies_once_then_serves_base() {
    let provider = ScriptedProvider::healthy();
    let store = Arc::new(MemoryQuotaStore::new());
    store
        .save(
            "lapsed",
            &TierQuota {
                tier: AccessTier::Premium,
                requests_today: 3,
                reset_at: Utc::now(),
                tier_expires_at: Some(Utc::now() - ChronoDuration::hours(2)),
            },
        )
        .await
        .unwrap();
    let orchestrator = Orchestrator::new(&test_config(), provider.clone(), store.clone()).unwrap();

    let error = orchestrator
        .chat("lapsed", &prompt(), GenerateOptions::default())
        .await
        .unwrap_err();
    assert!(error.is_quota_denial());
    assert!(format!("{error}").contains("expired"));
    // The denied call never reached the provider.
    assert!(provider.calls().is_empty());

    // The demotion was persisted, so the next call serves the base model.
    let completion = orchestrator
        .chat("lapsed", &prompt(), GenerateOptions::default())
        .await
        .unwrap();
    assert_eq!(completion.tier, AccessTier::Base);
    assert_eq!(completion.model_used, "base-model");

    let record = store.load("lapsed").await.unwrap().unwrap();
    assert_eq!(record.tier, AccessTier::Base);
    assert_eq!(record.tier_expires_at, None);
}

#[tokio::test]
async fn transient_provider_failures_are_retried_inside_the_job() {
    let provider = ScriptedProvider::failing_first(2, 503);
    let store = Arc::new(MemoryQuotaStore::new());
    let orchestrator = Orchestrator::new(&test_config(), provider.clone(), store).unwrap();

    let completion = orchestrator
        .chat("patient", &prompt(), GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(completion.text, "reply from base-model");
    // Two transient failures, then success, all on one admitted request.
    // The caller is base-tier, so there is exactly one provider call per
    // attempt and no fallback.
    assert_eq!(provider.calls().len(), 3);
}

#[tokio::test]
async fn quota_is_consumed_even_when_the_provider_fails() {
    // A permanent (non-retryable) failure: admission already consumed one
    // unit of daily quota and the failure does not refund it. This mirrors
    // the upstream behavior of counting usage before the provider call.
    let provider = ScriptedProvider::failing_first(usize::MAX, 400);
    let store = Arc::new(MemoryQuotaStore::new());
    let orchestrator = Orchestrator::new(&test_config(), provider.clone(), store.clone()).unwrap();

    let error = orchestrator
        .chat("unlucky", &prompt(), GenerateOptions::default())
        .await
        .unwrap_err();
    assert!(format!("{error}").contains("scripted failure"));

    // No retries on a 400, and the quota unit stays spent.
    assert_eq!(provider.calls().len(), 1);
    let record = store.load("unlucky").await.unwrap().unwrap();
    assert_eq!(record.requests_today, 1);
}

#[tokio::test]
async fn shutdown_cancels_pending_jobs_only() {
    let mut config = test_config();
    config.queue.concurrency = 1;
    config.retry.max_retries = 0;
    let provider = ScriptedProvider::slow(std::time::Duration::from_millis(100));
    let store = Arc::new(MemoryQuotaStore::new());
    let orchestrator =
        Arc::new(Orchestrator::new(&config, provider, store).unwrap());

    // Fill the single slot and stack two pending jobs behind it.
    let admissions = [
        orchestrator.admit("a").await.unwrap(),
        orchestrator.admit("b").await.unwrap(),
        orchestrator.admit("c").await.unwrap(),
    ];
    let handles: Vec<_> = admissions
        .iter()
        .zip(["a", "b", "c"])
        .map(|(admission, caller)| {
            orchestrator.submit(
                admission,
                caller,
                &prompt(),
                GenerateOptions::default(),
                lyceum::JobOptions::default(),
            )
        })
        .collect();

    tokio::task::yield_now().await;
    orchestrator.shutdown();
    assert_eq!(orchestrator.queue_size(), 0);

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await);
    }
    let cancelled = outcomes
        .iter()
        .filter(|o| o.as_ref().err().is_some_and(|e| e.is_cancelled()))
        .count();
    let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
    assert_eq!(succeeded, 1, "the in-flight job runs to completion");
    assert_eq!(cancelled, 2, "pending jobs are rejected");
}
