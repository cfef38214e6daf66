// @awa-component: EMB-FailoverGovernor
//
//! Retry & failover governor.
//!
//! Drives one logical embedding request across the selector's candidate
//! list: bounded retries per candidate with a fixed delay between
//! attempts, immediate fall-through on non-retryable failures, and an
//! aggregated per-candidate report when everything is exhausted.
//! Cancellation is observed before each attempt, during retry sleeps, and
//! while a backend call is in flight.

use std::fmt;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ProvidersPolicy;

use super::EmbeddingError;
use super::selector::ProviderSelector;

/// A successful embedding plus the identity of the backend that produced it.
#[derive(Debug, Clone)]
pub struct EmbeddedVector {
    pub vector: Vec<f32>,
    pub model: String,
    pub provider: String,
}

/// One candidate's classified failure.
#[derive(Debug, Clone)]
pub struct CandidateFailure {
    pub provider: String,
    /// Attempts actually made against this candidate.
    pub attempts: u32,
    pub reason: String,
    pub retryable: bool,
}

/// Per-candidate failure reasons after full exhaustion.
#[derive(Debug, Clone, Default)]
pub struct FailureReport {
    pub candidates: Vec<CandidateFailure>,
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.candidates.is_empty() {
            return write!(f, "no candidates available");
        }
        let mut first = true;
        for c in &self.candidates {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{} ({} attempts): {}", c.provider, c.attempts, c.reason)?;
        }
        Ok(())
    }
}

/// Embed one text, trying candidates in selector order.
///
/// Each candidate gets up to `policy.retry_attempts` attempts; transient
/// failures sleep `policy.retry_delay_ms` between attempts, non-retryable
/// failures abandon the candidate without consuming the remaining budget.
/// The first success returns immediately.
pub async fn embed_with_failover(
    selector: &ProviderSelector,
    policy: &ProvidersPolicy,
    text: &str,
    cancel: &CancellationToken,
) -> Result<EmbeddedVector, EmbeddingError> {
    let attempts_per_candidate = policy.retry_attempts.max(1);
    let delay = Duration::from_millis(policy.retry_delay_ms);
    let mut report = FailureReport::default();

    for handle in selector.candidates() {
        let mut attempts_made = 0u32;
        let mut last_error: Option<EmbeddingError> = None;

        'attempts: for attempt in 0..attempts_per_candidate {
            if cancel.is_cancelled() {
                return Err(EmbeddingError::Cancelled);
            }
            attempts_made += 1;

            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(EmbeddingError::Cancelled),
                r = handle.backend.embed(text) => r,
            };

            match result {
                Ok(vector) => {
                    debug!(
                        provider = %handle.name,
                        attempt = attempt + 1,
                        "embedding request succeeded"
                    );
                    return Ok(EmbeddedVector {
                        vector,
                        model: handle.backend.model().to_string(),
                        provider: handle.name.clone(),
                    });
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        provider = %handle.name,
                        attempt = attempt + 1,
                        error = %e,
                        "transient backend failure"
                    );
                    last_error = Some(e);
                    if attempt + 1 < attempts_per_candidate {
                        tokio::select! {
                            _ = cancel.cancelled() => return Err(EmbeddingError::Cancelled),
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        provider = %handle.name,
                        error = %e,
                        "non-retryable backend failure, abandoning candidate"
                    );
                    last_error = Some(e);
                    break 'attempts;
                }
            }
        }

        if let Some(e) = last_error {
            report.candidates.push(CandidateFailure {
                provider: handle.name.clone(),
                attempts: attempts_made,
                retryable: e.is_retryable(),
                reason: e.to_string(),
            });
        }
    }

    Err(EmbeddingError::AllProvidersFailed(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionStrategy;
    use crate::embedding::backend::EmbeddingBackend;
    use crate::embedding::selector::ProviderHandle;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock backend with a scripted failure mode and a call counter.
    struct ScriptedBackend {
        name: String,
        calls: Arc<AtomicUsize>,
        mode: Mode,
    }

    enum Mode {
        Succeed,
        FailTransient,
        FailAuth,
    }

    #[async_trait]
    impl EmbeddingBackend for ScriptedBackend {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                Mode::Succeed => Ok(vec![0.5; 8]),
                Mode::FailTransient => Err(EmbeddingError::Timeout("scripted timeout".into())),
                Mode::FailAuth => Err(EmbeddingError::Auth("scripted bad key".into())),
            }
        }
        fn name(&self) -> &str {
            &self.name
        }
        fn model(&self) -> &str {
            "scripted-model"
        }
        fn dimensions(&self) -> usize {
            8
        }
    }

    fn scripted(name: &str, priority: u32, mode: Mode) -> (ProviderHandle, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = ProviderHandle {
            name: name.to_string(),
            priority,
            backend: Arc::new(ScriptedBackend {
                name: name.to_string(),
                calls: calls.clone(),
                mode,
            }),
        };
        (handle, calls)
    }

    fn policy(retry_attempts: u32, enable_fallback: bool) -> ProvidersPolicy {
        ProvidersPolicy {
            default_provider: "p1".to_string(),
            embedding_provider: None,
            selection_strategy: SelectionStrategy::Priority,
            enable_fallback,
            retry_attempts,
            retry_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn success_short_circuits() {
        let (p1, c1) = scripted("p1", 1, Mode::Succeed);
        let (p2, c2) = scripted("p2", 2, Mode::Succeed);
        let selector = ProviderSelector::new(vec![p1, p2], SelectionStrategy::Priority, true);

        let result =
            embed_with_failover(&selector, &policy(3, true), "text", &CancellationToken::new())
                .await
                .unwrap();

        assert_eq!(result.provider, "p1");
        assert_eq!(c1.load(Ordering::SeqCst), 1);
        assert_eq!(c2.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transient_failure_consumes_attempt_budget_then_falls_through() {
        let (p1, c1) = scripted("p1", 1, Mode::FailTransient);
        let (p2, c2) = scripted("p2", 2, Mode::Succeed);
        let selector = ProviderSelector::new(vec![p1, p2], SelectionStrategy::Priority, true);

        let result =
            embed_with_failover(&selector, &policy(3, true), "text", &CancellationToken::new())
                .await
                .unwrap();

        assert_eq!(result.provider, "p2");
        assert_eq!(c1.load(Ordering::SeqCst), 3);
        assert_eq!(c2.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_primary_attempted_exactly_once_with_single_attempt_budget() {
        let (p1, c1) = scripted("p1", 1, Mode::FailTransient);
        let (p2, _c2) = scripted("p2", 2, Mode::Succeed);
        let selector = ProviderSelector::new(vec![p1, p2], SelectionStrategy::Priority, true);
        let policy = policy(1, true);

        for _ in 0..4 {
            let result =
                embed_with_failover(&selector, &policy, "text", &CancellationToken::new())
                    .await
                    .unwrap();
            assert_eq!(result.provider, "p2");
        }
        // One attempt per request before fallthrough.
        assert_eq!(c1.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn non_retryable_failure_skips_remaining_attempts() {
        let (p1, c1) = scripted("p1", 1, Mode::FailAuth);
        let (p2, c2) = scripted("p2", 2, Mode::Succeed);
        let selector = ProviderSelector::new(vec![p1, p2], SelectionStrategy::Priority, true);

        let result =
            embed_with_failover(&selector, &policy(5, true), "text", &CancellationToken::new())
                .await
                .unwrap();

        assert_eq!(result.provider, "p2");
        // Auth failure abandons the candidate without burning the budget.
        assert_eq!(c1.load(Ordering::SeqCst), 1);
        assert_eq!(c2.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_aggregates_per_candidate_report() {
        let (p1, _) = scripted("p1", 1, Mode::FailTransient);
        let (p2, _) = scripted("p2", 2, Mode::FailAuth);
        let selector = ProviderSelector::new(vec![p1, p2], SelectionStrategy::Priority, true);

        let err =
            embed_with_failover(&selector, &policy(2, true), "text", &CancellationToken::new())
                .await
                .unwrap_err();

        let EmbeddingError::AllProvidersFailed(report) = err else {
            panic!("expected AllProvidersFailed");
        };
        assert_eq!(report.candidates.len(), 2);
        assert_eq!(report.candidates[0].provider, "p1");
        assert_eq!(report.candidates[0].attempts, 2);
        assert!(report.candidates[0].retryable);
        assert_eq!(report.candidates[1].provider, "p2");
        assert_eq!(report.candidates[1].attempts, 1);
        assert!(!report.candidates[1].retryable);
        // Display lists every candidate.
        let rendered = report.to_string();
        assert!(rendered.contains("p1 (2 attempts)"));
        assert!(rendered.contains("p2 (1 attempts)"));
    }

    #[tokio::test]
    async fn fallback_disabled_never_tries_alternates() {
        let (p1, c1) = scripted("p1", 1, Mode::FailTransient);
        let (p2, c2) = scripted("p2", 2, Mode::Succeed);
        let selector = ProviderSelector::new(vec![p1, p2], SelectionStrategy::Priority, false);

        let err =
            embed_with_failover(&selector, &policy(2, false), "text", &CancellationToken::new())
                .await
                .unwrap_err();

        assert!(matches!(err, EmbeddingError::AllProvidersFailed(_)));
        assert_eq!(c1.load(Ordering::SeqCst), 2);
        assert_eq!(c2.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn pre_cancelled_token_aborts_without_backend_calls() {
        let (p1, c1) = scripted("p1", 1, Mode::Succeed);
        let selector = ProviderSelector::new(vec![p1], SelectionStrategy::Priority, true);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = embed_with_failover(&selector, &policy(3, true), "text", &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, EmbeddingError::Cancelled));
        assert_eq!(c1.load(Ordering::SeqCst), 0);
    }
}
