//! Waiting for the backend to report itself operational.

use log::{debug, info, warn};

use crate::backend::Backend;
use crate::poll::{PollPolicy, Sleeper};

/// Poll the health endpoint until it reports `UP` or the budget runs out.
///
/// Transport errors and non-`UP` statuses both consume an attempt. There is no
/// wait after the final attempt. Returns whether the backend became ready.
pub async fn wait_until_ready<B, S>(backend: &B, policy: &PollPolicy, sleeper: &S) -> bool
where
    B: Backend,
    S: Sleeper,
{
    info!(
        "⏳ Waiting for the backend to become ready (up to {} attempts)",
        policy.max_attempts
    );

    let mut attempt = 0;
    while policy.has_attempts_left(attempt) {
        attempt += 1;

        match backend.system_status().await {
            Ok(status) if status.is_up() => {
                info!("✅ Backend is up (attempt {attempt}/{})", policy.max_attempts);
                if let Some(version) = &status.version {
                    debug!("   Backend version: {version}");
                }
                return true;
            }
            Ok(status) => {
                info!(
                    "   Backend status is {} (attempt {attempt}/{})",
                    status.status, policy.max_attempts
                );
            }
            Err(e) => {
                warn!(
                    "⚠️  Backend not reachable yet (attempt {attempt}/{}): {e}",
                    policy.max_attempts
                );
            }
        }

        if policy.has_attempts_left(attempt) {
            sleeper.sleep(policy.delay_after(attempt)).await;
        }
    }

    warn!(
        "❌ Backend did not become ready after {} attempts",
        policy.max_attempts
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::RecordingSleeper;
    use crate::testing::{FakeBackend, status};
    use sonarqube_api::SonarError;
    use std::time::Duration;

    fn unreachable() -> SonarError {
        SonarError::InvalidResponse("connection refused".to_string())
    }

    #[tokio::test]
    async fn test_ready_on_first_attempt() {
        let backend = FakeBackend::new();
        backend.push_status(Ok(status("UP")));
        let sleeper = RecordingSleeper::new();

        let ready = wait_until_ready(&backend, &PollPolicy::default(), &sleeper).await;

        assert!(ready);
        assert_eq!(backend.calls().len(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_ready_after_errors_and_starting() {
        let backend = FakeBackend::new();
        backend
            .push_status(Err(unreachable()))
            .push_status(Ok(status("STARTING")))
            .push_status(Ok(status("UP")));
        let sleeper = RecordingSleeper::new();
        let policy = PollPolicy::fixed(5, Duration::from_secs(10));

        assert!(wait_until_ready(&backend, &policy, &sleeper).await);
        assert_eq!(backend.calls().len(), 3);
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(10); 2]);
    }

    #[tokio::test]
    async fn test_budget_exhausted() {
        let backend = FakeBackend::new();
        for _ in 0..3 {
            backend.push_status(Ok(status("DB_MIGRATION_NEEDED")));
        }
        let sleeper = RecordingSleeper::new();
        let policy = PollPolicy::fixed(3, Duration::from_secs(2));

        assert!(!wait_until_ready(&backend, &policy, &sleeper).await);
        assert_eq!(backend.calls().len(), 3);
        // no sleep after the last attempt
        assert_eq!(sleeper.delays().len(), 2);
    }

    #[tokio::test]
    async fn test_status_match_is_exact() {
        let backend = FakeBackend::new();
        backend.push_status(Ok(status("up")));
        let sleeper = RecordingSleeper::new();
        let policy = PollPolicy::fixed(1, Duration::from_secs(1));

        assert!(!wait_until_ready(&backend, &policy, &sleeper).await);
    }
}
