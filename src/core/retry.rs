use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// 被重試的操作種類，用於日誌與失敗回報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAccount,
    AddToNewsletter,
    SendNotification,
    /// 透過 [`run_repeatedly`] 執行、未命名的操作
    Unnamed,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CreateAccount => "create account",
            Operation::AddToNewsletter => "add to newsletter",
            Operation::SendNotification => "send notification",
            Operation::Unnamed => "operation",
        };
        f.write_str(name)
    }
}

/// 固定次數、固定間隔的重試策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

/// 單次失敗嘗試的回報內容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    pub operation: Operation,
    pub attempt: u32,
    pub max_attempts: u32,
    pub reason: String,
}

/// 每次嘗試失敗時呼叫的回呼。不影響重試流程，也無法把錯誤傳回呼叫端。
pub type FailureHook = Arc<dyn Fn(&FailedAttempt) + Send + Sync>;

#[derive(Clone, Default)]
pub struct RetryRunner {
    policy: RetryPolicy,
    on_failure: Option<FailureHook>,
}

impl RetryRunner {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            on_failure: None,
        }
    }

    pub fn with_failure_hook(mut self, hook: FailureHook) -> Self {
        self.on_failure = Some(hook);
        self
    }

    /// 替換重試策略，保留已設定的 failure hook
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 執行 `run_func` 直到成功或用完次數。
    ///
    /// 失敗只會被記錄 (以及回報給 failure hook)，不會回傳；成功與用盡次數對呼叫端來說
    /// 無法區分。最後一次失敗之後不再等待。
    pub async fn run<F, Fut, T, E>(&self, operation: Operation, mut run_func: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        // 至少執行一次
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let reason = match run_func().await {
                Ok(_) => {
                    if attempt > 1 {
                        tracing::debug!("✅ {} succeeded on attempt {}", operation, attempt);
                    }
                    return;
                }
                Err(e) => e.to_string(),
            };

            tracing::warn!(
                "⚠️ {} failed (attempt {}/{}): {}",
                operation,
                attempt,
                max_attempts,
                reason
            );

            if let Some(hook) = &self.on_failure {
                hook(&FailedAttempt {
                    operation,
                    attempt,
                    max_attempts,
                    reason,
                });
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.policy.delay).await;
            }
        }
    }
}

impl fmt::Debug for RetryRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryRunner")
            .field("policy", &self.policy)
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

/// 以預設的 1 秒間隔執行 `run_func`，最多 `max_attempts` 次
pub async fn run_repeatedly<F, Fut, T, E>(run_func: F, max_attempts: u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    RetryRunner::new(RetryPolicy::new(max_attempts, DEFAULT_RETRY_DELAY))
        .run(Operation::Unnamed, run_func)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    fn assert_pauses(elapsed: Duration, pauses: u32, delay: Duration) {
        let expected = delay * pauses;
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(100),
            "expected {} pauses ({:?}), measured {:?}",
            pauses,
            expected,
            elapsed
        );
    }

    fn succeed_on(
        k: u32,
        calls: Arc<AtomicU32>,
    ) -> impl FnMut() -> std::future::Ready<Result<(), String>> {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < k {
                std::future::ready(Err(format!("attempt {} failed", n)))
            } else {
                std::future::ready(Ok(()))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_attempt_k_runs_k_times() {
        for k in 1..=DEFAULT_MAX_ATTEMPTS {
            let calls = Arc::new(AtomicU32::new(0));
            let start = Instant::now();

            run_repeatedly(succeed_on(k, calls.clone()), DEFAULT_MAX_ATTEMPTS).await;

            assert_eq!(calls.load(Ordering::SeqCst), k);
            assert_pauses(start.elapsed(), k - 1, DEFAULT_RETRY_DELAY);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_operation_exhausts_attempts_silently() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let counter = calls.clone();
        run_repeatedly(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>("connection refused") }
            },
            DEFAULT_MAX_ATTEMPTS,
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), DEFAULT_MAX_ATTEMPTS);
        // 最後一次失敗後不等待
        assert_pauses(start.elapsed(), DEFAULT_MAX_ATTEMPTS - 1, DEFAULT_RETRY_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_policy_delay_is_used_between_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let delay = Duration::from_millis(250);
        let runner = RetryRunner::new(RetryPolicy::new(3, delay));
        let start = Instant::now();

        runner
            .run(Operation::SendNotification, succeed_on(u32::MAX, calls.clone()))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_pauses(start.elapsed(), 2, delay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_max_attempts_still_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let runner = RetryRunner::new(RetryPolicy::new(0, DEFAULT_RETRY_DELAY));

        runner
            .run(Operation::CreateAccount, succeed_on(u32::MAX, calls.clone()))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_never_overlap() {
        let in_flight = Arc::new(AtomicBool::new(false));
        let calls = Arc::new(AtomicU32::new(0));

        let (flag, counter) = (in_flight.clone(), calls.clone());
        run_repeatedly(
            move || {
                let flag = flag.clone();
                let counter = counter.clone();
                async move {
                    assert!(!flag.swap(true, Ordering::SeqCst), "attempts overlapped");
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    flag.store(false, Ordering::SeqCst);
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 4 {
                        Err("busy")
                    } else {
                        Ok(n)
                    }
                }
            },
            DEFAULT_MAX_ATTEMPTS,
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_hook_receives_every_failed_attempt() {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = reports.clone();
        let runner = RetryRunner::new(RetryPolicy::new(4, Duration::from_millis(10)))
            .with_failure_hook(Arc::new(move |failed: &FailedAttempt| {
                sink.lock().unwrap().push(failed.clone());
            }));

        let calls = Arc::new(AtomicU32::new(0));
        runner
            .run(Operation::AddToNewsletter, succeed_on(3, calls.clone()))
            .await;

        let reports = reports.lock().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(
            reports[0],
            FailedAttempt {
                operation: Operation::AddToNewsletter,
                attempt: 1,
                max_attempts: 4,
                reason: "attempt 1 failed".to_string(),
            }
        );
        assert_eq!(reports[1].attempt, 2);
        assert_eq!(reports[1].reason, "attempt 2 failed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_policy_keeps_failure_hook() {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = reports.clone();
        let runner = RetryRunner::default()
            .with_failure_hook(Arc::new(move |failed: &FailedAttempt| {
                sink.lock().unwrap().push(failed.attempt);
            }))
            .with_policy(RetryPolicy::new(2, Duration::from_millis(10)));

        let calls = Arc::new(AtomicU32::new(0));
        runner
            .run(Operation::CreateAccount, succeed_on(u32::MAX, calls.clone()))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(*reports.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_default_policy_matches_fixed_constants() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_secs(1));
        assert_eq!(Operation::CreateAccount.to_string(), "create account");
    }
}
