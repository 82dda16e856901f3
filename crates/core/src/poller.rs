//! Generic poll loop for asynchronous control-plane operations
//!
//! Every mutating action returns before the cluster has changed. The
//! [`Poller`] turns that into a synchronous result: it sleeps, probes the
//! current state and evaluates the probe's verdict until the operation
//! reaches a terminal state or the deadline passes.
//!
//! Transient probe failures (5xx, throttling, network) are absorbed up to
//! a fixed number of consecutive occurrences, each followed by a shorter
//! backoff. Anything else propagates on first sight.

use std::future::Future;
use std::time::Duration;

use dbaas_domain::{DbaasError, PollPolicy, PollingConfig, Result};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Verdict of one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep<T> {
    /// Terminal condition reached; carries the extracted value
    Ready(T),
    /// Keep waiting
    Pending,
    /// The control plane reported a terminal failure
    Failed(String),
}

/// Fixed-interval poller with a deadline and transient-retry budget
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    policy: PollPolicy,
    transient_retries: u32,
    retry_backoff: Duration,
}

impl Poller {
    pub const fn new(policy: PollPolicy, transient_retries: u32, retry_backoff: Duration) -> Self {
        Self { policy, transient_retries, retry_backoff }
    }

    /// Poller for `policy` with the retry budget from `polling`
    pub const fn with_config(policy: PollPolicy, polling: &PollingConfig) -> Self {
        Self::new(policy, polling.transient_retries, polling.retry_backoff)
    }

    pub const fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Probe until [`PollStep::Ready`], a failure, or the deadline
    ///
    /// The deadline is checked before each sleep, so a run never gives up
    /// before `policy.timeout` has elapsed. A successful or pending probe
    /// resets the transient failure counter.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut probe: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<PollStep<T>>>,
    {
        let started = Instant::now();
        let mut delay = self.policy.interval;
        let mut consecutive_failures: u32 = 0;
        let mut attempt: u32 = 0;

        loop {
            let waited = started.elapsed();
            if waited >= self.policy.timeout {
                warn!(operation, waited_secs = waited.as_secs_f64(), "poll_timeout");
                return Err(DbaasError::Timeout { operation: operation.to_string(), waited });
            }

            sleep(delay).await;
            attempt += 1;

            match probe().await {
                Ok(PollStep::Ready(value)) => {
                    info!(
                        operation,
                        attempt,
                        elapsed_secs = started.elapsed().as_secs_f64(),
                        "poll_completed"
                    );
                    return Ok(value);
                }
                Ok(PollStep::Pending) => {
                    debug!(operation, attempt, "poll_pending");
                    consecutive_failures = 0;
                    delay = self.policy.interval;
                }
                Ok(PollStep::Failed(reason)) => {
                    warn!(operation, attempt, reason = %reason, "poll_observed_failure");
                    return Err(DbaasError::OperationFailed(format!("{operation}: {reason}")));
                }
                Err(err) if err.is_transient() => {
                    consecutive_failures += 1;
                    if consecutive_failures > self.transient_retries {
                        return Err(DbaasError::RetriesExhausted {
                            operation: operation.to_string(),
                            attempts: consecutive_failures,
                            last_error: err.to_string(),
                        });
                    }
                    warn!(
                        operation,
                        attempt,
                        consecutive_failures,
                        error = %err,
                        "poll_transient_error"
                    );
                    delay = self.retry_backoff;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    fn poller(interval_secs: u64, timeout_secs: u64) -> Poller {
        Poller::new(
            PollPolicy::new(Duration::from_secs(interval_secs), Duration::from_secs(timeout_secs)),
            3,
            Duration::from_secs(10),
        )
    }

    /// Probe that replays a fixed script and counts calls
    #[derive(Clone)]
    struct Script {
        steps: Arc<Mutex<VecDeque<Result<PollStep<u32>>>>>,
        calls: Arc<Mutex<u32>>,
    }

    impl Script {
        fn new(steps: Vec<Result<PollStep<u32>>>) -> Self {
            Self {
                steps: Arc::new(Mutex::new(steps.into())),
                calls: Arc::new(Mutex::new(0)),
            }
        }

        async fn next(&self) -> Result<PollStep<u32>> {
            *self.calls.lock() += 1;
            self.steps.lock().pop_front().unwrap_or(Ok(PollStep::Pending))
        }

        fn calls(&self) -> u32 {
            *self.calls.lock()
        }
    }

    fn server_error() -> Result<PollStep<u32>> {
        Err(DbaasError::Server("502 bad gateway".into()))
    }

    #[tokio::test(start_paused = true)]
    async fn returns_the_nth_observation_within_n_intervals() {
        let script = Script::new(vec![
            Ok(PollStep::Pending),
            Ok(PollStep::Pending),
            Ok(PollStep::Ready(42)),
            Ok(PollStep::Ready(7)),
        ]);
        let started = Instant::now();

        let value = poller(60, 25 * 60).run("extend_disk", || script.next()).await.unwrap();

        assert_eq!(value, 42);
        assert_eq!(script.calls(), 3);
        assert!(started.elapsed() <= Duration::from_secs(3 * 60));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_after_the_deadline_and_not_before() {
        let script = Script::new(Vec::new());
        let started = Instant::now();

        let err = poller(10, 60).run("change_bandwidth", || script.next()).await.unwrap_err();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(60), "gave up early: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(70));
        match err {
            DbaasError::Timeout { operation, waited } => {
                assert_eq!(operation, "change_bandwidth");
                assert!(waited >= Duration::from_secs(60));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(script.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn absorbs_three_transient_failures_then_succeeds() {
        let script = Script::new(vec![
            server_error(),
            Err(DbaasError::Network("connection reset".into())),
            server_error(),
            Ok(PollStep::Ready(1)),
        ]);

        let value = poller(60, 25 * 60).run("create_cluster", || script.next()).await.unwrap();

        assert_eq!(value, 1);
        assert_eq!(script.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn fourth_consecutive_transient_failure_escalates() {
        let script = Script::new(vec![server_error(), server_error(), server_error(), server_error()]);

        let err = poller(60, 25 * 60).run("delete_cluster", || script.next()).await.unwrap_err();

        match err {
            DbaasError::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 4),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(script.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_observation_resets_the_failure_budget() {
        let script = Script::new(vec![
            server_error(),
            server_error(),
            server_error(),
            Ok(PollStep::Pending),
            server_error(),
            server_error(),
            server_error(),
            Ok(PollStep::Ready(5)),
        ]);

        let value = poller(60, 25 * 60).run("resize", || script.next()).await.unwrap();
        assert_eq!(value, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_retries_use_the_shorter_backoff() {
        let script = Script::new(vec![server_error(), Ok(PollStep::Ready(3))]);
        let started = Instant::now();

        poller(60, 25 * 60).run("add_nodes", || script.next()).await.unwrap();

        assert_eq!(started.elapsed(), Duration::from_secs(70));
    }

    #[tokio::test(start_paused = true)]
    async fn client_errors_are_never_retried() {
        let script = Script::new(vec![Err(DbaasError::UnexpectedStatus {
            action: "get_order".into(),
            expected: 200,
            actual: 404,
            body: "not found".into(),
        })]);

        let err = poller(60, 25 * 60).run("get_order", || script.next()).await.unwrap_err();

        assert!(matches!(err, DbaasError::UnexpectedStatus { actual: 404, .. }));
        assert_eq!(script.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn observed_failure_is_terminal() {
        let script = Script::new(vec![Ok(PollStep::Failed("order status error".into()))]);

        let err = poller(60, 25 * 60).run("create_user", || script.next()).await.unwrap_err();

        assert!(matches!(err, DbaasError::OperationFailed(ref msg) if msg.contains("order status error")));
    }
}
