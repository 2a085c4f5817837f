//! Single-flight availability zone cache
//!
//! The first call to [`ZoneCache::zones`] starts exactly one lookup through
//! the [`ZoneOperations`] source. Every caller that arrives while that lookup
//! is in flight awaits the same shared future and sees the same outcome.
//! After success the list is kept for the lifetime of the cache and returned
//! without suspending.
//!
//! State machine: `Absent -> Pending -> Resolved | Failed`. With
//! [`FailurePolicy::Retry`] a failed attempt goes back to `Absent` instead,
//! so the next call starts a fresh lookup.

use super::operations::ZoneOperations;
use crate::aws::error::{AwsError, classify_anyhow_error};
use crate::config::{FailurePolicy, ZoneCacheConfig};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Zone list shared between all callers
pub type Zones = Arc<[String]>;

/// Errors observed by zone cache callers
#[derive(Debug, Clone, Error)]
pub enum ZoneError {
    /// The zone source failed; every waiter of the attempt gets the same error
    #[error("availability zone lookup failed: {0:#}")]
    Lookup(Arc<anyhow::Error>),

    /// The zone source did not answer within the configured timeout
    #[error("availability zone lookup timed out after {0:?}")]
    Timeout(Duration),

    /// Requested zone index is past the end of the resolved list
    #[error("availability zone index {index} out of range ({len} zones)")]
    OutOfRange { index: usize, len: usize },
}

impl ZoneError {
    /// Classify the underlying AWS failure, if this was a lookup error.
    pub fn aws_error(&self) -> Option<AwsError> {
        match self {
            ZoneError::Lookup(e) => Some(classify_anyhow_error(e)),
            ZoneError::Timeout(_) | ZoneError::OutOfRange { .. } => None,
        }
    }
}

/// Observable cache state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneCacheState {
    Absent,
    Pending,
    Resolved,
    Failed,
}

type Lookup = Shared<BoxFuture<'static, Result<Zones, ZoneError>>>;

enum State {
    Absent,
    Pending { attempt: u64, lookup: Lookup },
    Resolved(Zones),
    Failed(ZoneError),
}

struct Inner {
    state: State,
    /// Number of lookups started so far
    attempts: u64,
}

/// Memoized, single-flight accessor for the zones of one region
pub struct ZoneCache<Z> {
    source: Arc<Z>,
    config: ZoneCacheConfig,
    inner: Mutex<Inner>,
}

impl<Z: ZoneOperations + 'static> ZoneCache<Z> {
    pub fn new(source: Z, config: ZoneCacheConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
            inner: Mutex::new(Inner {
                state: State::Absent,
                attempts: 0,
            }),
        }
    }

    /// All zone names of the region.
    ///
    /// Starts the lookup on first use; concurrent callers join it. Once
    /// resolved this returns on its first poll.
    pub async fn zones(&self) -> Result<Zones, ZoneError> {
        let (attempt, lookup) = {
            let mut inner = self.lock();
            let in_flight = match &inner.state {
                State::Resolved(zones) => return Ok(Arc::clone(zones)),
                State::Failed(err) => return Err(err.clone()),
                State::Pending { attempt, lookup } => Some((*attempt, lookup.clone())),
                State::Absent => None,
            };

            match in_flight {
                Some(joined) => joined,
                None => {
                    inner.attempts += 1;
                    let attempt = inner.attempts;
                    let lookup = self.start_lookup(attempt);
                    inner.state = State::Pending {
                        attempt,
                        lookup: lookup.clone(),
                    };
                    debug!(attempt, "Zone cache: Absent -> Pending");
                    (attempt, lookup)
                }
            }
        };

        let result = lookup.await;
        self.settle(attempt, &result);
        result
    }

    /// The zone at `index` in the resolved list.
    pub async fn zone(&self, index: usize) -> Result<String, ZoneError> {
        let zones = self.zones().await?;
        zones.get(index).cloned().ok_or(ZoneError::OutOfRange {
            index,
            len: zones.len(),
        })
    }

    /// The resolved list, if any, without starting or awaiting a lookup.
    pub fn cached(&self) -> Option<Zones> {
        match &self.lock().state {
            State::Resolved(zones) => Some(Arc::clone(zones)),
            _ => None,
        }
    }

    pub fn state(&self) -> ZoneCacheState {
        match self.lock().state {
            State::Absent => ZoneCacheState::Absent,
            State::Pending { .. } => ZoneCacheState::Pending,
            State::Resolved(_) => ZoneCacheState::Resolved,
            State::Failed(_) => ZoneCacheState::Failed,
        }
    }

    /// The zone source this cache looks up through
    pub fn source(&self) -> &Z {
        &self.source
    }

    /// How many lookups have been started against the source
    pub fn attempts(&self) -> u64 {
        self.lock().attempts
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // No code panics while holding the lock, so a poisoned state is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_lookup(&self, attempt: u64) -> Lookup {
        let source = Arc::clone(&self.source);
        let timeout = self.config.lookup_timeout;

        async move {
            info!(attempt, "Looking up availability zones");
            let listed = match timeout {
                Some(limit) => tokio::time::timeout(limit, source.list_availability_zones())
                    .await
                    .map_err(|_| ZoneError::Timeout(limit))?,
                None => source.list_availability_zones().await,
            };
            let zones: Vec<String> = listed.map_err(|e| ZoneError::Lookup(Arc::new(e)))?;
            info!(attempt, count = zones.len(), "Availability zones resolved");
            Ok::<Zones, ZoneError>(Zones::from(zones))
        }
        .boxed()
        .shared()
    }

    /// Record the outcome of `attempt`. Only the attempt that is still
    /// pending may move the state; late waiters of older attempts are ignored.
    fn settle(&self, attempt: u64, result: &Result<Zones, ZoneError>) {
        let mut inner = self.lock();
        let is_current = matches!(
            &inner.state,
            State::Pending { attempt: pending, .. } if *pending == attempt
        );
        if !is_current {
            return;
        }

        inner.state = match result {
            Ok(zones) => {
                debug!(attempt, "Zone cache: Pending -> Resolved");
                State::Resolved(Arc::clone(zones))
            }
            Err(err) => match self.config.failure_policy {
                FailurePolicy::CacheForever => {
                    warn!(attempt, error = %err, "Zone lookup failed; caching failure");
                    State::Failed(err.clone())
                }
                FailurePolicy::Retry => {
                    warn!(attempt, error = %err, "Zone lookup failed; next call retries");
                    State::Absent
                }
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    /// Scripted zone source; each call pops the next result and waits for a
    /// permit on `gate` before answering.
    #[derive(Clone)]
    struct FakeZones {
        calls: Arc<AtomicUsize>,
        gate: Arc<Semaphore>,
        script: Arc<Mutex<VecDeque<Result<Vec<String>, String>>>>,
    }

    impl FakeZones {
        fn new(script: Vec<Result<Vec<&str>, &str>>) -> Self {
            Self::with_permits(script, Semaphore::MAX_PERMITS)
        }

        /// Same as `new`, but lookups block until `release` is called.
        fn gated(script: Vec<Result<Vec<&str>, &str>>) -> Self {
            Self::with_permits(script, 0)
        }

        fn with_permits(script: Vec<Result<Vec<&str>, &str>>, permits: usize) -> Self {
            let script = script
                .into_iter()
                .map(|r| {
                    r.map(|zs| zs.into_iter().map(String::from).collect())
                        .map_err(String::from)
                })
                .collect();
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                gate: Arc::new(Semaphore::new(permits)),
                script: Arc::new(Mutex::new(script)),
            }
        }

        fn release(&self) {
            self.gate.add_permits(1_000);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ZoneOperations for FakeZones {
        async fn list_availability_zones(&self) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _permit = self.gate.acquire().await?;
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(zones)) => Ok(zones),
                Some(Err(msg)) => Err(anyhow::anyhow!(msg)),
                None => Err(anyhow::anyhow!("script exhausted")),
            }
        }
    }

    fn cache(fake: &FakeZones, config: ZoneCacheConfig) -> ZoneCache<FakeZones> {
        ZoneCache::new(fake.clone(), config)
    }

    fn no_timeout() -> ZoneCacheConfig {
        ZoneCacheConfig {
            lookup_timeout: None,
            failure_policy: FailurePolicy::CacheForever,
        }
    }

    #[tokio::test]
    async fn concurrent_first_calls_share_one_lookup() {
        let fake = FakeZones::gated(vec![Ok(vec!["us-east-1a", "us-east-1b"])]);
        let cache = cache(&fake, no_timeout());

        let callers = futures::future::join_all((0..16).map(|_| cache.zones()));
        let release = async {
            while fake.calls() == 0 {
                tokio::task::yield_now().await;
            }
            assert_eq!(cache.state(), ZoneCacheState::Pending);
            fake.release();
        };
        let (results, ()) = tokio::join!(callers, release);

        assert_eq!(fake.calls(), 1);
        assert_eq!(cache.attempts(), 1);
        for zones in results {
            assert_eq!(&*zones.unwrap(), ["us-east-1a", "us-east-1b"]);
        }
        assert_eq!(cache.state(), ZoneCacheState::Resolved);
    }

    #[tokio::test]
    async fn resolved_zones_return_without_suspending() {
        let fake = FakeZones::new(vec![Ok(vec!["a", "b"])]);
        let cache = cache(&fake, no_timeout());
        assert!(cache.cached().is_none());

        let first = cache.zones().await.unwrap();
        let second = cache
            .zones()
            .now_or_never()
            .expect("resolved cache must not suspend")
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fake.calls(), 1);
        assert_eq!(cache.cached().as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
    }

    #[tokio::test]
    async fn zone_by_index() {
        let fake = FakeZones::new(vec![Ok(vec!["a", "b", "c"])]);
        let cache = cache(&fake, no_timeout());

        assert_eq!(cache.zone(1).await.unwrap(), "b");
        let err = cache.zone(5).await.unwrap_err();
        assert!(matches!(err, ZoneError::OutOfRange { index: 5, len: 3 }));
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn failure_is_cached_forever_by_default() {
        let fake = FakeZones::new(vec![Err("AuthFailure"), Ok(vec!["a"])]);
        let cache = cache(&fake, no_timeout());

        let first = cache.zones().await.unwrap_err();
        let second = cache.zones().await.unwrap_err();

        assert!(matches!(first, ZoneError::Lookup(_)));
        match (first, second) {
            (ZoneError::Lookup(a), ZoneError::Lookup(b)) => assert!(Arc::ptr_eq(&a, &b)),
            other => panic!("expected two lookup errors, got {other:?}"),
        }
        assert_eq!(cache.state(), ZoneCacheState::Failed);
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn all_waiters_of_a_failed_attempt_see_the_same_error() {
        let fake = FakeZones::gated(vec![Err("boom"), Ok(vec!["a"])]);
        let cache = cache(
            &fake,
            ZoneCacheConfig {
                lookup_timeout: None,
                failure_policy: FailurePolicy::Retry,
            },
        );

        let callers = futures::future::join_all((0..8).map(|_| cache.zones()));
        let release = async {
            while fake.calls() == 0 {
                tokio::task::yield_now().await;
            }
            fake.release();
        };
        let (results, ()) = tokio::join!(callers, release);

        assert_eq!(fake.calls(), 1);
        for result in results {
            let err = result.unwrap_err();
            assert!(err.to_string().contains("boom"), "unexpected error: {err}");
        }
    }

    #[tokio::test]
    async fn retry_policy_starts_a_fresh_lookup() {
        let fake = FakeZones::new(vec![Err("RequestLimitExceeded"), Ok(vec!["a", "b"])]);
        let cache = cache(
            &fake,
            ZoneCacheConfig {
                lookup_timeout: None,
                failure_policy: FailurePolicy::Retry,
            },
        );

        let err = cache.zones().await.unwrap_err();
        assert!(err.aws_error().is_some_and(|e| e.is_retryable()));
        assert_eq!(cache.state(), ZoneCacheState::Absent);

        let zones = cache.zones().await.unwrap();
        assert_eq!(&*zones, ["a", "b"]);
        assert_eq!(fake.calls(), 2);
        assert_eq!(cache.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_timeout_fails_the_attempt() {
        let fake = FakeZones::gated(vec![Ok(vec!["a"])]);
        let cache = cache(
            &fake,
            ZoneCacheConfig {
                lookup_timeout: Some(Duration::from_secs(5)),
                failure_policy: FailurePolicy::CacheForever,
            },
        );

        let err = cache.zones().await.unwrap_err();
        assert!(matches!(err, ZoneError::Timeout(d) if d == Duration::from_secs(5)));
        assert!(err.aws_error().is_none());
        assert_eq!(cache.state(), ZoneCacheState::Failed);
    }

    #[tokio::test]
    async fn dropped_first_caller_does_not_restart_lookup() {
        let fake = FakeZones::gated(vec![Ok(vec!["a"])]);
        let cache = cache(&fake, no_timeout());

        // Poll once to start the lookup, then abandon the caller.
        assert!(cache.zones().now_or_never().is_none());
        assert_eq!(cache.state(), ZoneCacheState::Pending);

        fake.release();
        assert_eq!(&*cache.zones().await.unwrap(), ["a"]);
        assert_eq!(fake.calls(), 1);
    }
}
