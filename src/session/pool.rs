//! Session pool with usage-quota recycling
//!
//! Automation sessions are the scarce, heavyweight resource in this system:
//! expensive to create and prone to accumulating memory the longer they live.
//! The pool bounds both problems. A semaphore caps how many sessions can be
//! leased at once, and a per-session usage counter tears a session down once
//! it has served its quota, so a long run never rides a single aging session.
//! Replacements are constructed lazily on the next acquire.

use crate::session::driver::{DriverError, DriverFactory, SessionDriver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

/// Errors that can occur acquiring a session from the pool
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Session pool exhausted: no session available within {0:?}")]
    Exhausted(Duration),

    #[error("Failed to construct automation session: {source}")]
    Construction {
        /// True when no session is live anywhere, so no worker can proceed
        fatal: bool,
        #[source]
        source: DriverError,
    },

    #[error("Session pool is shut down")]
    Closed,
}

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// A constructed session waiting in the idle list
struct PooledSession {
    driver: Box<dyn SessionDriver>,
    uses: u32,
}

/// An exclusive lease on one automation session
///
/// The lease holds the pool permit for its slot; returning it through
/// [`SessionPool::release`] frees the slot for the next worker.
pub struct SessionLease {
    driver: Box<dyn SessionDriver>,
    uses: u32,
    _permit: OwnedSemaphorePermit,
}

impl SessionLease {
    /// Mutable access to the leased driver
    pub fn driver_mut(&mut self) -> &mut dyn SessionDriver {
        self.driver.as_mut()
    }
}

/// Bounded pool of automation sessions
///
/// `acquire`/`release` are safe under concurrent calls; the idle list and the
/// live count are the only shared state and both sit behind the pool's own
/// synchronization.
pub struct SessionPool {
    factory: Arc<dyn DriverFactory>,
    usage_quota: u32,
    lease_timeout: Duration,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<PooledSession>>,
    live: AtomicUsize,
}

impl SessionPool {
    /// Creates a new pool
    ///
    /// # Arguments
    ///
    /// * `factory` - Constructs sessions on demand
    /// * `capacity` - Maximum number of concurrently leased sessions
    /// * `usage_quota` - Uses after which a session is torn down and replaced
    /// * `lease_timeout` - How long `acquire` waits for a free slot
    pub fn new(
        factory: Arc<dyn DriverFactory>,
        capacity: usize,
        usage_quota: u32,
        lease_timeout: Duration,
    ) -> Self {
        Self {
            factory,
            usage_quota,
            lease_timeout,
            permits: Arc::new(Semaphore::new(capacity)),
            idle: Mutex::new(Vec::with_capacity(capacity)),
            live: AtomicUsize::new(0),
        }
    }

    /// Acquires a session, waiting at most the configured lease timeout
    ///
    /// Reuses an idle session when one exists, otherwise constructs a fresh
    /// one through the factory. Transient construction failure is retried
    /// once before surfacing.
    pub async fn acquire(&self) -> PoolResult<SessionLease> {
        let permit =
            match tokio::time::timeout(self.lease_timeout, self.permits.clone().acquire_owned())
                .await
            {
                Ok(Ok(permit)) => permit,
                Ok(Err(_)) => return Err(PoolError::Closed),
                Err(_) => return Err(PoolError::Exhausted(self.lease_timeout)),
            };

        if let Some(session) = self.idle.lock().await.pop() {
            tracing::trace!("Reusing idle session ({} prior uses)", session.uses);
            return Ok(SessionLease {
                driver: session.driver,
                uses: session.uses,
                _permit: permit,
            });
        }

        let driver = self.construct_with_retry().await?;
        self.live.fetch_add(1, Ordering::SeqCst);

        Ok(SessionLease {
            driver,
            uses: 0,
            _permit: permit,
        })
    }

    /// Returns a session to the pool
    ///
    /// Marking the lease `used` advances its usage counter. A session that
    /// has reached the quota is closed instead of going back on the idle
    /// list; its replacement is constructed lazily by a later `acquire`.
    pub async fn release(&self, lease: SessionLease, used: bool) {
        let SessionLease {
            mut driver,
            mut uses,
            _permit,
        } = lease;

        if used {
            uses += 1;
        }

        if uses >= self.usage_quota {
            tracing::debug!("Recycling session after {} uses", uses);
            if let Err(e) = driver.close().await {
                tracing::warn!("Error closing recycled session: {}", e);
            }
            self.live.fetch_sub(1, Ordering::SeqCst);
        } else {
            self.idle.lock().await.push(PooledSession { driver, uses });
        }
        // permit drops here, freeing the slot
    }

    /// Closes every idle session
    ///
    /// Called at end of run; leased sessions are closed through `release`.
    pub async fn shutdown(&self) {
        let mut idle = self.idle.lock().await;
        let count = idle.len();
        for mut session in idle.drain(..) {
            if let Err(e) = session.driver.close().await {
                tracing::warn!("Error closing session during shutdown: {}", e);
            }
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
        if count > 0 {
            tracing::debug!("Closed {} idle sessions", count);
        }
    }

    /// Number of constructed sessions currently alive (idle or leased)
    pub fn live_sessions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    async fn construct_with_retry(&self) -> PoolResult<Box<dyn SessionDriver>> {
        match self.factory.create().await {
            Ok(driver) => Ok(driver),
            Err(first) => {
                tracing::warn!("Session construction failed, retrying once: {}", first);
                match self.factory.create().await {
                    Ok(driver) => Ok(driver),
                    Err(second) => Err(PoolError::Construction {
                        fatal: self.live.load(Ordering::SeqCst) == 0,
                        source: second,
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::driver::{DriverResult, Locator};
    use async_trait::async_trait;

    struct NullDriver {
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SessionDriver for NullDriver {
        async fn navigate(&mut self, _url: &str) -> DriverResult<()> {
            Ok(())
        }

        async fn wait_for_element(
            &mut self,
            _locator: &Locator,
            _timeout: Duration,
        ) -> DriverResult<()> {
            Ok(())
        }

        async fn click(&mut self, _locator: &Locator, _timeout: Duration) -> DriverResult<()> {
            Ok(())
        }

        async fn element_text(
            &mut self,
            _locator: &Locator,
            _timeout: Duration,
        ) -> DriverResult<String> {
            Ok(String::new())
        }

        async fn close(&mut self) -> DriverResult<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Factory that counts constructions and can fail the first N of them
    struct CountingFactory {
        created: Arc<AtomicUsize>,
        closed: Arc<AtomicUsize>,
        fail_first: AtomicUsize,
    }

    impl CountingFactory {
        fn new(fail_first: usize) -> Self {
            Self {
                created: Arc::new(AtomicUsize::new(0)),
                closed: Arc::new(AtomicUsize::new(0)),
                fail_first: AtomicUsize::new(fail_first),
            }
        }
    }

    #[async_trait]
    impl DriverFactory for CountingFactory {
        async fn create(&self) -> DriverResult<Box<dyn SessionDriver>> {
            if self.fail_first.load(Ordering::SeqCst) > 0 {
                self.fail_first.fetch_sub(1, Ordering::SeqCst);
                return Err(DriverError::SessionCreate("boom".to_string()));
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(NullDriver {
                closed: self.closed.clone(),
            }))
        }
    }

    fn test_pool(factory: Arc<CountingFactory>, capacity: usize, quota: u32) -> SessionPool {
        SessionPool::new(factory, capacity, quota, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_acquire_constructs_lazily() {
        let factory = Arc::new(CountingFactory::new(0));
        let pool = test_pool(factory.clone(), 2, 5);

        assert_eq!(pool.live_sessions(), 0);
        let lease = pool.acquire().await.unwrap();
        assert_eq!(pool.live_sessions(), 1);
        assert_eq!(factory.created.load(Ordering::SeqCst), 1);

        pool.release(lease, true).await;
        assert_eq!(pool.live_sessions(), 1);
    }

    #[tokio::test]
    async fn test_idle_session_is_reused() {
        let factory = Arc::new(CountingFactory::new(0));
        let pool = test_pool(factory.clone(), 2, 5);

        let lease = pool.acquire().await.unwrap();
        pool.release(lease, true).await;

        let lease = pool.acquire().await.unwrap();
        pool.release(lease, true).await;

        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_quota_recycles_session() {
        let factory = Arc::new(CountingFactory::new(0));
        let pool = test_pool(factory.clone(), 1, 2);

        for _ in 0..2 {
            let lease = pool.acquire().await.unwrap();
            pool.release(lease, true).await;
        }

        // Second release hit the quota: session closed, none idle
        assert_eq!(factory.closed.load(Ordering::SeqCst), 1);
        assert_eq!(pool.live_sessions(), 0);

        // Next acquire constructs a replacement
        let lease = pool.acquire().await.unwrap();
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
        pool.release(lease, false).await;
    }

    #[tokio::test]
    async fn test_unused_release_does_not_advance_quota() {
        let factory = Arc::new(CountingFactory::new(0));
        let pool = test_pool(factory.clone(), 1, 1);

        let lease = pool.acquire().await.unwrap();
        pool.release(lease, false).await;

        assert_eq!(factory.closed.load(Ordering::SeqCst), 0);
        assert_eq!(pool.live_sessions(), 1);
    }

    #[tokio::test]
    async fn test_lease_timeout_yields_exhausted() {
        let factory = Arc::new(CountingFactory::new(0));
        let pool = test_pool(factory.clone(), 1, 5);

        let held = pool.acquire().await.unwrap();
        let result = pool.acquire().await;
        assert!(matches!(result, Err(PoolError::Exhausted(_))));

        pool.release(held, false).await;
    }

    #[tokio::test]
    async fn test_construction_retried_once() {
        let factory = Arc::new(CountingFactory::new(1));
        let pool = test_pool(factory.clone(), 1, 5);

        let lease = pool.acquire().await.unwrap();
        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
        pool.release(lease, false).await;
    }

    #[tokio::test]
    async fn test_construction_failure_fatal_when_pool_empty() {
        let factory = Arc::new(CountingFactory::new(2));
        let pool = test_pool(factory.clone(), 1, 5);

        match pool.acquire().await {
            Err(PoolError::Construction { fatal, .. }) => assert!(fatal),
            other => panic!("expected construction failure, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_shutdown_closes_idle_sessions() {
        let factory = Arc::new(CountingFactory::new(0));
        let pool = test_pool(factory.clone(), 2, 5);

        let a = pool.acquire().await.unwrap();
        let b = pool.acquire().await.unwrap();
        pool.release(a, true).await;
        pool.release(b, true).await;

        pool.shutdown().await;
        assert_eq!(factory.closed.load(Ordering::SeqCst), 2);
        assert_eq!(pool.live_sessions(), 0);
    }
}
