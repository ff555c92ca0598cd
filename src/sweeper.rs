//! Background expiry sweeper
//!
//! A sweeper wakes once per cleanup interval, takes the store's write lock and
//! drops every entry older than that interval. It is cancelled through a
//! [`CancellationToken`] and is never joined: the task only holds a weak
//! reference to the map, and exits by itself once the last store handle is
//! gone.
//!
//! Each sweeper owns a detached thread driving its own current-thread
//! runtime, so it keeps ticking whatever the caller's runtime does (dropped,
//! blocked, or built without a time driver).

use crate::store::MemoryStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Lifecycle of a store's sweeper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweeperState {
    /// No sweeper was configured; entries never expire on their own
    Inactive,
    /// Sweeping on every interval
    Active,
    /// Stopped for good
    Terminated,
}

/// Handle to a (possibly absent) background sweeper
#[derive(Debug, Clone)]
pub(crate) struct Sweeper {
    interval: Duration,
    token: Option<CancellationToken>,

    /// Cleared by the sweeper thread when its loop exits, for any reason
    alive: Arc<AtomicBool>,
}

/// Marks the sweeper dead when the thread unwinds or returns
struct AliveGuard(Arc<AtomicBool>);

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Sweeper {
    /// A handle with no background task
    pub(crate) fn inactive() -> Self {
        Sweeper {
            interval: Duration::ZERO,
            token: None,
            alive: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start sweeping `map` every `interval`
    ///
    /// A zero interval yields an inactive handle.
    pub(crate) fn start(map: Weak<RwLock<MemoryStore>>, interval: Duration) -> Self {
        if interval.is_zero() {
            return Self::inactive();
        }

        let token = CancellationToken::new();
        let task_token = token.clone();
        let alive = Arc::new(AtomicBool::new(true));
        let guard = AliveGuard(alive.clone());

        let spawned = std::thread::Builder::new()
            .name("dream-sweeper".to_string())
            .spawn(move || {
                let _guard = guard;

                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!("Failed to create sweeper runtime: {}", e);
                        return;
                    }
                };

                runtime.block_on(run(map, interval, task_token));
            });

        if let Err(e) = spawned {
            error!("Failed to spawn sweeper thread: {}", e);
            return Self::inactive();
        }

        info!("Expiry sweeper started (interval {:?})", interval);

        Sweeper {
            interval,
            token: Some(token),
            alive,
        }
    }

    /// Configured interval, zero when inactive
    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }

    /// Current lifecycle state
    pub(crate) fn state(&self) -> SweeperState {
        match &self.token {
            None => SweeperState::Inactive,
            Some(token) if token.is_cancelled() => SweeperState::Terminated,
            Some(_) if !self.alive.load(Ordering::Acquire) => SweeperState::Terminated,
            Some(_) => SweeperState::Active,
        }
    }

    /// Signal the sweeper to stop
    ///
    /// A sweep already in progress finishes; no further sweep starts. Safe to
    /// call repeatedly, and a no-op on an inactive handle.
    pub(crate) fn stop(&self) {
        if let Some(token) = &self.token {
            if !token.is_cancelled() {
                info!("Stopping expiry sweeper");
                token.cancel();
            }
        }
    }
}

/// The sweep loop
///
/// The first sweep happens one full interval after the loop starts.
/// Cancellation is checked before every wait so a stop that races with a tick
/// always wins.
async fn run(map: Weak<RwLock<MemoryStore>>, interval: Duration, token: CancellationToken) {
    let start = tokio::time::Instant::now() + interval;
    let mut ticker = tokio::time::interval_at(start, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => {
                debug!("Expiry sweeper cancelled");
                break;
            }

            _ = ticker.tick() => {
                let Some(store) = map.upgrade() else {
                    debug!("Store dropped, expiry sweeper exiting");
                    break;
                };

                let removed = sweep(&store, interval, Instant::now());
                if removed > 0 {
                    debug!("Expiry sweep removed {} keys", removed);
                }
            }
        }
    }
}

/// One full pass over the map under the write lock
fn sweep(map: &RwLock<MemoryStore>, max_age: Duration, now: Instant) -> usize {
    let mut store = map.write().unwrap_or_else(PoisonError::into_inner);
    store.purge_older_than(max_age, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Value;
    use std::thread;
    use tokio_test::{assert_pending, assert_ready, task};

    fn shared_map() -> Arc<RwLock<MemoryStore>> {
        Arc::new(RwLock::new(MemoryStore::new()))
    }

    /// Poll `cond` until it holds or `limit` elapses
    fn wait_for(limit: Duration, cond: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + limit;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    #[test]
    fn test_zero_interval_is_inactive() {
        let map = shared_map();
        let sweeper = Sweeper::start(Arc::downgrade(&map), Duration::ZERO);

        assert_eq!(sweeper.state(), SweeperState::Inactive);
        assert_eq!(sweeper.interval(), Duration::ZERO);

        sweeper.stop();
        assert_eq!(sweeper.state(), SweeperState::Inactive);
    }

    #[test]
    fn test_stop_terminates_once() {
        let map = shared_map();
        let sweeper = Sweeper::start(Arc::downgrade(&map), Duration::from_secs(1));
        assert_eq!(sweeper.state(), SweeperState::Active);

        sweeper.stop();
        assert_eq!(sweeper.state(), SweeperState::Terminated);

        sweeper.stop();
        assert_eq!(sweeper.state(), SweeperState::Terminated);
    }

    #[test]
    fn test_sweep_removes_only_old_entries() {
        let map = shared_map();
        map.write().unwrap().put("k", Value::from(1i32));
        let now = Instant::now();

        assert_eq!(sweep(&map, Duration::from_secs(1), now), 0);
        assert_eq!(sweep(&map, Duration::from_secs(1), now + Duration::from_millis(1500)), 1);
        assert!(!map.read().unwrap().exists("k"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_for_first_interval() {
        let map = shared_map();
        let token = CancellationToken::new();

        let mut loop_task = task::spawn(run(
            Arc::downgrade(&map),
            Duration::from_secs(1),
            token.clone(),
        ));
        assert_pending!(loop_task.poll());

        token.cancel();
        assert_ready!(loop_task.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exits_when_store_dropped() {
        let map = shared_map();
        let weak = Arc::downgrade(&map);
        drop(map);

        let interval = Duration::from_millis(10);
        let mut loop_task = task::spawn(run(weak, interval, CancellationToken::new()));
        assert_pending!(loop_task.poll());

        tokio::time::advance(interval).await;
        assert_ready!(loop_task.poll());
    }

    #[test]
    fn test_sweeps_without_ambient_runtime() {
        let map = shared_map();
        map.write().unwrap().put("k", Value::from(true));

        let sweeper = Sweeper::start(Arc::downgrade(&map), Duration::from_millis(5));
        assert_eq!(sweeper.state(), SweeperState::Active);

        assert!(wait_for(Duration::from_secs(2), || !map.read().unwrap().exists("k")));

        sweeper.stop();
    }

    #[test]
    fn test_state_reports_exited_loop() {
        let map = shared_map();
        let sweeper = Sweeper::start(Arc::downgrade(&map), Duration::from_millis(5));
        assert_eq!(sweeper.state(), SweeperState::Active);

        // Without any store handle the loop exits on its next tick.
        drop(map);

        assert!(wait_for(Duration::from_secs(2), || {
            sweeper.state() == SweeperState::Terminated
        }));
    }

    #[test]
    fn test_sweeper_outlives_callers_runtime() {
        let map = shared_map();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let sweeper = rt.block_on(async {
            Sweeper::start(Arc::downgrade(&map), Duration::from_millis(5))
        });
        drop(rt);

        map.write().unwrap().put("k", Value::from(true));

        assert!(wait_for(Duration::from_secs(2), || !map.read().unwrap().exists("k")));
        assert_eq!(sweeper.state(), SweeperState::Active);

        sweeper.stop();
    }

    #[test]
    fn test_sweeps_under_runtime_without_time_driver() {
        let map = shared_map();
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();

        let sweeper = rt.block_on(async {
            Sweeper::start(Arc::downgrade(&map), Duration::from_millis(5))
        });
        map.write().unwrap().put("k", Value::from(true));

        assert!(wait_for(Duration::from_secs(2), || !map.read().unwrap().exists("k")));
        assert_eq!(sweeper.state(), SweeperState::Active);

        sweeper.stop();
    }
}
