use parking_lot::RwLock;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::debug;


/// Availability cache shared by every provider adapter.
///
/// A fresh entry is served without probing. Once the TTL has passed, one
/// caller runs the probe while concurrent callers keep getting the stale
/// value. Only a cache that has never been filled makes callers wait.
pub struct HealthCache {
    entry: RwLock<Option<CachedHealth>>,
    refresh: Mutex<()>,
    ttl: Duration,
    probes: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
struct CachedHealth {
    available: bool,
    checked_at: Instant,
}

impl HealthCache {

    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            refresh: Mutex::new(()),
            ttl,
            probes: AtomicU64::new(0),
        }
    }


    pub async fn get_or_probe<F, Fut>(&self, probe: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        if let Some(available) = self.fresh() {
            return available;
        }

        let stale = self.last_known();
        let _guard = match self.refresh.try_lock() {
            Ok(guard) => guard,
            Err(_) => match stale {
                Some(available) => {
                    debug!("Health probe in flight, serving stale value {}", available);
                    return available;
                }
                None => self.refresh.lock().await,
            },
        };

        // Another caller may have finished a probe while we waited.
        if let Some(available) = self.fresh() {
            return available;
        }

        self.probes.fetch_add(1, Ordering::Relaxed);
        let available = probe().await;
        *self.entry.write() = Some(CachedHealth {
            available,
            checked_at: Instant::now(),
        });
        available
    }


    pub fn last_known(&self) -> Option<bool> {
        (*self.entry.read()).map(|entry| entry.available)
    }


    pub fn probe_count(&self) -> u64 {
        self.probes.load(Ordering::Relaxed)
    }


    pub fn invalidate(&self) {
        *self.entry.write() = None;
    }

    fn fresh(&self) -> Option<bool> {
        let entry = (*self.entry.read())?;
        (entry.checked_at.elapsed() < self.ttl).then_some(entry.available)
    }
}
