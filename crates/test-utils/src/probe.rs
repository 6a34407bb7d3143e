use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use taskpool::Executable;

/// Shared counters recording how many instrumented executables are inside
/// their body at once.
///
/// Every executable built by [`ConcurrencyProbe::task`] increments the live
/// count on entry, updates the peak, sleeps, then decrements on exit.
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyProbe {
    live: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    entered: Arc<AtomicUsize>,
}

impl ConcurrencyProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest number of simultaneously running instrumented executables.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// How many instrumented executables have started so far.
    pub fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }

    /// Blocking executable that sleeps for `hold`, then succeeds with `"done"`
    /// or fails with `"failed"` when `fail` is set.
    pub fn task(&self, hold: Duration, fail: bool) -> Executable {
        let probe = self.clone();
        Executable::blocking(move || {
            let _guard = probe.enter();
            std::thread::sleep(hold);
            if fail {
                Err("failed")
            } else {
                Ok("done")
            }
        })
    }

    /// Async counterpart of [`ConcurrencyProbe::task`], using a Tokio sleep.
    pub fn async_task(&self, hold: Duration) -> Executable {
        let probe = self.clone();
        Executable::from_future(async move {
            let _guard = probe.enter();
            tokio::time::sleep(hold).await;
            Ok::<_, String>("done")
        })
    }

    fn enter(&self) -> ProbeGuard {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        ProbeGuard {
            live: Arc::clone(&self.live),
        }
    }
}

struct ProbeGuard {
    live: Arc<AtomicUsize>,
}

impl Drop for ProbeGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}
