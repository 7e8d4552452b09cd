//! Trailing-edge debouncing
//!
//! A `Debouncer` collapses bursts of attempts into a single invocation of
//! its operation after a quiet period:
//! - Every attempt cancels the previous timer and arms a new one
//! - Only the last attempt in a burst survives to fire, once
//! - The quiet period can be reconfigured between bursts
//!
//! A single driver task owns the timer and the operation, so attempts from
//! any thread are serialized and at most one timer is ever armed.

use crate::delay::Delay;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

/// Commands from the handle to the driver task
enum Command {
    Arm,
    Reconfigure(Delay),
    Cancel,
    Shutdown,
}

/// A scheduled-but-not-yet-fired invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    /// When the most recent attempt armed the timer
    pub armed_at: Instant,
    /// When the operation will fire unless rescheduled or cancelled
    pub deadline: Instant,
}

/// Debounces an operation behind a configurable quiet period
///
/// The operation runs on a dedicated tokio task, not on the thread that
/// called [`attempt`](Self::attempt). Dropping the handle (or calling
/// [`shutdown`](Self::shutdown)) cancels a pending invocation without
/// firing it.
pub struct Debouncer {
    tx: mpsc::UnboundedSender<Command>,
    pending: Arc<Mutex<Option<Pending>>>,
    driver: JoinHandle<()>,
}

impl Debouncer {
    /// Spawn a debouncer for `op` with the given quiet period
    ///
    /// Must be called from within a tokio runtime. An `Err` returned by
    /// `op` is logged and the debouncer keeps serving future attempts; no
    /// retry is performed. A panic in `op` kills the driver task and
    /// subsequent commands are ignored.
    pub fn spawn<F>(delay: Delay, op: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(Mutex::new(None));
        let driver = tokio::spawn(drive(rx, Arc::clone(&pending), delay, op));

        Self {
            tx,
            pending,
            driver,
        }
    }

    /// Record one attempt (e.g. a click)
    ///
    /// Cancels any pending invocation and schedules a new one a full quiet
    /// period from now. Never blocks; the operation fires later on the
    /// driver task, after `attempt` has returned, even for a zero delay.
    pub fn attempt(&self) {
        let _ = self.tx.send(Command::Arm);
    }

    /// Change the quiet period for future attempts
    ///
    /// Not retroactive: a pending invocation keeps its originally
    /// scheduled deadline. The new delay applies from the next
    /// [`attempt`](Self::attempt).
    pub fn reconfigure(&self, delay: Delay) {
        let _ = self.tx.send(Command::Reconfigure(delay));
    }

    /// Cancel any pending invocation without firing it
    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel);
    }

    /// Observe the pending invocation, if one is armed
    pub fn pending(&self) -> Option<Pending> {
        *self.pending.lock()
    }

    /// Cancel any pending invocation and stop the driver task
    pub async fn shutdown(self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Err(e) = self.driver.await {
            warn!("Debouncer driver task failed: {}", e);
        }
    }
}

/// Driver loop: one logical timer, rearmed on every attempt
async fn drive<F>(
    mut rx: mpsc::UnboundedReceiver<Command>,
    pending: Arc<Mutex<Option<Pending>>>,
    mut delay: Delay,
    mut op: F,
) where
    F: FnMut() -> anyhow::Result<()>,
{
    loop {
        let deadline = (*pending.lock()).map(|p| p.deadline);

        let cmd = match deadline {
            Some(at) => {
                // Commands win over a simultaneous expiry, so an attempt
                // landing exactly on the deadline still reschedules.
                tokio::select! {
                    biased;
                    cmd = rx.recv() => cmd,
                    _ = time::sleep_until(at) => {
                        *pending.lock() = None;
                        trace!("Quiet period elapsed, invoking operation");
                        if let Err(e) = op() {
                            warn!("Debounced operation failed: {:#}", e);
                        }
                        continue;
                    }
                }
            }
            None => rx.recv().await,
        };

        match cmd {
            Some(Command::Arm) => {
                let now = Instant::now();
                *pending.lock() = Some(Pending {
                    armed_at: now,
                    deadline: now + delay.as_duration(),
                });
                trace!("Armed invocation, firing in {}", delay);
            }
            Some(Command::Reconfigure(new_delay)) => {
                debug!("Reconfigured delay: {} -> {}", delay, new_delay);
                delay = new_delay;
            }
            Some(Command::Cancel) => {
                if pending.lock().take().is_some() {
                    debug!("Cancelled pending invocation");
                }
            }
            // Shutdown or handle dropped: a pending invocation never fires
            Some(Command::Shutdown) | None => {
                if pending.lock().take().is_some() {
                    debug!("Stopped with a pending invocation, dropped unfired");
                }
                break;
            }
        }
    }
}

/// Non-debounced passthrough: every attempt invokes the operation
/// immediately, on the caller's thread
///
/// Exists for comparison and testing against the debounced path. No state,
/// no scheduling; operation errors go straight back to the caller.
pub struct Direct<F> {
    op: F,
}

impl<F> Direct<F>
where
    F: FnMut() -> anyhow::Result<()>,
{
    /// Wrap an operation for direct invocation
    pub fn new(op: F) -> Self {
        Self { op }
    }

    /// Invoke the operation synchronously
    pub fn attempt(&mut self) -> anyhow::Result<()> {
        (self.op)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    // Paused-clock tests: sleeps auto-advance the runtime clock, and the
    // driver task always drains its channel before the clock moves.

    fn counting_op(counter: &Arc<AtomicU64>) -> impl FnMut() -> anyhow::Result<()> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_fires_once_delay_after_last_attempt() {
        let counter = Arc::new(AtomicU64::new(0));
        let debouncer = Debouncer::spawn(Delay::from_millis(100), counting_op(&counter));

        // Attempts at t=0, 30, 60, 90
        for _ in 0..3 {
            debouncer.attempt();
            time::sleep(Duration::from_millis(30)).await;
        }
        debouncer.attempt();

        // t=189: one tick short of the t=190 deadline
        time::sleep(Duration::from_millis(99)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        // t=191: fired exactly once
        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        debouncer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_attempts_fire_once_each() {
        let counter = Arc::new(AtomicU64::new(0));
        let debouncer = Debouncer::spawn(Delay::from_millis(50), counting_op(&counter));

        debouncer.attempt();
        time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        debouncer.attempt();
        time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        debouncer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_pending_fire() {
        let counter = Arc::new(AtomicU64::new(0));
        let debouncer = Debouncer::spawn(Delay::from_millis(100), counting_op(&counter));

        debouncer.attempt();
        time::sleep(Duration::from_millis(50)).await;
        debouncer.cancel();

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(debouncer.pending().is_none());

        debouncer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_fires_async_not_inline() {
        let counter = Arc::new(AtomicU64::new(0));
        let debouncer = Debouncer::spawn(Delay::ZERO, counting_op(&counter));

        debouncer.attempt();
        // Not fired synchronously with attempt()
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        debouncer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn reconfigure_while_idle_applies_to_next_burst() {
        let counter = Arc::new(AtomicU64::new(0));
        let debouncer = Debouncer::spawn(Delay::from_millis(500), counting_op(&counter));

        debouncer.reconfigure(Delay::from_millis(50));
        debouncer.attempt();

        time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        debouncer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn reconfigure_does_not_rearm_pending() {
        let counter = Arc::new(AtomicU64::new(0));
        let debouncer = Debouncer::spawn(Delay::from_millis(100), counting_op(&counter));

        debouncer.attempt();
        time::sleep(Duration::from_millis(10)).await;

        // Mid-flight reconfigure: the t=100 deadline must survive
        debouncer.reconfigure(Delay::from_millis(1000));
        time::sleep(Duration::from_millis(95)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        // The next burst uses the new delay
        debouncer.attempt();
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        debouncer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn operation_failure_keeps_debouncer_alive() {
        let calls = Arc::new(AtomicU64::new(0));
        let op = {
            let calls = Arc::clone(&calls);
            move || {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    anyhow::bail!("first invocation fails");
                }
                Ok(())
            }
        };
        let debouncer = Debouncer::spawn(Delay::from_millis(10), op);

        debouncer.attempt();
        time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Failure left the loop serving attempts
        debouncer.attempt();
        time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        debouncer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn pending_reports_armed_deadline() {
        let counter = Arc::new(AtomicU64::new(0));
        let debouncer = Debouncer::spawn(Delay::from_millis(100), counting_op(&counter));

        assert!(debouncer.pending().is_none());

        debouncer.attempt();
        time::sleep(Duration::from_millis(1)).await;

        let pending = debouncer.pending().expect("invocation should be armed");
        assert_eq!(pending.deadline - pending.armed_at, Duration::from_millis(100));

        time::sleep(Duration::from_millis(150)).await;
        assert!(debouncer.pending().is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        debouncer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending() {
        let counter = Arc::new(AtomicU64::new(0));
        let debouncer = Debouncer::spawn(Delay::from_millis(100), counting_op(&counter));

        debouncer.attempt();
        time::sleep(Duration::from_millis(10)).await;
        debouncer.shutdown().await;

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels_pending() {
        let counter = Arc::new(AtomicU64::new(0));
        let debouncer = Debouncer::spawn(Delay::from_millis(50), counting_op(&counter));

        debouncer.attempt();
        drop(debouncer);

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_attempts_collapse_to_one_fire() {
        let counter = Arc::new(AtomicU64::new(0));
        let debouncer = Arc::new(Debouncer::spawn(
            Delay::from_millis(100),
            counting_op(&counter),
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let debouncer = Arc::clone(&debouncer);
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    debouncer.attempt();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Storm is over well before the quiet period elapses
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn direct_invokes_synchronously() {
        let count = std::cell::Cell::new(0u64);
        let mut direct = Direct::new(|| {
            count.set(count.get() + 1);
            Ok(())
        });

        direct.attempt().unwrap();
        direct.attempt().unwrap();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn direct_propagates_operation_errors() {
        let mut direct = Direct::new(|| anyhow::bail!("save failed"));
        assert!(direct.attempt().is_err());
    }
}
