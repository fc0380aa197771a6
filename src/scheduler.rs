//! Periodic re-invocation of a prediction job
//!
//! Runs are strictly sequential: the next tick is only awaited once the
//! current job has finished, and ticks missed while a job was running are
//! skipped rather than replayed. Shutdown is a `watch` flag that also drops an
//! in-flight job once it reads true.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Fixed-cadence runner
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    period: Duration,
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Call `job` with the run number on every tick until `shutdown` flips to
    /// true (or its sender is dropped). Failed runs are logged and the loop
    /// continues. Returns the number of runs that completed.
    pub async fn run<F, Fut>(&self, mut shutdown: watch::Receiver<bool>, mut job: F) -> u64
    where
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut completed = 0u64;

        info!("Scheduler started, period {:?}", self.period);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let run = completed + 1;
            debug!("Starting run {}", run);

            let job_fut = job(run);
            tokio::pin!(job_fut);

            let result = loop {
                tokio::select! {
                    biased;
                    result = &mut job_fut => break Some(result),
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break None;
                        }
                    }
                }
            };

            match result {
                Some(result) => {
                    completed = run;
                    if let Err(e) = result {
                        error!("Run {} failed: {:#}", run, e);
                    }
                }
                None => {
                    warn!("Shutdown during run {}, abandoning it", run);
                    break;
                }
            }
        }

        info!("Scheduler stopped after {} runs", completed);
        completed
    }
}

/// Shutdown flag that flips to true on Ctrl+C
pub fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating shutdown...");
                let _ = tx.send(true);
            }
            Err(e) => {
                error!("Error setting up signal handler: {}", e);
                // Keep the sender alive so the scheduler does not stop on its own
                std::future::pending::<()>().await;
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_runs_until_shutdown() {
        let (tx, rx) = watch::channel(false);
        let scheduler = Scheduler::new(Duration::from_millis(5));

        let completed = scheduler
            .run(rx, |run| {
                if run == 3 {
                    let _ = tx.send(true);
                }
                async { anyhow::Ok(()) }
            })
            .await;

        assert_eq!(completed, 3);
    }

    #[tokio::test]
    async fn test_failed_runs_do_not_stop_loop() {
        let (tx, rx) = watch::channel(false);
        let scheduler = Scheduler::new(Duration::from_millis(5));

        let completed = scheduler
            .run(rx, |run| {
                if run == 4 {
                    let _ = tx.send(true);
                }
                async move {
                    if run % 2 == 1 {
                        anyhow::bail!("upstream fetch failed");
                    }
                    Ok(())
                }
            })
            .await;

        assert_eq!(completed, 4);
    }

    #[tokio::test]
    async fn test_slow_runs_never_overlap() {
        let (tx, rx) = watch::channel(false);
        let scheduler = Scheduler::new(Duration::from_millis(2));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let completed = scheduler
            .run(rx, |run| {
                if run == 3 {
                    let _ = tx.send(true);
                }
                let in_flight = in_flight.clone();
                let max_seen = max_seen.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    anyhow::Ok(())
                }
            })
            .await;

        // Shutdown was requested while run 3 was sleeping
        assert_eq!(completed, 2);
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_shutdown_signal_keeps_run_alive() {
        let (tx, rx) = watch::channel(false);
        let scheduler = Scheduler::new(Duration::from_millis(2));
        let finished = Arc::new(AtomicUsize::new(0));

        let completed = scheduler
            .run(rx, |run| {
                // Wakes the receiver without requesting shutdown
                let _ = tx.send(run == 2);
                let finished = finished.clone();
                async move {
                    if run == 1 {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                    finished.fetch_add(1, Ordering::SeqCst);
                    anyhow::Ok(())
                }
            })
            .await;

        assert_eq!(completed, 2);
        assert_eq!(finished.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_already_shut_down_runs_nothing() {
        let (_tx, rx) = watch::channel(true);
        let completed = Scheduler::new(Duration::from_millis(1))
            .run(rx, |_| async { anyhow::Ok(()) })
            .await;
        assert_eq!(completed, 0);
    }
}
