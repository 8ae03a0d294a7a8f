//! Owned periodic timer handle.
//!
//! Each [`PeriodicTask`] spawns one task on the current tokio runtime and
//! aborts it on `cancel` or drop, so a timer can never outlive its owner.

use anyhow::{anyhow, Result};
use std::ops::ControlFlow;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

#[derive(Debug, Default)]
pub struct PeriodicTask {
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Runs `on_tick` every `period`, first firing one full period from now.
    /// The loop ends when `on_tick` returns `Break`.
    pub fn spawn<F>(&mut self, name: &'static str, period: Duration, mut on_tick: F) -> Result<()>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let rt = Handle::try_current()
            .map_err(|_| anyhow!("{} timer needs a running tokio runtime", name))?;
        self.cancel();
        self.handle = Some(rt.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if on_tick().is_break() {
                    break;
                }
            }
        }));
        Ok(())
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Lifecycle shared by the feed and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Stopped,
}

/// Locks `m`, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_spawn_outside_runtime_errors() {
        let mut task = PeriodicTask::new();
        let err = task
            .spawn("test", Duration::from_millis(10), || ControlFlow::Continue(()))
            .unwrap_err();
        assert!(err.to_string().contains("tokio runtime"));
        assert!(!task.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_full_period() {
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        let mut task = PeriodicTask::new();
        task.spawn("test", Duration::from_millis(1000), move || {
            c.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        task.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        let mut task = PeriodicTask::new();
        task.spawn("test", Duration::from_millis(100), move || {
            c.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();

        tokio::time::sleep(Duration::from_millis(350)).await;
        task.cancel();
        task.cancel();
        let seen = count.load(Ordering::SeqCst);
        assert_eq!(seen, 3);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
        assert!(!task.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_ends_loop() {
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        let mut task = PeriodicTask::new();
        task.spawn("test", Duration::from_millis(100), move || {
            if c.fetch_add(1, Ordering::SeqCst) >= 1 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!task.is_active());
    }
}
