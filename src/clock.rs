//! Header wall clock, refreshed on its own timer.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use tokio::time::Duration;

use crate::logging::{log, obj, Domain, Level};
use crate::timer::{lock, PeriodicTask, Phase};

struct ClockState {
    now: DateTime<Utc>,
    refreshes: u64,
    phase: Phase,
}

pub struct WallClock {
    period: Duration,
    shared: Arc<Mutex<ClockState>>,
    timer: PeriodicTask,
}

impl WallClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            shared: Arc::new(Mutex::new(ClockState {
                now: Utc::now(),
                refreshes: 0,
                phase: Phase::Idle,
            })),
            timer: PeriodicTask::new(),
        }
    }

    pub fn start(&mut self) -> Result<bool> {
        match lock(&self.shared).phase {
            Phase::Running => return Ok(false),
            Phase::Stopped => bail!("clock was stopped and cannot be restarted"),
            Phase::Idle => {}
        }
        let shared = Arc::clone(&self.shared);
        self.timer.spawn("clock", self.period, move || {
            let mut st = lock(&shared);
            if st.phase == Phase::Stopped {
                return ControlFlow::Break(());
            }
            st.now = Utc::now();
            st.refreshes += 1;
            ControlFlow::Continue(())
        })?;
        {
            let mut st = lock(&self.shared);
            st.phase = Phase::Running;
            st.now = Utc::now();
        }
        log(
            Level::Info,
            Domain::Clock,
            "clock.started",
            obj(&[("period_ms", json!(self.period.as_millis() as u64))]),
        );
        Ok(true)
    }

    pub fn stop(&mut self) {
        let previous = {
            let mut st = lock(&self.shared);
            std::mem::replace(&mut st.phase, Phase::Stopped)
        };
        self.timer.cancel();
        if previous == Phase::Running {
            log(Level::Info, Domain::Clock, "clock.stopped", obj(&[]));
        }
    }

    /// Time as of the last refresh.
    pub fn now(&self) -> DateTime<Utc> {
        lock(&self.shared).now
    }

    pub fn refreshes(&self) -> u64 {
        lock(&self.shared).refreshes
    }

    pub fn phase(&self) -> Phase {
        lock(&self.shared).phase
    }
}

impl Drop for WallClock {
    fn drop(&mut self) {
        self.stop();
    }
}
