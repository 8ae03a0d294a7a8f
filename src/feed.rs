//! Live readings feed: a periodic producer over a capped reading buffer.
//!
//! One writer (the tick handler) mutates the buffer under a mutex; the
//! render path reads snapshots or follows the `watch` channel. `stop`
//! flips the phase under that same lock before aborting the timer, so
//! once it returns no tick can land.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::time::Duration;

use crate::buffer::ReadingBuffer;
use crate::config::Config;
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::random::RandomSource;
use crate::reading::{Reading, RiskSampling};
use crate::timer::{lock, PeriodicTask, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub period: Duration,
    pub capacity: usize,
    pub sampling: RiskSampling,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl FeedSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            period: Duration::from_millis(cfg.feed_period_ms),
            capacity: cfg.feed_capacity,
            sampling: cfg.risk_sampling,
        }
    }
}

struct FeedState {
    buffer: ReadingBuffer,
    source: Box<dyn RandomSource + Send>,
    sampling: RiskSampling,
    next_id: u64,
    phase: Phase,
    publisher: watch::Sender<Vec<Reading>>,
}

struct TickOutcome {
    reading: Reading,
    evicted: Option<Reading>,
    len: usize,
}

impl FeedState {
    fn tick(&mut self, now: DateTime<Utc>) -> Option<TickOutcome> {
        if self.phase == Phase::Stopped {
            return None;
        }
        let reading = Reading::generate(self.next_id, &mut self.source, self.sampling, now);
        self.next_id += 1;
        let evicted = self.buffer.push(reading.clone());
        self.publisher.send_replace(self.buffer.snapshot());
        Some(TickOutcome {
            reading,
            evicted,
            len: self.buffer.len(),
        })
    }
}

pub struct LiveFeed {
    settings: FeedSettings,
    shared: Arc<Mutex<FeedState>>,
    timer: PeriodicTask,
}

impl LiveFeed {
    pub fn new(settings: FeedSettings, source: Box<dyn RandomSource + Send>) -> Self {
        let (publisher, _) = watch::channel(Vec::new());
        let state = FeedState {
            buffer: ReadingBuffer::new(settings.capacity),
            source,
            sampling: settings.sampling,
            next_id: 1,
            phase: Phase::Idle,
            publisher,
        };
        Self {
            settings,
            shared: Arc::new(Mutex::new(state)),
            timer: PeriodicTask::new(),
        }
    }

    /// Synthesizes one reading and returns the updated buffer.
    /// A stopped feed is left untouched.
    pub fn tick(&self) -> Vec<Reading> {
        run_tick(&self.shared);
        self.snapshot()
    }

    /// Starts the periodic timer. Returns `Ok(false)` if it is already running.
    pub fn start(&mut self) -> Result<bool> {
        let phase = lock(&self.shared).phase;
        match phase {
            Phase::Running => return Ok(false),
            Phase::Stopped => bail!("feed was stopped and cannot be restarted"),
            Phase::Idle => {}
        }

        let shared = Arc::clone(&self.shared);
        self.timer.spawn("feed", self.settings.period, move || {
            if run_tick(&shared) {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        })?;
        lock(&self.shared).phase = Phase::Running;

        log(
            Level::Info,
            Domain::Feed,
            "feed.started",
            obj(&[
                ("period_ms", json!(self.settings.period.as_millis() as u64)),
                ("capacity", json!(self.settings.capacity)),
                ("risk_sampling", v_str(self.settings.sampling.as_str())),
            ]),
        );
        Ok(true)
    }

    /// Cancels the timer. Safe to call repeatedly or before any tick.
    pub fn stop(&mut self) {
        let (previous, produced) = {
            let mut st = lock(&self.shared);
            let prev = st.phase;
            st.phase = Phase::Stopped;
            (prev, st.next_id - 1)
        };
        self.timer.cancel();
        if previous != Phase::Stopped {
            log(
                Level::Info,
                Domain::Feed,
                "feed.stopped",
                obj(&[
                    ("was_running", json!(previous == Phase::Running)),
                    ("ticks", json!(produced)),
                ]),
            );
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared).phase == Phase::Running
    }

    pub fn phase(&self) -> Phase {
        lock(&self.shared).phase
    }

    pub fn snapshot(&self) -> Vec<Reading> {
        lock(&self.shared).buffer.snapshot()
    }

    pub fn len(&self) -> usize {
        lock(&self.shared).buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.shared).buffer.is_empty()
    }

    /// Total readings produced since construction.
    pub fn ticks(&self) -> u64 {
        lock(&self.shared).next_id - 1
    }

    /// Follows buffer updates; the current value is the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Reading>> {
        lock(&self.shared).publisher.subscribe()
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Returns false once the feed has been stopped.
fn run_tick(shared: &Mutex<FeedState>) -> bool {
    let outcome = lock(shared).tick(Utc::now());
    let Some(out) = outcome else {
        return false;
    };
    log(
        Level::Debug,
        Domain::Feed,
        "feed.tick",
        obj(&[
            ("reading_id", json!(out.reading.id)),
            ("x", v_num(out.reading.x)),
            ("y", v_num(out.reading.y)),
            ("z", v_num(out.reading.z)),
            ("risk", v_str(out.reading.risk.as_str())),
            ("buffer_len", json!(out.len)),
        ]),
    );
    if let Some(old) = out.evicted {
        log(
            Level::Trace,
            Domain::Feed,
            "feed.evicted",
            obj(&[("reading_id", json!(old.id))]),
        );
    }
    true
}
