//! The dashboard view: owns both timers and tears them down together.

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::json;
use tokio::time::Duration;

use crate::clock::WallClock;
use crate::config::Config;
use crate::feed::{FeedSettings, LiveFeed};
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::random::{RandomSource, RngSource};
use crate::reading::Coords;
use crate::render::{render_console, render_header, render_status, render_twin_panel, TimestampMode};
use crate::twin::TwinEmbed;

pub struct DashboardView {
    feed: LiveFeed,
    clock: WallClock,
    twin: TwinEmbed,
    overlay: Box<dyn RandomSource + Send>,
    timestamp_mode: TimestampMode,
    active: bool,
}

impl DashboardView {
    /// Builds a view from a validated config, seeding from `feed_seed` when set.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let twin = TwinEmbed::parse(&cfg.twin_url)?;
        let feed_source = RngSource::from_seed_or_entropy(cfg.feed_seed);
        let overlay_source = RngSource::from_seed_or_entropy(cfg.feed_seed.map(|s| s.wrapping_add(1)));
        Ok(Self::new(
            cfg,
            twin,
            Box::new(feed_source),
            Box::new(overlay_source),
        ))
    }

    pub fn new(
        cfg: &Config,
        twin: TwinEmbed,
        feed_source: Box<dyn RandomSource + Send>,
        overlay: Box<dyn RandomSource + Send>,
    ) -> Self {
        Self {
            feed: LiveFeed::new(FeedSettings::from_config(cfg), feed_source),
            clock: WallClock::new(Duration::from_millis(cfg.clock_period_ms)),
            twin,
            overlay,
            timestamp_mode: cfg.timestamp_mode,
            active: false,
        }
    }

    /// Starts the clock and feed timers.
    pub fn activate(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        self.clock.start()?;
        if let Err(err) = self.feed.start() {
            self.clock.stop();
            return Err(err);
        }
        self.active = true;
        log(
            Level::Info,
            Domain::View,
            "view.activated",
            obj(&[
                ("twin_url", v_str(self.twin.as_str())),
                ("timestamp_mode", v_str(self.timestamp_mode.as_str())),
            ]),
        );
        Ok(())
    }

    /// Cancels both timers. Runs on drop as well.
    pub fn teardown(&mut self) {
        let was_active = std::mem::replace(&mut self.active, false);
        self.feed.stop();
        self.clock.stop();
        if was_active {
            log(
                Level::Info,
                Domain::View,
                "view.teardown",
                obj(&[("ticks", json!(self.feed.ticks()))]),
            );
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn feed(&self) -> &LiveFeed {
        &self.feed
    }

    pub fn clock(&self) -> &WallClock {
        &self.clock
    }

    pub fn twin(&self) -> &TwinEmbed {
        &self.twin
    }

    /// Full text frame. `now` stamps render-time entries; the header uses the clock.
    pub fn render(&mut self, now: DateTime<Utc>, offset: FixedOffset) -> String {
        let overlay = Coords::sample(&mut self.overlay);
        let readings = self.feed.snapshot();
        let mut frame = String::new();
        frame.push_str(&render_header(self.clock.now(), offset));
        frame.push('\n');
        frame.push_str(&render_twin_panel(&self.twin, overlay));
        frame.push('\n');
        frame.push_str(&render_console(&readings, now, self.timestamp_mode, offset));
        frame.push('\n');
        frame.push_str(&render_status());
        frame
    }
}

impl Drop for DashboardView {
    fn drop(&mut self) {
        self.teardown();
    }
}
