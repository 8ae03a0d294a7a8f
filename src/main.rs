use anyhow::Result;
use chrono::{Local, Offset, Utc};
use serde_json::json;
use tokio::time::{sleep, Duration};

use mona::config::Config;
use mona::logging::{log, obj, v_str, Domain, Level};
use mona::view::DashboardView;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    cfg.validate()?;
    cfg.log_loaded();

    let mut view = DashboardView::from_config(&cfg)?;
    let mut updates = view.feed().subscribe();
    view.activate()?;

    let timed = cfg.run_secs.is_some();
    let deadline = sleep(Duration::from_secs(cfg.run_secs.unwrap_or(0)));
    tokio::pin!(deadline);
    let mut redraw = tokio::time::interval(Duration::from_millis(cfg.clock_period_ms));

    let reason = loop {
        tokio::select! {
            _ = &mut deadline, if timed => break "run_secs elapsed",
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    log(Level::Error, Domain::System, "signal.error", obj(&[("error", v_str(&err.to_string()))]));
                }
                break "interrupted";
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break "feed closed";
                }
            }
            _ = redraw.tick() => {}
        }
        let offset = Local::now().offset().fix();
        print!("{}{}", CLEAR_SCREEN, view.render(Utc::now(), offset));
    };

    view.teardown();
    log(
        Level::Info,
        Domain::System,
        "shutdown",
        obj(&[("reason", v_str(reason)), ("ticks", json!(view.feed().ticks()))]),
    );
    Ok(())
}
