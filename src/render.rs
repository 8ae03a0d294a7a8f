//! Plain-text rendering of the dashboard panels.

use chrono::{DateTime, FixedOffset, Utc};
use std::fmt::Write;

use crate::reading::{Coords, Reading};
use crate::twin::TwinEmbed;

pub const CONSOLE_BANNER: &str = "[MONA SYSTEM INITIALIZED]";
pub const CONSOLE_SUBTITLE: &str = "Monitoring risk zones...";
pub const AWAITING_DATA: &str = "Awaiting data...";
pub const PRODUCT_BLURB: &str = "Advanced mine operations network assistant providing real-time monitoring, \
risk assessment, and predictive analytics for safer mining operations.";
pub const QUICK_LINKS: [&str; 4] = ["Safety Protocols", "Emergency Contacts", "System Logs", "Documentation"];

/// Which instant a console entry's timestamp shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampMode {
    /// When the reading was generated.
    #[default]
    Capture,
    /// The render instant, identical for every entry in a frame.
    Render,
}

impl TimestampMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "capture" => Some(TimestampMode::Capture),
            "render" => Some(TimestampMode::Render),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampMode::Capture => "capture",
            TimestampMode::Render => "render",
        }
    }
}

/// 24-hour `HH:MM:SS` in the given display offset.
pub fn format_clock(t: DateTime<Utc>, offset: FixedOffset) -> String {
    t.with_timezone(&offset).format("%H:%M:%S").to_string()
}

/// `X<sep>x Y<sep>y Z<sep>z` at 2-dp precision.
pub fn format_coords(c: Coords, sep: &str) -> String {
    format!("X{sep}{:.2} Y{sep}{:.2} Z{sep}{:.2}", c.x, c.y, c.z, sep = sep)
}

pub fn render_header(now: DateTime<Utc>, offset: FixedOffset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "MONA  Mine Operations Network Assistant");
    let _ = writeln!(out, "Safety | Monitoring | Alerts");
    let _ = writeln!(out, "{}  System Active", format_clock(now, offset));
    out
}

pub fn render_twin_panel(twin: &TwinEmbed, overlay: Coords) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Mine Digital Twin ==  (Live View)");
    let _ = writeln!(out, "viewer: {}", twin.as_str());
    let _ = writeln!(out, "{}", format_coords(overlay, ": "));
    out
}

pub fn render_console(
    readings: &[Reading],
    now: DateTime<Utc>,
    mode: TimestampMode,
    offset: FixedOffset,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Risk Zone Console ==");
    let _ = writeln!(out, "{}", CONSOLE_BANNER);
    let _ = writeln!(out, "{}", CONSOLE_SUBTITLE);

    if readings.is_empty() {
        let _ = writeln!(out, "{}", AWAITING_DATA);
    }
    for r in readings {
        let stamp = match mode {
            TimestampMode::Capture => r.captured_at,
            TimestampMode::Render => now,
        };
        let _ = writeln!(out, "[{}]", format_clock(stamp, offset));
        let _ = writeln!(out, "  COORDS: {}", format_coords(r.coords(), ":"));
        let _ = writeln!(out, "  RISK: {}", r.risk);
    }
    let _ = writeln!(out, "* Auto-updating coordinates from Three.js module");
    out
}

/// Footer: blurb, system status and quick links.
pub fn render_status() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "MONA");
    let _ = writeln!(out, "{}", PRODUCT_BLURB);
    let _ = writeln!(out, "Safety First | 24/7 Monitoring");
    let _ = writeln!(out, "== System Status ==");
    let _ = writeln!(out, "Digital Twin: Online");
    let _ = writeln!(out, "Sensors: Active");
    let _ = writeln!(out, "Alert System: Standby");
    let _ = writeln!(out, "== Quick Links ==");
    let _ = writeln!(out, "{}", QUICK_LINKS.join(" | "));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::RiskLevel;
    use chrono::TimeZone;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, h, m, s).unwrap()
    }

    fn reading(id: u64, risk: RiskLevel, captured_at: DateTime<Utc>) -> Reading {
        Reading { id, x: -12.5, y: 3.0, z: 49.99, risk, captured_at }
    }

    #[test]
    fn test_empty_console_awaits_data() {
        let text = render_console(&[], at(9, 0, 0), TimestampMode::Capture, utc());
        assert!(text.contains(CONSOLE_BANNER));
        assert!(text.contains(CONSOLE_SUBTITLE));
        assert!(text.contains(AWAITING_DATA));
        assert!(!text.contains("COORDS"));
    }

    #[test]
    fn test_entries_in_insertion_order() {
        let rs = vec![
            reading(1, RiskLevel::Low, at(9, 0, 3)),
            reading(2, RiskLevel::High, at(9, 0, 6)),
        ];
        let text = render_console(&rs, at(9, 0, 7), TimestampMode::Capture, utc());
        assert!(!text.contains(AWAITING_DATA));
        let first = text.find("[09:00:03]").unwrap();
        let second = text.find("[09:00:06]").unwrap();
        assert!(first < second);
        assert!(text.contains("COORDS: X:-12.50 Y:3.00 Z:49.99"));
        assert!(text.find("RISK: LOW").unwrap() < text.find("RISK: HIGH").unwrap());
    }

    #[test]
    fn test_render_mode_stamps_every_entry_with_now() {
        let rs = vec![
            reading(1, RiskLevel::Low, at(9, 0, 3)),
            reading(2, RiskLevel::Medium, at(9, 0, 6)),
        ];
        let text = render_console(&rs, at(10, 30, 0), TimestampMode::Render, utc());
        assert_eq!(text.matches("[10:30:00]").count(), 2);
        assert!(!text.contains("[09:00:03]"));
    }

    #[test]
    fn test_clock_honours_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(format_clock(at(23, 15, 9), plus_two), "01:15:09");
        assert!(render_header(at(23, 15, 9), utc()).contains("23:15:09  System Active"));
    }

    #[test]
    fn test_twin_panel_shows_url_and_overlay() {
        let twin = TwinEmbed::parse("http://localhost:5173/").unwrap();
        let text = render_twin_panel(&twin, Coords { x: 1.0, y: -2.5, z: 10.25 });
        assert!(text.contains("viewer: http://localhost:5173/"));
        assert!(text.contains("X: 1.00 Y: -2.50 Z: 10.25"));
    }

    #[test]
    fn test_footer_has_blurb_status_and_links() {
        let text = render_status();
        assert!(text.contains("real-time monitoring, risk assessment"));
        assert!(text.contains("Alert System: Standby"));
        assert!(text.contains("Safety Protocols | Emergency Contacts | System Logs | Documentation"));
        assert!(text.find("Sensors: Active").unwrap() < text.find("== Quick Links ==").unwrap());
    }

    #[test]
    fn test_timestamp_mode_parse() {
        assert_eq!(TimestampMode::parse("RENDER"), Some(TimestampMode::Render));
        assert_eq!(TimestampMode::parse("capture"), Some(TimestampMode::Capture));
        assert_eq!(TimestampMode::parse("later"), None);
    }
}
