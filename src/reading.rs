use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::random::RandomSource;

pub const XY_MIN: f64 = -100.0;
pub const XY_SPAN: f64 = 200.0;
pub const Z_SPAN: f64 = 50.0;
pub const HIGH_ABOVE: f64 = 0.7;
pub const MEDIUM_ABOVE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the risk level is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RiskSampling {
    /// One draw compared against both thresholds.
    #[default]
    Single,
    /// A fresh draw for each threshold test, as the first dashboard did.
    Cascade,
}

impl RiskSampling {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "single" => Some(RiskSampling::Single),
            "cascade" => Some(RiskSampling::Cascade),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskSampling::Single => "single",
            RiskSampling::Cascade => "cascade",
        }
    }

    pub fn draw<S: RandomSource + ?Sized>(&self, src: &mut S) -> RiskLevel {
        let r = src.next_unit();
        if r > HIGH_ABOVE {
            return RiskLevel::High;
        }
        let r = match self {
            RiskSampling::Single => r,
            RiskSampling::Cascade => src.next_unit(),
        };
        if r > MEDIUM_ABOVE {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Position in the twin's coordinate frame, each axis at 2-dp precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coords {
    /// Draws x, y then z from `src`.
    pub fn sample<S: RandomSource + ?Sized>(src: &mut S) -> Self {
        Self {
            x: round2_below(src.next_unit() * XY_SPAN + XY_MIN, XY_MIN + XY_SPAN),
            y: round2_below(src.next_unit() * XY_SPAN + XY_MIN, XY_MIN + XY_SPAN),
            z: round2_below(src.next_unit() * Z_SPAN, Z_SPAN),
        }
    }
}

/// One synthesized position + risk record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub risk: RiskLevel,
    pub captured_at: DateTime<Utc>,
}

impl Reading {
    pub fn generate<S: RandomSource + ?Sized>(
        id: u64,
        src: &mut S,
        sampling: RiskSampling,
        captured_at: DateTime<Utc>,
    ) -> Self {
        let Coords { x, y, z } = Coords::sample(src);
        let risk = sampling.draw(src);
        Self { id, x, y, z, risk, captured_at }
    }

    pub fn coords(&self) -> Coords {
        Coords { x: self.x, y: self.y, z: self.z }
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Rounds to 2 dp while keeping the result strictly below `upper`.
pub fn round2_below(v: f64, upper: f64) -> f64 {
    let r = round2(v);
    if r >= upper {
        ((upper * 100.0).round() - 1.0) / 100.0
    } else {
        r
    }
}
