//! Value-to-bucket colour mapping for heatmap cells.
//!
//! A value is placed in one of five equal-width slices of `[min, max]`:
//!
//! ```text
//!  min                                              max
//!   │  red  │ orange │ yellow │ light green │ green │
//!   0%     20%      40%      60%           80%    100%
//! ```
//!
//! Each slice is closed on its lower edge: exactly 20% is orange.
//! Missing values get a neutral pair and a collapsed range (`max <= min`)
//! gets a flat pair.

use serde::Serialize;

/// Background and foreground colours for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellStyle {
    pub background: &'static str,
    pub foreground: &'static str,
}

/// Ordered colour buckets, plus the two special cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    /// No value.
    Neutral,
    /// Degenerate range, every value is the same.
    Flat,
    Red,
    Orange,
    Yellow,
    LightGreen,
    Green,
}

impl Bucket {
    /// The five ranked buckets, lowest first.
    pub const RANKED: [Bucket; 5] = [
        Bucket::Red,
        Bucket::Orange,
        Bucket::Yellow,
        Bucket::LightGreen,
        Bucket::Green,
    ];

    pub fn style(&self) -> CellStyle {
        let (background, foreground) = match self {
            Self::Neutral => ("#f8fafc", "#cbd5e1"),
            Self::Flat => ("#d1fae5", "#065f46"),
            Self::Red => ("#fecaca", "#991b1b"),
            Self::Orange => ("#fed7aa", "#7c2d12"),
            Self::Yellow => ("#fef08a", "#78350f"),
            Self::LightGreen => ("#bbf7d0", "#14532d"),
            Self::Green => ("#4ade80", "#14532d"),
        };
        CellStyle {
            background,
            foreground,
        }
    }
}

/// Bucket of `value` within `[min, max]`.
pub fn bucket_for(value: Option<f64>, min: f64, max: f64) -> Bucket {
    let Some(value) = value else {
        return Bucket::Neutral;
    };
    if max <= min {
        return Bucket::Flat;
    }

    let pct = (value - min) / (max - min);
    if pct < 0.20 {
        Bucket::Red
    } else if pct < 0.40 {
        Bucket::Orange
    } else if pct < 0.60 {
        Bucket::Yellow
    } else if pct < 0.80 {
        Bucket::LightGreen
    } else {
        Bucket::Green
    }
}

/// Colours for `value` within `[min, max]`.
pub fn cell_style(value: Option<f64>, min: f64, max: f64) -> CellStyle {
    bucket_for(value, min, max).style()
}
