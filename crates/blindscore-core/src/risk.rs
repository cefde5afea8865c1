//! Risk banding for decrypted scores

use serde::{Deserialize, Serialize};

/// Coarse fraud-risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    /// Scores 0..=20
    Low,
    /// Scores 21..=50
    Suspicious,
    /// Scores 51..=100
    High,
}

impl RiskBand {
    pub fn from_score(value: u8) -> Self {
        match value {
            0..=20 => RiskBand::Low,
            21..=50 => RiskBand::Suspicious,
            _ => RiskBand::High,
        }
    }

    /// Verdict shown to the Data Owner
    pub fn verdict(&self) -> &'static str {
        match self {
            RiskBand::Low => "Transactions are normal. Fraud is unlikely.",
            RiskBand::Suspicious => {
                "Transactions are suspicious. Further inspection is recommended."
            }
            RiskBand::High => "Transactions are likely fraudulent.",
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskBand::Low => write!(f, "low"),
            RiskBand::Suspicious => write!(f, "suspicious"),
            RiskBand::High => write!(f, "high"),
        }
    }
}

/// A decrypted score, clamped to `[0, 100]` and banded
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskScore {
    /// Value as decrypted, before clamping
    pub raw: f64,
    pub value: u8,
    pub band: RiskBand,
}

/// Round to the nearest integer, clamp to `[0, 100]` and band
///
/// NaN maps to 0; infinities clamp to the nearest bound.
pub fn clamp_and_band(raw: f64) -> RiskScore {
    let value = if raw.is_nan() {
        0
    } else {
        raw.round().clamp(0.0, 100.0) as u8
    };

    RiskScore {
        raw,
        value,
        band: RiskBand::from_score(value),
    }
}
