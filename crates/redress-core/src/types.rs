use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EvidenceKind
// ---------------------------------------------------------------------------

/// What kind of detection record backs an action: a straight reporting
/// violation, or a contradiction between sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Violation,
    Contradiction,
}

impl EvidenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EvidenceKind::Violation => "violation",
            EvidenceKind::Contradiction => "contradiction",
        }
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EvidenceKind {
    type Err = crate::error::RedressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "violation" => Ok(EvidenceKind::Violation),
            "contradiction" => Ok(EvidenceKind::Contradiction),
            _ => Err(crate::error::RedressError::InvalidEvidenceKind(
                s.to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// RiskLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket an averaged risk indicator: below 2 is low, below 4 is
    /// medium, everything else is high.
    pub fn from_average(avg: f64) -> RiskLevel {
        if avg < 2.0 {
            RiskLevel::Low
        } else if avg < 4.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = crate::error::RedressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(crate::error::RedressError::InvalidRiskLevel(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn risk_buckets() {
        assert_eq!(RiskLevel::from_average(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_average(1.99), RiskLevel::Low);
        assert_eq!(RiskLevel::from_average(2.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_average(3.99), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_average(4.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_average(5.0), RiskLevel::High);
    }

    #[test]
    fn risk_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }

    #[test]
    fn evidence_kind_roundtrip() {
        for kind in [EvidenceKind::Violation, EvidenceKind::Contradiction] {
            let parsed = EvidenceKind::from_str(kind.as_str()).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn evidence_kind_rejects_unknown() {
        let err = EvidenceKind::from_str("hearsay").unwrap_err();
        assert!(matches!(
            err,
            crate::error::RedressError::InvalidEvidenceKind(_)
        ));
    }

    #[test]
    fn risk_level_serde_snake_case() {
        let json = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let parsed: RiskLevel = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(parsed, RiskLevel::High);
    }
}
