use crate::types::EvidenceKind;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EvidenceRef
// ---------------------------------------------------------------------------

/// Reference to the detection record behind an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRef {
    pub id: String,
    pub kind: EvidenceKind,
}

// ---------------------------------------------------------------------------
// EnforcementAction
// ---------------------------------------------------------------------------

/// One atomic enforcement step, produced upstream by the prioritization
/// engine and consumed here as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcementAction {
    pub id: String,
    /// Legal demand category tag. Open vocabulary; known tags map to display
    /// labels via `normalize::theory_label`.
    pub theory: String,
    /// Single addressed bureau. Absent when the evidence spans several
    /// bureaus, in which case `affected_bureaus` is populated instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bureau: Option<String>,
    /// Bureaus a cross-bureau discrepancy spans; when non-empty this takes
    /// precedence over `bureau` and the action is exploded per bureau.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_bureaus: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furnisher: Option<String>,
    /// Upstream ordering key. Lower values are handled first; ties keep
    /// input order.
    pub priority: f64,
    pub evidence: EvidenceRef,
    /// Risk indicator on the upstream 0-5 scale.
    #[serde(default)]
    pub risk: f64,
    /// Ids of actions that must land in the same or an earlier batch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
