use crate::action::EnforcementAction;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// Prioritized output of the upstream engine: what to enforce and in what
/// order. The planner never reorders beyond the stable ordering-key sort and
/// never edits this value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Outcome label the engine pursues, e.g. "delete_tradeline". Enum-like;
    /// humanized for display in batch summaries.
    pub goal: String,
    pub actions: Vec<EnforcementAction>,
    /// Action ids the engine chose not to pursue; carried through to the
    /// plan unchanged.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_action_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
