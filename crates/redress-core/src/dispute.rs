//! Read-only snapshot of dispute-tracking state.
//!
//! The planner never writes dispute records; it only asks whether an
//! evidence id is already covered by an open dispute. A missing snapshot
//! means the check is skipped, never an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tracker status that blocks re-disputing the same evidence. Compared
/// exactly; "Open" or "OPEN" do not count.
pub const OPEN_STATUS: &str = "open";

// ---------------------------------------------------------------------------
// PendingDispute
// ---------------------------------------------------------------------------

/// One pending dispute as reported by dispute-tracking storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingDispute {
    pub evidence_id: String,
    /// Free-form tracker status; only the literal "open" affects locking.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispute_date: Option<DateTime<Utc>>,
}

impl PendingDispute {
    /// True when the tracker still reports this dispute as open.
    pub fn is_open(&self) -> bool {
        self.status == OPEN_STATUS
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
