//! Batch locking.
//!
//! A lock is plain data on the batch, not a concurrency primitive: it tells
//! the caller this letter should not be sent yet, and lists the conditions
//! under which sending becomes appropriate. Evidence locks come from open
//! disputes already in flight; wave locks chain each letter behind the
//! previous wave to the same recipient.

use crate::batch::LetterBatch;
use crate::config::PlanConfig;
use crate::error::RedressError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// LockReason
// ---------------------------------------------------------------------------

/// Why a batch is locked. The two reasons are mutually exclusive; an
/// evidence lock always wins over a wave lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockReason {
    /// Evidence in this batch is covered by an open dispute awaiting a
    /// response.
    PendingResponse,
    /// The previous wave to the same recipient has not been answered.
    PendingPreviousWave,
}

impl LockReason {
    pub fn as_str(self) -> &'static str {
        match self {
            LockReason::PendingResponse => "pending_response",
            LockReason::PendingPreviousWave => "pending_previous_wave",
        }
    }
}

impl fmt::Display for LockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LockReason {
    type Err = RedressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_response" => Ok(LockReason::PendingResponse),
            "pending_previous_wave" => Ok(LockReason::PendingPreviousWave),
            other => Err(RedressError::InvalidLockReason(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// UnlockReason
// ---------------------------------------------------------------------------

/// Why a caller is releasing a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockReason {
    /// The awaited response arrived.
    ResponseReceived,
    /// The response window lapsed without an answer.
    TimeExpired,
    /// The account owner chose to proceed anyway.
    UserOverride,
}

impl UnlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnlockReason::ResponseReceived => "response_received",
            UnlockReason::TimeExpired => "time_expired",
            UnlockReason::UserOverride => "user_override",
        }
    }
}

impl fmt::Display for UnlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UnlockReason {
    type Err = RedressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "response_received" => Ok(UnlockReason::ResponseReceived),
            "time_expired" => Ok(UnlockReason::TimeExpired),
            "user_override" => Ok(UnlockReason::UserOverride),
            other => Err(RedressError::InvalidUnlockReason(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Unlock conditions
// ---------------------------------------------------------------------------

pub(crate) fn evidence_unlock_conditions(cfg: &PlanConfig) -> Vec<String> {
    vec![
        "A response is logged for the open dispute covering this evidence".to_string(),
        format!("The extended window of {} days elapses", cfg.extended_window_days),
        "Manual override by the account owner".to_string(),
    ]
}

pub(crate) fn wave_unlock_conditions(previous_wave: u32, cfg: &PlanConfig) -> Vec<String> {
    vec![
        format!("A response is recorded for wave {previous_wave}"),
        format!(
            "{} days elapse without a response to wave {previous_wave}",
            cfg.extended_window_days
        ),
        "Manual override by the account owner".to_string(),
    ]
}

// ---------------------------------------------------------------------------
// Wave lock propagation
// ---------------------------------------------------------------------------

/// Chain a recipient's batches: every batch after the first depends on its
/// predecessor, and is wave-locked while that predecessor has no recorded
/// response. Re-running over a plan whose earlier waves have since been
/// answered releases the stale wave locks; evidence locks are never touched.
/// A release granted via [`UnlockReason::UserOverride`] does not survive a
/// re-run: while the predecessor has no recorded response, the wave lock is
/// reinstated, so workflows honoring an override must not re-run this pass
/// over the overridden batch.
pub fn propagate_wave_locks(batches: Vec<LetterBatch>, cfg: &PlanConfig) -> Vec<LetterBatch> {
    let mut out: Vec<LetterBatch> = Vec::with_capacity(batches.len());

    for mut batch in batches {
        if let Some(prev) = out.last() {
            batch.depends_on = vec![prev.id];
            if batch.lock_reason != Some(LockReason::PendingResponse) {
                if prev.response_received_at.is_none() {
                    batch.locked = true;
                    batch.lock_reason = Some(LockReason::PendingPreviousWave);
                    batch.unlock_conditions = wave_unlock_conditions(prev.wave, cfg);
                } else if batch.lock_reason == Some(LockReason::PendingPreviousWave) {
                    batch.locked = false;
                    batch.lock_reason = None;
                    batch.unlock_conditions = Vec::new();
                }
            }
        }
        out.push(batch);
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
