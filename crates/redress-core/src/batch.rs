//! Letter batches and their materialization.
//!
//! A [`LetterBatch`] is the unit a downstream renderer turns into one
//! physical letter. Batches are immutable once materialized; state changes
//! such as unlocking produce a new value.

use crate::action::EnforcementAction;
use crate::config::PlanConfig;
use crate::dispute::PendingDispute;
use crate::error::{RedressError, Result};
use crate::lock::{evidence_unlock_conditions, LockReason, UnlockReason};
use crate::normalize::{
    humanize_tag, normal_furnisher, theory_label, title_case, UNKNOWN_FURNISHER,
};
use crate::types::{EvidenceKind, RiskLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// LetterBatch
// ---------------------------------------------------------------------------

/// One dispute letter: a single recipient bureau, a single furnisher, and
/// up to the configured cap of actions sharing one legal theory.
///
/// Renderers must address the letter from the `furnisher` field, never from
/// the furnisher of an individual action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterBatch {
    pub id: Uuid,
    /// Canonical recipient bureau name.
    pub bureau: String,
    /// Normalized furnisher the letter concerns.
    pub furnisher: String,
    /// 1-based position in this recipient's sending order.
    pub wave: u32,
    pub theory: String,
    /// Human-readable form of `theory` for letter headings.
    pub theory_label: String,
    pub risk: RiskLevel,
    /// Days the recipient is given to respond.
    pub response_window_days: u32,
    pub summary: String,
    pub actions: Vec<EnforcementAction>,
    /// Deduplicated evidence ids backed by statutory violations.
    pub violation_ids: Vec<String>,
    /// Deduplicated evidence ids backed by record contradictions.
    pub contradiction_ids: Vec<String>,
    /// Batches that must be resolved before this one is sent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<Uuid>,
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_reason: Option<LockReason>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unlock_conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_received_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LetterBatch {
    /// Copy of this batch with the lock released.
    ///
    /// [`UnlockReason::ResponseReceived`] also stamps `response_received_at`
    /// so a later [`propagate_wave_locks`](crate::lock::propagate_wave_locks)
    /// pass can release the batches chained behind this one.
    pub fn unlock(&self, reason: UnlockReason, now: DateTime<Utc>) -> LetterBatch {
        let mut unlocked = self.clone();
        unlocked.locked = false;
        unlocked.lock_reason = None;
        unlocked.unlock_conditions = Vec::new();
        if reason == UnlockReason::ResponseReceived {
            unlocked.response_received_at = Some(now);
        }
        tracing::debug!("batch {} unlocked: {reason}", self.id);
        unlocked
    }
}

// ---------------------------------------------------------------------------
// Materializer
// ---------------------------------------------------------------------------

/// Builds [`LetterBatch`] values from packed action groups. Carries the
/// plan-wide context a single group cannot see: the goal, the caller's open
/// disputes, and the injected clock.
pub struct Materializer<'a> {
    pub goal: &'a str,
    pub disputes: Option<&'a [PendingDispute]>,
    pub cfg: &'a PlanConfig,
    pub now: DateTime<Utc>,
}

impl Materializer<'_> {
    /// Turn one packed group into a batch.
    ///
    /// The group must be non-empty and single-furnisher; either violation is
    /// an upstream bug and surfaces as an error rather than a bad letter.
    pub fn materialize(
        &self,
        id: Uuid,
        bureau: &str,
        wave: u32,
        actions: Vec<EnforcementAction>,
    ) -> Result<LetterBatch> {
        let furnisher = batch_furnisher(bureau, wave, &actions)?;
        let theory = dominant_theory(&actions);
        let label = theory_label(&theory);
        let average = actions.iter().map(|a| a.risk).sum::<f64>() / actions.len() as f64;
        let (violation_ids, contradiction_ids) = partition_evidence(&actions);
        let summary = self.compose_summary(wave, &label, &furnisher);

        let mut batch = LetterBatch {
            id,
            bureau: bureau.to_string(),
            furnisher,
            wave,
            theory,
            theory_label: label,
            risk: RiskLevel::from_average(average),
            response_window_days: self.cfg.response_window_days,
            summary,
            actions,
            violation_ids,
            contradiction_ids,
            depends_on: Vec::new(),
            locked: false,
            lock_reason: None,
            unlock_conditions: Vec::new(),
            response_received_at: None,
            created_at: self.now,
        };

        if self.covered_by_open_dispute(&batch) {
            tracing::debug!("batch {} locked behind an open dispute", batch.id);
            batch.locked = true;
            batch.lock_reason = Some(LockReason::PendingResponse);
            batch.unlock_conditions = evidence_unlock_conditions(self.cfg);
        }

        Ok(batch)
    }

    /// True if any open dispute names evidence carried by this batch.
    fn covered_by_open_dispute(&self, batch: &LetterBatch) -> bool {
        let Some(disputes) = self.disputes else {
            return false;
        };
        disputes.iter().any(|d| {
            d.is_open()
                && (batch.violation_ids.contains(&d.evidence_id)
                    || batch.contradiction_ids.contains(&d.evidence_id))
        })
    }

    fn compose_summary(&self, wave: u32, label: &str, furnisher: &str) -> String {
        let subject = if furnisher == UNKNOWN_FURNISHER {
            "Unknown Furnisher".to_string()
        } else {
            title_case(furnisher)
        };
        format!(
            "Wave {wave}: {label} letter regarding {subject} (goal: {})",
            humanize_tag(self.goal)
        )
    }
}

// ---------------------------------------------------------------------------
// Batch assembly helpers
// ---------------------------------------------------------------------------

fn batch_furnisher(bureau: &str, wave: u32, actions: &[EnforcementAction]) -> Result<String> {
    let mut expected: Option<String> = None;
    for action in actions {
        let furnisher = normal_furnisher(action.furnisher.as_deref());
        match &expected {
            None => expected = Some(furnisher),
            Some(e) if *e != furnisher => {
                return Err(RedressError::MixedFurnisherBatch {
                    bureau: bureau.to_string(),
                    wave,
                    expected: e.clone(),
                    found: furnisher,
                });
            }
            Some(_) => {}
        }
    }
    expected.ok_or(RedressError::EmptyBatch)
}

/// Most frequent theory in the group; the first-seen theory wins ties.
fn dominant_theory(actions: &[EnforcementAction]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for action in actions {
        match counts.iter_mut().find(|(t, _)| *t == action.theory.as_str()) {
            Some((_, n)) => *n += 1,
            None => counts.push((action.theory.as_str(), 1)),
        }
    }

    let mut dominant: Option<(&str, usize)> = None;
    for (theory, count) in counts {
        if dominant.map_or(true, |(_, best)| count > best) {
            dominant = Some((theory, count));
        }
    }
    dominant.map(|(t, _)| t.to_string()).unwrap_or_default()
}

/// Split evidence ids by kind, keeping first occurrence of each id.
fn partition_evidence(actions: &[EnforcementAction]) -> (Vec<String>, Vec<String>) {
    let mut violations: Vec<String> = Vec::new();
    let mut contradictions: Vec<String> = Vec::new();
    for action in actions {
        let bucket = match action.evidence.kind {
            EvidenceKind::Violation => &mut violations,
            EvidenceKind::Contradiction => &mut contradictions,
        };
        if !bucket.contains(&action.evidence.id) {
            bucket.push(action.evidence.id.clone());
        }
    }
    (violations, contradictions)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::EvidenceRef;
    use crate::dispute::OPEN_STATUS;

    fn action(id: &str, theory: &str, risk: f64, kind: EvidenceKind) -> EnforcementAction {
        EnforcementAction {
            id: id.to_string(),
            theory: theory.to_string(),
            bureau: Some("Equifax".to_string()),
            affected_bureaus: Vec::new(),
            furnisher: Some("CHASE".to_string()),
            priority: 1.0,
            evidence: EvidenceRef {
                id: format!("ev-{id}"),
                kind,
            },
            risk,
            depends_on: Vec::new(),
        }
    }

    fn materializer<'a>(
        cfg: &'a PlanConfig,
        disputes: Option<&'a [PendingDispute]>,
    ) -> Materializer<'a> {
        Materializer {
            goal: "remove_late_payments",
            disputes,
            cfg,
            now: Utc::now(),
        }
    }

    #[test]
    fn materializes_a_basic_batch() {
        let cfg = PlanConfig::default();
        let m = materializer(&cfg, None);
        let batch = m
            .materialize(
                Uuid::from_u128(1),
                "Equifax",
                1,
                vec![
                    action("a1", "reinvestigation", 1.0, EvidenceKind::Violation),
                    action("a2", "reinvestigation", 2.0, EvidenceKind::Contradiction),
                ],
            )
            .unwrap();

        assert_eq!(batch.bureau, "Equifax");
        assert_eq!(batch.furnisher, "CHASE");
        assert_eq!(batch.wave, 1);
        assert_eq!(batch.theory, "reinvestigation");
        assert_eq!(batch.theory_label, "Reinvestigation Demand");
        assert_eq!(batch.risk, RiskLevel::Low);
        assert_eq!(batch.response_window_days, 30);
        assert_eq!(batch.violation_ids, vec!["ev-a1"]);
        assert_eq!(batch.contradiction_ids, vec!["ev-a2"]);
        assert!(!batch.locked);
        assert_eq!(
            batch.summary,
            "Wave 1: Reinvestigation Demand letter regarding Chase (goal: Remove Late Payments)"
        );
    }

    #[test]
    fn empty_group_is_an_error() {
        let cfg = PlanConfig::default();
        let m = materializer(&cfg, None);
        let err = m
            .materialize(Uuid::from_u128(1), "Equifax", 1, Vec::new())
            .unwrap_err();
        assert!(matches!(err, RedressError::EmptyBatch));
    }

    #[test]
    fn mixed_furnishers_are_an_error() {
        let cfg = PlanConfig::default();
        let m = materializer(&cfg, None);
        let mut second = action("a2", "reinvestigation", 1.0, EvidenceKind::Violation);
        second.furnisher = Some("Capital One".to_string());

        let err = m
            .materialize(
                Uuid::from_u128(1),
                "Equifax",
                2,
                vec![
                    action("a1", "reinvestigation", 1.0, EvidenceKind::Violation),
                    second,
                ],
            )
            .unwrap_err();
        match err {
            RedressError::MixedFurnisherBatch {
                bureau,
                wave,
                expected,
                found,
            } => {
                assert_eq!(bureau, "Equifax");
                assert_eq!(wave, 2);
                assert_eq!(expected, "CHASE");
                assert_eq!(found, "CAPITAL ONE");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn dominant_theory_prefers_frequency_then_first_seen() {
        let actions = vec![
            action("a1", "procedural", 1.0, EvidenceKind::Violation),
            action("a2", "reinvestigation", 1.0, EvidenceKind::Violation),
            action("a3", "reinvestigation", 1.0, EvidenceKind::Violation),
        ];
        assert_eq!(dominant_theory(&actions), "reinvestigation");

        let tied = vec![
            action("a1", "procedural", 1.0, EvidenceKind::Violation),
            action("a2", "reinvestigation", 1.0, EvidenceKind::Violation),
        ];
        assert_eq!(dominant_theory(&tied), "procedural");
    }

    #[test]
    fn risk_buckets_follow_the_average() {
        let cfg = PlanConfig::default();
        let m = materializer(&cfg, None);
        let cases = [
            (vec![1.0, 2.0], RiskLevel::Low),
            (vec![2.0, 2.0], RiskLevel::Medium),
            (vec![3.0, 4.8], RiskLevel::Medium),
            (vec![4.0, 4.0], RiskLevel::High),
        ];
        for (i, (risks, expected)) in cases.iter().enumerate() {
            let actions = risks
                .iter()
                .enumerate()
                .map(|(j, r)| {
                    action(&format!("a{i}-{j}"), "reinvestigation", *r, EvidenceKind::Violation)
                })
                .collect();
            let batch = m
                .materialize(Uuid::from_u128(i as u128), "Equifax", 1, actions)
                .unwrap();
            assert_eq!(batch.risk, *expected, "case {i}");
        }
    }

    #[test]
    fn evidence_ids_are_deduplicated() {
        let cfg = PlanConfig::default();
        let m = materializer(&cfg, None);
        let mut repeat = action("a2", "reinvestigation", 1.0, EvidenceKind::Violation);
        repeat.evidence.id = "ev-a1".to_string();

        let batch = m
            .materialize(
                Uuid::from_u128(1),
                "Equifax",
                1,
                vec![
                    action("a1", "reinvestigation", 1.0, EvidenceKind::Violation),
                    repeat,
                ],
            )
            .unwrap();
        assert_eq!(batch.violation_ids, vec!["ev-a1"]);
        assert!(batch.contradiction_ids.is_empty());
    }

    #[test]
    fn open_dispute_locks_the_batch() {
        let cfg = PlanConfig::default();
        let disputes = vec![PendingDispute {
            evidence_id: "ev-a1".to_string(),
            status: OPEN_STATUS.to_string(),
            dispute_date: None,
        }];
        let m = materializer(&cfg, Some(&disputes));

        let batch = m
            .materialize(
                Uuid::from_u128(1),
                "Equifax",
                1,
                vec![action("a1", "reinvestigation", 1.0, EvidenceKind::Violation)],
            )
            .unwrap();
        assert!(batch.locked);
        assert_eq!(batch.lock_reason, Some(LockReason::PendingResponse));
        assert_eq!(batch.unlock_conditions.len(), 3);
        assert!(batch.unlock_conditions[1].contains("45"));
    }

    #[test]
    fn closed_or_unrelated_disputes_do_not_lock() {
        let cfg = PlanConfig::default();
        let disputes = vec![
            PendingDispute {
                evidence_id: "ev-a1".to_string(),
                status: "resolved".to_string(),
                dispute_date: None,
            },
            PendingDispute {
                evidence_id: "ev-other".to_string(),
                status: OPEN_STATUS.to_string(),
                dispute_date: None,
            },
        ];
        let m = materializer(&cfg, Some(&disputes));

        let batch = m
            .materialize(
                Uuid::from_u128(1),
                "Equifax",
                1,
                vec![action("a1", "reinvestigation", 1.0, EvidenceKind::Violation)],
            )
            .unwrap();
        assert!(!batch.locked);
    }

    #[test]
    fn unknown_furnisher_summary_reads_naturally() {
        let cfg = PlanConfig::default();
        let m = materializer(&cfg, None);
        let mut nameless = action("a1", "reinvestigation", 1.0, EvidenceKind::Violation);
        nameless.furnisher = None;

        let batch = m
            .materialize(Uuid::from_u128(1), "Equifax", 1, vec![nameless])
            .unwrap();
        assert_eq!(batch.furnisher, UNKNOWN_FURNISHER);
        assert!(batch.summary.contains("regarding Unknown Furnisher"));
    }

    #[test]
    fn unlock_clears_lock_state() {
        let cfg = PlanConfig::default();
        let disputes = vec![PendingDispute {
            evidence_id: "ev-a1".to_string(),
            status: OPEN_STATUS.to_string(),
            dispute_date: None,
        }];
        let m = materializer(&cfg, Some(&disputes));
        let locked = m
            .materialize(
                Uuid::from_u128(1),
                "Equifax",
                1,
                vec![action("a1", "reinvestigation", 1.0, EvidenceKind::Violation)],
            )
            .unwrap();

        let now = Utc::now();
        let unlocked = locked.unlock(UnlockReason::TimeExpired, now);
        assert!(!unlocked.locked);
        assert_eq!(unlocked.lock_reason, None);
        assert!(unlocked.unlock_conditions.is_empty());
        assert_eq!(unlocked.response_received_at, None);
        assert!(locked.locked, "original is untouched");

        let answered = locked.unlock(UnlockReason::ResponseReceived, now);
        assert_eq!(answered.response_received_at, Some(now));
    }
}
