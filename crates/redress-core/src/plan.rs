//! Top-level wave planning.
//!
//! [`WavePlanner::plan`] turns a prioritized recommendation into a
//! [`WavePlan`]: per-bureau batch sequences with wave locks applied and
//! plan-wide totals. The clock and the batch id source are injected so a
//! plan can be reproduced exactly in tests and replays.

use crate::batch::{LetterBatch, Materializer};
use crate::config::PlanConfig;
use crate::dispute::PendingDispute;
use crate::error::Result;
use crate::group::group_actions;
use crate::lock::propagate_wave_locks;
use crate::pack::pack_actions;
use crate::recommendation::Recommendation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Batch id sources
// ---------------------------------------------------------------------------

/// Source of batch ids, injected so replays can reproduce a plan id-for-id.
pub trait BatchIds {
    fn next_id(&mut self) -> Uuid;
}

/// Production id source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl BatchIds for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic id source for tests and replays: 1, 2, 3, ...
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialIds(u128);

impl BatchIds for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        self.0 += 1;
        Uuid::from_u128(self.0)
    }
}

// ---------------------------------------------------------------------------
// Plan aggregates
// ---------------------------------------------------------------------------

/// All batches addressed to one bureau, in sending order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BureauPlan {
    pub bureau: String,
    pub batches: Vec<LetterBatch>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTotals {
    pub batches: usize,
    pub actions: usize,
    pub locked: usize,
    pub active: usize,
}

/// The complete output of one planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WavePlan {
    pub goal: String,
    pub bureaus: Vec<BureauPlan>,
    pub totals: PlanTotals,
    /// Action ids the upstream recommendation already set aside.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_action_ids: Vec<String>,
    /// Action ids dropped here for lack of a resolvable recipient.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_action_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// WavePlanner
// ---------------------------------------------------------------------------

pub struct WavePlanner {
    cfg: PlanConfig,
    now: DateTime<Utc>,
}

impl WavePlanner {
    pub fn new(cfg: PlanConfig, now: DateTime<Utc>) -> Self {
        Self { cfg, now }
    }

    /// Plan letter batches for a recommendation.
    ///
    /// Actions are sorted by ascending priority (ties keep input order),
    /// grouped by recipient and furnisher, packed into letter-sized groups,
    /// and chained per recipient with wave locks. Passing the caller's open
    /// disputes locks any batch whose evidence is already under dispute.
    pub fn plan(
        &self,
        recommendation: &Recommendation,
        disputes: Option<&[PendingDispute]>,
        ids: &mut dyn BatchIds,
    ) -> Result<WavePlan> {
        let mut actions = recommendation.actions.clone();
        actions.sort_by(|a, b| a.priority.total_cmp(&b.priority));

        let grouped = group_actions(&actions);
        let materializer = Materializer {
            goal: &recommendation.goal,
            disputes,
            cfg: &self.cfg,
            now: self.now,
        };

        let mut bureaus = Vec::with_capacity(grouped.bureaus.len());
        for bureau_group in grouped.bureaus {
            let mut batches = Vec::new();
            let mut wave = 0u32;
            for furnisher_group in bureau_group.furnishers {
                for group in pack_actions(furnisher_group.actions, self.cfg.max_batch_actions) {
                    wave += 1;
                    batches.push(materializer.materialize(
                        ids.next_id(),
                        &bureau_group.bureau,
                        wave,
                        group,
                    )?);
                }
            }
            let batches = propagate_wave_locks(batches, &self.cfg);
            tracing::debug!("planned {} batches for {}", batches.len(), bureau_group.bureau);
            bureaus.push(BureauPlan {
                bureau: bureau_group.bureau,
                batches,
            });
        }

        let totals = tally(&bureaus);
        tracing::debug!(
            "wave plan assembled: {} batches, {} actions, {} locked",
            totals.batches,
            totals.actions,
            totals.locked
        );

        Ok(WavePlan {
            goal: recommendation.goal.clone(),
            bureaus,
            totals,
            skipped_action_ids: recommendation.skipped_action_ids.clone(),
            excluded_action_ids: grouped.excluded,
            created_at: self.now,
        })
    }
}

fn tally(bureaus: &[BureauPlan]) -> PlanTotals {
    let mut totals = PlanTotals::default();
    for bureau in bureaus {
        for batch in &bureau.batches {
            totals.batches += 1;
            totals.actions += batch.actions.len();
            if batch.locked {
                totals.locked += 1;
            } else {
                totals.active += 1;
            }
        }
    }
    totals
}

/// Plan with stock configuration and random batch ids.
pub fn plan(
    recommendation: &Recommendation,
    disputes: Option<&[PendingDispute]>,
    now: DateTime<Utc>,
) -> Result<WavePlan> {
    WavePlanner::new(PlanConfig::default(), now).plan(recommendation, disputes, &mut RandomIds)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{EnforcementAction, EvidenceRef};
    use crate::types::EvidenceKind;

    fn action(id: &str, bureau: &str, furnisher: &str, priority: f64) -> EnforcementAction {
        EnforcementAction {
            id: id.to_string(),
            theory: "reinvestigation".to_string(),
            bureau: Some(bureau.to_string()),
            affected_bureaus: Vec::new(),
            furnisher: Some(furnisher.to_string()),
            priority,
            evidence: EvidenceRef {
                id: format!("ev-{id}"),
                kind: EvidenceKind::Violation,
            },
            risk: 1.0,
            depends_on: Vec::new(),
        }
    }

    fn recommendation(actions: Vec<EnforcementAction>) -> Recommendation {
        Recommendation {
            goal: "remove_late_payments".to_string(),
            actions,
            skipped_action_ids: vec!["pre-skipped".to_string()],
        }
    }

    #[test]
    fn waves_number_across_furnishers_per_recipient() {
        let rec = recommendation(vec![
            action("a1", "equifax", "Chase", 1.0),
            action("a2", "equifax", "Capital One", 2.0),
            action("a3", "experian", "Chase", 3.0),
        ]);
        let planner = WavePlanner::new(PlanConfig::default(), Utc::now());
        let plan = planner.plan(&rec, None, &mut SequentialIds::default()).unwrap();

        assert_eq!(plan.bureaus.len(), 2);
        let equifax = &plan.bureaus[0];
        assert_eq!(equifax.bureau, "Equifax");
        assert_eq!(equifax.batches.len(), 2);
        assert_eq!(equifax.batches[0].wave, 1);
        assert_eq!(equifax.batches[0].furnisher, "CHASE");
        assert_eq!(equifax.batches[1].wave, 2);
        assert_eq!(equifax.batches[1].furnisher, "CAPITAL ONE");
        assert_eq!(plan.bureaus[1].batches[0].wave, 1);
    }

    #[test]
    fn priority_orders_furnisher_groups() {
        let rec = recommendation(vec![
            action("low", "equifax", "Capital One", 5.0),
            action("high", "equifax", "Chase", 1.0),
        ]);
        let planner = WavePlanner::new(PlanConfig::default(), Utc::now());
        let plan = planner.plan(&rec, None, &mut SequentialIds::default()).unwrap();

        let batches = &plan.bureaus[0].batches;
        assert_eq!(batches[0].furnisher, "CHASE");
        assert_eq!(batches[1].furnisher, "CAPITAL ONE");
    }

    #[test]
    fn totals_and_carryover_fields() {
        let rec = recommendation(vec![
            action("a1", "equifax", "Chase", 1.0),
            action("a2", "equifax", "Chase", 2.0),
            action("a3", "experian", "Chase", 3.0),
            action("dropped", "", "Chase", 4.0),
        ]);
        let planner = WavePlanner::new(PlanConfig::default(), Utc::now());
        let plan = planner.plan(&rec, None, &mut SequentialIds::default()).unwrap();

        assert_eq!(plan.totals.batches, 2);
        assert_eq!(plan.totals.actions, 3);
        assert_eq!(plan.totals.locked, 0);
        assert_eq!(plan.totals.active, 2);
        assert_eq!(plan.skipped_action_ids, vec!["pre-skipped"]);
        assert_eq!(plan.excluded_action_ids, vec!["dropped"]);
        assert_eq!(plan.goal, "remove_late_payments");
    }

    #[test]
    fn empty_recommendation_yields_empty_plan() {
        let rec = Recommendation {
            goal: "cleanup".to_string(),
            actions: Vec::new(),
            skipped_action_ids: Vec::new(),
        };
        let plan = plan(&rec, None, Utc::now()).unwrap();
        assert!(plan.bureaus.is_empty());
        assert_eq!(plan.totals, PlanTotals::default());
    }

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIds::default();
        assert_eq!(ids.next_id(), Uuid::from_u128(1));
        assert_eq!(ids.next_id(), Uuid::from_u128(2));
    }
}
