//! Grouping of enforcement actions by recipient and furnisher.
//!
//! Grouping is the single authority for who receives a letter. An action
//! naming several affected bureaus is exploded into one copy per bureau so
//! each recipient gets its own paper trail; an action with no resolvable
//! recipient is dropped here and reported, never silently lost.

use crate::action::EnforcementAction;
use crate::normalize::{canonical_bureau, normal_furnisher};

// ---------------------------------------------------------------------------
// Group structures
// ---------------------------------------------------------------------------

/// Actions grouped bureau-outermost, furnisher-innermost, in first-seen
/// order of the (already sorted) input.
#[derive(Debug, Clone, Default)]
pub struct GroupedActions {
    pub bureaus: Vec<BureauGroup>,
    /// Ids of actions dropped for lack of a resolvable recipient.
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BureauGroup {
    pub bureau: String,
    pub furnishers: Vec<FurnisherGroup>,
}

#[derive(Debug, Clone)]
pub struct FurnisherGroup {
    pub furnisher: String,
    pub actions: Vec<EnforcementAction>,
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Produce one copy of the action per resolvable recipient.
///
/// A non-empty `affected_bureaus` list takes precedence over the single
/// `bureau` field; duplicate aliases of the same bureau collapse to one
/// copy. The returned copies carry the canonical bureau name.
fn explode(action: &EnforcementAction) -> Vec<(String, EnforcementAction)> {
    if !action.affected_bureaus.is_empty() {
        let mut seen: Vec<String> = Vec::new();
        let mut copies = Vec::new();
        for raw in &action.affected_bureaus {
            let Some(bureau) = canonical_bureau(raw) else {
                continue;
            };
            if seen.contains(&bureau) {
                continue;
            }
            seen.push(bureau.clone());
            let mut copy = action.clone();
            copy.bureau = Some(bureau.clone());
            copies.push((bureau, copy));
        }
        return copies;
    }

    match action.bureau.as_deref().and_then(canonical_bureau) {
        Some(bureau) => {
            let mut copy = action.clone();
            copy.bureau = Some(bureau.clone());
            vec![(bureau, copy)]
        }
        None => Vec::new(),
    }
}

/// Group actions by recipient bureau, then by furnisher within each bureau.
///
/// Input order is preserved within each furnisher group, and groups appear
/// in the order their first action was seen. Actions with no resolvable
/// recipient land in `excluded`.
pub fn group_actions(actions: &[EnforcementAction]) -> GroupedActions {
    let mut grouped = GroupedActions::default();

    for action in actions {
        let copies = explode(action);
        if copies.is_empty() {
            tracing::warn!("action {} dropped: no resolvable recipient", action.id);
            grouped.excluded.push(action.id.clone());
            continue;
        }

        for (bureau, copy) in copies {
            let bureau_idx = match grouped.bureaus.iter().position(|g| g.bureau == bureau) {
                Some(idx) => idx,
                None => {
                    grouped.bureaus.push(BureauGroup {
                        bureau,
                        furnishers: Vec::new(),
                    });
                    grouped.bureaus.len() - 1
                }
            };

            let furnisher = normal_furnisher(copy.furnisher.as_deref());
            let bureau_group = &mut grouped.bureaus[bureau_idx];
            let furnisher_idx = match bureau_group
                .furnishers
                .iter()
                .position(|g| g.furnisher == furnisher)
            {
                Some(idx) => idx,
                None => {
                    bureau_group.furnishers.push(FurnisherGroup {
                        furnisher,
                        actions: Vec::new(),
                    });
                    bureau_group.furnishers.len() - 1
                }
            };

            bureau_group.furnishers[furnisher_idx].actions.push(copy);
        }
    }

    grouped
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
