//! Splitting a furnisher's action run into letter-sized groups.
//!
//! Actions arrive already sorted by priority. A group never exceeds the
//! configured cap, never mixes legal theories, and never contains an action
//! whose dependency lands in a later group. Dependency order is restored by
//! deferring not-yet-satisfiable actions to a queue that is resolved to a
//! fixpoint, rather than by reordering the input.

use crate::action::EnforcementAction;
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Packer
// ---------------------------------------------------------------------------

struct Packer {
    max_actions: usize,
    groups: Vec<Vec<EnforcementAction>>,
    current: Vec<EnforcementAction>,
    placed: HashSet<String>,
}

impl Packer {
    fn new(max_actions: usize) -> Self {
        Self {
            max_actions,
            groups: Vec::new(),
            current: Vec::new(),
            placed: HashSet::new(),
        }
    }

    /// True if `dep` names an action in an earlier group or the
    /// accumulating group.
    fn dep_met(&self, dep: &str) -> bool {
        self.placed.contains(dep) || self.current.iter().any(|a| a.id == dep)
    }

    fn unmet_dependency(&self, action: &EnforcementAction) -> bool {
        action.depends_on.iter().any(|dep| !self.dep_met(dep))
    }

    fn push(&mut self, action: EnforcementAction, force_boundary: bool) {
        let boundary = force_boundary
            || self.current.len() >= self.max_actions
            || self
                .current
                .last()
                .map_or(false, |last| last.theory != action.theory);
        if boundary && !self.current.is_empty() {
            self.flush();
        }
        self.current.push(action);
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        for action in &self.current {
            self.placed.insert(action.id.clone());
        }
        self.groups.push(std::mem::take(&mut self.current));
    }
}

/// Split one furnisher's sorted actions into letter-sized groups.
///
/// An action whose dependency has not been placed yet is deferred, and the
/// deferred queue is then resolved to a fixpoint: each round places whatever
/// has become satisfiable, so a chain of deferred actions unwinds in
/// dependency order rather than priority order. A dependency that can never
/// be met (it was dropped upstream or belongs to another furnisher) only
/// forces a fresh group so the run still terminates.
pub fn pack_actions(
    actions: Vec<EnforcementAction>,
    max_actions: usize,
) -> Vec<Vec<EnforcementAction>> {
    let mut packer = Packer::new(max_actions);
    let mut deferred = Vec::new();

    for action in actions {
        if packer.unmet_dependency(&action) {
            tracing::debug!("action {} deferred behind its dependency", action.id);
            deferred.push(action);
        } else {
            packer.push(action, false);
        }
    }
    packer.flush();

    while !deferred.is_empty() {
        let before = deferred.len();
        let mut waiting = Vec::new();
        for action in deferred {
            if packer.unmet_dependency(&action) {
                waiting.push(action);
            } else {
                packer.push(action, false);
            }
        }
        deferred = waiting;

        if deferred.len() == before {
            // Stuck: release the first action whose missing dependency is
            // not in the queue either, or the front of the queue when the
            // remaining dependencies are circular.
            let idx = deferred
                .iter()
                .position(|a| !blocked_on_queue(a, &deferred, &packer))
                .unwrap_or(0);
            let action = deferred.remove(idx);
            tracing::debug!("action {} has an unmeetable dependency", action.id);
            packer.push(action, true);
        }
    }
    packer.flush();

    packer.groups
}

/// True if some still-unmet dependency of `action` names an action that is
/// itself waiting in the deferred queue.
fn blocked_on_queue(
    action: &EnforcementAction,
    queue: &[EnforcementAction],
    packer: &Packer,
) -> bool {
    action
        .depends_on
        .iter()
        .any(|dep| !packer.dep_met(dep) && queue.iter().any(|other| &other.id == dep))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
