use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PlanConfig
// ---------------------------------------------------------------------------

/// Planner bounds and recommended response windows. Callers usually embed
/// this in their own configuration; every field has a serde default so an
/// empty document yields the stock values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Hard cap on actions per letter batch.
    #[serde(default = "default_max_batch_actions")]
    pub max_batch_actions: usize,
    /// Days a recipient is given to respond to a letter.
    #[serde(default = "default_response_window_days")]
    pub response_window_days: u32,
    /// Days after which a silent recipient no longer blocks the next wave.
    #[serde(default = "default_extended_window_days")]
    pub extended_window_days: u32,
}

fn default_max_batch_actions() -> usize {
    4
}

fn default_response_window_days() -> u32 {
    30
}

fn default_extended_window_days() -> u32 {
    45
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            max_batch_actions: default_max_batch_actions(),
            response_window_days: default_response_window_days(),
            extended_window_days: default_extended_window_days(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
