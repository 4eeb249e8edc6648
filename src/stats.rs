/// Counters accumulated as a side effect of agent calls
///
/// Never consulted by the policy or the update rule.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TrainingStats {
    pub updates: u64,
    pub explorations: u64,
    pub exploitations: u64,
}

impl TrainingStats {
    pub fn selections(&self) -> u64 {
        self.explorations + self.exploitations
    }
}

/// Read-only snapshot of an agent's learning progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    /// Distinct states with at least one materialized table entry
    pub states_visited: usize,
    /// Materialized (state, action) entries in the table
    pub state_action_pairs: usize,
    /// Bellman updates performed
    pub updates: u64,
    /// Action selections made through the epsilon greedy policy
    pub selections: u64,
    /// Selections that drew a random action
    pub explorations: u64,
    /// Selections that took the greedy action
    pub exploitations: u64,
    /// Current exploration rate
    pub epsilon: f64,
}
