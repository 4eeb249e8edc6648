use std::{collections::HashMap, hash::Hash};

/// A sparse action-value table backed by a two-level hash map
///
/// Maps each state to the Q-values of the actions tried in it. Unseen
/// (state, action) pairs read as `0.0` without being materialized; writes
/// materialize the entry so a snapshot captures every pair ever updated.
/// Entries are never removed.
///
/// ### Generics
/// - `S` - The state type, used as an outer key
/// - `A` - The action type, used as an inner key
///
/// Both must be `Clone`, `Eq`, and `Hash` to serve as [`HashMap`] keys.
#[derive(Debug, Clone)]
pub struct ActionValueTable<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    values: HashMap<S, HashMap<A, f64>>,
}

impl<S, A> ActionValueTable<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Get the estimate for a (state, action) pair, or `0.0` if unseen
    ///
    /// A pure read, does not create an entry.
    pub fn get(&self, state: &S, action: &A) -> f64 {
        self.values
            .get(state)
            .and_then(|actions| actions.get(action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Overwrite the estimate for a (state, action) pair, materializing it
    pub fn set(&mut self, state: S, action: A, value: f64) {
        self.values.entry(state).or_default().insert(action, value);
    }

    /// Maximum estimate for `state` over `candidates`, or `0.0` if `candidates` is empty
    pub fn max_q(&self, state: &S, candidates: &[A]) -> f64 {
        if candidates.is_empty() {
            return 0.0;
        }
        candidates
            .iter()
            .map(|a| self.get(state, a))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// The candidate with the highest estimate for `state`, or `None` if `candidates` is empty
    ///
    /// Ties go to the first maximal candidate in the order given, so repeated
    /// calls on an unchanged table always return the same action.
    pub fn best_action<'a>(&self, state: &S, candidates: &'a [A]) -> Option<&'a A> {
        let mut best: Option<(&'a A, f64)> = None;
        for action in candidates {
            let q = self.get(state, action);
            match best {
                Some((_, best_q)) if q <= best_q => {}
                _ => best = Some((action, q)),
            }
        }
        best.map(|(action, _)| action)
    }

    /// Number of distinct states with at least one materialized entry
    pub fn num_states(&self) -> usize {
        self.values.len()
    }

    /// Total number of materialized (state, action) entries
    pub fn len(&self) -> usize {
        self.values.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all materialized entries
    pub fn entries(&self) -> impl Iterator<Item = (&S, &A, f64)> {
        self.values.iter().flat_map(|(state, actions)| {
            actions.iter().map(move |(action, &value)| (state, action, value))
        })
    }
}

impl<S, A> Default for ActionValueTable<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
