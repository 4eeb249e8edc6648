use std::{fmt, hash::Hash, path::Path};

use log::info;
use rand::{seq::SliceRandom, thread_rng};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::{Error, Result},
    exploration::{Choice, EpsilonGreedy},
    serialization::{SavedAgent, TableEntry},
    stats::{StatsSnapshot, TrainingStats},
    table::ActionValueTable,
};

/// Configuration for a [`QAgent`]
#[derive(Debug, Clone, PartialEq)]
pub struct QAgentConfig {
    /// Learning rate α, in `(0, 1]`
    pub learning_rate: f64,
    /// Discount factor γ, in `[0, 1]`
    pub discount_factor: f64,
    /// Initial exploration rate ε, in `[0, 1]`
    pub epsilon: f64,
    /// Multiplicative per-episode decay applied to ε, in `(0, 1]`
    pub epsilon_decay: f64,
    /// Floor below which ε never decays, in `[0, epsilon]`
    pub epsilon_min: f64,
}

impl Default for QAgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.95,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            epsilon_min: 0.01,
        }
    }
}

/// A tabular Q-learning agent
///
/// Owns the action-value table, the epsilon greedy exploration policy, and
/// the Bellman update rule. It is driven externally: the caller runs the
/// environment, feeds `(state, action, reward, next_state, ...)` transitions
/// to [`QAgent::update`], and calls [`QAgent::decay_epsilon`] at episode
/// boundaries.
///
/// ### Generics
/// - `S` - The state type
/// - `A` - The action type
///
/// Both must be `Clone`, `Eq`, and `Hash` because a Q-value is recorded per
/// (state, action) pair; the agent makes no other assumption about the
/// environment.
pub struct QAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    table: ActionValueTable<S, A>,
    exploration: EpsilonGreedy,
    alpha: f64, // learning rate
    gamma: f64, // discount factor
    stats: TrainingStats,
}

impl<S, A> QAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    /// Initialize a new `QAgent` with an empty table and zeroed statistics
    ///
    /// Every hyperparameter is validated before any table state is created:
    /// `learning_rate` must be in `(0, 1]`, `discount_factor` in `[0, 1]`,
    /// `epsilon` and `epsilon_min` in `[0, 1]` with `epsilon_min <= epsilon`,
    /// and `epsilon_decay` in `(0, 1]`. The first violation is returned as
    /// [`Error::InvalidParameter`].
    pub fn new(config: QAgentConfig) -> Result<Self> {
        if !(config.learning_rate > 0.0 && config.learning_rate <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "learning_rate",
                value: config.learning_rate,
                interval: "(0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&config.discount_factor) {
            return Err(Error::InvalidParameter {
                name: "discount_factor",
                value: config.discount_factor,
                interval: "[0, 1]",
            });
        }
        let exploration =
            EpsilonGreedy::new(config.epsilon, config.epsilon_decay, config.epsilon_min)?;
        Ok(Self {
            table: ActionValueTable::new(),
            exploration,
            alpha: config.learning_rate,
            gamma: config.discount_factor,
            stats: TrainingStats::default(),
        })
    }

    /// The stored estimate for a (state, action) pair, or `0.0` if unseen
    ///
    /// A pure read; never materializes an entry.
    pub fn q_value(&self, state: &S, action: &A) -> f64 {
        self.table.get(state, action)
    }

    /// The maximum estimate for `state` over `candidates` (`0.0` if empty)
    pub fn max_q_value(&self, state: &S, candidates: &[A]) -> f64 {
        self.table.max_q(state, candidates)
    }

    /// The greedy action for `state` among `candidates`
    ///
    /// Ties go to the first maximal candidate in the order given, so the
    /// result is reproducible on an unchanged table. Fails with
    /// [`Error::EmptyActionSet`] if `candidates` is empty.
    pub fn best_action(&self, state: &S, candidates: &[A]) -> Result<A> {
        self.table
            .best_action(state, candidates)
            .cloned()
            .ok_or(Error::EmptyActionSet)
    }

    /// Choose an action for `state` with the epsilon greedy policy
    ///
    /// With probability ε a uniformly random candidate is taken, otherwise
    /// the greedy one. Increments the matching statistics counter; never
    /// mutates ε or the table. Fails with [`Error::EmptyActionSet`] if
    /// `candidates` is empty.
    pub fn choose_action(&mut self, state: &S, candidates: &[A]) -> Result<A> {
        if candidates.is_empty() {
            return Err(Error::EmptyActionSet);
        }
        let mut rng = thread_rng();
        match self.exploration.choose(&mut rng) {
            Choice::Explore => {
                self.stats.explorations += 1;
                candidates
                    .choose(&mut rng)
                    .cloned()
                    .ok_or(Error::EmptyActionSet)
            }
            Choice::Exploit => {
                self.stats.exploitations += 1;
                self.best_action(state, candidates)
            }
        }
    }

    /// Apply one Bellman update for an observed transition
    ///
    /// `Q(s, a) ← Q(s, a) + α · (target − Q(s, a))` where the target is
    /// `reward` for a terminal transition and
    /// `reward + γ · max_a' Q(next_state, a')` otherwise. An empty
    /// `possible_next_actions` on a non-terminal transition contributes a
    /// zero continuation term for this update only; `done` bookkeeping stays
    /// with the caller. The new estimate overwrites the entry in place,
    /// materializing it if needed.
    pub fn update(
        &mut self,
        state: S,
        action: A,
        reward: f64,
        next_state: &S,
        possible_next_actions: &[A],
        done: bool,
    ) {
        let q = self.table.get(&state, &action);
        let target = if done {
            reward
        } else {
            reward + self.gamma * self.table.max_q(next_state, possible_next_actions)
        };
        let new_q = q + self.alpha * (target - q);
        self.table.set(state, action, new_q);
        self.stats.updates += 1;
    }

    /// Decay ε toward its floor; intended to be called once per episode
    pub fn decay_epsilon(&mut self) {
        self.exploration.decay();
    }

    /// Snapshot of the learning progress counters
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            states_visited: self.table.num_states(),
            state_action_pairs: self.table.len(),
            updates: self.stats.updates,
            selections: self.stats.selections(),
            explorations: self.stats.explorations,
            exploitations: self.stats.exploitations,
            epsilon: self.exploration.epsilon(),
        }
    }

    pub fn table(&self) -> &ActionValueTable<S, A> {
        &self.table
    }

    pub fn learning_rate(&self) -> f64 {
        self.alpha
    }

    pub fn discount_factor(&self) -> f64 {
        self.gamma
    }

    pub fn epsilon(&self) -> f64 {
        self.exploration.epsilon()
    }

    pub fn epsilon_decay(&self) -> f64 {
        self.exploration.decay_factor()
    }

    pub fn epsilon_min(&self) -> f64 {
        self.exploration.floor()
    }
}

impl<S, A> QAgent<S, A>
where
    S: Clone + Eq + Hash + Serialize + DeserializeOwned,
    A: Clone + Eq + Hash + Serialize + DeserializeOwned,
{
    /// Serialize the table, parameters, and current ε to `path`
    ///
    /// The snapshot is written to a sibling temporary file and atomically
    /// renamed into place, so a failed save never leaves a partial file
    /// visible at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let snapshot = SavedAgent {
            version: SavedAgent::<S, A>::VERSION,
            learning_rate: self.alpha,
            discount_factor: self.gamma,
            epsilon: self.exploration.epsilon(),
            epsilon_decay: self.exploration.decay_factor(),
            epsilon_min: self.exploration.floor(),
            table: self
                .table
                .entries()
                .map(|(state, action, value)| TableEntry {
                    state: state.clone(),
                    action: action.clone(),
                    value,
                })
                .collect(),
        };
        snapshot.save_to_file(path.as_ref())?;
        info!(
            "saved agent with {} table entries to {:?}",
            snapshot.table.len(),
            path.as_ref()
        );
        Ok(())
    }

    /// Restore the table, parameters, and ε from a snapshot at `path`
    ///
    /// Fully replaces the in-memory state; the restored agent behaves
    /// identically to the one that was saved. Statistics counters are not
    /// part of the snapshot and restart from zero. Fails if the snapshot is
    /// missing, unreadable, or does not match the documented schema.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let snapshot = SavedAgent::<S, A>::load_from_file(path.as_ref())?;
        let mut agent = Self::new(QAgentConfig {
            learning_rate: snapshot.learning_rate,
            discount_factor: snapshot.discount_factor,
            epsilon: snapshot.epsilon,
            epsilon_decay: snapshot.epsilon_decay,
            epsilon_min: snapshot.epsilon_min,
        })?;
        let num_entries = snapshot.table.len();
        for entry in snapshot.table {
            agent.table.set(entry.state, entry.action, entry.value);
        }
        *self = agent;
        info!(
            "loaded agent with {} table entries from {:?}",
            num_entries,
            path.as_ref()
        );
        Ok(())
    }
}

impl<S, A> fmt::Display for QAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QAgent(learning_rate={}, discount_factor={}, epsilon={:.3})",
            self.alpha,
            self.gamma,
            self.exploration.epsilon()
        )
    }
}
