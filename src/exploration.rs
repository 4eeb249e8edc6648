use rand::Rng;

use crate::error::{Error, Result};

/// Exploration policy result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy with a multiplicative per-episode decay
///
/// Holds the current epsilon threshold together with its decay factor and
/// floor. [`EpsilonGreedy::decay`] is intended to be invoked once per
/// completed episode by the caller; the policy itself has no notion of
/// episode boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f64,
    decay: f64,
    floor: f64,
}

impl EpsilonGreedy {
    /// Initialize the policy, validating every parameter
    ///
    /// `epsilon` and `floor` must be in `[0, 1]` with `floor <= epsilon`,
    /// and `decay` must be in `(0, 1]`.
    pub fn new(epsilon: f64, decay: f64, floor: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                value: epsilon,
                interval: "[0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&floor) {
            return Err(Error::InvalidParameter {
                name: "epsilon_min",
                value: floor,
                interval: "[0, 1]",
            });
        }
        if floor > epsilon {
            return Err(Error::InvalidParameter {
                name: "epsilon_min",
                value: floor,
                interval: "[0, epsilon]",
            });
        }
        if !(decay > 0.0 && decay <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "epsilon_decay",
                value: decay,
                interval: "(0, 1]",
            });
        }
        Ok(Self {
            epsilon,
            decay,
            floor,
        })
    }

    /// Invoke the policy with one uniform sample in `[0, 1)`
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Choice {
        if rng.gen::<f64>() < self.epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    /// Decay epsilon toward the floor
    ///
    /// Idempotent once the floor is reached; repeated calls never push
    /// epsilon below it.
    pub fn decay(&mut self) {
        self.epsilon = (self.epsilon * self.decay).max(self.floor);
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn decay_factor(&self) -> f64 {
        self.decay
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }
}
