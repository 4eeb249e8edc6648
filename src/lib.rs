/// The tabular Q-learning agent
pub mod agent;

/// Error types
pub mod error;

/// Exploration policies
pub mod exploration;

/// On-disk snapshots of trained agents
pub mod serialization;

/// Training statistics
pub mod stats;

/// The action-value table
pub mod table;

pub use agent::{QAgent, QAgentConfig};
pub use error::{Error, Result};
pub use stats::StatsSnapshot;
pub use table::ActionValueTable;
