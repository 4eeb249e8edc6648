//! Snapshot serialization for trained agents

use std::{
    fs::{self, File},
    hash::Hash,
    io::{BufReader, BufWriter},
    path::Path,
};

use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{Error, Result};

/// One materialized (state, action, value) entry of the table
///
/// The table is flattened to a list for serialization because JSON objects
/// can only be keyed by strings, not by arbitrary state types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableEntry<S, A> {
    pub state: S,
    pub action: A,
    pub value: f64,
}

/// On-disk representation of a trained agent
///
/// A versioned JSON document holding the four hyperparameters, the current
/// epsilon, and every materialized table entry. Loading parses exactly this
/// schema and nothing else: unknown fields are rejected, and no field can
/// carry executable content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SavedAgent<S, A> {
    pub version: u32,
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub epsilon: f64,
    pub epsilon_decay: f64,
    pub epsilon_min: f64,
    pub table: Vec<TableEntry<S, A>>,
}

impl<S, A> SavedAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    pub const VERSION: u32 = 1;

    /// Write the snapshot to `path`, atomically
    ///
    /// The document is written to a sibling `.tmp` file, synced, and renamed
    /// into place, so readers of `path` never observe a partial snapshot.
    pub fn save_to_file(&self, path: &Path) -> Result<()>
    where
        S: Serialize,
        A: Serialize,
    {
        let tmp = path.with_extension("tmp");
        let file = File::create(&tmp).map_err(|source| Error::SnapshotIo {
            operation: "create",
            path: tmp.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(|source| Error::SnapshotFormat {
            path: tmp.clone(),
            source,
        })?;
        let file = writer
            .into_inner()
            .map_err(|source| Error::SnapshotIo {
                operation: "flush",
                path: tmp.clone(),
                source: source.into_error(),
            })?;
        file.sync_all().map_err(|source| Error::SnapshotIo {
            operation: "sync",
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| Error::SnapshotIo {
            operation: "publish",
            path: path.to_path_buf(),
            source,
        })?;
        debug!("wrote snapshot to {path:?}");
        Ok(())
    }

    /// Read a snapshot from `path`, rejecting anything outside the schema
    pub fn load_from_file(path: &Path) -> Result<Self>
    where
        S: DeserializeOwned,
        A: DeserializeOwned,
    {
        let file = File::open(path).map_err(|source| Error::SnapshotIo {
            operation: "open",
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        let snapshot: Self =
            serde_json::from_reader(reader).map_err(|source| Error::SnapshotFormat {
                path: path.to_path_buf(),
                source,
            })?;
        if snapshot.version != Self::VERSION {
            return Err(Error::SnapshotVersion {
                found: snapshot.version,
                expected: Self::VERSION,
            });
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::agent::{QAgent, QAgentConfig};

    fn trained_agent() -> QAgent<(i32, i32), char> {
        let mut agent = QAgent::new(QAgentConfig {
            learning_rate: 0.5,
            discount_factor: 0.9,
            ..Default::default()
        })
        .unwrap();
        agent.update((0, 0), 'r', -1.0, &(0, 1), &['r', 'd'], false);
        agent.update((0, 1), 'd', -1.0, &(1, 1), &['r', 'd'], false);
        agent.update((1, 1), 'r', 10.0, &(1, 2), &[], true);
        for _ in 0..3 {
            agent.decay_epsilon();
        }
        agent
    }

    #[test]
    fn round_trip_preserves_table_parameters_and_epsilon() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agent.json");
        let agent = trained_agent();
        agent.save(&path).unwrap();

        let mut restored: QAgent<(i32, i32), char> =
            QAgent::new(QAgentConfig::default()).unwrap();
        restored.load(&path).unwrap();

        for (state, action, value) in agent.table().entries() {
            assert_eq!(restored.q_value(state, action), value);
        }
        assert_eq!(restored.stats().state_action_pairs, agent.stats().state_action_pairs);
        assert_eq!(restored.learning_rate(), agent.learning_rate());
        assert_eq!(restored.discount_factor(), agent.discount_factor());
        assert_eq!(restored.epsilon(), agent.epsilon());
        assert_eq!(restored.epsilon_decay(), agent.epsilon_decay());
        assert_eq!(restored.epsilon_min(), agent.epsilon_min());
    }

    #[test]
    fn save_leaves_no_temporary_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agent.json");
        trained_agent().save(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn load_of_missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let mut agent: QAgent<u32, u32> = QAgent::new(QAgentConfig::default()).unwrap();
        let result = agent.load(dir.path().join("nope.json"));
        assert!(matches!(result, Err(Error::SnapshotIo { .. })));
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agent.json");
        fs::write(
            &path,
            r#"{"version":1,"learning_rate":0.1,"discount_factor":0.95,
                "epsilon":1.0,"epsilon_decay":0.995,"epsilon_min":0.01,
                "table":[],"payload":"not part of the schema"}"#,
        )
        .unwrap();
        let result = SavedAgent::<u32, u32>::load_from_file(&path);
        assert!(matches!(result, Err(Error::SnapshotFormat { .. })));
    }

    #[test]
    fn load_rejects_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agent.json");
        fs::write(&path, r#"{"version":1,"learning_rate":0.1}"#).unwrap();
        let result = SavedAgent::<u32, u32>::load_from_file(&path);
        assert!(matches!(result, Err(Error::SnapshotFormat { .. })));
    }

    #[test]
    fn load_rejects_unsupported_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agent.json");
        fs::write(
            &path,
            r#"{"version":99,"learning_rate":0.1,"discount_factor":0.95,
                "epsilon":1.0,"epsilon_decay":0.995,"epsilon_min":0.01,"table":[]}"#,
        )
        .unwrap();
        let result = SavedAgent::<u32, u32>::load_from_file(&path);
        assert!(matches!(
            result,
            Err(Error::SnapshotVersion {
                found: 99,
                expected: 1
            })
        ));
    }
}
