//! Table persistence for saving and loading trained agents
//!
//! The learned table is written as JSON together with the metadata needed to
//! reuse it: the hyperparameters it was trained with, the grid size, episode
//! count and the crate version. Loading is all or nothing: a single malformed
//! entry aborts the load, since a partially restored table would silently
//! change the learned behavior.

use super::{QAgent, QLearningConfig, QTable, observation::Observation};
use crate::game::Direction;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Metadata saved with the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Q-learning configuration used during training
    pub q_config: QLearningConfig,

    /// Grid width in cells
    pub grid_width: usize,

    /// Grid height in cells
    pub grid_height: usize,

    /// Number of episodes trained
    pub episodes_trained: usize,

    /// Exploration rate when the table was saved
    pub exploration_rate: f64,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl TableMetadata {
    pub fn new(
        q_config: QLearningConfig,
        grid_width: usize,
        grid_height: usize,
        episodes_trained: usize,
        exploration_rate: f64,
    ) -> Self {
        Self {
            q_config,
            grid_width,
            grid_height,
            episodes_trained,
            exploration_rate,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// One persisted (state, action) value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Observation flags as a `0`/`1` string
    pub state: String,
    /// Upper-case direction name
    pub action: String,
    pub value: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableFile {
    metadata: TableMetadata,
    entries: Vec<TableEntry>,
}

/// Save a trained agent's table
///
/// Creates parent directories if they don't exist. Entries are sorted so the
/// same table always produces the same file.
pub fn save_table(agent: &QAgent, grid_width: usize, grid_height: usize, path: &Path) -> Result<()> {
    create_parent_dir(path)?;

    let mut entries: Vec<TableEntry> = agent
        .table()
        .iter()
        .filter_map(|(state, action, value)| {
            Direction::from_index(action).map(|direction| TableEntry {
                state: state.to_key(),
                action: direction.name().to_string(),
                value,
            })
        })
        .collect();
    entries.sort_by(|a, b| (&a.state, &a.action).cmp(&(&b.state, &b.action)));

    let file = TableFile {
        metadata: TableMetadata::new(
            agent.config().clone(),
            grid_width,
            grid_height,
            agent.episodes_trained(),
            agent.exploration_rate(),
        ),
        entries,
    };

    let json = serde_json::to_string_pretty(&file).context("Failed to serialize table")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write table to {:?}", path))?;

    info!(path = %path.display(), entries = file.entries.len(), "Table saved");
    Ok(())
}

/// Load a table and its metadata
///
/// Fails on unknown action names, malformed state keys or non-finite values.
pub fn load_table(path: &Path) -> Result<(QTable, TableMetadata)> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read table from {:?}", path))?;
    let file: TableFile = serde_json::from_str(&json)
        .with_context(|| format!("Failed to deserialize table from {:?}", path))?;

    let mut table = QTable::new(file.metadata.q_config.default_value);
    for (index, entry) in file.entries.iter().enumerate() {
        let Some(state) = Observation::from_key(&entry.state) else {
            bail!("Entry {}: malformed state {:?}", index, entry.state);
        };
        let Some(direction) = Direction::from_name(&entry.action) else {
            bail!("Entry {}: unknown action {:?}", index, entry.action);
        };
        if !entry.value.is_finite() {
            bail!("Entry {}: non-finite value {}", index, entry.value);
        }
        table.set(state, direction.index(), entry.value);
    }

    info!(path = %path.display(), entries = table.len(), "Table loaded");
    Ok((table, file.metadata))
}

/// Load a table straight into an agent ready for play
pub fn load_agent(path: &Path) -> Result<(QAgent, TableMetadata)> {
    let (table, metadata) = load_table(path)?;
    let mut agent = QAgent::from_table(table, metadata.q_config.clone())
        .context("Saved configuration is invalid")?;
    agent.set_episodes_trained(metadata.episodes_trained);
    Ok((agent, metadata))
}

/// Write the per-episode reward history as `episode,total_reward` lines
pub fn save_reward_history(rewards: &[f64], path: &Path) -> Result<()> {
    create_parent_dir(path)?;

    let mut out = String::from("episode,total_reward\n");
    for (episode, reward) in rewards.iter().enumerate() {
        out.push_str(&format!("{},{}\n", episode + 1, reward));
    }

    std::fs::write(path, out)
        .with_context(|| format!("Failed to write reward history to {:?}", path))?;
    Ok(())
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }
    Ok(())
}
