use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use merge1024_core::{BoardSize, GameSettings, Tile};
use serde::Deserialize;

pub const DEFAULT_STATS_FILE: &str = "merge1024-stats.json";

/// Defaults read from the optional TOML config file.
///
/// ```toml
/// board_size = 5
/// target_sum = 2048
/// player = "ann"
/// stats_file = "stats.json"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub board_size: Option<BoardSize>,
    pub target_sum: Option<Tile>,
    pub player: Option<String>,
    pub stats_file: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn load_optional(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Settings from the file, with command-line values taking precedence.
    pub fn settings(
        &self,
        board_size: Option<BoardSize>,
        target_sum: Option<Tile>,
    ) -> anyhow::Result<GameSettings> {
        let board_size = board_size
            .or(self.board_size)
            .unwrap_or(GameSettings::DEFAULT_BOARD_SIZE);
        let target_sum = target_sum
            .or(self.target_sum)
            .unwrap_or(GameSettings::DEFAULT_TARGET_SUM);
        GameSettings::new(board_size, target_sum).context("Invalid game settings")
    }

    pub fn player(&self, player: Option<String>) -> Option<String> {
        player.or_else(|| self.player.clone())
    }

    pub fn stats_file(&self, stats_file: Option<PathBuf>) -> PathBuf {
        stats_file
            .or_else(|| self.stats_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATS_FILE))
    }
}
