// JSON snapshot persistence for the league cache.

use std::path::Path;

use tracing::info;

use super::{League, LeagueError};

impl League {
    pub fn from_json_str(json: &str) -> Result<Self, LeagueError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, LeagueError> {
        let text = std::fs::read_to_string(path).map_err(|source| LeagueError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let league = Self::from_json_str(&text)?;
        info!(
            "Loaded league snapshot {}: season {}, phase {}, {} teams, {} players, {} picks",
            path.display(),
            league.settings.season,
            league.settings.phase,
            league.teams.len(),
            league.players.len(),
            league.draft_picks.len()
        );
        Ok(league)
    }

    pub fn to_json_string(&self) -> Result<String, LeagueError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the snapshot, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), LeagueError> {
        let io_err = |source| LeagueError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(io_err)?;
        info!("Saved league snapshot to {}", path.display());
        Ok(())
    }
}
