// Configuration loading and validation (settings.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::optimizer::OptimizerLimits;

/// The subset search enumerates `2^n` masks over this many players.
const MAX_COMBO_SIZE_LIMIT: usize = 20;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// settings.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub league: LeagueSection,
    pub database: DatabaseSection,
    #[serde(default)]
    pub optimizer: OptimizerLimits,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueSection {
    /// League export (JSON) the commands read and write back.
    pub snapshot: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    pub dir: PathBuf,
}

impl Default for LoggingSection {
    fn default() -> Self {
        LoggingSection {
            dir: PathBuf::from("logs"),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/settings.toml` under `base_dir`. Does not copy
/// defaults; see [`load_config`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("settings.toml");
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Copy any missing defaults into `base_dir/config`, then load.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

impl Config {
    /// Relative paths in the config are taken from `base_dir`.
    pub fn resolve(&self, base_dir: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.snapshot.as_os_str().is_empty() {
        return Err(invalid("league.snapshot", "must not be empty"));
    }
    if config.database.path.trim().is_empty() {
        return Err(invalid("database.path", "must not be empty"));
    }
    if config.logging.dir.as_os_str().is_empty() {
        return Err(invalid("logging.dir", "must not be empty"));
    }

    let o = &config.optimizer;
    let caps: &[(&str, usize)] = &[
        ("optimizer.max_combo_size", o.max_combo_size),
        ("optimizer.max_path_steps", o.max_path_steps),
        ("optimizer.max_search_iterations", o.max_search_iterations),
        ("optimizer.single_candidates", o.single_candidates),
        ("optimizer.pair_outer", o.pair_outer),
        ("optimizer.pair_inner", o.pair_inner),
        ("optimizer.max_sweeteners", o.max_sweeteners),
        ("optimizer.max_willing_iterations", o.max_willing_iterations),
    ];
    for (name, val) in caps {
        if *val == 0 {
            return Err(invalid(name, "must be > 0"));
        }
    }
    if o.max_combo_size > MAX_COMBO_SIZE_LIMIT {
        return Err(invalid(
            "optimizer.max_combo_size",
            format!("must be at most {MAX_COMBO_SIZE_LIMIT}, got {}", o.max_combo_size),
        ));
    }

    let weights: &[(&str, f64)] = &[
        ("optimizer.pair_search_threshold", o.pair_search_threshold),
        ("optimizer.taken_value_weight", o.taken_value_weight),
        ("optimizer.dump_value_weight", o.dump_value_weight),
    ];
    for (name, val) in weights {
        if val.is_nan() || *val < 0.0 {
            return Err(invalid(name, format!("must be >= 0, got {val}")));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DEFAULTS: &str = include_str!("../defaults/settings.toml");

    fn write_settings(base: &Path, text: &str) {
        let config_dir = base.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("settings.toml"), text).unwrap();
    }

    #[test]
    fn shipped_defaults_load() {
        let tmp = tempfile::tempdir().unwrap();
        write_settings(tmp.path(), DEFAULTS);
        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.league.snapshot, PathBuf::from("data/league.json"));
        assert_eq!(config.database.path, "data/trades.db");
        assert_eq!(config.optimizer, OptimizerLimits::default());
        assert_eq!(config.logging.dir, PathBuf::from("logs"));
    }

    #[test]
    fn optional_sections_default() {
        let tmp = tempfile::tempdir().unwrap();
        write_settings(
            tmp.path(),
            "[league]\nsnapshot = \"l.json\"\n[database]\npath = \":memory:\"\n",
        );
        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.optimizer.max_path_steps, 60);
        assert_eq!(config.logging.dir, PathBuf::from("logs"));
    }

    #[test]
    fn rejects_zero_cap() {
        let tmp = tempfile::tempdir().unwrap();
        write_settings(
            tmp.path(),
            &DEFAULTS.replace("max_search_iterations = 500", "max_search_iterations = 0"),
        );
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "optimizer.max_search_iterations");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_oversized_combo() {
        let tmp = tempfile::tempdir().unwrap();
        write_settings(
            tmp.path(),
            &DEFAULTS.replace("max_combo_size = 15", "max_combo_size = 32"),
        );
        let err = load_config_from(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("max_combo_size"));
    }

    #[test]
    fn rejects_negative_weight() {
        let tmp = tempfile::tempdir().unwrap();
        write_settings(
            tmp.path(),
            &DEFAULTS.replace("dump_value_weight = 0.3", "dump_value_weight = -0.3"),
        );
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::ValidationError { field, message } => {
                assert_eq!(field, "optimizer.dump_value_weight");
                assert!(message.contains("-0.3"));
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_empty_database_path() {
        let tmp = tempfile::tempdir().unwrap();
        write_settings(
            tmp.path(),
            &DEFAULTS.replace("path = \"data/trades.db\"", "path = \"\""),
        );
        let err = load_config_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "database.path"));
    }

    #[test]
    fn missing_settings_is_file_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("settings.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_settings(tmp.path(), "this is not valid [[[ toml");
        assert!(matches!(
            load_config_from(tmp.path()).unwrap_err(),
            ConfigError::ParseError { .. }
        ));
    }

    #[test]
    fn ensure_config_files_copies_missing_and_skips_examples() {
        let tmp = tempfile::tempdir().unwrap();
        let defaults_dir = tmp.path().join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join("settings.toml"), DEFAULTS).unwrap();
        fs::write(defaults_dir.join("local.toml.example"), "# example\n").unwrap();

        let copied = ensure_config_files(tmp.path()).unwrap();
        assert_eq!(copied.len(), 1);
        assert!(tmp.path().join("config/settings.toml").exists());
        assert!(!tmp.path().join("config/local.toml.example").exists());

        // second run leaves the existing copy alone
        fs::write(tmp.path().join("config/settings.toml"), "# custom\n").unwrap();
        assert!(ensure_config_files(tmp.path()).unwrap().is_empty());
        let content = fs::read_to_string(tmp.path().join("config/settings.toml")).unwrap();
        assert_eq!(content, "# custom\n");
    }

    #[test]
    fn ensure_config_files_needs_one_directory() {
        let tmp = tempfile::tempdir().unwrap();
        match ensure_config_files(tmp.path()).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        assert!(ensure_config_files(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn load_config_copies_then_loads() {
        let tmp = tempfile::tempdir().unwrap();
        let defaults_dir = tmp.path().join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join("settings.toml"), DEFAULTS).unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(
            config.resolve(tmp.path(), &config.league.snapshot),
            tmp.path().join("data/league.json")
        );
    }
}
