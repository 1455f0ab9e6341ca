use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = ".nook/config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NookConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
    #[serde(default)]
    pub tasks: TasksConfig,
    #[serde(default)]
    pub valentine: ValentineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    pub bind: String,
    pub database: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            database: PathBuf::from("tasks.db"),
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    #[default]
    Sqlite,
    JsonFiles,
}

impl StorageKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().replace('-', "_").as_str() {
            "sqlite" => Some(Self::Sqlite),
            "json_files" | "json" => Some(Self::JsonFiles),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::JsonFiles => "json_files",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValentineConfig {
    pub bind: String,
    #[serde(default)]
    pub storage: StorageKind,
    pub database: PathBuf,
    /// Directory holding `<collection>.json` files for the json_files backend.
    pub json_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for ValentineConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5001".to_string(),
            storage: StorageKind::Sqlite,
            database: PathBuf::from("valentine.db"),
            json_dir: PathBuf::from("valentine-data"),
            static_dir: PathBuf::from("valentine-static"),
        }
    }
}

impl Default for NookConfig {
    fn default() -> Self {
        let data_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nook-data");

        Self {
            data_dir,
            log_level: "info".to_string(),
            tasks: TasksConfig::default(),
            valentine: ValentineConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write config at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize default config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("config has invalid value: {0}")]
    ValidationFailed(String),
}

impl NookConfig {
    pub fn resolve_path() -> PathBuf {
        if let Ok(path) = env::var("NOOK_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_CONFIG_FILE)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::WriteFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, raw).map_err(|source| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    pub fn load_or_create() -> Result<(Self, PathBuf, bool), ConfigError> {
        let path = Self::resolve_path();
        Self::load_or_create_at(&path).map(|(cfg, created)| (cfg, path, created))
    }

    pub fn load_or_create_at(path: &Path) -> Result<(Self, bool), ConfigError> {
        if path.exists() {
            return Ok((Self::load(path)?, false));
        }

        let cfg = Self::default();
        cfg.save(path)?;
        Ok((cfg, true))
    }

    /// Resolves a configured path against `data_dir` unless it is absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn tasks_db_path(&self) -> PathBuf {
        self.resolve(&self.tasks.database)
    }

    pub fn valentine_db_path(&self) -> PathBuf {
        self.resolve(&self.valentine.database)
    }

    pub fn validate_and_prepare(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "log_level cannot be empty".to_string(),
            ));
        }
        for (field, value) in [
            ("tasks.bind", &self.tasks.bind),
            ("valentine.bind", &self.valentine.bind),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "{field} cannot be empty"
                )));
            }
        }
        for (field, value) in [
            ("tasks.database", &self.tasks.database),
            ("valentine.database", &self.valentine.database),
            ("valentine.json_dir", &self.valentine.json_dir),
        ] {
            if value.as_os_str().is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "{field} cannot be empty"
                )));
            }
        }
        fs::create_dir_all(&self.data_dir).map_err(|source| ConfigError::WriteFailed {
            path: self.data_dir.clone(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_default_config_once() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("conf").join("config.toml");

        let (_, created) = NookConfig::load_or_create_at(&path).expect("create");
        assert!(created);
        let (cfg, created) = NookConfig::load_or_create_at(&path).expect("load");
        assert!(!created);
        assert_eq!(cfg.tasks.bind, "127.0.0.1:5000");
        assert_eq!(cfg.valentine.storage, StorageKind::Sqlite);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            "data_dir = \"/srv/nook\"\nlog_level = \"debug\"\n\n[valentine]\nbind = \"0.0.0.0:5001\"\nstorage = \"json_files\"\ndatabase = \"v.db\"\njson_dir = \"/var/valentine\"\nstatic_dir = \"static\"\n",
        )
        .expect("write");

        let cfg = NookConfig::load(&path).expect("load");
        assert_eq!(cfg.tasks.database, PathBuf::from("tasks.db"));
        assert_eq!(cfg.valentine.storage, StorageKind::JsonFiles);
        assert_eq!(cfg.tasks_db_path(), PathBuf::from("/srv/nook/tasks.db"));
        assert_eq!(
            cfg.resolve(&cfg.valentine.json_dir),
            PathBuf::from("/var/valentine")
        );
    }

    #[test]
    fn rejects_blank_bind_address() {
        let tmp = tempdir().expect("tempdir");
        let mut cfg = NookConfig {
            data_dir: tmp.path().join("data"),
            ..NookConfig::default()
        };
        cfg.tasks.bind = " ".to_string();
        let err = cfg.validate_and_prepare().expect_err("must fail");
        assert!(err.to_string().contains("tasks.bind"));
    }

    #[test]
    fn storage_kind_accepts_dashed_names() {
        assert_eq!(StorageKind::parse("json-files"), Some(StorageKind::JsonFiles));
        assert_eq!(StorageKind::parse("SQLite"), Some(StorageKind::Sqlite));
        assert_eq!(StorageKind::parse("redis"), None);
    }
}
