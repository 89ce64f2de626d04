//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Database file name under the root folder
pub const DATABASE_FILE: &str = "smes.db";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable (`SMES_ROOT`)
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("SMES_ROOT") {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Create the root folder if it does not exist yet
pub fn ensure_root_folder(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root)?;
    Ok(())
}

/// Path of the survey database under the root folder
pub fn database_path(root: &Path) -> PathBuf {
    root.join(DATABASE_FILE)
}

/// Locate the platform configuration file (`smes/config.toml`)
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/smes/config.toml first, then /etc/smes/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("smes").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/smes/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let path = dirs::config_dir()
        .map(|d| d.join("smes").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("smes"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/smes"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("smes"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/smes"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("smes"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\smes"))
    } else {
        PathBuf::from("./smes_data")
    }
}

/// Service bind address loaded from the settings table
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5860,
        }
    }
}

/// Load host/port from the settings table, falling back to compiled
/// defaults when unset or unparseable.
#[cfg(feature = "sqlx")]
pub async fn load_service_config(db: &sqlx::SqlitePool) -> Result<ServiceConfig> {
    let defaults = ServiceConfig::default();

    let host = crate::db::settings::get_setting::<String>(db, "service_host")
        .await?
        .unwrap_or(defaults.host);
    let port = crate::db::settings::get_setting::<u16>(db, "service_port")
        .await?
        .unwrap_or(defaults.port);

    Ok(ServiceConfig { host, port })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_argument_wins() {
        let root = resolve_root_folder(Some("/tmp/smes-cli-root"));
        assert_eq!(root, PathBuf::from("/tmp/smes-cli-root"));
    }

    #[test]
    fn test_database_path() {
        let root = PathBuf::from("/data/smes");
        assert_eq!(database_path(&root), PathBuf::from("/data/smes/smes.db"));
    }

    #[test]
    fn test_default_service_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5860);
    }
}
