use anyhow::Result;
use directories::ProjectDirs;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::AppConfig;

const APP_NAME: &str = "RepoPromptSelect";
const CONFIG_FILE: &str = "config.json";

/// Returns the platform-specific configuration directory for the application.
pub fn get_config_directory() -> Option<PathBuf> {
    ProjectDirs::from("com", "repopromptselect", APP_NAME)
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
}

/// Returns the full path to the configuration file.
pub fn get_config_file_path() -> Option<PathBuf> {
    get_config_directory().map(|dir| dir.join(CONFIG_FILE))
}

fn resolve_config_path(override_path: Option<&Path>) -> Result<PathBuf> {
    match override_path {
        Some(path) => Ok(path.to_path_buf()),
        None => get_config_file_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory")),
    }
}

/// Loads the configuration from `override_path`, or from the platform config file.
///
/// A missing file is created with defaults. A file that cannot be parsed is
/// migrated if possible, otherwise the defaults are used.
pub fn load_config(override_path: Option<&Path>) -> Result<AppConfig> {
    let config_path = resolve_config_path(override_path)?;

    if !config_path.exists() {
        tracing::info!(
            "Config file not found, creating default config at {:?}",
            config_path
        );
        let default_config = AppConfig::default();
        save_config(&default_config, Some(&config_path))?;
        return Ok(default_config);
    }

    let config_content = fs::read_to_string(&config_path)?;

    match serde_json::from_str::<AppConfig>(&config_content) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", config_path);
            Ok(config)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse config file at {:?}: {}. Falling back to default config.",
                config_path,
                e
            );
            migrate_legacy_config(&config_content).or_else(|_| Ok(AppConfig::default()))
        }
    }
}

/// Fills fields that older config files lack (or hold as `null`) with defaults.
fn migrate_legacy_config(config_content: &str) -> Result<AppConfig> {
    let mut value: Value = serde_json::from_str(config_content)?;
    let obj = value
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Config is not a JSON object"))?;

    let defaults = serde_json::to_value(AppConfig::default())?;
    let Value::Object(defaults) = defaults else {
        anyhow::bail!("Default config did not serialize to an object");
    };

    for (key, default_val) in defaults {
        // `last_repository` is legitimately null.
        let missing = !obj.contains_key(&key)
            || (obj.get(&key) == Some(&Value::Null) && key != "last_repository");
        if missing {
            obj.insert(key, default_val);
        }
    }

    let migrated_config: AppConfig = serde_json::from_value(value)?;
    tracing::info!("Successfully migrated legacy config");
    Ok(migrated_config)
}

/// Saves the configuration to `override_path`, or to the platform config file.
pub fn save_config(config: &AppConfig, override_path: Option<&Path>) -> Result<()> {
    let config_path = resolve_config_path(override_path)?;

    if let Some(config_dir) = config_path.parent() {
        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            tracing::info!("Created config directory: {:?}", config_dir);
        }
    }

    let config_json = serde_json::to_string_pretty(config)?;
    fs::write(&config_path, config_json)?;
    tracing::info!("Saved config to {:?}", config_path);

    Ok(())
}

/// Exports the configuration to a user-specified JSON file.
pub fn export_config(config: &AppConfig, export_path: &Path) -> Result<()> {
    let config_json = serde_json::to_string_pretty(config)?;
    fs::write(export_path, config_json)?;
    tracing::info!("Exported config to {:?}", export_path);
    Ok(())
}

/// Imports a configuration from a user-specified JSON file.
pub fn import_config(import_path: &Path) -> Result<AppConfig> {
    let config_content = fs::read_to_string(import_path)?;
    match serde_json::from_str::<AppConfig>(&config_content) {
        Ok(config) => {
            tracing::info!("Imported config from {:?}", import_path);
            Ok(config)
        }
        Err(_) => {
            tracing::info!("Importing legacy config format from {:?}", import_path);
            migrate_legacy_config(&config_content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExportFormat;
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_default_when_missing() {
        let tmp = TempDir::new().expect("tmp dir");
        let path = tmp.path().join("nested").join("config.json");

        let config = load_config(Some(&path)).expect("load");
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let tmp = TempDir::new().expect("tmp dir");
        let path = tmp.path().join("config.json");

        let config = AppConfig {
            default_include_globs: vec!["src/**".to_string()],
            default_export_format: ExportFormat::Zip,
            max_file_size_mb: 0,
            last_repository: Some("octocat/hello-world".to_string()),
            ..Default::default()
        };
        save_config(&config, Some(&path)).expect("save");

        let loaded = load_config(Some(&path)).expect("load");
        assert_eq!(loaded, config);
        assert_eq!(loaded.max_file_size_bytes(), None);
    }

    #[test]
    fn test_legacy_config_is_migrated() {
        let tmp = TempDir::new().expect("tmp dir");
        let path = tmp.path().join("config.json");
        fs::write(
            &path,
            r#"{"default_exclude_globs": ["**/*.bin"], "filters_enabled": false, "max_file_size_mb": null}"#,
        )
        .expect("write");

        let config = load_config(Some(&path)).expect("load");
        assert_eq!(config.default_exclude_globs, vec!["**/*.bin"]);
        assert!(!config.filters_enabled);
        assert_eq!(config.max_file_size_mb, 20);
        assert_eq!(config.default_export_format, ExportFormat::Markdown);
    }

    #[test]
    fn test_corrupted_config_falls_back_to_defaults() {
        let tmp = TempDir::new().expect("tmp dir");
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").expect("write");

        let config = load_config(Some(&path)).expect("load");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_export_and_import() {
        let tmp = TempDir::new().expect("tmp dir");
        let path = tmp.path().join("exported.json");
        let config = AppConfig {
            exclude_binary_files: false,
            ..Default::default()
        };

        export_config(&config, &path).expect("export");
        assert_eq!(import_config(&path).expect("import"), config);
    }
}
