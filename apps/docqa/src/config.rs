use std::path::Path;

use anyhow::{ensure, Context};
use client_core::{DEFAULT_ASK_PATH, DEFAULT_UPLOAD_PATH};
use serde::Deserialize;

const DEFAULT_CONFIG_NAME: &str = "docqa";
const ENV_PREFIX: &str = "DOCQA";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    pub upload_path: String,
    pub ask_path: String,
    /// Substring the selected file's media type must contain.
    pub accepted_media_type: String,
    pub command_queue_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            upload_path: DEFAULT_UPLOAD_PATH.into(),
            ask_path: DEFAULT_ASK_PATH.into(),
            accepted_media_type: "pdf".into(),
            command_queue_capacity: 64,
        }
    }
}

/// Defaults, then `docqa.toml` (or `config_path`, which must exist), then
/// `DOCQA__*` environment variables.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let file = match config_path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
    };

    let settings: Settings = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to load docqa configuration")?
        .try_deserialize()
        .context("invalid docqa configuration")?;

    ensure!(
        settings.command_queue_capacity > 0,
        "command_queue_capacity must be at least 1"
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("docqa.toml");
        fs::write(
            &path,
            "server_url = \"http://qa.internal:9000\"\nask_path = \"/v2/ask\"\n",
        )
        .expect("write config");

        let settings = load_settings(Some(&path)).expect("load");

        assert_eq!(settings.server_url, "http://qa.internal:9000");
        assert_eq!(settings.ask_path, "/v2/ask");
        assert_eq!(settings.upload_path, DEFAULT_UPLOAD_PATH);
        assert_eq!(settings.accepted_media_type, "pdf");
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.toml");
        assert!(load_settings(Some(&missing)).is_err());
    }

    #[test]
    fn zero_queue_capacity_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("docqa.toml");
        fs::write(&path, "command_queue_capacity = 0\n").expect("write config");

        let err = load_settings(Some(&path)).expect_err("zero capacity");
        assert!(err.to_string().contains("command_queue_capacity"));
    }
}
