use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

use d3tr_core::models::UserId;

use crate::gemini::DEFAULT_MODEL;

const DATA_DIR_ENV: &str = "D3TR_DATA_DIR";
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
const GEMINI_MODEL_ENV: &str = "D3TR_GEMINI_MODEL";

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => ProjectDirs::from("", "", "d3tr")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };
        Self::with_data_dir(
            data_dir,
            std::env::var(GEMINI_API_KEY_ENV).ok(),
            std::env::var(GEMINI_MODEL_ENV).ok(),
        )
    }

    pub fn with_data_dir(
        data_dir: PathBuf,
        gemini_api_key: Option<String>,
        gemini_model: Option<String>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("d3tr.db");
        let gemini_api_key = gemini_api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let gemini_model = gemini_model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Config {
            db_path,
            data_dir,
            gemini_api_key,
            gemini_model,
        })
    }

    /// Load the local user id from disk, or generate a new one.
    ///
    /// Returns `(user, newly_created)` where `newly_created` is true on the
    /// first run for this data directory.
    pub fn load_or_create_local_user(&self) -> Result<(UserId, bool)> {
        let path = self.data_dir.join("local_user");

        if path.exists() {
            let id = std::fs::read_to_string(&path).context("Failed to read local user file")?;
            let id = id.trim();
            if !id.is_empty() {
                return Ok((UserId::from(id), false));
            }
        }

        let user = UserId::generate();
        std::fs::write(&path, user.as_str()).context("Failed to write local user file")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .context("Failed to set local user file permissions")?;
        }
        Ok((user, true))
    }
}
