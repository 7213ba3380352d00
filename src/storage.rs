use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

/// Locally stored visitor preferences.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Preferences {
    #[serde(default)]
    pub backend_url: Option<String>,
}

pub fn resolve_preferences_path() -> PathBuf {
    if let Ok(path) = env::var("ANT_ARENA_PREFS_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/preferences.json")
}

pub async fn load_preferences(path: &Path) -> Preferences {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(prefs) => prefs,
            Err(err) => {
                error!("failed to parse preferences file: {err}");
                Preferences::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
        Err(err) => {
            error!("failed to read preferences file: {err}");
            Preferences::default()
        }
    }
}

pub async fn persist_preferences(path: &Path, prefs: &Preferences) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let payload = serde_json::to_vec_pretty(prefs).map_err(AppError::internal)?;
    fs::write(path, payload).await?;
    Ok(())
}
