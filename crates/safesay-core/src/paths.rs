use directories::ProjectDirs;
use std::path::PathBuf;

pub const APP_QUALIFIER: &str = "io";
pub const APP_ORG: &str = "safesay";
pub const APP_NAME: &str = "safesay";

pub fn data_dir() -> anyhow::Result<PathBuf> {
    let dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .ok_or_else(|| anyhow::anyhow!("cannot determine data directory"))?;
    Ok(dirs.data_dir().to_path_buf())
}

pub fn state_file_path() -> anyhow::Result<PathBuf> {
    if let Ok(override_path) = std::env::var("SAFESAY_STATE_FILE") {
        return Ok(PathBuf::from(override_path));
    }
    Ok(data_dir()?.join("state.json"))
}
