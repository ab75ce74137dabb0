// src/infra/paths.rs — XDG-compliant path management
//
// All paths respect the MAJLIS_HOME environment variable for isolation.
// When MAJLIS_HOME is set, config and data live under that directory.
// When unset, config uses ~/.majlis/ and data uses XDG_DATA_HOME/majlis.

use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::OnceLock;

static PROJECT_DIRS: OnceLock<ProjectDirs> = OnceLock::new();

fn project_dirs() -> &'static ProjectDirs {
    PROJECT_DIRS.get_or_init(|| {
        ProjectDirs::from("", "", "majlis").expect("Could not determine home directory")
    })
}

/// Returns the MAJLIS_HOME override, if set.
fn majlis_home() -> Option<PathBuf> {
    std::env::var_os("MAJLIS_HOME").map(PathBuf::from)
}

/// Configuration directory: $MAJLIS_HOME/ or ~/.majlis/
pub fn config_dir() -> PathBuf {
    if let Some(home) = majlis_home() {
        return home;
    }
    dirs_home().join(".majlis")
}

/// Data directory: $MAJLIS_HOME/data/ or ~/.local/share/majlis/
pub fn data_dir() -> PathBuf {
    if let Some(home) = majlis_home() {
        return home.join("data");
    }
    project_dirs().data_local_dir().to_path_buf()
}

/// Home directory
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .expect("Could not determine home directory")
        .home_dir()
        .to_path_buf()
}

/// Default database path (sessions + scores).
pub fn db_path() -> PathBuf {
    data_dir().join("majlis.db")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default location of the optional question content file.
pub fn catalog_file_path() -> PathBuf {
    config_dir().join("catalog.toml")
}

/// Ensure all required directories exist
pub async fn ensure_dirs() -> anyhow::Result<()> {
    for dir in [config_dir(), data_dir()] {
        tokio::fs::create_dir_all(dir).await?;
    }
    Ok(())
}
