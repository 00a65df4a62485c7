use crate::persistence::FileStorage;
use std::path::PathBuf;

/// Overrides the data directory. `~` is expanded.
pub const HOME_ENV: &str = "CHESS_REPERTOIRE_HOME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::resolve(std::env::var(HOME_ENV).ok())
    }

    fn resolve(home_override: Option<String>) -> Self {
        let data_dir = match home_override.filter(|dir| !dir.trim().is_empty()) {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir.trim()).as_ref()),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Chess-Repertoire"),
        };
        Self { data_dir }
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.data_dir)
    }
}
