// File: ./src/context.rs
//! Where nextup keeps its files.
//!
//! The store document lives under the data directory and `config.toml`
//! under the config directory. Both are resolved through an [`AppContext`]
//! handed to whoever needs them, so tests and `--root` runs never touch the
//! user's real directories.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const DATA_SUBDIR: &str = "data";
const CONFIG_SUBDIR: &str = "config";

/// Resolves (and creates on demand) the directories nextup writes to.
pub trait AppContext: Send + Sync + std::fmt::Debug {
    fn get_data_dir(&self) -> Result<PathBuf>;
    fn get_config_dir(&self) -> Result<PathBuf>;

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join("config.toml"))
    }
}

fn created(path: PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create directory: {:?}", path))?;
    Ok(path)
}

/// Platform directories for a normal run, or `<root>/data` and
/// `<root>/config` when the user passed `--root`.
#[derive(Clone, Debug)]
pub struct StandardContext {
    override_root: Option<PathBuf>,
}

impl StandardContext {
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self { override_root }
    }

    fn resolve(&self, subdir: &str, platform: fn(&ProjectDirs) -> &Path) -> Result<PathBuf> {
        let dir = match &self.override_root {
            Some(root) => root.join(subdir),
            None => {
                let project = ProjectDirs::from("com", "nextup", "nextup")
                    .ok_or_else(|| anyhow!("Cannot locate a home directory for nextup"))?;
                platform(&project).to_path_buf()
            }
        };
        created(dir)
    }
}

impl AppContext for StandardContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        self.resolve(DATA_SUBDIR, ProjectDirs::data_dir)
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        self.resolve(CONFIG_SUBDIR, ProjectDirs::config_dir)
    }
}

/// Scratch root under the system temp dir; deleted again on drop.
#[derive(Clone, Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("nextup_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).expect("temp dir must be writable in tests");
        Self { root }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        created(self.root.join(DATA_SUBDIR))
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        created(self.root.join(CONFIG_SUBDIR))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub type SharedContext = std::sync::Arc<dyn AppContext>;
